use super::*;
use crate::workbook::{UnavailableWorkbookEngine, WorkbookOutputs};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Mutex;
use tempfile::TempDir;

struct FixedWorkbookEngine {
    codes: Vec<String>,
    evaluated: Mutex<Vec<WorkbookInputs>>,
}

impl FixedWorkbookEngine {
    fn new(codes: &[&str]) -> Self {
        Self {
            codes: codes.iter().map(|c| c.to_string()).collect(),
            evaluated: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl WorkbookEngine for FixedWorkbookEngine {
    async fn municipality_codes(&self, _workbook: &Path) -> Result<Vec<String>> {
        Ok(self.codes.clone())
    }

    async fn evaluate(&self, _workbook: &Path, inputs: &WorkbookInputs) -> Result<WorkbookOutputs> {
        self.evaluated.lock().expect("evaluated").push(inputs.clone());
        Ok(WorkbookOutputs {
            gross_monthly: 6800.0,
            net_monthly: 5310.25,
            management_fee: 540.0,
            meal_voucher_contribution: 118.8,
            health_insurance_contribution: 42.5,
        })
    }
}

fn workbook_dir_with_files() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir");
    let workbook = dir.path().join("simulation.xlsm");
    fs::write(&workbook, b"workbook").expect("workbook");
    fs::write(dir.path().join("archive.xlsx"), b"old").expect("archive");
    fs::write(dir.path().join("notes.txt"), b"n/a").expect("notes");
    (dir, workbook)
}

fn context(workbook_path: PathBuf, engine: Arc<dyn WorkbookEngine>) -> ApiContext {
    ApiContext {
        workbook_path,
        engine,
    }
}

fn query() -> ConvertQuery {
    ConvertQuery {
        tjm: Some(500.0),
        jours_travailles: Some(18),
        contract_type: Some("CDI".into()),
        frais_fonctionnement: Some(0.08),
        ticket_restaurant: Some("false".into()),
        mutuelle: Some("false".into()),
        code_commune: None,
    }
}

#[test]
fn flags_accept_common_spellings() {
    for raw in ["true", "TRUE", "t", "Yes", "y", "1"] {
        assert!(flag(Some(raw)), "{raw} should be true");
    }
    for raw in ["false", "0", "no", "", "oui"] {
        assert!(!flag(Some(raw)), "{raw} should be false");
    }
    assert!(!flag(None));
}

#[test]
fn inputs_follow_contract_and_benefits() {
    let mut q = query();
    q.ticket_restaurant = Some("true".into());
    q.mutuelle = Some("1".into());
    q.code_commune = Some(String::new());

    let inputs = build_inputs(&q, 500.0, 18);

    assert_eq!(
        inputs.contract_rates,
        Some(ContractRates::for_contract(ContractType::Cdi))
    );
    assert_eq!(inputs.overhead_percent, Some(8.0));
    assert_eq!(inputs.meal_voucher_amount, 198.0);
    assert_eq!(inputs.health_insurance_label(), "Oui");
    assert_eq!(inputs.municipality_code, None);
}

#[test]
fn unknown_contract_leaves_rates_unset() {
    let mut q = query();
    q.contract_type = Some("freelance".into());
    let inputs = build_inputs(&q, 500.0, 18);
    assert_eq!(inputs.contract_rates, None);
    assert_eq!(inputs.health_insurance_label(), "Non");
}

#[tokio::test]
async fn missing_required_parameters_are_rejected() {
    let (_dir, workbook) = workbook_dir_with_files();
    let ctx = context(workbook, Arc::new(FixedWorkbookEngine::new(&[])));
    let mut q = query();
    q.jours_travailles = None;

    let err = convert(&ctx, q).await.expect_err("must fail");

    assert!(matches!(err, ConvertError::MissingRequired));
    assert!(err.is_client_error());
    assert_eq!(
        err.body().detail.as_deref(),
        Some("TJM and jours_travailles are required")
    );
}

#[tokio::test]
async fn missing_workbook_lists_available_files() {
    let (dir, _workbook) = workbook_dir_with_files();
    let ctx = context(
        dir.path().join("absent.xlsm"),
        Arc::new(FixedWorkbookEngine::new(&[])),
    );

    let err = convert(&ctx, query()).await.expect_err("must fail");

    assert!(!err.is_client_error());
    let detail = err.body().detail.expect("detail");
    assert!(detail.starts_with("Excel template file not found:"));
    assert!(detail.ends_with("Available Excel files: archive.xlsx, simulation.xlsm"));
}

#[tokio::test]
async fn evaluation_maps_outputs_and_zeroes_unopted_benefits() {
    let (_dir, workbook) = workbook_dir_with_files();
    let engine = Arc::new(FixedWorkbookEngine::new(&[]));
    let ctx = context(workbook, engine.clone());

    let result = convert(&ctx, query()).await.expect("convert");

    assert_eq!(result.daily_rate, 500.0);
    assert_eq!(result.gross_monthly, 6800.0);
    assert_eq!(result.net_monthly, 5310.25);
    assert_eq!(result.management_fee, 540.0);
    assert_eq!(result.details.meal_voucher_contribution, 0.0);
    assert_eq!(result.details.health_insurance_contribution, 0.0);
    assert!(result.note.is_none());
    assert_eq!(engine.evaluated.lock().expect("evaluated").len(), 1);
}

#[tokio::test]
async fn opted_benefits_keep_workbook_contributions() {
    let (_dir, workbook) = workbook_dir_with_files();
    let ctx = context(workbook, Arc::new(FixedWorkbookEngine::new(&[])));
    let mut q = query();
    q.ticket_restaurant = Some("true".into());
    q.mutuelle = Some("true".into());

    let result = convert(&ctx, q).await.expect("convert");

    assert_eq!(result.details.meal_voucher_contribution, 118.8);
    assert_eq!(result.details.health_insurance_contribution, 42.5);
}

#[tokio::test]
async fn listed_municipality_is_forwarded_to_workbook() {
    let (_dir, workbook) = workbook_dir_with_files();
    let engine = Arc::new(FixedWorkbookEngine::new(&["1001", "75056"]));
    let ctx = context(workbook, engine.clone());
    let mut q = query();
    q.code_commune = Some("01001".into());

    convert(&ctx, q).await.expect("convert");

    let evaluated = engine.evaluated.lock().expect("evaluated");
    assert_eq!(evaluated[0].municipality_code.as_deref(), Some("01001"));
}

#[tokio::test]
async fn unlisted_municipality_answers_with_message() {
    let (_dir, workbook) = workbook_dir_with_files();
    let engine = Arc::new(FixedWorkbookEngine::new(&["75056"]));
    let ctx = context(workbook, engine.clone());
    let mut q = query();
    q.code_commune = Some("13055".into());

    let err = convert(&ctx, q).await.expect_err("must fail");

    assert!(matches!(err, ConvertError::UnknownMunicipality));
    assert!(err.is_client_error());
    let body = err.body();
    assert_eq!(body.detail, None);
    assert_eq!(body.message.as_deref(), Some(UNKNOWN_MUNICIPALITY_MESSAGE));
    assert!(engine.evaluated.lock().expect("evaluated").is_empty());
}

#[tokio::test]
async fn unavailable_engine_reports_processing_error() {
    let (_dir, workbook) = workbook_dir_with_files();
    let ctx = context(workbook, Arc::new(UnavailableWorkbookEngine));

    let err = convert(&ctx, query()).await.expect_err("must fail");

    assert!(matches!(err, ConvertError::Processing(_)));
    assert!(err
        .body()
        .detail
        .expect("detail")
        .starts_with("Excel processing error:"));
}

#[tokio::test]
async fn municipality_lookup_failure_is_a_server_error() {
    let (_dir, workbook) = workbook_dir_with_files();
    let ctx = context(workbook, Arc::new(UnavailableWorkbookEngine));
    let mut q = query();
    q.code_commune = Some("75056".into());

    let err = convert(&ctx, q).await.expect_err("must fail");

    assert!(matches!(err, ConvertError::MunicipalityLookup));
    assert!(!err.is_client_error());
}

#[test]
fn fallback_uses_fixed_figures() {
    let result = fallback_convert(FallbackQuery {
        tjm: Some(640.0),
        ticket_restaurant: Some("true".into()),
        ..FallbackQuery::default()
    });

    assert_eq!(result.daily_rate, 640.0);
    assert_eq!(result.gross_monthly, 7500.0);
    assert_eq!(result.net_monthly, 5250.0);
    assert_eq!(result.management_fee, 750.0);
    assert_eq!(result.details.meal_voucher_contribution, 198.0);
    assert_eq!(result.details.health_insurance_contribution, 0.0);
    assert_eq!(result.note.as_deref(), Some(FALLBACK_NOTE));

    let defaults = fallback_convert(FallbackQuery::default());
    assert_eq!(defaults.daily_rate, 500.0);
}

#[test]
fn workbook_info_describes_configured_file() {
    let (_dir, workbook) = workbook_dir_with_files();
    let ctx = context(workbook.clone(), Arc::new(UnavailableWorkbookEngine));

    let info = workbook_info(&ctx);

    assert!(info.exists);
    assert_eq!(info.file_size, 8);
    assert_eq!(info.excel_file, workbook.display().to_string());
    assert_eq!(info.available_files, vec!["archive.xlsx", "simulation.xlsm"]);
    assert!(!info.server_version.is_empty());
}
