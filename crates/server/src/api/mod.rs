use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::{Deserialize, Serialize};
use shared::{
    domain::{CalculationResult, ContractType, OtherDetails},
    error::ErrorBody,
};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::workbook::{
    municipality_listed, ContractRates, WorkbookEngine, WorkbookInputs, MEAL_VOUCHER_DAILY_AMOUNT,
};

pub const FALLBACK_NOTE: &str = "This is fallback data. Excel automation failed.";
pub const UNKNOWN_MUNICIPALITY_MESSAGE: &str =
    "Le code Commune n'est pas dans la base de données";

#[derive(Clone)]
pub struct ApiContext {
    pub workbook_path: PathBuf,
    pub engine: Arc<dyn WorkbookEngine>,
}

/// Every parameter is optional on the wire; `convert` decides what is required.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ConvertQuery {
    pub tjm: Option<f64>,
    pub jours_travailles: Option<i64>,
    pub contract_type: Option<String>,
    pub frais_fonctionnement: Option<f64>,
    pub ticket_restaurant: Option<String>,
    pub mutuelle: Option<String>,
    pub code_commune: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct FallbackQuery {
    pub tjm: Option<f64>,
    pub jours_travailles: Option<i64>,
    pub contract_type: Option<String>,
    pub ticket_restaurant: Option<String>,
    pub mutuelle: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WorkbookInfo {
    pub excel_file: String,
    pub exists: bool,
    pub file_size: u64,
    pub current_directory: String,
    pub server_version: String,
    pub available_files: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("TJM and jours_travailles are required")]
    MissingRequired,
    #[error("Excel template file not found: {path}. Available Excel files: {available}")]
    WorkbookMissing { path: String, available: String },
    #[error("Le code Commune n'est pas dans la base de données")]
    UnknownMunicipality,
    #[error("Erreur lors de la vérification du code commune")]
    MunicipalityLookup,
    #[error("Excel processing error: {0}")]
    Processing(String),
}

impl ConvertError {
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ConvertError::MissingRequired | ConvertError::UnknownMunicipality
        )
    }

    /// The municipality check answers with `message`; everything else with `detail`.
    pub fn body(&self) -> ErrorBody {
        match self {
            ConvertError::UnknownMunicipality => ErrorBody::message(self.to_string()),
            _ => ErrorBody::detail(self.to_string()),
        }
    }
}

/// Lenient boolean: `true`, `t`, `yes`, `y` and `1` in any case.
pub fn flag(value: Option<&str>) -> bool {
    value
        .map(|raw| {
            matches!(
                raw.to_ascii_lowercase().as_str(),
                "true" | "t" | "yes" | "y" | "1"
            )
        })
        .unwrap_or(false)
}

pub fn build_inputs(query: &ConvertQuery, daily_rate: f64, days_worked: i64) -> WorkbookInputs {
    let contract_rates = match query.contract_type.as_deref() {
        Some("CDI") => Some(ContractRates::for_contract(ContractType::Cdi)),
        Some("CDD") => Some(ContractRates::for_contract(ContractType::Cdd)),
        _ => None,
    };
    let meal_voucher_amount = if flag(query.ticket_restaurant.as_deref()) {
        days_worked as f64 * MEAL_VOUCHER_DAILY_AMOUNT
    } else {
        0.0
    };

    WorkbookInputs {
        daily_rate,
        days_worked,
        contract_rates,
        overhead_percent: query.frais_fonctionnement.map(|fraction| fraction * 100.0),
        meal_voucher_amount,
        health_insurance: flag(query.mutuelle.as_deref()),
        municipality_code: query
            .code_commune
            .as_ref()
            .filter(|code| !code.is_empty())
            .cloned(),
    }
}

pub async fn convert(
    ctx: &ApiContext,
    query: ConvertQuery,
) -> Result<CalculationResult, ConvertError> {
    info!(?query, "received conversion parameters");

    let (Some(daily_rate), Some(days_worked)) = (query.tjm, query.jours_travailles) else {
        error!("conversion rejected: missing required parameters");
        return Err(ConvertError::MissingRequired);
    };

    if !ctx.workbook_path.exists() {
        let err = ConvertError::WorkbookMissing {
            path: ctx.workbook_path.display().to_string(),
            available: list_workbooks(workbook_dir(&ctx.workbook_path)).join(", "),
        };
        error!(error = %err, "workbook missing");
        return Err(err);
    }

    let inputs = build_inputs(&query, daily_rate, days_worked);
    let meal_vouchers = flag(query.ticket_restaurant.as_deref());
    info!(
        daily_rate,
        days_worked,
        contract_rates = ?inputs.contract_rates,
        overhead_percent = ?inputs.overhead_percent,
        meal_voucher_amount = inputs.meal_voucher_amount,
        health_insurance = inputs.health_insurance_label(),
        "workbook inputs prepared"
    );

    if let Some(code) = inputs.municipality_code.as_deref() {
        let listed = ctx
            .engine
            .municipality_codes(&ctx.workbook_path)
            .await
            .map_err(|err| {
                error!(error = %err, "municipality lookup failed");
                ConvertError::MunicipalityLookup
            })?;
        if !municipality_listed(code, &listed) {
            warn!(code, "municipality code not listed");
            return Err(ConvertError::UnknownMunicipality);
        }
        info!(code, "municipality code accepted");
    }

    let outputs = ctx
        .engine
        .evaluate(&ctx.workbook_path, &inputs)
        .await
        .map_err(|err| {
            error!(error = %err, "workbook evaluation failed");
            ConvertError::Processing(err.to_string())
        })?;

    let result = CalculationResult {
        daily_rate,
        gross_monthly: outputs.gross_monthly,
        net_monthly: outputs.net_monthly,
        management_fee: outputs.management_fee,
        details: OtherDetails {
            meal_voucher_contribution: if meal_vouchers {
                outputs.meal_voucher_contribution
            } else {
                0.0
            },
            health_insurance_contribution: if inputs.health_insurance {
                outputs.health_insurance_contribution
            } else {
                0.0
            },
        },
        note: None,
    };
    info!(?result, "conversion complete");
    Ok(result)
}

/// Fixed demonstration figures for when the workbook cannot be driven.
pub fn fallback_convert(query: FallbackQuery) -> CalculationResult {
    CalculationResult {
        daily_rate: query.tjm.unwrap_or(500.0),
        gross_monthly: 7500.0,
        net_monthly: 5250.0,
        management_fee: 750.0,
        details: OtherDetails {
            meal_voucher_contribution: if flag(query.ticket_restaurant.as_deref()) {
                198.0
            } else {
                0.0
            },
            health_insurance_contribution: if flag(query.mutuelle.as_deref()) {
                50.0
            } else {
                0.0
            },
        },
        note: Some(FALLBACK_NOTE.to_string()),
    }
}

pub fn workbook_info(ctx: &ApiContext) -> WorkbookInfo {
    let metadata = fs::metadata(&ctx.workbook_path).ok();
    WorkbookInfo {
        excel_file: ctx.workbook_path.display().to_string(),
        exists: metadata.is_some(),
        file_size: metadata.map(|m| m.len()).unwrap_or(0),
        current_directory: std::env::current_dir()
            .map(|dir| dir.display().to_string())
            .unwrap_or_default(),
        server_version: env!("CARGO_PKG_VERSION").to_string(),
        available_files: list_workbooks(workbook_dir(&ctx.workbook_path)),
    }
}

fn workbook_dir(workbook: &Path) -> &Path {
    match workbook.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn list_workbooks(dir: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.ends_with(".xlsm") || name.ends_with(".xlsx"))
        .collect();
    names.sort();
    names
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
