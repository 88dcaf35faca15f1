//! Inputs and outputs of the salary workbook, and the engine seam that evaluates it.

use std::path::Path;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::domain::ContractType;

pub const MEAL_VOUCHER_DAILY_AMOUNT: f64 = 11.0;

/// Contribution rates the workbook expects for a contract type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContractRates {
    pub reserve: f64,
    pub paid_leave: f64,
    pub precarity: f64,
}

impl ContractRates {
    pub fn for_contract(contract_type: ContractType) -> Self {
        match contract_type {
            ContractType::Cdi => Self {
                reserve: 0.02,
                paid_leave: 0.1,
                precarity: 0.0,
            },
            ContractType::Cdd => Self {
                reserve: 0.0,
                paid_leave: 0.0,
                precarity: 0.1,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkbookInputs {
    pub daily_rate: f64,
    pub days_worked: i64,
    /// `None` leaves the workbook's own rates in place.
    pub contract_rates: Option<ContractRates>,
    pub overhead_percent: Option<f64>,
    pub meal_voucher_amount: f64,
    pub health_insurance: bool,
    pub municipality_code: Option<String>,
}

impl WorkbookInputs {
    pub fn health_insurance_label(&self) -> &'static str {
        if self.health_insurance {
            "Oui"
        } else {
            "Non"
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkbookOutputs {
    pub gross_monthly: f64,
    pub net_monthly: f64,
    pub management_fee: f64,
    pub meal_voucher_contribution: f64,
    pub health_insurance_contribution: f64,
}

#[async_trait]
pub trait WorkbookEngine: Send + Sync {
    /// Municipality codes listed in the workbook's transport-rate sheet.
    async fn municipality_codes(&self, workbook: &Path) -> Result<Vec<String>>;
    async fn evaluate(&self, workbook: &Path, inputs: &WorkbookInputs) -> Result<WorkbookOutputs>;
}

pub struct UnavailableWorkbookEngine;

#[async_trait]
impl WorkbookEngine for UnavailableWorkbookEngine {
    async fn municipality_codes(&self, workbook: &Path) -> Result<Vec<String>> {
        Err(anyhow!(
            "cannot read municipality codes from {}: spreadsheet automation is not available on this host",
            workbook.display()
        ))
    }

    async fn evaluate(&self, workbook: &Path, _inputs: &WorkbookInputs) -> Result<WorkbookOutputs> {
        Err(anyhow!(
            "cannot evaluate {}: spreadsheet automation is not available on this host",
            workbook.display()
        ))
    }
}

/// Matches a user-supplied code against the listed ones.
///
/// Leading zeros of the user code are ignored, and listed codes stored as decimals
/// (`"1001.0"`) match on their integer part.
pub fn municipality_listed(user_code: &str, listed: &[String]) -> bool {
    let wanted = user_code.trim().trim_start_matches('0');
    listed.iter().map(|code| code.trim()).any(|code| {
        code == wanted || code.split('.').next() == Some(wanted)
    })
}
