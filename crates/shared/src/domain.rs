use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{ContractTypeParseError, ValidationError};

pub const MIN_DAILY_RATE: f64 = 290.0;
pub const MAX_DAYS_WORKED: i32 = 30;

pub const DEFAULT_DAILY_RATE: f64 = 500.0;
pub const DEFAULT_DAYS_WORKED: i32 = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ContractType {
    #[default]
    #[serde(rename = "CDI")]
    Cdi,
    #[serde(rename = "CDD")]
    Cdd,
}

impl ContractType {
    pub fn as_str(self) -> &'static str {
        match self {
            ContractType::Cdi => "CDI",
            ContractType::Cdd => "CDD",
        }
    }
}

impl fmt::Display for ContractType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContractType {
    type Err = ContractTypeParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("cdi") {
            Ok(ContractType::Cdi)
        } else if trimmed.eq_ignore_ascii_case("cdd") {
            Ok(ContractType::Cdd)
        } else {
            Err(ContractTypeParseError {
                value: raw.to_string(),
            })
        }
    }
}

/// User-edited inputs of one simulation.
///
/// `overhead_percent` stays in percent units here; the wire carries a fraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    pub daily_rate: f64,
    pub days_worked: i32,
    pub contract_type: ContractType,
    pub overhead_percent: f64,
    pub meal_voucher_opted: bool,
    pub health_insurance_opted: bool,
    pub municipality_code: String,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            daily_rate: DEFAULT_DAILY_RATE,
            days_worked: DEFAULT_DAYS_WORKED,
            contract_type: ContractType::Cdi,
            overhead_percent: 0.0,
            meal_voucher_opted: false,
            health_insurance_opted: false,
            municipality_code: String::new(),
        }
    }
}

impl SimulationParameters {
    /// Local checks run before any request is issued.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.daily_rate.is_finite() || self.daily_rate < MIN_DAILY_RATE {
            return Err(ValidationError::InvalidDailyRate {
                value: self.daily_rate,
            });
        }
        if self.days_worked <= 0 || self.days_worked > MAX_DAYS_WORKED {
            return Err(ValidationError::InvalidDaysWorked {
                value: self.days_worked,
            });
        }
        Ok(())
    }

    pub fn overhead_fraction(&self) -> f64 {
        self.overhead_percent / 100.0
    }

    pub fn municipality_code(&self) -> Option<&str> {
        if self.municipality_code.is_empty() {
            None
        } else {
            Some(&self.municipality_code)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtherDetails {
    #[serde(rename = "ticket_restaurant_contribution")]
    pub meal_voucher_contribution: f64,
    #[serde(rename = "mutuelle_contribution")]
    pub health_insurance_contribution: f64,
}

/// Salary breakdown returned by the calculation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    #[serde(rename = "tjm")]
    pub daily_rate: f64,
    #[serde(rename = "brut_mensuel")]
    pub gross_monthly: f64,
    #[serde(rename = "net_mensuel")]
    pub net_monthly: f64,
    #[serde(rename = "frais_gestion")]
    pub management_fee: f64,
    #[serde(rename = "autres_details")]
    pub details: OtherDetails,
    /// Set by the service when it answers with demonstration figures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}
