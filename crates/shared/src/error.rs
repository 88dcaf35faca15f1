use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const INVALID_DAILY_RATE_MESSAGE: &str = "Le taux journalier doit être supérieur à 289.";
pub const INVALID_DAYS_WORKED_MESSAGE: &str =
    "Le nombre de jours travaillés doit être entre 1 et 30.";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("daily rate {value} is below the 290 floor")]
    InvalidDailyRate { value: f64 },
    #[error("days worked {value} is outside 1..=30")]
    InvalidDaysWorked { value: i32 },
}

impl ValidationError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ValidationError::InvalidDailyRate { .. } => INVALID_DAILY_RATE_MESSAGE,
            ValidationError::InvalidDaysWorked { .. } => INVALID_DAYS_WORKED_MESSAGE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported contract type '{value}' (expected CDI or CDD)")]
pub struct ContractTypeParseError {
    pub value: String,
}

/// Body of a non-2xx answer from the calculation service.
///
/// Most failures carry `detail`; the municipality check answers with `message` instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn detail(detail: impl Into<String>) -> Self {
        Self {
            detail: Some(detail.into()),
            message: None,
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self {
            detail: None,
            message: Some(message.into()),
        }
    }
}
