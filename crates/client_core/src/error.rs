//! Failure taxonomy of one request cycle and its user-facing wording.

use shared::error::{ErrorBody, ValidationError};
use thiserror::Error;

pub const SPREADSHEET_MARKER: &str = "Excel";

const SPREADSHEET_FAILURE_PREFIX: &str =
    "Une erreur s'est produite lors de la communication avec Excel. Détail: ";
const SERVER_FAILURE_PREFIX: &str =
    "Une erreur s'est produite lors de la communication avec le serveur. Détail: ";
pub const GENERIC_FAILURE_MESSAGE: &str =
    "Une erreur s'est produite lors de la communication avec le serveur. Veuillez réessayer.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Transport,
    Service,
    Spreadsheet,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalculationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("calculation service unreachable: {0}")]
    Transport(String),
    #[error("calculation service returned {status}: {detail}")]
    Service { status: u16, detail: String },
    #[error("calculation service returned {status} without detail")]
    Status {
        status: u16,
        message: Option<String>,
    },
    #[error("malformed calculation response: {0}")]
    Decode(String),
}

impl CalculationError {
    /// Classifies a non-2xx answer from its raw body.
    pub fn from_failed_response(status: u16, body: &[u8]) -> Self {
        let payload = serde_json::from_slice::<ErrorBody>(body).unwrap_or_default();
        match payload.detail {
            Some(detail) => CalculationError::Service { status, detail },
            None => CalculationError::Status {
                status,
                message: payload.message,
            },
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            CalculationError::Validation(_) => ErrorCategory::Validation,
            CalculationError::Service { detail, .. } if detail.contains(SPREADSHEET_MARKER) => {
                ErrorCategory::Spreadsheet
            }
            CalculationError::Service { .. } => ErrorCategory::Service,
            CalculationError::Transport(_)
            | CalculationError::Status { .. }
            | CalculationError::Decode(_) => ErrorCategory::Transport,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            CalculationError::Validation(err) => err.user_message().to_string(),
            CalculationError::Service { detail, .. } => match self.category() {
                ErrorCategory::Spreadsheet => format!("{SPREADSHEET_FAILURE_PREFIX}{detail}"),
                _ => format!("{SERVER_FAILURE_PREFIX}{detail}"),
            },
            CalculationError::Transport(_)
            | CalculationError::Status { .. }
            | CalculationError::Decode(_) => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}
