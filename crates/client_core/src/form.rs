//! Form session state: parameters, last outcome, loading flag and request tokens.

use shared::{
    domain::{CalculationResult, SimulationParameters},
    error::ValidationError,
    protocol::{encode, EncodedQuery},
};
use tracing::{debug, warn};

use crate::{error::CalculationError, CalculationService};

/// Identifies one request cycle; only the latest issued token may complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

#[derive(Debug, Clone)]
pub struct PendingCalculation {
    pub token: RequestToken,
    pub query: EncodedQuery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    Idle,
    Requesting,
    ShowingResult,
    ShowingError,
}

#[derive(Debug, Default)]
pub struct CalculatorForm {
    pub parameters: SimulationParameters,
    result: Option<CalculationResult>,
    error_message: Option<String>,
    is_loading: bool,
    debug_mode: bool,
    latest_token: u64,
}

impl CalculatorForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parameters(parameters: SimulationParameters) -> Self {
        Self {
            parameters,
            ..Self::default()
        }
    }

    pub fn result(&self) -> Option<&CalculationResult> {
        self.result.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn debug_mode(&self) -> bool {
        self.debug_mode
    }

    pub fn toggle_debug_mode(&mut self) {
        self.debug_mode = !self.debug_mode;
    }

    pub fn phase(&self) -> FormPhase {
        if self.is_loading {
            FormPhase::Requesting
        } else if self.error_message.is_some() {
            FormPhase::ShowingError
        } else if self.result.is_some() {
            FormPhase::ShowingResult
        } else {
            FormPhase::Idle
        }
    }

    /// Validates and encodes the current parameters and opens a new request cycle.
    ///
    /// A validation failure shows its message and supersedes any cycle still in flight.
    pub fn begin(&mut self) -> Result<PendingCalculation, ValidationError> {
        if let Err(err) = self.parameters.validate() {
            self.latest_token += 1;
            self.is_loading = false;
            self.show_error(err.user_message().to_string());
            return Err(err);
        }

        self.latest_token += 1;
        self.error_message = None;
        self.is_loading = true;
        Ok(PendingCalculation {
            token: RequestToken(self.latest_token),
            query: encode(&self.parameters),
        })
    }

    /// Applies the outcome of a cycle. Returns `false` when `token` is stale and the
    /// outcome was dropped.
    pub fn complete(
        &mut self,
        token: RequestToken,
        outcome: Result<CalculationResult, CalculationError>,
    ) -> bool {
        if token.0 != self.latest_token {
            debug!(
                token = token.0,
                latest = self.latest_token,
                "discarding stale calculation response"
            );
            return false;
        }

        self.is_loading = false;
        match outcome {
            Ok(result) => {
                debug!(?result, "calculation result");
                self.error_message = None;
                self.result = Some(result);
            }
            Err(err) => {
                warn!(error = %err, category = ?err.category(), "calculation failed");
                self.show_error(err.user_message());
            }
        }
        true
    }

    /// Runs one full cycle against `service`.
    pub async fn calculate<S>(&mut self, service: &S) -> Result<(), CalculationError>
    where
        S: CalculationService + ?Sized,
    {
        let pending = self.begin()?;
        let outcome = service.convert(&pending.query).await;
        let failure = outcome.as_ref().err().cloned();
        self.complete(pending.token, outcome);
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    pub fn reset(&mut self) {
        self.parameters = SimulationParameters::default();
        self.result = None;
        self.error_message = None;
        self.is_loading = false;
        self.latest_token += 1;
    }

    // Result and error are never displayed together.
    fn show_error(&mut self, message: String) {
        self.result = None;
        self.error_message = Some(message);
    }
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
