use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use shared::{domain::CalculationResult, protocol::EncodedQuery};
use tracing::{debug, warn};
use url::Url;

pub mod currency;
pub mod error;
pub mod form;

pub use currency::{format_amount, format_currency, CurrencyValue};
pub use error::{CalculationError, ErrorCategory};
pub use form::{CalculatorForm, FormPhase, PendingCalculation, RequestToken};

pub const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:8000/convert";

/// Remote side of a request cycle: one encoded query in, one outcome out.
#[async_trait]
pub trait CalculationService: Send + Sync {
    async fn convert(&self, query: &EncodedQuery) -> Result<CalculationResult, CalculationError>;
}

pub struct MissingCalculationService;

#[async_trait]
impl CalculationService for MissingCalculationService {
    async fn convert(&self, _query: &EncodedQuery) -> Result<CalculationResult, CalculationError> {
        Err(CalculationError::Transport(
            "calculation service is not configured".to_string(),
        ))
    }
}

pub struct HttpCalculationService {
    http: Client,
    endpoint: Url,
}

impl HttpCalculationService {
    pub fn new(endpoint: Url) -> Self {
        Self {
            http: Client::new(),
            endpoint,
        }
    }

    pub fn with_timeout(endpoint: Url, timeout: Duration) -> Result<Self, CalculationError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| CalculationError::Transport(err.to_string()))?;
        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl CalculationService for HttpCalculationService {
    async fn convert(&self, query: &EncodedQuery) -> Result<CalculationResult, CalculationError> {
        let url = query.url_for(&self.endpoint);
        debug!(%url, "calling calculation service");

        let response = self.http.get(url).send().await.map_err(|err| {
            warn!(error = %err, "calculation service unreachable");
            CalculationError::Transport(err.to_string())
        })?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| CalculationError::Transport(err.to_string()))?;

        if status.is_success() {
            return serde_json::from_slice::<CalculationResult>(&body)
                .map_err(|err| CalculationError::Decode(err.to_string()));
        }

        let err = CalculationError::from_failed_response(status.as_u16(), &body);
        if let CalculationError::Status {
            message: Some(message),
            ..
        } = &err
        {
            warn!(status = status.as_u16(), %message, "calculation service rejected request");
        }
        Err(err)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
