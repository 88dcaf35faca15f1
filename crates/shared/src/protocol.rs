use url::{form_urlencoded, Url};

use crate::domain::SimulationParameters;

pub const PARAM_DAILY_RATE: &str = "tjm";
pub const PARAM_DAYS_WORKED: &str = "jours_travailles";
pub const PARAM_CONTRACT_TYPE: &str = "contract_type";
pub const PARAM_OVERHEAD: &str = "frais_fonctionnement";
pub const PARAM_MEAL_VOUCHER: &str = "ticket_restaurant";
pub const PARAM_HEALTH_INSURANCE: &str = "mutuelle";
pub const PARAM_MUNICIPALITY_CODE: &str = "code_commune";

pub fn convert_route() -> &'static str {
    "/convert"
}

pub fn fallback_convert_route() -> &'static str {
    "/fallback-convert"
}

pub fn workbook_info_route() -> &'static str {
    "/get-excel-info"
}

/// Ordered query pairs sent to the calculation endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedQuery {
    pairs: Vec<(&'static str, String)>,
}

impl EncodedQuery {
    pub fn pairs(&self) -> &[(&'static str, String)] {
        &self.pairs
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }

    /// Appends the pairs to `endpoint`, keeping any query it already carries.
    pub fn url_for(&self, endpoint: &Url) -> Url {
        let mut url = endpoint.clone();
        url.query_pairs_mut().extend_pairs(self.pairs.iter());
        url
    }
}

/// Maps form parameters onto the service's query parameters.
///
/// Encoding does not validate; callers run [`SimulationParameters::validate`] first.
pub fn encode(params: &SimulationParameters) -> EncodedQuery {
    let mut pairs = vec![
        (PARAM_DAILY_RATE, format_number(params.daily_rate)),
        (PARAM_DAYS_WORKED, params.days_worked.to_string()),
        (PARAM_CONTRACT_TYPE, params.contract_type.as_str().to_string()),
        (PARAM_OVERHEAD, format_number(params.overhead_fraction())),
        (PARAM_MEAL_VOUCHER, params.meal_voucher_opted.to_string()),
        (
            PARAM_HEALTH_INSURANCE,
            params.health_insurance_opted.to_string(),
        ),
    ];
    if let Some(code) = params.municipality_code() {
        pairs.push((PARAM_MUNICIPALITY_CODE, code.to_string()));
    }
    EncodedQuery { pairs }
}

// Shortest round-trip form: 500.0 -> "500", 0.08 -> "0.08". Negative zero prints as "0".
fn format_number(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else {
        value.to_string()
    }
}
