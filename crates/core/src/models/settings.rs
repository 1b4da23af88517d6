use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Runtime configuration for price sync and valuation.
///
/// Every field has a default, so a partial JSON document is enough to
/// override a single value (e.g. `{"request_delay_ms": 1000}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Currency all portfolio figures are normalized to.
    pub base_currency: String,

    /// EUR per USD used when the live cross quote is unavailable.
    /// Replaced at runtime by the last successfully fetched rate.
    pub fx_fallback_rate: Decimal,

    /// Provider symbol of the EUR/USD cross quote.
    pub fx_symbol: String,

    /// Pause between two consecutive quote requests within one sync run.
    pub request_delay_ms: u64,

    /// Per-request HTTP timeout.
    pub request_timeout_secs: u64,

    /// Chart endpoint queried first; the symbol is appended as a path segment.
    pub primary_quote_url: String,

    /// Mirror of the chart endpoint, queried once when the primary fails.
    pub secondary_quote_url: String,

    /// Symbol search endpoint.
    pub search_url: String,

    /// Upper bound on search results returned to the caller.
    pub max_search_results: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_currency: "EUR".to_string(),
            fx_fallback_rate: Decimal::new(92, 2),
            fx_symbol: "EURUSD=X".to_string(),
            request_delay_ms: 500,
            request_timeout_secs: 30,
            primary_quote_url: "https://query1.finance.yahoo.com/v8/finance/chart".to_string(),
            secondary_quote_url: "https://query2.finance.yahoo.com/v8/finance/chart".to_string(),
            search_url: "https://query1.finance.yahoo.com/v1/finance/search".to_string(),
            max_search_results: 20,
        }
    }
}

impl Settings {
    /// Parse settings from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values that would break conversion or the rate limiter.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.base_currency.trim().is_empty() {
            return Err(CoreError::ValidationError(
                "base_currency must not be empty".into(),
            ));
        }
        if self.fx_fallback_rate <= Decimal::ZERO {
            return Err(CoreError::ValidationError(format!(
                "fx_fallback_rate must be positive, got {}",
                self.fx_fallback_rate
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(CoreError::ValidationError(
                "request_timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
