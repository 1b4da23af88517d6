use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Market state reported by the provider while the exchange is trading.
pub const MARKET_STATE_REGULAR: &str = "REGULAR";

/// Point-in-time price snapshot for one symbol. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub current_price: f64,
    pub previous_close: f64,
    /// Trading currency as reported by the provider (e.g. "USD")
    pub currency: Option<String>,
    /// "PRE", "REGULAR", "POST", "CLOSED", ...
    pub market_state: Option<String>,
    pub long_name: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl Quote {
    pub fn change(&self) -> f64 {
        self.current_price - self.previous_close
    }

    /// Day change in percent; zero when there is no usable previous close.
    pub fn change_percent(&self) -> f64 {
        if self.previous_close > 0.0 {
            self.change() / self.previous_close * 100.0
        } else {
            0.0
        }
    }

    pub fn is_market_open(&self) -> bool {
        self.market_state.as_deref() == Some(MARKET_STATE_REGULAR)
    }
}

/// A candidate symbol returned by the provider's search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub symbol: String,
    pub short_name: Option<String>,
    pub long_name: Option<String>,
    /// Provider quote type ("EQUITY", "ETF", "CRYPTOCURRENCY", ...)
    pub asset_type: Option<String>,
    pub exchange: Option<String>,
}
