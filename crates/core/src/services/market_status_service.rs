use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};
use chrono_tz::Tz;
use log::debug;
use std::sync::Arc;

use crate::models::quote::MARKET_STATE_REGULAR;
use crate::providers::traits::QuoteProvider;
use super::currency_service::EUROPEAN_SUFFIXES;

/// Default US reference instrument (S&P 500).
pub const US_REFERENCE_SYMBOL: &str = "^GSPC";

/// Default European reference instrument (DAX).
pub const EU_REFERENCE_SYMBOL: &str = "^GDAXI";

const EUROPEAN_INDICES: &[&str] = &[
    "^GDAXI", "^STOXX50E", "^STOXX", "^FCHI", "^AEX", "^IBEX", "^FTSEMIB", "FTSEMIB.MI",
];

/// Exchange whose trading hours decide the clock-based fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceMarket {
    /// NYSE / Nasdaq, 09:30–16:00 New York time.
    UnitedStates,
    /// Xetra, 09:00–17:30 Frankfurt time.
    Europe,
}

impl ReferenceMarket {
    /// Pick the market a reference symbol trades on. Unknown symbols are
    /// treated as US listings.
    pub fn for_symbol(symbol: &str) -> Self {
        let upper = symbol.trim().to_uppercase();
        if EUROPEAN_INDICES.contains(&upper.as_str())
            || EUROPEAN_SUFFIXES.iter().any(|s| upper.ends_with(s))
        {
            ReferenceMarket::Europe
        } else {
            ReferenceMarket::UnitedStates
        }
    }

    pub fn timezone(&self) -> Tz {
        match self {
            ReferenceMarket::UnitedStates => chrono_tz::America::New_York,
            ReferenceMarket::Europe => chrono_tz::Europe::Berlin,
        }
    }

    /// Regular session as minutes after local midnight, `[open, close)`.
    fn session_minutes(&self) -> (u32, u32) {
        match self {
            ReferenceMarket::UnitedStates => (9 * 60 + 30, 16 * 60),
            ReferenceMarket::Europe => (9 * 60, 17 * 60 + 30),
        }
    }

    /// Whether the regular session is running at `instant`. Weekends are
    /// closed; exchange holidays are not modelled.
    pub fn is_open_at(&self, instant: DateTime<Utc>) -> bool {
        let local = instant.with_timezone(&self.timezone());
        if matches!(local.weekday(), Weekday::Sat | Weekday::Sun) {
            return false;
        }
        let minute_of_day = local.hour() * 60 + local.minute();
        let (open, close) = self.session_minutes();
        (open..close).contains(&minute_of_day)
    }
}

/// Answers "is the market open right now?".
///
/// Asks the quote provider first and trusts its `marketState`. Without a
/// quote (or without a state in it) the answer comes from the reference
/// market's local clock.
pub struct MarketStatusMonitor {
    provider: Arc<dyn QuoteProvider>,
}

impl MarketStatusMonitor {
    pub fn new(provider: Arc<dyn QuoteProvider>) -> Self {
        Self { provider }
    }

    pub async fn is_open(&self, reference_symbol: &str) -> bool {
        if let Some(state) = self
            .provider
            .get_quote(reference_symbol)
            .await
            .and_then(|q| q.market_state)
        {
            debug!("Market state for {reference_symbol}: {state}");
            return state == MARKET_STATE_REGULAR;
        }

        debug!("No market state for {reference_symbol}, using trading hours");
        self.is_open_at(reference_symbol, Utc::now())
    }

    /// Clock-only check for `reference_symbol` at `instant`.
    pub fn is_open_at(&self, reference_symbol: &str, instant: DateTime<Utc>) -> bool {
        ReferenceMarket::for_symbol(reference_symbol).is_open_at(instant)
    }
}
