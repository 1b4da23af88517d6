use log::{debug, warn};
use rust_decimal::Decimal;
use std::sync::{Arc, RwLock};

use crate::models::quote::Quote;
use crate::models::settings::Settings;
use crate::providers::traits::QuoteProvider;

/// Exchange suffixes of European listings, already quoted in EUR.
pub const EUROPEAN_SUFFIXES: &[&str] = &[
    ".DE", ".F", ".PA", ".AS", ".MI", ".MC", ".BR", ".LS", ".VI", ".HE", ".IR", ".DU",
    ".MU", ".SG", ".HM", ".BE",
];

/// Currency codes recognized as "neither base nor USD". No cross rate is
/// defined for them, so amounts pass through unchanged.
const OTHER_CURRENCIES: &[&str] = &[
    "GBP", "GBX", "CHF", "JPY", "CAD", "AUD", "SEK", "NOK", "DKK", "PLN", "CZK", "HKD",
    "CNY", "SGD",
];

/// Stablecoin quote legs treated as USD for crypto pairs.
const USD_LEGS: &[&str] = &["USD", "USDT", "USDC"];

/// Decimal places kept after conversion.
const CONVERTED_SCALE: u32 = 6;

/// Where a price is quoted, as far as conversion is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriceOrigin {
    /// Already in the base currency.
    Base,
    /// USD-denominated: US listing, crypto-USD pair or a USD currency hint.
    Usd,
    /// Anything else; passed through unconverted.
    Other(String),
}

/// Normalizes prices into the base currency (EUR).
///
/// USD prices are divided by the live EUR/USD cross quote. When that quote
/// is unavailable the last known rate is used instead, starting from the
/// configured fallback, so a sync run never fails on FX alone.
pub struct CurrencyConverter {
    provider: Arc<dyn QuoteProvider>,
    base_currency: String,
    fx_symbol: String,
    /// EUR per USD applied when the live quote is missing.
    fallback_rate: RwLock<Decimal>,
}

impl CurrencyConverter {
    pub fn new(provider: Arc<dyn QuoteProvider>, settings: &Settings) -> Self {
        Self {
            provider,
            base_currency: settings.base_currency.trim().to_uppercase(),
            fx_symbol: settings.fx_symbol.clone(),
            fallback_rate: RwLock::new(settings.fx_fallback_rate),
        }
    }

    pub fn base_currency(&self) -> &str {
        &self.base_currency
    }

    /// Current EUR-per-USD fallback multiplier.
    pub fn fallback_rate(&self) -> Decimal {
        *self.fallback_rate.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Override the fallback multiplier. Non-positive rates are ignored.
    pub fn set_fallback_rate(&self, rate: Decimal) {
        if rate <= Decimal::ZERO {
            warn!("Ignoring non-positive FX fallback rate {rate}");
            return;
        }
        *self.fallback_rate.write().unwrap_or_else(|e| e.into_inner()) = rate;
    }

    /// Classify a currency code or symbol.
    pub fn classify(&self, hint: &str) -> PriceOrigin {
        let hint = hint.trim().to_uppercase();
        if hint.is_empty() {
            return PriceOrigin::Other(hint);
        }
        if hint == self.base_currency || EUROPEAN_SUFFIXES.iter().any(|s| hint.ends_with(s)) {
            return PriceOrigin::Base;
        }
        if USD_LEGS.contains(&hint.as_str()) {
            return PriceOrigin::Usd;
        }

        // Crypto pair, e.g. BTC-USD / ETH-EUR
        if let Some((_, leg)) = hint.rsplit_once('-') {
            return if leg == self.base_currency {
                PriceOrigin::Base
            } else if USD_LEGS.contains(&leg) {
                PriceOrigin::Usd
            } else {
                PriceOrigin::Other(hint.clone())
            };
        }

        if OTHER_CURRENCIES.contains(&hint.as_str()) {
            return PriceOrigin::Other(hint);
        }

        // Plain ticker without an exchange suffix: US listing
        if !hint.contains('.') && hint.len() <= 5 && hint.chars().all(|c| c.is_ascii_alphabetic()) {
            return PriceOrigin::Usd;
        }

        PriceOrigin::Other(hint)
    }

    /// Convert `amount` into the base currency. `hint` is a currency code
    /// ("USD") or, when the provider gave none, the instrument symbol.
    ///
    /// Fetches the cross quote for every USD amount; batch callers fetch it
    /// once with `usd_per_base` and use `convert` instead.
    pub async fn to_base(&self, amount: Decimal, hint: &str) -> Decimal {
        let usd_per_base = match self.classify(hint) {
            PriceOrigin::Usd => self.usd_per_base().await,
            _ => None,
        };
        self.convert(amount, hint, usd_per_base)
    }

    /// Convert with an already fetched USD-per-base rate. `None` means the
    /// live rate is unavailable and the fallback applies.
    pub fn convert(&self, amount: Decimal, hint: &str, usd_per_base: Option<Decimal>) -> Decimal {
        match self.classify(hint) {
            PriceOrigin::Base => amount,
            PriceOrigin::Usd => match usd_per_base.filter(|r| *r > Decimal::ZERO) {
                Some(rate) => (amount / rate).round_dp(CONVERTED_SCALE),
                None => {
                    let rate = self.fallback_rate();
                    warn!(
                        "{} quote unavailable, using fallback rate {rate} {} per USD",
                        self.fx_symbol, self.base_currency
                    );
                    (amount * rate).round_dp(CONVERTED_SCALE)
                }
            },
            PriceOrigin::Other(code) => {
                warn!(
                    "No conversion to {} defined for '{code}', keeping price as-is",
                    self.base_currency
                );
                amount
            }
        }
    }

    /// Provider symbol of the cross quote.
    pub fn fx_symbol(&self) -> &str {
        &self.fx_symbol
    }

    /// Fetch the live cross rate (USD per unit of base currency).
    pub async fn usd_per_base(&self) -> Option<Decimal> {
        let quote = self.provider.get_quote(&self.fx_symbol).await?;
        self.rate_from_quote(&quote)
    }

    /// Read the cross rate out of an already fetched quote and remember
    /// its inverse as the new fallback.
    pub fn rate_from_quote(&self, quote: &Quote) -> Option<Decimal> {
        let rate = Decimal::try_from(quote.current_price)
            .ok()
            .filter(|r| *r > Decimal::ZERO)?;
        debug!("{} cross rate: {rate}", self.fx_symbol);
        if let Some(refreshed) = Decimal::ONE.checked_div(rate) {
            *self.fallback_rate.write().unwrap_or_else(|e| e.into_inner()) = refreshed;
        }
        Some(rate)
    }
}
