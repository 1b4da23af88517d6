use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::investment::Investment;
use crate::models::quote::Quote;
use crate::models::settings::Settings;
use crate::models::statistics::percent_of;
use crate::models::sync::{PriceUpdate, PriceUpdateResult, SkipReason, SkippedInvestment};
use crate::providers::traits::QuoteProvider;
use crate::storage::repository::InvestmentRepository;
use super::currency_service::{CurrencyConverter, PriceOrigin};
use super::single_flight::SingleFlight;
use super::symbol_resolver::SymbolResolver;

/// Decimal places kept on the reported percentage change.
const CHANGE_PERCENT_SCALE: u32 = 4;

/// Synchronizes stored investment prices with live quotes.
///
/// Pipeline per run: load active investments → resolve symbols → fetch
/// each unique symbol once, sequentially, pausing `request_delay` between
/// requests → fetch the EUR/USD cross rate once if any quote is in USD →
/// convert to the base currency → persist → report deltas.
///
/// Failures are per item. An investment without a symbol or quote is
/// skipped; a failed write skips that one investment and the run goes on.
/// Updates written before a crash stay written, there is no batch
/// transaction. Only one run per user may be in flight at a time.
pub struct PriceSyncService {
    repository: Arc<dyn InvestmentRepository>,
    provider: Arc<dyn QuoteProvider>,
    converter: Arc<CurrencyConverter>,
    resolver: SymbolResolver,
    request_delay: Duration,
    in_flight: SingleFlight,
}

impl PriceSyncService {
    pub fn new(
        repository: Arc<dyn InvestmentRepository>,
        provider: Arc<dyn QuoteProvider>,
        converter: Arc<CurrencyConverter>,
        settings: &Settings,
    ) -> Self {
        Self {
            repository,
            provider,
            converter,
            resolver: SymbolResolver::new(),
            request_delay: Duration::from_millis(settings.request_delay_ms),
            in_flight: SingleFlight::new(),
        }
    }

    /// Pause inserted between two quote requests of the same run.
    pub fn request_delay(&self) -> Duration {
        self.request_delay
    }

    /// True while a sync for `user_id` is running.
    pub fn is_syncing(&self, user_id: Uuid) -> bool {
        self.in_flight.is_in_flight(user_id)
    }

    /// Refresh prices of every active investment of `user_id`.
    ///
    /// Never returns an error: anything unexpected is logged and reported
    /// as `success == false` with the reason in `message`.
    pub async fn sync_all(&self, user_id: Uuid) -> PriceUpdateResult {
        let Some(_permit) = self.in_flight.try_acquire(user_id) else {
            warn!("Price sync for user {user_id} rejected: already running");
            return PriceUpdateResult::failed(
                CoreError::SyncInProgress(user_id.to_string()).to_string(),
            );
        };

        match self.run_sync(user_id).await {
            Ok(result) => {
                info!("Price sync for user {user_id} finished: {}", result.message);
                result
            }
            Err(e) => {
                error!("Price sync for user {user_id} failed: {e}");
                PriceUpdateResult::failed(format!("Price sync failed: {e}"))
            }
        }
    }

    /// Refresh the price of a single investment. `false` when the
    /// investment is unknown or inactive, has no symbol or quote, or the
    /// write fails.
    pub async fn sync_one(&self, investment_id: Uuid) -> bool {
        let investment = match self.repository.get_investment_by_id(investment_id).await {
            Ok(Some(investment)) if investment.is_active => investment,
            Ok(Some(_)) => {
                debug!("Investment {investment_id} is inactive, not syncing");
                return false;
            }
            Ok(None) => {
                warn!("Investment {investment_id} not found");
                return false;
            }
            Err(e) => {
                error!("Failed to load investment {investment_id}: {e}");
                return false;
            }
        };

        let Some(_permit) = self.in_flight.try_acquire(investment.user_id) else {
            warn!(
                "Price sync for investment {investment_id} rejected: user {} already syncing",
                investment.user_id
            );
            return false;
        };

        let symbol = self.resolver.resolve(&investment.name);
        if symbol.is_empty() {
            debug!("No symbol for investment '{}'", investment.name);
            return false;
        }

        let Some(quote) = self.provider.get_quote(&symbol).await else {
            return false;
        };

        let usd_per_base = if self.needs_cross_rate(&symbol, &quote) {
            self.pause().await;
            self.converter.usd_per_base().await
        } else {
            None
        };

        self.apply_quote(investment, &symbol, &quote, usd_per_base, Utc::now())
            .await
            .is_ok()
    }

    async fn run_sync(&self, user_id: Uuid) -> Result<PriceUpdateResult, CoreError> {
        let investments = self
            .repository
            .get_active_investments_by_user(user_id)
            .await?;
        if investments.is_empty() {
            info!("No active investments for user {user_id}");
            return Ok(PriceUpdateResult::failed("No active investments found"));
        }

        let symbols = self.resolver.unique_symbols(&investments);
        if symbols.is_empty() {
            info!("None of {} investments has a resolvable symbol", investments.len());
            return Ok(PriceUpdateResult::failed("No valid symbols found"));
        }

        info!(
            "Syncing {} investments ({} unique symbols) for user {user_id}",
            investments.len(),
            symbols.len()
        );
        let quotes = self.fetch_quotes(&symbols).await;
        let usd_per_base = self.cross_rate_for(&quotes).await;

        let total = investments.len();
        let now = Utc::now();
        let mut updates = Vec::new();
        let mut skipped = Vec::new();

        for investment in investments {
            let symbol = self.resolver.resolve(&investment.name);
            let outcome = if symbol.is_empty() {
                Err(SkipReason::NoSymbol)
            } else if let Some(quote) = quotes.get(&symbol) {
                self.apply_quote(investment.clone(), &symbol, quote, usd_per_base, now)
                    .await
            } else {
                Err(SkipReason::NoQuote)
            };

            match outcome {
                Ok(update) => updates.push(update),
                Err(reason) => {
                    debug!("Skipping '{}': {reason}", investment.name);
                    skipped.push(SkippedInvestment {
                        investment_id: investment.id,
                        name: investment.name,
                        reason,
                    });
                }
            }
        }

        Ok(PriceUpdateResult::completed(total, updates, skipped))
    }

    /// One request per symbol, strictly in sequence.
    async fn fetch_quotes(&self, symbols: &[String]) -> HashMap<String, Quote> {
        let mut quotes = HashMap::with_capacity(symbols.len());
        for (idx, symbol) in symbols.iter().enumerate() {
            if idx > 0 {
                self.pause().await;
            }
            match self.provider.get_quote(symbol).await {
                Some(quote) => {
                    quotes.insert(symbol.clone(), quote);
                }
                None => debug!("No quote for {symbol}"),
            }
        }
        quotes
    }

    /// Cross rate for the run, fetched at most once and only when some
    /// quote is USD-denominated. Reuses the cross quote if it was synced
    /// as a symbol of its own.
    async fn cross_rate_for(&self, quotes: &HashMap<String, Quote>) -> Option<Decimal> {
        if !quotes
            .iter()
            .any(|(symbol, quote)| self.needs_cross_rate(symbol, quote))
        {
            return None;
        }
        if let Some(fx_quote) = quotes.get(self.converter.fx_symbol()) {
            return self.converter.rate_from_quote(fx_quote);
        }
        self.pause().await;
        self.converter.usd_per_base().await
    }

    fn needs_cross_rate(&self, symbol: &str, quote: &Quote) -> bool {
        self.converter.classify(conversion_hint(symbol, quote)) == PriceOrigin::Usd
    }

    /// Gap between two provider requests of the same run.
    async fn pause(&self) {
        if !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }
    }

    /// Convert, persist and describe one price change.
    async fn apply_quote(
        &self,
        mut investment: Investment,
        symbol: &str,
        quote: &Quote,
        usd_per_base: Option<Decimal>,
        now: DateTime<Utc>,
    ) -> Result<PriceUpdate, SkipReason> {
        let raw_price = Decimal::try_from(quote.current_price).map_err(|e| {
            warn!("Unusable price {} for {symbol}: {e}", quote.current_price);
            SkipReason::NoQuote
        })?;
        let new_price = self
            .converter
            .convert(raw_price, conversion_hint(symbol, quote), usd_per_base);

        let old_price = investment.reference_price();
        investment.apply_price(new_price, now);

        if let Err(e) = self.repository.update_investment(&investment).await {
            error!("Failed to save price for '{}': {e}", investment.name);
            return Err(SkipReason::PersistenceFailed);
        }

        let change = new_price - old_price;
        Ok(PriceUpdate {
            investment_id: investment.id,
            name: investment.name,
            symbol: symbol.to_string(),
            old_price,
            new_price,
            change,
            change_percent: percent_of(change, old_price).round_dp(CHANGE_PERCENT_SCALE),
        })
    }
}

/// Currency reported with the quote, else the symbol itself.
fn conversion_hint<'a>(symbol: &'a str, quote: &'a Quote) -> &'a str {
    quote.currency.as_deref().unwrap_or(symbol)
}
