pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use models::{
    quote::{Quote, SearchResult},
    settings::Settings,
    statistics::{PortfolioOverview, PortfolioStatistics},
    sync::PriceUpdateResult,
};
use providers::{traits::QuoteProvider, yahoo_finance::YahooQuoteClient};
use rust_decimal::Decimal;
use services::{
    analytics_service::PortfolioAggregator,
    currency_service::CurrencyConverter,
    market_status_service::{MarketStatusMonitor, US_REFERENCE_SYMBOL},
    price_service::PriceSyncService,
    symbol_resolver::SymbolResolver,
};
use std::sync::Arc;
use storage::repository::InvestmentRepository;
use uuid::Uuid;

use errors::CoreError;

/// Main entry point for the Investment Tracker core library.
///
/// Wires the quote provider, currency conversion, price sync, statistics
/// and market-status services around a host-supplied repository. All
/// methods take `&self`; share the tracker behind an `Arc` to call it from
/// several tasks. Concurrent syncs for the same user are rejected, not queued.
#[must_use]
pub struct InvestmentTracker {
    settings: Settings,
    provider: Arc<dyn QuoteProvider>,
    converter: Arc<CurrencyConverter>,
    resolver: SymbolResolver,
    sync_service: PriceSyncService,
    aggregator: PortfolioAggregator,
    market_monitor: MarketStatusMonitor,
}

impl std::fmt::Debug for InvestmentTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvestmentTracker")
            .field("provider", &self.provider.name())
            .field("base_currency", &self.settings.base_currency)
            .field("fx_fallback_rate", &self.converter.fallback_rate())
            .field("request_delay", &self.sync_service.request_delay())
            .finish()
    }
}

impl InvestmentTracker {
    /// Create a tracker backed by the Yahoo Finance HTTP client.
    pub fn new(
        repository: Arc<dyn InvestmentRepository>,
        settings: Settings,
    ) -> Result<Self, CoreError> {
        settings.validate()?;
        let provider: Arc<dyn QuoteProvider> = Arc::new(YahooQuoteClient::new(&settings)?);
        Ok(Self::with_provider(repository, provider, settings))
    }

    /// Create a tracker on top of any quote provider.
    pub fn with_provider(
        repository: Arc<dyn InvestmentRepository>,
        provider: Arc<dyn QuoteProvider>,
        settings: Settings,
    ) -> Self {
        let converter = Arc::new(CurrencyConverter::new(provider.clone(), &settings));
        let sync_service = PriceSyncService::new(
            repository.clone(),
            provider.clone(),
            converter.clone(),
            &settings,
        );
        Self {
            aggregator: PortfolioAggregator::new(repository),
            market_monitor: MarketStatusMonitor::new(provider.clone()),
            resolver: SymbolResolver::new(),
            sync_service,
            converter,
            provider,
            settings,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    // ── Price Sync ──────────────────────────────────────────────────

    /// Refresh prices of all active investments of a user.
    pub async fn sync_all(&self, user_id: Uuid) -> PriceUpdateResult {
        self.sync_service.sync_all(user_id).await
    }

    /// Refresh the price of one investment. `false` when nothing was written.
    pub async fn sync_one(&self, investment_id: Uuid) -> bool {
        self.sync_service.sync_one(investment_id).await
    }

    /// Whether a sync for `user_id` is currently running.
    #[must_use]
    pub fn is_syncing(&self, user_id: Uuid) -> bool {
        self.sync_service.is_syncing(user_id)
    }

    // ── Statistics ──────────────────────────────────────────────────

    /// Cost, value, profit/loss and diversification of a user's portfolio.
    pub async fn portfolio_statistics(&self, user_id: Uuid) -> PortfolioStatistics {
        self.aggregator.stats(user_id).await
    }

    /// Statistics plus the current market status of the US reference index.
    pub async fn portfolio_overview(&self, user_id: Uuid) -> PortfolioOverview {
        let statistics = self.aggregator.stats(user_id).await;
        let market_open = self.market_monitor.is_open(US_REFERENCE_SYMBOL).await;
        PortfolioOverview {
            statistics,
            market_open,
        }
    }

    // ── Market Data ─────────────────────────────────────────────────

    /// Whether the market of `reference_symbol` is currently trading.
    pub async fn is_market_open(&self, reference_symbol: &str) -> bool {
        self.market_monitor.is_open(reference_symbol).await
    }

    /// Live quote for a symbol in its trading currency.
    pub async fn get_quote(&self, symbol: &str) -> Option<Quote> {
        self.provider.get_quote(symbol).await
    }

    /// Look up candidate symbols before creating an investment.
    pub async fn search_symbols(&self, query: &str) -> Vec<SearchResult> {
        self.provider.search_symbols(query).await
    }

    /// The ticker a sync would use for an investment named `name`.
    #[must_use]
    pub fn resolve_symbol(&self, name: &str) -> String {
        self.resolver.resolve(name)
    }

    // ── Currency ────────────────────────────────────────────────────

    /// Convert `amount` into the base currency (see `CurrencyConverter::to_base`).
    pub async fn to_base_currency(&self, amount: Decimal, hint: &str) -> Decimal {
        self.converter.to_base(amount, hint).await
    }

    /// Replace the FX fallback rate used while the cross quote is unavailable.
    pub fn set_fx_fallback_rate(&self, rate: Decimal) {
        self.converter.set_fallback_rate(rate);
    }

    #[must_use]
    pub fn fx_fallback_rate(&self) -> Decimal {
        self.converter.fallback_rate()
    }
}
