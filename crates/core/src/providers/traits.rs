use async_trait::async_trait;

use crate::models::quote::{Quote, SearchResult};

/// Abstraction over a market-data source.
///
/// Implementations swallow their own failures: a quote that cannot be
/// fetched or parsed is `None`, a failed search is an empty list. The
/// sync pipeline, FX conversion and market-status checks all depend on
/// this trait only, so tests swap in a canned provider.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Human-readable name of this provider (for logs).
    fn name(&self) -> &str;

    /// Latest quote for `symbol`, or `None` when no usable data is available.
    async fn get_quote(&self, symbol: &str) -> Option<Quote>;

    /// Candidate symbols matching a free-text query, in provider order.
    async fn search_symbols(&self, query: &str) -> Vec<SearchResult>;
}
