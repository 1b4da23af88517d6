use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::Deserialize;
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::quote::{Quote, SearchResult};
use crate::models::settings::Settings;
use super::http::{JsonFetcher, ReqwestFetcher};
use super::traits::QuoteProvider;

const PROVIDER: &str = "Yahoo Finance";

/// Yahoo Finance quote client.
///
/// - **Free**: No API key required.
/// - **Rate limits**: informal; callers space out requests themselves.
/// - **Endpoints**: `v8/finance/chart/{symbol}` on two mirrors, `v1/finance/search`.
///
/// A quote request goes to the primary chart host first. Any failure
/// (transport, non-2xx, provider error object, missing price fields)
/// triggers exactly one retry against the secondary host. Only when both
/// fail does the client report "no data". Prices come back in the
/// instrument's trading currency; conversion is the caller's concern.
pub struct YahooQuoteClient<F = ReqwestFetcher> {
    fetcher: F,
    primary_url: String,
    secondary_url: String,
    search_url: String,
    max_search_results: usize,
}

impl YahooQuoteClient<ReqwestFetcher> {
    pub fn new(settings: &Settings) -> Result<Self, CoreError> {
        let fetcher = ReqwestFetcher::new(Duration::from_secs(settings.request_timeout_secs))?;
        Ok(Self::with_fetcher(fetcher, settings))
    }
}

impl<F: JsonFetcher> YahooQuoteClient<F> {
    /// Build a client on top of an arbitrary transport.
    pub fn with_fetcher(fetcher: F, settings: &Settings) -> Self {
        Self {
            fetcher,
            primary_url: settings.primary_quote_url.trim_end_matches('/').to_string(),
            secondary_url: settings.secondary_quote_url.trim_end_matches('/').to_string(),
            search_url: settings.search_url.clone(),
            max_search_results: settings.max_search_results,
        }
    }

    /// Underlying transport.
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    fn search_request_url(&self, query: &str) -> String {
        format!(
            "{}?q={}&quotesCount={}&newsCount=0",
            self.search_url,
            urlencoding::encode(query),
            self.max_search_results
        )
    }

    async fn fetch_quote_from(&self, base: &str, symbol: &str) -> Result<Quote, CoreError> {
        let body = self.fetcher.get_json(&chart_url(base, symbol)).await?;
        parse_chart_response(symbol, body)
    }
}

/// Chart URL for `symbol` on the given host.
pub fn chart_url(base: &str, symbol: &str) -> String {
    format!("{base}/{}?interval=1d&range=1d", urlencoding::encode(symbol))
}

// ── Yahoo API response types ────────────────────────────────────────

#[derive(Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct ChartResult {
    meta: ChartMeta,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    regular_market_price: Option<f64>,
    previous_close: Option<f64>,
    chart_previous_close: Option<f64>,
    currency: Option<String>,
    symbol: Option<String>,
    market_state: Option<String>,
    long_name: Option<String>,
    regular_market_time: Option<i64>,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    quotes: Vec<SearchQuote>,
}

#[derive(Deserialize)]
struct SearchQuote {
    symbol: Option<String>,
    shortname: Option<String>,
    longname: Option<String>,
    #[serde(rename = "quoteType")]
    quote_type: Option<String>,
    exchange: Option<String>,
}

/// Turn a chart payload into a `Quote`.
///
/// `regularMarketPrice` and a previous close (`previousClose`, or
/// `chartPreviousClose` when the former is absent) are required.
pub fn parse_chart_response(symbol: &str, body: serde_json::Value) -> Result<Quote, CoreError> {
    let resp: ChartResponse = serde_json::from_value(body)?;

    if let Some(error) = resp.chart.error.filter(|e| !e.is_null()) {
        let description = error
            .get("description")
            .and_then(|d| d.as_str())
            .unwrap_or("no description");
        return Err(CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("Provider error for {symbol}: {description}"),
        });
    }

    let meta = resp
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .map(|r| r.meta)
        .ok_or_else(|| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("Empty chart result for {symbol}"),
        })?;

    let current_price = meta
        .regular_market_price
        .filter(|p| p.is_finite() && *p > 0.0)
        .ok_or_else(|| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("Missing regularMarketPrice for {symbol}"),
        })?;

    let previous_close = meta
        .previous_close
        .or(meta.chart_previous_close)
        .filter(|p| p.is_finite())
        .ok_or_else(|| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("Missing previousClose for {symbol}"),
        })?;

    let timestamp = meta
        .regular_market_time
        .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
        .unwrap_or_else(Utc::now);

    Ok(Quote {
        symbol: meta.symbol.unwrap_or_else(|| symbol.to_string()),
        current_price,
        previous_close,
        currency: meta.currency.map(|c| c.to_uppercase()),
        market_state: meta.market_state,
        long_name: meta.long_name,
        timestamp,
    })
}

/// Turn a search payload into at most `limit` results.
///
/// Symbols with a `^` anywhere but the first position are index-like
/// derivatives of another listing and are dropped.
pub fn parse_search_response(
    body: serde_json::Value,
    limit: usize,
) -> Result<Vec<SearchResult>, CoreError> {
    let resp: SearchResponse = serde_json::from_value(body)?;

    let results = resp
        .quotes
        .into_iter()
        .filter_map(|q| {
            let symbol = q.symbol?;
            if symbol.is_empty() || symbol.find('^').is_some_and(|idx| idx > 0) {
                return None;
            }
            Some(SearchResult {
                symbol,
                short_name: q.shortname,
                long_name: q.longname,
                asset_type: q.quote_type,
                exchange: q.exchange,
            })
        })
        .take(limit)
        .collect();

    Ok(results)
}

#[async_trait]
impl<F: JsonFetcher> QuoteProvider for YahooQuoteClient<F> {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn get_quote(&self, symbol: &str) -> Option<Quote> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return None;
        }

        match self.fetch_quote_from(&self.primary_url, symbol).await {
            Ok(quote) => return Some(quote),
            Err(e) => warn!("Primary quote endpoint failed for {symbol}: {e}; trying mirror"),
        }

        match self.fetch_quote_from(&self.secondary_url, symbol).await {
            Ok(quote) => Some(quote),
            Err(e) => {
                warn!("No quote available for {symbol}: {e}");
                None
            }
        }
    }

    async fn search_symbols(&self, query: &str) -> Vec<SearchResult> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        let result = self
            .fetcher
            .get_json(&self.search_request_url(query))
            .await
            .and_then(|body| parse_search_response(body, self.max_search_results));

        match result {
            Ok(results) => {
                debug!("Symbol search for '{query}' returned {} results", results.len());
                results
            }
            Err(e) => {
                warn!("Symbol search failed for '{query}': {e}");
                Vec::new()
            }
        }
    }
}
