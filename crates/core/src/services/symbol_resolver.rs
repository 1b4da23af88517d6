use std::collections::HashSet;

use crate::models::investment::Investment;

/// Tickers accepted verbatim even when they don't look like a plain
/// US symbol (suffixes, dashes, longer names).
const KNOWN_SYMBOLS: &[&str] = &[
    "AAPL", "MSFT", "GOOGL", "GOOG", "AMZN", "META", "NVDA", "TSLA", "NFLX", "AMD",
    "INTC", "BRK-B", "JPM", "V", "MA", "SPY", "QQQ", "VOO", "VTI", "IWDA.AS",
    "VWCE.DE", "EUNL.DE", "SXR8.DE", "SAP.DE", "ASML.AS", "MC.PA", "BTC-USD",
    "ETH-USD", "SOL-USD", "ADA-USD", "XRP-USD", "DOGE-USD",
];

/// Longest free-text name still taken for a bare ticker.
const MAX_TICKER_LEN: usize = 5;

/// Which rule produced a resolved symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolSource {
    /// Taken from the last "(...)" group of the name.
    Parenthesized,
    /// Whole name matched the known-symbol list.
    KnownSymbol,
    /// Whole name is short and purely alphabetic.
    TickerShaped,
    /// None of the rules matched; the name is passed through as-is.
    BestEffort,
    /// Nothing to resolve.
    Empty,
}

/// Extracts a best-effort ticker from a free-text investment name.
///
/// Pure string logic, never fails. A short alphabetic name that is not
/// actually a ticker (e.g. "Gold") is still returned and may match an
/// unrelated instrument at the provider.
pub struct SymbolResolver;

impl SymbolResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolve `name` to a ticker. Empty input gives an empty string.
    pub fn resolve(&self, name: &str) -> String {
        self.resolve_with_source(name).0
    }

    /// Resolve `name` and report which rule matched.
    pub fn resolve_with_source(&self, name: &str) -> (String, SymbolSource) {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return (String::new(), SymbolSource::Empty);
        }

        if let Some(inner) = last_parenthesized(trimmed) {
            return (inner.trim().to_uppercase(), SymbolSource::Parenthesized);
        }

        let upper = trimmed.to_uppercase();
        if KNOWN_SYMBOLS.contains(&upper.as_str()) {
            return (upper, SymbolSource::KnownSymbol);
        }
        if upper.chars().count() <= MAX_TICKER_LEN && upper.chars().all(|c| c.is_alphabetic()) {
            return (upper, SymbolSource::TickerShaped);
        }
        (upper, SymbolSource::BestEffort)
    }

    /// True when `name` resolves through one of the explicit rules.
    pub fn is_confident(&self, name: &str) -> bool {
        matches!(
            self.resolve_with_source(name).1,
            SymbolSource::Parenthesized | SymbolSource::KnownSymbol | SymbolSource::TickerShaped
        )
    }

    /// Distinct non-empty symbols across `investments`, in first-seen order.
    pub fn unique_symbols(&self, investments: &[Investment]) -> Vec<String> {
        let mut seen = HashSet::new();
        investments
            .iter()
            .map(|inv| self.resolve(&inv.name))
            .filter(|symbol| !symbol.is_empty() && seen.insert(symbol.clone()))
            .collect()
    }
}

impl Default for SymbolResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Contents of the last closed "(...)" pair, if the name has one.
fn last_parenthesized(name: &str) -> Option<&str> {
    let close = name.rfind(')')?;
    let head = &name[..close];
    let open = head.rfind('(')?;
    Some(&head[open + 1..])
}
