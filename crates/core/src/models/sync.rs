use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Price change applied to one investment during a sync run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceUpdate {
    pub investment_id: Uuid,
    pub name: String,
    pub symbol: String,
    pub old_price: Decimal,
    pub new_price: Decimal,
    pub change: Decimal,
    /// Zero when the old price was zero.
    pub change_percent: Decimal,
}

/// Why an investment was left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    NoSymbol,
    NoQuote,
    PersistenceFailed,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NoSymbol => write!(f, "No resolvable symbol"),
            SkipReason::NoQuote => write!(f, "No quote data"),
            SkipReason::PersistenceFailed => write!(f, "Failed to save price"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedInvestment {
    pub investment_id: Uuid,
    pub name: String,
    pub reason: SkipReason,
}

/// Outcome of one `sync_all` run. Lives only for the duration of the call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceUpdateResult {
    pub success: bool,
    pub updated_count: usize,
    pub message: String,
    pub updates: Vec<PriceUpdate>,
    #[serde(default)]
    pub skipped: Vec<SkippedInvestment>,
}

impl PriceUpdateResult {
    /// A run that did nothing, with the reason in `message`.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            updated_count: 0,
            message: message.into(),
            updates: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// Build the final report; `success` is true when at least one price was written.
    pub fn completed(
        total: usize,
        updates: Vec<PriceUpdate>,
        skipped: Vec<SkippedInvestment>,
    ) -> Self {
        let updated_count = updates.len();
        let message = if updated_count == 0 {
            format!("No investment prices were updated ({total} checked)")
        } else {
            format!("Updated {updated_count} of {total} investments")
        };
        Self {
            success: updated_count > 0,
            updated_count,
            message,
            updates,
            skipped,
        }
    }
}
