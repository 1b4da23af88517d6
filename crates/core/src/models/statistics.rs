use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::investment::Investment;

/// Portfolio-level figures for one user's active investments.
///
/// All monetary values are in the base currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioStatistics {
    /// Number of active investments aggregated
    pub investment_count: usize,

    /// Σ quantity × purchase price
    pub total_cost: Decimal,

    /// Σ quantity × current price (unsynced investments count as zero)
    pub total_value: Decimal,

    /// total_value − total_cost
    pub profit_loss: Decimal,

    /// profit_loss / total_cost × 100, or zero when nothing was invested
    pub profit_loss_percent: Decimal,

    pub best_performer: Option<PerformerSummary>,
    pub worst_performer: Option<PerformerSummary>,

    /// Investment type → percent of total_value
    pub diversification: BTreeMap<String, Decimal>,
}

/// One investment's return, used for best/worst performer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformerSummary {
    pub investment_id: Uuid,
    pub name: String,
    pub profit_loss_percent: Decimal,
}

impl Default for PortfolioStatistics {
    fn default() -> Self {
        Self {
            investment_count: 0,
            total_cost: Decimal::ZERO,
            total_value: Decimal::ZERO,
            profit_loss: Decimal::ZERO,
            profit_loss_percent: Decimal::ZERO,
            best_performer: None,
            worst_performer: None,
            diversification: BTreeMap::new(),
        }
    }
}

impl PortfolioStatistics {
    /// Zeroed statistics for a user with nothing to aggregate.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Reduce a set of investments in memory. Inactive entries are ignored.
    pub fn from_investments(investments: &[Investment]) -> Self {
        let active: Vec<&Investment> = investments.iter().filter(|i| i.is_active).collect();
        if active.is_empty() {
            return Self::empty();
        }

        let mut total_cost = Decimal::ZERO;
        let mut total_value = Decimal::ZERO;
        let mut value_by_type: BTreeMap<String, Decimal> = BTreeMap::new();
        let mut best: Option<PerformerSummary> = None;
        let mut worst: Option<PerformerSummary> = None;

        for inv in &active {
            let cost = inv.cost_basis();
            let value = inv.quantity * inv.current_price.unwrap_or(Decimal::ZERO);
            total_cost += cost;
            total_value += value;
            *value_by_type.entry(inv.investment_type.clone()).or_default() += value;

            // Never-synced positions have no return to rank.
            if inv.current_price.is_none() {
                continue;
            }
            let summary = PerformerSummary {
                investment_id: inv.id,
                name: inv.name.clone(),
                profit_loss_percent: percent_of(value - cost, cost),
            };
            if best
                .as_ref()
                .map_or(true, |b| summary.profit_loss_percent > b.profit_loss_percent)
            {
                best = Some(summary.clone());
            }
            if worst
                .as_ref()
                .map_or(true, |w| summary.profit_loss_percent < w.profit_loss_percent)
            {
                worst = Some(summary);
            }
        }

        let profit_loss = total_value - total_cost;
        let diversification = value_by_type
            .into_iter()
            .map(|(kind, value)| (kind, percent_of(value, total_value)))
            .collect();

        Self {
            investment_count: active.len(),
            total_cost,
            total_value,
            profit_loss,
            profit_loss_percent: percent_of(profit_loss, total_cost),
            best_performer: best,
            worst_performer: worst,
            diversification,
        }
    }
}

/// `part / whole × 100`, zero when `whole` is not positive.
pub(crate) fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    part.checked_div(whole)
        .map(|ratio| ratio * Decimal::ONE_HUNDRED)
        .unwrap_or(Decimal::ZERO)
}

/// Dashboard view: statistics plus whether the reference market trades now.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioOverview {
    pub statistics: PortfolioStatistics,
    pub market_open: bool,
}
