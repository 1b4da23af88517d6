use log::{debug, error};
use std::sync::Arc;
use uuid::Uuid;

use crate::models::statistics::PortfolioStatistics;
use crate::storage::repository::InvestmentRepository;

/// Computes portfolio statistics: cost basis, value, profit/loss,
/// best/worst performer and diversification by investment type.
///
/// Loads the active set and reduces it in application code with exact
/// decimal arithmetic; storage-side grouping is not relied upon.
pub struct PortfolioAggregator {
    repository: Arc<dyn InvestmentRepository>,
}

impl PortfolioAggregator {
    pub fn new(repository: Arc<dyn InvestmentRepository>) -> Self {
        Self { repository }
    }

    /// Statistics for `user_id`. Zeroed when the user has no active
    /// investments or the repository cannot be read.
    pub async fn stats(&self, user_id: Uuid) -> PortfolioStatistics {
        let investments = match self.repository.get_active_investments_by_user(user_id).await {
            Ok(investments) => investments,
            Err(e) => {
                error!("Failed to load investments for user {user_id}: {e}");
                return PortfolioStatistics::empty();
            }
        };

        let stats = PortfolioStatistics::from_investments(&investments);
        debug!(
            "Portfolio of user {user_id}: {} investments, value {}, P/L {}",
            stats.investment_count, stats.total_value, stats.profit_loss
        );
        stats
    }
}
