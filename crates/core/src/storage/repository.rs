use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::investment::Investment;

/// Persistence collaborator for investments.
///
/// The host application owns the storage engine; this crate only needs
/// to read the active set and write back synced prices. Each call is an
/// independent operation, there is no cross-record transaction.
#[async_trait]
pub trait InvestmentRepository: Send + Sync {
    /// All investments of `user_id` with `is_active == true`.
    async fn get_active_investments_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Investment>, CoreError>;

    /// A single investment regardless of its active flag.
    async fn get_investment_by_id(&self, id: Uuid) -> Result<Option<Investment>, CoreError>;

    /// Overwrite a stored investment. Fails with `NotFound` for unknown ids.
    async fn update_investment(&self, investment: &Investment) -> Result<(), CoreError>;

    /// Store a new investment.
    async fn insert_investment(&self, investment: Investment) -> Result<(), CoreError>;
}
