use async_trait::async_trait;
use std::sync::RwLock;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::investment::Investment;
use super::repository::InvestmentRepository;

/// `InvestmentRepository` kept entirely in memory.
///
/// Suitable for embedding and tests. Insertion order is preserved so
/// sync reports list investments the way they were added.
#[derive(Default)]
pub struct InMemoryInvestmentRepository {
    investments: RwLock<Vec<Investment>>,
}

impl InMemoryInvestmentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a repository with existing records.
    pub fn with_investments(investments: Vec<Investment>) -> Self {
        Self {
            investments: RwLock::new(investments),
        }
    }

    /// Snapshot of every stored investment, active or not.
    pub fn all(&self) -> Vec<Investment> {
        self.investments
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl InvestmentRepository for InMemoryInvestmentRepository {
    async fn get_active_investments_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Investment>, CoreError> {
        let investments = self.investments.read().unwrap_or_else(|e| e.into_inner());
        Ok(investments
            .iter()
            .filter(|i| i.user_id == user_id && i.is_active)
            .cloned()
            .collect())
    }

    async fn get_investment_by_id(&self, id: Uuid) -> Result<Option<Investment>, CoreError> {
        let investments = self.investments.read().unwrap_or_else(|e| e.into_inner());
        Ok(investments.iter().find(|i| i.id == id).cloned())
    }

    async fn update_investment(&self, investment: &Investment) -> Result<(), CoreError> {
        let mut investments = self.investments.write().unwrap_or_else(|e| e.into_inner());
        let slot = investments
            .iter_mut()
            .find(|i| i.id == investment.id)
            .ok_or_else(|| CoreError::NotFound(investment.id.to_string()))?;
        *slot = investment.clone();
        Ok(())
    }

    async fn insert_investment(&self, investment: Investment) -> Result<(), CoreError> {
        let mut investments = self.investments.write().unwrap_or_else(|e| e.into_inner());
        if investments.iter().any(|i| i.id == investment.id) {
            return Err(CoreError::ValidationError(format!(
                "Investment {} already exists",
                investment.id
            )));
        }
        investments.push(investment);
        Ok(())
    }
}
