use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::CoreError;

/// A tracked position owned by a user.
///
/// Created, edited and soft-deleted by the host application. The sync
/// pipeline only ever writes back `current_price` and `updated_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Investment {
    pub id: Uuid,

    /// Owner of the investment.
    pub user_id: Uuid,

    /// Free text, may embed the ticker as "Apple Inc. (AAPL)".
    pub name: String,

    /// Free-form category ("Stock", "ETF", "Crypto", ...). Drives diversification.
    pub investment_type: String,

    /// Units held (always positive)
    pub quantity: Decimal,

    /// Price per unit paid at purchase (always positive)
    pub purchase_price: Decimal,

    /// Last synced market price in the base currency, if any.
    #[serde(default)]
    pub current_price: Option<Decimal>,

    pub purchase_date: NaiveDate,

    /// Currency the purchase was recorded in.
    pub currency: String,

    /// Soft-delete flag. Inactive investments are never synced or aggregated.
    pub is_active: bool,

    #[serde(default)]
    pub broker: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Investment {
    /// Create a new active investment with no market price yet.
    pub fn new(
        user_id: Uuid,
        name: impl Into<String>,
        investment_type: impl Into<String>,
        quantity: Decimal,
        purchase_price: Decimal,
        purchase_date: NaiveDate,
        currency: impl Into<String>,
    ) -> Result<Self, CoreError> {
        if quantity <= Decimal::ZERO {
            return Err(CoreError::ValidationError(format!(
                "Quantity must be positive, got {quantity}"
            )));
        }
        if purchase_price <= Decimal::ZERO {
            return Err(CoreError::ValidationError(format!(
                "Purchase price must be positive, got {purchase_price}"
            )));
        }

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            name: name.into(),
            investment_type: investment_type.into(),
            quantity,
            purchase_price,
            current_price: None,
            purchase_date,
            currency: currency.into().to_uppercase(),
            is_active: true,
            broker: None,
            description: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Builder-style helper to attach a known market price.
    pub fn with_current_price(mut self, price: Decimal) -> Self {
        self.current_price = Some(price);
        self
    }

    /// Total paid: `quantity * purchase_price`.
    pub fn cost_basis(&self) -> Decimal {
        self.quantity * self.purchase_price
    }

    /// Market value, falling back to the purchase price when never synced.
    pub fn current_value(&self) -> Decimal {
        self.quantity * self.current_price.unwrap_or(self.purchase_price)
    }

    /// Price used as the "before" side of a sync delta.
    pub fn reference_price(&self) -> Decimal {
        self.current_price.unwrap_or(self.purchase_price)
    }

    /// Record a freshly synced price.
    pub fn apply_price(&mut self, price: Decimal, at: DateTime<Utc>) {
        self.current_price = Some(price);
        self.updated_at = at;
    }
}
