//! Product domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Product domain entity
///
/// `amount_available` never goes negative and `cost` is always aligned
/// to the smallest coin denomination; both invariants are enforced by
/// the product service before any write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub product_name: String,
    /// Price per unit in minor currency units.
    pub cost: i64,
    pub amount_available: i64,
    /// Owning seller; immutable after creation.
    pub seller_id: Uuid,
    /// Optimistic-concurrency guard; bumped by the repository on every
    /// committed update.
    #[serde(skip_serializing)]
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Create a new product owned by `seller_id`.
    pub fn new(product_name: String, cost: i64, amount_available: i64, seller_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            product_name,
            cost,
            amount_available,
            seller_id,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check whether `seller_id` owns this product.
    pub fn is_owned_by(&self, seller_id: Uuid) -> bool {
        self.seller_id == seller_id
    }
}

/// Fields a seller may change on an existing product.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProduct {
    pub product_name: Option<String>,
    pub cost: Option<i64>,
    pub amount_available: Option<i64>,
}

/// Result of a successful purchase.
#[derive(Debug, Clone, Serialize)]
pub struct Receipt {
    /// Amount charged for this purchase.
    pub total: i64,
    /// Product state after the inventory decrement.
    pub product: Product,
    /// The buyer's remaining deposit decomposed into coins, one count
    /// per denomination in ascending order.
    pub change: Vec<i64>,
}
