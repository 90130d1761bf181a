//! Product service - catalog management and the purchase engine.
//!
//! The purchase workflow commits through version-checked repository
//! updates. A lost race is retried internally against fresh reads, and a
//! deposit-commit failure after the inventory commit restocks the
//! inventory first, so a failed purchase never leaves partial mutations.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::config::MAX_COMMIT_RETRIES;
use crate::domain::{CoinSet, Product, Receipt, UpdateProduct};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{ProductRepository, UserRepository};

/// Product service trait for dependency injection.
#[async_trait]
pub trait ProductService: Send + Sync {
    /// Create a product owned by the calling seller
    async fn create_product(
        &self,
        seller_id: Uuid,
        product_name: &str,
        cost: i64,
        amount_available: i64,
    ) -> AppResult<Product>;

    /// Get product by ID
    async fn get_product(&self, id: Uuid) -> AppResult<Product>;

    /// List all products
    async fn list_products(&self) -> AppResult<Vec<Product>>;

    /// Update a product; owning seller only
    async fn update_product(&self, caller_id: Uuid, id: Uuid, patch: UpdateProduct)
        -> AppResult<Product>;

    /// Delete a product; owning seller only
    async fn delete_product(&self, caller_id: Uuid, id: Uuid) -> AppResult<()>;

    /// Buy `amount` units against the buyer's deposited balance
    async fn buy_product(&self, buyer_id: Uuid, product_id: Uuid, amount: i64) -> AppResult<Receipt>;
}

/// Concrete implementation of ProductService.
pub struct ProductEngine {
    products: Arc<dyn ProductRepository>,
    users: Arc<dyn UserRepository>,
    coins: CoinSet,
}

impl ProductEngine {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        users: Arc<dyn UserRepository>,
        coins: CoinSet,
    ) -> Self {
        Self {
            products,
            users,
            coins,
        }
    }

    fn check_cost(&self, cost: i64) -> AppResult<()> {
        if !self.coins.is_cost_aligned(cost) {
            return Err(AppError::validation(format!(
                "cost should be rounded to {}",
                self.coins.smallest()
            )));
        }
        Ok(())
    }

    async fn check_name_free(&self, product_name: &str, exclude: Option<Uuid>) -> AppResult<()> {
        if let Some(existing) = self.products.find_by_name(product_name).await? {
            if Some(existing.id) != exclude {
                return Err(AppError::bad_request("Product name already taken"));
            }
        }
        Ok(())
    }

    /// Undo an inventory decrement after the deposit commit failed.
    async fn restock(&self, product_id: Uuid, amount: i64) {
        for _ in 0..MAX_COMMIT_RETRIES {
            let fresh = match self.products.find_by_id(product_id).await {
                Ok(Some(p)) => p,
                Ok(None) => break,
                Err(_) => continue,
            };
            let mut restored = fresh;
            restored.amount_available += amount;
            match self.products.update(restored).await {
                Ok(_) => return,
                Err(AppError::Conflict(_)) => continue,
                Err(_) => break,
            }
        }
        tracing::warn!(product_id = %product_id, amount, "failed to restock after aborted purchase");
    }
}

#[async_trait]
impl ProductService for ProductEngine {
    async fn create_product(
        &self,
        seller_id: Uuid,
        product_name: &str,
        cost: i64,
        amount_available: i64,
    ) -> AppResult<Product> {
        let seller = self.users.find_by_id(seller_id).await?.ok_or_not_found()?;
        if !seller.role.is_seller() {
            return Err(AppError::Forbidden);
        }

        self.check_cost(cost)?;
        if amount_available < 0 {
            return Err(AppError::validation("amountAvailable must not be negative"));
        }
        // Name collisions are global, not per-seller.
        self.check_name_free(product_name, None).await?;

        self.products
            .create(Product::new(
                product_name.to_string(),
                cost,
                amount_available,
                seller_id,
            ))
            .await
    }

    async fn get_product(&self, id: Uuid) -> AppResult<Product> {
        self.products.find_by_id(id).await?.ok_or_not_found()
    }

    async fn list_products(&self) -> AppResult<Vec<Product>> {
        self.products.list().await
    }

    async fn update_product(
        &self,
        caller_id: Uuid,
        id: Uuid,
        patch: UpdateProduct,
    ) -> AppResult<Product> {
        let mut product = self.products.find_by_id(id).await?.ok_or_not_found()?;
        if !product.is_owned_by(caller_id) {
            return Err(AppError::Forbidden);
        }

        if let Some(product_name) = patch.product_name {
            if product_name != product.product_name {
                self.check_name_free(&product_name, Some(id)).await?;
            }
            product.product_name = product_name;
        }
        if let Some(cost) = patch.cost {
            self.check_cost(cost)?;
            product.cost = cost;
        }
        if let Some(amount_available) = patch.amount_available {
            if amount_available < 0 {
                return Err(AppError::validation("amountAvailable must not be negative"));
            }
            product.amount_available = amount_available;
        }

        self.products.update(product).await
    }

    async fn delete_product(&self, caller_id: Uuid, id: Uuid) -> AppResult<()> {
        let product = self.products.find_by_id(id).await?.ok_or_not_found()?;
        if !product.is_owned_by(caller_id) {
            return Err(AppError::Forbidden);
        }
        self.products.delete(id).await
    }

    async fn buy_product(&self, buyer_id: Uuid, product_id: Uuid, amount: i64) -> AppResult<Receipt> {
        if amount < 1 {
            return Err(AppError::validation("amount must be at least 1"));
        }

        for _ in 0..MAX_COMMIT_RETRIES {
            // Fresh reads on every attempt.
            let product = self
                .products
                .find_by_id(product_id)
                .await?
                .ok_or_not_found()?;
            let buyer = self.users.find_by_id(buyer_id).await?.ok_or_not_found()?;
            if !buyer.role.is_buyer() {
                return Err(AppError::Forbidden);
            }

            if product.amount_available < amount {
                return Err(AppError::bad_request("Not enough amount available"));
            }

            let total = amount
                .checked_mul(product.cost)
                .ok_or_else(|| AppError::validation("purchase total overflows"))?;
            if buyer.deposit < total {
                return Err(AppError::bad_request("Not enough deposit"));
            }

            // Inventory commits first; its version check is what stops
            // two concurrent buyers from both passing the availability
            // check against a stale amount.
            let mut decremented = product;
            decremented.amount_available -= amount;
            let product = match self.products.update(decremented).await {
                Ok(p) => p,
                Err(AppError::Conflict(_)) => continue,
                Err(e) => return Err(e),
            };

            let mut debited = buyer;
            debited.deposit -= total;
            match self.users.update(debited).await {
                Ok(buyer) => {
                    // The machine returns the whole outstanding balance
                    // as coins after every purchase.
                    let change = self.coins.decompose_change(buyer.deposit)?;
                    return Ok(Receipt {
                        total,
                        product,
                        change,
                    });
                }
                Err(AppError::Conflict(_)) => {
                    self.restock(product_id, amount).await;
                    continue;
                }
                Err(e) => {
                    self.restock(product_id, amount).await;
                    return Err(e);
                }
            }
        }

        tracing::warn!(product_id = %product_id, buyer_id = %buyer_id, "purchase retries exhausted");
        Err(AppError::conflict("Product"))
    }
}
