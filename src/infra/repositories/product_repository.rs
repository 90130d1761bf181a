//! Product repository - persistence abstraction over product records.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::Product;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Product repository trait for dependency injection.
///
/// Same optimistic-concurrency contract as the user repository: `update`
/// fails `Conflict` when the stored version has moved past the one the
/// caller read.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Insert a new product record
    async fn create(&self, product: Product) -> AppResult<Product>;

    /// Find product by ID
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Product>>;

    /// Find product by its globally unique name
    async fn find_by_name(&self, product_name: &str) -> AppResult<Option<Product>>;

    /// List all products
    async fn list(&self) -> AppResult<Vec<Product>>;

    /// Version-checked update; fails `Conflict` on a stale version
    async fn update(&self, product: Product) -> AppResult<Product>;

    /// Delete product by ID
    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

/// In-memory product store with per-row atomicity.
#[derive(Default)]
pub struct MemoryProductStore {
    rows: RwLock<HashMap<Uuid, Product>>,
}

impl MemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for MemoryProductStore {
    async fn create(&self, product: Product) -> AppResult<Product> {
        let mut rows = self.rows.write().await;
        rows.insert(product.id, product.clone());
        Ok(product)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Product>> {
        let rows = self.rows.read().await;
        Ok(rows.get(&id).cloned())
    }

    async fn find_by_name(&self, product_name: &str) -> AppResult<Option<Product>> {
        let rows = self.rows.read().await;
        Ok(rows
            .values()
            .find(|p| p.product_name == product_name)
            .cloned())
    }

    async fn list(&self) -> AppResult<Vec<Product>> {
        let rows = self.rows.read().await;
        Ok(rows.values().cloned().collect())
    }

    async fn update(&self, mut product: Product) -> AppResult<Product> {
        let mut rows = self.rows.write().await;
        let current = rows.get(&product.id).ok_or(AppError::NotFound)?;

        if current.version != product.version {
            return Err(AppError::conflict("Product"));
        }

        product.version += 1;
        product.updated_at = Utc::now();
        rows.insert(product.id, product.clone());
        Ok(product)
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut rows = self.rows.write().await;
        rows.remove(&id).ok_or(AppError::NotFound)?;
        Ok(())
    }
}
