//! User repository - persistence abstraction over user records.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::User;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
///
/// `update` carries the version the caller read; the repository must
/// fail `Conflict` when the stored version no longer matches, so the
/// services can retry against fresh reads.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user record
    async fn create(&self, user: User) -> AppResult<User>;

    /// Find user by ID
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find user by exact username (case-sensitive as stored)
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// List all users
    async fn list(&self) -> AppResult<Vec<User>>;

    /// Version-checked update; fails `Conflict` on a stale version
    async fn update(&self, user: User) -> AppResult<User>;

    /// Delete user by ID
    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

/// In-memory user store.
///
/// Row access is serialized behind a single `RwLock`, which makes each
/// operation atomic with respect to a single row - the only guarantee
/// the services rely on.
#[derive(Default)]
pub struct MemoryUserStore {
    rows: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserStore {
    async fn create(&self, user: User) -> AppResult<User> {
        let mut rows = self.rows.write().await;
        rows.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let rows = self.rows.read().await;
        Ok(rows.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let rows = self.rows.read().await;
        Ok(rows.values().find(|u| u.username == username).cloned())
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let rows = self.rows.read().await;
        Ok(rows.values().cloned().collect())
    }

    async fn update(&self, mut user: User) -> AppResult<User> {
        let mut rows = self.rows.write().await;
        let current = rows.get(&user.id).ok_or(AppError::NotFound)?;

        if current.version != user.version {
            return Err(AppError::conflict("User"));
        }

        user.version += 1;
        user.updated_at = Utc::now();
        rows.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut rows = self.rows.write().await;
        rows.remove(&id).ok_or(AppError::NotFound)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserRole;

    fn buyer(name: &str) -> User {
        User::new(name.into(), "hash".into(), UserRole::Buyer)
    }

    #[tokio::test]
    async fn test_stale_version_update_conflicts() {
        let store = MemoryUserStore::new();
        let user = store.create(buyer("alice")).await.unwrap();

        let mut first = user.clone();
        first.deposit = 100;
        let committed = store.update(first).await.unwrap();
        assert_eq!(committed.version, user.version + 1);

        // Second writer still holds the original version
        let mut second = user;
        second.deposit = 50;
        assert!(matches!(
            store.update(second).await.unwrap_err(),
            AppError::Conflict(_)
        ));
    }

    #[tokio::test]
    async fn test_find_by_username_is_case_sensitive() {
        let store = MemoryUserStore::new();
        store.create(buyer("Alice")).await.unwrap();

        assert!(store.find_by_username("Alice").await.unwrap().is_some());
        assert!(store.find_by_username("alice").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_missing_user_not_found() {
        let store = MemoryUserStore::new();
        assert!(matches!(
            store.delete(Uuid::new_v4()).await.unwrap_err(),
            AppError::NotFound
        ));
    }
}
