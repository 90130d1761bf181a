//! Session store - persistence abstraction over issued refresh tokens.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::Session;
use crate::errors::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Session store trait consumed by the token service.
///
/// Every operation is atomic with respect to a single session row; no
/// cross-row transaction is required. `delete_by_value` returns the
/// removed row, which makes it the serialization point for refresh
/// rotation: of two racing consumers, exactly one observes the session.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist a session keyed by its raw token value
    async fn save(&self, session: Session) -> AppResult<Session>;

    /// Find session by raw token value
    async fn find_by_value(&self, value: &str) -> AppResult<Option<Session>>;

    /// All sessions owned by a user
    async fn find_all_for_user(&self, user_id: Uuid) -> AppResult<Vec<Session>>;

    /// Atomically remove and return the session for a token value
    async fn delete_by_value(&self, value: &str) -> AppResult<Option<Session>>;

    /// Remove every session owned by a user; returns how many were removed
    async fn delete_all_for_user(&self, user_id: Uuid) -> AppResult<u64>;
}

/// In-memory session store keyed by raw token value.
#[derive(Default)]
pub struct MemorySessionStore {
    rows: RwLock<HashMap<String, Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn save(&self, session: Session) -> AppResult<Session> {
        let mut rows = self.rows.write().await;
        rows.insert(session.value.clone(), session.clone());
        Ok(session)
    }

    async fn find_by_value(&self, value: &str) -> AppResult<Option<Session>> {
        let rows = self.rows.read().await;
        Ok(rows.get(value).cloned())
    }

    async fn find_all_for_user(&self, user_id: Uuid) -> AppResult<Vec<Session>> {
        let rows = self.rows.read().await;
        Ok(rows
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn delete_by_value(&self, value: &str) -> AppResult<Option<Session>> {
        let mut rows = self.rows.write().await;
        Ok(rows.remove(value))
    }

    async fn delete_all_for_user(&self, user_id: Uuid) -> AppResult<u64> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|_, s| s.user_id != user_id);
        Ok((before - rows.len()) as u64)
    }
}
