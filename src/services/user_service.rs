//! User service - registration, account management and coin deposits.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::config::MAX_COMMIT_RETRIES;
use crate::domain::{CoinSet, Password, User, UserRole};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{SessionStore, UserRepository};

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Register a new user with an empty deposit
    async fn register(&self, username: &str, password: &str, role: UserRole) -> AppResult<User>;

    /// Get user by ID
    async fn get_user(&self, id: Uuid) -> AppResult<User>;

    /// List all users
    async fn list_users(&self) -> AppResult<Vec<User>>;

    /// Update username and/or password
    async fn update_user(
        &self,
        id: Uuid,
        username: Option<String>,
        password: Option<String>,
    ) -> AppResult<User>;

    /// Delete a user account; cascades session invalidation
    async fn delete_user(&self, id: Uuid) -> AppResult<()>;

    /// Add a single coin to a buyer's deposit
    async fn increase_deposit(&self, id: Uuid, amount: i64) -> AppResult<User>;
}

/// Concrete implementation of UserService.
pub struct UserManager {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionStore>,
    coins: CoinSet,
}

impl UserManager {
    pub fn new(users: Arc<dyn UserRepository>, sessions: Arc<dyn SessionStore>, coins: CoinSet) -> Self {
        Self {
            users,
            sessions,
            coins,
        }
    }
}

#[async_trait]
impl UserService for UserManager {
    async fn register(&self, username: &str, password: &str, role: UserRole) -> AppResult<User> {
        if self.users.find_by_username(username).await?.is_some() {
            return Err(AppError::bad_request("Username already taken"));
        }

        let password_hash = Password::new(password)?.into_string();
        self.users
            .create(User::new(username.to_string(), password_hash, role))
            .await
    }

    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.users.find_by_id(id).await?.ok_or_not_found()
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        self.users.list().await
    }

    async fn update_user(
        &self,
        id: Uuid,
        username: Option<String>,
        password: Option<String>,
    ) -> AppResult<User> {
        let mut user = self.users.find_by_id(id).await?.ok_or_not_found()?;

        if let Some(username) = username {
            if username != user.username
                && self.users.find_by_username(&username).await?.is_some()
            {
                return Err(AppError::bad_request("Username already taken"));
            }
            user.username = username;
        }
        if let Some(password) = password {
            user.password_hash = Password::new(&password)?.into_string();
        }

        self.users.update(user).await
    }

    async fn delete_user(&self, id: Uuid) -> AppResult<()> {
        self.users.delete(id).await?;
        // A deleted account must not keep usable refresh tokens.
        let removed = self.sessions.delete_all_for_user(id).await?;
        tracing::debug!(user_id = %id, removed, "account deleted");
        Ok(())
    }

    async fn increase_deposit(&self, id: Uuid, amount: i64) -> AppResult<User> {
        if !self.coins.is_valid_denomination(amount) {
            return Err(AppError::bad_request(format!(
                "deposit can only be {} cent coins",
                self.coins
                    .denominations()
                    .iter()
                    .map(|d| d.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }

        for _ in 0..MAX_COMMIT_RETRIES {
            let mut user = self.users.find_by_id(id).await?.ok_or_not_found()?;
            if !user.role.is_buyer() {
                return Err(AppError::Forbidden);
            }

            user.deposit += amount;
            match self.users.update(user).await {
                Ok(user) => return Ok(user),
                Err(AppError::Conflict(_)) => continue,
                Err(e) => return Err(e),
            }
        }

        tracing::warn!(user_id = %id, "deposit commit retries exhausted");
        Err(AppError::conflict("User"))
    }
}
