//! Authentication service - verifies credentials and composes with the
//! token service for login and session control.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{Password, User};
use crate::errors::{AppError, AppResult};
use crate::infra::UserRepository;

use super::token_service::{TokenPair, TokenService};

/// Successful login payload.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: User,
    pub tokens: TokenPair,
    /// Sessions that were already live before this login issued a new
    /// pair. Observability signal, not an access-control decision.
    pub active_sessions: usize,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Verify credentials and issue a token pair
    async fn login(&self, username: &str, password: &str) -> AppResult<LoginResponse>;

    /// Invalidate the session matching a refresh token
    async fn logout(&self, refresh_token: &str) -> AppResult<()>;

    /// Invalidate every session owned by the token's subject
    async fn logout_all(&self, refresh_token: &str) -> AppResult<()>;

    /// Rotate a refresh token into a fresh pair
    async fn refresh_auth(&self, refresh_token: &str) -> AppResult<TokenPair>;

    /// Verify an access token and return its subject
    fn verify_access_token(&self, access_token: &str) -> AppResult<Uuid>;
}

/// Concrete implementation of AuthService.
pub struct Authenticator {
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn TokenService>,
}

impl Authenticator {
    pub fn new(users: Arc<dyn UserRepository>, tokens: Arc<dyn TokenService>) -> Self {
        Self { users, tokens }
    }
}

#[async_trait]
impl AuthService for Authenticator {
    async fn login(&self, username: &str, password: &str) -> AppResult<LoginResponse> {
        let user_result = self.users.find_by_username(username).await?;

        // SECURITY: run the password comparison even when the user does
        // not exist so response timing cannot enumerate usernames. The
        // dummy hash never verifies.
        let dummy_hash =
            "$argon2id$v=19$m=19456,t=2,p=1$dummysalt123456$dummyhash1234567890123456789012";

        let (password_hash, user_exists) = match &user_result {
            Some(user) => (user.password_hash.as_str(), true),
            None => (dummy_hash, false),
        };

        let stored_password = Password::from_hash(password_hash.to_string());
        let password_valid = stored_password.verify(password);

        if !user_exists || !password_valid {
            return Err(AppError::InvalidCredentials);
        }

        // user_exists was checked above
        let user = user_result.unwrap();

        // Count the sessions that existed before this login's pair.
        let active_sessions = self.tokens.get_all_tokens(user.id).await?.len();
        let tokens = self.tokens.generate_auth_tokens(&user).await?;

        tracing::debug!(user_id = %user.id, active_sessions, "login succeeded");

        Ok(LoginResponse {
            user,
            tokens,
            active_sessions,
        })
    }

    async fn logout(&self, refresh_token: &str) -> AppResult<()> {
        self.tokens
            .logout(refresh_token)
            .await
            .map_err(|_| AppError::Unauthorized)
    }

    async fn logout_all(&self, refresh_token: &str) -> AppResult<()> {
        self.tokens
            .logout_all(refresh_token)
            .await
            .map_err(|_| AppError::Unauthorized)
    }

    async fn refresh_auth(&self, refresh_token: &str) -> AppResult<TokenPair> {
        self.tokens
            .refresh_auth(refresh_token)
            .await
            .map_err(|_| AppError::Unauthorized)
    }

    fn verify_access_token(&self, access_token: &str) -> AppResult<Uuid> {
        self.tokens.verify_access(access_token)
    }
}
