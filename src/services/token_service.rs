//! Token service - issues, rotates and revokes paired auth tokens.
//!
//! The codec half is stateless: it signs and verifies time-bounded
//! payloads. The service half orchestrates the codec and the session
//! store: access tokens stay stateless, refresh tokens are mirrored as
//! session rows so they can be rotated (single-use) and revoked in bulk.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::Config;
use crate::domain::{Session, TokenType, User};
use crate::errors::{AppError, AppResult};
use crate::infra::{Clock, SessionStore, UserRepository};

/// Codec-level verification failures.
///
/// These never leave the token service boundary; callers see
/// `Unauthorized` instead.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("unexpected token type")]
    WrongType,
}

impl From<TokenError> for AppError {
    fn from(_: TokenError) -> Self {
        AppError::Unauthorized
    }
}

/// Signed token payload
///
/// `jti` makes every issued token unique, so two refresh tokens minted
/// within the same second never share a session key.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub token_type: TokenType,
    pub jti: Uuid,
    pub iat: i64,
    pub exp: i64,
}

/// A signed token together with its expiry timestamp.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Access/refresh pair returned on login and refresh.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access: IssuedToken,
    pub refresh: IssuedToken,
}

/// Stateless HS256 token codec.
///
/// Expiry is evaluated against the injected clock rather than the
/// library's ambient time so verification is deterministic under test.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    clock: Arc<dyn Clock>,
}

impl TokenCodec {
    pub fn new(config: &Config, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret_bytes()),
            clock,
        }
    }

    /// Sign a token for `subject` expiring `ttl` from now.
    pub fn issue(&self, subject: Uuid, token_type: TokenType, ttl: Duration) -> AppResult<IssuedToken> {
        let now = self.clock.now();
        let expires_at = now + ttl;

        let claims = Claims {
            sub: subject,
            token_type,
            jti: Uuid::new_v4(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Token signing failed: {}", e)))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Verify signature, expiry and type tag; returns the subject.
    pub fn verify(&self, raw: &str, expected: TokenType) -> Result<Uuid, TokenError> {
        // Expiry is checked below against the injected clock.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        let data = decode::<Claims>(raw, &self.decoding_key, &validation)
            .map_err(|_| TokenError::InvalidSignature)?;

        if data.claims.exp <= self.clock.now().timestamp() {
            return Err(TokenError::Expired);
        }
        if data.claims.token_type != expected {
            return Err(TokenError::WrongType);
        }

        Ok(data.claims.sub)
    }
}

/// Token service trait for dependency injection.
#[async_trait]
pub trait TokenService: Send + Sync {
    /// Issue an access/refresh pair and persist the refresh session
    async fn generate_auth_tokens(&self, user: &User) -> AppResult<TokenPair>;

    /// All live (non-blacklisted, non-expired) sessions for a user
    async fn get_all_tokens(&self, user_id: Uuid) -> AppResult<Vec<Session>>;

    /// Rotate a refresh token: consume its session, issue a fresh pair
    async fn refresh_auth(&self, refresh_token: &str) -> AppResult<TokenPair>;

    /// Invalidate the session matching a refresh token
    async fn logout(&self, refresh_token: &str) -> AppResult<()>;

    /// Invalidate every session owned by the token's subject
    async fn logout_all(&self, refresh_token: &str) -> AppResult<()>;

    /// Verify an access token and return its subject
    fn verify_access(&self, access_token: &str) -> AppResult<Uuid>;
}

/// Concrete implementation of TokenService.
pub struct TokenManager {
    codec: TokenCodec,
    sessions: Arc<dyn SessionStore>,
    users: Arc<dyn UserRepository>,
    config: Config,
    clock: Arc<dyn Clock>,
}

impl TokenManager {
    pub fn new(
        config: Config,
        sessions: Arc<dyn SessionStore>,
        users: Arc<dyn UserRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            codec: TokenCodec::new(&config, clock.clone()),
            sessions,
            users,
            config,
            clock,
        }
    }
}

#[async_trait]
impl TokenService for TokenManager {
    async fn generate_auth_tokens(&self, user: &User) -> AppResult<TokenPair> {
        let access = self.codec.issue(
            user.id,
            TokenType::Access,
            Duration::minutes(self.config.access_expiration_minutes),
        )?;
        let refresh = self.codec.issue(
            user.id,
            TokenType::Refresh,
            Duration::days(self.config.refresh_expiration_days),
        )?;

        self.sessions
            .save(Session::refresh(
                refresh.token.clone(),
                user.id,
                refresh.expires_at,
                self.clock.now(),
            ))
            .await?;

        Ok(TokenPair { access, refresh })
    }

    async fn get_all_tokens(&self, user_id: Uuid) -> AppResult<Vec<Session>> {
        let now = self.clock.now();
        let sessions = self.sessions.find_all_for_user(user_id).await?;
        Ok(sessions.into_iter().filter(|s| s.is_live(now)).collect())
    }

    async fn refresh_auth(&self, refresh_token: &str) -> AppResult<TokenPair> {
        let subject = self.codec.verify(refresh_token, TokenType::Refresh)?;

        // Consuming the session is the serialization point: a rotated-out
        // or already-raced token finds no row and is rejected here.
        let consumed = self
            .sessions
            .delete_by_value(refresh_token)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if consumed.user_id != subject || !consumed.is_live(self.clock.now()) {
            return Err(AppError::Unauthorized);
        }

        let user = self
            .users
            .find_by_id(subject)
            .await?
            .ok_or(AppError::Unauthorized)?;

        self.generate_auth_tokens(&user).await
    }

    async fn logout(&self, refresh_token: &str) -> AppResult<()> {
        // Repeated logout of the same token is an error by design: it
        // signals the value was already invalid.
        self.sessions
            .delete_by_value(refresh_token)
            .await?
            .ok_or(AppError::Unauthorized)?;
        Ok(())
    }

    async fn logout_all(&self, refresh_token: &str) -> AppResult<()> {
        let subject = self.codec.verify(refresh_token, TokenType::Refresh)?;
        let removed = self.sessions.delete_all_for_user(subject).await?;
        tracing::debug!(user_id = %subject, removed, "logged out everywhere");
        Ok(())
    }

    fn verify_access(&self, access_token: &str) -> AppResult<Uuid> {
        Ok(self.codec.verify(access_token, TokenType::Access)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Pinned clock; tests move it forward explicitly.
    struct TestClock(Mutex<DateTime<Utc>>);

    impl TestClock {
        fn new() -> Arc<Self> {
            Arc::new(Self(Mutex::new(Utc::now())))
        }

        fn advance(&self, by: Duration) {
            let mut now = self.0.lock().unwrap();
            *now += by;
        }
    }

    impl Clock for TestClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    fn test_config() -> Config {
        Config::new("test-secret-key-minimum-32-chars!!", 30, 30)
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let clock = TestClock::new();
        let codec = TokenCodec::new(&test_config(), clock);
        let subject = Uuid::new_v4();

        let issued = codec
            .issue(subject, TokenType::Access, Duration::minutes(30))
            .unwrap();
        assert_eq!(
            codec.verify(&issued.token, TokenType::Access).unwrap(),
            subject
        );
    }

    #[test]
    fn test_verify_rejects_wrong_type() {
        let clock = TestClock::new();
        let codec = TokenCodec::new(&test_config(), clock);

        let issued = codec
            .issue(Uuid::new_v4(), TokenType::Refresh, Duration::days(1))
            .unwrap();
        assert_eq!(
            codec.verify(&issued.token, TokenType::Access).unwrap_err(),
            TokenError::WrongType
        );
    }

    #[test]
    fn test_verify_rejects_expired() {
        let clock = TestClock::new();
        let codec = TokenCodec::new(&test_config(), clock.clone());

        let issued = codec
            .issue(Uuid::new_v4(), TokenType::Access, Duration::minutes(30))
            .unwrap();
        clock.advance(Duration::minutes(31));
        assert_eq!(
            codec.verify(&issued.token, TokenType::Access).unwrap_err(),
            TokenError::Expired
        );
    }

    #[tokio::test]
    async fn test_refresh_without_live_session_unauthorized() {
        use crate::infra::{MockSessionStore, MockUserRepository};

        let clock = TestClock::new();
        let codec = TokenCodec::new(&test_config(), clock.clone());
        let subject = Uuid::new_v4();
        let issued = codec
            .issue(subject, TokenType::Refresh, Duration::days(30))
            .unwrap();

        // Valid signature, but the session was already rotated out.
        let mut sessions = MockSessionStore::new();
        sessions
            .expect_delete_by_value()
            .returning(|_| Ok(None));
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().never();

        let manager = TokenManager::new(
            test_config(),
            Arc::new(sessions),
            Arc::new(users),
            clock,
        );
        let err = manager.refresh_auth(&issued.token).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[test]
    fn test_verify_rejects_foreign_signature() {
        let clock = TestClock::new();
        let codec = TokenCodec::new(&test_config(), clock.clone());
        let other = TokenCodec::new(
            &Config::new("another-secret-key-minimum-32-ch!", 30, 30),
            clock,
        );

        let issued = other
            .issue(Uuid::new_v4(), TokenType::Access, Duration::minutes(30))
            .unwrap();
        assert_eq!(
            codec.verify(&issued.token, TokenType::Access).unwrap_err(),
            TokenError::InvalidSignature
        );
    }
}
