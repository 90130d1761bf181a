//! Application settings loaded from environment variables.

use std::env;

use super::constants::{
    DEFAULT_ACCESS_EXPIRATION_MINUTES, DEFAULT_REFRESH_EXPIRATION_DAYS, MIN_JWT_SECRET_LENGTH,
};

/// Application configuration
#[derive(Clone)]
pub struct Config {
    jwt_secret: String,
    pub access_expiration_minutes: i64,
    pub refresh_expiration_days: i64,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("jwt_secret", &"[REDACTED]")
            .field("access_expiration_minutes", &self.access_expiration_minutes)
            .field("refresh_expiration_days", &self.refresh_expiration_days)
            .finish()
    }
}

impl Config {
    /// Build a configuration from explicit values.
    ///
    /// # Panics
    /// Panics if the secret is shorter than [`MIN_JWT_SECRET_LENGTH`].
    pub fn new(
        jwt_secret: impl Into<String>,
        access_expiration_minutes: i64,
        refresh_expiration_days: i64,
    ) -> Self {
        let jwt_secret = jwt_secret.into();
        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            panic!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LENGTH
            );
        }

        Self {
            jwt_secret,
            access_expiration_minutes,
            refresh_expiration_days,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// # Panics
    /// Panics if JWT_SECRET is not set or is too short (security requirement).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            if cfg!(debug_assertions) {
                // Development mode: use default but warn
                tracing::warn!("JWT_SECRET not set, using insecure default for development");
                "dev-secret-key-minimum-32-chars!!".to_string()
            } else {
                // Production mode: panic
                panic!("JWT_SECRET environment variable must be set in production");
            }
        });

        let access_expiration_minutes = env::var("JWT_ACCESS_EXPIRATION_MINUTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_ACCESS_EXPIRATION_MINUTES);
        let refresh_expiration_days = env::var("JWT_REFRESH_EXPIRATION_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_REFRESH_EXPIRATION_DAYS);

        Self::new(jwt_secret, access_expiration_minutes, refresh_expiration_days)
    }

    /// Get JWT secret bytes for token signing/verification.
    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }
}
