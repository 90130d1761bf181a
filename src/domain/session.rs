//! Session entity - the persisted mirror of an issued refresh token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Token kinds carried in signed token payloads.
///
/// Access tokens are stateless and never persisted; refresh tokens are
/// mirrored as [`Session`] rows so they can be rotated and revoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenType::Access => write!(f, "access"),
            TokenType::Refresh => write!(f, "refresh"),
        }
    }
}

/// Persisted refresh token record.
///
/// At most one live session exists per token value; a session is live
/// iff it is neither expired nor blacklisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Raw token value; unique key in the session store.
    pub value: String,
    pub user_id: Uuid,
    pub token_type: TokenType,
    pub expires_at: DateTime<Utc>,
    /// Soft-revocation marker.
    pub blacklisted: bool,
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Create a live refresh session.
    pub fn refresh(value: String, user_id: Uuid, expires_at: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        Self {
            value,
            user_id,
            token_type: TokenType::Refresh,
            expires_at,
            blacklisted: false,
            created_at: now,
        }
    }

    /// Check if the session is live at `now`.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        !self.blacklisted && now < self.expires_at
    }
}
