//! User domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{ROLE_BUYER, ROLE_SELLER};

/// User roles enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Buyer,
    Seller,
}

impl UserRole {
    /// Buyers may deposit coins and buy products.
    pub fn is_buyer(&self) -> bool {
        matches!(self, UserRole::Buyer)
    }

    /// Sellers may create and manage products.
    pub fn is_seller(&self) -> bool {
        matches!(self, UserRole::Seller)
    }
}

impl From<&str> for UserRole {
    fn from(s: &str) -> Self {
        match s {
            ROLE_SELLER => UserRole::Seller,
            _ => UserRole::Buyer,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Buyer => write!(f, "{}", ROLE_BUYER),
            UserRole::Seller => write!(f, "{}", ROLE_SELLER),
        }
    }
}

/// User domain entity
///
/// `deposit` is a non-negative minor-unit balance. Only the purchase
/// engine decrements it and only the deposit operation increments it,
/// in single-coin denominations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
    pub deposit: i64,
    /// Optimistic-concurrency guard; bumped by the repository on every
    /// committed update.
    #[serde(skip_serializing)]
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with an empty deposit.
    pub fn new(username: String, password_hash: String, role: UserRole) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username,
            password_hash,
            role,
            deposit: 0,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// User response (safe to return to client)
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub role: String,
    pub deposit: i64,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role.to_string(),
            deposit: user.deposit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_starts_with_empty_deposit() {
        let user = User::new("alice".into(), "hash".into(), UserRole::Buyer);
        assert_eq!(user.deposit, 0);
        assert_eq!(user.version, 0);
        assert!(user.role.is_buyer());
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let user = User::new("alice".into(), "super-secret-hash".into(), UserRole::Buyer);
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "alice");
    }

    #[test]
    fn test_role_round_trip() {
        assert_eq!(UserRole::from("seller"), UserRole::Seller);
        assert_eq!(UserRole::from("buyer"), UserRole::Buyer);
        assert_eq!(UserRole::Seller.to_string(), "seller");
    }
}
