//! Application-wide constants
//!
//! Centralized location for magic values to improve maintainability.

use once_cell::sync::Lazy;

use crate::domain::CoinSet;

// =============================================================================
// Coin denominations
// =============================================================================

/// Accepted coin denominations in minor units, ascending order.
///
/// Changing the set is a deployment-time decision; it is loaded once at
/// startup and never mutated at runtime. The smallest denomination must
/// divide every valid product cost so change decomposition always
/// terminates with a zero remainder.
pub const DENOMINATIONS: [i64; 5] = [5, 10, 20, 50, 100];

/// Process-wide coin set built from [`DENOMINATIONS`].
pub static COIN_SET: Lazy<CoinSet> = Lazy::new(|| CoinSet::new(&DENOMINATIONS));

// =============================================================================
// Authentication & Security
// =============================================================================

/// Default access token lifetime in minutes
pub const DEFAULT_ACCESS_EXPIRATION_MINUTES: i64 = 30;

/// Default refresh token lifetime in days
pub const DEFAULT_REFRESH_EXPIRATION_DAYS: i64 = 30;

/// Minimum JWT secret length (security requirement)
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

// =============================================================================
// User Roles
// =============================================================================

/// Role allowed to deposit coins and buy products
pub const ROLE_BUYER: &str = "buyer";

/// Role allowed to create and manage products
pub const ROLE_SELLER: &str = "seller";

// =============================================================================
// Commit retries
// =============================================================================

/// Maximum internal retries when a purchase or deposit commit loses an
/// optimistic-concurrency race before `Conflict` surfaces to the caller.
pub const MAX_COMMIT_RETRIES: u32 = 3;

// =============================================================================
// Validation
// =============================================================================

/// Minimum password length requirement
pub const MIN_PASSWORD_LENGTH: usize = 4;
