//! Coin ledger - validates deposit denominations and decomposes change.
//!
//! DDD: Pure domain logic, no state beyond the configured denomination
//! set and no infrastructure dependencies.

use crate::errors::{AppError, AppResult};

/// Fixed, ordered set of accepted coin denominations.
///
/// Loaded once at startup and passed by reference into the services that
/// need it; never mutated at runtime. Denominations are minor currency
/// units in strictly ascending order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinSet {
    denominations: Vec<i64>,
}

impl CoinSet {
    /// Create a coin set from ascending denominations.
    ///
    /// # Panics
    /// Panics if the set is empty, contains a non-positive value or is
    /// not strictly ascending. Denomination sets are deployment-time
    /// configuration, so a bad set is a startup error, not a runtime one.
    pub fn new(denominations: &[i64]) -> Self {
        assert!(!denominations.is_empty(), "denomination set must not be empty");
        assert!(
            denominations.windows(2).all(|w| w[0] < w[1]),
            "denominations must be strictly ascending"
        );
        assert!(denominations[0] > 0, "denominations must be positive");

        Self {
            denominations: denominations.to_vec(),
        }
    }

    /// Denominations in ascending order.
    pub fn denominations(&self) -> &[i64] {
        &self.denominations
    }

    /// Smallest accepted coin.
    pub fn smallest(&self) -> i64 {
        self.denominations[0]
    }

    /// True iff `amount` is exactly one of the accepted coins.
    ///
    /// Deposits are inserted one coin at a time, so sums of coins are not
    /// valid deposit amounts even when each part would be.
    pub fn is_valid_denomination(&self, amount: i64) -> bool {
        self.denominations.contains(&amount)
    }

    /// True iff `cost` is positive and a multiple of the smallest coin.
    pub fn is_cost_aligned(&self, cost: i64) -> bool {
        cost > 0 && cost % self.smallest() == 0
    }

    /// Decompose `amount` into a greedy coin breakdown.
    ///
    /// Returns one count per denomination in ascending denomination order
    /// (index 0 = smallest coin). The greedy pass runs largest to
    /// smallest; the counts always reconstruct `amount` exactly because
    /// every balance in the system is a multiple of the smallest coin.
    ///
    /// Fails `Validation` for negative amounts and for amounts the set
    /// cannot represent (unreachable through the public operations, but
    /// reported rather than silently dropped).
    pub fn decompose_change(&self, amount: i64) -> AppResult<Vec<i64>> {
        if amount < 0 {
            return Err(AppError::validation("change amount must not be negative"));
        }

        let mut counts = vec![0i64; self.denominations.len()];
        let mut rest = amount;

        for (i, coin) in self.denominations.iter().enumerate().rev() {
            if rest >= *coin {
                counts[i] = rest / coin;
                rest -= counts[i] * coin;
            }
        }

        if rest != 0 {
            return Err(AppError::validation(format!(
                "amount {} cannot be decomposed into {:?} coins",
                amount, self.denominations
            )));
        }

        Ok(counts)
    }
}

impl Default for CoinSet {
    fn default() -> Self {
        Self::new(&crate::config::DENOMINATIONS)
    }
}
