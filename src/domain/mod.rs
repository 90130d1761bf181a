//! Domain layer - Core business entities and logic
//!
//! This module contains the core domain models that represent
//! business concepts independent of infrastructure concerns.

pub mod coins;
pub mod password;
pub mod product;
pub mod session;
pub mod user;

pub use coins::CoinSet;
pub use password::Password;
pub use product::{Product, Receipt, UpdateProduct};
pub use session::{Session, TokenType};
pub use user::{User, UserResponse, UserRole};
