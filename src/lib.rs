//! Vending machine backend core.
//!
//! Users deposit coins in fixed denominations, sellers list products,
//! buyers purchase against their deposited balance and the machine
//! returns exact change. The crate is storage-agnostic: persistence and
//! transports are injected collaborators.
//!
//! # Architecture Layers
//!
//! - **config**: Application configuration and constants
//! - **domain**: Core business entities (users, products, sessions,
//!   the coin ledger, the password value object)
//! - **services**: Use cases - auth, token lifecycle, user management
//!   and the purchase engine
//! - **infra**: Repository abstractions, in-memory stores, clock
//! - **errors**: Centralized error handling

pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;

// Re-export commonly used types at crate root
pub use config::Config;
pub use domain::{CoinSet, Password, Product, Receipt, Session, TokenType, User, UserRole};
pub use errors::{AppError, AppResult};
