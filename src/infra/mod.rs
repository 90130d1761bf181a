//! Infrastructure layer - External systems integration
//!
//! This module holds the concerns the core delegates outward:
//! - Repository abstractions and their in-memory implementations
//! - The injectable time source

pub mod clock;
pub mod repositories;

pub use clock::{Clock, SystemClock};
pub use repositories::{
    MemoryProductStore, MemorySessionStore, MemoryUserStore, ProductRepository, SessionStore,
    UserRepository,
};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{MockProductRepository, MockSessionStore, MockUserRepository};
