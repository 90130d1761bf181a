//! Repository layer - Data access abstraction
//!
//! Repositories provide an abstraction over data persistence,
//! following the Repository pattern for clean separation of concerns.
//! The in-memory stores are the reference implementations; any backend
//! honoring the version-check contract can be injected instead.

mod product_repository;
mod session_store;
mod user_repository;

pub use product_repository::{MemoryProductStore, ProductRepository};
pub use session_store::{MemorySessionStore, SessionStore};
pub use user_repository::{MemoryUserStore, UserRepository};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use product_repository::MockProductRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use session_store::MockSessionStore;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
