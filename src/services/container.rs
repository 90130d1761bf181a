//! Service Container - Centralized service access.
//!
//! Depends on service traits, not implementations, so transports and
//! tests can swap any piece.

use std::sync::Arc;

use super::{AuthService, ProductService, TokenService, UserService};
use crate::config::{Config, COIN_SET};
use crate::infra::{MemoryProductStore, MemorySessionStore, MemoryUserStore, SystemClock};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    /// Get authentication service
    fn auth(&self) -> Arc<dyn AuthService>;

    /// Get user service
    fn users(&self) -> Arc<dyn UserService>;

    /// Get product service
    fn products(&self) -> Arc<dyn ProductService>;

    /// Get token service
    fn tokens(&self) -> Arc<dyn TokenService>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    user_service: Arc<dyn UserService>,
    product_service: Arc<dyn ProductService>,
    token_service: Arc<dyn TokenService>,
}

impl Services {
    /// Create a new service container from pre-built services
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        user_service: Arc<dyn UserService>,
        product_service: Arc<dyn ProductService>,
        token_service: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            auth_service,
            user_service,
            product_service,
            token_service,
        }
    }

    /// Wire the full service graph over in-memory stores.
    pub fn in_memory(config: Config) -> Self {
        use super::{Authenticator, ProductEngine, TokenManager, UserManager};

        let users = Arc::new(MemoryUserStore::new());
        let products = Arc::new(MemoryProductStore::new());
        let sessions = Arc::new(MemorySessionStore::new());
        let clock = Arc::new(SystemClock);

        let token_service: Arc<dyn TokenService> = Arc::new(TokenManager::new(
            config,
            sessions.clone(),
            users.clone(),
            clock,
        ));
        let auth_service = Arc::new(Authenticator::new(users.clone(), token_service.clone()));
        let user_service = Arc::new(UserManager::new(
            users.clone(),
            sessions,
            COIN_SET.clone(),
        ));
        let product_service = Arc::new(ProductEngine::new(products, users, COIN_SET.clone()));

        Self {
            auth_service,
            user_service,
            product_service,
            token_service,
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }

    fn products(&self) -> Arc<dyn ProductService> {
        self.product_service.clone()
    }

    fn tokens(&self) -> Arc<dyn TokenService> {
        self.token_service.clone()
    }
}
