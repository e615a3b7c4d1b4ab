//! Application state - Dependency injection container.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::{Database, UserRepository, UserStore};
use crate::services::{AuthService, Authenticator, UserManager, UserService};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    /// Authentication service
    pub auth_service: Arc<dyn AuthService>,
    /// User manager
    pub user_service: Arc<dyn UserService>,
    /// Database connection, reported on by the health check
    pub database: Option<Arc<Database>>,
}

impl AppState {
    /// Create application state backed by the given database.
    pub fn from_config(database: Arc<Database>, config: &Config) -> Self {
        let users = Arc::new(UserStore::new(database.get_connection()));

        Self {
            database: Some(database),
            ..Self::with_repository(users, config)
        }
    }

    /// Wire the services over any user repository.
    ///
    /// No database is attached, so `/health` reports it as not configured.
    pub fn with_repository(users: Arc<dyn UserRepository>, config: &Config) -> Self {
        let user_service: Arc<dyn UserService> = Arc::new(UserManager::new(users));
        let auth_service = Arc::new(Authenticator::new(user_service.clone(), config));

        Self::new(auth_service, user_service)
    }

    /// Create new application state with manually injected services.
    pub fn new(auth_service: Arc<dyn AuthService>, user_service: Arc<dyn UserService>) -> Self {
        Self {
            auth_service,
            user_service,
            database: None,
        }
    }
}
