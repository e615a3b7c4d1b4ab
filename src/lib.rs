//! Neural network's backend - authentication service.
//!
//! Registration, OAuth2 password login and JWT validation over HTTP,
//! built on Axum and SeaORM.
//!
//! # Architecture Layers
//!
//! - **cli** / **commands**: command-line entry points (`serve`, `migrate`)
//! - **config**: environment configuration and constants
//! - **domain**: the user entity and password value object
//! - **services**: user manager and JWT authentication flows
//! - **infra**: database connection, migrations and repositories
//! - **api**: handlers, middleware, extractors and routes
//! - **types**: shared response types
//! - **errors**: centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! neural-auth serve --port 8000
//! neural-auth migrate up
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

pub use api::AppState;
pub use config::Config;
pub use domain::{Password, User};
pub use errors::{AppError, AppResult};
