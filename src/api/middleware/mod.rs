//! API middleware.

mod auth;
mod cors;

pub use auth::{auth_middleware, CurrentUser};
pub use cors::create_cors_layer;
