//! CORS policy: one trusted front-end origin, credentials allowed.

use axum::http::HeaderValue;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

use crate::errors::{AppError, AppResult};

/// Build the CORS layer for `origin`.
///
/// The origin header is only echoed to matching requests. Wildcards are
/// not allowed together with credentials, so request methods and headers
/// are mirrored back instead.
pub fn create_cors_layer(origin: &str) -> AppResult<CorsLayer> {
    let origin = HeaderValue::from_str(origin)
        .map_err(|_| AppError::config(format!("Invalid CORS origin: {}", origin)))?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list([origin]))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request()))
}
