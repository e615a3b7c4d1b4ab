//! OpenAPI documentation configuration.
//!
//! Served as Swagger UI at `/docs`, raw document at `/openapi.json`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{auth_handler, user_handler};
use crate::domain::UserRead;
use crate::services::TokenResponse;
use crate::types::TokenValidity;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Neural network's backend",
        version = "0.1.0",
        description = "User registration, JWT login and token validation",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    paths(
        auth_handler::validate_token,
        auth_handler::register,
        auth_handler::login,
        auth_handler::logout,
        user_handler::get_current_user,
    ),
    components(
        schemas(
            UserRead,
            TokenResponse,
            TokenValidity,
            auth_handler::RegisterRequest,
            auth_handler::LoginForm,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration, login and token validation"),
        (name = "users", description = "Current user")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT token obtained from /auth/jwt/login"))
                        .build(),
                ),
            );
        }
    }
}
