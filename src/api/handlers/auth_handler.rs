//! Authentication handlers.

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap},
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::{ValidatedForm, ValidatedJson};
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::config::{BEARER_TOKEN_PREFIX, GRANT_TYPE_PASSWORD};
use crate::domain::CreateUser;
use crate::errors::{AppError, AppResult};
use crate::services::{Credentials, TokenResponse};
use crate::types::{NoContent, TokenValidity};

/// User registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    /// User email address
    #[validate(
        email(message = "Invalid email format"),
        length(max = 320, message = "Email is too long")
    )]
    #[schema(example = "user@example.com")]
    pub email: String,
    /// User password (minimum 8 characters)
    #[schema(example = "SecurePass123!", min_length = 8)]
    pub password: String,
}

impl From<RegisterRequest> for CreateUser {
    fn from(req: RegisterRequest) -> Self {
        CreateUser {
            email: req.email,
            password: req.password,
        }
    }
}

/// OAuth2 password grant form
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginForm {
    /// Account email
    #[validate(length(min = 1, message = "username is required"))]
    #[schema(example = "user@example.com")]
    pub username: String,
    #[validate(length(min = 1, message = "password is required"))]
    #[schema(example = "SecurePass123!")]
    pub password: String,
    /// Must be "password" when present
    #[schema(example = "password")]
    pub grant_type: Option<String>,
    #[serde(default)]
    pub scope: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

impl LoginForm {
    fn ensure_password_grant(&self) -> AppResult<()> {
        match self.grant_type.as_deref() {
            None | Some("") | Some(GRANT_TYPE_PASSWORD) => Ok(()),
            Some(other) => Err(AppError::validation(format!(
                "Unsupported grant_type: {}",
                other
            ))),
        }
    }
}

impl From<LoginForm> for Credentials {
    fn from(form: LoginForm) -> Self {
        Credentials {
            email: form.username,
            password: form.password,
        }
    }
}

/// Create authentication routes that need no prior authentication
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/validate_token", get(validate_token))
        .route("/register", post(register))
        .route("/jwt/login", post(login))
}

/// Create authentication routes that require a bearer token
pub fn session_routes() -> Router<AppState> {
    Router::new().route("/jwt/logout", post(logout))
}

/// Check whether the bearer token is valid
#[utoipa::path(
    get,
    path = "/auth/validate_token",
    tag = "auth",
    params(("Authorization" = String, Header, description = "Bearer <token>")),
    responses(
        (status = 200, description = "Validity of the supplied token", body = TokenValidity),
        (status = 401, description = "Token is missing")
    )
)]
pub async fn validate_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<TokenValidity>> {
    let header = headers.get(AUTHORIZATION).ok_or(AppError::MissingToken)?;

    // A non-UTF8 header cannot hold a JWT; let it fail verification.
    let raw = header.to_str().unwrap_or_default();
    let token = raw.strip_prefix(BEARER_TOKEN_PREFIX).unwrap_or(raw);

    let valid = state.auth_service.verify_token(token).is_ok();

    Ok(Json(TokenValidity { valid }))
}

/// Register a new user and return an access token
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User registered", body = TokenResponse),
        (status = 400, description = "User already exists or password rejected"),
        (status = 422, description = "Malformed request body")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<Json<TokenResponse>> {
    let token = state.auth_service.register(payload.into()).await?;

    Ok(Json(token))
}

/// Login with the OAuth2 password form and get a JWT
#[utoipa::path(
    post,
    path = "/auth/jwt/login",
    tag = "auth",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 400, description = "Invalid credentials"),
        (status = 422, description = "Malformed form")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedForm(form): ValidatedForm<LoginForm>,
) -> AppResult<Json<TokenResponse>> {
    form.ensure_password_grant()?;

    let token = state.auth_service.login(form.into()).await?;

    Ok(Json(token))
}

/// Logout. Tokens are stateless, so this only confirms the caller was authenticated.
#[utoipa::path(
    post,
    path = "/auth/jwt/logout",
    tag = "auth",
    responses(
        (status = 204, description = "Logged out"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn logout(Extension(CurrentUser(user)): Extension<CurrentUser>) -> NoContent {
    tracing::info!(user_id = user.id, "User logged out");
    NoContent
}
