//! Integration tests for API endpoints.
//!
//! The full router runs against an in-memory user repository, so no
//! database is required.

mod common;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use neural_auth::api::{create_router, AppState};
use neural_auth::config::Config;
use neural_auth::infra::UserRepository;

use common::{InMemoryUsers, UnavailableUsers, SECRET};

const EMAIL: &str = "user@example.com";
const PASSWORD: &str = "CorrectHorse99";

// =============================================================================
// Test Helpers
// =============================================================================

struct TestApp {
    router: Router,
    users: Arc<InMemoryUsers>,
}

fn test_app() -> TestApp {
    let users = Arc::new(InMemoryUsers::default());
    let router = router_over(users.clone());

    TestApp { router, users }
}

fn router_over(repository: Arc<dyn UserRepository>) -> Router {
    let config = Config::new(SECRET).unwrap();
    let state = AppState::with_repository(repository, &config);
    create_router(state, &config).unwrap()
}

impl TestApp {
    async fn send(&self, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, headers, body)
    }

    async fn register(&self, email: &str, password: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/auth/register")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "email": email, "password": password }).to_string()))
            .unwrap();
        let (status, _, body) = self.send(request).await;
        (status, body)
    }

    async fn login_form(&self, form: String) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/auth/jwt/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form))
            .unwrap();
        let (status, _, body) = self.send(request).await;
        (status, body)
    }

    async fn login(&self, email: &str, password: &str) -> (StatusCode, Value) {
        self.login_form(format!(
            "username={}&password={}",
            email.replace('@', "%40"),
            password
        ))
        .await
    }

    async fn validate(&self, authorization: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().uri("/auth/validate_token");
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let (status, _, body) = self.send(builder.body(Body::empty()).unwrap()).await;
        (status, body)
    }

    async fn with_bearer(&self, method: Method, uri: &str, token: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        let (status, _, body) = self.send(request).await;
        (status, body)
    }

    /// Register the default user and return its access token.
    async fn registered_token(&self) -> String {
        let (status, body) = self.register(EMAIL, PASSWORD).await;
        assert_eq!(status, StatusCode::OK, "registration failed: {}", body);
        body["access_token"].as_str().unwrap().to_string()
    }
}

// =============================================================================
// Token validation
// =============================================================================

#[tokio::test]
async fn test_valid_bearer_token_is_valid() {
    let app = test_app();
    let token = app.registered_token().await;

    let (status, body) = app.validate(Some(&format!("Bearer {}", token))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "valid": true }));
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let app = test_app();

    let (status, body) = app.validate(None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Token is missing");
}

#[tokio::test]
async fn test_invalid_token_is_not_valid() {
    let app = test_app();

    let (status, body) = app.validate(Some("Bearer not.a.token")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "valid": false }));
}

#[tokio::test]
async fn test_non_utf8_token_is_not_valid() {
    let app = test_app();
    let request = Request::builder()
        .uri("/auth/validate_token")
        .header(
            header::AUTHORIZATION,
            HeaderValue::from_bytes(b"Bearer \xff\xfe").unwrap(),
        )
        .body(Body::empty())
        .unwrap();

    let (status, _, body) = app.send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "valid": false }));
}

#[tokio::test]
async fn test_token_without_scheme_is_still_checked() {
    let app = test_app();
    let token = app.registered_token().await;

    let (status, body) = app.validate(Some(&token)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "valid": true }));
}

// =============================================================================
// Registration
// =============================================================================

#[tokio::test]
async fn test_register_returns_bearer_token() {
    let app = test_app();

    let (status, body) = app.register(EMAIL, PASSWORD).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "bearer");
    assert!(!body["access_token"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_duplicate_email_is_rejected() {
    let app = test_app();
    app.registered_token().await;

    let (status, body) = app.register(EMAIL, PASSWORD).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "User with this email already exists.");

    // Same address, different case
    let (status, _) = app.register("USER@Example.com", PASSWORD).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_weak_password_is_rejected() {
    let app = test_app();

    let (status, body) = app.register(EMAIL, "short").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "REGISTER_INVALID_PASSWORD");
}

#[tokio::test]
async fn test_malformed_email_is_unprocessable() {
    let app = test_app();

    let (status, _) = app.register("not-an-email", PASSWORD).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

// =============================================================================
// Login
// =============================================================================

#[tokio::test]
async fn test_login_with_correct_credentials() {
    let app = test_app();
    app.registered_token().await;

    let (status, body) = app.login(EMAIL, PASSWORD).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "bearer");

    let token = body["access_token"].as_str().unwrap();
    let (_, validity) = app.validate(Some(&format!("Bearer {}", token))).await;
    assert_eq!(validity, json!({ "valid": true }));
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let app = test_app();
    app.registered_token().await;

    let (status, body) = app.login(EMAIL, "WrongHorse99").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Invalid credentials");
}

#[tokio::test]
async fn test_login_with_unknown_user() {
    let app = test_app();

    let (status, body) = app.login("nobody@example.com", PASSWORD).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Invalid credentials");
}

#[tokio::test]
async fn test_login_of_inactive_user_is_rejected() {
    let app = test_app();
    app.registered_token().await;
    app.users.deactivate(EMAIL);

    let (status, _) = app.login(EMAIL, PASSWORD).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_with_storage_down_is_invalid_credentials() {
    let app = TestApp {
        router: router_over(Arc::new(UnavailableUsers)),
        users: Arc::new(InMemoryUsers::default()),
    };

    let (status, body) = app.login(EMAIL, PASSWORD).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Invalid credentials");
    assert_eq!(body["code"], "LOGIN_BAD_CREDENTIALS");
}

#[tokio::test]
async fn test_login_rejects_other_grant_types() {
    let app = test_app();
    app.registered_token().await;

    let (status, _) = app
        .login_form(format!(
            "grant_type=client_credentials&username=user%40example.com&password={}",
            PASSWORD
        ))
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_login_with_missing_field_is_unprocessable() {
    let app = test_app();

    let (status, _) = app.login_form("username=user%40example.com".to_string()).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

// =============================================================================
// Authenticated routes
// =============================================================================

#[tokio::test]
async fn test_current_user_profile() {
    let app = test_app();
    let token = app.registered_token().await;

    let (status, body) = app.with_bearer(Method::GET, "/users/me", &token).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], EMAIL);
    assert_eq!(body["is_active"], true);
    assert_eq!(body["is_superuser"], false);
    assert!(body.get("hashed_password").is_none());
}

#[tokio::test]
async fn test_current_user_requires_valid_token() {
    let app = test_app();

    let (status, _) = app.with_bearer(Method::GET, "/users/me", "garbage").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_deactivated_user_token_is_refused() {
    let app = test_app();
    let token = app.registered_token().await;
    app.users.deactivate(EMAIL);

    let (status, _) = app.with_bearer(Method::GET, "/users/me", &token).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout() {
    let app = test_app();
    let token = app.registered_token().await;

    let (status, _) = app.with_bearer(Method::POST, "/auth/jwt/logout", &token).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/auth/jwt/logout")
        .body(Body::empty())
        .unwrap();
    let (status, _, _) = app.send(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Infrastructure routes
// =============================================================================

#[tokio::test]
async fn test_cors_allows_configured_origin_only() {
    let app = test_app();

    let preflight = |origin: &str| {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/auth/register")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
            .body(Body::empty())
            .unwrap()
    };

    let (_, headers, _) = app.send(preflight("http://localhost:3000")).await;
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://localhost:3000"
    );
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
        "true"
    );

    let (_, headers, _) = app.send(preflight("http://evil.example")).await;
    assert!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}

#[tokio::test]
async fn test_health_without_database() {
    let app = test_app();
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let (status, _, body) = app.send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["services"]["database"]["status"], "not_configured");
}

#[tokio::test]
async fn test_openapi_document_lists_auth_routes() {
    let app = test_app();
    let request = Request::builder()
        .uri("/openapi.json")
        .body(Body::empty())
        .unwrap();

    let (status, _, body) = app.send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"].get("/auth/validate_token").is_some());
    assert!(body["paths"].get("/auth/jwt/login").is_some());
}
