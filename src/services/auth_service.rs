//! Authentication service - JWT issuing/verification and the
//! register/login flows built on the user manager.

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use super::UserService;
use crate::config::{Config, TOKEN_TYPE_BEARER};
use crate::domain::{CreateUser, User};
use crate::errors::{AppError, AppResult};

/// JWT claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    pub aud: Vec<String>,
    pub exp: i64,
    pub iat: i64,
}

/// Token response returned after successful authentication
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    /// Token type (always "bearer")
    #[schema(example = "bearer")]
    pub token_type: String,
}

/// Username/password pair submitted to the login endpoint.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new user and issue a token for it
    async fn register(&self, user: CreateUser) -> AppResult<TokenResponse>;

    /// Check credentials and issue a token
    async fn login(&self, credentials: Credentials) -> AppResult<TokenResponse>;

    /// Verify signature, expiry and audience of a token
    fn verify_token(&self, token: &str) -> AppResult<Claims>;

    /// Resolve a token to its (active) user
    async fn current_user(&self, token: &str) -> AppResult<User>;
}

/// HS256 token issuer bound to one secret, audience and lifetime.
#[derive(Clone)]
pub struct JwtStrategy {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    audience: String,
    lifetime_seconds: i64,
}

impl JwtStrategy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret_bytes()),
            audience: config.jwt_audience.clone(),
            lifetime_seconds: config.jwt_lifetime_seconds,
        }
    }

    /// Sign a fresh access token for `user`.
    pub fn write_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now();
        let expires_at = TimeDelta::try_seconds(self.lifetime_seconds)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                AppError::internal(format!(
                    "Token lifetime of {}s is out of range",
                    self.lifetime_seconds
                ))
            })?;

        let claims = Claims {
            sub: user.subject(),
            aud: vec![self.audience.clone()],
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
    }

    /// Decode and validate a token.
    pub fn decode_token(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[self.audience.as_str()]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)?;
        Ok(token_data.claims)
    }
}

/// Concrete implementation of AuthService.
pub struct Authenticator {
    users: Arc<dyn UserService>,
    strategy: JwtStrategy,
}

impl Authenticator {
    pub fn new(users: Arc<dyn UserService>, config: &Config) -> Self {
        Self {
            users,
            strategy: JwtStrategy::from_config(config),
        }
    }

    fn issue(&self, user: &User) -> AppResult<TokenResponse> {
        Ok(TokenResponse {
            access_token: self.strategy.write_token(user)?,
            token_type: TOKEN_TYPE_BEARER.to_string(),
        })
    }
}

#[async_trait]
impl AuthService for Authenticator {
    async fn register(&self, user: CreateUser) -> AppResult<TokenResponse> {
        let user = self.users.create(user).await?;
        self.issue(&user)
    }

    async fn login(&self, credentials: Credentials) -> AppResult<TokenResponse> {
        // Every failure, including storage and signing errors, reaches the
        // client as the same 400.
        let user = match self
            .users
            .authenticate(&credentials.email, &credentials.password)
            .await
        {
            Ok(Some(user)) if user.is_active => user,
            Ok(_) => {
                tracing::warn!("Rejected login attempt");
                return Err(AppError::InvalidCredentials);
            }
            Err(e) => {
                tracing::error!("Login failed while authenticating: {:?}", e);
                return Err(AppError::InvalidCredentials);
            }
        };

        match self.issue(&user) {
            Ok(token) => {
                tracing::info!(user_id = user.id, "User logged in");
                Ok(token)
            }
            Err(e) => {
                tracing::error!(user_id = user.id, "Login failed while issuing token: {:?}", e);
                Err(AppError::InvalidCredentials)
            }
        }
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        self.strategy.decode_token(token)
    }

    async fn current_user(&self, token: &str) -> AppResult<User> {
        let claims = self
            .verify_token(token)
            .map_err(|_| AppError::Unauthorized)?;
        let id: i32 = claims.sub.parse().map_err(|_| AppError::Unauthorized)?;

        match self.users.get_user(id).await {
            Ok(user) if user.is_active => Ok(user),
            Ok(_) | Err(AppError::NotFound) => Err(AppError::Unauthorized),
            Err(e) => Err(e),
        }
    }
}
