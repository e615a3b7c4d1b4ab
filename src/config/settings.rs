//! Application settings loaded from environment variables.

use std::env;

use super::constants::{
    DEFAULT_CORS_ORIGIN, DEFAULT_DATABASE_URL, DEFAULT_JWT_AUDIENCE,
    DEFAULT_JWT_LIFETIME_SECONDS, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT,
    MAX_JWT_LIFETIME_SECONDS, MIN_JWT_SECRET_LENGTH,
};
use crate::errors::{AppError, AppResult};

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    jwt_secret: String,
    pub jwt_lifetime_seconds: i64,
    pub jwt_audience: String,
    pub cors_origin: String,
    pub server_host: String,
    pub server_port: u16,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_lifetime_seconds", &self.jwt_lifetime_seconds)
            .field("jwt_audience", &self.jwt_audience)
            .field("cors_origin", &self.cors_origin)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .finish()
    }
}

impl Config {
    /// Build a configuration with the given signing secret and defaults
    /// for everything else.
    pub fn new(jwt_secret: impl Into<String>) -> AppResult<Self> {
        let jwt_secret = jwt_secret.into();
        validate_secret(&jwt_secret)?;

        Ok(Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            jwt_secret,
            jwt_lifetime_seconds: DEFAULT_JWT_LIFETIME_SECONDS,
            jwt_audience: DEFAULT_JWT_AUDIENCE.to_string(),
            cors_origin: DEFAULT_CORS_ORIGIN.to_string(),
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
        })
    }

    /// Load configuration from environment variables (and `.env` if present).
    ///
    /// In release builds `JWT_SECRET` is mandatory; debug builds fall back
    /// to an insecure development secret and log a warning.
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) if cfg!(debug_assertions) => {
                tracing::warn!("JWT_SECRET not set, using insecure default for development");
                "dev-secret-key-minimum-32-chars!!".to_string()
            }
            Err(_) => {
                return Err(AppError::config(
                    "JWT_SECRET environment variable must be set in production",
                ))
            }
        };

        let mut config = Self::new(jwt_secret)?;

        if let Ok(url) = env::var("DATABASE_URL") {
            config.database_url = url;
        }
        if let Ok(audience) = env::var("JWT_AUDIENCE") {
            config.jwt_audience = audience;
        }
        if let Ok(origin) = env::var("CORS_ORIGIN") {
            config.cors_origin = origin;
        }
        if let Ok(host) = env::var("SERVER_HOST") {
            config.server_host = host;
        }
        config.jwt_lifetime_seconds = validate_lifetime(parse_var(
            "JWT_LIFETIME_SECONDS",
            config.jwt_lifetime_seconds,
        )?)?;
        config.server_port = parse_var("SERVER_PORT", config.server_port)?;

        Ok(config)
    }

    /// Get JWT secret bytes for token signing/verification.
    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn validate_secret(secret: &str) -> AppResult<()> {
    if secret.len() < MIN_JWT_SECRET_LENGTH {
        return Err(AppError::config(format!(
            "JWT_SECRET must be at least {} characters long",
            MIN_JWT_SECRET_LENGTH
        )));
    }
    Ok(())
}

fn validate_lifetime(seconds: i64) -> AppResult<i64> {
    if !(1..=MAX_JWT_LIFETIME_SECONDS).contains(&seconds) {
        return Err(AppError::config(format!(
            "JWT_LIFETIME_SECONDS must be between 1 and {}, got {}",
            MAX_JWT_LIFETIME_SECONDS, seconds
        )));
    }
    Ok(seconds)
}

/// Parse an optional environment variable, keeping `default` when unset.
fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> AppResult<T> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| AppError::config(format!("{} has an invalid value: {}", name, raw))),
        Err(_) => Ok(default),
    }
}
