//! User manager - account creation, password policy and authentication.

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::MIN_PASSWORD_LENGTH;
use crate::domain::{normalize_email, CreateUser, NewUser, Password, User};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UserRepository;

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Get user by ID
    async fn get_user(&self, id: i32) -> AppResult<User>;

    /// Register a new account.
    ///
    /// New accounts are always active, non-superuser and unverified.
    async fn create(&self, user: CreateUser) -> AppResult<User>;

    /// Check credentials, returning the matching user or `None`.
    ///
    /// Does not look at `is_active`; callers decide what an inactive
    /// account may do.
    async fn authenticate(&self, email: &str, password: &str) -> AppResult<Option<User>>;
}

/// Concrete implementation of UserService over a UserRepository.
pub struct UserManager {
    users: Arc<dyn UserRepository>,
}

impl UserManager {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Password policy applied at registration.
    fn validate_password(password: &str, email: &str) -> AppResult<()> {
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AppError::invalid_password(format!(
                "Password should be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }
        if password.to_lowercase().contains(email) {
            return Err(AppError::invalid_password("Password should not contain e-mail"));
        }
        Ok(())
    }
}

#[async_trait]
impl UserService for UserManager {
    async fn get_user(&self, id: i32) -> AppResult<User> {
        self.users.find_by_id(id).await?.ok_or_not_found()
    }

    async fn create(&self, user: CreateUser) -> AppResult<User> {
        let email = normalize_email(&user.email);
        Self::validate_password(&user.password, &email)?;

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::UserAlreadyExists);
        }

        let hashed_password = Password::new(&user.password)?.into_string();
        let created = self
            .users
            .create(NewUser {
                email,
                hashed_password,
            })
            .await?;

        tracing::info!(user_id = created.id, "User registered");
        Ok(created)
    }

    async fn authenticate(&self, email: &str, password: &str) -> AppResult<Option<User>> {
        let email = normalize_email(email);

        let Some(user) = self.users.find_by_email(&email).await? else {
            // Hash anyway so an unknown email costs as much as a wrong password.
            Password::new(password)?;
            return Ok(None);
        };

        let stored = Password::from_hash(user.hashed_password.clone());
        if stored.verify(password) {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }
}
