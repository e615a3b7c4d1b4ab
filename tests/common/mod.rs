//! Shared test fixtures.

use std::sync::Mutex;

use async_trait::async_trait;
use sea_orm::DbErr;

use neural_auth::domain::{NewUser, User};
use neural_auth::errors::{AppError, AppResult};
use neural_auth::infra::UserRepository;

pub const SECRET: &str = "integration-test-secret-key-32-chars!";

/// User repository kept in memory, with the same uniqueness rule as the
/// `users` table.
#[derive(Default)]
pub struct InMemoryUsers {
    users: Mutex<Vec<User>>,
}

#[allow(dead_code)]
impl InMemoryUsers {
    pub fn deactivate(&self, email: &str) {
        let mut users = self.users.lock().unwrap();
        for user in users.iter_mut().filter(|u| u.email == email) {
            user.is_active = false;
        }
    }

    pub fn stored(&self, email: &str) -> Option<User> {
        let users = self.users.lock().unwrap();
        users.iter().find(|u| u.email == email).cloned()
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self.stored(email))
    }

    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == new_user.email) {
            return Err(AppError::UserAlreadyExists);
        }
        let user = User::new(
            users.len() as i32 + 1,
            new_user.email,
            new_user.hashed_password,
        );
        users.push(user.clone());
        Ok(user)
    }
}

/// Repository whose storage is unreachable.
#[allow(dead_code)]
pub struct UnavailableUsers;

#[allow(dead_code)]
fn connection_lost() -> AppError {
    AppError::Database(DbErr::Custom("connection refused".to_string()))
}

#[async_trait]
impl UserRepository for UnavailableUsers {
    async fn find_by_id(&self, _id: i32) -> AppResult<Option<User>> {
        Err(connection_lost())
    }

    async fn find_by_email(&self, _email: &str) -> AppResult<Option<User>> {
        Err(connection_lost())
    }

    async fn create(&self, _new_user: NewUser) -> AppResult<User> {
        Err(connection_lost())
    }
}
