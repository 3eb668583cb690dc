//! Sign-up and credential checks.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::{USERNAME_MAX_LEN, User};
use crate::error::{DomainError, DomainResult};
use crate::ports::{PasswordService, UserRepository};

pub const PASSWORD_MIN_LEN: usize = 8;

pub struct AccountService {
    users: Arc<dyn UserRepository>,
    passwords: Arc<dyn PasswordService>,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserRepository>, passwords: Arc<dyn PasswordService>) -> Self {
        Self { users, passwords }
    }

    pub async fn register(&self, username: &str, password: &str) -> DomainResult<User> {
        if !User::is_valid_username(username) {
            return Err(DomainError::Validation(format!(
                "Username must be 1 to {USERNAME_MAX_LEN} letters, digits or @.+-_"
            )));
        }
        if password.chars().count() < PASSWORD_MIN_LEN {
            return Err(DomainError::Validation(format!(
                "Password must be at least {PASSWORD_MIN_LEN} characters"
            )));
        }
        if self.users.find_by_username(username).await?.is_some() {
            return Err(DomainError::Duplicate(format!(
                "Username {username} is already taken"
            )));
        }

        let password_hash = self
            .passwords
            .hash(password)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let user = self
            .users
            .insert(User::new(username.to_string(), password_hash))
            .await?;
        info!(user_id = %user.id, username = %user.username, "User registered");

        Ok(user)
    }

    /// Check a username/password pair.
    pub async fn authenticate(&self, username: &str, password: &str) -> DomainResult<User> {
        let Some(user) = self.users.find_by_username(username).await? else {
            warn!(username, "Login attempt for unknown user");
            return Err(DomainError::Unauthorized);
        };

        let valid = self
            .passwords
            .verify(password, &user.password_hash)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        if !valid {
            warn!(username, "Login attempt with wrong password");
            return Err(DomainError::Unauthorized);
        }

        Ok(user)
    }
}
