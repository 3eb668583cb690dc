use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::post::Author;
use crate::ports::TokenClaims;

pub const USERNAME_MAX_LEN: usize = 150;

pub const ROLE_USER: &str = "user";
pub const ROLE_ADMIN: &str = "admin";

/// User entity - an account that can author posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub is_staff: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with generated ID and timestamp.
    pub fn new(username: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            password_hash,
            is_staff: false,
            created_at: Utc::now(),
        }
    }

    /// Letters, digits and `@.+-_`, at most [`USERNAME_MAX_LEN`] characters.
    pub fn is_valid_username(username: &str) -> bool {
        let len = username.chars().count();
        len > 0
            && len <= USERNAME_MAX_LEN
            && username
                .chars()
                .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    }

    pub fn principal(&self) -> Principal {
        Principal {
            user_id: self.id,
            username: self.username.clone(),
            is_staff: self.is_staff,
        }
    }

    pub fn as_author(&self) -> Author {
        Author {
            id: self.id,
            username: self.username.clone(),
        }
    }
}

/// The authenticated identity making a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: Uuid,
    pub username: String,
    pub is_staff: bool,
}

impl Principal {
    /// Roles carried in issued tokens.
    pub fn roles(&self) -> Vec<String> {
        let mut roles = vec![ROLE_USER.to_string()];
        if self.is_staff {
            roles.push(ROLE_ADMIN.to_string());
        }
        roles
    }

    pub fn as_author(&self) -> Author {
        Author {
            id: self.user_id,
            username: self.username.clone(),
        }
    }
}

impl From<TokenClaims> for Principal {
    fn from(claims: TokenClaims) -> Self {
        Self {
            is_staff: claims.has_role(ROLE_ADMIN),
            user_id: claims.user_id,
            username: claims.username,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_validation() {
        assert!(User::is_valid_username("den"));
        assert!(User::is_valid_username("john.doe+blog@site"));
        assert!(User::is_valid_username("Денис"));
        assert!(!User::is_valid_username(""));
        assert!(!User::is_valid_username("two words"));
        assert!(!User::is_valid_username("slash/name"));
    }

    #[test]
    fn test_principal_roles_round_trip_through_claims() {
        let mut user = User::new("den".to_string(), "hash".to_string());
        user.is_staff = true;
        let principal = user.principal();
        assert_eq!(principal.roles(), vec!["user", "admin"]);

        let claims = TokenClaims {
            user_id: principal.user_id,
            username: principal.username.clone(),
            roles: principal.roles(),
            exp: 0,
        };
        assert_eq!(Principal::from(claims), principal);
    }
}
