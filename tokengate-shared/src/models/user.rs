/// User model and user store
///
/// The login flow needs two things from user storage: create a user and look
/// one up by username. [`UserStore`] is that seam; [`InMemoryUserStore`] is the
/// implementation the API server ships with. Durable SQL storage is left to
/// other implementations of the trait.
///
/// # Example
///
/// ```
/// use tokengate_shared::models::user::{CreateUser, InMemoryUserStore, UserStore};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = InMemoryUserStore::new();
///
/// let user = store.create(CreateUser {
///     username: "alice".to_string(),
///     full_name: "Alice Liddell".to_string(),
///     email: "alice@example.com".to_string(),
///     hashed_password: "$argon2id$...".to_string(),
/// })?;
///
/// let found = store.find_by_username("alice")?;
/// assert_eq!(found.map(|u| u.email), Some(user.email));
/// # Ok(())
/// # }
/// ```

use std::{collections::HashMap, sync::RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique username (primary key)
    pub username: String,

    /// Display name
    pub full_name: String,

    /// Unique email address
    pub email: String,

    /// Argon2id password hash, never the plaintext password
    pub hashed_password: String,

    /// When the password was last changed
    pub password_changed_at: DateTime<Utc>,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub full_name: String,
    pub email: String,

    /// Argon2id password hash (NOT plaintext password!)
    pub hashed_password: String,
}

/// Error type for user store operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserStoreError {
    #[error("username '{0}' already exists")]
    UsernameTaken(String),

    #[error("email '{0}' already exists")]
    EmailTaken(String),

    /// Backing storage failed
    #[error("user store unavailable: {0}")]
    Unavailable(String),
}

/// User storage used by the login flow
pub trait UserStore: Send + Sync {
    /// Inserts a new user
    ///
    /// # Errors
    ///
    /// Returns `UsernameTaken` or `EmailTaken` on uniqueness violations.
    fn create(&self, data: CreateUser) -> Result<User, UserStoreError>;

    /// Finds a user by username
    fn find_by_username(&self, username: &str) -> Result<Option<User>, UserStoreError>;
}

/// Process-local user store
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserStore for InMemoryUserStore {
    fn create(&self, data: CreateUser) -> Result<User, UserStoreError> {
        let mut users = self
            .users
            .write()
            .map_err(|_| UserStoreError::Unavailable("user table lock poisoned".to_string()))?;

        if users.contains_key(&data.username) {
            return Err(UserStoreError::UsernameTaken(data.username));
        }

        if users.values().any(|u| u.email.eq_ignore_ascii_case(&data.email)) {
            return Err(UserStoreError::EmailTaken(data.email));
        }

        let now = Utc::now();
        let user = User {
            username: data.username,
            full_name: data.full_name,
            email: data.email,
            hashed_password: data.hashed_password,
            password_changed_at: now,
            created_at: now,
        };

        users.insert(user.username.clone(), user.clone());
        tracing::info!(username = %user.username, "user created");

        Ok(user)
    }

    fn find_by_username(&self, username: &str) -> Result<Option<User>, UserStoreError> {
        let users = self
            .users
            .read()
            .map_err(|_| UserStoreError::Unavailable("user table lock poisoned".to_string()))?;

        Ok(users.get(username).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str, email: &str) -> CreateUser {
        CreateUser {
            username: username.to_string(),
            full_name: "Test User".to_string(),
            email: email.to_string(),
            hashed_password: "$argon2id$test".to_string(),
        }
    }

    #[test]
    fn test_create_and_find() {
        let store = InMemoryUserStore::new();

        let user = store.create(new_user("alice", "alice@example.com")).unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.created_at, user.password_changed_at);

        let found = store.find_by_username("alice").unwrap().unwrap();
        assert_eq!(found, user);
        assert!(store.find_by_username("bob").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_username() {
        let store = InMemoryUserStore::new();
        store.create(new_user("alice", "alice@example.com")).unwrap();

        let result = store.create(new_user("alice", "other@example.com"));
        assert_eq!(result, Err(UserStoreError::UsernameTaken("alice".to_string())));
    }

    #[test]
    fn test_duplicate_email_is_case_insensitive() {
        let store = InMemoryUserStore::new();
        store.create(new_user("alice", "alice@example.com")).unwrap();

        let result = store.create(new_user("alice2", "ALICE@example.com"));
        assert_eq!(result, Err(UserStoreError::EmailTaken("ALICE@example.com".to_string())));
    }
}
