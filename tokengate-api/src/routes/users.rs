/// User endpoints
///
/// # Endpoints
///
/// - `POST /v1/users` - Create user
/// - `POST /v1/users/login` - Login and get an access token
/// - `GET /v1/users/me` - Current user (requires `Authorization: Bearer <token>`)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokengate_shared::{
    auth::password,
    models::user::{CreateUser, User},
    token::Payload,
};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Create user request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    /// Letters and digits only
    #[validate(custom(function = "validate_username"))]
    pub username: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    #[validate(length(min = 1, max = 100, message = "Full name is required"))]
    pub full_name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(custom(function = "validate_username"))]
    pub username: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Public view of a user (no password hash)
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub password_changed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            full_name: user.full_name,
            email: user.email,
            password_changed_at: user.password_changed_at,
            created_at: user.created_at,
        }
    }
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token for the `Authorization` header
    pub access_token: String,

    /// When the access token stops being accepted
    pub access_token_expires_at: DateTime<Utc>,

    pub user: UserResponse,
}

/// Current user response
#[derive(Debug, Serialize, Deserialize)]
pub struct CurrentUserResponse {
    pub user: UserResponse,

    /// ID of the token used for this request
    pub token_id: Uuid,

    /// When that token expires
    pub expires_at: DateTime<Utc>,

    /// Whole seconds the token has left
    pub expires_in_secs: i64,
}

fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.is_empty() || !username.chars().all(|c| c.is_ascii_alphanumeric()) {
        let mut err = ValidationError::new("alphanumeric");
        err.message = Some("Username must contain only letters and digits".into());
        return Err(err);
    }
    Ok(())
}

/// Create user endpoint
///
/// ```text
/// POST /v1/users
/// Content-Type: application/json
///
/// {
///   "username": "alice",
///   "password": "secret123",
///   "full_name": "Alice Liddell",
///   "email": "alice@example.com"
/// }
/// ```
///
/// # Errors
///
/// - `409 Conflict`: Username or email already exists
/// - `422 Unprocessable Entity`: Validation failed
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    req.validate()?;

    let hashed_password = password::hash_password(&req.password)?;

    let user = state.users.create(CreateUser {
        username: req.username,
        full_name: req.full_name,
        email: req.email,
        hashed_password,
    })?;

    Ok(Json(user.into()))
}

/// Login endpoint
///
/// Checks the password and issues an access token valid for the configured
/// access token duration.
///
/// ```text
/// POST /v1/users/login
/// Content-Type: application/json
///
/// { "username": "alice", "password": "secret123" }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown user or wrong password
/// - `422 Unprocessable Entity`: Validation failed
pub async fn login_user(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    req.validate()?;

    let invalid_credentials = || ApiError::Unauthorized("Invalid username or password".to_string());

    let user = state
        .users
        .find_by_username(&req.username)?
        .ok_or_else(invalid_credentials)?;

    if !password::verify_password(&req.password, &user.hashed_password)? {
        tracing::info!(username = %user.username, "login rejected: wrong password");
        return Err(invalid_credentials());
    }

    let duration = state.config.token.access_token_duration;
    let (access_token, payload) = state.token_maker.issue_token(&user.username, duration)?;

    tracing::info!(username = %user.username, token_id = %payload.id, "access token issued");

    Ok(Json(LoginResponse {
        access_token,
        access_token_expires_at: payload.expires_at,
        user: user.into(),
    }))
}

/// Current user endpoint
///
/// Reads the payload the auth gate attached to the request.
pub async fn current_user(
    State(state): State<AppState>,
    Extension(payload): Extension<Payload>,
) -> ApiResult<Json<CurrentUserResponse>> {
    let user = state
        .users
        .find_by_username(&payload.username)?
        .ok_or_else(|| ApiError::NotFound(format!("User '{}' not found", payload.username)))?;

    let expires_in_secs = payload
        .time_until_expiration()
        .map(|left| left.num_seconds())
        .unwrap_or(0);

    Ok(Json(CurrentUserResponse {
        user: user.into(),
        token_id: payload.id,
        expires_at: payload.expires_at,
        expires_in_secs,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("Alice42").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("alice smith").is_err());
        assert!(validate_username("alice!").is_err());
    }

    #[test]
    fn test_create_user_request_validation() {
        let req = CreateUserRequest {
            username: "alice".to_string(),
            password: "secret123".to_string(),
            full_name: "Alice Liddell".to_string(),
            email: "alice@example.com".to_string(),
        };
        assert!(req.validate().is_ok());

        let req = CreateUserRequest {
            username: "al ice".to_string(),
            password: "short".to_string(),
            full_name: "".to_string(),
            email: "not-an-email".to_string(),
        };
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("password"));
        assert!(fields.contains_key("full_name"));
        assert!(fields.contains_key("email"));
    }
}
