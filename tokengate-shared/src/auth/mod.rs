/// Authentication utilities
///
/// # Modules
///
/// - [`middleware`]: Bearer-token gate for Axum routers
/// - [`password`]: Argon2id password hashing used by the login flow
///
/// # Example
///
/// ```no_run
/// use chrono::Duration;
/// use tokengate_shared::auth::password::{hash_password, verify_password};
/// use tokengate_shared::token::{PasetoMaker, TokenMaker};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// // Password check, then token issuance
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let maker = PasetoMaker::generate()?;
/// let token = maker.create_token("alice", Duration::minutes(15))?;
/// # Ok(())
/// # }
/// ```

pub mod middleware;
pub mod password;
