/// Data models
///
/// # Models
///
/// - `user`: User accounts resolved by the login flow

pub mod user;
