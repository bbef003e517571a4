/// API route handlers
///
/// - `health`: Health check endpoint
/// - `users`: User creation, login and current-user endpoints

pub mod health;
pub mod users;
