/// API route handlers
///
/// # Modules
///
/// - `auth`: Registration, token issuance, token refresh
/// - `health`: Health check endpoint
/// - `tasks`: Task CRUD and completion endpoints

pub mod auth;
pub mod health;
pub mod tasks;
