/// API route handlers
///
/// - `health`: liveness endpoints
/// - `auth`: signup, verification, registration id
/// - `contacts`: contact queue upload and drain
/// - `messages`: message queue post and drain

pub mod auth;
pub mod contacts;
pub mod health;
pub mod messages;
