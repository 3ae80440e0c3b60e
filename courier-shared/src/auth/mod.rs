/// Authentication utilities
///
/// # Modules
///
/// - [`password`]: password generation and Argon2id hashing
/// - [`basic`]: HTTP Basic `Authorization` header parsing
///
/// [`authenticate`] is the credential check run on every protected request.
///
/// # Example
///
/// ```no_run
/// use courier_shared::auth::{authenticate, basic::BasicCredentials};
/// use sqlx::SqlitePool;
///
/// # async fn example(pool: SqlitePool) -> Result<(), Box<dyn std::error::Error>> {
/// let creds = BasicCredentials::from_header("Basic d2lsbDpwYXNz")?;
/// let user = authenticate(&pool, &creds).await?;
/// println!("Authenticated {}", user.username);
/// # Ok(())
/// # }
/// ```

pub mod basic;
pub mod password;

use sqlx::SqlitePool;
use tracing::debug;

use crate::models::user::User;
use basic::BasicCredentials;

/// Error type for credential checks
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No `Authorization` header on the request
    #[error("Missing credentials")]
    MissingCredentials,

    /// Header present but not decodable Basic credentials
    #[error("Invalid authorization header: {0}")]
    InvalidFormat(String),

    /// Unknown user or wrong password
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Stored hash could not be checked
    #[error("Password check failed: {0}")]
    Password(#[from] password::PasswordError),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Resolves Basic credentials to a stored user
///
/// Unknown usernames and wrong passwords are indistinguishable to the caller.
pub async fn authenticate(
    pool: &SqlitePool,
    credentials: &BasicCredentials,
) -> Result<User, AuthError> {
    let Some(user) = User::find_by_username(pool, &credentials.username).await? else {
        debug!(username = %credentials.username, "Authentication failed: unknown user");
        return Err(AuthError::InvalidCredentials);
    };

    if !password::verify_password_blocking(&credentials.password, &user.password_hash).await? {
        debug!(user_id = user.id, "Authentication failed: wrong password");
        return Err(AuthError::InvalidCredentials);
    }

    Ok(user)
}
