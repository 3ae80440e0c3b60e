/// Account endpoints
///
/// - `POST /signup` - Create an account and dispatch its code (public)
/// - `POST /verify` - Confirm the dispatched code (public)
/// - `POST /registration_id` - Store the client's push registration id (Basic Auth)
///
/// Signup and verify report their result in the body with a 200 status;
/// see [`Outcome`].

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
    outcome::Outcome,
};
use axum::{extract::State, Extension, Form};
use courier_shared::{
    auth::password,
    models::user::{is_unique_violation, CreateUser, User},
};
use serde::Deserialize;
use tracing::{debug, info, warn};
use validator::Validate;

/// Signup request (form-encoded)
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 64, message = "Username must be 1 to 64 characters"))]
    pub username: String,

    /// Where the generated password is sent
    #[validate(length(min = 1, message = "Phone is required"))]
    pub phone: String,
}

/// Verification request (form-encoded)
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub username: String,
    pub code: String,
}

/// Registration id request (form-encoded)
#[derive(Debug, Deserialize, Validate)]
pub struct RegistrationIdRequest {
    #[validate(length(min = 1, max = 4096, message = "Registration id must be 1 to 4096 characters"))]
    pub registration_id: String,
}

/// Basic Auth splits the user-id from the password at the first `:`, so a
/// username containing one could never log in
fn check_username(username: &str) -> ApiResult<()> {
    if username.contains(':') {
        return Err(ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "username".to_string(),
            message: "Username must not contain ':'".to_string(),
        }]));
    }
    Ok(())
}

/// Creates an account
///
/// ```text
/// POST /signup
/// Content-Type: application/x-www-form-urlencoded
///
/// username=will&phone=1111111111
/// ```
///
/// Responds `OK` or `Username already taken`, both 200. A taken name wins
/// over any other problem with the form. The generated password goes to the
/// phone, never into the response. The user is committed before the code is
/// sent and removed again if sending fails.
///
/// # Errors
///
/// - `422 Unprocessable Entity`: empty, overlong or `:`-containing username, empty phone
/// - `500 Internal Server Error`: storage or dispatch failure
pub async fn signup(
    State(state): State<AppState>,
    Form(req): Form<SignupRequest>,
) -> ApiResult<Outcome> {
    if User::find_by_username(&state.db, &req.username).await?.is_some() {
        info!(username = %req.username, "Signup rejected: username taken");
        return Ok(Outcome::UsernameTaken);
    }

    req.validate()?;
    check_username(&req.username)?;

    let generated = password::generate_password();
    let password_hash = password::hash_password_blocking(&generated).await?;

    let user = match User::create(
        &state.db,
        CreateUser {
            username: req.username.clone(),
            password_hash,
            phone: Some(req.phone.clone()),
        },
    )
    .await
    {
        Ok(user) => user,
        // Lost a race with a concurrent signup for the same name
        Err(err) if is_unique_violation(&err) => {
            info!(username = %req.username, "Signup rejected: username taken");
            return Ok(Outcome::UsernameTaken);
        }
        Err(err) => return Err(err.into()),
    };

    if let Err(err) = state.dispatcher.dispatch(&req.phone, &generated).await {
        warn!(user_id = user.id, error = %err, "Code dispatch failed, removing user");
        User::delete(&state.db, user.id).await?;
        return Err(err.into());
    }

    info!(
        user_id = user.id,
        dispatcher = state.dispatcher.name(),
        "User signed up"
    );
    Ok(Outcome::Ok)
}

/// Confirms the code sent at signup
///
/// ```text
/// POST /verify
///
/// username=will&code=aB3dE6gH
/// ```
///
/// Responds `OK` when the code matches the user's current credential and
/// `INVALID` otherwise, including for unknown users. Always 200.
pub async fn verify(
    State(state): State<AppState>,
    Form(req): Form<VerifyRequest>,
) -> ApiResult<Outcome> {
    let Some(user) = User::find_by_username(&state.db, &req.username).await? else {
        debug!(username = %req.username, "Verification for unknown user");
        return Ok(Outcome::InvalidCode);
    };

    if !password::verify_password_blocking(&req.code, &user.password_hash).await? {
        debug!(user_id = user.id, "Verification code mismatch");
        return Ok(Outcome::InvalidCode);
    }

    if !user.verified {
        User::mark_verified(&state.db, user.id).await?;
        info!(user_id = user.id, "User verified");
    }

    Ok(Outcome::Ok)
}

/// Stores the caller's push registration id
///
/// ```text
/// POST /registration_id
/// Authorization: Basic d2lsbDpwYXNz
///
/// registration_id=1234
/// ```
pub async fn set_registration_id(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Form(req): Form<RegistrationIdRequest>,
) -> ApiResult<Outcome> {
    req.validate()?;

    if !User::set_registration_id(&state.db, user.id, &req.registration_id).await? {
        return Err(ApiError::Unauthorized("User no longer exists".to_string()));
    }

    debug!(user_id = user.id, "Registration id updated");
    Ok(Outcome::Ok)
}
