/// Plain-text results of successful calls
///
/// Clients read the body, not the status: signup and verification always
/// answer 200 and say in the body whether they worked. Handlers return an
/// [`Outcome`] and the wire strings stay in one place.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The call did what it was asked
    Ok,

    /// `/verify` got a code that does not match
    InvalidCode,

    /// `/signup` named an existing user
    UsernameTaken,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Ok => "OK",
            Outcome::InvalidCode => "INVALID",
            Outcome::UsernameTaken => "Username already taken",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl IntoResponse for Outcome {
    fn into_response(self) -> Response {
        (StatusCode::OK, self.as_str()).into_response()
    }
}
