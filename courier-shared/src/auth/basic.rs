/// HTTP Basic credentials
///
/// Every protected request carries `Authorization: Basic base64(user:pass)`.
/// Nothing is remembered between requests.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use super::AuthError;

/// Username/password pair decoded from an `Authorization` header
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl BasicCredentials {
    /// Parses the value of an `Authorization` header
    ///
    /// The scheme is matched case-insensitively. The password is everything
    /// after the first `:`, so it may itself contain colons.
    pub fn from_header(value: &str) -> Result<Self, AuthError> {
        let (scheme, encoded) = value
            .trim()
            .split_once(' ')
            .ok_or_else(|| AuthError::InvalidFormat("Expected Basic credentials".to_string()))?;

        if !scheme.eq_ignore_ascii_case("basic") {
            return Err(AuthError::InvalidFormat(
                "Expected Basic credentials".to_string(),
            ));
        }

        let decoded = STANDARD
            .decode(encoded.trim())
            .map_err(|_| AuthError::InvalidFormat("Credentials are not valid base64".to_string()))?;

        let decoded = String::from_utf8(decoded)
            .map_err(|_| AuthError::InvalidFormat("Credentials are not valid UTF-8".to_string()))?;

        let (username, password) = decoded
            .split_once(':')
            .ok_or_else(|| AuthError::InvalidFormat("Credentials missing ':' separator".to_string()))?;

        Ok(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    /// Encodes the pair as an `Authorization` header value
    pub fn to_header(&self) -> String {
        let raw = format!("{}:{}", self.username, self.password);
        format!("Basic {}", STANDARD.encode(raw))
    }
}
