/// Verification code delivery
///
/// Signup hands the generated password to a [`CodeDispatcher`] so it reaches
/// the user over the phone channel instead of the HTTP response. Real SMS
/// delivery is out of scope; [`LogDispatcher`] records the dispatch in the
/// log with the phone number masked and the code withheld.
///
/// # Example
///
/// ```
/// use courier_shared::dispatch::{CodeDispatcher, LogDispatcher};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let dispatcher = LogDispatcher::new();
/// dispatcher.dispatch("1111111111", "aB3dE6gH").await?;
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use tracing::info;

/// Dispatch error types
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The phone number cannot be delivered to
    #[error("Invalid phone number: {0}")]
    InvalidPhone(String),

    /// The delivery channel failed
    #[error("Delivery failed: {0}")]
    DeliveryFailed(String),
}

pub type DispatchResult<T> = Result<T, DispatchError>;

/// Sends a verification code to a phone number
#[async_trait]
pub trait CodeDispatcher: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Delivers `code` to `phone`
    async fn dispatch(&self, phone: &str, code: &str) -> DispatchResult<()>;
}

/// Dispatcher that only logs that a code was sent
#[derive(Debug, Clone, Default)]
pub struct LogDispatcher;

impl LogDispatcher {
    pub fn new() -> Self {
        LogDispatcher
    }
}

#[async_trait]
impl CodeDispatcher for LogDispatcher {
    fn name(&self) -> &str {
        "log"
    }

    async fn dispatch(&self, phone: &str, code: &str) -> DispatchResult<()> {
        if phone.trim().is_empty() {
            return Err(DispatchError::InvalidPhone("empty".to_string()));
        }

        info!(
            phone = %mask_phone(phone),
            code_length = code.len(),
            "Verification code dispatched"
        );
        Ok(())
    }
}

/// Keeps the last four characters of a phone number
pub fn mask_phone(phone: &str) -> String {
    let chars: Vec<char> = phone.chars().collect();
    let keep = chars.len().min(4);
    let hidden = chars.len() - keep;

    std::iter::repeat('*')
        .take(hidden)
        .chain(chars[hidden..].iter().copied())
        .collect()
}
