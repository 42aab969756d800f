//! Unified error type for frontends driving the engine.

use thiserror::Error;

use sugarplum_core::Notice;

use crate::backend::BackendError;
use crate::checkout::CheckoutError;
use crate::config::ConfigError;

// Storage failures never reach this type: cart persistence is best-effort
// and logged inside `CartStore`.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),
}

impl EngineError {
    /// Renders this error as something fit to show a shopper. Validation
    /// problems keep their exact wording; infrastructure failures get a
    /// generic line, with the server's message passed through when the
    /// backend sent one.
    pub fn to_notice(&self) -> Notice {
        match self {
            Self::Checkout(CheckoutError::EmptyCart | CheckoutError::MissingField(_)) => {
                Notice::warning(self.to_string())
            }
            Self::Backend(BackendError::Status { message, .. })
            | Self::Checkout(CheckoutError::Backend(BackendError::Status { message, .. })) => {
                Notice::error(message.clone())
            }
            Self::Backend(BackendError::Network(_))
            | Self::Checkout(CheckoutError::Backend(BackendError::Network(_))) => Notice::error(
                "Could not reach the shop. Please check your connection and try again.",
            ),
            _ => Notice::error("Something went wrong. Please try again."),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use sugarplum_core::Severity;

    use super::*;

    #[test]
    fn test_validation_errors_keep_wording() {
        let err = EngineError::from(CheckoutError::MissingField("email"));
        let notice = err.to_notice();
        assert_eq!(notice.severity, Severity::Warning);
        assert_eq!(notice.message, "Please enter your email.");
    }

    #[test]
    fn test_server_message_passes_through() {
        let err = EngineError::from(BackendError::Status {
            status: 500,
            message: "inventory sync in progress".to_owned(),
        });
        let notice = err.to_notice();
        assert_eq!(notice.severity, Severity::Error);
        assert_eq!(notice.message, "inventory sync in progress");
    }

    #[test]
    fn test_parse_errors_get_generic_line() {
        let parse = serde_json::from_str::<serde_json::Value>("{nope").unwrap_err();
        let err = EngineError::from(BackendError::Parse(parse));
        assert_eq!(
            err.to_notice().message,
            "Something went wrong. Please try again."
        );
    }
}
