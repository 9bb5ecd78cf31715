//! Result and error types for ohouse-probe.

use crate::locator::Locator;
use thiserror::Error;

/// Result type for probe operations
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors that can occur while driving the device
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Locator input has the wrong shape (empty expression, unknown strategy, empty chain)
    #[error("Invalid locator: {message}")]
    InvalidLocator {
        /// Error message
        message: String,
    },

    /// No locator in the chain resolved before its deadline
    #[error("Element not found after trying {}", describe_chain(.attempted))]
    NotFound {
        /// Every locator that was tried, in order
        attempted: Vec<Locator>,
    },

    /// A polled condition did not hold before the deadline
    #[error("Timed out after {ms}ms waiting for {waited_for}{}", last_error_suffix(.last_error))]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
        /// Description of the condition
        waited_for: String,
        /// Last transient error observed while polling, if any
        last_error: Option<String>,
    },

    /// The automation server answered with a W3C error payload
    #[error("Automation server error ({error}): {message}")]
    Protocol {
        /// W3C error code such as `no such element`
        error: String,
        /// Error message
        message: String,
    },

    /// The automation server sent something that is not a W3C response
    #[error("Unexpected automation response: {message}")]
    UnexpectedResponse {
        /// Error message
        message: String,
    },

    /// A device shell command could not be run
    #[error("Device command `{command}` failed: {message}")]
    Device {
        /// The command line that was run
        command: String,
        /// Error message
        message: String,
    },

    /// Hard assertion failed
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// Configuration is missing or unreadable
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// A retried flow failed on every attempt
    #[error("{operation} failed after {attempts} attempt(s): {last}")]
    RetriesExhausted {
        /// What was being retried
        operation: String,
        /// Attempts made
        attempts: u32,
        /// Error from the final attempt
        last: Box<ProbeError>,
    },

    /// Session setup or teardown failed
    #[error("Session fixture error: {message}")]
    Fixture {
        /// Error message
        message: String,
    },

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl ProbeError {
    /// Create an invalid locator error
    #[must_use]
    pub fn invalid_locator(message: impl Into<String>) -> Self {
        Self::InvalidLocator {
            message: message.into(),
        }
    }

    /// Create a hard assertion failure
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a device command error
    #[must_use]
    pub fn device(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Device {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Whether a poller may treat this error as "not satisfied yet".
    ///
    /// Query failures and absent elements look the same to a polling caller.
    /// Programmer and configuration mistakes never get better by waiting.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        !matches!(
            self,
            Self::InvalidLocator { .. } | Self::AssertionFailed { .. } | Self::Config { .. }
        )
    }

    /// True for the W3C `no such element` / `stale element reference` answers
    #[must_use]
    pub fn is_missing_element(&self) -> bool {
        match self {
            Self::Protocol { error, .. } => {
                error == "no such element" || error == "stale element reference"
            }
            Self::NotFound { .. } => true,
            _ => false,
        }
    }
}

fn describe_chain(attempted: &[Locator]) -> String {
    let parts: Vec<String> = attempted.iter().map(ToString::to_string).collect();
    format!("{} locator(s): [{}]", attempted.len(), parts.join(", "))
}

#[allow(clippy::ref_option)]
fn last_error_suffix(last_error: &Option<String>) -> String {
    last_error
        .as_deref()
        .map_or_else(String::new, |e| format!(" (last error: {e})"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod display_tests {
        use super::*;

        #[test]
        fn test_not_found_lists_chain() {
            let err = ProbeError::NotFound {
                attempted: vec![
                    Locator::id("net.bucketplace:id/logo"),
                    Locator::xpath("//android.widget.ImageView"),
                ],
            };
            let text = err.to_string();
            assert!(text.contains("2 locator(s)"));
            assert!(text.contains("id=net.bucketplace:id/logo"));
            assert!(text.contains("xpath=//android.widget.ImageView"));
        }

        #[test]
        fn test_timeout_mentions_last_error() {
            let err = ProbeError::Timeout {
                ms: 1500,
                waited_for: "toast".to_string(),
                last_error: Some("stale".to_string()),
            };
            assert_eq!(
                err.to_string(),
                "Timed out after 1500ms waiting for toast (last error: stale)"
            );
        }

        #[test]
        fn test_timeout_without_last_error() {
            let err = ProbeError::Timeout {
                ms: 10,
                waited_for: "x".to_string(),
                last_error: None,
            };
            assert_eq!(err.to_string(), "Timed out after 10ms waiting for x");
        }
    }

    mod classification_tests {
        use super::*;

        #[test]
        fn test_programmer_errors_are_not_transient() {
            assert!(!ProbeError::invalid_locator("empty").is_transient());
            assert!(!ProbeError::config("LOGIN_ID").is_transient());
            assert!(!ProbeError::assertion("nope").is_transient());
        }

        #[test]
        fn test_query_errors_are_transient() {
            let err = ProbeError::Protocol {
                error: "stale element reference".to_string(),
                message: String::new(),
            };
            assert!(err.is_transient());
            assert!(err.is_missing_element());
            assert!(ProbeError::device("adb", "gone").is_transient());
        }

        #[test]
        fn test_other_protocol_errors_are_not_missing_elements() {
            let err = ProbeError::Protocol {
                error: "invalid session id".to_string(),
                message: String::new(),
            };
            assert!(!err.is_missing_element());
        }
    }
}
