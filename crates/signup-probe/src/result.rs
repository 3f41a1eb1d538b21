//! Result and error types for signup-probe.

use thiserror::Error;

/// Result type for signup-probe operations
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors that can occur while driving the signup form
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunchError {
        /// Error message
        message: String,
    },

    /// Page error (creating, closing or scripting a page)
    #[error("Page error: {message}")]
    PageError {
        /// Error message
        message: String,
    },

    /// Navigation or transport error
    #[error("Navigation to {url} failed: {message}")]
    NavigationError {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// A wait or navigation ran out of time
    #[error("Timed out after {ms}ms waiting for {what}")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
        /// What was being waited for
        what: String,
    },

    /// An element action could not be performed
    #[error("Element {selector}: {message}")]
    ElementError {
        /// Selector that was targeted
        selector: String,
        /// Error message
        message: String,
    },

    /// Screenshot error
    #[error("Screenshot failed: {message}")]
    ScreenshotError {
        /// Error message
        message: String,
    },

    /// Assertion failed
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// Form data rejected at construction
    #[error("Invalid form data: {message}")]
    InvalidFormData {
        /// Error message
        message: String,
    },

    /// Fixture error (setup/teardown failed)
    #[error("Fixture error: {message}")]
    FixtureError {
        /// Error message
        message: String,
    },

    /// Suite configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl ProbeError {
    /// Create a timeout error
    #[must_use]
    pub fn timeout(ms: u64, what: impl Into<String>) -> Self {
        Self::Timeout {
            ms,
            what: what.into(),
        }
    }

    /// Create an element error
    #[must_use]
    pub fn element(selector: impl std::fmt::Display, message: impl Into<String>) -> Self {
        Self::ElementError {
            selector: selector.to_string(),
            message: message.into(),
        }
    }

    /// Create an assertion failure
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            message: message.into(),
        }
    }

    /// Whether this error came from a wait running out of time
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Whether this error is a navigation/transport failure
    #[must_use]
    pub const fn is_navigation(&self) -> bool {
        matches!(self, Self::NavigationError { .. })
    }
}
