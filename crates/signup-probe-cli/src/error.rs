//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// The run finished with failing tests
    #[error("Test execution failed: {message}")]
    TestExecution {
        /// Error message
        message: String,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Library error
    #[error("{0}")]
    Probe(#[from] signup_probe::ProbeError),

    /// Report generation error
    #[error("Report generation failed: {message}")]
    ReportGeneration {
        /// Error message
        message: String,
    },
}

impl CliError {
    /// Create a test execution error
    #[must_use]
    pub fn test_execution(message: impl Into<String>) -> Self {
        Self::TestExecution {
            message: message.into(),
        }
    }

    /// Create a report generation error
    #[must_use]
    pub fn report_generation(message: impl Into<String>) -> Self {
        Self::ReportGeneration {
            message: message.into(),
        }
    }

    /// Process exit code for this error
    ///
    /// Failing tests exit with 1, everything that kept the run from
    /// happening exits with 2.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::TestExecution { .. } => 1,
            _ => 2,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use signup_probe::ProbeError;

    #[test]
    fn test_test_execution_error() {
        let err = CliError::test_execution("2 failed");
        assert!(err.to_string().contains("Test execution"));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_report_generation_error() {
        let err = CliError::report_generation("disk full");
        assert!(err.to_string().contains("Report"));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let cli_err: CliError = io_err.into();
        assert!(cli_err.to_string().contains("I/O"));
    }

    #[test]
    fn test_probe_error_from_keeps_message() {
        let probe = ProbeError::ConfigError {
            message: "unknown project 'safari'".to_string(),
        };
        let cli_err: CliError = probe.into();
        assert!(cli_err.to_string().contains("safari"));
        assert_eq!(cli_err.exit_code(), 2);
    }
}
