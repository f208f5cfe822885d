//! Error types for reconciliation operations.
//!
//! Every failure inside the engine is one of these variants. Nothing is
//! raised past the engine boundary: the reporter folds them into an
//! [`Outcome`](crate::Outcome) message.

use thiserror::Error;

/// Result type alias for reconciliation operations.
pub type ReconResult<T> = Result<T, ReconError>;

/// Errors that can occur while reconciling a resource.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconError {
    /// Malformed or incomplete desired state, detected before any remote call.
    #[error("Invalid parameter {field}: {message}")]
    Validation {
        /// The parameter that failed validation.
        field: String,
        /// Error message.
        message: String,
    },

    /// Structurally valid parameters that form a disallowed combination.
    #[error("{code}: {message}")]
    Planning {
        /// Stable identifying code (e.g. "Error-201").
        code: String,
        /// Error message.
        message: String,
    },

    /// The transport could not deliver a call or reported a textual failure.
    #[error("Transport failure on {endpoint}: {message}")]
    Transport {
        /// The endpoint the call was addressed to.
        endpoint: String,
        /// Error message.
        message: String,
    },

    /// The backend rejected a structured call with a fault code.
    #[error("Backend fault {code} on {endpoint}: {message}")]
    Backend {
        /// The endpoint that raised the fault.
        endpoint: String,
        /// Backend fault code.
        code: String,
        /// Backend fault message.
        message: String,
    },

    /// Configuration file could not be read or parsed.
    #[error("Configuration error: {message}")]
    Config {
        /// Error message.
        message: String,
    },
}

/// Coarse error classes exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Bad caller input.
    Validation,
    /// Disallowed parameter combination.
    Planning,
    /// Remote call failed.
    Transport,
    /// Local configuration problem.
    Config,
}

impl ReconError {
    /// Creates a validation error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a planning error.
    pub fn planning(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Planning {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Creates a transport error.
    pub fn transport(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// The planning error emitted when identity fields are missing.
    pub fn missing_fields() -> Self {
        Self::planning("missing-fields", "missing required field combination")
    }

    /// Returns the class of this error.
    pub fn class(&self) -> ErrorClass {
        match self {
            ReconError::Validation { .. } => ErrorClass::Validation,
            ReconError::Planning { .. } => ErrorClass::Planning,
            ReconError::Transport { .. } | ReconError::Backend { .. } => ErrorClass::Transport,
            ReconError::Config { .. } => ErrorClass::Config,
        }
    }

    /// Returns true if an outer caller may retry the whole invocation.
    ///
    /// The engine itself never retries.
    pub fn is_retryable(&self) -> bool {
        self.class() == ErrorClass::Transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ReconError::validation("name", "is required");
        assert_eq!(err.to_string(), "Invalid parameter name: is required");

        let err = ReconError::planning("Error-201", "Invalid channel-group number");
        assert_eq!(err.to_string(), "Error-201: Invalid channel-group number");
    }

    #[test]
    fn test_backend_error_display() {
        let err = ReconError::Backend {
            endpoint: "cluster-a".to_string(),
            code: "13001".to_string(),
            message: "entry doesn't exist".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Backend fault 13001 on cluster-a: entry doesn't exist"
        );
    }

    #[test]
    fn test_classification() {
        assert_eq!(
            ReconError::missing_fields().class(),
            ErrorClass::Planning
        );
        assert_eq!(
            ReconError::transport("sw1", "timed out").class(),
            ErrorClass::Transport
        );
        assert_eq!(ReconError::config("bad toml").class(), ErrorClass::Config);
    }

    #[test]
    fn test_is_retryable() {
        assert!(ReconError::transport("sw1", "connection reset").is_retryable());
        assert!(!ReconError::validation("vserver", "is required").is_retryable());
        assert!(!ReconError::planning("Error-233", "unsupported").is_retryable());
    }
}
