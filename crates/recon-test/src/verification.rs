//! Verification helpers for testing reconciliation plugins
//!
//! Provides assertion helpers to verify outcomes and transport traffic

use recon_common::{FieldValuesExt, Outcome, RpcRequest};
use thiserror::Error;

use crate::fixtures::{FakeOntap, MockCli};

/// Verification error types
#[derive(Error, Debug, PartialEq, Eq)]
pub enum VerificationError {
    #[error("Expected changed={expected}, got changed={actual}")]
    ChangedMismatch { expected: bool, actual: bool },

    #[error("Expected success, got error: {message}")]
    UnexpectedError { message: String },

    #[error("Expected an error containing '{expected}', got {actual:?}")]
    ErrorMismatch {
        expected: String,
        actual: Option<String>,
    },

    #[error("Expected commands {expected:?}, sent {actual:?}")]
    CommandMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    #[error("Expected {expected} calls to '{api}', found {actual}")]
    CallCountMismatch {
        api: String,
        expected: usize,
        actual: usize,
    },

    #[error("Expected attribute {field}='{expected}' on '{api}', got {actual:?}")]
    AttributeMismatch {
        api: String,
        field: String,
        expected: String,
        actual: Option<String>,
    },
}

/// Result type for verification operations
pub type VerifyResult<T> = Result<T, VerificationError>;

/// Verify an outcome succeeded with the given `changed` flag
pub fn assert_success(outcome: &Outcome, changed: bool) -> VerifyResult<()> {
    if let Some(message) = &outcome.error_message {
        return Err(VerificationError::UnexpectedError {
            message: message.clone(),
        });
    }
    if outcome.changed != changed {
        return Err(VerificationError::ChangedMismatch {
            expected: changed,
            actual: outcome.changed,
        });
    }
    Ok(())
}

/// Verify an outcome failed with a message containing `needle`
pub fn assert_failure(outcome: &Outcome, needle: &str) -> VerifyResult<()> {
    match &outcome.error_message {
        Some(message) if message.contains(needle) => Ok(()),
        other => Err(VerificationError::ErrorMismatch {
            expected: needle.to_string(),
            actual: other.clone(),
        }),
    }
}

/// Verify the exact command sequence a CLI session received
pub fn assert_commands(cli: &MockCli, expected: &[&str]) -> VerifyResult<()> {
    if cli.sent.iter().map(String::as_str).eq(expected.iter().copied()) {
        return Ok(());
    }
    Err(VerificationError::CommandMismatch {
        expected: expected.iter().map(|s| s.to_string()).collect(),
        actual: cli.sent.clone(),
    })
}

/// Management API verification helper
pub struct OntapVerifier<'a> {
    backend: &'a FakeOntap,
}

impl<'a> OntapVerifier<'a> {
    /// Create a new verifier
    pub fn new(backend: &'a FakeOntap) -> Self {
        Self { backend }
    }

    /// Verify the number of calls made to `api`
    pub fn assert_call_count(&self, api: &str, expected: usize) -> VerifyResult<()> {
        let actual = self.backend.calls_to(api).len();
        if actual != expected {
            return Err(VerificationError::CallCountMismatch {
                api: api.to_string(),
                expected,
                actual,
            });
        }
        Ok(())
    }

    /// Verify no mutating call was made
    pub fn assert_read_only(&self) -> VerifyResult<()> {
        for call in self.backend.calls() {
            if !call.api.ends_with("-get-iter") {
                return Err(VerificationError::CallCountMismatch {
                    api: call.api,
                    expected: 0,
                    actual: 1,
                });
            }
        }
        Ok(())
    }

    /// Verify the single call to `api` carried `field = expected`
    pub fn assert_attribute(&self, api: &str, field: &str, expected: &str) -> VerifyResult<()> {
        let calls = self.backend.calls_to(api);
        let call: &RpcRequest = match calls.as_slice() {
            [call] => call,
            other => {
                return Err(VerificationError::CallCountMismatch {
                    api: api.to_string(),
                    expected: 1,
                    actual: other.len(),
                })
            }
        };
        let actual = call.attributes.get_field(field);
        if actual == Some(expected) {
            return Ok(());
        }
        Err(VerificationError::AttributeMismatch {
            api: api.to_string(),
            field: field.to_string(),
            expected: expected.to_string(),
            actual: actual.map(str::to_string),
        })
    }
}
