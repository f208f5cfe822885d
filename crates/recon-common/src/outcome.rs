//! Outcome Reporter.

use serde::{Deserialize, Serialize};

use crate::error::ReconError;
use crate::executor::ExecutionResult;

/// The externally observable result of one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// True iff at least one create or delete executed successfully.
    pub changed: bool,
    /// First failure, if any. Takes precedence over `changed` for exit status.
    #[serde(rename = "msg", default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl Outcome {
    /// Reduces per-action results to one outcome.
    ///
    /// A partial success followed by a failure is still a failed
    /// invocation; `changed` keeps its partial value so callers can tell
    /// that something was applied before the failure.
    pub fn from_results(results: &[ExecutionResult]) -> Self {
        let changed = results
            .iter()
            .any(|r| r.succeeded && r.kind.is_mutating());
        let error_message = results
            .iter()
            .find(|r| !r.succeeded)
            .map(|r| {
                r.error_detail
                    .clone()
                    .unwrap_or_else(|| format!("{} failed", r.kind))
            });
        Self {
            changed,
            error_message,
        }
    }

    /// An outcome for an invocation that failed before planning.
    pub fn from_error(err: &ReconError) -> Self {
        Self {
            changed: false,
            error_message: Some(err.to_string()),
        }
    }

    /// Returns true if the invocation failed.
    pub fn is_failed(&self) -> bool {
        self.error_message.is_some()
    }

    /// Serializes the outcome as a JSON object.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
