//! Error-marker detection for CLI output.
//!
//! CLI backends have no structured error channel, so failure is inferred by
//! scanning the reply text. This is a heuristic: a legitimate reply that
//! happens to contain the marker is reported as a failure, and a dialect
//! that reports errors without the marker goes unnoticed. Each CLI dialect
//! supplies its own [`ErrorMarker`].

/// Decides whether a raw CLI reply reports a failure.
pub trait ErrorMarker: Send + Sync {
    /// Returns a failure description if `raw_output` reports an error.
    fn detect(&self, raw_output: &str) -> Option<String>;
}

/// Case-sensitive substring marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstringMarker {
    marker: String,
}

impl SubstringMarker {
    /// Creates a marker matching `marker` anywhere in the output.
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }
}

impl Default for SubstringMarker {
    fn default() -> Self {
        Self::new("Error")
    }
}

impl ErrorMarker for SubstringMarker {
    fn detect(&self, raw_output: &str) -> Option<String> {
        let start = raw_output.find(&self.marker)?;
        let line = raw_output[start..].lines().next().unwrap_or_default();
        Some(line.trim().to_string())
    }
}
