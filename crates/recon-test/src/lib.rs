//! Integration test infrastructure for reconciliation plugins
//!
//! Provides:
//! - A scripted CLI session that records every command sent
//! - An in-memory management API backend with fault injection
//! - Outcome and call-log verification helpers

pub mod fixtures;
mod verification;

pub use fixtures::*;
pub use verification::*;
