//! Idempotent remote-state reconciliation engine.
//!
//! This crate provides the shared machinery behind every configuration
//! plugin in the workspace:
//!
//! - [`desired`]: the Desired-State Descriptor and per-plugin parameter schemas
//! - [`resource`]: the plugin seam, including the State Fetcher contract
//! - [`planner`]: pure (desired, remote) → action planning
//! - [`executor`]: the only code that mutates remote state
//! - [`outcome`]: reduction of execution results to `{changed, msg}`
//! - [`engine`]: the [`Reconciler`] driving single and paired passes
//! - [`transport`], [`shell`], [`marker`]: CLI and RPC transports and
//!   textual error detection
//! - [`config`], [`logging`]: ambient setup for the binaries
//!
//! # Architecture
//!
//! One invocation flows strictly forward:
//!
//! 1. Validate caller parameters into a [`DesiredState`]
//! 2. Fetch the matching [`RemoteState`], if any
//! 3. Plan one [`Action`] per side
//! 4. Execute the actions in order
//! 5. Report an [`Outcome`]
//!
//! # Example
//!
//! ```ignore
//! use recon_common::{DesiredState, Reconciler};
//!
//! let desired = DesiredState::from_params(&ROLE_SCHEMA, params)?;
//! let outcome = Reconciler::default().reconcile(&UserRole, &mut rpc, &desired).await;
//! println!("{}", outcome.to_json()?);
//! ```

pub mod action;
pub mod config;
pub mod desired;
pub mod engine;
pub mod error;
pub mod executor;
pub mod fields;
pub mod logging;
pub mod marker;
pub mod outcome;
pub mod planner;
pub mod remote;
pub mod resource;
pub mod shell;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used items at crate root
pub use action::{Action, ActionKind};
pub use desired::{DesiredState, Operation, ParamKind, ParamSchema, ParamSpec, RequiredIf};
pub use engine::{Endpoint, Reconciler};
pub use error::{ErrorClass, ReconError, ReconResult};
pub use executor::{ExecutionMode, ExecutionResult};
pub use fields::{FieldValue, FieldValues, FieldValuesExt};
pub use marker::{ErrorMarker, SubstringMarker};
pub use outcome::Outcome;
pub use planner::PlannedAction;
pub use remote::RemoteState;
pub use resource::Resource;
pub use transport::{BackendFault, CliReply, CliTransport, RpcRequest, RpcResponse, RpcTransport};
