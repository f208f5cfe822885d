//! cnos-intfcfg - interface configuration for Lenovo CNOS switches
//!
//! Translates interface and port-channel parameters into a CNOS command
//! batch and sends it over an established CLI session. Parameter errors are
//! reported with the switch's `Error-NNN` numbering before anything is sent.

#[macro_use]
mod types;

mod codes;
mod command;
mod dialect;
mod plugin;
mod portchannel;

pub use codes::*;
pub use command::*;
pub use dialect::*;
pub use plugin::*;
pub use portchannel::*;
pub use types::*;

use recon_common::{CliTransport, DesiredState, ExecutionMode, FieldValues, Outcome, Reconciler};
use tracing::{info, warn};

/// Runs one plugin invocation against `transport`.
pub async fn apply(
    plugin: Plugin,
    transport: &mut (dyn CliTransport + 'static),
    params: FieldValues,
    mode: ExecutionMode,
) -> Outcome {
    let desired = match DesiredState::from_params(plugin.schema(), params) {
        Ok(desired) => desired,
        Err(e) => {
            warn!(plugin = %plugin, error = %e, "Rejected parameters");
            return Outcome::from_error(&e);
        }
    };
    info!(plugin = %plugin, endpoint = %transport.endpoint(), "Applying interface configuration");

    let resource = InterfaceConfig::new(plugin);
    Reconciler::new(mode).reconcile(&resource, transport, &desired).await
}
