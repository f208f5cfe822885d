//! Interface and port-channel plugins.
//!
//! Both plugins resolve their positional parameters into an
//! [`InterfaceRequest`] once, then hand the engine a resource whose
//! creation is a batch of CLI lines. CNOS offers no read-back for these
//! settings, so every valid request plans a `Create`.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use recon_common::{
    CliTransport, DesiredState, ErrorMarker, Operation, ParamSchema, ParamSpec, ReconError,
    ReconResult, RemoteState, Resource,
};
use tracing::{debug, warn};

use crate::codes::ErrorCode;
use crate::command::{InterfaceArgs, InterfaceCommand};
use crate::dialect::CnosErrorMarker;
use crate::portchannel::LoadBalance;
use crate::types::InterfaceSelector;

/// Keyword in `interface_arg1` selecting the global load-balance command
pub const LOAD_BALANCE_KEYWORD: &str = "port-channel";

const ARG_KEYS: [&str; 7] = [
    "interface_arg1",
    "interface_arg2",
    "interface_arg3",
    "interface_arg4",
    "interface_arg5",
    "interface_arg6",
    "interface_arg7",
];

/// Parameters of the interface plugin
pub static INTERFACE_SCHEMA: ParamSchema = ParamSchema {
    plugin: "cnos_interface",
    params: &[
        ParamSpec::string("device_type"),
        ParamSpec::string("interface_option"),
        ParamSpec::string("interface_range"),
        ParamSpec::string("interface_arg1").required(),
        ParamSpec::string("interface_arg2"),
        ParamSpec::string("interface_arg3"),
        ParamSpec::string("interface_arg4"),
        ParamSpec::string("interface_arg5"),
        ParamSpec::string("interface_arg6"),
        ParamSpec::string("interface_arg7"),
    ],
    required_together: &[],
    required_if: &[],
};

/// Parameters of the port-channel plugin
pub static PORT_CHANNEL_SCHEMA: ParamSchema = ParamSchema {
    plugin: "cnos_portchannel",
    params: &[
        ParamSpec::string("device_type"),
        ParamSpec::string("interface_range"),
        ParamSpec::string("interface_arg1").required(),
        ParamSpec::string("interface_arg2"),
        ParamSpec::string("interface_arg3"),
        ParamSpec::string("interface_arg4"),
        ParamSpec::string("interface_arg5"),
        ParamSpec::string("interface_arg6"),
        ParamSpec::string("interface_arg7"),
    ],
    required_together: &[],
    required_if: &[],
};

/// Command-translation plugin selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plugin {
    Interface,
    PortChannel,
}

impl Plugin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Plugin::Interface => "interface",
            Plugin::PortChannel => "port-channel",
        }
    }

    /// Returns the parameter schema.
    pub fn schema(&self) -> &'static ParamSchema {
        match self {
            Plugin::Interface => &INTERFACE_SCHEMA,
            Plugin::PortChannel => &PORT_CHANNEL_SCHEMA,
        }
    }
}

impl fmt::Display for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Plugin {
    type Err = ReconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "interface" | "cnos_interface" => Ok(Plugin::Interface),
            "port-channel" | "portchannel" | "cnos_portchannel" => Ok(Plugin::PortChannel),
            other => Err(ReconError::validation(
                "plugin",
                format!("must be one of: interface, port-channel (got '{}')", other),
            )),
        }
    }
}

/// Fully validated request
#[derive(Debug, Clone, PartialEq)]
pub enum InterfaceRequest {
    /// A sub-command inside an interface context
    Interface {
        selector: InterfaceSelector,
        command: InterfaceCommand,
    },
    /// The global load-balance command
    LoadBalance(LoadBalance),
}

impl InterfaceRequest {
    /// Resolves the positional parameters of `plugin`.
    pub fn resolve(plugin: Plugin, desired: &DesiredState) -> Result<Self, ErrorCode> {
        let args: InterfaceArgs<'_> = ARG_KEYS.map(|key| desired.get(key));

        if plugin == Plugin::PortChannel && args[0] == Some(LOAD_BALANCE_KEYWORD) {
            return LoadBalance::parse(args[1], args[2]).map(InterfaceRequest::LoadBalance);
        }

        let kind = match plugin {
            Plugin::Interface => desired.get("interface_option"),
            Plugin::PortChannel => Some("port-channel"),
        };
        let selector = InterfaceSelector::parse(kind, desired.get("interface_range"))?;
        let command = InterfaceCommand::parse(&args)?;

        Ok(InterfaceRequest::Interface { selector, command })
    }

    /// Returns the command batch, in send order.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec!["configure terminal".to_string()];
        match self {
            InterfaceRequest::Interface { selector, command } => {
                lines.push(selector.context_line());
                lines.push(command.render());
            }
            InterfaceRequest::LoadBalance(lb) => lines.push(lb.render()),
        }
        lines.push("end".to_string());
        lines
    }
}

/// CLI resource applying one [`InterfaceRequest`]
pub struct InterfaceConfig {
    plugin: Plugin,
    marker: Box<dyn ErrorMarker>,
}

impl InterfaceConfig {
    /// Creates the resource with the CNOS error marker.
    pub fn new(plugin: Plugin) -> Self {
        Self::with_marker(plugin, Box::new(CnosErrorMarker))
    }

    /// Creates the resource with a custom error marker.
    pub fn with_marker(plugin: Plugin, marker: Box<dyn ErrorMarker>) -> Self {
        Self { plugin, marker }
    }
}

#[async_trait]
impl Resource for InterfaceConfig {
    type Transport = dyn CliTransport;
    type Identity = InterfaceRequest;
    type Payload = Vec<String>;

    fn kind(&self) -> &str {
        self.plugin.as_str()
    }

    fn identity(&self, _operation: Operation, desired: &DesiredState) -> ReconResult<InterfaceRequest> {
        InterfaceRequest::resolve(self.plugin, desired).map_err(ErrorCode::into_error)
    }

    fn payload(&self, identity: &InterfaceRequest, _desired: &DesiredState) -> ReconResult<Vec<String>> {
        Ok(identity.lines())
    }

    async fn fetch(
        &self,
        _transport: &mut Self::Transport,
        _identity: &InterfaceRequest,
    ) -> ReconResult<Option<RemoteState>> {
        Ok(None)
    }

    async fn create(&self, transport: &mut Self::Transport, payload: &Self::Payload) -> ReconResult<()> {
        for line in payload {
            debug!(endpoint = %transport.endpoint(), command = %line, ">>");
            let reply = match transport.send(line).await {
                Ok(reply) => reply,
                Err(e) => {
                    warn!(command = %line, error = %e, "Session failed");
                    return Err(ErrorCode::DeviceFailure.wrap_transport(transport.endpoint(), e));
                }
            };
            debug!(endpoint = %transport.endpoint(), output = %reply.raw_output, "<<");

            if let Some(message) = self.marker.detect(&reply.raw_output) {
                warn!(command = %line, error = %message, "Device rejected command");
                return Err(ReconError::transport(transport.endpoint(), message));
            }
        }
        Ok(())
    }

    async fn delete(
        &self,
        transport: &mut Self::Transport,
        _identity: &InterfaceRequest,
    ) -> ReconResult<()> {
        Err(ReconError::transport(
            transport.endpoint(),
            "removing interface configuration is not supported",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use recon_common::field_values;

    fn desired(plugin: Plugin, params: recon_common::FieldValues) -> DesiredState {
        DesiredState::from_params(plugin.schema(), params).unwrap()
    }

    #[test]
    fn test_interface_lines() {
        let state = desired(
            Plugin::Interface,
            field_values! {
                "interface_option" => "ethernet",
                "interface_range" => "33",
                "interface_arg1" => "mtu",
                "interface_arg2" => "1500",
            },
        );
        let request = InterfaceRequest::resolve(Plugin::Interface, &state).unwrap();
        assert_eq!(
            request.lines(),
            vec!["configure terminal", "interface ethernet 1/33", "mtu 1500", "end"]
        );
    }

    #[test]
    fn test_port_channel_context() {
        let state = desired(
            Plugin::PortChannel,
            field_values! {
                "interface_range" => "12",
                "interface_arg1" => "lacp",
                "interface_arg2" => "timeout",
                "interface_arg3" => "long",
            },
        );
        let request = InterfaceRequest::resolve(Plugin::PortChannel, &state).unwrap();
        assert_eq!(
            request.lines(),
            vec!["configure terminal", "interface port-channel 12", "lacp timeout long", "end"]
        );
    }

    #[test]
    fn test_load_balance_needs_no_range() {
        let state = desired(
            Plugin::PortChannel,
            field_values! {
                "interface_arg1" => "port-channel",
                "interface_arg2" => "source-mac",
            },
        );
        let request = InterfaceRequest::resolve(Plugin::PortChannel, &state).unwrap();
        assert_eq!(
            request.lines(),
            vec![
                "configure terminal",
                "port-channel load-balance ethernet source-mac",
                "end"
            ]
        );
    }

    #[test]
    fn test_selector_checked_before_command() {
        let state = desired(
            Plugin::Interface,
            field_values! {
                "interface_option" => "tunnel",
                "interface_range" => "1",
                "interface_arg1" => "teleport",
            },
        );
        assert_eq!(
            InterfaceRequest::resolve(Plugin::Interface, &state),
            Err(ErrorCode::InvalidInterface)
        );
    }

    #[test]
    fn test_identity_error_is_planning() {
        let state = desired(
            Plugin::Interface,
            field_values! {
                "interface_option" => "ethernet",
                "interface_range" => "1",
                "interface_arg1" => "channel-group",
                "interface_arg2" => "x",
            },
        );
        let err = InterfaceConfig::new(Plugin::Interface)
            .identity(Operation::Present, &state)
            .unwrap_err();
        assert_eq!(err.class(), recon_common::ErrorClass::Planning);
        assert!(err.to_string().starts_with("Error-201"));
    }

    #[test]
    fn test_plugin_from_str() {
        assert_eq!("interface".parse::<Plugin>().unwrap(), Plugin::Interface);
        assert_eq!("cnos_portchannel".parse::<Plugin>().unwrap(), Plugin::PortChannel);
        assert!("vlan".parse::<Plugin>().is_err());
    }
}
