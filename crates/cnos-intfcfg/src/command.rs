//! Interface sub-commands.
//!
//! The positional `interface_arg1..7` parameters select and parameterize a
//! single command issued inside the interface configuration context.
//! Parsing happens before any device call; a malformed argument yields the
//! matching [`ErrorCode`].

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::codes::ErrorCode;
use crate::types::{
    parse_bounded, parse_token, BridgeportMode, ChannelGroupMode, Dot1qTag, Duplex,
    FlowDirection, LacpTimeout, LldpTlv, Speed, StormTraffic, MAX_PORT_CHANNEL, MAX_VLAN_ID,
};

static MAC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9A-Fa-f]{4}\.[0-9A-Fa-f]{4}\.[0-9A-Fa-f]{4}$").expect("Invalid regex pattern")
});

static ACL_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_\-]{1,199}$").expect("Invalid regex pattern"));

static LEVEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,3}(\.\d{1,2})?$").expect("Invalid regex pattern"));

/// Positional interface arguments
pub type InterfaceArgs<'a> = [Option<&'a str>; 7];

/// Which VLAN list a trunk command edits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrunkList {
    /// `allowed vlan`
    Allowed,
    /// `native vlan`
    Native,
}

impl TrunkList {
    fn as_str(&self) -> &'static str {
        match self {
            TrunkList::Allowed => "allowed",
            TrunkList::Native => "native",
        }
    }
}

/// VLAN selection of a trunk command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrunkVlans {
    All,
    None,
    Add(u32),
    Remove(u32),
    Only(u32),
}

impl fmt::Display for TrunkVlans {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrunkVlans::All => f.write_str("all"),
            TrunkVlans::None => f.write_str("none"),
            TrunkVlans::Add(id) => write!(f, "add {}", id),
            TrunkVlans::Remove(id) => write!(f, "remove {}", id),
            TrunkVlans::Only(id) => write!(f, "{}", id),
        }
    }
}

/// LLDP sub-options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LldpSetting {
    Receive,
    TrapNotification,
    Transmit,
    TlvSelect(LldpTlv),
}

/// Load-interval sub-options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadInterval {
    /// `load-interval <delay>`
    Delay(u32),
    /// `load-interval counter <n> <delay>`
    Counter { counter: u32, delay: u32 },
}

/// One validated interface sub-command
#[derive(Debug, Clone, PartialEq)]
pub enum InterfaceCommand {
    ChannelGroup { number: u32, mode: ChannelGroupMode },
    Switchport,
    SwitchportAccessVlan(u32),
    SwitchportMode(BridgeportMode),
    SwitchportTrunk { list: TrunkList, vlans: TrunkVlans },
    Description(String),
    Duplex(Duplex),
    Flowcontrol { direction: FlowDirection, enabled: bool },
    LacpPortPriority(u32),
    LacpSuspendIndividual,
    LacpTimeout(LacpTimeout),
    Lldp(LldpSetting),
    LoadInterval(LoadInterval),
    MacAccessGroup(String),
    MacAddress(String),
    MacLearnDisable,
    MicroburstThreshold(u32),
    Mtu(u32),
    Shutdown,
    NoShutdown,
    SnmpTrapLinkStatus,
    Speed(Speed),
    StormControl { traffic: StormTraffic, level: String },
    Dot1qTagNative(Dot1qTag),
    Vrrp { id: u32, ipv6: bool },
}

impl InterfaceCommand {
    /// Validates positional arguments into a command.
    pub fn parse(args: &InterfaceArgs<'_>) -> Result<Self, ErrorCode> {
        let [arg1, arg2, arg3, arg4, arg5, _, _] = *args;

        let command = match arg1.unwrap_or_default() {
            "channel-group" => InterfaceCommand::ChannelGroup {
                number: parse_bounded(arg2, 1, MAX_PORT_CHANNEL, ErrorCode::ChannelGroupNumber)?,
                mode: parse_token(arg3, ErrorCode::ChannelGroupMode)?,
            },
            "switchport" => parse_switchport(arg2, arg3, arg4, arg5)?,
            "description" => match arg2 {
                Some(text) if (1..=80).contains(&text.chars().count()) => {
                    InterfaceCommand::Description(text.to_string())
                }
                _ => return Err(ErrorCode::Description),
            },
            "duplex" => InterfaceCommand::Duplex(parse_token(arg2, ErrorCode::Duplex)?),
            "flowcontrol" => {
                let direction = parse_token(arg2, ErrorCode::FlowcontrolDirection)?;
                let enabled = match arg3 {
                    Some("on") => true,
                    Some("off") => false,
                    _ => return Err(ErrorCode::FlowcontrolState),
                };
                InterfaceCommand::Flowcontrol { direction, enabled }
            }
            "lacp" => match arg2 {
                Some("port-priority") => InterfaceCommand::LacpPortPriority(parse_bounded(
                    arg3,
                    1,
                    65535,
                    ErrorCode::LacpPortPriority,
                )?),
                Some("suspend-individual") => InterfaceCommand::LacpSuspendIndividual,
                Some("timeout") => {
                    InterfaceCommand::LacpTimeout(parse_token(arg3, ErrorCode::LacpTimeout)?)
                }
                _ => return Err(ErrorCode::LacpOption),
            },
            "lldp" => InterfaceCommand::Lldp(match arg2 {
                Some("receive") => LldpSetting::Receive,
                Some("trap-notification") => LldpSetting::TrapNotification,
                Some("transmit") => LldpSetting::Transmit,
                Some("tlv-select") => LldpSetting::TlvSelect(parse_token(arg3, ErrorCode::LldpTlv)?),
                _ => return Err(ErrorCode::LldpOption),
            }),
            "load-interval" => InterfaceCommand::LoadInterval(parse_load_interval(arg2, arg3, arg4)?),
            "mac" => match arg2 {
                Some(name) if ACL_NAME_RE.is_match(name) => {
                    InterfaceCommand::MacAccessGroup(name.to_string())
                }
                _ => return Err(ErrorCode::MacAccessGroup),
            },
            "mac-address" => match arg2 {
                Some(mac) if MAC_RE.is_match(mac) => InterfaceCommand::MacAddress(mac.to_lowercase()),
                _ => return Err(ErrorCode::MacAddress),
            },
            "mac-learn" => InterfaceCommand::MacLearnDisable,
            "microburst-detection" => InterfaceCommand::MicroburstThreshold(parse_bounded(
                arg2,
                1,
                10000,
                ErrorCode::MicroburstThreshold,
            )?),
            "mtu" => InterfaceCommand::Mtu(parse_bounded(arg2, 64, 9216, ErrorCode::Mtu)?),
            "shutdown" => InterfaceCommand::Shutdown,
            "no shutdown" => InterfaceCommand::NoShutdown,
            "snmp" => InterfaceCommand::SnmpTrapLinkStatus,
            "speed" => InterfaceCommand::Speed(parse_token(arg2, ErrorCode::Speed)?),
            "storm-control" => {
                let traffic = parse_token(arg2, ErrorCode::StormControlOption)?;
                let level = parse_storm_level(arg3)?;
                InterfaceCommand::StormControl { traffic, level }
            }
            "vlan" => InterfaceCommand::Dot1qTagNative(parse_token(arg2, ErrorCode::Dot1qTag)?),
            "vrrp" => {
                let id = parse_bounded(arg2, 1, 255, ErrorCode::VrrpId)?;
                let ipv6 = match arg3 {
                    None => false,
                    Some("ipv6") => true,
                    Some(_) => return Err(ErrorCode::VrrpOption),
                };
                InterfaceCommand::Vrrp { id, ipv6 }
            }
            _ => return Err(ErrorCode::UnknownKeyword),
        };

        Ok(command)
    }

    /// Returns the CLI line for this command.
    pub fn render(&self) -> String {
        match self {
            InterfaceCommand::ChannelGroup { number, mode } => {
                format!("channel-group {} mode {}", number, mode)
            }
            InterfaceCommand::Switchport => "switchport".to_string(),
            InterfaceCommand::SwitchportAccessVlan(id) => format!("switchport access vlan {}", id),
            InterfaceCommand::SwitchportMode(mode) => format!("switchport mode {}", mode),
            InterfaceCommand::SwitchportTrunk { list, vlans } => {
                format!("switchport trunk {} vlan {}", list.as_str(), vlans)
            }
            InterfaceCommand::Description(text) => format!("description {}", text),
            InterfaceCommand::Duplex(duplex) => format!("duplex {}", duplex),
            InterfaceCommand::Flowcontrol { direction, enabled } => format!(
                "flowcontrol {} {}",
                direction,
                if *enabled { "on" } else { "off" }
            ),
            InterfaceCommand::LacpPortPriority(priority) => {
                format!("lacp port-priority {}", priority)
            }
            InterfaceCommand::LacpSuspendIndividual => "lacp suspend-individual".to_string(),
            InterfaceCommand::LacpTimeout(timeout) => format!("lacp timeout {}", timeout),
            InterfaceCommand::Lldp(setting) => match setting {
                LldpSetting::Receive => "lldp receive".to_string(),
                LldpSetting::TrapNotification => "lldp trap-notification".to_string(),
                LldpSetting::Transmit => "lldp transmit".to_string(),
                LldpSetting::TlvSelect(tlv) => format!("lldp tlv-select {}", tlv),
            },
            InterfaceCommand::LoadInterval(LoadInterval::Delay(delay)) => {
                format!("load-interval {}", delay)
            }
            InterfaceCommand::LoadInterval(LoadInterval::Counter { counter, delay }) => {
                format!("load-interval counter {} {}", counter, delay)
            }
            InterfaceCommand::MacAccessGroup(name) => format!("mac port access-group {}", name),
            InterfaceCommand::MacAddress(mac) => format!("mac-address {}", mac),
            InterfaceCommand::MacLearnDisable => "mac-learn disable".to_string(),
            InterfaceCommand::MicroburstThreshold(threshold) => {
                format!("microburst-detection enable threshold {}", threshold)
            }
            InterfaceCommand::Mtu(mtu) => format!("mtu {}", mtu),
            InterfaceCommand::Shutdown => "shutdown".to_string(),
            InterfaceCommand::NoShutdown => "no shutdown".to_string(),
            InterfaceCommand::SnmpTrapLinkStatus => "snmp trap link-status".to_string(),
            InterfaceCommand::Speed(speed) => format!("speed {}", speed),
            InterfaceCommand::StormControl { traffic, level } => {
                format!("storm-control {} level {}", traffic, level)
            }
            InterfaceCommand::Dot1qTagNative(Dot1qTag::EgressOnly) => {
                "vlan dot1q tag native egress-only enable".to_string()
            }
            InterfaceCommand::Dot1qTagNative(tag) => format!("vlan dot1q tag native {}", tag),
            InterfaceCommand::Vrrp { id, ipv6: false } => format!("vrrp {}", id),
            InterfaceCommand::Vrrp { id, ipv6: true } => format!("vrrp {} ipv6", id),
        }
    }
}

fn parse_switchport(
    arg2: Option<&str>,
    arg3: Option<&str>,
    arg4: Option<&str>,
    arg5: Option<&str>,
) -> Result<InterfaceCommand, ErrorCode> {
    let vlan = |v: Option<&str>| parse_bounded(v, 1, MAX_VLAN_ID, ErrorCode::VlanId);

    match arg2 {
        None => Ok(InterfaceCommand::Switchport),
        Some("access") => Ok(InterfaceCommand::SwitchportAccessVlan(vlan(arg3)?)),
        Some("mode") => Ok(InterfaceCommand::SwitchportMode(parse_token(
            arg3,
            ErrorCode::SwitchportMode,
        )?)),
        Some("trunk") => {
            let list = match arg3 {
                Some("allowed") => TrunkList::Allowed,
                Some("native") => TrunkList::Native,
                _ => return Err(ErrorCode::TrunkOption),
            };
            let vlans = match arg4 {
                Some("all") => TrunkVlans::All,
                Some("none") => TrunkVlans::None,
                Some("add") => TrunkVlans::Add(vlan(arg5)?),
                Some("remove") => TrunkVlans::Remove(vlan(arg5)?),
                other => TrunkVlans::Only(vlan(other)?),
            };
            Ok(InterfaceCommand::SwitchportTrunk { list, vlans })
        }
        Some(_) => Err(ErrorCode::SwitchportOption),
    }
}

fn parse_load_interval(
    arg2: Option<&str>,
    arg3: Option<&str>,
    arg4: Option<&str>,
) -> Result<LoadInterval, ErrorCode> {
    match arg2 {
        Some("counter") => {
            let counter = parse_bounded(arg3, 1, 3, ErrorCode::LoadIntervalCounter)?;
            let delay = parse_bounded(arg4, 30, 300, ErrorCode::LoadIntervalDelay)?;
            Ok(LoadInterval::Counter { counter, delay })
        }
        value => parse_bounded(value, 30, 300, ErrorCode::LoadIntervalOption)
            .map(LoadInterval::Delay),
    }
}

fn parse_storm_level(level: Option<&str>) -> Result<String, ErrorCode> {
    match level {
        Some(value) if LEVEL_RE.is_match(value) => match value.parse::<f64>() {
            Ok(parsed) if (0.0..=100.0).contains(&parsed) => Ok(value.to_string()),
            _ => Err(ErrorCode::StormControlLevel),
        },
        _ => Err(ErrorCode::StormControlLevel),
    }
}
