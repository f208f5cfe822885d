//! Type definitions for CNOS interface configuration

use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::codes::ErrorCode;

/// Defines a keyword enum with its CLI token.
macro_rules! cli_tokens {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $token:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize)]
        pub enum $name {
            $(
                #[doc = $token]
                #[serde(rename = $token)]
                $variant,
            )+
        }

        impl $name {
            /// Returns the CLI token.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $token,)+
                }
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = ();

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($token => Ok($name::$variant),)+
                    _ => Err(()),
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

cli_tokens! {
    /// Interface type selected by `interface_option`
    InterfaceKind {
        Ethernet => "ethernet",
        Loopback => "loopback",
        Mgmt => "mgmt",
        PortChannel => "port-channel",
        Vlan => "vlan",
    }
}

cli_tokens! {
    /// LACP negotiation mode of a channel-group member
    ChannelGroupMode {
        On => "on",
        Off => "off",
        Active => "active",
        Passive => "passive",
    }
}

cli_tokens! {
    /// Switchport mode
    BridgeportMode {
        Access => "access",
        Trunk => "trunk",
    }
}

cli_tokens! {
    /// Duplex setting
    Duplex {
        Auto => "auto",
        Full => "full",
        Half => "half",
    }
}

cli_tokens! {
    /// Flowcontrol direction
    FlowDirection {
        Receive => "receive",
        Send => "send",
    }
}

cli_tokens! {
    /// LACP timeout
    LacpTimeout {
        Long => "long",
        Short => "short",
    }
}

cli_tokens! {
    /// LLDP TLV selectable per interface
    LldpTlv {
        MaxFrameSize => "max-frame-size",
        PowerMgmt => "power-mgmt",
        PortDescription => "port-description",
        PortVlanId => "port-vlan-id",
        SystemCapabilities => "system-capabilities",
        SystemDescription => "system-description",
        SystemName => "system-name",
    }
}

cli_tokens! {
    /// Storm-control traffic class
    StormTraffic {
        Broadcast => "broadcast",
        Multicast => "multicast",
        Unicast => "unicast",
    }
}

cli_tokens! {
    /// Interface speed
    Speed {
        Speed1G => "1000",
        Speed10G => "10000",
        Speed40G => "40000",
        Speed100G => "100000",
        Auto => "auto",
    }
}

cli_tokens! {
    /// Native VLAN tagging
    Dot1qTag {
        Disable => "disable",
        Enable => "enable",
        EgressOnly => "egress-only",
    }
}

static NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").expect("Invalid regex pattern"));

static RANGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+(-\d+)?(,\d+(-\d+)?)*$").expect("Invalid regex pattern"));

static SLOT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+/\d+(-\d+)?(,\d+/\d+(-\d+)?)*$").expect("Invalid regex pattern"));

/// Maximum port-channel number
pub const MAX_PORT_CHANNEL: u32 = 4096;

/// Maximum front-panel ethernet port number
pub const MAX_ETHERNET_PORT: u32 = 64;

/// Maximum loopback number
pub const MAX_LOOPBACK: u32 = 7;

/// Maximum VLAN id
pub const MAX_VLAN_ID: u32 = 3999;

/// Interface (or interface range) a command applies to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceSelector {
    /// Interface type
    pub kind: InterfaceKind,
    /// Range as it appears after the type keyword
    pub range: String,
}

impl InterfaceSelector {
    /// Validates an interface type and range.
    ///
    /// Bare ethernet numbers and ranges are placed in slot 1.
    pub fn parse(kind: Option<&str>, range: Option<&str>) -> Result<Self, ErrorCode> {
        let kind: InterfaceKind = kind
            .and_then(|k| k.parse().ok())
            .ok_or(ErrorCode::InvalidInterface)?;
        let range = range.map(str::trim).ok_or(ErrorCode::InvalidInterface)?;

        let range = match kind {
            InterfaceKind::Ethernet if SLOT_RE.is_match(range) => range.to_string(),
            InterfaceKind::Ethernet => {
                check_range(range, 1, MAX_ETHERNET_PORT)?;
                format!("1/{}", range)
            }
            InterfaceKind::PortChannel => {
                check_range(range, 1, MAX_PORT_CHANNEL)?;
                range.to_string()
            }
            InterfaceKind::Loopback => check_value(range, 0, MAX_LOOPBACK)?,
            InterfaceKind::Mgmt => check_value(range, 0, 0)?,
            InterfaceKind::Vlan => check_value(range, 1, MAX_VLAN_ID)?,
        };

        Ok(Self { kind, range })
    }

    /// Returns the line that enters the interface configuration context.
    pub fn context_line(&self) -> String {
        format!("interface {} {}", self.kind, self.range)
    }
}

fn check_value(value: &str, min: u32, max: u32) -> Result<String, ErrorCode> {
    if !NUMBER_RE.is_match(value) {
        return Err(ErrorCode::InvalidInterface);
    }
    match value.parse::<u32>() {
        Ok(n) if (min..=max).contains(&n) => Ok(n.to_string()),
        _ => Err(ErrorCode::InvalidInterface),
    }
}

fn check_range(range: &str, min: u32, max: u32) -> Result<(), ErrorCode> {
    if !RANGE_RE.is_match(range) {
        return Err(ErrorCode::InvalidInterface);
    }
    for part in range.split(',') {
        let mut bounds = part.splitn(2, '-').map(|v| v.parse::<u32>());
        let low = match bounds.next() {
            Some(Ok(low)) => low,
            _ => return Err(ErrorCode::InvalidInterface),
        };
        let high = match bounds.next() {
            Some(Ok(high)) => high,
            Some(Err(_)) => return Err(ErrorCode::InvalidInterface),
            None => low,
        };
        if low < min || high > max || low > high {
            return Err(ErrorCode::InvalidInterface);
        }
    }
    Ok(())
}

/// Parses an integer argument within `min..=max`.
pub fn parse_bounded(value: Option<&str>, min: u32, max: u32, code: ErrorCode) -> Result<u32, ErrorCode> {
    value
        .filter(|v| NUMBER_RE.is_match(v))
        .and_then(|v| v.parse::<u32>().ok())
        .filter(|n| (min..=max).contains(n))
        .ok_or(code)
}

/// Parses a keyword argument.
pub fn parse_token<T: FromStr>(value: Option<&str>, code: ErrorCode) -> Result<T, ErrorCode> {
    value.and_then(|v| v.parse().ok()).ok_or(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_round_trip() {
        assert_eq!("port-channel".parse::<InterfaceKind>(), Ok(InterfaceKind::PortChannel));
        assert_eq!(InterfaceKind::PortChannel.as_str(), "port-channel");
        assert_eq!("egress-only".parse::<Dot1qTag>(), Ok(Dot1qTag::EgressOnly));
        assert!("fast".parse::<Speed>().is_err());
    }

    #[test]
    fn test_ethernet_selector() {
        let sel = InterfaceSelector::parse(Some("ethernet"), Some("33")).unwrap();
        assert_eq!(sel.context_line(), "interface ethernet 1/33");

        let sel = InterfaceSelector::parse(Some("ethernet"), Some("1-4")).unwrap();
        assert_eq!(sel.context_line(), "interface ethernet 1/1-4");

        let sel = InterfaceSelector::parse(Some("ethernet"), Some("1/12")).unwrap();
        assert_eq!(sel.context_line(), "interface ethernet 1/12");

        assert_eq!(
            InterfaceSelector::parse(Some("ethernet"), Some("99")),
            Err(ErrorCode::InvalidInterface)
        );
        assert_eq!(
            InterfaceSelector::parse(Some("ethernet"), Some("4-1")),
            Err(ErrorCode::InvalidInterface)
        );
    }

    #[test]
    fn test_other_selectors() {
        let sel = InterfaceSelector::parse(Some("port-channel"), Some("10,12-14")).unwrap();
        assert_eq!(sel.context_line(), "interface port-channel 10,12-14");

        let sel = InterfaceSelector::parse(Some("vlan"), Some("100")).unwrap();
        assert_eq!(sel.context_line(), "interface vlan 100");

        let sel = InterfaceSelector::parse(Some("mgmt"), Some("0")).unwrap();
        assert_eq!(sel.context_line(), "interface mgmt 0");

        assert!(InterfaceSelector::parse(Some("loopback"), Some("8")).is_err());
        assert!(InterfaceSelector::parse(Some("vlan"), Some("abc")).is_err());
    }

    #[test]
    fn test_missing_selector_parts() {
        assert_eq!(
            InterfaceSelector::parse(None, Some("1")),
            Err(ErrorCode::InvalidInterface)
        );
        assert_eq!(
            InterfaceSelector::parse(Some("tunnel"), Some("1")),
            Err(ErrorCode::InvalidInterface)
        );
        assert_eq!(
            InterfaceSelector::parse(Some("ethernet"), None),
            Err(ErrorCode::InvalidInterface)
        );
    }

    #[test]
    fn test_parse_bounded() {
        assert_eq!(parse_bounded(Some("1500"), 64, 9216, ErrorCode::Mtu), Ok(1500));
        assert_eq!(parse_bounded(Some("10"), 64, 9216, ErrorCode::Mtu), Err(ErrorCode::Mtu));
        assert_eq!(parse_bounded(Some("+80"), 64, 9216, ErrorCode::Mtu), Err(ErrorCode::Mtu));
        assert_eq!(parse_bounded(None, 64, 9216, ErrorCode::Mtu), Err(ErrorCode::Mtu));
    }
}
