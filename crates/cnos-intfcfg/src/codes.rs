//! CNOS error-code catalog.
//!
//! Codes are shared between locally detected parameter errors and the
//! numeric codes the switch prints after an error keyword.

use std::fmt;

use recon_common::ReconError;

/// Stable CNOS error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// The device or session failed while executing commands
    DeviceFailure,
    /// Unknown interface type or malformed interface range
    InvalidInterface,
    /// Channel-group mode
    ChannelGroupMode,
    /// Channel-group number
    ChannelGroupNumber,
    /// VLAN id out of range
    VlanId,
    /// Switchport mode
    SwitchportMode,
    /// Switchport trunk option
    TrunkOption,
    /// Switchport option
    SwitchportOption,
    /// Description text
    Description,
    /// Duplex option
    Duplex,
    /// Flowcontrol state
    FlowcontrolState,
    /// Flowcontrol direction
    FlowcontrolDirection,
    /// LACP port priority
    LacpPortPriority,
    /// LACP timeout
    LacpTimeout,
    /// LACP option
    LacpOption,
    /// LLDP TLV
    LldpTlv,
    /// LLDP option
    LldpOption,
    /// Load-interval delay
    LoadIntervalDelay,
    /// Load-interval counter
    LoadIntervalCounter,
    /// Load-interval option
    LoadIntervalOption,
    /// MAC access-group name
    MacAccessGroup,
    /// MAC address
    MacAddress,
    /// Microburst threshold
    MicroburstThreshold,
    /// MTU value
    Mtu,
    /// Interface speed
    Speed,
    /// Storm-control level
    StormControlLevel,
    /// Storm-control traffic type
    StormControlOption,
    /// Native VLAN tagging option
    Dot1qTag,
    /// VRRP address family
    VrrpOption,
    /// VRRP id
    VrrpId,
    /// Load-balance qualifier
    LoadBalanceQualifier,
    /// Load-balance method
    LoadBalanceMethod,
    /// Unsupported first argument
    UnknownKeyword,
}

/// Every code, in numeric order.
pub const ALL_CODES: &[ErrorCode] = &[
    ErrorCode::DeviceFailure,
    ErrorCode::InvalidInterface,
    ErrorCode::ChannelGroupMode,
    ErrorCode::ChannelGroupNumber,
    ErrorCode::VlanId,
    ErrorCode::SwitchportMode,
    ErrorCode::TrunkOption,
    ErrorCode::SwitchportOption,
    ErrorCode::Description,
    ErrorCode::Duplex,
    ErrorCode::FlowcontrolState,
    ErrorCode::FlowcontrolDirection,
    ErrorCode::LacpPortPriority,
    ErrorCode::LacpTimeout,
    ErrorCode::LacpOption,
    ErrorCode::LldpTlv,
    ErrorCode::LldpOption,
    ErrorCode::LoadIntervalDelay,
    ErrorCode::LoadIntervalCounter,
    ErrorCode::LoadIntervalOption,
    ErrorCode::MacAccessGroup,
    ErrorCode::MacAddress,
    ErrorCode::MicroburstThreshold,
    ErrorCode::Mtu,
    ErrorCode::Speed,
    ErrorCode::StormControlLevel,
    ErrorCode::StormControlOption,
    ErrorCode::Dot1qTag,
    ErrorCode::VrrpOption,
    ErrorCode::VrrpId,
    ErrorCode::LoadBalanceQualifier,
    ErrorCode::LoadBalanceMethod,
    ErrorCode::UnknownKeyword,
];

impl ErrorCode {
    /// Returns the numeric code.
    pub fn code(self) -> u16 {
        match self {
            ErrorCode::DeviceFailure => 101,
            ErrorCode::InvalidInterface => 102,
            ErrorCode::ChannelGroupMode => 200,
            ErrorCode::ChannelGroupNumber => 201,
            ErrorCode::VlanId => 202,
            ErrorCode::SwitchportMode => 203,
            ErrorCode::TrunkOption => 204,
            ErrorCode::SwitchportOption => 205,
            ErrorCode::Description => 206,
            ErrorCode::Duplex => 207,
            ErrorCode::FlowcontrolState => 208,
            ErrorCode::FlowcontrolDirection => 209,
            ErrorCode::LacpPortPriority => 210,
            ErrorCode::LacpTimeout => 211,
            ErrorCode::LacpOption => 212,
            ErrorCode::LldpTlv => 213,
            ErrorCode::LldpOption => 214,
            ErrorCode::LoadIntervalDelay => 215,
            ErrorCode::LoadIntervalCounter => 216,
            ErrorCode::LoadIntervalOption => 217,
            ErrorCode::MacAccessGroup => 218,
            ErrorCode::MacAddress => 219,
            ErrorCode::MicroburstThreshold => 220,
            ErrorCode::Mtu => 221,
            ErrorCode::Speed => 225,
            ErrorCode::StormControlLevel => 226,
            ErrorCode::StormControlOption => 227,
            ErrorCode::Dot1qTag => 228,
            ErrorCode::VrrpOption => 229,
            ErrorCode::VrrpId => 230,
            ErrorCode::LoadBalanceQualifier => 231,
            ErrorCode::LoadBalanceMethod => 232,
            ErrorCode::UnknownKeyword => 233,
        }
    }

    /// Returns the human-readable message.
    pub fn message(self) -> &'static str {
        match self {
            ErrorCode::DeviceFailure => "Device response timed out or the session failed",
            ErrorCode::InvalidInterface => "Invalid interface type or interface range",
            ErrorCode::ChannelGroupMode => "Invalid channel-group mode. Valid values are on, off, active, passive",
            ErrorCode::ChannelGroupNumber => "Invalid channel-group number. Valid range is 1-4096",
            ErrorCode::VlanId => "Invalid VLAN id. Valid range is 1-3999",
            ErrorCode::SwitchportMode => "Invalid switchport mode. Valid values are access, trunk",
            ErrorCode::TrunkOption => "Invalid switchport trunk option. Valid values are allowed, native",
            ErrorCode::SwitchportOption => "Invalid switchport option. Valid values are access, mode, trunk",
            ErrorCode::Description => "Invalid description. Length must be 1-80 characters",
            ErrorCode::Duplex => "Invalid duplex option. Valid values are auto, full, half",
            ErrorCode::FlowcontrolState => "Invalid flowcontrol state. Valid values are on, off",
            ErrorCode::FlowcontrolDirection => "Invalid flowcontrol direction. Valid values are receive, send",
            ErrorCode::LacpPortPriority => "Invalid LACP port priority. Valid range is 1-65535",
            ErrorCode::LacpTimeout => "Invalid LACP timeout. Valid values are long, short",
            ErrorCode::LacpOption => "Invalid LACP option. Valid values are port-priority, suspend-individual, timeout",
            ErrorCode::LldpTlv => "Invalid LLDP TLV selection",
            ErrorCode::LldpOption => "Invalid LLDP option. Valid values are receive, tlv-select, trap-notification, transmit",
            ErrorCode::LoadIntervalDelay => "Invalid load-interval delay. Valid range is 30-300",
            ErrorCode::LoadIntervalCounter => "Invalid load-interval counter. Valid range is 1-3",
            ErrorCode::LoadIntervalOption => "Invalid load-interval option. Valid values are a delay or counter",
            ErrorCode::MacAccessGroup => "Invalid MAC access-group name",
            ErrorCode::MacAddress => "Invalid MAC address. Expected format is xxxx.xxxx.xxxx",
            ErrorCode::MicroburstThreshold => "Invalid microburst threshold. Valid range is 1-10000",
            ErrorCode::Mtu => "Invalid MTU. Valid range is 64-9216",
            ErrorCode::Speed => "Invalid speed. Valid values are 1000, 10000, 40000, 100000, auto",
            ErrorCode::StormControlLevel => "Invalid storm-control level. Valid range is 0.00-100.00",
            ErrorCode::StormControlOption => "Invalid storm-control type. Valid values are broadcast, multicast, unicast",
            ErrorCode::Dot1qTag => "Invalid native VLAN tagging option. Valid values are disable, enable, egress-only",
            ErrorCode::VrrpOption => "Invalid VRRP option. Valid value is ipv6",
            ErrorCode::VrrpId => "Invalid VRRP id. Valid range is 1-255",
            ErrorCode::LoadBalanceQualifier => "Invalid load-balance qualifier. Valid value is source-interface",
            ErrorCode::LoadBalanceMethod => "Invalid load-balance method",
            ErrorCode::UnknownKeyword => "Unsupported interface command",
        }
    }

    /// Looks up a code printed by the device.
    pub fn from_code(code: u16) -> Option<Self> {
        ALL_CODES.iter().copied().find(|c| c.code() == code)
    }

    /// Converts the code into a planning error.
    pub fn into_error(self) -> ReconError {
        ReconError::planning(self.to_string(), self.message())
    }

    /// Tags a failed session call with this code, keeping the transport class.
    pub fn wrap_transport(self, endpoint: &str, cause: ReconError) -> ReconError {
        let detail = match cause {
            ReconError::Transport { message, .. } => message,
            other => other.to_string(),
        };
        ReconError::transport(endpoint, format!("{}: {} ({})", self, self.message(), detail))
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error-{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_complete() {
        for code in ALL_CODES {
            assert_eq!(ErrorCode::from_code(code.code()), Some(*code));
            assert!(!code.message().is_empty());
        }
        assert_eq!(ALL_CODES.len(), 33);
    }

    #[test]
    fn test_into_error() {
        let err = ErrorCode::ChannelGroupNumber.into_error();
        assert_eq!(
            err.to_string(),
            "Error-201: Invalid channel-group number. Valid range is 1-4096"
        );
        assert_eq!(err.class(), recon_common::ErrorClass::Planning);
    }

    #[test]
    fn test_unknown_device_code() {
        assert_eq!(ErrorCode::from_code(999), None);
        assert_eq!(ErrorCode::from_code(233), Some(ErrorCode::UnknownKeyword));
    }

    #[test]
    fn test_wrap_transport_keeps_detail() {
        let err = ErrorCode::DeviceFailure
            .wrap_transport("sw1", ReconError::transport("sw1", "connection reset"));
        assert_eq!(err.class(), recon_common::ErrorClass::Transport);
        assert_eq!(
            err.to_string(),
            "Transport failure on sw1: Error-101: Device response timed out or the session failed (connection reset)"
        );
    }
}
