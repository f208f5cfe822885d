//! Global port-channel load-balance configuration

use crate::codes::ErrorCode;
use crate::types::parse_token;

cli_tokens! {
    /// Hashing method for port-channel load balancing
    LoadBalanceMethod {
        DestinationIp => "destination-ip",
        DestinationMac => "destination-mac",
        DestinationPort => "destination-port",
        SourceDestIp => "source-dest-ip",
        SourceDestMac => "source-dest-mac",
        SourceDestPort => "source-dest-port",
        SourceInterface => "source-interface",
        SourceIp => "source-ip",
        SourceMac => "source-mac",
        SourcePort => "source-port",
    }
}

/// `port-channel load-balance ethernet <method> [source-interface]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadBalance {
    pub method: LoadBalanceMethod,
    pub source_interface: bool,
}

impl LoadBalance {
    /// Parses the method and optional qualifier arguments.
    pub fn parse(method: Option<&str>, qualifier: Option<&str>) -> Result<Self, ErrorCode> {
        let method = parse_token(method, ErrorCode::LoadBalanceMethod)?;
        let source_interface = match qualifier {
            None => false,
            Some("source-interface") => true,
            Some(_) => return Err(ErrorCode::LoadBalanceQualifier),
        };
        Ok(Self {
            method,
            source_interface,
        })
    }

    pub fn render(&self) -> String {
        let mut line = format!("port-channel load-balance ethernet {}", self.method);
        if self.source_interface {
            line.push_str(" source-interface");
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_balance_render() {
        let lb = LoadBalance::parse(Some("source-dest-ip"), None).unwrap();
        assert_eq!(lb.render(), "port-channel load-balance ethernet source-dest-ip");

        let lb = LoadBalance::parse(Some("destination-mac"), Some("source-interface")).unwrap();
        assert_eq!(
            lb.render(),
            "port-channel load-balance ethernet destination-mac source-interface"
        );
    }

    #[test]
    fn test_load_balance_errors() {
        assert_eq!(
            LoadBalance::parse(Some("round-robin"), None),
            Err(ErrorCode::LoadBalanceMethod)
        );
        assert_eq!(LoadBalance::parse(None, None), Err(ErrorCode::LoadBalanceMethod));
        assert_eq!(
            LoadBalance::parse(Some("source-ip"), Some("vlan")),
            Err(ErrorCode::LoadBalanceQualifier)
        );
    }
}
