//! CNOS error-marker dialect.
//!
//! The switch reports failures as free text, sometimes followed by a
//! numeric code. Keywords are tried in a fixed priority order, not by
//! position in the output.

use recon_common::ErrorMarker;

use crate::codes::ErrorCode;

/// Keywords and the offset from the keyword start to the code digits.
const KEYWORDS: &[(&str, usize)] = &[
    ("error", 6),
    ("invalid", 8),
    ("cannot be enabled in l2 interface", 34),
    ("incorrect", 10),
    ("failure", 8),
];

/// Message used when no numeric code follows the keyword.
pub const GENERIC_DEVICE_ERROR: &str =
    "Device returned an Error. Please check Results for more information";

/// Message used for a code missing from the catalog.
pub const UNKNOWN_CODE: &str = "Error Code Not Found";

/// Case-insensitive CNOS error detection
#[derive(Debug, Clone, Copy, Default)]
pub struct CnosErrorMarker;

impl ErrorMarker for CnosErrorMarker {
    fn detect(&self, raw_output: &str) -> Option<String> {
        let lowered = raw_output.to_ascii_lowercase();
        let start = KEYWORDS
            .iter()
            .find_map(|(keyword, skip)| lowered.find(keyword).map(|index| index + skip))?;

        let digits = raw_output
            .get(start..start + 3)
            .filter(|code| code.bytes().all(|b| b.is_ascii_digit()));

        let message = match digits.and_then(|code| code.parse::<u16>().ok()) {
            None => GENERIC_DEVICE_ERROR.to_string(),
            Some(code) => match ErrorCode::from_code(code) {
                Some(known) => format!("{}: {}", known, known.message()),
                None => format!("Error-{}: {}", code, UNKNOWN_CODE),
            },
        };
        Some(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_output() {
        assert_eq!(CnosErrorMarker.detect("interface ethernet 1/1\nsw1(config-if)#"), None);
    }

    #[test]
    fn test_generic_error() {
        assert_eq!(
            CnosErrorMarker.detect("% Invalid input detected at '^' marker."),
            Some(GENERIC_DEVICE_ERROR.to_string())
        );
        assert_eq!(
            CnosErrorMarker.detect("Command FAILURE"),
            Some(GENERIC_DEVICE_ERROR.to_string())
        );
    }

    #[test]
    fn test_numeric_code() {
        assert_eq!(
            CnosErrorMarker.detect("ERROR 221 rejected"),
            Some("Error-221: Invalid MTU. Valid range is 64-9216".to_string())
        );
        assert_eq!(
            CnosErrorMarker.detect("error 999"),
            Some("Error-999: Error Code Not Found".to_string())
        );
    }

    #[test]
    fn test_keyword_priority() {
        // "error" wins even when "invalid" appears first
        assert_eq!(
            CnosErrorMarker.detect("invalid value\nerror 206 x"),
            Some("Error-206: Invalid description. Length must be 1-80 characters".to_string())
        );
    }

    #[test]
    fn test_l2_interface_message() {
        let output = "Cannot be enabled in L2 interface 102 ";
        assert_eq!(
            CnosErrorMarker.detect(output),
            Some("Error-102: Invalid interface type or interface range".to_string())
        );
    }

    #[test]
    fn test_keyword_at_end_of_output() {
        assert_eq!(
            CnosErrorMarker.detect("error"),
            Some(GENERIC_DEVICE_ERROR.to_string())
        );
    }
}
