//! IOS output handling.

use crate::platform::VendorBehavior;

/// IOS-specific failure detection.
///
/// IOS points at the offending token with a caret line and explains on the
/// next line:
///
/// ```text
/// gw1(cfg-translation-rule)#rule 1 /1/
///                                    ^
/// % Invalid input detected at '^' marker.
/// ```
///
/// The explanation line is returned verbatim as the failure message.
pub struct CiscoIosBehavior;

impl VendorBehavior for CiscoIosBehavior {
    fn detect_failure(&self, output: &str) -> Option<String> {
        let lines: Vec<&str> = output.lines().collect();
        lines.windows(2).find_map(|pair| {
            let (marker, message) = (pair[0].trim(), pair[1].trim());
            (marker == "^" && message.starts_with('%')).then(|| message.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caret_marker_failure() {
        let output = "                   ^\n% Invalid input detected at '^' marker.\n";
        assert_eq!(
            CiscoIosBehavior.detect_failure(output),
            Some("% Invalid input detected at '^' marker.".to_string())
        );
    }

    #[test]
    fn test_caret_inside_pattern_is_not_a_marker() {
        let output = " rule 1 /^677250412/ /970202/ plan any unknown";
        assert!(CiscoIosBehavior.detect_failure(output).is_none());
    }

    #[test]
    fn test_plain_output_has_no_failure() {
        assert!(CiscoIosBehavior.detect_failure("Building configuration...\n[OK]").is_none());
    }
}
