//! Command builder for rule replacement.

use super::parser::block_header;
use crate::error::ValidationError;

/// Trailing tokens written on every rule line.
pub const POLICY_TOKENS: &str = "plan any unknown";

/// Render one rule line.
pub fn rule_line(rule_id: &str, raw_source: &str, destination: &str) -> String {
    format!("rule {rule_id} /{raw_source}/ /{destination}/ {POLICY_TOKENS}")
}

/// Commands that replace rule `rule_id` of block `rule_set` in place.
///
/// The device treats `rule <id> ...` as an upsert keyed by id, so the
/// sequence enters the block, rewrites the one rule and backs out to
/// privileged mode. `raw_source` must be the pattern exactly as read from
/// the device.
///
/// Line breaks are refused in every argument. Patterns are slash-delimited
/// with no escape, so a `/` in `raw_source` or `new_destination` is refused
/// too.
///
/// ```
/// let commands = vgdivert::rules::build_rule_change("2", "1", "^677250412", "970203").unwrap();
/// assert_eq!(commands, [
///     "voice translation-rule 2",
///     "rule 1 /^677250412/ /970203/ plan any unknown",
///     "exit",
///     "exit",
/// ]);
/// ```
pub fn build_rule_change(
    rule_set: &str,
    rule_id: &str,
    raw_source: &str,
    new_destination: &str,
) -> Result<Vec<String>, ValidationError> {
    single_line("rule_id", rule_id)?;
    single_line("raw_source", raw_source)?;
    single_line("new_destination", new_destination)?;
    no_slash("raw_source", raw_source)?;
    no_slash("new_destination", new_destination)?;

    Ok(vec![
        block_header(rule_set),
        rule_line(rule_id, raw_source, new_destination),
        "exit".to_string(),
        "exit".to_string(),
    ])
}

fn single_line(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.contains(['\r', '\n']) {
        return Err(ValidationError::LineBreak { field });
    }
    Ok(())
}

fn no_slash(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.contains('/') {
        return Err(ValidationError::Slash { field });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::parse_section;

    #[test]
    fn test_exact_sequence() {
        let commands = build_rule_change("2", "1", "^677250412", "970203").unwrap();
        assert_eq!(
            commands,
            vec![
                "voice translation-rule 2",
                "rule 1 /^677250412/ /970203/ plan any unknown",
                "exit",
                "exit",
            ]
        );
    }

    #[test]
    fn test_rejects_line_breaks() {
        assert_eq!(
            build_rule_change("2", "1", "^1\nend", "2"),
            Err(ValidationError::LineBreak { field: "raw_source" })
        );
        assert_eq!(
            build_rule_change("2", "1", "^1", "2\r"),
            Err(ValidationError::LineBreak {
                field: "new_destination"
            })
        );
        assert_eq!(
            build_rule_change("2", "1\nwrite erase", "^1", "2"),
            Err(ValidationError::LineBreak { field: "rule_id" })
        );
    }

    #[test]
    fn test_rejects_slashes_in_patterns() {
        assert_eq!(
            build_rule_change("2", "1", "^1/2", "3"),
            Err(ValidationError::Slash { field: "raw_source" })
        );
        assert_eq!(
            build_rule_change("2", "1", "^1", "a/b"),
            Err(ValidationError::Slash {
                field: "new_destination"
            })
        );

        // Line breaks are reported first
        assert_eq!(
            build_rule_change("2", "1", "/\n", "3"),
            Err(ValidationError::LineBreak { field: "raw_source" })
        );
    }

    #[test]
    fn test_rule_line_reparses_to_same_raw_source() {
        let commands = build_rule_change("2", "7", "^(555)....$", "1\\1").unwrap();
        let transcript = format!("{}\n {}\n!", commands[0], commands[1]);

        let rules = parse_section(&transcript, "2");
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].id(), "7");
        assert_eq!(rules[0].raw_source_pattern(), "^(555)....$");
        assert_eq!(rules[0].destination_pattern(), "1\\1");
    }
}
