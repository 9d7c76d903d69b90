//! Rule record.

use serde::Serialize;

/// One `rule` line of a voice translation-rule block.
///
/// The display form of the source pattern is always derived from the raw
/// form, so the two cannot drift apart. Only the raw form is ever written
/// back to the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiversionRule {
    id: String,
    source_pattern: String,
    raw_source_pattern: String,
    destination_pattern: String,
}

impl DiversionRule {
    pub fn new(
        id: impl Into<String>,
        raw_source_pattern: impl Into<String>,
        destination_pattern: impl Into<String>,
    ) -> Self {
        let raw_source_pattern = raw_source_pattern.into();
        Self {
            id: id.into(),
            source_pattern: display_pattern(&raw_source_pattern).to_string(),
            raw_source_pattern,
            destination_pattern: destination_pattern.into(),
        }
    }

    /// Rule number within its block.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Source pattern without its leading `^` anchor.
    pub fn source_pattern(&self) -> &str {
        &self.source_pattern
    }

    /// Source pattern exactly as configured on the device.
    pub fn raw_source_pattern(&self) -> &str {
        &self.raw_source_pattern
    }

    pub fn destination_pattern(&self) -> &str {
        &self.destination_pattern
    }
}

fn display_pattern(raw: &str) -> &str {
    raw.strip_prefix('^').unwrap_or(raw)
}
