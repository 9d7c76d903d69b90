//! Diversion rules: the record type, the section parser and the command
//! builder.
//!
//! Everything here is pure text processing. Nothing in this module talks to
//! a device.

mod builder;
mod model;
mod parser;

pub use builder::{POLICY_TOKENS, build_rule_change, rule_line};
pub use model::DiversionRule;
pub use parser::{
    BlockLine, SECTION_KEYWORD, block_header, classify_line, parse_rule_line, parse_section,
    section_query,
};
