//! Section parser for `voice translation-rule` blocks.
//!
//! IOS prints every translation-rule block when asked for the section, so
//! the output for rule-set 2 also carries rule-sets 20, 255 and so on:
//!
//! ```text
//! voice translation-rule 2
//!  rule 1 /^677250412/ /970202/ plan any unknown
//! !
//! voice translation-rule 255
//!  rule 9 /x/ /y/ plan any unknown
//! ```
//!
//! Only rule lines inside the requested block are kept. Parsing never fails;
//! lines that do not fit the grammar are skipped.

use super::model::DiversionRule;

/// Keyword that opens every translation-rule block.
pub const SECTION_KEYWORD: &str = "voice translation-rule";

/// Command that prints all translation-rule blocks.
pub fn section_query() -> String {
    format!("show running-config | section {SECTION_KEYWORD}")
}

/// Opening line of the block for `rule_set`.
pub fn block_header(rule_set: &str) -> String {
    format!("{SECTION_KEYWORD} {rule_set}")
}

/// What a trimmed line means to the block state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockLine {
    /// Header of the requested block.
    Target,
    /// Header of any other translation-rule block.
    Sibling,
    /// Block terminator `!`.
    Terminator,
    /// Anything else.
    Body,
}

/// Classify one trimmed line for `rule_set`.
pub fn classify_line(line: &str, rule_set: &str) -> BlockLine {
    if line == "!" {
        return BlockLine::Terminator;
    }

    match line.strip_prefix(SECTION_KEYWORD) {
        Some(rest) if rest.starts_with(char::is_whitespace) => {
            if line == block_header(rule_set) {
                BlockLine::Target
            } else {
                BlockLine::Sibling
            }
        }
        _ => BlockLine::Body,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Outside,
    InsideTarget,
    InsideOther,
}

/// Extract the rules of block `rule_set` from section output, in order.
///
/// Duplicate ids are kept as they appear. A missing block yields an empty
/// list.
pub fn parse_section(output: &str, rule_set: &str) -> Vec<DiversionRule> {
    let mut state = State::Outside;
    let mut rules = Vec::new();

    for line in output.lines().map(str::trim) {
        state = match classify_line(line, rule_set) {
            BlockLine::Target => State::InsideTarget,
            BlockLine::Sibling => State::InsideOther,
            BlockLine::Terminator => State::Outside,
            BlockLine::Body => {
                if state == State::InsideTarget {
                    rules.extend(parse_rule_line(line));
                }
                state
            }
        };
    }

    rules
}

/// Parse `rule <id> /<source>/ /<destination>/ [policy tokens...]`.
///
/// Patterns are delimited by single slashes with no escape mechanism, so a
/// slash inside a pattern makes the whole line unparseable.
pub fn parse_rule_line(line: &str) -> Option<DiversionRule> {
    let rest = line.trim().strip_prefix("rule")?;
    let rest = skip_space(rest)?;

    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let (id, rest) = rest.split_at(digits);

    let (source, rest) = slashed(skip_space(rest)?)?;
    let (destination, rest) = slashed(skip_space(rest)?)?;

    // Policy tokens may follow, but must be separate words
    if !(rest.is_empty() || rest.starts_with(char::is_whitespace)) {
        return None;
    }

    Some(DiversionRule::new(id, source, destination))
}

/// Strip leading whitespace, requiring at least one character of it.
fn skip_space(s: &str) -> Option<&str> {
    let trimmed = s.trim_start();
    (trimmed.len() < s.len()).then_some(trimmed)
}

/// Split `/inner/rest` into `(inner, rest)`.
fn slashed(s: &str) -> Option<(&str, &str)> {
    let inner = s.strip_prefix('/')?;
    let end = inner.find('/')?;
    Some((&inner[..end], &inner[end + 1..]))
}
