//! Channel layer for prompt matching over a transport.
//!
//! This module turns the raw byte stream into cleaned text and reads it
//! until a prompt pattern shows up at the end.

mod buffer;
mod cli;

pub use buffer::PatternBuffer;
pub use cli::{CliChannel, ReadResult};
