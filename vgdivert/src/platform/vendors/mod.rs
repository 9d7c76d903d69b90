//! Built-in device dialects.

pub mod cisco_ios;
