//! chatmark-markdown: parser for the chatmark markup dialect.
//!
//! This crate provides:
//! - `Token` / `TokenKind` - the flat token stream handed to renderers
//! - `Parser` - block grammar plus an ordered, extensible list of inline rules
//! - Dialect extensions: `__underline__`, `||spoiler||`, `<t:EPOCH[:STYLE]>`
//! - `TimestampFormatter` - absolute and relative timestamp display

pub mod parser;
pub mod timestamp;
pub mod token;

pub use parser::{InlineRule, InlineState, ParseContext, Parser, default_rules, parse};
pub use timestamp::{
    TimestampFormatter, TimestampStyle, UnknownStyle, format_relative, format_timestamp,
};
pub use token::{Token, TokenKind, is_well_nested};
