//! Block and inline parsing for the chatmark dialect.
//!
//! Parsing never fails. Anything that does not form a complete construct is
//! emitted as literal text.

mod block;
pub mod inline;
pub mod rules;

#[cfg(test)]
mod tests;

pub use inline::{
    CodeInlineRule, DoubleDelimiterRule, EmphasisRule, EscapeRule, InlineRule, InlineState,
    LinkRule, scan_double_delimiter,
};
pub use rules::{SpoilerRule, TimestampRule, UnderlineRule};

use crate::timestamp::TimestampFormatter;
use crate::token::Token;

/// Inputs shared by every rule during one parse.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseContext {
    /// Current time in epoch seconds, used for relative timestamps.
    pub now: i64,
    pub formatter: TimestampFormatter,
}

/// Default inline rules in evaluation order.
///
/// The dialect extensions come before the base emphasis rules.
pub fn default_rules() -> Vec<Box<dyn InlineRule>> {
    vec![
        Box::new(EscapeRule),
        Box::new(UnderlineRule),
        Box::new(SpoilerRule),
        Box::new(TimestampRule),
        Box::new(CodeInlineRule),
        Box::new(DoubleDelimiterRule::strikethrough()),
        Box::new(DoubleDelimiterRule::strong()),
        Box::new(EmphasisRule),
        Box::new(LinkRule),
    ]
}

pub struct Parser {
    rules: Vec<Box<dyn InlineRule>>,
    ctx: ParseContext,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Self {
            rules: default_rules(),
            ctx: ParseContext::default(),
        }
    }

    pub fn with_now(mut self, now: i64) -> Self {
        self.ctx.now = now;
        self
    }

    pub fn with_formatter(mut self, formatter: TimestampFormatter) -> Self {
        self.ctx.formatter = formatter;
        self
    }

    pub fn context(&self) -> &ParseContext {
        &self.ctx
    }

    /// Names of the registered inline rules, in evaluation order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// Register `rule` so it is tried right before the rule called `before`.
    /// Appends if no such rule exists.
    pub fn insert_rule_before(&mut self, before: &str, rule: Box<dyn InlineRule>) {
        let index = self
            .rules
            .iter()
            .position(|existing| existing.name() == before)
            .unwrap_or(self.rules.len());
        self.rules.insert(index, rule);
    }

    pub fn push_rule(&mut self, rule: Box<dyn InlineRule>) {
        self.rules.push(rule);
    }

    /// Parse a whole document.
    pub fn parse(&self, text: &str) -> Vec<Token> {
        let _span = tracing::trace_span!("parse", len = text.len()).entered();
        block::parse_blocks(text, self)
    }

    /// Parse `text` as inline content only.
    pub fn parse_inline(&self, text: &str) -> Vec<Token> {
        InlineState::new(text, &self.rules, &self.ctx).tokenize()
    }
}

/// Parse `text` with the default rules, formatting relative timestamps
/// against `now`.
pub fn parse(text: &str, now: i64) -> Vec<Token> {
    Parser::new().with_now(now).parse(text)
}
