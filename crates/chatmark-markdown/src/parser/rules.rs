//! Dialect extensions: underline, spoiler and timestamp tags.
//!
//! These are registered ahead of the generic emphasis rules so that `__` and
//! `||` are never read as nested single-character delimiters.

use crate::timestamp::TimestampStyle;
use crate::token::{Token, TokenKind};

use super::inline::{InlineRule, InlineState, scan_double_delimiter};

/// `__underline__`.
///
/// If no closing `__` exists the rule does not match and the default
/// handling of a single `_` applies.
pub struct UnderlineRule;

impl InlineRule for UnderlineRule {
    fn name(&self) -> &'static str {
        "underline"
    }

    fn try_match(&self, state: &mut InlineState<'_>) -> bool {
        let Some(inner) = scan_double_delimiter(state.src(), state.pos, b'_') else {
            return false;
        };
        let resume = inner.end + 2;
        state.push_wrapped(
            Token::new(TokenKind::UnderlineOpen).with_markup("__"),
            inner,
            Token::new(TokenKind::UnderlineClose).with_markup("__"),
            resume,
        );
        true
    }
}

/// `||spoiler||`, revealed on click.
///
/// The opening token carries the accessibility attributes the renderer puts on
/// the reveal element.
pub struct SpoilerRule;

impl InlineRule for SpoilerRule {
    fn name(&self) -> &'static str {
        "spoiler"
    }

    fn try_match(&self, state: &mut InlineState<'_>) -> bool {
        let Some(inner) = scan_double_delimiter(state.src(), state.pos, b'|') else {
            return false;
        };
        let resume = inner.end + 2;
        let open = Token::new(TokenKind::SpoilerOpen)
            .with_markup("||")
            .with_attr("role", "button")
            .with_attr("aria-label", "Spoiler")
            .with_attr("tabindex", "0");
        state.push_wrapped(
            open,
            inner,
            Token::new(TokenKind::SpoilerClose).with_markup("||"),
            resume,
        );
        true
    }
}

/// `<t:EPOCH>` or `<t:EPOCH:STYLE>`.
///
/// The token keeps the raw epoch and resolved style code as attributes and
/// its content is the display string for the parse-time clock, so a consumer
/// can re-render on clock or locale change without re-parsing.
pub struct TimestampRule;

impl TimestampRule {
    const OPEN: &'static str = "<t:";

    /// Split the text between `<t:` and `>` into epoch and style.
    fn parse_payload(payload: &str) -> Option<(i64, TimestampStyle)> {
        let mut segments = payload.split(':');
        let epoch = segments.next()?.parse::<i64>().ok()?;
        let style = match segments.next() {
            Some(code) => TimestampStyle::from_code(code).unwrap_or_default(),
            None => TimestampStyle::default(),
        };
        if segments.next().is_some() {
            return None;
        }
        Some((epoch, style))
    }
}

impl InlineRule for TimestampRule {
    fn name(&self) -> &'static str {
        "timestamp"
    }

    fn try_match(&self, state: &mut InlineState<'_>) -> bool {
        let rest = state.rest();
        if !rest.starts_with(Self::OPEN) {
            return false;
        }
        let Some(close) = rest.find('>') else {
            return false;
        };
        let Some((epoch, style)) = Self::parse_payload(&rest[Self::OPEN.len()..close]) else {
            return false;
        };

        let ctx = state.ctx();
        let display = ctx.formatter.format(epoch, style, ctx.now);
        let title = ctx
            .formatter
            .format(epoch, TimestampStyle::LongDateTime, ctx.now);
        state.push(
            Token::new(TokenKind::Timestamp)
                .with_markup(&rest[..=close])
                .with_content(display)
                .with_attr("epoch", epoch.to_string())
                .with_attr("style", style.code().to_string())
                .with_attr("title", title),
        );
        state.pos += close + 1;
        true
    }
}
