//! Inline tokenizer state and the base inline grammar.
//!
//! At every position the registered rules are tried in order; the first one
//! that matches consumes input. If none matches, one character is emitted as
//! literal text and scanning resumes at the next character.

use std::ops::Range;

use crate::token::{Token, TokenKind};

use super::ParseContext;

/// A rule recognising one inline construct at the current position.
///
/// A rule that returns `true` must have advanced [`InlineState::pos`] past the
/// input it consumed. A rule that returns `false` must leave the state
/// untouched.
pub trait InlineRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn try_match(&self, state: &mut InlineState<'_>) -> bool;
}

/// Cursor over one inline source string.
pub struct InlineState<'a> {
    src: &'a str,
    /// Byte offset of the cursor in `src`.
    pub pos: usize,
    tokens: Vec<Token>,
    rules: &'a [Box<dyn InlineRule>],
    ctx: &'a ParseContext,
}

impl<'a> InlineState<'a> {
    pub(crate) fn new(
        src: &'a str,
        rules: &'a [Box<dyn InlineRule>],
        ctx: &'a ParseContext,
    ) -> Self {
        Self {
            src,
            pos: 0,
            tokens: Vec::new(),
            rules,
            ctx,
        }
    }

    pub fn src(&self) -> &'a str {
        self.src
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.src.as_bytes()
    }

    /// Unconsumed input.
    pub fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    pub fn ctx(&self) -> &'a ParseContext {
        self.ctx
    }

    /// Byte before the cursor, if any.
    pub fn prev_byte(&self) -> Option<u8> {
        self.pos.checked_sub(1).map(|i| self.bytes()[i])
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    /// Push literal text, merging with a preceding text token.
    pub fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        match self.tokens.last_mut() {
            Some(last) if last.kind == TokenKind::Text => last.content.push_str(text),
            _ => self.tokens.push(Token::text(text)),
        }
    }

    /// Tokenize `src[range]` with the same rules and append the result.
    pub fn push_nested(&mut self, range: Range<usize>) {
        let nested = InlineState::new(&self.src[range], self.rules, self.ctx).tokenize();
        for token in nested {
            if token.kind == TokenKind::Text {
                self.push_text(&token.content);
            } else {
                self.tokens.push(token);
            }
        }
    }

    /// Emit `open`, the nested content of `inner`, then `close`, and move the
    /// cursor to `resume`.
    pub fn push_wrapped(&mut self, open: Token, inner: Range<usize>, close: Token, resume: usize) {
        self.tokens.push(open);
        self.push_nested(inner);
        self.tokens.push(close);
        self.pos = resume;
    }

    pub(crate) fn tokenize(mut self) -> Vec<Token> {
        let rules = self.rules;
        while self.pos < self.src.len() {
            if self.bytes()[self.pos] == b'\n' {
                self.tokens.push(Token::new(TokenKind::SoftBreak));
                self.pos += 1;
                continue;
            }

            let start = self.pos;
            let matched = rules.iter().any(|rule| rule.try_match(&mut self));
            if matched && self.pos > start {
                continue;
            }
            self.pos = start;

            let Some(ch) = self.rest().chars().next() else {
                break;
            };
            let end = start + ch.len_utf8();
            let text = &self.src[start..end];
            self.push_text(text);
            self.pos = end;
        }
        self.tokens
    }
}

/// Scan for a `XX…XX` pair of a doubled ASCII marker at `pos`.
///
/// Start marker: two `marker` bytes at `pos`. Minimum length: four bytes must
/// remain. The closing pair is searched from `pos + 3`, so the content is
/// never empty; the first adjacent pair found closes the span. There is no
/// escape handling. Returns the byte range of the content.
pub fn scan_double_delimiter(src: &str, pos: usize, marker: u8) -> Option<Range<usize>> {
    let bytes = src.as_bytes();
    if bytes.len().saturating_sub(pos) < 4 {
        return None;
    }
    if bytes[pos] != marker || bytes[pos + 1] != marker {
        return None;
    }
    let mut i = pos + 3;
    while i + 1 < bytes.len() {
        if bytes[i] == marker && bytes[i + 1] == marker {
            return Some(pos + 2..i);
        }
        i += 1;
    }
    None
}

/// `\` followed by ASCII punctuation yields the punctuation literally.
pub struct EscapeRule;

impl InlineRule for EscapeRule {
    fn name(&self) -> &'static str {
        "escape"
    }

    fn try_match(&self, state: &mut InlineState<'_>) -> bool {
        let bytes = state.bytes();
        if bytes[state.pos] != b'\\' {
            return false;
        }
        match bytes.get(state.pos + 1) {
            Some(b) if b.is_ascii_punctuation() => {
                let literal = &state.src()[state.pos + 1..state.pos + 2];
                state.push_text(literal);
                state.pos += 2;
                true
            }
            _ => false,
        }
    }
}

/// `` `code` ``; the content is literal.
pub struct CodeInlineRule;

impl InlineRule for CodeInlineRule {
    fn name(&self) -> &'static str {
        "code_inline"
    }

    fn try_match(&self, state: &mut InlineState<'_>) -> bool {
        if state.bytes()[state.pos] != b'`' {
            return false;
        }
        let start = state.pos + 1;
        let Some(len) = state.src()[start..].find('`') else {
            return false;
        };
        if len == 0 {
            return false;
        }
        let content = &state.src()[start..start + len];
        state.push(
            Token::new(TokenKind::CodeInline)
                .with_markup("`")
                .with_content(content),
        );
        state.pos = start + len + 1;
        true
    }
}

/// A doubled-marker span such as `**strong**` or `~~strike~~`.
pub struct DoubleDelimiterRule {
    name: &'static str,
    marker: u8,
    open: TokenKind,
    close: TokenKind,
}

impl DoubleDelimiterRule {
    pub fn strong() -> Self {
        Self {
            name: "strong",
            marker: b'*',
            open: TokenKind::StrongOpen,
            close: TokenKind::StrongClose,
        }
    }

    pub fn strikethrough() -> Self {
        Self {
            name: "strikethrough",
            marker: b'~',
            open: TokenKind::StrikethroughOpen,
            close: TokenKind::StrikethroughClose,
        }
    }
}

impl InlineRule for DoubleDelimiterRule {
    fn name(&self) -> &'static str {
        self.name
    }

    fn try_match(&self, state: &mut InlineState<'_>) -> bool {
        let Some(inner) = scan_double_delimiter(state.src(), state.pos, self.marker) else {
            return false;
        };
        let markup = &state.src()[state.pos..state.pos + 2];
        let resume = inner.end + 2;
        state.push_wrapped(
            Token::new(self.open).with_markup(markup),
            inner,
            Token::new(self.close).with_markup(markup),
            resume,
        );
        true
    }
}

/// Single `*` or `_` emphasis.
///
/// The opener must be a lone marker followed by non-whitespace. The closer is
/// the next lone marker (runs of two or more are skipped) preceded by
/// non-whitespace. `_` additionally refuses to open or close inside a word.
pub struct EmphasisRule;

impl EmphasisRule {
    fn find_closer(bytes: &[u8], from: usize, marker: u8) -> Option<usize> {
        let mut i = from;
        while i < bytes.len() {
            if bytes[i] != marker {
                i += 1;
                continue;
            }
            let run_start = i;
            while i < bytes.len() && bytes[i] == marker {
                i += 1;
            }
            if i - run_start != 1 {
                continue;
            }
            if bytes[run_start - 1].is_ascii_whitespace() {
                continue;
            }
            if marker == b'_' && bytes.get(i).is_some_and(|b| b.is_ascii_alphanumeric()) {
                continue;
            }
            return Some(run_start);
        }
        None
    }
}

impl InlineRule for EmphasisRule {
    fn name(&self) -> &'static str {
        "emphasis"
    }

    fn try_match(&self, state: &mut InlineState<'_>) -> bool {
        let bytes = state.bytes();
        let pos = state.pos;
        let marker = bytes[pos];
        if marker != b'*' && marker != b'_' {
            return false;
        }
        match bytes.get(pos + 1) {
            Some(next) if *next != marker && !next.is_ascii_whitespace() => {}
            _ => return false,
        }
        if marker == b'_' && state.prev_byte().is_some_and(|b| b.is_ascii_alphanumeric()) {
            return false;
        }
        let Some(close) = Self::find_closer(bytes, pos + 2, marker) else {
            return false;
        };
        let markup = &state.src()[pos..pos + 1];
        state.push_wrapped(
            Token::new(TokenKind::EmphasisOpen).with_markup(markup),
            pos + 1..close,
            Token::new(TokenKind::EmphasisClose).with_markup(markup),
            close + 1,
        );
        true
    }
}

/// `[label](url)`. The URL is stored raw in the `href` attribute.
pub struct LinkRule;

impl InlineRule for LinkRule {
    fn name(&self) -> &'static str {
        "link"
    }

    fn try_match(&self, state: &mut InlineState<'_>) -> bool {
        let src = state.src();
        let pos = state.pos;
        if src.as_bytes()[pos] != b'[' {
            return false;
        }
        let Some(label_len) = src[pos + 1..].find(']') else {
            return false;
        };
        let label_end = pos + 1 + label_len;
        if label_len == 0 || src.as_bytes().get(label_end + 1) != Some(&b'(') {
            return false;
        }
        let url_start = label_end + 2;
        let Some(url_len) = src[url_start..].find(')') else {
            return false;
        };
        let url = src[url_start..url_start + url_len].trim();
        if url.is_empty() || url.contains(char::is_whitespace) {
            return false;
        }
        state.push_wrapped(
            Token::new(TokenKind::LinkOpen)
                .with_markup("[")
                .with_attr("href", url),
            pos + 1..label_end,
            Token::new(TokenKind::LinkClose).with_markup("]"),
            url_start + url_len + 1,
        );
        true
    }
}
