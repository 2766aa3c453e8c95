//! Token stream produced by the parser.

use std::fmt;

use smol_str::SmolStr;

/// Kind of a parsed token.
///
/// Container kinds come in `*Open`/`*Close` pairs which always nest
/// without crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Text,
    SoftBreak,
    StrongOpen,
    StrongClose,
    EmphasisOpen,
    EmphasisClose,
    StrikethroughOpen,
    StrikethroughClose,
    UnderlineOpen,
    UnderlineClose,
    SpoilerOpen,
    SpoilerClose,
    LinkOpen,
    LinkClose,
    CodeInline,
    Timestamp,
    CodeFence,
    ParagraphOpen,
    ParagraphClose,
    HeadingOpen,
    HeadingClose,
    BlockquoteOpen,
    BlockquoteClose,
    BulletListOpen,
    BulletListClose,
    ListItemOpen,
    ListItemClose,
}

impl TokenKind {
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            Self::StrongOpen
                | Self::EmphasisOpen
                | Self::StrikethroughOpen
                | Self::UnderlineOpen
                | Self::SpoilerOpen
                | Self::LinkOpen
                | Self::ParagraphOpen
                | Self::HeadingOpen
                | Self::BlockquoteOpen
                | Self::BulletListOpen
                | Self::ListItemOpen
        )
    }

    pub fn is_close(&self) -> bool {
        self.opener().is_some()
    }

    /// The opening kind matching a closing kind.
    pub fn opener(&self) -> Option<TokenKind> {
        Some(match self {
            Self::StrongClose => Self::StrongOpen,
            Self::EmphasisClose => Self::EmphasisOpen,
            Self::StrikethroughClose => Self::StrikethroughOpen,
            Self::UnderlineClose => Self::UnderlineOpen,
            Self::SpoilerClose => Self::SpoilerOpen,
            Self::LinkClose => Self::LinkOpen,
            Self::ParagraphClose => Self::ParagraphOpen,
            Self::HeadingClose => Self::HeadingOpen,
            Self::BlockquoteClose => Self::BlockquoteOpen,
            Self::BulletListClose => Self::BulletListOpen,
            Self::ListItemClose => Self::ListItemOpen,
            _ => return None,
        })
    }
}

/// One unit of parsed markup.
///
/// `content` is the literal text for text-like tokens (text, inline code,
/// code fences, the pre-rendered display of a timestamp). `markup` is the
/// source delimiter that produced the token, e.g. `**` or `||`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub content: String,
    pub markup: SmolStr,
    pub attrs: Vec<(SmolStr, SmolStr)>,
}

impl Token {
    pub fn new(kind: TokenKind) -> Self {
        Self {
            kind,
            content: String::new(),
            markup: SmolStr::default(),
            attrs: Vec::new(),
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::new(TokenKind::Text)
        }
    }

    pub fn with_markup(mut self, markup: impl Into<SmolStr>) -> Self {
        self.markup = markup.into();
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_attr(mut self, name: impl Into<SmolStr>, value: impl Into<SmolStr>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Heading level, derived from the `#` markup. Zero for other tokens.
    pub fn level(&self) -> usize {
        match self.kind {
            TokenKind::HeadingOpen | TokenKind::HeadingClose => self.markup.len(),
            _ => 0,
        }
    }
}

/// Debug-dump format: one token per line, `Kind "content" [k=v]`.
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if !self.content.is_empty() {
            write!(f, " {:?}", self.content)?;
        }
        for (key, value) in &self.attrs {
            write!(f, " {key}={value:?}")?;
        }
        Ok(())
    }
}

/// Check that open/close tokens nest properly.
pub fn is_well_nested(tokens: &[Token]) -> bool {
    let mut stack = Vec::new();
    for token in tokens {
        if token.kind.is_open() {
            stack.push(token.kind);
        } else if let Some(opener) = token.kind.opener() {
            if stack.pop() != Some(opener) {
                return false;
            }
        }
    }
    stack.is_empty()
}
