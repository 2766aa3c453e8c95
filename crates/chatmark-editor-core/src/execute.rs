//! Toolbar actions mapped onto the text transforms.

use chatmark_markdown::TimestampStyle;
use smol_str::SmolStr;

use crate::transform::{
    insert_masked_link, insert_timestamp, toggle_block_prefix, toggle_code_block, toggle_wrap,
};
use crate::types::{Range, WrapResult};

/// A formatting command from the editor toolbar or a shortcut.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatAction {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Spoiler,
    InlineCode,
    Quote,
    BulletList,
    /// Heading level, clamped to 1..=6.
    Heading(u8),
    CodeBlock { language: SmolStr },
    Link { url: SmolStr },
    Timestamp { epoch: i64, style: TimestampStyle },
}

impl FormatAction {
    /// Delimiter for the inline toggles.
    pub fn delimiter(&self) -> Option<&'static str> {
        match self {
            Self::Bold => Some("**"),
            Self::Italic => Some("*"),
            Self::Underline => Some("__"),
            Self::Strikethrough => Some("~~"),
            Self::Spoiler => Some("||"),
            Self::InlineCode => Some("`"),
            _ => None,
        }
    }

    /// Line prefix for the block toggles, without the trailing space.
    pub fn line_prefix(&self) -> Option<SmolStr> {
        match self {
            Self::Quote => Some(SmolStr::new_static(">")),
            Self::BulletList => Some(SmolStr::new_static("-")),
            Self::Heading(level) => {
                let level = usize::from((*level).clamp(1, 6));
                Some(SmolStr::new(&"######"[..level]))
            }
            _ => None,
        }
    }
}

/// Apply `action` to `text` with the selection `range`.
pub fn apply_action(text: &str, range: Range, action: &FormatAction) -> WrapResult {
    let Range { start, end } = range.normalize();
    tracing::trace!(?action, start, end, "apply_action");

    if let Some(delimiter) = action.delimiter() {
        return toggle_wrap(text, start, end, delimiter);
    }
    if let Some(prefix) = action.line_prefix() {
        return toggle_block_prefix(text, start, end, &prefix);
    }
    match action {
        FormatAction::CodeBlock { language } => toggle_code_block(text, start, end, language),
        FormatAction::Link { url } => insert_masked_link(text, start, end, url),
        FormatAction::Timestamp { epoch, style } => {
            insert_timestamp(text, start, end, *epoch, *style)
        }
        _ => WrapResult::new(text, range.clamp(text.chars().count())),
    }
}
