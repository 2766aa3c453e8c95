//! chatmark renderer
//!
//! Turns the token stream produced by `chatmark-markdown` into HTML that is
//! safe to inject into a page. Code highlighting goes through a caller-owned
//! [`HighlighterRegistry`]; output is cleaned by an allowlist sanitizer.

pub mod base_html;
pub mod highlight;
pub mod pipeline;
pub mod sanitize;

pub use base_html::{PLAIN_LANGUAGE, render_tokens, write_html};
pub use highlight::{
    CSS_PREFIX, HighlightError, Highlighter, HighlighterRegistry, NoHighlighting,
    resolve_language_alias,
};
#[cfg(feature = "syntax-highlighting")]
pub use highlight::{SyntectHighlighter, SyntectRegistry};
pub use pipeline::{Clock, FixedClock, RenderOptions, Renderer, SystemClock, render};
pub use sanitize::{SanitizePolicy, Sanitizer, sanitize, sanitize_url, sanitize_with};
