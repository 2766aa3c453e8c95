//! Code-fence highlighting capability.
//!
//! The renderer never loads grammars itself. It asks a caller-owned
//! [`HighlighterRegistry`] for a highlighter; whoever owns the registry is
//! responsible for making languages available before rendering.

use smol_str::SmolStr;

/// CSS class prefix for highlighted spans.
pub const CSS_PREFIX: &str = "hl-";

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, miette::Diagnostic)]
pub enum HighlightError {
    #[error("no grammar for language `{0}`")]
    #[diagnostic(code(chatmark::highlight::unknown_language))]
    UnknownLanguage(SmolStr),

    #[error("highlighting `{language}` failed: {message}")]
    #[diagnostic(code(chatmark::highlight::failed))]
    Failed { language: SmolStr, message: String },
}

/// Turns source code into HTML markup.
///
/// The returned string goes inside `<code>` and must already be escaped.
pub trait Highlighter {
    fn highlight(&self, code: &str, language: &str) -> Result<String, HighlightError>;
}

/// Resolves a canonical language name to a highlighter.
pub trait HighlighterRegistry {
    fn resolve(&self, language: &str) -> Option<&dyn Highlighter>;
}

/// A registry with nothing loaded. Every code block renders unhighlighted.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHighlighting;

impl HighlighterRegistry for NoHighlighting {
    fn resolve(&self, _language: &str) -> Option<&dyn Highlighter> {
        None
    }
}

impl<R: HighlighterRegistry + ?Sized> HighlighterRegistry for &R {
    fn resolve(&self, language: &str) -> Option<&dyn Highlighter> {
        (**self).resolve(language)
    }
}

/// Map a fence language tag to the canonical grammar name.
///
/// Lookup is case-insensitive; unknown tags come back lowercased.
pub fn resolve_language_alias(tag: &str) -> SmolStr {
    let lower = tag.trim().to_ascii_lowercase();
    let canonical = match lower.as_str() {
        "js" | "jsx" | "mjs" | "cjs" | "node" => "javascript",
        "ts" | "tsx" => "typescript",
        "py" | "py3" | "python3" => "python",
        "rs" => "rust",
        "sh" | "shell" | "zsh" | "console" => "bash",
        "yml" => "yaml",
        "md" => "markdown",
        "c++" | "cc" | "cxx" | "hpp" | "hh" => "cpp",
        "h" => "c",
        "cs" | "c#" | "csharp" => "csharp",
        "kt" | "kts" => "kotlin",
        "rb" => "ruby",
        "golang" => "go",
        "htm" | "xhtml" => "html",
        "svg" | "xsl" => "xml",
        "ps1" | "pwsh" => "powershell",
        "pl" => "perl",
        "hs" => "haskell",
        "ex" | "exs" => "elixir",
        "erl" => "erlang",
        "clj" => "clojure",
        "tex" => "latex",
        "txt" | "text" | "plain" => "plaintext",
        other => return SmolStr::new(other),
    };
    SmolStr::new_static(canonical)
}

#[cfg(feature = "syntax-highlighting")]
pub use self::syntect_registry::{SyntectHighlighter, SyntectRegistry};

#[cfg(feature = "syntax-highlighting")]
mod syntect_registry {
    use std::collections::HashSet;

    use smol_str::SmolStr;
    use syntect::html::{ClassStyle, ClassedHTMLGenerator};
    use syntect::parsing::{SyntaxReference, SyntaxSet};
    use syntect::util::LinesWithEndings;

    use super::{CSS_PREFIX, HighlightError, Highlighter, HighlighterRegistry};

    /// Highlights with syntect's default grammars, emitting `hl-` classes.
    pub struct SyntectHighlighter {
        syntax_set: SyntaxSet,
    }

    impl SyntectHighlighter {
        pub fn new(syntax_set: SyntaxSet) -> Self {
            Self { syntax_set }
        }

        fn find_syntax(&self, language: &str) -> Option<&SyntaxReference> {
            self.syntax_set
                .find_syntax_by_token(language)
                .or_else(|| self.syntax_set.find_syntax_by_token(syntect_token(language)?))
        }
    }

    /// syntect token for canonical names that match none of its grammar
    /// names or extensions.
    fn syntect_token(language: &str) -> Option<&'static str> {
        match language {
            "csharp" => Some("cs"),
            _ => None,
        }
    }

    impl Highlighter for SyntectHighlighter {
        fn highlight(&self, code: &str, language: &str) -> Result<String, HighlightError> {
            let syntax = self
                .find_syntax(language)
                .ok_or_else(|| HighlightError::UnknownLanguage(SmolStr::new(language)))?;
            let mut generator = ClassedHTMLGenerator::new_with_class_style(
                syntax,
                &self.syntax_set,
                ClassStyle::SpacedPrefixed { prefix: CSS_PREFIX },
            );
            for line in LinesWithEndings::from(code) {
                generator
                    .parse_html_for_line_which_includes_newline(line)
                    .map_err(|err| HighlightError::Failed {
                        language: SmolStr::new(language),
                        message: err.to_string(),
                    })?;
            }
            Ok(generator.finalize())
        }
    }

    /// Caller-owned registry of loaded languages backed by syntect.
    ///
    /// Languages must be loaded with [`SyntectRegistry::ensure_loaded`] (or
    /// [`SyntectRegistry::load_all`]) before rendering; `resolve` only looks up.
    pub struct SyntectRegistry {
        highlighter: SyntectHighlighter,
        loaded: HashSet<SmolStr>,
        all_loaded: bool,
    }

    impl Default for SyntectRegistry {
        fn default() -> Self {
            Self::new(SyntaxSet::load_defaults_newlines())
        }
    }

    impl SyntectRegistry {
        pub fn new(syntax_set: SyntaxSet) -> Self {
            Self {
                highlighter: SyntectHighlighter::new(syntax_set),
                loaded: HashSet::new(),
                all_loaded: false,
            }
        }

        /// A registry where every bundled grammar is available.
        pub fn with_all_languages() -> Self {
            let mut registry = Self::default();
            registry.load_all();
            registry
        }

        /// Mark `language` as available. Returns false if there is no
        /// grammar for it.
        pub fn ensure_loaded(&mut self, language: &str) -> bool {
            let canonical = super::resolve_language_alias(language);
            if self.highlighter.find_syntax(&canonical).is_none() {
                tracing::debug!(%canonical, "no grammar to load");
                return false;
            }
            self.loaded.insert(canonical);
            true
        }

        pub fn load_all(&mut self) {
            self.all_loaded = true;
        }

        pub fn is_loaded(&self, language: &str) -> bool {
            self.all_loaded || self.loaded.contains(language)
        }
    }

    impl HighlighterRegistry for SyntectRegistry {
        fn resolve(&self, language: &str) -> Option<&dyn Highlighter> {
            if !self.is_loaded(language) {
                return None;
            }
            self.highlighter.find_syntax(language)?;
            Some(&self.highlighter)
        }
    }
}
