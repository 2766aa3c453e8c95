//! Token stream to raw (unsanitized) HTML.

use chatmark_markdown::{Token, TokenKind};
use pulldown_cmark_escape::{StrWrite, escape_html};

use crate::highlight::{HighlighterRegistry, resolve_language_alias};

/// Language class for code blocks rendered without highlighting.
pub const PLAIN_LANGUAGE: &str = "plaintext";

struct HtmlWriter<'r, I, W, R: ?Sized> {
    /// Iterator supplying tokens.
    iter: I,

    /// Writer to write to.
    writer: W,

    /// Highlighter lookup for fenced code.
    registry: &'r R,

    /// Whether or not the last write wrote a newline.
    end_newline: bool,
}

impl<'t, 'r, I, W, R> HtmlWriter<'r, I, W, R>
where
    I: Iterator<Item = &'t Token>,
    W: StrWrite,
    R: HighlighterRegistry + ?Sized,
{
    fn new(iter: I, writer: W, registry: &'r R) -> Self {
        Self {
            iter,
            writer,
            registry,
            end_newline: true,
        }
    }

    /// Writes a buffer, and tracks whether or not a newline was written.
    #[inline]
    fn write(&mut self, s: &str) -> Result<(), W::Error> {
        self.writer.write_str(s)?;

        if !s.is_empty() {
            self.end_newline = s.ends_with('\n');
        }
        Ok(())
    }

    /// Block elements start on a fresh line.
    fn write_block_start(&mut self, s: &str) -> Result<(), W::Error> {
        if !self.end_newline {
            self.write("\n")?;
        }
        self.write(s)
    }

    fn write_escaped(&mut self, s: &str) -> Result<(), W::Error> {
        escape_html(&mut self.writer, s)?;
        if !s.is_empty() {
            self.end_newline = s.ends_with('\n');
        }
        Ok(())
    }

    fn write_attr(&mut self, name: &str, value: &str) -> Result<(), W::Error> {
        self.write(" ")?;
        self.write(name)?;
        self.write("=\"")?;
        escape_html(&mut self.writer, value)?;
        self.write("\"")
    }

    fn run(mut self) -> Result<(), W::Error> {
        while let Some(token) = self.iter.next() {
            match token.kind {
                TokenKind::Text => self.write_escaped(&token.content)?,
                TokenKind::SoftBreak => self.write("<br>\n")?,
                TokenKind::StrongOpen => self.write("<strong>")?,
                TokenKind::StrongClose => self.write("</strong>")?,
                TokenKind::EmphasisOpen => self.write("<em>")?,
                TokenKind::EmphasisClose => self.write("</em>")?,
                TokenKind::StrikethroughOpen => self.write("<del>")?,
                TokenKind::StrikethroughClose => self.write("</del>")?,
                TokenKind::UnderlineOpen => self.write("<u>")?,
                TokenKind::UnderlineClose => self.write("</u>")?,
                TokenKind::SpoilerOpen => self.spoiler_open(token)?,
                TokenKind::SpoilerClose => self.write("</span>")?,
                TokenKind::LinkOpen => self.link_open(token)?,
                TokenKind::LinkClose => self.write("</a>")?,
                TokenKind::CodeInline => {
                    self.write("<code>")?;
                    self.write_escaped(&token.content)?;
                    self.write("</code>")?;
                }
                TokenKind::Timestamp => self.timestamp(token)?,
                TokenKind::CodeFence => self.code_fence(token)?,
                TokenKind::ParagraphOpen => self.write_block_start("<p>")?,
                TokenKind::ParagraphClose => self.write("</p>\n")?,
                TokenKind::HeadingOpen => {
                    self.write_block_start("<")?;
                    write!(&mut self.writer, "h{}", token.level().clamp(1, 6))?;
                    self.write(">")?;
                }
                TokenKind::HeadingClose => {
                    self.write("</")?;
                    write!(&mut self.writer, "h{}", token.level().clamp(1, 6))?;
                    self.write(">\n")?;
                }
                TokenKind::BlockquoteOpen => self.write_block_start("<blockquote>")?,
                TokenKind::BlockquoteClose => self.write("</blockquote>\n")?,
                TokenKind::BulletListOpen => self.write_block_start("<ul>\n")?,
                TokenKind::BulletListClose => self.write("</ul>\n")?,
                TokenKind::ListItemOpen => self.write("<li>")?,
                TokenKind::ListItemClose => self.write("</li>\n")?,
            }
        }
        Ok(())
    }

    fn spoiler_open(&mut self, token: &Token) -> Result<(), W::Error> {
        self.write("<span class=\"spoiler\"")?;
        for name in ["role", "tabindex", "aria-label"] {
            if let Some(value) = token.attr(name) {
                self.write_attr(name, value)?;
            }
        }
        self.write(">")
    }

    fn link_open(&mut self, token: &Token) -> Result<(), W::Error> {
        self.write("<a")?;
        self.write_attr("href", token.attr("href").unwrap_or_default())?;
        self.write(" rel=\"noopener noreferrer nofollow\" target=\"_blank\">")
    }

    fn timestamp(&mut self, token: &Token) -> Result<(), W::Error> {
        self.write("<span class=\"timestamp\"")?;
        self.write_attr("data-epoch", token.attr("epoch").unwrap_or_default())?;
        self.write_attr("data-style", token.attr("style").unwrap_or_default())?;
        if let Some(title) = token.attr("title") {
            self.write_attr("title", title)?;
        }
        self.write(">")?;
        self.write_escaped(&token.content)?;
        self.write("</span>")
    }

    fn code_fence(&mut self, token: &Token) -> Result<(), W::Error> {
        let code = token.content.as_str();
        if let Some(tag) = token.attr("language") {
            let language = resolve_language_alias(tag);
            let highlighted = match self.registry.resolve(&language) {
                Some(highlighter) => highlighter.highlight(code, &language).map_err(|err| {
                    tracing::debug!(%err, "highlighting failed, rendering plain code");
                }),
                None => {
                    tracing::debug!(%language, "no highlighter loaded, rendering plain code");
                    Err(())
                }
            };
            if let Ok(html) = highlighted {
                self.write_block_start("<pre><code class=\"language-")?;
                escape_html(&mut self.writer, &language)?;
                self.write("\" data-language=\"")?;
                escape_html(&mut self.writer, &language)?;
                self.write("\">")?;
                self.write(&html)?;
                return self.write("</code></pre>\n");
            }
        }

        self.write_block_start("<pre><code class=\"language-")?;
        self.write(PLAIN_LANGUAGE)?;
        self.write("\">")?;
        self.write_escaped(code)?;
        self.write("</code></pre>\n")
    }
}

/// Render tokens into `writer`.
pub fn write_html<'a, W, R>(
    tokens: impl IntoIterator<Item = &'a Token>,
    writer: W,
    registry: &R,
) -> Result<(), W::Error>
where
    W: StrWrite,
    R: HighlighterRegistry + ?Sized,
{
    HtmlWriter::new(tokens.into_iter(), writer, registry).run()
}

/// Render tokens to a raw HTML string. The output is not sanitized.
pub fn render_tokens<R: HighlighterRegistry + ?Sized>(tokens: &[Token], registry: &R) -> String {
    let mut out = String::with_capacity(tokens.len() * 16);
    // Writing into a String cannot fail.
    let _ = write_html(tokens, &mut out, registry);
    out
}

#[cfg(test)]
mod tests {
    use chatmark_markdown::{Parser, parse};
    use insta::assert_snapshot;

    use super::*;
    use crate::highlight::{HighlightError, Highlighter, NoHighlighting};

    fn html(text: &str) -> String {
        render_tokens(&parse(text, 0), &NoHighlighting)
    }

    struct Upper;

    impl Highlighter for Upper {
        fn highlight(&self, code: &str, _language: &str) -> Result<String, HighlightError> {
            Ok(code.to_uppercase())
        }
    }

    struct Broken;

    impl Highlighter for Broken {
        fn highlight(&self, _code: &str, language: &str) -> Result<String, HighlightError> {
            Err(HighlightError::Failed {
                language: language.into(),
                message: "boom".into(),
            })
        }
    }

    struct Only<H>(&'static str, H);

    impl<H: Highlighter> HighlighterRegistry for Only<H> {
        fn resolve(&self, language: &str) -> Option<&dyn Highlighter> {
            (language == self.0).then_some(&self.1 as &dyn Highlighter)
        }
    }

    #[test]
    fn inline_elements() {
        assert_snapshot!(
            html("**b** *i* __u__ ~~s~~ `c` ||x||"),
            @r#"<p><strong>b</strong> <em>i</em> <u>u</u> <del>s</del> <code>c</code> <span class="spoiler" role="button" tabindex="0" aria-label="Spoiler">x</span></p>"#
        );
    }

    #[test]
    fn text_is_escaped() {
        assert_eq!(
            html("<b>\"fish\" & chips</b>"),
            "<p>&lt;b&gt;&quot;fish&quot; &amp; chips&lt;/b&gt;</p>\n"
        );
    }

    #[test]
    fn timestamp_carries_data_attributes() {
        let tokens = Parser::new().with_now(1_700_000_000).parse("<t:1700000000:R>");
        assert_eq!(
            render_tokens(&tokens, &NoHighlighting),
            "<p><span class=\"timestamp\" data-epoch=\"1700000000\" data-style=\"R\" \
             title=\"Tuesday, November 14, 2023 10:13 PM\">now</span></p>\n"
        );
    }

    #[test]
    fn link_attributes() {
        assert_eq!(
            html("[x](https://a.b/?q=1&r=2)"),
            "<p><a href=\"https://a.b/?q=1&amp;r=2\" rel=\"noopener noreferrer nofollow\" \
             target=\"_blank\">x</a></p>\n"
        );
    }

    #[test]
    fn blocks() {
        assert_snapshot!(html("# Title\n> quote\n- one\n- two\n\npara\nline"), @r#"
        <h1>Title</h1>
        <blockquote>quote</blockquote>
        <ul>
        <li>one</li>
        <li>two</li>
        </ul>
        <p>para<br>
        line</p>
        "#);
    }

    #[test]
    fn code_fence_without_language_is_plain() {
        assert_eq!(
            html("```\na < b\n```"),
            "<pre><code class=\"language-plaintext\">a &lt; b\n</code></pre>\n"
        );
    }

    #[test]
    fn unknown_language_degrades_silently() {
        let tokens = parse("```klingon\nqapla\n```", 0);
        let out = render_tokens(&tokens, &Only("rust", Upper));
        assert_eq!(
            out,
            "<pre><code class=\"language-plaintext\">qapla\n</code></pre>\n"
        );
    }

    #[test]
    fn alias_resolves_before_lookup() {
        let tokens = parse("```rs\nfn x\n```", 0);
        let out = render_tokens(&tokens, &Only("rust", Upper));
        assert_eq!(
            out,
            "<pre><code class=\"language-rust\" data-language=\"rust\">FN X\n</code></pre>\n"
        );
    }

    #[test]
    fn failing_highlighter_degrades_silently() {
        let tokens = parse("```rust\nfn x\n```", 0);
        let out = render_tokens(&tokens, &Only("rust", Broken));
        assert_eq!(
            out,
            "<pre><code class=\"language-plaintext\">fn x\n</code></pre>\n"
        );
    }

    #[test]
    fn degraded_output_is_deterministic() {
        let tokens = parse("```rust\nfn x\n```", 0);
        let a = render_tokens(&tokens, &Only("rust", Broken));
        let b = render_tokens(&tokens, &NoHighlighting);
        assert_eq!(a, b);
    }
}
