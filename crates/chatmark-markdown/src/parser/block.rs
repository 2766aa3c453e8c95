use crate::token::{Token, TokenKind};

use super::Parser;

/// Leading fence marker.
const FENCE: &str = "```";

struct BlockWriter<'p, 't> {
    parser: &'p Parser,
    tokens: Vec<Token>,
    paragraph: Vec<&'t str>,
}

pub(super) fn parse_blocks(text: &str, parser: &Parser) -> Vec<Token> {
    let lines: Vec<&str> = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();

    let mut writer = BlockWriter {
        parser,
        tokens: Vec::new(),
        paragraph: Vec::new(),
    };

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];

        if let Some(rest) = line
            .trim_start()
            .strip_prefix(FENCE)
            .filter(|rest| opens_fence(rest))
        {
            writer.flush_paragraph();
            i = writer.code_fence(rest, &lines, i + 1);
            continue;
        }

        if line.trim().is_empty() {
            writer.flush_paragraph();
            i += 1;
            continue;
        }

        if let Some((level, content)) = heading(line) {
            writer.flush_paragraph();
            writer.heading(level, content);
            i += 1;
            continue;
        }

        if let Some(first) = line.strip_prefix(">>> ").or((line == ">>>").then_some("")) {
            // Everything to the end of input is quoted.
            writer.flush_paragraph();
            let mut quoted = vec![first];
            quoted.extend_from_slice(&lines[i + 1..]);
            writer.blockquote(&quoted);
            break;
        }

        if quote_line(line).is_some() {
            writer.flush_paragraph();
            let mut quoted = Vec::new();
            while let Some(content) = lines.get(i).and_then(|l| quote_line(l)) {
                quoted.push(content);
                i += 1;
            }
            writer.blockquote(&quoted);
            continue;
        }

        if list_item(line).is_some() {
            writer.flush_paragraph();
            let mut items = Vec::new();
            while let Some(content) = lines.get(i).and_then(|l| list_item(l)) {
                items.push(content);
                i += 1;
            }
            writer.bullet_list(&items);
            continue;
        }

        writer.paragraph.push(line);
        i += 1;
    }

    writer.flush_paragraph();
    writer.tokens
}

fn heading(line: &str) -> Option<(usize, &str)> {
    let level = line.bytes().take_while(|b| *b == b'#').count();
    if !(1..=6).contains(&level) {
        return None;
    }
    let content = line[level..].strip_prefix(' ')?;
    Some((level, content.trim()))
}

fn quote_line(line: &str) -> Option<&str> {
    if line == ">" {
        return Some("");
    }
    line.strip_prefix("> ")
}

fn list_item(line: &str) -> Option<&str> {
    line.strip_prefix("- ")
}

/// Whether a line starting with a fence marker begins a code block. A
/// further marker is only allowed as the closer of the single-line form;
/// otherwise the line is prose such as "```x``` and more".
fn opens_fence(rest: &str) -> bool {
    !rest.contains(FENCE) || single_line_fence(rest).is_some()
}

fn single_line_fence(rest: &str) -> Option<&str> {
    rest.strip_suffix(FENCE).filter(|code| !code.is_empty())
}

/// Language tags are a single word of identifier-ish characters.
fn is_language_tag(tag: &str) -> bool {
    !tag.is_empty()
        && tag
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '+' | '#' | '.' | '-'))
}

impl BlockWriter<'_, '_> {
    fn inline(&mut self, source: &str) {
        self.tokens.extend(self.parser.parse_inline(source));
    }

    fn flush_paragraph(&mut self) {
        if self.paragraph.is_empty() {
            return;
        }
        let source = self.paragraph.join("\n");
        self.paragraph.clear();
        self.tokens.push(Token::new(TokenKind::ParagraphOpen));
        self.inline(&source);
        self.tokens.push(Token::new(TokenKind::ParagraphClose));
    }

    fn heading(&mut self, level: usize, content: &str) {
        let markup = "#".repeat(level);
        self.tokens
            .push(Token::new(TokenKind::HeadingOpen).with_markup(markup.as_str()));
        self.inline(content);
        self.tokens
            .push(Token::new(TokenKind::HeadingClose).with_markup(markup.as_str()));
    }

    fn blockquote(&mut self, lines: &[&str]) {
        self.tokens
            .push(Token::new(TokenKind::BlockquoteOpen).with_markup(">"));
        self.inline(&lines.join("\n"));
        self.tokens
            .push(Token::new(TokenKind::BlockquoteClose).with_markup(">"));
    }

    fn bullet_list(&mut self, items: &[&str]) {
        self.tokens
            .push(Token::new(TokenKind::BulletListOpen).with_markup("-"));
        for item in items {
            self.tokens
                .push(Token::new(TokenKind::ListItemOpen).with_markup("-"));
            self.inline(item);
            self.tokens
                .push(Token::new(TokenKind::ListItemClose).with_markup("-"));
        }
        self.tokens
            .push(Token::new(TokenKind::BulletListClose).with_markup("-"));
    }

    /// Consume a fenced block whose opening line continues with `rest`.
    /// Returns the index of the first line after the block.
    fn code_fence(&mut self, rest: &str, lines: &[&str], mut i: usize) -> usize {
        // Single-line form: ```code```
        if let Some(code) = single_line_fence(rest) {
            self.push_fence("", code.to_string());
            return i;
        }

        let tag = rest.trim();
        let mut code = String::new();
        let language = if is_language_tag(tag) {
            tag
        } else {
            if !tag.is_empty() {
                code.push_str(rest);
                code.push('\n');
            }
            ""
        };

        while i < lines.len() {
            let line = lines[i];
            i += 1;
            if let Some(last) = line.trim_end().strip_suffix(FENCE) {
                if !last.trim().is_empty() {
                    code.push_str(last);
                    code.push('\n');
                }
                self.push_fence(language, code);
                return i;
            }
            code.push_str(line);
            code.push('\n');
        }

        // Unclosed fences run to the end of input.
        self.push_fence(language, code);
        i
    }

    fn push_fence(&mut self, language: &str, code: String) {
        let mut token = Token::new(TokenKind::CodeFence)
            .with_markup(FENCE)
            .with_content(code);
        if !language.is_empty() {
            token = token.with_attr("language", language);
        }
        self.tokens.push(token);
    }
}
