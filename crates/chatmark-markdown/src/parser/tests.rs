use insta::assert_snapshot;

use super::*;
use crate::token::{TokenKind, is_well_nested};

fn dump(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

fn inline(text: &str) -> Vec<Token> {
    Parser::new().parse_inline(text)
}

fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
    tokens.iter().map(|t| t.kind).collect()
}

#[test]
fn underline_triple() {
    let tokens = inline("__u__");
    assert_eq!(
        kinds(&tokens),
        vec![
            TokenKind::UnderlineOpen,
            TokenKind::Text,
            TokenKind::UnderlineClose
        ]
    );
    assert_eq!(tokens[1].content, "u");
}

#[test]
fn odd_underscores_stay_literal() {
    let tokens = inline("___");
    assert_eq!(tokens, vec![Token::text("___")]);
}

#[test]
fn unclosed_underline_falls_back_to_emphasis() {
    // `__a_` has no closing pair; the single `_` rules take over.
    assert_eq!(
        kinds(&inline("__a_")),
        vec![
            TokenKind::Text,
            TokenKind::EmphasisOpen,
            TokenKind::Text,
            TokenKind::EmphasisClose
        ]
    );
    let tokens = inline("_a __b_");
    assert_eq!(tokens[0].kind, TokenKind::EmphasisOpen);
}

#[test]
fn spoiler_carries_accessibility_attrs() {
    let tokens = inline("||secret||");
    assert_eq!(tokens.len(), 3);
    assert_eq!(tokens[0].kind, TokenKind::SpoilerOpen);
    assert_eq!(tokens[0].attr("role"), Some("button"));
    assert_eq!(tokens[0].attr("aria-label"), Some("Spoiler"));
    assert_eq!(tokens[0].attr("tabindex"), Some("0"));
    assert_eq!(tokens[1].content, "secret");
}

#[test]
fn lone_pipes_are_text() {
    assert_eq!(inline("a || b"), vec![Token::text("a || b")]);
    assert_eq!(inline("|x|"), vec![Token::text("|x|")]);
}

#[test]
fn relative_timestamp_now() {
    let tokens = Parser::new().with_now(1_700_000_000).parse_inline("<t:1700000000:R>");
    assert_eq!(tokens.len(), 1);
    let token = &tokens[0];
    assert_eq!(token.kind, TokenKind::Timestamp);
    assert_eq!(token.content, "now");
    assert_eq!(token.attr("epoch"), Some("1700000000"));
    assert_eq!(token.attr("style"), Some("R"));
    assert_eq!(token.markup, "<t:1700000000:R>");
}

#[test]
fn relative_timestamp_one_minute_ahead() {
    let tokens = parse("<t:1700000000:R>", 1_699_999_940);
    let timestamp = tokens
        .iter()
        .find(|t| t.kind == TokenKind::Timestamp)
        .unwrap();
    assert_eq!(timestamp.content, "in 1 minute");
}

#[test]
fn timestamp_without_style_defaults_to_f() {
    let tokens = inline("<t:1700000000>");
    assert_eq!(tokens[0].attr("style"), Some("f"));
    assert_eq!(tokens[0].content, "November 14, 2023 10:13 PM");
    assert_eq!(
        tokens[0].attr("title"),
        Some("Tuesday, November 14, 2023 10:13 PM")
    );
}

#[test]
fn malformed_timestamps_are_literal() {
    for text in ["<t:soon>", "<t:123", "<t:>", "<x:1>", "<t:12:R:x>"] {
        assert_eq!(inline(text), vec![Token::text(text)], "input {text:?}");
    }
}

#[test]
fn base_emphasis() {
    assert_snapshot!(dump(&inline("**b** *i* _j_ ~~s~~ `c`")), @r#"
    StrongOpen
    Text "b"
    StrongClose
    Text " "
    EmphasisOpen
    Text "i"
    EmphasisClose
    Text " "
    EmphasisOpen
    Text "j"
    EmphasisClose
    Text " "
    StrikethroughOpen
    Text "s"
    StrikethroughClose
    Text " "
    CodeInline "c"
    "#);
}

#[test]
fn nested_inline_content() {
    let tokens = inline("||**loud** secret||");
    assert_eq!(
        kinds(&tokens),
        vec![
            TokenKind::SpoilerOpen,
            TokenKind::StrongOpen,
            TokenKind::Text,
            TokenKind::StrongClose,
            TokenKind::Text,
            TokenKind::SpoilerClose,
        ]
    );
    assert!(is_well_nested(&tokens));
}

#[test]
fn intraword_underscore_is_literal() {
    assert_eq!(inline("snake_case_name"), vec![Token::text("snake_case_name")]);
}

#[test]
fn spaced_asterisks_are_literal() {
    assert_eq!(inline("2 * 3 * 4"), vec![Token::text("2 * 3 * 4")]);
}

#[test]
fn inline_code_is_not_parsed() {
    let tokens = inline("`__x__`");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::CodeInline);
    assert_eq!(tokens[0].content, "__x__");
}

#[test]
fn escapes() {
    assert_eq!(inline(r"\*not\*"), vec![Token::text("*not*")]);
    assert_eq!(inline(r"a\b"), vec![Token::text(r"a\b")]);
}

#[test]
fn masked_link() {
    let tokens = inline("see [the docs](https://example.com/x) now");
    assert_snapshot!(dump(&tokens), @r#"
    Text "see "
    LinkOpen href="https://example.com/x"
    Text "the docs"
    LinkClose
    Text " now"
    "#);
}

#[test]
fn broken_links_are_text() {
    for text in ["[a](b c)", "[](x)", "[a] (x)", "[a](x"] {
        assert_eq!(inline(text), vec![Token::text(text)], "input {text:?}");
    }
}

#[test]
fn paragraphs_and_soft_breaks() {
    assert_snapshot!(dump(&parse("one\ntwo\n\nthree", 0)), @r#"
    ParagraphOpen
    Text "one"
    SoftBreak
    Text "two"
    ParagraphClose
    ParagraphOpen
    Text "three"
    ParagraphClose
    "#);
}

#[test]
fn headings() {
    let tokens = parse("### Title *here*\n####### seven", 0);
    assert_eq!(tokens[0].kind, TokenKind::HeadingOpen);
    assert_eq!(tokens[0].level(), 3);
    assert_eq!(tokens[1].content, "Title ");
    // Seven hashes is not a heading.
    let last_para = tokens
        .iter()
        .rposition(|t| t.kind == TokenKind::ParagraphOpen)
        .unwrap();
    assert_eq!(tokens[last_para + 1].content, "####### seven");
}

#[test]
fn quotes_and_lists() {
    assert_snapshot!(dump(&parse("> quoted\n> more\n- a\n- __b__", 0)), @r#"
    BlockquoteOpen
    Text "quoted"
    SoftBreak
    Text "more"
    BlockquoteClose
    BulletListOpen
    ListItemOpen
    Text "a"
    ListItemClose
    ListItemOpen
    UnderlineOpen
    Text "b"
    UnderlineClose
    ListItemClose
    BulletListClose
    "#);
}

#[test]
fn triple_quote_runs_to_end() {
    let tokens = parse("intro\n>>> all\nof this", 0);
    assert_eq!(tokens.last().unwrap().kind, TokenKind::BlockquoteClose);
    let open = tokens
        .iter()
        .position(|t| t.kind == TokenKind::BlockquoteOpen)
        .unwrap();
    assert_eq!(tokens[open + 1].content, "all");
    assert_eq!(tokens[open + 3].content, "of this");
}

#[test]
fn code_fence_with_language() {
    let tokens = parse("```rust\nfn main() {}\n```\nafter", 0);
    assert_eq!(tokens[0].kind, TokenKind::CodeFence);
    assert_eq!(tokens[0].attr("language"), Some("rust"));
    assert_eq!(tokens[0].content, "fn main() {}\n");
    assert_eq!(tokens[2].content, "after");
}

#[test]
fn code_fence_content_is_literal() {
    let tokens = parse("```\n**not bold** <t:1>\n```", 0);
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].attr("language"), None);
    assert_eq!(tokens[0].content, "**not bold** <t:1>\n");
}

#[test]
fn unclosed_fence_runs_to_end() {
    let tokens = parse("```py\nprint(1)\nprint(2)", 0);
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].content, "print(1)\nprint(2)\n");
}

#[test]
fn single_line_fence() {
    let tokens = parse("```let x = 1;```", 0);
    assert_eq!(tokens[0].kind, TokenKind::CodeFence);
    assert_eq!(tokens[0].content, "let x = 1;");
}

#[test]
fn inline_fences_in_prose_stay_a_paragraph() {
    for text in ["```x``` and more\nnext", "``` a ``` b\nnext", "``````\nnext"] {
        let tokens = parse(text, 0);
        assert!(
            !kinds(&tokens).contains(&TokenKind::CodeFence),
            "{text:?}: {}",
            dump(&tokens)
        );
        assert_eq!(tokens[0].kind, TokenKind::ParagraphOpen, "{text:?}");
        assert!(tokens.iter().any(|t| t.content == "next"), "{text:?}");
        assert!(is_well_nested(&tokens));
    }
}

#[test]
fn crlf_input() {
    let tokens = parse("a\r\nb", 0);
    assert_eq!(tokens[1].content, "a");
    assert_eq!(tokens[3].content, "b");
}

#[test]
fn custom_rule_registration() {
    struct Mention;
    impl InlineRule for Mention {
        fn name(&self) -> &'static str {
            "mention"
        }
        fn try_match(&self, state: &mut InlineState<'_>) -> bool {
            let rest = state.rest();
            if !rest.starts_with('@') {
                return false;
            }
            let len = rest[1..]
                .find(|c: char| !c.is_alphanumeric())
                .unwrap_or(rest.len() - 1);
            if len == 0 {
                return false;
            }
            state.push(Token::new(TokenKind::CodeInline).with_content(&rest[1..=len]));
            state.pos += len + 1;
            true
        }
    }

    let mut parser = Parser::new();
    parser.insert_rule_before("emphasis", Box::new(Mention));
    let names = parser.rule_names();
    let mention = names.iter().position(|n| *n == "mention").unwrap();
    let emphasis = names.iter().position(|n| *n == "emphasis").unwrap();
    assert_eq!(mention + 1, emphasis);

    let tokens = parser.parse_inline("hi @bob!");
    assert_eq!(tokens[1].content, "bob");
    assert_eq!(tokens[2].content, "!");
}

#[test]
fn extensions_run_before_emphasis() {
    let names = Parser::new().rule_names();
    let emphasis = names.iter().position(|n| *n == "emphasis").unwrap();
    for rule in ["underline", "spoiler", "timestamp"] {
        let index = names.iter().position(|n| *n == rule).unwrap();
        assert!(index < emphasis, "{rule} must precede emphasis");
    }
}

#[test]
fn output_is_always_well_nested() {
    let inputs = [
        "**a __b** c__",
        "||a **b|| c**",
        "*a ||b* c||",
        "__a\n\n__",
        "[**x](y)**",
        "> **a\n> b**",
        "- ||x\n- y||",
    ];
    for input in inputs {
        let tokens = parse(input, 0);
        assert!(is_well_nested(&tokens), "input {input:?}: {}", dump(&tokens));
    }
}

#[test]
fn empty_input() {
    assert!(parse("", 0).is_empty());
    assert!(parse("\n\n", 0).is_empty());
}
