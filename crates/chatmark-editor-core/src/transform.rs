//! Pure text transforms behind the formatting toolbar.
//!
//! Every function takes the buffer and a selection in character offsets and
//! returns the new buffer with the selection to show. Out-of-range or
//! reversed selections are clamped first, so none of these can panic.

use chatmark_markdown::TimestampStyle;

use crate::text_helpers::{ends_with, find_line_end, find_line_start, is_blank, splice, starts_with};
use crate::types::{Range, WrapResult};

const FENCE: &str = "```";

/// Placeholder used by [`insert_masked_link`] when nothing is selected.
pub const LINK_TEXT_PLACEHOLDER: &str = "link text";

/// The default url. When passed to [`insert_masked_link`], it is left
/// selected so it can be typed over.
pub const URL_PLACEHOLDER: &str = "url";

fn prepare(text: &str, start: usize, end: usize) -> (Vec<char>, Range) {
    let chars: Vec<char> = text.chars().collect();
    let range = Range::new(start, end).clamp(chars.len());
    (chars, range)
}

fn collect(chars: &[char]) -> String {
    chars.iter().collect()
}

/// Toggle a symmetric delimiter such as `**` around the selection.
///
/// In order of priority:
/// 1. the delimiter directly surrounds the selection: remove it;
/// 2. the selection itself starts and ends with the delimiter: strip it;
/// 3. otherwise wrap, keeping the original text selected.
pub fn toggle_wrap(text: &str, start: usize, end: usize, token: &str) -> WrapResult {
    let (chars, Range { start, end }) = prepare(text, start, end);
    tracing::trace!(start, end, token, "toggle_wrap");
    let n = token.chars().count();
    if n == 0 {
        return WrapResult::unchanged(text, Range::new(start, end));
    }

    if start >= n && ends_with(&chars[..start], token) && starts_with(&chars[end..], token) {
        let mut out = String::with_capacity(text.len());
        out.extend(&chars[..start - n]);
        out.extend(&chars[start..end]);
        out.extend(&chars[end + n..]);
        return WrapResult::new(out, Range::new(start - n, end - n));
    }

    let selected = &chars[start..end];
    if selected.len() >= 2 * n && starts_with(selected, token) && ends_with(selected, token) {
        let inner = collect(&selected[n..selected.len() - n]);
        return WrapResult::new(
            splice(&chars, start, end, &inner),
            Range::new(start, end - 2 * n),
        );
    }

    let wrapped = format!("{token}{}{token}", collect(selected));
    WrapResult::new(
        splice(&chars, start, end, &wrapped),
        Range::new(start + n, end + n),
    )
}

/// Like [`toggle_wrap`] with distinct opening and closing delimiters.
///
/// Only the surrounding-delimiter check applies; a selection that contains
/// the delimiters is wrapped again.
pub fn toggle_wrap_asymmetric(
    text: &str,
    start: usize,
    end: usize,
    open: &str,
    close: &str,
) -> WrapResult {
    let (chars, Range { start, end }) = prepare(text, start, end);
    tracing::trace!(start, end, open, close, "toggle_wrap_asymmetric");
    let open_len = open.chars().count();
    let close_len = close.chars().count();

    if open_len + close_len > 0
        && start >= open_len
        && ends_with(&chars[..start], open)
        && starts_with(&chars[end..], close)
    {
        let mut out = String::with_capacity(text.len());
        out.extend(&chars[..start - open_len]);
        out.extend(&chars[start..end]);
        out.extend(&chars[end + close_len..]);
        return WrapResult::new(out, Range::new(start - open_len, end - open_len));
    }
    if open_len + close_len == 0 {
        return WrapResult::unchanged(text, Range::new(start, end));
    }

    let wrapped = format!("{open}{}{close}", collect(&chars[start..end]));
    WrapResult::new(
        splice(&chars, start, end, &wrapped),
        Range::new(start + open_len, end + open_len),
    )
}

/// Toggle a line prefix such as `>` or `-` on every line touched by the
/// selection.
///
/// If every line already carries `prefix` followed by a space (blank lines
/// count as carrying it), the prefix is removed. Otherwise it is added to every
/// non-blank line, so a selection of blank lines only is left as it is. The
/// new selection starts at the first line boundary.
pub fn toggle_block_prefix(text: &str, start: usize, end: usize, prefix: &str) -> WrapResult {
    let (chars, Range { start, end }) = prepare(text, start, end);
    tracing::trace!(start, end, prefix, "toggle_block_prefix");
    if prefix.is_empty() {
        return WrapResult::unchanged(text, Range::new(start, end));
    }

    let marker = format!("{prefix} ");
    let marker_len = marker.chars().count();
    let line_start = find_line_start(&chars, start);
    let line_end = find_line_end(&chars, end);
    let lines: Vec<&[char]> = chars[line_start..line_end].split(|c| *c == '\n').collect();

    let all_prefixed = lines
        .iter()
        .all(|line| is_blank(line) || starts_with(line, &marker));

    let mut body = String::with_capacity(line_end - line_start + lines.len() * marker.len());
    let mut touched = 0;
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            body.push('\n');
        }
        if all_prefixed {
            if starts_with(line, &marker) {
                body.extend(&line[marker_len..]);
                touched += 1;
            } else {
                body.extend(*line);
            }
        } else if !is_blank(line) {
            body.push_str(&marker);
            body.extend(*line);
            touched += 1;
        } else {
            body.extend(*line);
        }
    }

    let delta = marker_len * touched;
    let end = if all_prefixed {
        end.saturating_sub(delta).max(line_start)
    } else {
        end + delta
    };
    WrapResult::new(
        splice(&chars, line_start, line_end, &body),
        Range::new(line_start, end),
    )
}

/// Characters allowed in a fence language tag.
fn is_fence_info(c: char) -> bool {
    !c.is_whitespace() && c != '`'
}

/// If `before` ends with an opening fence line (```` ``` ```` + tag + `\n`),
/// the offset where that fence starts.
fn opening_fence_before(before: &[char]) -> Option<usize> {
    let newline = before.len().checked_sub(1)?;
    if before[newline] != '\n' {
        return None;
    }
    let mut info_start = newline;
    while info_start > 0 && is_fence_info(before[info_start - 1]) {
        info_start -= 1;
    }
    let fence_start = info_start.checked_sub(FENCE.len())?;
    ends_with(&before[..info_start], FENCE).then_some(fence_start)
}

/// Inner code of a selection that is itself a complete fenced block.
fn fenced_inner(selected: &[char]) -> Option<&[char]> {
    if !starts_with(selected, FENCE) {
        return None;
    }
    let newline = selected.iter().position(|c| *c == '\n')?;
    if !selected[FENCE.len()..newline].iter().all(|c| is_fence_info(*c)) {
        return None;
    }
    let close = "\n```";
    if selected.len() < newline + 1 + close.len() || !ends_with(selected, close) {
        return None;
    }
    Some(&selected[newline + 1..selected.len() - close.len()])
}

/// Wrap the selection in a fenced code block, or unwrap it.
///
/// Unwrapping happens when the selection sits directly between an opening
/// fence line and a closing fence, or when the selection is a whole fenced
/// block. The fence's own language tag is ignored when unwrapping.
pub fn toggle_code_block(text: &str, start: usize, end: usize, language: &str) -> WrapResult {
    let (chars, Range { start, end }) = prepare(text, start, end);
    tracing::trace!(start, end, language, "toggle_code_block");
    let close = "\n```";
    let close_len = close.chars().count();

    let fence_start = opening_fence_before(&chars[..start])
        .filter(|_| starts_with(&chars[end..], close));
    if let Some(fence_start) = fence_start {
        let mut out = String::with_capacity(text.len());
        out.extend(&chars[..fence_start]);
        out.extend(&chars[start..end]);
        out.extend(&chars[end + close_len..]);
        return WrapResult::new(
            out,
            Range::new(fence_start, fence_start + (end - start)),
        );
    }

    if let Some(inner) = fenced_inner(&chars[start..end]) {
        let inner_len = inner.len();
        let inner = collect(inner);
        return WrapResult::new(
            splice(&chars, start, end, &inner),
            Range::new(start, start + inner_len),
        );
    }

    let opening = format!("{FENCE}{}\n", language.trim());
    let shift = opening.chars().count();
    let wrapped = format!("{opening}{}{close}", collect(&chars[start..end]));
    WrapResult::new(
        splice(&chars, start, end, &wrapped),
        Range::new(start + shift, end + shift),
    )
}

/// Insert `insert` at `position`, leaving the caret right after it.
pub fn insert_at(text: &str, position: usize, insert: &str) -> WrapResult {
    let (chars, Range { start, .. }) = prepare(text, position, position);
    tracing::trace!(position = start, "insert_at");
    WrapResult::new(
        splice(&chars, start, start, insert),
        Range::caret(start + insert.chars().count()),
    )
}

/// Replace the selection with `[selection](url)`.
///
/// An empty selection uses [`LINK_TEXT_PLACEHOLDER`] as the label. If `url`
/// is [`URL_PLACEHOLDER`] the url part is selected, otherwise the caret lands
/// after the link.
pub fn insert_masked_link(text: &str, start: usize, end: usize, url: &str) -> WrapResult {
    let (chars, Range { start, end }) = prepare(text, start, end);
    tracing::trace!(start, end, url, "insert_masked_link");
    let label = if start == end {
        LINK_TEXT_PLACEHOLDER.to_string()
    } else {
        collect(&chars[start..end])
    };
    let link = format!("[{label}]({url})");
    let out = splice(&chars, start, end, &link);

    let selection = if url == URL_PLACEHOLDER {
        let url_start = start + label.chars().count() + 3;
        Range::new(url_start, url_start + URL_PLACEHOLDER.len())
    } else {
        Range::caret(start + link.chars().count())
    };
    WrapResult::new(out, selection)
}

/// Replace the selection with a `<t:EPOCH:STYLE>` tag, caret after it.
pub fn insert_timestamp(
    text: &str,
    start: usize,
    end: usize,
    epoch: i64,
    style: TimestampStyle,
) -> WrapResult {
    let (chars, Range { start, end }) = prepare(text, start, end);
    tracing::trace!(start, end, epoch, %style, "insert_timestamp");
    let tag = format!("<t:{epoch}:{}>", style.code());
    WrapResult::new(
        splice(&chars, start, end, &tag),
        Range::caret(start + tag.chars().count()),
    )
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use super::*;

    fn sel(result: &WrapResult) -> (usize, usize) {
        (result.selection.start, result.selection.end)
    }

    #[test]
    fn wrap_bold() {
        let result = toggle_wrap("hello world", 0, 5, "**");
        assert_eq!(result.text, "**hello** world");
        assert_eq!(sel(&result), (2, 7));
    }

    #[test]
    fn surrounding_delimiters_are_removed() {
        let result = toggle_wrap("**hello** world", 2, 7, "**");
        assert_eq!(result.text, "hello world");
        assert_eq!(sel(&result), (0, 5));
    }

    #[test]
    fn selected_delimiters_are_stripped() {
        let result = toggle_wrap("say **hi**", 4, 10, "**");
        assert_eq!(result.text, "say hi");
        assert_eq!(sel(&result), (4, 6));
    }

    #[test]
    fn wrap_round_trips() {
        let cases = [
            ("hello world", 0, 5, "**"),
            ("hello world", 6, 11, "~~"),
            ("", 0, 0, "||"),
            ("héllo wörld", 1, 4, "__"),
            ("a*b", 1, 2, "*"),
            ("line\nnext", 0, 9, "`"),
            ("abc", 3, 3, "**"),
        ];
        for (text, start, end, token) in cases {
            let once = toggle_wrap(text, start, end, token);
            let twice = toggle_wrap(&once.text, once.selection.start, once.selection.end, token);
            assert_eq!(twice.text, text, "{text:?} {token}");
            assert_eq!(sel(&twice), (start, end), "{text:?} {token}");
        }
    }

    #[test]
    fn offsets_are_characters_not_bytes() {
        let result = toggle_wrap("日本語", 1, 2, "*");
        assert_eq!(result.text, "日*本*語");
        assert_eq!(sel(&result), (2, 3));
    }

    #[test]
    fn out_of_range_selection_is_clamped() {
        let result = toggle_wrap("abc", 5, 1, "**");
        assert_eq!(result.text, "a**bc**");
        assert_eq!(sel(&result), (3, 5));
        assert_eq!(toggle_wrap("abc", 0, 3, "").text, "abc");
    }

    #[test]
    fn asymmetric_wrap() {
        let result = toggle_wrap_asymmetric("see this", 4, 8, "[", "](url)");
        assert_eq!(result.text, "see [this](url)");
        assert_eq!(sel(&result), (5, 9));
        let back = toggle_wrap_asymmetric(&result.text, 5, 9, "[", "](url)");
        assert_eq!(back.text, "see this");
        assert_eq!(sel(&back), (4, 8));
    }

    #[test]
    fn quote_prefix_on_lines() {
        let result = toggle_block_prefix("one\n\ntwo", 1, 7, ">");
        assert_snapshot!(result.text, @r"
        > one

        > two
        ");
        assert_eq!(sel(&result), (0, 11));
    }

    #[test]
    fn prefix_removed_when_every_line_has_it() {
        let result = toggle_block_prefix("- a\n- b\nrest", 0, 5, "-");
        assert_eq!(result.text, "a\nb\nrest");
        assert_eq!(sel(&result), (0, 1));
    }

    #[test]
    fn block_prefix_twice_is_identity() {
        let cases = [
            ("hello", 2, 2, ">"),
            ("a\nb\nc", 0, 5, "-"),
            ("x\n\ny", 0, 4, ">"),
            ("intro\n- done\nnext", 7, 14, "-"),
            ("", 0, 0, ">"),
            ("  \n", 0, 1, "#"),
        ];
        for (text, start, end, prefix) in cases {
            let once = toggle_block_prefix(text, start, end, prefix);
            let twice = toggle_block_prefix(
                &once.text,
                once.selection.start,
                once.selection.end,
                prefix,
            );
            assert_eq!(twice.text, text, "{text:?} {prefix}");
        }
    }

    #[test]
    fn single_line_prefix_twice_with_same_selection() {
        for (text, caret) in [("hello", 2), ("- x", 1), ("", 0)] {
            let once = toggle_block_prefix(text, caret, caret, "-");
            let twice = toggle_block_prefix(&once.text, caret, caret, "-");
            assert_eq!(twice.text, text, "{text:?}");
        }
    }

    #[test]
    fn blank_selection_is_left_unchanged() {
        let cases = [
            ("", 0, 0, ">", (0, 0)),
            ("a\n\nb", 2, 2, ">", (2, 2)),
            ("  \n", 0, 1, "#", (0, 1)),
            ("x\n\n\ny", 2, 3, "-", (2, 3)),
        ];
        for (text, start, end, prefix, selection) in cases {
            let result = toggle_block_prefix(text, start, end, prefix);
            assert_eq!(result.text, text, "{text:?} {prefix}");
            assert_eq!(sel(&result), selection, "{text:?} {prefix}");
        }
    }

    #[test]
    fn block_prefix_only_touches_selected_lines() {
        let result = toggle_block_prefix("a\nb\nc", 2, 3, ">");
        assert_eq!(result.text, "a\n> b\nc");
        assert_eq!(sel(&result), (2, 5));
    }

    #[test]
    fn code_block_wraps_with_language() {
        let result = toggle_code_block("x = 1", 0, 5, "py");
        assert_eq!(result.text, "```py\nx = 1\n```");
        assert_eq!(sel(&result), (6, 11));
    }

    #[test]
    fn code_block_round_trips() {
        let cases = [
            ("x = 1", 0, 5, "py"),
            ("before code after", 7, 11, ""),
            ("a`", 2, 2, "rust"),
            ("", 0, 0, "js"),
        ];
        for (text, start, end, language) in cases {
            let once = toggle_code_block(text, start, end, language);
            let twice =
                toggle_code_block(&once.text, once.selection.start, once.selection.end, language);
            assert_eq!(twice.text, text, "{text:?}");
            assert_eq!(sel(&twice), (start, end), "{text:?}");
        }
    }

    #[test]
    fn selected_fenced_block_is_unwrapped() {
        let text = "see\n```rust\nfn a() {}\n```";
        let result = toggle_code_block(text, 4, text.chars().count(), "");
        assert_eq!(result.text, "see\nfn a() {}");
        assert_eq!(sel(&result), (4, 13));
    }

    #[test]
    fn insert_places_caret_after() {
        let result = insert_at("ab", 1, "XYZ");
        assert_eq!(result.text, "aXYZb");
        assert_eq!(result.selection, Range::caret(4));
        assert_eq!(insert_at("ab", 10, "!").text, "ab!");
    }

    #[test]
    fn masked_link_with_placeholder_url_selects_url() {
        let result = insert_masked_link("go here", 3, 7, URL_PLACEHOLDER);
        assert_eq!(result.text, "go [here](url)");
        assert_eq!(sel(&result), (10, 13));
        assert_eq!(&result.text[10..13], "url");
    }

    #[test]
    fn masked_link_without_selection_uses_placeholder_text() {
        let result = insert_masked_link("", 0, 0, "https://a.b");
        assert_eq!(result.text, "[link text](https://a.b)");
        assert_eq!(result.selection, Range::caret(24));
    }

    #[test]
    fn timestamp_replaces_selection() {
        let result = insert_timestamp("at NOON", 3, 7, 1_700_000_000, TimestampStyle::ShortTime);
        assert_eq!(result.text, "at <t:1700000000:t>");
        assert_eq!(result.selection, Range::caret(19));
    }
}
