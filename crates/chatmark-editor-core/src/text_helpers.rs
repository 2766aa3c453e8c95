//! Character-offset helpers shared by the transforms.

/// Find start of line containing offset.
pub fn find_line_start(chars: &[char], offset: usize) -> usize {
    let mut pos = offset.min(chars.len());
    while pos > 0 {
        if chars[pos - 1] == '\n' {
            return pos;
        }
        pos -= 1;
    }
    0
}

/// Find end of line containing offset (position of newline or end of text).
pub fn find_line_end(chars: &[char], offset: usize) -> usize {
    let len = chars.len();
    let mut pos = offset;
    while pos < len {
        if chars[pos] == '\n' {
            return pos;
        }
        pos += 1;
    }
    len
}

pub fn is_blank(line: &[char]) -> bool {
    line.iter().all(|c| c.is_whitespace())
}

pub fn starts_with(chars: &[char], prefix: &str) -> bool {
    let mut iter = chars.iter();
    prefix.chars().all(|p| iter.next() == Some(&p))
}

pub fn ends_with(chars: &[char], suffix: &str) -> bool {
    let mut iter = chars.iter().rev();
    suffix.chars().rev().all(|s| iter.next() == Some(&s))
}

/// `chars` with `start..end` replaced by `insert`.
pub fn splice(chars: &[char], start: usize, end: usize, insert: &str) -> String {
    let mut out = String::with_capacity(chars.len() + insert.len());
    out.extend(&chars[..start]);
    out.push_str(insert);
    out.extend(&chars[end..]);
    out
}
