//! Selection and transform result types.

/// A range in the text, measured in character offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Range {
    pub start: usize,
    pub end: usize,
}

impl Range {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn caret(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    pub fn is_caret(&self) -> bool {
        self.start == self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Normalize range so start <= end.
    pub fn normalize(self) -> Self {
        if self.start <= self.end {
            self
        } else {
            Self {
                start: self.end,
                end: self.start,
            }
        }
    }

    /// Normalize, then pull both ends inside `0..=len`.
    pub fn clamp(self, len: usize) -> Self {
        let range = self.normalize();
        Self {
            start: range.start.min(len),
            end: range.end.min(len),
        }
    }
}

impl From<std::ops::Range<usize>> for Range {
    fn from(r: std::ops::Range<usize>) -> Self {
        Self::new(r.start, r.end)
    }
}

impl From<Range> for std::ops::Range<usize> {
    fn from(r: Range) -> Self {
        r.start..r.end
    }
}

/// New text plus the selection to show after a transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapResult {
    pub text: String,
    pub selection: Range,
}

impl WrapResult {
    pub fn new(text: impl Into<String>, selection: impl Into<Range>) -> Self {
        Self {
            text: text.into(),
            selection: selection.into(),
        }
    }

    /// The input unchanged (after clamping the selection).
    pub(crate) fn unchanged(text: &str, selection: Range) -> Self {
        Self::new(text, selection)
    }
}
