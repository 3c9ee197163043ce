use serde::Serialize;

/// Inclusive pair of absolute cursor positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct StringRange {
    pub start: usize,
    pub end: usize,
}

impl StringRange {
    pub fn at(position: usize) -> Self {
        StringRange {
            start: position,
            end: position,
        }
    }

    pub fn between(start: usize, end: usize) -> Self {
        StringRange { start, end }
    }

    /// Smallest range covering both.
    pub fn encompassing(a: StringRange, b: StringRange) -> Self {
        StringRange {
            start: a.start.min(b.start),
            end: a.end.max(b.end),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether `cursor` lies within the range, both ends included.
    pub fn contains(&self, cursor: usize) -> bool {
        self.start <= cursor && cursor <= self.end
    }
}
