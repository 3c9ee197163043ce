//! The cursor and its character and token operations.
//!
//! The cursor is an absolute position in `[0, len()]`. Which segment it
//! lands in is re-derived on every operation, so [`Reader::set_cursor`] can
//! seek anywhere and cloning a reader is a reference-count bump.

use std::fmt;
use std::sync::Arc;

use crate::segment::{layout, AnyValue, DefaultStringify, Segment, SegmentKind, Stringify};
use crate::token::Token;

#[derive(Clone)]
pub struct Reader {
    segments: Arc<[Segment]>,
    cursor: usize,
}

impl Reader {
    /// A reader over one line of text. Empty text yields an empty reader.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_empty() {
            Reader::from_values(Vec::new())
        } else {
            Reader::from_values([Arc::new(text) as AnyValue])
        }
    }

    /// A reader over arbitrary values, rendered with [`DefaultStringify`].
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = AnyValue>,
    {
        Reader::with_stringify(values, &DefaultStringify)
    }

    /// A reader over arbitrary values, rendered with a custom [`Stringify`].
    pub fn with_stringify<I>(values: I, stringify: &dyn Stringify) -> Self
    where
        I: IntoIterator<Item = AnyValue>,
    {
        Reader {
            segments: layout(values, stringify).into(),
            cursor: 0,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Move the cursor, clamping it into `[0, len()]`.
    pub fn set_cursor(&mut self, cursor: usize) {
        self.cursor = cursor.min(self.len());
    }

    /// Total cursor span, separators and empty-value slots included.
    pub fn len(&self) -> usize {
        self.segments.last().map_or(0, |tail| tail.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn can_read(&self) -> bool {
        self.cursor < self.len()
    }

    pub fn peek_char(&self) -> Option<char> {
        self.peek_char_at(0)
    }

    /// Character `offset` places past the cursor, crossing segments.
    ///
    /// Empty values contribute no character; a separator contributes `' '`.
    pub fn peek_char_at(&self, offset: usize) -> Option<char> {
        let mut offset = offset;
        for segment in &self.segments[self.locate(self.cursor)..] {
            match &segment.kind {
                SegmentKind::Content { chars, .. } => {
                    let from = segment.offset(self.cursor, chars.len());
                    let available = chars.len() - from;
                    if offset < available {
                        return Some(chars[from + offset]);
                    }
                    offset -= available;
                }
                SegmentKind::Separator => {
                    if offset == 0 {
                        return Some(' ');
                    }
                    offset -= 1;
                }
                SegmentKind::Tail => return None,
            }
        }
        None
    }

    /// Consume one character. At the end the cursor stays at `len()`.
    pub fn read_char(&mut self) -> Option<char> {
        let start = self.locate(self.cursor);
        for segment in &self.segments[start..] {
            match &segment.kind {
                SegmentKind::Content { chars, .. } => {
                    let from = segment.offset(self.cursor, chars.len());
                    if from < chars.len() {
                        self.cursor = segment.start + from + 1;
                        return Some(chars[from]);
                    }
                }
                SegmentKind::Separator => {
                    self.cursor = segment.end;
                    return Some(' ');
                }
                SegmentKind::Tail => {
                    self.cursor = segment.start;
                    return None;
                }
            }
        }
        None
    }

    pub fn skip_whitespace(&mut self) {
        while self.peek_char().is_some_and(char::is_whitespace) {
            self.read_char();
        }
    }

    pub fn peek_any(&self) -> Option<Token> {
        self.scan_token().0
    }

    /// Consume the next token.
    ///
    /// At the exact start of an opaque value the value is returned whole.
    /// Otherwise leading whitespace is skipped, moving into later segments
    /// if needed, and the next whitespace-delimited word is returned with the
    /// cursor left right after it. With nothing left the cursor moves to
    /// `len()` and `None` is returned.
    pub fn read_any(&mut self) -> Option<Token> {
        let (token, cursor) = self.scan_token();
        self.cursor = cursor;
        token
    }

    /// Render `[start, end)` across segments.
    ///
    /// Each separator in range renders as one space, and so does an empty
    /// value lying fully inside the range.
    pub fn fetch_content(&self, start: usize, end: usize) -> String {
        let mut out = String::new();
        if start >= end {
            return out;
        }
        for segment in self.segments.iter() {
            if segment.end <= start && !matches!(segment.kind, SegmentKind::Tail) {
                continue;
            }
            if segment.start >= end {
                break;
            }
            match &segment.kind {
                SegmentKind::Content { chars, .. } if chars.is_empty() => {
                    if start <= segment.start && end >= segment.end {
                        out.push(' ');
                    }
                }
                SegmentKind::Content { chars, .. } => {
                    let from = start.saturating_sub(segment.start);
                    let to = (end - segment.start).min(chars.len());
                    if from < to {
                        out.extend(&chars[from..to]);
                    }
                }
                SegmentKind::Separator => out.push(' '),
                SegmentKind::Tail => break,
            }
        }
        out
    }

    /// Everything from the cursor to the end.
    pub fn remaining(&self) -> String {
        self.fetch_content(self.cursor, usize::MAX)
    }

    /// The whole input as text.
    pub fn input(&self) -> String {
        self.fetch_content(0, usize::MAX)
    }

    /// The original values, in order.
    pub fn values(&self) -> impl Iterator<Item = &AnyValue> {
        self.segments.iter().filter_map(|segment| match &segment.kind {
            SegmentKind::Content { value, .. } => Some(value),
            _ => None,
        })
    }

    // ──────────────────────────────────────────────
    // Internals
    // ──────────────────────────────────────────────

    /// Index of the first segment ending past `cursor`, or the tail.
    fn locate(&self, cursor: usize) -> usize {
        let index = self.segments.partition_point(|s| s.end <= cursor);
        index.min(self.segments.len().saturating_sub(1))
    }

    fn scan_token(&self) -> (Option<Token>, usize) {
        for segment in &self.segments[self.locate(self.cursor)..] {
            match &segment.kind {
                SegmentKind::Content {
                    chars,
                    text,
                    value,
                    opaque,
                } => {
                    let from = segment.offset(self.cursor, chars.len());
                    if *opaque && from == 0 {
                        let token = Token::Object {
                            value: value.clone(),
                            text: text.to_string(),
                        };
                        return (Some(token), segment.end);
                    }
                    let Some(begin) = (from..chars.len()).find(|&i| !chars[i].is_whitespace())
                    else {
                        continue;
                    };
                    let end = (begin..chars.len())
                        .find(|&i| chars[i].is_whitespace())
                        .unwrap_or(chars.len());
                    let word: String = chars[begin..end].iter().collect();
                    return (Some(Token::Text(word)), segment.start + end);
                }
                SegmentKind::Separator => {}
                SegmentKind::Tail => return (None, segment.start),
            }
        }
        (None, self.len())
    }
}

impl fmt::Debug for Reader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reader")
            .field("input", &self.input())
            .field("cursor", &self.cursor)
            .finish()
    }
}

impl From<&str> for Reader {
    fn from(text: &str) -> Self {
        Reader::new(text)
    }
}

impl From<String> for Reader {
    fn from(text: String) -> Self {
        Reader::new(text)
    }
}
