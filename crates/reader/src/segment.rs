//! Segment layout and value stringification.

use std::any::Any;
use std::sync::Arc;

/// A value fed into a reader.
pub type AnyValue = Arc<dyn Any + Send + Sync>;

/// Converts input values to text and tells textual values from opaque ones.
///
/// Opaque values are returned whole by [`Reader::read_any`](crate::Reader::read_any)
/// when the cursor sits at their start; textual values are always split on
/// whitespace.
pub trait Stringify: Send + Sync {
    fn to_text(&self, value: &AnyValue) -> String;
    fn is_text(&self, value: &AnyValue) -> bool;
}

/// Renders strings and primitive scalars; everything else renders empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultStringify;

macro_rules! render_scalar {
    ($any:expr, $($ty:ty),+ $(,)?) => {
        $(
            if let Some(v) = $any.downcast_ref::<$ty>() {
                return v.to_string();
            }
        )+
    };
}

impl Stringify for DefaultStringify {
    fn to_text(&self, value: &AnyValue) -> String {
        if let Some(text) = text_of(value) {
            return text.to_owned();
        }
        let any: &(dyn Any + Send + Sync) = &**value;
        render_scalar!(any, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char);
        String::new()
    }

    fn is_text(&self, value: &AnyValue) -> bool {
        text_of(value).is_some()
    }
}

fn text_of(value: &AnyValue) -> Option<&str> {
    let any: &(dyn Any + Send + Sync) = &**value;
    if let Some(s) = any.downcast_ref::<String>() {
        Some(s.as_str())
    } else if let Some(s) = any.downcast_ref::<&'static str>() {
        Some(*s)
    } else if let Some(s) = any.downcast_ref::<Arc<str>>() {
        Some(&**s)
    } else if let Some(s) = any.downcast_ref::<Box<str>>() {
        Some(&**s)
    } else {
        None
    }
}

/// A [`Stringify`] assembled from two closures.
pub struct FnStringify<T, P> {
    to_text: T,
    is_text: P,
}

impl<T, P> FnStringify<T, P>
where
    T: Fn(&AnyValue) -> String + Send + Sync,
    P: Fn(&AnyValue) -> bool + Send + Sync,
{
    pub fn new(to_text: T, is_text: P) -> Self {
        FnStringify { to_text, is_text }
    }
}

impl<T, P> Stringify for FnStringify<T, P>
where
    T: Fn(&AnyValue) -> String + Send + Sync,
    P: Fn(&AnyValue) -> bool + Send + Sync,
{
    fn to_text(&self, value: &AnyValue) -> String {
        (self.to_text)(value)
    }

    fn is_text(&self, value: &AnyValue) -> bool {
        (self.is_text)(value)
    }
}

// ──────────────────────────────────────────────
// Layout
// ──────────────────────────────────────────────

/// One addressable stretch of the cursor space.
///
/// Content segments occupy `max(len, 1)` positions, so an empty value still
/// takes one cursor slot. Separators occupy exactly one. The tail is the
/// zero-width end marker and always comes last.
#[derive(Debug)]
pub(crate) struct Segment {
    pub start: usize,
    pub end: usize,
    pub kind: SegmentKind,
}

#[derive(Debug)]
pub(crate) enum SegmentKind {
    Content {
        chars: Box<[char]>,
        text: Arc<str>,
        value: AnyValue,
        opaque: bool,
    },
    Separator,
    Tail,
}

impl Segment {
    /// Offset of `cursor` inside this segment's characters, clamped to its length.
    pub fn offset(&self, cursor: usize, len: usize) -> usize {
        cursor.saturating_sub(self.start).min(len)
    }
}

pub(crate) fn layout<I>(values: I, stringify: &dyn Stringify) -> Vec<Segment>
where
    I: IntoIterator<Item = AnyValue>,
{
    let mut segments = Vec::new();
    let mut cursor = 0usize;
    for (index, value) in values.into_iter().enumerate() {
        if index > 0 {
            segments.push(Segment {
                start: cursor,
                end: cursor + 1,
                kind: SegmentKind::Separator,
            });
            cursor += 1;
        }
        let text = stringify.to_text(&value);
        let chars: Box<[char]> = text.chars().collect();
        let width = chars.len().max(1);
        let opaque = !stringify.is_text(&value);
        segments.push(Segment {
            start: cursor,
            end: cursor + width,
            kind: SegmentKind::Content {
                chars,
                text: Arc::from(text),
                value,
                opaque,
            },
        });
        cursor += width;
    }
    segments.push(Segment {
        start: cursor,
        end: cursor,
        kind: SegmentKind::Tail,
    });
    segments
}
