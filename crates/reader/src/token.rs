use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::segment::AnyValue;

/// One unit returned by [`Reader::read_any`](crate::Reader::read_any).
#[derive(Debug, Clone)]
pub enum Token {
    /// A whitespace-delimited word cut out of a textual segment
    Text(String),
    /// A whole opaque value, together with its rendered text
    Object { value: AnyValue, text: String },
}

impl Token {
    pub fn as_str(&self) -> &str {
        match self {
            Token::Text(text) => text,
            Token::Object { text, .. } => text,
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Token::Object { .. })
    }

    /// Downcast the token payload. A text token downcasts to `String`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Token::Text(text) => (text as &dyn Any).downcast_ref::<T>(),
            Token::Object { value, .. } => (**value).downcast_ref::<T>(),
        }
    }

    /// The token as a shareable value: the original object, or the word as a `String`.
    pub fn into_value(self) -> AnyValue {
        match self {
            Token::Text(text) => Arc::new(text),
            Token::Object { value, .. } => value,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq<str> for Token {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Token {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}
