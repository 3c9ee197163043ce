use async_trait::async_trait;
use cmdtree_reader::{AnyValue, Reader};

use super::ArgumentType;
use crate::context::ContextBuilder;
use crate::error::{BoxError, CommandError};
use crate::handler::Source;

/// The next token as is: a `String` for words, the original value for
/// opaque objects.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyArgument;

#[async_trait]
impl<S: Source> ArgumentType<S> for AnyArgument {
    fn parse(&self, reader: &mut Reader, _context: &ContextBuilder<S>) -> Result<AnyValue, BoxError> {
        match reader.read_any() {
            Some(token) => Ok(token.into_value()),
            None => Err(CommandError::syntax("Expected an argument", reader).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::tests_support::context;

    #[test]
    fn keeps_opaque_values_whole() {
        let mut reader = Reader::from_values([Arc::new(7u8) as AnyValue, Arc::new("tail") as AnyValue]);
        let value = AnyArgument.parse(&mut reader, &context()).expect("value");
        assert_eq!(value.downcast_ref::<u8>(), Some(&7));
        assert_eq!(reader.cursor(), 1);
    }

    #[test]
    fn fails_at_end_of_input() {
        let mut reader = Reader::new("");
        assert!(AnyArgument.parse(&mut reader, &context()).is_err());
    }
}
