use std::sync::Arc;

use async_trait::async_trait;
use cmdtree_reader::{AnyValue, Reader};

use super::ArgumentType;
use crate::context::ContextBuilder;
use crate::error::{BoxError, CommandError};
use crate::handler::Source;

/// Everything up to the end of the input, as one `String`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyArgument;

#[async_trait]
impl<S: Source> ArgumentType<S> for GreedyArgument {
    fn parse(&self, reader: &mut Reader, _context: &ContextBuilder<S>) -> Result<AnyValue, BoxError> {
        let rest = reader.remaining();
        if rest.is_empty() {
            return Err(CommandError::syntax("Expected an argument", reader).into());
        }
        reader.set_cursor(reader.len());
        Ok(Arc::new(rest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests_support::context;

    #[test]
    fn takes_the_rest_of_the_line() {
        let mut reader = Reader::new("say hello  there");
        reader.set_cursor(4);
        let value = GreedyArgument.parse(&mut reader, &context()).expect("rest");
        assert_eq!(value.downcast_ref::<String>().map(String::as_str), Some("hello  there"));
        assert!(!reader.can_read());
    }

    #[test]
    fn empty_rest_is_an_error() {
        let mut reader = Reader::new("say");
        reader.set_cursor(3);
        assert!(GreedyArgument.parse(&mut reader, &context()).is_err());
    }
}
