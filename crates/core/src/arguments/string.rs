use std::sync::Arc;

use async_trait::async_trait;
use cmdtree_reader::{AnyValue, Reader};

use super::ArgumentType;
use crate::context::ContextBuilder;
use crate::error::{BoxError, CommandError};
use crate::handler::Source;

/// A bare word, or a `"double"` / `'single'` quoted string.
///
/// Inside quotes only `\\` and the active quote may be escaped.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringArgument;

impl StringArgument {
    fn read_quoted(reader: &mut Reader, terminator: char) -> Result<String, CommandError> {
        let mut out = String::new();
        let mut escaped = false;
        loop {
            let Some(c) = reader.read_char() else {
                return Err(CommandError::syntax("Expected end of quote", reader));
            };
            if escaped {
                if c == terminator || c == '\\' {
                    out.push(c);
                    escaped = false;
                } else {
                    reader.set_cursor(reader.cursor() - 1);
                    return Err(CommandError::syntax(
                        format!("Invalid escape sequence '\\{c}' in quoted string"),
                        reader,
                    ));
                }
            } else if c == '\\' {
                escaped = true;
            } else if c == terminator {
                return Ok(out);
            } else {
                out.push(c);
            }
        }
    }
}

#[async_trait]
impl<S: Source> ArgumentType<S> for StringArgument {
    fn parse(&self, reader: &mut Reader, _context: &ContextBuilder<S>) -> Result<AnyValue, BoxError> {
        reader.skip_whitespace();
        let text = match reader.peek_char() {
            None => return Err(CommandError::incorrect_argument(reader, None).into()),
            Some(quote @ ('"' | '\'')) => {
                reader.read_char();
                StringArgument::read_quoted(reader, quote)?
            }
            Some(_) => match reader.read_any() {
                Some(token) => token.as_str().to_owned(),
                None => return Err(CommandError::syntax("Expected an argument", reader).into()),
            },
        };
        Ok(Arc::new(text))
    }
}
