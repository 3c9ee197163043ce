//! Argument value types.
//!
//! [`ArgumentType`] is the extension point; the types here cover plain
//! words, quoted strings, fixed choices, raw tokens and the rest of the line.

mod any;
mod choice;
mod greedy;
mod string;

use async_trait::async_trait;
use cmdtree_reader::{AnyValue, Reader};

use crate::context::ContextBuilder;
use crate::error::{BoxError, CommandError};
use crate::handler::Source;
use crate::suggestion::{Suggestions, SuggestionsBuilder};

pub use any::AnyArgument;
pub use choice::EnumArgument;
pub use greedy::GreedyArgument;
pub use string::StringArgument;

/// Converts the token(s) at the reader's cursor into a value.
#[async_trait]
pub trait ArgumentType<S: Source>: Send + Sync {
    /// Consume one value. On failure the node restores the cursor; return a
    /// [`CommandError`] to control the message, any other error becomes an
    /// "incorrect argument" syntax error.
    fn parse(&self, reader: &mut Reader, context: &ContextBuilder<S>) -> Result<AnyValue, BoxError>;

    /// Completions for the partially typed value in `builder`.
    async fn list_suggestions(
        &self,
        _context: &ContextBuilder<S>,
        _builder: SuggestionsBuilder,
    ) -> Result<Suggestions, CommandError> {
        Ok(Suggestions::empty())
    }
}
