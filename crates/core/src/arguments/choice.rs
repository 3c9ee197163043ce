use std::sync::Arc;

use async_trait::async_trait;
use cmdtree_reader::{AnyValue, Reader};

use super::ArgumentType;
use crate::context::ContextBuilder;
use crate::error::{BoxError, CommandError};
use crate::handler::Source;
use crate::suggestion::{Suggestions, SuggestionsBuilder};

/// One of a fixed set of names, each mapped to a value of type `T`.
///
/// Matching is exact; suggestions are offered case-insensitively.
#[derive(Debug, Clone)]
pub struct EnumArgument<T> {
    choices: Vec<(String, T)>,
}

impl<T: Clone + Send + Sync + 'static> EnumArgument<T> {
    pub fn new<N: Into<String>>(choices: impl IntoIterator<Item = (N, T)>) -> Self {
        EnumArgument {
            choices: choices
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.choices.iter().map(|(name, _)| name.as_str())
    }

    fn lookup(&self, name: &str) -> Option<&T> {
        self.choices
            .iter()
            .find(|(candidate, _)| candidate == name)
            .map(|(_, value)| value)
    }
}

impl EnumArgument<String> {
    /// Choices whose value is their own name.
    pub fn of<N: Into<String>>(names: impl IntoIterator<Item = N>) -> Self {
        EnumArgument::new(names.into_iter().map(|name| {
            let name = name.into();
            (name.clone(), name)
        }))
    }
}

#[async_trait]
impl<S: Source, T: Clone + Send + Sync + 'static> ArgumentType<S> for EnumArgument<T> {
    fn parse(&self, reader: &mut Reader, _context: &ContextBuilder<S>) -> Result<AnyValue, BoxError> {
        let start = reader.cursor();
        let value = reader
            .read_any()
            .and_then(|token| self.lookup(token.as_str()).cloned());
        match value {
            Some(value) => Ok(Arc::new(value)),
            None => {
                reader.set_cursor(start);
                Err(CommandError::incorrect_argument(reader, None).into())
            }
        }
    }

    async fn list_suggestions(
        &self,
        _context: &ContextBuilder<S>,
        mut builder: SuggestionsBuilder,
    ) -> Result<Suggestions, CommandError> {
        let typed = builder.remaining_lowercase().to_owned();
        for name in self.names() {
            if name.to_lowercase().starts_with(&typed) {
                builder.suggest(name);
            }
        }
        Ok(builder.build())
    }
}
