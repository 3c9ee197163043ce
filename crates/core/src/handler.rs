//! Callback shapes attached to nodes.

use std::sync::Arc;

use crate::context::{ContextBuilder, Sourceless};
use crate::error::CommandError;

/// Anything a command can be executed on behalf of.
pub trait Source: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> Source for T {}

/// Runs a fully parsed command.
pub type Command<S> = Arc<dyn Fn(&ContextBuilder<S>) -> Result<(), CommandError> + Send + Sync>;

/// Picks the command for a branch while parsing.
///
/// Only sees the source-less view, so the choice depends on parsed
/// arguments and metadata alone.
pub type Preprocess<S> =
    Arc<dyn Fn(Sourceless<'_, S>) -> Result<Command<S>, CommandError> + Send + Sync>;

/// Decides whether a source may use a node.
pub type Requirement<S> = Arc<dyn Fn(&S) -> bool + Send + Sync>;

/// Maps a redirecting context to the sources its redirect runs with.
pub type RedirectModifier<S> =
    Arc<dyn Fn(&ContextBuilder<S>) -> Result<Vec<S>, CommandError> + Send + Sync>;
