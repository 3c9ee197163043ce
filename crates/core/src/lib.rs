//! cmdtree-core: command-tree dispatcher.
//!
//! Register literal keywords and typed arguments into a [`CommandTree`],
//! freeze it into a [`Dispatcher`], then parse input lines against it,
//! execute the matched handlers and compute completions for a cursor.
//!
//! # Public API
//!
//! - [`literal()`], [`argument()`], [`composed()`] -- node builders
//! - [`CommandTree`] -- the registered nodes; [`CommandTree::merge`] combines two trees
//! - [`Dispatcher::parse`], [`Dispatcher::execute`], [`Dispatcher::suggest`]
//! - [`ContextBuilder`] -- what a handler sees: source, arguments, metadata
//! - [`CommandError`] -- syntax, not-found and handler failures
//! - [`render_usage()`], [`help_node()`] -- usage text and a built-in help command

pub mod arguments;
mod chain;
pub mod composed;
pub mod config;
pub mod context;
pub mod dispatcher;
pub mod error;
mod execute;
pub mod handler;
pub mod help;
pub mod range;
pub mod result;
mod suggest;
pub mod suggestion;
pub mod tree;
pub mod usage;

// ── Convenience re-exports: key types ────────────────────────────────

pub use arguments::{AnyArgument, ArgumentType, EnumArgument, GreedyArgument, StringArgument};
pub use composed::PendingArguments;
pub use config::DispatcherConfig;
pub use context::{ContextBuilder, MatchedNode, ParsedNode, Sourceless};
pub use dispatcher::Dispatcher;
pub use error::{BoxError, CommandError, ConfigError, RegistrationError};
pub use handler::{Command, Source};
pub use range::StringRange;
pub use result::{MatchedRange, ParseResult};
pub use suggestion::{Suggestion, Suggestions, SuggestionsBuilder};
pub use tree::{CommandNode, CommandTree, InheritHandler, NodeBuilder, NodeId, NodeKind};

// ── Convenience re-exports: construction ─────────────────────────────

pub use help::help_node;
pub use tree::{argument, composed, literal};
pub use usage::{render_context, render_usage};

pub use cmdtree_reader::{AnyValue, Reader};

#[cfg(test)]
pub(crate) mod tests_support {
    use std::sync::Arc;

    use crate::context::ContextBuilder;
    use crate::tree::{CommandTree, NodeId};

    /// An empty context over an empty tree.
    pub fn context() -> ContextBuilder<()> {
        ContextBuilder::new(Arc::new(CommandTree::new()), (), NodeId::ROOT, 0)
    }
}
