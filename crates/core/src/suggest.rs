//! Cursor-aware completion.
//!
//! The node owning the cursor is resolved from the parse result, then every
//! candidate below it is queried concurrently. A branch that fails or times
//! out contributes nothing; the rest are merged into one sorted list.

use futures::future::{join_all, BoxFuture, FutureExt};
use tracing::debug;

use crate::composed;
use crate::context::{ContextBuilder, MatchedNode};
use crate::dispatcher::Dispatcher;
use crate::error::CommandError;
use crate::handler::Source;
use crate::result::ParseResult;
use crate::suggestion::{Suggestions, SuggestionsBuilder};
use crate::tree::{CommandTree, NodeId, NodeKind};

impl<S: Source> CommandTree<S> {
    /// Completions node `id` itself offers for the typed text.
    pub async fn list_suggestions(
        &self,
        id: NodeId,
        context: &ContextBuilder<S>,
        mut builder: SuggestionsBuilder,
    ) -> Result<Suggestions, CommandError> {
        let node = self.node(id);
        match node.kind() {
            NodeKind::Root | NodeKind::Composed(_) => Ok(Suggestions::empty()),
            NodeKind::Literal(name) => {
                if name.to_lowercase().starts_with(builder.remaining_lowercase()) {
                    builder.suggest_with_tooltip(name.as_str(), node.description());
                }
                Ok(builder.build())
            }
            NodeKind::Argument { kind, .. } => kind.list_suggestions(context, builder).await,
        }
    }
}

impl<S: Source> Dispatcher<S> {
    /// Completions for `cursor`, an absolute position in the parsed input.
    ///
    /// Text identical to what is already typed is never suggested.
    pub async fn suggest(&self, result: &ParseResult<S>, cursor: usize) -> Suggestions {
        let context = result.context();
        let found = context.find_suggestion_context(cursor);
        let start = found.start.min(cursor);
        let typed = result.reader().fetch_content(start, cursor);
        let builder = SuggestionsBuilder::new(typed.clone(), start);
        let tree = self.tree();

        let branches: Vec<BoxFuture<'_, Result<Suggestions, CommandError>>> = match &found.parent {
            MatchedNode::Node(parent) => tree
                .node(*parent)
                .children()
                .iter()
                .copied()
                .filter(|&child| tree.node(child).can_use(context.source()))
                .map(|child| tree.list_suggestions(child, context, builder.clean()).boxed())
                .collect(),
            placeholder => vec![composed::interpret(placeholder, context, builder).boxed()],
        };

        let timeout = self.config().suggestion_timeout();
        let guarded = branches.into_iter().map(|branch| async move {
            let outcome = match timeout {
                Some(limit) => match tokio::time::timeout(limit, branch).await {
                    Ok(outcome) => outcome,
                    Err(_) => {
                        debug!(?limit, "suggestion branch timed out");
                        return Suggestions::empty();
                    }
                },
                None => branch.await,
            };
            outcome.unwrap_or_else(|err| {
                debug!(error = %err, "suggestion branch failed");
                Suggestions::empty()
            })
        });

        let mut merged = Suggestions::merge(join_all(guarded).await);
        merged.retain(|suggestion| suggestion.text() != typed);
        if let Some(max) = self.config().max_suggestions {
            merged.truncate(max);
        }
        merged
    }
}
