//! The dispatcher: a frozen tree plus parse, execute and suggest.
//!
//! Parsing is a backtracking descent. Every child that may match the next
//! token is tried on its own copy of the context and reader; the partial
//! results ("potentials") are ranked and the best one is returned. Execution
//! and suggestion live in [`crate::execute`] and [`crate::suggest`].

use std::fmt;
use std::sync::Arc;

use cmdtree_reader::Reader;
use tracing::{debug, trace};

use crate::config::DispatcherConfig;
use crate::context::ContextBuilder;
use crate::error::CommandError;
use crate::handler::Source;
use crate::result::ParseResult;
use crate::tree::{CommandNode, CommandTree, NodeId, NodeKind};

pub struct Dispatcher<S: Source> {
    tree: Arc<CommandTree<S>>,
    config: DispatcherConfig,
}

impl<S: Source> Clone for Dispatcher<S> {
    fn clone(&self) -> Self {
        Dispatcher {
            tree: Arc::clone(&self.tree),
            config: self.config.clone(),
        }
    }
}

impl<S: Source> fmt::Debug for Dispatcher<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("tree", &self.tree)
            .field("config", &self.config)
            .finish()
    }
}

impl<S: Source> Dispatcher<S> {
    pub fn new(tree: CommandTree<S>) -> Self {
        Dispatcher::with_config(tree, DispatcherConfig::default())
    }

    pub fn with_config(tree: CommandTree<S>, config: DispatcherConfig) -> Self {
        Dispatcher {
            tree: Arc::new(tree),
            config,
        }
    }

    pub fn tree(&self) -> &CommandTree<S> {
        &self.tree
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Parse `input` from the root on behalf of `source`.
    ///
    /// Never fails: errors are recorded in the result and surface when it is
    /// executed or [checked](ParseResult::check).
    pub fn parse(&self, input: impl Into<Reader>, source: S) -> ParseResult<S> {
        let reader = input.into();
        let context = ContextBuilder::new(Arc::clone(&self.tree), source, NodeId::ROOT, reader.cursor());
        self.parse_nodes(NodeId::ROOT, &reader, &context)
    }

    /// Parse then execute, returning how many commands ran.
    pub fn execute_input(&self, input: impl Into<Reader>, source: S) -> Result<usize, CommandError> {
        let result = self.parse(input, source);
        self.execute(&result)
    }

    fn parse_nodes(&self, node: NodeId, original: &Reader, so_far: &ContextBuilder<S>) -> ParseResult<S> {
        let source = so_far.source();
        let mut errors: Vec<(NodeId, CommandError)> = Vec::new();
        let mut potentials: Vec<ParseResult<S>> = Vec::new();

        for child in self.tree.relevant_nodes(node, original) {
            let child_node = self.tree.node(child);
            if !child_node.can_use(source) {
                continue;
            }
            let mut context = so_far.clone();
            let mut reader = original.clone();

            // A composed argument owns the rest of the branch.
            if matches!(child_node.kind(), NodeKind::Composed(_)) {
                let outcome = child_node
                    .parse(child, &mut context, &mut reader)
                    .and_then(|()| child_node.resolve_handler(&mut context))
                    .map_err(|err| err.into_syntax(&reader));
                return match outcome {
                    Ok(()) => ParseResult::new(context, reader, Vec::new()),
                    Err(err) => {
                        debug!(node = %child, error = %err, "composed argument rejected input");
                        errors.push((child, err));
                        ParseResult::new(context, reader, errors)
                    }
                };
            }

            if let Err(err) = parse_child(child_node, child, &mut context, &mut reader) {
                debug!(node = %child, name = child_node.name(), error = %err, "branch rejected");
                errors.push((child, err));
                continue;
            }

            if !reader.can_read() {
                potentials.push(ParseResult::new(context, reader, Vec::new()));
                continue;
            }
            reader.read_char();

            if let Some(target) = child_node.redirect() {
                let child_context = context.new_child(target, reader.cursor());
                let (sub_context, sub_reader, sub_errors) =
                    self.parse_nodes(target, &reader, &child_context).into_parts();
                context.with_child(sub_context);
                return ParseResult::new(context, sub_reader, sub_errors);
            }
            potentials.push(self.parse_nodes(child, &reader, &context));
        }

        trace!(node = %node, potentials = potentials.len(), errors = errors.len(), "ranking potentials");
        potentials
            .into_iter()
            .min_by_key(|potential| (potential.reader().can_read(), !potential.errors().is_empty()))
            .unwrap_or_else(|| ParseResult::new(so_far.clone(), original.clone(), errors))
    }
}

/// Match one child and settle its handler. Every failure comes back as a
/// syntax error at the reader's position.
fn parse_child<S: Source>(
    node: &CommandNode<S>,
    id: NodeId,
    context: &mut ContextBuilder<S>,
    reader: &mut Reader,
) -> Result<(), CommandError> {
    node.parse(id, context, reader)
        .map_err(|err| err.into_syntax(reader))?;
    if reader.can_read() && !reader.peek_char().is_some_and(char::is_whitespace) {
        return Err(CommandError::syntax("Expected whitespace to end one argument", reader));
    }
    node.resolve_handler(context)
        .map_err(|err| err.into_syntax(reader))
}
