//! Parse state accumulated along one branch of the tree.
//!
//! A [`ContextBuilder`] is cloned for every sibling the parser tries, so all
//! of its lists are persistent [`Chain`]s: a clone shares everything already
//! recorded and only new entries are allocated.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use cmdtree_reader::{AnyValue, Reader};

use crate::chain::Chain;
use crate::handler::{Command, RedirectModifier, Source};
use crate::range::StringRange;
use crate::tree::{CommandTree, NodeId};

// ──────────────────────────────────────────────
// Matched nodes
// ──────────────────────────────────────────────

/// What a recorded range matched.
///
/// Besides real tree nodes, a composed argument records zero-width or flag
/// placeholders that only exist to answer suggestion queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchedNode {
    Node(NodeId),
    /// Between values of a composed argument: offers `--flag` names for the
    /// still pending members, plus the next positional member if any.
    AfterValue {
        composed: NodeId,
        pending: Arc<[NodeId]>,
        next: Option<NodeId>,
    },
    /// A `--flag ` token; offers values of the flagged member.
    FlagValue {
        composed: NodeId,
        argument: Option<NodeId>,
    },
}

impl MatchedNode {
    /// The tree node, unless this is a placeholder.
    pub fn id(&self) -> Option<NodeId> {
        match self {
            MatchedNode::Node(id) => Some(*id),
            MatchedNode::AfterValue { .. } | MatchedNode::FlagValue { .. } => None,
        }
    }

    /// The composed node owning a placeholder.
    pub fn composed(&self) -> Option<NodeId> {
        match self {
            MatchedNode::Node(_) => None,
            MatchedNode::AfterValue { composed, .. } | MatchedNode::FlagValue { composed, .. } => {
                Some(*composed)
            }
        }
    }

    /// Placeholders answer suggestions themselves instead of deferring to
    /// their parent's children.
    pub fn is_interpreter(&self) -> bool {
        !matches!(self, MatchedNode::Node(_))
    }

    fn interpret(&self, range: StringRange) -> SuggestionContext {
        let start = match self {
            MatchedNode::FlagValue { .. } => range.end,
            MatchedNode::Node(_) | MatchedNode::AfterValue { .. } => range.start,
        };
        SuggestionContext {
            parent: self.clone(),
            start,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedNode {
    pub node: MatchedNode,
    pub range: StringRange,
}

#[derive(Clone)]
pub struct ParsedArgument {
    pub name: String,
    pub value: AnyValue,
    pub range: StringRange,
}

impl fmt::Debug for ParsedArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParsedArgument")
            .field("name", &self.name)
            .field("range", &self.range)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
struct Metadata {
    name: Option<String>,
    value: AnyValue,
}

/// Where suggestions for a cursor come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionContext {
    /// Node whose children are queried, or a placeholder answering itself.
    pub parent: MatchedNode,
    /// Start of the text being completed.
    pub start: usize,
}

// ──────────────────────────────────────────────
// ContextBuilder
// ──────────────────────────────────────────────

#[derive(Clone)]
pub struct ContextBuilder<S: Source> {
    tree: Arc<CommandTree<S>>,
    source: S,
    root: NodeId,
    range: StringRange,
    nodes: Chain<ParsedNode>,
    arguments: Chain<ParsedArgument>,
    metadata: Chain<Metadata>,
    child: Option<Arc<ContextBuilder<S>>>,
    command: Option<Command<S>>,
    inherit_handler: bool,
    execute_child: bool,
    input: Option<Reader>,
}

impl<S: Source> fmt::Debug for ContextBuilder<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextBuilder")
            .field("root", &self.root)
            .field("range", &self.range)
            .field("nodes", &self.nodes.to_vec())
            .field("arguments", &self.arguments.to_vec())
            .field("has_command", &self.command.is_some())
            .field("child", &self.child)
            .finish_non_exhaustive()
    }
}

impl<S: Source> ContextBuilder<S> {
    pub(crate) fn new(tree: Arc<CommandTree<S>>, source: S, root: NodeId, start: usize) -> Self {
        ContextBuilder {
            tree,
            source,
            root,
            range: StringRange::at(start),
            nodes: Chain::new(),
            arguments: Chain::new(),
            metadata: Chain::new(),
            child: None,
            command: None,
            inherit_handler: false,
            execute_child: true,
            input: None,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn tree(&self) -> &CommandTree<S> {
        &self.tree
    }

    pub(crate) fn tree_handle(&self) -> Arc<CommandTree<S>> {
        Arc::clone(&self.tree)
    }

    /// Node this context started parsing from: the tree root, or a redirect
    /// target for child contexts.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Span covering every recorded node.
    pub fn range(&self) -> StringRange {
        self.range
    }

    /// Matched nodes, oldest first.
    pub fn nodes(&self) -> Vec<&ParsedNode> {
        self.nodes.to_vec()
    }

    pub fn last_parsed(&self) -> Option<&ParsedNode> {
        self.nodes.last()
    }

    pub fn has_nodes(&self) -> bool {
        !self.nodes.is_empty()
    }

    /// Context of the redirected remainder, if parsing followed a redirect.
    pub fn child(&self) -> Option<&ContextBuilder<S>> {
        self.child.as_deref()
    }

    pub fn command(&self) -> Option<&Command<S>> {
        self.command.as_ref()
    }

    pub fn executes_child(&self) -> bool {
        self.execute_child
    }

    pub fn inherits_handler(&self) -> bool {
        self.inherit_handler
    }

    /// The full input being executed. Only set on contexts handed to
    /// commands.
    pub fn input(&self) -> Option<&Reader> {
        self.input.as_ref()
    }

    /// Value bound to `name`, if it has type `T`.
    pub fn argument<T: Any>(&self, name: &str) -> Option<&T> {
        self.arguments
            .iter()
            .filter(|argument| argument.name == name)
            .find_map(|argument| argument.value.downcast_ref::<T>())
    }

    pub fn argument_value(&self, name: &str) -> Option<&AnyValue> {
        self.arguments
            .iter()
            .find(|argument| argument.name == name)
            .map(|argument| &argument.value)
    }

    /// Most recent argument of type `T`, whatever its name.
    pub fn argument_of<T: Any>(&self) -> Option<&T> {
        self.arguments
            .iter()
            .find_map(|argument| argument.value.downcast_ref::<T>())
    }

    /// Parsed arguments, oldest first.
    pub fn arguments(&self) -> Vec<&ParsedArgument> {
        self.arguments.to_vec()
    }

    pub fn metadata<T: Any>(&self, name: &str) -> Option<&T> {
        self.metadata
            .iter()
            .filter(|entry| entry.name.as_deref() == Some(name))
            .find_map(|entry| entry.value.downcast_ref::<T>())
    }

    /// Most recent metadata of type `T`, named or not.
    pub fn metadata_of<T: Any>(&self) -> Option<&T> {
        self.metadata
            .iter()
            .find_map(|entry| entry.value.downcast_ref::<T>())
    }

    /// Modifier of the node that redirected into [`child`](Self::child).
    pub fn redirect_modifier(&self) -> Option<&RedirectModifier<S>> {
        self.last_node_id()
            .and_then(|id| self.tree.get(id))
            .and_then(|node| node.modifier())
    }

    pub fn is_forked(&self) -> bool {
        self.last_node_id()
            .and_then(|id| self.tree.get(id))
            .is_some_and(|node| node.is_fork())
    }

    fn last_node_id(&self) -> Option<NodeId> {
        self.nodes.iter().find_map(|parsed| parsed.node.id())
    }

    /// View without the source, for preprocess handlers.
    pub fn drop_source(&self) -> Sourceless<'_, S> {
        Sourceless { context: self }
    }

    // ── Mutation ──

    pub fn with_node(&mut self, node: MatchedNode, range: StringRange) {
        self.range = StringRange::encompassing(self.range, range);
        self.nodes.push(ParsedNode { node, range });
    }

    pub fn with_argument(&mut self, name: &str, value: AnyValue, range: StringRange) {
        self.arguments.push(ParsedArgument {
            name: name.to_owned(),
            value,
            range,
        });
    }

    pub fn with_metadata(&mut self, name: Option<&str>, value: impl Any + Send + Sync) {
        self.metadata.push(Metadata {
            name: name.map(str::to_owned),
            value: Arc::new(value),
        });
    }

    pub fn with_command(&mut self, command: Option<Command<S>>) {
        self.command = command;
    }

    pub(crate) fn with_child(&mut self, child: ContextBuilder<S>) {
        self.child = Some(Arc::new(child));
    }

    pub fn set_execute_child(&mut self, execute: bool) {
        self.execute_child = execute;
    }

    pub fn set_inherit_handler(&mut self, inherit: bool) {
        self.inherit_handler = inherit;
    }

    pub(crate) fn set_input(&mut self, input: Reader) {
        self.input = Some(input);
    }

    /// Same branch, executed on behalf of `source`.
    pub fn copy_for(&self, source: S) -> Self {
        ContextBuilder {
            source,
            ..self.clone()
        }
    }

    /// Fresh context for parsing a redirect target from `start`. Metadata
    /// carries over.
    pub(crate) fn new_child(&self, root: NodeId, start: usize) -> Self {
        let mut child = ContextBuilder::new(self.tree_handle(), self.source.clone(), root, start);
        child.metadata = self.metadata.clone();
        child
    }

    // ── Suggestions ──

    /// Resolve which node should produce completions at `cursor`.
    pub fn find_suggestion_context(&self, cursor: usize) -> SuggestionContext {
        let root = MatchedNode::Node(self.root);
        if cursor < self.range.start {
            return SuggestionContext {
                parent: root,
                start: self.range.start,
            };
        }
        if self.range.end < cursor {
            if let Some(child) = &self.child {
                return child.find_suggestion_context(cursor);
            }
            return match self.nodes.last() {
                None => SuggestionContext {
                    parent: root,
                    start: self.range.start,
                },
                Some(last) if last.node.is_interpreter() => last.node.interpret(last.range),
                Some(last) => SuggestionContext {
                    parent: last.node.clone(),
                    start: last.range.end + 1,
                },
            };
        }
        let mut previous = root;
        for parsed in self.nodes.to_vec() {
            if parsed.range.contains(cursor) {
                if parsed.node.is_interpreter() {
                    return parsed.node.interpret(parsed.range);
                }
                return SuggestionContext {
                    parent: previous,
                    start: parsed.range.start,
                };
            }
            previous = parsed.node.clone();
        }
        SuggestionContext {
            parent: previous,
            start: self.range.start,
        }
    }
}

// ──────────────────────────────────────────────
// Source-less view
// ──────────────────────────────────────────────

/// Read-only view of a context that hides the source, so handler selection
/// can only depend on what was parsed.
pub struct Sourceless<'a, S: Source> {
    context: &'a ContextBuilder<S>,
}

impl<S: Source> Clone for Sourceless<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: Source> Copy for Sourceless<'_, S> {}

impl<'a, S: Source> Sourceless<'a, S> {
    pub fn tree(&self) -> &'a CommandTree<S> {
        self.context.tree()
    }

    pub fn range(&self) -> StringRange {
        self.context.range()
    }

    pub fn nodes(&self) -> Vec<&'a ParsedNode> {
        self.context.nodes()
    }

    pub fn argument<T: Any>(&self, name: &str) -> Option<&'a T> {
        self.context.argument(name)
    }

    pub fn argument_value(&self, name: &str) -> Option<&'a AnyValue> {
        self.context.argument_value(name)
    }

    pub fn argument_of<T: Any>(&self) -> Option<&'a T> {
        self.context.argument_of()
    }

    pub fn metadata<T: Any>(&self, name: &str) -> Option<&'a T> {
        self.context.metadata(name)
    }

    pub fn metadata_of<T: Any>(&self) -> Option<&'a T> {
        self.context.metadata_of()
    }
}
