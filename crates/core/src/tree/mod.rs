//! The command tree.
//!
//! Nodes live in an arena owned by [`CommandTree`] and refer to each other
//! through [`NodeId`]s, which lets a child redirect back to the root (or to
//! any other registered node) without reference cycles. The tree is mutable
//! only while registering; a [`Dispatcher`](crate::Dispatcher) freezes it.

mod builder;

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use cmdtree_reader::Reader;

use crate::arguments::ArgumentType;
use crate::composed::ComposedArgument;
use crate::context::{ContextBuilder, MatchedNode};
use crate::error::{CommandError, RegistrationError};
use crate::handler::{Preprocess, RedirectModifier, Requirement, Source};
use crate::range::StringRange;

pub use builder::{argument, composed, literal, NodeBuilder};

// ──────────────────────────────────────────────
// Identity and flags
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0
    }

    #[cfg(test)]
    pub(crate) fn from_index(index: usize) -> Self {
        NodeId(index)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What happens to an already resolved handler when parsing passes through
/// a node that has none of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InheritHandler {
    /// Keep the parent's handler for this node and below.
    Inherit,
    /// Drop the parent's handler; later nodes must bring their own.
    Clear,
    /// Leave the current setting alone.
    #[default]
    Unset,
}

impl InheritHandler {
    pub fn as_flag(self) -> Option<bool> {
        match self {
            InheritHandler::Inherit => Some(true),
            InheritHandler::Clear => Some(false),
            InheritHandler::Unset => None,
        }
    }
}

impl From<bool> for InheritHandler {
    fn from(inherit: bool) -> Self {
        if inherit {
            InheritHandler::Inherit
        } else {
            InheritHandler::Clear
        }
    }
}

// ──────────────────────────────────────────────
// Nodes
// ──────────────────────────────────────────────

pub enum NodeKind<S: Source> {
    Root,
    Literal(String),
    Argument {
        name: String,
        kind: Arc<dyn ArgumentType<S>>,
    },
    Composed(ComposedArgument),
}

impl<S: Source> Clone for NodeKind<S> {
    fn clone(&self) -> Self {
        match self {
            NodeKind::Root => NodeKind::Root,
            NodeKind::Literal(name) => NodeKind::Literal(name.clone()),
            NodeKind::Argument { name, kind } => NodeKind::Argument {
                name: name.clone(),
                kind: Arc::clone(kind),
            },
            NodeKind::Composed(composed) => NodeKind::Composed(composed.clone()),
        }
    }
}

pub struct CommandNode<S: Source> {
    kind: NodeKind<S>,
    requirement: Option<Requirement<S>>,
    preprocess: Option<Preprocess<S>>,
    redirect: Option<NodeId>,
    modifier: Option<RedirectModifier<S>>,
    fork: bool,
    inherit: InheritHandler,
    execute_child: bool,
    description: Option<String>,
    children: Vec<NodeId>,
    by_name: HashMap<String, NodeId>,
    literals: HashMap<String, NodeId>,
}

impl<S: Source> Clone for CommandNode<S> {
    fn clone(&self) -> Self {
        CommandNode {
            kind: self.kind.clone(),
            requirement: self.requirement.clone(),
            preprocess: self.preprocess.clone(),
            redirect: self.redirect,
            modifier: self.modifier.clone(),
            fork: self.fork,
            inherit: self.inherit,
            execute_child: self.execute_child,
            description: self.description.clone(),
            children: self.children.clone(),
            by_name: self.by_name.clone(),
            literals: self.literals.clone(),
        }
    }
}

impl<S: Source> fmt::Debug for CommandNode<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandNode")
            .field("name", &self.name())
            .field("redirect", &self.redirect)
            .field("children", &self.children)
            .finish_non_exhaustive()
    }
}

impl<S: Source> CommandNode<S> {
    fn with_kind(kind: NodeKind<S>) -> Self {
        CommandNode {
            kind,
            requirement: None,
            preprocess: None,
            redirect: None,
            modifier: None,
            fork: false,
            inherit: InheritHandler::Unset,
            execute_child: true,
            description: None,
            children: Vec::new(),
            by_name: HashMap::new(),
            literals: HashMap::new(),
        }
    }

    pub fn kind(&self) -> &NodeKind<S> {
        &self.kind
    }

    /// Literal keyword or argument name; empty for the root and composed nodes.
    pub fn name(&self) -> &str {
        match &self.kind {
            NodeKind::Literal(name) | NodeKind::Argument { name, .. } => name,
            NodeKind::Root | NodeKind::Composed(_) => "",
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self.kind, NodeKind::Literal(_))
    }

    pub fn is_argument(&self) -> bool {
        matches!(self.kind, NodeKind::Argument { .. })
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn redirect(&self) -> Option<NodeId> {
        self.redirect
    }

    pub fn modifier(&self) -> Option<&RedirectModifier<S>> {
        self.modifier.as_ref()
    }

    pub fn is_fork(&self) -> bool {
        self.fork
    }

    pub fn inherit_handler(&self) -> InheritHandler {
        self.inherit
    }

    pub fn executes_child(&self) -> bool {
        self.execute_child
    }

    pub fn has_handler(&self) -> bool {
        self.preprocess.is_some()
    }

    pub fn preprocess(&self) -> Option<&Preprocess<S>> {
        self.preprocess.as_ref()
    }

    /// Children in registration order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn child(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    pub fn can_use(&self, source: &S) -> bool {
        self.requirement.as_ref().map_or(true, |test| test(source))
    }
}

impl<S: Source> CommandNode<S> {
    /// Consume this node's own tokens and record the match.
    pub(crate) fn parse(
        &self,
        id: NodeId,
        context: &mut ContextBuilder<S>,
        reader: &mut Reader,
    ) -> Result<(), CommandError> {
        match &self.kind {
            NodeKind::Root => Ok(()),
            NodeKind::Literal(name) => {
                let start = reader.cursor();
                match reader.read_any() {
                    Some(token) if token.as_str() == name.as_str() => {
                        context.with_node(MatchedNode::Node(id), StringRange::between(start, reader.cursor()));
                        Ok(())
                    }
                    found => {
                        reader.set_cursor(start);
                        let found = found.as_ref().map_or("", |token| token.as_str());
                        Err(CommandError::syntax(
                            format!("Expected '{name}' but found '{found}' at position {start}"),
                            reader,
                        ))
                    }
                }
            }
            NodeKind::Argument { name, kind } => {
                let start = reader.cursor();
                match kind.parse(reader, context) {
                    Ok(value) => {
                        let range = StringRange::between(start, reader.cursor());
                        context.with_argument(name, value, range);
                        context.with_node(MatchedNode::Node(id), range);
                        Ok(())
                    }
                    Err(err) => {
                        reader.set_cursor(start);
                        Err(match err.downcast::<CommandError>() {
                            Ok(err) => *err,
                            Err(other) => CommandError::incorrect_argument(reader, Some(other)),
                        })
                    }
                }
            }
            NodeKind::Composed(composed) => composed.parse(id, context, reader),
        }
    }

    /// Settle which handler the branch carries after matching this node.
    pub(crate) fn resolve_handler(&self, context: &mut ContextBuilder<S>) -> Result<(), CommandError> {
        if let Some(inherit) = self.inherit.as_flag() {
            context.set_inherit_handler(inherit);
        }
        if !self.execute_child {
            context.set_execute_child(false);
        }
        match &self.preprocess {
            Some(factory) => {
                let command = factory(context.drop_source())?;
                context.with_command(Some(command));
            }
            None if !context.inherits_handler() => context.with_command(None),
            None => {}
        }
        Ok(())
    }
}

// ──────────────────────────────────────────────
// Tree
// ──────────────────────────────────────────────

pub struct CommandTree<S: Source> {
    nodes: Vec<CommandNode<S>>,
}

impl<S: Source> Clone for CommandTree<S> {
    fn clone(&self) -> Self {
        CommandTree {
            nodes: self.nodes.clone(),
        }
    }
}

impl<S: Source> fmt::Debug for CommandTree<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandTree")
            .field("nodes", &self.nodes.len())
            .finish()
    }
}

impl<S: Source> Default for CommandTree<S> {
    fn default() -> Self {
        CommandTree::new()
    }
}

impl<S: Source> CommandTree<S> {
    pub fn new() -> Self {
        CommandTree {
            nodes: vec![CommandNode::with_kind(NodeKind::Root)],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Look up a node. Ids handed out by this tree are always valid.
    pub fn node(&self, id: NodeId) -> &CommandNode<S> {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&CommandNode<S>> {
        self.nodes.get(id.0)
    }

    /// Nodes in the arena, the root and composed members included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether anything is registered under the root.
    pub fn has_commands(&self) -> bool {
        !self.nodes[NodeId::ROOT.0].children.is_empty()
    }

    /// Follow a path of child names from the root.
    pub fn find(&self, path: &[&str]) -> Option<NodeId> {
        path.iter()
            .try_fold(NodeId::ROOT, |id, name| self.node(id).child(name))
    }

    /// Build `builder` and its children under `parent`.
    ///
    /// A child whose name is already taken replaces the previous holder in
    /// place. Redirect targets must already be registered.
    pub fn register(&mut self, parent: NodeId, builder: NodeBuilder<S>) -> Result<NodeId, RegistrationError> {
        let parent_node = self.get(parent).ok_or(RegistrationError::UnknownNode(parent))?;
        if matches!(parent_node.kind, NodeKind::Composed(_)) {
            return Err(RegistrationError::ComposedParent(parent));
        }
        let (node, children) = builder.finish(self)?;
        let id = self.insert(node);
        self.attach(parent, id);
        for child in children {
            self.register(id, child)?;
        }
        Ok(id)
    }

    /// Copy both trees into a new one. The second tree's top-level commands
    /// replace same-name commands of the first.
    pub fn merge(first: &CommandTree<S>, second: &CommandTree<S>) -> CommandTree<S> {
        let mut merged = first.clone();
        let offset = merged.nodes.len() - 1;
        let remap = |id: NodeId| {
            if id == NodeId::ROOT {
                NodeId::ROOT
            } else {
                NodeId(id.0 + offset)
            }
        };
        for node in &second.nodes[1..] {
            let mut node = node.clone();
            node.remap(&remap);
            merged.nodes.push(node);
        }
        for &child in &second.node(NodeId::ROOT).children {
            merged.attach(NodeId::ROOT, remap(child));
        }
        merged
    }

    /// Children worth trying for the next token.
    ///
    /// An exact literal match short-circuits; otherwise argument children
    /// are tried, or every child when there are none.
    pub fn relevant_nodes(&self, id: NodeId, reader: &Reader) -> Vec<NodeId> {
        let node = self.node(id);
        if !node.literals.is_empty() {
            if let Some(literal) = reader
                .peek_any()
                .and_then(|token| node.literals.get(token.as_str()).copied())
            {
                return vec![literal];
            }
        }
        let arguments: Vec<NodeId> = node
            .children
            .iter()
            .copied()
            .filter(|&child| self.node(child).is_argument())
            .collect();
        if arguments.is_empty() {
            node.children.clone()
        } else {
            arguments
        }
    }

    /// Children with literals first, then by case-insensitive name.
    pub fn sorted_children(&self, id: NodeId) -> Vec<NodeId> {
        let mut children = self.node(id).children.clone();
        children.sort_by(|&a, &b| self.usage_order(a, b));
        children
    }

    fn usage_order(&self, a: NodeId, b: NodeId) -> Ordering {
        let (a, b) = (self.node(a), self.node(b));
        b.is_literal()
            .cmp(&a.is_literal())
            .then_with(|| a.name().to_lowercase().cmp(&b.name().to_lowercase()))
    }

    pub(crate) fn insert(&mut self, node: CommandNode<S>) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub(crate) fn check(&self, id: NodeId) -> Result<(), RegistrationError> {
        match self.get(id) {
            Some(_) => Ok(()),
            None => Err(RegistrationError::UnknownNode(id)),
        }
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        let name = self.node(child).name().to_owned();
        let is_literal = self.node(child).is_literal();
        let parent = &mut self.nodes[parent.0];
        match parent.by_name.insert(name.clone(), child) {
            Some(previous) => {
                if let Some(slot) = parent.children.iter_mut().find(|id| **id == previous) {
                    *slot = child;
                }
                parent.literals.retain(|_, id| *id != previous);
            }
            None => parent.children.push(child),
        }
        if is_literal {
            parent.literals.insert(name, child);
        }
    }
}

impl<S: Source> CommandNode<S> {
    fn remap(&mut self, remap: &impl Fn(NodeId) -> NodeId) {
        self.redirect = self.redirect.map(remap);
        for child in &mut self.children {
            *child = remap(*child);
        }
        for child in self.by_name.values_mut().chain(self.literals.values_mut()) {
            *child = remap(*child);
        }
        if let NodeKind::Composed(composed) = &mut self.kind {
            composed.remap(remap);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arguments::AnyArgument;

    fn tree() -> CommandTree<()> {
        let mut tree = CommandTree::new();
        tree.register(
            NodeId::ROOT,
            literal("alpha")
                .then(literal("one"))
                .then(argument("value", AnyArgument)),
        )
        .expect("alpha");
        tree.register(NodeId::ROOT, literal("beta")).expect("beta");
        tree
    }

    #[test]
    fn literal_match_short_circuits() {
        let tree = tree();
        let alpha = tree.find(&["alpha"]).expect("alpha node");
        let one = tree.find(&["alpha", "one"]).expect("one node");
        assert_eq!(tree.relevant_nodes(alpha, &Reader::new("one")), vec![one]);
        let value = tree.find(&["alpha", "value"]).expect("value node");
        assert_eq!(tree.relevant_nodes(alpha, &Reader::new("two")), vec![value]);
    }

    #[test]
    fn fresh_tree_has_only_the_root() {
        let mut tree: CommandTree<()> = CommandTree::new();
        assert_eq!(tree.node_count(), 1);
        assert!(!tree.has_commands());
        tree.register(NodeId::ROOT, literal("alpha")).expect("alpha");
        assert_eq!(tree.node_count(), 2);
        assert!(tree.has_commands());
    }

    #[test]
    fn root_without_arguments_offers_all_children() {
        let tree = tree();
        assert_eq!(tree.relevant_nodes(NodeId::ROOT, &Reader::new("gamma")).len(), 2);
    }

    #[test]
    fn re_registering_a_name_replaces_in_place() {
        let mut tree = tree();
        let replacement = tree
            .register(NodeId::ROOT, literal("alpha").description("new"))
            .expect("replacement");
        let root = tree.node(NodeId::ROOT);
        assert_eq!(root.children().len(), 2);
        assert_eq!(root.children()[0], replacement);
        assert_eq!(tree.node(replacement).description(), Some("new"));
    }

    #[test]
    fn redirect_to_unknown_node_is_rejected() {
        let mut tree: CommandTree<()> = CommandTree::new();
        let err = tree
            .register(NodeId::ROOT, literal("x").redirect(NodeId(42)))
            .expect_err("dangling redirect");
        assert_eq!(err, RegistrationError::UnknownNode(NodeId(42)));
    }

    #[test]
    fn merge_overrides_and_remaps() {
        let first = tree();
        let mut second: CommandTree<()> = CommandTree::new();
        second
            .register(NodeId::ROOT, literal("beta").then(literal("deep")))
            .expect("beta");
        second
            .register(NodeId::ROOT, literal("loop").redirect(NodeId::ROOT))
            .expect("loop");

        let merged = CommandTree::merge(&first, &second);
        let names: Vec<&str> = merged
            .node(NodeId::ROOT)
            .children()
            .iter()
            .map(|&id| merged.node(id).name())
            .collect();
        assert_eq!(names, vec!["alpha", "beta", "loop"]);
        assert!(merged.find(&["beta", "deep"]).is_some());
        let looped = merged.find(&["loop"]).expect("loop node");
        assert_eq!(merged.node(looped).redirect(), Some(NodeId::ROOT));
    }

    #[test]
    fn usage_order_puts_literals_first() {
        let mut tree: CommandTree<()> = CommandTree::new();
        tree.register(NodeId::ROOT, argument("Arg", AnyArgument)).expect("arg");
        tree.register(NodeId::ROOT, literal("zed")).expect("zed");
        tree.register(NodeId::ROOT, literal("Alpha")).expect("alpha");
        let names: Vec<&str> = tree
            .sorted_children(NodeId::ROOT)
            .into_iter()
            .map(|id| tree.node(id).name())
            .collect();
        assert_eq!(names, vec!["Alpha", "zed", "Arg"]);
    }
}
