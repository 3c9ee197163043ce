//! Fluent construction of nodes before they are frozen into a tree.

use std::sync::Arc;

use crate::arguments::ArgumentType;
use crate::composed::ComposedArgument;
use crate::context::{ContextBuilder, Sourceless};
use crate::error::{CommandError, RegistrationError};
use crate::handler::{Command, Preprocess, RedirectModifier, Requirement, Source};

use super::{CommandNode, CommandTree, InheritHandler, NodeId, NodeKind};

enum Shape<S: Source> {
    Literal(String),
    Argument {
        name: String,
        kind: Arc<dyn ArgumentType<S>>,
    },
    Composed(Vec<NodeBuilder<S>>),
}

/// Description of a node and its subtree, turned into real nodes by
/// [`CommandTree::register`].
pub struct NodeBuilder<S: Source> {
    shape: Shape<S>,
    requirement: Option<Requirement<S>>,
    preprocess: Option<Preprocess<S>>,
    redirect: Option<NodeId>,
    modifier: Option<RedirectModifier<S>>,
    fork: bool,
    inherit: InheritHandler,
    execute_child: bool,
    description: Option<String>,
    children: Vec<NodeBuilder<S>>,
}

/// A node matching one exact keyword.
pub fn literal<S: Source>(name: impl Into<String>) -> NodeBuilder<S> {
    NodeBuilder::new(Shape::Literal(name.into()))
}

/// A node whose token is consumed by an [`ArgumentType`].
pub fn argument<S: Source>(name: impl Into<String>, kind: impl ArgumentType<S> + 'static) -> NodeBuilder<S> {
    NodeBuilder::new(Shape::Argument {
        name: name.into(),
        kind: Arc::new(kind),
    })
}

/// A node taking `members` positionally or as `--name value` flags.
///
/// Members must be plain [`argument`] builders without children.
pub fn composed<S: Source>(members: impl IntoIterator<Item = NodeBuilder<S>>) -> NodeBuilder<S> {
    NodeBuilder::new(Shape::Composed(members.into_iter().collect()))
}

impl<S: Source> NodeBuilder<S> {
    fn new(shape: Shape<S>) -> Self {
        NodeBuilder {
            shape,
            requirement: None,
            preprocess: None,
            redirect: None,
            modifier: None,
            fork: false,
            inherit: InheritHandler::Unset,
            execute_child: true,
            description: None,
            children: Vec::new(),
        }
    }

    pub fn then(mut self, child: NodeBuilder<S>) -> Self {
        self.children.push(child);
        self
    }

    /// Run `command` when parsing ends on this node.
    pub fn executes<F>(self, command: F) -> Self
    where
        F: Fn(&ContextBuilder<S>) -> Result<(), CommandError> + Send + Sync + 'static,
    {
        let command: Command<S> = Arc::new(command);
        self.preprocess(move |_| Ok(Arc::clone(&command)))
    }

    /// Choose the command from the parsed arguments, without seeing the source.
    pub fn preprocess<F>(mut self, factory: F) -> Self
    where
        F: Fn(Sourceless<'_, S>) -> Result<Command<S>, CommandError> + Send + Sync + 'static,
    {
        self.preprocess = Some(Arc::new(factory));
        self
    }

    pub fn requires<F>(mut self, requirement: F) -> Self
    where
        F: Fn(&S) -> bool + Send + Sync + 'static,
    {
        self.requirement = Some(Arc::new(requirement));
        self
    }

    /// Continue parsing at `target` once this node has matched.
    pub fn redirect(mut self, target: NodeId) -> Self {
        self.redirect = Some(target);
        self
    }

    /// Sources the redirected remainder executes with.
    pub fn modifier<F>(mut self, modifier: F) -> Self
    where
        F: Fn(&ContextBuilder<S>) -> Result<Vec<S>, CommandError> + Send + Sync + 'static,
    {
        self.modifier = Some(Arc::new(modifier));
        self
    }

    /// A forked redirect drops a branch whose modifier fails instead of
    /// failing the whole execution.
    pub fn fork(mut self, fork: bool) -> Self {
        self.fork = fork;
        self
    }

    pub fn forked(self) -> Self {
        self.fork(true)
    }

    pub fn inherit_handler(mut self, setting: impl Into<InheritHandler>) -> Self {
        self.inherit = setting.into();
        self
    }

    pub fn inherit_handler_for_child(self) -> Self {
        self.inherit_handler(InheritHandler::Inherit)
    }

    /// Whether execution descends into the redirected child context.
    pub fn execute_child(mut self, execute: bool) -> Self {
        self.execute_child = execute;
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    fn name(&self) -> &str {
        match &self.shape {
            Shape::Literal(name) | Shape::Argument { name, .. } => name,
            Shape::Composed(_) => "",
        }
    }

    /// Produce the finished node; composed members go straight into the arena.
    pub(super) fn finish(
        self,
        tree: &mut CommandTree<S>,
    ) -> Result<(CommandNode<S>, Vec<NodeBuilder<S>>), RegistrationError> {
        if let Some(target) = self.redirect {
            tree.check(target)?;
        }
        let kind = match self.shape {
            Shape::Literal(name) => NodeKind::Literal(name),
            Shape::Argument { name, kind } => NodeKind::Argument { name, kind },
            Shape::Composed(members) => {
                let mut sequence = Vec::with_capacity(members.len());
                for member in members {
                    if !matches!(member.shape, Shape::Argument { .. }) || !member.children.is_empty() {
                        return Err(RegistrationError::ComposedMember(member.name().to_owned()));
                    }
                    let name = member.name().to_owned();
                    let (node, _) = member.finish(tree)?;
                    sequence.push((name, tree.insert(node)));
                }
                NodeKind::Composed(ComposedArgument::new(sequence))
            }
        };
        let mut node = CommandNode::with_kind(kind);
        node.requirement = self.requirement;
        node.preprocess = self.preprocess;
        node.redirect = self.redirect;
        node.modifier = self.modifier;
        node.fork = self.fork;
        node.inherit = self.inherit;
        node.execute_child = self.execute_child;
        node.description = self.description;
        Ok((node, self.children))
    }
}
