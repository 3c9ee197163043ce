//! Composed arguments: ordered positional values that may switch to
//! `--name value` flags.
//!
//! Parsing starts positionally. The first token naming a still pending member
//! as `--name` switches to flag mode for good; positional parsing does not
//! resume afterwards. Placeholders recorded between values let suggestions
//! offer both the remaining flags and the next positional value.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use cmdtree_reader::Reader;
use tracing::debug;

use crate::context::{ContextBuilder, MatchedNode};
use crate::error::CommandError;
use crate::handler::Source;
use crate::range::StringRange;
use crate::suggestion::{Suggestions, SuggestionsBuilder};
use crate::tree::NodeId;

/// Unnamed metadata left behind when a composed argument ends with members
/// still unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingArguments {
    /// No flag was used and positional members remain, so more plain values
    /// would continue the sequence.
    pub can_continue_sequence: bool,
    /// Members with no value, in declaration order.
    pub pending: Vec<String>,
    /// Positional members not reached, in order.
    pub sequence: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ComposedArgument {
    sequence: Vec<NodeId>,
    by_name: HashMap<String, NodeId>,
}

impl ComposedArgument {
    pub(crate) fn new(members: Vec<(String, NodeId)>) -> Self {
        let by_name = members.iter().cloned().collect();
        ComposedArgument {
            sequence: members.into_iter().map(|(_, id)| id).collect(),
            by_name,
        }
    }

    /// Members in positional order.
    pub fn sequence(&self) -> &[NodeId] {
        &self.sequence
    }

    pub fn member(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    pub(crate) fn remap(&mut self, remap: &impl Fn(NodeId) -> NodeId) {
        for id in self.sequence.iter_mut().chain(self.by_name.values_mut()) {
            *id = remap(*id);
        }
    }

    /// The pending member a `--name` token refers to.
    fn pending_flag(&self, token: &str, pending: &[NodeId]) -> Option<NodeId> {
        token
            .strip_prefix("--")
            .and_then(|name| self.member(name))
            .filter(|id| pending.contains(id))
    }

    pub(crate) fn parse<S: Source>(
        &self,
        id: NodeId,
        context: &mut ContextBuilder<S>,
        reader: &mut Reader,
    ) -> Result<(), CommandError> {
        let tree = context.tree_handle();
        let mut pending = self.sequence.clone();
        let mut sequence: VecDeque<NodeId> = self.sequence.iter().copied().collect();

        context.with_node(
            after_value(id, &pending, sequence.front().copied()),
            StringRange::at(reader.cursor()),
        );

        let flags = loop {
            let Some(&next) = sequence.front() else {
                break false;
            };
            let Some(token) = reader.peek_any() else {
                break false;
            };
            if self.pending_flag(token.as_str(), &pending).is_some() {
                break true;
            }
            sequence.pop_front();
            pending.retain(|&member| member != next);
            tree.node(next).parse(next, context, reader)?;
            expect_separator(reader)?;
            context.with_node(
                after_value(id, &pending, sequence.front().copied()),
                StringRange::at(reader.cursor()),
            );
        };

        if flags {
            while !pending.is_empty() {
                let origin = reader.cursor();
                let flagged = reader
                    .read_any()
                    .and_then(|token| self.pending_flag(token.as_str(), &pending));
                let Some(member) = flagged else {
                    reader.set_cursor(origin);
                    break;
                };
                pending.retain(|&other| other != member);

                if !reader.can_read() {
                    context.with_node(
                        MatchedNode::FlagValue {
                            composed: id,
                            argument: None,
                        },
                        StringRange::between(origin, reader.cursor()),
                    );
                    return Err(CommandError::syntax(
                        format!("Expected a value after '--{}'", tree.node(member).name()),
                        reader,
                    ));
                }
                expect_separator(reader)?;
                context.with_node(
                    MatchedNode::FlagValue {
                        composed: id,
                        argument: Some(member),
                    },
                    StringRange::between(origin, reader.cursor()),
                );
                tree.node(member).parse(member, context, reader)?;

                if reader.can_read() {
                    expect_separator(reader)?;
                    context.with_node(after_value(id, &pending, None), StringRange::at(reader.cursor()));
                }
            }
        }

        if !pending.is_empty() {
            let names = |ids: &[NodeId]| -> Vec<String> {
                ids.iter().map(|&member| tree.node(member).name().to_owned()).collect()
            };
            let sequence: Vec<NodeId> = sequence.into_iter().collect();
            context.with_metadata(
                None,
                PendingArguments {
                    can_continue_sequence: pending.len() == sequence.len() && !sequence.is_empty(),
                    pending: names(&pending),
                    sequence: names(&sequence),
                },
            );
        }
        Ok(())
    }
}

fn after_value(composed: NodeId, pending: &[NodeId], next: Option<NodeId>) -> MatchedNode {
    MatchedNode::AfterValue {
        composed,
        pending: Arc::from(pending),
        next,
    }
}

fn expect_separator(reader: &mut Reader) -> Result<(), CommandError> {
    match reader.peek_char() {
        None => Ok(()),
        Some(c) if c.is_whitespace() => {
            reader.read_char();
            Ok(())
        }
        Some(_) => Err(CommandError::syntax("Expected whitespace to end one argument", reader)),
    }
}

/// Completions offered by a composed-argument placeholder.
pub(crate) async fn interpret<S: Source>(
    placeholder: &MatchedNode,
    context: &ContextBuilder<S>,
    mut builder: SuggestionsBuilder,
) -> Result<Suggestions, CommandError> {
    let tree = context.tree();
    match placeholder {
        MatchedNode::Node(_) | MatchedNode::FlagValue { argument: None, .. } => Ok(Suggestions::empty()),
        MatchedNode::FlagValue {
            argument: Some(member),
            ..
        } => tree.list_suggestions(*member, context, builder).await,
        MatchedNode::AfterValue { pending, next, .. } => {
            let typed = builder.remaining().to_owned();
            if !("--".starts_with(&typed) || typed.starts_with("--")) {
                return match next {
                    Some(next) => tree.list_suggestions(*next, context, builder).await,
                    None => Ok(Suggestions::empty()),
                };
            }
            for &member in pending.iter() {
                let node = tree.node(member);
                let flag = format!("--{}", node.name());
                if flag.starts_with(&typed) {
                    builder.suggest_with_tooltip(flag, node.description());
                }
            }
            let Some(next) = next else {
                return Ok(builder.build());
            };
            let values = match tree.list_suggestions(*next, context, builder.clean()).await {
                Ok(values) => values,
                Err(err) => {
                    debug!(node = %next, error = %err, "positional suggestions failed");
                    Suggestions::empty()
                }
            };
            Ok(Suggestions::merge([builder.build(), values]))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arguments::AnyArgument;
    use crate::tree::{argument, composed, literal, CommandTree, NodeKind};

    fn tree() -> (CommandTree<()>, ComposedArgument) {
        let mut tree = CommandTree::new();
        let cmd = tree.register(NodeId::ROOT, literal("cmd")).expect("cmd");
        let node = tree
            .register(
                cmd,
                composed([argument("first", AnyArgument), argument("second", AnyArgument)]),
            )
            .expect("composed");
        let NodeKind::Composed(inner) = tree.node(node).kind().clone() else {
            panic!("not a composed node");
        };
        (tree, inner)
    }

    #[test]
    fn flags_only_match_pending_members() {
        let (_, composed) = tree();
        let first = composed.member("first").expect("first");
        let second = composed.member("second").expect("second");
        assert_eq!(composed.pending_flag("--first", &[first, second]), Some(first));
        assert_eq!(composed.pending_flag("--first", &[second]), None);
        assert_eq!(composed.pending_flag("first", &[first]), None);
        assert_eq!(composed.pending_flag("--third", &[first]), None);
    }

    #[test]
    fn separator_must_be_whitespace() {
        let mut reader = Reader::new("a b");
        reader.set_cursor(1);
        assert!(expect_separator(&mut reader).is_ok());
        assert_eq!(reader.cursor(), 2);
        reader.set_cursor(0);
        assert!(expect_separator(&mut reader).is_err());
        reader.set_cursor(3);
        assert!(expect_separator(&mut reader).is_ok());
    }
}
