//! The outcome of one top-level parse.

use std::fmt;

use cmdtree_reader::Reader;

use crate::context::{ContextBuilder, MatchedNode};
use crate::error::CommandError;
use crate::handler::Source;
use crate::range::StringRange;
use crate::tree::NodeId;

/// A node that matched part of the input, for highlighting.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct MatchedRange {
    pub range: StringRange,
    pub name: String,
    pub literal: bool,
}

/// Context, reader position and per-node errors of the selected branch.
#[derive(Clone)]
pub struct ParseResult<S: Source> {
    context: ContextBuilder<S>,
    reader: Reader,
    errors: Vec<(NodeId, CommandError)>,
}

impl<S: Source> fmt::Debug for ParseResult<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseResult")
            .field("context", &self.context)
            .field("reader", &self.reader)
            .field("errors", &self.errors)
            .finish()
    }
}

impl<S: Source> ParseResult<S> {
    pub(crate) fn new(context: ContextBuilder<S>, reader: Reader, errors: Vec<(NodeId, CommandError)>) -> Self {
        ParseResult {
            context,
            reader,
            errors,
        }
    }

    pub fn context(&self) -> &ContextBuilder<S> {
        &self.context
    }

    /// Reader left where the selected branch stopped.
    pub fn reader(&self) -> &Reader {
        &self.reader
    }

    /// Errors recorded for the nodes tried at the point parsing stopped, in
    /// the order they were tried.
    pub fn errors(&self) -> &[(NodeId, CommandError)] {
        &self.errors
    }

    /// All input consumed without errors.
    pub fn is_complete(&self) -> bool {
        !self.reader.can_read() && self.errors.is_empty()
    }

    pub(crate) fn into_parts(self) -> (ContextBuilder<S>, Reader, Vec<(NodeId, CommandError)>) {
        (self.context, self.reader, self.errors)
    }

    /// The error execution would fail with before running anything.
    ///
    /// A single recorded error is returned as is. Several collapse into
    /// "unknown command" when nothing matched, or "incorrect argument" at the
    /// furthest position otherwise.
    pub fn check(&self) -> Result<(), CommandError> {
        if self.is_complete() {
            return Ok(());
        }
        if let [(_, only)] = self.errors.as_slice() {
            return Err(only.clone());
        }
        if self.context.range().is_empty() {
            return Err(CommandError::unknown_command(&self.reader));
        }
        Err(CommandError::incorrect_argument(&self.reader, None))
    }

    /// Ranges of real tree nodes across the redirect chain, in input order.
    pub fn matched_ranges(&self) -> Vec<MatchedRange> {
        let tree = self.context.tree();
        let mut ranges = Vec::new();
        let mut current = Some(&self.context);
        while let Some(context) = current {
            for parsed in context.nodes() {
                if let MatchedNode::Node(id) = parsed.node {
                    let node = tree.node(id);
                    ranges.push(MatchedRange {
                        range: parsed.range,
                        name: node.name().to_owned(),
                        literal: node.is_literal(),
                    });
                }
            }
            current = context.child();
        }
        ranges
    }
}
