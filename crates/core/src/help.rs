//! A ready-made `help` command.

use crate::handler::Source;
use crate::tree::{literal, NodeBuilder, NodeId};
use crate::usage::{render_context, render_usage};

/// `help [command...]`: redirects to the root so the rest of the line parses
/// as a command, but runs itself instead of that command. The rendered usage
/// goes to `sink` with the executing source.
///
/// Register it directly under the root.
pub fn help_node<S, F>(sink: F) -> NodeBuilder<S>
where
    S: Source,
    F: Fn(&S, String) + Send + Sync + 'static,
{
    literal("help")
        .description("Show help for a command")
        .redirect(NodeId::ROOT)
        .execute_child(false)
        .executes(move |context| {
            let text = match (context.child(), context.input()) {
                (Some(child), Some(input)) => render_context(child, input, context.source()),
                _ => render_usage(context.tree(), NodeId::ROOT, context.source()),
            };
            sink(context.source(), text);
            Ok(())
        })
}
