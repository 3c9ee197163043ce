//! Plain-text usage listings.
//!
//! A node's line is its path from the render start, literals as written and
//! arguments as `<name>`. ` ...` marks a node that continues (no handler of
//! its own, or a redirect); `  -  text` appends the description. Nodes whose
//! requirement rejects the source are left out along with their subtree.

use cmdtree_reader::Reader;

use crate::composed::ComposedArgument;
use crate::context::ContextBuilder;
use crate::dispatcher::Dispatcher;
use crate::handler::Source;
use crate::result::ParseResult;
use crate::tree::{CommandNode, CommandTree, NodeId, NodeKind};

impl<S: Source> Dispatcher<S> {
    /// Usage for whatever the parsed input points at.
    pub fn render_usage(&self, result: &ParseResult<S>) -> String {
        let context = result.context();
        render_context(context, result.reader(), context.source())
    }

    pub fn render_node_usage(&self, node: NodeId, source: &S) -> String {
        render_usage(self.tree(), node, source)
    }
}

/// Usage for `node` and its subtree. The root lists its children one line
/// each; any other node lists every path below it.
pub fn render_usage<S: Source>(tree: &CommandTree<S>, node: NodeId, source: &S) -> String {
    render_help(tree, String::new(), node, source)
}

/// Usage for the last node matched in `context`, following redirects, with
/// the text typed before it as the prefix.
pub fn render_context<S: Source>(context: &ContextBuilder<S>, reader: &Reader, source: &S) -> String {
    let start = context.range().start;
    let mut last = context;
    while let Some(child) = last.child() {
        last = child;
    }

    let nodes = last.nodes();
    let composed = nodes
        .iter()
        .find_map(|parsed| parsed.node.composed().map(|id| (id, parsed.range.start)));
    let matched = nodes
        .last()
        .and_then(|parsed| parsed.node.id().map(|id| (id, parsed.range.start)));
    let (target, until) = composed
        .or(matched)
        .unwrap_or((last.root(), last.range().start));

    let prefix = reader.fetch_content(start, until);
    render_help(last.tree(), prefix, target, source)
}

fn render_help<S: Source>(tree: &CommandTree<S>, mut prefix: String, node: NodeId, source: &S) -> String {
    let mut out = String::new();
    let is_root = matches!(tree.node(node).kind(), NodeKind::Root);
    let mut render = Render {
        tree,
        source,
        out: &mut out,
    };
    render.node(&mut prefix, node, !is_root, true, !is_root);
    let trimmed = out.trim_end_matches('\n').len();
    out.truncate(trimmed);
    out
}

struct Render<'a, S: Source> {
    tree: &'a CommandTree<S>,
    source: &'a S,
    out: &'a mut String,
}

impl<S: Source> Render<'_, S> {
    fn node(&mut self, prefix: &mut String, id: NodeId, add_splitter: bool, include_child: bool, include_all: bool) {
        let tree = self.tree;
        let node = tree.node(id);
        if !node.can_use(self.source) {
            return;
        }
        if let NodeKind::Composed(composed) = node.kind() {
            self.composed(prefix, node, composed);
            return;
        }

        let mark = prefix.len();
        match node.kind() {
            NodeKind::Argument { name, .. } => {
                prefix.push('<');
                prefix.push_str(name);
                prefix.push('>');
            }
            _ => prefix.push_str(node.name()),
        }

        if !include_child {
            self.out.push_str(prefix);
            if !node.has_handler() || node.redirect().is_some() {
                self.out.push_str("  ...");
            }
            self.description(node.description());
            prefix.truncate(mark);
            return;
        }

        if node.has_handler() {
            self.out.push_str(prefix);
            self.description(node.description());
            if node.redirect().is_some() {
                self.out.push_str(prefix);
                self.out.push_str(" ...");
                self.description(node.description());
            }
        } else if let Some(text) = node.description() {
            self.out.push_str(prefix);
            self.out.push_str(" ...");
            self.description(Some(text));
        } else if node.redirect().is_some() {
            self.out.push_str(prefix);
            self.out.push_str(" ...\n");
        }

        if add_splitter {
            prefix.push(' ');
        }
        for child in tree.sorted_children(id) {
            self.node(prefix, child, true, include_all, true);
        }
        prefix.truncate(mark);
    }

    /// `  -  text` if described, then end the line.
    fn description(&mut self, text: Option<&str>) {
        if let Some(text) = text {
            self.out.push_str("  -  ");
            self.out.push_str(text);
        }
        self.out.push('\n');
    }

    /// Positional form on one line, then one `--flag <value>` line per member.
    fn composed(&mut self, prefix: &str, node: &CommandNode<S>, composed: &ComposedArgument) {
        let tree = self.tree;
        let members: Vec<&CommandNode<S>> = composed
            .sequence()
            .iter()
            .map(|&member| tree.node(member))
            .collect();
        let width = members.iter().map(|member| member.name().chars().count()).max().unwrap_or(0);
        let indent = " ".repeat(prefix.chars().count());

        self.out.push_str(prefix);
        let positional: Vec<String> = members.iter().map(|member| format!("<{}>", member.name())).collect();
        self.out.push_str(&positional.join(" "));
        self.description(node.description());

        for member in members {
            let pad = " ".repeat(width - member.name().chars().count());
            self.out.push_str(&indent);
            self.out.push_str(&format!("--{}{pad} <{}>", member.name(), member.name()));
            if let Some(text) = member.description() {
                self.out.push_str(&pad);
                self.out.push_str("     ");
                self.out.push_str(text);
            }
            self.out.push('\n');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arguments::AnyArgument;
    use crate::tree::{argument, composed, literal};

    #[test]
    fn composed_lists_flags_aligned() {
        let mut tree: CommandTree<()> = CommandTree::new();
        let cmd = tree.register(NodeId::ROOT, literal("cmd")).expect("cmd");
        tree.register(
            cmd,
            composed([
                argument("from", AnyArgument).description("Origin"),
                argument("to", AnyArgument),
            ])
            .description("Move"),
        )
        .expect("composed");
        let rendered = render_usage(&tree, cmd, &());
        assert_eq!(
            rendered,
            "cmd <from> <to>  -  Move\n    --from <from>     Origin\n    --to   <to>"
        );
    }

    #[test]
    fn hidden_nodes_are_skipped() {
        let mut tree: CommandTree<bool> = CommandTree::new();
        tree.register(NodeId::ROOT, literal("open").executes(|_| Ok(()))).expect("open");
        tree.register(
            NodeId::ROOT,
            literal("admin").requires(|admin: &bool| *admin).executes(|_| Ok(())),
        )
        .expect("admin");
        assert_eq!(render_usage(&tree, NodeId::ROOT, &false), "open");
        assert_eq!(render_usage(&tree, NodeId::ROOT, &true), "admin\nopen");
    }
}
