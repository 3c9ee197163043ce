//! The demo command tree the `cmdtree` binary dispatches against.
//!
//! Handlers never print directly. Each writes to the output buffer of the
//! [`Console`] it runs as, and the binary prints the buffer once the line
//! has executed.

use std::sync::{Arc, Mutex};

use cmdtree_core::{
    argument, composed, help_node, literal, CommandError, CommandTree, ContextBuilder, EnumArgument,
    GreedyArgument, NodeId, RegistrationError, StringArgument,
};

/// Users `everyone` fans out to.
const USERS: [&str; 2] = ["alice", "bob"];

/// Who a command line runs as.
#[derive(Debug, Clone)]
pub struct Console {
    name: String,
    operator: bool,
    out: Arc<Mutex<Vec<String>>>,
}

impl Console {
    pub fn new(name: impl Into<String>, operator: bool) -> Self {
        Console {
            name: name.into(),
            operator,
            out: Arc::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_operator(&self) -> bool {
        self.operator
    }

    /// Another user writing to the same output.
    pub fn acting_as(&self, name: &str) -> Console {
        Console {
            name: name.to_owned(),
            operator: false,
            out: Arc::clone(&self.out),
        }
    }

    pub fn print(&self, line: impl Into<String>) {
        if let Ok(mut out) = self.out.lock() {
            out.push(line.into());
        }
    }

    /// Drain everything printed so far.
    pub fn take_output(&self) -> Vec<String> {
        self.out
            .lock()
            .map(|mut out| std::mem::take(&mut *out))
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Speed {
    Slow,
    Fast,
}

impl Speed {
    fn as_str(self) -> &'static str {
        match self {
            Speed::Slow => "slow",
            Speed::Fast => "fast",
        }
    }
}

// ──────────────────────────────────────────────
// Tree
// ──────────────────────────────────────────────

pub fn build_tree() -> Result<CommandTree<Console>, RegistrationError> {
    let mut tree = CommandTree::new();

    tree.register(
        NodeId::ROOT,
        literal("echo")
            .description("Print the rest of the line")
            .then(argument("text", GreedyArgument).executes(|ctx: &ContextBuilder<Console>| {
                let text = ctx.argument::<String>("text").map_or("", String::as_str);
                ctx.source().print(text);
                Ok(())
            })),
    )?;

    tree.register(
        NodeId::ROOT,
        literal("greet")
            .description("Say hello")
            .executes(|ctx: &ContextBuilder<Console>| {
                ctx.source().print(format!("Hello, {}!", ctx.source().name()));
                Ok(())
            })
            .then(argument("name", StringArgument).executes(|ctx: &ContextBuilder<Console>| {
                let name = ctx.argument::<String>("name").map_or("", String::as_str);
                ctx.source().print(format!("Hello, {name}!"));
                Ok(())
            })),
    )?;

    tree.register(
        NodeId::ROOT,
        literal("move").description("Move between two places").then(
            composed([
                argument("from", StringArgument).description("Where to start"),
                argument("to", StringArgument).description("Where to go"),
                argument(
                    "speed",
                    EnumArgument::new([("slow", Speed::Slow), ("fast", Speed::Fast)]),
                )
                .description("How fast"),
            ])
            .executes(|ctx: &ContextBuilder<Console>| {
                let (Some(from), Some(to)) = (ctx.argument::<String>("from"), ctx.argument::<String>("to")) else {
                    return Err(CommandError::failed("move needs both --from and --to"));
                };
                let speed = ctx.argument::<Speed>("speed").copied().unwrap_or(Speed::Slow);
                ctx.source()
                    .print(format!("Moving from {from} to {to} ({})", speed.as_str()));
                Ok(())
            }),
        ),
    )?;

    tree.register(
        NodeId::ROOT,
        literal("whoami").executes(|ctx: &ContextBuilder<Console>| {
            ctx.source().print(ctx.source().name());
            Ok(())
        }),
    )?;

    tree.register(
        NodeId::ROOT,
        literal("as").description("Run a command as someone else").then(
            argument("who", StringArgument)
                .redirect(NodeId::ROOT)
                .modifier(|ctx: &ContextBuilder<Console>| {
                    let who = ctx
                        .argument::<String>("who")
                        .ok_or_else(|| CommandError::failed("no user given"))?;
                    Ok(vec![ctx.source().acting_as(who)])
                }),
        ),
    )?;

    tree.register(
        NodeId::ROOT,
        literal("everyone")
            .description("Run a command as every known user")
            .redirect(NodeId::ROOT)
            .forked()
            .modifier(|ctx: &ContextBuilder<Console>| {
                Ok(USERS.iter().map(|name| ctx.source().acting_as(name)).collect())
            }),
    )?;

    tree.register(
        NodeId::ROOT,
        literal("shutdown")
            .description("Stop the server")
            .requires(Console::is_operator)
            .executes(|ctx: &ContextBuilder<Console>| {
                ctx.source().print("Shutting down");
                Ok(())
            }),
    )?;

    tree.register(NodeId::ROOT, help_node(|console: &Console, text: String| console.print(text)))?;

    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmdtree_core::Dispatcher;

    fn run(line: &str, console: &Console) -> Result<Vec<String>, CommandError> {
        let dispatcher = Dispatcher::new(build_tree().unwrap());
        dispatcher.execute_input(line, console.clone())?;
        Ok(console.take_output())
    }

    #[test]
    fn redirect_runs_as_named_user() {
        let console = Console::new("root", false);
        assert_eq!(run("as bob whoami", &console).unwrap(), vec!["bob"]);
    }

    #[test]
    fn everyone_forks_per_user() {
        let console = Console::new("root", false);
        assert_eq!(run("everyone whoami", &console).unwrap(), vec!["alice", "bob"]);
    }

    #[test]
    fn shutdown_needs_operator() {
        assert_eq!(run("shutdown", &Console::new("root", true)).unwrap(), vec!["Shutting down"]);
        let err = run("shutdown", &Console::new("guest", false)).unwrap_err();
        assert_eq!(err.message(), "Unknown command: shutdown");
    }

    #[test]
    fn move_takes_flags_in_any_order() {
        let console = Console::new("root", false);
        assert_eq!(
            run("move --speed fast --to home --from work", &console).unwrap(),
            vec!["Moving from work to home (fast)"]
        );
        let err = run("move work", &console).unwrap_err();
        assert_eq!(err.message(), "move needs both --from and --to");
    }
}
