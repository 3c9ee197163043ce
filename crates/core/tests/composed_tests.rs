//! Composed arguments: positional values, `--name` flags and the
//! completions offered between them.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use cmdtree_core::{
    argument, composed, literal, AnyArgument, AnyValue, ArgumentType, BoxError, CommandError, CommandTree,
    ContextBuilder, Dispatcher, EnumArgument, NodeId, PendingArguments, Reader,
};

// ──────────────────────────────────────────────
// Helpers
// ──────────────────────────────────────────────

#[derive(Debug, Default, Clone, PartialEq)]
struct Seen {
    arg1: Option<String>,
    arg2: Option<String>,
    arg3: Option<String>,
    pending: Option<PendingArguments>,
}

fn dispatcher(seen: &Arc<Mutex<Option<Seen>>>) -> Dispatcher<()> {
    let seen = Arc::clone(seen);
    let mut tree = CommandTree::new();
    tree.register(
        NodeId::ROOT,
        literal("cmd").then(
            composed([
                argument("arg1", EnumArgument::of(["va1", "va2", "--vel"])),
                argument("arg2", EnumArgument::of(["vb1", "vb2", "--vel2"])),
                argument("arg3", AnyArgument),
            ])
            .executes(move |ctx: &ContextBuilder<()>| {
                let text = |name: &str| ctx.argument::<String>(name).cloned();
                *seen.lock().unwrap() = Some(Seen {
                    arg1: text("arg1"),
                    arg2: text("arg2"),
                    arg3: text("arg3"),
                    pending: ctx.metadata_of::<PendingArguments>().cloned(),
                });
                Ok(())
            }),
        ),
    )
    .unwrap();
    Dispatcher::new(tree)
}

fn run(line: &str) -> Seen {
    let seen = Arc::new(Mutex::new(None));
    let d = dispatcher(&seen);
    assert_eq!(d.execute_input(line, ()).unwrap(), 1, "{line}");
    let result = seen.lock().unwrap().clone();
    result.expect("handler ran")
}

async fn suggest(line: &str, cursor: Option<usize>) -> BTreeSet<String> {
    let d = dispatcher(&Arc::default());
    let result = d.parse(line, ());
    d.suggest(&result, cursor.unwrap_or(line.chars().count()))
        .await
        .list()
        .iter()
        .map(|s| s.text().to_owned())
        .collect()
}

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// ──────────────────────────────────────────────
// Suggestions
// ──────────────────────────────────────────────

#[tokio::test]
async fn positional_and_flag_suggestions() {
    assert_eq!(suggest("cmd", None).await, set(&[]));
    assert_eq!(
        suggest("cmd ", None).await,
        set(&["--arg1", "--arg2", "--arg3", "va1", "va2", "--vel"])
    );
    assert_eq!(suggest("cmd --", None).await, set(&["--arg1", "--arg2", "--arg3", "--vel"]));
    assert_eq!(suggest("cmd --v", None).await, set(&["--vel"]));
    assert_eq!(suggest("cmd --vel", None).await, set(&[]));
}

#[tokio::test]
async fn suggestions_after_a_positional_value() {
    assert_eq!(
        suggest("cmd --vel ", None).await,
        set(&["--arg2", "--arg3", "--vel2", "vb1", "vb2"])
    );
    assert_eq!(suggest("cmd --vel ", Some(9)).await, set(&[]));
}

#[tokio::test]
async fn suggestions_after_a_flag() {
    assert_eq!(suggest("cmd --arg3 Hello ", None).await, set(&["--arg1", "--arg2"]));
    assert_eq!(suggest("cmd --arg3 Hello --arg", None).await, set(&["--arg1", "--arg2"]));
    assert_eq!(suggest("cmd --arg3 Hello --arg2", None).await, set(&[]));
    assert_eq!(suggest("cmd --arg3 Hello --arg2 ", None).await, set(&["--vel2", "vb1", "vb2"]));
    assert_eq!(suggest("cmd --arg3 Hello --arg2 v", None).await, set(&["vb1", "vb2"]));
}

// ──────────────────────────────────────────────
// Execution
// ──────────────────────────────────────────────

#[test]
fn full_sequence_sets_every_member() {
    let seen = run("cmd va1 vb2 v3");
    assert_eq!(seen.arg1.as_deref(), Some("va1"));
    assert_eq!(seen.arg2.as_deref(), Some("vb2"));
    assert_eq!(seen.arg3.as_deref(), Some("v3"));
    assert_eq!(seen.pending, None);
}

#[test]
fn value_that_looks_like_a_flag_is_positional() {
    let seen = run("cmd --vel vb1 x");
    assert_eq!(seen.arg1.as_deref(), Some("--vel"));
    assert_eq!(seen.arg3.as_deref(), Some("x"));
}

#[test]
fn short_sequence_can_continue() {
    let seen = run("cmd va1 vb1");
    assert_eq!(seen.arg3, None);
    assert_eq!(
        seen.pending,
        Some(PendingArguments {
            can_continue_sequence: true,
            pending: vec!["arg3".into()],
            sequence: vec!["arg3".into()],
        })
    );
}

#[test]
fn flags_leave_others_pending() {
    let seen = run("cmd --arg2 vb1");
    assert_eq!(seen.arg1, None);
    assert_eq!(seen.arg2.as_deref(), Some("vb1"));
    assert_eq!(
        seen.pending,
        Some(PendingArguments {
            can_continue_sequence: false,
            pending: vec!["arg1".into(), "arg3".into()],
            sequence: vec!["arg1".into(), "arg2".into(), "arg3".into()],
        })
    );
}

#[test]
fn flags_in_any_order() {
    let seen = run("cmd --arg3 Hello --arg1 va2 --arg2 vb1");
    assert_eq!(seen.arg1.as_deref(), Some("va2"));
    assert_eq!(seen.arg2.as_deref(), Some("vb1"));
    assert_eq!(seen.arg3.as_deref(), Some("Hello"));
    assert_eq!(seen.pending, None);
}

#[test]
fn positional_values_do_not_resume_after_a_flag() {
    let d = dispatcher(&Arc::default());
    let result = d.parse("cmd --arg2 vb1 va1", ());
    assert!(!result.is_complete());
    assert_eq!(result.context().argument::<String>("arg1"), None);

    let err = d.execute(&result).unwrap_err();
    assert!(err.is_syntax());
    assert_eq!(err.cursor(), Some(15));
    assert_eq!(err.message(), "Incorrect argument at position 15: va1");
}

#[test]
fn flag_without_value_is_an_error() {
    let d = dispatcher(&Arc::default());
    let err = d.execute_input("cmd --arg2", ()).unwrap_err();
    assert_eq!(err.message(), "Expected a value after '--arg2'");
}

#[test]
fn bad_member_value_is_reported_at_the_value() {
    let d = dispatcher(&Arc::default());
    let err = d.execute_input("cmd va1 nope", ()).unwrap_err();
    assert!(err.is_syntax());
    assert_eq!(err.cursor(), Some(8));
    assert_eq!(err.message(), "Incorrect argument at position 8: nope");
}

// ──────────────────────────────────────────────
// Failures inside a composed node
// ──────────────────────────────────────────────

struct BackendArgument;

#[async_trait]
impl ArgumentType<()> for BackendArgument {
    fn parse(&self, _reader: &mut Reader, _context: &ContextBuilder<()>) -> Result<AnyValue, BoxError> {
        Err(CommandError::failed("backend down").into())
    }
}

fn failing_tree() -> Dispatcher<()> {
    let mut tree = CommandTree::new();
    tree.register(
        NodeId::ROOT,
        literal("cmd").then(composed([argument("value", BackendArgument)]).executes(|_| Ok(()))),
    )
    .unwrap();
    tree.register(
        NodeId::ROOT,
        literal("refuse").then(
            composed([argument("value", AnyArgument)])
                .preprocess(|_| Err(CommandError::failed("handler unavailable"))),
        ),
    )
    .unwrap();
    Dispatcher::new(tree)
}

#[test]
fn member_failure_becomes_syntax_error() {
    let err = failing_tree().execute_input("cmd x", ()).unwrap_err();
    assert!(err.is_syntax(), "{err:?}");
    assert_eq!(err.message(), "backend down");
    assert_eq!(err.cursor(), Some(4));
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn composed_preprocess_failure_becomes_syntax_error() {
    let err = failing_tree().execute_input("refuse x", ()).unwrap_err();
    assert!(err.is_syntax(), "{err:?}");
    assert_eq!(err.message(), "handler unavailable");
    assert_eq!(err.cursor(), Some(8));
}
