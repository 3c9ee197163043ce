//! CLI integration tests for the `cmdtree` binary.
//!
//! Uses `assert_cmd` to spawn the binary and verify exit codes, stdout
//! content, and stderr content against the demo command tree.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

/// Helper: create a Command for the `cmdtree` binary.
fn cmdtree() -> Command {
    cargo_bin_cmd!("cmdtree")
}

/// Helper: write a TOML config file.
fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    write!(file, "{}", contents).expect("write config");
    file
}

// ──────────────────────────────────────────────
// 1. Help and version
// ──────────────────────────────────────────────

#[test]
fn help_exits_0_with_description() {
    cmdtree()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Command-tree dispatcher demo console"));
}

#[test]
fn version_exits_0() {
    cmdtree()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("cmdtree"));
}

// ──────────────────────────────────────────────
// 2. Run subcommand
// ──────────────────────────────────────────────

#[test]
fn run_echo_prints_rest_of_line() {
    cmdtree()
        .args(["run", "echo", "hello", "world"])
        .assert()
        .success()
        .stdout("hello world\n");
}

#[test]
fn run_greet_uses_source_name() {
    cmdtree()
        .args(["--as", "ada", "run", "greet"])
        .assert()
        .success()
        .stdout("Hello, ada!\n");
}

#[test]
fn run_greet_with_quoted_name() {
    cmdtree()
        .args(["run", "greet \"Ada Lovelace\""])
        .assert()
        .success()
        .stdout("Hello, Ada Lovelace!\n");
}

#[test]
fn run_through_redirects() {
    cmdtree()
        .args(["run", "as", "bob", "whoami"])
        .assert()
        .success()
        .stdout("bob\n");

    cmdtree()
        .args(["run", "everyone", "whoami"])
        .assert()
        .success()
        .stdout("alice\nbob\n");
}

#[test]
fn run_composed_flags() {
    cmdtree()
        .args(["run", "move", "--to", "home", "--from", "work"])
        .assert()
        .success()
        .stdout("Moving from work to home (slow)\n");
}

#[test]
fn run_unknown_command_exits_1_with_caret() {
    cmdtree()
        .args(["run", "nope"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error: Unknown command: nope"))
        .stderr(predicate::str::contains("nope\n^"));
}

#[test]
fn run_json_error_is_structured() {
    cmdtree()
        .args(["--output", "json", "run", "echo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("\"kind\": \"not_found\""));
}

#[test]
fn run_json_reports_output() {
    cmdtree()
        .args(["--output", "json", "run", "everyone", "whoami"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"executed\": 2"))
        .stdout(predicate::str::contains("\"alice\""));
}

#[test]
fn run_quiet_suppresses_errors() {
    cmdtree()
        .args(["--quiet", "run", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::is_empty());
}

#[test]
fn operator_commands_need_operator() {
    cmdtree().args(["run", "shutdown"]).assert().failure();

    cmdtree()
        .args(["--operator", "run", "shutdown"])
        .assert()
        .success()
        .stdout("Shutting down\n");
}

#[test]
fn run_help_lists_commands() {
    cmdtree()
        .args(["run", "help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("greet  -  Say hello"))
        .stdout(predicate::str::contains("echo  ...  -  Print the rest of the line"));
}

// ──────────────────────────────────────────────
// 3. Suggest subcommand
// ──────────────────────────────────────────────

#[test]
fn suggest_literal_prefix() {
    cmdtree()
        .args(["suggest", "gr"])
        .assert()
        .success()
        .stdout("greet\tSay hello\n");
}

#[test]
fn suggest_composed_values_and_flags() {
    cmdtree()
        .args(["suggest", "move a b "])
        .assert()
        .success()
        .stdout(predicate::str::contains("--speed\tHow fast"))
        .stdout(predicate::str::contains("fast\n"))
        .stdout(predicate::str::contains("slow\n"));
}

#[test]
fn suggest_at_cursor() {
    cmdtree()
        .args(["suggest", "--cursor", "2", "greet"])
        .assert()
        .success()
        .stdout("greet\tSay hello\n");
}

#[test]
fn suggest_cursor_past_end_exits_1() {
    cmdtree()
        .args(["suggest", "--cursor", "9", "greet"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("past the end"));
}

#[test]
fn suggest_json() {
    cmdtree()
        .args(["--output", "json", "suggest", "wh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"suggestions\""))
        .stdout(predicate::str::contains("\"text\": \"whoami\""));
}

// ──────────────────────────────────────────────
// 4. Usage and ranges
// ──────────────────────────────────────────────

#[test]
fn usage_of_whole_tree() {
    cmdtree()
        .arg("usage")
        .assert()
        .success()
        .stdout(predicate::str::contains("as  ...  -  Run a command as someone else"))
        .stdout(predicate::str::contains("shutdown").not());
}

#[test]
fn usage_of_composed_command() {
    cmdtree()
        .args(["usage", "move"])
        .assert()
        .success()
        .stdout(predicate::str::contains("move <from> <to> <speed>"))
        .stdout(predicate::str::contains("--speed <speed>     How fast"));
}

#[test]
fn ranges_follow_redirects() {
    cmdtree()
        .args(["ranges", "as", "bob", "whoami"])
        .assert()
        .success()
        .stdout("0..2\tas\n3..6\twho\n7..13\twhoami\n");
}

// ──────────────────────────────────────────────
// 5. Repl and config
// ──────────────────────────────────────────────

#[test]
fn repl_runs_each_line() {
    cmdtree()
        .arg("repl")
        .write_stdin("echo one\n\nas bob whoami\n")
        .assert()
        .success()
        .stdout("one\nbob\n");
}

#[test]
fn repl_keeps_going_after_failure() {
    cmdtree()
        .arg("repl")
        .write_stdin("nope\necho still here\n")
        .assert()
        .failure()
        .stdout("still here\n")
        .stderr(predicate::str::contains("Unknown command: nope"));
}

#[test]
fn config_limits_suggestions() {
    let config = config_file("max_suggestions = 1\n");
    cmdtree()
        .arg("--config")
        .arg(config.path())
        .args(["suggest", ""])
        .assert()
        .success()
        .stdout("as\tRun a command as someone else\n");
}

#[test]
fn bad_config_exits_1() {
    let config = config_file("max_suggestions = \"lots\"\n");
    cmdtree()
        .arg("--config")
        .arg(config.path())
        .args(["run", "whoami"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not parse config"));
}

#[test]
fn missing_config_names_path() {
    cmdtree()
        .args(["--config", "/nonexistent/cmdtree.toml", "run", "whoami"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("/nonexistent/cmdtree.toml"));
}
