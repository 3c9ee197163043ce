mod console;

use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use cmdtree_core::{CommandError, Dispatcher, DispatcherConfig};
use tracing::debug;

use crate::console::Console;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Command-tree dispatcher demo console.
#[derive(Parser)]
#[command(name = "cmdtree", version, about = "Command-tree dispatcher demo console")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// TOML file with dispatcher settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Per-branch suggestion timeout in milliseconds (overrides --config)
    #[arg(long, global = true)]
    suggest_timeout_ms: Option<u64>,

    /// User the command line runs as
    #[arg(long = "as", global = true, default_value = "console")]
    user: String,

    /// Run with operator rights
    #[arg(long, global = true)]
    operator: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and execute one command line
    Run {
        /// The command line; separate words are joined with spaces
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        line: Vec<String>,
    },

    /// List completions for a command line
    Suggest {
        /// Cursor position in characters (default: end of line)
        #[arg(long)]
        cursor: Option<usize>,
        /// The partial command line
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        line: Vec<String>,
    },

    /// Show usage for the command a line names, or the whole tree
    Usage {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        line: Vec<String>,
    },

    /// Show which node matched each part of a command line
    Ranges {
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        line: Vec<String>,
    },

    /// Execute command lines read from stdin, one per line
    Repl,
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let dispatcher = match build_dispatcher(cli.config.as_deref(), cli.suggest_timeout_ms) {
        Ok(dispatcher) => dispatcher,
        Err(msg) => {
            report_error(&msg, cli.output, cli.quiet);
            process::exit(1);
        }
    };
    let console = Console::new(cli.user, cli.operator);

    match cli.command {
        Commands::Run { line } => {
            cmd_run(&dispatcher, &console, &line.join(" "), cli.output, cli.quiet);
        }
        Commands::Suggest { cursor, line } => {
            cmd_suggest(&dispatcher, &console, &line.join(" "), cursor, cli.output, cli.quiet);
        }
        Commands::Usage { line } => {
            cmd_usage(&dispatcher, &console, &line.join(" "), cli.output);
        }
        Commands::Ranges { line } => {
            cmd_ranges(&dispatcher, &console, &line.join(" "), cli.output);
        }
        Commands::Repl => {
            cmd_repl(&dispatcher, &console, cli.output, cli.quiet);
        }
    }
}

/// Log to stderr; stdout carries command output.
fn init_logging(level: &str) {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .init();
}

fn build_dispatcher(config: Option<&Path>, suggest_timeout_ms: Option<u64>) -> Result<Dispatcher<Console>, String> {
    let mut config = match config {
        Some(path) => DispatcherConfig::from_file(path).map_err(|e| e.to_string())?,
        None => DispatcherConfig::default(),
    };
    if suggest_timeout_ms.is_some() {
        config.suggestion_timeout_ms = suggest_timeout_ms;
    }
    let tree = console::build_tree().map_err(|e| format!("could not build command tree: {}", e))?;
    debug!(?config, nodes = tree.node_count(), "dispatcher ready");
    Ok(Dispatcher::with_config(tree, config))
}

// ──────────────────────────────────────────────
// Subcommands
// ──────────────────────────────────────────────

fn cmd_run(dispatcher: &Dispatcher<Console>, console: &Console, line: &str, output: OutputFormat, quiet: bool) {
    if execute_line(dispatcher, console, line, output, quiet).is_err() {
        process::exit(1);
    }
}

fn cmd_repl(dispatcher: &Dispatcher<Console>, console: &Console, output: OutputFormat, quiet: bool) {
    let mut failures = 0usize;
    for line in io::stdin().lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                report_error(&format!("error reading stdin: {}", e), output, quiet);
                process::exit(1);
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        if execute_line(dispatcher, console, &line, output, quiet).is_err() {
            failures += 1;
        }
    }
    debug!(failures, "input exhausted");
    if failures > 0 {
        process::exit(1);
    }
}

/// Execute one line and print what its handlers wrote.
fn execute_line(
    dispatcher: &Dispatcher<Console>,
    console: &Console,
    line: &str,
    output: OutputFormat,
    quiet: bool,
) -> Result<usize, CommandError> {
    debug!(line, "executing");
    let outcome = dispatcher.execute_input(line, console.clone());
    let printed = console.take_output();
    match output {
        OutputFormat::Text => {
            for text in &printed {
                println!("{}", text);
            }
        }
        OutputFormat::Json => {
            if let Ok(executed) = &outcome {
                let value = serde_json::json!({
                    "executed": executed,
                    "output":   printed,
                });
                let pretty =
                    serde_json::to_string_pretty(&value).unwrap_or_else(|e| format!("serialization error: {}", e));
                println!("{}", pretty);
            }
        }
    }
    if let Err(err) = &outcome {
        report_command_error(err, output, quiet);
    }
    outcome
}

fn cmd_suggest(
    dispatcher: &Dispatcher<Console>,
    console: &Console,
    line: &str,
    cursor: Option<usize>,
    output: OutputFormat,
    quiet: bool,
) {
    let length = line.chars().count();
    let cursor = cursor.unwrap_or(length);
    if cursor > length {
        report_error(
            &format!("cursor {} is past the end of the line ({} characters)", cursor, length),
            output,
            quiet,
        );
        process::exit(1);
    }

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            report_error(&format!("failed to create tokio runtime: {}", e), output, quiet);
            process::exit(1);
        }
    };
    let result = dispatcher.parse(line, console.clone());
    let suggestions = rt.block_on(dispatcher.suggest(&result, cursor));

    match output {
        OutputFormat::Text => {
            for suggestion in suggestions.list() {
                match suggestion.tooltip() {
                    Some(tooltip) => println!("{}\t{}", suggestion.text(), tooltip),
                    None => println!("{}", suggestion.text()),
                }
            }
        }
        OutputFormat::Json => {
            let pretty = serde_json::to_string_pretty(&suggestions)
                .unwrap_or_else(|e| format!("serialization error: {}", e));
            println!("{}", pretty);
        }
    }
}

fn cmd_usage(dispatcher: &Dispatcher<Console>, console: &Console, line: &str, output: OutputFormat) {
    let result = dispatcher.parse(line, console.clone());
    let usage = dispatcher.render_usage(&result);
    match output {
        OutputFormat::Text => println!("{}", usage),
        OutputFormat::Json => {
            let value = serde_json::json!({ "usage": usage });
            let pretty =
                serde_json::to_string_pretty(&value).unwrap_or_else(|e| format!("serialization error: {}", e));
            println!("{}", pretty);
        }
    }
}

fn cmd_ranges(dispatcher: &Dispatcher<Console>, console: &Console, line: &str, output: OutputFormat) {
    let result = dispatcher.parse(line, console.clone());
    let ranges = result.matched_ranges();
    match output {
        OutputFormat::Text => {
            for matched in &ranges {
                println!("{}..{}\t{}", matched.range.start, matched.range.end, matched.name);
            }
        }
        OutputFormat::Json => {
            let value = serde_json::json!({
                "complete": result.is_complete(),
                "ranges":   ranges,
            });
            let pretty =
                serde_json::to_string_pretty(&value).unwrap_or_else(|e| format!("serialization error: {}", e));
            println!("{}", pretty);
        }
    }
}

// ──────────────────────────────────────────────
// Error reporting
// ──────────────────────────────────────────────

fn report_command_error(err: &CommandError, output: OutputFormat, quiet: bool) {
    match output {
        OutputFormat::Json => {
            let err_json = serde_json::to_string_pretty(&err.to_json_value())
                .unwrap_or_else(|_| format!("{{\"error\": \"{:?}\"}}", err));
            eprintln!("{}", err_json);
        }
        OutputFormat::Text => {
            if quiet {
                return;
            }
            eprintln!("error: {}", err);
            if let Some(caret) = err.caret() {
                eprintln!("{}", caret);
            }
        }
    }
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{{\"error\": \"{}\"}}", msg.replace('"', "\\\""));
        }
    }
}
