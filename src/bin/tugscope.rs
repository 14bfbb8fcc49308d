//! Binary entry point for the tugscope CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Occurrences of the identifier at a position, grouped by scope
//! tugscope lookup --at main.go:12:5
//!
//! # Preview a rename (prints the rewritten file inside the JSON)
//! tugscope rename --at main.go:12:5 --to total
//!
//! # Rename in place
//! tugscope rename --at main.go:12:5 --to total --apply
//!
//! # Stream groups as they are found, one JSON line each
//! tugscope stream --at main.go:12:5
//! ```

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use tugscope::cli::{run_lookup, run_rename, run_stream, Settings};
use tugscope::config::UnboundPolicy;
use tugscope::error::{OutputErrorCode, RefactorError};
use tugscope::output::{emit_response, ErrorResponse};

// ============================================================================
// CLI Structure
// ============================================================================

/// Scope-aware symbol lookup and rename for Go source.
///
/// All output is JSON. Errors are reported as JSON on stdout and the exit
/// code tells the error category.
#[derive(Parser, Debug)]
#[command(name = "tugscope", version, about = "Scope-aware symbol lookup and rename")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Log level for tracing output.
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    log_json: bool,

    /// Configuration file (default: discover .tugscope/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// What to do with names no scope declares (overrides the config file).
    #[arg(long, global = true, value_enum)]
    unbound: Option<UnboundArg>,

    /// Compact single-line JSON output (overrides the config file).
    #[arg(long, global = true)]
    compact: bool,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Free-name policy as a flag value.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum UnboundArg {
    /// Resolve free names to the file scope.
    ImplicitRoot,
    /// Report free names as errors.
    Reject,
}

impl From<UnboundArg> for UnboundPolicy {
    fn from(arg: UnboundArg) -> Self {
        match arg {
            UnboundArg::ImplicitRoot => UnboundPolicy::ImplicitRoot,
            UnboundArg::Reject => UnboundPolicy::Reject,
        }
    }
}

/// CLI subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Show the occurrences of the identifier at a position, grouped by scope.
    Lookup {
        /// Location of the identifier (file:line:col).
        #[arg(long)]
        at: String,
    },
    /// Rename the binding of the identifier at a position.
    ///
    /// Prints a preview unless --apply is given.
    Rename {
        /// Location of the identifier to rename (file:line:col).
        #[arg(long)]
        at: String,
        /// New name for the identifier.
        #[arg(long)]
        to: String,
        /// Write the renamed file.
        #[arg(long)]
        apply: bool,
    },
    /// Stream the grouped occurrences, one JSON line per scope.
    Stream {
        /// Location of the identifier (file:line:col).
        #[arg(long)]
        at: String,
    },
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.global.log_level, cli.global.log_json);

    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let error_code = OutputErrorCode::from(&err);
            let response = ErrorResponse::from_error(&err);

            // Errors go to stdout as JSON, like every other response.
            let _ = emit_response(&response, &mut io::stdout());
            let _ = io::stdout().flush();

            ExitCode::from(error_code.code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel, json: bool) {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Execute the CLI command.
async fn execute(cli: Cli) -> Result<(), RefactorError> {
    let settings = settings(&cli.global)?;
    let mut stdout = io::stdout();
    let result = match cli.command {
        Command::Lookup { at } => run_lookup(&settings, &at, &mut stdout),
        Command::Rename { at, to, apply } => run_rename(&settings, &at, &to, apply, &mut stdout),
        Command::Stream { at } => run_stream(&settings, &at, &mut stdout).await,
    };
    let _ = stdout.flush();
    result
}

/// Merge flags over the configuration file.
fn settings(global: &GlobalArgs) -> Result<Settings, RefactorError> {
    let cwd = std::env::current_dir()
        .map_err(|e| RefactorError::internal(format!("failed to get current directory: {e}")))?;
    let mut settings = Settings::load(global.config.as_deref(), &cwd)?;
    if let Some(unbound) = global.unbound {
        settings.config.resolve.unbound = unbound.into();
    }
    if global.compact {
        settings.config.output.pretty = false;
    }
    Ok(settings)
}
