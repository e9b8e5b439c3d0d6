//! finch CLI: argument parsing and command execution.
//!
//! Errors follow the agent contract: operational failures are emitted as an
//! [`ErrorResponse`] JSON envelope on stdout and mapped to stable exit
//! codes; a completed check that found violations exits with code 1.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use finch_core::error::{FinchError, OutputErrorCode, VIOLATIONS_EXIT_CODE};
use finch_core::facts::SymbolOwner;
use finch_core::output::{
    emit_response, CheckResponse, DiagnosticInfo, ErrorResponse, LiteralHintInfo, SummaryInfo,
    SCHEMA_VERSION,
};
use finch_python::check::{check_modules, CheckOutcome};
use finch_python::options::FinalityOptions;

use crate::snapshot;

// ============================================================================
// Arguments
// ============================================================================

/// Finality checker for Python declaration snapshots.
#[derive(Parser)]
#[command(name = "finch", version, about, long_about = None)]
pub struct Cli {
    /// Log level for stderr logging (FINCH_LOG / RUST_LOG override).
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check a declaration snapshot for finality violations.
    Check {
        /// Snapshot path: a .json file or a directory of .json files.
        snapshot: PathBuf,

        /// Output format.
        #[arg(long, value_enum, default_value = "text")]
        format: Format,

        /// Flag re-bindings of final names inside loop bodies.
        #[arg(long)]
        strict_loop_assignments: bool,

        /// Skip recording literal-substitution hints.
        #[arg(long)]
        no_literal_hints: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// One `path:line:col: kind: message` line per violation.
    Text,
    /// The JSON agent contract.
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

// ============================================================================
// Entry Point
// ============================================================================

/// Parse arguments, run the command, and map the outcome to an exit code.
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_level);

    match execute(cli) {
        Ok(code) => code,
        Err(err) => {
            let response = ErrorResponse::from_error(&err);
            let _ = emit_response(&response, &mut io::stdout());
            let _ = io::stdout().flush();
            ExitCode::from(OutputErrorCode::from(&err).code())
        }
    }
}

/// Initialize the tracing subscriber writing to stderr.
fn init_tracing(level: LogLevel) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_filter()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn execute(cli: Cli) -> Result<ExitCode, FinchError> {
    match cli.command {
        Command::Check {
            snapshot,
            format,
            strict_loop_assignments,
            no_literal_hints,
        } => execute_check(&snapshot, format, strict_loop_assignments, no_literal_hints),
    }
}

// ============================================================================
// Command Executors
// ============================================================================

fn execute_check(
    path: &std::path::Path,
    format: Format,
    strict_loop_assignments: bool,
    no_literal_hints: bool,
) -> Result<ExitCode, FinchError> {
    let snapshot = snapshot::load(path)?;
    let options = FinalityOptions {
        flag_loop_assignments: strict_loop_assignments,
        record_literal_hints: !no_literal_hints,
    };
    let outcome = check_modules(&snapshot.modules, &options);

    match format {
        Format::Text => {
            for diagnostic in &outcome.diagnostics {
                println!("{}", diagnostic);
            }
            eprintln!(
                "checked {} module(s), {} class(es): {} violation(s)",
                outcome.summary.modules,
                outcome.summary.classes,
                outcome.diagnostics.len()
            );
        }
        Format::Json => {
            let response = build_check_response(&outcome, snapshot.id.to_string());
            emit_response(&response, &mut io::stdout())?;
        }
    }

    Ok(if outcome.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(VIOLATIONS_EXIT_CODE)
    })
}

fn build_check_response(outcome: &CheckOutcome, snapshot_id: String) -> CheckResponse {
    let status = if outcome.is_clean() {
        CheckResponse::STATUS_OK
    } else {
        CheckResponse::STATUS_VIOLATIONS
    };
    let literal_hints = outcome
        .literal_hints
        .iter()
        .map(|(id, value)| {
            let symbol = outcome.store.symbol(id);
            let owner = match symbol.owner {
                SymbolOwner::Module(m) => outcome.store.module(m).name.clone(),
                SymbolOwner::Class(c) => outcome.store.class(c).qualified_name.clone(),
            };
            LiteralHintInfo {
                symbol: format!("{}.{}", owner, symbol.name),
                value: value.clone(),
            }
        })
        .collect();
    CheckResponse {
        status: status.to_string(),
        schema_version: SCHEMA_VERSION.to_string(),
        snapshot_id: Some(snapshot_id),
        summary: SummaryInfo {
            modules: outcome.summary.modules,
            classes: outcome.summary.classes,
            final_classes: outcome.summary.final_classes,
            final_methods: outcome.summary.final_methods,
            final_symbols: outcome.summary.final_symbols,
            violations: outcome.diagnostics.len(),
        },
        diagnostics: outcome.diagnostics.iter().map(DiagnosticInfo::from).collect(),
        literal_hints,
    }
}

// ============================================================================
// Tests
// ============================================================================
