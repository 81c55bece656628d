// crates/pid-sync-cli/src/main.rs
// ============================================================================
// Module: PID Sync CLI Entry Point
// Description: Diagnose, export, and repair PIDs against the registrar.
// Purpose: Wire configuration, store, registrar, and sinks into a run.
// Dependencies: clap, pid-sync-config, pid-sync-core, pid-sync-registrar,
//               pid-sync-store-sqlite, thiserror
// ============================================================================

//! ## Overview
//! `pid-sync` validates its mode flags first, then loads configuration, opens
//! the local store, and hands the selected PIDs to the reconciler. All
//! user-facing strings are routed through the message catalog.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Parser;
use pid_sync_cli::export::FileExportSink;
use pid_sync_cli::journal::JournalRepairExecutor;
use pid_sync_cli::modes::ModeFlags;
use pid_sync_cli::modes::RunMode;
use pid_sync_cli::pid_list::read_pid_list;
use pid_sync_cli::render::OutputFormat;
use pid_sync_cli::render::render;
use pid_sync_cli::t;
use pid_sync_config::AuditConfig;
use pid_sync_config::AuditSinkType;
use pid_sync_config::PidSyncConfig;
use pid_sync_config::RegistrarConfig;
use pid_sync_core::AuditSink;
use pid_sync_core::CancelFlag;
use pid_sync_core::ExportSink;
use pid_sync_core::FileAuditSink;
use pid_sync_core::NoopAuditSink;
use pid_sync_core::ReconcileOptions;
use pid_sync_core::ReconcileScope;
use pid_sync_core::Reconciler;
use pid_sync_core::ReconcilerSettings;
use pid_sync_core::StderrAuditSink;
use pid_sync_registrar::RegistrarClient;
use pid_sync_registrar::RegistrarClientConfig;
use pid_sync_store_sqlite::SqliteLocalStore;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "pid-sync", disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue)]
    show_version: bool,
    /// Optional config file path (defaults to pid-sync.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Single PID to process.
    #[arg(long, value_name = "PID")]
    pid: Option<String>,
    /// File with one PID per line.
    #[arg(long = "pid-list", value_name = "PATH")]
    pid_list: Option<PathBuf>,
    /// List PIDs in failed local status.
    #[arg(long = "list-failed", action = ArgAction::SetTrue)]
    list_failed: bool,
    /// Export the stored metadata document of the PID.
    #[arg(long, action = ArgAction::SetTrue)]
    export: bool,
    /// Attempt a safety-gated repair of each PID.
    #[arg(long, visible_alias = "repair", action = ArgAction::SetTrue)]
    fix: bool,
    /// Skip the diagnostic report.
    #[arg(long = "skip-diagnostic", action = ArgAction::SetTrue)]
    skip_diagnostic: bool,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for catalog messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a catalog message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Validates modes, builds collaborators, and runs the reconciler.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout(&format!("{}\n", t!("main.version", version = version)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let flags = ModeFlags {
        pid: cli.pid.clone(),
        pid_list: cli.pid_list.clone(),
        list_failed: cli.list_failed,
        export: cli.export,
        fix: cli.fix,
    };
    let mode = flags.resolve().map_err(|err| CliError::new(t!("input.invalid", error = err)))?;

    let config = PidSyncConfig::load(cli.config.as_deref())
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    let scope = match mode {
        RunMode::Single(pid) => ReconcileScope::Single(pid),
        RunMode::Batch(path) => {
            let entries = read_pid_list(&path).map_err(|err| {
                CliError::new(t!("pid_list.read_failed", path = path.display(), error = err))
            })?;
            ReconcileScope::Batch(entries)
        }
        RunMode::ListFailed => ReconcileScope::ListFailed,
    };

    let store = SqliteLocalStore::new(&config.store_config())
        .map_err(|err| CliError::new(t!("store.open_failed", error = err)))?;
    let probe = RegistrarClient::new(registrar_client_config(&config.registrar))
        .map_err(|err| CliError::new(t!("registrar.init_failed", error = err)))?;
    let executor = JournalRepairExecutor::new(&config.repair.journal_path);
    let audit = open_audit_sink(&config.audit)?;
    let settings = ReconcilerSettings {
        local_prefix: config
            .local_prefix()
            .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?,
        download_identity: config.registry.download_identity.trim().to_string(),
    };
    let reconciler = Reconciler::new(store, probe, executor, audit, settings);

    let export_sink = FileExportSink::new(config.export.directory.clone());
    let options = ReconcileOptions {
        skip_diagnostic: cli.skip_diagnostic,
        export: cli.export.then_some(&export_sink as &dyn ExportSink),
        repair: cli.fix,
    };
    let report = reconciler
        .run(&scope, options, &CancelFlag::new())
        .map_err(|err| CliError::new(t!("run.failed", error = err)))?;
    let output = render(&report, cli.format)
        .map_err(|err| CliError::new(t!("output.json_failed", error = err)))?;
    write_stdout(&output)?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Wiring
// ============================================================================

/// Maps registrar configuration onto the client configuration.
fn registrar_client_config(config: &RegistrarConfig) -> RegistrarClientConfig {
    RegistrarClientConfig {
        api_url: config.api_url.trim().to_string(),
        allow_http: config.allow_http,
        timeout_ms: config.timeout_ms,
        max_response_bytes: config.max_response_bytes,
        user_agent: config.user_agent.trim().to_string(),
        username: config.username.clone(),
        password: config.password.clone(),
    }
}

/// Opens the configured audit sink.
fn open_audit_sink(config: &AuditConfig) -> CliResult<Box<dyn AuditSink>> {
    match (config.sink, &config.path) {
        (AuditSinkType::File, Some(path)) => {
            let sink = FileAuditSink::new(path).map_err(|err| {
                CliError::new(t!("audit.open_failed", path = path.display(), error = err))
            })?;
            Ok(Box::new(sink))
        }
        (AuditSinkType::None, _) => Ok(Box::new(NoopAuditSink)),
        _ => Ok(Box::new(StderrAuditSink)),
    }
}

// ============================================================================
// SECTION: Output
// ============================================================================

/// Writes rendered output to stdout.
fn write_stdout(output: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    stdout
        .write_all(output.as_bytes())
        .and_then(|()| stdout.flush())
        .map_err(|err| CliError::new(output_error(&err)))
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats a stdout write error message.
fn output_error(error: &std::io::Error) -> String {
    t!("output.write_failed", stream = t!("output.stream.stdout"), error = error)
}

/// Emits an error message and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
