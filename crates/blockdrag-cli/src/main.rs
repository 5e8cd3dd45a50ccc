// crates/blockdrag-cli/src/main.rs
// ============================================================================
// Module: blockdrag CLI Entry Point
// Description: Command dispatcher for reorder runs and configuration tooling.
// Purpose: Load configuration, run the harness, and map outcomes to exit codes.
// Dependencies: clap, blockdrag-cli, blockdrag-config, thiserror, tokio,
//               tracing-subscriber
// ============================================================================

//! ## Overview
//! `blockdrag run` executes the reorder harness with whole-attempt retries
//! and exits non-zero when the last attempt fails. `blockdrag config`
//! validates a configuration file or prints the annotated defaults.
//!
//! Settings resolve in order: config file, environment overrides, then
//! command-line flags.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use blockdrag_cli::RunOutcome;
use blockdrag_config::BlockdragConfig;
use blockdrag_config::EnvOverrides;
use blockdrag_config::config_toml_example;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// blockdrag command-line interface.
#[derive(Parser, Debug)]
#[command(name = "blockdrag", version, about = "Nested block reorder harness for a CMS admin UI")]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the reorder harness.
    Run(RunCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Arguments for `blockdrag run`.
#[derive(Args, Debug)]
struct RunCommand {
    /// Config file path (defaults to `BLOCKDRAG_CONFIG` or `blockdrag.toml`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Fixed random seed.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,
    /// Drag iterations per attempt.
    #[arg(long, value_name = "COUNT", value_parser = clap::value_parser!(u64).range(1..))]
    iterations: Option<u64>,
    /// Extra whole attempts after a failure.
    #[arg(long, value_name = "COUNT")]
    retries: Option<u32>,
}

impl RunCommand {
    /// Returns the overrides carried by command-line flags.
    fn overrides(&self) -> CliResult<EnvOverrides> {
        let iterations = self
            .iterations
            .map(usize::try_from)
            .transpose()
            .map_err(|_| CliError::new("--iterations is too large".to_string()))?;
        Ok(EnvOverrides {
            seed: self.seed,
            iterations,
            retries: self.retries,
            ci: false,
        })
    }
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a blockdrag configuration file.
    Validate(ConfigValidateCommand),
    /// Print a configuration file holding every default.
    Example,
}

/// Arguments for `blockdrag config validate`.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Config file path (defaults to `BLOCKDRAG_CONFIG` or `blockdrag.toml`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing failures.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Display message.
    message: String,
}

impl CliError {
    /// Creates a new CLI error.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    init_tracing()?;
    match cli.command {
        Commands::Run(command) => command_run(&command).await,
        Commands::Config {
            command,
        } => command_config(&command),
    }
}

/// Installs the stderr log subscriber; `RUST_LOG` overrides the `info` default.
fn init_tracing() -> CliResult<()> {
    let filter =
        EnvFilter::builder().with_default_directive(LevelFilter::INFO.into()).from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| CliError::new(format!("failed to initialize logging: {err}")))
}

// ============================================================================
// SECTION: Run Command
// ============================================================================

/// Executes `blockdrag run`.
async fn command_run(command: &RunCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref(), command.overrides()?)?;
    let outcome = blockdrag_cli::execute(&config)
        .await
        .map_err(|err| CliError::new(format!("run setup failed: {err}")))?;
    report_outcome(&outcome)
}

/// Loads configuration and layers environment then flag overrides on top.
fn load_config(path: Option<&Path>, flags: EnvOverrides) -> CliResult<BlockdragConfig> {
    let mut config = BlockdragConfig::load(path)
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    config
        .apply_env()
        .map_err(|err| CliError::new(format!("failed to apply environment overrides: {err}")))?;
    config
        .apply_overrides(&flags)
        .map_err(|err| CliError::new(format!("failed to apply overrides: {err}")))?;
    Ok(config)
}

/// Prints the final outcome and maps it to an exit code.
fn report_outcome(outcome: &RunOutcome) -> CliResult<ExitCode> {
    let root = outcome.artifacts_root.display();
    match &outcome.result {
        Ok(report) => {
            write_stdout_line(&format!(
                "run passed on attempt {}: {} drags, {} verifications, seed {}",
                report.attempt, report.drags, report.verifications, report.seed
            ))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
            write_stdout_line(&format!("artifacts: {root}"))
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
            Ok(ExitCode::SUCCESS)
        }
        Err(failure) => {
            write_stderr_line(&format!("run failed ({}): {failure}", failure.error.kind()))
                .map_err(|err| CliError::new(output_error("stderr", &err)))?;
            write_stderr_line(&format!("artifacts: {root}"))
                .map_err(|err| CliError::new(output_error("stderr", &err)))?;
            Ok(ExitCode::FAILURE)
        }
    }
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: &ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate(command) => command_config_validate(command),
        ConfigCommand::Example => {
            write_stdout_line(config_toml_example().trim_end())
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Executes the config validation command.
fn command_config_validate(command: &ConfigValidateCommand) -> CliResult<ExitCode> {
    let _config = BlockdragConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    write_stdout_line("config ok").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output failure.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
