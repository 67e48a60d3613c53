//! Command-line front end
//!
//! Two subcommands, resolved by clap from a closed enum:
//!
//! - `read-line <file-path> <line-number>`: print one line, indexing the file on first use
//! - `generate-file <file-name> <number-of-lines>`: write a file of random hex lines
//!
//! Missing arguments and unknown subcommands are reported by clap (exit code 2).
//! Every other failure is logged and turned into exit code 1 by `main`.
//!
//! SIGINT and SIGTERM cancel the running command: the shared [`CancelToken`]
//! is flipped and the active read or write loop stops with `Cancelled`.

pub mod commands;

use std::env;
use std::io::{self, IsTerminal};
use std::path::Path;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

pub use commands::{GenerateFileCommand, ReadLineCommand};

use crate::config::Config;
use crate::utils::CancelToken;

#[derive(Parser)]
#[command(name = "partline")]
#[command(version = "0.1.0")]
#[command(about = "Random access to lines of large text files through a persisted partition index", long_about = None)]
pub struct Cli {
    /// Verbosity: info by default (or `RUST_LOG`), -v for debug, -vv for trace
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print a single line of a file (zero-based line number)
    ReadLine {
        file_path: String,
        #[arg(allow_negative_numbers = true)]
        line_number: String,
    },
    /// Generate a file of random hexadecimal lines
    GenerateFile {
        file_name: String,
        #[arg(allow_negative_numbers = true)]
        number_of_lines: String,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::from_env();
    let cwd = env::current_dir().context("Failed to resolve working directory")?;
    let cancel = CancelToken::new();
    cancel_on_signal(&cancel)?;

    execute(cli.command, &config, &cwd, &cancel)
}

/// Dispatch a parsed command. The resolved line is written to stdout.
pub fn execute(command: Commands, config: &Config, cwd: &Path, cancel: &CancelToken) -> Result<()> {
    match command {
        Commands::ReadLine { file_path, line_number } => {
            let command = ReadLineCommand::new(config, cwd, cancel)?;
            let stdout = io::stdout();
            command.execute(&file_path, &line_number, &mut stdout.lock())?;
        }
        Commands::GenerateFile { file_name, number_of_lines } => {
            GenerateFileCommand::new(config, cwd, cancel)?.execute(&file_name, &number_of_lines)?;
        }
    }

    Ok(())
}

/// Cancel `cancel` on SIGINT or SIGTERM
fn cancel_on_signal(cancel: &CancelToken) -> Result<()> {
    let token = cancel.clone();
    ctrlc::set_handler(move || {
        warn!("Interrupted, stopping");
        token.cancel();
    })
    .context("Failed to install signal handler")
}

/// Route diagnostics to stderr; stdout carries only command output
fn init_logging(verbose: u8) {
    fmt()
        .with_env_filter(log_filter(verbose))
        .with_target(false)
        .with_level(true)
        .with_ansi(io::stderr().is_terminal())
        .with_writer(io::stderr)
        .init();
}

fn log_filter(verbose: u8) -> EnvFilter {
    match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    }
}
