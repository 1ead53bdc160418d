//! Command-line interface definitions for netmotion.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use logging::LogArgs;

/// Command-line interface for the `netmotion` binary.
#[derive(Parser, Debug)]
#[command(
    name = "netmotion",
    about = "Move a scene element in response to UDP commands",
    version
)]
pub struct Cli {
    /// Logging controls shared across netmotion binaries.
    #[command(flatten)]
    pub log: LogArgs,

    /// What to do.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Listen for commands and animate the element until interrupted.
    Run(RunArgs),
    /// Validate a settings file.
    Check(CheckArgs),
    /// Send a single command datagram.
    Send(SendArgs),
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Settings file (RON). Defaults to ./netmotion.ron.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the listen address from the settings file.
    #[arg(long)]
    pub address: Option<String>,

    /// Override the listen port from the settings file.
    #[arg(long)]
    pub port: Option<u16>,
}

/// Arguments for the `check` subcommand.
#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Settings file (RON). Defaults to ./netmotion.ron.
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Print the resolved animation profiles as JSON.
    #[arg(long)]
    pub dump: bool,
}

/// Arguments for the `send` subcommand.
#[derive(Args, Debug, Clone)]
pub struct SendArgs {
    /// Command string to send.
    #[arg(value_name = "COMMAND")]
    pub command: String,

    /// Destination host.
    #[arg(long, default_value = "localhost")]
    pub address: String,

    /// Destination port.
    #[arg(long, default_value_t = 12345)]
    pub port: u16,
}
