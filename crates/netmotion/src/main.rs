#![warn(missing_docs)]

//! Entry point for the `netmotion` binary.

mod check;
mod cli;
mod daemon;
mod error;
mod send;

use std::process;

use clap::Parser;
use tracing::error;

use crate::{
    cli::{Cli, Commands},
    error::Result,
};

fn main() {
    if let Err(err) = run() {
        error!("{err}");
        eprintln!("error: {}", err.pretty());
        process::exit(1);
    }
}

/// Parse CLI arguments, install logging, and dispatch to the chosen subcommand.
fn run() -> Result<()> {
    let Cli { log, command } = Cli::parse();
    logging::init(&log);

    match command {
        Commands::Run(args) => daemon::run(&args),
        Commands::Check(args) => check::run(&args),
        Commands::Send(args) => send::run(&args),
    }
}
