mod cli;
mod config;
mod convert;
mod events_cmd;
mod logging;

use std::process;

use anyhow::Result;
use clap::Parser;

use crate::cli::{Cli, Command};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Normalize(args) => events_cmd::run_normalize(args),
        Command::Summary(args) => events_cmd::run_summary(args),
        Command::RenameKey(args) => events_cmd::run_rename_key(args),
    }
}
