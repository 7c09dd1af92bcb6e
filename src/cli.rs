use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Event-list tooling for sub-seasonal to seasonal forecast archives.
#[derive(Parser)]
#[command(
    name = "s2s",
    version,
    about = "Inspect and rewrite S2S event lists"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Merge event lists and rewrite them in canonical form.
    Normalize(NormalizeArgs),
    /// Print event counts per reftime or per winter season.
    Summary(SummaryArgs),
    /// Rename top-level keys of every record in an event list.
    RenameKey(RenameKeyArgs),
}

/// Arguments for the `normalize` subcommand.
#[derive(clap::Args)]
pub struct NormalizeArgs {
    /// Event list files to merge.
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output path. With `--split`, the stem of the per-reftime files.
    #[arg(short, long)]
    pub output: PathBuf,

    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "s2s.toml")]
    pub config: PathBuf,

    /// Write one file per reftime.
    #[arg(long)]
    pub split: bool,

    /// Key for the trigger day: `leadtime` or `days_since_init`.
    #[arg(long)]
    pub duration_key: Option<String>,
}

/// Arguments for the `summary` subcommand.
#[derive(clap::Args)]
pub struct SummaryArgs {
    /// Event list files to summarize.
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "s2s.toml")]
    pub config: PathBuf,

    /// Grouping: `reftime` or `season`.
    #[arg(long)]
    pub group_by: Option<String>,
}

/// Arguments for the `rename-key` subcommand.
#[derive(clap::Args)]
pub struct RenameKeyArgs {
    /// Event list to read.
    pub input: PathBuf,

    /// Path for the rewritten list.
    #[arg(short, long)]
    pub output: PathBuf,

    /// Rename as `old=new`. May be repeated.
    #[arg(short, long = "rename", required = true)]
    pub renames: Vec<String>,
}
