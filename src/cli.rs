use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Local-first task manager.
/// Storage defaults to ~/.taskflow/taskflow-storage.json or a path passed via --db.
#[derive(Parser)]
#[command(name = "tf", version, about = "Inbox, today and upcoming tasks from the terminal")]
pub struct Cli {
    /// Path to the JSON snapshot file.
    #[arg(long, global = true, env = "TASKFLOW_DB")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}
