//! # taskflow - local-first task manager
//!
//! A single-user task manager that keeps everything in one JSON snapshot on
//! this machine. Tasks are grouped into views:
//!
//! - **Inbox**: open tasks that belong to no project
//! - **Today**: open tasks due during the current local day
//! - **Upcoming**: open tasks due from tomorrow on
//! - **Project** / **Calendar**: every task
//!
//! ## Quick Start
//!
//! ```bash
//! # Launch the dashboard (Ctrl+K opens quick add)
//! tf ui
//!
//! # Capture a task from the shell
//! tf add "Pay rent" --due "today 18:00" --priority high
//!
//! # What is due today?
//! tf list --view today
//! ```
//!
//! Data lives in `~/.taskflow/taskflow-storage.json`; `--db` or
//! `TASKFLOW_DB` points elsewhere. Set `RUST_LOG=tf=debug` to trace
//! store mutations on stderr.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub mod cli;
pub mod cmd;
pub mod config;
pub mod db;
pub mod error;
pub mod fields;
pub mod project;
pub mod store;
pub mod tag;
pub mod task;
pub mod util;
pub mod view;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod enums;
    pub mod input;
    pub mod quick_add;
    pub mod run;
    pub mod utils;
}

use cli::Cli;
use cmd::*;
use config::{default_data_dir, Config};
use store::TaskStore;

fn init_tracing() {
    // Opt-in via RUST_LOG; an invalid filter just leaves logging off.
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|raw| EnvFilter::try_new(raw.trim()).ok())
        .unwrap_or_else(|| EnvFilter::new("off"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let data_dir = default_data_dir();
    let config = Config::load_or_default(&data_dir);
    let db_path = cli.db.clone().unwrap_or_else(|| config.storage_path(&data_dir));
    let mut store = TaskStore::open(&db_path);

    let result = match cli.command {
        Commands::Ui => cmd_ui(store, &config),

        Commands::Add { title, desc, project, tags, due, priority, status, order, recurrence, assignee } =>
            cmd_add(&mut store, &config, title, desc, project, tags, due, priority, status, order,
                    recurrence, assignee),

        Commands::List { view, search, priority, status, tags, from, to, no_filters, limit } =>
            cmd_list(&store, view, search, priority, status, tags, from, to, no_filters, limit),

        Commands::Show { id } => cmd_show(&store, id),

        Commands::Update {
            id, title, desc, clear_desc, project, clear_project, due, clear_due, priority,
            status, order, recurrence, clear_recurrence, assignee, clear_assignee, add_tags, rm_tags,
        } => cmd_update(&mut store, id, title, desc, clear_desc, project, clear_project, due,
                        clear_due, priority, status, order, recurrence, clear_recurrence,
                        assignee, clear_assignee, add_tags, rm_tags),

        Commands::Toggle { id } => cmd_toggle(&mut store, id),

        Commands::Delete { id } => cmd_delete(&mut store, id),

        Commands::Reorder { ids } => cmd_reorder(&mut store, ids),

        Commands::View { view, project } => cmd_view(&mut store, view, project),

        Commands::Filter { action } => cmd_filter(&mut store, action),

        Commands::Project { action } => cmd_project(&mut store, &config, action),

        Commands::Tag { action } => cmd_tag(&mut store, &config, action),

        Commands::Subtask { action } => cmd_subtask(&mut store, action),

        Commands::Completions { shell } => {
            cmd_completions(shell);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
