//! Terminal setup and teardown around the dashboard.

use std::io;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::CrosstermBackend, Terminal};
use tracing::debug;

use crate::config::Config;
use crate::error::Result;
use crate::store::TaskStore;
use crate::tui::app::App;

/// Take over the terminal, run the dashboard until the user quits, then
/// restore the terminal even if the loop failed.
pub fn run_tui(store: TaskStore, config: &Config) -> Result<()> {
    debug!(path = %store.path().display(), "starting dashboard");
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(store, config.user_id.clone());
    let result = app.run(&mut terminal);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}
