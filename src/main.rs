use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

use todo_manager::config::Config;
use todo_manager::domain::store::SessionStore;
use todo_manager::http::HttpClient;
use todo_manager::infrastructure::sqlite_store::{prepare_sqlite_file, SqliteSessionStore};
use todo_manager::ui::{self, App};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();

    // The terminal is in raw mode while we run, so logs go to a file.
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)
        .with_context(|| format!("opening log file {}", config.log_file))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();
    tracing::info!(api = %config.api_base_url, storage = %config.storage_url, "starting");

    prepare_sqlite_file(&config.storage_url)?;
    let store = SqliteSessionStore::connect(&config.storage_url).await?;
    store.init().await?;
    let api = HttpClient::new(&config.api_base_url);
    let app = App::new(api, store);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let res = ui::run(&mut terminal, app).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(e) = &res {
        tracing::error!(error = %e, "terminal loop failed");
    }
    res
}
