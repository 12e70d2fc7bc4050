pub mod app;
pub mod form;
pub mod view;

use std::io::Stdout;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::domain::api::{AuthApi, TodoApi};
use crate::domain::store::SessionStore;
pub use app::App;

/// Draws and dispatches keys until the user quits. Notices clear after a few seconds.
pub async fn run<A, S>(terminal: &mut Terminal<CrosstermBackend<Stdout>>, mut app: App<A, S>) -> Result<()>
where
    A: AuthApi + TodoApi + Clone,
    S: SessionStore,
{
    let tick_rate = Duration::from_millis(200);
    let notice_ttl = Duration::from_secs(4);
    let mut last_tick = Instant::now();
    let mut notice_since: Option<Instant> = None;

    app.start().await;
    while !app.should_quit {
        terminal.draw(|f| view::draw(f, &app))?;

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                // Only presses; repeats and releases would duplicate input.
                if key.kind != KeyEventKind::Press { continue; }
                let before = app.notice.clone();
                app.handle_key(key).await;
                if app.notice.is_some() && app.notice != before {
                    notice_since = Some(Instant::now());
                }
            }
        }
        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
            if notice_since.is_some_and(|t| t.elapsed() >= notice_ttl) {
                app.notice = None;
                notice_since = None;
            }
        }
    }
    tracing::info!("quit requested");
    Ok(())
}
