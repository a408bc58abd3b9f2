//! Keyboard-driven board view.

mod app;
mod event;
mod view;

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self as ct_event, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use log::info;
use ratatui::prelude::*;

use crate::client::{BoardClient, LocalApi};
use crate::watch;
use app::App;
use event::KeyAction;

const POLL: Duration = Duration::from_millis(250);

pub fn run(db_path: &str, api: LocalApi, board: Option<i64>) -> Result<()> {
    let mut app = App::new(BoardClient::new(api), board)?;

    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, &mut app, db_path);

    terminal::disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<LocalApi>,
    db_path: &str,
) -> Result<()> {
    let (_watcher, rx) = watch::watch_db(db_path)?;

    loop {
        terminal.draw(|frame| view::render(frame, app))?;

        if ct_event::poll(POLL)? {
            if let Event::Key(key) = ct_event::read()? {
                if key.kind == KeyEventKind::Press {
                    match event::handle_key(app, key) {
                        KeyAction::Quit => return Ok(()),
                        KeyAction::Refresh => {
                            app.client.invalidate_all();
                            app.refresh()?;
                        }
                        KeyAction::Continue => app.refresh()?,
                    }
                }
            }
        }

        // Store changes, ours included. Held while a card is in the air.
        if !app.drag.is_dragging() && watch::wait_for_change(&rx, Duration::ZERO) {
            watch::drain_events(&rx);
            info!("database changed, refetching");
            app.client.invalidate_all();
            app.refresh()?;
        }
    }
}
