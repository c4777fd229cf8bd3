//! Terminal user interface (TUI) for mats.
//!
//! ## Entry points
//!
//! - [`run_live`]: full-screen live board driven from the keyboard.

pub mod board;

use crate::cmd::Context;
use anyhow::Result;
use board::LiveBoard;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use mats_core::clock::Clock;
use mats_core::store::StateStore;
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use std::io;

/// Execute `mats live`.
///
/// # Errors
///
/// Returns an error if the board cannot be opened, the terminal cannot be
/// switched to raw mode, or a save fails while the board is open.
pub fn run_live(ctx: &Context) -> Result<()> {
    let session = ctx.open_session()?;
    let mut board = LiveBoard::new(session, ctx.config.timer.default_minutes);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut board);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_app<B: Backend, S: StateStore, C: Clock>(
    terminal: &mut Terminal<B>,
    board: &mut LiveBoard<S, C>,
) -> Result<()> {
    loop {
        terminal.draw(|f| {
            let area = f.area();
            board.render(f, area);
        })?;

        // Sleep until the next key or the next timer poll, whichever is first.
        if event::poll(board.poll_timeout())?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            board.handle_key(key)?;
        }

        board.tick()?;

        if board.should_quit() {
            return Ok(());
        }
    }
}
