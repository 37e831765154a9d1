//! Terminal setup and teardown
//!
//! Enters raw mode and the alternate screen with mouse capture and a hidden
//! cursor on creation. Inputs show the cursor again by placing it while
//! focused. Everything is restored when the guard drops.

use std::io::{self, Stdout, Write};

use crossterm::{
    cursor::{Hide, Show},
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Rect, Size},
    Frame, Terminal,
};
use tracing::{debug, warn};

use crate::error::{TypeaheadError, TypeaheadResult};

/// Terminal user interface manager
pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// Viewport the last frame was drawn into
    area: Rect,
}

/// Maps an io failure during `stage` onto a terminal diagnostic
fn terminal_error(stage: &'static str, what: &'static str) -> impl FnOnce(io::Error) -> TypeaheadError {
    move |e| TypeaheadError::terminal(stage, (0, stage.len()), format!("{}: {}", what, e))
}

fn enter_screen(out: &mut impl Write) -> io::Result<()> {
    execute!(out, EnterAlternateScreen, EnableMouseCapture, Hide)
}

fn leave_screen(out: &mut impl Write) -> io::Result<()> {
    execute!(out, LeaveAlternateScreen, DisableMouseCapture, Show)
}

/// Resizes `terminal` to `size` unless `area` already matches.
/// Returns whether the viewport changed.
fn fit_viewport<B: Backend>(terminal: &mut Terminal<B>, area: &mut Rect, size: Size) -> io::Result<bool> {
    let next = Rect::new(0, 0, size.width, size.height);
    if next == *area {
        return Ok(false);
    }
    terminal.resize(next)?;
    debug!(width = size.width, height = size.height, "viewport resized");
    *area = next;
    Ok(true)
}

impl Tui {
    /// Takes over the terminal
    pub fn new() -> TypeaheadResult<Self> {
        if !Self::is_real_terminal() {
            return Err(TypeaheadError::terminal(
                "terminal check",
                (0, 0),
                "Not a real terminal or terminal capabilities not available",
            )
            .into());
        }

        let mut stdout = io::stdout();
        enter_screen(&mut stdout).map_err(terminal_error("terminal setup", "Failed to enter alternate screen"))?;
        terminal::enable_raw_mode().map_err(terminal_error("terminal setup", "Failed to enable raw mode"))?;

        let terminal = Terminal::new(CrosstermBackend::new(stdout))
            .map_err(terminal_error("terminal setup", "Failed to create terminal"))?;
        let mut tui = Self {
            terminal,
            area: Rect::default(),
        };
        let size = tui.size()?;
        tui.resize(size.width, size.height)?;
        Ok(tui)
    }

    /// Check if we're in a real terminal
    fn is_real_terminal() -> bool {
        if !atty::is(atty::Stream::Stdout) {
            return false;
        }

        match std::env::var("TERM") {
            Ok(term) => term != "dumb",
            Err(_) => false,
        }
    }

    fn restore_terminal(&mut self) -> TypeaheadResult<()> {
        terminal::disable_raw_mode().map_err(terminal_error("terminal cleanup", "Failed to disable raw mode"))?;
        leave_screen(self.terminal.backend_mut())
            .map_err(terminal_error("terminal cleanup", "Failed to restore terminal"))?;
        Ok(())
    }

    /// Draws one frame
    pub fn draw<F>(&mut self, render_fn: F) -> TypeaheadResult<()>
    where
        F: FnOnce(&mut Frame<'_>),
    {
        self.terminal
            .draw(render_fn)
            .map_err(terminal_error("rendering", "Failed to render frame"))?;
        Ok(())
    }

    /// Current size reported by the terminal
    pub fn size(&self) -> TypeaheadResult<Size> {
        Ok(self
            .terminal
            .size()
            .map_err(terminal_error("terminal size", "Failed to get terminal size"))?)
    }

    /// Adopts a new terminal size, clearing the screen if it changed
    pub fn resize(&mut self, width: u16, height: u16) -> TypeaheadResult<bool> {
        Ok(fit_viewport(&mut self.terminal, &mut self.area, Size::new(width, height))
            .map_err(terminal_error("terminal resize", "Failed to resize viewport"))?)
    }

    /// Viewport the next frame is drawn into
    pub fn area(&self) -> Rect {
        self.area
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        if let Err(e) = self.restore_terminal() {
            warn!(error = %e, "failed to restore terminal");
        }
    }
}
