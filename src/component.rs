//! The interface the event loop drives

use std::time::Instant;

use ratatui::{layout::Rect, Frame};

use crate::{event::Event, theme::Theme};

/// Something that can live inside [`App`](crate::App).
///
/// All methods run on the event loop's thread, one at a time.
pub trait Component {
    /// Reacts to a terminal event. Returns whether the event was consumed.
    fn handle_event(&mut self, event: &Event, now: Instant) -> bool;

    /// Advances timers. Called once per loop iteration.
    fn tick(&mut self, now: Instant);

    fn render(&mut self, frame: &mut Frame<'_>, area: Rect, theme: &Theme);

    /// The earliest instant at which [`tick`](Self::tick) has work to do
    fn next_deadline(&self) -> Option<Instant> {
        None
    }
}
