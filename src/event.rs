//! Event handling system
//!
//! A background task polls crossterm and forwards terminal events through a
//! bounded channel. The event loop drains that channel and hands each event
//! to the active component on its own thread.

use crossterm::event::{
    Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton,
    MouseEvent, MouseEventKind,
};
use futures_lite::future::FutureExt;
use ratatui::layout::Position;
use smol::{
    channel::{bounded, Receiver, Sender, TryRecvError},
    Timer,
};
use std::{
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};
use tracing::trace;

use crate::error::{TypeaheadError, TypeaheadResult};

/// Maximum number of pending events in the channel
const MAX_EVENTS: usize = 1024;

/// Terminal events that can occur
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Key press events
    Key(KeyEvent),
    /// Mouse interaction events
    Mouse(MouseEvent),
    /// Terminal resize events
    Resize(u16, u16),
    /// Event indicating the event loop should terminate
    Quit,
}

impl Event {
    /// Where a left-button press happened, if this is one
    pub fn pointer_down(&self) -> Option<Position> {
        match self {
            Event::Mouse(MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                column,
                row,
                ..
            }) => Some(Position::new(*column, *row)),
            _ => None,
        }
    }

    /// The key event if it is a press (repeats and releases are ignored)
    pub fn key_press(&self) -> Option<&KeyEvent> {
        match self {
            Event::Key(key) if key.kind != KeyEventKind::Release => Some(key),
            _ => None,
        }
    }

    /// Ctrl+C and Ctrl+Q end the application; plain letters are text input
    pub fn is_quit(&self) -> bool {
        match self {
            Event::Quit => true,
            Event::Key(key) => {
                key.modifiers.contains(KeyModifiers::CONTROL)
                    && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q'))
            }
            _ => false,
        }
    }
}

/// Handles event processing and distribution
#[derive(Debug)]
pub struct EventHandler {
    /// Sender for event channel
    tx: Sender<Event>,
    /// Receiver for event channel
    rx: Receiver<Event>,
    /// Flag indicating if the event handler is running
    running: AtomicBool,
}

impl EventHandler {
    /// Creates a new event handler with bounded channel
    pub fn new() -> Self {
        let (tx, rx) = bounded(MAX_EVENTS);
        Self {
            tx,
            rx,
            running: AtomicBool::new(true),
        }
    }

    /// Attempts to send an event through the channel without blocking
    pub fn try_send(&self, event: Event) -> TypeaheadResult<()> {
        self.tx
            .try_send(event)
            .map_err(|_| TypeaheadError::channel_closed("event channel", (0, 0)).into())
    }

    /// Non-blocking attempt to receive an event
    pub fn try_recv(&self) -> TypeaheadResult<Option<Event>> {
        match self.rx.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(_) => Err(TypeaheadError::channel_closed("event channel", (0, 0)).into()),
        }
    }

    /// Waits up to `timeout` for the next event
    pub async fn next(&self, timeout: Duration) -> TypeaheadResult<Option<Event>> {
        let received = async {
            match self.rx.recv().await {
                Ok(event) => Ok(Some(event)),
                Err(_) => Err(miette::Report::from(TypeaheadError::channel_closed(
                    "event channel",
                    (0, 0),
                ))),
            }
        };
        let expired = async {
            Timer::after(timeout).await;
            Ok::<_, miette::Report>(None)
        };
        received.or(expired).await
    }

    /// Polls crossterm until [`stop`](Self::stop), forwarding the events
    /// the inputs understand
    pub async fn run(&self, tick_rate: Duration) -> TypeaheadResult<()> {
        while self.is_running() {
            if let Some(event) = read_within(tick_rate)?.and_then(translate) {
                self.try_send(event)?;
            }
            smol::future::yield_now().await;
        }
        trace!("event polling stopped");
        Ok(())
    }

    /// Stops the event handler
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    /// Checks if the event handler is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// Waits up to `timeout` for a terminal event
fn read_within(timeout: Duration) -> TypeaheadResult<Option<CrosstermEvent>> {
    let ready = crossterm::event::poll(timeout).map_err(|e| {
        TypeaheadError::terminal("event polling", (0, 13), format!("Failed to poll events: {}", e))
    })?;
    if !ready {
        return Ok(None);
    }
    let event = crossterm::event::read().map_err(|e| {
        TypeaheadError::event("event reading", (0, 13), format!("Failed to read event: {}", e))
    })?;
    Ok(Some(event))
}

/// Keeps key presses and repeats, mouse input and resizes. Focus changes,
/// pastes and key releases are dropped.
fn translate(event: CrosstermEvent) -> Option<Event> {
    match event {
        CrosstermEvent::Key(key) if key.kind != KeyEventKind::Release => Some(Event::Key(key)),
        CrosstermEvent::Mouse(mouse) => Some(Event::Mouse(mouse)),
        CrosstermEvent::Resize(width, height) => Some(Event::Resize(width, height)),
        _ => None,
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}
