//! Process-wide pointer-down stream with scoped subscriptions
//!
//! The event loop publishes every mouse-down to a [`PointerHub`]. Widgets
//! that need outside-click detection hold a [`PointerSubscription`] while
//! their popup is open. Dropping the subscription deregisters it, so every
//! exit path (close, dispose, drop) releases the listener.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, MutexGuard,
    },
};

use async_channel::{bounded, Receiver, Sender, TryRecvError};
use ratatui::layout::{Position, Rect};
use tracing::{trace, warn};

/// Maximum number of undelivered pointer events per subscriber
const MAX_PENDING: usize = 64;

type Listeners = HashMap<u64, Sender<Position>>;

#[derive(Debug, Default)]
struct HubInner {
    next_id: AtomicU64,
    listeners: Mutex<Listeners>,
}

/// Fan-out point for pointer-down events
#[derive(Debug, Clone, Default)]
pub struct PointerHub {
    inner: Arc<HubInner>,
}

impl PointerHub {
    pub fn new() -> Self {
        Self::default()
    }

    fn listeners(&self) -> MutexGuard<'_, Listeners> {
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Registers a new listener. It stays registered until the returned guard is dropped.
    pub fn subscribe(&self) -> PointerSubscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::AcqRel);
        let (tx, rx) = bounded(MAX_PENDING);
        self.listeners().insert(id, tx);
        trace!(id, "pointer subscription registered");

        PointerSubscription {
            id,
            rx,
            hub: Arc::downgrade(&self.inner),
        }
    }

    /// Delivers a pointer-down at `position` to every live subscription
    pub fn publish(&self, position: Position) {
        let listeners = self.listeners();
        for (id, tx) in listeners.iter() {
            if tx.try_send(position).is_err() {
                warn!(id, "pointer subscriber is full, dropping event");
            }
        }
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.listeners().len()
    }
}

/// Registration guard returned by [`PointerHub::subscribe`]
#[derive(Debug)]
pub struct PointerSubscription {
    id: u64,
    rx: Receiver<Position>,
    hub: std::sync::Weak<HubInner>,
}

impl PointerSubscription {
    /// Drains queued events and reports whether any landed outside every rect in `inside`
    pub fn pressed_outside(&self, inside: &[Rect]) -> bool {
        let mut outside = false;
        loop {
            match self.rx.try_recv() {
                Ok(position) => {
                    if !inside.iter().any(|rect| rect.contains(position)) {
                        outside = true;
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        outside
    }
}

impl Drop for PointerSubscription {
    fn drop(&mut self) {
        if let Some(inner) = self.hub.upgrade() {
            inner
                .listeners
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .remove(&self.id);
            trace!(id = self.id, "pointer subscription released");
        }
    }
}
