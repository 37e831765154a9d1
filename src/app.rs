//! Application orchestration module
//!
//! Coordinates the event system, the pointer hub, and rendering of a single
//! root [`Component`].

use std::{
    future::Future,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use futures_lite::future::FutureExt;
use smol::Task;
use tracing::{debug, warn};

use crate::{
    component::Component,
    error::TypeaheadResult,
    event::{Event, EventHandler},
    pointer::PointerHub,
    theme::Theme,
    tui::Tui,
};

/// Core application struct managing all components
pub struct App<C: Component> {
    tui: Tui,
    component: C,
    theme: Theme,
    hub: PointerHub,
    events: Arc<EventHandler>,
    /// Upper bound on how long the loop sleeps without events
    tick_rate: Duration,
    running: AtomicBool,
    tasks: Vec<Task<TypeaheadResult<()>>>,
}

impl<C: Component> App<C> {
    /// Takes over the terminal. `hub` must be the one the component's inputs subscribe to.
    pub fn new(component: C, hub: PointerHub, theme: Theme, tick_rate: Duration) -> TypeaheadResult<Self> {
        theme.validate()?;
        let tui = Tui::new()?;

        Ok(Self {
            tui,
            component,
            theme,
            hub,
            events: Arc::new(EventHandler::new()),
            tick_rate,
            running: AtomicBool::new(true),
            tasks: Vec::new(),
        })
    }

    /// Spawns a background task
    pub fn spawn<F>(&mut self, future: F) -> TypeaheadResult<()>
    where
        F: Future<Output = TypeaheadResult<()>> + Send + 'static,
    {
        let task = smol::spawn(future);
        self.tasks.push(task);
        Ok(())
    }

    /// Runs the event loop until a quit event arrives
    pub async fn run(&mut self) -> TypeaheadResult<()> {
        let events = self.events.clone();
        let tick_rate = self.tick_rate;
        self.spawn(async move { events.run(tick_rate).await })?;

        while self.running.load(Ordering::Acquire) {
            let now = Instant::now();
            self.component.tick(now);

            let theme = &self.theme;
            let component = &mut self.component;
            self.tui
                .draw(|frame| {
                    let area = frame.area();
                    component.render(frame, area, theme)
                })?;

            let timeout = wait_time(self.component.next_deadline(), now, self.tick_rate);
            if let Some(event) = self.events.next(timeout).await? {
                self.dispatch(event)?;
                // Drain the backlog before drawing again
                while let Some(event) = self.events.try_recv()? {
                    self.dispatch(event)?;
                }
            }
        }

        self.events.stop();
        self.cleanup_tasks().await;

        Ok(())
    }

    fn dispatch(&mut self, event: Event) -> TypeaheadResult<()> {
        match event {
            _ if event.is_quit() => {
                debug!("quit requested");
                self.quit();
                return Ok(());
            }
            Event::Resize(width, height) => {
                // Open popups keep their anchor until they reopen
                self.tui.resize(width, height)?;
            }
            _ => {
                if let Some(position) = event.pointer_down() {
                    self.hub.publish(position);
                }
            }
        }
        self.component.handle_event(&event, Instant::now());
        Ok(())
    }

    pub fn quit(&self) {
        self.running.store(false, Ordering::Release);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    async fn cleanup_tasks(&mut self) {
        let tasks = std::mem::take(&mut self.tasks);
        for task in tasks {
            let result = task
                .or(async {
                    smol::Timer::after(Duration::from_secs(1)).await;
                    Ok(())
                })
                .await;
            if let Err(e) = result {
                warn!(error = %e, "task cleanup error");
            }
        }
    }

    pub fn component(&self) -> &C {
        &self.component
    }

    pub fn component_mut(&mut self) -> &mut C {
        &mut self.component
    }

    pub fn events(&self) -> &EventHandler {
        &self.events
    }

    pub fn tick_rate(&self) -> Duration {
        self.tick_rate
    }
}

/// How long to wait for input before the next tick is due
fn wait_time(deadline: Option<Instant>, now: Instant, tick_rate: Duration) -> Duration {
    match deadline {
        Some(deadline) => deadline.saturating_duration_since(now).min(tick_rate),
        None => tick_rate,
    }
}
