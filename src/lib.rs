#![forbid(unsafe_code)]

//! # Typeahead
//!
//! Debounced, filterable text inputs for terminal UIs.
//!
//! ## Overview
//!
//! The crate is built around a few main concepts:
//!
//! - **Debounced Commits**: Keystrokes update the view immediately while value
//!   changes are delayed until typing settles
//! - **Live Filtering**: Options are narrowed by case-insensitive substring match
//!   as the user types
//! - **Scoped Outside Clicks**: Open popups subscribe to pointer presses and
//!   unsubscribe automatically when they close or drop
//! - **Async-First Loop**: Built on `smol`, sleeping only until the next
//!   debounce deadline or tick
//!
//! ## Core Components
//!
//! - [`AutoComplete`]: Single-select input with a filtered option popup
//! - [`SearchInput`]: Free-text search box emitting debounced values
//! - [`SearchState`]: Headless value/debounced-value pair for custom inputs
//! - [`Debouncer`]: Deadline-based single-slot delay
//! - [`App`]: Event loop driving one root [`Component`]
//! - [`Tui`]: Terminal interface manager handling setup, cleanup, and rendering
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use typeahead::{App, AutoComplete, AutoCompleteConfig, PointerHub, Theme};
//!
//! fn main() -> typeahead::TypeaheadResult<()> {
//!     let hub = PointerHub::new();
//!     let fruits = vec!["Apple".to_string(), "Banana".to_string(), "Cherry".to_string()];
//!
//!     let input = AutoComplete::new(fruits, AutoCompleteConfig::default())
//!         .with_pointer_hub(hub.clone())
//!         // stdout belongs to the alternate screen while the app runs
//!         .on_commit(|value| tracing::info!(value, "committed"));
//!
//!     smol::block_on(async {
//!         let mut app = App::new(input, hub, Theme::default(), Duration::from_millis(50))?;
//!         app.run().await
//!     })
//! }
//! ```
//!
//! ## Error Handling
//!
//! The library uses [`TypeaheadResult`] and [`TypeaheadError`] with detailed
//! diagnostics via `miette`.

pub use app::App;
pub use autocomplete::{AutoComplete, AutoCompleteConfig};
pub use component::Component;
pub use debounce::{Debouncer, DEFAULT_DEBOUNCE};
pub use error::{TypeaheadError, TypeaheadResult};
pub use event::{Event, EventHandler};
pub use filter::{filter, filter_indices, CaseSensitivity, OptionText, SelectOption};
pub use interaction::{Anchor, InteractionState, PopupView};
pub use pointer::{PointerHub, PointerSubscription};
pub use search::{SearchInput, SearchInputConfig, SearchState};
pub use theme::{Color, Theme};
pub use tui::Tui;

/// Event loop and lifecycle
pub mod app;
/// Filterable single-select input
pub mod autocomplete;
pub mod component;
/// Delayed single-value emission
pub mod debounce;
/// Error types and handling
pub mod error;
/// Terminal event processing
pub mod event;
pub mod filter;
pub mod interaction;
/// Outside-click subscriptions
pub mod pointer;
/// Debounced search box
pub mod search;
pub mod text;
/// Colors and styles
pub mod theme;
/// Terminal interface management
pub mod tui;
pub mod view;
