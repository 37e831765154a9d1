//! Debounced free-text search box and its headless state holder

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{layout::Rect, Frame};
use tracing::trace;

use crate::{
    component::Component,
    debounce::{Debouncer, DEFAULT_DEBOUNCE},
    event::Event,
    theme::Theme,
    view::{self, InputBox},
};

const SEARCH_GLYPH: &str = "⌕";
const CLEAR_GLYPH: &str = "×";

/// Search value plus its debounced copy, for hosts that draw their own input.
///
/// `value` follows every edit. `debounced_value` catches up once edits
/// stop for the configured delay.
#[derive(Debug, Clone)]
pub struct SearchState {
    value: String,
    debounced_value: String,
    debouncer: Debouncer<String>,
}

impl SearchState {
    pub fn new(initial_value: impl Into<String>, debounce: Duration) -> Self {
        let value = initial_value.into();
        Self {
            debounced_value: value.clone(),
            value,
            debouncer: Debouncer::new(debounce),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn debounced_value(&self) -> &str {
        &self.debounced_value
    }

    pub fn set_value(&mut self, value: impl Into<String>, now: Instant) {
        self.value = value.into();
        if let Some(value) = self.debouncer.schedule(self.value.clone(), now) {
            self.debounced_value = value;
        }
    }

    /// Empties both values at once
    pub fn clear(&mut self) {
        self.debouncer.cancel();
        self.value.clear();
        self.debounced_value.clear();
    }

    /// Applies a due update. Returns whether `debounced_value` changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.debouncer.poll(now) {
            Some(value) if value != self.debounced_value => {
                self.debounced_value = value;
                true
            }
            _ => false,
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }
}

impl Default for SearchState {
    fn default() -> Self {
        Self::new("", DEFAULT_DEBOUNCE)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchInputConfig {
    pub debounce: Duration,
    pub placeholder: String,
    pub show_clear: bool,
    pub disabled: bool,
}

impl Default for SearchInputConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            placeholder: "Search...".to_owned(),
            show_clear: true,
            disabled: false,
        }
    }
}

impl SearchInputConfig {
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn with_clear(mut self, show: bool) -> Self {
        self.show_clear = show;
        self
    }

    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

type TextCallback = Box<dyn FnMut(&str)>;

/// Text box that reports edits immediately through `on_input` and after a
/// quiet period through `on_change`.
///
/// In controlled mode the displayed text only changes through
/// [`set_value`](SearchInput::set_value).
pub struct SearchInput {
    config: SearchInputConfig,
    value: String,
    controlled: bool,
    focused: bool,
    debouncer: Debouncer<String>,
    area: Rect,
    clear_area: Option<Rect>,
    on_input: Option<TextCallback>,
    on_change: Option<TextCallback>,
}

impl std::fmt::Debug for SearchInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchInput")
            .field("value", &self.value)
            .field("controlled", &self.controlled)
            .field("focused", &self.focused)
            .field("pending", &self.debouncer.pending())
            .finish_non_exhaustive()
    }
}

impl SearchInput {
    /// The input owns its text
    pub fn uncontrolled(config: SearchInputConfig) -> Self {
        Self::build(config, String::new(), false)
    }

    /// The owner supplies the text through [`set_value`](Self::set_value)
    pub fn controlled(value: impl Into<String>, config: SearchInputConfig) -> Self {
        Self::build(config, value.into(), true)
    }

    fn build(config: SearchInputConfig, value: String, controlled: bool) -> Self {
        Self {
            debouncer: Debouncer::new(config.debounce),
            config,
            value,
            controlled,
            focused: false,
            area: Rect::default(),
            clear_area: None,
            on_input: None,
            on_change: None,
        }
    }

    pub fn on_input(mut self, callback: impl FnMut(&str) + 'static) -> Self {
        self.on_input = Some(Box::new(callback));
        self
    }

    pub fn on_change(mut self, callback: impl FnMut(&str) + 'static) -> Self {
        self.on_change = Some(Box::new(callback));
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_controlled(&self) -> bool {
        self.controlled
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn has_pending_change(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    /// Whether the clear affordance is shown
    pub fn shows_clear(&self) -> bool {
        self.config.show_clear && !self.value.is_empty()
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn focus(&mut self) {
        if !self.is_inert() {
            self.focused = true;
        }
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    /// Applies an edit that produced `text`
    pub fn edit(&mut self, text: impl Into<String>, now: Instant) {
        if self.is_inert() {
            return;
        }
        let text = text.into();
        if !self.controlled {
            self.value = text.clone();
        }
        if let Some(callback) = self.on_input.as_mut() {
            callback(&text);
        }
        if let Some(value) = self.debouncer.schedule(text, now) {
            self.emit_change(value);
        }
    }

    pub fn insert_char(&mut self, ch: char, now: Instant) {
        let mut text = self.value.clone();
        text.push(ch);
        self.edit(text, now);
    }

    pub fn backspace(&mut self, now: Instant) {
        if self.value.is_empty() {
            return;
        }
        let mut text = self.value.clone();
        text.pop();
        self.edit(text, now);
    }

    /// Empties the input and reports `""` right away, dropping any pending change
    pub fn clear(&mut self) {
        if self.is_inert() {
            return;
        }
        self.debouncer.cancel();
        if !self.controlled {
            self.value.clear();
        }
        self.emit_change(String::new());
    }

    pub fn tick(&mut self, now: Instant) {
        if let Some(value) = self.debouncer.poll(now) {
            self.emit_change(value);
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    pub fn dispose(&mut self) {
        self.debouncer.dispose();
        self.focused = false;
    }

    pub fn handle_event(&mut self, event: &Event, now: Instant) -> bool {
        if let Some(position) = event.pointer_down() {
            if self.clear_area.is_some_and(|rect| rect.contains(position)) {
                self.clear();
                return true;
            }
            if self.area.contains(position) {
                self.focus();
                return true;
            }
            self.blur();
            return false;
        }

        if !self.focused {
            return false;
        }
        let Some(key) = event.key_press() else {
            return false;
        };

        match key.code {
            KeyCode::Char(ch) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                self.insert_char(ch, now)
            }
            KeyCode::Backspace => self.backspace(now),
            KeyCode::Esc if self.shows_clear() => self.clear(),
            _ => return false,
        }
        true
    }

    pub fn render(&mut self, frame: &mut Frame<'_>, area: Rect, theme: &Theme) {
        let (input, _) = view::split_input(area);
        self.area = input;

        let show_clear = self.shows_clear();
        view::render_input(
            frame,
            input,
            InputBox {
                text: &self.value,
                placeholder: &self.config.placeholder,
                focused: self.focused,
                disabled: self.config.disabled,
                trailing: show_clear.then_some(CLEAR_GLYPH),
                leading: Some(SEARCH_GLYPH),
            },
            theme,
        );

        // Clear glyph sits just inside the right border
        self.clear_area = (show_clear && input.width > 2 && input.height > 2).then(|| Rect {
            x: input.right() - 2,
            y: input.y + 1,
            width: 1,
            height: 1,
        });
    }

    fn is_inert(&self) -> bool {
        self.config.disabled || self.debouncer.is_disposed()
    }

    fn emit_change(&mut self, value: String) {
        trace!(value = %value, "search change");
        if let Some(callback) = self.on_change.as_mut() {
            callback(&value);
        }
    }
}

impl Component for SearchInput {
    fn handle_event(&mut self, event: &Event, now: Instant) -> bool {
        SearchInput::handle_event(self, event, now)
    }

    fn tick(&mut self, now: Instant) {
        SearchInput::tick(self, now)
    }

    fn render(&mut self, frame: &mut Frame<'_>, area: Rect, theme: &Theme) {
        SearchInput::render(self, frame, area, theme)
    }

    fn next_deadline(&self) -> Option<Instant> {
        SearchInput::next_deadline(self)
    }
}
