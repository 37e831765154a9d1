//! Debounced, filterable single-select input
//!
//! Typing updates the visible option list immediately and reports the raw
//! text through `on_query_change`. Commits go through one [`Debouncer`] and
//! are only produced for text that resolves to a value: an option whose
//! label matches exactly, or any text when custom values are allowed.
//! Leaving the input with unresolvable text reverts it to the last
//! committed value.

use std::{collections::HashMap, fmt, time::Duration, time::Instant};

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph},
    Frame,
};
use tracing::{debug, trace, warn};

use crate::{
    component::Component,
    debounce::{Debouncer, DEFAULT_DEBOUNCE},
    event::Event,
    filter::{filter_indices, CaseSensitivity, OptionText},
    interaction::{Anchor, InteractionState, PopupView},
    pointer::{PointerHub, PointerSubscription},
    text::{display_width, truncate_with_ellipsis, wrap},
    theme::{Color, Theme},
    view::{self, InputBox, PopupLayout},
};

const EMPTY_LABEL: &str = "No options";

/// Behavior switches for [`AutoComplete`]
#[derive(Debug, Clone, PartialEq)]
pub struct AutoCompleteConfig {
    pub debounce: Duration,
    pub filter_enabled: bool,
    pub allow_custom_value: bool,
    pub case_sensitivity: CaseSensitivity,
    pub placeholder: String,
    pub disabled: bool,
}

impl Default for AutoCompleteConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            filter_enabled: true,
            allow_custom_value: false,
            case_sensitivity: CaseSensitivity::Insensitive,
            placeholder: "Select".to_owned(),
            disabled: false,
        }
    }
}

impl AutoCompleteConfig {
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_filter(mut self, enabled: bool) -> Self {
        self.filter_enabled = enabled;
        self
    }

    pub fn with_custom_values(mut self, allowed: bool) -> Self {
        self.allow_custom_value = allowed;
        self
    }

    pub fn with_case_sensitivity(mut self, case: CaseSensitivity) -> Self {
        self.case_sensitivity = case;
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

type TextCallback = Box<dyn FnMut(&str)>;
type SelectCallback<O> = Box<dyn FnMut(&O, usize)>;

struct Callbacks<O> {
    query_change: Option<TextCallback>,
    commit: Option<TextCallback>,
    option_select: Option<SelectCallback<O>>,
}

impl<O> Default for Callbacks<O> {
    fn default() -> Self {
        Self {
            query_change: None,
            commit: None,
            option_select: None,
        }
    }
}

/// Single-select text input with a filtered suggestion popup
pub struct AutoComplete<O: OptionText = String> {
    config: AutoCompleteConfig,
    options: Vec<O>,
    colors: HashMap<String, Color>,
    query: String,
    committed: String,
    /// Positions in `options` shown for the current query
    visible: Vec<usize>,
    /// Position in `visible` of the keyboard highlight
    highlight: Option<usize>,
    scroll: usize,
    state: InteractionState,
    focused: bool,
    fetching: bool,
    error: Option<String>,
    debouncer: Debouncer<String>,
    hub: Option<PointerHub>,
    pointer: Option<PointerSubscription>,
    area: Rect,
    popup: Option<PopupLayout>,
    callbacks: Callbacks<O>,
}

impl<O: OptionText> fmt::Debug for AutoComplete<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutoComplete")
            .field("query", &self.query)
            .field("committed", &self.committed)
            .field("state", &self.state)
            .field("focused", &self.focused)
            .field("visible", &self.visible)
            .field("pending", &self.debouncer.pending())
            .finish_non_exhaustive()
    }
}

impl<O: OptionText> AutoComplete<O> {
    pub fn new(options: Vec<O>, config: AutoCompleteConfig) -> Self {
        let mut autocomplete = Self {
            debouncer: Debouncer::new(config.debounce),
            config,
            options,
            colors: HashMap::new(),
            query: String::new(),
            committed: String::new(),
            visible: Vec::new(),
            highlight: None,
            scroll: 0,
            state: InteractionState::Closed,
            focused: false,
            fetching: false,
            error: None,
            hub: None,
            pointer: None,
            area: Rect::default(),
            popup: None,
            callbacks: Callbacks::default(),
        };
        autocomplete.refilter();
        autocomplete
    }

    /// Seeds the committed value for uncontrolled use
    pub fn with_initial_value(mut self, value: impl Into<String>) -> Self {
        self.committed = value.into();
        self.query = self.label_for(&self.committed);
        self.refilter();
        self
    }

    /// Enables outside-click detection through `hub`
    pub fn with_pointer_hub(mut self, hub: PointerHub) -> Self {
        self.hub = Some(hub);
        self
    }

    /// Text colors for options as `#rrggbb` strings, keyed by option value.
    /// Entries that do not parse are skipped.
    pub fn with_colors<I, K, V>(mut self, colors: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        self.colors = colors
            .into_iter()
            .filter_map(|(value, hex)| {
                let value: String = value.into();
                match Color::from_hex(hex.as_ref()) {
                    Some(color) => Some((value, color)),
                    None => {
                        warn!(value = %value, color = hex.as_ref(), "ignoring unparsable option color");
                        None
                    }
                }
            })
            .collect();
        self
    }

    /// Called with the raw text on every edit, before any debouncing
    pub fn on_query_change(mut self, callback: impl FnMut(&str) + 'static) -> Self {
        self.callbacks.query_change = Some(Box::new(callback));
        self
    }

    /// Called with the committed value
    pub fn on_commit(mut self, callback: impl FnMut(&str) + 'static) -> Self {
        self.callbacks.commit = Some(Box::new(callback));
        self
    }

    /// Called with the chosen option and its row in the filtered list
    pub fn on_option_select(mut self, callback: impl FnMut(&O, usize) + 'static) -> Self {
        self.callbacks.option_select = Some(Box::new(callback));
        self
    }

    pub fn config(&self) -> &AutoCompleteConfig {
        &self.config
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn committed(&self) -> &str {
        &self.committed
    }

    pub fn options(&self) -> &[O] {
        &self.options
    }

    /// Positions in [`options`](Self::options) currently shown
    pub fn visible_indices(&self) -> &[usize] {
        &self.visible
    }

    pub fn visible_options(&self) -> Vec<&O> {
        self.visible.iter().map(|&index| &self.options[index]).collect()
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn highlighted(&self) -> Option<&O> {
        self.highlight
            .and_then(|pos| self.visible.get(pos))
            .map(|&index| &self.options[index])
    }

    pub fn has_pending_commit(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// What the popup would show right now
    pub fn popup_view(&self) -> PopupView {
        if !self.state.is_open() || self.fetching {
            PopupView::Hidden
        } else if self.visible.is_empty() {
            PopupView::Empty
        } else {
            PopupView::Options
        }
    }

    /// Rectangle of the input line, as last rendered
    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn set_area(&mut self, area: Rect) {
        self.area = area;
    }

    pub fn popup_layout(&self) -> Option<&PopupLayout> {
        self.popup.as_ref()
    }

    /// Controlled-mode sync: adopts a value supplied by the owner.
    ///
    /// The query and popup are reset and any pending commit is dropped. No
    /// callback fires, since the owner already knows the value.
    pub fn set_value(&mut self, value: impl Into<String>) {
        let value = value.into();
        if value == self.committed {
            return;
        }
        debug!(value = %value, "autocomplete value replaced by owner");
        self.debouncer.cancel();
        self.committed = value;
        self.query = self.label_for(&self.committed);
        self.close();
        self.refilter();
    }

    pub fn set_options(&mut self, options: Vec<O>) {
        self.options = options;
        self.refilter();
    }

    /// Hides the popup while options are being loaded
    pub fn set_fetching(&mut self, fetching: bool) {
        self.fetching = fetching;
    }

    pub fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.config.disabled = disabled;
        if disabled {
            self.debouncer.cancel();
            self.focused = false;
            self.close();
        }
    }

    pub fn focus(&mut self) {
        if self.is_inert() {
            return;
        }
        self.focused = true;
        self.open();
    }

    /// Leaves the input, committing or reverting the typed text
    pub fn blur(&mut self, _now: Instant) {
        if !self.focused {
            return;
        }
        self.focused = false;
        self.debouncer.cancel();

        match self.resolve(&self.query) {
            Some(value) => {
                if value != self.committed {
                    self.commit(value);
                }
            }
            None => {
                trace!(query = %self.query, "reverting unresolved text");
                self.query = self.label_for(&self.committed);
            }
        }

        self.close();
        self.refilter();
    }

    /// Replaces the typed text
    pub fn set_query(&mut self, text: impl Into<String>, now: Instant) {
        if self.is_inert() {
            return;
        }
        self.query = text.into();
        self.refilter();

        if let Some(callback) = self.callbacks.query_change.as_mut() {
            callback(&self.query);
        }

        if !self.query.is_empty() {
            self.open();
        }

        match self.resolve(&self.query) {
            Some(value) => {
                if let Some(value) = self.debouncer.schedule(value, now) {
                    self.commit(value);
                }
            }
            None => {
                self.debouncer.cancel();
            }
        }
    }

    pub fn insert_char(&mut self, ch: char, now: Instant) {
        let mut text = self.query.clone();
        text.push(ch);
        self.set_query(text, now);
    }

    pub fn backspace(&mut self, now: Instant) {
        if self.query.is_empty() {
            return;
        }
        let mut text = self.query.clone();
        text.pop();
        self.set_query(text, now);
    }

    pub fn escape(&mut self) {
        self.close();
    }

    /// Moves the keyboard highlight, wrapping at both ends. Opens the popup
    /// first if it is closed.
    pub fn move_highlight(&mut self, delta: isize) {
        if !self.state.is_open() {
            self.open();
            return;
        }
        let len = self.visible.len();
        if len == 0 {
            self.highlight = None;
            return;
        }
        let next = match self.highlight {
            None if delta >= 0 => 0,
            None => len - 1,
            Some(current) => (current as isize + delta).rem_euclid(len as isize) as usize,
        };
        self.highlight = Some(next);
    }

    /// Selects the highlighted option, if the popup shows one
    pub fn select_highlighted(&mut self) -> bool {
        match (self.state.is_open(), self.highlight) {
            (true, Some(pos)) => self.select_visible(pos),
            _ => false,
        }
    }

    /// Selects the `pos`-th visible option, bypassing the debounce.
    ///
    /// Any pending commit is cancelled so it cannot overwrite the selection.
    /// `on_option_select` receives `pos`, the row's position in the filtered list.
    pub fn select_visible(&mut self, pos: usize) -> bool {
        if self.is_inert() {
            return false;
        }
        let Some(index) = self.visible.get(pos).copied() else {
            return false;
        };
        self.debouncer.cancel();

        let option = &self.options[index];
        self.query = option.label().to_owned();
        self.committed = option.value().to_owned();
        debug!(pos, index, value = %self.committed, "option selected");

        self.close();
        self.refilter();

        if let Some(callback) = self.callbacks.option_select.as_mut() {
            callback(&self.options[index], pos);
        }
        if let Some(callback) = self.callbacks.commit.as_mut() {
            callback(&self.committed);
        }
        true
    }

    /// Fires a due commit and applies outside clicks
    pub fn tick(&mut self, now: Instant) {
        self.check_outside(now);
        if let Some(value) = self.debouncer.poll(now) {
            self.commit(value);
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Tears the input down. No callback fires afterwards.
    pub fn dispose(&mut self) {
        self.debouncer.dispose();
        self.focused = false;
        self.close();
    }

    pub fn handle_event(&mut self, event: &Event, now: Instant) -> bool {
        self.check_outside(now);

        if let Some(position) = event.pointer_down() {
            if let Some(pos) = self.popup.as_ref().and_then(|p| p.option_at(position)) {
                self.select_visible(pos);
                return true;
            }
            if self.popup.as_ref().is_some_and(|p| p.rect.contains(position)) {
                return true;
            }
            if self.area.contains(position) {
                self.focus();
                return true;
            }
            // Applies whether or not a hub delivered this press
            if self.focused || self.state.is_open() {
                trace!("pointer pressed outside autocomplete");
                self.close();
                self.blur(now);
            }
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
            KeyCode::Esc => self.escape(),
            KeyCode::Down => self.move_highlight(1),
            KeyCode::Up => self.move_highlight(-1),
            KeyCode::Enter => {
                self.select_highlighted();
            }
            _ => return false,
        }
        true
    }

    pub fn render(&mut self, frame: &mut Frame<'_>, area: Rect, theme: &Theme) {
        let (input, below) = view::split_input(area);
        self.area = input;

        view::render_input(
            frame,
            input,
            InputBox {
                text: &self.query,
                placeholder: &self.config.placeholder,
                focused: self.focused,
                disabled: self.config.disabled,
                trailing: Some("▾"),
                leading: None,
            },
            theme,
        );
        view::render_message(frame, below, self.error.as_deref(), theme.error());

        self.popup = match (self.popup_view(), self.state.anchor()) {
            (PopupView::Hidden, _) | (_, None) => None,
            (popup_view, Some(anchor)) => Some(self.render_popup(frame, anchor, popup_view, theme)),
        };
    }

    fn render_popup(
        &mut self,
        frame: &mut Frame<'_>,
        anchor: Anchor,
        popup_view: PopupView,
        theme: &Theme,
    ) -> PopupLayout {
        let max_rows = theme.max_rows() as usize;
        let max_width = theme.max_width().max(anchor.width());

        let content_width = match popup_view {
            PopupView::Empty => display_width(EMPTY_LABEL),
            _ => self
                .visible
                .iter()
                .map(|&index| display_width(self.options[index].label()))
                .max()
                .unwrap_or(0),
        };
        let content_width = u16::try_from(content_width)
            .unwrap_or(u16::MAX)
            .saturating_add(2);
        let width = content_width.clamp(anchor.width().min(max_width), max_width);
        let inner_width = width.saturating_sub(2) as usize;

        let pieces: Vec<Vec<String>> = self
            .visible
            .iter()
            .map(|&index| {
                let label = self.options[index].label();
                if label.chars().count() > theme.long_label_chars {
                    wrap(label, inner_width)
                } else {
                    vec![truncate_with_ellipsis(label, inner_width)]
                }
            })
            .collect();

        if let Some(highlight) = self.highlight {
            let heights: Vec<usize> = pieces.iter().map(Vec::len).collect();
            self.scroll = scroll_to_fit(&heights, self.scroll, highlight, max_rows);
        }

        let mut lines: Vec<Line<'static>> = Vec::new();
        let mut rows: Vec<Option<usize>> = Vec::new();
        if popup_view == PopupView::Empty {
            lines.push(Line::from(Span::styled(EMPTY_LABEL, theme.muted())));
            rows.push(None);
        }

        for (pos, (&index, option_pieces)) in self.visible.iter().zip(pieces).enumerate().skip(self.scroll) {
            if rows.len() >= max_rows {
                break;
            }
            let option = &self.options[index];
            let style = theme.option(
                option.value() == self.committed,
                self.highlight == Some(pos),
                self.colors.get(option.value()).copied(),
            );

            for piece in option_pieces {
                if rows.len() >= max_rows {
                    break;
                }
                let padded = format!("{:<width$}", piece, width = inner_width);
                lines.push(Line::from(Span::styled(padded, style)));
                rows.push(Some(pos));
            }
        }

        let rect = view::place_popup(anchor.rect, width, rows.len() as u16 + 2, frame.area());
        frame.render_widget(Clear, rect);
        frame.render_widget(
            Paragraph::new(lines).block(
                Block::bordered()
                    .style(theme.popup())
                    .border_style(theme.border(true)),
            ),
            rect,
        );

        rows.truncate(rect.height.saturating_sub(2) as usize);
        PopupLayout { rect, rows }
    }

    fn open(&mut self) {
        if self.is_inert() || self.state.is_open() {
            return;
        }
        let anchor = Anchor { rect: self.area };
        self.state = InteractionState::Open { anchor };
        self.pointer = self.hub.as_ref().map(PointerHub::subscribe);
        self.highlight = None;
        self.scroll = 0;
        debug!(width = anchor.width(), "autocomplete opened");
    }

    fn close(&mut self) {
        if self.state.is_open() {
            debug!("autocomplete closed");
        }
        self.state = InteractionState::Closed;
        self.pointer = None;
        self.popup = None;
        self.highlight = None;
        self.scroll = 0;
    }

    fn check_outside(&mut self, now: Instant) {
        let outside = match &self.pointer {
            Some(pointer) => {
                let mut inside = vec![self.area];
                if let Some(popup) = &self.popup {
                    inside.push(popup.rect);
                }
                pointer.pressed_outside(&inside)
            }
            None => false,
        };
        if outside {
            trace!("pointer pressed outside autocomplete");
            self.close();
            self.blur(now);
        }
    }

    /// Disabled or disposed inputs ignore user interaction
    fn is_inert(&self) -> bool {
        self.config.disabled || self.debouncer.is_disposed()
    }

    fn commit(&mut self, value: String) {
        trace!(value = %value, "commit");
        self.committed = value;
        if let Some(callback) = self.callbacks.commit.as_mut() {
            callback(&self.committed);
        }
    }

    fn refilter(&mut self) {
        self.visible = if self.config.filter_enabled {
            filter_indices(&self.options, &self.query, self.config.case_sensitivity)
        } else {
            (0..self.options.len()).collect()
        };
        self.highlight = None;
        self.scroll = 0;
    }

    /// The value `text` would commit, if it is acceptable
    fn resolve(&self, text: &str) -> Option<String> {
        match self.options.iter().find(|option| option.label() == text) {
            Some(option) => Some(option.value().to_owned()),
            None if self.config.allow_custom_value => Some(text.to_owned()),
            None => None,
        }
    }

    fn label_for(&self, value: &str) -> String {
        self.options
            .iter()
            .find(|option| option.value() == value)
            .map(|option| option.label().to_owned())
            .unwrap_or_else(|| value.to_owned())
    }
}

/// First option to draw so that option `highlight` fits entirely within
/// `max_rows` rows, given the row count of each option.
fn scroll_to_fit(heights: &[usize], scroll: usize, highlight: usize, max_rows: usize) -> usize {
    if highlight >= heights.len() {
        return scroll;
    }
    if highlight < scroll {
        return highlight;
    }
    let mut scroll = scroll;
    while scroll < highlight && heights[scroll..=highlight].iter().sum::<usize>() > max_rows {
        scroll += 1;
    }
    scroll
}

impl<O: OptionText> Component for AutoComplete<O> {
    fn handle_event(&mut self, event: &Event, now: Instant) -> bool {
        AutoComplete::handle_event(self, event, now)
    }

    fn tick(&mut self, now: Instant) {
        AutoComplete::tick(self, now)
    }

    fn render(&mut self, frame: &mut Frame<'_>, area: Rect, theme: &Theme) {
        AutoComplete::render(self, frame, area, theme)
    }

    fn next_deadline(&self) -> Option<Instant> {
        AutoComplete::next_deadline(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::SelectOption;
    use crossterm::event::{KeyEvent, MouseButton, MouseEvent, MouseEventKind};
    use pretty_assertions::assert_eq;
    use ratatui::{backend::TestBackend, layout::Position, Terminal};
    use std::{cell::RefCell, rc::Rc};

    type Log = Rc<RefCell<Vec<String>>>;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn fruits() -> Vec<String> {
        vec!["Apple".to_string(), "Banana".to_string(), "Grape".to_string()]
    }

    struct Spies {
        queries: Log,
        commits: Log,
        selects: Rc<RefCell<Vec<(String, usize)>>>,
    }

    fn spied(options: Vec<String>, config: AutoCompleteConfig) -> (AutoComplete, Spies) {
        let spies = Spies {
            queries: Log::default(),
            commits: Log::default(),
            selects: Rc::default(),
        };
        let queries = spies.queries.clone();
        let commits = spies.commits.clone();
        let selects = spies.selects.clone();
        let autocomplete = AutoComplete::new(options, config)
            .on_query_change(move |q| queries.borrow_mut().push(q.to_string()))
            .on_commit(move |v| commits.borrow_mut().push(v.to_string()))
            .on_option_select(move |o: &String, i| selects.borrow_mut().push((o.clone(), i)));
        (autocomplete, spies)
    }

    fn type_text(ac: &mut AutoComplete, text: &str, start: Instant, step: Duration) -> Instant {
        let mut now = start;
        for ch in text.chars() {
            ac.insert_char(ch, now);
            now += step;
        }
        now - step
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::empty()))
    }

    fn click(x: u16, y: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: x,
            row: y,
            modifiers: KeyModifiers::empty(),
        })
    }

    fn screen(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn test_starts_closed_with_all_options() {
        let ac: AutoComplete = AutoComplete::new(fruits(), AutoCompleteConfig::default());
        assert_eq!(ac.state(), InteractionState::Closed);
        assert_eq!(ac.visible_indices(), &[0, 1, 2]);
        assert_eq!(ac.popup_view(), PopupView::Hidden);
    }

    #[test]
    fn test_focus_opens_with_anchor() {
        let mut ac: AutoComplete = AutoComplete::new(fruits(), AutoCompleteConfig::default());
        ac.set_area(Rect::new(2, 1, 24, 3));
        ac.focus();

        assert!(ac.is_focused());
        assert_eq!(
            ac.state().anchor(),
            Some(Anchor {
                rect: Rect::new(2, 1, 24, 3)
            })
        );

        // Anchor is not re-measured while open
        ac.set_area(Rect::new(0, 0, 60, 3));
        assert_eq!(ac.state().anchor().map(|a| a.width()), Some(24));
    }

    #[test]
    fn test_typing_filters_synchronously() {
        let (mut ac, spies) = spied(fruits(), AutoCompleteConfig::default());
        let now = Instant::now();

        ac.insert_char('a', now);
        ac.insert_char('n', now);

        assert!(ac.is_open());
        assert_eq!(ac.visible_options(), vec!["Banana"]);
        assert_eq!(*spies.queries.borrow(), vec!["a", "an"]);
        assert!(spies.commits.borrow().is_empty());
    }

    #[test]
    fn test_empty_results_show_affordance() {
        let mut ac: AutoComplete = AutoComplete::new(
            vec!["Red".into(), "Green".into(), "Blue".into()],
            AutoCompleteConfig::default(),
        );
        ac.set_query("z", Instant::now());

        assert!(ac.visible_indices().is_empty());
        assert_eq!(ac.popup_view(), PopupView::Empty);

        let mut terminal = Terminal::new(TestBackend::new(40, 10)).unwrap();
        terminal
            .draw(|frame| ac.render(frame, Rect::new(0, 0, 30, 3), &Theme::default()))
            .unwrap();
        assert!(screen(&terminal).contains(EMPTY_LABEL));
    }

    #[test]
    fn test_filter_disabled_shows_everything() {
        let mut ac: AutoComplete =
            AutoComplete::new(fruits(), AutoCompleteConfig::default().with_filter(false));
        ac.set_query("zzz", Instant::now());
        assert_eq!(ac.visible_indices(), &[0, 1, 2]);
        assert_eq!(ac.popup_view(), PopupView::Options);
    }

    #[test]
    fn test_debounced_commit_fires_once_with_last_value() {
        let config = AutoCompleteConfig::default()
            .with_custom_values(true)
            .with_debounce(ms(100));
        let (mut ac, spies) = spied(fruits(), config);
        let start = Instant::now();

        let last = type_text(&mut ac, "Gra", start, ms(20));
        ac.tick(last + ms(99));
        assert!(spies.commits.borrow().is_empty());

        ac.tick(last + ms(100));
        assert_eq!(*spies.commits.borrow(), vec!["Gra"]);

        ac.tick(last + ms(1000));
        assert_eq!(spies.commits.borrow().len(), 1);
        assert_eq!(ac.committed(), "Gra");
    }

    #[test]
    fn test_exact_match_commit_is_debounced() {
        let (mut ac, spies) = spied(fruits(), AutoCompleteConfig::default().with_debounce(ms(50)));
        let start = Instant::now();

        let last = type_text(&mut ac, "Apple", start, ms(5));
        assert!(spies.commits.borrow().is_empty());
        assert!(ac.has_pending_commit());

        ac.tick(last + ms(50));
        assert_eq!(*spies.commits.borrow(), vec!["Apple"]);
    }

    #[test]
    fn test_unresolved_text_cancels_pending_commit() {
        let (mut ac, spies) = spied(fruits(), AutoCompleteConfig::default().with_debounce(ms(50)));
        let start = Instant::now();

        ac.set_query("Apple", start);
        assert!(ac.has_pending_commit());
        ac.set_query("Apple!", start + ms(10));
        assert!(!ac.has_pending_commit());

        ac.tick(start + ms(500));
        assert!(spies.commits.borrow().is_empty());
    }

    #[test]
    fn test_zero_delay_commits_synchronously() {
        let config = AutoCompleteConfig::default()
            .with_custom_values(true)
            .with_debounce(Duration::ZERO);
        let (mut ac, spies) = spied(fruits(), config);

        type_text(&mut ac, "ab", Instant::now(), ms(1));
        assert_eq!(*spies.commits.borrow(), vec!["a", "ab"]);
    }

    #[test]
    fn test_blur_reverts_free_text() {
        let (ac, spies) = spied(fruits(), AutoCompleteConfig::default());
        let mut ac = ac.with_initial_value("Banana");
        let now = Instant::now();

        ac.focus();
        ac.set_query("Appl", now);
        ac.blur(now + ms(10));

        assert_eq!(ac.query(), "Banana");
        assert_eq!(ac.committed(), "Banana");
        assert!(spies.commits.borrow().is_empty());
        assert!(!ac.is_open());

        ac.tick(now + ms(10_000));
        assert!(spies.commits.borrow().is_empty());
    }

    #[test]
    fn test_blur_accepts_custom_text() {
        let (mut ac, spies) = spied(fruits(), AutoCompleteConfig::default().with_custom_values(true));
        let now = Instant::now();

        ac.focus();
        type_text(&mut ac, "Appl", now, ms(1));
        ac.blur(now + ms(10));

        assert_eq!(ac.committed(), "Appl");
        assert_eq!(*spies.commits.borrow(), vec!["Appl"]);

        // The pending debounce was folded into the blur commit
        ac.tick(now + ms(10_000));
        assert_eq!(spies.commits.borrow().len(), 1);
    }

    #[test]
    fn test_blur_commits_exact_option() {
        let (mut ac, spies) = spied(fruits(), AutoCompleteConfig::default());
        let now = Instant::now();

        ac.focus();
        ac.set_query("Grape", now);
        ac.blur(now);

        assert_eq!(ac.committed(), "Grape");
        assert_eq!(*spies.commits.borrow(), vec!["Grape"]);
    }

    #[test]
    fn test_blur_match_is_case_sensitive() {
        let (mut ac, spies) = spied(fruits(), AutoCompleteConfig::default());
        let now = Instant::now();

        ac.focus();
        ac.set_query("grape", now);
        ac.blur(now);

        assert_eq!(ac.query(), "");
        assert!(spies.commits.borrow().is_empty());
    }

    #[test]
    fn test_option_click_cancels_pending_commit() {
        let config = AutoCompleteConfig::default()
            .with_custom_values(true)
            .with_debounce(ms(100));
        let (mut ac, spies) = spied(fruits(), config);
        let start = Instant::now();

        ac.focus();
        ac.set_query("an", start);
        assert!(ac.has_pending_commit());

        assert!(ac.select_visible(0));
        assert_eq!(*spies.selects.borrow(), vec![("Banana".to_string(), 0)]);
        assert_eq!(*spies.commits.borrow(), vec!["Banana"]);
        assert_eq!(ac.state(), InteractionState::Closed);
        assert_eq!(ac.query(), "Banana");

        ac.tick(start + ms(1000));
        assert_eq!(*spies.commits.borrow(), vec!["Banana"]);
    }

    #[test]
    fn test_dispose_prevents_late_commit() {
        let config = AutoCompleteConfig::default()
            .with_custom_values(true)
            .with_debounce(ms(100));
        let (mut ac, spies) = spied(fruits(), config);
        let start = Instant::now();

        ac.set_query("pending", start);
        ac.dispose();
        ac.tick(start + ms(500));
        ac.set_query("late", start + ms(600));
        ac.tick(start + ms(2000));

        assert!(spies.commits.borrow().is_empty());
        assert_eq!(*spies.queries.borrow(), vec!["pending"]);
    }

    #[test]
    fn test_drop_releases_pointer_subscription() {
        let hub = PointerHub::new();
        let mut ac: AutoComplete =
            AutoComplete::new(fruits(), AutoCompleteConfig::default()).with_pointer_hub(hub.clone());

        ac.focus();
        assert_eq!(hub.subscriber_count(), 1);
        ac.escape();
        assert_eq!(hub.subscriber_count(), 0);

        ac.focus();
        assert_eq!(hub.subscriber_count(), 1);
        drop(ac);
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[test]
    fn test_outside_click_closes_and_blurs() {
        let hub = PointerHub::new();
        let (ac, spies) = spied(fruits(), AutoCompleteConfig::default());
        let mut ac = ac.with_pointer_hub(hub.clone()).with_initial_value("Apple");
        let now = Instant::now();

        ac.set_area(Rect::new(0, 0, 20, 3));
        ac.focus();
        ac.set_query("Gr", now);

        hub.publish(Position::new(5, 1));
        ac.tick(now);
        assert!(ac.is_open());

        hub.publish(Position::new(50, 20));
        ac.tick(now);
        assert!(!ac.is_open());
        assert!(!ac.is_focused());
        assert_eq!(ac.query(), "Apple");
        assert!(spies.commits.borrow().is_empty());
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[test]
    fn test_outside_press_without_hub_closes_and_reverts() {
        let (mut ac, spies) = spied(fruits(), AutoCompleteConfig::default());
        let now = Instant::now();

        ac.set_area(Rect::new(0, 0, 20, 3));
        ac.focus();
        ac.set_query("Ap", now);
        assert!(ac.is_open());

        assert!(!ac.handle_event(&click(50, 20), now));
        assert!(!ac.is_open());
        assert!(!ac.is_focused());
        assert_eq!(ac.query(), "");
        assert!(spies.commits.borrow().is_empty());

        assert!(!ac.handle_event(&key(KeyCode::Char('x')), now));
        assert_eq!(ac.query(), "");
    }

    #[test]
    fn test_outside_press_after_escape_blurs() {
        let hub = PointerHub::new();
        let (ac, spies) = spied(fruits(), AutoCompleteConfig::default());
        let mut ac = ac.with_pointer_hub(hub.clone()).with_initial_value("Apple");
        let now = Instant::now();

        ac.set_area(Rect::new(0, 0, 20, 3));
        ac.focus();
        ac.set_query("Gr", now);
        assert!(ac.handle_event(&key(KeyCode::Esc), now));
        assert!(!ac.is_open());
        assert!(ac.is_focused());
        assert_eq!(hub.subscriber_count(), 0);

        hub.publish(Position::new(50, 20));
        assert!(!ac.handle_event(&click(50, 20), now));
        assert!(!ac.is_focused());
        assert_eq!(ac.query(), "Apple");

        assert!(!ac.handle_event(&key(KeyCode::Char('x')), now));
        assert_eq!(ac.query(), "Apple");
        assert!(!ac.is_open());
        assert!(spies.commits.borrow().is_empty());
    }

    #[test]
    fn test_option_select_reports_filtered_row() {
        let (mut ac, spies) = spied(fruits(), AutoCompleteConfig::default());
        ac.focus();
        ac.set_query("Gr", Instant::now());
        assert_eq!(ac.visible_indices(), &[2]);

        assert!(ac.select_visible(0));
        assert_eq!(*spies.selects.borrow(), vec![("Grape".to_string(), 0)]);
        assert_eq!(*spies.commits.borrow(), vec!["Grape"]);
        assert!(!ac.select_visible(5));
    }

    #[test]
    fn test_resize_keeps_open_anchor() {
        let mut ac: AutoComplete = AutoComplete::new(fruits(), AutoCompleteConfig::default());
        let theme = Theme::default();
        let mut terminal = Terminal::new(TestBackend::new(40, 12)).unwrap();

        terminal
            .draw(|frame| ac.render(frame, Rect::new(0, 0, 20, 3), &theme))
            .unwrap();
        ac.focus();

        assert!(!ac.handle_event(&Event::Resize(80, 24), Instant::now()));
        terminal.backend_mut().resize(80, 24);
        terminal
            .draw(|frame| ac.render(frame, Rect::new(0, 0, 60, 3), &theme))
            .unwrap();
        assert_eq!(ac.state().anchor().map(|a| a.width()), Some(20));
        assert_eq!(ac.popup_layout().map(|p| p.rect.width), Some(20));

        // Reopening measures the new input width
        ac.escape();
        ac.move_highlight(1);
        assert_eq!(ac.state().anchor().map(|a| a.width()), Some(60));
    }

    #[test]
    fn test_colors_parse_hex_and_skip_invalid() {
        let ac: AutoComplete = AutoComplete::new(fruits(), AutoCompleteConfig::default())
            .with_colors([("Apple", "#FF2E5F"), ("Grape", "purple")]);

        assert_eq!(ac.colors.get("Apple"), Some(&Color::rgb(255, 46, 95)));
        assert_eq!(ac.colors.get("Grape"), None);
        assert_eq!(ac.colors.len(), 1);
    }

    #[test]
    fn test_escape_closes_but_keeps_focus() {
        let mut ac: AutoComplete = AutoComplete::new(fruits(), AutoCompleteConfig::default());
        ac.focus();
        assert!(ac.handle_event(&key(KeyCode::Esc), Instant::now()));
        assert!(!ac.is_open());
        assert!(ac.is_focused());
    }

    #[test]
    fn test_keyboard_navigation_wraps() {
        let (mut ac, spies) = spied(fruits(), AutoCompleteConfig::default());
        let now = Instant::now();
        ac.focus();

        ac.handle_event(&key(KeyCode::Up), now);
        assert_eq!(ac.highlighted().map(String::as_str), Some("Grape"));
        ac.handle_event(&key(KeyCode::Down), now);
        assert_eq!(ac.highlighted().map(String::as_str), Some("Apple"));
        ac.handle_event(&key(KeyCode::Down), now);
        ac.handle_event(&key(KeyCode::Enter), now);

        assert_eq!(*spies.selects.borrow(), vec![("Banana".to_string(), 1)]);
        assert!(!ac.is_open());
    }

    #[test]
    fn test_down_reopens_closed_popup() {
        let mut ac: AutoComplete = AutoComplete::new(fruits(), AutoCompleteConfig::default());
        ac.focus();
        ac.escape();
        ac.move_highlight(1);
        assert!(ac.is_open());
        assert_eq!(ac.highlighted(), None);
    }

    #[test]
    fn test_click_on_rendered_option() {
        let (mut ac, spies) = spied(fruits(), AutoCompleteConfig::default());
        let theme = Theme::default();
        let mut terminal = Terminal::new(TestBackend::new(40, 12)).unwrap();
        let now = Instant::now();

        // First frame measures the input, then focus opens against it
        terminal
            .draw(|frame| ac.render(frame, Rect::new(0, 0, 20, 3), &theme))
            .unwrap();
        assert!(ac.handle_event(&click(3, 1), now));
        assert!(ac.is_open());

        terminal
            .draw(|frame| ac.render(frame, Rect::new(0, 0, 20, 3), &theme))
            .unwrap();
        let popup = ac.popup_layout().cloned().unwrap();
        assert_eq!(popup.rect.y, 3);
        assert_eq!(popup.rect.width, 20);
        assert!(screen(&terminal).contains("Grape"));

        // Rows start one below the popup border
        assert!(ac.handle_event(&click(2, popup.rect.y + 3), now));
        assert_eq!(*spies.selects.borrow(), vec![("Grape".to_string(), 2)]);
        assert_eq!(ac.committed(), "Grape");
    }

    #[test]
    fn test_fetching_hides_popup() {
        let mut ac: AutoComplete = AutoComplete::new(fruits(), AutoCompleteConfig::default());
        ac.focus();
        ac.set_fetching(true);
        assert_eq!(ac.popup_view(), PopupView::Hidden);
        ac.set_fetching(false);
        assert_eq!(ac.popup_view(), PopupView::Options);
    }

    #[test]
    fn test_disabled_ignores_input() {
        let (mut ac, spies) = spied(fruits(), AutoCompleteConfig::default().with_disabled(true));
        ac.focus();
        ac.set_query("Apple", Instant::now());

        assert!(!ac.is_focused());
        assert!(!ac.is_open());
        assert_eq!(ac.query(), "");
        assert!(spies.queries.borrow().is_empty());
    }

    #[test]
    fn test_set_value_resets_query_and_state() {
        let (mut ac, spies) = spied(fruits(), AutoCompleteConfig::default().with_debounce(ms(50)));
        let now = Instant::now();

        ac.focus();
        ac.set_query("Apple", now);
        ac.set_value("Grape");

        assert_eq!(ac.query(), "Grape");
        assert_eq!(ac.committed(), "Grape");
        assert!(!ac.is_open());
        assert!(!ac.has_pending_commit());

        ac.tick(now + ms(500));
        assert!(spies.commits.borrow().is_empty());
    }

    #[test]
    fn test_select_options_commit_values() {
        let options = vec![
            SelectOption::new("us", "United States"),
            SelectOption::new("fr", "France"),
        ];
        let commits: Log = Log::default();
        let sink = commits.clone();
        let mut ac = AutoComplete::new(options, AutoCompleteConfig::default().with_debounce(Duration::ZERO))
            .on_commit(move |v| sink.borrow_mut().push(v.to_string()))
            .with_initial_value("fr");
        assert_eq!(ac.query(), "France");

        ac.focus();
        ac.set_query("United States", Instant::now());
        assert_eq!(*commits.borrow(), vec!["us"]);

        ac.set_query("Unit", Instant::now());
        ac.blur(Instant::now());
        assert_eq!(ac.query(), "United States");
        assert_eq!(ac.committed(), "us");
    }

    #[test]
    fn test_long_labels_wrap() {
        let long = "An option label that is considerably longer than forty characters".to_string();
        let mut ac = AutoComplete::new(vec![long, "Short".to_string()], AutoCompleteConfig::default());
        let theme = Theme::default().with_popup_max_width(24);
        let mut terminal = Terminal::new(TestBackend::new(40, 20)).unwrap();

        terminal
            .draw(|frame| ac.render(frame, Rect::new(0, 0, 20, 3), &theme))
            .unwrap();
        ac.focus();
        terminal
            .draw(|frame| ac.render(frame, Rect::new(0, 0, 20, 3), &theme))
            .unwrap();

        let layout = ac.popup_layout().unwrap();
        let first_option_rows = layout.rows.iter().filter(|row| **row == Some(0)).count();
        assert!(first_option_rows > 1);
        assert_eq!(layout.rows.last(), Some(&Some(1)));
    }

    #[test]
    fn test_scroll_counts_wrapped_rows() {
        assert_eq!(scroll_to_fit(&[3, 3, 1], 0, 2, 4), 1);
        assert_eq!(scroll_to_fit(&[1, 1, 1, 1, 1], 0, 4, 3), 2);
        assert_eq!(scroll_to_fit(&[1, 1, 1], 2, 0, 3), 0);
        // An option taller than the window is drawn from its first row
        assert_eq!(scroll_to_fit(&[1, 6], 0, 1, 4), 1);
    }

    #[test]
    fn test_highlight_below_wrapped_labels_is_drawn() {
        let long = "An option label that is considerably longer than forty characters";
        let options = vec![format!("{long} one"), format!("{long} two"), "Short".to_string()];
        let mut ac = AutoComplete::new(options, AutoCompleteConfig::default());
        let theme = Theme::default()
            .with_popup_max_width(24)
            .with_popup_max_rows(4);
        let mut terminal = Terminal::new(TestBackend::new(40, 20)).unwrap();

        terminal
            .draw(|frame| ac.render(frame, Rect::new(0, 0, 20, 3), &theme))
            .unwrap();
        ac.focus();
        ac.move_highlight(-1);
        assert_eq!(ac.highlighted().map(String::as_str), Some("Short"));

        terminal
            .draw(|frame| ac.render(frame, Rect::new(0, 0, 20, 3), &theme))
            .unwrap();
        let layout = ac.popup_layout().unwrap();
        assert_eq!(layout.rows.last(), Some(&Some(2)));
        assert!(!layout.rows.contains(&Some(0)));
    }

    #[test]
    fn test_long_label_threshold_is_configurable() {
        let mut ac = AutoComplete::new(
            vec!["A label of medium length here".to_string()],
            AutoCompleteConfig::default(),
        );
        let theme = Theme::default()
            .with_popup_max_width(12)
            .with_long_label_chars(10);
        let mut terminal = Terminal::new(TestBackend::new(40, 20)).unwrap();

        terminal
            .draw(|frame| ac.render(frame, Rect::new(0, 0, 12, 3), &theme))
            .unwrap();
        ac.focus();
        terminal
            .draw(|frame| ac.render(frame, Rect::new(0, 0, 12, 3), &theme))
            .unwrap();

        assert!(ac.popup_layout().unwrap().rows.len() > 1);
    }

    #[test]
    fn test_very_wide_label_width_saturates() {
        let mut ac = AutoComplete::new(vec!["w".repeat(u16::MAX as usize)], AutoCompleteConfig::default());
        let theme = Theme::default();
        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();

        terminal
            .draw(|frame| ac.render(frame, Rect::new(0, 0, 20, 3), &theme))
            .unwrap();
        ac.focus();
        terminal
            .draw(|frame| ac.render(frame, Rect::new(0, 0, 20, 3), &theme))
            .unwrap();

        assert_eq!(ac.popup_layout().map(|p| p.rect.width), Some(theme.max_width()));
    }

    #[test]
    fn test_error_message_rendered() {
        let mut ac: AutoComplete = AutoComplete::new(fruits(), AutoCompleteConfig::default());
        ac.set_error(Some("Pick a fruit".to_string()));
        let mut terminal = Terminal::new(TestBackend::new(30, 4)).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.area();
                ac.render(frame, area, &Theme::default())
            })
            .unwrap();
        assert!(screen(&terminal).contains("Pick a fruit"));
    }
}
