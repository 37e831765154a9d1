//! Interactive showcase: a fruit picker and a search box side by side.
//!
//! Click or Tab into an input, Ctrl+C or Ctrl+Q quits.

use std::{
    cell::RefCell,
    rc::Rc,
    time::{Duration, Instant},
};

use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};
use typeahead::{
    view, App, AutoComplete, AutoCompleteConfig, Component, Event, PointerHub, SearchInput,
    SearchInputConfig, SelectOption, Theme, TypeaheadResult,
};

const FRUITS: &[&str] = &[
    "Apple",
    "Apricot",
    "Banana",
    "Blackberry",
    "Blueberry",
    "Cherry",
    "Grape",
    "Grapefruit",
    "Kiwi",
    "Lemon",
    "Mango",
    "Orange",
    "Papaya",
    "Peach",
    "Pear",
    "Pineapple",
    "Plum",
    "Raspberry",
    "Strawberry",
    "Watermelon",
];

/// Most recent entries kept in the history
const HISTORY_LEN: usize = 12;

type History = Rc<RefCell<Vec<String>>>;

struct Gallery {
    picker: AutoComplete<SelectOption>,
    search: SearchInput,
    commits: History,
    searches: History,
}

impl Gallery {
    fn new(hub: PointerHub) -> Self {
        let commits: History = Rc::default();
        let searches: History = Rc::default();

        let options: Vec<SelectOption> = FRUITS
            .iter()
            .map(|name| SelectOption::new(name.to_lowercase(), *name))
            .collect();

        let colors = [("cherry", "#FF2E5F"), ("lemon", "#FFC100"), ("kiwi", "#62C462")];

        let sink = commits.clone();
        let picker = AutoComplete::new(
            options,
            AutoCompleteConfig::default()
                .with_placeholder("Pick a fruit")
                .with_debounce(Duration::from_millis(400)),
        )
        .with_pointer_hub(hub)
        .with_colors(colors)
        .on_commit(move |value| push_bounded(&sink, value));

        let sink = searches.clone();
        let search = SearchInput::uncontrolled(SearchInputConfig::default())
            .on_change(move |value| push_bounded(&sink, value));

        Self {
            picker,
            search,
            commits,
            searches,
        }
    }

    fn switch_focus(&mut self, now: Instant) {
        if self.picker.is_focused() {
            self.picker.blur(now);
            self.search.focus();
        } else {
            self.search.blur();
            self.picker.focus();
        }
    }

    fn history_line<'a>(title: &'a str, entries: &History, theme: &Theme) -> Line<'a> {
        let mut spans = vec![Span::styled(format!("{title}: "), theme.muted())];
        for (index, entry) in entries.borrow().iter().enumerate() {
            let label = if entry.is_empty() { "(cleared)" } else { entry };
            spans.push(view::chip(label, index, theme));
            spans.push(Span::raw(" "));
        }
        Line::from(spans)
    }
}

fn push_bounded(history: &History, value: &str) {
    let mut history = history.borrow_mut();
    history.push(value.to_owned());
    if history.len() > HISTORY_LEN {
        history.remove(0);
    }
}

impl Component for Gallery {
    fn handle_event(&mut self, event: &Event, now: Instant) -> bool {
        if let Some(key) = event.key_press() {
            if key.code == KeyCode::Tab {
                self.switch_focus(now);
                return true;
            }
        }

        if event.pointer_down().is_some() {
            // Both see every press so the one left behind blurs itself
            let picked = self.picker.handle_event(event, now);
            let searched = self.search.handle_event(event, now);
            return picked || searched;
        }

        self.picker.handle_event(event, now) || self.search.handle_event(event, now)
    }

    fn tick(&mut self, now: Instant) {
        self.picker.tick(now);
        self.search.tick(now);
    }

    fn render(&mut self, frame: &mut Frame<'_>, area: Rect, theme: &Theme) {
        let [header, picker, search, history] = Layout::vertical([
            Constraint::Length(2),
            Constraint::Length(view::INPUT_HEIGHT + 1),
            Constraint::Length(view::INPUT_HEIGHT + 1),
            Constraint::Min(0),
        ])
        .areas(area);

        let width = theme.max_width().min(area.width);
        let column = |rect: Rect| Rect { width, ..rect };

        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                "Click or Tab into an input, Ctrl+Q quits",
                theme.muted(),
            ))),
            header,
        );

        frame.render_widget(
            Paragraph::new(vec![
                Self::history_line("Committed", &self.commits, theme),
                Self::history_line("Searched", &self.searches, theme),
            ])
            .wrap(Wrap { trim: false }),
            history,
        );

        self.search.render(frame, column(search), theme);
        // Drawn last so its popup covers the widgets below
        self.picker.render(frame, column(picker), theme);
    }

    fn next_deadline(&self) -> Option<Instant> {
        match (self.picker.next_deadline(), self.search.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}

fn main() -> TypeaheadResult<()> {
    let hub = PointerHub::new();
    let gallery = Gallery::new(hub.clone());

    smol::block_on(async {
        let mut app = App::new(gallery, hub, Theme::default(), Duration::from_millis(100))?;
        app.run().await
    })
}
