//! Drawing helpers shared by the inputs: the bordered text box, popup
//! placement, and chips.

use ratatui::{
    layout::{Position, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};

use crate::{
    text::{display_width, tail},
    theme::Theme,
};

/// Rows taken by a bordered single-line input
pub const INPUT_HEIGHT: u16 = 3;

/// How a text box should be drawn
#[derive(Debug, Clone, Copy)]
pub struct InputBox<'a> {
    pub text: &'a str,
    pub placeholder: &'a str,
    pub focused: bool,
    pub disabled: bool,
    /// Glyph drawn at the right edge, such as a clear button
    pub trailing: Option<&'a str>,
    pub leading: Option<&'a str>,
}

/// Splits `area` into the input rectangle and the row below it, if any
pub fn split_input(area: Rect) -> (Rect, Option<Rect>) {
    let input = Rect {
        height: area.height.min(INPUT_HEIGHT),
        ..area
    };
    let below = (area.height > INPUT_HEIGHT).then(|| Rect {
        y: area.y + INPUT_HEIGHT,
        height: 1,
        ..area
    });
    (input, below)
}

/// Draws a bordered text box and places the cursor when focused
pub fn render_input(frame: &mut Frame<'_>, area: Rect, input: InputBox<'_>, theme: &Theme) {
    let block = Block::bordered().border_style(theme.border(input.focused && !input.disabled));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let mut spans = Vec::new();
    let mut used = 0usize;
    if let Some(leading) = input.leading {
        spans.push(Span::styled(format!("{} ", leading), theme.muted()));
        used += display_width(leading) + 1;
    }
    let trailing_width = input.trailing.map(|t| display_width(t) + 1).unwrap_or(0);

    // One cell stays free for the cursor
    let room = (inner.width as usize).saturating_sub(used + trailing_width + 1);
    let text_style = if input.disabled {
        theme.disabled()
    } else {
        theme.text()
    };

    let visible = if input.text.is_empty() {
        spans.push(Span::styled(
            crate::text::truncate_with_ellipsis(input.placeholder, room + 1),
            theme.placeholder(),
        ));
        ""
    } else {
        let visible = tail(input.text, room);
        spans.push(Span::styled(visible.to_owned(), text_style));
        visible
    };

    frame.render_widget(Paragraph::new(Line::from(spans)), inner);

    if let Some(trailing) = input.trailing {
        let width = display_width(trailing) as u16;
        if width < inner.width {
            let rect = Rect {
                x: inner.right() - width,
                width,
                height: 1,
                ..inner
            };
            frame.render_widget(Paragraph::new(Span::styled(trailing.to_owned(), theme.muted())), rect);
        }
    }

    if input.focused && !input.disabled {
        let offset = (used + display_width(visible)) as u16;
        frame.set_cursor_position(Position::new(
            inner.x + offset.min(inner.width.saturating_sub(1)),
            inner.y,
        ));
    }
}

/// Draws the optional helper/error row under an input
pub fn render_message(frame: &mut Frame<'_>, area: Option<Rect>, message: Option<&str>, style: Style) {
    if let (Some(area), Some(message)) = (area, message) {
        let text = crate::text::truncate_with_ellipsis(message, area.width as usize);
        frame.render_widget(Paragraph::new(Span::styled(text, style)), area);
    }
}

/// Places a popup of `width` x `height` under `anchor`, flipping above it
/// when the screen has no room below.
pub fn place_popup(anchor: Rect, width: u16, height: u16, screen: Rect) -> Rect {
    let width = width.min(screen.width);
    let x = anchor.x.min(screen.right().saturating_sub(width)).max(screen.x);

    let room_below = screen.bottom().saturating_sub(anchor.bottom());
    let room_above = anchor.y.saturating_sub(screen.y);

    let (y, height) = if height <= room_below || room_below >= room_above {
        (anchor.bottom(), height.min(room_below))
    } else {
        let height = height.min(room_above);
        (anchor.y - height, height)
    };

    Rect {
        x,
        y,
        width,
        height,
    }
}

/// Rendered popup geometry, kept for hit testing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupLayout {
    pub rect: Rect,
    /// For each inner row, the visible option drawn there
    pub rows: Vec<Option<usize>>,
}

impl PopupLayout {
    /// The visible option under `position`, if any
    pub fn option_at(&self, position: Position) -> Option<usize> {
        if !self.rect.contains(position) || position.y <= self.rect.y {
            return None;
        }
        let row = (position.y - self.rect.y - 1) as usize;
        self.rows.get(row).copied().flatten()
    }
}

/// A label drawn with the cycled chip palette
pub fn chip(label: &str, index: usize, theme: &Theme) -> Span<'static> {
    Span::styled(format!(" {} ", label), theme.chip(index))
}
