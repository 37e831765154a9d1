//! Open/closed popup state

use ratatui::layout::Rect;

/// Geometry captured from the input when the popup opens.
///
/// The popup is sized from this snapshot until the next open, even if the
/// terminal is resized in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub rect: Rect,
}

impl Anchor {
    pub fn width(&self) -> u16 {
        self.rect.width
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionState {
    #[default]
    Closed,
    Open { anchor: Anchor },
}

impl InteractionState {
    pub fn is_open(&self) -> bool {
        matches!(self, InteractionState::Open { .. })
    }

    pub fn anchor(&self) -> Option<Anchor> {
        match self {
            InteractionState::Open { anchor } => Some(*anchor),
            InteractionState::Closed => None,
        }
    }
}

/// What the popup shows while the input is open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupView {
    Hidden,
    Options,
    Empty,
}
