//! Colors, sizing and chip palette used when drawing the inputs.
//!
//! Provides:
//! - RGB colors parsed from `#rrggbb` strings
//! - A [`Theme`] context carrying the scale factor and popup limits
//! - Deterministic chip colors cycled by index
//! - Integration with ratatui styles

use ratatui::style::{Color as RatatuiColor, Modifier, Style};

use crate::error::{TypeaheadError, TypeaheadResult};

/// An opaque RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    r: u8,
    g: u8,
    b: u8,
}

impl Color {
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (leading `#` optional)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }

        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Self::rgb(r, g, b))
    }

    /// Mix with another color by a specified amount (0.0-1.0)
    pub fn mix(&self, other: &Color, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);
        let channel = |a: u8, b: u8| (a as f32 * (1.0 - amount) + b as f32 * amount).round() as u8;
        Self::rgb(
            channel(self.r, other.r),
            channel(self.g, other.g),
            channel(self.b, other.b),
        )
    }

    pub fn to_ratatui(&self) -> RatatuiColor {
        RatatuiColor::Rgb(self.r, self.g, self.b)
    }
}

impl From<Color> for RatatuiColor {
    fn from(color: Color) -> Self {
        color.to_ratatui()
    }
}

/// Fixed color tokens
pub mod palette {
    use super::Color;

    pub const BACKGROUND: Color = Color::rgb(15, 18, 20); // #0F1214
    pub const SURFACE: Color = Color::rgb(29, 36, 40); // #1D2428

    pub const TEXT: Color = Color::rgb(230, 237, 243); // #E6EDF3
    pub const MUTED: Color = Color::rgb(139, 148, 158); // #8B949E
    pub const DISABLED: Color = Color::rgb(106, 115, 125); // #6A737D
    pub const PLACEHOLDER: Color = Color::rgb(88, 96, 105); // #586069

    pub const BORDER: Color = Color::rgb(207, 211, 223); // #CFD3DF
    pub const FOCUS: Color = Color::rgb(255, 193, 0); // #FFC100
    pub const ERROR: Color = Color::rgb(255, 46, 95); // #FF2E5F

    /// Background of the row holding the committed value
    pub fn selected() -> Color {
        SURFACE.mix(&FOCUS, 0.15)
    }

    /// Background of the keyboard-highlighted row
    pub fn highlighted() -> Color {
        SURFACE.mix(&FOCUS, 0.3)
    }
}

/// Foreground/background pair for a chip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipColors {
    pub fg: Color,
    pub bg: Color,
}

const CHIP_COLORS: [ChipColors; 5] = [
    ChipColors {
        fg: Color::rgb(20, 155, 139),  // #149B8B
        bg: Color::rgb(226, 248, 246), // #E2F8F6
    },
    ChipColors {
        fg: Color::rgb(92, 126, 214),  // #5C7ED6
        bg: Color::rgb(246, 247, 252), // #F6F7FC
    },
    ChipColors {
        fg: Color::rgb(254, 157, 38),  // #FE9D26
        bg: Color::rgb(255, 241, 225), // #FFF1E1
    },
    ChipColors {
        fg: Color::rgb(246, 94, 79),   // #F65E4F
        bg: Color::rgb(255, 243, 242), // #FFF3F2
    },
    ChipColors {
        fg: Color::rgb(66, 82, 129),   // #425281
        bg: Color::rgb(246, 247, 252), // #F6F7FC
    },
];

/// Chip colors for the `index`-th label, cycling through a fixed palette
pub fn chip_colors(index: usize) -> ChipColors {
    CHIP_COLORS[index % CHIP_COLORS.len()]
}

/// Rendering context passed to every view.
///
/// `scale` multiplies popup limits so a host can grow or shrink every
/// input at once.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub scale: f32,
    /// Maximum option rows shown before scrolling, before scaling
    pub popup_max_rows: u16,
    /// Maximum popup width in cells, before scaling
    pub popup_max_width: u16,
    /// Labels longer than this many characters wrap instead of being truncated
    pub long_label_chars: usize,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            scale: 1.0,
            popup_max_rows: 8,
            popup_max_width: 48,
            long_label_chars: 40,
        }
    }
}

impl Theme {
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_popup_max_rows(mut self, rows: u16) -> Self {
        self.popup_max_rows = rows;
        self
    }

    pub fn with_popup_max_width(mut self, width: u16) -> Self {
        self.popup_max_width = width;
        self
    }

    pub fn with_long_label_chars(mut self, chars: usize) -> Self {
        self.long_label_chars = chars;
        self
    }

    pub fn validate(&self) -> TypeaheadResult<()> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(TypeaheadError::config(
                "scale",
                self.scale,
                "scale must be a positive, finite number",
            )
            .into());
        }
        if self.popup_max_rows == 0 {
            return Err(TypeaheadError::config(
                "popup_max_rows",
                self.popup_max_rows,
                "popup must show at least one row",
            )
            .into());
        }
        if self.popup_max_width < 3 {
            return Err(TypeaheadError::config(
                "popup_max_width",
                self.popup_max_width,
                "popup must be at least three cells wide",
            )
            .into());
        }
        Ok(())
    }

    /// Applies the scale factor to a cell count, never returning less than one
    pub fn scaled(&self, cells: u16) -> u16 {
        let scaled = (cells as f32 * self.scale).round();
        scaled.clamp(1.0, u16::MAX as f32) as u16
    }

    pub fn max_rows(&self) -> u16 {
        self.scaled(self.popup_max_rows)
    }

    pub fn max_width(&self) -> u16 {
        self.scaled(self.popup_max_width)
    }

    pub fn text(&self) -> Style {
        Style::default().fg(palette::TEXT.into())
    }

    pub fn placeholder(&self) -> Style {
        Style::default().fg(palette::PLACEHOLDER.into())
    }

    pub fn muted(&self) -> Style {
        Style::default()
            .fg(palette::MUTED.into())
            .add_modifier(Modifier::ITALIC)
    }

    pub fn disabled(&self) -> Style {
        Style::default().fg(palette::DISABLED.into())
    }

    pub fn error(&self) -> Style {
        Style::default().fg(palette::ERROR.into())
    }

    pub fn border(&self, focused: bool) -> Style {
        let color = if focused { palette::FOCUS } else { palette::BORDER };
        Style::default().fg(color.into())
    }

    pub fn popup(&self) -> Style {
        Style::default()
            .fg(palette::TEXT.into())
            .bg(palette::SURFACE.into())
    }

    pub fn option(&self, selected: bool, highlighted: bool, color: Option<Color>) -> Style {
        let mut style = self.popup();
        if let Some(color) = color {
            style = style.fg(color.into());
        }
        if highlighted {
            style = style.bg(palette::highlighted().into());
        } else if selected {
            style = style.bg(palette::selected().into());
        }
        if selected {
            style = style.add_modifier(Modifier::BOLD);
        }
        style
    }

    pub fn chip(&self, index: usize) -> Style {
        let colors = chip_colors(index);
        Style::default()
            .fg(colors.fg.into())
            .bg(colors.bg.into())
            .add_modifier(Modifier::BOLD)
    }
}
