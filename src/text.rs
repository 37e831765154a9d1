//! Width-aware truncation and wrapping for cell-based layouts

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ELLIPSIS: char = '…';

pub fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

/// Whether `text` needs more than `width` cells
pub fn is_truncated(text: &str, width: usize) -> bool {
    display_width(text) > width
}

/// Cuts `text` to `width` cells, ending with an ellipsis when anything was dropped
pub fn truncate_with_ellipsis(text: &str, width: usize) -> String {
    if !is_truncated(text, width) {
        return text.to_owned();
    }
    if width == 0 {
        return String::new();
    }

    let budget = width - 1;
    let mut used = 0;
    let mut out = String::new();
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push(ELLIPSIS);
    out
}

/// The trailing part of `text` that fits in `width` cells.
///
/// Used for the input line so the end being typed stays visible.
pub fn tail(text: &str, width: usize) -> &str {
    let mut used = 0;
    let mut start = text.len();
    for (index, ch) in text.char_indices().rev() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        start = index;
    }
    &text[start..]
}

/// Hard-wraps `text` into lines of at most `width` cells
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return Vec::new();
    }

    let mut lines = Vec::new();
    let mut line = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width && !line.is_empty() {
            lines.push(std::mem::take(&mut line));
            used = 0;
        }
        used += w;
        line.push(ch);
    }
    if !line.is_empty() || lines.is_empty() {
        lines.push(line);
    }
    lines
}
