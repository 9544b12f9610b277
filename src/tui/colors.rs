//! Color constants for the terminal user interface.

use ratatui::style::Color;

use crate::fields::Priority;

/// Accent for the focused pane and status bar.
pub const INDIGO: Color = Color::Rgb(99, 102, 241);
/// High priority dot and overdue dates.
pub const DESTRUCTIVE: Color = Color::Rgb(239, 68, 68);
/// Medium priority dot.
pub const ORANGE: Color = Color::Rgb(251, 146, 60);
/// Secondary text.
pub const MUTED: Color = Color::Rgb(140, 140, 150);

/// Colour of the priority marker on a task card; `None` draws no marker.
pub fn priority_color(p: Priority) -> Option<Color> {
    match p {
        Priority::High => Some(DESTRUCTIVE),
        Priority::Medium => Some(ORANGE),
        Priority::Low => None,
    }
}

/// Parse `#rrggbb` into a terminal colour, falling back to white.
pub fn hex_color(hex: &str) -> Color {
    let h = hex.trim_start_matches('#');
    if h.len() != 6 {
        return Color::White;
    }
    let channel = |i: usize| h.get(i..i + 2).and_then(|c| u8::from_str_radix(c, 16).ok());
    match (channel(0), channel(2), channel(4)) {
        (Some(r), Some(g), Some(b)) => Color::Rgb(r, g, b),
        _ => Color::White,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_seed_colors() {
        assert_eq!(hex_color("#6366f1"), Color::Rgb(99, 102, 241));
        assert_eq!(hex_color("14b8a6"), Color::Rgb(20, 184, 166));
        assert_eq!(hex_color("red"), Color::White);
        assert_eq!(hex_color("#zzzzzz"), Color::White);
    }
}
