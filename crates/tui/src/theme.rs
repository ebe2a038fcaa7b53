//! Theme and styling for the Lume bar TUI.
//!
//! Context badge colors come from a fixed keyword palette; anything else is
//! parsed as a literal `#rrggbb` value and falls back to the defaults when it
//! does not parse.

use ratatui::style::{Color, Modifier, Style};

/// Accent color for the active tab and selection indicators.
pub const ACCENT: Color = Color::Rgb(8, 171, 237);

/// Primary foreground color for normal text.
pub const FG: Color = Color::Rgb(224, 224, 230);

/// Muted foreground color for secondary text.
pub const FG_MUTED: Color = Color::Rgb(168, 168, 175);

/// Border color for the detail pane.
pub const BORDER: Color = Color::Rgb(72, 72, 80);

/// Background for code rows.
pub const BG_PANEL: Color = Color::Rgb(18, 18, 24);

/// Background for the selected row.
pub const BG_SELECT: Color = Color::Rgb(18, 28, 38);

/// Default badge background when a context declares no color.
pub const DIM: Color = Color::Rgb(64, 64, 72);

/// Default badge text color.
pub const BADGE_FG: Color = Color::Rgb(18, 18, 24);

const KEYWORD_COLORS: &[(&str, Color)] = &[
    ("error", Color::Rgb(220, 96, 110)),
    ("warning", Color::Rgb(235, 180, 80)),
    ("success", Color::Rgb(120, 200, 120)),
    ("info", ACCENT),
    ("important", Color::Rgb(200, 120, 220)),
];

/// Resolve a context color value: a palette keyword, a literal `#rrggbb`
/// color, or `fallback` when absent or unparseable.
pub fn context_color(value: Option<&str>, fallback: Color) -> Color {
    let Some(value) = value else {
        return fallback;
    };
    if let Some((_, color)) = KEYWORD_COLORS.iter().find(|(keyword, _)| *keyword == value) {
        return *color;
    }
    parse_hex(value).unwrap_or(fallback)
}

fn parse_hex(value: &str) -> Option<Color> {
    let hex = value.strip_prefix('#')?;
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

/// Style for a collection tab; pressed tabs carry the accent.
pub fn tab_style(pressed: bool) -> Style {
    if pressed {
        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(FG_MUTED)
    }
}

pub fn text_style() -> Style {
    Style::default().fg(FG)
}

pub fn text_muted() -> Style {
    Style::default().fg(FG_MUTED)
}

/// Style for the selected detail row.
pub fn selection_style() -> Style {
    Style::default().fg(FG).bg(BG_SELECT)
}

pub fn code_style() -> Style {
    Style::default().fg(FG).bg(BG_PANEL)
}

pub fn border_style() -> Style {
    Style::default().fg(BORDER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_resolve_through_the_palette() {
        assert_eq!(context_color(Some("error"), DIM), Color::Rgb(220, 96, 110));
        assert_eq!(context_color(Some("info"), DIM), ACCENT);
    }

    #[test]
    fn literal_hex_colors_parse() {
        assert_eq!(context_color(Some("#102030"), DIM), Color::Rgb(16, 32, 48));
    }

    #[test]
    fn absent_or_unparseable_values_fall_back() {
        assert_eq!(context_color(None, DIM), DIM);
        assert_eq!(context_color(Some("chartreuse"), DIM), DIM);
        assert_eq!(context_color(Some("#12"), DIM), DIM);
        assert_eq!(context_color(Some("#12345G"), DIM), DIM);
    }
}
