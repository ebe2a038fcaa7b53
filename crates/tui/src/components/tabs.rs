//! The tab strip: toggle affordance, one button per collection, status text.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::App;
use crate::theme;

pub fn render_tab_strip(frame: &mut Frame, rect: Rect, app: &mut App) {
    let mut spans: Vec<Span> = Vec::new();

    let toggle_icon = if app.bar_open { "arrows-in-simple" } else { "arrows-out-simple" };
    let toggle_glyph = app.icons.get(toggle_icon).map(String::as_str).unwrap_or("=");
    spans.push(Span::styled(format!(" {toggle_glyph} "), theme::text_muted()));

    if !app.bar_open {
        spans.push(Span::styled("lume bar closed (m to open)", theme::text_muted()));
        frame.render_widget(Paragraph::new(Line::from(spans)), rect);
        return;
    }

    for (index, collection) in app.collections.iter().enumerate() {
        let pressed = app.active == Some(index);
        let style = theme::tab_style(pressed);

        let mut label = String::new();
        label.push_str(&format!(" {} ", index + 1));
        if let Some(icon) = &collection.icon
            && let Some(glyph) = app.icons.get(icon)
        {
            label.push_str(glyph);
            label.push(' ');
        }
        label.push_str(&collection.name);
        if !collection.items.is_empty() {
            label.push_str(&format!(" ({})", collection.items.len()));
        }
        label.push(' ');
        spans.push(Span::styled(label, style));
        spans.push(Span::raw(" "));
    }

    if app.collections.is_empty() {
        spans.push(Span::styled("no data", theme::text_muted()));
    }

    if let Some(status) = &app.status {
        spans.push(Span::styled(format!("  {status}"), theme::text_muted()));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), rect);
}
