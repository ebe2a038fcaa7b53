//! The detail pane: the active collection's flattened item tree.

use std::collections::HashMap;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::App;
use crate::theme;
use crate::tree::{ActionRow, ItemRow, RowKind};

pub fn render_detail(frame: &mut Frame, rect: Rect, app: &mut App) {
    let block = Block::default().borders(Borders::TOP).border_style(theme::border_style());
    let inner = block.inner(rect);
    frame.render_widget(block, rect);
    if inner.height == 0 {
        return;
    }

    let height = inner.height as usize;
    app.tree.ensure_visible(height);
    let selected = app.tree.selected;
    let scroll = app.tree.scroll;
    let width = inner.width as usize;
    let icons = &app.icons;

    let mut lines: Vec<Line<'static>> = Vec::new();
    for (index, row) in app.tree.rows.iter().enumerate().skip(scroll) {
        if lines.len() >= height {
            break;
        }
        let is_selected = index == selected;
        match &row.kind {
            RowKind::Item(item) => lines.push(item_line(row.depth, item, is_selected, icons)),
            RowKind::Text(text) => {
                let indent = "  ".repeat(row.depth + 1);
                let wrap_width = width.saturating_sub(indent.len()).max(16);
                let style = if is_selected { theme::selection_style() } else { theme::text_muted() };
                for segment in textwrap::wrap(text, wrap_width) {
                    if lines.len() >= height {
                        break;
                    }
                    lines.push(Line::from(Span::styled(format!("{indent}{segment}"), style)));
                }
            }
            RowKind::Code(code) => {
                let indent = "  ".repeat(row.depth + 1);
                let style = if is_selected { theme::selection_style() } else { theme::code_style() };
                lines.push(Line::from(Span::styled(format!("{indent}{code}"), style)));
            }
            RowKind::Action(action) => lines.push(action_line(row.depth, action, is_selected, icons)),
            RowKind::EmptyNotice(notice) => {
                lines.push(Line::from(Span::styled(format!("  {notice}"), theme::text_muted())));
            }
        }
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn item_line(
    depth: usize,
    item: &ItemRow,
    selected: bool,
    icons: &HashMap<String, String>,
) -> Line<'static> {
    let base = if selected { theme::selection_style() } else { theme::text_style() };
    let marker = if item.expandable {
        if item.expanded { "▾" } else { "▸" }
    } else {
        "·"
    };

    let mut spans = vec![Span::styled(format!("{}{marker} ", "  ".repeat(depth)), base)];
    if let Some(badge) = &item.badge {
        let label = badge
            .icon
            .as_ref()
            .and_then(|icon| icons.get(icon).cloned())
            .unwrap_or_else(|| badge.label.clone());
        spans.push(Span::styled(
            format!(" {label} "),
            Style::default().fg(badge.color).bg(badge.background),
        ));
        spans.push(Span::styled(" ", base));
    }
    spans.push(Span::styled(item.title.clone(), base));
    if item.child_count > 0 {
        spans.push(Span::styled(format!(" ({})", item.child_count), theme::text_muted()));
    }
    if let Some(details) = &item.details {
        spans.push(Span::styled(format!("  {details}"), theme::text_muted()));
    }
    Line::from(spans)
}

fn action_line(
    depth: usize,
    action: &ActionRow,
    selected: bool,
    icons: &HashMap<String, String>,
) -> Line<'static> {
    let mut label = "  ".repeat(depth);
    label.push_str(if action.pending { "[ … " } else { "[ " });
    if let Some(icon) = &action.icon
        && let Some(glyph) = icons.get(icon)
    {
        label.push_str(glyph);
        label.push(' ');
    }
    label.push_str(&action.text);
    label.push_str(" ]");
    if let Some(href) = &action.href {
        label.push(' ');
        label.push_str(href);
    }

    let style = if action.pending {
        theme::text_muted()
    } else if selected {
        theme::selection_style()
    } else {
        theme::text_style()
    };
    Line::from(Span::styled(label, style))
}
