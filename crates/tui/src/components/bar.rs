//! The bar itself: tab strip plus detail pane, docked to the bottom of the
//! terminal. The area above the bar belongs to the host application and is
//! left untouched.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};

use crate::app::{App, Effect, Msg};
use crate::components::component::Component;
use crate::components::{detail, tabs};

/// Share of the terminal height given to the detail pane.
const DETAIL_HEIGHT_MIN: u16 = 8;

#[derive(Debug, Default)]
pub struct BarComponent;

impl BarComponent {
    fn detail_height(total: u16) -> u16 {
        (total * 2 / 5).max(DETAIL_HEIGHT_MIN).min(total.saturating_sub(2))
    }
}

impl Component for BarComponent {
    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::Char('q') => vec![Effect::Quit],
            KeyCode::Char('m') => app.update(Msg::ToggleBar),
            KeyCode::Char('r') => vec![Effect::ReloadData],
            KeyCode::Char(digit @ '1'..='9') => {
                let index = digit as usize - '1' as usize;
                app.update(Msg::ActivateTab(index))
            }
            KeyCode::Left => match app.neighbor_tab(-1) {
                Some(index) => app.update(Msg::ActivateTab(index)),
                None => Vec::new(),
            },
            KeyCode::Right => match app.neighbor_tab(1) {
                Some(index) => app.update(Msg::ActivateTab(index)),
                None => Vec::new(),
            },
            KeyCode::Up => app.update(Msg::MoveSelection(-1)),
            KeyCode::Down => app.update(Msg::MoveSelection(1)),
            KeyCode::PageUp => app.update(Msg::MoveSelection(-10)),
            KeyCode::PageDown => app.update(Msg::MoveSelection(10)),
            KeyCode::Enter | KeyCode::Char(' ') => app.update(Msg::Activate),
            _ => Vec::new(),
        }
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        let show_detail = app.bar_open && app.active.is_some();
        let detail_height = if show_detail { Self::detail_height(rect.height) } else { 0 };

        let [_host, strip, pane] = Layout::vertical([
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(detail_height),
        ])
        .areas(rect);

        tabs::render_tab_strip(frame, strip, app);
        if show_detail {
            detail::render_detail(frame, pane, app);
        }
    }
}
