//! Component abstraction for the Lume bar TUI.
//!
//! Components translate raw input into state-machine messages and render a
//! region of the frame. They report side effects back to the runtime instead
//! of performing them.

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;

use crate::app::{App, Effect};

/// A UI component with its own input handling and rendering.
pub trait Component {
    /// Handle a key event, returning effects for the runtime to process.
    fn handle_key_events(&mut self, _app: &mut App, _key: KeyEvent) -> Vec<Effect> {
        Vec::new()
    }

    /// Render the component into the given area.
    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App);
}
