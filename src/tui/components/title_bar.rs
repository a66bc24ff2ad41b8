//! # TitleBar Component
//!
//! Top status bar: app name, the current character, the status message and a
//! "↓ New" marker when the transcript has content below the viewport.
//!
//! Stateless: every field is a prop and the bar is rebuilt each frame.
//!
//! ```text
//! Green Garden · 苏糖 | 读取成功 (槽位 1) | ↓ New
//! ```

use crate::tui::component::Component;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

pub const APP_TITLE: &str = "Green Garden";

pub struct TitleBar {
    /// Empty on the welcome screen.
    pub character_name: String,
    pub status_message: String,
    pub has_unseen_content: bool,
}

impl TitleBar {
    pub fn new(character_name: String, status_message: String, has_unseen_content: bool) -> Self {
        Self {
            character_name,
            status_message,
            has_unseen_content,
        }
    }

    fn text(&self) -> String {
        let mut text = String::from(APP_TITLE);
        if !self.character_name.is_empty() {
            text.push_str(" · ");
            text.push_str(&self.character_name);
        }
        if !self.status_message.is_empty() {
            text.push_str(" | ");
            text.push_str(&self.status_message);
        }
        if self.has_unseen_content {
            text.push_str(" | ↓ New");
        }
        text
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let line = Line::from(Span::styled(
            self.text(),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(line, area);
    }
}
