//! # InputBox Component
//!
//! Single-line text input for chat messages and slash commands.
//!
//! The buffer and cursor are internal state. Pasted newlines become spaces,
//! since the server takes one line per message. When the text is wider than
//! the box, the view scrolls horizontally to keep the cursor visible; widths
//! are measured in terminal columns so CJK input lines up.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Paragraph};
use unicode_width::UnicodeWidthChar;

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

/// Borders (1 + 1) plus one column of slack for the cursor at end of line.
const HORIZONTAL_OVERHEAD: u16 = 3;
pub const INPUT_HEIGHT: u16 = 3;

/// High-level events emitted by the InputBox
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Submit(String),
    ContentChanged,
}

pub struct InputBox {
    pub buffer: String,
    /// Cursor as byte offset into `buffer`.
    cursor: usize,
    /// Prop: draw dimmed and hide the cursor.
    pub dimmed: bool,
}

impl Default for InputBox {
    fn default() -> Self {
        Self::new()
    }
}

impl InputBox {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            cursor: 0,
            dimmed: false,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn insert_str(&mut self, text: &str) {
        let clean: String = text
            .chars()
            .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
            .collect();
        self.buffer.insert_str(self.cursor, &clean);
        self.cursor += clean.len();
    }

    fn prev_boundary(&self) -> usize {
        self.buffer[..self.cursor]
            .char_indices()
            .next_back()
            .map_or(0, |(i, _)| i)
    }

    fn next_boundary(&self) -> usize {
        self.buffer[self.cursor..]
            .chars()
            .next()
            .map_or(self.cursor, |c| self.cursor + c.len_utf8())
    }

    /// The slice to draw and the cursor column within it, for `width` columns.
    fn visible_window(&self, width: usize) -> (&str, usize) {
        let before = &self.buffer[..self.cursor];
        let mut start = 0;
        let mut cursor_col = col_width(before);
        // Drop characters from the left until the cursor fits.
        if width > 0 {
            for (i, c) in before.char_indices() {
                if cursor_col < width {
                    break;
                }
                cursor_col -= c.width().unwrap_or(0);
                start = i + c.len_utf8();
            }
        }
        (&self.buffer[start..], cursor_col)
    }
}

fn col_width(s: &str) -> usize {
    s.chars().map(|c| c.width().unwrap_or(0)).sum()
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let width = area.width.saturating_sub(HORIZONTAL_OVERHEAD) as usize;
        let (visible, cursor_col) = self.visible_window(width);

        let mut style = Style::default().fg(Color::Cyan);
        if self.dimmed {
            style = style.add_modifier(Modifier::DIM);
        }
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(style)
            .title(" 说点什么… (/save /load /saves /export /quit) ");

        frame.render_widget(Paragraph::new(visible.to_string()).style(style).block(block), area);

        if !self.dimmed {
            let x = area.x + 1 + cursor_col as u16;
            frame.set_cursor_position((x.min(area.right().saturating_sub(2)), area.y + 1));
        }
    }
}

impl EventHandler for InputBox {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::InputChar(c) => {
                let mut tmp = [0u8; 4];
                self.insert_str(c.encode_utf8(&mut tmp));
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Paste(text) => {
                self.insert_str(text);
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Backspace => (self.cursor > 0).then(|| {
                let prev = self.prev_boundary();
                self.buffer.drain(prev..self.cursor);
                self.cursor = prev;
                InputEvent::ContentChanged
            }),
            TuiEvent::Delete => (self.cursor < self.buffer.len()).then(|| {
                let next = self.next_boundary();
                self.buffer.drain(self.cursor..next);
                InputEvent::ContentChanged
            }),
            TuiEvent::CursorLeft => (self.cursor > 0).then(|| {
                self.cursor = self.prev_boundary();
                InputEvent::ContentChanged
            }),
            TuiEvent::CursorRight => (self.cursor < self.buffer.len()).then(|| {
                self.cursor = self.next_boundary();
                InputEvent::ContentChanged
            }),
            TuiEvent::Home => (self.cursor != 0).then(|| {
                self.cursor = 0;
                InputEvent::ContentChanged
            }),
            TuiEvent::End => (self.cursor != self.buffer.len()).then(|| {
                self.cursor = self.buffer.len();
                InputEvent::ContentChanged
            }),
            TuiEvent::Submit => {
                // Whitespace-only input is left in place and not submitted.
                if self.buffer.trim().is_empty() {
                    return None;
                }
                let text = std::mem::take(&mut self.buffer);
                self.cursor = 0;
                Some(InputEvent::Submit(text))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn typed(text: &str) -> InputBox {
        let mut input = InputBox::new();
        for c in text.chars() {
            input.handle_event(&TuiEvent::InputChar(c));
        }
        input
    }

    #[test]
    fn test_handle_input() {
        let mut input = InputBox::new();
        assert_eq!(
            input.handle_event(&TuiEvent::InputChar('a')),
            Some(InputEvent::ContentChanged)
        );
        input.handle_event(&TuiEvent::InputChar('好'));
        assert_eq!(input.buffer, "a好");
        assert_eq!(input.cursor(), 4);

        input.handle_event(&TuiEvent::Backspace);
        assert_eq!(input.buffer, "a");
        assert_eq!(input.cursor(), 1);
    }

    #[test]
    fn test_cursor_movement_respects_char_boundaries() {
        let mut input = typed("你好");
        input.handle_event(&TuiEvent::CursorLeft);
        assert_eq!(input.cursor(), 3);
        input.handle_event(&TuiEvent::InputChar('们'));
        assert_eq!(input.buffer, "你们好");
        input.handle_event(&TuiEvent::Home);
        input.handle_event(&TuiEvent::Delete);
        assert_eq!(input.buffer, "们好");
        assert_eq!(input.handle_event(&TuiEvent::CursorLeft), None);
        input.handle_event(&TuiEvent::End);
        assert_eq!(input.handle_event(&TuiEvent::CursorRight), None);
    }

    #[test]
    fn test_paste_flattens_newlines() {
        let mut input = InputBox::new();
        input.handle_event(&TuiEvent::Paste("one\ntwo\r\n".into()));
        assert_eq!(input.buffer, "one two  ");
    }

    #[test]
    fn test_submit() {
        let mut input = typed("hello");
        match input.handle_event(&TuiEvent::Submit) {
            Some(InputEvent::Submit(text)) => assert_eq!(text, "hello"),
            other => panic!("Expected Submit event, got {other:?}"),
        }
        assert!(input.buffer.is_empty());
        assert_eq!(input.cursor(), 0);
    }

    #[test]
    fn test_whitespace_is_not_submitted() {
        let mut input = typed("   ");
        assert_eq!(input.handle_event(&TuiEvent::Submit), None);
        assert_eq!(input.buffer, "   ");
    }

    #[test]
    fn test_window_scrolls_to_cursor() {
        let input = typed("abcdefghij");
        let (visible, col) = input.visible_window(4);
        assert!(visible.starts_with("ghij") || visible.starts_with("hij"));
        assert!(col < 4);

        // Wide chars count two columns each.
        let input = typed("你好世界");
        let (visible, col) = input.visible_window(4);
        assert_eq!(visible, "界");
        assert_eq!(col, 2);
    }

    #[test]
    fn test_render_shows_text_and_hint() {
        let backend = TestBackend::new(60, 3);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut input = typed("/saves");
        terminal
            .draw(|f| {
                let area = f.area();
                input.render(f, area);
            })
            .unwrap();
        let text = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>();
        assert!(text.contains("/saves"));
        assert!(text.contains("/export"));
    }
}
