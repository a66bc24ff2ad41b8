use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget, Wrap};

use crate::core::markup::sanitize_terminal;
use crate::core::transcript::{Entry, EntryKind, Role};
use crate::tui::component::Component;

/// Horizontal padding (per side) between the border and text content.
const CONTENT_PAD_H: u16 = 1;
/// Total horizontal space consumed by borders (1 left + 1 right) and padding.
const HORIZONTAL_OVERHEAD: u16 = 2 + CONTENT_PAD_H * 2;
/// Total vertical space consumed by borders (1 top + 1 bottom).
const VERTICAL_OVERHEAD: u16 = 2;

const TYPING_FRAMES: [&str; 3] = ["·", "· ·", "· · ·"];

/// A stateless component that renders one transcript entry.
///
/// Created fresh each frame by `TranscriptView`. Server text is passed through
/// `sanitize_terminal` before it reaches the buffer.
///
/// - **User** (cyan): what the player typed
/// - **Assistant** (magenta): the character's lines, titled with their name
/// - **System** (yellow): intro text and error reports
/// - **Typing placeholder**: animated dots while a reply is in flight
#[derive(Clone, Copy)]
pub struct Message<'a> {
    pub entry: &'a Entry,
    /// Title for assistant entries.
    pub character_name: &'a str,
    pub spinner_frame: usize,
}

impl<'a> Message<'a> {
    pub fn new(entry: &'a Entry, character_name: &'a str, spinner_frame: usize) -> Self {
        Self {
            entry,
            character_name,
            spinner_frame,
        }
    }

    /// Predict the rendered height at `width` without rendering.
    ///
    /// The wrap options mirror ratatui's `Paragraph` wrapping so the scroll
    /// canvas and the drawn messages line up.
    pub fn calculate_height(entry: &Entry, width: u16) -> u16 {
        let content_width = width.saturating_sub(HORIZONTAL_OVERHEAD);
        if content_width == 0 {
            return 1;
        }
        if entry.kind == EntryKind::TypingPlaceholder {
            return 1 + VERTICAL_OVERHEAD;
        }

        let content = sanitize_terminal(&entry.content);
        let content = content.trim();
        if content.is_empty() {
            return VERTICAL_OVERHEAD;
        }

        let options = textwrap::Options::new(content_width as usize)
            .break_words(true)
            .word_separator(textwrap::WordSeparator::AsciiSpace);

        let lines = textwrap::wrap(content, options);
        (lines.len() as u16).max(1) + VERTICAL_OVERHEAD
    }

    fn title(&self) -> &'a str {
        match self.entry.role {
            Role::User => "你",
            Role::Assistant => self.character_name,
            Role::System => "system",
        }
    }
}

pub fn role_style(role: Role) -> Style {
    match role {
        Role::User => Style::default().fg(Color::Cyan),
        Role::Assistant => Style::default().fg(Color::Magenta),
        Role::System => Style::default().fg(Color::Yellow),
    }
}

impl<'a> Widget for Message<'a> {
    fn render(self, area: Rect, buf: &mut ratatui::buffer::Buffer) {
        let style = role_style(self.entry.role);
        let border_style = style.add_modifier(Modifier::DIM);

        let block = Block::bordered()
            .title(self.title())
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title_style(border_style)
            .padding(Padding::horizontal(CONTENT_PAD_H));

        let inner_area = block.inner(area);
        block.render(area, buf);

        let paragraph = match self.entry.kind {
            EntryKind::TypingPlaceholder => {
                let dots = TYPING_FRAMES[self.spinner_frame % TYPING_FRAMES.len()];
                Paragraph::new(dots).style(style.add_modifier(Modifier::DIM))
            }
            EntryKind::Message => {
                let content = sanitize_terminal(&self.entry.content);
                Paragraph::new(content.trim().to_string())
                    .style(style)
                    .wrap(Wrap { trim: true })
            }
        };
        paragraph.render(inner_area, buf);
    }
}

impl<'a> Component for Message<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(*self, area);
    }
}
