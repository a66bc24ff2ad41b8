//! Popup for save/load/export outcomes. Any key dismisses it.

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Clear, Padding, Paragraph, Wrap};
use unicode_width::UnicodeWidthStr;

use crate::core::state::{Notice, NoticeKind};
use crate::tui::component::Component;

const MIN_WIDTH: u16 = 24;
/// Borders plus horizontal padding.
const HORIZONTAL_OVERHEAD: u16 = 4;

pub struct NoticeOverlay<'a> {
    pub notice: &'a Notice,
}

impl<'a> NoticeOverlay<'a> {
    pub fn new(notice: &'a Notice) -> Self {
        Self { notice }
    }

    fn color(&self) -> Color {
        match self.notice.kind {
            NoticeKind::Success => Color::Green,
            NoticeKind::Error => Color::Red,
        }
    }

    /// Box sized to the text, centered in `area`.
    fn rect(&self, area: Rect) -> Rect {
        let text_width = self.notice.text.width() as u16;
        let width = (text_width + HORIZONTAL_OVERHEAD)
            .max(MIN_WIDTH)
            .min(area.width);
        let inner = width.saturating_sub(HORIZONTAL_OVERHEAD).max(1);
        let lines = text_width.div_ceil(inner).max(1);
        let height = (lines + 2).min(area.height);
        Rect::new(
            area.x + (area.width - width) / 2,
            area.y + (area.height - height) / 2,
            width,
            height,
        )
    }
}

impl<'a> Component for NoticeOverlay<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let rect = self.rect(area);
        let color = self.color();
        let title = match self.notice.kind {
            NoticeKind::Success => " ✓ ",
            NoticeKind::Error => " ✗ ",
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(color))
            .title(Line::from(title).style(Style::default().fg(color).add_modifier(Modifier::BOLD)))
            .title_bottom(Line::from(" any key ").centered().style(Style::default().fg(Color::DarkGray)))
            .padding(Padding::horizontal(1));

        frame.render_widget(Clear, rect);
        frame.render_widget(
            Paragraph::new(self.notice.text.as_str())
                .style(Style::default().fg(color))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .block(block),
            rect,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn notice(kind: NoticeKind, text: &str) -> Notice {
        Notice {
            kind,
            text: text.to_string(),
        }
    }

    #[test]
    fn rect_fits_short_text_and_centers() {
        let n = notice(NoticeKind::Success, "Saved");
        let rect = NoticeOverlay::new(&n).rect(Rect::new(0, 0, 80, 20));
        assert_eq!(rect.width, MIN_WIDTH);
        assert_eq!(rect.height, 3);
        assert_eq!(rect.x, (80 - MIN_WIDTH) / 2);
    }

    #[test]
    fn rect_never_exceeds_area() {
        let n = notice(NoticeKind::Error, &"x".repeat(200));
        let area = Rect::new(0, 0, 40, 5);
        let rect = NoticeOverlay::new(&n).rect(area);
        assert!(rect.width <= 40);
        assert!(rect.height <= 5);
    }

    #[test]
    fn renders_text_in_kind_colour() {
        let backend = TestBackend::new(60, 10);
        let mut terminal = Terminal::new(backend).unwrap();
        let n = notice(NoticeKind::Error, "Export failed: denied");
        terminal
            .draw(|f| {
                let area = f.area();
                NoticeOverlay::new(&n).render(f, area);
            })
            .unwrap();
        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Export failed: denied"));
        let red = buffer
            .content()
            .iter()
            .any(|c| c.symbol() == "E" && c.fg == Color::Red);
        assert!(red);
    }
}
