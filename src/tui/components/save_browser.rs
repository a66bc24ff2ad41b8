//! # Save Browser Component
//!
//! Overlay listing the server's save slots. Opened with Ctrl+O or `/saves`,
//! dismissed with Esc. Enter loads the selected slot.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `SaveBrowserState` lives in `TuiState` while the overlay is open
//! - `SaveBrowser` is created each frame with borrowed state

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Padding, Paragraph};

use crate::core::saves::SaveSlotDescriptor;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::{centered_rect, truncate_to_width};
use crate::tui::event::TuiEvent;

pub const EMPTY_TEXT: &str = "暂无存档 / No saves yet";

/// Persistent state for the save browser overlay.
pub struct SaveBrowserState {
    pub rows: Vec<SaveSlotDescriptor>,
    pub selected: usize,
    pub list_state: ListState,
}

impl SaveBrowserState {
    pub fn new(rows: Vec<SaveSlotDescriptor>) -> Self {
        let mut list_state = ListState::default();
        if !rows.is_empty() {
            list_state.select(Some(0));
        }
        Self {
            rows,
            selected: 0,
            list_state,
        }
    }
}

/// Events emitted by the save browser.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveBrowserEvent {
    Load(String),
    Dismiss,
}

impl EventHandler for SaveBrowserState {
    type Event = SaveBrowserEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::Escape => Some(SaveBrowserEvent::Dismiss),
            TuiEvent::CursorUp => {
                if !self.rows.is_empty() {
                    self.selected = self.selected.saturating_sub(1);
                    self.list_state.select(Some(self.selected));
                }
                None
            }
            TuiEvent::CursorDown => {
                if !self.rows.is_empty() {
                    self.selected = (self.selected + 1).min(self.rows.len() - 1);
                    self.list_state.select(Some(self.selected));
                }
                None
            }
            // Rows without a slot id cannot be loaded.
            TuiEvent::Submit => self
                .rows
                .get(self.selected)
                .filter(|row| !row.slot.is_empty())
                .map(|row| SaveBrowserEvent::Load(row.slot.clone())),
            _ => None,
        }
    }
}

/// Transient render wrapper for the save browser overlay.
pub struct SaveBrowser<'a> {
    state: &'a mut SaveBrowserState,
}

impl<'a> SaveBrowser<'a> {
    pub fn new(state: &'a mut SaveBrowserState) -> Self {
        Self { state }
    }
}

impl<'a> Component for SaveBrowser<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let overlay = centered_rect(80, 70, area);
        frame.render_widget(Clear, overlay);

        let help_text = if self.state.rows.is_empty() {
            " Esc Back "
        } else {
            " ↑↓ Select  Enter Load  Esc Back "
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" 存档 ")
            .title_alignment(Alignment::Left)
            .title_bottom(Line::from(help_text).centered())
            .padding(Padding::horizontal(1));

        if self.state.rows.is_empty() {
            let empty = Paragraph::new(EMPTY_TEXT)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(empty, overlay);
            return;
        }

        let inner_width = overlay.width.saturating_sub(4) as usize;
        let items: Vec<ListItem> = self
            .state
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let style = if i == self.state.selected {
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD | Modifier::REVERSED)
                } else {
                    Style::default().fg(Color::Gray)
                };
                ListItem::new(Line::from(Span::styled(
                    truncate_to_width(&row.line(), inner_width),
                    style,
                )))
            })
            .collect();

        let list = List::new(items).block(block);
        frame.render_stateful_widget(list, overlay, &mut self.state.list_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn row(slot: &str, role: &str) -> SaveSlotDescriptor {
        SaveSlotDescriptor {
            slot: slot.to_string(),
            label: None,
            role_or_character_name: role.to_string(),
            timestamp: "2024-05-01 10:00".to_string(),
        }
    }

    fn draw(state: &mut SaveBrowserState) -> String {
        let backend = TestBackend::new(80, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                SaveBrowser::new(state).render(f, area);
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn navigation_and_load() {
        let mut state = SaveBrowserState::new(vec![row("1", "su_tang"), row("3", "gu_pan")]);
        assert_eq!(state.list_state.selected(), Some(0));
        state.handle_event(&TuiEvent::CursorDown);
        state.handle_event(&TuiEvent::CursorDown);
        assert_eq!(state.selected, 1);
        assert_eq!(
            state.handle_event(&TuiEvent::Submit),
            Some(SaveBrowserEvent::Load("3".into()))
        );
        state.handle_event(&TuiEvent::CursorUp);
        assert_eq!(state.selected, 0);
    }

    #[test]
    fn empty_list_cannot_load() {
        let mut state = SaveBrowserState::new(Vec::new());
        assert_eq!(state.list_state.selected(), None);
        state.handle_event(&TuiEvent::CursorDown);
        assert_eq!(state.handle_event(&TuiEvent::Submit), None);
        assert_eq!(
            state.handle_event(&TuiEvent::Escape),
            Some(SaveBrowserEvent::Dismiss)
        );
    }

    #[test]
    fn row_without_slot_is_not_loadable() {
        let mut state = SaveBrowserState::new(vec![row("", "su_tang")]);
        assert_eq!(state.handle_event(&TuiEvent::Submit), None);
    }

    #[test]
    fn renders_rows() {
        let mut state = SaveBrowserState::new(vec![row("2", "lin_yuhan")]);
        let text = draw(&mut state);
        assert!(text.contains("lin_yuhan | slot: 2 | time: 2024-05-01 10:00"));
        assert!(text.contains("Enter Load"));
    }

    #[test]
    fn renders_empty_row() {
        let mut state = SaveBrowserState::new(Vec::new());
        let text = draw(&mut state);
        assert!(text.contains("No saves yet"));
    }
}
