//! # Welcome Screen
//!
//! Character picker shown before a game starts. Up/Down move the selection,
//! Enter starts a game with the selected role.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, List, ListItem, ListState, Padding, Paragraph, Wrap};

use crate::core::characters::{ROSTER, roster_index};
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

#[derive(Debug, Clone, PartialEq)]
pub enum WelcomeEvent {
    Start(String),
}

pub struct WelcomeState {
    pub selected: usize,
    pub list_state: ListState,
}

impl WelcomeState {
    pub fn new(default_role: &str) -> Self {
        let selected = roster_index(default_role);
        Self {
            selected,
            list_state: ListState::default().with_selected(Some(selected)),
        }
    }

    pub fn selected_key(&self) -> &'static str {
        ROSTER[self.selected].key
    }

    fn select(&mut self, index: usize) {
        self.selected = index.min(ROSTER.len() - 1);
        self.list_state.select(Some(self.selected));
    }
}

impl EventHandler for WelcomeState {
    type Event = WelcomeEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::CursorUp => {
                self.select(self.selected.saturating_sub(1));
                None
            }
            TuiEvent::CursorDown => {
                self.select(self.selected + 1);
                None
            }
            TuiEvent::Submit => Some(WelcomeEvent::Start(self.selected_key().to_string())),
            _ => None,
        }
    }
}

/// Transient render wrapper for the welcome screen.
pub struct Welcome<'a> {
    pub state: &'a mut WelcomeState,
    pub status_message: &'a str,
}

impl<'a> Welcome<'a> {
    pub fn new(state: &'a mut WelcomeState, status_message: &'a str) -> Self {
        Self {
            state,
            status_message,
        }
    }
}

impl<'a> Component for Welcome<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Green).add_modifier(Modifier::DIM))
            .title(" 选择角色 ")
            .title_bottom(Line::from(" ↑↓ Select  Enter Start  Ctrl+O Saves  Ctrl+C Quit ").centered())
            .padding(Padding::horizontal(1));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [list_area, _, brief_area, status_area] = Layout::vertical([
            Constraint::Length(ROSTER.len() as u16),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .flex(Flex::Center)
        .areas(inner);

        let items: Vec<ListItem> = ROSTER
            .iter()
            .map(|c| {
                ListItem::new(Line::from(vec![
                    Span::styled(format!("{:<12}", c.key), Style::default().fg(Color::DarkGray)),
                    Span::raw(c.name),
                ]))
            })
            .collect();
        let list = List::new(items)
            .highlight_style(
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED),
            )
            .highlight_symbol("› ");
        frame.render_stateful_widget(list, list_area, &mut self.state.list_state);

        let brief = ROSTER[self.state.selected].brief;
        frame.render_widget(
            Paragraph::new(brief)
                .style(Style::default().fg(Color::Gray))
                .wrap(Wrap { trim: true }),
            brief_area,
        );

        frame.render_widget(
            Paragraph::new(self.status_message)
                .style(Style::default().fg(Color::Yellow))
                .alignment(Alignment::Center),
            status_area,
        );
    }
}
