//! # TranscriptView Component
//!
//! Scrollable view of the chat transcript.
//!
//! `TranscriptView` is a transient component (created each frame) that wraps
//! `&'a mut TranscriptViewState` (persistent state) and the `Transcript` (props).
//!
//! Every transcript mutation bumps its revision. When the view sees a new
//! revision it re-pins to the bottom, so the newest entry is always visible
//! after an append, a history render, or a reveal step. The user can scroll
//! away in between; scrolling back down to the end pins again.

use ratatui::Frame;
use ratatui::layout::{Position, Rect, Size};
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::transcript::Transcript;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::message::Message;
use crate::tui::event::TuiEvent;

/// Layout and scroll state for the transcript. Lives in `TuiState`.
pub struct TranscriptViewState {
    pub scroll_state: ScrollViewState,
    pub layout: LayoutCache,
    /// When true, follow the bottom as content grows.
    pub stick_to_bottom: bool,
    /// Last known viewport height (for scroll clamping between frames)
    pub viewport_height: u16,
    /// Transcript revision the view last rendered.
    seen_revision: Option<u64>,
}

impl Default for TranscriptViewState {
    fn default() -> Self {
        Self::new()
    }
}

impl TranscriptViewState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            layout: LayoutCache::new(),
            stick_to_bottom: true,
            viewport_height: 0,
            seen_revision: None,
        }
    }

    fn total_height(&self) -> u16 {
        self.layout.prefix_heights.last().copied().unwrap_or(0)
    }

    fn max_offset(&self) -> u16 {
        self.total_height().saturating_sub(self.viewport_height)
    }

    /// Clamp scroll offset so it never exceeds the content bounds.
    pub fn clamp_scroll(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y > max_y {
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// Re-engage auto-scroll if the user has reached the bottom.
    pub fn repin_if_at_bottom(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y >= max_y {
            self.stick_to_bottom = true;
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// True when content exists below the viewport.
    pub fn has_unseen_content(&self) -> bool {
        !self.stick_to_bottom && self.scroll_state.offset().y < self.max_offset()
    }
}

/// Scrollable transcript component. Created fresh each frame.
pub struct TranscriptView<'a> {
    pub state: &'a mut TranscriptViewState,
    pub transcript: &'a Transcript,
    pub character_name: &'a str,
    pub spinner_frame: usize,
}

impl<'a> TranscriptView<'a> {
    pub fn new(
        state: &'a mut TranscriptViewState,
        transcript: &'a Transcript,
        character_name: &'a str,
        spinner_frame: usize,
    ) -> Self {
        Self {
            state,
            transcript,
            character_name,
            spinner_frame,
        }
    }
}

impl<'a> Component for TranscriptView<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let content_width = area.width.saturating_sub(1); // -1 for scrollbar
        let entries = self.transcript.entries();
        let revision = self.transcript.revision();

        // 1. Layout
        if self.state.seen_revision != Some(revision) {
            self.state.stick_to_bottom = true;
            self.state.seen_revision = Some(revision);
        }
        self.state.layout.refresh(self.transcript, content_width);

        // 2. Scroll bounds
        self.state.viewport_height = area.height;
        if !self.state.stick_to_bottom {
            self.state.clamp_scroll();
        }

        let total_height = self.state.total_height();
        // A pinned view is about to jump to the end; lay out for where it lands.
        let scroll_offset = if self.state.stick_to_bottom {
            self.state.max_offset()
        } else {
            self.state.scroll_state.offset().y
        };
        let visible_range = self.state.layout.visible_range(scroll_offset, area.height);

        // 3. Render visible entries into the scroll canvas
        let mut scroll_view = ScrollView::new(Size::new(content_width, total_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        let mut y_offset: u16 = if visible_range.start > 0 {
            self.state.layout.prefix_heights[visible_range.start - 1]
        } else {
            0
        };

        for i in visible_range {
            let height = self.state.layout.heights[i];
            let rect = Rect::new(0, y_offset, content_width, height);
            let message = Message::new(&entries[i], self.character_name, self.spinner_frame);
            scroll_view.render_widget(message, rect);
            y_offset += height;
        }

        if self.state.stick_to_bottom {
            self.state.scroll_state.scroll_to_bottom();
        }

        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);
    }
}

impl EventHandler for TranscriptViewState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp => {
                self.scroll_state.scroll_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollDown => {
                self.scroll_state.scroll_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::ScrollPageUp => {
                self.scroll_state.scroll_page_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
                self.repin_if_at_bottom();
            }
            _ => {}
        }
        None
    }
}

/// Cached entry heights, rebuilt when the transcript or width changes.
pub struct LayoutCache {
    pub heights: Vec<u16>,
    pub prefix_heights: Vec<u16>,
    revision: Option<u64>,
    content_width: u16,
}

impl Default for LayoutCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutCache {
    pub fn new() -> Self {
        Self {
            heights: Vec::new(),
            prefix_heights: Vec::new(),
            revision: None,
            content_width: 0,
        }
    }

    pub fn is_valid_for(&self, revision: u64, content_width: u16) -> bool {
        self.revision == Some(revision) && self.content_width == content_width
    }

    pub fn refresh(&mut self, transcript: &Transcript, content_width: u16) {
        if self.is_valid_for(transcript.revision(), content_width) {
            return;
        }
        self.heights = transcript
            .entries()
            .iter()
            .map(|entry| Message::calculate_height(entry, content_width))
            .collect();
        self.rebuild_prefix_heights();
        self.revision = Some(transcript.revision());
        self.content_width = content_width;
    }

    pub fn rebuild_prefix_heights(&mut self) {
        self.prefix_heights = self
            .heights
            .iter()
            .scan(0u16, |acc, &h| {
                *acc = acc.saturating_add(h);
                Some(*acc)
            })
            .collect();
    }

    /// Entries overlapping the viewport, with half a screen of buffer each side.
    pub fn visible_range(&self, scroll_offset: u16, viewport_height: u16) -> std::ops::Range<usize> {
        let buffer = viewport_height / 2;
        let buffered_start = scroll_offset.saturating_sub(buffer);
        let buffered_end = scroll_offset
            .saturating_add(viewport_height)
            .saturating_add(buffer);

        let start = self
            .prefix_heights
            .partition_point(|&end| end <= buffered_start);
        let end = self
            .prefix_heights
            .partition_point(|&end| end < buffered_end)
            .saturating_add(1)
            .min(self.prefix_heights.len());

        start..end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transcript::Role;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn draw(state: &mut TranscriptViewState, transcript: &Transcript, height: u16) -> String {
        let backend = TestBackend::new(40, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                TranscriptView::new(state, transcript, "Su Tang", 0).render(f, area);
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

    fn long_transcript(n: usize) -> Transcript {
        let mut t = Transcript::new();
        for i in 0..n {
            t.append(Role::User, format!("message {i}"));
        }
        t
    }

    #[test]
    fn test_layout_cache_tracks_revision_and_width() {
        let mut t = long_transcript(3);
        let mut cache = LayoutCache::new();
        cache.refresh(&t, 40);
        assert_eq!(cache.heights, vec![3, 3, 3]);
        assert_eq!(cache.prefix_heights, vec![3, 6, 9]);
        assert!(cache.is_valid_for(t.revision(), 40));
        assert!(!cache.is_valid_for(t.revision(), 20));

        t.append(Role::System, "one more");
        assert!(!cache.is_valid_for(t.revision(), 40));
        cache.refresh(&t, 40);
        assert_eq!(cache.heights.len(), 4);
    }

    #[test]
    fn test_visible_range() {
        let mut cache = LayoutCache::new();
        cache.heights = vec![3; 20];
        cache.rebuild_prefix_heights();
        // Offset 30, viewport 6: buffered window 27..39 covers entries 9..=12.
        assert_eq!(cache.visible_range(30, 6), 9..13);
        assert_eq!(cache.visible_range(0, 6), 0..3);
    }

    #[test]
    fn newest_entry_is_visible_after_append() {
        let mut state = TranscriptViewState::new();
        let mut t = long_transcript(10);
        draw(&mut state, &t, 9);

        t.append(Role::Assistant, "the newest line");
        let text = draw(&mut state, &t, 9);
        assert!(text.contains("the newest line"));
        assert!(!text.contains("message 0"));
    }

    #[test]
    fn scrolling_up_unpins_until_next_mutation() {
        let mut state = TranscriptViewState::new();
        let mut t = long_transcript(10);
        draw(&mut state, &t, 9);

        state.handle_event(&TuiEvent::ScrollPageUp);
        assert!(!state.stick_to_bottom);
        draw(&mut state, &t, 9);
        assert!(state.has_unseen_content());

        t.append(Role::User, "pinned again");
        let text = draw(&mut state, &t, 9);
        assert!(state.stick_to_bottom);
        assert!(text.contains("pinned again"));
    }

    #[test]
    fn scrolling_to_end_repins() {
        let mut state = TranscriptViewState::new();
        let t = long_transcript(4);
        draw(&mut state, &t, 9);
        state.handle_event(&TuiEvent::ScrollUp);
        draw(&mut state, &t, 9);
        for _ in 0..10 {
            state.handle_event(&TuiEvent::ScrollDown);
        }
        assert!(state.stick_to_bottom);
    }
}
