//! # TUI Components
//!
//! Components follow two patterns.
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Display components that receive all data as fields and are rebuilt each
//! frame:
//! - `TitleBar`: app name, character, status message
//! - `Message`: one transcript entry
//! - `AffectionPanel`: closeness counter, meter, delta indicator and labels
//! - `NoticeOverlay`: transient success/error toast
//!
//! ### Stateful Components (Event-Driven)
//!
//! Persistent state lives in `TuiState`; a transient wrapper borrows it for
//! the frame. The state type turns `TuiEvent`s into component events:
//! - `InputBox`: message and slash-command input
//! - `TranscriptView` / `TranscriptViewState`: scrollable transcript
//! - `Welcome` / `WelcomeState`: character picker
//! - `SaveBrowser` / `SaveBrowserState`: save list overlay
//!
//! ```text
//! components/
//! ├── mod.rs              (this file, shared width helpers)
//! ├── title_bar.rs
//! ├── message.rs
//! ├── transcript_view.rs
//! ├── affection_panel.rs
//! ├── input_box.rs
//! ├── welcome.rs
//! ├── notice.rs
//! └── save_browser.rs
//! ```

use ratatui::layout::{Constraint, Layout, Rect};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub mod affection_panel;
pub mod input_box;
pub mod message;
pub mod notice;
pub mod save_browser;
pub mod title_bar;
pub mod transcript_view;
pub mod welcome;

pub use affection_panel::AffectionPanel;
pub use input_box::{InputBox, InputEvent};
pub use message::Message;
pub use notice::NoticeOverlay;
pub use save_browser::{SaveBrowser, SaveBrowserEvent, SaveBrowserState};
pub use title_bar::TitleBar;
pub use transcript_view::{TranscriptView, TranscriptViewState};
pub use welcome::{Welcome, WelcomeEvent, WelcomeState};

/// Truncate `s` to at most `max` terminal columns, ending in "…" when cut.
pub fn truncate_to_width(s: &str, max: usize) -> String {
    if s.width() <= max {
        return s.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

/// Compute a centered rect using percentage of the outer rect.
pub fn centered_rect(percent_x: u16, percent_y: u16, outer: Rect) -> Rect {
    let [_, center_v, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(outer);
    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(center_v);
    center
}
