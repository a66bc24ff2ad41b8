use std::time::Instant;

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};

use crate::core::state::{App, Screen};
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::input_box::INPUT_HEIGHT;
use crate::tui::components::{
    AffectionPanel, NoticeOverlay, SaveBrowser, TitleBar, TranscriptView, Welcome,
};

/// Width of the affection side panel on the game screen.
pub const PANEL_WIDTH: u16 = 32;

/// ```text
/// ┌ title bar ─────────────────────────────────────┐
/// │ transcript                     │ affection     │
/// │                                │ panel         │
/// ├ input ─────────────────────────┴───────────────┤
/// ```
pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState, now: Instant, spinner_frame: usize) {
    use Constraint::{Length, Min};
    let [title_area, main_area] = Layout::vertical([Length(1), Min(0)]).areas(frame.area());

    let (character_name, has_unseen) = match app.screen {
        Screen::Welcome => (String::new(), false),
        Screen::Game => (
            app.character_name.clone(),
            tui.transcript_view.has_unseen_content(),
        ),
    };
    TitleBar::new(character_name, app.status_message.clone(), has_unseen).render(frame, title_area);

    match app.screen {
        Screen::Welcome => {
            Welcome::new(&mut tui.welcome, &app.status_message).render(frame, main_area);
        }
        Screen::Game => draw_game(frame, main_area, app, tui, now, spinner_frame),
    }

    if let Some(browser) = tui.save_browser.as_mut() {
        SaveBrowser::new(browser).render(frame, main_area);
    }
    if let Some(notice) = &app.notice {
        NoticeOverlay::new(notice).render(frame, main_area);
    }
}

fn draw_game(
    frame: &mut Frame,
    area: Rect,
    app: &App,
    tui: &mut TuiState,
    now: Instant,
    spinner_frame: usize,
) {
    use Constraint::{Length, Min};
    let [body_area, input_area] = Layout::vertical([Min(0), Length(INPUT_HEIGHT)]).areas(area);

    // Narrow terminals drop the side panel rather than squeezing the transcript.
    let show_panel = body_area.width >= PANEL_WIDTH * 2;
    let (transcript_area, panel_area) = if show_panel {
        let [left, right] = Layout::horizontal([Min(0), Length(PANEL_WIDTH)]).areas(body_area);
        (left, Some(right))
    } else {
        (body_area, None)
    };

    TranscriptView::new(
        &mut tui.transcript_view,
        &app.transcript,
        &app.character_name,
        spinner_frame,
    )
    .render(frame, transcript_area);

    if let Some(panel_area) = panel_area {
        AffectionPanel::new(&app.sync, &app.character_name, app.portrait.as_ref(), now)
            .render(frame, panel_area);
    }

    tui.input_box.dimmed = !app.input_focused || tui.save_browser.is_some();
    tui.input_box.render(frame, input_area);
}
