//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! and translates keyboard events into core::Action values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Redraw Strategy
//!
//! - **Animating** (reveal in progress, counter moving, reply in flight):
//!   ticks and draws every ~33ms.
//! - **Idle**: sleeps up to 250ms and only redraws on events or when a
//!   background request completes.
//!
//! A `SteadyBlock` cursor style is used instead of a blinking cursor because
//! ratatui's `set_cursor_position` resets the terminal's blink timer on every
//! `draw()` call, making blinking cursors appear erratic during continuous redraws.

mod component;
pub mod components;
mod event;
mod ui;

use log::{debug, error, info, warn};
use std::io::stdout;
use std::path::Path;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
};
use crossterm::execute;

use crate::api::{GameBackend, HttpBackend};
use crate::core::action::{Action, Effect, Request, update};
use crate::core::config::ResolvedConfig;
use crate::core::controller;
use crate::core::state::{App, Screen};
use crate::core::transcript::EntryKind;
use crate::tui::component::EventHandler;
use crate::tui::components::{
    InputBox, InputEvent, SaveBrowserEvent, SaveBrowserState, TranscriptViewState, WelcomeEvent,
    WelcomeState,
};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

const ANIMATION_POLL: Duration = Duration::from_millis(33);
const IDLE_POLL: Duration = Duration::from_millis(250);

/// TUI-specific presentation state (not part of core game logic)
pub struct TuiState {
    pub transcript_view: TranscriptViewState,
    pub input_box: InputBox,
    pub welcome: WelcomeState,
    /// Save browser overlay (None = hidden)
    pub save_browser: Option<SaveBrowserState>,
}

impl TuiState {
    pub fn new(app: &App) -> Self {
        Self {
            transcript_view: TranscriptViewState::new(),
            input_box: InputBox::new(),
            welcome: WelcomeState::new(&app.default_role),
            save_browser: None,
        }
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock,
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, steady block cursor)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), DisableMouseCapture, DisableBracketedPaste, Hide);
    }
}

/// Something is moving on screen, or the reducer still owes the portrait
/// probe, so keep ticking.
fn is_animating(app: &App, now: Instant) -> bool {
    app.start_pending
        || app.is_animating(now)
        || (app.screen == Screen::Game && app.portrait.is_none())
        || app
            .transcript
            .entries()
            .iter()
            .any(|e| e.kind == EntryKind::TypingPlaceholder)
}

pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let backend: Arc<dyn GameBackend> = match HttpBackend::new(&config.server_url, config.timeout) {
        Ok(backend) => Arc::new(backend),
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            return Err(std::io::Error::other(e.to_string()));
        }
    };
    info!("Using server {}", config.server_url);

    let mut app = App::from_config(&config);
    let mut tui = TuiState::new(&app);

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel();

    let start_time = Instant::now();
    let mut needs_redraw = true; // Force first frame

    'main: loop {
        let now = Instant::now();
        let animating = is_animating(&app, now);
        if animating {
            if let Some(effect) = dispatch(&mut app, Action::Tick, now)
                && handle_effect(effect, &mut app, &mut tui, &backend, &tx)
            {
                break;
            }
            needs_redraw = true;
        }

        if needs_redraw {
            let spinner_frame = (start_time.elapsed().as_millis() / 300) as usize;
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui, now, spinner_frame))?;
            needs_redraw = false;
        }

        let timeout = if animating { ANIMATION_POLL } else { IDLE_POLL };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        // Process first event + drain all pending events before next draw
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            let now = Instant::now();
            for action in route_event(&event, &app, &mut tui) {
                if let Some(effect) = dispatch(&mut app, action, now)
                    && handle_effect(effect, &mut app, &mut tui, &backend, &tx)
                {
                    break 'main;
                }
            }
        }

        // Completions from background requests
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            if let Some(effect) = dispatch(&mut app, action, Instant::now())
                && handle_effect(effect, &mut app, &mut tui, &backend, &tx)
            {
                break 'main;
            }
        }
    }

    ratatui::restore();
    Ok(())
}

fn dispatch(app: &mut App, action: Action, now: Instant) -> Option<Effect> {
    match update(app, action, now) {
        Effect::None => None,
        effect => Some(effect),
    }
}

/// Translate a key event into actions, updating component state on the way.
fn route_event(event: &TuiEvent, app: &App, tui: &mut TuiState) -> Vec<Action> {
    match event {
        TuiEvent::Resize => return Vec::new(),
        TuiEvent::ForceQuit => return vec![Action::Quit],
        _ => {}
    }

    // Any key dismisses a notice and is otherwise swallowed.
    if app.notice.is_some() {
        return vec![Action::DismissNotice];
    }

    if let Some(browser) = tui.save_browser.as_mut() {
        return match browser.handle_event(event) {
            Some(SaveBrowserEvent::Load(slot)) => {
                tui.save_browser = None;
                vec![Action::Load { slot: Some(slot) }]
            }
            Some(SaveBrowserEvent::Dismiss) => {
                tui.save_browser = None;
                Vec::new()
            }
            None => Vec::new(),
        };
    }

    match event {
        TuiEvent::OpenSaves => return vec![Action::ListSaves],
        TuiEvent::QuickSave => return vec![Action::Save { slot: None, label: None }],
        TuiEvent::QuickLoad => return vec![Action::Load { slot: None }],
        _ => {}
    }

    match app.screen {
        Screen::Welcome => match tui.welcome.handle_event(event) {
            Some(WelcomeEvent::Start(role)) => vec![Action::StartGame { role }],
            None => Vec::new(),
        },
        Screen::Game => {
            if matches!(
                event,
                TuiEvent::ScrollUp
                    | TuiEvent::ScrollDown
                    | TuiEvent::ScrollPageUp
                    | TuiEvent::ScrollPageDown
                    | TuiEvent::CursorUp
                    | TuiEvent::CursorDown
            ) {
                let scroll = match event {
                    TuiEvent::CursorUp => TuiEvent::ScrollUp,
                    TuiEvent::CursorDown => TuiEvent::ScrollDown,
                    other => other.clone(),
                };
                tui.transcript_view.handle_event(&scroll);
                return Vec::new();
            }
            match tui.input_box.handle_event(event) {
                Some(InputEvent::Submit(text)) => vec![Action::Submit(text)],
                Some(InputEvent::ContentChanged) | None => Vec::new(),
            }
        }
    }
}

/// Perform an effect. Returns true when the loop should exit.
fn handle_effect(
    effect: Effect,
    app: &mut App,
    tui: &mut TuiState,
    backend: &Arc<dyn GameBackend>,
    tx: &mpsc::Sender<Action>,
) -> bool {
    match effect {
        Effect::None => false,
        Effect::Quit => true,
        Effect::Request(request) => {
            spawn_request(backend.clone(), request, tx.clone());
            false
        }
        Effect::ShowSaves(rows) => {
            tui.save_browser = Some(SaveBrowserState::new(rows));
            false
        }
        Effect::Export(path) => {
            let result = export(app, &path);
            let effect = update(app, Action::Exported { path, result }, Instant::now());
            handle_effect(effect, app, tui, backend, tx)
        }
    }
}

fn export(app: &App, path: &Path) -> Result<(), String> {
    let title = format!("Green Garden · {}", app.character_name);
    app.transcript
        .export_html(path, &title)
        .map_err(|e| e.to_string())
}

fn spawn_request(backend: Arc<dyn GameBackend>, request: Request, tx: mpsc::Sender<Action>) {
    debug!("Spawning request: {:?}", request);
    tokio::spawn(async move {
        let action = controller::perform(backend.as_ref(), request).await;
        if tx.send(action).is_err() {
            warn!("Failed to deliver request result: receiver dropped");
        }
    });
}
