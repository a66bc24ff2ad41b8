//! # Actions
//!
//! Everything that can happen in the client becomes an `Action`.
//! User presses Enter? That's `Action::Submit(text)`.
//! The server answers a chat? That's `Action::ChatReplied { .. }`.
//!
//! `update()` takes the current state and an action, mutates the state and
//! returns an `Effect` describing the I/O the caller should perform. No side
//! effects here; network requests run in `controller::perform`.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//!                                              │
//!                     Request ──▶ perform() ──▶ completion Action ──▶ update()
//! ```

use std::path::PathBuf;
use std::time::Instant;

use log::{debug, info, warn};
use uuid::Uuid;

use crate::api::{ApiError, ChatReply, LoadReply, SaveReply, SavesReply, StartReply, WireGameState};
use crate::api::types::history_slice;
use crate::core::characters::{self, Portrait};
use crate::core::command::{self, Command};
use crate::core::saves::{self, SaveSlotDescriptor};
use crate::core::state::{App, NoticeKind, Screen};
use crate::core::transcript::Role;

/// Where `/export` writes when no path is given.
pub const DEFAULT_EXPORT_PATH: &str = "greengarden-transcript.html";

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Begin a session as `role`.
    StartGame { role: String },
    GameStarted(Result<StartReply, ApiError>),
    /// Raw text from the input box: a slash command or a chat message.
    Submit(String),
    SendMessage(String),
    ChatReplied {
        placeholder: Uuid,
        result: Result<ChatReply, ApiError>,
    },
    /// Save to `slot`, or the current slot selector when `None`.
    Save {
        slot: Option<String>,
        label: Option<String>,
    },
    Saved {
        slot: String,
        result: Result<SaveReply, ApiError>,
    },
    Load { slot: Option<String> },
    Loaded {
        slot: String,
        result: Result<LoadReply, ApiError>,
    },
    ListSaves,
    SavesListed(Result<SavesReply, ApiError>),
    PortraitProbed {
        key: String,
        path: String,
        result: Result<(), ApiError>,
    },
    Exported {
        path: PathBuf,
        result: Result<(), String>,
    },
    /// Advance animations to the instant passed to `update`.
    Tick,
    DismissNotice,
    Quit,
}

/// A network round trip for `controller::perform`.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    StartGame { role: String },
    Chat { message: String, placeholder: Uuid },
    Save { slot: String, label: Option<String> },
    Load { slot: String },
    ListSaves,
    ProbePortrait { key: String, path: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    Request(Request),
    /// Open the save browser with these rows.
    ShowSaves(Vec<SaveSlotDescriptor>),
    /// Write the transcript as HTML to this path.
    Export(PathBuf),
    Quit,
}

pub fn update(app: &mut App, action: Action, now: Instant) -> Effect {
    match action {
        Action::StartGame { role } => {
            if app.sync.state().started || app.start_pending {
                debug!("Ignoring StartGame: session already started or starting");
                return Effect::None;
            }
            let role = role.to_lowercase();
            info!("Starting game as {}", role);
            app.start_pending = true;
            app.status_message = String::from("正在开始游戏...");
            Effect::Request(Request::StartGame { role })
        }

        Action::GameStarted(result) => {
            app.start_pending = false;
            match result {
                Ok(reply) => {
                    on_game_started(app, reply, now);
                    Effect::None
                }
                Err(e) => {
                    warn!("Start game failed: {}", e);
                    let text = format!("无法开始游戏：{e}");
                    app.append_message(Role::System, text.clone(), now);
                    app.status_message = text;
                    Effect::None
                }
            }
        }

        Action::Submit(text) => match command::parse(&text) {
            Some(command) => run_command(app, command, now),
            None => update(app, Action::SendMessage(text), now),
        },

        Action::SendMessage(text) => {
            let message = text.trim();
            if message.is_empty() {
                return Effect::None;
            }
            if app.screen != Screen::Game {
                debug!("Ignoring message before the game screen is shown");
                return Effect::None;
            }
            app.append_message(Role::User, message, now);
            let placeholder = app.push_placeholder(now);
            debug!("Sending message ({} bytes), placeholder {}", message.len(), placeholder);
            Effect::Request(Request::Chat {
                message: message.to_string(),
                placeholder,
            })
        }

        Action::ChatReplied {
            placeholder,
            result,
        } => {
            // A load in between rebuilt the transcript; the reply belongs to a
            // conversation that is no longer shown.
            if !app.transcript.remove(placeholder) {
                debug!("Dropping chat reply for placeholder {}", placeholder);
                return Effect::None;
            }
            match result {
                Ok(reply) => app.start_reveal(reply, now),
                Err(e) => {
                    warn!("Chat failed: {}", e);
                    app.append_message(Role::System, format!("发送消息失败：{e}"), now);
                }
            }
            Effect::None
        }

        Action::Save { slot, label } => {
            let slot = select_slot(app, slot);
            info!("Saving to slot {}", slot);
            app.status_message = String::from("正在保存...");
            Effect::Request(Request::Save {
                slot,
                label: label.filter(|l| !l.trim().is_empty()),
            })
        }

        Action::Saved { slot, result } => {
            match result {
                Ok(SaveReply { success: true, .. }) => {
                    app.notify(NoticeKind::Success, format!("保存成功 (槽位 {slot})"));
                }
                Ok(reply) => {
                    app.notify(NoticeKind::Error, with_server_message("保存失败", &reply.message));
                }
                Err(e) => {
                    warn!("Save failed: {}", e);
                    app.notify(NoticeKind::Error, format!("保存失败：{e}"));
                }
            }
            Effect::None
        }

        Action::Load { slot } => {
            let slot = select_slot(app, slot);
            info!("Loading slot {}", slot);
            app.status_message = String::from("正在读取...");
            Effect::Request(Request::Load { slot })
        }

        Action::Loaded { slot, result } => {
            match result {
                Ok(LoadReply {
                    success: true,
                    game_state: Some(state),
                    history,
                    character_key,
                    ..
                }) => on_loaded(app, &slot, &state, &history, character_key.as_deref(), now),
                Ok(reply) => {
                    app.notify(
                        NoticeKind::Error,
                        with_server_message("读取失败或槽位为空", &reply.message),
                    );
                }
                Err(e) => {
                    warn!("Load failed: {}", e);
                    app.notify(NoticeKind::Error, format!("读取失败：{e}"));
                }
            }
            Effect::None
        }

        Action::ListSaves => {
            app.status_message = String::from("正在加载存档列表...");
            Effect::Request(Request::ListSaves)
        }

        Action::SavesListed(result) => match result {
            Ok(reply) => {
                let rows = saves::descriptors(&reply);
                debug!("Listed {} saves", rows.len());
                app.status_message = format!("{} saves", rows.len());
                Effect::ShowSaves(rows)
            }
            Err(e) => {
                warn!("List saves failed: {}", e);
                app.notify(NoticeKind::Error, format!("获取存档列表失败：{e}"));
                Effect::None
            }
        },

        Action::PortraitProbed { key, path, result } => {
            // A probe for a character we've since moved away from is stale.
            if key != app.character_key {
                return Effect::None;
            }
            app.portrait = Some(match result {
                Ok(()) => Portrait::Loaded(path),
                Err(e) => {
                    warn!("Portrait {} unavailable ({}), using fallback", path, e);
                    Portrait::Fallback
                }
            });
            Effect::None
        }

        Action::Exported { path, result } => {
            match result {
                Ok(()) => {
                    info!("Exported transcript to {}", path.display());
                    app.notify(NoticeKind::Success, format!("Exported to {}", path.display()));
                }
                Err(e) => {
                    warn!("Export to {} failed: {}", path.display(), e);
                    app.notify(NoticeKind::Error, format!("Export failed: {e}"));
                }
            }
            Effect::None
        }

        Action::Tick => {
            app.advance_reveal(now);
            app.sync.tick(now);
            probe_portrait_if_needed(app)
        }

        Action::DismissNotice => {
            app.notice = None;
            Effect::None
        }

        Action::Quit => {
            info!("Quit requested");
            Effect::Quit
        }
    }
}

fn on_game_started(app: &mut App, reply: StartReply, now: Instant) {
    info!("Game started");
    app.flush_reveal(now);
    app.screen = Screen::Game;
    app.sync
        .apply(&reply.game_state.unwrap_or_default(), now);

    let history = history_slice(&reply.history);
    if !history.is_empty() {
        app.transcript.render(history);
    } else if let Some(intro) = reply.intro_text.filter(|t| !t.is_empty()) {
        app.append_message(Role::System, intro, now);
    }

    app.sync.mark_started();
    app.input_focused = true;
    app.set_character(
        reply.character_key.as_deref(),
        reply.character_name.as_deref(),
    );
    app.status_message = format!("Chatting with {}", app.character_name);
}

fn on_loaded(
    app: &mut App,
    slot: &str,
    state: &WireGameState,
    history: &Option<Vec<crate::api::HistoryMessage>>,
    character_key: Option<&str>,
    now: Instant,
) {
    info!("Loaded slot {}", slot);
    app.flush_reveal(now);
    app.sync.apply(state, now);
    app.set_character(character_key, None);
    app.screen = Screen::Game;

    let history = history_slice(history);
    if !history.is_empty() {
        app.transcript.render(history);
    }

    app.sync.mark_started();
    app.input_focused = true;
    app.notify(NoticeKind::Success, format!("读取成功 (槽位 {slot})"));
}

fn run_command(app: &mut App, command: Command, now: Instant) -> Effect {
    debug!("Command: {:?}", command);
    match command {
        Command::Save { slot, label } => update(app, Action::Save { slot, label }, now),
        Command::Load { slot } => update(app, Action::Load { slot }, now),
        Command::ListSaves => update(app, Action::ListSaves, now),
        Command::Export { path } => {
            Effect::Export(path.unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_PATH)))
        }
        Command::Quit => update(app, Action::Quit, now),
        Command::Unknown(name) => {
            app.notify(NoticeKind::Error, format!("Unknown command: /{name}"));
            Effect::None
        }
    }
}

/// An explicit slot also moves the selector, so later saves reuse it.
fn select_slot(app: &mut App, slot: Option<String>) -> String {
    if let Some(slot) = slot.filter(|s| !s.is_empty()) {
        app.current_slot = slot;
    }
    app.current_slot.clone()
}

fn with_server_message(prefix: &str, message: &Option<String>) -> String {
    match message.as_deref().filter(|m| !m.is_empty()) {
        Some(m) => format!("{prefix}：{m}"),
        None => prefix.to_string(),
    }
}

fn probe_portrait_if_needed(app: &mut App) -> Effect {
    if app.screen != Screen::Game || app.portrait.is_some() {
        return Effect::None;
    }
    let key = app.character_key.clone();
    let path = characters::portrait_path(&key);
    app.portrait = Some(Portrait::Pending(path.clone()));
    Effect::Request(Request::ProbePortrait { key, path })
}
