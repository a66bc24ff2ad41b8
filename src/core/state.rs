//! # Application State
//!
//! Core business state for the client. Domain logic only; presentation
//! state (scroll offsets, the input buffer, overlays) lives in the `tui` module.
//!
//! ```text
//! App
//! ├── screen: Screen                 // welcome or game
//! ├── sync: StateSync                // affection meter + GameState mirror
//! ├── transcript: Transcript         // rendered chat entries
//! ├── reveal: Option<ActiveReveal>   // reply currently being typed out
//! ├── character_key / character_name
//! ├── portrait: Option<Portrait>     // probe state of the current portrait
//! ├── current_slot: String           // save/load slot selector
//! ├── start_pending: bool            // StartGame in flight
//! ├── status_message: String         // status bar text
//! └── notice: Option<Notice>         // success / error popup
//! ```
//!
//! State changes only happen through `update(state, action, now)` in action.rs.

use std::time::Instant;

use log::debug;
use uuid::Uuid;

use crate::api::ChatReply;
use crate::core::animation::{AnimationTimings, Reveal};
use crate::core::characters::{self, Portrait};
use crate::core::config::ResolvedConfig;
use crate::core::sync::StateSync;
use crate::core::transcript::{Role, Transcript};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Welcome,
    Game,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A popup message. Dismissed by any key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

/// An assistant reply being revealed, plus the reply whose state lands once
/// the last character is shown.
#[derive(Debug)]
pub struct ActiveReveal {
    pub key: Uuid,
    pub reveal: Reveal,
    pub pending: ChatReply,
}

pub struct App {
    pub screen: Screen,
    pub sync: StateSync,
    pub transcript: Transcript,
    pub reveal: Option<ActiveReveal>,
    pub character_key: String,
    pub character_name: String,
    pub portrait: Option<Portrait>,
    pub current_slot: String,
    pub start_pending: bool,
    pub status_message: String,
    pub notice: Option<Notice>,
    pub input_focused: bool,
    pub timings: AnimationTimings,
    /// Role preselected on the welcome screen.
    pub default_role: String,
}

impl App {
    pub fn new(timings: AnimationTimings, default_role: &str, default_slot: &str) -> Self {
        let key = characters::find(default_role)
            .map(|c| c.key)
            .unwrap_or(characters::DEFAULT_ROLE_KEY);
        Self {
            screen: Screen::Welcome,
            sync: StateSync::new(timings),
            transcript: Transcript::new(),
            reveal: None,
            character_key: key.to_string(),
            character_name: characters::display_name(key).to_string(),
            portrait: None,
            current_slot: default_slot.to_string(),
            start_pending: false,
            status_message: String::from("Pick a character and press Enter to start"),
            notice: None,
            input_focused: false,
            timings,
            default_role: key.to_string(),
        }
    }

    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self::new(config.timings, &config.default_role, &config.default_slot)
    }

    /// Append a finished message. An active reveal is flushed first so
    /// entries never interleave.
    pub fn append_message(&mut self, role: Role, content: impl Into<String>, now: Instant) -> Uuid {
        self.flush_reveal(now);
        self.transcript.append(role, content)
    }

    pub fn push_placeholder(&mut self, now: Instant) -> Uuid {
        self.flush_reveal(now);
        self.transcript.push_placeholder()
    }

    /// Begin revealing `reply.response` in a fresh assistant entry.
    pub fn start_reveal(&mut self, reply: ChatReply, now: Instant) {
        self.flush_reveal(now);
        let text = reply.response.clone().unwrap_or_default();
        let key = self.transcript.append(Role::Assistant, "");
        debug!("Starting reveal of {} chars", text.chars().count());
        self.reveal = Some(ActiveReveal {
            key,
            reveal: Reveal::new(text, now, self.timings.typing_interval),
            pending: reply,
        });
    }

    /// Advance the active reveal to `now`. Completes it when the last
    /// character is visible.
    pub fn advance_reveal(&mut self, now: Instant) {
        let Some(active) = &self.reveal else {
            return;
        };
        let visible = active.reveal.visible_text(now).to_string();
        let complete = active.reveal.is_complete(now);
        let key = active.key;
        self.transcript.set_content(key, &visible);
        if complete {
            self.finish_reveal(now);
        }
    }

    /// Show the active reveal's full text immediately and apply its state.
    pub fn flush_reveal(&mut self, now: Instant) {
        if let Some(active) = &self.reveal {
            active.reveal.cancel();
            self.finish_reveal(now);
        }
    }

    fn finish_reveal(&mut self, now: Instant) {
        let Some(active) = self.reveal.take() else {
            return;
        };
        self.transcript
            .set_content(active.key, active.reveal.full_text());
        let reply = active.pending;
        if let Some(state) = &reply.game_state {
            self.sync.apply(state, now);
        }
        let key = reply
            .character_key
            .as_deref()
            .or_else(|| reply.game_state.as_ref().and_then(|s| s.role.as_deref()));
        self.set_character(key, reply.character_name.as_deref());
    }

    /// Update the shown character. A key without a name maps through the roster.
    pub fn set_character(&mut self, key: Option<&str>, name: Option<&str>) {
        let key = key.filter(|k| !k.is_empty()).map(str::to_lowercase);
        let name = name.filter(|n| !n.is_empty());
        if let Some(key) = &key
            && *key != self.character_key
        {
            self.character_key = key.clone();
            self.portrait = None;
        }
        match (name, &key) {
            (Some(name), _) => self.character_name = name.to_string(),
            (None, Some(key)) => self.character_name = characters::display_name(key).to_string(),
            (None, None) => {}
        }
    }

    pub fn notify(&mut self, kind: NoticeKind, text: impl Into<String>) {
        let text = text.into();
        self.status_message = text.clone();
        self.notice = Some(Notice { kind, text });
    }

    pub fn is_revealing(&self) -> bool {
        self.reveal.is_some()
    }

    /// True while anything on screen changes without input.
    pub fn is_animating(&self, now: Instant) -> bool {
        self.is_revealing() || self.sync.is_animating(now)
    }
}
