//! # Transcript
//!
//! The rendered chat: an ordered list of entries, each keyed by a UUID so
//! placeholders and in-progress reveals can be addressed without colliding.
//!
//! Every mutation bumps `revision`. The view compares revisions to decide when
//! to re-pin itself to the newest entry.

use std::fs;
use std::io;
use std::path::Path;

use chrono::Local;
use log::debug;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::HistoryMessage;
use crate::core::markup;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    /// Wire role names. Anything else is not renderable.
    pub fn parse(role: &str) -> Option<Role> {
        match role {
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            "system" => Some(Role::System),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Message,
    /// The transient "typing…" bubble shown while a reply is in flight.
    TypingPlaceholder,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub key: Uuid,
    pub role: Role,
    pub content: String,
    pub kind: EntryKind,
}

#[derive(Debug, Default)]
pub struct Transcript {
    entries: Vec<Entry>,
    revision: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace everything with `history`. Unknown roles are dropped.
    pub fn render(&mut self, history: &[HistoryMessage]) {
        self.entries.clear();
        for message in history {
            let Some(role) = message.role.as_deref().and_then(Role::parse) else {
                debug!("Dropping history entry with role {:?}", message.role);
                continue;
            };
            self.entries.push(Entry {
                key: Uuid::new_v4(),
                role,
                content: message.content.clone().unwrap_or_default(),
                kind: EntryKind::Message,
            });
        }
        self.touch();
    }

    /// Add one message at the end and return its key.
    pub fn append(&mut self, role: Role, content: impl Into<String>) -> Uuid {
        self.push(role, content.into(), EntryKind::Message)
    }

    pub fn push_placeholder(&mut self) -> Uuid {
        self.push(Role::Assistant, String::new(), EntryKind::TypingPlaceholder)
    }

    fn push(&mut self, role: Role, content: String, kind: EntryKind) -> Uuid {
        let key = Uuid::new_v4();
        self.entries.push(Entry {
            key,
            role,
            content,
            kind,
        });
        self.touch();
        key
    }

    /// Remove the entry with `key`. Returns false if it is already gone.
    pub fn remove(&mut self, key: Uuid) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.key != key);
        let removed = self.entries.len() != before;
        if removed {
            self.touch();
        }
        removed
    }

    /// Replace the content of an existing entry.
    pub fn set_content(&mut self, key: Uuid, content: &str) -> bool {
        match self.entries.iter_mut().find(|e| e.key == key) {
            Some(entry) if entry.content != content => {
                entry.content.clear();
                entry.content.push_str(content);
                self.touch();
                true
            }
            Some(_) => true,
            None => false,
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: Uuid) -> bool {
        self.entries.iter().any(|e| e.key == key)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    /// Write the transcript as a standalone HTML page.
    pub fn export_html(&self, path: &Path, title: &str) -> io::Result<()> {
        let html = markup::document(title, &self.entries, Local::now());
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, html)
    }
}
