//! Wire types for the game backend's JSON API.
//!
//! Every response field is optional. The backend has shipped several
//! revisions with slightly different payloads (`relationship` vs
//! `relationship_state`, integer vs string slots, closeness as a number or a
//! numeric string), so decoding is lenient and normalisation happens later in
//! `core::sync` and `core::saves`.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Requests
// ============================================================================

#[derive(Serialize, Debug)]
pub struct StartGameRequest<'a> {
    pub role: &'a str,
}

#[derive(Serialize, Debug)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
}

#[derive(Serialize, Debug)]
pub struct SaveRequest<'a> {
    pub slot: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<&'a str>,
}

#[derive(Serialize, Debug)]
pub struct LoadRequest<'a> {
    pub slot: &'a str,
}

// ============================================================================
// Responses
// ============================================================================

/// Server-side game state snapshot, as sent.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct WireGameState {
    /// Number or numeric string; anything else is treated as missing.
    pub closeness: Option<Value>,
    pub relationship_state: Option<String>,
    /// Older backends send `relationship` instead of `relationship_state`.
    pub relationship: Option<String>,
    pub scene: Option<String>,
    pub role: Option<String>,
}

/// One transcript line from the server's history.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct HistoryMessage {
    pub role: Option<String>,
    pub content: Option<String>,
}

impl HistoryMessage {
    pub fn new(role: &str, content: &str) -> Self {
        Self {
            role: Some(role.to_string()),
            content: Some(content.to_string()),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct StartReply {
    pub game_state: Option<WireGameState>,
    pub history: Option<Vec<HistoryMessage>>,
    pub intro_text: Option<String>,
    pub character_key: Option<String>,
    pub character_name: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ChatReply {
    pub response: Option<String>,
    pub game_state: Option<WireGameState>,
    pub character_key: Option<String>,
    pub character_name: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct SaveReply {
    pub success: bool,
    pub message: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct LoadReply {
    pub success: bool,
    pub game_state: Option<WireGameState>,
    pub history: Option<Vec<HistoryMessage>>,
    pub character_key: Option<String>,
    pub message: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct SavesReply {
    pub saves: Option<Vec<SaveEntry>>,
}

/// A slot identifier: the backend uses both `1` and `"happy_ending"`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum SlotId {
    Number(i64),
    Text(String),
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotId::Number(n) => write!(f, "{n}"),
            SlotId::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct SaveEntry {
    pub slot: Option<SlotId>,
    pub meta: Option<SaveMeta>,
    /// File modification time; a float timestamp or a preformatted string.
    pub mtime: Option<Value>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct SaveMeta {
    pub role: Option<String>,
    pub character_name: Option<String>,
    pub label: Option<String>,
    pub timestamp: Option<String>,
}

/// Borrow an optional history list as a slice.
pub fn history_slice(history: &Option<Vec<HistoryMessage>>) -> &[HistoryMessage] {
    history.as_deref().unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_reply_tolerates_missing_fields() {
        let reply: StartReply = serde_json::from_str("{}").unwrap();
        assert!(reply.game_state.is_none());
        assert!(history_slice(&reply.history).is_empty());
    }

    #[test]
    fn start_reply_tolerates_null_history() {
        let reply: StartReply =
            serde_json::from_str(r#"{"history": null, "intro_text": "hi"}"#).unwrap();
        assert!(history_slice(&reply.history).is_empty());
        assert_eq!(reply.intro_text.as_deref(), Some("hi"));
    }

    #[test]
    fn game_state_accepts_string_closeness() {
        let state: WireGameState =
            serde_json::from_str(r#"{"closeness": "42", "scene": "操场"}"#).unwrap();
        assert_eq!(state.closeness, Some(Value::String("42".into())));
        assert_eq!(state.scene.as_deref(), Some("操场"));
    }

    #[test]
    fn slot_id_accepts_numbers_and_strings() {
        let entries: Vec<SaveEntry> =
            serde_json::from_str(r#"[{"slot": 3}, {"slot": "happy_ending"}]"#).unwrap();
        assert_eq!(entries[0].slot.as_ref().unwrap().to_string(), "3");
        assert_eq!(entries[1].slot.as_ref().unwrap().to_string(), "happy_ending");
    }

    #[test]
    fn save_request_omits_empty_label() {
        let json = serde_json::to_string(&SaveRequest {
            slot: "2",
            label: None,
        })
        .unwrap();
        assert_eq!(json, r#"{"slot":"2"}"#);
    }

    #[test]
    fn load_reply_with_null_state_decodes() {
        let reply: LoadReply =
            serde_json::from_str(r#"{"success": false, "message": "加载游戏失败", "game_state": null}"#)
                .unwrap();
        assert!(!reply.success);
        assert!(reply.game_state.is_none());
    }
}
