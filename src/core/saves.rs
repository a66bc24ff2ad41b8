//! Save-slot descriptors as shown in the save browser.

use serde_json::Value;

use crate::api::{SaveEntry, SavesReply};

pub const UNKNOWN_CHARACTER: &str = "未知角色";

/// One row of the save list. Fields are displayed verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveSlotDescriptor {
    pub slot: String,
    pub label: Option<String>,
    pub role_or_character_name: String,
    pub timestamp: String,
}

impl SaveSlotDescriptor {
    pub fn from_entry(entry: &SaveEntry) -> Self {
        let meta = entry.meta.as_ref();
        let role = meta
            .and_then(|m| m.role.as_deref().or(m.character_name.as_deref()))
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_CHARACTER);
        let label = meta
            .and_then(|m| m.label.clone())
            .filter(|s| !s.is_empty());
        let timestamp = meta
            .and_then(|m| m.timestamp.clone())
            .filter(|s| !s.is_empty())
            .or_else(|| entry.mtime.as_ref().and_then(value_text))
            .unwrap_or_default();

        Self {
            slot: entry
                .slot
                .as_ref()
                .map(|s| s.to_string())
                .unwrap_or_default(),
            label,
            role_or_character_name: role.to_string(),
            timestamp,
        }
    }

    /// `role - label | slot: S | time: T`
    pub fn line(&self) -> String {
        let label = self
            .label
            .as_ref()
            .map(|l| format!(" - {l}"))
            .unwrap_or_default();
        format!(
            "{}{} | slot: {} | time: {}",
            self.role_or_character_name, label, self.slot, self.timestamp
        )
    }
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn descriptors(reply: &SavesReply) -> Vec<SaveSlotDescriptor> {
    reply
        .saves
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(SaveSlotDescriptor::from_entry)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(json: &str) -> SavesReply {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn full_entry_line() {
        let saves = descriptors(&reply(
            r#"{"saves": [{"slot": 1, "meta": {"role": "su_tang", "label": "first date", "timestamp": "2025-09-01T10:00:00"}, "mtime": 1.5}]}"#,
        ));
        assert_eq!(saves.len(), 1);
        assert_eq!(
            saves[0].line(),
            "su_tang - first date | slot: 1 | time: 2025-09-01T10:00:00"
        );
    }

    #[test]
    fn falls_back_to_character_name_and_mtime() {
        let saves = descriptors(&reply(
            r#"{"saves": [{"slot": "happy_ending", "meta": {"character_name": "林雨含"}, "mtime": 1712345678.5}]}"#,
        ));
        assert_eq!(saves[0].role_or_character_name, "林雨含");
        assert_eq!(saves[0].timestamp, "1712345678.5");
        assert_eq!(saves[0].label, None);
        assert_eq!(saves[0].line(), "林雨含 | slot: happy_ending | time: 1712345678.5");
    }

    #[test]
    fn missing_meta_uses_unknown_character() {
        let saves = descriptors(&reply(r#"{"saves": [{"slot": 2}]}"#));
        assert_eq!(saves[0].role_or_character_name, UNKNOWN_CHARACTER);
        assert_eq!(saves[0].timestamp, "");
    }

    #[test]
    fn markup_in_fields_is_kept_verbatim() {
        let saves = descriptors(&reply(
            r#"{"saves": [{"slot": 1, "meta": {"role": "<b>x</b>", "label": "a&b"}}]}"#,
        ));
        assert!(saves[0].line().starts_with("<b>x</b> - a&b"));
    }

    #[test]
    fn empty_and_null_lists() {
        assert!(descriptors(&reply(r#"{"saves": []}"#)).is_empty());
        assert!(descriptors(&reply(r#"{"saves": null}"#)).is_empty());
        assert!(descriptors(&reply("{}")).is_empty());
    }
}
