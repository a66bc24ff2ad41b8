//! # Markup
//!
//! Text neutralisation for the two places server text ends up:
//! HTML (transcript export) and the terminal.

use chrono::{DateTime, Local};

use crate::core::transcript::{Entry, EntryKind, Role};

/// Escape the five HTML-significant characters.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape, then turn newlines into `<br>`.
pub fn format_message(text: &str) -> String {
    escape_html(text).replace("\r\n", "\n").replace('\n', "<br>")
}

/// Replace control characters (ANSI escapes included) so server text cannot
/// drive the terminal. Newlines and tabs survive.
pub fn sanitize_terminal(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\n' => '\n',
            '\t' => ' ',
            c if c.is_control() => '\u{FFFD}',
            c => c,
        })
        .collect()
}

pub fn css_class(role: Role) -> &'static str {
    match role {
        Role::User => "user-message",
        Role::Assistant => "assistant-message",
        Role::System => "system-message",
    }
}

/// One transcript entry as an HTML fragment.
pub fn entry_html(entry: &Entry) -> String {
    match entry.kind {
        EntryKind::TypingPlaceholder => format!(
            r#"<div id="typing-{}" class="assistant-message typing-indicator">…</div>"#,
            entry.key
        ),
        EntryKind::Message => format!(
            r#"<div class="{}">{}</div>"#,
            css_class(entry.role),
            format_message(&entry.content)
        ),
    }
}

/// A standalone HTML document for the whole transcript.
pub fn document(title: &str, entries: &[Entry], exported_at: DateTime<Local>) -> String {
    let body: Vec<String> = entries.iter().map(entry_html).collect();
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n</head>\n<body>\n\
         <p class=\"exported-at\">{stamp}</p>\n<div id=\"chat-history\">\n{body}\n</div>\n</body>\n</html>\n",
        title = escape_html(title),
        stamp = exported_at.format("%Y-%m-%d %H:%M:%S"),
        body = body.join("\n"),
    )
}
