//! Slash commands typed into the input box.
//!
//! ```text
//! /save [slot] [label...]   /load [slot]   /saves   /export [path]   /quit
//! ```

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Save {
        slot: Option<String>,
        label: Option<String>,
    },
    Load {
        slot: Option<String>,
    },
    ListSaves,
    Export {
        path: Option<PathBuf>,
    },
    Quit,
    Unknown(String),
}

/// Parse `input` as a command. Returns `None` for ordinary chat text.
pub fn parse(input: &str) -> Option<Command> {
    let rest = input.trim().strip_prefix('/')?;
    let mut words = rest.split_whitespace();
    let name = words.next().unwrap_or_default();

    let command = match name {
        "save" => {
            let slot = words.next().map(str::to_string);
            let label = words.collect::<Vec<_>>().join(" ");
            Command::Save {
                slot,
                label: (!label.is_empty()).then_some(label),
            }
        }
        "load" => Command::Load {
            slot: words.next().map(str::to_string),
        },
        "saves" => Command::ListSaves,
        "export" => Command::Export {
            path: words.next().map(PathBuf::from),
        },
        "quit" | "exit" => Command::Quit,
        other => Command::Unknown(other.to_string()),
    };
    Some(command)
}
