//! # Backend API
//!
//! JSON-over-HTTP access to the game server. `types` holds the wire shapes,
//! `client` the `GameBackend` trait and its reqwest implementation.

pub mod client;
pub mod types;

pub use client::{ApiError, GameBackend, HttpBackend};
pub use types::{
    ChatReply, HistoryMessage, LoadReply, SaveEntry, SaveMeta, SaveReply, SavesReply, SlotId,
    StartReply, WireGameState,
};
