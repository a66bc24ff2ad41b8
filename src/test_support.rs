//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::{
    ApiError, ChatReply, GameBackend, LoadReply, SaveReply, SavesReply, StartReply,
};
use crate::core::animation::AnimationTimings;
use crate::core::state::App;

/// An in-memory backend with canned replies. Records every call.
#[derive(Default)]
pub struct FakeBackend {
    pub start: Option<Result<StartReply, ApiError>>,
    pub chat: Option<Result<ChatReply, ApiError>>,
    pub save: Option<Result<SaveReply, ApiError>>,
    pub load: Option<Result<LoadReply, ApiError>>,
    pub saves: Option<Result<SavesReply, ApiError>>,
    pub probe: Option<Result<(), ApiError>>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeBackend {
    fn record(&self, call: String) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn canned<T: Clone + Default>(reply: &Option<Result<T, ApiError>>) -> Result<T, ApiError> {
        reply.clone().unwrap_or_else(|| Ok(T::default()))
    }
}

#[async_trait]
impl GameBackend for FakeBackend {
    async fn start_game(&self, role: &str) -> Result<StartReply, ApiError> {
        self.record(format!("start_game {role}"));
        Self::canned(&self.start)
    }

    async fn chat(&self, message: &str) -> Result<ChatReply, ApiError> {
        self.record(format!("chat {message}"));
        Self::canned(&self.chat)
    }

    async fn save(&self, slot: &str, label: Option<&str>) -> Result<SaveReply, ApiError> {
        self.record(format!("save {slot} {}", label.unwrap_or("-")));
        Self::canned(&self.save)
    }

    async fn load(&self, slot: &str) -> Result<LoadReply, ApiError> {
        self.record(format!("load {slot}"));
        Self::canned(&self.load)
    }

    async fn list_saves(&self) -> Result<SavesReply, ApiError> {
        self.record("list_saves".to_string());
        Self::canned(&self.saves)
    }

    async fn probe(&self, path: &str) -> Result<(), ApiError> {
        self.record(format!("probe {path}"));
        self.probe.clone().unwrap_or(Ok(()))
    }
}

/// Creates a test App on the welcome screen with default timings.
pub fn test_app() -> App {
    App::new(AnimationTimings::default(), "su_tang", "1")
}
