//! # Session Controller
//!
//! Executes a `Request` against a `GameBackend` and turns the outcome into the
//! completion `Action` that `update()` consumes. Failures are never raised
//! from here; they travel inside the action as `Err(ApiError)`.

use log::debug;

use crate::api::GameBackend;
use crate::core::action::{Action, Request};

pub async fn perform(backend: &dyn GameBackend, request: Request) -> Action {
    debug!("Performing {:?}", request);
    match request {
        Request::StartGame { role } => Action::GameStarted(backend.start_game(&role).await),
        Request::Chat {
            message,
            placeholder,
        } => Action::ChatReplied {
            placeholder,
            result: backend.chat(&message).await,
        },
        Request::Save { slot, label } => {
            let result = backend.save(&slot, label.as_deref()).await;
            Action::Saved { slot, result }
        }
        Request::Load { slot } => {
            let result = backend.load(&slot).await;
            Action::Loaded { slot, result }
        }
        Request::ListSaves => Action::SavesListed(backend.list_saves().await),
        Request::ProbePortrait { key, path } => {
            let result = backend.probe(&path).await;
            Action::PortraitProbed { key, path, result }
        }
    }
}
