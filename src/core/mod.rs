//! # Core Application Logic
//!
//! The client's business logic. It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • State (app data)     │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │                         │
//!                    │  No UI. I/O only in     │
//!                    │  controller::perform    │
//!                    └───────────┬─────────────┘
//!                                │
//!                 ┌──────────────┴──────────────┐
//!                 ▼                             ▼
//!          ┌────────────┐                ┌────────────┐
//!          │    TUI     │                │    API     │
//!          │  Adapter   │                │  (reqwest) │
//!          │ (ratatui)  │                │            │
//!          └────────────┘                └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `App` struct, all application state in one place
//! - [`action`]: The `Action` enum and the `update()` reducer
//! - [`controller`]: Runs requests against the backend
//! - [`sync`]: Server snapshot → affection meter
//! - [`animation`]: Time-driven tweens, delta indicator, typewriter reveal
//! - [`transcript`]: The rendered chat and its HTML export

pub mod action;
pub mod animation;
pub mod characters;
pub mod command;
pub mod config;
pub mod controller;
pub mod markup;
pub mod saves;
pub mod state;
pub mod sync;
pub mod transcript;
