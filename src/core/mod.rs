//! # Core Application Logic
//!
//! The conversation state controller. It knows nothing about any specific UI
//! technology and performs no I/O.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • MessageStore         │
//!                    │  • ViewState            │
//!                    │  • Dispatcher           │
//!                    │  • update() (reducer)   │
//!                    │                         │
//!                    │  No I/O. No UI. Pure.   │
//!                    └───────────┬─────────────┘
//!                                │ Effect::Dispatch
//!            ┌───────────────────┴───────────────────┐
//!            ▼                                       ▼
//!     ┌────────────┐                          ┌────────────┐
//!     │    TUI     │ ── spawns ─────────────► │  backend   │
//!     │  Adapter   │ ◄── Action::ResponseReady│  (reqwest) │
//!     └────────────┘                          └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `App` struct, all conversation state in one place
//! - [`action`]: The `Action` enum and the `update()` reducer
//! - [`message`]: Messages, citations and the append-only store
//! - [`view`]: Welcome → Conversation transition
//! - [`dispatch`]: Generations, in-flight tracking and the submit policy
//! - [`config`]: Settings resolution

pub mod action;
pub mod config;
pub mod dispatch;
pub mod message;
pub mod state;
pub mod view;

#[cfg(test)]
mod proptests;
