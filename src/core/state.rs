//! # Application State
//!
//! Core state for the chat client. Domain data only; presentation state
//! (scroll offsets, input buffer) lives in the `tui` module.
//!
//! ```text
//! App
//! ├── store: MessageStore          // the transcript (append-only)
//! ├── view: ViewState              // Welcome → Conversation
//! ├── dispatcher: Dispatcher       // in-flight generations + submit policy
//! ├── status_message: String       // status bar text
//! ├── backend_name: String         // where queries go
//! ├── user_name: String            // welcome greeting
//! └── example_prompts: Vec<String> // welcome-screen suggestions
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use crate::core::config::ResolvedConfig;
use crate::core::dispatch::{Dispatcher, SubmitPolicy};
use crate::core::message::MessageStore;
use crate::core::view::ViewState;

pub struct App {
    pub store: MessageStore,
    pub view: ViewState,
    pub dispatcher: Dispatcher,
    pub status_message: String,
    pub backend_name: String,
    pub user_name: String,
    pub example_prompts: Vec<String>,
}

impl App {
    pub fn new(backend_name: String, policy: SubmitPolicy) -> Self {
        Self {
            store: MessageStore::new(),
            view: ViewState::default(),
            dispatcher: Dispatcher::new(policy),
            status_message: String::new(),
            backend_name,
            user_name: String::new(),
            example_prompts: Vec::new(),
        }
    }

    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self {
            user_name: config.user_name.clone(),
            example_prompts: config.example_prompts.clone(),
            ..Self::new(config.backend_url.clone(), config.submit_policy)
        }
    }

    /// True while any request is awaiting the backend.
    pub fn is_loading(&self) -> bool {
        self.dispatcher.is_loading()
    }

    /// Whether the primary input may submit right now.
    pub fn can_submit(&self) -> bool {
        self.dispatcher.accepts()
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::test_app;

    #[test]
    fn test_app_new_defaults() {
        let app = test_app();
        assert!(app.store.is_empty());
        assert!(app.view.is_welcome());
        assert!(!app.is_loading());
        assert!(app.can_submit());
        assert_eq!(app.backend_name, "http://test.invalid");
    }
}
