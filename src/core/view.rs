//! # View State
//!
//! Which screen the client shows. Starts on the welcome screen and moves to
//! the transcript on the first accepted submission. There is no way back.
//!
//! ```text
//! Welcome ──(first non-empty submit)──► Conversation
//! ```

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewState {
    #[default]
    Welcome,
    Conversation,
}

impl ViewState {
    pub fn is_welcome(self) -> bool {
        self == ViewState::Welcome
    }

    /// Move to `Conversation`. Returns true only on the call that actually transitioned.
    pub fn enter_conversation(&mut self) -> bool {
        match self {
            ViewState::Welcome => {
                *self = ViewState::Conversation;
                true
            }
            ViewState::Conversation => false,
        }
    }
}
