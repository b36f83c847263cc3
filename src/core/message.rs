//! # Message Store
//!
//! The transcript: an append-only, ordered list of [`Message`]s.
//!
//! ```text
//! MessageStore
//! ├── messages: Vec<Message>         // insertion order, never reordered
//! ├── next_id: u64                   // dedicated id counter
//! └── subscribers: Vec<Sender<..>>   // one channel per observer
//! ```
//!
//! Appending is the only mutation. Each append notifies every subscriber with
//! a [`StoreEvent`], which is how the scroll controller learns that the
//! transcript grew.

use std::fmt;
use std::sync::mpsc;

use chrono::{DateTime, Local};
use log::debug;
use serde::{Deserialize, Serialize};

/// Shown in place of an answer whenever a dispatch fails.
pub const FALLBACK_TEXT: &str = "⚠️ Unable to get a response from the AI.";

/// Unique, strictly increasing message identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageId(u64);

impl MessageId {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Ai,
}

/// A citation attached to an answer.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub page: u32,
    pub company: String,
    /// Opaque reference to a page image. Never fetched by the client.
    #[serde(default)]
    pub image_path: String,
}

/// A single transcript entry. Fields are fixed at creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    id: MessageId,
    text: String,
    sender: Sender,
    timestamp: DateTime<Local>,
    /// `Some` only on AI answers. Fallback entries carry `None`.
    sources: Option<Vec<Source>>,
    /// For AI entries: the user message this answers.
    reply_to: Option<MessageId>,
}

impl Message {
    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    /// Citations, empty for user messages and fallbacks.
    pub fn sources(&self) -> &[Source] {
        self.sources.as_deref().unwrap_or(&[])
    }

    pub fn has_sources(&self) -> bool {
        !self.sources().is_empty()
    }

    pub fn reply_to(&self) -> Option<MessageId> {
        self.reply_to
    }

    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }

    /// True for entries created by [`MessageStore::append_fallback`].
    pub fn is_fallback(&self) -> bool {
        self.sender == Sender::Ai && self.sources.is_none()
    }
}

/// Notification sent to subscribers after the store changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    Appended { id: MessageId, len: usize },
}

#[derive(Default)]
pub struct MessageStore {
    messages: Vec<Message>,
    next_id: u64,
    subscribers: Vec<mpsc::Sender<StoreEvent>>,
}

impl fmt::Debug for MessageStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageStore")
            .field("messages", &self.messages)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer. Every later append is delivered on the returned channel.
    pub fn subscribe(&mut self) -> mpsc::Receiver<StoreEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    /// Append the user's (already trimmed, non-empty) query.
    pub fn append_user(&mut self, text: impl Into<String>) -> &Message {
        let text = text.into();
        debug_assert!(!text.trim().is_empty(), "user messages must not be blank");
        self.push(text, Sender::User, None, None)
    }

    /// Append an answer returned by the backend.
    pub fn append_ai(
        &mut self,
        text: impl Into<String>,
        sources: Vec<Source>,
        reply_to: Option<MessageId>,
    ) -> &Message {
        self.push(text.into(), Sender::Ai, Some(sources), reply_to)
    }

    /// Append the fixed warning shown when a dispatch fails.
    pub fn append_fallback(&mut self, reply_to: Option<MessageId>) -> &Message {
        self.push(FALLBACK_TEXT.to_string(), Sender::Ai, None, reply_to)
    }

    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Ids are increasing, so lookup is a binary search.
    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages
            .binary_search_by_key(&id, |m| m.id)
            .ok()
            .map(|idx| &self.messages[idx])
    }

    fn push(
        &mut self,
        text: String,
        sender: Sender,
        sources: Option<Vec<Source>>,
        reply_to: Option<MessageId>,
    ) -> &Message {
        let id = MessageId(self.next_id);
        self.next_id += 1;

        let idx = self.messages.len();
        self.messages.push(Message {
            id,
            text,
            sender,
            timestamp: Local::now(),
            sources,
            reply_to,
        });

        let event = StoreEvent::Appended {
            id,
            len: self.messages.len(),
        };
        // Drop subscribers whose receiver has gone away
        self.subscribers.retain(|tx| tx.send(event).is_ok());
        debug!("Store appended {} ({:?}), len={}", id, sender, self.messages.len());

        &self.messages[idx]
    }
}
