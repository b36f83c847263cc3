//! # Dispatch Bookkeeping
//!
//! Tracks which submissions are waiting on the backend. Every accepted
//! submission gets a [`Generation`]; the dispatcher remembers which user
//! message each generation answers so a resolution can be correlated no
//! matter what order responses arrive in.
//!
//! The network call itself happens outside the core (see `backend::dispatch`).
//! This module only decides whether a submission may start and what it
//! resolves to.

use std::collections::BTreeMap;
use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::core::message::MessageId;

/// What to do with a submission while another is still in flight.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SubmitPolicy {
    /// Refuse it. At most one request is ever in flight.
    #[default]
    Reject,
    /// Accept it. Answers are appended in arrival order, tagged with `reply_to`.
    Overlap,
}

impl SubmitPolicy {
    pub fn label(self) -> &'static str {
        match self {
            SubmitPolicy::Reject => "reject",
            SubmitPolicy::Overlap => "overlap",
        }
    }
}

/// Sequence number of an accepted submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen-{}", self.0)
    }
}

/// Everything needed to run one request. Produced by the reducer,
/// consumed by whoever performs I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchTicket {
    pub generation: Generation,
    pub query: String,
}

#[derive(Debug, Default)]
pub struct Dispatcher {
    policy: SubmitPolicy,
    next_generation: u64,
    in_flight: BTreeMap<Generation, MessageId>,
}

impl Dispatcher {
    pub fn new(policy: SubmitPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn policy(&self) -> SubmitPolicy {
        self.policy
    }

    pub fn is_loading(&self) -> bool {
        !self.in_flight.is_empty()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Whether a new submission may start right now.
    pub fn accepts(&self) -> bool {
        match self.policy {
            SubmitPolicy::Reject => !self.is_loading(),
            SubmitPolicy::Overlap => true,
        }
    }

    /// Open a new generation answering `reply_to`.
    pub fn begin(&mut self, reply_to: MessageId, query: String) -> DispatchTicket {
        let generation = Generation(self.next_generation);
        self.next_generation += 1;
        self.in_flight.insert(generation, reply_to);
        DispatchTicket { generation, query }
    }

    /// Close a generation. Returns the user message it answered, or `None`
    /// if the generation was never opened or has already resolved.
    pub fn finish(&mut self, generation: Generation) -> Option<MessageId> {
        self.in_flight.remove(&generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::MessageStore;

    fn user_id(store: &mut MessageStore, text: &str) -> MessageId {
        store.append_user(text).id()
    }

    #[test]
    fn reject_policy_blocks_while_loading() {
        let mut store = MessageStore::new();
        let mut dispatcher = Dispatcher::new(SubmitPolicy::Reject);
        assert!(dispatcher.accepts());

        let ticket = dispatcher.begin(user_id(&mut store, "a"), "a".into());
        assert!(dispatcher.is_loading());
        assert!(!dispatcher.accepts());

        dispatcher.finish(ticket.generation);
        assert!(!dispatcher.is_loading());
        assert!(dispatcher.accepts());
    }

    #[test]
    fn overlap_policy_always_accepts() {
        let mut store = MessageStore::new();
        let mut dispatcher = Dispatcher::new(SubmitPolicy::Overlap);
        dispatcher.begin(user_id(&mut store, "a"), "a".into());
        assert!(dispatcher.accepts());
        dispatcher.begin(user_id(&mut store, "b"), "b".into());
        assert_eq!(dispatcher.in_flight(), 2);
    }

    #[test]
    fn generations_are_unique_and_correlate_to_user_messages() {
        let mut store = MessageStore::new();
        let mut dispatcher = Dispatcher::new(SubmitPolicy::Overlap);
        let a = user_id(&mut store, "a");
        let b = user_id(&mut store, "b");
        let first = dispatcher.begin(a, "a".into());
        let second = dispatcher.begin(b, "b".into());
        assert_ne!(first.generation, second.generation);

        // Resolve out of order
        assert_eq!(dispatcher.finish(second.generation), Some(b));
        assert_eq!(dispatcher.finish(first.generation), Some(a));
    }

    #[test]
    fn finishing_twice_is_ignored() {
        let mut store = MessageStore::new();
        let mut dispatcher = Dispatcher::new(SubmitPolicy::Reject);
        let ticket = dispatcher.begin(user_id(&mut store, "a"), "a".into());
        assert!(dispatcher.finish(ticket.generation).is_some());
        assert!(dispatcher.finish(ticket.generation).is_none());
    }

    #[test]
    fn policy_parses_from_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            policy: SubmitPolicy,
        }
        let w: Wrapper = toml::from_str(r#"policy = "overlap""#).unwrap();
        assert_eq!(w.policy, SubmitPolicy::Overlap);
    }
}
