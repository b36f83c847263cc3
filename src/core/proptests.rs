//! Property-based tests for the reducer.
//!
//! Random interleavings of submissions and resolutions must keep the
//! transcript invariants intact.

use proptest::prelude::*;

use crate::backend::{BackendError, SearchResponse};
use crate::core::action::{Action, Effect, update};
use crate::core::dispatch::{DispatchTicket, SubmitPolicy};
use crate::core::message::{Message, Sender};
use crate::test_support::test_app_with_policy;

#[derive(Debug, Clone)]
enum Step {
    Submit(String),
    /// Resolve the in-flight ticket at this index (mod pending count).
    Resolve { pick: usize, ok: bool },
}

fn arb_policy() -> impl Strategy<Value = SubmitPolicy> {
    prop_oneof![Just(SubmitPolicy::Reject), Just(SubmitPolicy::Overlap)]
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        "[ a-z\t]{0,12}".prop_map(Step::Submit),
        (any::<usize>(), any::<bool>()).prop_map(|(pick, ok)| Step::Resolve { pick, ok }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn prop_transcript_invariants_hold(
        policy in arb_policy(),
        steps in proptest::collection::vec(arb_step(), 0..40),
    ) {
        let mut app = test_app_with_policy(policy);
        let mut pending: Vec<DispatchTicket> = Vec::new();
        let mut resolved = 0usize;

        for step in steps {
            let before_len = app.store.len();
            let was_welcome = app.view.is_welcome();
            let was_loading = app.is_loading();

            match step {
                Step::Submit(raw) => {
                    let effect = update(&mut app, Action::Submit(raw.clone()));
                    if raw.trim().is_empty() {
                        prop_assert_eq!(&effect, &Effect::None);
                        prop_assert_eq!(app.store.len(), before_len);
                        prop_assert_eq!(app.is_loading(), was_loading);
                        prop_assert_eq!(app.view.is_welcome(), was_welcome);
                    }
                    match effect {
                        Effect::Dispatch(ticket) => {
                            prop_assert_eq!(app.store.len(), before_len + 1);
                            prop_assert!(app.is_loading());
                            prop_assert!(!app.view.is_welcome());
                            pending.push(ticket);
                        }
                        _ => {
                            prop_assert_eq!(app.store.len(), before_len);
                        }
                    }
                }
                Step::Resolve { pick, ok } => {
                    if pending.is_empty() {
                        continue;
                    }
                    let ticket = pending.remove(pick % pending.len());
                    let outcome = if ok {
                        Ok(SearchResponse::new(format!("re: {}", ticket.query), vec![]))
                    } else {
                        Err(BackendError::Network("down".into()))
                    };
                    update(&mut app, Action::ResponseReady { generation: ticket.generation, outcome });
                    resolved += 1;
                    prop_assert_eq!(app.store.len(), before_len + 1);
                }
            }

            // Under reject, never more than one request in flight
            if policy == SubmitPolicy::Reject {
                prop_assert!(app.dispatcher.in_flight() <= 1);
            }
            prop_assert_eq!(app.is_loading(), !pending.is_empty());
        }

        let all = app.store.all();
        let users = all.iter().filter(|m| m.sender() == Sender::User).count();
        let ais = all.iter().filter(|m| m.sender() == Sender::Ai).count();

        // Two entries per resolved round trip, one per pending one
        prop_assert_eq!(ais, resolved);
        prop_assert_eq!(users, resolved + pending.len());

        // Ids strictly increase
        prop_assert!(all.windows(2).all(|w| w[0].id() < w[1].id()));

        // Every answer follows the user message it replies to
        for (idx, msg) in all.iter().enumerate() {
            if msg.sender() == Sender::Ai {
                let reply_to = msg.reply_to();
                prop_assert!(reply_to.is_some());
                let user_pos = all.iter().position(|m: &Message| Some(m.id()) == reply_to);
                prop_assert!(matches!(user_pos, Some(p) if p < idx));
            } else {
                prop_assert!(msg.sources().is_empty());
            }
        }
    }
}
