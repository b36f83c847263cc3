//! # Actions
//!
//! Everything that can happen to the conversation becomes an `Action`.
//! User presses Enter? That's `Action::Submit(text)`.
//! Backend answers? That's `Action::ResponseReady { .. }`.
//!
//! `update()` applies an action to the state and returns an [`Effect`]
//! describing any I/O the caller should perform. No I/O happens here.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```

use log::{debug, info, warn};

use crate::backend::{BackendError, SearchResponse};
use crate::core::dispatch::{DispatchTicket, Generation};
use crate::core::state::App;

#[derive(Debug)]
pub enum Action {
    /// Raw text from the input field (not yet trimmed).
    Submit(String),
    /// A dispatch finished, successfully or not.
    ResponseReady {
        generation: Generation,
        outcome: Result<SearchResponse, BackendError>,
    },
    Quit,
}

/// Side effect requested by the reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Send this query to the backend and feed the result back as `ResponseReady`.
    Dispatch(DispatchTicket),
    Quit,
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::Submit(raw) => submit(app, &raw),
        Action::ResponseReady {
            generation,
            outcome,
        } => {
            resolve(app, generation, outcome);
            Effect::None
        }
        Action::Quit => Effect::Quit,
    }
}

fn submit(app: &mut App, raw: &str) -> Effect {
    let query = raw.trim();
    if query.is_empty() {
        debug!("Ignoring blank submission");
        return Effect::None;
    }

    if !app.dispatcher.accepts() {
        info!(
            "Submission refused: {} request(s) in flight under {} policy",
            app.dispatcher.in_flight(),
            app.dispatcher.policy().label()
        );
        app.status_message = "Still waiting for the previous answer".to_string();
        return Effect::None;
    }

    let user_id = app.store.append_user(query).id();
    if app.view.enter_conversation() {
        info!("Leaving welcome screen");
    }
    let ticket = app.dispatcher.begin(user_id, query.to_string());
    info!("Submitted {} as {}", user_id, ticket.generation);

    app.status_message = "Thinking...".to_string();
    Effect::Dispatch(ticket)
}

fn resolve(
    app: &mut App,
    generation: Generation,
    outcome: Result<SearchResponse, BackendError>,
) {
    let Some(reply_to) = app.dispatcher.finish(generation) else {
        warn!("Dropping result for unknown {}", generation);
        return;
    };

    match outcome {
        Ok(resp) => {
            let (text, sources) = resp.into_parts();
            app.store.append_ai(text, sources, Some(reply_to));
            app.status_message.clear();
        }
        Err(e) => {
            warn!("Answer to {} replaced by fallback: {}", reply_to, e);
            app.store.append_fallback(Some(reply_to));
            app.status_message = "Request failed".to_string();
        }
    }

    if app.is_loading() {
        app.status_message = format!("Waiting on {} answer(s)", app.dispatcher.in_flight());
    }
}
