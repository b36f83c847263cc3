//! Runs one [`DispatchTicket`] against a backend and turns the result into an
//! [`Action`] for the reducer. This is the only async step in a submission.

use std::sync::Arc;
use std::time::Instant;

use log::{info, warn};

use crate::backend::SearchBackend;
use crate::core::action::Action;
use crate::core::dispatch::DispatchTicket;

pub async fn run(backend: Arc<dyn SearchBackend>, ticket: DispatchTicket) -> Action {
    let started = Instant::now();
    let outcome = backend.search(&ticket.query).await;
    let elapsed_ms = started.elapsed().as_millis();

    match &outcome {
        Ok(resp) => info!(
            "{} resolved in {}ms: {} bytes, {} sources",
            ticket.generation,
            elapsed_ms,
            resp.response.len(),
            resp.sources.as_ref().map_or(0, Vec::len)
        ),
        Err(e) => warn!("{} failed after {}ms: {}", ticket.generation, elapsed_ms, e),
    }

    Action::ResponseReady {
        generation: ticket.generation,
        outcome,
    }
}
