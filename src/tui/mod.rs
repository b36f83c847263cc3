//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! translates keyboard events into core::Action values, and runs the
//! dispatches the reducer asks for.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Redraw Strategy
//!
//! - **Animating** (request in flight, autoscroll running): draws every ~80ms.
//! - **Idle**: sleeps up to 500ms, only redraws on events, answers or resize.

mod component;
mod components;
mod event;
pub mod markdown;
mod scroll;
mod ui;

use log::{debug, info, warn};
use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
};
use crossterm::execute;

use crate::backend::SearchBackend;
use crate::backend::dispatch;
use crate::core::action::{Action, Effect, update};
use crate::core::config::ResolvedConfig;
use crate::core::dispatch::DispatchTicket;
use crate::core::message::StoreEvent;
use crate::core::state::App;
use crate::tui::component::EventHandler;
use crate::tui::components::{InputBox, InputEvent, MessageListState};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub message_list: MessageListState,
    pub input_box: InputBox,
    /// Welcome-screen example last copied into the input
    pub example_index: Option<usize>,
}

impl TuiState {
    pub fn new(store_events: mpsc::Receiver<StoreEvent>) -> Self {
        Self {
            message_list: MessageListState::new(store_events),
            input_box: InputBox::new(),
            example_index: None,
        }
    }

    /// Copy the next example prompt into the input field.
    fn next_example(&mut self, examples: &[String]) {
        if examples.is_empty() {
            return;
        }
        let next = self.example_index.map_or(0, |i| (i + 1) % examples.len());
        self.example_index = Some(next);
        self.input_box.set_text(&examples[next]);
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock // Blinking resets on every draw()
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, steady block cursor)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), DisableMouseCapture, DisableBracketedPaste, Hide);
    }
}

pub fn run(config: ResolvedConfig, backend: Arc<dyn SearchBackend>) -> std::io::Result<()> {
    let mut app = App::from_config(&config);
    let mut tui = TuiState::new(app.store.subscribe());
    info!(
        "Starting TUI (backend: {}, policy: {})",
        backend.name(),
        app.dispatcher.policy().label()
    );

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = match TerminalModeGuard::new() {
        Ok(guard) => Some(guard),
        Err(e) => {
            warn!("Failed to enable terminal modes: {}", e);
            None
        }
    };

    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel();

    let start_time = Instant::now();
    let mut needs_redraw = true; // Force first frame

    loop {
        tui.input_box.locked = !app.can_submit();

        let animating = app.is_loading() || tui.message_list.autoscroll.is_animating();
        if animating {
            needs_redraw = true;
        }

        if needs_redraw {
            let spinner_frame = (start_time.elapsed().as_secs_f32() * 4.0) as usize;
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui, spinner_frame))?;
            needs_redraw = false;
        }

        // Short poll while animating (~12fps), long when idle
        let timeout = if animating {
            Duration::from_millis(80)
        } else {
            Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        // Process first event + drain everything pending before the next draw
        let mut should_quit = false;
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            match event {
                TuiEvent::Resize => {}
                TuiEvent::Quit => {
                    if update(&mut app, Action::Quit) == Effect::Quit {
                        should_quit = true;
                    }
                }
                TuiEvent::ScrollUp
                | TuiEvent::ScrollDown
                | TuiEvent::ScrollPageUp
                | TuiEvent::ScrollPageDown => {
                    tui.message_list.handle_event(&event);
                }
                TuiEvent::NextExample => {
                    if app.view.is_welcome() {
                        tui.next_example(&app.example_prompts);
                    }
                }
                // End with nothing to edit jumps to the newest message
                TuiEvent::CursorEnd if tui.input_box.is_empty() => {
                    tui.message_list.jump_to_bottom();
                }
                _ => {
                    if let Some(InputEvent::Submit(text)) = tui.input_box.handle_event(&event) {
                        let effect = update(&mut app, Action::Submit(text));
                        should_quit |= apply_effect(effect, &backend, &tx);
                    }
                }
            }
        }

        if should_quit {
            break;
        }

        // Answers from background dispatches
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            let effect = update(&mut app, action);
            if apply_effect(effect, &backend, &tx) {
                should_quit = true;
            }
        }

        if should_quit {
            break;
        }
    }

    info!("Shutting down with {} messages, {} in flight", app.store.len(), app.dispatcher.in_flight());
    ratatui::restore();
    Ok(())
}

/// Perform the I/O an effect asks for. Returns true if the app should quit.
fn apply_effect(effect: Effect, backend: &Arc<dyn SearchBackend>, tx: &mpsc::Sender<Action>) -> bool {
    match effect {
        Effect::None => false,
        Effect::Dispatch(ticket) => {
            spawn_dispatch(Arc::clone(backend), ticket, tx.clone());
            false
        }
        Effect::Quit => true,
    }
}

fn spawn_dispatch(backend: Arc<dyn SearchBackend>, ticket: DispatchTicket, tx: mpsc::Sender<Action>) {
    info!("Spawning dispatch {} to {}", ticket.generation, backend.name());
    let generation = ticket.generation;
    tokio::spawn(async move {
        let action = dispatch::run(backend, ticket).await;
        if tx.send(action).is_err() {
            warn!("Failed to deliver {}: receiver dropped", generation);
        }
    });
}
