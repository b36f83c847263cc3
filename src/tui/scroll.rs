//! Keeps the newest message in view.
//!
//! The controller subscribes to the message store and starts a smooth scroll
//! toward the bottom whenever a message is appended or the loading indicator
//! appears or disappears. The animation chases the bottom with delta-time
//! exponential smoothing, so it looks the same at any redraw rate.

use std::sync::mpsc;
use std::time::Instant;

use log::debug;

use crate::core::message::StoreEvent;

/// Higher = faster. At 12.0, ~60% of the remaining distance per 80ms frame.
const SCROLL_SMOOTH_SPEED: f32 = 12.0;

/// Remaining distance (rows) at which we snap instead of animating.
const SNAP_ROWS: u16 = 1;

/// Clamp on frame delta so a stalled loop doesn't cause a jump.
const MAX_DELTA_SECS: f32 = 0.1;

/// One animation frame: move from `current` toward `target`.
///
/// Always makes at least one row of progress and never overshoots. If the
/// target moved above `current` (content shrank), snaps to it.
pub fn scroll_step(current: u16, target: u16, delta_secs: f32) -> u16 {
    if current >= target || target - current <= SNAP_ROWS {
        return target;
    }
    let distance = f32::from(target - current);
    let dt = delta_secs.clamp(0.0, MAX_DELTA_SECS);
    let factor = 1.0 - (-SCROLL_SMOOTH_SPEED * dt).exp();
    let step = ((distance * factor).round() as u16).max(1);
    current.saturating_add(step).min(target)
}

pub struct ScrollController {
    events: mpsc::Receiver<StoreEvent>,
    was_loading: bool,
    animating: bool,
    last_tick: Instant,
}

impl ScrollController {
    pub fn new(events: mpsc::Receiver<StoreEvent>) -> Self {
        Self {
            events,
            was_loading: false,
            animating: false,
            last_tick: Instant::now(),
        }
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    /// Drain pending store events and note loading transitions.
    ///
    /// Returns true if a scroll to the bottom was started.
    pub fn observe(&mut self, is_loading: bool) -> bool {
        let mut triggered = false;
        while let Ok(event) = self.events.try_recv() {
            debug!("Scroll controller saw {:?}", event);
            triggered = true;
        }
        if is_loading != self.was_loading {
            self.was_loading = is_loading;
            triggered = true;
        }
        if triggered {
            self.start();
        }
        triggered
    }

    fn start(&mut self) {
        if !self.animating {
            self.animating = true;
            self.last_tick = Instant::now();
        }
    }

    /// Stop animating (the user scrolled away). The next store event restarts it.
    pub fn cancel(&mut self) {
        self.animating = false;
    }

    /// Advance the animation by the time elapsed since the last tick.
    pub fn tick(&mut self, current: u16, target: u16) -> u16 {
        if !self.animating {
            return current;
        }
        let now = Instant::now();
        let dt = now.duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;

        let next = scroll_step(current, target, dt);
        if next == target {
            self.animating = false;
        }
        next
    }
}
