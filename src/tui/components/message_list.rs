//! # MessageList Component
//!
//! Scrollable view of the transcript.
//!
//! ## Responsibilities
//!
//! - Display every message in store order, plus the loading indicator
//! - Cache each message's rendered body and measured height
//! - Keep the newest message in view (see [`ScrollController`])
//!
//! ## Architecture
//!
//! `MessageList` is a transient component (created each frame) that wraps
//! `&'a mut MessageListState` (persistent state) and the message slice (props).
//! The store is append-only, so a cached height is only invalidated when the
//! width changes.

use std::collections::HashMap;

use ratatui::Frame;
use ratatui::layout::{Position, Rect, Size};
use ratatui::text::Text;
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::message::{Message, MessageId, StoreEvent};
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::message::{LOADING_HEIGHT, LoadingIndicator, MessageBlock, body_text};
use crate::tui::event::TuiEvent;
use crate::tui::scroll::ScrollController;

/// Layout and scroll state for the message list.
/// Must be persisted in the parent TuiState.
pub struct MessageListState {
    pub scroll_state: ScrollViewState,
    pub layout: LayoutCache,
    /// When true, stay attached to the bottom as content grows
    pub stick_to_bottom: bool,
    /// Smooth scroll driven by store events
    pub autoscroll: ScrollController,
    /// Content below the viewport (drives the "↓ New" indicator)
    pub has_unseen_content: bool,
    /// Last known viewport height (for scroll clamping between frames)
    pub viewport_height: u16,
    /// Last known canvas height (messages + indicator)
    canvas_height: u16,
    /// Rendered message bodies. Messages never change once appended.
    bodies: HashMap<MessageId, Text<'static>>,
}

impl MessageListState {
    pub fn new(store_events: std::sync::mpsc::Receiver<StoreEvent>) -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            layout: LayoutCache::new(),
            stick_to_bottom: true,
            autoscroll: ScrollController::new(store_events),
            has_unseen_content: false,
            viewport_height: 0,
            canvas_height: 0,
            bodies: HashMap::new(),
        }
    }

    fn max_offset(&self) -> u16 {
        self.canvas_height.saturating_sub(self.viewport_height)
    }

    /// Snap to the bottom and stay there.
    pub fn jump_to_bottom(&mut self) {
        self.autoscroll.cancel();
        self.stick_to_bottom = true;
        self.scroll_state.set_offset(Position {
            x: 0,
            y: self.max_offset(),
        });
    }

    /// Clamp scroll and re-engage auto-scroll if the user has reached the bottom.
    pub fn repin_if_at_bottom(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y >= max_y {
            self.stick_to_bottom = true;
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    fn scrolled_up(&mut self) {
        self.autoscroll.cancel();
        self.stick_to_bottom = false;
    }
}

/// Scrollable transcript component.
/// Created fresh each frame with references to state and data.
pub struct MessageList<'a> {
    pub state: &'a mut MessageListState,
    pub messages: &'a [Message],
    pub is_loading: bool,
    pub spinner_frame: usize,
}

impl<'a> MessageList<'a> {
    pub fn new(
        state: &'a mut MessageListState,
        messages: &'a [Message],
        is_loading: bool,
        spinner_frame: usize,
    ) -> Self {
        Self {
            state,
            messages,
            is_loading,
            spinner_frame,
        }
    }

    fn update_layout(&mut self, content_width: u16) {
        for message in self.messages {
            self.state
                .bodies
                .entry(message.id())
                .or_insert_with(|| body_text(message));
        }

        let layout = &mut self.state.layout;
        let reusable = layout.reusable_count(self.messages.len(), content_width);
        layout.heights.truncate(reusable);
        for message in self.messages.iter().skip(layout.heights.len()) {
            let height = self
                .state
                .bodies
                .get(&message.id())
                .map_or(1, |body| MessageBlock::calculate_height(body, content_width));
            layout.heights.push(height);
        }
        layout.rebuild_prefix_heights();
        layout.update_metadata(content_width);
    }

    /// Decide this frame's scroll offset.
    fn update_scroll(&mut self) {
        let state = &mut *self.state;
        if state.autoscroll.observe(self.is_loading) {
            state.stick_to_bottom = true;
        }
        let max_y = state.max_offset();
        let current = state.scroll_state.offset().y;
        let y = if state.autoscroll.is_animating() {
            state.autoscroll.tick(current, max_y)
        } else if state.stick_to_bottom {
            max_y
        } else {
            current.min(max_y)
        };
        state.scroll_state.set_offset(Position { x: 0, y });
    }
}

impl<'a> Component for MessageList<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let content_width = area.width.saturating_sub(1); // -1 for scrollbar safe area

        // 1. Layout cache
        self.update_layout(content_width);
        let total_height = self.state.layout.total_height();
        let indicator_height = if self.is_loading { LOADING_HEIGHT } else { 0 };
        let canvas_height = total_height.saturating_add(indicator_height);

        self.state.viewport_height = area.height;
        self.state.canvas_height = canvas_height;

        // 2. Scroll position
        self.update_scroll();
        let scroll_offset = self.state.scroll_state.offset().y;
        let visible_range = self.state.layout.visible_range(scroll_offset, area.height);

        // 3. Render visible messages into a ScrollView
        let mut scroll_view = ScrollView::new(Size::new(content_width, canvas_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Always)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        for (i, y_offset, height) in self.state.layout.placements(visible_range) {
            let message = &self.messages[i];
            if let Some(body) = self.state.bodies.get(&message.id()) {
                let rect = Rect::new(0, y_offset, content_width, height);
                scroll_view.render_widget(MessageBlock::new(message, body), rect);
            }
        }

        if self.is_loading {
            let rect = Rect::new(0, total_height, content_width, LOADING_HEIGHT);
            scroll_view.render_widget(
                LoadingIndicator {
                    frame_index: self.spinner_frame,
                },
                rect,
            );
        }

        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);

        let max_y = self.state.max_offset();
        self.state.has_unseen_content = self.state.scroll_state.offset().y < max_y;
    }
}

/// Implemented on the state because `MessageList` is recreated every frame.
impl EventHandler for MessageListState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp => {
                self.scroll_state.scroll_up();
                self.scrolled_up();
            }
            TuiEvent::ScrollDown => {
                self.scroll_state.scroll_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::ScrollPageUp => {
                self.scroll_state.scroll_page_up();
                self.scrolled_up();
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
                self.repin_if_at_bottom();
            }
            _ => {}
        }
        None
    }
}

/// Cached layout measurements
pub struct LayoutCache {
    pub heights: Vec<u16>,
    pub prefix_heights: Vec<u16>,
    content_width: u16,
}

impl Default for LayoutCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutCache {
    pub fn new() -> Self {
        Self {
            heights: Vec::new(),
            prefix_heights: Vec::new(),
            content_width: 0,
        }
    }

    /// How many cached heights are still valid. Messages never change after
    /// being appended, so only a width change invalidates them.
    pub fn reusable_count(&self, message_count: usize, content_width: u16) -> usize {
        if self.content_width != content_width {
            return 0;
        }
        self.heights.len().min(message_count)
    }

    pub fn update_metadata(&mut self, content_width: u16) {
        self.content_width = content_width;
    }

    pub fn total_height(&self) -> u16 {
        self.prefix_heights.last().copied().unwrap_or(0)
    }

    pub fn rebuild_prefix_heights(&mut self) {
        self.prefix_heights = self
            .heights
            .iter()
            .scan(0u16, |acc, &h| {
                *acc = acc.saturating_add(h);
                Some(*acc)
            })
            .collect();
    }

    /// `(index, top row, height)` for each message in `range`. Rows past the
    /// end of the canvas clamp to `u16::MAX`.
    pub fn placements(&self, range: std::ops::Range<usize>) -> Vec<(usize, u16, u16)> {
        let mut y = match range.start {
            0 => 0,
            start => self.prefix_heights.get(start - 1).copied().unwrap_or(u16::MAX),
        };
        let mut out = Vec::with_capacity(range.len());
        for i in range {
            let Some(&height) = self.heights.get(i) else {
                break;
            };
            out.push((i, y, height));
            y = y.saturating_add(height);
        }
        out
    }

    pub fn visible_range(&self, scroll_offset: u16, viewport_height: u16) -> std::ops::Range<usize> {
        let buffer = viewport_height / 2;
        let buffered_start = scroll_offset.saturating_sub(buffer);
        let buffered_end = scroll_offset
            .saturating_add(viewport_height)
            .saturating_add(buffer);

        let start = self
            .prefix_heights
            .partition_point(|&end| end <= buffered_start);
        let end = self
            .prefix_heights
            .partition_point(|&end| end < buffered_end)
            .saturating_add(1)
            .min(self.prefix_heights.len());

        start..end
    }
}
