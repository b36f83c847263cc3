//! # InputBox Component
//!
//! Single-line query editor.
//!
//! ## Responsibilities
//!
//! - Capture text input (typing, paste)
//! - Handle editing (backspace, delete, left/right, home/end)
//! - Emit `Submit` on Enter, unless locked
//! - Show a placeholder while empty
//!
//! ## State Management
//!
//! The buffer and cursor are internal state. `locked` is a prop: the parent
//! sets it while a request is in flight and submission isn't allowed. A
//! locked box keeps accepting edits but Enter leaves the buffer untouched.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, BorderType, Paragraph};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

pub const PLACEHOLDER: &str = "Ask AI a question or make a request";

/// Borders take one column each side.
const BORDER_OFFSET: u16 = 1;
/// Rows: top border, text, bottom border.
pub const INPUT_HEIGHT: u16 = 3;

/// High-level events emitted by the InputBox
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// User submitted the text (Enter pressed)
    Submit(String),
    /// Text or cursor changed
    ContentChanged,
}

pub struct InputBox {
    /// Text buffer (Internal State)
    pub buffer: String,
    /// Refuse to submit (Prop)
    pub locked: bool,
    /// Cursor position as byte offset in buffer (0..=buffer.len())
    cursor: usize,
    /// First visible display column when the text is wider than the box
    scroll_cols: usize,
}

impl Default for InputBox {
    fn default() -> Self {
        Self::new()
    }
}

impl InputBox {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            locked: false,
            cursor: 0,
            scroll_cols: 0,
        }
    }

    /// Replace the contents (example prompt injection) and move the cursor to the end.
    pub fn set_text(&mut self, text: &str) {
        self.buffer = single_line(text);
        self.cursor = self.buffer.len();
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    fn cursor_col(&self) -> usize {
        self.buffer[..self.cursor].width()
    }

    /// Keep the cursor column inside `[scroll_cols, scroll_cols + width)`.
    fn update_scroll(&mut self, width: usize) {
        if width == 0 {
            self.scroll_cols = 0;
            return;
        }
        let col = self.cursor_col();
        if col < self.scroll_cols {
            self.scroll_cols = col;
        } else if col >= self.scroll_cols + width {
            self.scroll_cols = col + 1 - width;
        }
    }

    /// The slice of the buffer visible at the current scroll position.
    fn visible_text(&self, width: usize) -> String {
        let mut col = 0;
        let mut out = String::new();
        for c in self.buffer.chars() {
            let w = c.width().unwrap_or(0);
            if col >= self.scroll_cols {
                if col + w - self.scroll_cols > width {
                    break;
                }
                out.push(c);
            }
            col += w;
        }
        out
    }
}

/// Newlines from pastes become spaces; the query is one line.
fn single_line(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}

fn prev_char_boundary(s: &str, pos: usize) -> usize {
    s[..pos].char_indices().next_back().map_or(0, |(i, _)| i)
}

fn next_char_boundary(s: &str, pos: usize) -> usize {
    s[pos..].chars().next().map_or(pos, |c| pos + c.len_utf8())
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let inner_width = area.width.saturating_sub(BORDER_OFFSET * 2) as usize;
        self.update_scroll(inner_width);

        let (title, border_style) = if self.locked {
            (
                " Waiting for answer… ",
                Style::default().fg(Color::DarkGray),
            )
        } else {
            (" Ask ", Style::default().fg(Color::Green))
        };

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(title);

        let content = if self.buffer.is_empty() {
            Span::styled(
                PLACEHOLDER,
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )
        } else {
            let fg = if self.locked { Color::Gray } else { Color::Green };
            Span::styled(self.visible_text(inner_width), Style::default().fg(fg))
        };

        frame.render_widget(Paragraph::new(content).block(block), area);

        let col = (self.cursor_col() - self.scroll_cols) as u16;
        frame.set_cursor_position((
            area.x + BORDER_OFFSET + col.min(inner_width.saturating_sub(1) as u16),
            area.y + BORDER_OFFSET,
        ));
    }
}

impl EventHandler for InputBox {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::InputChar(c) if c.is_control() => None,
            TuiEvent::InputChar(c) => {
                self.buffer.insert(self.cursor, *c);
                self.cursor += c.len_utf8();
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Paste(text) => {
                let text = single_line(text);
                self.buffer.insert_str(self.cursor, &text);
                self.cursor += text.len();
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Backspace => (self.cursor > 0).then(|| {
                let prev = prev_char_boundary(&self.buffer, self.cursor);
                self.buffer.drain(prev..self.cursor);
                self.cursor = prev;
                InputEvent::ContentChanged
            }),
            TuiEvent::Delete => (self.cursor < self.buffer.len()).then(|| {
                let next = next_char_boundary(&self.buffer, self.cursor);
                self.buffer.drain(self.cursor..next);
                InputEvent::ContentChanged
            }),
            TuiEvent::CursorLeft => (self.cursor > 0).then(|| {
                self.cursor = prev_char_boundary(&self.buffer, self.cursor);
                InputEvent::ContentChanged
            }),
            TuiEvent::CursorRight => (self.cursor < self.buffer.len()).then(|| {
                self.cursor = next_char_boundary(&self.buffer, self.cursor);
                InputEvent::ContentChanged
            }),
            TuiEvent::CursorHome => (self.cursor != 0).then(|| {
                self.cursor = 0;
                InputEvent::ContentChanged
            }),
            TuiEvent::CursorEnd => (self.cursor != self.buffer.len()).then(|| {
                self.cursor = self.buffer.len();
                InputEvent::ContentChanged
            }),
            TuiEvent::Submit => {
                if self.locked || self.buffer.trim().is_empty() {
                    return None;
                }
                let text = std::mem::take(&mut self.buffer);
                self.cursor = 0;
                self.scroll_cols = 0;
                Some(InputEvent::Submit(text))
            }
            _ => None,
        }
    }
}
