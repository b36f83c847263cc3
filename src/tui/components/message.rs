use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget, Wrap};

use crate::core::message::{Message, Sender};
use crate::tui::markdown;

/// Horizontal padding (per side) between the border and text content.
const CONTENT_PAD_H: u16 = 1;
/// Total horizontal space consumed by borders (1 left + 1 right) and padding.
const HORIZONTAL_OVERHEAD: u16 = 2 + CONTENT_PAD_H * 2;
/// Total vertical space consumed by borders (1 top + 1 bottom).
const VERTICAL_OVERHEAD: u16 = 2;

/// Height of the loading indicator block.
pub const LOADING_HEIGHT: u16 = 3;

const USER_FG: Color = Color::Green;
const AI_FG: Color = Color::Blue;
const FALLBACK_FG: Color = Color::Yellow;

const LOADING_FRAMES: [&str; 4] = ["●○○", "○●○", "○○●", "○●○"];

/// Build the inner text of a message once; it never changes afterwards.
///
/// User text is shown verbatim. Answers go through the markdown pipeline and
/// get a `Sources:` block when citations are present.
pub fn body_text(message: &Message) -> Text<'static> {
    match message.sender() {
        Sender::User => Text::styled(message.text().to_owned(), Style::default().fg(USER_FG)),
        Sender::Ai if message.is_fallback() => {
            Text::styled(message.text().to_owned(), Style::default().fg(FALLBACK_FG))
        }
        Sender::Ai => {
            let mut text = markdown::render(message.text(), AI_FG);
            if message.has_sources() {
                text.lines.push(Line::default());
                text.lines.push(Line::from(Span::styled(
                    "Sources:",
                    Style::default().fg(AI_FG).add_modifier(Modifier::BOLD),
                )));
                for source in message.sources() {
                    text.lines.push(Line::from(vec![
                        Span::styled("• ", Style::default().fg(Color::DarkGray)),
                        Span::styled(
                            format!("Page {} — {}", source.page, source.company),
                            Style::default().fg(Color::Gray),
                        ),
                    ]));
                }
            }
            text
        }
    }
}

/// A single chat message: bordered block, sender title, `HH:MM` timestamp.
///
/// Transient: created each frame from the message and its cached body.
#[derive(Clone, Copy)]
pub struct MessageBlock<'a> {
    pub message: &'a Message,
    pub body: &'a Text<'static>,
}

impl<'a> MessageBlock<'a> {
    pub fn new(message: &'a Message, body: &'a Text<'static>) -> Self {
        Self { message, body }
    }

    /// Height needed to show `body` at `width`, borders included.
    ///
    /// Uses the same `Paragraph` wrapping as `render`, so the measurement
    /// matches what ends up on screen.
    pub fn calculate_height(body: &Text<'static>, width: u16) -> u16 {
        let content_width = width.saturating_sub(HORIZONTAL_OVERHEAD);
        if content_width == 0 {
            // Too narrow for borders + padding; still occupy a row
            return 1;
        }
        let lines = paragraph(body).line_count(content_width);
        u16::try_from(lines)
            .unwrap_or(u16::MAX)
            .max(1)
            .saturating_add(VERTICAL_OVERHEAD)
    }

    fn accent(&self) -> Color {
        match self.message.sender() {
            Sender::User => USER_FG,
            Sender::Ai if self.message.is_fallback() => FALLBACK_FG,
            Sender::Ai => AI_FG,
        }
    }
}

fn paragraph(body: &Text<'static>) -> Paragraph<'static> {
    Paragraph::new(body.clone()).wrap(Wrap { trim: false })
}

impl<'a> Widget for MessageBlock<'a> {
    fn render(self, area: Rect, buf: &mut ratatui::buffer::Buffer) {
        let role = match self.message.sender() {
            Sender::User => " You ",
            Sender::Ai => " AI ",
        };
        let border_style = Style::default().fg(self.accent()).add_modifier(Modifier::DIM);
        let stamp = format!(" {} ", self.message.timestamp().format("%H:%M"));

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(Line::from(role).style(border_style))
            .title(Line::from(stamp).style(border_style).right_aligned())
            .padding(Padding::horizontal(CONTENT_PAD_H));

        let inner_area = block.inner(area);
        block.render(area, buf);
        paragraph(self.body).render(inner_area, buf);
    }
}

/// Three-dot indicator shown below the transcript while a request is pending.
pub struct LoadingIndicator {
    pub frame_index: usize,
}

impl Widget for LoadingIndicator {
    fn render(self, area: Rect, buf: &mut ratatui::buffer::Buffer) {
        let style = Style::default().fg(AI_FG);
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(style.add_modifier(Modifier::DIM))
            .title(Line::from(" AI ").style(style.add_modifier(Modifier::DIM)))
            .padding(Padding::horizontal(CONTENT_PAD_H));
        let inner_area = block.inner(area);
        block.render(area, buf);

        let dots = LOADING_FRAMES[self.frame_index % LOADING_FRAMES.len()];
        Paragraph::new(Span::styled(dots, style)).render(inner_area, buf);
    }
}
