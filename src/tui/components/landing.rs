//! # Welcome Screen Component
//!
//! Shown until the first submission: a greeting and a few example prompts.
//! `Tab` copies the next example into the input (handled by the event loop;
//! this component only highlights which one is current).

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};

use crate::tui::component::Component;

pub struct LandingPage<'a> {
    pub user_name: &'a str,
    pub examples: &'a [String],
    /// Index of the example last copied into the input, if any
    pub selected: Option<usize>,
}

impl<'a> LandingPage<'a> {
    pub fn new(user_name: &'a str, examples: &'a [String], selected: Option<usize>) -> Self {
        Self {
            user_name,
            examples,
            selected,
        }
    }

    fn greeting(&self) -> Vec<Line<'static>> {
        vec![
            Line::from(Span::styled(
                format!("Hello, {}", self.user_name),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "What's on your mind?",
                Style::default().fg(Color::DarkGray),
            )),
        ]
    }

    fn example_lines(&self) -> Vec<Line<'static>> {
        if self.examples.is_empty() {
            return Vec::new();
        }
        let mut lines = vec![Line::from(Span::styled(
            "Try an example (Tab):",
            Style::default().fg(Color::DarkGray),
        ))];
        for (i, example) in self.examples.iter().enumerate() {
            let style = if self.selected == Some(i) {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            lines.push(Line::from(vec![
                Span::styled("› ", Style::default().fg(Color::DarkGray)),
                Span::styled(example.clone(), style),
            ]));
        }
        lines
    }
}

impl<'a> Component for LandingPage<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let greeting = self.greeting();
        let examples = self.example_lines();

        let vertical = Layout::vertical([
            Constraint::Length(greeting.len() as u16),
            Constraint::Length(1), // Spacer
            Constraint::Length(examples.len() as u16),
        ])
        .flex(Flex::Center)
        .split(area);

        frame.render_widget(
            Paragraph::new(greeting).alignment(Alignment::Center),
            vertical[0],
        );

        // Examples are long; keep them left-aligned in a centred column
        let [column] = Layout::horizontal([Constraint::Max(100)])
            .flex(Flex::Center)
            .areas(vertical[2]);
        frame.render_widget(
            Paragraph::new(examples).wrap(Wrap { trim: true }),
            column,
        );
    }
}
