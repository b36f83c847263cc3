//! # TitleBar Component
//!
//! Top status bar: app name, backend address, status text, and a "↓ New"
//! indicator when there's content below the viewport.
//!
//! The title text changes based on state:
//!
//! 1. **Unseen content**: `"ragchat (backend: http://…) | Thinking... | ↓ New"`
//! 2. **Status message**: `"ragchat (backend: http://…) | Thinking..."`
//! 3. **Default**: `"ragchat (backend: http://…)"`

use crate::tui::component::Component;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::Span;

/// Stateless: all fields are props from the parent.
pub struct TitleBar {
    pub backend_name: String,
    pub status_message: String,
    pub has_unseen_content: bool,
}

impl TitleBar {
    pub fn new(backend_name: String, status_message: String, has_unseen_content: bool) -> Self {
        Self {
            backend_name,
            status_message,
            has_unseen_content,
        }
    }

    fn title_text(&self) -> String {
        let mut title = format!("ragchat (backend: {})", self.backend_name);
        if !self.status_message.is_empty() {
            title.push_str(" | ");
            title.push_str(&self.status_message);
        }
        if self.has_unseen_content {
            title.push_str(" | ↓ New");
        }
        title
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(Span::raw(self.title_text()), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn render(title_bar: &mut TitleBar) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 1)).unwrap();
        terminal.draw(|f| title_bar.render(f, f.area())).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_title_bar_with_unseen_content() {
        let mut title_bar = TitleBar::new(
            "http://localhost:8000".to_string(),
            "Thinking...".to_string(),
            true,
        );
        let text = render(&mut title_bar);
        assert!(text.contains("ragchat"));
        assert!(text.contains("http://localhost:8000"));
        assert!(text.contains("Thinking..."));
        assert!(text.contains("↓ New"));
    }

    #[test]
    fn test_title_bar_unseen_without_status() {
        let title_bar = TitleBar::new("http://x".to_string(), String::new(), true);
        assert_eq!(title_bar.title_text(), "ragchat (backend: http://x) | ↓ New");
    }

    #[test]
    fn test_title_bar_default_no_status() {
        let mut title_bar = TitleBar::new("http://localhost:8000".to_string(), String::new(), false);
        let text = render(&mut title_bar);
        assert!(text.contains("ragchat"));
        assert!(!text.contains('|'));
        assert!(!text.contains("↓ New"));
    }
}
