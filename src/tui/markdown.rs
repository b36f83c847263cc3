//! Element tree → ratatui `Text` layout.
//!
//! Walks a [`Document`] from [`crate::markdown`] and emits styled
//! `Line`/`Span` values. Only the safelisted element kinds exist at this
//! point, so this stage never sees links, images or raw HTML.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use unicode_width::UnicodeWidthStr;

use crate::markdown::{self, Document, Element, ElementKind};

const TABLE_COLOR: Color = Color::DarkGray;

/// Parse and lay out answer text in one step.
pub fn render(content: &str, base_fg: Color) -> Text<'static> {
    to_text(&markdown::render(content), base_fg)
}

/// Lay out an element tree as styled lines.
///
/// Returns owned text (`'static`) so callers can cache it per message.
pub fn to_text(doc: &Document, base_fg: Color) -> Text<'static> {
    let mut w = Writer::new(base_fg);
    for el in &doc.children {
        w.block(el);
    }
    w.text
}

// ── Writer ──────────────────────────────────────────────────────────────────

struct Writer {
    text: Text<'static>,
    base_fg: Color,
    /// Inline style stack. Styles compose via `patch` so nested bold+italic works.
    styles: Vec<Style>,
    /// Unordered list nesting depth.
    list_depth: usize,
    /// Whether the next block element should be preceded by a blank line.
    needs_newline: bool,
}

impl Writer {
    fn new(base_fg: Color) -> Self {
        Self {
            text: Text::default(),
            base_fg,
            styles: vec![],
            list_depth: 0,
            needs_newline: false,
        }
    }

    // ── Style helpers ───────────────────────────────────────────────────

    fn style(&self) -> Style {
        self.styles
            .last()
            .copied()
            .unwrap_or_else(|| Style::default().fg(self.base_fg))
    }

    fn push_style(&mut self, overlay: Style) {
        self.styles.push(self.style().patch(overlay));
    }

    fn pop_style(&mut self) {
        self.styles.pop();
    }

    // ── Line/span helpers ───────────────────────────────────────────────

    fn push_line(&mut self, line: Line<'static>) {
        self.text.lines.push(line);
    }

    fn push_span(&mut self, span: Span<'static>) {
        if let Some(line) = self.text.lines.last_mut() {
            line.push_span(span);
        } else {
            self.push_line(Line::from(vec![span]));
        }
    }

    fn blank_line_if_needed(&mut self) {
        if self.needs_newline {
            self.push_line(Line::default());
            self.needs_newline = false;
        }
    }

    /// Push text in the given style; embedded newlines start new lines.
    fn push_text(&mut self, text: &str, style: Style) {
        // ratatui renders \t as zero-width
        let text = text.replace('\t', "    ");
        for (i, part) in text.split('\n').enumerate() {
            if i > 0 {
                let indent = self.continuation_indent();
                self.push_line(Line::from(indent));
            }
            if !part.is_empty() {
                self.push_span(Span::styled(part.to_owned(), style));
            }
        }
    }

    fn continuation_indent(&self) -> String {
        if self.list_depth == 0 {
            String::new()
        } else {
            "  ".repeat(self.list_depth)
        }
    }

    // ── Blocks ──────────────────────────────────────────────────────────

    fn block(&mut self, el: &Element) {
        let (kind, children) = match el {
            Element::Text(t) => {
                // Flattened constructs (code blocks, ordered lists, h4–h6)
                self.blank_line_if_needed();
                self.push_line(Line::default());
                let style = self.style();
                self.push_text(t, style);
                self.needs_newline = true;
                return;
            }
            Element::Node { kind, children } => (*kind, children),
        };

        match kind {
            ElementKind::H1 | ElementKind::H2 | ElementKind::H3 => {
                self.blank_line_if_needed();
                self.push_line(Line::default());
                self.push_style(heading_style(self.base_fg, kind));
                self.inlines(children);
                self.pop_style();
                self.needs_newline = true;
            }
            ElementKind::Paragraph => {
                self.blank_line_if_needed();
                self.push_line(Line::default());
                self.inlines(children);
                self.needs_newline = true;
            }
            ElementKind::UnorderedList => {
                if self.list_depth == 0 {
                    self.blank_line_if_needed();
                }
                self.list_depth += 1;
                for item in children {
                    self.list_item(item);
                }
                self.list_depth -= 1;
                self.needs_newline = true;
            }
            ElementKind::ListItem => self.list_item(el),
            ElementKind::Table => {
                self.blank_line_if_needed();
                self.table(el);
                self.needs_newline = true;
            }
            // Inline or table-internal kinds at block level
            _ => {
                self.blank_line_if_needed();
                self.push_line(Line::default());
                self.inline(el);
                self.needs_newline = true;
            }
        }
    }

    fn list_item(&mut self, item: &Element) {
        let depth = self.list_depth.saturating_sub(1);
        self.push_line(Line::from(Span::styled(
            format!("{}• ", "  ".repeat(depth)),
            Style::default().fg(Color::DarkGray),
        )));

        // Tight items hold inlines directly; loose items wrap them in paragraphs
        let mut on_marker_line = true;
        for child in item.children() {
            match child.kind() {
                Some(ElementKind::UnorderedList) => {
                    self.block(child);
                    on_marker_line = false;
                }
                Some(ElementKind::Paragraph) => {
                    if !on_marker_line {
                        let indent = self.continuation_indent();
                        self.push_line(Line::from(indent));
                    }
                    self.inlines(child.children());
                    on_marker_line = false;
                }
                _ => {
                    self.inline(child);
                    // Flattened blocks arrive as text that opens its own line
                    if matches!(child, Element::Text(t) if t.starts_with('\n')) {
                        on_marker_line = false;
                    }
                }
            }
        }
        self.needs_newline = false;
    }

    // ── Inlines ─────────────────────────────────────────────────────────

    fn inlines(&mut self, elements: &[Element]) {
        for el in elements {
            self.inline(el);
        }
    }

    fn inline(&mut self, el: &Element) {
        match el {
            Element::Text(t) => {
                let style = self.style();
                self.push_text(t, style);
            }
            Element::Node { kind, children } => match kind {
                ElementKind::Bold => {
                    self.push_style(Style::default().add_modifier(Modifier::BOLD));
                    self.inlines(children);
                    self.pop_style();
                }
                ElementKind::Italic => {
                    self.push_style(Style::default().add_modifier(Modifier::ITALIC));
                    self.inlines(children);
                    self.pop_style();
                }
                ElementKind::InlineCode => {
                    let style = Style::default().fg(Color::White).bg(Color::DarkGray);
                    self.push_span(Span::styled(el.text_content(), style));
                }
                _ => self.inlines(children),
            },
        }
    }

    // ── Tables ──────────────────────────────────────────────────────────

    fn table(&mut self, table: &Element) {
        // (is_header, cells)
        let mut rows: Vec<(bool, Vec<Vec<Span<'static>>>)> = Vec::new();
        for section in table.children() {
            let header = section.kind() == Some(ElementKind::TableHead);
            for row in section.children() {
                let cells = row
                    .children()
                    .iter()
                    .map(|cell| self.cell_spans(cell, header))
                    .collect();
                rows.push((header, cells));
            }
        }
        for line in grid_lines(&rows) {
            self.push_line(line);
        }
    }

    fn cell_spans(&self, cell: &Element, header: bool) -> Vec<Span<'static>> {
        let mut w = Writer::new(self.base_fg);
        w.push_line(Line::default());
        if header {
            w.push_style(Style::default().add_modifier(Modifier::BOLD));
        }
        w.inlines(cell.children());
        // A cell is one grid line; hard breaks collapse to spaces
        let mut spans = Vec::new();
        for (i, line) in w.text.lines.into_iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            spans.extend(line.spans);
        }
        spans
    }
}

fn spans_width(spans: &[Span<'_>]) -> usize {
    spans.iter().map(|s| s.content.as_ref().width()).sum()
}

/// Column-aligned rows separated by ` │ `, with a rule under the header.
fn grid_lines(rows: &[(bool, Vec<Vec<Span<'static>>>)]) -> Vec<Line<'static>> {
    let num_cols = rows.iter().map(|(_, r)| r.len()).max().unwrap_or(0);
    let mut col_widths = vec![0usize; num_cols];
    for (_, row) in rows {
        for (i, cell) in row.iter().enumerate() {
            col_widths[i] = col_widths[i].max(spans_width(cell));
        }
    }

    let sep_style = Style::default().fg(TABLE_COLOR);
    let mut lines = Vec::new();
    for (idx, (header, row)) in rows.iter().enumerate() {
        let mut spans: Vec<Span<'static>> = Vec::new();
        for (i, width) in col_widths.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" │ ", sep_style));
            }
            let cell = row.get(i).cloned().unwrap_or_default();
            let pad = width.saturating_sub(spans_width(&cell));
            spans.extend(cell);
            if pad > 0 {
                spans.push(Span::raw(" ".repeat(pad)));
            }
        }
        lines.push(Line::from(spans));

        let next_is_body = rows.get(idx + 1).is_some_and(|(h, _)| !h);
        if *header && (next_is_body || idx + 1 == rows.len()) {
            let rule = col_widths
                .iter()
                .map(|&w| "─".repeat(w))
                .collect::<Vec<_>>()
                .join("─┼─");
            lines.push(Line::from(Span::styled(rule, sep_style)));
        }
    }
    lines
}

fn heading_style(base_fg: Color, kind: ElementKind) -> Style {
    match kind {
        ElementKind::H1 => Style::default()
            .fg(base_fg)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        ElementKind::H2 => Style::default().fg(base_fg).add_modifier(Modifier::BOLD),
        _ => Style::default()
            .fg(base_fg)
            .add_modifier(Modifier::BOLD | Modifier::ITALIC),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_strings(text: &Text<'_>) -> Vec<String> {
        text.lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect::<String>())
            .collect()
    }

    #[test]
    fn heading_has_style_and_no_hash_markers() {
        let text = render("## Hello", Color::Blue);
        let line = &text.lines[0];
        let span = line.spans.iter().find(|s| s.content == "Hello").unwrap();
        assert!(span.style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(span.style.fg, Some(Color::Blue));
        assert!(!line_strings(&text)[0].contains('#'));
    }

    #[test]
    fn h1_is_underlined() {
        let text = render("# Title", Color::Blue);
        let span = &text.lines[0].spans[0];
        assert!(span.style.add_modifier.contains(Modifier::UNDERLINED));
    }

    #[test]
    fn bold_text_is_bold_without_markers() {
        let text = render("**bold** text", Color::Blue);
        let line = &text.lines[0];
        let bold_span = line.spans.iter().find(|s| s.content == "bold").unwrap();
        assert!(bold_span.style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(line_strings(&text), vec!["bold text"]);
    }

    #[test]
    fn nested_bold_italic_compose() {
        let text = render("**bold *both***", Color::Blue);
        let span = text.lines[0].spans.iter().find(|s| s.content == "both").unwrap();
        assert!(span.style.add_modifier.contains(Modifier::BOLD));
        assert!(span.style.add_modifier.contains(Modifier::ITALIC));
    }

    #[test]
    fn inline_code_styled() {
        let text = render("Use `foo()` here", Color::Blue);
        let code_span = text.lines[0].spans.iter().find(|s| s.content == "foo()").unwrap();
        assert_eq!(code_span.style.fg, Some(Color::White));
        assert_eq!(code_span.style.bg, Some(Color::DarkGray));
    }

    #[test]
    fn plain_text_uses_base_color() {
        let text = render("hello", Color::Green);
        assert_eq!(text.lines[0].spans[0].style.fg, Some(Color::Green));
    }

    #[test]
    fn paragraphs_separated_by_blank_line() {
        let text = render("one\n\ntwo", Color::Blue);
        assert_eq!(line_strings(&text), vec!["one", "", "two"]);
    }

    #[test]
    fn list_items_get_bullets_and_nesting() {
        let text = render("- one\n- two\n  - inner", Color::Blue);
        assert_eq!(line_strings(&text), vec!["• one", "• two", "  • inner"]);
    }

    #[test]
    fn link_shows_text_only() {
        let text = render("see [docs](https://example.com)", Color::Blue);
        let all = line_strings(&text).join("\n");
        assert_eq!(all, "see docs");
        assert!(text.lines[0].spans.iter().all(|s| !s.style.add_modifier.contains(Modifier::UNDERLINED)));
    }

    #[test]
    fn code_block_lines_are_plain() {
        let text = render("```\n\tlet x = 1;\nlet y;\n```", Color::Blue);
        assert_eq!(line_strings(&text), vec!["    let x = 1;", "let y;"]);
    }

    #[test]
    fn ordered_list_keeps_numbers_and_line_breaks() {
        let text = render("1. first\n2. second\n\n#### Summary", Color::Blue);
        assert_eq!(line_strings(&text), vec!["1. first", "2. second", "", "Summary"]);
    }

    #[test]
    fn flattened_headings_do_not_run_together() {
        let text = render("#### Four\n\n#### Five", Color::Blue);
        assert_eq!(line_strings(&text), vec!["Four", "", "Five"]);
    }

    #[test]
    fn ordered_list_nested_in_loose_item_is_indented() {
        let text = render("- intro\n\n  1. first\n  2. second\n", Color::Blue);
        assert_eq!(line_strings(&text), vec!["• intro", "  1. first", "  2. second"]);
    }

    #[test]
    fn ordered_list_nested_in_tight_item_is_indented() {
        let text = render("- intro\n  1. first\n- next", Color::Blue);
        assert_eq!(line_strings(&text), vec!["• intro", "  1. first", "• next"]);
    }

    #[test]
    fn table_is_a_column_aligned_grid() {
        let text = render("| Metric | Q4 |\n|---|---|\n| PAT | 100 |\n| Revenue | 9 |\n", Color::Blue);
        assert_eq!(
            line_strings(&text),
            vec![
                "Metric  │ Q4 ",
                "────────┼────",
                "PAT     │ 100",
                "Revenue │ 9  ",
            ]
        );
        let header = text.lines[0].spans.iter().find(|s| s.content == "Metric").unwrap();
        assert!(header.style.add_modifier.contains(Modifier::BOLD));
        let body = text.lines[2].spans.iter().find(|s| s.content == "PAT").unwrap();
        assert!(!body.style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn table_width_counts_wide_characters() {
        let text = render("| 名前 | x |\n|---|---|\n| ab | y |\n", Color::Blue);
        let lines = line_strings(&text);
        assert_eq!(lines[0], "名前 │ x");
        assert_eq!(lines[2], "ab   │ y");
    }

    #[test]
    fn same_input_lays_out_identically() {
        let input = "# T\n\n- a\n- **b**\n\n| x |\n|---|\n| 1 |\n";
        assert_eq!(render(input, Color::Blue), render(input, Color::Blue));
    }
}
