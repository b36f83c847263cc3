//! Markdown → element tree.
//!
//! Parses answer text with `pulldown_cmark` (tables and strikethrough
//! enabled) and maps the result onto a closed set of [`ElementKind`]s.
//! The mapping is one table, [`presentation`]: a node kind either maps to an
//! element or it doesn't. Kinds that don't (links, images, raw HTML, code
//! blocks, block quotes, ordered lists, h4–h6, strikethrough) are reduced to
//! their literal text by a single default case. Nothing here ever yields
//! markup that a later stage could interpret.
//!
//! The output is plain data (`PartialEq`), so rendering the same input twice
//! gives identical trees.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};

/// Elements that receive presentation. This set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    H1,
    H2,
    H3,
    Paragraph,
    UnorderedList,
    ListItem,
    Bold,
    Italic,
    InlineCode,
    Table,
    TableHead,
    TableBody,
    TableRow,
    TableHeaderCell,
    TableDataCell,
}

impl ElementKind {
    pub fn is_block(self) -> bool {
        matches!(
            self,
            ElementKind::H1
                | ElementKind::H2
                | ElementKind::H3
                | ElementKind::Paragraph
                | ElementKind::UnorderedList
                | ElementKind::ListItem
                | ElementKind::Table
                | ElementKind::TableHead
                | ElementKind::TableBody
                | ElementKind::TableRow
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Text(String),
    Node {
        kind: ElementKind,
        children: Vec<Element>,
    },
}

impl Element {
    pub fn kind(&self) -> Option<ElementKind> {
        match self {
            Element::Text(_) => None,
            Element::Node { kind, .. } => Some(*kind),
        }
    }

    pub fn children(&self) -> &[Element] {
        match self {
            Element::Text(_) => &[],
            Element::Node { children, .. } => children,
        }
    }

    /// Concatenated text of this element and its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(std::slice::from_ref(self), &mut out);
        out.trim_end_matches('\n').to_string()
    }
}

/// A rendered answer: a sequence of top-level elements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub children: Vec<Element>,
}

impl Document {
    /// Text of every top-level element, one block per line.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for el in &self.children {
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            collect_text(std::slice::from_ref(el), &mut out);
        }
        out.trim_end_matches('\n').to_string()
    }

    /// Depth-first search for every element of `kind`.
    pub fn find_all(&self, kind: ElementKind) -> Vec<&Element> {
        fn walk<'a>(elements: &'a [Element], kind: ElementKind, out: &mut Vec<&'a Element>) {
            for el in elements {
                if el.kind() == Some(kind) {
                    out.push(el);
                }
                walk(el.children(), kind, out);
            }
        }
        let mut out = Vec::new();
        walk(&self.children, kind, &mut out);
        out
    }
}

/// Grammar-level node kinds, as the parser sees them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Heading(u8),
    Paragraph,
    UnorderedList,
    /// Carries the list's start number.
    OrderedList(u64),
    ListItem,
    Strong,
    Emphasis,
    Strikethrough,
    CodeSpan,
    CodeBlock,
    BlockQuote,
    Link,
    Image,
    /// Inline HTML, or the raw lines inside an HTML block.
    Html,
    HtmlBlock,
    Table,
    TableHead,
    TableBody,
    TableRow,
    TableHeaderCell,
    TableCell,
    Other,
}

impl NodeKind {
    fn is_block(self) -> bool {
        matches!(
            self,
            NodeKind::Heading(_)
                | NodeKind::Paragraph
                | NodeKind::UnorderedList
                | NodeKind::OrderedList(_)
                | NodeKind::ListItem
                | NodeKind::CodeBlock
                | NodeKind::BlockQuote
                | NodeKind::HtmlBlock
                | NodeKind::Table
        )
    }
}

/// The safelist. `None` means "default text handling".
pub fn presentation(kind: NodeKind) -> Option<ElementKind> {
    match kind {
        NodeKind::Heading(1) => Some(ElementKind::H1),
        NodeKind::Heading(2) => Some(ElementKind::H2),
        NodeKind::Heading(3) => Some(ElementKind::H3),
        NodeKind::Paragraph => Some(ElementKind::Paragraph),
        NodeKind::UnorderedList => Some(ElementKind::UnorderedList),
        NodeKind::ListItem => Some(ElementKind::ListItem),
        NodeKind::Strong => Some(ElementKind::Bold),
        NodeKind::Emphasis => Some(ElementKind::Italic),
        NodeKind::CodeSpan => Some(ElementKind::InlineCode),
        NodeKind::Table => Some(ElementKind::Table),
        NodeKind::TableHead => Some(ElementKind::TableHead),
        NodeKind::TableBody => Some(ElementKind::TableBody),
        NodeKind::TableRow => Some(ElementKind::TableRow),
        NodeKind::TableHeaderCell => Some(ElementKind::TableHeaderCell),
        NodeKind::TableCell => Some(ElementKind::TableDataCell),
        _ => None,
    }
}

/// Parse markdown into the restricted element tree.
pub fn render(content: &str) -> Document {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_TABLES);
    opts.insert(Options::ENABLE_STRIKETHROUGH);

    let mut b = Builder::new();
    for event in Parser::new_ext(content, opts) {
        b.handle(event);
    }
    b.finish()
}

// ── Builder ─────────────────────────────────────────────────────────────────

struct Frame {
    kind: NodeKind,
    /// Inserted by the builder (tbody, head row) rather than opened by the parser.
    synthetic: bool,
    children: Vec<Element>,
}

impl Frame {
    fn new(kind: NodeKind, synthetic: bool) -> Self {
        Self {
            kind,
            synthetic,
            children: Vec::new(),
        }
    }
}

struct Builder {
    root: Vec<Element>,
    /// Open nodes, innermost last.
    frames: Vec<Frame>,
}

impl Builder {
    fn new() -> Self {
        Self {
            root: Vec::new(),
            frames: Vec::new(),
        }
    }

    fn children(&mut self) -> &mut Vec<Element> {
        match self.frames.last_mut() {
            Some(frame) => &mut frame.children,
            None => &mut self.root,
        }
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.open(&tag),
            Event::End(tag) => self.close(tag),
            Event::Text(t) => self.push_text(&t),
            Event::Code(c) => self.leaf(NodeKind::CodeSpan, &c),
            Event::Html(h) | Event::InlineHtml(h) => self.leaf(NodeKind::Html, &h),
            Event::SoftBreak => self.push_text(" "),
            Event::HardBreak => self.push_text("\n"),
            _ => {} // Rules, footnotes, math
        }
    }

    fn open(&mut self, tag: &Tag<'_>) {
        let kind = match tag {
            Tag::Paragraph => NodeKind::Paragraph,
            Tag::Heading { level, .. } => NodeKind::Heading(heading_depth(*level)),
            Tag::List(None) => NodeKind::UnorderedList,
            Tag::List(Some(start)) => NodeKind::OrderedList(*start),
            Tag::Item => NodeKind::ListItem,
            Tag::Strong => NodeKind::Strong,
            Tag::Emphasis => NodeKind::Emphasis,
            Tag::Strikethrough => NodeKind::Strikethrough,
            Tag::CodeBlock(_) => NodeKind::CodeBlock,
            Tag::BlockQuote(_) => NodeKind::BlockQuote,
            Tag::Link { .. } => NodeKind::Link,
            Tag::Image { .. } => NodeKind::Image,
            Tag::HtmlBlock => NodeKind::HtmlBlock,
            Tag::Table(_) => NodeKind::Table,
            Tag::TableHead => NodeKind::TableHead,
            Tag::TableRow => NodeKind::TableRow,
            Tag::TableCell if self.in_table_head() => NodeKind::TableHeaderCell,
            Tag::TableCell => NodeKind::TableCell,
            _ => NodeKind::Other,
        };

        // Body rows get a tbody wrapper
        if kind == NodeKind::TableRow && self.frames.last().is_some_and(|f| f.kind == NodeKind::Table) {
            self.frames.push(Frame::new(NodeKind::TableBody, true));
        }

        self.frames.push(Frame::new(kind, false));

        // Header cells arrive without a row of their own
        if kind == NodeKind::TableHead {
            self.frames.push(Frame::new(NodeKind::TableRow, true));
        }
    }

    fn close(&mut self, _tag: TagEnd) {
        // Pop synthetic frames until the parser's own frame is closed
        while let Some(synthetic) = self.frames.last().map(|f| f.synthetic) {
            self.pop_frame();
            if !synthetic {
                break;
            }
        }
    }

    fn finish(mut self) -> Document {
        while !self.frames.is_empty() {
            self.pop_frame();
        }
        Document {
            children: self.root,
        }
    }

    fn in_table_head(&self) -> bool {
        self.frames.iter().rev().any(|f| f.kind == NodeKind::TableHead)
    }

    fn pop_frame(&mut self) {
        let Some(frame) = self.frames.pop() else {
            return;
        };
        let element = lower(frame.kind, frame.children);
        match element {
            Element::Text(t) if frame.kind.is_block() => self.append_flattened_block(t),
            element => self.append(element),
        }
    }

    /// A block that lost its presentation still ends a line. It never merges
    /// into the text before it; nested inside another node it starts on a
    /// fresh line.
    fn append_flattened_block(&mut self, text: String) {
        if text.is_empty() {
            return;
        }
        let nested = !self.frames.is_empty();
        let children = self.children();
        if nested && !children.is_empty() {
            children.push(Element::Text(format!("\n{text}")));
        } else {
            children.push(Element::Text(text));
        }
    }

    fn leaf(&mut self, kind: NodeKind, content: &str) {
        let element = lower(kind, vec![Element::Text(content.to_string())]);
        self.append(element);
    }

    fn push_text(&mut self, text: &str) {
        self.append(Element::Text(text.to_string()));
    }

    fn append(&mut self, element: Element) {
        let children = self.children();
        match element {
            Element::Text(t) if t.is_empty() => {}
            Element::Text(t) => {
                // Merge adjacent text runs so equal input gives equal trees
                if let Some(Element::Text(prev)) = children.last_mut() {
                    prev.push_str(&t);
                } else {
                    children.push(Element::Text(t));
                }
            }
            node => children.push(node),
        }
    }
}

/// Map one closed node onto the element set. The `None` arm is the single
/// default case for everything outside the safelist.
fn lower(kind: NodeKind, children: Vec<Element>) -> Element {
    match presentation(kind) {
        Some(kind) => Element::Node { kind, children },
        None => {
            let mut text = String::new();
            match kind {
                NodeKind::OrderedList(start) => collect_numbered(start, &children, &mut text),
                _ => collect_text(&children, &mut text),
            }
            Element::Text(text.trim_end_matches('\n').to_string())
        }
    }
}

/// Ordered list items as `"{n}. item"` lines, counting from `start`.
fn collect_numbered(start: u64, items: &[Element], out: &mut String) {
    let mut number = start;
    for item in items {
        match item {
            Element::Node {
                kind: ElementKind::ListItem,
                children,
            } => {
                let mut body = String::new();
                collect_text(children, &mut body);
                if !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
                out.push_str(&format!("{number}. {}", body.trim_end_matches('\n')));
                number += 1;
            }
            other => collect_text(std::slice::from_ref(other), out),
        }
    }
}

fn collect_text(elements: &[Element], out: &mut String) {
    for el in elements {
        match el {
            Element::Text(t) => out.push_str(t),
            Element::Node { kind, children } => {
                if kind.is_block() && !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
                collect_text(children, out);
                if kind.is_block() && !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                } else if matches!(kind, ElementKind::TableHeaderCell | ElementKind::TableDataCell) {
                    out.push(' ');
                }
            }
        }
    }
}

fn heading_depth(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
