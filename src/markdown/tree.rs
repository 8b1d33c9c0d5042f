//! Markdown to element tree.
//!
//! `pulldown-cmark` produces a flat event stream in which raw HTML arrives as
//! opaque string fragments, one per line for HTML blocks. Those fragments are
//! tokenized with `quick-xml` and merged into the same tree, so an element
//! opened in one HTML block (`<details>`) can contain markdown parsed after
//! it and be closed by a later block (`</details>`).
//!
//! ## Frame Stack
//!
//! Open elements live on a stack of frames tagged by origin:
//!
//! | Origin | Opened by | Closed by |
//! |---|---|---|
//! | `Markdown` | a `Start` event | the matching `End` event |
//! | `Implicit` | a markdown frame (`code` in `pre`, `tbody`, header `tr`) | its markdown parent closing |
//! | `Html` | an HTML start tag | a matching end tag, or its markdown parent closing |
//!
//! An HTML end tag only closes frames above the nearest markdown frame, so
//! stray or mismatched HTML can never unbalance the markdown structure.
//! Unmatched end tags are dropped. A fragment `quick-xml` cannot tokenize is
//! kept as literal text.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event as XmlEvent};

/// Elements that never have children or an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Ordered attribute list. Names are lowercase; setting an existing name
/// replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.0.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name.to_string(), value)),
        }
    }

    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let idx = self.0.iter().position(|(n, _)| n == name)?;
        Some(self.0.remove(idx).1)
    }

    pub fn class(&self) -> Option<&str> {
        self.get("class")
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub kind: String,
    pub attrs: Attributes,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            attrs: Attributes::new(),
            children: Vec::new(),
        }
    }

    pub fn text_content(&self) -> String {
        self.children.iter().map(Node::text_content).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl Node {
    /// Concatenated text of this node and its descendants.
    pub fn text_content(&self) -> String {
        match self {
            Node::Text(t) => t.clone(),
            Node::Element(e) => e.text_content(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Markdown,
    Implicit,
    Html,
}

struct Frame {
    element: Element,
    origin: Origin,
}

/// Parse markdown (with embedded HTML) into a list of top-level nodes.
pub fn parse(markdown: &str) -> Vec<Node> {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    let mut builder = TreeBuilder::new();
    for event in Parser::new_ext(markdown, options) {
        builder.event(event);
    }
    builder.finish()
}

struct TreeBuilder {
    stack: Vec<Frame>,
    in_table_head: bool,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            stack: vec![Frame {
                element: Element::new("#root"),
                origin: Origin::Markdown,
            }],
            in_table_head: false,
        }
    }

    fn finish(mut self) -> Vec<Node> {
        while self.stack.len() > 1 {
            self.pop();
        }
        self.stack
            .pop()
            .map(|root| root.element.children)
            .unwrap_or_default()
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => {
                let mut el = Element::new("code");
                el.children.push(Node::Text(code.to_string()));
                self.append(Node::Element(el));
            }
            Event::Html(html) | Event::InlineHtml(html) => self.html(&html),
            Event::SoftBreak => self.text("\n"),
            Event::HardBreak => self.append(Node::Element(Element::new("br"))),
            Event::Rule => self.append(Node::Element(Element::new("hr"))),
            Event::TaskListMarker(checked) => {
                let mut el = Element::new("input");
                el.attrs.set("type", "checkbox");
                el.attrs.set("disabled", "");
                if checked {
                    el.attrs.set("checked", "");
                }
                self.append(Node::Element(el));
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            // HTML blocks are transparent; their fragments arrive as events.
            Tag::HtmlBlock => {}
            Tag::CodeBlock(kind) => {
                self.push(Element::new("pre"), Origin::Markdown);
                let mut code = Element::new("code");
                if let CodeBlockKind::Fenced(info) = kind {
                    if let Some(lang) = info.split_whitespace().next() {
                        code.attrs.set("class", format!("language-{lang}"));
                    }
                }
                self.push(code, Origin::Implicit);
            }
            Tag::TableHead => {
                self.in_table_head = true;
                self.push(Element::new("thead"), Origin::Markdown);
            }
            Tag::TableRow => {
                if self.top_kind() == "table" {
                    self.push(Element::new("tbody"), Origin::Implicit);
                }
                self.push(Element::new("tr"), Origin::Markdown);
            }
            Tag::TableCell => {
                // Header cells arrive without a row of their own.
                if self.top_kind() == "thead" {
                    self.push(Element::new("tr"), Origin::Implicit);
                }
                let kind = if self.in_table_head { "th" } else { "td" };
                self.push(Element::new(kind), Origin::Markdown);
            }
            Tag::Heading { level, .. } => {
                self.push(Element::new(&format!("h{}", level as usize)), Origin::Markdown)
            }
            Tag::List(Some(start)) => {
                let mut el = Element::new("ol");
                if start != 1 {
                    el.attrs.set("start", start.to_string());
                }
                self.push(el, Origin::Markdown);
            }
            Tag::Link {
                dest_url, title, ..
            } => {
                let mut el = Element::new("a");
                el.attrs.set("href", dest_url.to_string());
                if !title.is_empty() {
                    el.attrs.set("title", title.to_string());
                }
                self.push(el, Origin::Markdown);
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                let mut el = Element::new("img");
                el.attrs.set("src", dest_url.to_string());
                if !title.is_empty() {
                    el.attrs.set("title", title.to_string());
                }
                self.push(el, Origin::Markdown);
            }
            other => {
                let kind = match other {
                    Tag::Paragraph => "p",
                    Tag::BlockQuote(_) => "blockquote",
                    Tag::List(None) => "ul",
                    Tag::Item => "li",
                    Tag::Table(_) => "table",
                    Tag::Emphasis => "em",
                    Tag::Strong => "strong",
                    Tag::Strikethrough => "del",
                    _ => "div",
                };
                self.push(Element::new(kind), Origin::Markdown);
            }
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::HtmlBlock => {}
            TagEnd::TableHead => {
                self.in_table_head = false;
                self.close_markdown();
            }
            _ => self.close_markdown(),
        }
    }

    fn text(&mut self, text: &str) {
        let top = &mut self.top().children;
        match top.last_mut() {
            Some(Node::Text(prev)) => prev.push_str(text),
            _ => top.push(Node::Text(text.to_string())),
        }
    }

    fn html(&mut self, fragment: &str) {
        match tokenize(fragment) {
            Some(tokens) => {
                for token in tokens {
                    match token {
                        HtmlToken::Open(el) => self.push(el, Origin::Html),
                        HtmlToken::Void(el) => self.append(Node::Element(el)),
                        HtmlToken::Close(kind) => self.close_html(&kind),
                        HtmlToken::Text(t) => self.text(&t),
                    }
                }
            }
            None => {
                tracing::debug!(fragment, "untokenizable HTML kept as text");
                self.text(fragment);
            }
        }
    }

    fn top(&mut self) -> &mut Element {
        let last = self.stack.len() - 1;
        &mut self.stack[last].element
    }

    fn top_kind(&self) -> &str {
        self.stack
            .last()
            .map(|f| f.element.kind.as_str())
            .unwrap_or("")
    }

    fn append(&mut self, node: Node) {
        self.top().children.push(node);
    }

    fn push(&mut self, element: Element, origin: Origin) {
        self.stack.push(Frame { element, origin });
    }

    /// Pop the top frame into its parent. The root frame is never popped.
    fn pop(&mut self) -> Option<Origin> {
        if self.stack.len() <= 1 {
            return None;
        }
        let frame = self.stack.pop()?;
        let mut element = frame.element;
        if element.kind == "img" {
            let alt = element.text_content();
            element.children.clear();
            element.attrs.set("alt", alt);
        }
        self.append(Node::Element(element));
        Some(frame.origin)
    }

    /// Close frames up to and including the nearest markdown frame.
    fn close_markdown(&mut self) {
        while let Some(origin) = self.pop() {
            if origin == Origin::Markdown {
                break;
            }
        }
    }

    /// Close the nearest open HTML element of `kind` above the nearest
    /// markdown frame, along with anything opened inside it.
    fn close_html(&mut self, kind: &str) {
        let target = self
            .stack
            .iter()
            .enumerate()
            .skip(1)
            .rev()
            .take_while(|(_, f)| f.origin != Origin::Markdown)
            .find(|(_, f)| f.origin == Origin::Html && f.element.kind == kind)
            .map(|(i, _)| i);
        if let Some(idx) = target {
            while self.stack.len() > idx {
                self.pop();
            }
        }
    }
}

enum HtmlToken {
    Open(Element),
    Void(Element),
    Close(String),
    Text(String),
}

/// Tokenize a raw HTML fragment. `None` if any part of it is malformed.
fn tokenize(fragment: &str) -> Option<Vec<HtmlToken>> {
    let mut reader = Reader::from_str(fragment);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;
    config.check_comments = false;

    let mut tokens = Vec::new();
    loop {
        match reader.read_event().ok()? {
            XmlEvent::Start(e) => {
                let el = element_from(&e)?;
                if VOID_ELEMENTS.contains(&el.kind.as_str()) {
                    tokens.push(HtmlToken::Void(el));
                } else {
                    tokens.push(HtmlToken::Open(el));
                }
            }
            XmlEvent::Empty(e) => tokens.push(HtmlToken::Void(element_from(&e)?)),
            XmlEvent::End(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_ascii_lowercase();
                tokens.push(HtmlToken::Close(name));
            }
            XmlEvent::Text(e) => {
                let text = match e.unescape() {
                    Ok(t) => t.into_owned(),
                    Err(_) => String::from_utf8_lossy(&e).into_owned(),
                };
                tokens.push(HtmlToken::Text(text));
            }
            XmlEvent::CData(e) => {
                tokens.push(HtmlToken::Text(String::from_utf8_lossy(&e).into_owned()));
            }
            XmlEvent::Eof => break,
            _ => {}
        }
    }
    Some(tokens)
}

fn element_from(start: &BytesStart<'_>) -> Option<Element> {
    let kind = String::from_utf8_lossy(start.name().as_ref()).to_ascii_lowercase();
    let mut el = Element::new(&kind);
    for attr in start.html_attributes() {
        let attr = attr.ok()?;
        let name = String::from_utf8_lossy(attr.key.as_ref()).to_ascii_lowercase();
        let value = match attr.unescape_value() {
            Ok(v) => v.into_owned(),
            Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
        };
        el.attrs.set(&name, value);
    }
    Some(el)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(node: &Node) -> &Element {
        match node {
            Node::Element(e) => e,
            Node::Text(t) => panic!("expected element, found text {t:?}"),
        }
    }

    fn kinds(nodes: &[Node]) -> Vec<&str> {
        nodes
            .iter()
            .filter_map(|n| match n {
                Node::Element(e) => Some(e.kind.as_str()),
                Node::Text(_) => None,
            })
            .collect()
    }

    #[test]
    fn paragraphs_and_inline_markup() {
        let nodes = parse("Hello *there* `x`");
        let p = element(&nodes[0]);
        assert_eq!(p.kind, "p");
        assert_eq!(kinds(&p.children), vec!["em", "code"]);
        assert_eq!(p.text_content(), "Hello there x");
    }

    #[test]
    fn fenced_code_block_has_language_class() {
        let nodes = parse("```rust\nfn main() {}\n```\n");
        let pre = element(&nodes[0]);
        assert_eq!(pre.kind, "pre");
        let code = element(&pre.children[0]);
        assert_eq!(code.kind, "code");
        assert_eq!(code.attrs.class(), Some("language-rust"));
        assert_eq!(code.text_content(), "fn main() {}\n");
    }

    #[test]
    fn html_block_spans_markdown_content() {
        let md = "<details>\n<summary>Why?</summary>\n\nBecause **reasons**.\n\n</details>\n";
        let nodes = parse(md);
        let details = nodes
            .iter()
            .map(element)
            .find(|e| e.kind == "details")
            .unwrap();
        assert_eq!(kinds(&details.children), vec!["summary", "p"]);
        assert!(details.text_content().contains("Because reasons."));
    }

    #[test]
    fn html_attributes_are_kept() {
        let nodes = parse("<div class=\"note note-tip title=Remember\">\nBody text\n</div>\n");
        let div = element(&nodes[0]);
        assert_eq!(div.kind, "div");
        assert_eq!(div.attrs.class(), Some("note note-tip title=Remember"));
        assert!(div.text_content().contains("Body text"));
    }

    #[test]
    fn table_gets_thead_and_tbody() {
        let nodes = parse("| a | b |\n|---|---|\n| 1 | 2 |\n| 3 | 4 |\n");
        let table = element(&nodes[0]);
        assert_eq!(kinds(&table.children), vec!["thead", "tbody"]);
        let thead = element(&table.children[0]);
        let head_row = element(&thead.children[0]);
        assert_eq!(kinds(&head_row.children), vec!["th", "th"]);
        let tbody = element(&table.children[1]);
        assert_eq!(kinds(&tbody.children), vec!["tr", "tr"]);
        assert_eq!(kinds(&element(&tbody.children[0]).children), vec!["td", "td"]);
    }

    #[test]
    fn links_and_images() {
        let nodes = parse("[site](https://example.com \"Home\") ![alt *text*](a.png)");
        let p = element(&nodes[0]);
        let a = element(&p.children[0]);
        assert_eq!(a.attrs.get("href"), Some("https://example.com"));
        assert_eq!(a.attrs.get("title"), Some("Home"));
        let img = p
            .children
            .iter()
            .filter_map(element_or_none)
            .find(|e| e.kind == "img")
            .unwrap();
        assert_eq!(img.attrs.get("alt"), Some("alt text"));
        assert!(img.children.is_empty());
    }

    fn element_or_none(node: &Node) -> Option<&Element> {
        match node {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        }
    }

    #[test]
    fn inline_html_inside_paragraph() {
        let nodes = parse("Press <kbd>Ctrl</kbd> now<br>");
        let p = element(&nodes[0]);
        assert_eq!(kinds(&p.children), vec!["kbd", "br"]);
        assert_eq!(p.text_content(), "Press Ctrl now");
    }

    #[test]
    fn stray_end_tag_does_not_close_markdown() {
        let nodes = parse("text </span> more");
        let p = element(&nodes[0]);
        assert_eq!(p.kind, "p");
        assert_eq!(p.text_content(), "text  more");
    }

    #[test]
    fn unclosed_html_closes_with_markdown_parent() {
        let nodes = parse("a <b>bold\n\nnext");
        assert_eq!(kinds(&nodes), vec!["p", "p"]);
        let first = element(&nodes[0]);
        assert_eq!(kinds(&first.children), vec!["b"]);
        assert_eq!(element(&nodes[1]).text_content(), "next");
    }

    #[test]
    fn task_list_markers() {
        let nodes = parse("- [x] done\n- [ ] todo\n");
        let ul = element(&nodes[0]);
        let first = element(&ul.children[0]);
        let input = element(&first.children[0]);
        assert_eq!(input.kind, "input");
        assert_eq!(input.attrs.get("checked"), Some(""));
    }

    #[test]
    fn attributes_replace_in_place() {
        let mut attrs = Attributes::new().with("a", "1").with("b", "2");
        attrs.set("a", "3");
        assert_eq!(attrs.iter().collect::<Vec<_>>(), vec![("a", "3"), ("b", "2")]);
        assert_eq!(attrs.remove("a"), Some("3".into()));
        assert_eq!(attrs.get("a"), None);
    }
}
