//! Element overrides: element tree → display tree.
//!
//! Conversion is bottom-up. Children are converted first, then the element
//! kind is looked up in an [`OverrideTable`]; a hit replaces the element with
//! whatever the override builds from its attributes and converted children,
//! a miss keeps it unchanged.
//!
//! | Kind | Becomes |
//! |---|---|
//! | `div.note*` | [`Display::Note`], variant by class substring, title from `title=<token>` |
//! | `summary` | marker `span[data-accordion-summary=true]` |
//! | `details` | [`Display::Accordion`] titled by the first marker child |
//! | `table` … `td` | fixed classes, `table` wrapped in a scroll container |
//! | `a` | always `target=_blank rel="noopener noreferrer"` |
//! | `code` | [`Display::CodeBlock`] when multi-line or language-tagged, else inline |
//! | `pre` | unwrapped when it only holds a code block |
//! | `blockquote` | fixed classes followed by the caller's |
//!
//! The table is a plain value: build it once with [`OverrideTable::standard`]
//! and pass it by reference. Tests and callers can swap entries with
//! [`OverrideTable::with`].

use super::tree::{Attributes, Node};
use std::collections::HashMap;

pub const SUMMARY_MARKER: &str = "data-accordion-summary";

const TABLE_WRAPPER_CLASS: &str = "my-8 overflow-x-auto rounded-lg border border-border shadow-sm";
const TABLE_CLASS: &str = "min-w-full divide-y divide-border";
const THEAD_CLASS: &str = "bg-muted/70";
const TBODY_CLASS: &str = "divide-y divide-border bg-background";
const TR_CLASS: &str = "hover:bg-muted/40 transition-colors duration-150";
const TH_CLASS: &str = "px-6 py-4 text-left text-xs font-semibold text-foreground uppercase tracking-wider border-b-2 border-border";
const TD_CLASS: &str = "px-6 py-4 text-sm text-foreground/90";
const LINK_CLASS: &str = "text-blue-600 dark:text-blue-400 hover:underline transition-colors link";
const BLOCKQUOTE_CLASS: &str = "border-l-1 pl-4 py-2 my-4 bg-muted/50 border-primary rounded-lg";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteVariant {
    Info,
    Tip,
    Warning,
}

impl NoteVariant {
    pub fn as_str(self) -> &'static str {
        match self {
            NoteVariant::Info => "info",
            NoteVariant::Tip => "tip",
            NoteVariant::Warning => "warning",
        }
    }
}

/// A node of the display tree: plain elements plus presentational components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Display {
    Element {
        kind: String,
        attrs: Attributes,
        children: Vec<Display>,
    },
    Text(String),
    Note {
        variant: NoteVariant,
        title: String,
        children: Vec<Display>,
    },
    Accordion {
        title: Vec<Display>,
        children: Vec<Display>,
    },
    CodeBlock {
        language: Option<String>,
        /// Caller class, kept for styling hooks.
        class: Option<String>,
        code: String,
    },
}

impl Display {
    pub fn element(kind: &str, attrs: Attributes, children: Vec<Display>) -> Self {
        Display::Element {
            kind: kind.to_string(),
            attrs,
            children,
        }
    }

    /// Concatenated text of this node and its descendants.
    pub fn text_content(&self) -> String {
        match self {
            Display::Text(t) => t.clone(),
            Display::CodeBlock { code, .. } => code.clone(),
            Display::Element { children, .. } | Display::Note { children, .. } => {
                children.iter().map(Display::text_content).collect()
            }
            Display::Accordion { title, children } => title
                .iter()
                .chain(children)
                .map(Display::text_content)
                .collect(),
        }
    }

    fn is_summary_marker(&self) -> bool {
        matches!(self, Display::Element { attrs, .. } if attrs.get(SUMMARY_MARKER) == Some("true"))
    }

    fn is_blank_text(&self) -> bool {
        matches!(self, Display::Text(t) if t.trim().is_empty())
    }
}

/// Builds a display node from an element's attributes and converted children.
pub type Override = fn(&Attributes, Vec<Display>) -> Display;

/// Immutable mapping from element kind to its override.
#[derive(Clone, Default)]
pub struct OverrideTable {
    entries: HashMap<&'static str, Override>,
}

impl OverrideTable {
    /// A table with no overrides: every element renders unchanged.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The site's standard overrides.
    pub fn standard() -> Self {
        Self::empty()
            .with("div", note)
            .with("summary", summary)
            .with("details", details)
            .with("table", table)
            .with("thead", thead)
            .with("tbody", tbody)
            .with("tr", tr)
            .with("th", th)
            .with("td", td)
            .with("a", link)
            .with("code", code)
            .with("pre", pre)
            .with("blockquote", blockquote)
    }

    pub fn with(mut self, kind: &'static str, f: Override) -> Self {
        self.entries.insert(kind, f);
        self
    }

    pub fn get(&self, kind: &str) -> Option<Override> {
        self.entries.get(kind).copied()
    }
}

/// Convert an element tree into a display tree.
pub fn convert(nodes: Vec<Node>, table: &OverrideTable) -> Vec<Display> {
    nodes.into_iter().map(|n| convert_node(n, table)).collect()
}

fn convert_node(node: Node, table: &OverrideTable) -> Display {
    match node {
        Node::Text(t) => Display::Text(t),
        Node::Element(el) => {
            let children = convert(el.children, table);
            match table.get(&el.kind) {
                Some(f) => f(&el.attrs, children),
                None => Display::Element {
                    kind: el.kind,
                    attrs: el.attrs,
                    children,
                },
            }
        }
    }
}

fn with_class(attrs: &Attributes, class: &str) -> Attributes {
    attrs.clone().with("class", class)
}

fn note(attrs: &Attributes, children: Vec<Display>) -> Display {
    let class = attrs.class().unwrap_or("");
    if !class.contains("note") {
        return Display::element("div", attrs.clone(), children);
    }
    let variant = if class.contains("warning") {
        NoteVariant::Warning
    } else if class.contains("tip") {
        NoteVariant::Tip
    } else {
        NoteVariant::Info
    };
    let title = class
        .find("title=")
        .map(|at| &class[at + "title=".len()..])
        .and_then(|rest| rest.split_whitespace().next())
        .unwrap_or("Note")
        .to_string();
    Display::Note {
        variant,
        title,
        children,
    }
}

fn summary(_attrs: &Attributes, children: Vec<Display>) -> Display {
    Display::element("span", Attributes::new().with(SUMMARY_MARKER, "true"), children)
}

/// The first direct summary marker supplies the title; any later markers
/// stay in the body.
fn details(attrs: &Attributes, mut children: Vec<Display>) -> Display {
    let title = match children.iter().position(Display::is_summary_marker) {
        Some(idx) => match children.remove(idx) {
            Display::Element { children, .. } => children,
            other => vec![other],
        },
        None => vec![Display::Text(attrs.get("title").unwrap_or("Notes").to_string())],
    };
    Display::Accordion { title, children }
}

fn table(attrs: &Attributes, children: Vec<Display>) -> Display {
    let inner = Display::element("table", with_class(attrs, TABLE_CLASS), children);
    Display::element(
        "div",
        Attributes::new().with("class", TABLE_WRAPPER_CLASS),
        vec![inner],
    )
}

fn thead(attrs: &Attributes, children: Vec<Display>) -> Display {
    Display::element("thead", with_class(attrs, THEAD_CLASS), children)
}

fn tbody(attrs: &Attributes, children: Vec<Display>) -> Display {
    Display::element("tbody", with_class(attrs, TBODY_CLASS), children)
}

fn tr(attrs: &Attributes, children: Vec<Display>) -> Display {
    Display::element("tr", with_class(attrs, TR_CLASS), children)
}

fn th(attrs: &Attributes, children: Vec<Display>) -> Display {
    Display::element("th", with_class(attrs, TH_CLASS), children)
}

fn td(attrs: &Attributes, children: Vec<Display>) -> Display {
    Display::element("td", with_class(attrs, TD_CLASS), children)
}

fn link(attrs: &Attributes, children: Vec<Display>) -> Display {
    let attrs = with_class(attrs, LINK_CLASS)
        .with("target", "_blank")
        .with("rel", "noopener noreferrer");
    Display::element("a", attrs, children)
}

/// Language from a `language-<lang>` or `lang-<lang>` class token.
pub fn language_from_class(class: &str) -> Option<String> {
    class.split_whitespace().find_map(|token| {
        let lower = token.to_ascii_lowercase();
        let lang = lower
            .strip_prefix("language-")
            .or_else(|| lower.strip_prefix("lang-"))?;
        let valid = !lang.is_empty()
            && lang
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        valid.then(|| token[token.len() - lang.len()..].to_string())
    })
}

fn code(attrs: &Attributes, children: Vec<Display>) -> Display {
    let content: String = children.iter().map(Display::text_content).collect();
    let class = attrs.class();
    let language = class.and_then(language_from_class);

    if content.contains('\n') || language.is_some() {
        return Display::CodeBlock {
            language,
            class: class.map(str::to_string),
            code: content,
        };
    }
    let inline_class = format!("inline-code {}", class.unwrap_or("")).trim().to_string();
    Display::element(
        "code",
        with_class(attrs, &inline_class),
        vec![Display::Text(content)],
    )
}

fn pre(attrs: &Attributes, mut children: Vec<Display>) -> Display {
    let only_block = {
        let mut significant = children
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_blank_text());
        match (significant.next(), significant.next()) {
            (Some((idx, Display::CodeBlock { .. })), None) => Some(idx),
            _ => None,
        }
    };
    if let Some(idx) = only_block {
        return children.swap_remove(idx);
    }
    Display::element("pre", attrs.clone(), children)
}

fn blockquote(attrs: &Attributes, children: Vec<Display>) -> Display {
    let class = format!("{BLOCKQUOTE_CLASS} {}", attrs.class().unwrap_or(""))
        .trim()
        .to_string();
    Display::element("blockquote", with_class(attrs, &class), children)
}
