//! Display tree → HTML.
//!
//! Components render through Maud. Generic elements can have any kind or
//! attribute that appeared in the post, so they are written out directly:
//! tag and attribute names that are not plain identifiers are dropped, text
//! and attribute values are always escaped.

use super::highlight::Highlighter;
use super::overrides::{Display, OverrideTable, convert};
use super::tree;
use maud::{Markup, PreEscaped, html};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Markdown renderer holding the override table and syntax highlighter.
///
/// Both are built once; reuse one renderer for every page.
pub struct Renderer {
    overrides: OverrideTable,
    highlighter: Highlighter,
}

impl Renderer {
    pub fn new() -> Self {
        Self::with_overrides(OverrideTable::standard())
    }

    pub fn with_overrides(overrides: OverrideTable) -> Self {
        Self {
            overrides,
            highlighter: Highlighter::new(),
        }
    }

    /// Parse markdown and apply overrides, without serializing.
    pub fn display_tree(&self, markdown: &str) -> Vec<Display> {
        convert(tree::parse(markdown), &self.overrides)
    }

    /// Render a markdown body to HTML. Never fails: malformed embedded HTML
    /// degrades to text.
    pub fn render(&self, markdown: &str) -> Markup {
        let nodes = self.display_tree(markdown);
        PreEscaped(self.render_nodes(&nodes))
    }

    fn render_nodes(&self, nodes: &[Display]) -> String {
        let mut out = String::new();
        for node in nodes {
            self.write_node(&mut out, node);
        }
        out
    }

    fn write_node(&self, out: &mut String, node: &Display) {
        match node {
            Display::Text(t) => out.push_str(&escape(t)),
            Display::Element {
                kind,
                attrs,
                children,
            } => {
                if !is_identifier(kind) {
                    out.push_str(&self.render_nodes(children));
                    return;
                }
                out.push('<');
                out.push_str(kind);
                for (name, value) in attrs.iter().filter(|(n, _)| is_identifier(n)) {
                    if value.is_empty() {
                        out.push_str(&format!(" {name}"));
                    } else {
                        out.push_str(&format!(" {name}=\"{}\"", escape(value)));
                    }
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&kind.as_str()) {
                    return;
                }
                out.push_str(&self.render_nodes(children));
                out.push_str(&format!("</{kind}>"));
            }
            Display::Note {
                variant,
                title,
                children,
            } => {
                let markup = html! {
                    div class={ "note note-" (variant.as_str()) } role="note" {
                        p class="note-title" { (title) }
                        div class="note-body" { (PreEscaped(self.render_nodes(children))) }
                    }
                };
                out.push_str(&markup.into_string());
            }
            Display::Accordion { title, children } => {
                let markup = html! {
                    details class="accordion" {
                        summary class="accordion-title" { (PreEscaped(self.render_nodes(title))) }
                        div class="accordion-body" { (PreEscaped(self.render_nodes(children))) }
                    }
                };
                out.push_str(&markup.into_string());
            }
            Display::CodeBlock {
                language,
                class,
                code,
            } => {
                let highlighted = self.highlighter.highlight(code, language.as_deref());
                let markup = html! {
                    div class="code-block" data-language=[language.as_deref()] {
                        @if let Some(highlighted) = highlighted {
                            (PreEscaped(highlighted))
                        } @else {
                            pre { code class=[class.as_deref()] { (code) } }
                        }
                    }
                };
                out.push_str(&markup.into_string());
            }
        }
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

fn escape(text: &str) -> String {
    html! { (text) }.into_string()
}

fn is_identifier(name: &str) -> bool {
    name.starts_with(|c: char| c.is_ascii_alphabetic())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    fn render(md: &str) -> String {
        Renderer::new().render(md).into_string()
    }

    #[test]
    fn plain_markdown_renders_as_html() {
        let html = render("# Title\n\nSome *emphasis* & more.");
        assert_eq!(
            html,
            "<h1>Title</h1><p>Some <em>emphasis</em> &amp; more.</p>"
        );
    }

    #[test]
    fn note_component() {
        let html = render("<div class=\"note warning title=Careful\">\nHot stove\n</div>\n");
        assert!(html.contains("<div class=\"note note-warning\" role=\"note\">"));
        assert!(html.contains("<p class=\"note-title\">Careful</p>"));
        assert!(html.contains("Hot stove"));
    }

    #[test]
    fn accordion_component() {
        let html = render("<details>\n<summary>More</summary>\n\nHidden *text*\n\n</details>\n");
        assert!(html.contains("<details class=\"accordion\">"));
        assert!(html.contains("<summary class=\"accordion-title\">More</summary>"));
        assert!(html.contains("<em>text</em>"));
        assert!(!html.contains("data-accordion-summary"));
    }

    #[test]
    fn code_block_is_highlighted() {
        let html = render("```rust\nlet x = 1;\n```\n");
        assert!(html.starts_with("<div class=\"code-block\" data-language=\"rust\"><pre"));
        assert!(html.contains("<span"));
        assert!(!html.contains("<pre><div"));
    }

    #[test]
    fn inline_code_and_links() {
        let html = render("Run `ls` or see [docs](https://example.com).");
        assert!(html.contains("<code class=\"inline-code\">ls</code>"));
        assert!(html.contains("target=\"_blank\""));
        assert!(html.contains("rel=\"noopener noreferrer\""));
    }

    #[test]
    fn unsafe_names_and_values_are_neutralized() {
        let html = render("<span title='\"><script>'>x</span>");
        assert!(html.contains("title=\"&quot;&gt;&lt;script&gt;\""));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn void_elements_have_no_end_tag() {
        let html = render("line one  \nline two");
        assert!(html.contains("<br>"));
        assert!(!html.contains("</br>"));
    }

    #[test]
    fn renders_fixture_post_body() {
        let tmp = setup_fixtures();
        let post = fixture_post(&tmp, "rust-notes.md");
        let html = Renderer::new().render(&post.body).into_string();
        assert!(html.contains("note-tip"));
        assert!(html.contains("Remember"));
        assert!(html.contains("Why lifetimes?"));
        assert!(html.contains(TABLE_MARKER));
        assert!(html.contains("data-language=\"rust\""));
    }

    const TABLE_MARKER: &str = "overflow-x-auto";

    #[test]
    fn identifier_check() {
        assert!(is_identifier("data-x"));
        assert!(is_identifier("xlink:href"));
        assert!(!is_identifier("1a"));
        assert!(!is_identifier("a b"));
        assert!(!is_identifier(""));
    }
}
