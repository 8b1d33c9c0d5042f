//! Syntax highlighting for code blocks via `syntect`.

use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

const THEME: &str = "InspiredGitHub";

pub struct Highlighter {
    syntaxes: SyntaxSet,
    theme: Theme,
}

impl Highlighter {
    pub fn new() -> Self {
        let syntaxes = SyntaxSet::load_defaults_newlines();
        // remove() hands back an owned Theme
        let theme = ThemeSet::load_defaults()
            .themes
            .remove(THEME)
            .unwrap_or_default();
        Self { syntaxes, theme }
    }

    /// Highlight `code` as a standalone `<pre>` block with inline styles.
    ///
    /// The language is matched by name or file extension (`rust`, `rs`).
    /// Unknown or missing languages highlight as plain text. Returns `None`
    /// only if `syntect` itself fails.
    pub fn highlight(&self, code: &str, language: Option<&str>) -> Option<String> {
        let syntax = language
            .and_then(|lang| self.syntaxes.find_syntax_by_token(lang))
            .unwrap_or_else(|| self.syntaxes.find_syntax_plain_text());
        highlighted_html_for_string(code, &self.syntaxes, syntax, &self.theme).ok()
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highlights_known_language_by_name_and_extension() {
        let h = Highlighter::new();
        for lang in ["rust", "rs"] {
            let html = h.highlight("let x = 1;\n", Some(lang)).unwrap();
            assert!(html.starts_with("<pre"), "{lang}: {html}");
            assert!(html.contains("<span"), "{lang}: {html}");
        }
    }

    #[test]
    fn unknown_language_falls_back_to_plain_text() {
        let h = Highlighter::new();
        let html = h.highlight("a < b\n", Some("klingon")).unwrap();
        assert!(html.contains("a &lt; b"));
    }

    #[test]
    fn no_language_is_plain_text() {
        let h = Highlighter::new();
        assert!(h.highlight("plain\n", None).unwrap().contains("plain"));
    }
}
