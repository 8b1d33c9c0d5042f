//! The Open Graph card layout.
//!
//! ```text
//! ┌───────────────────────────────────────────── panel (gradient, padding) ┐
//! │ ┌─ column (space-between) ─────────────────────────────────────────┐ │
//! │ │ meta     site identifier, 20px / 600                              │ │
//! │ │ title    56px / 800, up to three lines                            │ │
//! │ │ excerpt  24px, up to three lines                                  │ │
//! │ └───────────────────────────────────────────────────────────────────┘ │
//! └───────────────────────────────────────────────────────────────────────┘
//! ```

use super::layout::{Background, Direction, Justify, LayoutNode, Style};
use crate::config::CardConfig;
use crate::post::Post;

/// Text shown on one card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardText<'a> {
    pub site: &'a str,
    pub title: &'a str,
    pub excerpt: &'a str,
}

impl<'a> CardText<'a> {
    pub fn for_post(site: &'a str, post: &'a Post) -> Self {
        Self {
            site,
            title: &post.title,
            excerpt: post.excerpt.as_deref().unwrap_or(""),
        }
    }
}

/// Build the two-level card layout for a post.
pub fn og_card(text: &CardText<'_>, config: &CardConfig) -> LayoutNode {
    let meta = LayoutNode::text(
        "meta",
        Style {
            font_size: Some(20.0),
            font_weight: Some(600),
            opacity: Some(0.95),
            margin_bottom: 12.0,
            max_lines: Some(1),
            ..Style::default()
        },
        text.site,
    );
    let title = LayoutNode::text(
        "title",
        Style {
            font_size: Some(56.0),
            font_weight: Some(800),
            line_height: Some(1.05),
            margin_bottom: 18.0,
            max_lines: Some(3),
            ..Style::default()
        },
        text.title,
    );
    let excerpt = LayoutNode::text(
        "excerpt",
        Style {
            font_size: Some(24.0),
            opacity: Some(0.95),
            max_lines: Some(3),
            ..Style::default()
        },
        text.excerpt,
    );

    let column = LayoutNode::container(
        Style {
            direction: Some(Direction::Column),
            justify: Justify::SpaceBetween,
            ..Style::default()
        },
        vec![meta, title, excerpt],
    )
    .with_key("column");

    LayoutNode::container(
        Style {
            width: Some(config.width as f32),
            height: Some(config.height as f32),
            padding: config.padding as f32,
            background: Some(Background::LinearGradient {
                angle: config.gradient.angle,
                from: config.gradient.from.clone(),
                to: config.gradient.to.clone(),
            }),
            direction: Some(Direction::Row),
            color: Some(config.text_color.clone()),
            font_family: Some(config.font_family.clone()),
            font_size: Some(16.0),
            font_weight: Some(400),
            line_height: Some(1.2),
            ..Style::default()
        },
        vec![column],
    )
    .with_key("panel")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::layout::Content;

    fn sample() -> CardText<'static> {
        CardText {
            site: "ebadf.me",
            title: "Shipping a CLI",
            excerpt: "Lessons learned",
        }
    }

    #[test]
    fn card_is_valid() {
        let card = og_card(&sample(), &CardConfig::default());
        assert!(card.validate().is_ok());
    }

    #[test]
    fn text_blocks_are_keyed_in_fixed_order() {
        let card = og_card(&sample(), &CardConfig::default());
        let column = card.find("column").unwrap();
        let keys: Vec<_> = column
            .children()
            .iter()
            .map(|c| c.key.as_deref().unwrap())
            .collect();
        assert_eq!(keys, vec!["meta", "title", "excerpt"]);
    }

    #[test]
    fn panel_uses_configured_canvas_and_gradient() {
        let card = og_card(&sample(), &CardConfig::default());
        assert_eq!(card.style.width, Some(1200.0));
        assert_eq!(card.style.height, Some(630.0));
        assert_eq!(card.style.padding, 64.0);
        assert!(matches!(
            card.style.background,
            Some(Background::LinearGradient { ref from, .. }) if from == "#0ea5a0"
        ));
    }

    #[test]
    fn title_is_large_and_bold() {
        let card = og_card(&sample(), &CardConfig::default());
        let title = card.find("title").unwrap();
        assert_eq!(title.style.font_size, Some(56.0));
        assert_eq!(title.style.font_weight, Some(800));
        assert_eq!(title.content, Content::Text("Shipping a CLI".into()));
    }

    #[test]
    fn missing_excerpt_is_empty_text() {
        let post = Post::parse("a.md", "---\ntitle: Only Title\n---\n").unwrap();
        let text = CardText::for_post("site", &post);
        assert_eq!(text.excerpt, "");
        assert_eq!(text.title, "Only Title");
    }
}
