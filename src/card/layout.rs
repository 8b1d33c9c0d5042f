//! Declarative layout tree for card composition.
//!
//! A [`LayoutNode`] is either a container of child nodes or a run of text.
//! Styles are typed rather than stringly keyed; unset properties inherit
//! (text properties) or fall back to zero/start (box properties).
//!
//! The tree must pass [`LayoutNode::validate`] before it is laid out: any
//! container with more than one child has to say which way its children
//! flow. Leaving it implicit is an authoring mistake, so it fails fast
//! instead of defaulting.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("container at {path} has {children} children but no direction")]
    MissingDirection { path: String, children: usize },
    #[error("duplicate key {key:?} among children of {path}")]
    DuplicateKey { path: String, key: String },
}

/// Main axis of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Row,
    Column,
}

/// Distribution of free space along the main axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Justify {
    #[default]
    Start,
    Center,
    End,
    SpaceBetween,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Background {
    Solid(String),
    /// CSS-style angle in degrees: 0 points up, 90 points right.
    LinearGradient {
        angle: f32,
        from: String,
        to: String,
    },
}

/// Visual properties of a node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Style {
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub padding: f32,
    pub margin_bottom: f32,
    pub background: Option<Background>,
    pub direction: Option<Direction>,
    pub justify: Justify,
    // Inherited by descendants when unset.
    pub color: Option<String>,
    pub font_family: Option<String>,
    pub font_size: Option<f32>,
    pub font_weight: Option<u16>,
    pub line_height: Option<f32>,
    pub opacity: Option<f32>,
    /// Text beyond this many wrapped lines is cut with an ellipsis.
    pub max_lines: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Children(Vec<LayoutNode>),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutNode {
    /// Stable identity among siblings.
    pub key: Option<String>,
    pub style: Style,
    pub content: Content,
}

impl LayoutNode {
    pub fn container(style: Style, children: Vec<LayoutNode>) -> Self {
        Self {
            key: None,
            style,
            content: Content::Children(children),
        }
    }

    pub fn text(key: &str, style: Style, text: impl Into<String>) -> Self {
        Self {
            key: Some(key.to_string()),
            style,
            content: Content::Text(text.into()),
        }
    }

    pub fn with_key(mut self, key: &str) -> Self {
        self.key = Some(key.to_string());
        self
    }

    /// Child nodes; empty for text nodes.
    pub fn children(&self) -> &[LayoutNode] {
        match &self.content {
            Content::Children(children) => children,
            Content::Text(_) => &[],
        }
    }

    /// Find a descendant (or self) by key, depth first.
    pub fn find(&self, key: &str) -> Option<&LayoutNode> {
        if self.key.as_deref() == Some(key) {
            return Some(self);
        }
        self.children().iter().find_map(|c| c.find(key))
    }

    /// Check structural invariants of the whole tree.
    pub fn validate(&self) -> Result<(), LayoutError> {
        self.validate_at(self.key.as_deref().unwrap_or("root"))
    }

    fn validate_at(&self, path: &str) -> Result<(), LayoutError> {
        let children = self.children();
        if children.len() > 1 && self.style.direction.is_none() {
            return Err(LayoutError::MissingDirection {
                path: path.to_string(),
                children: children.len(),
            });
        }
        let mut seen: Vec<&str> = Vec::new();
        for (i, child) in children.iter().enumerate() {
            if let Some(key) = child.key.as_deref() {
                if seen.contains(&key) {
                    return Err(LayoutError::DuplicateKey {
                        path: path.to_string(),
                        key: key.to_string(),
                    });
                }
                seen.push(key);
            }
            let segment = child.key.clone().unwrap_or_else(|| i.to_string());
            child.validate_at(&format!("{path}/{segment}"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(key: &str) -> LayoutNode {
        LayoutNode::text(key, Style::default(), key)
    }

    #[test]
    fn single_child_container_needs_no_direction() {
        let node = LayoutNode::container(Style::default(), vec![text("a")]);
        assert!(node.validate().is_ok());
    }

    #[test]
    fn multi_child_container_without_direction_fails() {
        let node = LayoutNode::container(Style::default(), vec![text("a"), text("b")]);
        assert_eq!(
            node.validate(),
            Err(LayoutError::MissingDirection {
                path: "root".into(),
                children: 2
            })
        );
    }

    #[test]
    fn nested_violation_reports_path() {
        let inner = LayoutNode::container(Style::default(), vec![text("a"), text("b")])
            .with_key("column");
        let outer = LayoutNode::container(Style::default(), vec![inner]);
        let err = outer.validate().unwrap_err();
        assert!(matches!(err, LayoutError::MissingDirection { ref path, .. } if path == "root/column"));
    }

    #[test]
    fn duplicate_sibling_keys_fail() {
        let style = Style {
            direction: Some(Direction::Column),
            ..Style::default()
        };
        let node = LayoutNode::container(style, vec![text("a"), text("a")]);
        assert!(matches!(
            node.validate(),
            Err(LayoutError::DuplicateKey { ref key, .. }) if key == "a"
        ));
    }

    #[test]
    fn find_by_key() {
        let style = Style {
            direction: Some(Direction::Row),
            ..Style::default()
        };
        let node = LayoutNode::container(style, vec![text("left"), text("right")]);
        assert!(node.find("right").is_some());
        assert!(node.find("missing").is_none());
        assert!(text("x").children().is_empty());
    }
}
