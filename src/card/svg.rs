//! Lay out a [`LayoutNode`] tree and serialize it as SVG.
//!
//! The layout is a small flexbox subset: containers stack children along
//! their direction, stretch them across the other axis, and distribute free
//! main-axis space according to [`Justify`]. Text is wrapped by estimated
//! glyph advance, which is close enough for a card with one typeface;
//! actual glyph shaping happens later in the rasterizer.

use super::layout::{Background, Content, Direction, Justify, LayoutError, LayoutNode};
use quick_xml::escape::escape;

/// Average glyph advance as a fraction of the font size at weight 400.
const ADVANCE: f32 = 0.55;
/// Baseline offset as a fraction of the font size.
const ASCENT: f32 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Rect {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

impl Rect {
    fn inset(self, by: f32) -> Rect {
        Rect {
            x: self.x + by,
            y: self.y + by,
            width: (self.width - 2.0 * by).max(0.0),
            height: (self.height - 2.0 * by).max(0.0),
        }
    }
}

/// Inheritable text properties resolved down the tree.
#[derive(Debug, Clone)]
struct TextProps {
    color: String,
    family: String,
    size: f32,
    weight: u16,
    line_height: f32,
}

impl Default for TextProps {
    fn default() -> Self {
        Self {
            color: "#000000".to_string(),
            family: "sans-serif".to_string(),
            size: 16.0,
            weight: 400,
            line_height: 1.2,
        }
    }
}

impl TextProps {
    fn inherit(&self, node: &LayoutNode) -> TextProps {
        let s = &node.style;
        TextProps {
            color: s.color.clone().unwrap_or_else(|| self.color.clone()),
            family: s.font_family.clone().unwrap_or_else(|| self.family.clone()),
            size: s.font_size.unwrap_or(self.size),
            weight: s.font_weight.unwrap_or(self.weight),
            line_height: s.line_height.unwrap_or(self.line_height),
        }
    }

    fn line_px(&self) -> f32 {
        self.size * self.line_height
    }
}

/// Serialize a validated layout tree as a `width`×`height` SVG document.
pub fn to_svg(root: &LayoutNode, width: u32, height: u32) -> Result<String, LayoutError> {
    root.validate()?;

    let frame = Rect {
        x: 0.0,
        y: 0.0,
        width: root.style.width.unwrap_or(width as f32),
        height: root.style.height.unwrap_or(height as f32),
    };
    let mut writer = SvgWriter::default();
    writer.node(root, frame, &TextProps::default());

    Ok(format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\"><defs>{}</defs>{}</svg>",
        writer.defs, writer.body
    ))
}

/// Outer size of a node (including its bottom margin) given the width
/// available to it.
fn measure(node: &LayoutNode, available_width: f32, parent: &TextProps) -> (f32, f32) {
    let props = parent.inherit(node);
    let style = &node.style;
    match &node.content {
        Content::Text(text) => {
            let lines = wrap(text, available_width, &props, style.max_lines);
            let widest = lines
                .iter()
                .map(|l| l.chars().count() as f32 * advance(&props))
                .fold(0.0, f32::max);
            let height = lines.len() as f32 * props.line_px();
            (
                style.width.unwrap_or(widest.min(available_width)),
                style.height.unwrap_or(height) + style.margin_bottom,
            )
        }
        Content::Children(children) => {
            let outer_width = style.width.unwrap_or(available_width);
            let inner_width = (outer_width - 2.0 * style.padding).max(0.0);
            let sizes: Vec<(f32, f32)> = children
                .iter()
                .map(|c| measure(c, inner_width, &props))
                .collect();
            let (w, h) = match style.direction.unwrap_or(Direction::Column) {
                Direction::Column => (
                    sizes.iter().map(|s| s.0).fold(0.0, f32::max),
                    sizes.iter().map(|s| s.1).sum(),
                ),
                Direction::Row => (
                    sizes.iter().map(|s| s.0).sum(),
                    sizes.iter().map(|s| s.1).fold(0.0, f32::max),
                ),
            };
            (
                style.width.unwrap_or(w + 2.0 * style.padding),
                style.height.unwrap_or(h + 2.0 * style.padding) + style.margin_bottom,
            )
        }
    }
}

/// Leading offset and gap between children for the free main-axis space.
fn distribute(justify: Justify, free: f32, count: usize) -> (f32, f32) {
    let free = free.max(0.0);
    match justify {
        Justify::Start => (0.0, 0.0),
        Justify::Center => (free / 2.0, 0.0),
        Justify::End => (free, 0.0),
        Justify::SpaceBetween if count > 1 => (0.0, free / (count - 1) as f32),
        Justify::SpaceBetween => (0.0, 0.0),
    }
}

fn advance(props: &TextProps) -> f32 {
    let boldness = f32::from(props.weight.saturating_sub(400)) / 400.0;
    props.size * (ADVANCE + 0.05 * boldness)
}

/// Greedy word wrap by estimated advance. Words longer than a line are split.
fn wrap(text: &str, max_width: f32, props: &TextProps, max_lines: Option<usize>) -> Vec<String> {
    let max_chars = ((max_width / advance(props)).floor() as usize).max(1);
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut chars: Vec<char> = word.chars().collect();
        while chars.len() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            lines.push(chars.drain(..max_chars).collect());
        }
        let word: String = chars.into_iter().collect();
        let current_len = current.chars().count();
        if current_len > 0 && current_len + 1 + word.chars().count() > max_chars {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }
    if !current.is_empty() {
        lines.push(current);
    }

    if let Some(max) = max_lines {
        if lines.len() > max {
            lines.truncate(max);
            if let Some(last) = lines.last_mut() {
                while !last.is_empty() && last.chars().count() + 1 > max_chars {
                    last.pop();
                }
                let trimmed_len = last.trim_end().len();
                last.truncate(trimmed_len);
                last.push('…');
            }
        }
    }
    lines
}

#[derive(Default)]
struct SvgWriter {
    defs: String,
    body: String,
    gradients: usize,
}

impl SvgWriter {
    fn node(&mut self, node: &LayoutNode, rect: Rect, parent: &TextProps) {
        let props = parent.inherit(node);
        match &node.content {
            Content::Text(text) => self.text(node, text, rect, &props),
            Content::Children(children) => self.container(node, children, rect, &props),
        }
    }

    fn container(&mut self, node: &LayoutNode, children: &[LayoutNode], rect: Rect, props: &TextProps) {
        let style = &node.style;
        let grouped = style.opacity.is_some();
        if let Some(opacity) = style.opacity {
            self.body.push_str(&format!("<g opacity=\"{opacity:.2}\">"));
        }
        if let Some(background) = &style.background {
            let fill = self.fill(background);
            self.body.push_str(&format!(
                "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"{}\"/>",
                rect.x, rect.y, rect.width, rect.height, fill
            ));
        }

        let content = rect.inset(style.padding);
        let direction = style.direction.unwrap_or(Direction::Column);
        let main_available = match direction {
            Direction::Column => content.width,
            Direction::Row => content.width / children.len().max(1) as f32,
        };
        let sizes: Vec<(f32, f32)> = children
            .iter()
            .map(|c| measure(c, main_available, props))
            .collect();

        match direction {
            Direction::Column => {
                let used: f32 = sizes.iter().map(|s| s.1).sum();
                let (lead, gap) = distribute(style.justify, content.height - used, children.len());
                let mut y = content.y + lead;
                for (child, (_, h)) in children.iter().zip(&sizes) {
                    let child_rect = Rect {
                        x: content.x,
                        y,
                        width: child.style.width.unwrap_or(content.width),
                        height: h - child.style.margin_bottom,
                    };
                    self.node(child, child_rect, props);
                    y += h + gap;
                }
            }
            Direction::Row => {
                let used: f32 = sizes.iter().map(|s| s.0).sum();
                let (lead, gap) = distribute(style.justify, content.width - used, children.len());
                let mut x = content.x + lead;
                for (child, (w, _)) in children.iter().zip(&sizes) {
                    // A lone child takes the full row, like a flex item growing into it.
                    let width = if children.len() == 1 {
                        child.style.width.unwrap_or(content.width)
                    } else {
                        *w
                    };
                    let child_rect = Rect {
                        x,
                        y: content.y,
                        width,
                        height: child
                            .style
                            .height
                            .unwrap_or(content.height - child.style.margin_bottom),
                    };
                    self.node(child, child_rect, props);
                    x += width + gap;
                }
            }
        }
        if grouped {
            self.body.push_str("</g>");
        }
    }

    fn text(&mut self, node: &LayoutNode, text: &str, rect: Rect, props: &TextProps) {
        let lines = wrap(text, rect.width, props, node.style.max_lines);
        if lines.is_empty() {
            return;
        }
        let key = node
            .key
            .as_deref()
            .map(|k| format!(" data-key=\"{}\"", escape(k)))
            .unwrap_or_default();
        let opacity = node
            .style
            .opacity
            .map(|o| format!(" opacity=\"{o:.2}\""))
            .unwrap_or_default();
        self.body.push_str(&format!(
            "<text{key} font-family=\"{}\" font-size=\"{:.1}\" font-weight=\"{}\" fill=\"{}\"{opacity}>",
            escape(props.family.as_str()),
            props.size,
            props.weight,
            escape(props.color.as_str()),
        ));
        let leading = (props.line_px() - props.size) / 2.0;
        for (i, line) in lines.iter().enumerate() {
            let baseline = rect.y + i as f32 * props.line_px() + leading + props.size * ASCENT;
            self.body.push_str(&format!(
                "<tspan x=\"{:.1}\" y=\"{:.1}\">{}</tspan>",
                rect.x,
                baseline,
                escape(line.as_str())
            ));
        }
        self.body.push_str("</text>");
    }

    /// Paint value for a background, registering gradients in `<defs>`.
    fn fill(&mut self, background: &Background) -> String {
        match background {
            Background::Solid(color) => escape(color.as_str()).into_owned(),
            Background::LinearGradient { angle, from, to } => {
                let id = format!("bg{}", self.gradients);
                self.gradients += 1;
                let rad = angle.to_radians();
                let (dx, dy) = (rad.sin() / 2.0, -rad.cos() / 2.0);
                self.defs.push_str(&format!(
                    "<linearGradient id=\"{id}\" x1=\"{:.3}\" y1=\"{:.3}\" x2=\"{:.3}\" y2=\"{:.3}\"><stop offset=\"0\" stop-color=\"{}\"/><stop offset=\"1\" stop-color=\"{}\"/></linearGradient>",
                    0.5 - dx,
                    0.5 - dy,
                    0.5 + dx,
                    0.5 + dy,
                    escape(from.as_str()),
                    escape(to.as_str()),
                ));
                format!("url(#{id})")
            }
        }
    }
}
