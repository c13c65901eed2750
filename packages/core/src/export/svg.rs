//! SVG rendering on a fixed canvas.
//!
//! The graph is fitted into the canvas with a uniform margin; it is scaled
//! down when larger than the canvas and never scaled up. Group containers are
//! drawn before their members so they sit underneath.

use crate::error::RenderExportError;
use crate::grouping::absolute_position;
use crate::models::{BoundingBox, Node, NodeShape, Position, Size, Snapshot};
use std::collections::HashMap;
use std::fmt::Write;

pub const CANVAS_WIDTH: u32 = 1200;
pub const CANVAS_HEIGHT: u32 = 800;

const MARGIN: f64 = 40.0;
const MAX_LABEL_CHARS: usize = 40;

/// Colors used where a node or edge carries no style of its own
#[derive(Debug, Clone, PartialEq)]
pub struct SvgStyle {
    pub background: String,
    pub node_fill: String,
    pub node_stroke: String,
    pub group_fill: String,
    pub text_color: String,
    pub edge_color: String,
    pub font_family: String,
}

impl Default for SvgStyle {
    fn default() -> Self {
        Self {
            background: "#ffffff".to_string(),
            node_fill: "#f8fafc".to_string(),
            node_stroke: "#334155".to_string(),
            group_fill: "#e2e8f0".to_string(),
            text_color: "#0f172a".to_string(),
            edge_color: "#64748b".to_string(),
            font_family: "Inter, sans-serif".to_string(),
        }
    }
}

struct Viewport {
    origin: Position,
    scale: f64,
}

impl Viewport {
    fn fit(bbox: Option<BoundingBox>) -> Self {
        let Some(bbox) = bbox else {
            return Self {
                origin: Position::ORIGIN,
                scale: 1.0,
            };
        };
        let available_w = CANVAS_WIDTH as f64 - 2.0 * MARGIN;
        let available_h = CANVAS_HEIGHT as f64 - 2.0 * MARGIN;
        let scale_w = if bbox.width() > 0.0 { available_w / bbox.width() } else { 1.0 };
        let scale_h = if bbox.height() > 0.0 { available_h / bbox.height() } else { 1.0 };
        Self {
            origin: bbox.min,
            scale: scale_w.min(scale_h).min(1.0),
        }
    }

    fn point(&self, p: Position) -> Position {
        Position::new(
            MARGIN + (p.x - self.origin.x) * self.scale,
            MARGIN + (p.y - self.origin.y) * self.scale,
        )
    }

    fn size(&self, s: Size) -> Size {
        Size::new(s.width * self.scale, s.height * self.scale)
    }
}

pub fn render_svg(snapshot: &Snapshot, style: &SvgStyle) -> Result<String, RenderExportError> {
    let mut svg = String::new();
    write_svg(&mut svg, snapshot, style).map_err(|e| RenderExportError::Encode(e.to_string()))?;
    Ok(svg)
}

fn write_svg(svg: &mut String, snapshot: &Snapshot, style: &SvgStyle) -> std::fmt::Result {
    let absolute: HashMap<&str, Position> = snapshot
        .nodes
        .iter()
        .map(|node| {
            let position = absolute_position(&snapshot.nodes, &node.id).unwrap_or(node.position);
            (node.id.as_str(), position)
        })
        .collect();

    let viewport = Viewport::fit(BoundingBox::enclosing(
        snapshot
            .nodes
            .iter()
            .map(|node| (absolute[node.id.as_str()], node.effective_size())),
    ));

    writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = CANVAS_WIDTH,
        h = CANVAS_HEIGHT
    )?;
    writeln!(svg, "  <title>{}</title>", escape_xml(&snapshot.title))?;
    writeln!(svg, "  <defs>")?;
    writeln!(
        svg,
        r#"    <marker id="arrow" viewBox="0 0 10 10" refX="10" refY="5" markerWidth="8" markerHeight="8" orient="auto-start-reverse"><path d="M 0 0 L 10 5 L 0 10 z" fill="{}"/></marker>"#,
        style.edge_color
    )?;
    writeln!(svg, "  </defs>")?;
    writeln!(
        svg,
        r#"  <rect x="0" y="0" width="{}" height="{}" fill="{}"/>"#,
        CANVAS_WIDTH, CANVAS_HEIGHT, style.background
    )?;

    let (groups, members): (Vec<&Node>, Vec<&Node>) =
        snapshot.nodes.iter().partition(|node| node.is_group());
    for node in groups.iter().chain(members.iter()) {
        write_node(svg, node, absolute[node.id.as_str()], &viewport, style)?;
    }

    for edge in &snapshot.edges {
        let (Some(source), Some(target)) = (snapshot.node(&edge.source_id), snapshot.node(&edge.target_id)) else {
            continue;
        };
        let from = viewport.point(center(absolute[source.id.as_str()], source.effective_size()));
        let to = viewport.point(center(absolute[target.id.as_str()], target.effective_size()));
        let stroke = edge.style.color.as_deref().unwrap_or(&style.edge_color);
        writeln!(
            svg,
            r#"  <line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{}" stroke-width="{}" marker-end="url(#arrow)"/>"#,
            from.x,
            from.y,
            to.x,
            to.y,
            stroke,
            edge.style.stroke_width.unwrap_or(1.5)
        )?;
        if let Some(label) = &edge.label {
            writeln!(
                svg,
                r#"  <text x="{:.1}" y="{:.1}" font-family="{}" font-size="11" fill="{}" text-anchor="middle">{}</text>"#,
                (from.x + to.x) / 2.0,
                (from.y + to.y) / 2.0 - 4.0,
                style.font_family,
                style.text_color,
                escape_xml(label)
            )?;
        }
    }

    writeln!(svg, "</svg>")
}

fn write_node(
    svg: &mut String,
    node: &Node,
    absolute: Position,
    viewport: &Viewport,
    style: &SvgStyle,
) -> std::fmt::Result {
    let origin = viewport.point(absolute);
    let size = viewport.size(node.effective_size());
    let default_fill = if node.is_group() { &style.group_fill } else { &style.node_fill };
    let fill = node.style.background_color.as_deref().unwrap_or(default_fill);
    let stroke = node.style.border_color.as_deref().unwrap_or(&style.node_stroke);
    let text_color = node.style.color.as_deref().unwrap_or(&style.text_color);
    let radius = match node.style.shape {
        Some(NodeShape::Rounded) => 12.0,
        Some(NodeShape::Ellipse) => size.height / 2.0,
        _ => 2.0,
    };

    writeln!(
        svg,
        r#"  <rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" rx="{:.1}" fill="{}" stroke="{}" stroke-width="{}"/>"#,
        origin.x,
        origin.y,
        size.width,
        size.height,
        radius,
        fill,
        stroke,
        node.style.stroke_width.unwrap_or(1.0)
    )?;

    let (text_x, text_y) = if node.is_group() {
        (origin.x + 8.0, origin.y + 16.0)
    } else {
        (origin.x + size.width / 2.0, origin.y + size.height / 2.0)
    };
    let anchor = if node.is_group() { "start" } else { "middle" };
    writeln!(
        svg,
        r#"  <text x="{:.1}" y="{:.1}" font-family="{}" font-size="14" fill="{}" text-anchor="{}" dominant-baseline="middle">{}</text>"#,
        text_x,
        text_y,
        style.font_family,
        text_color,
        anchor,
        escape_xml(&short_label(node.label()))
    )
}

fn center(origin: Position, size: Size) -> Position {
    Position::new(origin.x + size.width / 2.0, origin.y + size.height / 2.0)
}

fn short_label(label: &str) -> String {
    let first_line = label.lines().next().unwrap_or("");
    if first_line.chars().count() > MAX_LABEL_CHARS {
        let truncated: String = first_line.chars().take(MAX_LABEL_CHARS - 1).collect();
        format!("{}…", truncated)
    } else {
        first_line.to_string()
    }
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
