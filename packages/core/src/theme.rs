//! Canvas themes
//!
//! A theme restyles every node and edge at once. Applying it through an
//! `EditorSession` is a single undo step however large the graph is.

use crate::export::SvgStyle;
use crate::models::{Edge, Node, StyleRecord};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub name: String,
    pub background: String,
    pub node_style: StyleRecord,
    pub group_style: StyleRecord,
    pub edge_style: StyleRecord,
}

impl Default for Theme {
    fn default() -> Self {
        Theme::light()
    }
}

impl Theme {
    pub fn light() -> Self {
        Self {
            name: "light".to_string(),
            background: "#ffffff".to_string(),
            node_style: StyleRecord::default()
                .with_color("#0f172a")
                .with_background("#f8fafc")
                .with_border("#334155"),
            group_style: StyleRecord::default()
                .with_color("#334155")
                .with_background("#e2e8f0")
                .with_border("#94a3b8"),
            edge_style: StyleRecord::default().with_color("#64748b"),
        }
    }

    pub fn dark() -> Self {
        Self {
            name: "dark".to_string(),
            background: "#0f172a".to_string(),
            node_style: StyleRecord::default()
                .with_color("#f1f5f9")
                .with_background("#1e293b")
                .with_border("#475569"),
            group_style: StyleRecord::default()
                .with_color("#cbd5e1")
                .with_background("#111827")
                .with_border("#334155"),
            edge_style: StyleRecord::default().with_color("#94a3b8"),
        }
    }

    pub fn ocean() -> Self {
        Self {
            name: "ocean".to_string(),
            background: "#ecfeff".to_string(),
            node_style: StyleRecord::default()
                .with_color("#083344")
                .with_background("#cffafe")
                .with_border("#0e7490"),
            group_style: StyleRecord::default()
                .with_color("#155e75")
                .with_background("#a5f3fc")
                .with_border("#06b6d4"),
            edge_style: StyleRecord::default().with_color("#0891b2"),
        }
    }

    pub fn builtin() -> Vec<Theme> {
        vec![Theme::light(), Theme::dark(), Theme::ocean()]
    }

    /// Built-in theme by name, ignoring case
    pub fn by_name(name: &str) -> Option<Theme> {
        Theme::builtin()
            .into_iter()
            .find(|theme| theme.name.eq_ignore_ascii_case(name))
    }

    /// Restyled copies of `nodes` and `edges`; groups use `group_style`
    pub fn apply(&self, nodes: &[Node], edges: &[Edge]) -> (Vec<Node>, Vec<Edge>) {
        let nodes = nodes
            .iter()
            .map(|node| {
                let mut node = node.clone();
                let style = if node.is_group() { &self.group_style } else { &self.node_style };
                node.style.merge(style);
                node
            })
            .collect();
        let edges = edges
            .iter()
            .map(|edge| {
                let mut edge = edge.clone();
                edge.style.merge(&self.edge_style);
                edge
            })
            .collect();
        (nodes, edges)
    }

    /// Fallback colors for export
    pub fn svg_style(&self) -> SvgStyle {
        let defaults = SvgStyle::default();
        SvgStyle {
            background: self.background.clone(),
            node_fill: self.node_style.background_color.clone().unwrap_or(defaults.node_fill),
            node_stroke: self.node_style.border_color.clone().unwrap_or(defaults.node_stroke),
            group_fill: self.group_style.background_color.clone().unwrap_or(defaults.group_fill),
            text_color: self.node_style.color.clone().unwrap_or(defaults.text_color),
            edge_color: self.edge_style.color.clone().unwrap_or(defaults.edge_color),
            font_family: defaults.font_family,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NodePayload, Position};

    #[test]
    fn test_apply_restyles_everything() {
        let nodes = vec![
            Node::new_with_id("g", NodePayload::group("g"), Position::ORIGIN),
            Node::new_with_id("a", NodePayload::text("a"), Position::ORIGIN),
        ];
        let edges = vec![Edge::new_with_id("e", "g", "a")];
        let dark = Theme::dark();

        let (nodes, edges) = dark.apply(&nodes, &edges);
        assert_eq!(nodes[0].style.background_color.as_deref(), Some("#111827"));
        assert_eq!(nodes[1].style.background_color.as_deref(), Some("#1e293b"));
        assert_eq!(edges[0].style.color.as_deref(), Some("#94a3b8"));
    }

    #[test]
    fn test_lookup_by_name() {
        assert_eq!(Theme::by_name("Ocean").unwrap().name, "ocean");
        assert!(Theme::by_name("neon").is_none());
        assert_eq!(Theme::dark().svg_style().background, "#0f172a");
    }
}
