//! Visual style records attached to nodes and edges.
//!
//! Styles are opaque to the core apart from merging: the renderer decides what
//! a color or shape means. Every field is optional so that a record only
//! carries what a theme or user actually set.

use serde::{Deserialize, Serialize};

/// Node outline shape hint for renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeShape {
    Rectangle,
    Rounded,
    Ellipse,
    Diamond,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<NodeShape>,
}

impl StyleRecord {
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_background(mut self, background: impl Into<String>) -> Self {
        self.background_color = Some(background.into());
        self
    }

    pub fn with_border(mut self, border: impl Into<String>) -> Self {
        self.border_color = Some(border.into());
        self
    }

    pub fn with_shape(mut self, shape: NodeShape) -> Self {
        self.shape = Some(shape);
        self
    }

    /// Overlay every field set in `patch` onto this record.
    ///
    /// Returns `true` if anything changed.
    pub fn merge(&mut self, patch: &StyleRecord) -> bool {
        let before = self.clone();
        if let Some(color) = &patch.color {
            self.color = Some(color.clone());
        }
        if let Some(background) = &patch.background_color {
            self.background_color = Some(background.clone());
        }
        if let Some(border) = &patch.border_color {
            self.border_color = Some(border.clone());
        }
        if let Some(width) = patch.stroke_width {
            self.stroke_width = Some(width);
        }
        if let Some(shape) = patch.shape {
            self.shape = Some(shape);
        }
        *self != before
    }

    pub fn is_empty(&self) -> bool {
        *self == StyleRecord::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_only_overwrites_set_fields() {
        let mut style = StyleRecord::default()
            .with_color("#111111")
            .with_border("#222222");
        let changed = style.merge(&StyleRecord::default().with_color("#ffffff"));

        assert!(changed);
        assert_eq!(style.color.as_deref(), Some("#ffffff"));
        assert_eq!(style.border_color.as_deref(), Some("#222222"));
    }

    #[test]
    fn test_merge_reports_no_change() {
        let mut style = StyleRecord::default().with_color("#111111");
        assert!(!style.merge(&StyleRecord::default().with_color("#111111")));
        assert!(!style.merge(&StyleRecord::default()));
    }
}
