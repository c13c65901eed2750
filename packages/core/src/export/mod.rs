//! Graph export
//!
//! - JSON: canonical serialization of a `Snapshot`; parsing it back yields an
//!   equal snapshot
//! - SVG: one rect and label per node, one arrowed line per edge, on a fixed
//!   1200x800 canvas
//! - PNG: the SVG rasterized with resvg; if rasterization fails a
//!   background-only image is produced instead

mod json;
mod png;
mod svg;

pub use json::{snapshot_from_json, snapshot_to_json};
pub use png::{background_png, render_png, PngExport};
pub use svg::{render_svg, SvgStyle, CANVAS_HEIGHT, CANVAS_WIDTH};

use crate::error::{RenderExportError, ValidationError};
use crate::models::Snapshot;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Svg,
    Png,
}

impl ExportFormat {
    pub const fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Svg => "svg",
            ExportFormat::Png => "png",
        }
    }

    pub const fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Svg => "image/svg+xml",
            ExportFormat::Png => "image/png",
        }
    }

    /// Infer the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self, ValidationError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| {
                ValidationError::invalid_export_target(format!("{} has no extension", path.display()))
            })?;
        extension.parse()
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "svg" => Ok(ExportFormat::Svg),
            "png" => Ok(ExportFormat::Png),
            other => Err(ValidationError::invalid_export_target(format!(
                "unsupported format '{}'",
                other
            ))),
        }
    }
}

/// Encoded export ready to be written out
#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
    /// The PNG fallback was used and the image carries no graph content
    pub degraded: bool,
}

pub fn export(
    snapshot: &Snapshot,
    format: ExportFormat,
    style: &SvgStyle,
) -> Result<ExportArtifact, RenderExportError> {
    let (bytes, degraded) = match format {
        ExportFormat::Json => (snapshot_to_json(snapshot)?.into_bytes(), false),
        ExportFormat::Svg => (render_svg(snapshot, style)?.into_bytes(), false),
        ExportFormat::Png => {
            let png = render_png(snapshot, style)?;
            (png.bytes, png.degraded)
        }
    };

    tracing::debug!("Exported {} ({} bytes)", format, bytes.len());
    Ok(ExportArtifact {
        format,
        bytes,
        degraded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            ExportFormat::from_path(Path::new("out/board.PNG")).unwrap(),
            ExportFormat::Png
        );
        assert!(matches!(
            ExportFormat::from_path(Path::new("board.pdf")),
            Err(ValidationError::InvalidExportTarget(_))
        ));
        assert!(ExportFormat::from_path(Path::new("board")).is_err());
    }
}
