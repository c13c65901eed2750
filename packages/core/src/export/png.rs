//! PNG rasterization via resvg.

use crate::error::RenderExportError;
use crate::export::svg::{render_svg, SvgStyle, CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::models::Snapshot;
use resvg::tiny_skia::{Color, Pixmap, Transform};
use resvg::usvg;

#[derive(Debug, Clone, PartialEq)]
pub struct PngExport {
    pub bytes: Vec<u8>,
    /// Rasterizing the graph failed and `bytes` holds only the background
    pub degraded: bool,
}

/// Rasterize the graph, falling back to a plain background image on failure
pub fn render_png(snapshot: &Snapshot, style: &SvgStyle) -> Result<PngExport, RenderExportError> {
    let rendered = render_svg(snapshot, style).and_then(|svg| rasterize(&svg));
    match rendered {
        Ok(bytes) => Ok(PngExport {
            bytes,
            degraded: false,
        }),
        Err(e) => {
            tracing::warn!("PNG export degraded to background only: {}", e);
            Ok(PngExport {
                bytes: background_png(CANVAS_WIDTH, CANVAS_HEIGHT, &style.background)?,
                degraded: true,
            })
        }
    }
}

fn rasterize(svg: &str) -> Result<Vec<u8>, RenderExportError> {
    let mut options = usvg::Options::default();
    options.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &options)
        .map_err(|e| RenderExportError::SvgParse(e.to_string()))?;

    let size = tree.size().to_int_size();
    let mut pixmap = Pixmap::new(size.width(), size.height()).ok_or_else(|| {
        RenderExportError::Rasterize(format!(
            "failed to allocate {}x{} surface",
            size.width(),
            size.height()
        ))
    })?;

    resvg::render(&tree, Transform::identity(), &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|e| RenderExportError::Encode(e.to_string()))
}

/// Solid `background` image with no graph content
pub fn background_png(width: u32, height: u32, background: &str) -> Result<Vec<u8>, RenderExportError> {
    let mut pixmap = Pixmap::new(width, height)
        .ok_or_else(|| RenderExportError::Rasterize(format!("invalid size {}x{}", width, height)))?;
    pixmap.fill(parse_hex_color(background).unwrap_or(Color::WHITE));
    pixmap
        .encode_png()
        .map_err(|e| RenderExportError::Encode(e.to_string()))
}

/// `#rgb` or `#rrggbb`
fn parse_hex_color(value: &str) -> Option<Color> {
    let hex = value.trim().strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    let (r, g, b) = match hex.len() {
        6 => (channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?),
        3 => {
            let short = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
            (short(0)?, short(1)?, short(2)?)
        }
        _ => return None,
    };
    Some(Color::from_rgba8(r, g, b, 255))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Node, NodePayload, Position};

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G'];

    #[test]
    fn test_png_has_canvas_dimensions() {
        let snapshot = Snapshot::new(
            vec![Node::new_with_id("a", NodePayload::text("A"), Position::ORIGIN)],
            Vec::new(),
            "Board",
        );
        let png = render_png(&snapshot, &SvgStyle::default()).unwrap();

        assert!(!png.degraded);
        assert!(png.bytes.starts_with(PNG_MAGIC));
        let width = u32::from_be_bytes([png.bytes[16], png.bytes[17], png.bytes[18], png.bytes[19]]);
        let height = u32::from_be_bytes([png.bytes[20], png.bytes[21], png.bytes[22], png.bytes[23]]);
        assert_eq!((width, height), (CANVAS_WIDTH, CANVAS_HEIGHT));
    }

    #[test]
    fn test_background_png_fallback() {
        let bytes = background_png(4, 4, "#0f172a").unwrap();
        assert!(bytes.starts_with(PNG_MAGIC));
        assert!(background_png(0, 0, "#fff").is_err());
    }

    #[test]
    fn test_hex_colors() {
        assert_eq!(parse_hex_color("#ffffff"), Some(Color::WHITE));
        assert_eq!(parse_hex_color("#000"), Some(Color::BLACK));
        assert!(parse_hex_color("teal").is_none());
        assert!(parse_hex_color("#12345").is_none());
    }
}
