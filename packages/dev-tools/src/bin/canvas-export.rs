//! Snapshot Export Tool
//!
//! Loads a graph snapshot saved as JSON, optionally re-lays it out, and writes
//! it back as JSON, SVG or PNG. Handy for checking layouts and themes without
//! running the editor.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin canvas-export -- board.json --layout tree --svg board.svg
//! cargo run --bin canvas-export -- board.json --theme dark --png board.png --json out.json
//! ```
//!
//! Logging honors `RUST_LOG`, defaulting to `info`.

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use nodecanvas_core::export::{export, snapshot_from_json, ExportFormat};
use nodecanvas_core::layout::{layout, LayoutKind};
use nodecanvas_core::theme::Theme;
use nodecanvas_core::{EditorConfig, Snapshot};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about = "Export a NodeCanvas snapshot as JSON, SVG or PNG", long_about = None)]
#[command(group(ArgGroup::new("outputs").required(true).multiple(true).args(["svg", "png", "json"])))]
struct Args {
    /// Snapshot JSON file to read
    input: PathBuf,

    /// Re-lay out top-level nodes: grid, circular, tree, hierarchical or force
    #[arg(long, value_parser = parse_layout)]
    layout: Option<LayoutKind>,

    /// Built-in theme to apply before rendering: light, dark or ocean
    #[arg(long)]
    theme: Option<String>,

    #[arg(long, value_name = "OUT.svg")]
    svg: Option<PathBuf>,

    #[arg(long, value_name = "OUT.png")]
    png: Option<PathBuf>,

    #[arg(long, value_name = "OUT.json")]
    json: Option<PathBuf>,
}

impl Args {
    /// Requested outputs in a fixed order
    fn outputs(&self) -> Vec<(ExportFormat, &Path)> {
        [
            (ExportFormat::Svg, &self.svg),
            (ExportFormat::Png, &self.png),
            (ExportFormat::Json, &self.json),
        ]
        .into_iter()
        .filter_map(|(format, path)| path.as_deref().map(|path| (format, path)))
        .collect()
    }
}

fn parse_layout(value: &str) -> Result<LayoutKind, String> {
    value.parse()
}

fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    Ok(snapshot_from_json(&json)?)
}

/// Run one export; returns the number of files written
async fn run(args: &Args) -> Result<usize> {
    let config = EditorConfig::from_env();
    config.validate()?;

    let mut snapshot = load_snapshot(&args.input)?;
    tracing::info!(
        "Loaded {} nodes and {} edges from {}",
        snapshot.nodes.len(),
        snapshot.edges.len(),
        args.input.display()
    );

    if let Some(kind) = args.layout {
        snapshot.nodes = layout(kind, &snapshot.nodes, &snapshot.edges, &config.layout);
        tracing::info!("Applied {} layout", kind);
    }

    let theme = match &args.theme {
        Some(name) => {
            let theme = Theme::by_name(name).with_context(|| format!("unknown theme {}", name))?;
            let (nodes, edges) = theme.apply(&snapshot.nodes, &snapshot.edges);
            snapshot.nodes = nodes;
            snapshot.edges = edges;
            theme
        }
        None => Theme::default(),
    };

    let style = theme.svg_style();
    let outputs = args.outputs();
    for (format, path) in &outputs {
        let artifact = export(&snapshot, *format, &style)?;
        if artifact.degraded {
            tracing::warn!("{} holds only the background; rendering failed", path.display());
        }
        tokio::fs::write(path, &artifact.bytes)
            .await
            .with_context(|| format!("writing {}", path.display()))?;
        println!("✅ Wrote {} ({} bytes)", path.display(), artifact.bytes.len());
    }
    Ok(outputs.len())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    if let Err(e) = run(&args).await {
        eprintln!("❌ Export failed: {:#}", e);
        return Err(e);
    }
    Ok(())
}
