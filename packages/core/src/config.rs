//! Editor configuration
//!
//! `EditorConfig` gathers every tunable of the core. Defaults are the values
//! the product ships with; `from_env()` lets tooling and tests override them
//! through `NODECANVAS_*` environment variables.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// Lower bound of the permitted cursor broadcast interval
pub const MIN_CURSOR_THROTTLE_MS: u64 = 50;

/// Upper bound of the permitted cursor broadcast interval
pub const MAX_CURSOR_THROTTLE_MS: u64 = 100;

/// Force-directed simulation constants.
///
/// Pinned so identical input always reproduces identical output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForceParams {
    pub iterations: usize,
    pub spring_length: f64,
    pub spring_strength: f64,
    pub repulsion: f64,
    /// Maximum displacement per step at iteration zero; decays linearly to zero
    pub initial_temperature: f64,
    pub seed: u64,
}

impl Default for ForceParams {
    fn default() -> Self {
        Self {
            iterations: 300,
            spring_length: 180.0,
            spring_strength: 0.05,
            repulsion: 20_000.0,
            initial_temperature: 50.0,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub grid_spacing_x: f64,
    pub grid_spacing_y: f64,
    pub circle_base_radius: f64,
    pub circle_radius_per_node: f64,
    pub tree_spacing_x: f64,
    pub tree_spacing_y: f64,
    pub force: ForceParams,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            grid_spacing_x: 250.0,
            grid_spacing_y: 180.0,
            circle_base_radius: 200.0,
            circle_radius_per_node: 40.0,
            tree_spacing_x: 220.0,
            tree_spacing_y: 160.0,
            force: ForceParams::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Maximum entries kept on each of the undo and redo stacks
    pub undo_capacity: usize,

    /// Minimum interval between two cursor broadcasts
    pub cursor_throttle_ms: u64,

    /// Padding between a group container and its children
    pub group_padding: f64,

    pub layout: LayoutConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            undo_capacity: 100,
            cursor_throttle_ms: MIN_CURSOR_THROTTLE_MS,
            group_padding: 24.0,
            layout: LayoutConfig::default(),
        }
    }
}

impl EditorConfig {
    /// Defaults overridden by any `NODECANVAS_*` variables that parse.
    ///
    /// Recognized: `NODECANVAS_UNDO_CAPACITY`, `NODECANVAS_CURSOR_THROTTLE_MS`,
    /// `NODECANVAS_GROUP_PADDING`, `NODECANVAS_FORCE_ITERATIONS`,
    /// `NODECANVAS_FORCE_SEED`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = parse_var(&lookup, "NODECANVAS_UNDO_CAPACITY") {
            config.undo_capacity = value;
        }
        if let Some(value) = parse_var(&lookup, "NODECANVAS_CURSOR_THROTTLE_MS") {
            config.cursor_throttle_ms = value;
        }
        if let Some(value) = parse_var(&lookup, "NODECANVAS_GROUP_PADDING") {
            config.group_padding = value;
        }
        if let Some(value) = parse_var(&lookup, "NODECANVAS_FORCE_ITERATIONS") {
            config.layout.force.iterations = value;
        }
        if let Some(value) = parse_var(&lookup, "NODECANVAS_FORCE_SEED") {
            config.layout.force.seed = value;
        }

        config
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.undo_capacity == 0 {
            return Err(ValidationError::invalid_config(
                "undo_capacity must be greater than 0",
            ));
        }

        if !(MIN_CURSOR_THROTTLE_MS..=MAX_CURSOR_THROTTLE_MS).contains(&self.cursor_throttle_ms) {
            return Err(ValidationError::invalid_config(format!(
                "cursor_throttle_ms must be between {} and {}",
                MIN_CURSOR_THROTTLE_MS, MAX_CURSOR_THROTTLE_MS
            )));
        }

        if self.group_padding < 0.0 || !self.group_padding.is_finite() {
            return Err(ValidationError::invalid_config(
                "group_padding must be a non-negative number",
            ));
        }

        if self.layout.force.iterations == 0 {
            return Err(ValidationError::invalid_config(
                "force iterations must be greater than 0",
            ));
        }

        if self.layout.grid_spacing_x <= 0.0 || self.layout.grid_spacing_y <= 0.0 {
            return Err(ValidationError::invalid_config(
                "grid spacing must be positive",
            ));
        }

        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring unparseable {}={:?}", key, raw);
            None
        }
    }
}
