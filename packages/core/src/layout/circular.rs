use crate::config::LayoutConfig;
use crate::models::Position;
use std::f64::consts::{FRAC_PI_2, TAU};

/// Evenly spaced around a circle centered on the origin.
///
/// The first node sits at the top (angle `-π/2`) and the rest follow
/// clockwise on a y-down canvas. The radius grows linearly with the count.
pub fn circular_layout(count: usize, config: &LayoutConfig) -> Vec<Position> {
    if count == 0 {
        return Vec::new();
    }

    let radius = config.circle_base_radius + config.circle_radius_per_node * count as f64;
    (0..count)
        .map(|index| {
            let angle = -FRAC_PI_2 + TAU * index as f64 / count as f64;
            Position::new(radius * angle.cos(), radius * angle.sin())
        })
        .collect()
}
