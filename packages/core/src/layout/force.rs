//! Force-directed layout.
//!
//! Springs pull connected nodes toward `spring_length`, every pair repels with
//! an inverse-square force, and per-step displacement is capped by a
//! temperature that cools linearly to zero over the iteration budget. The
//! starting circle is jittered by a `StdRng` seeded from `ForceParams::seed`,
//! so the same input always converges to the same picture.

use crate::config::ForceParams;
use crate::models::{Edge, Node, Position};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::f64::consts::TAU;

const MIN_DISTANCE: f64 = 1.0;

pub fn force_layout(nodes: &[&Node], edges: &[Edge], params: &ForceParams) -> Vec<Position> {
    let count = nodes.len();
    if count == 0 {
        return Vec::new();
    }
    if count == 1 {
        return vec![Position::ORIGIN];
    }

    let index: HashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, node)| (node.id.as_str(), i))
        .collect();
    let springs: Vec<(usize, usize)> = edges
        .iter()
        .filter_map(|edge| {
            let source = *index.get(edge.source_id.as_str())?;
            let target = *index.get(edge.target_id.as_str())?;
            (source != target).then_some((source, target))
        })
        .collect();

    let mut positions = initial_positions(count, params);
    let mut displacement = vec![(0.0f64, 0.0f64); count];

    for iteration in 0..params.iterations {
        let temperature =
            params.initial_temperature * (1.0 - iteration as f64 / params.iterations as f64);

        displacement.iter_mut().for_each(|d| *d = (0.0, 0.0));

        for i in 0..count {
            for j in (i + 1)..count {
                let (dx, dy, distance) = separation(positions[i], positions[j], i, j);
                let force = params.repulsion / (distance * distance);
                let (fx, fy) = (dx / distance * force, dy / distance * force);
                displacement[i].0 += fx;
                displacement[i].1 += fy;
                displacement[j].0 -= fx;
                displacement[j].1 -= fy;
            }
        }

        for &(source, target) in &springs {
            let (dx, dy, distance) = separation(positions[source], positions[target], source, target);
            let force = (distance - params.spring_length) * params.spring_strength;
            let (fx, fy) = (dx / distance * force, dy / distance * force);
            displacement[source].0 -= fx;
            displacement[source].1 -= fy;
            displacement[target].0 += fx;
            displacement[target].1 += fy;
        }

        for (position, (dx, dy)) in positions.iter_mut().zip(&displacement) {
            let length = (dx * dx + dy * dy).sqrt();
            if length > 0.0 {
                let step = length.min(temperature);
                position.x += dx / length * step;
                position.y += dy / length * step;
            }
        }
    }

    normalize(&mut positions);
    positions
}

/// Jittered circle sized so neighbours start roughly one spring apart
fn initial_positions(count: usize, params: &ForceParams) -> Vec<Position> {
    let mut rng = StdRng::seed_from_u64(params.seed);
    let radius = params.spring_length * count as f64 / TAU;
    let jitter = params.spring_length * 0.1;

    (0..count)
        .map(|i| {
            let angle = TAU * i as f64 / count as f64;
            Position::new(
                radius * angle.cos() + rng.gen_range(-jitter..=jitter),
                radius * angle.sin() + rng.gen_range(-jitter..=jitter),
            )
        })
        .collect()
}

/// Vector from `b` to `a` and its length, never shorter than `MIN_DISTANCE`.
///
/// Coincident points are pushed apart along a direction derived from their
/// indices so the result stays deterministic.
fn separation(a: Position, b: Position, i: usize, j: usize) -> (f64, f64, f64) {
    let (mut dx, mut dy) = (a.x - b.x, a.y - b.y);
    if dx == 0.0 && dy == 0.0 {
        let angle = (i * 31 + j * 17) as f64;
        dx = angle.cos() * MIN_DISTANCE;
        dy = angle.sin() * MIN_DISTANCE;
    }
    let distance = (dx * dx + dy * dy).sqrt().max(MIN_DISTANCE);
    (dx, dy, distance)
}

/// Translate so the top-left-most node sits at the origin
fn normalize(positions: &mut [Position]) {
    let min_x = positions.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
    let min_y = positions.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
    if min_x.is_finite() && min_y.is_finite() {
        for position in positions.iter_mut() {
            position.x -= min_x;
            position.y -= min_y;
        }
    }
}
