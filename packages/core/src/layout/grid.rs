use crate::config::LayoutConfig;
use crate::models::Position;

/// Row-major grid with `ceil(sqrt(n))` columns
pub fn grid_layout(count: usize, config: &LayoutConfig) -> Vec<Position> {
    if count == 0 {
        return Vec::new();
    }

    let columns = (count as f64).sqrt().ceil() as usize;
    (0..count)
        .map(|index| {
            let column = index % columns;
            let row = index / columns;
            Position::new(
                column as f64 * config.grid_spacing_x,
                row as f64 * config.grid_spacing_y,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_columns_and_spacing() {
        let positions = grid_layout(5, &LayoutConfig::default());

        assert_eq!(
            positions,
            vec![
                Position::new(0.0, 0.0),
                Position::new(250.0, 0.0),
                Position::new(500.0, 0.0),
                Position::new(0.0, 180.0),
                Position::new(250.0, 180.0),
            ]
        );
    }

    #[test]
    fn test_grid_perfect_square() {
        let positions = grid_layout(4, &LayoutConfig::default());
        assert_eq!(positions[2], Position::new(0.0, 180.0));
        assert!(grid_layout(0, &LayoutConfig::default()).is_empty());
    }
}
