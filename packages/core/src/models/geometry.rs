//! Canvas geometry primitives shared by nodes, layout and grouping.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// A point on the canvas, in canvas units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Position) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, rhs: Position) -> Position {
        Position::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Position {
    type Output = Position;

    fn sub(self, rhs: Position) -> Position {
        Position::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for Size {
    fn default() -> Self {
        DEFAULT_NODE_SIZE
    }
}

/// Size assumed for nodes that have never been measured.
pub const DEFAULT_NODE_SIZE: Size = Size {
    width: 200.0,
    height: 100.0,
};

/// Axis-aligned rectangle described by its minimum and maximum corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Position,
    pub max: Position,
}

impl BoundingBox {
    pub fn from_rect(origin: Position, size: Size) -> Self {
        Self {
            min: origin,
            max: Position::new(origin.x + size.width, origin.y + size.height),
        }
    }

    /// Smallest box containing every rectangle, or `None` for an empty input.
    pub fn enclosing<I>(rects: I) -> Option<Self>
    where
        I: IntoIterator<Item = (Position, Size)>,
    {
        rects.into_iter().fold(None, |acc, (origin, size)| {
            let rect = BoundingBox::from_rect(origin, size);
            Some(match acc {
                None => rect,
                Some(current) => current.union(&rect),
            })
        })
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min: Position::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Position::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn span(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    pub fn center(&self) -> Position {
        Position::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    pub fn contains(&self, point: Position) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }
}
