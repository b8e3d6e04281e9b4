//! Square regions of the world and their four-way subdivision.

use crate::types::{Point, Region};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Child position within a subdivided quadrant. The discriminant is the
/// child's index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    NorthWest = 0,
    NorthEast = 1,
    SouthWest = 2,
    SouthEast = 3,
}

impl Direction {
    /// All four children in index order.
    pub const ALL: [Direction; 4] = [
        Direction::NorthWest,
        Direction::NorthEast,
        Direction::SouthWest,
        Direction::SouthEast,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// An axis-aligned square `[x, x + size) x [y, y + size)`.
///
/// # Example
///
/// ```rust
/// use quadskip::compute::spatial::{Direction, Quadrant};
///
/// let world = Quadrant::world(1024);
/// let se = world.child(Direction::SouthEast);
/// assert_eq!((se.x, se.y, se.size), (512, 512, 512));
/// assert_eq!(world.to_string(), "0, 0, 1024");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Quadrant {
    pub x: i32,
    pub y: i32,
    pub size: i32,
}

impl Quadrant {
    pub fn new(x: i32, y: i32, size: i32) -> Self {
        Self { x, y, size }
    }

    /// The origin-anchored root quadrant.
    pub fn world(size: i32) -> Self {
        Self::new(0, 0, size)
    }

    /// One of the four half-size children.
    pub fn child(&self, direction: Direction) -> Quadrant {
        let half = self.size / 2;
        match direction {
            Direction::NorthWest => Quadrant::new(self.x, self.y, half),
            Direction::NorthEast => Quadrant::new(self.x + half, self.y, half),
            Direction::SouthWest => Quadrant::new(self.x, self.y + half, half),
            Direction::SouthEast => Quadrant::new(self.x + half, self.y + half, half),
        }
    }

    /// All four children in index order.
    pub fn children(&self) -> [Quadrant; 4] {
        Direction::ALL.map(|direction| self.child(direction))
    }

    /// The child that owns `(x, y)`, if the point lies in this quadrant.
    pub fn child_containing(&self, x: i32, y: i32) -> Option<(Direction, Quadrant)> {
        Direction::ALL
            .into_iter()
            .map(|direction| (direction, self.child(direction)))
            .find(|(_, child)| child.contains_coords(x, y))
    }

    /// Half-open containment: the lower edges belong to the quadrant, the
    /// upper edges to its neighbours.
    pub fn contains(&self, point: &Point) -> bool {
        self.contains_coords(point.x, point.y)
    }

    pub fn contains_coords(&self, x: i32, y: i32) -> bool {
        self.to_region().contains_coords(x, y)
    }

    pub fn intersects(&self, region: &Region) -> bool {
        self.to_region().intersects(region)
    }

    pub fn to_region(&self) -> Region {
        Region::new(self.x, self.y, self.size, self.size)
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.x, self.y, self.size)
    }
}
