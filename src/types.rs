//! Record and query types shared by both indexes.
use serde::{Deserialize, Serialize};
use std::fmt;

/// A named point in the integer plane.
///
/// Two points are equal only when name and both coordinates match. A point
/// without a name is only used as a coordinate probe; the name index never
/// holds one.
///
/// # Example
///
/// ```rust
/// use quadskip::Point;
///
/// let a = Point::new("a", 1, 20);
/// assert_eq!(a.to_string(), "(a, 1, 20)");
/// assert_eq!(Point::unnamed(1, 20).to_string(), "(1, 20)");
/// assert!(a.same_location(&Point::new("c", 1, 20)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub name: Option<String>,
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// Create a named point.
    pub fn new(name: impl Into<String>, x: i32, y: i32) -> Self {
        Self {
            name: Some(name.into()),
            x,
            y,
        }
    }

    /// Create a coordinate-only point.
    pub fn unnamed(x: i32, y: i32) -> Self {
        Self { name: None, x, y }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Coordinates as a tuple.
    pub fn coords(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    /// True when both points sit on the same coordinates, whatever their names.
    pub fn same_location(&self, other: &Point) -> bool {
        self.x == other.x && self.y == other.y
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "({}, {}, {})", name, self.x, self.y),
            None => write!(f, "({}, {})", self.x, self.y),
        }
    }
}

/// An axis-aligned query rectangle anchored at its top-left corner.
///
/// The rectangle covers `[x, x + width) x [y, y + height)`. Width and height
/// are expected to be positive; an empty rectangle contains and intersects
/// nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Region {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// True when the rectangle has no area.
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Half-open containment test for a point.
    pub fn contains(&self, point: &Point) -> bool {
        self.contains_coords(point.x, point.y)
    }

    pub fn contains_coords(&self, x: i32, y: i32) -> bool {
        if self.is_empty() {
            return false;
        }
        let (x, y) = (i64::from(x), i64::from(y));
        x >= i64::from(self.x)
            && y >= i64::from(self.y)
            && x < self.right()
            && y < self.bottom()
    }

    /// True when the two rectangles share some area. Rectangles that only
    /// touch along an edge or at a corner do not intersect.
    pub fn intersects(&self, other: &Region) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        i64::from(self.x) < other.right()
            && i64::from(other.x) < self.right()
            && i64::from(self.y) < other.bottom()
            && i64::from(other.y) < self.bottom()
    }

    // Widened so that rectangles near i32::MAX do not wrap.
    fn right(&self) -> i64 {
        i64::from(self.x) + i64::from(self.width)
    }

    fn bottom(&self) -> i64 {
        i64::from(self.y) + i64::from(self.height)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}, {}", self.x, self.y, self.width, self.height)
    }
}
