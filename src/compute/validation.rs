//! Validation of names, coordinates and query rectangles.
//!
//! The indexes assume well-formed input; these checks run first and turn
//! bad input into an [`IndexError`].

use crate::error::{IndexError, Result};
use crate::types::{Point, Region};

/// Validates a record name: one or more ASCII letters, digits or `_`.
///
/// # Examples
///
/// ```
/// use quadskip::compute::validation::validate_name;
///
/// assert!(validate_name("p_42").is_ok());
/// assert!(validate_name("").is_err());
/// assert!(validate_name("a-b").is_err());
/// ```
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(IndexError::InvalidName("name must not be empty".to_string()));
    }

    if let Some(bad) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_'))
    {
        return Err(IndexError::InvalidName(format!(
            "'{}' contains invalid character '{}'",
            name, bad
        )));
    }

    Ok(())
}

/// Validates that `(x, y)` lies in `[0, world_size)` on both axes.
pub fn validate_coords(x: i32, y: i32, world_size: i32) -> Result<()> {
    let range = 0..world_size;
    if !range.contains(&x) || !range.contains(&y) {
        return Err(IndexError::OutOfBounds { x, y, world_size });
    }
    Ok(())
}

/// Validates a record before it is indexed. The record must be named and
/// lie inside the world.
///
/// # Examples
///
/// ```
/// use quadskip::compute::validation::validate_point;
/// use quadskip::Point;
///
/// assert!(validate_point(&Point::new("a", 1, 20), 1024).is_ok());
/// assert!(validate_point(&Point::new("a", 1024, 20), 1024).is_err());
/// assert!(validate_point(&Point::unnamed(1, 20), 1024).is_err());
/// ```
pub fn validate_point(point: &Point, world_size: i32) -> Result<()> {
    match point.name() {
        Some(name) => validate_name(name)?,
        None => {
            return Err(IndexError::InvalidName(format!(
                "record {} has no name",
                point
            )));
        }
    }
    validate_coords(point.x, point.y, world_size)
}

/// Validates a query rectangle: width and height must be positive.
pub fn validate_region(region: &Region) -> Result<()> {
    if region.width <= 0 || region.height <= 0 {
        return Err(IndexError::InvalidRegion(*region));
    }
    Ok(())
}
