//! Compute layer: the index structures and input validation.
//!
//! This module holds the algorithms and nothing else:
//! - [`skiplist`]: the ordered multimap behind name lookups
//! - [`spatial`]: quadrant geometry and the PR quadtree behind location lookups
//! - [`validation`]: checks applied before input reaches either structure
//!
//! [`SpatialDb`](crate::SpatialDb) composes the two structures.

pub mod skiplist;
pub mod spatial;
pub mod validation;

pub use skiplist::{Entry, SkipList};
pub use spatial::{Direction, Quadrant, QuadTree};
