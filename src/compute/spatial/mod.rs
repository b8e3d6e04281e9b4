//! Quadrant geometry and the point-region quadtree.

pub mod quadrant;
pub mod quadtree;

pub use quadrant::{Direction, Quadrant};
pub use quadtree::{Bucket, DuplicateGroup, NodeKind, QuadNode, QuadTree, TreeDumpNode};
