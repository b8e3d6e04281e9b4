//! Point-region quadtree used as the location index.
//!
//! Every node covers a [`Quadrant`] that is implied by its position: the
//! root covers the world and each internal node hands its four children the
//! four halves of its own square. Nodes do not store their geometry.
//!
//! ## Decomposition rule
//!
//! - A leaf holding more than `leaf_capacity` records splits into an
//!   internal node, unless all of its records share one location.
//!   Coincident records never force a split.
//! - An internal node whose four children are all leaves (or empty) and hold
//!   `leaf_capacity` records or fewer between them collapses back into a
//!   single leaf. With no records left it becomes [`QuadNode::Empty`].
//!
//! Both rules are applied on the way back up from every insert and remove,
//! so one mutation can split or merge several levels at once.
//!
//! Mutation consumes a node and returns its replacement; callers always
//! store the returned node since promotion (empty to leaf, leaf to
//! internal) and collapse change the variant.

use super::quadrant::{Direction, Quadrant};
use crate::config::Config;
use crate::types::{Point, Region};
use rustc_hash::FxHashMap;
use smallvec::{SmallVec, smallvec};
use std::collections::hash_map::Entry as MapEntry;

/// Records held by a single leaf.
pub type Bucket = SmallVec<[Point; 4]>;

/// A quadtree node.
///
/// `Empty` carries nothing, so every empty quadrant shares the same
/// immutable value; replacing it is the only way to put data there.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum QuadNode {
    #[default]
    Empty,
    Leaf(Bucket),
    Internal(Box<[QuadNode; 4]>),
}

/// Variant tag of a [`QuadNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Empty,
    Leaf,
    Internal,
}

/// Records sharing one location within a leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup<'a> {
    pub x: i32,
    pub y: i32,
    pub points: Vec<&'a Point>,
}

/// A node as seen by [`QuadTree::dump`], in pre-order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeDumpNode<'a> {
    /// Distance from the root, which has depth 0.
    pub depth: usize,
    pub quadrant: Quadrant,
    pub kind: NodeKind,
    /// Leaf contents; empty for the other variants.
    pub records: &'a [Point],
}

impl QuadNode {
    pub fn kind(&self) -> NodeKind {
        match self {
            QuadNode::Empty => NodeKind::Empty,
            QuadNode::Leaf(_) => NodeKind::Leaf,
            QuadNode::Internal(_) => NodeKind::Internal,
        }
    }

    /// Leaf or empty.
    pub fn is_leaf_shaped(&self) -> bool {
        !matches!(self, QuadNode::Internal(_))
    }

    /// Records held by this node itself: the bucket length for a leaf, zero
    /// otherwise.
    pub fn record_count(&self) -> usize {
        match self {
            QuadNode::Leaf(records) => records.len(),
            _ => 0,
        }
    }

    pub fn records(&self) -> &[Point] {
        match self {
            QuadNode::Leaf(records) => records,
            _ => &[],
        }
    }

    pub fn children(&self) -> Option<&[QuadNode; 4]> {
        match self {
            QuadNode::Internal(children) => Some(children),
            _ => None,
        }
    }

    pub fn child(&self, direction: Direction) -> Option<&QuadNode> {
        self.children().map(|children| &children[direction.index()])
    }

    fn insert(self, point: Point, quadrant: Quadrant, capacity: usize) -> QuadNode {
        match self {
            QuadNode::Empty => QuadNode::Leaf(smallvec![point]),
            QuadNode::Leaf(mut records) => {
                records.push(point);
                if !should_split(&records, capacity) {
                    return QuadNode::Leaf(records);
                }
                log::debug!(
                    "splitting leaf at ({}) holding {} records",
                    quadrant,
                    records.len()
                );
                records
                    .into_iter()
                    .fold(QuadNode::Internal(Box::default()), |node, record| {
                        node.insert(record, quadrant, capacity)
                    })
            }
            QuadNode::Internal(mut children) => {
                let Some((direction, child_quadrant)) = quadrant.child_containing(point.x, point.y)
                else {
                    unreachable!("point {} routed into quadrant ({})", point, quadrant);
                };
                let slot = &mut children[direction.index()];
                *slot = std::mem::take(slot).insert(point, child_quadrant, capacity);
                QuadNode::Internal(children)
            }
        }
    }

    fn remove(self, point: &Point, quadrant: Quadrant, capacity: usize) -> QuadNode {
        match self {
            QuadNode::Empty => QuadNode::Empty,
            QuadNode::Leaf(mut records) => {
                records.retain(|record| *record != *point);
                if records.is_empty() {
                    QuadNode::Empty
                } else {
                    QuadNode::Leaf(records)
                }
            }
            QuadNode::Internal(mut children) => {
                if let Some((direction, child_quadrant)) =
                    quadrant.child_containing(point.x, point.y)
                {
                    let slot = &mut children[direction.index()];
                    *slot = std::mem::take(slot).remove(point, child_quadrant, capacity);
                }
                if should_merge(&children, capacity) {
                    merge(*children, quadrant)
                } else {
                    QuadNode::Internal(children)
                }
            }
        }
    }

    fn exists(&self, point: &Point) -> bool {
        match self {
            QuadNode::Empty => false,
            QuadNode::Leaf(records) => records.iter().any(|record| record == point),
            QuadNode::Internal(children) => children.iter().any(|child| child.exists(point)),
        }
    }

    fn search(&self, x: i32, y: i32, quadrant: Quadrant) -> Option<&Point> {
        match self {
            QuadNode::Empty => None,
            QuadNode::Leaf(records) => records.iter().find(|p| p.x == x && p.y == y),
            QuadNode::Internal(children) => {
                let (direction, child_quadrant) = quadrant.child_containing(x, y)?;
                children[direction.index()].search(x, y, child_quadrant)
            }
        }
    }

    /// Exact matches in the leaf owning the point's location.
    fn occurrences(&self, point: &Point, quadrant: Quadrant) -> usize {
        match self {
            QuadNode::Empty => 0,
            QuadNode::Leaf(records) => records.iter().filter(|record| *record == point).count(),
            QuadNode::Internal(children) => quadrant
                .child_containing(point.x, point.y)
                .map_or(0, |(direction, child_quadrant)| {
                    children[direction.index()].occurrences(point, child_quadrant)
                }),
        }
    }

    fn region_search<'a, F>(&'a self, region: &Region, quadrant: Quadrant, visit: &mut F) -> usize
    where
        F: FnMut(&'a Point),
    {
        if !quadrant.intersects(region) {
            return 0;
        }
        match self {
            QuadNode::Empty => 1,
            QuadNode::Leaf(records) => {
                records
                    .iter()
                    .filter(|record| region.contains(record))
                    .for_each(|record| visit(record));
                1
            }
            QuadNode::Internal(children) => {
                let mut visited = 1;
                for (child, child_quadrant) in children.iter().zip(quadrant.children()) {
                    visited += child.region_search(region, child_quadrant, visit);
                }
                visited
            }
        }
    }

    fn collect_duplicates<'a>(&'a self, out: &mut Vec<DuplicateGroup<'a>>) {
        match self {
            QuadNode::Empty => {}
            QuadNode::Leaf(records) => {
                let mut slots: FxHashMap<(i32, i32), usize> = FxHashMap::default();
                let mut groups: Vec<DuplicateGroup<'a>> = Vec::new();
                for record in records.iter() {
                    match slots.entry(record.coords()) {
                        MapEntry::Occupied(slot) => groups[*slot.get()].points.push(record),
                        MapEntry::Vacant(slot) => {
                            slot.insert(groups.len());
                            groups.push(DuplicateGroup {
                                x: record.x,
                                y: record.y,
                                points: vec![record],
                            });
                        }
                    }
                }
                out.extend(groups.into_iter().filter(|group| group.points.len() > 1));
            }
            QuadNode::Internal(children) => {
                children
                    .iter()
                    .for_each(|child| child.collect_duplicates(out));
            }
        }
    }

    fn dump<'a, F>(&'a self, quadrant: Quadrant, depth: usize, visit: &mut F) -> usize
    where
        F: FnMut(TreeDumpNode<'a>),
    {
        visit(TreeDumpNode {
            depth,
            quadrant,
            kind: self.kind(),
            records: self.records(),
        });
        match self {
            QuadNode::Internal(children) => {
                let mut printed = 1;
                for (child, child_quadrant) in children.iter().zip(quadrant.children()) {
                    printed += child.dump(child_quadrant, depth + 1, visit);
                }
                printed
            }
            _ => 1,
        }
    }

    /// Check the decomposition rule below this node and return the number of
    /// records it holds.
    fn validate(&self, quadrant: Quadrant, capacity: usize) -> Result<usize, String> {
        match self {
            QuadNode::Empty => Ok(0),
            QuadNode::Leaf(records) => {
                if records.is_empty() {
                    return Err(format!("empty leaf at ({})", quadrant));
                }
                if let Some(stray) = records.iter().find(|record| !quadrant.contains(record)) {
                    return Err(format!("{} stored outside its leaf ({})", stray, quadrant));
                }
                if should_split(records, capacity) {
                    return Err(format!(
                        "leaf at ({}) holds {} records at distinct locations",
                        quadrant,
                        records.len()
                    ));
                }
                Ok(records.len())
            }
            QuadNode::Internal(children) => {
                if quadrant.size < 2 {
                    return Err(format!("internal node at unit quadrant ({})", quadrant));
                }
                let mut total = 0;
                for (child, child_quadrant) in children.iter().zip(quadrant.children()) {
                    total += child.validate(child_quadrant, capacity)?;
                }
                if should_merge(children, capacity) {
                    return Err(format!(
                        "internal node at ({}) should have collapsed ({} records)",
                        quadrant, total
                    ));
                }
                Ok(total)
            }
        }
    }
}

fn should_split(records: &[Point], capacity: usize) -> bool {
    match records.split_first() {
        Some((first, rest)) if records.len() > capacity => {
            rest.iter().any(|record| !record.same_location(first))
        }
        _ => false,
    }
}

fn should_merge(children: &[QuadNode; 4], capacity: usize) -> bool {
    children.iter().all(QuadNode::is_leaf_shaped)
        && children.iter().map(QuadNode::record_count).sum::<usize>() <= capacity
}

fn merge(children: [QuadNode; 4], quadrant: Quadrant) -> QuadNode {
    let records: Bucket = children
        .into_iter()
        .flat_map(|child| match child {
            QuadNode::Leaf(records) => records,
            _ => Bucket::new(),
        })
        .collect();
    log::debug!(
        "collapsing internal node at ({}) into {} records",
        quadrant,
        records.len()
    );
    if records.is_empty() {
        QuadNode::Empty
    } else {
        QuadNode::Leaf(records)
    }
}

/// A PR quadtree over an origin-anchored, power-of-two world.
///
/// # Example
///
/// ```rust
/// use quadskip::compute::spatial::{NodeKind, QuadTree};
/// use quadskip::Point;
///
/// let mut tree = QuadTree::new(1024, 3);
/// tree.insert(Point::new("a", 1, 20));
/// tree.insert(Point::new("b", 10, 30));
/// tree.insert(Point::new("c", 1, 20));
/// assert_eq!(tree.root().kind(), NodeKind::Leaf);
///
/// tree.insert(Point::new("d", 200, 200));
/// assert_eq!(tree.root().kind(), NodeKind::Internal);
/// assert_eq!(tree.search(200, 200).and_then(|p| p.name()), Some("d"));
/// ```
#[derive(Debug, Clone)]
pub struct QuadTree {
    root: QuadNode,
    world: Quadrant,
    leaf_capacity: usize,
    len: usize,
}

impl QuadTree {
    pub fn new(world_size: i32, leaf_capacity: usize) -> Self {
        Self {
            root: QuadNode::Empty,
            world: Quadrant::world(world_size),
            leaf_capacity,
            len: 0,
        }
    }

    pub fn with_config(config: &Config) -> Self {
        Self::new(config.world_size, config.leaf_capacity)
    }

    pub fn root(&self) -> &QuadNode {
        &self.root
    }

    pub fn world(&self) -> Quadrant {
        self.world
    }

    pub fn leaf_capacity(&self) -> usize {
        self.leaf_capacity
    }

    /// Number of records stored.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert a record. Returns `false`, leaving the tree untouched, when the
    /// record lies outside the world.
    pub fn insert(&mut self, point: Point) -> bool {
        if !self.world.contains(&point) {
            log::warn!("Refusing {} outside world ({})", point, self.world);
            return false;
        }
        let root = std::mem::take(&mut self.root);
        self.root = root.insert(point, self.world, self.leaf_capacity);
        self.len += 1;
        true
    }

    /// Remove every record equal to `point` (name and location). Returns
    /// the number of records removed.
    pub fn remove(&mut self, point: &Point) -> usize {
        let removed = self.root.occurrences(point, self.world);
        if removed == 0 {
            return 0;
        }
        let root = std::mem::take(&mut self.root);
        self.root = root.remove(point, self.world, self.leaf_capacity);
        self.len -= removed;
        removed
    }

    /// Exact match (name and location) anywhere in the tree.
    pub fn exists(&self, point: &Point) -> bool {
        self.root.exists(point)
    }

    /// First record stored at `(x, y)`, whatever its name.
    pub fn search(&self, x: i32, y: i32) -> Option<&Point> {
        if !self.world.contains_coords(x, y) {
            return None;
        }
        self.root.search(x, y, self.world)
    }

    /// Report every record inside `region` to `visit`, in traversal order,
    /// and return the number of nodes whose quadrant intersects the region.
    pub fn region_search<'a, F>(&'a self, region: &Region, mut visit: F) -> usize
    where
        F: FnMut(&'a Point),
    {
        self.root.region_search(region, self.world, &mut visit)
    }

    /// Every location holding more than one record, one group per location.
    pub fn duplicates(&self) -> Vec<DuplicateGroup<'_>> {
        let mut groups = Vec::new();
        self.root.collect_duplicates(&mut groups);
        groups
    }

    /// Walk every node in pre-order (children NW, NE, SW, SE) and return how
    /// many were visited.
    pub fn dump<'a, F>(&'a self, mut visit: F) -> usize
    where
        F: FnMut(TreeDumpNode<'a>),
    {
        self.root.dump(self.world, 0, &mut visit)
    }

    /// Total number of nodes, empty ones included.
    pub fn node_count(&self) -> usize {
        self.dump(|_| {})
    }

    /// Records in traversal order.
    pub fn points(&self) -> Vec<&Point> {
        let mut points = Vec::with_capacity(self.len);
        self.dump(|node| points.extend(node.records));
        points
    }

    /// Check the decomposition rule everywhere and the stored length.
    pub fn validate(&self) -> Result<(), String> {
        let total = self.root.validate(self.world, self.leaf_capacity)?;
        if total != self.len {
            return Err(format!(
                "tree holds {} records but counts {}",
                total, self.len
            ));
        }
        Ok(())
    }
}

impl Default for QuadTree {
    fn default() -> Self {
        Self::with_config(&Config::default())
    }
}
