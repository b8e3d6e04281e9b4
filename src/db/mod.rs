//! Core database implementation for quadskip.
//!
//! [`SpatialDb`] keeps every record in two structures at once: a skip list
//! keyed by name and a PR quadtree keyed by location. Name lookups go to the
//! skip list, coordinate and region lookups go to the tree, and every
//! mutation is applied to both before it returns.

use crate::compute::skiplist::{SkipList, SkipListDump};
use crate::compute::spatial::{DuplicateGroup, QuadTree, TreeDumpNode};
use crate::compute::validation::{validate_coords, validate_point, validate_region};
use crate::config::Config;
use crate::error::{IndexError, Result};
use crate::types::{Point, Region};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rustc_hash::FxHashSet;

mod stats;

pub use stats::DbStats;

/// Records found by a region query, in tree traversal order, and the number
/// of tree nodes whose quadrant intersects the region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionSearch<'a> {
    pub points: Vec<&'a Point>,
    pub nodes_visited: usize,
}

/// Structural snapshot of both indexes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbDump<'a> {
    /// Skip list nodes, head first, in level-0 order.
    pub skip_list: SkipListDump<'a, Point>,
    /// Tree nodes in pre-order.
    pub tree: Vec<TreeDumpNode<'a>>,
}

impl DbDump<'_> {
    /// Number of tree nodes, empty ones included.
    pub fn tree_node_count(&self) -> usize {
        self.tree.len()
    }
}

/// In-memory record index searchable by name and by location.
///
/// `SpatialDb` is single-threaded; wrap it in a lock to share it.
///
/// # Example
///
/// ```rust
/// use quadskip::{Point, Region, SpatialDb};
///
/// let mut db = SpatialDb::memory()?;
/// db.insert(Point::new("a", 1, 20))?;
/// db.insert(Point::new("b", 10, 30))?;
///
/// assert_eq!(db.search_by_name("a"), vec![&Point::new("a", 1, 20)]);
/// assert_eq!(db.find_at(10, 30).and_then(|p| p.name()), Some("b"));
///
/// let hits = db.region_search(&Region::new(0, 0, 5, 25))?;
/// assert_eq!(hits.points, vec![&Point::new("a", 1, 20)]);
/// # Ok::<(), quadskip::IndexError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SpatialDb {
    names: SkipList<String, Point>,
    tree: QuadTree,
    config: Config,
    stats: DbStats,
}

impl SpatialDb {
    /// Create an empty database with the default configuration.
    pub fn memory() -> Result<Self> {
        Self::memory_with_config(Config::default())
    }

    /// Create an empty database with a custom configuration.
    pub fn memory_with_config(config: Config) -> Result<Self> {
        config.validate().map_err(IndexError::InvalidConfig)?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        log::info!(
            "Creating index: world {}x{}, leaf capacity {}, {}",
            config.world_size,
            config.world_size,
            config.leaf_capacity,
            if config.seed.is_some() {
                "seeded levels"
            } else {
                "entropy levels"
            }
        );

        Ok(Self {
            names: SkipList::with_rng(rng),
            tree: QuadTree::with_config(&config),
            config,
            stats: DbStats::new(),
        })
    }

    /// Create a database builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quadskip::SpatialDb;
    ///
    /// let db = SpatialDb::builder()
    ///     .world_size(256)
    ///     .leaf_capacity(4)
    ///     .seed(7)
    ///     .build()?;
    /// assert_eq!(db.config().world_size, 256);
    /// # Ok::<(), quadskip::IndexError>(())
    /// ```
    pub fn builder() -> crate::builder::DbBuilder {
        crate::builder::DbBuilder::new()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get database statistics
    pub fn stats(&self) -> DbStats {
        self.stats.clone()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Index a record in both structures.
    ///
    /// Rejects records without a valid name, records outside the world and
    /// records equal (name and location) to one already indexed. Records
    /// sharing only a name or only a location are accepted.
    pub fn insert(&mut self, point: Point) -> Result<()> {
        if let Err(e) = self.check_insert(&point) {
            log::debug!("Rejected insert of {}: {}", point, e);
            self.stats.record_rejection();
            return Err(e);
        }

        let name = point.name.clone().unwrap_or_default();
        self.names.insert(name, point.clone());
        self.tree.insert(point);

        self.stats.record_insert();
        self.debug_validate();
        Ok(())
    }

    fn check_insert(&self, point: &Point) -> Result<()> {
        validate_point(point, self.config.world_size)?;
        if self.tree.exists(point) {
            return Err(IndexError::Duplicate(point.clone()));
        }
        Ok(())
    }

    /// Remove the first record (in name order) with the given name.
    pub fn remove_by_name(&mut self, name: &str) -> Option<Point> {
        let Some(entry) = self.names.remove(name) else {
            log::debug!("No record named {} to remove", name);
            self.stats.record_miss();
            return None;
        };

        let removed = self.tree.remove(&entry.value);
        debug_assert_eq!(removed, 1, "name index and tree disagree on {}", entry.value);

        self.stats.record_removal();
        self.debug_validate();
        Some(entry.value)
    }

    /// Remove the record stored at `(x, y)`. When several records share the
    /// location, the first one in its leaf goes.
    ///
    /// Fails with [`IndexError::OutOfBounds`] for coordinates outside the
    /// world; returns `Ok(None)` when nothing is stored there.
    pub fn remove_by_coords(&mut self, x: i32, y: i32) -> Result<Option<Point>> {
        if let Err(e) = validate_coords(x, y, self.config.world_size) {
            log::debug!("Rejected removal at ({}, {}): {}", x, y, e);
            self.stats.record_rejection();
            return Err(e);
        }

        let Some(found) = self.tree.search(x, y).cloned() else {
            self.stats.record_miss();
            return Ok(None);
        };

        let name = found.name().unwrap_or_default();
        let unlinked = self.names.remove_where(name, |value| *value == found);
        debug_assert!(unlinked.is_some(), "{} missing from the name index", found);
        self.tree.remove(&found);

        self.stats.record_removal();
        self.debug_validate();
        Ok(Some(found))
    }

    /// Every record with the given name, most recently inserted first.
    pub fn search_by_name(&self, name: &str) -> Vec<&Point> {
        self.names
            .search(name)
            .into_iter()
            .map(|entry| &entry.value)
            .collect()
    }

    /// First record stored at `(x, y)`, whatever its name.
    pub fn find_at(&self, x: i32, y: i32) -> Option<&Point> {
        self.tree.search(x, y)
    }

    /// True when a record equal to `point` (name and location) is indexed.
    pub fn contains(&self, point: &Point) -> bool {
        self.tree.exists(point)
    }

    /// Records lying inside `region`, and the number of tree nodes the
    /// query touched.
    pub fn region_search(&self, region: &Region) -> Result<RegionSearch<'_>> {
        validate_region(region)?;

        let mut points = Vec::new();
        let nodes_visited = self.tree.region_search(region, |point| points.push(point));
        Ok(RegionSearch {
            points,
            nodes_visited,
        })
    }

    /// Like [`region_search`](Self::region_search) but streams each match to
    /// `visit` instead of collecting them. Returns the visited node count.
    pub fn region_search_with<F>(&self, region: &Region, visit: F) -> Result<usize>
    where
        F: FnMut(&Point),
    {
        validate_region(region)?;
        Ok(self.tree.region_search(region, visit))
    }

    /// Locations holding more than one record.
    pub fn duplicates(&self) -> Vec<DuplicateGroup<'_>> {
        self.tree.duplicates()
    }

    /// Structural snapshot of both indexes.
    pub fn dump(&self) -> DbDump<'_> {
        let mut tree = Vec::with_capacity(self.tree.len());
        self.tree.dump(|node| tree.push(node));
        DbDump {
            skip_list: self.names.dump(),
            tree,
        }
    }

    /// Records in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Point> + '_ {
        self.names.iter().map(|entry| &entry.value)
    }

    /// Check both structures and that they hold the same records.
    pub fn validate(&self) -> std::result::Result<(), String> {
        self.names.validate()?;
        self.tree.validate()?;

        if self.names.len() != self.tree.len() {
            return Err(format!(
                "name index holds {} records, tree holds {}",
                self.names.len(),
                self.tree.len()
            ));
        }

        let located: FxHashSet<&Point> = self.tree.points().into_iter().collect();
        if let Some(stray) = self.iter().find(|point| !located.contains(point)) {
            return Err(format!("{} is named but not located", stray));
        }
        Ok(())
    }

    fn debug_validate(&self) {
        #[cfg(debug_assertions)]
        if let Err(e) = self.validate() {
            panic!("index invariant violated: {}", e);
        }
    }
}
