//! In-memory record index searchable by name and by location.
//!
//! Records are named points on an integer grid. Each one is kept in a skip
//! list keyed by name and in a PR quadtree keyed by location, so lookups by
//! either key and rectangular region queries are all cheap.
//!
//! ```rust
//! use quadskip::{Point, Region, SpatialDb};
//!
//! let mut db = SpatialDb::memory()?;
//! db.insert(Point::new("a", 1, 20))?;
//! db.insert(Point::new("b", 10, 30))?;
//! db.insert(Point::new("c", 1, 20))?;
//!
//! let hits = db.region_search(&Region::new(0, 0, 5, 25))?;
//! assert_eq!(hits.points.len(), 2);
//!
//! let groups = db.duplicates();
//! assert_eq!((groups[0].x, groups[0].y), (1, 20));
//! # Ok::<(), quadskip::IndexError>(())
//! ```

pub mod builder;
pub mod command;
pub mod compute;
pub mod config;
pub mod db;
pub mod error;
pub mod types;

pub use builder::DbBuilder;
pub use command::{Command, CommandProcessor};
pub use config::Config;
pub use db::{DbDump, DbStats, RegionSearch, SpatialDb};
pub use error::{IndexError, Result};

pub use compute::skiplist::{Entry, SkipList};
pub use compute::spatial::{Direction, DuplicateGroup, NodeKind, QuadTree, Quadrant};

pub use types::{Point, Region};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{DbBuilder, IndexError, Result, SpatialDb};

    pub use crate::{Point, Region};

    pub use crate::{Config, DbStats};

    pub use crate::{Command, CommandProcessor};
}
