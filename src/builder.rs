//! Database builder for flexible configuration
//!
//! Collects configuration piece by piece and validates it once, in
//! [`DbBuilder::build`].

use crate::config::Config;
use crate::db::SpatialDb;
use crate::error::Result;

/// Builder for a [`SpatialDb`].
#[derive(Debug, Clone, Default)]
pub struct DbBuilder {
    config: Config,
}

impl DbBuilder {
    /// Create a new builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Side length of the world. Must be a power of two.
    pub fn world_size(mut self, world_size: i32) -> Self {
        self.config = self.config.with_world_size(world_size);
        self
    }

    pub fn leaf_capacity(mut self, leaf_capacity: usize) -> Self {
        self.config = self.config.with_leaf_capacity(leaf_capacity);
        self
    }

    /// Seed the skip list level generator.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config = self.config.with_seed(seed);
        self
    }

    /// Validate the configuration and build the database.
    pub fn build(self) -> Result<SpatialDb> {
        SpatialDb::memory_with_config(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IndexError;

    #[test]
    fn test_builder_defaults() {
        let db = DbBuilder::new().build().unwrap();
        assert_eq!(db.config(), &Config::default());
        assert!(db.is_empty());
    }

    #[test]
    fn test_builder_overrides() {
        let db = DbBuilder::new()
            .world_size(64)
            .leaf_capacity(1)
            .seed(3)
            .build()
            .unwrap();
        assert_eq!(db.config().world_size, 64);
        assert_eq!(db.config().leaf_capacity, 1);
        assert_eq!(db.config().seed, Some(3));
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        let result = DbBuilder::new().leaf_capacity(0).build();
        assert!(matches!(result, Err(IndexError::InvalidConfig(_))));
    }

    #[test]
    fn test_builder_with_config() {
        let config = Config::default().with_world_size(2048);
        let db = DbBuilder::new().config(config.clone()).build().unwrap();
        assert_eq!(db.config(), &config);
    }
}
