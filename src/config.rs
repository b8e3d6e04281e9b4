//! Index configuration.
//!
//! The configuration is serializable so it can be loaded from JSON, or TOML
//! with the `toml` feature enabled.

use serde::de::Error;
use serde::{Deserialize, Serialize};

/// Configuration for a [`SpatialDb`](crate::SpatialDb).
///
/// # Example
///
/// ```rust
/// use quadskip::Config;
///
/// let config = Config::default();
/// assert_eq!(config.world_size, 1024);
/// assert_eq!(config.leaf_capacity, 3);
///
/// let json = r#"{ "seed": 42 }"#;
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.seed, Some(42));
/// assert_eq!(config.world_size, 1024);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Side length of the square world anchored at the origin. Must be a
    /// power of two.
    #[serde(default = "Config::default_world_size")]
    pub world_size: i32,

    /// Number of records a leaf may hold before it splits. A leaf whose
    /// records all share one location never splits.
    #[serde(default = "Config::default_leaf_capacity")]
    pub leaf_capacity: usize,

    /// Seed for the skip list level generator. `None` seeds from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Config {
    const fn default_world_size() -> i32 {
        1024
    }

    const fn default_leaf_capacity() -> usize {
        3
    }

    pub fn with_world_size(mut self, world_size: i32) -> Self {
        self.world_size = world_size;
        self
    }

    pub fn with_leaf_capacity(mut self, leaf_capacity: usize) -> Self {
        self.leaf_capacity = leaf_capacity;
        self
    }

    /// Make skip list levels reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.world_size <= 0 {
            return Err("World size must be positive".to_string());
        }
        if (self.world_size as u32).count_ones() != 1 {
            return Err(format!(
                "World size must be a power of two, got {}",
                self.world_size
            ));
        }
        if self.leaf_capacity == 0 {
            return Err("Leaf capacity must be greater than zero".to_string());
        }
        Ok(())
    }

    /// Load configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let config: Config = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(serde_json::Error::custom(e));
        }
        Ok(config)
    }

    /// Save configuration as JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load configuration from TOML string (requires toml feature)
    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        let config: Config = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    /// Save configuration as TOML string (requires toml feature)
    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            world_size: Self::default_world_size(),
            leaf_capacity: Self::default_leaf_capacity(),
            seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_non_power_of_two_world() {
        let config = Config::default().with_world_size(1000);
        assert!(config.validate().is_err());
        let config = Config::default().with_world_size(0);
        assert!(config.validate().is_err());
        let config = Config::default().with_world_size(-1024);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_leaf_capacity() {
        let config = Config::default().with_leaf_capacity(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let config = Config::default().with_seed(7).with_world_size(256);
        let json = config.to_json().unwrap();
        assert_eq!(Config::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_json_validation_error() {
        let result = Config::from_json(r#"{ "world_size": 1000 }"#);
        assert!(result.is_err());
    }

    #[cfg(feature = "toml")]
    #[test]
    fn test_toml_loading() {
        let config = Config::from_toml("world_size = 512\nleaf_capacity = 4\n").unwrap();
        assert_eq!(config.world_size, 512);
        assert_eq!(config.leaf_capacity, 4);
        assert_eq!(config.seed, None);
    }
}
