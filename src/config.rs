//! Engine configuration: the single parameter struct consumed by both the library and the CLI.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Parameters governing one `Engine` run.
///
/// Defaults mirror the original tool's command-line defaults; `seed` has no universal default and
/// is typically supplied by the caller from a time source, but `Default` seeds with `0` so
/// `EngineConfig::default()` stays total and reproducible for tests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    pub seed: u32,
    pub max_iters: u64,
    pub world_x: i64,
    pub world_y: i64,
    pub atom_count: u64,
    pub do_reactions: bool,
    pub do_shuffle: bool,
    pub census_interval: u64,
    pub load_file: Option<PathBuf>,
    pub config_file: Option<PathBuf>,
    pub census_file: Option<PathBuf>,
    pub diffusion_file: Option<PathBuf>,
    pub rand_file: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            seed: 0,
            max_iters: 100_000,
            world_x: 16,
            world_y: 16,
            atom_count: 64,
            do_reactions: true,
            do_shuffle: false,
            census_interval: 8,
            load_file: None,
            config_file: None,
            census_file: None,
            diffusion_file: None,
            rand_file: None,
        }
    }
}

impl EngineConfig {
    /// Validates dimension invariants that aren't naturally expressible in the field types
    /// (`i64` rather than a `NonZero` newtype, to keep CLI parsing simple).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.world_x <= 0 || self.world_y <= 0 {
            return Err(ConfigError::InvalidWorldSize {
                width: self.world_x,
                height: self.world_y,
            });
        }
        Ok(())
    }

    /// `atom_count` clamped to the number of cells in the world.
    pub fn clamped_atom_count(&self) -> u64 {
        let capacity = (self.world_x as u64) * (self.world_y as u64);
        self.atom_count.min(capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn non_positive_dimensions_are_rejected() {
        let mut config = EngineConfig::default();
        config.world_x = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidWorldSize { .. })
        ));
    }

    #[test]
    fn atom_count_clamps_to_world_capacity() {
        let mut config = EngineConfig::default();
        config.world_x = 2;
        config.world_y = 2;
        config.atom_count = 100;
        assert_eq!(config.clamped_atom_count(), 4);
    }
}
