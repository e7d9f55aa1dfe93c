//! World configuration loader.

use std::path::Path;

use world_core::WorldConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for world configuration from TOML files.
///
/// Every table and key is optional; missing values keep their defaults.
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load(path: &Path) -> LoadResult<WorldConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<WorldConfig> {
        let config: WorldConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;

        if config.vocabulary_size == 0 {
            anyhow::bail!("vocabulary_size must be at least 1");
        }
        if config.vocabulary_size > WorldConfig::MAX_VOCABULARY_SIZE {
            anyhow::bail!(
                "vocabulary_size {} exceeds the maximum of {}",
                config.vocabulary_size,
                WorldConfig::MAX_VOCABULARY_SIZE
            );
        }
        if config.size.volume() == 0 {
            anyhow::bail!(
                "world size must be positive on every axis, got {}x{}x{}",
                config.size.x,
                config.size.y,
                config.size.z
            );
        }
        if config.actor.storage_capacity > WorldConfig::MAX_STORAGE_SLOTS {
            anyhow::bail!(
                "actor.storage_capacity {} exceeds the maximum of {}",
                config.actor.storage_capacity,
                WorldConfig::MAX_STORAGE_SLOTS
            );
        }
        Ok(config)
    }
}
