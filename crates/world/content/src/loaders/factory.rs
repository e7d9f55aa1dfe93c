//! Content factory for loading a whole data directory.

use std::path::{Path, PathBuf};

use world_core::{Grid, Operations, WorldConfig};

use crate::loaders::{ConfigLoader, LoadResult, TerrainLoader};

/// Loads world content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// └── terrains/
///     ├── meadow.ron
///     └── quarry.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// The data directory bundled with this crate.
    pub fn bundled() -> Self {
        Self::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("data"))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Load world configuration from `config.toml`.
    pub fn load_config(&self) -> LoadResult<WorldConfig> {
        ConfigLoader::load(&self.data_dir.join("config.toml"))
    }

    /// Load `terrains/<name>.ron` and build it against `config`.
    pub fn load_terrain(&self, name: &str, config: &WorldConfig) -> LoadResult<Grid<Operations>> {
        let path = self.data_dir.join("terrains").join(format!("{name}.ron"));
        let layout = TerrainLoader::load(&path)?;
        layout.build(config.size, config.seed)
    }
}
