//! Terrain layout loader.
//!
//! A layout names its generation layers (fence, floor, scatter counts) and
//! lists explicit cells by capability name:
//!
//! ```text
//! (
//!     size: Some((16, 16, 1)),
//!     fence: true,
//!     food: 12,
//!     cells: [((9, 8, 0), ["edible"])],
//! )
//! ```

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use world_core::{Grid, Operations, Position, TerrainBuilder, WorldSize, ops};

use crate::loaders::{LoadResult, read_file};
use crate::presets::TerrainPreset;

/// Terrain layout as written in RON files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainLayout {
    /// Overrides the configured world size.
    pub size: Option<(u32, u32, u32)>,
    /// Overrides the configured world seed for scatter placement.
    pub seed: Option<u64>,
    /// Starting recipe; the remaining fields are layered on top of it.
    pub preset: Option<TerrainPreset>,
    pub fence: bool,
    pub floor: bool,
    pub food: u32,
    pub rocks: u32,
    pub cells: Vec<((i32, i32, i32), Vec<String>)>,
}

impl TerrainLayout {
    /// Builds the terrain grid, falling back to `size` and `seed` where the
    /// layout does not say otherwise.
    pub fn build(&self, size: WorldSize, seed: u64) -> LoadResult<Grid<Operations>> {
        let size = self
            .size
            .map(|(x, y, z)| WorldSize::new(x, y, z))
            .unwrap_or(size);
        if size.volume() == 0 {
            anyhow::bail!("terrain size must be positive on every axis");
        }
        let seed = self.seed.unwrap_or(seed);

        let mut builder = match self.preset {
            Some(preset) => preset.builder(size, seed),
            None => TerrainBuilder::new(size).with_seed(seed),
        };
        if self.fence {
            builder = builder.with_fence();
        }
        if self.floor {
            builder = builder.with_floor();
        }
        if self.food > 0 {
            builder = builder.with_food(self.food);
        }
        if self.rocks > 0 {
            builder = builder.with_rocks(self.rocks);
        }

        for ((x, y, z), names) in &self.cells {
            let position = Position::new(*x, *y, *z);
            if !size.contains(position) {
                anyhow::bail!("terrain cell {} lies outside the world", position);
            }
            let operations = ops::encode_names(names)
                .with_context(|| format!("invalid capabilities for cell {}", position))?;
            builder = builder.with_cell(position, operations);
        }

        Ok(builder.build())
    }
}

/// Loader for terrain layouts from RON files.
pub struct TerrainLoader;

impl TerrainLoader {
    pub fn load(path: &Path) -> LoadResult<TerrainLayout> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<TerrainLayout> {
        ron::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse terrain RON: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_cells_use_capability_names() {
        let layout = TerrainLoader::parse(
            r#"(
                size: Some((4, 4, 1)),
                cells: [((1, 2, 0), ["edible", "liftable"]), ((3, 3, 0), [])],
            )"#,
        )
        .unwrap();
        let grid = layout.build(WorldSize::new(9, 9, 9), 0).unwrap();
        assert_eq!(grid.size(), WorldSize::new(4, 4, 1));
        assert_eq!(
            grid.get(Position::new(1, 2, 0)),
            Some(&(Operations::EDIBLE | Operations::LIFTABLE))
        );
        assert_eq!(grid.get(Position::new(3, 3, 0)), Some(&Operations::empty()));
    }

    #[test]
    fn unknown_capability_fails_with_context() {
        let layout = TerrainLoader::parse(r#"(cells: [((0, 0, 0), ["sticky"])])"#).unwrap();
        let err = layout.build(WorldSize::new(2, 2, 1), 0).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("sticky"), "{message}");
    }

    #[test]
    fn cells_outside_the_world_are_rejected() {
        let layout = TerrainLoader::parse(r#"(cells: [((5, 0, 0), ["edible"])])"#).unwrap();
        assert!(layout.build(WorldSize::new(2, 2, 1), 0).is_err());
    }

    #[test]
    fn preset_is_layered_under_explicit_fields() {
        let layout = TerrainLoader::parse(r#"(preset: Some(meadow), rocks: 2)"#).unwrap();
        let grid = layout.build(WorldSize::new(8, 8, 1), 1).unwrap();
        let rocks = grid.iter().filter(|(_, o)| **o == TerrainBuilder::ROCK).count();
        assert_eq!(rocks, 2);
        assert_eq!(grid.get(Position::new(0, 0, 0)), Some(&TerrainBuilder::WALL));
    }

    #[test]
    fn malformed_ron_is_an_error() {
        assert!(TerrainLoader::parse("(fence: maybe)").is_err());
    }
}
