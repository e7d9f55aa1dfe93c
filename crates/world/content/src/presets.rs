//! Built-in terrain presets.

use world_core::{TerrainBuilder, WorldSize};

/// Named terrain recipes that need no data files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TerrainPreset {
    /// Plain traversable ground, nothing else.
    Open,
    /// Fenced field with scattered food.
    Meadow,
    /// Fenced, floored field with food and pushable rocks.
    Quarry,
}

impl TerrainPreset {
    pub fn builder(self, size: WorldSize, seed: u64) -> TerrainBuilder {
        let area = size.x.saturating_mul(size.y);
        let base = TerrainBuilder::new(size).with_seed(seed);
        match self {
            Self::Open => base,
            Self::Meadow => base.with_fence().with_food(area / 16),
            Self::Quarry => base
                .with_fence()
                .with_floor()
                .with_food(area / 24)
                .with_rocks(area / 12),
        }
    }
}
