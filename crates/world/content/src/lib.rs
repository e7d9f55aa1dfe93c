//! Data-driven world content and loaders.
//!
//! This crate houses static world content and provides loaders for TOML/RON
//! data files:
//! - Built-in terrain presets (code-defined)
//! - World configuration (data-driven via TOML)
//! - Terrain layouts (data-driven via RON)
//!
//! Content is consumed when a world is created and never appears in world
//! state beyond the terrain grid it produces.

pub mod presets;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use presets::TerrainPreset;

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, ContentFactory, LoadResult, TerrainLayout, TerrainLoader};
