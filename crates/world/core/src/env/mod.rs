//! Deterministic environment helpers: the RNG oracle and terrain generation.
pub mod rng;
pub mod terrain;

pub use rng::{PcgRng, RngOracle, compute_seed};
pub use terrain::TerrainBuilder;
