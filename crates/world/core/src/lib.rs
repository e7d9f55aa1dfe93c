//! Deterministic simulation kernel for the social grid world.
//!
//! `world-core` owns the canonical rules: operation flags, the terrain and
//! derived grids, movement resolution with pushes, the per-actor action state
//! machine and the turn protocol that produces simultaneous observations,
//! rewards and done flags. All mutation during a turn flows through
//! [`engine::WorldEngine`]; the crate performs no I/O and no logging so a fixed
//! seed always reproduces the same run.
pub mod action;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod obs;
pub mod ops;
pub mod spaces;
pub mod state;

pub use action::{
    ActionError, ActionReport, ActorAction, EatOutcome, PickOutcome, PlaceOutcome, apply_action,
};
pub use config::{ActorDefaults, EnergyRules, VisionSize, WorldConfig};
pub use engine::{
    ActorSpawn, MoveReport, ObjectSpawn, Push, PushKind, StepInfo, StepOutcome, WorldEngine,
    WorldError, try_move,
};
pub use env::{PcgRng, RngOracle, TerrainBuilder, compute_seed};
pub use error::{ErrorSeverity, SimError};
pub use obs::{Observation, observe};
pub use ops::{Capability, CapabilityError, Operations};
pub use spaces::{ActionSpec, ObservationSpec, Space};
pub use state::{
    ActorState, CellOccupant, EntityId, Grid, Position, SignalState, SpatialState, StoredItem,
    Tick, Vec3, WorldObject, WorldSize, WorldState,
};

#[cfg(feature = "serde")]
pub use state::state_root;
