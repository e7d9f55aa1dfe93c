use super::{EntityId, Position, Vec3};
use crate::ops::Operations;

/// Physical part of anything that moves through the grid.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpatialState {
    pub position: Vec3,
    /// Fractional travel carried between moves, always in `[0, 1)`.
    pub remainder: f64,
    pub operations: Operations,
}

impl SpatialState {
    pub fn new(position: Position, operations: Operations) -> Self {
        Self {
            position: Vec3::from_position(position),
            remainder: 0.0,
            operations,
        }
    }

    pub fn rounded_position(&self) -> Position {
        self.position.round()
    }

    pub fn place_at(&mut self, position: Position) {
        self.position = Vec3::from_position(position);
    }
}

/// Symbol currently broadcast by a signaling entity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SignalState {
    pub signal: u16,
}

impl SignalState {
    pub const fn new(signal: u16) -> Self {
        Self { signal }
    }

    pub fn set_signal(&mut self, signal: u16) {
        self.signal = signal;
    }
}

/// Non-actor moving object. Carries a signal when it acts as a beacon.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldObject {
    pub id: EntityId,
    pub spatial: SpatialState,
    pub signal: Option<SignalState>,
}

impl WorldObject {
    pub fn new(id: EntityId, position: Position, operations: Operations) -> Self {
        Self {
            id,
            spatial: SpatialState::new(position, operations),
            signal: None,
        }
    }

    pub fn with_signal(mut self, signal: u16) -> Self {
        self.signal = Some(SignalState::new(signal));
        self
    }

    pub fn is_signaling(&self) -> bool {
        self.signal.is_some()
    }

    pub fn operations(&self) -> Operations {
        self.spatial.operations
    }
}

/// Something an actor carries in storage.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StoredItem {
    /// Content lifted out of a terrain cell.
    Terrain(Operations),
    /// A whole object, removed from the world while carried.
    Object(WorldObject),
}

impl StoredItem {
    pub fn operations(&self) -> Operations {
        match self {
            Self::Terrain(ops) => *ops,
            Self::Object(object) => object.operations(),
        }
    }
}

/// What a cell visibly holds, resolved with priority
/// `Actor > SignalingObject > Object > Terrain/Empty`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellOccupant {
    /// Plain traversable terrain and no mover.
    Empty,
    Terrain(Operations),
    Object(EntityId),
    SignalingObject(EntityId),
    Actor(EntityId),
}

impl CellOccupant {
    /// Id of the moving entity in the cell, if any.
    pub fn entity(&self) -> Option<EntityId> {
        match self {
            Self::Actor(id) | Self::SignalingObject(id) | Self::Object(id) => Some(*id),
            Self::Empty | Self::Terrain(_) => None,
        }
    }
}
