use arrayvec::ArrayVec;

use super::{EntityId, Position, SignalState, SpatialState, StoredItem, Vec3};
use crate::config::{ActorDefaults, VisionSize, WorldConfig};
use crate::engine::WorldError;

/// Energy scale of the health curve `1 - exp(-energy / HEALTH_SCALE)`.
pub const HEALTH_SCALE: f64 = 50.0;

/// Energy delta scale of the per-turn reward `tanh(delta / REWARD_SCALE)`.
pub const REWARD_SCALE: f64 = 10.0;

pub type Storage = ArrayVec<StoredItem, { WorldConfig::MAX_STORAGE_SLOTS }>;

/// Mutable state of a single actor.
///
/// An actor is a spatial object that also signals, spends energy and carries
/// a bounded storage stack. It is alive while `energy > 0`; the engine removes
/// it as soon as that stops holding.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActorState {
    pub id: EntityId,
    pub spatial: SpatialState,
    pub signal: SignalState,
    pub energy: f64,
    /// Energy at the last reward settlement.
    pub previous_energy: f64,
    /// Heading in radians around the z axis. Unbounded.
    pub orientation: f64,
    pub storage: Storage,
    pub capacity: usize,
    pub max_forward_speed: f64,
    pub vision: VisionSize,
    pub last_reward: f64,
}

impl ActorState {
    pub fn new(id: EntityId, position: Position, defaults: &ActorDefaults) -> Self {
        Self {
            id,
            spatial: SpatialState::new(position, defaults.operations),
            signal: SignalState::default(),
            energy: defaults.initial_energy,
            previous_energy: defaults.initial_energy,
            orientation: 0.0,
            storage: ArrayVec::new(),
            capacity: defaults.storage_capacity.min(WorldConfig::MAX_STORAGE_SLOTS),
            max_forward_speed: defaults.max_forward_speed,
            vision: defaults.vision,
            last_reward: 0.0,
        }
    }

    pub fn with_energy(mut self, energy: f64) -> Self {
        self.energy = energy.max(0.0);
        self.previous_energy = self.energy;
        self
    }

    pub fn with_orientation(mut self, orientation: f64) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn is_alive(&self) -> bool {
        self.energy > 0.0
    }

    pub fn health(&self) -> f64 {
        1.0 - (-self.energy / HEALTH_SCALE).exp()
    }

    /// `1 + carried items`; slows movement and scales its cost.
    pub fn mass(&self) -> f64 {
        1.0 + self.storage.len() as f64
    }

    /// Removes energy, saturating at zero.
    pub fn spend(&mut self, amount: f64) {
        self.energy = (self.energy - amount).max(0.0);
    }

    pub fn gain(&mut self, amount: f64) {
        self.energy += amount;
    }

    /// Takes up to `amount` energy away and returns how much was dealt.
    pub fn attack(&mut self, amount: f64) -> f64 {
        let dealt = self.energy.min(amount.max(0.0));
        self.energy -= dealt;
        dealt
    }

    /// Reward since the previous settlement. Each energy change is counted once.
    pub fn settle_reward(&mut self) -> f64 {
        let reward = ((self.energy - self.previous_energy) / REWARD_SCALE).tanh();
        self.previous_energy = self.energy;
        self.last_reward = reward;
        reward
    }

    pub fn position(&self) -> Position {
        self.spatial.rounded_position()
    }

    /// Unit heading vector in the xy plane.
    pub fn direction(&self) -> Vec3 {
        Vec3::new(self.orientation.cos(), self.orientation.sin(), 0.0)
    }

    /// Single-cell offset the actor is facing.
    pub fn facing(&self) -> Position {
        self.direction().unit_step()
    }

    /// The cell right in front of the actor.
    pub fn ahead(&self) -> Position {
        self.position() + self.facing()
    }

    pub fn has_room(&self) -> bool {
        self.storage.len() < self.capacity
    }

    pub fn free_storage_fraction(&self) -> f64 {
        if self.capacity == 0 {
            return 0.0;
        }
        (self.capacity - self.storage.len()) as f64 / self.capacity as f64
    }

    pub fn store(&mut self, item: StoredItem) -> Result<(), WorldError> {
        if !self.has_room() {
            return Err(WorldError::StorageFull {
                actor: self.id,
                capacity: self.capacity,
            });
        }
        self.storage
            .try_push(item)
            .map_err(|_| WorldError::StorageFull {
                actor: self.id,
                capacity: self.capacity,
            })
    }

    /// Pops the most recently stored item.
    pub fn take_last(&mut self) -> Option<StoredItem> {
        self.storage.pop()
    }
}
