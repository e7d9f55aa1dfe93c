use crate::ops::Operations;
use crate::state::{Vec3, WorldSize};

/// World configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WorldConfig {
    /// Extents of the grid. Immutable once the world exists.
    pub size: WorldSize,
    /// Displacement applied to every actor and object after the action phase.
    pub gravity: Vec3,
    /// Number of distinct signal symbols; signals must be `< vocabulary_size`.
    pub vocabulary_size: u32,
    /// Attempts made by random spawn sampling before giving up.
    pub spawn_attempts: u32,
    /// Base seed for every deterministic draw in the world.
    pub seed: u64,
    pub energy: EnergyRules,
    pub actor: ActorDefaults,
}

impl WorldConfig {
    // ===== compile-time constants used as type parameters =====
    pub const MAX_STORAGE_SLOTS: usize = 8;
    /// Signals are `u16`, so every symbol must fit one.
    pub const MAX_VOCABULARY_SIZE: u32 = u16::MAX as u32 + 1;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_SIZE: WorldSize = WorldSize::new(16, 16, 4);
    pub const DEFAULT_GRAVITY: Vec3 = Vec3::new(0.0, 0.0, -1.0);
    pub const DEFAULT_VOCABULARY_SIZE: u32 = 1024;
    pub const DEFAULT_SPAWN_ATTEMPTS: u32 = 10_000;

    pub fn new() -> Self {
        Self {
            size: Self::DEFAULT_SIZE,
            gravity: Self::DEFAULT_GRAVITY,
            vocabulary_size: Self::DEFAULT_VOCABULARY_SIZE,
            spawn_attempts: Self::DEFAULT_SPAWN_ATTEMPTS,
            seed: 0,
            energy: EnergyRules::default(),
            actor: ActorDefaults::default(),
        }
    }

    pub fn with_size(mut self, size: WorldSize) -> Self {
        self.size = size;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = gravity;
        self
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Energy bookkeeping for every actor operation.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EnergyRules {
    /// Paid at the end of every action, whatever the action did.
    pub resting_energy_rate: f64,
    pub food_energy: f64,
    pub eating_cost: f64,
    /// Multiplied by `|delta|_2 * mass` of the forward move.
    pub moving_energy_cost: f64,
    pub pickup_cost: f64,
    pub failed_pickup_penalty: f64,
    pub place_cost: f64,
    pub failed_place_penalty: f64,
    pub attack_damage: f64,
    /// Share of the damage dealt that the attacker absorbs.
    pub attack_gain_fraction: f64,
    pub attacking_cost: f64,
}

impl EnergyRules {
    pub const RESTING_ENERGY_RATE: f64 = 0.2;
    pub const FOOD_ENERGY: f64 = 10.0;
    pub const EATING_COST: f64 = 0.5;
    pub const MOVING_ENERGY_COST: f64 = 1.0;
    pub const PICKUP_COST: f64 = 0.1;
    pub const FAILED_PICKUP_PENALTY: f64 = 0.5;
    pub const PLACE_COST: f64 = 0.1;
    pub const FAILED_PLACE_PENALTY: f64 = 0.5;
    pub const ATTACK_DAMAGE: f64 = 5.0;
    pub const ATTACK_GAIN_FRACTION: f64 = 0.5;
    pub const ATTACKING_COST: f64 = 1.0;
}

impl Default for EnergyRules {
    fn default() -> Self {
        Self {
            resting_energy_rate: Self::RESTING_ENERGY_RATE,
            food_energy: Self::FOOD_ENERGY,
            eating_cost: Self::EATING_COST,
            moving_energy_cost: Self::MOVING_ENERGY_COST,
            pickup_cost: Self::PICKUP_COST,
            failed_pickup_penalty: Self::FAILED_PICKUP_PENALTY,
            place_cost: Self::PLACE_COST,
            failed_place_penalty: Self::FAILED_PLACE_PENALTY,
            attack_damage: Self::ATTACK_DAMAGE,
            attack_gain_fraction: Self::ATTACK_GAIN_FRACTION,
            attacking_cost: Self::ATTACKING_COST,
        }
    }
}

/// Parameters given to every newly registered actor.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ActorDefaults {
    pub initial_energy: f64,
    pub max_forward_speed: f64,
    /// Clamped to [`WorldConfig::MAX_STORAGE_SLOTS`].
    pub storage_capacity: usize,
    pub vision: VisionSize,
    /// What other movers see when they run into an actor.
    pub operations: Operations,
}

impl Default for ActorDefaults {
    fn default() -> Self {
        Self {
            initial_energy: 100.0,
            max_forward_speed: 1.0,
            storage_capacity: 3,
            vision: VisionSize::default(),
            operations: Operations::LIFTABLE | Operations::PUSH_OVER,
        }
    }
}

/// Egocentric view extents: `2 * half_width` cells across, `depth` cells
/// forward and `2 * half_height` cells vertically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VisionSize {
    pub half_width: u32,
    pub depth: u32,
    pub half_height: u32,
}

impl VisionSize {
    pub const fn new(half_width: u32, depth: u32, half_height: u32) -> Self {
        Self {
            half_width,
            depth,
            half_height,
        }
    }

    /// `[across, forward, vertical]` extents of the flattened window.
    pub const fn shape(&self) -> [usize; 3] {
        [
            2 * self.half_width as usize,
            self.depth as usize,
            2 * self.half_height as usize,
        ]
    }

    pub const fn cells(&self) -> usize {
        let [u, v, w] = self.shape();
        u * v * w
    }
}

impl Default for VisionSize {
    fn default() -> Self {
        Self::new(5, 8, 1)
    }
}
