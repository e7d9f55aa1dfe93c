//! Turn orchestration and world bookkeeping.
//!
//! [`WorldEngine`] is the authoritative reducer for [`WorldState`]. A turn
//! applies every actor's action in ascending id order, removes actors whose
//! energy ran out as soon as it happens, applies gravity, rebuilds the derived
//! grids once and only then settles rewards and produces observations for
//! every actor that was alive when the turn started.
mod errors;
pub mod movement;

use std::collections::BTreeMap;

pub use errors::WorldError;
pub use movement::{MoveReport, Push, PushKind, try_move};

use crate::action::{ActionError, ActionReport, ActorAction, apply_action};
use crate::config::WorldConfig;
use crate::env::{PcgRng, RngOracle, compute_seed};
use crate::obs::{Observation, observe};
use crate::ops::Operations;
use crate::spaces::{ActionSpec, ObservationSpec};
use crate::state::{ActorState, EntityId, Position, Tick, WorldObject, WorldState};

static DEFAULT_RNG: PcgRng = PcgRng;

/// Per-actor diagnostics returned alongside each turn.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StepInfo {
    pub energy: f64,
    pub position: Position,
    /// `None` when the actor submitted no action this turn.
    pub report: Option<ActionReport>,
    /// Set when the submitted action was rejected.
    pub rejected: Option<ActionError>,
}

impl StepInfo {
    pub fn steps_moved(&self) -> u32 {
        self.report.as_ref().map_or(0, |r| r.movement.steps)
    }
}

/// The four per-actor maps produced by one turn, keyed by the actors alive at
/// the start of that turn.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StepOutcome {
    /// Tick the turn ran at.
    pub tick: Tick,
    pub observations: BTreeMap<EntityId, Observation>,
    pub rewards: BTreeMap<EntityId, f64>,
    pub dones: BTreeMap<EntityId, bool>,
    pub infos: BTreeMap<EntityId, StepInfo>,
}

/// Registration request for a new actor.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ActorSpawn {
    pub position: Option<Position>,
    pub orientation: f64,
    pub energy: Option<f64>,
}

impl ActorSpawn {
    /// Spawn at a uniformly sampled free cell.
    pub fn random() -> Self {
        Self::default()
    }

    pub fn at(position: Position) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    pub fn facing(mut self, orientation: f64) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_energy(mut self, energy: f64) -> Self {
        self.energy = Some(energy);
        self
    }
}

/// Registration request for a new moving object.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObjectSpawn {
    pub position: Option<Position>,
    pub operations: Operations,
    pub signal: Option<u16>,
}

impl ObjectSpawn {
    pub fn new(operations: Operations) -> Self {
        Self {
            position: None,
            operations,
            signal: None,
        }
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_signal(mut self, signal: u16) -> Self {
        self.signal = Some(signal);
        self
    }
}

/// World engine that applies turns and manages registration.
pub struct WorldEngine<'a> {
    state: &'a mut WorldState,
    config: &'a WorldConfig,
    rng: &'a dyn RngOracle,
}

impl<'a> WorldEngine<'a> {
    pub fn new(state: &'a mut WorldState, config: &'a WorldConfig) -> Self {
        Self::with_rng(state, config, &DEFAULT_RNG)
    }

    pub fn with_rng(
        state: &'a mut WorldState,
        config: &'a WorldConfig,
        rng: &'a dyn RngOracle,
    ) -> Self {
        Self { state, config, rng }
    }

    pub fn state(&self) -> &WorldState {
        self.state
    }

    /// Runs one full turn.
    ///
    /// Actions keyed by ids that were not alive at the start of the turn are
    /// ignored, as are actions of actors killed earlier in the same turn. An
    /// invalid action is reported in that actor's info; everyone else still
    /// acts.
    pub fn step(&mut self, actions: &BTreeMap<EntityId, ActorAction>) -> StepOutcome {
        let tick = self.state.tick;
        let frozen: Vec<EntityId> = self.state.actors.keys().copied().collect();
        let mut results: BTreeMap<EntityId, Result<ActionReport, ActionError>> = BTreeMap::new();
        let mut removed: BTreeMap<EntityId, ActorState> = BTreeMap::new();
        // actors registered with no energy leave before anyone acts
        self.remove_exhausted(&mut removed);

        for id in &frozen {
            let Some(action) = actions.get(id) else {
                continue;
            };
            if !self.state.actors.contains_key(id) {
                continue;
            }
            results.insert(*id, apply_action(self.state, *id, action, self.config));
            self.remove_exhausted(&mut removed);
        }

        self.apply_gravity();
        self.state.rebuild_derived();

        let mut outcome = StepOutcome {
            tick,
            ..StepOutcome::default()
        };
        for id in frozen {
            let alive = self.state.actors.contains_key(&id);
            let actor = if alive {
                self.state.actors.get_mut(&id)
            } else {
                removed.get_mut(&id)
            };
            let Some(actor) = actor else {
                continue;
            };
            let reward = actor.settle_reward();
            let (report, rejected) = match results.remove(&id) {
                Some(Ok(report)) => (Some(report), None),
                Some(Err(error)) => (None, Some(error)),
                None => (None, None),
            };
            let info = StepInfo {
                energy: actor.energy,
                position: actor.position(),
                report,
                rejected,
            };

            let actor = if alive {
                self.state.actors.get(&id)
            } else {
                removed.get(&id)
            };
            if let Some(actor) = actor {
                outcome.observations.insert(id, observe(self.state, actor));
            }
            outcome.rewards.insert(id, reward);
            outcome.dones.insert(id, !alive);
            outcome.infos.insert(id, info);
        }

        self.state.tick = tick.next();
        outcome
    }

    /// Observations of every live actor against the current derived grids.
    pub fn observe_all(&self) -> BTreeMap<EntityId, Observation> {
        self.state
            .actors
            .iter()
            .map(|(id, actor)| (*id, observe(self.state, actor)))
            .collect()
    }

    /// Settles every live actor's reward so the next turn's rewards start
    /// from the current energy levels.
    pub fn settle_all(&mut self) {
        for actor in self.state.actors.values_mut() {
            actor.settle_reward();
        }
    }

    pub fn add_actor(&mut self, spawn: ActorSpawn) -> Result<EntityId, WorldError> {
        let position = self.spawn_position(spawn.position)?;
        let id = self.state.allocate_entity_id();
        let mut actor =
            ActorState::new(id, position, &self.config.actor).with_orientation(spawn.orientation);
        if let Some(energy) = spawn.energy {
            actor = actor.with_energy(energy);
        }
        self.state.actors.insert(id, actor);
        self.state.rebuild_derived();
        Ok(id)
    }

    pub fn add_object(&mut self, spawn: ObjectSpawn) -> Result<EntityId, WorldError> {
        let position = self.spawn_position(spawn.position)?;
        let id = self.state.allocate_entity_id();
        let mut object = WorldObject::new(id, position, spawn.operations);
        if let Some(signal) = spawn.signal {
            object = object.with_signal(signal);
        }
        self.state.objects.insert(id, object);
        self.state.rebuild_derived();
        Ok(id)
    }

    pub fn remove_actor(&mut self, id: EntityId) -> Result<ActorState, WorldError> {
        let actor = self
            .state
            .actors
            .remove(&id)
            .ok_or(WorldError::ActorNotFound { id })?;
        self.state.rebuild_derived();
        Ok(actor)
    }

    pub fn remove_object(&mut self, id: EntityId) -> Result<WorldObject, WorldError> {
        let object = self
            .state
            .objects
            .remove(&id)
            .ok_or(WorldError::ObjectNotFound { id })?;
        self.state.rebuild_derived();
        Ok(object)
    }

    /// Samples a traversable cell uniformly, giving up after the configured
    /// number of attempts.
    pub fn random_available_location(&self) -> Result<Position, WorldError> {
        let size = self.state.size();
        let attempts = self.config.spawn_attempts;
        if size.volume() == 0 {
            return Err(WorldError::NoAvailableLocation { attempts: 0 });
        }
        let entity = self.state.peek_entity_id().0;

        for attempt in 0..attempts {
            let seed_for = |axis: u32| {
                compute_seed(
                    self.state.seed,
                    self.state.tick.0,
                    entity,
                    attempt.wrapping_mul(3).wrapping_add(axis),
                )
            };
            let position = Position::new(
                self.rng.range(seed_for(0), 0, size.x - 1) as i32,
                self.rng.range(seed_for(1), 0, size.y - 1) as i32,
                self.rng.range(seed_for(2), 0, size.z - 1) as i32,
            );
            if self.state.is_traversable(position) {
                return Ok(position);
            }
        }
        Err(WorldError::NoAvailableLocation { attempts })
    }

    /// Observation and action spaces of a live actor.
    pub fn specs(&self, id: EntityId) -> Result<(ObservationSpec, ActionSpec), WorldError> {
        let actor = self
            .state
            .actors
            .get(&id)
            .ok_or(WorldError::ActorNotFound { id })?;
        Ok((
            ObservationSpec::new(actor.vision, self.config.vocabulary_size),
            ActionSpec::new(self.config.vocabulary_size),
        ))
    }

    fn spawn_position(&self, requested: Option<Position>) -> Result<Position, WorldError> {
        let Some(position) = requested else {
            return self.random_available_location();
        };
        if !self.state.size().contains(position) {
            return Err(WorldError::OutOfBounds { position });
        }
        if !self.state.is_traversable(position) {
            return Err(WorldError::SpawnBlocked { position });
        }
        Ok(position)
    }

    fn remove_exhausted(&mut self, removed: &mut BTreeMap<EntityId, ActorState>) {
        let exhausted: Vec<EntityId> = self
            .state
            .actors
            .values()
            .filter(|actor| !actor.is_alive())
            .map(|actor| actor.id)
            .collect();
        for id in exhausted {
            if let Some(actor) = self.state.actors.remove(&id) {
                removed.insert(id, actor);
            }
        }
    }

    /// Moves every live actor, then every object, by the configured gravity.
    fn apply_gravity(&mut self) {
        let gravity = self.config.gravity;
        let movers: Vec<EntityId> = self
            .state
            .actors
            .keys()
            .chain(self.state.objects.keys())
            .copied()
            .collect();
        for id in movers {
            // every id was just read from the registries, so the lookup cannot fail
            let _ = try_move(self.state, id, gravity);
        }
    }
}
