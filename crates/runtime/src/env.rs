//! Gym-style environment facade over a [`WorldState`].
//!
//! [`SocialEnv`] owns the world and its configuration and drives turns
//! through a short-lived [`WorldEngine`]. Actors may join and leave between
//! turns; an episode boundary does not rebuild the world.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use world_content::{ContentFactory, TerrainPreset};
use world_core::{
    ActionSpec, ActorAction, ActorSpawn, ActorState, CellOccupant, EntityId, Grid, ObjectSpawn,
    Observation, ObservationSpec, Operations, Position, StepOutcome, WorldConfig, WorldEngine,
    WorldError, WorldState,
};

use crate::error::{Result, RuntimeError};

/// Per-turn result returned by [`SocialEnv::step`].
pub type StepResult = StepOutcome;

pub struct SocialEnv {
    config: WorldConfig,
    state: WorldState,
    closed: bool,
}

impl SocialEnv {
    pub fn new(config: WorldConfig, terrain: Grid<Operations>) -> Self {
        let mut state = WorldState::new(terrain, config.seed);
        state.rebuild_derived();
        tracing::debug!(
            size = ?state.size(),
            seed = config.seed,
            "created environment"
        );
        Self {
            config,
            state,
            closed: false,
        }
    }

    pub fn builder() -> SocialEnvBuilder {
        SocialEnvBuilder::new()
    }

    /// Starts an episode and returns every live actor's observation.
    ///
    /// Rewards are settled here, so the first step's reward measures the
    /// energy change since the reset.
    pub fn reset(&mut self) -> Result<BTreeMap<EntityId, Observation>> {
        self.ensure_open()?;
        let mut engine = self.engine();
        engine.settle_all();
        let observations = engine.observe_all();
        tracing::info!(
            tick = self.state.tick.0,
            actors = observations.len(),
            "environment reset"
        );
        Ok(observations)
    }

    /// Runs one turn.
    ///
    /// Rejected actions do not fail the call; they are logged and reported
    /// in the actor's info.
    pub fn step(&mut self, actions: &BTreeMap<EntityId, ActorAction>) -> Result<StepResult> {
        self.ensure_open()?;
        let outcome = self.engine().step(actions);

        for (id, info) in &outcome.infos {
            if let Some(error) = &info.rejected {
                tracing::warn!(actor = %id, %error, "action rejected");
            }
        }
        for (id, done) in &outcome.dones {
            if *done {
                tracing::info!(actor = %id, tick = outcome.tick.0, "actor exhausted");
            }
        }
        tracing::debug!(
            tick = outcome.tick.0,
            acted = actions.len(),
            alive = self.state.actors.len(),
            "turn complete"
        );
        Ok(outcome)
    }

    pub fn observation_space(&self, id: EntityId) -> Result<ObservationSpec> {
        let actor = self.actor(id)?;
        Ok(ObservationSpec::new(
            actor.vision,
            self.config.vocabulary_size,
        ))
    }

    pub fn action_space(&self, id: EntityId) -> Result<ActionSpec> {
        self.actor(id)?;
        Ok(ActionSpec::new(self.config.vocabulary_size))
    }

    pub fn add_actor(&mut self, spawn: ActorSpawn) -> Result<EntityId> {
        self.ensure_open()?;
        let id = self.engine().add_actor(spawn)?;
        tracing::debug!(actor = %id, position = %self.state.actors[&id].position(), "actor joined");
        Ok(id)
    }

    pub fn remove_actor(&mut self, id: EntityId) -> Result<ActorState> {
        self.ensure_open()?;
        let actor = self.engine().remove_actor(id)?;
        tracing::debug!(actor = %id, "actor left");
        Ok(actor)
    }

    pub fn add_object(&mut self, spawn: ObjectSpawn) -> Result<EntityId> {
        self.ensure_open()?;
        Ok(self.engine().add_object(spawn)?)
    }

    /// Ids of the live actors, ascending.
    pub fn actors(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.state.actors.keys().copied()
    }

    /// Releases the environment. Later mutating calls fail with
    /// [`RuntimeError::Closed`].
    pub fn close(&mut self) {
        if !self.closed {
            tracing::info!(tick = self.state.tick.0, "environment closed");
        }
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Plain-text dump of layer `z`, north row first.
    ///
    /// `A` actor, `S` signaling object, `o` object, `*` food, `r` pushable,
    /// `l` liftable, `#` solid, `.` open ground.
    pub fn render_text(&self, z: i32) -> String {
        let size = self.state.size();
        let mut out = String::with_capacity(((size.x + 1) * size.y) as usize);
        for y in (0..size.y as i32).rev() {
            for x in 0..size.x as i32 {
                let glyph = self
                    .state
                    .occupant_at(Position::new(x, y, z))
                    .map_or(' ', glyph);
                out.push(glyph);
            }
            out.push('\n');
        }
        let _ = write!(out, "tick {} actors {}", self.state.tick.0, self.state.actors.len());
        out
    }

    pub fn state(&self) -> &WorldState {
        &self.state
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    fn engine(&mut self) -> WorldEngine<'_> {
        WorldEngine::new(&mut self.state, &self.config)
    }

    fn actor(&self, id: EntityId) -> Result<&ActorState> {
        self.state
            .actors
            .get(&id)
            .ok_or(RuntimeError::World(WorldError::ActorNotFound { id }))
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(RuntimeError::Closed)
        } else {
            Ok(())
        }
    }
}

fn content_error(error: impl std::fmt::Display) -> RuntimeError {
    RuntimeError::Content(format!("{error:#}"))
}

fn glyph(occupant: CellOccupant) -> char {
    match occupant {
        CellOccupant::Actor(_) => 'A',
        CellOccupant::SignalingObject(_) => 'S',
        CellOccupant::Object(_) => 'o',
        CellOccupant::Empty => '.',
        CellOccupant::Terrain(ops) if ops.contains(Operations::EDIBLE) => '*',
        CellOccupant::Terrain(ops) if ops.contains(Operations::PUSH_OVER) => 'r',
        CellOccupant::Terrain(ops) if ops.contains(Operations::LIFTABLE) => 'l',
        CellOccupant::Terrain(ops) if ops.is_empty() => '#',
        CellOccupant::Terrain(_) => '.',
    }
}

/// Builder for [`SocialEnv`] from explicit parts, a preset or a content
/// directory.
#[derive(Default)]
pub struct SocialEnvBuilder {
    config: Option<WorldConfig>,
    terrain: Option<Grid<Operations>>,
    preset: Option<TerrainPreset>,
    content: Option<(ContentFactory, String)>,
}

impl SocialEnvBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: WorldConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn terrain(mut self, terrain: Grid<Operations>) -> Self {
        self.terrain = Some(terrain);
        self
    }

    pub fn preset(mut self, preset: TerrainPreset) -> Self {
        self.preset = Some(preset);
        self
    }

    /// Loads the config (unless one was given) and the named terrain layout
    /// from `factory`.
    pub fn content(mut self, factory: ContentFactory, terrain: impl Into<String>) -> Self {
        self.content = Some((factory, terrain.into()));
        self
    }

    pub fn build(self) -> Result<SocialEnv> {
        let (mut config, terrain) = match self.content {
            Some((factory, name)) => {
                let config = match self.config {
                    Some(config) => config,
                    None => factory.load_config().map_err(content_error)?,
                };
                let terrain = factory
                    .load_terrain(&name, &config)
                    .map_err(content_error)?;
                (config, terrain)
            }
            None => {
                let config = self.config.unwrap_or_default();
                let terrain = match self.terrain {
                    Some(terrain) => terrain,
                    None => self
                        .preset
                        .unwrap_or(TerrainPreset::Open)
                        .builder(config.size, config.seed)
                        .build(),
                };
                (config, terrain)
            }
        };

        if terrain.size() != config.size {
            tracing::warn!(
                configured = ?config.size,
                terrain = ?terrain.size(),
                "terrain size overrides configured size"
            );
            config.size = terrain.size();
        }
        Ok(SocialEnv::new(config, terrain))
    }
}
