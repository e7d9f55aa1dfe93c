//! Agents bind an [`Algorithm`] instance to one actor of the world.

use std::collections::BTreeMap;
use std::path::Path;

use world_core::{ActorAction, ActorSpawn, EntityId, Observation};

use crate::algorithm::{Algorithm, AlgorithmFactory};
use crate::env::SocialEnv;
use crate::error::{Result, RuntimeError};
use crate::experience::Trajectory;

pub struct Agent {
    id: EntityId,
    algorithm: Box<dyn Algorithm>,
}

impl Agent {
    pub fn new(id: EntityId, algorithm: Box<dyn Algorithm>) -> Self {
        Self { id, algorithm }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn act(&mut self, observation: &Observation) -> ActorAction {
        self.algorithm.act(observation)
    }

    /// Trains on `trajectory`, which must belong to this agent.
    pub fn train(&mut self, trajectory: &Trajectory) -> Result<()> {
        if trajectory.agent != self.id {
            return Err(RuntimeError::Algorithm(format!(
                "agent {} handed trajectory of {}",
                self.id, trajectory.agent
            )));
        }
        self.algorithm.train(trajectory)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.algorithm.save(path)
    }

    pub fn restore(&mut self, path: &Path) -> Result<()> {
        self.algorithm.restore(path)
    }

    pub fn algorithm(&self) -> &dyn Algorithm {
        self.algorithm.as_ref()
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("id", &self.id)
            .field("algorithm", &self.algorithm.name())
            .finish()
    }
}

/// Registry of agents keyed by actor id.
#[derive(Debug, Default)]
pub struct Agents {
    agents: BTreeMap<EntityId, Agent>,
}

impl Agents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, agent: Agent) -> Result<()> {
        let id = agent.id();
        if self.agents.contains_key(&id) {
            return Err(RuntimeError::DuplicateAgent { id });
        }
        self.agents.insert(id, agent);
        Ok(())
    }

    pub fn remove(&mut self, id: EntityId) -> Result<Agent> {
        self.agents
            .remove(&id)
            .ok_or(RuntimeError::UnknownAgent { id })
    }

    pub fn get(&self, id: EntityId) -> Option<&Agent> {
        self.agents.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Agent> {
        self.agents.get_mut(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.agents.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Asks each agent with an observation for its action. Observations
    /// without an agent are left alone; those actors do nothing this turn.
    pub fn act(
        &mut self,
        observations: &BTreeMap<EntityId, Observation>,
    ) -> BTreeMap<EntityId, ActorAction> {
        observations
            .iter()
            .filter_map(|(id, observation)| {
                let agent = self.agents.get_mut(id)?;
                Some((*id, agent.act(observation)))
            })
            .collect()
    }

    /// Drops agents whose actors are gone from `env`.
    pub fn retain_live(&mut self, env: &SocialEnv) -> Vec<EntityId> {
        let live: Vec<EntityId> = env.actors().collect();
        let gone: Vec<EntityId> = self
            .agents
            .keys()
            .filter(|&&id| live.binary_search(&id).is_err())
            .copied()
            .collect();
        for id in &gone {
            self.agents.remove(id);
            tracing::debug!(agent = %id, "agent retired");
        }
        gone
    }
}

/// Spawns actors and builds their algorithms with one factory.
pub struct Zoo<F> {
    factory: F,
}

impl<F: AlgorithmFactory> Zoo<F> {
    pub fn new(factory: F) -> Self {
        Self { factory }
    }

    /// Adds an actor to `env` and builds its agent from the actor's spaces.
    pub fn spawn(&self, env: &mut SocialEnv, spawn: ActorSpawn) -> Result<Agent> {
        let id = env.add_actor(spawn)?;
        let observation = env.observation_space(id)?;
        let action = env.action_space(id)?;
        let algorithm = self.factory.build(&observation, &action);
        tracing::debug!(agent = %id, algorithm = algorithm.name(), "agent spawned");
        Ok(Agent::new(id, algorithm))
    }

    /// Spawns `count` agents at random locations into `agents`.
    pub fn populate(
        &self,
        env: &mut SocialEnv,
        agents: &mut Agents,
        count: usize,
    ) -> Result<Vec<EntityId>> {
        let mut ids = Vec::with_capacity(count);
        for _ in 0..count {
            let agent = self.spawn(env, ActorSpawn::random())?;
            ids.push(agent.id());
            agents.insert(agent)?;
        }
        tracing::info!(spawned = ids.len(), total = agents.len(), "populated world");
        Ok(ids)
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }
}
