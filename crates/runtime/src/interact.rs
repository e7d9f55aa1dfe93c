//! The act/step loop, training hand-off and episode summaries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use world_core::EntityId;

use crate::agent::Agents;
use crate::env::SocialEnv;
use crate::error::Result;
use crate::experience::{Episode, ExperienceRecorder};

/// Runs up to `duration` turns and returns the recorded episode.
///
/// Agents whose actors die stop acting but stay registered, so [`train`] can
/// still hand them their final transition; call [`Agents::retain_live`]
/// afterwards to drop them. The loop ends early once no actor is left alive.
pub fn interact(env: &mut SocialEnv, agents: &mut Agents, duration: usize) -> Result<Episode> {
    let mut recorder = ExperienceRecorder::new(env);
    let mut observations = recorder.reset()?;

    for _ in 0..duration {
        if recorder.env().state().actors.is_empty() {
            tracing::debug!("no live actors, ending episode early");
            break;
        }
        let actions = agents.act(&observations);
        let outcome = recorder.step(&actions)?;

        for (id, done) in &outcome.dones {
            if *done {
                tracing::debug!(agent = %id, "agent's actor died");
            }
        }
        observations = outcome
            .observations
            .into_iter()
            .filter(|(id, _)| !outcome.dones.get(id).copied().unwrap_or(false))
            .collect();
    }

    let episode = recorder.finish();
    EpisodeReport::from_episode(&episode).log();
    Ok(episode)
}

/// Hands every agent its own trajectory from `episode`.
///
/// Trajectories of agents no longer registered are skipped.
pub fn train(episode: &Episode, agents: &mut Agents) -> Result<()> {
    for (id, trajectory) in episode.trajectories() {
        let Some(agent) = agents.get_mut(id) else {
            tracing::debug!(agent = %id, "skipping trajectory of retired agent");
            continue;
        };
        agent.train(&trajectory)?;
        tracing::debug!(
            agent = %id,
            transitions = trajectory.len(),
            reward = trajectory.total_reward(),
            "trained"
        );
    }
    Ok(())
}

/// Summary statistics of one episode.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EpisodeReport {
    pub steps: usize,
    pub agents: usize,
    /// Mean reward over every recorded agent step.
    pub mean_reward: f64,
    pub total_reward: f64,
    pub deaths: usize,
    pub per_agent: BTreeMap<EntityId, f64>,
}

impl EpisodeReport {
    pub fn from_episode(episode: &Episode) -> Self {
        let trajectories = episode.trajectories();
        let transitions: usize = trajectories.values().map(|t| t.len()).sum();
        let per_agent: BTreeMap<EntityId, f64> = trajectories
            .iter()
            .map(|(id, t)| (*id, t.total_reward()))
            .collect();
        let total_reward: f64 = per_agent.values().sum();
        let deaths = episode
            .frames
            .iter()
            .flat_map(|f| f.dones.values())
            .filter(|done| **done)
            .count();

        Self {
            steps: episode.steps(),
            agents: trajectories.len(),
            mean_reward: if transitions == 0 {
                0.0
            } else {
                total_reward / transitions as f64
            },
            total_reward,
            deaths,
            per_agent,
        }
    }

    pub fn log(&self) {
        tracing::info!(
            steps = self.steps,
            agents = self.agents,
            mean_reward = self.mean_reward,
            total_reward = self.total_reward,
            deaths = self.deaths,
            "episode finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::path::Path;
    use std::rc::Rc;

    use super::*;
    use crate::agent::{Agent, Zoo};
    use crate::algorithm::{Algorithm, ScriptedAlgorithm};
    use crate::experience::Trajectory;
    use world_core::{
        ActionSpec, ActorAction, ActorSpawn, Grid, ObservationSpec, Operations, Position,
        WorldConfig, WorldSize,
    };

    fn env() -> SocialEnv {
        let size = WorldSize::new(8, 8, 1);
        SocialEnv::new(
            WorldConfig::new().with_size(size).with_seed(21),
            Grid::filled(size, Operations::TRAVERSABLE),
        )
    }

    fn resting(_: &ObservationSpec, _: &ActionSpec) -> Box<dyn Algorithm> {
        Box::new(ScriptedAlgorithm::repeat(ActorAction::idle()))
    }

    #[test]
    fn episode_runs_for_the_requested_duration() {
        let mut env = env();
        let mut agents = Agents::new();
        Zoo::new(resting).populate(&mut env, &mut agents, 2).unwrap();

        let episode = interact(&mut env, &mut agents, 5).unwrap();
        assert_eq!(episode.steps(), 5);
        assert_eq!(episode.frames.len(), 6);

        let report = EpisodeReport::from_episode(&episode);
        assert_eq!(report.agents, 2);
        assert_eq!(report.deaths, 0);
        assert!(report.mean_reward < 0.0);
    }

    #[test]
    fn episode_ends_when_everyone_died() {
        let mut env = env();
        let mut agents = Agents::new();
        let zoo = Zoo::new(resting);
        let agent = zoo
            .spawn(
                &mut env,
                ActorSpawn::at(Position::new(3, 3, 0)).with_energy(0.1),
            )
            .unwrap();
        agents.insert(agent).unwrap();

        let episode = interact(&mut env, &mut agents, 10).unwrap();
        assert_eq!(episode.steps(), 1);
        assert_eq!(agents.len(), 1);
        assert_eq!(EpisodeReport::from_episode(&episode).deaths, 1);

        train(&episode, &mut agents).unwrap();
        assert_eq!(agents.retain_live(&env).len(), 1);
        assert!(agents.is_empty());
    }

    struct Counting(Rc<Cell<usize>>);

    impl Algorithm for Counting {
        fn act(&mut self, _observation: &world_core::Observation) -> ActorAction {
            ActorAction::idle()
        }

        fn train(&mut self, trajectory: &Trajectory) -> Result<()> {
            self.0.set(self.0.get() + trajectory.len());
            Ok(())
        }

        fn save(&self, _path: &Path) -> Result<()> {
            Ok(())
        }

        fn restore(&mut self, _path: &Path) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn dead_agents_are_trained_on_their_last_transition() {
        let mut env = env();
        let mut agents = Agents::new();
        let trained = Rc::new(Cell::new(0));
        let id = env
            .add_actor(ActorSpawn::at(Position::new(3, 3, 0)).with_energy(0.1))
            .unwrap();
        agents
            .insert(Agent::new(id, Box::new(Counting(trained.clone()))))
            .unwrap();

        let episode = interact(&mut env, &mut agents, 5).unwrap();
        let trajectory = &episode.trajectories()[&id];
        assert!(trajectory.ended_in_death());

        train(&episode, &mut agents).unwrap();
        assert_eq!(trained.get(), 1);
    }

    #[test]
    fn training_reaches_every_registered_agent() {
        let mut env = env();
        let mut agents = Agents::new();
        let id = env.add_actor(ActorSpawn::at(Position::new(2, 2, 0))).unwrap();
        agents
            .insert(Agent::new(
                id,
                Box::new(ScriptedAlgorithm::repeat(ActorAction::idle())),
            ))
            .unwrap();

        let episode = interact(&mut env, &mut agents, 4).unwrap();
        train(&episode, &mut agents).unwrap();

        let report = EpisodeReport::from_episode(&episode);
        assert_eq!(report.per_agent.len(), 1);
        assert!(report.total_reward < 0.0);
    }
}
