//! Episode recording.
//!
//! An [`Episode`] is a list of [`Frame`]s. Each frame holds the observations
//! an agent acted on and, once the turn ran, the actions taken and what they
//! earned. The last frame of a finished episode only carries observations.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use world_core::{ActorAction, EntityId, Observation, StepInfo};

use crate::env::{SocialEnv, StepResult};
use crate::error::{Result, RuntimeError};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub observations: BTreeMap<EntityId, Observation>,
    pub actions: BTreeMap<EntityId, ActorAction>,
    pub rewards: BTreeMap<EntityId, f64>,
    pub dones: BTreeMap<EntityId, bool>,
    pub infos: BTreeMap<EntityId, StepInfo>,
}

impl Frame {
    fn opening(observations: BTreeMap<EntityId, Observation>) -> Self {
        Self {
            observations,
            ..Self::default()
        }
    }

    /// Whether the turn following these observations has been recorded.
    pub fn is_closed(&self) -> bool {
        !self.rewards.is_empty() || !self.actions.is_empty()
    }
}

/// One agent's step: what it saw, did and got.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub observation: Observation,
    pub action: ActorAction,
    pub reward: f64,
    pub done: bool,
    pub next_observation: Option<Observation>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub agent: EntityId,
    pub transitions: Vec<Transition>,
}

impl Trajectory {
    pub fn total_reward(&self) -> f64 {
        self.transitions.iter().map(|t| t.reward).sum()
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn ended_in_death(&self) -> bool {
        self.transitions.last().is_some_and(|t| t.done)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub frames: Vec<Frame>,
}

impl Episode {
    /// Number of recorded turns.
    pub fn steps(&self) -> usize {
        self.frames.iter().filter(|f| f.is_closed()).count()
    }

    /// Splits the episode per agent.
    ///
    /// A frame contributes to an agent only if the agent was observed in it
    /// and acted in the turn that followed; frames before it joined or after
    /// it left are skipped.
    pub fn trajectories(&self) -> BTreeMap<EntityId, Trajectory> {
        let mut out: BTreeMap<EntityId, Trajectory> = BTreeMap::new();
        for (index, frame) in self.frames.iter().enumerate() {
            let next = self.frames.get(index + 1);
            for (id, observation) in &frame.observations {
                let (Some(action), Some(reward)) = (frame.actions.get(id), frame.rewards.get(id))
                else {
                    continue;
                };
                let transition = Transition {
                    observation: observation.clone(),
                    action: *action,
                    reward: *reward,
                    done: frame.dones.get(id).copied().unwrap_or(false),
                    next_observation: next.and_then(|n| n.observations.get(id).cloned()),
                };
                out.entry(*id)
                    .or_insert_with(|| Trajectory {
                        agent: *id,
                        transitions: Vec::new(),
                    })
                    .transitions
                    .push(transition);
            }
        }
        out
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| RuntimeError::io(path, e))?;
        tracing::debug!(path = %path.display(), frames = self.frames.len(), "saved episode");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|e| RuntimeError::io(path, e))?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Wraps a [`SocialEnv`] and records every reset and step into an
/// [`Episode`].
pub struct ExperienceRecorder<'e> {
    env: &'e mut SocialEnv,
    episode: Episode,
}

impl<'e> ExperienceRecorder<'e> {
    pub fn new(env: &'e mut SocialEnv) -> Self {
        Self {
            env,
            episode: Episode::default(),
        }
    }

    /// Resets the environment and starts a fresh episode.
    pub fn reset(&mut self) -> Result<BTreeMap<EntityId, Observation>> {
        let observations = self.env.reset()?;
        self.episode = Episode {
            frames: vec![Frame::opening(observations.clone())],
        };
        Ok(observations)
    }

    /// Steps the environment, closing the current frame and opening the next
    /// with the post-turn observations.
    pub fn step(&mut self, actions: &BTreeMap<EntityId, ActorAction>) -> Result<StepResult> {
        if self.episode.frames.is_empty() {
            self.reset()?;
        }
        let outcome = self.env.step(actions)?;

        if let Some(frame) = self.episode.frames.last_mut() {
            frame.actions = actions
                .iter()
                .filter(|(id, _)| outcome.infos.contains_key(*id))
                .map(|(id, action)| (*id, *action))
                .collect();
            frame.rewards = outcome.rewards.clone();
            frame.dones = outcome.dones.clone();
            frame.infos = outcome.infos.clone();
        }
        self.episode
            .frames
            .push(Frame::opening(outcome.observations.clone()));
        Ok(outcome)
    }

    /// Observations of the still-open frame.
    pub fn current_observations(&self) -> Option<&BTreeMap<EntityId, Observation>> {
        self.episode.frames.last().map(|f| &f.observations)
    }

    pub fn env(&self) -> &SocialEnv {
        self.env
    }

    pub fn episode(&self) -> &Episode {
        &self.episode
    }

    pub fn finish(self) -> Episode {
        self.episode
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use world_core::{ActorSpawn, Grid, Operations, Position, WorldConfig, WorldSize};

    fn env() -> SocialEnv {
        let size = WorldSize::new(6, 6, 1);
        SocialEnv::new(
            WorldConfig::new().with_size(size),
            Grid::filled(size, Operations::TRAVERSABLE),
        )
    }

    #[test]
    fn late_joiner_trajectory_starts_at_its_first_frame() {
        let mut env = env();
        let first = env.add_actor(ActorSpawn::at(Position::new(1, 1, 0))).unwrap();

        let mut recorder = ExperienceRecorder::new(&mut env);
        recorder.reset().unwrap();
        recorder
            .step(&BTreeMap::from([(first, ActorAction::idle())]))
            .unwrap();

        let second = recorder
            .env
            .add_actor(ActorSpawn::at(Position::new(4, 4, 0)))
            .unwrap();
        let actions = BTreeMap::from([(first, ActorAction::idle()), (second, ActorAction::idle())]);
        recorder.step(&actions).unwrap();
        let episode = recorder.finish();

        assert_eq!(episode.frames.len(), 3);
        assert_eq!(episode.steps(), 2);
        let trajectories = episode.trajectories();
        assert_eq!(trajectories[&first].len(), 2);
        // the second actor was absent from the frame the second turn acted on
        assert!(!trajectories.contains_key(&second));
    }

    #[test]
    fn death_ends_the_trajectory() {
        let mut env = env();
        let id = env
            .add_actor(ActorSpawn::at(Position::new(2, 2, 0)).with_energy(0.1))
            .unwrap();

        let mut recorder = ExperienceRecorder::new(&mut env);
        recorder.reset().unwrap();
        let actions = BTreeMap::from([(id, ActorAction::idle())]);
        recorder.step(&actions).unwrap();
        recorder.step(&actions).unwrap();
        let episode = recorder.finish();

        let trajectory = &episode.trajectories()[&id];
        assert_eq!(trajectory.len(), 1);
        assert!(trajectory.ended_in_death());
        assert!(trajectory.transitions[0].next_observation.is_some());
        assert!(trajectory.total_reward() < 0.0);
    }
}
