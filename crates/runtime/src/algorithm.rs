//! Learning-algorithm boundary.
//!
//! Algorithms are built in two phases: a factory is configured up front and
//! then asked for one instance per actor once that actor's spaces are known.

use std::cell::Cell;
use std::fs;
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use world_core::{ActionSpec, ActorAction, Observation, ObservationSpec, WorldConfig};

use crate::error::{Result, RuntimeError};
use crate::experience::Trajectory;

/// A policy that can act, learn from its own trajectory and persist itself.
pub trait Algorithm {
    fn act(&mut self, observation: &Observation) -> ActorAction;

    fn train(&mut self, trajectory: &Trajectory) -> Result<()>;

    fn save(&self, path: &Path) -> Result<()>;

    fn restore(&mut self, path: &Path) -> Result<()>;

    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Builds one [`Algorithm`] per actor.
pub trait AlgorithmFactory {
    fn build(&self, observation: &ObservationSpec, action: &ActionSpec) -> Box<dyn Algorithm>;
}

impl<F> AlgorithmFactory for F
where
    F: Fn(&ObservationSpec, &ActionSpec) -> Box<dyn Algorithm>,
{
    fn build(&self, observation: &ObservationSpec, action: &ActionSpec) -> Box<dyn Algorithm> {
        self(observation, action)
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).map_err(|e| RuntimeError::io(path, e))
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let json = fs::read_to_string(path).map_err(|e| RuntimeError::io(path, e))?;
    Ok(serde_json::from_str(&json)?)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct RandomCheckpoint {
    seed: u64,
    steps: u64,
}

/// Uniform policy over the action space.
///
/// Reproducible from `(seed, steps)`, which is all it persists.
pub struct RandomAlgorithm {
    seed: u64,
    steps: u64,
    vocabulary_size: u32,
    rng: StdRng,
}

impl RandomAlgorithm {
    pub fn new(seed: u64, action: &ActionSpec) -> Self {
        Self {
            seed,
            steps: 0,
            vocabulary_size: action.vocabulary_size,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    fn sample(&mut self) -> ActorAction {
        let mut action = ActorAction::idle();
        for component in action.continuous.iter_mut() {
            *component = self.rng.gen_range(0.0..=1.0);
        }
        let symbols = self
            .vocabulary_size
            .clamp(1, WorldConfig::MAX_VOCABULARY_SIZE);
        action.signal = self.rng.gen_range(0..symbols) as u16;
        action
    }
}

impl Algorithm for RandomAlgorithm {
    fn act(&mut self, _observation: &Observation) -> ActorAction {
        self.steps += 1;
        self.sample()
    }

    fn train(&mut self, trajectory: &Trajectory) -> Result<()> {
        tracing::debug!(
            agent = %trajectory.agent,
            transitions = trajectory.len(),
            "random policy ignores training data"
        );
        Ok(())
    }

    fn save(&self, path: &Path) -> Result<()> {
        write_json(
            path,
            &RandomCheckpoint {
                seed: self.seed,
                steps: self.steps,
            },
        )
    }

    /// Reseeds and fast-forwards so the next action matches the saved
    /// instance's next action.
    fn restore(&mut self, path: &Path) -> Result<()> {
        let checkpoint: RandomCheckpoint = read_json(path)?;
        self.seed = checkpoint.seed;
        self.steps = 0;
        self.rng = StdRng::seed_from_u64(checkpoint.seed);
        for _ in 0..checkpoint.steps {
            self.sample();
        }
        self.steps = checkpoint.steps;
        Ok(())
    }
}

/// Hands out [`RandomAlgorithm`]s with consecutive seeds.
pub struct RandomFactory {
    next_seed: Cell<u64>,
}

impl RandomFactory {
    pub fn new(seed: u64) -> Self {
        Self {
            next_seed: Cell::new(seed),
        }
    }
}

impl AlgorithmFactory for RandomFactory {
    fn build(&self, _observation: &ObservationSpec, action: &ActionSpec) -> Box<dyn Algorithm> {
        let seed = self.next_seed.get();
        self.next_seed.set(seed.wrapping_add(1));
        Box::new(RandomAlgorithm::new(seed, action))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct ScriptedCheckpoint {
    script: Vec<ActorAction>,
    cursor: usize,
    trained_transitions: usize,
}

/// Replays a fixed cycle of actions.
#[derive(Clone, Debug, PartialEq)]
pub struct ScriptedAlgorithm {
    script: Vec<ActorAction>,
    cursor: usize,
    trained_transitions: usize,
}

impl ScriptedAlgorithm {
    /// An empty script idles.
    pub fn new(script: Vec<ActorAction>) -> Self {
        Self {
            script,
            cursor: 0,
            trained_transitions: 0,
        }
    }

    pub fn repeat(action: ActorAction) -> Self {
        Self::new(vec![action])
    }

    /// Total transitions seen by `train`.
    pub fn trained_transitions(&self) -> usize {
        self.trained_transitions
    }
}

impl Algorithm for ScriptedAlgorithm {
    fn act(&mut self, _observation: &Observation) -> ActorAction {
        if self.script.is_empty() {
            return ActorAction::idle();
        }
        let action = self.script[self.cursor % self.script.len()];
        self.cursor = (self.cursor + 1) % self.script.len();
        action
    }

    fn train(&mut self, trajectory: &Trajectory) -> Result<()> {
        self.trained_transitions += trajectory.len();
        Ok(())
    }

    fn save(&self, path: &Path) -> Result<()> {
        write_json(
            path,
            &ScriptedCheckpoint {
                script: self.script.clone(),
                cursor: self.cursor,
                trained_transitions: self.trained_transitions,
            },
        )
    }

    fn restore(&mut self, path: &Path) -> Result<()> {
        let checkpoint: ScriptedCheckpoint = read_json(path)?;
        if !checkpoint.script.is_empty() && checkpoint.cursor >= checkpoint.script.len() {
            return Err(RuntimeError::Algorithm(format!(
                "script cursor {} past {} actions",
                checkpoint.cursor,
                checkpoint.script.len()
            )));
        }
        self.script = checkpoint.script;
        self.cursor = checkpoint.cursor;
        self.trained_transitions = checkpoint.trained_transitions;
        Ok(())
    }
}
