//! Environment, agent and training runtime for the social grid world.
//!
//! [`SocialEnv`] exposes the world as a multi-agent environment. Agents pair
//! an actor with an [`Algorithm`] built by an [`AlgorithmFactory`]; the
//! [`interact`] loop records [`Episode`]s that [`train`] feeds back to them.
pub mod agent;
pub mod algorithm;
pub mod env;
pub mod error;
pub mod experience;
pub mod interact;

pub use agent::{Agent, Agents, Zoo};
pub use algorithm::{
    Algorithm, AlgorithmFactory, RandomAlgorithm, RandomFactory, ScriptedAlgorithm,
};
pub use env::{SocialEnv, SocialEnvBuilder, StepResult};
pub use error::{Result, RuntimeError};
pub use experience::{Episode, ExperienceRecorder, Frame, Trajectory, Transition};
pub use interact::{EpisodeReport, interact, train};
