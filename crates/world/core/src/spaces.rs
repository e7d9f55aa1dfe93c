//! Declarative descriptions of observation and action spaces.
//!
//! Algorithms receive these at registration to size their inputs and
//! outputs; the runtime uses `contains` to sanity-check what flows through.

use crate::action::ActorAction;
use crate::config::VisionSize;
use crate::obs::Observation;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Space {
    /// Real values in `[low, high]` with the given shape.
    Box {
        low: f64,
        high: f64,
        shape: Vec<usize>,
    },
    /// Integers in `[0, n)`.
    Discrete { n: u64 },
    /// Named sub-spaces in a fixed order.
    Dict(Vec<(String, Space)>),
}

impl Space {
    pub fn unit_box(shape: Vec<usize>) -> Self {
        Self::Box {
            low: 0.0,
            high: 1.0,
            shape,
        }
    }

    /// Number of scalars a flattened sample occupies.
    pub fn flat_dim(&self) -> usize {
        match self {
            Self::Box { shape, .. } => shape.iter().product(),
            Self::Discrete { .. } => 1,
            Self::Dict(entries) => entries.iter().map(|(_, s)| s.flat_dim()).sum(),
        }
    }

    pub fn entry(&self, name: &str) -> Option<&Space> {
        match self {
            Self::Dict(entries) => entries.iter().find(|(n, _)| n == name).map(|(_, s)| s),
            _ => None,
        }
    }

    /// Whether `values` fit a `Box` (shape and bounds); false for other kinds.
    pub fn contains_values(&self, values: &[f64]) -> bool {
        match self {
            Self::Box { low, high, shape } => {
                values.len() == shape.iter().product::<usize>()
                    && values.iter().all(|v| (*low..=*high).contains(v))
            }
            _ => false,
        }
    }

    /// Whether `index` is a member of a `Discrete` space.
    pub fn contains_index(&self, index: u64) -> bool {
        matches!(self, Self::Discrete { n } if index < *n)
    }
}

/// Observation space of one actor.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObservationSpec {
    pub vision: VisionSize,
    pub vocabulary_size: u32,
    pub space: Space,
}

impl ObservationSpec {
    pub fn new(vision: VisionSize, vocabulary_size: u32) -> Self {
        let window = vision.shape().to_vec();
        let max_signal = vocabulary_size.saturating_sub(1) as f64;
        let space = Space::Dict(vec![
            (
                "operations".into(),
                Space::Box {
                    low: 0.0,
                    high: u8::MAX as f64,
                    shape: window.clone(),
                },
            ),
            (
                "signals".into(),
                Space::Box {
                    low: 0.0,
                    high: max_signal,
                    shape: window,
                },
            ),
            (
                "own_signal".into(),
                Space::Discrete {
                    n: vocabulary_size as u64,
                },
            ),
            ("free_storage".into(), Space::unit_box(vec![1])),
            ("health".into(), Space::unit_box(vec![1])),
            (
                "last_reward".into(),
                Space::Box {
                    low: -1.0,
                    high: 1.0,
                    shape: vec![1],
                },
            ),
        ]);
        Self {
            vision,
            vocabulary_size,
            space,
        }
    }

    pub fn contains(&self, observation: &Observation) -> bool {
        let values = |xs: &[u16]| xs.iter().map(|x| *x as f64).collect::<Vec<_>>();
        let ops: Vec<f64> = observation.operations.iter().map(|x| *x as f64).collect();

        let check = |name: &str, values: &[f64]| {
            self.space
                .entry(name)
                .is_some_and(|space| space.contains_values(values))
        };

        observation.shape == self.vision.shape()
            && check("operations", &ops)
            && check("signals", &values(&observation.signals))
            && self
                .space
                .entry("own_signal")
                .is_some_and(|s| s.contains_index(observation.own_signal as u64))
            && check("free_storage", &[observation.free_storage])
            && check("health", &[observation.health])
            && check("last_reward", &[observation.last_reward])
    }
}

/// Action space shared by every actor of a world.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionSpec {
    pub vocabulary_size: u32,
    pub space: Space,
}

impl ActionSpec {
    pub fn new(vocabulary_size: u32) -> Self {
        let space = Space::Dict(vec![
            (
                "continuous".into(),
                Space::unit_box(vec![ActorAction::DIMENSIONS]),
            ),
            (
                "signal".into(),
                Space::Discrete {
                    n: vocabulary_size as u64,
                },
            ),
        ]);
        Self {
            vocabulary_size,
            space,
        }
    }

    pub fn contains(&self, action: &ActorAction) -> bool {
        action.validate(self.vocabulary_size).is_ok()
    }
}
