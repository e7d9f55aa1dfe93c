//! Egocentric observation extraction.
//!
//! An actor sees a box of cells rotated into its facing: `u` runs to its
//! right, `v` forward and `w` up. Cells are read from the derived grids, so
//! every actor observes the same fully rebuilt world within a turn.

use crate::state::{ActorState, Position, WorldState};

/// Everything a policy receives for one actor and one turn.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Observation {
    /// Combined operation bits, flattened u-major. Out-of-bounds cells are `0`.
    pub operations: Vec<u8>,
    /// Signal field, same layout as `operations`.
    pub signals: Vec<u16>,
    /// `[across, forward, vertical]`.
    pub shape: [usize; 3],
    pub own_signal: u16,
    /// Free share of storage in `[0, 1]`.
    pub free_storage: f64,
    pub health: f64,
    pub last_reward: f64,
}

impl Observation {
    fn flat_index(&self, u: usize, v: usize, w: usize) -> Option<usize> {
        let [su, sv, sw] = self.shape;
        (u < su && v < sv && w < sw).then(|| (u * sv + v) * sw + w)
    }

    /// Operation bits at window coordinates (all zero-based).
    pub fn operations_at(&self, u: usize, v: usize, w: usize) -> Option<u8> {
        self.flat_index(u, v, w).map(|i| self.operations[i])
    }

    pub fn signal_at(&self, u: usize, v: usize, w: usize) -> Option<u16> {
        self.flat_index(u, v, w).map(|i| self.signals[i])
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Builds `actor`'s observation of `state`.
///
/// `actor` need not be registered in `state`; the engine also observes actors
/// removed earlier in the same turn.
pub fn observe(state: &WorldState, actor: &ActorState) -> Observation {
    let vision = actor.vision;
    let shape = vision.shape();
    let (hw, hh) = (vision.half_width as i32, vision.half_height as i32);

    let origin = actor.position();
    let forward = actor.facing();
    let right = Position::new(forward.y, -forward.x, 0);
    let up = Position::new(0, 0, 1);

    let mut operations = Vec::with_capacity(vision.cells());
    let mut signals = Vec::with_capacity(vision.cells());
    for u in -hw..hw {
        for v in 0..vision.depth as i32 {
            for w in -hh..hh {
                let cell = origin + right * u + forward * v + up * w;
                operations.push(state.occupancy().get(cell).map_or(0, |ops| ops.bits()));
                signals.push(state.signals().get(cell).copied().unwrap_or(0));
            }
        }
    }

    Observation {
        operations,
        signals,
        shape,
        own_signal: actor.signal.signal,
        free_storage: actor.free_storage_fraction(),
        health: actor.health(),
        last_reward: actor.last_reward,
    }
}
