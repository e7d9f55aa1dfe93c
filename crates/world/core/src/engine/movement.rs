//! Movement resolution with push and cascade semantics.
//!
//! A move walks single-cell steps along the dominant direction of the
//! displacement. Each candidate cell is read from the live combined view, so
//! actors and objects shadow the terrain beneath them. Blocking is a normal
//! outcome and never an error.

use std::collections::BTreeSet;

use super::WorldError;
use crate::ops::Operations;
use crate::state::{CellOccupant, EntityId, Position, Vec3, WorldState};

/// What a push displaced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PushKind {
    /// Terrain content relocated from one cell to the next.
    Terrain(Operations),
    /// A live actor or object shifted by one cell.
    Entity(EntityId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Push {
    pub from: Position,
    pub to: Position,
    pub kind: PushKind,
}

/// Result of a single [`try_move`] call.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoveReport {
    pub start: Position,
    pub end: Position,
    pub steps: u32,
    pub pushes: Vec<Push>,
}

impl MoveReport {
    fn stationary(at: Position) -> Self {
        Self {
            start: at,
            end: at,
            steps: 0,
            pushes: Vec::new(),
        }
    }

    pub fn moved(&self) -> bool {
        self.steps > 0
    }
}

/// Moves the entity `mover` by `delta` as far as the world allows.
///
/// `L1(delta) + remainder` is the travel budget; its integer part is walked
/// one cell at a time and its fractional part becomes the new remainder.
/// Stops at the world edge, at non-traversable cells that cannot be pushed,
/// and at pushable cells whose far side is not traversable (nothing changes
/// in that case). A zero or non-finite `delta` leaves the entity untouched.
pub fn try_move(
    state: &mut WorldState,
    mover: EntityId,
    delta: Vec3,
) -> Result<MoveReport, WorldError> {
    let spatial = state
        .spatial(mover)
        .ok_or(WorldError::EntityNotFound { id: mover })?;
    let start = spatial.rounded_position();
    let remainder = spatial.remainder;

    if !delta.is_finite() || delta.max_abs() == 0.0 {
        return Ok(MoveReport::stationary(start));
    }

    let target = delta.l1() + remainder;
    // A straight walk cannot stay in bounds for longer than the world span.
    let budget = (target.floor() as u64).min(state.size().span() as u64) as u32;
    let step = delta.unit_step();

    let mut report = MoveReport::stationary(start);
    let mut cascaded = BTreeSet::new();

    for _ in 0..budget {
        let next = report.end + step;
        if !clear_cell(state, next, step, &mut cascaded, &mut report.pushes) {
            break;
        }
        report.end = next;
        report.steps += 1;
        if let Some(spatial) = state.spatial_mut(mover) {
            spatial.place_at(next);
        }
    }

    if let Some(spatial) = state.spatial_mut(mover) {
        spatial.remainder = target - target.floor();
    }
    Ok(report)
}

/// Makes `cell` enterable if possible; returns whether the mover may step in.
fn clear_cell(
    state: &mut WorldState,
    cell: Position,
    step: Position,
    cascaded: &mut BTreeSet<Position>,
    pushes: &mut Vec<Push>,
) -> bool {
    let Some(ops) = state.operations_at(cell) else {
        return false;
    };
    if ops.contains(Operations::TRAVERSABLE) {
        return true;
    }
    if !ops.contains(Operations::PUSH_OVER) {
        return false;
    }

    let beyond = cell + step;
    if !state.is_traversable(beyond) {
        return false;
    }

    match state.occupant_at(cell) {
        Some(CellOccupant::Actor(id) | CellOccupant::SignalingObject(id) | CellOccupant::Object(id)) => {
            // one delegated shift per blocked cell per call
            if !cascaded.insert(cell) {
                return false;
            }
            let Some(spatial) = state.spatial_mut(id) else {
                return false;
            };
            spatial.place_at(beyond);
            pushes.push(Push {
                from: cell,
                to: beyond,
                kind: PushKind::Entity(id),
            });
        }
        Some(CellOccupant::Terrain(content)) => {
            state.terrain.set(beyond, content);
            state.terrain.set(cell, Operations::TRAVERSABLE);
            pushes.push(Push {
                from: cell,
                to: beyond,
                kind: PushKind::Terrain(content),
            });
        }
        Some(CellOccupant::Empty) | None => return false,
    }

    state.is_traversable(cell)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ActorDefaults;
    use crate::state::{ActorState, Grid, WorldObject, WorldSize};

    const MOVER: EntityId = EntityId(1);

    fn world(x: u32, y: u32) -> WorldState {
        WorldState::new(
            Grid::filled(WorldSize::new(x, y, 1), Operations::TRAVERSABLE),
            0,
        )
    }

    fn spawn(state: &mut WorldState, id: EntityId, at: Position) {
        state
            .actors
            .insert(id, ActorState::new(id, at, &ActorDefaults::default()));
    }

    fn east(distance: f64) -> Vec3 {
        Vec3::new(distance, 0.0, 0.0)
    }

    #[test]
    fn free_move_walks_whole_cells_and_keeps_remainder() {
        let mut state = world(8, 3);
        spawn(&mut state, MOVER, Position::new(1, 1, 0));

        let report = try_move(&mut state, MOVER, east(2.5)).unwrap();
        assert_eq!(report.steps, 2);
        assert_eq!(state.position_of(MOVER), Some(Position::new(3, 1, 0)));
        assert_eq!(state.spatial(MOVER).unwrap().remainder, 0.5);

        // carried remainder completes a step
        let report = try_move(&mut state, MOVER, east(0.5)).unwrap();
        assert_eq!(report.steps, 1);
        assert_eq!(state.position_of(MOVER), Some(Position::new(4, 1, 0)));
        assert_eq!(state.spatial(MOVER).unwrap().remainder, 0.0);
    }

    #[test]
    fn zero_delta_is_stationary() {
        let mut state = world(4, 4);
        spawn(&mut state, MOVER, Position::new(1, 1, 0));
        state.spatial_mut(MOVER).unwrap().remainder = 0.25;

        let report = try_move(&mut state, MOVER, Vec3::ZERO).unwrap();
        assert!(!report.moved());
        assert_eq!(state.spatial(MOVER).unwrap().remainder, 0.25);
    }

    #[test]
    fn world_edge_blocks_and_blocking_is_idempotent() {
        let mut state = world(4, 1);
        spawn(&mut state, MOVER, Position::new(2, 0, 0));

        try_move(&mut state, MOVER, east(5.0)).unwrap();
        let first = state.clone();
        assert_eq!(state.position_of(MOVER), Some(Position::new(3, 0, 0)));

        let report = try_move(&mut state, MOVER, east(1.0)).unwrap();
        assert_eq!(report.steps, 0);
        assert_eq!(state, first);
    }

    #[test]
    fn solid_cell_blocks() {
        let mut state = world(6, 1);
        state.terrain.set(Position::new(3, 0, 0), Operations::LIFTABLE);
        spawn(&mut state, MOVER, Position::new(1, 0, 0));

        let report = try_move(&mut state, MOVER, east(4.0)).unwrap();
        assert_eq!(report.end, Position::new(2, 0, 0));
        assert!(report.pushes.is_empty());
    }

    #[test]
    fn pushes_terrain_into_free_cell() {
        let mut state = world(6, 1);
        let rock = Operations::LIFTABLE | Operations::PUSH_OVER;
        state.terrain.set(Position::new(2, 0, 0), rock);
        spawn(&mut state, MOVER, Position::new(1, 0, 0));

        let report = try_move(&mut state, MOVER, east(1.0)).unwrap();
        assert_eq!(report.end, Position::new(2, 0, 0));
        assert_eq!(
            report.pushes,
            vec![Push {
                from: Position::new(2, 0, 0),
                to: Position::new(3, 0, 0),
                kind: PushKind::Terrain(rock),
            }]
        );
        assert_eq!(state.terrain.get(Position::new(3, 0, 0)), Some(&rock));
        assert_eq!(
            state.terrain.get(Position::new(2, 0, 0)),
            Some(&Operations::TRAVERSABLE)
        );
    }

    #[test]
    fn blocked_push_changes_nothing() {
        let mut state = world(4, 1);
        let rock = Operations::PUSH_OVER;
        state.terrain.set(Position::new(2, 0, 0), rock);
        state.terrain.set(Position::new(3, 0, 0), Operations::empty());
        spawn(&mut state, MOVER, Position::new(1, 0, 0));
        let before = state.clone();

        let report = try_move(&mut state, MOVER, east(1.0)).unwrap();
        assert_eq!(report.steps, 0);
        assert!(report.pushes.is_empty());
        assert_eq!(state.terrain, before.terrain);
        assert_eq!(state.actors, before.actors);
    }

    #[test]
    fn push_against_world_edge_changes_nothing() {
        let mut state = world(3, 1);
        state.terrain.set(Position::new(2, 0, 0), Operations::PUSH_OVER);
        spawn(&mut state, MOVER, Position::new(1, 0, 0));
        let before = state.terrain.clone();

        try_move(&mut state, MOVER, east(1.0)).unwrap();
        assert_eq!(state.terrain, before);
        assert_eq!(state.position_of(MOVER), Some(Position::new(1, 0, 0)));
    }

    #[test]
    fn cascades_one_cell_into_a_pushable_actor() {
        let mut state = world(6, 1);
        let other = EntityId(2);
        spawn(&mut state, MOVER, Position::new(1, 0, 0));
        spawn(&mut state, other, Position::new(2, 0, 0));

        let report = try_move(&mut state, MOVER, east(1.0)).unwrap();
        assert_eq!(report.steps, 1);
        assert_eq!(state.position_of(MOVER), Some(Position::new(2, 0, 0)));
        assert_eq!(state.position_of(other), Some(Position::new(3, 0, 0)));
        assert_eq!(report.pushes[0].kind, PushKind::Entity(other));
    }

    #[test]
    fn cascade_stops_when_far_cell_is_occupied() {
        let mut state = world(6, 1);
        spawn(&mut state, MOVER, Position::new(1, 0, 0));
        spawn(&mut state, EntityId(2), Position::new(2, 0, 0));
        spawn(&mut state, EntityId(3), Position::new(3, 0, 0));
        let before = state.clone();

        let report = try_move(&mut state, MOVER, east(1.0)).unwrap();
        assert!(!report.moved());
        assert_eq!(state.actors, before.actors);
    }

    #[test]
    fn moving_objects_can_be_pushed() {
        let mut state = world(5, 1);
        let crate_id = EntityId(4);
        state.objects.insert(
            crate_id,
            WorldObject::new(crate_id, Position::new(2, 0, 0), Operations::PUSH_OVER),
        );
        spawn(&mut state, MOVER, Position::new(1, 0, 0));

        try_move(&mut state, MOVER, east(1.0)).unwrap();
        assert_eq!(state.position_of(crate_id), Some(Position::new(3, 0, 0)));
    }

    #[test]
    fn unknown_mover_is_reported() {
        let mut state = world(2, 2);
        let err = try_move(&mut state, EntityId(42), east(1.0)).unwrap_err();
        assert_eq!(err, WorldError::EntityNotFound { id: EntityId(42) });
    }
}
