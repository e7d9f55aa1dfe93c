//! Authoritative world state representation.
//!
//! This module owns the terrain, the live entity registries and the derived
//! grids observations are read from. Runtime layers clone or query this state
//! but mutate it through [`crate::engine::WorldEngine`].
mod actor;
mod common;
pub mod derived;
mod entity;
mod grid;
#[cfg(feature = "serde")]
mod root;

use std::collections::BTreeMap;

pub use actor::{ActorState, HEALTH_SCALE, REWARD_SCALE, Storage};
pub use common::{EntityId, Position, Tick, Vec3, WorldSize};
pub use entity::{CellOccupant, SignalState, SpatialState, StoredItem, WorldObject};
pub use grid::Grid;
#[cfg(feature = "serde")]
pub use root::state_root;

use crate::ops::Operations;

/// Canonical snapshot of the simulated world.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldState {
    /// Base seed for spawn sampling. Set once at creation.
    pub seed: u64,
    pub tick: Tick,

    /// Sequential entity id allocator. Ids are never reused.
    next_entity_id: u32,

    pub terrain: Grid<Operations>,
    occupancy: Grid<Operations>,
    signals: Grid<u16>,

    pub actors: BTreeMap<EntityId, ActorState>,
    pub objects: BTreeMap<EntityId, WorldObject>,
}

impl WorldState {
    /// Creates an empty world over `terrain`; its size becomes the world size.
    pub fn new(terrain: Grid<Operations>, seed: u64) -> Self {
        let size = terrain.size();
        Self {
            seed,
            tick: Tick::ZERO,
            next_entity_id: 1,
            occupancy: terrain.clone(),
            signals: Grid::filled(size, 0),
            terrain,
            actors: BTreeMap::new(),
            objects: BTreeMap::new(),
        }
    }

    pub fn size(&self) -> WorldSize {
        self.terrain.size()
    }

    /// Combined occupancy as of the last rebuild.
    pub fn occupancy(&self) -> &Grid<Operations> {
        &self.occupancy
    }

    /// Signal field as of the last rebuild.
    pub fn signals(&self) -> &Grid<u16> {
        &self.signals
    }

    /// Recomputes both derived grids from terrain and live entities.
    pub fn rebuild_derived(&mut self) {
        self.occupancy = derived::combined_occupancy(&self.terrain, &self.actors, &self.objects);
        self.signals = derived::signal_field(self.size(), &self.actors, &self.objects);
    }

    /// Id the next allocation will return.
    pub fn peek_entity_id(&self) -> EntityId {
        EntityId(self.next_entity_id)
    }

    pub fn allocate_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_entity_id);
        self.next_entity_id = self.next_entity_id.saturating_add(1);
        id
    }

    /// Live view of what occupies a cell; `None` outside the world.
    ///
    /// Reads current entity positions rather than the derived grids, so it is
    /// safe to use while actions are still being applied.
    pub fn occupant_at(&self, position: Position) -> Option<CellOccupant> {
        let terrain = *self.terrain.get(position)?;

        if let Some(actor) = self.actors.values().find(|a| a.position() == position) {
            return Some(CellOccupant::Actor(actor.id));
        }
        let objects = self
            .objects
            .values()
            .filter(|o| o.spatial.rounded_position() == position);
        let mut plain = None;
        for object in objects {
            if object.is_signaling() {
                return Some(CellOccupant::SignalingObject(object.id));
            }
            plain.get_or_insert(object.id);
        }
        if let Some(id) = plain {
            return Some(CellOccupant::Object(id));
        }

        if terrain == Operations::TRAVERSABLE {
            Some(CellOccupant::Empty)
        } else {
            Some(CellOccupant::Terrain(terrain))
        }
    }

    /// Live combined operations of a cell; `None` outside the world.
    pub fn operations_at(&self, position: Position) -> Option<Operations> {
        let occupant = self.occupant_at(position)?;
        Some(match occupant {
            CellOccupant::Empty => Operations::TRAVERSABLE,
            CellOccupant::Terrain(ops) => ops,
            CellOccupant::Actor(id) => self.actors.get(&id)?.spatial.operations,
            CellOccupant::Object(id) | CellOccupant::SignalingObject(id) => {
                self.objects.get(&id)?.operations()
            }
        })
    }

    /// True when a mover could step into `position` right now.
    pub fn is_traversable(&self, position: Position) -> bool {
        self.operations_at(position)
            .is_some_and(|ops| ops.contains(Operations::TRAVERSABLE))
    }

    pub fn spatial(&self, id: EntityId) -> Option<&SpatialState> {
        self.actors
            .get(&id)
            .map(|a| &a.spatial)
            .or_else(|| self.objects.get(&id).map(|o| &o.spatial))
    }

    pub fn spatial_mut(&mut self, id: EntityId) -> Option<&mut SpatialState> {
        if let Some(actor) = self.actors.get_mut(&id) {
            return Some(&mut actor.spatial);
        }
        self.objects.get_mut(&id).map(|o| &mut o.spatial)
    }

    pub fn position_of(&self, id: EntityId) -> Option<Position> {
        self.spatial(id).map(SpatialState::rounded_position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ActorDefaults;

    fn world() -> WorldState {
        WorldState::new(
            Grid::filled(WorldSize::new(4, 4, 1), Operations::TRAVERSABLE),
            7,
        )
    }

    #[test]
    fn occupant_priority_is_actor_then_signaling_then_plain() {
        let mut state = world();
        let p = Position::new(2, 1, 0);
        state
            .objects
            .insert(EntityId(5), WorldObject::new(EntityId(5), p, Operations::LIFTABLE));
        assert_eq!(state.occupant_at(p), Some(CellOccupant::Object(EntityId(5))));

        state.objects.insert(
            EntityId(6),
            WorldObject::new(EntityId(6), p, Operations::LIFTABLE).with_signal(3),
        );
        assert_eq!(
            state.occupant_at(p),
            Some(CellOccupant::SignalingObject(EntityId(6)))
        );

        state.actors.insert(
            EntityId(9),
            ActorState::new(EntityId(9), p, &ActorDefaults::default()),
        );
        assert_eq!(state.occupant_at(p), Some(CellOccupant::Actor(EntityId(9))));
        assert!(!state.is_traversable(p));
    }

    #[test]
    fn terrain_cells_resolve_to_empty_or_terrain() {
        let mut state = world();
        let rock = Position::new(0, 0, 0);
        state.terrain.set(rock, Operations::PUSH_OVER);
        assert_eq!(
            state.occupant_at(rock),
            Some(CellOccupant::Terrain(Operations::PUSH_OVER))
        );
        assert_eq!(
            state.occupant_at(Position::new(1, 0, 0)),
            Some(CellOccupant::Empty)
        );
        assert_eq!(state.occupant_at(Position::new(4, 0, 0)), None);
        assert_eq!(state.operations_at(Position::new(0, -1, 0)), None);
    }

    #[test]
    fn entity_ids_are_monotonic() {
        let mut state = world();
        assert_eq!(state.peek_entity_id(), EntityId(1));
        assert_eq!(state.allocate_entity_id(), EntityId(1));
        assert_eq!(state.allocate_entity_id(), EntityId(2));
    }
}
