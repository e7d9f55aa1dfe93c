//! Pure rebuild functions for the per-turn derived grids.
//!
//! Both grids are recomputed from scratch out of the terrain and the live
//! entity registries; nothing patches them incrementally.

use std::collections::BTreeMap;

use super::{ActorState, EntityId, Grid, WorldObject, WorldSize};
use crate::ops::Operations;

/// Terrain overlaid with each live mover's operations at its rounded cell.
///
/// Plain objects are written first, then signaling objects, then actors, so
/// a shared cell ends up showing the highest-priority occupant.
pub fn combined_occupancy(
    terrain: &Grid<Operations>,
    actors: &BTreeMap<EntityId, ActorState>,
    objects: &BTreeMap<EntityId, WorldObject>,
) -> Grid<Operations> {
    let mut grid = terrain.clone();
    for object in objects.values().filter(|o| !o.is_signaling()) {
        grid.set(object.spatial.rounded_position(), object.operations());
    }
    for object in objects.values().filter(|o| o.is_signaling()) {
        grid.set(object.spatial.rounded_position(), object.operations());
    }
    for actor in actors.values() {
        grid.set(actor.position(), actor.spatial.operations);
    }
    grid
}

/// Zero-filled grid carrying each signaling entity's symbol at its cell.
pub fn signal_field(
    size: WorldSize,
    actors: &BTreeMap<EntityId, ActorState>,
    objects: &BTreeMap<EntityId, WorldObject>,
) -> Grid<u16> {
    let mut grid = Grid::filled(size, 0u16);
    for object in objects.values() {
        if let Some(signal) = object.signal {
            grid.set(object.spatial.rounded_position(), signal.signal);
        }
    }
    for actor in actors.values() {
        grid.set(actor.position(), actor.signal.signal);
    }
    grid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ActorDefaults;
    use crate::state::Position;

    #[test]
    fn actors_shadow_objects_and_terrain() {
        let size = WorldSize::new(4, 4, 1);
        let terrain = Grid::filled(size, Operations::TRAVERSABLE);
        let p = Position::new(1, 1, 0);

        let mut objects = BTreeMap::new();
        objects.insert(
            EntityId(2),
            WorldObject::new(EntityId(2), p, Operations::EDIBLE).with_signal(9),
        );
        let mut actors = BTreeMap::new();
        let mut actor = ActorState::new(EntityId(1), p, &ActorDefaults::default());
        actor.signal.set_signal(4);
        actors.insert(EntityId(1), actor);

        let grid = combined_occupancy(&terrain, &actors, &objects);
        assert_eq!(
            grid.get(p),
            Some(&(Operations::LIFTABLE | Operations::PUSH_OVER))
        );
        assert_eq!(grid.get(Position::new(0, 0, 0)), Some(&Operations::TRAVERSABLE));

        let signals = signal_field(size, &actors, &objects);
        assert_eq!(signals.get(p), Some(&4));
        assert_eq!(signals.iter().filter(|(_, s)| **s != 0).count(), 1);
    }
}
