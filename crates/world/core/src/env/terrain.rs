//! Procedural terrain construction.

use super::rng::{PcgRng, RngOracle, compute_seed};
use crate::ops::Operations;
use crate::state::{Grid, Position, WorldSize};

/// Scatter attempts made per requested item before giving up on it.
const SCATTER_ATTEMPTS_PER_ITEM: u32 = 32;

/// Builds a static terrain grid.
///
/// Layers are applied in a fixed order: traversable fill, fence, floor,
/// explicit cells, then seeded scatter onto cells that are still plain
/// traversable ground.
#[derive(Clone, Debug)]
pub struct TerrainBuilder {
    size: WorldSize,
    seed: u64,
    fence: bool,
    floor: bool,
    cells: Vec<(Position, Operations)>,
    food: u32,
    rocks: u32,
}

impl TerrainBuilder {
    pub const FOOD: Operations = Operations::EDIBLE.union(Operations::LIFTABLE);
    pub const ROCK: Operations = Operations::LIFTABLE.union(Operations::PUSH_OVER);
    pub const WALL: Operations = Operations::empty();

    pub fn new(size: WorldSize) -> Self {
        Self {
            size,
            seed: 0,
            fence: false,
            floor: false,
            cells: Vec::new(),
            food: 0,
            rocks: 0,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Surrounds the world with solid walls on the x/y boundary, all layers.
    pub fn with_fence(mut self) -> Self {
        self.fence = true;
        self
    }

    /// Makes layer `z = 0` solid ground when the world has more than one layer.
    pub fn with_floor(mut self) -> Self {
        self.floor = true;
        self
    }

    pub fn with_cell(mut self, position: Position, operations: Operations) -> Self {
        self.cells.push((position, operations));
        self
    }

    pub fn with_food(mut self, count: u32) -> Self {
        self.food = count;
        self
    }

    pub fn with_rocks(mut self, count: u32) -> Self {
        self.rocks = count;
        self
    }

    fn has_floor(&self) -> bool {
        self.floor && self.size.z > 1
    }

    pub fn build(&self) -> Grid<Operations> {
        let mut grid = Grid::filled(self.size, Operations::TRAVERSABLE);

        if self.fence {
            for i in 0..self.size.volume() {
                let p = self.size.position(i);
                let on_edge = p.x == 0
                    || p.y == 0
                    || p.x == self.size.x as i32 - 1
                    || p.y == self.size.y as i32 - 1;
                if on_edge {
                    grid.set(p, Self::WALL);
                }
            }
        }

        if self.has_floor() {
            for x in 0..self.size.x as i32 {
                for y in 0..self.size.y as i32 {
                    grid.set(Position::new(x, y, 0), Self::WALL);
                }
            }
        }

        for (position, operations) in &self.cells {
            grid.set(*position, *operations);
        }

        self.scatter(&mut grid, Self::FOOD, self.food, 1);
        self.scatter(&mut grid, Self::ROCK, self.rocks, 2);
        grid
    }

    /// Places up to `count` cells of `operations` on plain ground, resting on
    /// the floor layer when there is one.
    fn scatter(&self, grid: &mut Grid<Operations>, operations: Operations, count: u32, kind: u32) {
        if count == 0 || self.size.volume() == 0 {
            return;
        }
        let rng = PcgRng;
        let layer = if self.has_floor() { 1 } else { 0 };
        let mut placed = 0;

        for attempt in 0..count.saturating_mul(SCATTER_ATTEMPTS_PER_ITEM) {
            if placed == count {
                break;
            }
            let seed_for = |axis: u32| compute_seed(self.seed, attempt as u64, kind, axis);
            let position = Position::new(
                rng.range(seed_for(0), 0, self.size.x - 1) as i32,
                rng.range(seed_for(1), 0, self.size.y - 1) as i32,
                layer,
            );
            if grid.get(position) == Some(&Operations::TRAVERSABLE) {
                grid.set(position, operations);
                placed += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fence_closes_the_xy_boundary() {
        let grid = TerrainBuilder::new(WorldSize::new(5, 4, 2)).with_fence().build();
        assert_eq!(grid.get(Position::new(0, 2, 1)), Some(&TerrainBuilder::WALL));
        assert_eq!(grid.get(Position::new(4, 1, 0)), Some(&TerrainBuilder::WALL));
        assert_eq!(grid.get(Position::new(2, 3, 0)), Some(&TerrainBuilder::WALL));
        assert_eq!(grid.get(Position::new(2, 2, 1)), Some(&Operations::TRAVERSABLE));
    }

    #[test]
    fn floor_only_applies_to_layered_worlds() {
        let flat = TerrainBuilder::new(WorldSize::new(3, 3, 1)).with_floor().build();
        assert!(flat.iter().all(|(_, ops)| *ops == Operations::TRAVERSABLE));

        let layered = TerrainBuilder::new(WorldSize::new(3, 3, 2)).with_floor().build();
        assert_eq!(layered.get(Position::new(1, 1, 0)), Some(&TerrainBuilder::WALL));
        assert_eq!(layered.get(Position::new(1, 1, 1)), Some(&Operations::TRAVERSABLE));
    }

    #[test]
    fn scatter_is_seeded_and_lands_on_free_ground() {
        let builder = TerrainBuilder::new(WorldSize::new(10, 10, 1))
            .with_fence()
            .with_seed(11)
            .with_food(6)
            .with_rocks(4);
        let a = builder.build();
        let b = builder.build();
        assert_eq!(a, b);

        let food = a.iter().filter(|(_, o)| **o == TerrainBuilder::FOOD).count();
        let rocks = a.iter().filter(|(_, o)| **o == TerrainBuilder::ROCK).count();
        assert_eq!(food, 6);
        assert_eq!(rocks, 4);
        assert_eq!(a.get(Position::new(0, 0, 0)), Some(&TerrainBuilder::WALL));
    }

    #[test]
    fn explicit_cells_override_generated_layers() {
        let p = Position::new(0, 1, 0);
        let grid = TerrainBuilder::new(WorldSize::new(3, 3, 1))
            .with_fence()
            .with_cell(p, Operations::EDIBLE)
            .build();
        assert_eq!(grid.get(p), Some(&Operations::EDIBLE));
    }
}
