use super::{Position, WorldSize};

/// Dense 3D array covering a [`WorldSize`], stored x-major then y then z.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Grid<T> {
    size: WorldSize,
    cells: Vec<T>,
}

impl<T: Clone> Grid<T> {
    pub fn filled(size: WorldSize, value: T) -> Self {
        Self {
            size,
            cells: vec![value; size.volume()],
        }
    }

    /// Resets every cell to `value` without reallocating.
    pub fn fill(&mut self, value: T) {
        self.cells.fill(value);
    }
}

impl<T> Grid<T> {
    pub fn size(&self) -> WorldSize {
        self.size
    }

    pub fn get(&self, position: Position) -> Option<&T> {
        self.size.index(position).map(|i| &self.cells[i])
    }

    pub fn get_mut(&mut self, position: Position) -> Option<&mut T> {
        self.size.index(position).map(|i| &mut self.cells[i])
    }

    /// Writes `value` at `position`; returns false when it is out of bounds.
    pub fn set(&mut self, position: Position, value: T) -> bool {
        match self.get_mut(position) {
            Some(cell) => {
                *cell = value;
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Position, &T)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, cell)| (self.size.position(i), cell))
    }

    pub fn as_slice(&self) -> &[T] {
        &self.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get_are_bounds_checked() {
        let mut grid = Grid::filled(WorldSize::new(2, 3, 1), 0u8);
        assert!(grid.set(Position::new(1, 2, 0), 7));
        assert!(!grid.set(Position::new(2, 0, 0), 9));
        assert_eq!(grid.get(Position::new(1, 2, 0)), Some(&7));
        assert_eq!(grid.get(Position::new(0, -1, 0)), None);
        assert_eq!(grid.iter().filter(|(_, v)| **v == 7).count(), 1);
    }
}
