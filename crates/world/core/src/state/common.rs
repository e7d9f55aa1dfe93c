use core::fmt;
use core::ops::{Add, Mul};

/// Unique identifier for an actor or a moving object.
///
/// Ids are allocated monotonically by [`super::WorldState`] and never reused,
/// so ascending id order is also registration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Integer cell coordinate. May lie outside the world; see [`WorldSize::contains`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Position {
    pub const ORIGIN: Self = Self::new(0, 0, 0);

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, rhs: Position) -> Position {
        Position::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Mul<i32> for Position {
    type Output = Position;

    fn mul(self, rhs: i32) -> Position {
        Position::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Real-valued vector used for entity positions and displacements.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn from_position(position: Position) -> Self {
        Self::new(position.x as f64, position.y as f64, position.z as f64)
    }

    pub fn l1(&self) -> f64 {
        self.x.abs() + self.y.abs() + self.z.abs()
    }

    pub fn l2(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn max_abs(&self) -> f64 {
        self.x.abs().max(self.y.abs()).max(self.z.abs())
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }

    /// Nearest cell, rounding halves away from zero.
    pub fn round(&self) -> Position {
        Position::new(
            self.x.round() as i32,
            self.y.round() as i32,
            self.z.round() as i32,
        )
    }

    /// Single-cell offset along the dominant direction of this vector.
    ///
    /// Each axis becomes `round(c / max_abs)`, which yields cardinal or
    /// diagonal steps. The zero vector maps to [`Position::ORIGIN`].
    pub fn unit_step(&self) -> Position {
        let m = self.max_abs();
        if m == 0.0 || !m.is_finite() {
            return Position::ORIGIN;
        }
        Vec3::new(self.x / m, self.y / m, self.z / m).round()
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

/// Positive extents of the world along each axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldSize {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl WorldSize {
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    /// True iff `0 <= c < extent` on every axis. There is no wraparound.
    pub fn contains(&self, position: Position) -> bool {
        (0..self.x as i64).contains(&(position.x as i64))
            && (0..self.y as i64).contains(&(position.y as i64))
            && (0..self.z as i64).contains(&(position.z as i64))
    }

    pub const fn volume(&self) -> usize {
        self.x as usize * self.y as usize * self.z as usize
    }

    /// Flat x-major index of an in-bounds position.
    pub fn index(&self, position: Position) -> Option<usize> {
        if !self.contains(position) {
            return None;
        }
        let (x, y, z) = (
            position.x as usize,
            position.y as usize,
            position.z as usize,
        );
        Some((x * self.y as usize + y) * self.z as usize + z)
    }

    /// Inverse of [`WorldSize::index`].
    pub fn position(&self, index: usize) -> Position {
        let z = index % self.z as usize;
        let y = (index / self.z as usize) % self.y as usize;
        let x = index / (self.z as usize * self.y as usize);
        Position::new(x as i32, y as i32, z as i32)
    }

    /// Longest straight walk that can stay inside the world.
    pub const fn span(&self) -> u32 {
        self.x + self.y + self.z
    }
}

/// Turn counter, advanced once per completed world step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Self = Self(0);

    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}
