// Core types shared across the world model and the pathfinder.
//
// Defines integer cell coordinates (`VoxelCoord`), float world-space positions
// (`WorldPos`), axis-aligned integer boxes (`GridBox`), and the block
// vocabulary (`BlockType`). All derive serde so they can appear in
// `WorldConfig` JSON.
//
// Box convention: `GridBox` is half-open, `[min, min + size)` on each axis,
// matching how grids index `[0, size)`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

// ---------------------------------------------------------------------------
// Spatial types
// ---------------------------------------------------------------------------

/// A cell address. Used both grid-locally and, after adding a chunk origin,
/// as a world cell address.
///
/// Axes: X east/west, Y up/down, Z south/north.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct VoxelCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl VoxelCoord {
    pub const ZERO: Self = Self::new(0, 0, 0);

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Same value on all three axes.
    pub const fn splat(v: i32) -> Self {
        Self::new(v, v, v)
    }

    /// Manhattan distance between two coordinates.
    pub fn manhattan_distance(self, other: Self) -> u32 {
        (self.x - other.x).unsigned_abs()
            + (self.y - other.y).unsigned_abs()
            + (self.z - other.z).unsigned_abs()
    }

    /// Component-wise Euclidean floor division. Used to find the chunk that
    /// owns a world cell, so `-1 / 10` must land in chunk `-1`, not `0`.
    pub fn div_floor(self, divisor: Self) -> Self {
        Self::new(
            self.x.div_euclid(divisor.x),
            self.y.div_euclid(divisor.y),
            self.z.div_euclid(divisor.z),
        )
    }

    /// Component-wise product.
    pub fn scale_by(self, other: Self) -> Self {
        Self::new(self.x * other.x, self.y * other.y, self.z * other.z)
    }

    pub fn min_component(self) -> i32 {
        self.x.min(self.y).min(self.z)
    }

    pub fn component_min(self, other: Self) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y), self.z.min(other.z))
    }

    pub fn component_max(self, other: Self) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y), self.z.max(other.z))
    }

    pub const fn to_array(self) -> [i32; 3] {
        [self.x, self.y, self.z]
    }

    pub const fn from_array(a: [i32; 3]) -> Self {
        Self::new(a[0], a[1], a[2])
    }
}

impl Add for VoxelCoord {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for VoxelCoord {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl From<[i32; 3]> for VoxelCoord {
    fn from(a: [i32; 3]) -> Self {
        Self::from_array(a)
    }
}

impl From<VoxelCoord> for [i32; 3] {
    fn from(c: VoxelCoord) -> Self {
        c.to_array()
    }
}

impl fmt::Display for VoxelCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// A continuous world-space position (agent placement, cell centers).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPos {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl WorldPos {
    pub const ONE: Self = Self::new(1.0, 1.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl Add for WorldPos {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for WorldPos {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

/// Axis-aligned integer box covering `[min, min + size)` on every axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridBox {
    pub min: VoxelCoord,
    pub size: VoxelCoord,
}

impl GridBox {
    pub const fn new(min: VoxelCoord, size: VoxelCoord) -> Self {
        Self { min, size }
    }

    /// Box spanning `[min, max)`.
    pub fn from_min_max(min: VoxelCoord, max: VoxelCoord) -> Self {
        Self::new(min, max - min)
    }

    /// Exclusive upper corner.
    pub fn max(&self) -> VoxelCoord {
        self.min + self.size
    }

    /// A box with a non-positive extent on any axis holds no cells.
    pub fn is_empty(&self) -> bool {
        self.size.min_component() <= 0
    }

    pub fn volume(&self) -> u64 {
        if self.is_empty() {
            return 0;
        }
        self.size.x as u64 * self.size.y as u64 * self.size.z as u64
    }

    pub fn contains(&self, c: VoxelCoord) -> bool {
        let max = self.max();
        c.x >= self.min.x
            && c.y >= self.min.y
            && c.z >= self.min.z
            && c.x < max.x
            && c.y < max.y
            && c.z < max.z
    }

    /// True if `other` lies entirely inside `self`.
    pub fn contains_box(&self, other: &GridBox) -> bool {
        let (a_max, b_max) = (self.max(), other.max());
        other.min.x >= self.min.x
            && other.min.y >= self.min.y
            && other.min.z >= self.min.z
            && b_max.x <= a_max.x
            && b_max.y <= a_max.y
            && b_max.z <= a_max.z
    }

    /// True if the boxes share at least one cell. Boxes that only touch
    /// faces do not intersect.
    pub fn intersects(&self, other: &GridBox) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        let (a_max, b_max) = (self.max(), other.max());
        self.min.x < b_max.x
            && other.min.x < a_max.x
            && self.min.y < b_max.y
            && other.min.y < a_max.y
            && self.min.z < b_max.z
            && other.min.z < a_max.z
    }

    /// Smallest box containing both.
    pub fn union(&self, other: &GridBox) -> GridBox {
        GridBox::from_min_max(
            self.min.component_min(other.min),
            self.max().component_max(other.max()),
        )
    }

    /// Grow by `n` cells on every side (shrink for negative `n`).
    pub fn inflate(&self, n: i32) -> GridBox {
        GridBox::new(self.min - VoxelCoord::splat(n), self.size + VoxelCoord::splat(2 * n))
    }

    /// Every cell in the box, x fastest, then z, then y.
    pub fn positions(&self) -> impl Iterator<Item = VoxelCoord> + use<> {
        // Ranges with max <= min are empty, so degenerate boxes yield nothing.
        let (min, max) = (self.min, self.max());
        (min.y..max.y)
            .flat_map(move |y| {
                (min.z..max.z)
                    .flat_map(move |z| (min.x..max.x).map(move |x| VoxelCoord::new(x, y, z)))
            })
    }
}

impl fmt::Display for GridBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} .. {})", self.min, self.max())
    }
}

// ---------------------------------------------------------------------------
// Blocks
// ---------------------------------------------------------------------------

/// What occupies a single world cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockType {
    /// Sentinel for cells outside every chunk. Never stored in a grid by
    /// world generation.
    #[default]
    None,
    /// Open space. The only walkable block.
    Empty,
    /// Diggable obstacle; traversable at a cost in dig mode.
    Rock,
    /// Permanent boundary. Never dug, never traversed.
    Indestructible,
}

impl BlockType {
    pub fn is_walkable(self) -> bool {
        self == BlockType::Empty
    }

    pub fn is_diggable(self) -> bool {
        self == BlockType::Rock
    }

    /// False only for the out-of-world sentinel.
    pub fn is_valid(self) -> bool {
        self != BlockType::None
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BlockType::None => "none",
            BlockType::Empty => "empty",
            BlockType::Rock => "rock",
            BlockType::Indestructible => "indestructible",
        };
        f.write_str(name)
    }
}
