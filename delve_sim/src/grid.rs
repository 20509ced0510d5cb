// Dense 3D grid of cell values with world-space coordinate conversion.
//
// Values live in a flat `Vec<V>` indexed by `x + z * size_x + y * size_x *
// size_z`, giving O(1) read/write. Unlike a clamping or wrapping store,
// indexed access is strict: `get`/`set` return `GridError::OutOfRange` for
// coordinates outside `[0, size)`, and `try_get`/`try_set` report failure
// without an error. Coordinates are never silently clamped except by the
// explicit `clamp` flag of the conversion helpers.
//
// `cell_size` and `origin` only matter for converting between world-space
// positions and cell coordinates. They never affect indexing.
//
// Change notification: `set` returns a `CellChange` describing what was
// overwritten. Owners that track dirtiness (see `world.rs`) consume that
// return value instead of subscribing to an event.
//
// See also: `chunk.rs`, which wraps a `Grid<BlockType>` per chunk, and
// `world.rs`, which routes world cells to the owning chunk's grid.

use crate::error::GridError;
use crate::types::{GridBox, VoxelCoord, WorldPos};

/// Record of a single successful `Grid::set`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellChange<V> {
    /// Grid-local coordinate that was written.
    pub coord: VoxelCoord,
    pub previous: V,
    pub current: V,
}

impl<V: PartialEq> CellChange<V> {
    /// False when the write stored the value that was already there.
    pub fn is_change(&self) -> bool {
        self.previous != self.current
    }
}

/// Dense 3D array of `V`.
#[derive(Clone, Debug)]
pub struct Grid<V> {
    /// Flat storage: index = x + z * size.x + y * size.x * size.z.
    cells: Vec<V>,
    size: VoxelCoord,
    cell_size: WorldPos,
    origin: WorldPos,
    bounds: GridBox,
}

impl<V: Copy> Grid<V> {
    /// Create a grid with every cell set to `fill`.
    ///
    /// Fails with `NonPositiveDimension` if any component of `size` is not
    /// strictly positive. This is the only fatal condition of a grid.
    pub fn new(
        size: VoxelCoord,
        cell_size: WorldPos,
        origin: WorldPos,
        fill: V,
    ) -> Result<Self, GridError> {
        if size.min_component() <= 0 {
            return Err(GridError::NonPositiveDimension { size });
        }
        let total = size.x as usize * size.y as usize * size.z as usize;
        let min = floor_cell(origin, cell_size);
        Ok(Self {
            cells: vec![fill; total],
            size,
            cell_size,
            origin,
            bounds: GridBox::new(min, size),
        })
    }

    pub fn size(&self) -> VoxelCoord {
        self.size
    }

    pub fn cell_size(&self) -> WorldPos {
        self.cell_size
    }

    pub fn origin(&self) -> WorldPos {
        self.origin
    }

    /// The grid's footprint in world cell coordinates: `floor(origin /
    /// cell_size)` extended by `size`.
    pub fn bounds(&self) -> GridBox {
        self.bounds
    }

    /// True iff every component of `coord` is in `[0, size)`.
    pub fn in_bounds(&self, coord: VoxelCoord) -> bool {
        coord.x >= 0
            && coord.y >= 0
            && coord.z >= 0
            && coord.x < self.size.x
            && coord.y < self.size.y
            && coord.z < self.size.z
    }

    fn index(&self, coord: VoxelCoord) -> Option<usize> {
        if !self.in_bounds(coord) {
            return None;
        }
        let (x, y, z) = (coord.x as usize, coord.y as usize, coord.z as usize);
        let sx = self.size.x as usize;
        let sz = self.size.z as usize;
        Some(x + z * sx + y * sx * sz)
    }

    fn out_of_range(&self, coord: VoxelCoord) -> GridError {
        GridError::OutOfRange {
            coord,
            size: self.size,
        }
    }

    /// Read a cell. Out-of-range coordinates are a caller bug and return
    /// `GridError::OutOfRange`.
    pub fn get(&self, coord: VoxelCoord) -> Result<V, GridError> {
        self.index(coord)
            .map(|i| self.cells[i])
            .ok_or_else(|| self.out_of_range(coord))
    }

    /// Read a cell, `None` when out of range.
    pub fn try_get(&self, coord: VoxelCoord) -> Option<V> {
        self.index(coord).map(|i| self.cells[i])
    }

    /// Overwrite a cell and report what changed.
    pub fn set(&mut self, coord: VoxelCoord, value: V) -> Result<CellChange<V>, GridError> {
        let i = self.index(coord).ok_or_else(|| self.out_of_range(coord))?;
        let previous = std::mem::replace(&mut self.cells[i], value);
        Ok(CellChange {
            coord,
            previous,
            current: value,
        })
    }

    /// Overwrite a cell; false (and no write) when out of range.
    pub fn try_set(&mut self, coord: VoxelCoord, value: V) -> bool {
        self.set(coord, value).is_ok()
    }

    /// Clamp each component into `[0, size - 1]`.
    pub fn clamp(&self, coord: VoxelCoord) -> VoxelCoord {
        VoxelCoord::new(
            coord.x.clamp(0, self.size.x - 1),
            coord.y.clamp(0, self.size.y - 1),
            coord.z.clamp(0, self.size.z - 1),
        )
    }

    /// Cell containing a world-space position: subtract `origin`, then floor
    /// divide by `cell_size` per axis. With `clamp`, the result is pulled
    /// into the grid; without it, the raw (possibly out-of-range) cell is
    /// returned.
    pub fn world_to_grid(&self, pos: WorldPos, clamp: bool) -> VoxelCoord {
        let cell = floor_cell(pos - self.origin, self.cell_size);
        if clamp { self.clamp(cell) } else { cell }
    }

    /// World-space position of a cell's minimum corner.
    pub fn grid_to_world_corner(&self, coord: VoxelCoord) -> WorldPos {
        WorldPos::new(
            coord.x as f32 * self.cell_size.x,
            coord.y as f32 * self.cell_size.y,
            coord.z as f32 * self.cell_size.z,
        ) + self.origin
    }

    /// World-space center of a cell, optionally clamping the cell first.
    pub fn grid_to_world_center(&self, coord: VoxelCoord, clamp: bool) -> WorldPos {
        let coord = if clamp { self.clamp(coord) } else { coord };
        let corner = self.grid_to_world_corner(coord);
        let half = WorldPos::new(
            self.cell_size.x / 2.0,
            self.cell_size.y / 2.0,
            self.cell_size.z / 2.0,
        );
        corner + half
    }

    /// Every grid-local coordinate, in storage order.
    pub fn positions(&self) -> impl Iterator<Item = VoxelCoord> + use<V> {
        GridBox::new(VoxelCoord::ZERO, self.size).positions()
    }

    /// `(coord, value)` for every cell, in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (VoxelCoord, V)> + '_ {
        self.positions().zip(self.cells.iter().copied())
    }
}

/// Floor-divide a world-space offset by the cell size. A zero cell-size axis
/// divides by 1 so degenerate (flat) grids still convert.
fn floor_cell(offset: WorldPos, cell_size: WorldPos) -> VoxelCoord {
    let div = |v: f32, d: f32| (v / if d == 0.0 { 1.0 } else { d }).floor() as i32;
    VoxelCoord::new(
        div(offset.x, cell_size.x),
        div(offset.y, cell_size.y),
        div(offset.z, cell_size.z),
    )
}
