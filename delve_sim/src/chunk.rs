// A chunk: one fixed-size block grid placed at a world cell origin.
//
// Chunks are the world's unit of allocation and of dirty tracking. Each owns a
// `Grid<BlockType>` whose world-space origin is the chunk's cell origin scaled
// by the cell size, so `grid.bounds()` is exactly the chunk's footprint in
// world cells.
//
// See also: `world.rs`, which creates chunks during generation and routes
// world cells to them.

use crate::error::GridError;
use crate::grid::{CellChange, Grid};
use crate::types::{BlockType, GridBox, VoxelCoord, WorldPos};

#[derive(Clone, Debug)]
pub struct Chunk {
    origin: VoxelCoord,
    grid: Grid<BlockType>,
    /// Set by any post-generation edit. Unmodified chunks can be rebuilt from
    /// the seed alone.
    modified: bool,
}

impl Chunk {
    /// Create a chunk at world cell `origin`, every cell set to `fill`.
    pub fn new(
        origin: VoxelCoord,
        size: VoxelCoord,
        cell_size: WorldPos,
        fill: BlockType,
    ) -> Result<Self, GridError> {
        let world_origin = WorldPos::new(
            origin.x as f32 * cell_size.x,
            origin.y as f32 * cell_size.y,
            origin.z as f32 * cell_size.z,
        );
        Ok(Self {
            origin,
            grid: Grid::new(size, cell_size, world_origin, fill)?,
            modified: false,
        })
    }

    /// World cell of the chunk's local `(0, 0, 0)`.
    pub fn origin(&self) -> VoxelCoord {
        self.origin
    }

    pub fn grid(&self) -> &Grid<BlockType> {
        &self.grid
    }

    /// Footprint in world cells.
    pub fn bounds(&self) -> GridBox {
        GridBox::new(self.origin, self.grid.size())
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub(crate) fn clear_modified(&mut self) {
        self.modified = false;
    }

    pub fn to_local(&self, world: VoxelCoord) -> VoxelCoord {
        world - self.origin
    }

    /// Block at a world cell, `None` if this chunk doesn't cover it.
    pub fn block_at(&self, world: VoxelCoord) -> Option<BlockType> {
        self.grid.try_get(self.to_local(world))
    }

    /// Write a block at a world cell. A write that changes the stored value
    /// marks the chunk modified; out-of-chunk cells are rejected untouched.
    pub fn set_block(
        &mut self,
        world: VoxelCoord,
        block: BlockType,
    ) -> Result<CellChange<BlockType>, GridError> {
        let change = self.grid.set(self.to_local(world), block)?;
        if change.is_change() {
            self.modified = true;
        }
        Ok(change)
    }
}
