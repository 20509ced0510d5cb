// Chunked voxel world: terrain storage, generation, and edit tracking.
//
// The world is a set of equally sized chunks tiling a box of chunk space,
// keyed by their world-cell origin in a `BTreeMap`. A world cell resolves to
// its chunk by Euclidean floor division by the chunk size, so negative
// coordinates land in the right chunk. Cells no chunk covers read as
// `BlockType::None` and reject writes.
//
// Generation (`generate`) fills every chunk with `Rock`, optionally clears the
// top layer to `Empty` and seals the bottom layer as `Indestructible`, then
// places rooms (`room.rs`). It always starts from scratch and ends with every
// chunk in the dirty set and no chunk marked modified.
//
// After generation, edits go through `try_set_block` (or `dig`, which wraps
// it). A write that changes a cell marks the owning chunk modified and puts
// it in the dirty set. `take_dirty_chunks` drains that set for whatever
// rebuilds chunk meshes.
//
// World/cell conversions forward to any chunk's grid and shift by that
// chunk's origin. This relies on every chunk sharing one cell size, which
// `generate` guarantees.
//
// See also: `chunk.rs` for per-chunk storage, `room.rs` for room placement,
// `pathfinding.rs` for searches over snapshots of this world.
//
// **Critical constraint: determinism.** Chunks, rooms, and dirty origins are
// kept in ordered collections; generation draws only from the caller's
// `WorldRng`.

use crate::chunk::Chunk;
use crate::config::WorldConfig;
use crate::error::GridError;
use crate::room::{self, Room, RoomReport};
use crate::types::{BlockType, GridBox, VoxelCoord, WorldPos};
use delve_prng::WorldRng;
use log::info;
use std::collections::{BTreeMap, BTreeSet};

/// Result of a `dig` request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DigOutcome {
    /// Rock was turned into empty space.
    Dug,
    /// Nothing to dig.
    AlreadyEmpty,
    /// Indestructible block.
    Undiggable,
    /// No chunk covers the cell.
    OutOfWorld,
}

/// Summary of one `generate` call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationReport {
    pub chunks: usize,
    pub bounds: GridBox,
    pub rooms: RoomReport,
}

#[derive(Clone, Debug, Default)]
pub struct VoxelWorld {
    chunks: BTreeMap<VoxelCoord, Chunk>,
    /// Origins of chunks whose contents changed since the last drain.
    dirty: BTreeSet<VoxelCoord>,
    /// Placed rooms keyed by origin.
    rooms: BTreeMap<VoxelCoord, Room>,
    chunk_size: VoxelCoord,
    bounds: GridBox,
}

impl VoxelWorld {
    /// An empty world with no chunks. Every cell reads as `None` until
    /// `generate` runs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a fresh world from `config`, discarding all prior state.
    ///
    /// Fails only if a chunk grid can't be constructed (non-positive chunk
    /// size or chunk count); the world is left empty in that case.
    pub fn generate(
        &mut self,
        config: &WorldConfig,
        rng: &mut WorldRng,
    ) -> Result<GenerationReport, GridError> {
        *self = Self::default();

        if config.chunk_counts.min_component() <= 0 {
            return Err(GridError::NonPositiveDimension {
                size: config.chunk_counts,
            });
        }

        let mut chunks = BTreeMap::new();
        for index in GridBox::new(VoxelCoord::ZERO, config.chunk_counts).positions() {
            let origin = index.scale_by(config.chunk_size);
            let chunk = Chunk::new(origin, config.chunk_size, config.cell_size, BlockType::Rock)?;
            chunks.insert(origin, chunk);
        }
        let bounds = chunks
            .values()
            .map(Chunk::bounds)
            .reduce(|a, b| a.union(&b))
            .unwrap_or_default();

        self.chunks = chunks;
        self.chunk_size = config.chunk_size;
        self.bounds = bounds;

        if config.carve_surface {
            self.fill_layer(bounds.max().y - 1, BlockType::Empty);
        }
        if config.seal_floor {
            self.fill_layer(bounds.min.y, BlockType::Indestructible);
        }

        let rooms = room::spawn_rooms(self, config, rng);

        // Everything so far is reproducible from the seed.
        for chunk in self.chunks.values_mut() {
            chunk.clear_modified();
        }
        self.dirty = self.chunks.keys().copied().collect();

        info!(
            "generated {} chunks spanning {}, {} of {} rooms placed",
            self.chunks.len(),
            bounds,
            rooms.placed,
            rooms.requested
        );
        Ok(GenerationReport {
            chunks: self.chunks.len(),
            bounds,
            rooms,
        })
    }

    fn fill_layer(&mut self, y: i32, block: BlockType) {
        let b = self.bounds;
        let layer = GridBox::new(
            VoxelCoord::new(b.min.x, y, b.min.z),
            VoxelCoord::new(b.size.x, 1, b.size.z),
        );
        for cell in layer.positions() {
            self.try_set_block(cell, block);
        }
    }

    /// Origin of the chunk slot that would hold `coord`, whether or not a
    /// chunk exists there.
    fn chunk_origin_of(&self, coord: VoxelCoord) -> Option<VoxelCoord> {
        if self.chunk_size.min_component() <= 0 {
            return None;
        }
        Some(coord.div_floor(self.chunk_size).scale_by(self.chunk_size))
    }

    /// Block at a world cell, `BlockType::None` outside the world.
    pub fn get_block(&self, coord: VoxelCoord) -> BlockType {
        self.chunk_origin_of(coord)
            .and_then(|origin| self.chunks.get(&origin))
            .and_then(|chunk| chunk.block_at(coord))
            .unwrap_or_default()
    }

    /// Write a block. Returns false (and changes nothing) outside the world.
    /// A write that changes the cell marks its chunk modified and dirty.
    pub fn try_set_block(&mut self, coord: VoxelCoord, block: BlockType) -> bool {
        let Some(origin) = self.chunk_origin_of(coord) else {
            return false;
        };
        let Some(chunk) = self.chunks.get_mut(&origin) else {
            return false;
        };
        match chunk.set_block(coord, block) {
            Ok(change) => {
                if change.is_change() {
                    self.dirty.insert(origin);
                }
                true
            }
            Err(_) => false,
        }
    }

    /// Dig out a rock cell.
    pub fn dig(&mut self, coord: VoxelCoord) -> DigOutcome {
        match self.get_block(coord) {
            BlockType::None => DigOutcome::OutOfWorld,
            BlockType::Empty => DigOutcome::AlreadyEmpty,
            block if block.is_diggable() => {
                self.try_set_block(coord, BlockType::Empty);
                DigOutcome::Dug
            }
            _ => DigOutcome::Undiggable,
        }
    }

    pub fn in_world(&self, coord: VoxelCoord) -> bool {
        self.get_block(coord).is_valid()
    }

    /// World cell containing a world-space position, `None` before
    /// generation.
    pub fn world_to_grid(&self, pos: WorldPos) -> Option<VoxelCoord> {
        let chunk = self.chunks.values().next()?;
        Some(chunk.grid().world_to_grid(pos, false) + chunk.origin())
    }

    /// World-space center of a world cell, `None` before generation.
    pub fn grid_to_world_center(&self, coord: VoxelCoord) -> Option<WorldPos> {
        let chunk = self.chunks.values().next()?;
        Some(chunk.grid().grid_to_world_center(chunk.to_local(coord), false))
    }

    /// Drain the set of chunks changed since the last call, in origin order.
    pub fn take_dirty_chunks(&mut self) -> Vec<VoxelCoord> {
        std::mem::take(&mut self.dirty).into_iter().collect()
    }

    /// Whether the chunk at `origin` has been edited since generation.
    pub fn is_chunk_modified(&self, origin: VoxelCoord) -> bool {
        self.chunks.get(&origin).is_some_and(Chunk::is_modified)
    }

    /// Union of all chunk footprints.
    pub fn bounds(&self) -> GridBox {
        self.bounds
    }

    pub fn chunk_size(&self) -> VoxelCoord {
        self.chunk_size
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn chunk(&self, origin: VoxelCoord) -> Option<&Chunk> {
        self.chunks.get(&origin)
    }

    /// All chunks in origin order.
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.values()
    }

    pub fn rooms(&self) -> &BTreeMap<VoxelCoord, Room> {
        &self.rooms
    }

    pub(crate) fn insert_room(&mut self, room: Room) {
        self.rooms.insert(room.origin(), room);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> WorldConfig {
        WorldConfig {
            chunk_size: VoxelCoord::splat(4),
            chunk_counts: VoxelCoord::splat(2),
            room_count: (0, 0),
            ..WorldConfig::default()
        }
    }

    fn generated(config: &WorldConfig, seed: u64) -> VoxelWorld {
        let mut world = VoxelWorld::new();
        world.generate(config, &mut WorldRng::new(seed)).unwrap();
        world
    }

    #[test]
    fn empty_world_reads_none() {
        let mut world = VoxelWorld::new();
        assert_eq!(world.get_block(VoxelCoord::ZERO), BlockType::None);
        assert!(!world.try_set_block(VoxelCoord::ZERO, BlockType::Empty));
        assert_eq!(world.world_to_grid(WorldPos::ONE), None);
        assert_eq!(world.dig(VoxelCoord::ZERO), DigOutcome::OutOfWorld);
    }

    #[test]
    fn generation_layers() {
        let world = generated(&small_config(), 1);
        assert_eq!(world.chunk_count(), 8);
        assert_eq!(
            world.bounds(),
            GridBox::new(VoxelCoord::ZERO, VoxelCoord::splat(8))
        );
        for cell in world.bounds().positions() {
            let expect = match cell.y {
                0 => BlockType::Indestructible,
                7 => BlockType::Empty,
                _ => BlockType::Rock,
            };
            assert_eq!(world.get_block(cell), expect, "at {cell}");
        }
    }

    #[test]
    fn surface_and_floor_are_optional() {
        let config = WorldConfig {
            carve_surface: false,
            seal_floor: false,
            ..small_config()
        };
        let world = generated(&config, 1);
        assert!(
            world
                .bounds()
                .positions()
                .all(|c| world.get_block(c) == BlockType::Rock)
        );
    }

    #[test]
    fn outside_cells_are_none() {
        let world = generated(&small_config(), 1);
        for cell in [
            VoxelCoord::new(-1, 3, 3),
            VoxelCoord::new(8, 3, 3),
            VoxelCoord::new(3, -1, 3),
            VoxelCoord::new(3, 3, 8),
        ] {
            assert_eq!(world.get_block(cell), BlockType::None);
            assert!(!world.in_world(cell));
        }
    }

    #[test]
    fn generation_leaves_every_chunk_dirty_and_unmodified() {
        let mut world = generated(&small_config(), 1);
        let dirty = world.take_dirty_chunks();
        assert_eq!(dirty.len(), 8);
        assert!(dirty.windows(2).all(|w| w[0] < w[1]));
        assert!(world.chunks().all(|c| !c.is_modified()));
        assert!(world.take_dirty_chunks().is_empty());
    }

    #[test]
    fn edits_mark_only_the_owning_chunk() {
        let mut world = generated(&small_config(), 1);
        world.take_dirty_chunks();

        let cell = VoxelCoord::new(5, 2, 1);
        assert!(world.try_set_block(cell, BlockType::Empty));
        assert_eq!(world.get_block(cell), BlockType::Empty);

        let owner = VoxelCoord::new(4, 0, 0);
        assert_eq!(world.take_dirty_chunks(), vec![owner]);
        assert!(world.is_chunk_modified(owner));
        assert!(!world.is_chunk_modified(VoxelCoord::ZERO));
    }

    #[test]
    fn rewriting_the_same_block_is_not_an_edit() {
        let mut world = generated(&small_config(), 1);
        world.take_dirty_chunks();
        assert!(world.try_set_block(VoxelCoord::new(1, 2, 1), BlockType::Rock));
        assert!(world.take_dirty_chunks().is_empty());
        assert!(!world.is_chunk_modified(VoxelCoord::ZERO));
    }

    #[test]
    fn out_of_world_write_changes_nothing() {
        let mut world = generated(&small_config(), 1);
        world.take_dirty_chunks();
        assert!(!world.try_set_block(VoxelCoord::new(0, 0, -1), BlockType::Empty));
        assert!(world.take_dirty_chunks().is_empty());
    }

    #[test]
    fn dig_outcomes() {
        let mut world = generated(&small_config(), 1);
        let rock = VoxelCoord::new(2, 3, 2);
        assert_eq!(world.dig(rock), DigOutcome::Dug);
        assert_eq!(world.get_block(rock), BlockType::Empty);
        assert_eq!(world.dig(rock), DigOutcome::AlreadyEmpty);
        assert_eq!(world.dig(VoxelCoord::new(2, 0, 2)), DigOutcome::Undiggable);
        assert_eq!(world.dig(VoxelCoord::new(2, 9, 2)), DigOutcome::OutOfWorld);
    }

    #[test]
    fn conversions_work_in_every_chunk() {
        let config = WorldConfig {
            cell_size: WorldPos::new(2.0, 1.0, 0.5),
            ..small_config()
        };
        let world = generated(&config, 1);
        for cell in [VoxelCoord::new(0, 0, 0), VoxelCoord::new(6, 5, 7), VoxelCoord::new(3, 4, 5)] {
            let center = world.grid_to_world_center(cell).unwrap();
            assert_eq!(world.world_to_grid(center), Some(cell));
        }
        assert_eq!(
            world.grid_to_world_center(VoxelCoord::new(6, 5, 7)),
            Some(WorldPos::new(13.0, 5.5, 3.75))
        );
        assert_eq!(
            world.world_to_grid(WorldPos::new(-0.5, 0.0, 0.0)),
            Some(VoxelCoord::new(-1, 0, 0))
        );
    }

    #[test]
    fn regenerating_discards_prior_state() {
        let config = WorldConfig {
            room_count: (3, 3),
            chunk_size: VoxelCoord::splat(10),
            ..WorldConfig::default()
        };
        let mut world = VoxelWorld::new();
        world.generate(&config, &mut WorldRng::new(4)).unwrap();
        world.dig(VoxelCoord::new(3, 3, 3));
        world.take_dirty_chunks();

        world.generate(&small_config(), &mut WorldRng::new(4)).unwrap();
        assert!(world.rooms().is_empty());
        assert_eq!(world.chunk_count(), 8);
        assert_eq!(world.get_block(VoxelCoord::new(3, 3, 3)), BlockType::Rock);
        assert_eq!(world.take_dirty_chunks().len(), 8);
    }

    #[test]
    fn same_seed_same_world() {
        let config = WorldConfig::default();
        let a = generated(&config, 77);
        let b = generated(&config, 77);
        assert_eq!(a.rooms(), b.rooms());
        assert!(
            a.bounds()
                .positions()
                .all(|c| a.get_block(c) == b.get_block(c))
        );
    }

    #[test]
    fn rooms_are_not_modifications() {
        let config = WorldConfig {
            room_count: (2, 4),
            ..WorldConfig::default()
        };
        let world = generated(&config, 5);
        assert!(!world.rooms().is_empty());
        assert!(world.chunks().all(|c| !c.is_modified()));
    }

    #[test]
    fn unvalidated_room_ranges_do_not_abort_generation() {
        let config = WorldConfig {
            room_count: (3, 1),
            ..small_config()
        };
        let mut world = VoxelWorld::new();
        let report = world.generate(&config, &mut WorldRng::new(2)).unwrap();
        assert_eq!(report.rooms.requested, 0);
        assert!(world.rooms().is_empty());
        assert_eq!(world.chunk_count(), 8);
    }

    #[test]
    fn bad_chunk_layout_is_an_error() {
        let mut world = VoxelWorld::new();
        let zero_size = WorldConfig {
            chunk_size: VoxelCoord::new(4, 0, 4),
            ..small_config()
        };
        assert!(matches!(
            world.generate(&zero_size, &mut WorldRng::new(1)),
            Err(GridError::NonPositiveDimension { .. })
        ));
        assert_eq!(world.chunk_count(), 0);

        let zero_count = WorldConfig {
            chunk_counts: VoxelCoord::new(1, 1, 0),
            ..small_config()
        };
        assert!(world.generate(&zero_count, &mut WorldRng::new(1)).is_err());
    }
}
