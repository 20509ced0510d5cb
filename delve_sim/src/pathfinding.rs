// World-facing pathfinding: snapshot the world, then run A* on the copy.
//
// Every search runs against a `GridSnapshot`, a dense owned copy of the block
// types in a box of world cells. Taking the copy first means a search never
// observes a half-applied edit and many searches can share one snapshot in
// parallel (`find_paths`). The world stays free to change while paths are
// followed; a path is a plan, and the follower (`digger.rs`) re-reads the
// world at every step.
//
// Two traversal modes map onto the generic engine's cost models:
// - `Walkable`: only `Empty` cells can be entered, each step costs the base
//   move cost.
// - `Dig`: every block has a weight from `BlockWeights` (rock is expensive,
//   indestructible and out-of-world cells are impassable), cardinal moves
//   only.
//
// Results use world coordinates; snapshot-local coordinates never leak out.
//
// See also: `astar.rs` for the engine, `config.rs` for `BlockWeights`,
// `world.rs` for the world being captured.

use crate::astar::{self, GridShape, PathOutcome, SearchOptions, Walkable, Weighted};
use crate::config::BlockWeights;
use crate::types::{BlockType, GridBox, VoxelCoord};
use crate::world::VoxelWorld;
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// How a searcher treats solid blocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TraversalMode {
    /// Move through empty space only.
    Walkable,
    /// Tunnel through diggable blocks at a weighted cost.
    Dig,
}

/// An owned copy of the block types inside `region`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridSnapshot {
    region: GridBox,
    /// Indexed `x + z * sx + y * sx * sz` relative to `region.min`.
    blocks: Vec<BlockType>,
}

impl GridSnapshot {
    /// Snapshot the whole world.
    pub fn capture(world: &VoxelWorld) -> Self {
        Self::capture_region(world, world.bounds())
    }

    /// Snapshot a box of world cells. Cells outside the world are stored as
    /// `BlockType::None`.
    pub fn capture_region(world: &VoxelWorld, region: GridBox) -> Self {
        let region = if region.is_empty() {
            GridBox::new(region.min, VoxelCoord::ZERO)
        } else {
            region
        };
        let blocks = region.positions().map(|c| world.get_block(c)).collect();
        Self { region, blocks }
    }

    pub fn region(&self) -> GridBox {
        self.region
    }

    /// Block at a world cell, `BlockType::None` outside the region.
    pub fn get(&self, coord: VoxelCoord) -> BlockType {
        self.local_block(self.to_local(coord))
    }

    fn shape(&self) -> GridShape<3> {
        let s = self.region.size;
        GridShape::new([s.x as u32, s.y as u32, s.z as u32])
    }

    fn to_local(&self, coord: VoxelCoord) -> [i32; 3] {
        (coord - self.region.min).to_array()
    }

    fn to_world(&self, local: [i32; 3]) -> VoxelCoord {
        VoxelCoord::from_array(local) + self.region.min
    }

    fn local_block(&self, [x, y, z]: [i32; 3]) -> BlockType {
        let s = self.region.size;
        if x < 0 || y < 0 || z < 0 || x >= s.x || y >= s.y || z >= s.z {
            return BlockType::None;
        }
        let index = x as usize + z as usize * s.x as usize + y as usize * (s.x * s.z) as usize;
        self.blocks[index]
    }
}

/// A search result in world coordinates. `cells` is empty unless the
/// outcome is `Found`; otherwise it runs start to goal inclusive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathResult {
    pub outcome: PathOutcome,
    pub cells: Vec<VoxelCoord>,
    pub total_cost: u64,
    /// Cells the search closed.
    pub expanded: usize,
}

impl PathResult {
    pub fn is_found(&self) -> bool {
        self.outcome == PathOutcome::Found
    }

    pub fn steps(&self) -> usize {
        self.cells.len().saturating_sub(1)
    }
}

/// Snapshot the world and search it.
pub fn find_path(
    world: &VoxelWorld,
    start: VoxelCoord,
    goal: VoxelCoord,
    mode: TraversalMode,
    options: &SearchOptions,
    weights: &BlockWeights,
) -> PathResult {
    find_path_in(&GridSnapshot::capture(world), start, goal, mode, options, weights)
}

/// Search an existing snapshot.
pub fn find_path_in(
    snapshot: &GridSnapshot,
    start: VoxelCoord,
    goal: VoxelCoord,
    mode: TraversalMode,
    options: &SearchOptions,
    weights: &BlockWeights,
) -> PathResult {
    let shape = snapshot.shape();
    let (s, g) = (snapshot.to_local(start), snapshot.to_local(goal));
    let result = match mode {
        TraversalMode::Walkable => {
            let model = Walkable(|c: [i32; 3]| snapshot.local_block(c).is_walkable());
            astar::search(&shape, s, g, &model, options)
        }
        TraversalMode::Dig => {
            let model = Weighted(|c: [i32; 3]| weights.weight(snapshot.local_block(c)));
            astar::search(&shape, s, g, &model, options)
        }
    };

    debug!(
        "{mode:?} search {start} -> {goal}: {:?}, cost {}, {} cells expanded",
        result.outcome, result.total_cost, result.expanded
    );
    PathResult {
        outcome: result.outcome,
        cells: result.cells.into_iter().map(|c| snapshot.to_world(c)).collect(),
        total_cost: result.total_cost,
        expanded: result.expanded,
    }
}

/// Run many searches against one snapshot of the world, in parallel.
/// Results come back in request order.
pub fn find_paths(
    world: &VoxelWorld,
    requests: &[(VoxelCoord, VoxelCoord)],
    mode: TraversalMode,
    options: &SearchOptions,
    weights: &BlockWeights,
) -> Vec<PathResult> {
    let snapshot = GridSnapshot::capture(world);
    requests
        .par_iter()
        .map(|&(start, goal)| find_path_in(&snapshot, start, goal, mode, options, weights))
        .collect()
}

/// Cost of walking `cells` in order through `snapshot`, or `None` if the
/// sequence is not a legal path under `mode`.
pub fn path_cost(
    snapshot: &GridSnapshot,
    cells: &[VoxelCoord],
    mode: TraversalMode,
    options: &SearchOptions,
    weights: &BlockWeights,
) -> Option<u64> {
    let shape = snapshot.shape();
    let local: Vec<[i32; 3]> = cells.iter().map(|&c| snapshot.to_local(c)).collect();
    match mode {
        TraversalMode::Walkable => {
            let model = Walkable(|c: [i32; 3]| snapshot.local_block(c).is_walkable());
            astar::path_cost(&shape, &local, &model, options)
        }
        TraversalMode::Dig => {
            let model = Weighted(|c: [i32; 3]| weights.weight(snapshot.local_block(c)));
            astar::path_cost(&shape, &local, &model, options)
        }
    }
}
