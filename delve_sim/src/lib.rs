// delve_sim: chunked voxel world with digging pathfinders.
//
// This crate holds the world model and everything that reasons about it:
// chunked block storage, seeded generation with rooms, and A* searches that
// either walk through open space or tunnel through rock. It has no rendering
// or engine dependencies; a renderer consumes the dirty-chunk set and an AI
// layer consumes paths.
//
// Module overview:
// - `types.rs`:       VoxelCoord, WorldPos, GridBox, BlockType.
// - `error.rs`:       GridError and ConfigError.
// - `grid.rs`:        Grid<V> - dense 3D cell storage with world-space conversion.
// - `chunk.rs`:       Chunk - one block grid at a world origin plus a modified flag.
// - `world.rs`:       VoxelWorld - chunk registry, generation, edits, dirty tracking.
// - `room.rs`:        Room definitions, placement checks, carving, occupants.
// - `astar.rs`:       Generic A* over D-dimensional grids with pluggable cost models.
// - `pathfinding.rs`: World snapshots, walk/dig searches, batched parallel searches.
// - `digger.rs`:      Path follower that digs through rock as it goes.
// - `config.rs`:      WorldConfig + BlockWeights - all tunable parameters, JSON-loadable.
// - `prng`:           Re-exported from `delve_prng` - xoshiro256++ PRNG with SplitMix64 seeding.
//
// **Critical constraint: determinism.** Generation is a pure function of
// `(config, seed)`. All randomness comes from `prng::WorldRng`; iterated
// collections are `BTreeMap`/`BTreeSet`; no system time, no OS entropy.

pub mod astar;
pub mod chunk;
pub mod config;
pub mod digger;
pub mod error;
pub mod grid;
pub mod pathfinding;
pub use delve_prng as prng;
pub mod room;
pub mod types;
pub mod world;
