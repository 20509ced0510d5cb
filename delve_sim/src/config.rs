// Data-driven world configuration.
//
// Every tunable generation and pathfinding parameter lives in `WorldConfig`,
// loaded from JSON. Generation reads from the config rather than from magic
// numbers, so layouts can be rebalanced without recompiling. `Default` gives
// a small playable world.
//
// `BlockWeights` maps block types to the traversal weights used by
// `TraversalMode::Dig` searches.
//
// See also: `world.rs` (consumes chunk layout and surface/floor flags),
// `room.rs` (room definitions and placement budget), `pathfinding.rs`
// (block weights and search options).
//
// **Critical constraint: determinism.** Config values feed directly into
// seeded generation. The same config and seed always produce the same world.

use crate::astar::{IMPASSABLE, SearchOptions};
use crate::error::ConfigError;
use crate::room::RoomDefinition;
use crate::types::{BlockType, VoxelCoord, WorldPos};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Traversal weight per block type, added to the base move cost when a dig
/// search steps onto a cell. `IMPASSABLE` blocks the cell outright.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockWeights {
    pub empty: u32,
    pub rock: u32,
    pub indestructible: u32,
}

impl Default for BlockWeights {
    fn default() -> Self {
        Self {
            empty: 0,
            rock: 40,
            indestructible: IMPASSABLE,
        }
    }
}

impl BlockWeights {
    /// Weight for a block. `BlockType::None` is always impassable.
    pub fn weight(&self, block: BlockType) -> u32 {
        match block {
            BlockType::None => IMPASSABLE,
            BlockType::Empty => self.empty,
            BlockType::Rock => self.rock,
            BlockType::Indestructible => self.indestructible,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Cells per chunk along each axis.
    pub chunk_size: VoxelCoord,
    /// Chunks along each axis. The world is `chunk_size * chunk_counts` cells.
    pub chunk_counts: VoxelCoord,
    /// World-space size of one cell.
    pub cell_size: WorldPos,
    /// Clear the top layer of the world to `Empty`.
    pub carve_surface: bool,
    /// Make the bottom layer of the world `Indestructible`.
    pub seal_floor: bool,
    /// Inclusive `(min, max)` number of rooms to attempt.
    pub room_count: (u32, u32),
    /// Position samples per room before giving up on it.
    pub room_placement_attempts: u32,
    /// Minimum gap in cells between rooms. 0 lets rooms touch.
    pub room_spacing: i32,
    pub rooms: Vec<RoomDefinition>,
    pub block_weights: BlockWeights,
    pub pathfinding: SearchOptions,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            chunk_size: VoxelCoord::splat(10),
            chunk_counts: VoxelCoord::splat(2),
            cell_size: WorldPos::ONE,
            carve_surface: true,
            seal_floor: true,
            room_count: (1, 5),
            room_placement_attempts: 100,
            room_spacing: 1,
            rooms: vec![
                RoomDefinition::new("closet", VoxelCoord::new(3, 3, 3), (0, 1), &["rat"]),
                RoomDefinition::new("den", VoxelCoord::new(5, 3, 4), (1, 3), &["goblin", "rat"]),
                RoomDefinition::new("hall", VoxelCoord::new(7, 4, 5), (2, 5), &["goblin", "troll"]),
            ],
            block_weights: BlockWeights::default(),
            pathfinding: SearchOptions::default(),
        }
    }
}

impl WorldConfig {
    /// Parse and validate a config from a JSON string. Missing fields take
    /// their default values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// World size in cells.
    pub fn world_size(&self) -> VoxelCoord {
        self.chunk_size.scale_by(self.chunk_counts)
    }

    /// Check constraints that serde can't express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size.min_component() <= 0 {
            return Err(invalid(format!(
                "chunk_size {} must be positive on every axis",
                self.chunk_size
            )));
        }
        if self.chunk_counts.min_component() <= 0 {
            return Err(invalid(format!(
                "chunk_counts {} must be positive on every axis",
                self.chunk_counts
            )));
        }
        let c = self.cell_size;
        if [c.x, c.y, c.z].iter().any(|v| v.is_nan() || *v < 0.0) {
            return Err(invalid(format!(
                "cell_size ({}, {}, {}) must not be negative",
                c.x, c.y, c.z
            )));
        }
        if self.room_count.0 > self.room_count.1 {
            return Err(invalid(format!(
                "room_count min {} exceeds max {}",
                self.room_count.0, self.room_count.1
            )));
        }
        if self.room_count.1 > 0 && self.rooms.is_empty() {
            return Err(invalid("room_count allows rooms but no rooms are defined"));
        }
        if self.room_spacing < 0 {
            return Err(invalid(format!(
                "room_spacing {} must not be negative",
                self.room_spacing
            )));
        }
        for def in &self.rooms {
            def.validate().map_err(invalid)?;
        }
        if !self.pathfinding.move_costs.is_consistent() {
            return Err(invalid(format!(
                "move costs {:?} make diagonal shortcuts cheaper than the moves they replace",
                self.pathfinding.move_costs
            )));
        }
        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(msg.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        WorldConfig::default().validate().unwrap();
        assert_eq!(WorldConfig::default().world_size(), VoxelCoord::splat(20));
    }

    #[test]
    fn default_config_serializes() {
        let config = WorldConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let restored: WorldConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config.chunk_size, restored.chunk_size);
        assert_eq!(config.rooms.len(), restored.rooms.len());
        assert_eq!(restored.rooms[1].name, "den");
        assert_eq!(restored.block_weights.indestructible, IMPASSABLE);
        assert_eq!(restored.pathfinding.move_costs.diagonal, 14);
    }

    #[test]
    fn config_loads_from_json_string() {
        let json = r#"{
            "chunk_size": { "x": 8, "y": 6, "z": 8 },
            "chunk_counts": { "x": 3, "y": 1, "z": 2 },
            "room_count": [2, 2],
            "rooms": [
                { "name": "cell", "size": { "x": 2, "y": 2, "z": 2 },
                  "occupants": [1, 1], "kinds": ["bat"] }
            ],
            "block_weights": { "rock": 25 },
            "pathfinding": { "allow_diagonal": true, "max_expansions": 5000 }
        }"#;
        let config = WorldConfig::from_json(json).unwrap();
        assert_eq!(config.world_size(), VoxelCoord::new(24, 6, 16));
        assert_eq!(config.room_count, (2, 2));
        assert_eq!(config.rooms[0].kinds, vec!["bat".to_string()]);
        // Unlisted fields fall back to defaults.
        assert_eq!(config.block_weights.rock, 25);
        assert_eq!(config.block_weights.empty, 0);
        assert!(config.carve_surface);
        assert!(config.pathfinding.allow_diagonal);
        assert_eq!(config.pathfinding.max_expansions, Some(5000));
        assert_eq!(config.pathfinding.move_costs.straight, 10);
    }

    #[test]
    fn rejects_non_positive_chunk_size() {
        let json = r#"{ "chunk_size": { "x": 0, "y": 4, "z": 4 } }"#;
        assert!(matches!(
            WorldConfig::from_json(json),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_inverted_room_count() {
        let config = WorldConfig {
            room_count: (4, 2),
            ..WorldConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_rooms_without_definitions() {
        let config = WorldConfig {
            rooms: Vec::new(),
            ..WorldConfig::default()
        };
        assert!(config.validate().is_err());
        let none_wanted = WorldConfig {
            rooms: Vec::new(),
            room_count: (0, 0),
            ..WorldConfig::default()
        };
        none_wanted.validate().unwrap();
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        assert!(matches!(
            WorldConfig::from_json("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            WorldConfig::load("/nonexistent/delve/world.json"),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn none_block_is_always_impassable() {
        let weights = BlockWeights {
            empty: 1,
            rock: 2,
            indestructible: 3,
        };
        assert_eq!(weights.weight(BlockType::None), IMPASSABLE);
        assert_eq!(weights.weight(BlockType::Indestructible), 3);
    }
}
