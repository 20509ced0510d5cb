// Room placement: carving hollow boxes into rock and populating them.
//
// A `RoomDefinition` is a template (size, occupant count range, occupant
// kinds) from `WorldConfig::rooms`. `spawn_rooms` draws a room count, then for
// each room picks a definition and samples positions until one fits or the
// attempt budget runs out. A fitting position is fully inside the world and
// clear of every placed room's box inflated by `room_spacing`. Failed rooms
// are logged and skipped; generation always continues.
//
// Sampled positions keep a one-cell shell on every face of the world:
// `[min + 1, max - size)` per axis. A definition too large for that range is
// skipped without sampling.
//
// Occupants are only recorded (kind + cell). Turning them into actors
// belongs to whatever embeds the world.
//
// See also: `world.rs`, which calls `spawn_rooms` during generation and owns
// the room registry.
//
// **Critical constraint: determinism.** Every random draw comes from the
// caller's `WorldRng`, in a fixed order.

use crate::config::WorldConfig;
use crate::types::{BlockType, GridBox, VoxelCoord};
use crate::world::VoxelWorld;
use delve_prng::WorldRng;
use log::{debug, info, warn};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// Template for a kind of room.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomDefinition {
    pub name: String,
    pub size: VoxelCoord,
    /// Inclusive `(min, max)` occupant count, capped by room volume.
    pub occupants: (u32, u32),
    /// Occupant kinds, drawn uniformly per occupant.
    #[serde(default)]
    pub kinds: Vec<String>,
}

impl RoomDefinition {
    pub fn new(name: &str, size: VoxelCoord, occupants: (u32, u32), kinds: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            size,
            occupants,
            kinds: kinds.iter().map(|k| k.to_string()).collect(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.size.min_component() <= 0 {
            return Err(format!(
                "room '{}' has non-positive size {}",
                self.name, self.size
            ));
        }
        if self.occupants.0 > self.occupants.1 {
            return Err(format!(
                "room '{}' occupant min {} exceeds max {}",
                self.name, self.occupants.0, self.occupants.1
            ));
        }
        if self.occupants.1 > 0 && self.kinds.is_empty() {
            return Err(format!("room '{}' has occupants but no kinds", self.name));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupant {
    pub kind: String,
    pub cell: VoxelCoord,
}

/// A placed room.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Name of the definition it was built from.
    pub definition: String,
    pub bounds: GridBox,
    pub occupants: Vec<Occupant>,
}

impl Room {
    pub fn origin(&self) -> VoxelCoord {
        self.bounds.min
    }
}

/// Outcome of one `spawn_rooms` pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoomReport {
    /// Rooms the count draw asked for.
    pub requested: u32,
    pub placed: u32,
    /// Definition names that found no position, in attempt order.
    pub failed: Vec<String>,
}

/// Whether `candidate` fits inside `world_bounds` without intersecting any
/// of `rooms` grown by `spacing` cells.
pub fn can_place<'a>(
    world_bounds: &GridBox,
    rooms: impl IntoIterator<Item = &'a Room>,
    candidate: &GridBox,
    spacing: i32,
) -> bool {
    if candidate.is_empty() || !world_bounds.contains_box(candidate) {
        return false;
    }
    rooms
        .into_iter()
        .all(|room| !room.bounds.inflate(spacing).intersects(candidate))
}

/// Carve `definition` at `position` and spawn its occupants. Does not check
/// fit and does not register the room with the world. An inverted occupant
/// range or an empty kind list spawns nobody.
pub fn place(
    world: &mut VoxelWorld,
    definition: &RoomDefinition,
    position: VoxelCoord,
    rng: &mut WorldRng,
) -> Room {
    let bounds = GridBox::new(position, definition.size);
    for cell in bounds.positions() {
        world.try_set_block(cell, BlockType::Empty);
    }

    let (lo, hi) = definition.occupants;
    let count = if definition.kinds.is_empty() {
        0
    } else if lo > hi {
        warn!(
            "room '{}' has inverted occupant range {lo}..={hi}, spawning none",
            definition.name
        );
        0
    } else {
        u64::from(rng.range_u32_inclusive(lo, hi)).min(bounds.volume())
    };

    let mut taken = FxHashSet::default();
    let mut occupants = Vec::with_capacity(count as usize);
    while (occupants.len() as u64) < count {
        let cell = random_cell(&bounds, rng);
        if !taken.insert(cell) {
            continue;
        }
        if let Some(kind) = rng.pick(&definition.kinds) {
            occupants.push(Occupant {
                kind: kind.clone(),
                cell,
            });
        }
    }

    debug!(
        "placed room '{}' at {} with {} occupants",
        definition.name,
        bounds,
        occupants.len()
    );
    Room {
        definition: definition.name.clone(),
        bounds,
        occupants,
    }
}

/// Place a random number of rooms from `config.rooms` into `world`.
pub fn spawn_rooms(world: &mut VoxelWorld, config: &WorldConfig, rng: &mut WorldRng) -> RoomReport {
    let (lo, hi) = config.room_count;
    if lo > hi {
        warn!("inverted room_count {lo}..={hi}, placing no rooms");
        return RoomReport::default();
    }
    let mut report = RoomReport {
        requested: rng.range_u32_inclusive(lo, hi),
        ..RoomReport::default()
    };

    for _ in 0..report.requested {
        let Some(definition) = rng.pick(&config.rooms) else {
            warn!("no room definitions configured");
            break;
        };
        match find_position(world, definition, config, rng) {
            Some(position) => {
                let room = place(world, definition, position, rng);
                world.insert_room(room);
                report.placed += 1;
            }
            None => {
                warn!(
                    "failed to place room '{}' after {} attempts",
                    definition.name, config.room_placement_attempts
                );
                report.failed.push(definition.name.clone());
            }
        }
    }

    info!("placed {} of {} rooms", report.placed, report.requested);
    report
}

fn find_position(
    world: &VoxelWorld,
    definition: &RoomDefinition,
    config: &WorldConfig,
    rng: &mut WorldRng,
) -> Option<VoxelCoord> {
    let bounds = world.bounds();
    let low = bounds.min + VoxelCoord::splat(1);
    let high = bounds.max() - definition.size;
    if low.x >= high.x || low.y >= high.y || low.z >= high.z {
        debug!(
            "room '{}' of size {} cannot fit in {}",
            definition.name, definition.size, bounds
        );
        return None;
    }

    for _ in 0..config.room_placement_attempts {
        let position = VoxelCoord::new(
            rng.range_i32(low.x, high.x),
            rng.range_i32(low.y, high.y),
            rng.range_i32(low.z, high.z),
        );
        let candidate = GridBox::new(position, definition.size);
        if can_place(&bounds, world.rooms().values(), &candidate, config.room_spacing) {
            return Some(position);
        }
    }
    None
}

fn random_cell(bounds: &GridBox, rng: &mut WorldRng) -> VoxelCoord {
    let max = bounds.max();
    VoxelCoord::new(
        rng.range_i32(bounds.min.x, max.x),
        rng.range_i32(bounds.min.y, max.y),
        rng.range_i32(bounds.min.z, max.z),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room_at(min: VoxelCoord, size: VoxelCoord) -> Room {
        Room {
            definition: "test".into(),
            bounds: GridBox::new(min, size),
            occupants: Vec::new(),
        }
    }

    /// Solid-rock world with no rooms, no surface and no floor.
    fn rock_world(chunk: i32, counts: i32) -> VoxelWorld {
        let config = WorldConfig {
            chunk_size: VoxelCoord::splat(chunk),
            chunk_counts: VoxelCoord::splat(counts),
            carve_surface: false,
            seal_floor: false,
            room_count: (0, 0),
            ..WorldConfig::default()
        };
        let mut world = VoxelWorld::new();
        world.generate(&config, &mut WorldRng::new(1)).unwrap();
        world
    }

    #[test]
    fn can_place_requires_full_containment() {
        let world = GridBox::new(VoxelCoord::ZERO, VoxelCoord::splat(10));
        let inside = GridBox::new(VoxelCoord::new(6, 6, 6), VoxelCoord::splat(4));
        let poking_out = GridBox::new(VoxelCoord::new(7, 6, 6), VoxelCoord::splat(4));
        let none: [Room; 0] = [];
        assert!(can_place(&world, &none, &inside, 0));
        assert!(!can_place(&world, &none, &poking_out, 0));
    }

    #[test]
    fn can_place_rejects_overlap_and_respects_spacing() {
        let world = GridBox::new(VoxelCoord::ZERO, VoxelCoord::splat(20));
        let placed = [room_at(VoxelCoord::splat(2), VoxelCoord::splat(3))];
        let overlapping = GridBox::new(VoxelCoord::splat(4), VoxelCoord::splat(3));
        // Touches the placed room's +x face.
        let touching = GridBox::new(VoxelCoord::new(5, 2, 2), VoxelCoord::splat(3));
        let gapped = GridBox::new(VoxelCoord::new(6, 2, 2), VoxelCoord::splat(3));

        assert!(!can_place(&world, &placed, &overlapping, 0));
        assert!(can_place(&world, &placed, &touching, 0));
        assert!(!can_place(&world, &placed, &touching, 1));
        assert!(can_place(&world, &placed, &gapped, 1));
    }

    #[test]
    fn place_carves_every_cell() {
        let mut world = rock_world(8, 1);
        let def = RoomDefinition::new("box", VoxelCoord::new(3, 2, 4), (0, 0), &[]);
        let room = place(&mut world, &def, VoxelCoord::new(2, 3, 1), &mut WorldRng::new(5));
        assert_eq!(room.bounds.volume(), 24);
        for cell in room.bounds.positions() {
            assert_eq!(world.get_block(cell), BlockType::Empty);
        }
        // Neighbors outside the room stay rock.
        assert_eq!(world.get_block(VoxelCoord::new(1, 3, 1)), BlockType::Rock);
        assert_eq!(world.get_block(VoxelCoord::new(5, 3, 1)), BlockType::Rock);
        assert!(room.occupants.is_empty());
    }

    #[test]
    fn occupants_are_distinct_and_inside() {
        let mut world = rock_world(8, 1);
        let def = RoomDefinition::new("den", VoxelCoord::splat(3), (5, 9), &["rat", "bat"]);
        let mut rng = WorldRng::new(11);
        for _ in 0..20 {
            let room = place(&mut world, &def, VoxelCoord::splat(2), &mut rng);
            let n = room.occupants.len();
            assert!((5..=9).contains(&n), "count {n} outside range");
            let cells: FxHashSet<_> = room.occupants.iter().map(|o| o.cell).collect();
            assert_eq!(cells.len(), n);
            for o in &room.occupants {
                assert!(room.bounds.contains(o.cell));
                assert!(def.kinds.contains(&o.kind));
            }
        }
    }

    #[test]
    fn occupant_count_is_capped_by_volume() {
        let mut world = rock_world(8, 1);
        let def = RoomDefinition::new("tiny", VoxelCoord::new(2, 1, 2), (50, 50), &["rat"]);
        let room = place(&mut world, &def, VoxelCoord::splat(3), &mut WorldRng::new(2));
        assert_eq!(room.occupants.len(), 4);
    }

    #[test]
    fn inverted_occupant_range_spawns_nobody() {
        let mut world = rock_world(8, 1);
        let def = RoomDefinition::new("bad", VoxelCoord::splat(2), (3, 1), &["rat"]);
        let room = place(&mut world, &def, VoxelCoord::splat(2), &mut WorldRng::new(4));
        assert!(room.occupants.is_empty());
        // The room is still carved.
        assert!(room.bounds.positions().all(|c| world.get_block(c) == BlockType::Empty));
    }

    #[test]
    fn inverted_room_count_places_nothing() {
        let mut world = rock_world(10, 2);
        let config = WorldConfig {
            room_count: (3, 1),
            ..WorldConfig::default()
        };
        let report = spawn_rooms(&mut world, &config, &mut WorldRng::new(6));
        assert_eq!(report, RoomReport::default());
        assert!(world.rooms().is_empty());
    }

    #[test]
    fn spawned_rooms_are_contained_and_disjoint() {
        let mut world = rock_world(10, 2);
        let config = WorldConfig {
            room_count: (6, 6),
            room_spacing: 1,
            ..WorldConfig::default()
        };
        let report = spawn_rooms(&mut world, &config, &mut WorldRng::new(42));
        assert_eq!(report.requested, 6);
        assert_eq!(report.placed as usize, world.rooms().len());
        assert_eq!(report.placed as usize + report.failed.len(), 6);

        let shell = world.bounds().inflate(-1);
        let rooms: Vec<&Room> = world.rooms().values().collect();
        for (i, a) in rooms.iter().enumerate() {
            assert!(shell.contains_box(&a.bounds), "{} leaves the shell", a.bounds);
            for cell in a.bounds.positions() {
                assert_eq!(world.get_block(cell), BlockType::Empty);
            }
            for b in &rooms[i + 1..] {
                assert!(!a.bounds.inflate(1).intersects(&b.bounds));
            }
        }
    }

    #[test]
    fn oversized_room_fails_without_panicking() {
        let mut world = rock_world(4, 1);
        let config = WorldConfig {
            room_count: (3, 3),
            rooms: vec![RoomDefinition::new("huge", VoxelCoord::splat(4), (0, 0), &[])],
            ..WorldConfig::default()
        };
        let report = spawn_rooms(&mut world, &config, &mut WorldRng::new(3));
        assert_eq!(report.placed, 0);
        assert_eq!(report.failed, vec!["huge", "huge", "huge"]);
        assert!(world.rooms().is_empty());
    }

    #[test]
    fn crowded_world_places_fewer_than_requested() {
        // Only one 4x4x4 room fits in the 6x6x6 interior.
        let mut world = rock_world(8, 1);
        let config = WorldConfig {
            room_count: (3, 3),
            room_placement_attempts: 50,
            room_spacing: 0,
            rooms: vec![RoomDefinition::new("block", VoxelCoord::splat(4), (0, 0), &[])],
            ..WorldConfig::default()
        };
        let report = spawn_rooms(&mut world, &config, &mut WorldRng::new(8));
        assert_eq!(report.placed, 1);
        assert_eq!(report.failed.len(), 2);
    }

    #[test]
    fn definition_validation() {
        assert!(RoomDefinition::new("ok", VoxelCoord::splat(2), (0, 2), &["rat"]).validate().is_ok());
        assert!(RoomDefinition::new("flat", VoxelCoord::new(2, 0, 2), (0, 0), &[]).validate().is_err());
        assert!(RoomDefinition::new("inv", VoxelCoord::splat(2), (3, 1), &["rat"]).validate().is_err());
        assert!(RoomDefinition::new("nobody", VoxelCoord::splat(2), (1, 1), &[]).validate().is_err());
    }
}
