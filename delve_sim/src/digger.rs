// Path follower that digs its way through rock.
//
// A `Digger` holds a cell position and the rest of a planned path. Each
// `step` looks at the next planned cell in the live world (not the snapshot
// the path was planned on): empty cells are entered, rock is dug out while
// the digger stays put (the next step then enters the hollowed cell), and
// anything else ends the plan. Digging one cell therefore costs two steps.
//
// See also: `pathfinding.rs` for producing paths (`TraversalMode::Dig`),
// `world.rs` for `dig`.

use crate::types::{BlockType, VoxelCoord};
use crate::world::VoxelWorld;
use log::{debug, trace};
use std::collections::VecDeque;

/// What one `Digger::step` did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiggerStep {
    /// No path left.
    Finished,
    /// Entered this cell.
    Moved(VoxelCoord),
    /// Dug out this cell without moving.
    Dug(VoxelCoord),
    /// This cell can't be entered or dug; the path was dropped.
    Blocked(VoxelCoord),
}

/// Totals from `Digger::run_to_end`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DigRun {
    pub moves: usize,
    pub digs: usize,
    /// Set when the path was fully walked.
    pub finished: bool,
    /// The cell that stopped the digger, if any.
    pub blocked_at: Option<VoxelCoord>,
}

#[derive(Clone, Debug)]
pub struct Digger {
    position: VoxelCoord,
    path: VecDeque<VoxelCoord>,
}

impl Digger {
    pub fn new(position: VoxelCoord) -> Self {
        Self {
            position,
            path: VecDeque::new(),
        }
    }

    pub fn position(&self) -> VoxelCoord {
        self.position
    }

    /// Cells still to be entered.
    pub fn remaining(&self) -> usize {
        self.path.len()
    }

    /// Replace the current plan. A leading cell equal to the current
    /// position is dropped, so search results can be passed as-is.
    pub fn follow(&mut self, path: impl IntoIterator<Item = VoxelCoord>) {
        self.path = path.into_iter().collect();
        if self.path.front() == Some(&self.position) {
            self.path.pop_front();
        }
    }

    pub fn step(&mut self, world: &mut VoxelWorld) -> DiggerStep {
        let Some(&next) = self.path.front() else {
            return DiggerStep::Finished;
        };
        match world.get_block(next) {
            BlockType::Empty => {
                self.path.pop_front();
                self.position = next;
                trace!("digger moved to {next}");
                DiggerStep::Moved(next)
            }
            BlockType::Rock => {
                world.dig(next);
                trace!("digger at {} dug {next}", self.position);
                DiggerStep::Dug(next)
            }
            block @ (BlockType::Indestructible | BlockType::None) => {
                debug!("digger at {} blocked by {block} at {next}", self.position);
                self.path.clear();
                DiggerStep::Blocked(next)
            }
        }
    }

    /// Step until the path is done, blocked, or `max_steps` steps have run.
    pub fn run_to_end(&mut self, world: &mut VoxelWorld, max_steps: usize) -> DigRun {
        let mut run = DigRun::default();
        for _ in 0..max_steps {
            match self.step(world) {
                DiggerStep::Finished => break,
                DiggerStep::Moved(_) => run.moves += 1,
                DiggerStep::Dug(_) => run.digs += 1,
                DiggerStep::Blocked(cell) => {
                    run.blocked_at = Some(cell);
                    return run;
                }
            }
        }
        run.finished = self.path.is_empty();
        run
    }
}
