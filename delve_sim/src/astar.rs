// Grid A*, generic over dimensionality and cost model.
//
// One engine serves every search in the crate. Three things vary, and each
// is a parameter rather than a separate copy of the algorithm:
//
// - dimensionality: const generic `D`, coordinates are `[i32; D]` inside a
//   `GridShape<D>` (2D and 3D are both exercised by tests);
// - cost model: the `CostModel<D>` trait. `Walkable` gives binary
//   walkable/blocked semantics, `Weighted` charges `base + weight(target)`;
// - diagonal movement: `SearchOptions::allow_diagonal`, honored only when the
//   cost model supports it (`Weighted` is cardinal-only).
//
// The open set is a `BinaryHeap` used as a min-heap via reversed ordering,
// with lazy deletion: improved nodes are pushed again and stale entries are
// skipped when popped.
// Per-node bookkeeping lives in a `Vec` indexed by flat cell index. All
// scratch state is owned by the `search` call and dropped on every return
// path.
//
// Neighbor offsets are derived from every nonzero vector in `{-1, 0, 1}^D`,
// filtered to single-axis moves when diagonals are off: 4/8 in 2D, 6/26 in 3D.
//
// See also: `pathfinding.rs`, which adapts world snapshots to this engine.
//
// **Critical constraint: determinism.** Ties in F are broken by lower H, then
// lower cell index, so equal inputs always produce the same path.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Weight sentinel for cells that can never be entered in weighted mode.
pub const IMPASSABLE: u32 = u32::MAX;

/// Base cost of one move, by how many axes the move changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveCosts {
    /// One axis (face neighbor).
    pub straight: u32,
    /// Two axes (edge neighbor).
    pub diagonal: u32,
    /// Three axes (corner neighbor).
    pub diagonal_3d: u32,
}

impl Default for MoveCosts {
    fn default() -> Self {
        Self {
            straight: 10,
            diagonal: 14,
            diagonal_3d: 17,
        }
    }
}

impl MoveCosts {
    /// Cost of a move touching `axes` axes. Moves across more than three axes
    /// (only possible for `D > 3`) are charged as corner moves.
    pub fn for_axes(&self, axes: usize) -> u32 {
        match axes {
            0 => 0,
            1 => self.straight,
            2 => self.diagonal,
            _ => self.diagonal_3d,
        }
    }

    /// The octile heuristic stays admissible only if no multi-axis move is
    /// cheaper to replace by smaller moves: `straight <= diagonal <= 2 *
    /// straight` and `diagonal <= diagonal_3d <= diagonal + straight`.
    pub fn is_consistent(&self) -> bool {
        self.straight > 0
            && self.straight <= self.diagonal
            && self.diagonal <= self.straight.saturating_mul(2)
            && self.diagonal <= self.diagonal_3d
            && self.diagonal_3d <= self.diagonal.saturating_add(self.straight)
    }
}

/// Per-search tuning. Lives in `WorldConfig::pathfinding`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// Allow edge and corner moves. Ignored by cost models that don't
    /// support diagonals.
    pub allow_diagonal: bool,
    pub move_costs: MoveCosts,
    /// Give up after closing this many cells. `None` searches exhaustively.
    pub max_expansions: Option<usize>,
}

/// Extent of a `D`-dimensional search grid. Cells are `[0, extent)` per axis
/// and flatten with axis 0 fastest.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridShape<const D: usize> {
    extent: [u32; D],
}

impl<const D: usize> GridShape<D> {
    pub fn new(extent: [u32; D]) -> Self {
        Self { extent }
    }

    pub fn extent(&self) -> [u32; D] {
        self.extent
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.extent.iter().map(|&e| e as usize).product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, cell: [i32; D]) -> bool {
        self.index(cell).is_some()
    }

    /// Flat index of a cell, `None` when out of bounds.
    pub fn index(&self, cell: [i32; D]) -> Option<usize> {
        let mut index = 0usize;
        let mut stride = 1usize;
        for (&v, &e) in cell.iter().zip(&self.extent) {
            if v < 0 || v as u32 >= e {
                return None;
            }
            index += v as usize * stride;
            stride *= e as usize;
        }
        Some(index)
    }

    /// Inverse of `index`. `index` must be `< len()`.
    pub fn cell(&self, mut index: usize) -> [i32; D] {
        std::array::from_fn(|k| {
            let e = self.extent[k] as usize;
            let v = index % e;
            index /= e;
            v as i32
        })
    }
}

/// How expensive it is to step onto a cell.
pub trait CostModel<const D: usize> {
    /// Cost of entering `cell` by a move whose base cost is `base`, or `None`
    /// if the cell can't be entered at all. Widened to `u64` so that a large
    /// finite weight never rounds up to the blocked sentinel.
    fn enter_cost(&self, cell: [i32; D], base: u32) -> Option<u64>;

    /// Whether diagonal moves are meaningful for this model.
    fn supports_diagonal(&self) -> bool {
        true
    }
}

/// Binary semantics: walkable cells cost the base move, others are excluded.
pub struct Walkable<F>(pub F);

impl<const D: usize, F: Fn([i32; D]) -> bool> CostModel<D> for Walkable<F> {
    fn enter_cost(&self, cell: [i32; D], base: u32) -> Option<u64> {
        (self.0)(cell).then_some(u64::from(base))
    }
}

/// Weighted semantics: entering costs `base + weight(cell)`; a weight of
/// `IMPASSABLE` blocks the cell. Cardinal-only.
pub struct Weighted<F>(pub F);

impl<const D: usize, F: Fn([i32; D]) -> u32> CostModel<D> for Weighted<F> {
    fn enter_cost(&self, cell: [i32; D], base: u32) -> Option<u64> {
        match (self.0)(cell) {
            IMPASSABLE => None,
            weight => Some(u64::from(base) + u64::from(weight)),
        }
    }

    fn supports_diagonal(&self) -> bool {
        false
    }
}

/// Why a search ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathOutcome {
    /// A path was found; `cells` runs start to goal.
    Found,
    /// Start and goal are the same cell; no movement needed.
    AlreadyThere,
    /// The reachable region was exhausted without touching the goal.
    NoPath,
    /// Start or goal lies outside the grid; no search was run.
    OutOfBounds,
    /// `max_expansions` was hit before the goal was reached.
    BudgetExhausted,
}

/// The result of one search. `cells` is empty unless `outcome == Found`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchResult<const D: usize> {
    pub outcome: PathOutcome,
    /// Start to goal, both inclusive.
    pub cells: Vec<[i32; D]>,
    /// Sum of step costs along `cells`.
    pub total_cost: u64,
    /// Cells closed during the search.
    pub expanded: usize,
}

impl<const D: usize> SearchResult<D> {
    fn empty(outcome: PathOutcome, expanded: usize) -> Self {
        Self {
            outcome,
            cells: Vec::new(),
            total_cost: 0,
            expanded,
        }
    }

    pub fn is_found(&self) -> bool {
        self.outcome == PathOutcome::Found
    }

    /// Number of moves (one less than the number of cells).
    pub fn steps(&self) -> usize {
        self.cells.len().saturating_sub(1)
    }
}

/// Every move offset in `D` dimensions: single-axis moves only, or all
/// nonzero combinations of `{-1, 0, 1}` when `diagonal` is set.
pub fn neighbor_offsets<const D: usize>(diagonal: bool) -> SmallVec<[[i32; D]; 26]> {
    let combos = 3usize.pow(D as u32);
    (0..combos)
        .map(|n| {
            let mut rest = n;
            std::array::from_fn(|_| {
                let v = (rest % 3) as i32 - 1;
                rest /= 3;
                v
            })
        })
        .filter(|offset: &[i32; D]| {
            let axes = axes_moved(offset);
            axes == 1 || (diagonal && axes > 1)
        })
        .collect()
}

fn axes_moved<const D: usize>(offset: &[i32; D]) -> usize {
    offset.iter().filter(|&&v| v != 0).count()
}

/// Lower bound on the cost from `from` to `to`.
///
/// Without diagonals: Manhattan distance times `straight`. With diagonals:
/// the octile generalization. With per-axis distances sorted descending
/// `a >= b >= c`, the cheapest open-grid route is `c` corner moves, `b - c`
/// edge moves and `a - b` face moves.
pub fn heuristic<const D: usize>(
    from: [i32; D],
    to: [i32; D],
    costs: &MoveCosts,
    diagonal: bool,
) -> u64 {
    let mut d: [u64; D] = std::array::from_fn(|k| u64::from(from[k].abs_diff(to[k])));
    if !diagonal {
        return d
            .iter()
            .fold(0u64, |acc, &v| acc.saturating_add(v))
            .saturating_mul(u64::from(costs.straight));
    }
    d.sort_unstable_by(|a, b| b.cmp(a));
    d.iter()
        .enumerate()
        .map(|(k, &dk)| {
            let next = d.get(k + 1).copied().unwrap_or(0);
            (dk - next).saturating_mul(u64::from(costs.for_axes(k + 1)))
        })
        .fold(0u64, u64::saturating_add)
}

const NO_PARENT: u32 = u32::MAX;

#[derive(Clone, Copy, PartialEq, Eq)]
enum NodeState {
    Unseen,
    Open,
    Closed,
}

/// Search bookkeeping for one cell. F is not stored; it is `g + h` at push
/// time and lives in the heap entry.
#[derive(Clone, Copy)]
struct PathNode {
    g: u64,
    h: u64,
    parent: u32,
    state: NodeState,
}

impl PathNode {
    const UNSEEN: Self = Self {
        g: u64::MAX,
        h: 0,
        parent: NO_PARENT,
        state: NodeState::Unseen,
    };
}

/// Entry in the open set (min-heap via reversed ordering).
#[derive(PartialEq, Eq)]
struct OpenEntry {
    f: u64,
    h: u64,
    index: u32,
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: the smallest f (then h, then index) is "greatest".
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.h.cmp(&self.h))
            .then_with(|| other.index.cmp(&self.index))
    }
}

/// Find a minimum-cost path from `start` to `goal`.
///
/// Never fails: unreachable goals, out-of-bounds endpoints, `start == goal`
/// and an exhausted budget are all reported through `PathOutcome` with an
/// empty `cells`.
pub fn search<const D: usize, M: CostModel<D>>(
    shape: &GridShape<D>,
    start: [i32; D],
    goal: [i32; D],
    model: &M,
    options: &SearchOptions,
) -> SearchResult<D> {
    let (Some(start_i), Some(goal_i)) = (shape.index(start), shape.index(goal)) else {
        return SearchResult::empty(PathOutcome::OutOfBounds, 0);
    };
    if start_i == goal_i {
        return SearchResult::empty(PathOutcome::AlreadyThere, 0);
    }

    let diagonal = options.allow_diagonal && model.supports_diagonal();
    let offsets = neighbor_offsets::<D>(diagonal);
    let costs = &options.move_costs;

    let mut nodes = vec![PathNode::UNSEEN; shape.len()];
    let h_start = heuristic(start, goal, costs, diagonal);
    nodes[start_i] = PathNode {
        g: 0,
        h: h_start,
        parent: NO_PARENT,
        state: NodeState::Open,
    };

    let mut open = BinaryHeap::new();
    open.push(OpenEntry {
        f: h_start,
        h: h_start,
        index: start_i as u32,
    });
    let mut expanded = 0usize;

    while let Some(entry) = open.pop() {
        let ci = entry.index as usize;
        if nodes[ci].state == NodeState::Closed {
            continue; // Stale duplicate.
        }
        if ci == goal_i {
            return reconstruct(shape, &nodes, goal_i, expanded);
        }
        if options.max_expansions.is_some_and(|limit| expanded >= limit) {
            return SearchResult::empty(PathOutcome::BudgetExhausted, expanded);
        }

        nodes[ci].state = NodeState::Closed;
        expanded += 1;

        let current = shape.cell(ci);
        let current_g = nodes[ci].g;

        for offset in &offsets {
            let next: [i32; D] = std::array::from_fn(|k| current[k] + offset[k]);
            let Some(ni) = shape.index(next) else {
                continue;
            };
            if nodes[ni].state == NodeState::Closed {
                continue;
            }
            let Some(step) = model.enter_cost(next, costs.for_axes(axes_moved(offset))) else {
                continue;
            };

            let tentative = current_g.saturating_add(step);
            let node = &mut nodes[ni];
            if tentative >= node.g {
                continue;
            }
            if node.state == NodeState::Unseen {
                node.h = heuristic(next, goal, costs, diagonal);
            }
            node.g = tentative;
            node.parent = ci as u32;
            node.state = NodeState::Open;
            open.push(OpenEntry {
                f: tentative.saturating_add(node.h),
                h: node.h,
                index: ni as u32,
            });
        }
    }

    SearchResult::empty(PathOutcome::NoPath, expanded)
}

/// Walk parent links back from the goal, then flip to start-to-goal order.
fn reconstruct<const D: usize>(
    shape: &GridShape<D>,
    nodes: &[PathNode],
    goal_i: usize,
    expanded: usize,
) -> SearchResult<D> {
    let mut cells = Vec::new();
    let mut i = goal_i as u32;
    loop {
        cells.push(shape.cell(i as usize));
        let parent = nodes[i as usize].parent;
        if parent == NO_PARENT {
            break;
        }
        i = parent;
    }
    cells.reverse();

    SearchResult {
        outcome: PathOutcome::Found,
        cells,
        total_cost: nodes[goal_i].g,
        expanded,
    }
}

/// Recompute the cost of walking `cells` in order under `model`.
///
/// Returns `None` if any step is not a single allowed move, leaves the grid,
/// or enters a blocked cell. An empty or single-cell sequence costs 0.
pub fn path_cost<const D: usize, M: CostModel<D>>(
    shape: &GridShape<D>,
    cells: &[[i32; D]],
    model: &M,
    options: &SearchOptions,
) -> Option<u64> {
    let diagonal = options.allow_diagonal && model.supports_diagonal();
    if cells.first().is_some_and(|c| !shape.contains(*c)) {
        return None;
    }
    let mut total = 0u64;
    for pair in cells.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let offset: [i32; D] = std::array::from_fn(|k| b[k] - a[k]);
        let axes = axes_moved(&offset);
        let unit = offset.iter().all(|v| v.abs() <= 1);
        if !unit || axes == 0 || (axes > 1 && !diagonal) || !shape.contains(b) {
            return None;
        }
        let step = model.enter_cost(b, options.move_costs.for_axes(axes))?;
        total = total.saturating_add(step);
    }
    Some(total)
}
