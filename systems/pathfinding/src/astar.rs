//! A* search over the rectangular field using four-way adjacency.

use std::{cmp::Reverse, collections::BinaryHeap};

use serpentine_core::{heuristic, neighbor, CellCoord, CellId, Direction, FieldSize, ObstacleSet};

/// Waypoint stack produced by the search.
///
/// Cells are stored goal first, so [`Path::pop`] yields the next cell to
/// enter. The start cell is never part of the path.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Path {
    waypoints: Vec<CellCoord>,
}

impl Path {
    /// Removes and returns the next cell to enter.
    pub fn pop(&mut self) -> Option<CellCoord> {
        self.waypoints.pop()
    }

    /// Next cell to enter without removing it.
    #[must_use]
    pub fn peek(&self) -> Option<CellCoord> {
        self.waypoints.last().copied()
    }

    /// Number of remaining waypoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Reports whether no waypoint remains.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Remaining waypoints, goal first.
    #[must_use]
    pub fn as_slice(&self) -> &[CellCoord] {
        &self.waypoints
    }

    /// Remaining waypoints in the order they will be entered.
    pub fn route(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.waypoints.iter().rev().copied()
    }

    /// Cell the path ends on.
    #[must_use]
    pub fn goal(&self) -> Option<CellCoord> {
        self.waypoints.first().copied()
    }
}

/// How a search terminated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SearchStatus {
    /// The goal was reached; the path may be empty when start equals goal.
    Found,
    /// Every reachable cell was explored without meeting the goal.
    Unreachable,
    /// The expansion budget ran out first.
    Exhausted,
}

/// Path together with diagnostics about the search that produced it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchOutcome {
    /// Waypoints leading to the goal; empty unless the goal was found.
    pub path: Path,
    /// How the search terminated.
    pub status: SearchStatus,
    /// Number of nodes moved to the closed set.
    pub expansions: usize,
}

impl SearchOutcome {
    fn unreachable(expansions: usize) -> Self {
        Self {
            path: Path::default(),
            status: SearchStatus::Unreachable,
            expansions,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct SearchNode {
    g: u32,
    h: u32,
    parent: Option<CellId>,
    closed: bool,
}

/// Finds a shortest four-way path from `start` to `goal`, avoiding `obstacles`.
///
/// Returns an empty path when the goal equals the start, lies outside the
/// field, is an obstacle, or cannot be reached.
#[must_use]
pub fn find_path(
    start: CellCoord,
    goal: CellCoord,
    field: FieldSize,
    obstacles: &ObstacleSet,
) -> Path {
    search(start, goal, field, obstacles).path
}

/// Runs the search with a budget of one expansion per field cell.
#[must_use]
pub fn search(
    start: CellCoord,
    goal: CellCoord,
    field: FieldSize,
    obstacles: &ObstacleSet,
) -> SearchOutcome {
    search_bounded(start, goal, field, obstacles, field.cell_count())
}

/// Runs the search, giving up after `max_expansions` closed nodes.
///
/// The start cell may itself be an obstacle, which is the case when planning
/// from a snake head.
#[must_use]
pub fn search_bounded(
    start: CellCoord,
    goal: CellCoord,
    field: FieldSize,
    obstacles: &ObstacleSet,
    max_expansions: usize,
) -> SearchOutcome {
    if !field.contains(start) || !field.contains(goal) {
        return SearchOutcome::unreachable(0);
    }
    if start == goal {
        return SearchOutcome {
            path: Path::default(),
            status: SearchStatus::Found,
            expansions: 0,
        };
    }

    let (width, height) = (field.width(), field.height());
    let start_id = field.cell_id(start);
    let goal_id = field.cell_id(goal);
    if obstacles.contains(goal_id) {
        return SearchOutcome::unreachable(0);
    }

    let mut nodes: Vec<Option<SearchNode>> = vec![None; field.cell_count()];
    let mut open = BinaryHeap::new();

    let h = heuristic(start_id, goal_id, width);
    nodes[slot(start_id)] = Some(SearchNode {
        g: 0,
        h,
        parent: None,
        closed: false,
    });
    open.push(Reverse((h, h, start_id)));

    let mut expansions = 0;
    while let Some(Reverse((f, _, current))) = open.pop() {
        let Some(node) = nodes[slot(current)] else {
            continue;
        };
        // stale heap entry left behind by a relink
        if node.closed || node.g + node.h != f {
            continue;
        }
        if expansions >= max_expansions {
            return SearchOutcome {
                path: Path::default(),
                status: SearchStatus::Exhausted,
                expansions,
            };
        }
        expansions += 1;
        if let Some(entry) = nodes[slot(current)].as_mut() {
            entry.closed = true;
        }

        for direction in Direction::ALL {
            let Some(next) = neighbor(current, direction, width, height) else {
                continue;
            };
            if obstacles.contains(next) {
                continue;
            }

            let g = node.g + 1;
            let index = slot(next);
            // Relink only on a strictly shorter route; equal costs keep the first parent.
            let h = match nodes[index] {
                Some(existing) if existing.closed || g >= existing.g => continue,
                Some(existing) => existing.h,
                None => heuristic(next, goal_id, width),
            };
            nodes[index] = Some(SearchNode {
                g,
                h,
                parent: Some(current),
                closed: false,
            });

            if next == goal_id {
                return SearchOutcome {
                    path: reconstruct(&nodes, goal_id, field),
                    status: SearchStatus::Found,
                    expansions,
                };
            }
            open.push(Reverse((g + h, h, next)));
        }
    }

    SearchOutcome::unreachable(expansions)
}

fn reconstruct(nodes: &[Option<SearchNode>], goal: CellId, field: FieldSize) -> Path {
    let mut waypoints = Vec::new();
    let mut cursor = goal;
    while let Some(parent) = nodes[slot(cursor)].and_then(|node| node.parent) {
        waypoints.push(field.cell_coords(cursor));
        cursor = parent;
    }
    Path { waypoints }
}

fn slot(id: CellId) -> usize {
    id.get() as usize
}
