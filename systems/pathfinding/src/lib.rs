#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Path planning and steering for the snake.
//!
//! [`astar`] holds the grid search itself; [`Navigator`] is the pure system
//! that turns target selections into heading changes.

pub mod astar;

use serpentine_core::{CellCoord, Command, Direction, Event, FieldSize, ObstacleSet, SnakeSnapshot};
use tracing::debug;

pub use astar::{find_path, search, search_bounded, Path, SearchOutcome, SearchStatus};

/// Pure system that follows a planned path by emitting heading changes.
///
/// The navigator keeps the waypoint stack for the current target. It pops a
/// waypoint every time the head enters the pending cell and abandons the
/// path as soon as the snake diverges from it.
#[derive(Debug, Default)]
pub struct Navigator {
    path: Path,
    pending: Option<CellCoord>,
    target: Option<CellCoord>,
}

impl Navigator {
    /// Consumes world events and the snake state to emit steering commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        snake: &SnakeSnapshot,
        obstacles: &ObstacleSet,
        field: FieldSize,
        out: &mut Vec<Command>,
    ) {
        let mut replan = false;
        for event in events {
            match event {
                Event::TargetSelected { cell, .. } => {
                    replan = false;
                    self.plan(snake, *cell, obstacles, field);
                }
                Event::SnakeAdvanced { to, .. } => self.arrive(*to),
                Event::SegmentConsumed { cell, .. } => {
                    if self.pending.is_some_and(|waypoint| waypoint != *cell) {
                        replan = true;
                    } else {
                        self.arrive(*cell);
                    }
                }
                Event::DirectionChanged {
                    direction,
                    reversed,
                    ..
                } => {
                    let expected = self
                        .pending
                        .and_then(|waypoint| snake.head.direction_to(waypoint));
                    if *reversed || (self.pending.is_some() && expected != Some(*direction)) {
                        self.abandon("heading overridden");
                    }
                }
                Event::SnakeDied { .. } | Event::SnakeSpawned { .. } | Event::CookiesCleared => {
                    replan = false;
                    self.clear();
                }
                _ => {}
            }
        }

        // Swallowing pushes the head one cell past the waypoint it entered.
        if replan {
            if let Some(target) = self.target {
                debug!(head = %snake.head, %target, "head displaced by a swallow, replanning");
                self.plan(snake, target, obstacles, field);
            }
        }

        if !snake.alive {
            return;
        }
        let Some(waypoint) = self.pending else {
            return;
        };
        match snake.head.direction_to(waypoint) {
            Some(direction) if direction == snake.direction => {}
            Some(direction) if direction.is_reverse_of(snake.direction) => {
                self.abandon("waypoint lies behind the head");
            }
            Some(direction) => out.push(Command::SetDirection { direction }),
            None => self.abandon("waypoint is not adjacent to the head"),
        }
    }

    /// Remaining waypoints, goal first, excluding the pending one.
    #[must_use]
    pub fn waypoints(&self) -> &Path {
        &self.path
    }

    /// Cell the snake is about to enter under navigation.
    #[must_use]
    pub fn pending(&self) -> Option<CellCoord> {
        self.pending
    }

    /// Cell the current path ends on.
    #[must_use]
    pub fn target(&self) -> Option<CellCoord> {
        self.target
    }

    /// Heading the navigator steers toward, if any.
    #[must_use]
    pub fn desired_direction(&self, snake: &SnakeSnapshot) -> Option<Direction> {
        self.pending
            .and_then(|waypoint| snake.head.direction_to(waypoint))
    }

    fn plan(
        &mut self,
        snake: &SnakeSnapshot,
        target: CellCoord,
        obstacles: &ObstacleSet,
        field: FieldSize,
    ) {
        self.clear();
        if !snake.alive {
            return;
        }

        let outcome = search(snake.head, target, field, obstacles);
        debug!(
            from = %snake.head,
            to = %target,
            status = ?outcome.status,
            expansions = outcome.expansions,
            length = outcome.path.len(),
            "path planned"
        );

        self.path = outcome.path;
        self.pending = self.path.pop();
        if self.pending.is_some() {
            self.target = Some(target);
        }
    }

    fn arrive(&mut self, cell: CellCoord) {
        match self.pending {
            Some(waypoint) if waypoint == cell => {
                self.pending = self.path.pop();
                if self.pending.is_none() {
                    debug!(%cell, "target reached");
                    self.target = None;
                }
            }
            Some(_) => self.abandon("head left the planned path"),
            None => {}
        }
    }

    fn abandon(&mut self, reason: &str) {
        if self.pending.is_some() {
            debug!(reason, "path abandoned");
        }
        self.clear();
    }

    fn clear(&mut self) {
        self.path = Path::default();
        self.pending = None;
        self.target = None;
    }
}
