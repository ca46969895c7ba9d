//! Movement and collision controller driving a single snake body.

use std::time::Duration;

use serpentine_core::{
    CellCoord, Direction, FieldSize, Owner, SegmentColor, SegmentId, SnakeId, SnakeSnapshot,
};
use tracing::{debug, info};

use crate::{body::Body, segment::Segment};

/// Receives the pair of notifications bracketing every discrete step.
///
/// `move_started` fires before any segment moves and `move_finished` after
/// every segment was reindexed; both fire exactly once per step.
pub trait MovementObserver {
    /// Called with the body as it was before the step.
    fn move_started(&mut self, body: &Body) {
        let _ = body;
    }

    /// Called with the body after the tail was relocated and reindexed.
    fn move_finished(&mut self, body: &Body) {
        let _ = body;
    }
}

impl MovementObserver for () {}

/// Layout and tuning used to build a [`Snake`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnakeBlueprint {
    /// Identifier assigned to the snake.
    pub id: SnakeId,
    /// Segment positions, head first.
    pub cells: Vec<CellCoord>,
    /// Initial heading.
    pub direction: Direction,
    /// Simulated time between two discrete steps.
    pub speed: Duration,
    /// Identifier of the head segment; the rest count upward from it.
    pub first_segment: SegmentId,
}

impl SnakeBlueprint {
    /// Straight layout extending east from `start` and heading west.
    ///
    /// Segments wrap around the right edge of the field.
    #[must_use]
    pub fn straight(
        id: SnakeId,
        start: CellCoord,
        length: usize,
        field: FieldSize,
        speed: Duration,
        first_segment: SegmentId,
    ) -> Self {
        let mut cells = Vec::with_capacity(length);
        let mut cell = start;
        for _ in 0..length {
            cells.push(cell);
            cell = field.step_wrapped(cell, Direction::East);
        }

        Self {
            id,
            cells,
            direction: Direction::West,
            speed,
            first_segment,
        }
    }
}

/// Outcome of a successful [`Snake::eat`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bite {
    /// A foreign segment joined the body as the new head.
    Swallowed {
        /// Segment that joined the body.
        segment: SegmentId,
        /// Cell the new head occupies.
        cell: CellCoord,
        /// Length of the body after growth.
        length: usize,
    },
    /// The head ran into the body it belongs to.
    Fatal {
        /// Cell where the collision happened.
        cell: CellCoord,
    },
}

/// Result of a committed heading change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Steering {
    /// Heading in effect after the change.
    pub direction: Direction,
    /// Indicates whether the body was reversed first.
    pub reversed: bool,
}

/// Segmented agent that advances one cell per discrete step.
#[derive(Clone, Debug)]
pub struct Snake {
    id: SnakeId,
    body: Body,
    direction: Direction,
    alive: bool,
    speed: Duration,
    accumulator: Duration,
    field: FieldSize,
}

impl Snake {
    /// Builds a live snake from the blueprint.
    #[must_use]
    pub fn spawn(blueprint: SnakeBlueprint, field: FieldSize) -> Self {
        let owner = Owner::Snake(blueprint.id);
        let first = blueprint.first_segment.get();
        let segments = blueprint
            .cells
            .iter()
            .enumerate()
            .map(|(index, &cell)| {
                Segment::new(
                    SegmentId::new(first.wrapping_add(index as u32)),
                    cell,
                    field,
                    SegmentColor::derived(index),
                    owner,
                )
            })
            .collect();

        Self {
            id: blueprint.id,
            body: Body::from_segments(segments),
            direction: blueprint.direction,
            alive: true,
            speed: blueprint.speed,
            accumulator: Duration::ZERO,
            field,
        }
    }

    /// Identifier of the snake.
    #[must_use]
    pub const fn id(&self) -> SnakeId {
        self.id
    }

    /// Segments composing the snake.
    #[must_use]
    pub const fn body(&self) -> &Body {
        &self.body
    }

    /// Leading segment, if the body is not empty.
    #[must_use]
    pub fn head(&self) -> Option<&Segment> {
        self.body.head()
    }

    /// Number of segments composing the body.
    #[must_use]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Reports whether the body holds no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Heading used for the next step.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Unit movement vector of the current heading.
    #[must_use]
    pub const fn movement(&self) -> (i32, i32) {
        self.direction.unit_vector()
    }

    /// Indicates whether the snake still moves and eats.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    /// Simulated time between two discrete steps.
    #[must_use]
    pub const fn speed(&self) -> Duration {
        self.speed
    }

    /// Captures the state systems need to steer the snake.
    #[must_use]
    pub fn snapshot(&self) -> Option<SnakeSnapshot> {
        let head = self.body.head()?;
        Some(SnakeSnapshot {
            id: self.id,
            head: head.position(),
            direction: self.direction,
            alive: self.alive,
            length: self.body.len(),
        })
    }

    /// Accumulates frame time and performs at most one discrete step.
    ///
    /// A step relocates the tail one cell ahead of the head (wrapping at the
    /// field edges), reindexes every segment, and notifies `observer` before
    /// and after. Returns `true` when a step fired.
    pub fn update<O>(&mut self, dt: Duration, observer: &mut O) -> bool
    where
        O: MovementObserver + ?Sized,
    {
        if !self.alive {
            return false;
        }

        self.accumulator = self.accumulator.saturating_add(dt);
        if self.accumulator < self.speed {
            return false;
        }
        self.accumulator = Duration::ZERO;

        let Some(head) = self.body.head() else {
            return false;
        };
        let next = self.field.step_wrapped(head.position(), self.direction);

        observer.move_started(&self.body);
        let _ = self.body.relocate_tail_to(next, self.field);
        self.body.reindex(self.field);
        observer.move_finished(&self.body);
        true
    }

    /// Resolves a collision between the head and `other`.
    ///
    /// Does nothing when the snake is dead, when `other` is the head itself,
    /// or when `other` does not share the head's cell. A segment owned by this
    /// snake kills it; any other segment is swallowed and becomes the new head
    /// one cell ahead of the old one.
    pub fn eat(&mut self, other: Segment) -> Option<Bite> {
        if !self.alive {
            return None;
        }

        let head = *self.body.head()?;
        if head.id() == other.id() || head.spatial_index() != other.spatial_index() {
            return None;
        }

        if other.owner() == Owner::Snake(self.id) {
            let cell = head.position();
            let _ = self.fail();
            return Some(Bite::Fatal { cell });
        }

        let ahead = self.field.step_wrapped(head.position(), self.direction);
        let mut swallowed = other;
        swallowed.set_owner(Owner::Snake(self.id));
        swallowed.set_selected(false);
        swallowed.set_color(SegmentColor::derived(self.body.len()));
        swallowed.move_to(ahead, self.field);
        self.body.prepend(swallowed);

        debug!(
            snake = self.id.get(),
            segment = swallowed.id().get(),
            length = self.body.len(),
            "segment swallowed"
        );
        Some(Bite::Swallowed {
            segment: swallowed.id(),
            cell: ahead,
            length: self.body.len(),
        })
    }

    /// Commits a new heading.
    ///
    /// Requesting the exact reverse of the current movement flips the body
    /// first so the head never passes through its neck.
    pub fn set_direction(&mut self, direction: Direction) -> Steering {
        if direction.is_reverse_of(self.direction) {
            self.reverse();
            return Steering {
                direction: self.direction,
                reversed: true,
            };
        }

        self.direction = direction;
        Steering {
            direction,
            reversed: false,
        }
    }

    /// Flips the segment order and faces the new head away from its neck.
    ///
    /// For a straight body the new heading is the opposite of the old one;
    /// a bent tail keeps the heading it had, read from its last two cells.
    pub fn reverse(&mut self) {
        self.body.reverse();
        self.direction = self
            .outward_facing()
            .unwrap_or_else(|| self.direction.opposite());
    }

    /// Stops the snake for the rest of its life and greys out its body.
    ///
    /// Returns `false` when the snake was already dead.
    pub fn fail(&mut self) -> bool {
        if !self.alive {
            return false;
        }

        self.alive = false;
        self.body.recolor(SegmentColor::to_greyscale);
        if let Some(head) = self.body.head() {
            info!(
                snake = self.id.get(),
                length = self.body.len(),
                cell = %head.position(),
                "snake died"
            );
        }
        true
    }

    fn outward_facing(&self) -> Option<Direction> {
        let segments = self.body.segments();
        let head = segments.first()?.position();
        let neck = segments.get(1)?.position();
        let dx = wrapped_delta(neck.column(), head.column());
        let dy = wrapped_delta(neck.row(), head.row());
        Direction::from_vector(dx, dy)
    }
}

fn wrapped_delta(from: u32, to: u32) -> i32 {
    let delta = i64::from(to) - i64::from(from);
    if delta.abs() > 1 {
        -(delta.signum() as i32)
    } else {
        delta as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIELD: FieldSize = FieldSize::new(10, 10);
    const SPEED: Duration = Duration::from_millis(100);

    fn snake_with(cells: &[(u32, u32)], direction: Direction) -> Snake {
        Snake::spawn(
            SnakeBlueprint {
                id: SnakeId::new(1),
                cells: cells
                    .iter()
                    .map(|&(column, row)| CellCoord::new(column, row))
                    .collect(),
                direction,
                speed: SPEED,
                first_segment: SegmentId::new(0),
            },
            FIELD,
        )
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<(&'static str, Vec<CellCoord>)>,
    }

    impl MovementObserver for Recorder {
        fn move_started(&mut self, body: &Body) {
            self.calls.push(("started", body.positions()));
        }

        fn move_finished(&mut self, body: &Body) {
            self.calls.push(("finished", body.positions()));
        }
    }

    #[test]
    fn straight_blueprint_wraps_east() {
        let blueprint = SnakeBlueprint::straight(
            SnakeId::new(0),
            CellCoord::new(8, 2),
            4,
            FIELD,
            SPEED,
            SegmentId::new(10),
        );
        assert_eq!(
            blueprint.cells,
            vec![
                CellCoord::new(8, 2),
                CellCoord::new(9, 2),
                CellCoord::new(0, 2),
                CellCoord::new(1, 2)
            ]
        );
        assert_eq!(blueprint.direction, Direction::West);
    }

    #[test]
    fn update_waits_for_the_step_interval() {
        let mut snake = snake_with(&[(5, 5), (4, 5), (3, 5)], Direction::East);
        let mut recorder = Recorder::default();

        assert!(!snake.update(Duration::from_millis(60), &mut recorder));
        assert!(recorder.calls.is_empty());

        assert!(snake.update(Duration::from_millis(60), &mut recorder));
        assert_eq!(
            snake.body().positions(),
            vec![
                CellCoord::new(6, 5),
                CellCoord::new(5, 5),
                CellCoord::new(4, 5)
            ]
        );
        assert_eq!(recorder.calls.len(), 2);
        assert_eq!(recorder.calls[0].0, "started");
        assert_eq!(recorder.calls[0].1[0], CellCoord::new(5, 5));
        assert_eq!(recorder.calls[1].0, "finished");
        assert_eq!(recorder.calls[1].1[0], CellCoord::new(6, 5));

        // Accumulator resets after a step instead of carrying the overshoot.
        assert!(!snake.update(Duration::from_millis(60), &mut recorder));
    }

    #[test]
    fn update_reindexes_every_segment() {
        let mut snake = snake_with(&[(9, 0), (8, 0)], Direction::East);
        assert!(snake.update(SPEED, &mut ()));
        for segment in snake.body().segments() {
            assert_eq!(segment.spatial_index(), FIELD.cell_id(segment.position()));
        }
        assert_eq!(snake.head().map(Segment::position), Some(CellCoord::new(0, 0)));
    }

    #[test]
    fn dead_snakes_do_not_move() {
        let mut snake = snake_with(&[(5, 5), (4, 5)], Direction::East);
        assert!(snake.fail());
        assert!(!snake.fail());
        assert!(!snake.update(SPEED, &mut ()));
        assert_eq!(snake.head().map(Segment::position), Some(CellCoord::new(5, 5)));
    }

    #[test]
    fn failing_greys_out_the_body() {
        let mut snake = snake_with(&[(5, 5), (4, 5)], Direction::East);
        let before: Vec<SegmentColor> = snake.body().segments().iter().map(Segment::color).collect();
        let _ = snake.fail();
        for (segment, original) in snake.body().segments().iter().zip(before) {
            assert_eq!(segment.color(), original.to_greyscale());
        }
    }

    #[test]
    fn eating_a_foreign_segment_grows_the_body() {
        let mut snake = snake_with(&[(5, 5), (4, 5), (3, 5)], Direction::East);
        let cookie = Segment::new(
            SegmentId::new(50),
            CellCoord::new(5, 5),
            FIELD,
            SegmentColor::from_rgb(9, 9, 9),
            Owner::Free,
        );

        let bite = snake.eat(cookie);

        assert_eq!(
            bite,
            Some(Bite::Swallowed {
                segment: SegmentId::new(50),
                cell: CellCoord::new(6, 5),
                length: 4,
            })
        );
        let head = snake.head().copied().expect("head");
        assert_eq!(head.id(), SegmentId::new(50));
        assert_eq!(head.owner(), Owner::Snake(SnakeId::new(1)));
        assert_eq!(head.spatial_index(), FIELD.cell_id(CellCoord::new(6, 5)));
        assert!(snake.is_alive());
    }

    #[test]
    fn eating_ignores_distant_segments_and_the_head() {
        let mut snake = snake_with(&[(5, 5), (4, 5)], Direction::East);
        let far = Segment::new(
            SegmentId::new(50),
            CellCoord::new(1, 1),
            FIELD,
            SegmentColor::from_rgb(9, 9, 9),
            Owner::Free,
        );
        assert_eq!(snake.eat(far), None);

        let head = snake.head().copied().expect("head");
        assert_eq!(snake.eat(head), None);
        assert_eq!(snake.len(), 2);
    }

    #[test]
    fn running_into_the_own_body_is_fatal() {
        // Tight loop: heading south from (2, 2) lands on (2, 3).
        let mut snake = snake_with(
            &[(2, 2), (3, 2), (3, 3), (2, 3), (1, 3)],
            Direction::South,
        );
        assert!(snake.update(SPEED, &mut ()));

        let head = snake.head().copied().expect("head");
        let victim = snake
            .body()
            .segments()
            .iter()
            .skip(1)
            .find(|segment| segment.spatial_index() == head.spatial_index())
            .copied()
            .expect("overlapping segment");

        assert_eq!(
            snake.eat(victim),
            Some(Bite::Fatal {
                cell: CellCoord::new(2, 3)
            })
        );
        assert!(!snake.is_alive());
        assert_eq!(snake.eat(victim), None);
    }

    #[test]
    fn reversing_request_flips_the_body() {
        let mut snake = snake_with(&[(5, 5), (4, 5), (3, 5)], Direction::East);

        let steering = snake.set_direction(Direction::West);

        assert_eq!(
            steering,
            Steering {
                direction: Direction::West,
                reversed: true
            }
        );
        assert_eq!(
            snake.body().positions(),
            vec![
                CellCoord::new(3, 5),
                CellCoord::new(4, 5),
                CellCoord::new(5, 5)
            ]
        );
        assert!(snake.update(SPEED, &mut ()));
        assert_eq!(snake.head().map(Segment::position), Some(CellCoord::new(2, 5)));
    }

    #[test]
    fn perpendicular_and_same_requests_do_not_reverse() {
        let mut snake = snake_with(&[(5, 5), (4, 5), (3, 5)], Direction::East);
        let before = snake.body().positions();

        assert!(!snake.set_direction(Direction::East).reversed);
        assert!(!snake.set_direction(Direction::North).reversed);
        assert_eq!(snake.direction(), Direction::North);
        assert_eq!(snake.body().positions(), before);
    }

    #[test]
    fn reversing_a_bent_body_faces_away_from_the_neck() {
        // Tail hooks north, so the reversed head must keep heading north.
        let mut snake = snake_with(&[(5, 5), (4, 5), (4, 4)], Direction::East);
        let steering = snake.set_direction(Direction::West);
        assert!(steering.reversed);
        assert_eq!(steering.direction, Direction::North);
    }

    #[test]
    fn reversing_across_the_wrap_seam_uses_the_short_delta() {
        let mut snake = snake_with(&[(1, 5), (0, 5), (9, 5)], Direction::East);
        snake.reverse();
        assert_eq!(snake.direction(), Direction::West);
    }
}
