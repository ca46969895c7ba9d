#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Serpentine.
//!
//! The world owns the snake, the free-standing cookie segments and the
//! obstacle set handed to the path search. It only changes in response to
//! [`Command`] values passed to [`apply`] and reports every change as an
//! [`Event`].

mod body;
mod segment;
mod snake;

use std::{
    collections::{BTreeMap, HashMap},
    time::Duration,
};

use serpentine_core::{
    CellCoord, CellId, Command, ConfigError, Event, FieldSize, GameConfig, ObstacleSet, Owner,
    SegmentColor, SegmentId, SnakeId,
};
use tracing::{debug, info};

pub use body::Body;
pub use segment::Segment;
pub use snake::{Bite, MovementObserver, Snake, SnakeBlueprint, Steering};

const SNAKE_ID: SnakeId = SnakeId::new(0);

/// Represents the authoritative Serpentine world state.
#[derive(Debug)]
pub struct World {
    config: GameConfig,
    field: FieldSize,
    snake: Snake,
    cookies: BTreeMap<SegmentId, Segment>,
    cookie_cells: HashMap<CellId, SegmentId>,
    obstacles: ObstacleSet,
    selected: Option<SegmentId>,
    segment_ids: SegmentIds,
    respawn_timer: Duration,
    tick_index: u64,
}

impl World {
    /// Creates a world from a validated configuration.
    ///
    /// The snake spawns at the field centre; cookies are placed later through
    /// [`Command::SpawnCookie`].
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut segment_ids = SegmentIds::default();
        let snake = spawn_snake(&config, &mut segment_ids);
        let obstacles = snake.body().footprint().collect();

        Ok(Self {
            field: config.field(),
            config,
            snake,
            cookies: BTreeMap::new(),
            cookie_cells: HashMap::new(),
            obstacles,
            selected: None,
            segment_ids,
            respawn_timer: Duration::ZERO,
            tick_index: 0,
        })
    }

    fn respawn(&mut self, out_events: &mut Vec<Event>) {
        self.cookies.clear();
        self.cookie_cells.clear();
        self.selected = None;
        self.snake = spawn_snake(&self.config, &mut self.segment_ids);
        self.obstacles.clear();
        self.obstacles.extend(self.snake.body().footprint());
        self.respawn_timer = Duration::ZERO;

        out_events.push(Event::CookiesCleared);
        if let Some(head) = self.snake.head() {
            info!(cell = %head.position(), length = self.snake.len(), "snake spawned");
            out_events.push(Event::SnakeSpawned {
                snake: self.snake.id(),
                head: head.position(),
                length: self.snake.len(),
            });
        }
    }

    fn advance(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        if !self.snake.is_alive() {
            self.respawn_timer = self.respawn_timer.saturating_add(dt);
            if self.respawn_timer >= self.config.respawn_delay() {
                self.respawn(out_events);
            }
            return;
        }

        let mut sync = FootprintSync {
            snake: self.snake.id(),
            obstacles: &mut self.obstacles,
            events: &mut *out_events,
            from: None,
        };
        if self.snake.update(dt, &mut sync) {
            self.resolve_collisions(out_events);
        }
    }

    fn resolve_collisions(&mut self, out_events: &mut Vec<Event>) {
        if self.bite_own_body(out_events) {
            return;
        }

        let mut grew = false;
        while let Some(cookie) = self.cookie_under_head() {
            match self.snake.eat(cookie) {
                Some(Bite::Swallowed {
                    segment,
                    cell,
                    length,
                }) => {
                    self.remove_cookie(segment);
                    let _ = self.obstacles.insert(self.field.cell_id(cell));
                    out_events.push(Event::SegmentConsumed {
                        snake: self.snake.id(),
                        segment,
                        cell,
                        length,
                    });
                    grew = true;
                }
                Some(Bite::Fatal { cell }) => {
                    self.record_death(cell, out_events);
                    return;
                }
                None => break,
            }
        }

        if grew {
            let _ = self.bite_own_body(out_events);
        }
    }

    fn bite_own_body(&mut self, out_events: &mut Vec<Event>) -> bool {
        // Overlapping segments share a cell in the occupancy set.
        if self.obstacles.len() >= self.snake.len() {
            return false;
        }
        let Some(head) = self.snake.head().copied() else {
            return false;
        };
        let victim = self
            .snake
            .body()
            .segments()
            .iter()
            .skip(1)
            .find(|segment| segment.spatial_index() == head.spatial_index())
            .copied();
        let Some(victim) = victim else {
            return false;
        };

        match self.snake.eat(victim) {
            Some(Bite::Fatal { cell }) => {
                self.record_death(cell, out_events);
                true
            }
            _ => false,
        }
    }

    fn record_death(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) {
        self.respawn_timer = Duration::ZERO;
        out_events.push(Event::SnakeDied {
            snake: self.snake.id(),
            cell,
        });
    }

    fn cookie_under_head(&self) -> Option<Segment> {
        let head = self.snake.head()?;
        let id = self.cookie_cells.get(&head.spatial_index())?;
        self.cookies.get(id).copied()
    }

    fn remove_cookie(&mut self, id: SegmentId) {
        if let Some(cookie) = self.cookies.remove(&id) {
            let _ = self.cookie_cells.remove(&cookie.spatial_index());
        }
        if self.selected == Some(id) {
            self.selected = None;
        }
    }

    fn select_target(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) {
        if !self.field.contains(cell) {
            debug!(%cell, "target outside the field");
            out_events.push(Event::TargetRejected { cell });
            return;
        }

        if let Some(previous) = self.selected.take() {
            if let Some(cookie) = self.cookies.get_mut(&previous) {
                cookie.set_selected(false);
            }
        }

        let cookie = self
            .cookie_cells
            .get(&self.field.cell_id(cell))
            .copied();
        if let Some(id) = cookie {
            if let Some(segment) = self.cookies.get_mut(&id) {
                segment.set_selected(true);
                self.selected = Some(id);
            }
        }

        out_events.push(Event::TargetSelected { cell, cookie });
    }

    fn spawn_cookie(&mut self, cell: CellCoord, color: SegmentColor, out_events: &mut Vec<Event>) {
        if !self.field.contains(cell) {
            out_events.push(Event::CookieSpawnRejected { cell });
            return;
        }

        let index = self.field.cell_id(cell);
        if self.obstacles.contains(index) || self.cookie_cells.contains_key(&index) {
            debug!(%cell, "cookie spawn rejected on occupied cell");
            out_events.push(Event::CookieSpawnRejected { cell });
            return;
        }

        let id = self.segment_ids.reserve(1);
        let segment = Segment::new(id, cell, self.field, color, Owner::Free);
        let _ = self.cookies.insert(id, segment);
        let _ = self.cookie_cells.insert(index, id);
        out_events.push(Event::CookieSpawned { segment: id, cell });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });
            world.advance(dt, out_events);
        }
        Command::SetDirection { direction } => {
            if !world.snake.is_alive() {
                debug!(%direction, "ignoring heading change of a dead snake");
                return;
            }
            let steering = world.snake.set_direction(direction);
            out_events.push(Event::DirectionChanged {
                snake: world.snake.id(),
                direction: steering.direction,
                reversed: steering.reversed,
            });
        }
        Command::SelectTarget { cell } => world.select_target(cell, out_events),
        Command::SpawnCookie { cell, color } => world.spawn_cookie(cell, color, out_events),
        Command::Respawn => world.respawn(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use serpentine_core::{CellCoord, FieldSize, GameConfig, ObstacleSet, SnakeSnapshot};

    use super::{Segment, Snake, World};

    /// Configuration the world was built from.
    #[must_use]
    pub fn config(world: &World) -> &GameConfig {
        &world.config
    }

    /// Dimensions of the playing field.
    #[must_use]
    pub fn field(world: &World) -> FieldSize {
        world.field
    }

    /// Read-only access to the snake.
    #[must_use]
    pub fn snake(world: &World) -> &Snake {
        &world.snake
    }

    /// Captures the state systems need to steer the snake.
    #[must_use]
    pub fn snake_snapshot(world: &World) -> Option<SnakeSnapshot> {
        world.snake.snapshot()
    }

    /// Cells the path search must route around.
    #[must_use]
    pub fn obstacles(world: &World) -> &ObstacleSet {
        &world.obstacles
    }

    /// Cookies on the field in identifier order.
    pub fn cookies(world: &World) -> impl Iterator<Item = &Segment> {
        world.cookies.values()
    }

    /// Number of cookies on the field.
    #[must_use]
    pub fn cookie_count(world: &World) -> usize {
        world.cookies.len()
    }

    /// Cookie lying on the cell, if any.
    #[must_use]
    pub fn cookie_at(world: &World, cell: CellCoord) -> Option<&Segment> {
        if !world.field.contains(cell) {
            return None;
        }
        let id = world.cookie_cells.get(&world.field.cell_id(cell))?;
        world.cookies.get(id)
    }

    /// Cookie currently marked as the navigation target.
    #[must_use]
    pub fn selected_target(world: &World) -> Option<&Segment> {
        world.selected.and_then(|id| world.cookies.get(&id))
    }

    /// Reports whether a cookie could be placed on the cell.
    #[must_use]
    pub fn is_cell_free(world: &World, cell: CellCoord) -> bool {
        if !world.field.contains(cell) {
            return false;
        }
        let index = world.field.cell_id(cell);
        !world.obstacles.contains(index) && !world.cookie_cells.contains_key(&index)
    }

    /// Number of ticks applied so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }
}

struct FootprintSync<'a> {
    snake: SnakeId,
    obstacles: &'a mut ObstacleSet,
    events: &'a mut Vec<Event>,
    from: Option<CellCoord>,
}

impl MovementObserver for FootprintSync<'_> {
    fn move_started(&mut self, body: &Body) {
        for cell in body.footprint() {
            let _ = self.obstacles.remove(cell);
        }
        if let Some(head) = body.head() {
            self.from = Some(head.position());
            self.events.push(Event::SnakeMoveStarted {
                snake: self.snake,
                head: head.position(),
            });
        }
    }

    fn move_finished(&mut self, body: &Body) {
        self.obstacles.extend(body.footprint());
        if let (Some(from), Some(head)) = (self.from, body.head()) {
            debug!(snake = self.snake.get(), %from, to = %head.position(), "snake advanced");
            self.events.push(Event::SnakeAdvanced {
                snake: self.snake,
                from,
                to: head.position(),
            });
        }
    }
}

#[derive(Debug, Default)]
struct SegmentIds {
    next: u32,
}

impl SegmentIds {
    fn reserve(&mut self, count: usize) -> SegmentId {
        let first = self.next;
        self.next = self.next.wrapping_add(count as u32);
        SegmentId::new(first)
    }
}

fn spawn_snake(config: &GameConfig, segment_ids: &mut SegmentIds) -> Snake {
    let length = config.start_length as usize;
    let field = config.field();
    let blueprint = SnakeBlueprint::straight(
        SNAKE_ID,
        config.spawn_cell(),
        length,
        field,
        config.step_interval(),
        segment_ids.reserve(length),
    );
    Snake::spawn(blueprint, field)
}
