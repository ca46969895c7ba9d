//! Wires the world to its systems and pumps commands until quiescent.

use std::fmt;

use serpentine_core::{Command, ConfigError, Event, GameConfig};
use serpentine_rendering::{Color, FieldPresentation, Scene, SegmentKind, SegmentPresentation};
use serpentine_system_pathfinding::Navigator;
use serpentine_system_spawning::{Config as SpawningConfig, Spawning};
use serpentine_world::{self as world, query, World};

const SELECTED_HIGHLIGHT: f32 = 0.5;

/// World together with the systems reacting to its events.
#[derive(Debug)]
pub(crate) struct Simulation {
    world: World,
    navigator: Navigator,
    spawning: Spawning,
    statistics: Statistics,
}

impl Simulation {
    /// Builds the world and stocks it with cookies.
    pub(crate) fn new(config: GameConfig) -> Result<Self, ConfigError> {
        let spawning = Spawning::new(SpawningConfig::new(
            config.cookie_count as usize,
            config.rng_seed,
        ));
        let mut simulation = Self {
            world: World::new(config)?,
            navigator: Navigator::default(),
            spawning,
            statistics: Statistics::default(),
        };
        let _ = simulation.submit(Command::Respawn);
        Ok(simulation)
    }

    /// Applies the command and every command the systems derive from it.
    ///
    /// Returns all events emitted along the way.
    pub(crate) fn submit(&mut self, command: Command) -> Vec<Event> {
        let mut log = Vec::new();
        let mut commands = vec![command];

        while !commands.is_empty() {
            let mut events = Vec::new();
            for command in commands.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }
            self.statistics.record(&events);

            if let Some(snake) = query::snake_snapshot(&self.world) {
                self.navigator.handle(
                    &events,
                    &snake,
                    query::obstacles(&self.world),
                    query::field(&self.world),
                    &mut commands,
                );
            }
            let world = &self.world;
            self.spawning.handle(
                &events,
                query::field(world),
                query::cookie_count(world),
                |cell| query::is_cell_free(world, cell),
                &mut commands,
            );

            log.extend(events);
        }

        log
    }

    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    pub(crate) fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub(crate) fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    /// Describes the current state for a rendering backend.
    pub(crate) fn scene(&self, field: &FieldPresentation) -> Scene {
        let snake = query::snake(&self.world);
        let mut segments = Vec::with_capacity(snake.len() + query::cookie_count(&self.world));

        for (index, segment) in snake.body().segments().iter().enumerate() {
            let kind = if index == 0 {
                SegmentKind::Head
            } else {
                SegmentKind::Body
            };
            segments.push(SegmentPresentation::new(
                field,
                segment.position(),
                Color::from_segment(segment.color()),
                false,
                kind,
            ));
        }

        for cookie in query::cookies(&self.world) {
            let mut color = Color::from_segment(cookie.color());
            if cookie.is_selected() {
                color = color.lighten(SELECTED_HIGHLIGHT);
            }
            segments.push(SegmentPresentation::new(
                field,
                cookie.position(),
                color,
                cookie.is_selected(),
                SegmentKind::Cookie,
            ));
        }

        let route = self
            .navigator
            .pending()
            .into_iter()
            .chain(self.navigator.waypoints().route())
            .collect();

        Scene::new(*field, segments, route, snake.is_alive())
    }
}

/// Running tally of what happened during a session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Statistics {
    pub(crate) steps: u64,
    pub(crate) cookies_eaten: u64,
    pub(crate) deaths: u64,
    pub(crate) respawns: u64,
    pub(crate) longest: usize,
}

impl Statistics {
    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::SnakeAdvanced { .. } => self.steps += 1,
                Event::SegmentConsumed { length, .. } => {
                    self.cookies_eaten += 1;
                    self.longest = self.longest.max(*length);
                }
                Event::SnakeDied { .. } => self.deaths += 1,
                Event::SnakeSpawned { length, .. } => {
                    self.respawns += 1;
                    self.longest = self.longest.max(*length);
                }
                _ => {}
            }
        }
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "steps: {}, cookies eaten: {}, deaths: {}, spawns: {}, longest snake: {}",
            self.steps, self.cookies_eaten, self.deaths, self.respawns, self.longest
        )
    }
}
