use std::time::Duration;

use serpentine_core::{CellCoord, Command, Event, GameConfig};
use serpentine_system_spawning::{Config, Spawning};
use serpentine_world::{self as world, query, World};

#[test]
fn respawn_stocks_the_configured_number_of_cookies() {
    let config = GameConfig::default();
    let (world, _) = run(&config, config.rng_seed, vec![Command::Respawn]);

    assert_eq!(query::cookie_count(&world), config.cookie_count as usize);
    for cookie in query::cookies(&world) {
        assert!(!query::snake(&world).body().occupies(cookie.spatial_index()));
    }
}

#[test]
fn identical_seeds_place_identical_cookies() {
    let config = GameConfig::default();
    let (_, first) = run(&config, 0x1234_5678, vec![Command::Respawn]);
    let (_, second) = run(&config, 0x1234_5678, vec![Command::Respawn]);
    let (_, other) = run(&config, 0x8765_4321, vec![Command::Respawn]);

    assert_eq!(first, second);
    assert_ne!(first, other);
}

#[test]
fn eaten_cookies_are_replaced() {
    let config = GameConfig {
        cookie_count: 1,
        ..GameConfig::default()
    };
    let mut world = World::new(config.clone()).expect("valid configuration");
    let mut spawning = Spawning::new(Config::new(1, config.rng_seed));
    let head = CellCoord::new(19, 15);

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SpawnCookie {
            cell: head,
            color: serpentine_core::SegmentColor::from_rgb(90, 90, 90),
        },
        &mut events,
    );
    pump(&mut world, &mut spawning, events);
    assert_eq!(query::cookie_count(&world), 1);

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::Tick {
            dt: Duration::from_millis(150),
        },
        &mut events,
    );
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::SegmentConsumed { .. })));
    pump(&mut world, &mut spawning, events);

    assert_eq!(query::cookie_count(&world), 1);
    assert!(query::cookie_at(&world, head).is_none());
}

fn run(config: &GameConfig, seed: u64, commands: Vec<Command>) -> (World, Vec<CellCoord>) {
    let mut world = World::new(config.clone()).expect("valid configuration");
    let mut spawning = Spawning::new(Config::new(config.cookie_count as usize, seed));

    for command in commands {
        let mut events = Vec::new();
        world::apply(&mut world, command, &mut events);
        pump(&mut world, &mut spawning, events);
    }

    let cells = query::cookies(&world).map(|cookie| cookie.position()).collect();
    (world, cells)
}

fn pump(world: &mut World, spawning: &mut Spawning, pending_events: Vec<Event>) {
    let mut events = pending_events;

    while !events.is_empty() {
        let mut commands = Vec::new();
        spawning.handle(
            &events,
            query::field(world),
            query::cookie_count(world),
            |cell| query::is_cell_free(world, cell),
            &mut commands,
        );

        events.clear();
        for command in commands {
            world::apply(world, command, &mut events);
        }
    }
}
