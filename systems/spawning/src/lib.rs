#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system that keeps the field stocked with cookies.

use std::collections::HashSet;

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serpentine_core::{CellCoord, Command, Event, FieldSize, SegmentColor};
use tracing::{debug, warn};

const ATTEMPTS_PER_COOKIE: usize = 32;
const MIN_CHANNEL: u8 = 64;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    cookie_count: usize,
    rng_seed: u64,
}

impl Config {
    /// Creates a configuration keeping `cookie_count` cookies alive.
    #[must_use]
    pub const fn new(cookie_count: usize, rng_seed: u64) -> Self {
        Self {
            cookie_count,
            rng_seed,
        }
    }
}

/// Pure system that emits cookie spawn commands whenever the supply drops.
#[derive(Debug)]
pub struct Spawning {
    cookie_count: usize,
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            cookie_count: config.cookie_count,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Consumes events and the cookie census to emit spawn commands.
    ///
    /// Only events that can lower the supply trigger a refill. Cells are
    /// drawn until `is_cell_free` accepts one or the attempt budget for that
    /// cookie runs out.
    pub fn handle<F>(
        &mut self,
        events: &[Event],
        field: FieldSize,
        live_cookies: usize,
        is_cell_free: F,
        out: &mut Vec<Command>,
    ) where
        F: Fn(CellCoord) -> bool,
    {
        if !events.iter().any(triggers_refill) {
            return;
        }

        let missing = self.cookie_count.saturating_sub(live_cookies);
        if missing == 0 || field.cell_count() == 0 {
            return;
        }

        let mut claimed = HashSet::with_capacity(missing);
        for _ in 0..missing {
            let Some(cell) = self.pick_cell(field, &is_cell_free, &claimed) else {
                warn!(missing, "no free cell found for cookie");
                break;
            };
            let _ = claimed.insert(cell);
            let color = self.next_color();
            out.push(Command::SpawnCookie { cell, color });
        }
        debug!(requested = claimed.len(), live_cookies, "cookie refill");
    }

    fn pick_cell<F>(
        &mut self,
        field: FieldSize,
        is_cell_free: &F,
        claimed: &HashSet<CellCoord>,
    ) -> Option<CellCoord>
    where
        F: Fn(CellCoord) -> bool,
    {
        (0..ATTEMPTS_PER_COOKIE)
            .map(|_| {
                CellCoord::new(
                    self.rng.gen_range(0..field.width()),
                    self.rng.gen_range(0..field.height()),
                )
            })
            .find(|cell| !claimed.contains(cell) && is_cell_free(*cell))
    }

    fn next_color(&mut self) -> SegmentColor {
        SegmentColor::from_rgb(
            self.rng.gen_range(MIN_CHANNEL..=u8::MAX),
            self.rng.gen_range(MIN_CHANNEL..=u8::MAX),
            self.rng.gen_range(MIN_CHANNEL..=u8::MAX),
        )
    }
}

fn triggers_refill(event: &Event) -> bool {
    matches!(
        event,
        Event::SnakeSpawned { .. }
            | Event::CookiesCleared
            | Event::SegmentConsumed { .. }
            | Event::CookieSpawnRejected { .. }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn time_alone_does_not_spawn() {
        let mut spawning = Spawning::new(Config::new(5, 7));
        let mut out = Vec::new();
        spawning.handle(
            &[Event::TimeAdvanced {
                dt: Duration::from_secs(3),
            }],
            FieldSize::new(10, 10),
            0,
            |_| true,
            &mut out,
        );
        assert!(out.is_empty());
    }

    #[test]
    fn refill_tops_up_the_missing_cookies_only() {
        let mut spawning = Spawning::new(Config::new(5, 7));
        let mut out = Vec::new();
        spawning.handle(
            &[Event::CookiesCleared],
            FieldSize::new(10, 10),
            3,
            |_| true,
            &mut out,
        );
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn claimed_cells_are_not_reused_within_a_batch() {
        let mut spawning = Spawning::new(Config::new(4, 11));
        let mut out = Vec::new();
        spawning.handle(
            &[Event::CookiesCleared],
            FieldSize::new(2, 2),
            0,
            |_| true,
            &mut out,
        );

        let cells: HashSet<_> = out
            .iter()
            .filter_map(|command| match command {
                Command::SpawnCookie { cell, .. } => Some(*cell),
                _ => None,
            })
            .collect();
        assert_eq!(cells.len(), out.len());
    }

    #[test]
    fn saturated_field_gives_up() {
        let mut spawning = Spawning::new(Config::new(3, 11));
        let mut out = Vec::new();
        spawning.handle(
            &[Event::CookiesCleared],
            FieldSize::new(4, 4),
            0,
            |_| false,
            &mut out,
        );
        assert!(out.is_empty());
    }

    #[test]
    fn colors_stay_bright() {
        let mut spawning = Spawning::new(Config::new(1, 3));
        for _ in 0..64 {
            let color = spawning.next_color();
            assert!(color.red() >= MIN_CHANNEL);
            assert!(color.green() >= MIN_CHANNEL);
            assert!(color.blue() >= MIN_CHANNEL);
        }
    }
}
