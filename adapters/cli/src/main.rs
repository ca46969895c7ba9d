#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs the Serpentine simulation headlessly.

mod args;
mod simulation;
mod text_backend;

use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result as AnyResult};
use clap::Parser;
use serpentine_core::{Command, GameConfig};
use serpentine_rendering::{FieldPresentation, FrameInput, RenderingBackend};
use serpentine_world::query;
use tracing::info;

use crate::{args::Args, simulation::Simulation, text_backend::TextBackend};

/// Entry point for the Serpentine command-line interface.
fn main() -> AnyResult<()> {
    init_tracing();
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref())?;
    if let Some(seed) = args.seed {
        config.rng_seed = seed;
    }
    config.validate().context("invalid game configuration")?;

    let field = FieldPresentation::new(config.field_width, config.field_height, config.cell_size)
        .context("invalid field presentation")?;
    let mut simulation = Simulation::new(config)?;
    let mut backend = args
        .render
        .then(|| TextBackend::new(std::io::stdout().lock(), args.color));

    if let Some(target) = args.target {
        let _ = simulation.submit(Command::SelectTarget { cell: target.0 });
    }

    let dt = Duration::from_millis(args.frame_ms);
    for frame in 0..args.frames {
        let input = FrameInput {
            direction: args.turn_at(frame),
            pointer: args.click_at(frame),
        };
        let mut commands = Vec::new();
        input.into_commands(&field, &mut commands);
        for command in commands {
            let _ = simulation.submit(command);
        }

        let _ = simulation.submit(Command::Tick { dt });

        if let Some(backend) = backend.as_mut() {
            backend.present(&simulation.scene(&field))?;
        }
    }

    let snake = query::snake(simulation.world());
    info!(frames = args.frames, "simulation finished");
    println!(
        "{} frames simulated; snake {} with {} segments",
        args.frames,
        if snake.is_alive() { "alive" } else { "dead" },
        snake.len()
    );
    if let Some(target) = simulation.navigator().target() {
        println!("still navigating toward {target}");
    }
    println!("{}", simulation.statistics());
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(path: Option<&Path>) -> AnyResult<GameConfig> {
    let Some(path) = path else {
        return Ok(GameConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration from {}", path.display()))?;
    toml::from_str(&text)
        .with_context(|| format!("failed to parse configuration {}", path.display()))
}
