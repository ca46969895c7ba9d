//! Command-line arguments and the scripted input they describe.

use std::{path::PathBuf, str::FromStr};

use clap::Parser;
use glam::Vec2;
use serpentine_core::{CellCoord, Direction, DirectionParseError};
use thiserror::Error;

#[derive(Debug, Parser)]
#[command(name = "serpentine")]
#[command(about = "Run the Serpentine snake simulation headlessly")]
pub(crate) struct Args {
    /// Path to a TOML game configuration; defaults apply when omitted
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,

    /// Number of frames to simulate
    #[arg(long, default_value_t = 200)]
    pub(crate) frames: u32,

    /// Simulated milliseconds per frame
    #[arg(long, default_value_t = 50)]
    pub(crate) frame_ms: u64,

    /// Seed for cookie placement, overriding the configuration
    #[arg(long)]
    pub(crate) seed: Option<u64>,

    /// Cell to navigate to before the first frame (format: COLUMN,ROW)
    #[arg(long)]
    pub(crate) target: Option<TargetCell>,

    /// Pointer press in screen units (format: FRAME:X,Y); repeatable
    #[arg(long = "click")]
    pub(crate) clicks: Vec<ScriptedClick>,

    /// Heading change (format: FRAME:DIRECTION); repeatable
    #[arg(long = "turn")]
    pub(crate) turns: Vec<ScriptedTurn>,

    /// Print the field after every frame
    #[arg(long)]
    pub(crate) render: bool,

    /// Colorize rendered frames with ANSI escapes
    #[arg(long)]
    pub(crate) color: bool,
}

impl Args {
    /// Last heading change scripted for the frame.
    pub(crate) fn turn_at(&self, frame: u32) -> Option<Direction> {
        self.turns
            .iter()
            .filter(|turn| turn.frame == frame)
            .map(|turn| turn.direction)
            .last()
    }

    /// Last pointer press scripted for the frame.
    pub(crate) fn click_at(&self, frame: u32) -> Option<Vec2> {
        self.clicks
            .iter()
            .filter(|click| click.frame == frame)
            .map(|click| click.position)
            .last()
    }
}

/// Grid cell given as `COLUMN,ROW`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TargetCell(pub(crate) CellCoord);

impl FromStr for TargetCell {
    type Err = ScriptError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (column, row) = split_pair(value)?;
        let column = column
            .parse()
            .map_err(|_| ScriptError::InvalidPair(value.to_owned()))?;
        let row = row
            .parse()
            .map_err(|_| ScriptError::InvalidPair(value.to_owned()))?;
        Ok(Self(CellCoord::new(column, row)))
    }
}

/// Heading change applied at the start of a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ScriptedTurn {
    pub(crate) frame: u32,
    pub(crate) direction: Direction,
}

impl FromStr for ScriptedTurn {
    type Err = ScriptError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (frame, direction) = split_frame(value)?;
        Ok(Self {
            frame,
            direction: direction.parse()?,
        })
    }
}

/// Pointer press applied at the start of a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ScriptedClick {
    pub(crate) frame: u32,
    pub(crate) position: Vec2,
}

impl FromStr for ScriptedClick {
    type Err = ScriptError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (frame, position) = split_frame(value)?;
        let (x, y) = split_pair(position)?;
        let x: f32 = x
            .parse()
            .map_err(|_| ScriptError::InvalidPair(position.to_owned()))?;
        let y: f32 = y
            .parse()
            .map_err(|_| ScriptError::InvalidPair(position.to_owned()))?;
        Ok(Self {
            frame,
            position: Vec2::new(x, y),
        })
    }
}

/// Reasons scripted input fails to parse.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub(crate) enum ScriptError {
    #[error("expected FRAME:VALUE, got `{0}`")]
    MissingFrame(String),
    #[error("invalid frame number `{0}`")]
    InvalidFrame(String),
    #[error("expected two comma separated numbers, got `{0}`")]
    InvalidPair(String),
    #[error(transparent)]
    Direction(#[from] DirectionParseError),
}

fn split_frame(value: &str) -> Result<(u32, &str), ScriptError> {
    let (frame, rest) = value
        .split_once(':')
        .ok_or_else(|| ScriptError::MissingFrame(value.to_owned()))?;
    let frame = frame
        .trim()
        .parse()
        .map_err(|_| ScriptError::InvalidFrame(frame.to_owned()))?;
    Ok((frame, rest.trim()))
}

fn split_pair(value: &str) -> Result<(&str, &str), ScriptError> {
    value
        .split_once(',')
        .map(|(first, second)| (first.trim(), second.trim()))
        .ok_or_else(|| ScriptError::InvalidPair(value.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turns_parse_frame_and_direction() {
        let turn: ScriptedTurn = "12:up".parse().expect("valid turn");
        assert_eq!(
            turn,
            ScriptedTurn {
                frame: 12,
                direction: Direction::North
            }
        );

        assert_eq!(
            "north".parse::<ScriptedTurn>(),
            Err(ScriptError::MissingFrame("north".to_owned()))
        );
        assert!(matches!(
            "3:sideways".parse::<ScriptedTurn>(),
            Err(ScriptError::Direction(_))
        ));
    }

    #[test]
    fn clicks_and_targets_parse_pairs() {
        let click: ScriptedClick = "0:170.5, 90".parse().expect("valid click");
        assert_eq!(click.frame, 0);
        assert_eq!(click.position, Vec2::new(170.5, 90.0));

        let target: TargetCell = "10,5".parse().expect("valid target");
        assert_eq!(target, TargetCell(CellCoord::new(10, 5)));

        assert_eq!(
            "10;5".parse::<TargetCell>(),
            Err(ScriptError::InvalidPair("10;5".to_owned()))
        );
        assert!("x:1,2".parse::<ScriptedClick>().is_err());
    }

    #[test]
    fn arguments_collect_repeated_script_entries() {
        let args = Args::try_parse_from([
            "serpentine",
            "--frames",
            "30",
            "--turn",
            "4:north",
            "--turn",
            "4:east",
            "--click",
            "2:16,16",
        ])
        .expect("valid arguments");

        assert_eq!(args.frames, 30);
        assert_eq!(args.turn_at(4), Some(Direction::East));
        assert_eq!(args.turn_at(5), None);
        assert_eq!(args.click_at(2), Some(Vec2::new(16.0, 16.0)));
    }
}
