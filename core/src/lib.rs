#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Serpentine engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.
//!
//! The lattice math shared by every component (cell indexing, the Manhattan
//! heuristic and cardinal neighbor lookup) lives in [`grid`].

use std::{
    collections::HashSet,
    fmt,
    str::FromStr,
    time::Duration,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod config;
pub mod grid;

pub use config::{ConfigError, GameConfig};
pub use grid::{cell_coords, cell_id, heuristic, neighbor, FieldSize};

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous frame.
        dt: Duration,
    },
    /// Requests that the snake adopt a new heading.
    SetDirection {
        /// Heading requested by an operator or the navigator.
        direction: Direction,
    },
    /// Marks a cell as the navigation target and asks for a route toward it.
    SelectTarget {
        /// Cell picked by the operator.
        cell: CellCoord,
    },
    /// Requests that a free-standing cookie segment be placed on the field.
    SpawnCookie {
        /// Cell the cookie should occupy.
        cell: CellCoord,
        /// Appearance assigned to the cookie.
        color: SegmentColor,
    },
    /// Discards the current life, rebuilds the snake and clears the field.
    Respawn,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the frame.
        dt: Duration,
    },
    /// Announces that a fresh snake entered the field.
    SnakeSpawned {
        /// Identifier of the spawned snake.
        snake: SnakeId,
        /// Cell occupied by the head segment.
        head: CellCoord,
        /// Number of segments composing the body.
        length: usize,
    },
    /// Emitted once per discrete step, before any segment is relocated.
    SnakeMoveStarted {
        /// Identifier of the moving snake.
        snake: SnakeId,
        /// Cell occupied by the head before the step.
        head: CellCoord,
    },
    /// Emitted once per discrete step, after every segment was reindexed.
    SnakeAdvanced {
        /// Identifier of the snake that advanced.
        snake: SnakeId,
        /// Cell the head occupied before the step.
        from: CellCoord,
        /// Cell the head occupies after the step.
        to: CellCoord,
    },
    /// Confirms that a heading change was committed.
    DirectionChanged {
        /// Identifier of the steered snake.
        snake: SnakeId,
        /// Heading committed after the change.
        direction: Direction,
        /// Indicates whether the body was reversed to honour the change.
        reversed: bool,
    },
    /// Confirms that a foreign segment was swallowed and the body grew.
    SegmentConsumed {
        /// Identifier of the snake that grew.
        snake: SnakeId,
        /// Segment that joined the body.
        segment: SegmentId,
        /// Cell the swallowed segment occupies as the new head.
        cell: CellCoord,
        /// Length of the body after growth.
        length: usize,
    },
    /// Reports that the snake collided with itself and stopped.
    SnakeDied {
        /// Identifier of the snake that died.
        snake: SnakeId,
        /// Cell where the collision happened.
        cell: CellCoord,
    },
    /// Confirms that a navigation target was accepted.
    TargetSelected {
        /// Cell picked as the target.
        cell: CellCoord,
        /// Cookie occupying the target cell, if any.
        cookie: Option<SegmentId>,
    },
    /// Reports that a navigation target lies outside the field.
    TargetRejected {
        /// Cell that was rejected.
        cell: CellCoord,
    },
    /// Confirms that a cookie was placed on the field.
    CookieSpawned {
        /// Identifier assigned to the cookie segment.
        segment: SegmentId,
        /// Cell occupied by the cookie.
        cell: CellCoord,
    },
    /// Reports that a cookie could not be placed on the requested cell.
    CookieSpawnRejected {
        /// Cell named in the rejected request.
        cell: CellCoord,
    },
    /// Announces that every cookie was removed from the field.
    CookiesCleared,
}

/// Cardinal headings available to the snake and the path search.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing column indices.
    West,
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
}

const UNIT_VECTORS: [(i32, i32); 4] = [(-1, 0), (0, -1), (1, 0), (0, 1)];

impl Direction {
    /// Every direction in neighbor enumeration order.
    pub const ALL: [Direction; 4] = [
        Direction::West,
        Direction::North,
        Direction::East,
        Direction::South,
    ];

    /// Position of the direction inside [`Direction::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Direction::West => 0,
            Direction::North => 1,
            Direction::East => 2,
            Direction::South => 3,
        }
    }

    /// Unit movement vector expressed as `(dx, dy)` with rows growing south.
    #[must_use]
    pub const fn unit_vector(self) -> (i32, i32) {
        UNIT_VECTORS[self.index()]
    }

    /// Heading that points the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Direction::West => Direction::East,
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
        }
    }

    /// Resolves a unit vector back to its heading.
    #[must_use]
    pub fn from_vector(dx: i32, dy: i32) -> Option<Self> {
        Direction::ALL
            .into_iter()
            .find(|direction| direction.unit_vector() == (dx, dy))
    }

    /// Reports whether `other` is the exact negation of this heading.
    #[must_use]
    pub fn is_reverse_of(self, other: Direction) -> bool {
        let (dx, dy) = self.unit_vector();
        let (ox, oy) = other.unit_vector();
        dx + ox == 0 && dy + oy == 0
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::West => "west",
            Direction::North => "north",
            Direction::East => "east",
            Direction::South => "south",
        };
        f.write_str(name)
    }
}

/// Errors produced when raw input cannot be resolved to a [`Direction`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DirectionParseError {
    /// Numeric direction outside the four cardinal slots.
    #[error("direction index {0} is not one of 0..=3")]
    InvalidIndex(u8),
    /// Name that does not describe a cardinal heading.
    #[error("unknown direction `{0}`")]
    UnknownName(String),
}

impl TryFrom<u8> for Direction {
    type Error = DirectionParseError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Direction::ALL
            .get(usize::from(value))
            .copied()
            .ok_or(DirectionParseError::InvalidIndex(value))
    }
}

impl FromStr for Direction {
    type Err = DirectionParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "west" | "left" | "a" => Ok(Direction::West),
            "north" | "up" | "top" | "w" => Ok(Direction::North),
            "east" | "right" | "d" => Ok(Direction::East),
            "south" | "down" | "bottom" | "s" => Ok(Direction::South),
            _ => Err(DirectionParseError::UnknownName(value.to_owned())),
        }
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Heading that leads from this cell to an orthogonally adjacent cell.
    ///
    /// Returns `None` when the cells are not exactly one cardinal step apart.
    #[must_use]
    pub fn direction_to(self, other: CellCoord) -> Option<Direction> {
        let column_diff = self.column.abs_diff(other.column);
        let row_diff = self.row.abs_diff(other.row);
        if column_diff + row_diff != 1 {
            return None;
        }

        if column_diff == 1 {
            if other.column > self.column {
                Some(Direction::East)
            } else {
                Some(Direction::West)
            }
        } else if other.row > self.row {
            Some(Direction::South)
        } else {
            Some(Direction::North)
        }
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Scalar row-major identifier of a lattice cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellId(u32);

impl CellId {
    /// Wraps a raw row-major cell index.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the raw row-major index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a segment, whether owned or free-standing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegmentId(u32);

impl SegmentId {
    /// Creates a new segment identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a snake.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SnakeId(u32);

impl SnakeId {
    /// Creates a new snake identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Body a segment currently belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Owner {
    /// Free-standing segment (a cookie) waiting to be swallowed.
    Free,
    /// Segment composing the body of the identified snake.
    Snake(SnakeId),
}

/// Visual appearance applied to a segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SegmentColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl SegmentColor {
    /// Creates a new segment color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Deterministic palette color for the segment at `index` along a body.
    ///
    /// Successive indices step the hue by a fixed angle so neighbouring
    /// segments stay distinguishable.
    #[must_use]
    pub fn derived(index: usize) -> Self {
        let hue = ((index % 360) * 37 % 360) as f32 / 60.0;
        let saturation = 0.65_f32;
        let value = 0.95_f32;
        let chroma = value * saturation;
        let secondary = chroma * (1.0 - (hue % 2.0 - 1.0).abs());
        let (red, green, blue) = match hue as u32 {
            0 => (chroma, secondary, 0.0),
            1 => (secondary, chroma, 0.0),
            2 => (0.0, chroma, secondary),
            3 => (0.0, secondary, chroma),
            4 => (secondary, 0.0, chroma),
            _ => (chroma, 0.0, secondary),
        };
        let floor = value - chroma;
        Self::from_rgb(
            channel_to_byte(red + floor),
            channel_to_byte(green + floor),
            channel_to_byte(blue + floor),
        )
    }

    /// Desaturated copy using the channel average, applied when a snake dies.
    #[must_use]
    pub fn to_greyscale(self) -> Self {
        let sum = u16::from(self.red) + u16::from(self.green) + u16::from(self.blue);
        let average = (sum / 3) as u8;
        Self::from_rgb(average, average, average)
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

fn channel_to_byte(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Set of currently impassable cells handed to the path search by reference.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ObstacleSet {
    cells: HashSet<CellId>,
}

impl ObstacleSet {
    /// Creates an empty obstacle set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the cell as blocked, returning `true` when it was previously free.
    pub fn insert(&mut self, cell: CellId) -> bool {
        self.cells.insert(cell)
    }

    /// Clears the blocked flag, returning `true` when the cell was blocked.
    pub fn remove(&mut self, cell: CellId) -> bool {
        self.cells.remove(&cell)
    }

    /// Reports whether the cell is blocked.
    #[must_use]
    pub fn contains(&self, cell: CellId) -> bool {
        self.cells.contains(&cell)
    }

    /// Number of blocked cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether no cell is blocked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Unblocks every cell.
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Blocked cells in ascending identifier order.
    #[must_use]
    pub fn sorted(&self) -> Vec<CellId> {
        let mut cells: Vec<CellId> = self.cells.iter().copied().collect();
        cells.sort_unstable();
        cells
    }
}

impl FromIterator<CellId> for ObstacleSet {
    fn from_iter<I: IntoIterator<Item = CellId>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}

impl Extend<CellId> for ObstacleSet {
    fn extend<I: IntoIterator<Item = CellId>>(&mut self, iter: I) {
        self.cells.extend(iter);
    }
}

/// Immutable representation of the snake's state used by systems.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SnakeSnapshot {
    /// Identifier of the snake.
    pub id: SnakeId,
    /// Cell occupied by the head segment.
    pub head: CellCoord,
    /// Heading committed for the next step.
    pub direction: Direction,
    /// Indicates whether the snake is still moving.
    pub alive: bool,
    /// Number of segments composing the body.
    pub length: usize,
}
