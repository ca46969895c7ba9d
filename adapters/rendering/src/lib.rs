#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Serpentine adapters.

use anyhow::Result as AnyResult;
use glam::Vec2;
use serpentine_core::{CellCoord, Command, Direction, SegmentColor};
use std::{error::Error, fmt};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Converts a segment color into an opaque presentation color.
    #[must_use]
    pub const fn from_segment(color: SegmentColor) -> Self {
        Self::from_rgb_u8(color.red(), color.green(), color.blue())
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }

    /// Quantises the color back to byte channels, ignoring alpha.
    #[must_use]
    pub fn to_rgb_u8(self) -> (u8, u8, u8) {
        (
            quantise_channel(self.red),
            quantise_channel(self.green),
            quantise_channel(self.blue),
        )
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

fn quantise_channel(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Heading requested through the keyboard on this frame.
    pub direction: Option<Direction>,
    /// Screen-space position of a pointer press on this frame.
    pub pointer: Option<Vec2>,
}

impl FrameInput {
    /// Translates the captured input into simulation commands.
    ///
    /// Pointer presses outside the field are dropped.
    pub fn into_commands(self, field: &FieldPresentation, out: &mut Vec<Command>) {
        if let Some(direction) = self.direction {
            out.push(Command::SetDirection { direction });
        }
        if let Some(cell) = self.pointer.and_then(|point| field.screen_to_cell(point)) {
            out.push(Command::SelectTarget { cell });
        }
    }
}

/// Geometry of the playing field in screen units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldPresentation {
    /// Number of columns contained in the field.
    pub columns: u32,
    /// Number of rows contained in the field.
    pub rows: u32,
    /// Side length of a single cell expressed in screen units.
    pub cell_size: f32,
}

impl FieldPresentation {
    /// Creates a new field descriptor.
    ///
    /// Returns an error when the field has no cells or the cell size is not a
    /// positive finite number.
    pub fn new(
        columns: u32,
        rows: u32,
        cell_size: f32,
    ) -> std::result::Result<Self, RenderingError> {
        if columns == 0 || rows == 0 {
            return Err(RenderingError::EmptyField { columns, rows });
        }
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(RenderingError::InvalidCellSize { cell_size });
        }

        Ok(Self {
            columns,
            rows,
            cell_size,
        })
    }

    /// Calculates the total width of the field.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.cell_size
    }

    /// Calculates the total height of the field.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.cell_size
    }

    /// Top-left corner of the cell in screen units.
    #[must_use]
    pub fn cell_to_screen(&self, cell: CellCoord) -> Vec2 {
        Vec2::new(cell.column() as f32, cell.row() as f32) * self.cell_size
    }

    /// Centre of the cell in screen units.
    #[must_use]
    pub fn cell_center(&self, cell: CellCoord) -> Vec2 {
        self.cell_to_screen(cell) + Vec2::splat(self.cell_size * 0.5)
    }

    /// Cell containing the screen-space point, if it lies on the field.
    #[must_use]
    pub fn screen_to_cell(&self, point: Vec2) -> Option<CellCoord> {
        if !point.is_finite() || point.x < 0.0 || point.y < 0.0 {
            return None;
        }
        let cell = (point / self.cell_size).floor();
        let (column, row) = (cell.x as u32, cell.y as u32);
        if column >= self.columns || row >= self.rows {
            return None;
        }
        Some(CellCoord::new(column, row))
    }
}

/// Role a presented segment plays in the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    /// Leading segment of the snake.
    Head,
    /// Any other segment of the snake.
    Body,
    /// Free-standing cookie waiting to be eaten.
    Cookie,
}

/// Screen-space description of a single segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentPresentation {
    /// Cell the segment occupies.
    pub cell: CellCoord,
    /// Top-left corner of the segment in screen units.
    pub position: Vec2,
    /// Edge length of the drawn square.
    pub size: f32,
    /// Fill color of the segment.
    pub color: Color,
    /// Whether the segment is the current navigation target.
    pub selected: bool,
    /// Role of the segment.
    pub kind: SegmentKind,
}

impl SegmentPresentation {
    /// Lays out a segment on the field.
    #[must_use]
    pub fn new(
        field: &FieldPresentation,
        cell: CellCoord,
        color: Color,
        selected: bool,
        kind: SegmentKind,
    ) -> Self {
        Self {
            cell,
            position: field.cell_to_screen(cell),
            size: field.cell_size,
            color,
            selected,
            kind,
        }
    }
}

/// Scene description combining the field, the snake, cookies and the route.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Field geometry.
    pub field: FieldPresentation,
    /// Snake segments followed by cookies.
    pub segments: Vec<SegmentPresentation>,
    /// Cells the navigator still plans to enter, in traversal order.
    pub route: Vec<CellCoord>,
    /// Whether the snake is still moving.
    pub alive: bool,
}

impl Scene {
    /// Creates a new scene descriptor.
    #[must_use]
    pub fn new(
        field: FieldPresentation,
        segments: Vec<SegmentPresentation>,
        route: Vec<CellCoord>,
        alive: bool,
    ) -> Self {
        Self {
            field,
            segments,
            route,
            alive,
        }
    }

    /// Segment drawn on the cell, preferring snake segments over cookies.
    #[must_use]
    pub fn segment_at(&self, cell: CellCoord) -> Option<&SegmentPresentation> {
        self.segments.iter().find(|segment| segment.cell == cell)
    }
}

/// Rendering backend capable of presenting Serpentine scenes.
pub trait RenderingBackend {
    /// Presents a single frame.
    fn present(&mut self, scene: &Scene) -> AnyResult<()>;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// The field must contain at least one cell.
    EmptyField {
        /// Provided column count.
        columns: u32,
        /// Provided row count.
        rows: u32,
    },
    /// Cells must have a positive finite size.
    InvalidCellSize {
        /// Provided cell size that failed validation.
        cell_size: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyField { columns, rows } => {
                write!(f, "field must contain cells (received {columns}x{rows})")
            }
            Self::InvalidCellSize { cell_size } => {
                write!(f, "cell_size must be positive (received {cell_size})")
            }
        }
    }
}

impl Error for RenderingError {}
