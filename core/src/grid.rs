//! Row-major lattice indexing, the Manhattan heuristic and cardinal neighbor lookup.
//!
//! Cells of a `width × height` lattice are identified by `id = row * width + column`.
//! The free functions below perform no bounds checks on their inputs unless
//! stated otherwise; callers validate the grid dimensions up front.

use serde::{Deserialize, Serialize};

use crate::{CellCoord, CellId, Direction};

/// Converts a coordinate into its row-major cell identifier.
#[must_use]
pub fn cell_id(coord: CellCoord, width: u32) -> CellId {
    CellId::new(coord.row() * width + coord.column())
}

/// Decodes a row-major cell identifier back into its coordinate.
#[must_use]
pub fn cell_coords(id: CellId, width: u32) -> CellCoord {
    let row = id.get() / width;
    let column = id.get() - row * width;
    CellCoord::new(column, row)
}

/// Manhattan distance between the decoded coordinates of two cells.
#[must_use]
pub fn heuristic(from: CellId, to: CellId, width: u32) -> u32 {
    cell_coords(from, width).manhattan_distance(cell_coords(to, width))
}

/// Identifier of the cell adjacent to `id` in the given direction.
///
/// Returns `None` when `id` lies outside the lattice or when the neighbor
/// would fall outside `[0, width) × [0, height)`. The lattice does not wrap.
#[must_use]
pub fn neighbor(id: CellId, direction: Direction, width: u32, height: u32) -> Option<CellId> {
    let cell_count = u64::from(width) * u64::from(height);
    if u64::from(id.get()) >= cell_count {
        return None;
    }

    let cell = cell_coords(id, width);
    let next = match direction {
        Direction::West => CellCoord::new(cell.column().checked_sub(1)?, cell.row()),
        Direction::North => CellCoord::new(cell.column(), cell.row().checked_sub(1)?),
        Direction::East => {
            let column = cell.column().checked_add(1).filter(|column| *column < width)?;
            CellCoord::new(column, cell.row())
        }
        Direction::South => {
            let row = cell.row().checked_add(1).filter(|row| *row < height)?;
            CellCoord::new(cell.column(), row)
        }
    };

    Some(cell_id(next, width))
}

/// Dimensions of the playing field measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldSize {
    width: u32,
    height: u32,
}

impl FieldSize {
    /// Creates a field description with the provided dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of columns in the field.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows in the field.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells, saturating on platforms with narrow `usize`.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        let count = u64::from(self.width) * u64::from(self.height);
        usize::try_from(count).unwrap_or(usize::MAX)
    }

    /// Reports whether the coordinate lies inside the field.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.width && cell.row() < self.height
    }

    /// Row-major identifier of an in-bounds coordinate.
    #[must_use]
    pub fn cell_id(&self, cell: CellCoord) -> CellId {
        cell_id(cell, self.width)
    }

    /// Coordinate decoded from a row-major identifier.
    #[must_use]
    pub fn cell_coords(&self, id: CellId) -> CellCoord {
        cell_coords(id, self.width)
    }

    /// Cell one step away in `direction` with toroidal wraparound.
    ///
    /// Leaving past the last column or row re-enters at zero; stepping below
    /// zero re-enters at the last column or row.
    #[must_use]
    pub fn step_wrapped(&self, cell: CellCoord, direction: Direction) -> CellCoord {
        let (dx, dy) = direction.unit_vector();
        CellCoord::new(
            wrap_axis(cell.column(), dx, self.width),
            wrap_axis(cell.row(), dy, self.height),
        )
    }
}

fn wrap_axis(position: u32, delta: i32, bound: u32) -> u32 {
    let last = i64::from(bound.saturating_sub(1));
    let next = i64::from(position) + i64::from(delta);
    if next > last {
        0
    } else if next < 0 {
        last as u32
    } else {
        next as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn cell_indexing_is_a_bijection() {
        let width = 7;
        let height = 5;
        let mut seen = HashSet::new();
        for row in 0..height {
            for column in 0..width {
                let cell = CellCoord::new(column, row);
                let id = cell_id(cell, width);
                assert_eq!(cell_coords(id, width), cell);
                assert!(id.get() < width * height);
                assert!(seen.insert(id), "duplicate id {id:?}");
            }
        }
        assert_eq!(seen.len(), (width * height) as usize);
    }

    #[test]
    fn heuristic_is_non_negative_and_zero_on_identity() {
        let width = 6;
        for a in 0..36 {
            let from = CellId::new(a);
            assert_eq!(heuristic(from, from, width), 0);
            for b in 0..36 {
                let to = CellId::new(b);
                assert_eq!(heuristic(from, to, width), heuristic(to, from, width));
            }
        }
        assert_eq!(heuristic(CellId::new(0), CellId::new(35), width), 10);
    }

    #[test]
    fn neighbors_respect_lattice_bounds() {
        let (width, height) = (4, 3);
        let corner = cell_id(CellCoord::new(0, 0), width);
        assert_eq!(neighbor(corner, Direction::West, width, height), None);
        assert_eq!(neighbor(corner, Direction::North, width, height), None);
        assert_eq!(
            neighbor(corner, Direction::East, width, height),
            Some(cell_id(CellCoord::new(1, 0), width))
        );
        assert_eq!(
            neighbor(corner, Direction::South, width, height),
            Some(cell_id(CellCoord::new(0, 1), width))
        );

        let far = cell_id(CellCoord::new(3, 2), width);
        assert_eq!(neighbor(far, Direction::East, width, height), None);
        assert_eq!(neighbor(far, Direction::South, width, height), None);
    }

    #[test]
    fn neighbor_of_invalid_cell_is_none() {
        for direction in Direction::ALL {
            assert_eq!(neighbor(CellId::new(12), direction, 4, 3), None);
        }
    }

    #[test]
    fn stepping_wraps_at_field_edges() {
        let field = FieldSize::new(10, 8);
        assert_eq!(
            field.step_wrapped(CellCoord::new(9, 3), Direction::East),
            CellCoord::new(0, 3)
        );
        assert_eq!(
            field.step_wrapped(CellCoord::new(0, 3), Direction::West),
            CellCoord::new(9, 3)
        );
        assert_eq!(
            field.step_wrapped(CellCoord::new(4, 0), Direction::North),
            CellCoord::new(4, 7)
        );
        assert_eq!(
            field.step_wrapped(CellCoord::new(4, 7), Direction::South),
            CellCoord::new(4, 0)
        );
        assert_eq!(
            field.step_wrapped(CellCoord::new(4, 4), Direction::South),
            CellCoord::new(4, 5)
        );
    }
}
