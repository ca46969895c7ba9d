//! Individual grid segments carrying a derived spatial index.

use serpentine_core::{CellCoord, CellId, FieldSize, Owner, SegmentColor, SegmentId};

/// Single occupied cell belonging to a body or lying free on the field.
///
/// The spatial index is derived from the position and both change together
/// through [`Segment::move_to`]; no other code path writes the position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Segment {
    id: SegmentId,
    position: CellCoord,
    spatial_index: CellId,
    color: SegmentColor,
    owner: Owner,
    selected: bool,
}

impl Segment {
    /// Creates a segment at `position`, deriving its spatial index from `field`.
    #[must_use]
    pub fn new(
        id: SegmentId,
        position: CellCoord,
        field: FieldSize,
        color: SegmentColor,
        owner: Owner,
    ) -> Self {
        Self {
            id,
            position,
            spatial_index: field.cell_id(position),
            color,
            owner,
            selected: false,
        }
    }

    /// Identifier of the segment.
    #[must_use]
    pub const fn id(&self) -> SegmentId {
        self.id
    }

    /// Cell the segment occupies.
    #[must_use]
    pub const fn position(&self) -> CellCoord {
        self.position
    }

    /// Row-major identifier of the occupied cell.
    #[must_use]
    pub const fn spatial_index(&self) -> CellId {
        self.spatial_index
    }

    /// Appearance of the segment.
    #[must_use]
    pub const fn color(&self) -> SegmentColor {
        self.color
    }

    /// Body the segment belongs to.
    #[must_use]
    pub const fn owner(&self) -> Owner {
        self.owner
    }

    /// Indicates whether the segment is the current navigation target.
    #[must_use]
    pub const fn is_selected(&self) -> bool {
        self.selected
    }

    /// Relocates the segment and re-derives its spatial index in one step.
    pub fn move_to(&mut self, position: CellCoord, field: FieldSize) {
        self.position = position;
        self.update_spatial_index(field);
    }

    /// Recomputes the spatial index from the current position.
    pub fn update_spatial_index(&mut self, field: FieldSize) {
        self.spatial_index = field.cell_id(self.position);
    }

    pub(crate) fn set_color(&mut self, color: SegmentColor) {
        self.color = color;
    }

    pub(crate) fn set_owner(&mut self, owner: Owner) {
        self.owner = owner;
    }

    pub(crate) fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }
}
