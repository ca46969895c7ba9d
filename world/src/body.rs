//! Ordered segment sequence with per-segment spatial indices.

use serpentine_core::{CellCoord, CellId, FieldSize, SegmentColor};

use crate::segment::Segment;

/// Ordered sequence of segments; index zero is the head.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Body {
    segments: Vec<Segment>,
}

impl Body {
    /// Wraps an already ordered list of segments.
    #[must_use]
    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// Number of segments in the body.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Reports whether the body holds no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Leading segment, if any.
    #[must_use]
    pub fn head(&self) -> Option<&Segment> {
        self.segments.first()
    }

    /// Trailing segment, if any.
    #[must_use]
    pub fn tail(&self) -> Option<&Segment> {
        self.segments.last()
    }

    /// Segments in head-to-tail order.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Cell identifiers covered by the body, head first.
    pub fn footprint(&self) -> impl Iterator<Item = CellId> + '_ {
        self.segments.iter().map(Segment::spatial_index)
    }

    /// Reports whether any segment occupies the cell.
    #[must_use]
    pub fn occupies(&self, cell: CellId) -> bool {
        self.segments
            .iter()
            .any(|segment| segment.spatial_index() == cell)
    }

    /// Positions of every segment, head first.
    #[must_use]
    pub fn positions(&self) -> Vec<CellCoord> {
        self.segments.iter().map(Segment::position).collect()
    }

    /// Re-derives the spatial index of every segment.
    pub(crate) fn reindex(&mut self, field: FieldSize) {
        for segment in &mut self.segments {
            segment.update_spatial_index(field);
        }
    }

    /// Flips the traversal order so the tail becomes the head.
    pub(crate) fn reverse(&mut self) {
        self.segments.reverse();
    }

    /// Inserts a segment in front of the head.
    pub(crate) fn prepend(&mut self, segment: Segment) {
        self.segments.insert(0, segment);
    }

    /// Moves the last segment to the front at `position`.
    ///
    /// Returns the cell the tail vacated.
    pub(crate) fn relocate_tail_to(
        &mut self,
        position: CellCoord,
        field: FieldSize,
    ) -> Option<CellCoord> {
        let mut tail = self.segments.pop()?;
        let vacated = tail.position();
        tail.move_to(position, field);
        self.segments.insert(0, tail);
        Some(vacated)
    }

    pub(crate) fn recolor<F>(&mut self, mut paint: F)
    where
        F: FnMut(SegmentColor) -> SegmentColor,
    {
        for segment in &mut self.segments {
            segment.set_color(paint(segment.color()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serpentine_core::{Owner, SegmentId};

    fn body_at(field: FieldSize, cells: &[(u32, u32)]) -> Body {
        Body::from_segments(
            cells
                .iter()
                .enumerate()
                .map(|(index, &(column, row))| {
                    Segment::new(
                        SegmentId::new(index as u32),
                        CellCoord::new(column, row),
                        field,
                        SegmentColor::derived(index),
                        Owner::Free,
                    )
                })
                .collect(),
        )
    }

    #[test]
    fn relocating_tail_translates_the_body() {
        let field = FieldSize::new(10, 10);
        let mut body = body_at(field, &[(5, 5), (4, 5), (3, 5)]);

        let vacated = body.relocate_tail_to(CellCoord::new(6, 5), field);

        assert_eq!(vacated, Some(CellCoord::new(3, 5)));
        assert_eq!(
            body.positions(),
            vec![
                CellCoord::new(6, 5),
                CellCoord::new(5, 5),
                CellCoord::new(4, 5)
            ]
        );
        assert_eq!(body.head().map(Segment::id), Some(SegmentId::new(2)));
        assert!(body.occupies(field.cell_id(CellCoord::new(6, 5))));
        assert!(!body.occupies(field.cell_id(CellCoord::new(3, 5))));
    }

    #[test]
    fn reverse_swaps_head_and_tail() {
        let field = FieldSize::new(10, 10);
        let mut body = body_at(field, &[(5, 5), (4, 5), (3, 5)]);
        body.reverse();
        assert_eq!(body.head().map(Segment::position), Some(CellCoord::new(3, 5)));
        assert_eq!(body.tail().map(Segment::position), Some(CellCoord::new(5, 5)));
    }

    #[test]
    fn empty_body_has_nothing_to_relocate() {
        let field = FieldSize::new(3, 3);
        let mut body = Body::default();
        assert!(body.is_empty());
        assert_eq!(body.relocate_tail_to(CellCoord::new(1, 1), field), None);
    }
}
