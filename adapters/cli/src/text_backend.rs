//! Terminal backend drawing scenes as character grids.

use std::io::Write;

use anyhow::{Context, Result as AnyResult};
use serpentine_core::CellCoord;
use serpentine_rendering::{RenderingBackend, Scene, SegmentKind, SegmentPresentation};

const EMPTY: char = '.';
const ROUTE: char = '+';
const COOKIE: char = '*';
const SELECTED_COOKIE: char = '#';
const BODY: char = 'o';
const DEAD_BODY: char = 'x';
const HEAD: char = '@';

/// Writes every presented scene to the wrapped writer.
#[derive(Debug)]
pub(crate) struct TextBackend<W> {
    out: W,
    color: bool,
    frame: u64,
}

impl<W: Write> TextBackend<W> {
    pub(crate) fn new(out: W, color: bool) -> Self {
        Self {
            out,
            color,
            frame: 0,
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RenderingBackend for TextBackend<W> {
    fn present(&mut self, scene: &Scene) -> AnyResult<()> {
        self.frame += 1;
        writeln!(self.out, "frame {}", self.frame).context("failed to write frame header")?;
        self.out
            .write_all(render(scene, self.color).as_bytes())
            .context("failed to write frame")?;
        self.out.flush().context("failed to flush frame")
    }
}

/// Draws the scene row by row; later layers cover earlier ones.
pub(crate) fn render(scene: &Scene, color: bool) -> String {
    let columns = scene.field.columns as usize;
    let rows = scene.field.rows as usize;
    let mut cells: Vec<Option<(char, Option<&SegmentPresentation>)>> = vec![None; columns * rows];
    let slot = |cell: CellCoord| {
        (cell.column() < scene.field.columns && cell.row() < scene.field.rows)
            .then(|| cell.row() as usize * columns + cell.column() as usize)
    };

    for index in scene.route.iter().filter_map(|&cell| slot(cell)) {
        cells[index] = Some((ROUTE, None));
    }
    for kind in [SegmentKind::Cookie, SegmentKind::Body, SegmentKind::Head] {
        for segment in scene.segments.iter().filter(|segment| segment.kind == kind) {
            if let Some(index) = slot(segment.cell) {
                cells[index] = Some((symbol(segment, scene.alive), Some(segment)));
            }
        }
    }

    let mut text = String::with_capacity((columns + 1) * rows);
    for row in cells.chunks(columns.max(1)) {
        for cell in row {
            match cell {
                Some((symbol, Some(segment))) if color => {
                    let (red, green, blue) = segment.color.to_rgb_u8();
                    text.push_str(&format!("\x1b[38;2;{red};{green};{blue}m{symbol}\x1b[0m"));
                }
                Some((symbol, _)) => text.push(*symbol),
                None => text.push(EMPTY),
            }
        }
        text.push('\n');
    }
    text
}

fn symbol(segment: &SegmentPresentation, alive: bool) -> char {
    match segment.kind {
        SegmentKind::Head if alive => HEAD,
        SegmentKind::Head | SegmentKind::Body if !alive => DEAD_BODY,
        SegmentKind::Body => BODY,
        SegmentKind::Cookie if segment.selected => SELECTED_COOKIE,
        _ => COOKIE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serpentine_rendering::{Color, FieldPresentation};

    fn scene(alive: bool) -> Scene {
        let field = FieldPresentation::new(4, 2, 8.0).expect("valid field");
        let segment = |column, row, kind, selected| {
            SegmentPresentation::new(
                &field,
                CellCoord::new(column, row),
                Color::from_rgb_u8(10, 20, 30),
                selected,
                kind,
            )
        };
        Scene::new(
            field,
            vec![
                segment(1, 0, SegmentKind::Head, false),
                segment(2, 0, SegmentKind::Body, false),
                segment(3, 1, SegmentKind::Cookie, true),
                segment(0, 1, SegmentKind::Cookie, false),
            ],
            vec![CellCoord::new(1, 1), CellCoord::new(2, 1)],
            alive,
        )
    }

    #[test]
    fn renders_every_layer() {
        assert_eq!(render(&scene(true), false), ".@o.\n*++#\n");
    }

    #[test]
    fn dead_snakes_are_crossed_out() {
        assert_eq!(render(&scene(false), false), ".xx.\n*++#\n");
    }

    #[test]
    fn colored_output_wraps_segments_only() {
        let text = render(&scene(true), true);
        assert!(text.starts_with(".\x1b[38;2;10;20;30m@\x1b[0m"));
        assert!(text.contains("++"));
    }

    #[test]
    fn present_numbers_frames() {
        let mut backend = TextBackend::new(Vec::new(), false);
        backend.present(&scene(true)).expect("write to memory");
        backend.present(&scene(true)).expect("write to memory");

        let output = String::from_utf8(backend.into_inner()).expect("utf-8 output");
        assert!(output.starts_with("frame 1\n.@o.\n"));
        assert!(output.contains("frame 2\n"));
    }
}
