//! Plain-text backend that draws scenes as character grids.

use std::io::Write;

use anyhow::{Context, Result as AnyResult};
use tile_defence_core::{Direction, OccupantKind};

use crate::{RenderingBackend, Scene};

const AGENT_GLYPH: char = '@';

/// Backend writing each frame to an output stream.
#[derive(Debug)]
pub struct TextBackend<W> {
    out: W,
    frames: usize,
}

impl<W: Write> TextBackend<W> {
    /// Creates a backend writing frames to `out`.
    pub fn new(out: W) -> Self {
        Self { out, frames: 0 }
    }

    /// Number of frames presented so far.
    #[must_use]
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Releases the underlying stream.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RenderingBackend for TextBackend<W> {
    fn present(&mut self, scene: &Scene) -> AnyResult<()> {
        let frame = render_text(scene);
        self.out
            .write_all(frame.as_bytes())
            .and_then(|()| self.out.flush())
            .with_context(|| format!("failed to write frame {}", self.frames))?;
        self.frames += 1;
        Ok(())
    }
}

/// Draws the scene with the north row on top.
///
/// Agents are drawn as `@`. Occupied cells keep their occupant glyph; empty
/// cells show their flow arrow when one is present.
#[must_use]
pub fn render_text(scene: &Scene) -> String {
    let size = scene.size();
    let columns = size.columns() as usize;
    let rows = size.rows() as usize;
    let mut canvas = vec![vec!['.'; columns]; rows];

    for (row, line) in canvas.iter_mut().enumerate() {
        for (column, glyph) in line.iter_mut().enumerate() {
            let index = row * columns + column;
            *glyph = occupant_glyph(scene.cells[index]);
        }
    }

    for (cell, direction) in &scene.arrows {
        if !size.contains(*cell) {
            continue;
        }
        let glyph = &mut canvas[cell.row() as usize][cell.column() as usize];
        if *glyph == '.' {
            *glyph = arrow_glyph(*direction);
        }
    }

    for agent in &scene.agents {
        if let Some(cell) = scene.cell_under(agent.position) {
            canvas[cell.row() as usize][cell.column() as usize] = AGENT_GLYPH;
        }
    }

    let border = format!("+{}+\n", "-".repeat(columns));
    let mut frame = String::with_capacity((columns + 3) * (rows + 2));
    if scene.show_grid {
        frame.push_str(&border);
    }
    for line in canvas.iter().rev() {
        if scene.show_grid {
            frame.push('|');
        }
        frame.extend(line.iter());
        if scene.show_grid {
            frame.push('|');
        }
        frame.push('\n');
    }
    if scene.show_grid {
        frame.push_str(&border);
    }
    frame
}

fn occupant_glyph(kind: OccupantKind) -> char {
    match kind {
        OccupantKind::Empty => '.',
        OccupantKind::Wall => '#',
        OccupantKind::SpawnPoint => 'S',
        OccupantKind::Destination => 'X',
    }
}

fn arrow_glyph(direction: Direction) -> char {
    match direction {
        Direction::North => '^',
        Direction::East => '>',
        Direction::South => 'v',
        Direction::West => '<',
    }
}
