//! Board cells and the neighbour graph linking them.
//!
//! Cells live in a dense row-major arena owned by the world. Links between
//! cells are arena indices, assigned once while the board is constructed and
//! never rewritten afterwards.

use tile_defence_core::{CellCoord, Direction, OccupantKind};

use crate::occupants::Occupant;

/// Arena index of a cell within the world's row-major cell vector.
pub(crate) type CellIndex = usize;

/// Distance sentinel recorded for cells that no destination reached.
pub(crate) const UNREACHABLE: u32 = u32::MAX;

/// Single board node holding topology, occupant and search state.
#[derive(Debug)]
pub(crate) struct Cell {
    coord: CellCoord,
    neighbors: [Option<CellIndex>; 4],
    occupant: Occupant,
    distance: u32,
    next_hop: Option<CellIndex>,
    alternative: bool,
}

impl Cell {
    /// Creates an isolated cell without any path.
    pub(crate) fn new(coord: CellCoord, occupant: Occupant) -> Self {
        let even_column = coord.column() & 1 == 0;
        let even_row = coord.row() & 1 == 0;
        Self {
            coord,
            neighbors: [None; 4],
            occupant,
            distance: UNREACHABLE,
            next_hop: None,
            alternative: even_column != even_row,
        }
    }

    pub(crate) fn coord(&self) -> CellCoord {
        self.coord
    }

    pub(crate) fn kind(&self) -> OccupantKind {
        self.occupant.kind()
    }

    pub(crate) fn distance(&self) -> u32 {
        self.distance
    }

    pub(crate) fn next_hop(&self) -> Option<CellIndex> {
        self.next_hop
    }

    /// Checkerboard flag selecting the neighbour expansion order.
    pub(crate) fn is_alternative(&self) -> bool {
        self.alternative
    }

    pub(crate) fn neighbor(&self, direction: Direction) -> Option<CellIndex> {
        self.neighbors[slot(direction)]
    }

    pub(crate) fn has_path(&self) -> bool {
        self.distance != UNREACHABLE
    }

    pub(crate) fn clear_path(&mut self) {
        self.distance = UNREACHABLE;
        self.next_hop = None;
    }

    pub(crate) fn become_destination(&mut self) {
        self.distance = 0;
        self.next_hop = None;
    }

    /// Swaps in a new occupant, handing back the previous one for reclamation.
    pub(crate) fn replace_occupant(&mut self, occupant: Occupant) -> Occupant {
        std::mem::replace(&mut self.occupant, occupant)
    }

    fn link(&mut self, direction: Direction, neighbor: CellIndex) {
        let slot = &mut self.neighbors[slot(direction)];
        assert!(
            slot.is_none(),
            "redefined {direction:?} neighbour of cell {}",
            self.coord
        );
        *slot = Some(neighbor);
    }
}

const fn slot(direction: Direction) -> usize {
    match direction {
        Direction::North => 0,
        Direction::East => 1,
        Direction::South => 2,
        Direction::West => 3,
    }
}

/// Links two horizontally adjacent cells.
///
/// # Panics
///
/// Panics when either side of the link was already assigned.
pub(crate) fn make_east_west_neighbors(cells: &mut [Cell], east: CellIndex, west: CellIndex) {
    cells[west].link(Direction::East, east);
    cells[east].link(Direction::West, west);
}

/// Links two vertically adjacent cells.
///
/// # Panics
///
/// Panics when either side of the link was already assigned.
pub(crate) fn make_north_south_neighbors(cells: &mut [Cell], north: CellIndex, south: CellIndex) {
    cells[south].link(Direction::North, north);
    cells[north].link(Direction::South, south);
}

/// Extends the path of `from` one step in `direction`.
///
/// Returns the neighbour when it joined the frontier. Walls receive a
/// distance and a next hop but are never returned, so growth stops there.
///
/// # Panics
///
/// Panics when `from` has no path of its own.
pub(crate) fn grow_path(
    cells: &mut [Cell],
    from: CellIndex,
    direction: Direction,
) -> Option<CellIndex> {
    let neighbor = cells[from].neighbor(direction);
    grow_path_to(cells, from, neighbor)
}

fn grow_path_to(
    cells: &mut [Cell],
    from: CellIndex,
    neighbor: Option<CellIndex>,
) -> Option<CellIndex> {
    assert!(
        cells[from].has_path(),
        "cell {} grew a path without having one",
        cells[from].coord
    );

    let neighbor = neighbor?;
    if cells[neighbor].has_path() {
        return None;
    }

    let distance = cells[from].distance + 1;
    let target = &mut cells[neighbor];
    target.distance = distance;
    target.next_hop = Some(from);

    if target.kind() == OccupantKind::Wall {
        None
    } else {
        Some(neighbor)
    }
}
