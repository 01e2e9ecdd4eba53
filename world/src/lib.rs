#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative board state management for Tile Defence.
//!
//! The world owns every cell, keeps the flow field toward the destinations up
//! to date, and guards the board against edits that would strand a cell.
//! Structural edits are applied tentatively, validated by a complete search,
//! and rolled back when the search fails.

mod agents;
mod cell;
mod flow_field;
mod occupants;

use thiserror::Error;
use tile_defence_core::{
    BoardLayout, BoardSize, CellCoord, Command, EditError, Event, OccupantKind, WELCOME_BANNER,
};
use tracing::{debug, warn};

use crate::{
    agents::AgentRegistry,
    cell::{Cell, CellIndex},
    flow_field::FlowFieldSearch,
    occupants::OccupantFactory,
};

pub use crate::flow_field::SearchError;

/// Reasons a stored layout cannot be loaded onto a fresh board.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    /// The layout names a board smaller than the accepted minimum.
    #[error("board of {columns}x{rows} cells is below the 2x2 minimum")]
    BoardTooSmall {
        /// Number of columns named by the layout.
        columns: u32,
        /// Number of rows named by the layout.
        rows: u32,
    },
    /// A listed cell lies outside the board.
    #[error("cell {cell} lies outside the board")]
    OutOfBounds {
        /// Offending cell.
        cell: CellCoord,
    },
    /// A cell is listed under more than one occupant.
    #[error("cell {cell} is listed more than once")]
    Overlap {
        /// Offending cell.
        cell: CellCoord,
    },
    /// The layout lists no destination.
    #[error("layout has no destination")]
    MissingDestination,
    /// The layout lists no spawn point.
    #[error("layout has no spawn point")]
    MissingSpawnPoint,
    /// The layout leaves some cell without a route to a destination.
    #[error("layout is not fully connected: {0}")]
    Disconnected(#[from] SearchError),
}

/// Represents the authoritative Tile Defence board state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    size: BoardSize,
    cells: Vec<Cell>,
    spawn_points: Vec<CellIndex>,
    search: FlowFieldSearch,
    occupants: OccupantFactory,
    agents: AgentRegistry,
    show_paths: bool,
    show_grid: bool,
}

impl World {
    /// Creates a board with one destination in the middle and one spawn point
    /// in the first cell.
    ///
    /// Edges shorter than [`BoardSize::MIN_EDGE`] are raised to the minimum.
    #[must_use]
    pub fn new(size: BoardSize) -> Self {
        let clamped = size.clamped();
        if clamped != size {
            warn!(
                requested_columns = size.columns(),
                requested_rows = size.rows(),
                columns = clamped.columns(),
                rows = clamped.rows(),
                "board size raised to the minimum"
            );
        }

        let mut world = Self::blank(clamped);
        let middle = world.cells.len() / 2;
        let destination = world.cells[middle].coord();
        let spawn_point = world.cells[0].coord();
        let seeded = world.toggle_destination(destination);
        debug_assert_eq!(seeded, Ok(OccupantKind::Destination));
        let spawned = world.toggle_spawn_point(spawn_point);
        debug_assert_eq!(spawned, Ok(OccupantKind::SpawnPoint));
        world
    }

    /// Builds a board holding exactly the occupants listed by `layout`.
    ///
    /// The layout is validated as a whole: all cells must be on the board and
    /// listed once, at least one destination and spawn point must exist, and
    /// every cell must reach a destination.
    pub fn from_layout(layout: &BoardLayout) -> Result<Self, LayoutError> {
        let size = layout.size();
        if size.clamped() != size {
            return Err(LayoutError::BoardTooSmall {
                columns: size.columns(),
                rows: size.rows(),
            });
        }
        if layout.destinations().is_empty() {
            return Err(LayoutError::MissingDestination);
        }
        if layout.spawn_points().is_empty() {
            return Err(LayoutError::MissingSpawnPoint);
        }

        let mut world = Self::blank(size);
        let placements = layout
            .destinations()
            .iter()
            .map(|cell| (*cell, OccupantKind::Destination))
            .chain(
                layout
                    .walls()
                    .iter()
                    .map(|cell| (*cell, OccupantKind::Wall)),
            )
            .chain(
                layout
                    .spawn_points()
                    .iter()
                    .map(|cell| (*cell, OccupantKind::SpawnPoint)),
            );

        for (cell, kind) in placements {
            let index = size
                .index(cell)
                .ok_or(LayoutError::OutOfBounds { cell })?;
            if world.cells[index].kind() != OccupantKind::Empty {
                return Err(LayoutError::Overlap { cell });
            }
            let _ = world.replace_occupant(index, kind);
            if kind == OccupantKind::SpawnPoint {
                world.spawn_points.push(index);
            }
        }

        world.find_paths()?;
        Ok(world)
    }

    fn blank(size: BoardSize) -> Self {
        let width = usize::try_from(size.columns()).unwrap_or(usize::MAX);
        let mut occupants = OccupantFactory::new();
        let mut cells: Vec<Cell> = Vec::with_capacity(size.cell_count());

        for row in 0..size.rows() {
            for column in 0..size.columns() {
                let index = cells.len();
                cells.push(Cell::new(
                    CellCoord::new(column, row),
                    occupants.get(OccupantKind::Empty),
                ));

                if column > 0 {
                    cell::make_east_west_neighbors(&mut cells, index, index - 1);
                }
                if row > 0 {
                    cell::make_north_south_neighbors(&mut cells, index, index - width);
                }
            }
        }

        Self {
            banner: WELCOME_BANNER,
            size,
            cells,
            spawn_points: Vec::new(),
            search: FlowFieldSearch::default(),
            occupants,
            agents: AgentRegistry::new(),
            show_paths: false,
            show_grid: false,
        }
    }

    /// Recomputes the flow field for the current layout.
    pub fn find_paths(&mut self) -> Result<(), SearchError> {
        self.search.run(&mut self.cells)
    }

    /// Flips a cell between empty floor and destination.
    ///
    /// Removing a destination is rejected when some cell would lose its last
    /// route. Returns the occupant now held by the cell.
    pub fn toggle_destination(&mut self, cell: CellCoord) -> Result<OccupantKind, EditError> {
        let index = self.index_of(cell)?;
        match self.cells[index].kind() {
            OccupantKind::Destination => self.tentative_edit(index, OccupantKind::Empty),
            OccupantKind::Empty => Ok(self.committed_edit(index, OccupantKind::Destination)),
            occupant => Err(EditError::Incompatible { occupant }),
        }
    }

    /// Flips a cell between empty floor and wall.
    ///
    /// Placing a wall is rejected when some cell would lose its last route.
    /// Returns the occupant now held by the cell.
    pub fn toggle_wall(&mut self, cell: CellCoord) -> Result<OccupantKind, EditError> {
        let index = self.index_of(cell)?;
        match self.cells[index].kind() {
            OccupantKind::Wall => Ok(self.committed_edit(index, OccupantKind::Empty)),
            OccupantKind::Empty => self.tentative_edit(index, OccupantKind::Wall),
            occupant => Err(EditError::Incompatible { occupant }),
        }
    }

    /// Flips a cell between empty floor and spawn point.
    ///
    /// Spawn points do not affect traversal, so no search runs. The last
    /// remaining spawn point cannot be removed.
    pub fn toggle_spawn_point(&mut self, cell: CellCoord) -> Result<OccupantKind, EditError> {
        let index = self.index_of(cell)?;
        match self.cells[index].kind() {
            OccupantKind::SpawnPoint => {
                if self.spawn_points.len() <= 1 {
                    return Err(EditError::LastSpawnPoint);
                }
                self.spawn_points.retain(|spawn_point| *spawn_point != index);
                let _ = self.replace_occupant(index, OccupantKind::Empty);
                Ok(OccupantKind::Empty)
            }
            OccupantKind::Empty => {
                let _ = self.replace_occupant(index, OccupantKind::SpawnPoint);
                self.spawn_points.push(index);
                Ok(OccupantKind::SpawnPoint)
            }
            occupant => Err(EditError::Incompatible { occupant }),
        }
    }

    fn index_of(&self, cell: CellCoord) -> Result<CellIndex, EditError> {
        self.size.index(cell).ok_or(EditError::OutOfBounds)
    }

    fn tentative_edit(
        &mut self,
        index: CellIndex,
        kind: OccupantKind,
    ) -> Result<OccupantKind, EditError> {
        let previous = self.replace_occupant(index, kind);
        let error = match self.find_paths() {
            Ok(()) => return Ok(kind),
            Err(error) => error,
        };

        let _ = self.replace_occupant(index, previous);
        let restored = self.find_paths();
        debug_assert!(restored.is_ok(), "previous layout no longer validates");

        Err(match error {
            SearchError::NoDestination => EditError::LastDestination,
            SearchError::Unreachable { cell } => EditError::WouldDisconnect { stranded: cell },
        })
    }

    fn committed_edit(&mut self, index: CellIndex, kind: OccupantKind) -> OccupantKind {
        let _ = self.replace_occupant(index, kind);
        let result = self.find_paths();
        debug_assert!(result.is_ok(), "edit cannot disconnect the board");
        kind
    }

    fn replace_occupant(&mut self, index: CellIndex, kind: OccupantKind) -> OccupantKind {
        let occupant = self.occupants.get(kind);
        let previous = self.cells[index].replace_occupant(occupant);
        let previous_kind = previous.kind();
        self.occupants.reclaim(previous);
        previous_kind
    }

    fn can_spawn_on(&self, cell: CellCoord) -> bool {
        self.size.index(cell).map_or(false, |index| {
            let cell = &self.cells[index];
            cell.kind() == OccupantKind::SpawnPoint && cell.next_hop().is_some()
        })
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ToggleDestination { cell } => {
            let from = query::occupant(world, cell).unwrap_or(OccupantKind::Empty);
            let outcome = world.toggle_destination(cell);
            record_edit(cell, from, outcome, true, out_events);
        }
        Command::ToggleWall { cell } => {
            let from = query::occupant(world, cell).unwrap_or(OccupantKind::Empty);
            let outcome = world.toggle_wall(cell);
            record_edit(cell, from, outcome, true, out_events);
        }
        Command::ToggleSpawnPoint { cell } => {
            let from = query::occupant(world, cell).unwrap_or(OccupantKind::Empty);
            let outcome = world.toggle_spawn_point(cell);
            record_edit(cell, from, outcome, false, out_events);
        }
        Command::Tick { dt } => {
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::SpawnAgent { spawner } => {
            if world.can_spawn_on(spawner) {
                let agent = world.agents.allocate();
                out_events.push(Event::AgentSpawned {
                    agent,
                    cell: spawner,
                });
            } else {
                debug!(cell = %spawner, "spawn request names a cell that cannot host agents");
                out_events.push(Event::SpawnRejected { cell: spawner });
            }
        }
        Command::ReclaimAgent { agent } => {
            world.agents.reclaim(agent);
            out_events.push(Event::AgentReclaimed { agent });
        }
        Command::SetPathVisibility { visible } => {
            world.show_paths = visible;
            out_events.push(Event::PathVisibilityChanged { visible });
        }
        Command::SetGridVisibility { visible } => {
            world.show_grid = visible;
            out_events.push(Event::GridVisibilityChanged { visible });
        }
    }
}

fn record_edit(
    cell: CellCoord,
    from: OccupantKind,
    outcome: Result<OccupantKind, EditError>,
    structural: bool,
    out_events: &mut Vec<Event>,
) {
    match outcome {
        Ok(to) => {
            out_events.push(Event::OccupantChanged { cell, from, to });
            if structural {
                out_events.push(Event::FlowFieldRebuilt);
            }
        }
        Err(reason) => {
            debug!(cell = %cell, ?reason, "edit rejected");
            out_events.push(Event::EditRejected { cell, reason });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use glam::{Vec2, Vec3};
    use tile_defence_core::{BoardLayout, BoardSize, CellCoord, Direction, OccupantKind};

    use super::World;
    use crate::cell::{Cell, UNREACHABLE};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Dimensions of the board.
    #[must_use]
    pub fn board_size(world: &World) -> BoardSize {
        world.size
    }

    /// Occupant held by the cell, if it lies on the board.
    #[must_use]
    pub fn occupant(world: &World, cell: CellCoord) -> Option<OccupantKind> {
        cell_at(world, cell).map(Cell::kind)
    }

    /// Occupants of every cell in row-major order.
    #[must_use]
    pub fn occupants(world: &World) -> Vec<OccupantKind> {
        world.cells.iter().map(Cell::kind).collect()
    }

    /// Spawn points in spawner selection order.
    #[must_use]
    pub fn spawn_points(world: &World) -> Vec<CellCoord> {
        world
            .spawn_points
            .iter()
            .map(|index| world.cells[*index].coord())
            .collect()
    }

    /// Destination cells in row-major order.
    #[must_use]
    pub fn destinations(world: &World) -> Vec<CellCoord> {
        cells_holding(world, OccupantKind::Destination)
    }

    /// Captures the occupant layout of the board.
    #[must_use]
    pub fn layout(world: &World) -> BoardLayout {
        BoardLayout::new(
            world.size,
            cells_holding(world, OccupantKind::Wall),
            cells_holding(world, OccupantKind::Destination),
            spawn_points(world),
        )
    }

    /// Exposes a read-only view of the flow field.
    #[must_use]
    pub fn flow_field(world: &World) -> FlowFieldView<'_> {
        FlowFieldView {
            cells: &world.cells,
            size: world.size,
        }
    }

    /// Reports whether path arrows should be presented.
    #[must_use]
    pub fn show_paths(world: &World) -> bool {
        world.show_paths
    }

    /// Reports whether grid lines should be presented.
    #[must_use]
    pub fn show_grid(world: &World) -> bool {
        world.show_grid
    }

    /// Direction each cell's arrow points toward, while paths are shown.
    ///
    /// Destinations and cells without a next hop carry no arrow.
    #[must_use]
    pub fn path_arrows(world: &World) -> Vec<(CellCoord, Direction)> {
        if !world.show_paths {
            return Vec::new();
        }

        world
            .cells
            .iter()
            .filter(|cell| cell.distance() != 0)
            .filter_map(|cell| {
                let next = world.cells[cell.next_hop()?].coord();
                let direction = cell.coord().direction_to(next)?;
                Some((cell.coord(), direction))
            })
            .collect()
    }

    /// Number of occupants issued to cells and not yet reclaimed.
    #[must_use]
    pub fn live_occupants(world: &World) -> usize {
        world.occupants.live()
    }

    /// Number of agents spawned and not yet reclaimed.
    #[must_use]
    pub fn live_agents(world: &World) -> usize {
        world.agents.live()
    }

    /// Ground-plane position of the cell's centre.
    ///
    /// The board is centred on the origin with one world unit per cell.
    #[must_use]
    pub fn cell_center(world: &World, cell: CellCoord) -> Vec2 {
        center_of(world.size, cell)
    }

    /// Cell lying under a ground-plane point, if any.
    #[must_use]
    pub fn cell_at_point(world: &World, point: Vec2) -> Option<CellCoord> {
        let column = axis_index(point.x, world.size.columns())?;
        let row = axis_index(point.y, world.size.rows())?;
        Some(CellCoord::new(column, row))
    }

    /// Cell hit by a ray cast against the ground plane `y = 0`.
    ///
    /// The hit's `x` maps to columns and its `z` to rows. Rays running
    /// parallel to the plane or pointing away from it hit nothing.
    #[must_use]
    pub fn cell_on_ray(world: &World, origin: Vec3, direction: Vec3) -> Option<CellCoord> {
        if direction.y.abs() <= f32::EPSILON {
            return None;
        }

        let distance = -origin.y / direction.y;
        if distance < 0.0 {
            return None;
        }

        let hit = origin + direction * distance;
        cell_at_point(world, Vec2::new(hit.x, hit.z))
    }

    /// Read-only view over the board's flow field.
    #[derive(Clone, Copy, Debug)]
    pub struct FlowFieldView<'a> {
        cells: &'a [Cell],
        size: BoardSize,
    }

    impl<'a> FlowFieldView<'a> {
        /// Hop count from the cell to its nearest destination.
        ///
        /// Returns `None` for cells outside the board or without a path.
        #[must_use]
        pub fn distance(&self, cell: CellCoord) -> Option<u32> {
            let distance = self.cell(cell)?.distance();
            (distance != UNREACHABLE).then_some(distance)
        }

        /// Neighbour one step closer to a destination, if any.
        #[must_use]
        pub fn next_hop(&self, cell: CellCoord) -> Option<CellCoord> {
            let next = self.cell(cell)?.next_hop()?;
            Some(self.cells[next].coord())
        }

        /// Reports whether the cell has a finite distance.
        #[must_use]
        pub fn has_path(&self, cell: CellCoord) -> bool {
            self.cell(cell).map_or(false, Cell::has_path)
        }

        /// Chain of next hops leading from `cell` to its destination.
        ///
        /// The starting cell is not included; the last entry is the
        /// destination. Empty when the cell has nowhere to go.
        #[must_use]
        pub fn path_from(&self, cell: CellCoord) -> Vec<CellCoord> {
            let Some(mut index) = self.size.index(cell) else {
                return Vec::new();
            };

            let mut path = Vec::new();
            while let Some(next) = self.cells[index].next_hop() {
                path.push(self.cells[next].coord());
                index = next;
            }
            path
        }

        /// Ground-plane position of the cell's centre.
        #[must_use]
        pub fn center(&self, cell: CellCoord) -> Vec2 {
            center_of(self.size, cell)
        }

        fn cell(&self, cell: CellCoord) -> Option<&'a Cell> {
            self.size.index(cell).and_then(|index| self.cells.get(index))
        }
    }

    fn cell_at(world: &World, cell: CellCoord) -> Option<&Cell> {
        world
            .size
            .index(cell)
            .and_then(|index| world.cells.get(index))
    }

    fn cells_holding(world: &World, kind: OccupantKind) -> Vec<CellCoord> {
        world
            .cells
            .iter()
            .filter(|cell| cell.kind() == kind)
            .map(Cell::coord)
            .collect()
    }

    fn center_of(size: BoardSize, cell: CellCoord) -> Vec2 {
        let offset = Vec2::new(
            (size.columns() as f32 - 1.0) * 0.5,
            (size.rows() as f32 - 1.0) * 0.5,
        );
        Vec2::new(cell.column() as f32, cell.row() as f32) - offset
    }

    fn axis_index(coordinate: f32, cells: u32) -> Option<u32> {
        let index = (coordinate + cells as f32 * 0.5).floor();
        if (0.0..cells as f32).contains(&index) {
            Some(index as u32)
        } else {
            None
        }
    }
}
