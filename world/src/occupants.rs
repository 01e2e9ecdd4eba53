//! Occupant content handed to cells and reclaimed when replaced.

use std::sync::atomic::{AtomicU32, Ordering};

use tile_defence_core::OccupantKind;

static NEXT_FACTORY_ID: AtomicU32 = AtomicU32::new(0);

/// Identifier of the factory an occupant originated from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct FactoryId(u32);

/// Content placed on a cell. Owned exclusively by that cell.
#[derive(Debug)]
pub(crate) struct Occupant {
    kind: OccupantKind,
    origin: FactoryId,
}

impl Occupant {
    pub(crate) fn kind(&self) -> OccupantKind {
        self.kind
    }
}

/// Produces occupants and takes them back once a cell drops them.
#[derive(Debug)]
pub(crate) struct OccupantFactory {
    id: FactoryId,
    live: usize,
}

impl OccupantFactory {
    /// Creates a factory with a process-unique identifier.
    pub(crate) fn new() -> Self {
        Self {
            id: FactoryId(NEXT_FACTORY_ID.fetch_add(1, Ordering::Relaxed)),
            live: 0,
        }
    }

    pub(crate) fn get(&mut self, kind: OccupantKind) -> Occupant {
        self.live += 1;
        Occupant {
            kind,
            origin: self.id,
        }
    }

    /// Takes back an occupant that a cell no longer holds.
    ///
    /// # Panics
    ///
    /// Panics when the occupant was produced by a different factory.
    pub(crate) fn reclaim(&mut self, occupant: Occupant) {
        assert_eq!(
            occupant.origin, self.id,
            "{:?} occupant reclaimed by the wrong factory",
            occupant.kind
        );
        self.live -= 1;
    }

    /// Number of occupants issued and not yet reclaimed.
    pub(crate) fn live(&self) -> usize {
        self.live
    }
}
