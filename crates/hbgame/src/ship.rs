//! Ships, the fleet manifest and the coordinate -> ship lookup table.

use crate::board::{Coord, BOARD_SIZE};
use crate::error::GameError;
use std::collections::BTreeSet;

/// Fleet manifest: every player places exactly these ships.
pub const FLEET: [(&str, usize); 5] = [
    ("Carrier", 5),
    ("Battleship", 4),
    ("Cruiser", 3),
    ("Submarine", 2),
    ("Destroyer", 2),
];

pub const TOTAL_SHIP_CELLS: usize = fleet_cells();

const fn fleet_cells() -> usize {
    let mut total = 0;
    let mut i = 0;
    while i < FLEET.len() {
        total += FLEET[i].1;
        i += 1;
    }
    total
}

#[derive(Clone, Debug)]
pub struct Ship {
    name: String,
    size: usize,
    coordinates: Vec<Coord>,
    hits: BTreeSet<Coord>,
}

impl Ship {
    pub fn new(name: impl Into<String>, size: usize) -> Self {
        Ship {
            name: name.into(),
            size,
            coordinates: Vec::with_capacity(size),
            hits: BTreeSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn coordinates(&self) -> &[Coord] {
        &self.coordinates
    }

    pub fn hits(&self) -> &BTreeSet<Coord> {
        &self.hits
    }

    pub fn is_placed(&self) -> bool {
        !self.coordinates.is_empty()
    }

    pub fn is_sunk(&self) -> bool {
        self.hits.len() == self.size
    }

    /// The `size` cells starting at `(start_row, start_col)`, along columns when
    /// `horizontal`, along rows otherwise. Bounds are the caller's concern.
    pub fn place(&self, start_row: u8, start_col: u8, horizontal: bool) -> Vec<Coord> {
        (0..self.size as u8)
            .map(|i| {
                if horizontal {
                    Coord {
                        row: start_row,
                        col: start_col.wrapping_add(i),
                    }
                } else {
                    Coord {
                        row: start_row.wrapping_add(i),
                        col: start_col,
                    }
                }
            })
            .collect()
    }

    pub(crate) fn set_coordinates(&mut self, coords: Vec<Coord>) {
        debug_assert!(!self.is_placed(), "{} placed twice", self.name);
        debug_assert_eq!(coords.len(), self.size);
        self.coordinates = coords;
    }

    /// Returns false if `at` is not part of this ship or was already hit.
    fn record_hit(&mut self, at: Coord) -> bool {
        self.coordinates.contains(&at) && self.hits.insert(at)
    }
}

/// The manifest ships, not yet placed.
pub fn standard_fleet() -> Vec<Ship> {
    FLEET
        .iter()
        .map(|&(name, size)| Ship::new(name, size))
        .collect()
}

/// Placed ships plus a lookup table from cell to owning ship.
#[derive(Clone, Debug)]
pub struct Fleet {
    ships: Vec<Ship>,
    owner: [[Option<u8>; BOARD_SIZE]; BOARD_SIZE],
}

impl Fleet {
    /// Index placed ships. Fails if any two ships share a cell.
    pub fn index(ships: Vec<Ship>) -> Result<Self, GameError> {
        let mut owner = [[None; BOARD_SIZE]; BOARD_SIZE];
        for (i, ship) in ships.iter().enumerate() {
            for &at in ship.coordinates() {
                if !at.in_bounds() {
                    return Err(GameError::OutOfBounds {
                        row: at.row as usize,
                        col: at.col as usize,
                    });
                }
                let slot = &mut owner[at.row as usize][at.col as usize];
                if slot.is_some() {
                    return Err(GameError::Overlap {
                        ship: ship.name().to_string(),
                        at,
                    });
                }
                *slot = Some(i as u8);
            }
        }
        Ok(Fleet { ships, owner })
    }

    pub fn ships(&self) -> &[Ship] {
        &self.ships
    }

    pub fn total_cells(&self) -> usize {
        self.ships.iter().map(Ship::size).sum()
    }

    pub fn ship_at(&self, at: Coord) -> Option<&Ship> {
        self.owner_index(at).map(|i| &self.ships[i])
    }

    fn owner_index(&self, at: Coord) -> Option<usize> {
        if !at.in_bounds() {
            return None;
        }
        self.owner[at.row as usize][at.col as usize].map(usize::from)
    }

    /// Mark `at` as hit on its owning ship and return that ship.
    pub(crate) fn record_hit(&mut self, at: Coord) -> Result<&Ship, GameError> {
        let i = self.owner_index(at).ok_or_else(|| {
            GameError::IntegrityViolation(format!("cell {at} decrypted as occupied but no ship owns it"))
        })?;
        let ship = &mut self.ships[i];
        if !ship.record_hit(at) {
            return Err(GameError::AlreadyGuessed(at));
        }
        Ok(ship)
    }

    pub fn sunk_count(&self) -> usize {
        self.ships.iter().filter(|s| s.is_sunk()).count()
    }
}
