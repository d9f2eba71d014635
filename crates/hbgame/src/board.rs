//! Plaintext occupancy grid and the per-player guess grid.

use crate::error::GameError;
use hbproto::ShotOutcome;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const BOARD_SIZE: usize = 10;

/// A cell address, always inside the board once constructed via [`Coord::checked`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub row: u8,
    pub col: u8,
}

impl Coord {
    pub fn checked(row: usize, col: usize) -> Result<Self, GameError> {
        if row >= BOARD_SIZE || col >= BOARD_SIZE {
            return Err(GameError::OutOfBounds { row, col });
        }
        Ok(Coord {
            row: row as u8,
            col: col as u8,
        })
    }

    pub fn in_bounds(&self) -> bool {
        (self.row as usize) < BOARD_SIZE && (self.col as usize) < BOARD_SIZE
    }

    /// Every cell of the board in row-major order.
    pub fn all() -> impl Iterator<Item = Coord> {
        (0..BOARD_SIZE as u8).flat_map(|row| (0..BOARD_SIZE as u8).map(move |col| Coord { row, col }))
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// 0 = water, 1 = occupied. Owned by one player and never shown to the other.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Board {
    cells: [[u8; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, at: Coord) -> u8 {
        self.cells[at.row as usize][at.col as usize]
    }

    pub fn is_occupied(&self, at: Coord) -> bool {
        self.get(at) == 1
    }

    pub(crate) fn occupy(&mut self, at: Coord) {
        self.cells[at.row as usize][at.col as usize] = 1;
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().flatten().filter(|&&b| b == 1).count()
    }

    pub fn rows(&self) -> &[[u8; BOARD_SIZE]; BOARD_SIZE] {
        &self.cells
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GuessCell {
    #[default]
    Unknown,
    Hit,
    Miss,
}

/// A player's record of their own shots at the opponent. Each cell is set once.
#[derive(Clone, Debug, Default)]
pub struct GuessBoard {
    cells: [[GuessCell; BOARD_SIZE]; BOARD_SIZE],
    made: u32,
}

impl GuessBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, at: Coord) -> GuessCell {
        self.cells[at.row as usize][at.col as usize]
    }

    pub fn ensure_unknown(&self, at: Coord) -> Result<(), GameError> {
        match self.get(at) {
            GuessCell::Unknown => Ok(()),
            _ => Err(GameError::AlreadyGuessed(at)),
        }
    }

    pub(crate) fn record(&mut self, at: Coord, outcome: &ShotOutcome) -> Result<(), GameError> {
        self.ensure_unknown(at)?;
        self.cells[at.row as usize][at.col as usize] = if outcome.is_hit() {
            GuessCell::Hit
        } else {
            GuessCell::Miss
        };
        self.made += 1;
        Ok(())
    }

    /// Number of guesses recorded so far.
    pub fn made(&self) -> u32 {
        self.made
    }

    pub fn unknown_cells(&self) -> impl Iterator<Item = Coord> + '_ {
        Coord::all().filter(move |&at| self.get(at) == GuessCell::Unknown)
    }

    pub fn rows(&self) -> &[[GuessCell; BOARD_SIZE]; BOARD_SIZE] {
        &self.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checked_coord_rejects_off_board() {
        assert!(Coord::checked(9, 9).is_ok());
        assert!(matches!(
            Coord::checked(10, 0),
            Err(GameError::OutOfBounds { row: 10, col: 0 })
        ));
        assert!(matches!(
            Coord::checked(0, 42),
            Err(GameError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn all_visits_every_cell_once() {
        let cells: Vec<_> = Coord::all().collect();
        assert_eq!(cells.len(), BOARD_SIZE * BOARD_SIZE);
        assert_eq!(cells[0], Coord { row: 0, col: 0 });
        assert_eq!(cells[11], Coord { row: 1, col: 1 });
        assert!(cells.iter().all(Coord::in_bounds));
    }

    #[test]
    fn guess_cells_are_set_once() {
        let mut g = GuessBoard::new();
        let at = Coord::checked(3, 4).unwrap();
        g.record(at, &ShotOutcome::Hit).unwrap();
        assert_eq!(g.get(at), GuessCell::Hit);
        assert!(matches!(
            g.record(at, &ShotOutcome::Miss),
            Err(GameError::AlreadyGuessed(c)) if c == at
        ));
        assert_eq!(g.get(at), GuessCell::Hit);
        assert_eq!(g.made(), 1);
        assert_eq!(g.unknown_cells().count(), BOARD_SIZE * BOARD_SIZE - 1);
    }

    #[test]
    fn sunk_records_as_hit() {
        let mut g = GuessBoard::new();
        let at = Coord::checked(0, 0).unwrap();
        g.record(
            at,
            &ShotOutcome::Sunk {
                ship: "Destroyer".into(),
            },
        )
        .unwrap();
        assert_eq!(g.get(at), GuessCell::Hit);
    }
}
