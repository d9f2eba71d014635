//! Random and fixed fleet placement on the plaintext board.

use crate::board::{Board, Coord, BOARD_SIZE};
use crate::error::GameError;
use crate::ship::{standard_fleet, Fleet, Ship};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Rejection-sample a position for `ship` that stays on the board and only
/// covers water, then mark it on `board`. Gives up after `max_attempts`.
pub fn place_ship_random<R: Rng>(
    board: &mut Board,
    ship: &mut Ship,
    rng: &mut R,
    max_attempts: u32,
) -> Result<(), GameError> {
    let size = ship.size();
    if size == 0 || size > BOARD_SIZE {
        return Err(GameError::InvalidConfig(format!(
            "{} has size {size}, must be 1..={BOARD_SIZE}",
            ship.name()
        )));
    }
    let last = (BOARD_SIZE - 1) as u8;
    let last_start = (BOARD_SIZE - size) as u8;

    for attempt in 1..=max_attempts {
        let horizontal = rng.gen_bool(0.5);
        let (row, col) = if horizontal {
            (rng.gen_range(0..=last), rng.gen_range(0..=last_start))
        } else {
            (rng.gen_range(0..=last_start), rng.gen_range(0..=last))
        };
        let coords = ship.place(row, col, horizontal);
        if coords.iter().all(|&at| !board.is_occupied(at)) {
            for &at in &coords {
                board.occupy(at);
            }
            ship.set_coordinates(coords);
            debug!(ship = ship.name(), attempt, "placed");
            return Ok(());
        }
    }
    Err(GameError::PlacementExhausted {
        ship: ship.name().to_string(),
        attempts: max_attempts,
    })
}

/// Place the standard fleet at random on a fresh board.
#[instrument(level = "debug", skip(rng))]
pub fn place_fleet_random<R: Rng>(rng: &mut R, max_attempts: u32) -> Result<(Board, Fleet), GameError> {
    let mut board = Board::new();
    let mut ships = standard_fleet();
    for ship in ships.iter_mut() {
        place_ship_random(&mut board, ship, rng, max_attempts)?;
    }
    Ok((board, Fleet::index(ships)?))
}

/// One ship at an explicit position.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipPlacement {
    pub name: String,
    pub size: usize,
    pub row: u8,
    pub col: u8,
    pub horizontal: bool,
}

impl ShipPlacement {
    pub fn new(name: impl Into<String>, size: usize, row: u8, col: u8, horizontal: bool) -> Self {
        ShipPlacement {
            name: name.into(),
            size,
            row,
            col,
            horizontal,
        }
    }
}

/// Place ships at fixed positions, rejecting anything off-board or overlapping.
pub fn place_fleet_fixed(layout: &[ShipPlacement]) -> Result<(Board, Fleet), GameError> {
    let mut board = Board::new();
    let mut ships = Vec::with_capacity(layout.len());
    for p in layout {
        let mut ship = Ship::new(p.name.clone(), p.size);
        let coords = ship.place(p.row, p.col, p.horizontal);
        for &at in &coords {
            Coord::checked(at.row as usize, at.col as usize)?;
            if board.is_occupied(at) {
                return Err(GameError::Overlap {
                    ship: p.name.clone(),
                    at,
                });
            }
            board.occupy(at);
        }
        ship.set_coordinates(coords);
        ships.push(ship);
    }
    Ok((board, Fleet::index(ships)?))
}
