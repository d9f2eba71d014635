//! hbgame: two-player Battleship over Paillier-encrypted boards.
//!
//! Each player encrypts its occupancy grid under its own key. A guess is
//! answered by the defender with a blinded zero-test (see [`hitcheck`]), so
//! the attacker learns hit / miss / sunk and nothing else, and no private key
//! ever serves the other side.

pub mod board;
pub mod config;
pub mod encrypted;
pub mod error;
pub mod game;
pub mod hitcheck;
pub mod keys;
pub mod placement;
pub mod player;
pub mod ship;

pub use board::{Board, Coord, GuessBoard, GuessCell, BOARD_SIZE};
pub use config::{BlindingRange, GameConfig};
pub use encrypted::EncryptedBoard;
pub use error::GameError;
pub use game::{has_lost, query, Game, GameState, TurnReport};
pub use hbproto::ShotOutcome;
pub use keys::{generate_keys, PlayerKeys};
pub use placement::{place_fleet_fixed, place_fleet_random, place_ship_random, ShipPlacement};
pub use player::Player;
pub use ship::{Fleet, Ship, FLEET, TOTAL_SHIP_CELLS};
