//! Terminal collaborators for the `battleship` binary: board rendering and
//! guess sources. None of this touches keys or ciphertexts.

pub mod input;
pub mod render;

pub use input::{parse_guess, GuessError, GuessSource, LineGuesses, RandomGuesses};
pub use render::{render_guess_board, render_own_board};
