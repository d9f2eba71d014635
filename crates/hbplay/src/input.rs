//! Where guesses come from: a terminal, or a seeded random player.

use hbgame::{Player, BOARD_SIZE};
use rand::rngs::StdRng;
use rand::seq::IteratorRandom;
use rand::SeedableRng;
use std::io::{BufRead, Write};

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum GuessError {
    #[error("Please enter two numbers separated by a space.")]
    WrongArity,
    #[error("Invalid input. Please enter two numbers.")]
    NotANumber,
    #[error("Coordinates must be between 0 and 9.")]
    OutOfRange,
}

/// Parse `"row col"`.
pub fn parse_guess(line: &str) -> Result<(usize, usize), GuessError> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() != 2 {
        return Err(GuessError::WrongArity);
    }
    let row: i64 = parts[0].parse().map_err(|_| GuessError::NotANumber)?;
    let col: i64 = parts[1].parse().map_err(|_| GuessError::NotANumber)?;
    let range = 0..BOARD_SIZE as i64;
    if !range.contains(&row) || !range.contains(&col) {
        return Err(GuessError::OutOfRange);
    }
    Ok((row as usize, col as usize))
}

pub trait GuessSource {
    /// Next guess for `player`, or `None` once the source is exhausted.
    fn next_guess(&mut self, player: &Player) -> anyhow::Result<Option<(usize, usize)>>;

    /// Wait between turns. `Ok(false)` means the session should end.
    fn pause(&mut self) -> anyhow::Result<bool> {
        Ok(true)
    }

    /// Report a rejected guess back to whoever made it.
    fn rejected(&mut self, _reason: &str) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Interactive guesses, re-prompting until a well-formed line arrives.
pub struct LineGuesses<I, O> {
    input: I,
    output: O,
}

impl<I: BufRead, O: Write> LineGuesses<I, O> {
    pub fn new(input: I, output: O) -> Self {
        LineGuesses { input, output }
    }

    fn read_line(&mut self) -> anyhow::Result<Option<String>> {
        let mut buf = Vec::new();
        if self.input.read_until(b'\n', &mut buf)? == 0 {
            return Ok(None);
        }
        // undecodable bytes fall through to parse_guess and get re-prompted
        Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
    }
}

impl<I: BufRead, O: Write> GuessSource for LineGuesses<I, O> {
    fn next_guess(&mut self, player: &Player) -> anyhow::Result<Option<(usize, usize)>> {
        writeln!(self.output, "\n{}, make your guess!", player.name())?;
        loop {
            write!(self.output, "Enter your guess (row col, e.g., '3 4'): ")?;
            self.output.flush()?;
            let Some(line) = self.read_line()? else {
                return Ok(None);
            };
            match parse_guess(line.trim()) {
                Ok(guess) => return Ok(Some(guess)),
                Err(e) => writeln!(self.output, "{e}")?,
            }
        }
    }

    fn pause(&mut self) -> anyhow::Result<bool> {
        write!(self.output, "\nPress Enter to continue to next turn...")?;
        self.output.flush()?;
        Ok(self.read_line()?.is_some())
    }

    fn rejected(&mut self, reason: &str) -> anyhow::Result<()> {
        writeln!(self.output, "{reason} Try again.")?;
        Ok(())
    }
}

/// Picks uniformly among the cells the player has not guessed yet.
pub struct RandomGuesses {
    rng: StdRng,
}

impl RandomGuesses {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        RandomGuesses { rng }
    }
}

impl GuessSource for RandomGuesses {
    fn next_guess(&mut self, player: &Player) -> anyhow::Result<Option<(usize, usize)>> {
        Ok(player
            .guess_board()
            .unknown_cells()
            .choose(&mut self.rng)
            .map(|at| (at.row as usize, at.col as usize)))
    }
}
