//! Plain-text boards. Both renderers only read the player they are given.

use hbgame::{Coord, GuessCell, Player, BOARD_SIZE};
use std::collections::BTreeSet;
use std::fmt::Write;

fn header(out: &mut String) {
    out.push_str("   ");
    let cols: Vec<String> = (0..BOARD_SIZE).map(|c| c.to_string()).collect();
    out.push_str(&cols.join(" "));
    out.push('\n');
}

/// The player's own ships: `S` ship, `X` ship cell already hit, `~` water.
pub fn render_own_board(player: &Player) -> String {
    let hit: BTreeSet<Coord> = player
        .ships()
        .iter()
        .flat_map(|s| s.hits().iter().copied())
        .collect();
    let mut out = String::new();
    let _ = writeln!(out, "\n{}'s Board:", player.name());
    header(&mut out);
    for (r, row) in player.board().rows().iter().enumerate() {
        let cells: Vec<&str> = row
            .iter()
            .enumerate()
            .map(|(c, &bit)| {
                let at = Coord {
                    row: r as u8,
                    col: c as u8,
                };
                match (bit, hit.contains(&at)) {
                    (_, true) => "X",
                    (1, false) => "S",
                    _ => "~",
                }
            })
            .collect();
        let _ = writeln!(out, "{r}  {}", cells.join(" "));
    }
    out
}

/// The player's shots at the opponent: `X` hit, `O` miss, blank unknown.
pub fn render_guess_board(player: &Player) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}'s Tracking Board (Your Guesses):", player.name());
    header(&mut out);
    for (r, row) in player.guess_board().rows().iter().enumerate() {
        let cells: Vec<&str> = row
            .iter()
            .map(|cell| match cell {
                GuessCell::Hit => "X",
                GuessCell::Miss => "O",
                GuessCell::Unknown => " ",
            })
            .collect();
        let _ = writeln!(out, "{r}  {}", cells.join(" "));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use hbgame::{query, GameConfig, ShipPlacement};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn players() -> (Player, Player, StdRng) {
        let cfg = GameConfig {
            key_bits: 512,
            ..GameConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(71);
        let layout = [ShipPlacement::new("Destroyer", 2, 0, 0, true)];
        let a = Player::with_layout("Alice", &cfg, &layout, &mut rng).unwrap();
        let b = Player::with_layout("Bob", &cfg, &layout, &mut rng).unwrap();
        (a, b, rng)
    }

    #[test]
    fn own_board_marks_ships_and_hits() {
        let (mut alice, mut bob, mut rng) = players();
        query(&mut alice, &mut bob, 0, 1, &mut rng).unwrap();
        let text = render_own_board(&bob);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "Bob's Board:");
        assert_eq!(lines[2], "   0 1 2 3 4 5 6 7 8 9");
        assert_eq!(lines[3], "0  S X ~ ~ ~ ~ ~ ~ ~ ~");
        assert_eq!(lines[4], "1  ~ ~ ~ ~ ~ ~ ~ ~ ~ ~");
        assert_eq!(lines.len(), 13);
    }

    #[test]
    fn guess_board_marks_hits_and_misses() {
        let (mut alice, mut bob, mut rng) = players();
        query(&mut alice, &mut bob, 0, 0, &mut rng).unwrap();
        query(&mut alice, &mut bob, 2, 3, &mut rng).unwrap();
        let text = render_guess_board(&alice);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "Alice's Tracking Board (Your Guesses):");
        assert_eq!(lines[3], "0  X                  ");
        assert_eq!(lines[5], "2        O            ");
    }
}
