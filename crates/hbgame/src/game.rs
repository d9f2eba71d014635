//! Turn controller. Owns both players and alternates attacker and defender;
//! every interaction between them goes through [`query`].

use crate::board::Coord;
use crate::config::GameConfig;
use crate::error::GameError;
use crate::player::Player;
use hbcrypto::hash_key;
use hbproto::{decode_frame, encode_frame, Msg, ProbeReq, ProbeResp, ShotOutcome, PAD_TO_KEY, PAD_TO_PROBE};
use rand::rngs::StdRng;
use rand::Rng;
use tracing::{error, info, warn};

/// Ask `defender` whether `(row, col)` is occupied on behalf of `attacker`.
///
/// Out-of-range and repeated guesses are rejected before the defender is
/// contacted. Only encoded frames pass between the two players.
pub fn query<R: Rng>(
    attacker: &mut Player,
    defender: &mut Player,
    row: usize,
    col: usize,
    rng: &mut R,
) -> Result<ShotOutcome, GameError> {
    let at = Coord::checked(row, col)?;
    attacker.guess_board().ensure_unknown(at)?;

    let turn = attacker.guess_board().made();
    let req = encode_frame(
        &Msg::ProbeReq(ProbeReq {
            turn,
            row: at.row,
            col: at.col,
        }),
        PAD_TO_PROBE,
    )?;
    let resp_frame = defender.answer_frame(&req, rng)?;
    let resp = decode_frame(&resp_frame)?.into_probe_resp()?;
    check_response(turn, &resp)?;
    attacker.record_guess(at, &resp.outcome)?;
    Ok(resp.outcome)
}

/// Attacker-side sanity check of a defender's answer.
fn check_response(turn: u32, resp: &ProbeResp) -> Result<(), GameError> {
    if resp.turn != turn {
        return Err(GameError::IntegrityViolation(format!(
            "response for turn {} while waiting on turn {turn}",
            resp.turn
        )));
    }
    if (resp.blinded_value() != 0) != resp.outcome.is_hit() {
        return Err(GameError::IntegrityViolation(
            "outcome disagrees with the blinded value".into(),
        ));
    }
    Ok(())
}

pub fn has_lost(player: &Player) -> bool {
    player.has_lost()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameState {
    InProgress,
    Won { winner: usize },
    Aborted,
}

/// What happened on one completed turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnReport {
    pub turn: u32,
    pub attacker: String,
    pub defender: String,
    pub at: Coord,
    pub outcome: ShotOutcome,
    pub defender_lost: bool,
}

pub struct Game {
    players: [Player; 2],
    attacker: usize,
    turns: u32,
    state: GameState,
    rng: StdRng,
}

impl Game {
    /// Set up both players from `config` and exchange public keys.
    pub fn new(config: &GameConfig) -> Result<Self, GameError> {
        config.validate()?;
        let mut rng = config.rng();
        let first = Player::setup(config.players[0].clone(), config, &mut rng)?;
        let second = Player::setup(config.players[1].clone(), config, &mut rng)?;
        Self::from_players([first, second], rng)
    }

    /// Start a game from already set-up players; `players[0]` attacks first.
    pub fn from_players(players: [Player; 2], rng: StdRng) -> Result<Self, GameError> {
        for p in &players {
            let frame = encode_frame(&Msg::KeyAnnounce(p.announce()), PAD_TO_KEY)?;
            let ka = decode_frame(&frame)?.into_key_announce()?;
            ka.check_version()?;
            if ka.pk.key_id() != p.key_id() {
                return Err(GameError::IntegrityViolation(format!(
                    "{} announced a key it does not hold",
                    ka.player
                )));
            }
            info!(player = %ka.player, pk_hash = %hash_key(&ka.pk), "public key announced");
        }
        Ok(Game {
            players,
            attacker: 0,
            turns: 0,
            state: GameState::InProgress,
            rng,
        })
    }

    pub fn attacker(&self) -> &Player {
        &self.players[self.attacker]
    }

    pub fn defender(&self) -> &Player {
        &self.players[1 - self.attacker]
    }

    pub fn players(&self) -> &[Player; 2] {
        &self.players
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_over(&self) -> bool {
        self.state != GameState::InProgress
    }

    pub fn winner(&self) -> Option<&Player> {
        match self.state {
            GameState::Won { winner } => Some(&self.players[winner]),
            _ => None,
        }
    }

    /// Completed turns so far.
    pub fn turns_taken(&self) -> u32 {
        self.turns
    }

    /// The current attacker fires at `(row, col)`.
    ///
    /// Recoverable errors leave the turn with the same attacker. Fatal errors
    /// abort the game.
    pub fn take_turn(&mut self, row: usize, col: usize) -> Result<TurnReport, GameError> {
        if self.is_over() {
            return Err(GameError::GameOver);
        }
        let [a, b] = &mut self.players;
        let (attacker, defender) = if self.attacker == 0 { (a, b) } else { (b, a) };

        let outcome = match query(attacker, defender, row, col, &mut self.rng) {
            Ok(outcome) => outcome,
            Err(e) if e.is_fatal() => {
                error!(error = %e, "aborting game");
                self.state = GameState::Aborted;
                return Err(e);
            }
            Err(e) => {
                warn!(error = %e, "guess rejected");
                return Err(e);
            }
        };

        self.turns += 1;
        let report = TurnReport {
            turn: self.turns,
            attacker: attacker.name().to_string(),
            defender: defender.name().to_string(),
            at: Coord {
                row: row as u8,
                col: col as u8,
            },
            outcome,
            defender_lost: defender.has_lost(),
        };
        if report.defender_lost {
            info!(winner = %report.attacker, turns = self.turns, "game over");
            self.state = GameState::Won {
                winner: self.attacker,
            };
        } else {
            self.attacker = 1 - self.attacker;
        }
        Ok(report)
    }
}
