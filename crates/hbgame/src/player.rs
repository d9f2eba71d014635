//! One player's private state and the defender side of a query.

use crate::board::{Board, Coord, GuessBoard};
use crate::config::{BlindingRange, GameConfig};
use crate::encrypted::EncryptedBoard;
use crate::error::GameError;
use crate::hitcheck::probe_cell;
use crate::keys::{generate_keys, PlayerKeys};
use crate::placement::{place_fleet_fixed, place_fleet_random, ShipPlacement};
use crate::ship::{Fleet, Ship};
use hbcrypto::{dec, KeyId, PaillierPublicKey};
use hbproto::{decode_frame, encode_frame, KeyAnnounce, Msg, ProbeReq, ProbeResp, ShotOutcome, PAD_TO_PROBE};
use rand::Rng;
use tracing::{debug, info};

#[derive(Debug)]
pub struct Player {
    name: String,
    board: Board,
    guesses: GuessBoard,
    fleet: Fleet,
    keys: PlayerKeys,
    encrypted: EncryptedBoard,
    blinding: BlindingRange,
    hits_received: usize,
}

impl Player {
    /// Generate keys, place the standard fleet at random and encrypt the board.
    pub fn setup<R: Rng>(name: impl Into<String>, config: &GameConfig, rng: &mut R) -> Result<Self, GameError> {
        let name = name.into();
        info!(player = %name, "setting up board");
        let keys = generate_keys(config, rng)?;
        let (board, fleet) = place_fleet_random(rng, config.max_placement_attempts)?;
        Self::assemble(name, keys, board, fleet, config.blinding, rng)
    }

    /// Like [`Player::setup`] but with ships at fixed positions.
    pub fn with_layout<R: Rng>(
        name: impl Into<String>,
        config: &GameConfig,
        layout: &[ShipPlacement],
        rng: &mut R,
    ) -> Result<Self, GameError> {
        let keys = generate_keys(config, rng)?;
        let (board, fleet) = place_fleet_fixed(layout)?;
        Self::assemble(name.into(), keys, board, fleet, config.blinding, rng)
    }

    fn assemble<R: Rng>(
        name: String,
        keys: PlayerKeys,
        board: Board,
        fleet: Fleet,
        blinding: BlindingRange,
        rng: &mut R,
    ) -> Result<Self, GameError> {
        blinding.check_fits(keys.public())?;
        let encrypted = EncryptedBoard::encrypt(&board, keys.public(), rng)?;
        let player = Player {
            name,
            board,
            guesses: GuessBoard::new(),
            fleet,
            keys,
            encrypted,
            blinding,
            hits_received: 0,
        };
        player.self_check()?;
        info!(player = %player.name, key_id = %player.key_id(), "board encrypted");
        Ok(player)
    }

    /// The encrypted board must sum to the fleet size under our own key.
    fn self_check(&self) -> Result<(), GameError> {
        let total = self.encrypted.occupied_total(self.keys.public())?;
        let count = dec(self.keys.private(), &total)?;
        if count != self.fleet.total_cells() as u64 {
            return Err(GameError::IntegrityViolation(format!(
                "{}: encrypted board does not match the placed fleet",
                self.name
            )));
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn guess_board(&self) -> &GuessBoard {
        &self.guesses
    }

    pub fn ships(&self) -> &[Ship] {
        self.fleet.ships()
    }

    pub fn encrypted_board(&self) -> &EncryptedBoard {
        &self.encrypted
    }

    pub fn public_key(&self) -> &PaillierPublicKey {
        self.keys.public()
    }

    pub fn key_id(&self) -> KeyId {
        self.keys.key_id()
    }

    pub fn hits_received(&self) -> usize {
        self.hits_received
    }

    pub fn total_ship_cells(&self) -> usize {
        self.fleet.total_cells()
    }

    pub fn has_lost(&self) -> bool {
        self.hits_received >= self.total_ship_cells()
    }

    pub fn announce(&self) -> KeyAnnounce {
        KeyAnnounce::new(self.name.clone(), self.keys.public().clone())
    }

    /// Defender side of one query, on encoded frames.
    pub fn answer_frame<R: Rng>(&mut self, frame: &[u8], rng: &mut R) -> Result<Vec<u8>, GameError> {
        let req = decode_frame(frame)?.into_probe_req()?;
        let resp = self.answer_probe(&req, rng)?;
        Ok(encode_frame(&Msg::ProbeResp(resp), PAD_TO_PROBE)?)
    }

    /// Defender side of one query: blinded zero-test, then fleet bookkeeping.
    pub fn answer_probe<R: Rng>(&mut self, req: &ProbeReq, rng: &mut R) -> Result<ProbeResp, GameError> {
        let at = Coord::checked(req.row as usize, req.col as usize)?;
        let probe = probe_cell(&self.encrypted, at, &self.keys, &self.blinding, rng)?;
        let outcome = if probe.hit {
            let ship = self.fleet.record_hit(at)?;
            let outcome = if ship.is_sunk() {
                ShotOutcome::Sunk {
                    ship: ship.name().to_string(),
                }
            } else {
                ShotOutcome::Hit
            };
            self.hits_received += 1;
            outcome
        } else {
            ShotOutcome::Miss
        };
        debug!(player = %self.name, turn = req.turn, %at, %outcome, "answered probe");
        Ok(ProbeResp::new(req.turn, outcome, &probe.blinded))
    }

    #[cfg(test)]
    pub(crate) fn swap_encrypted_board(&mut self, encrypted: EncryptedBoard) -> EncryptedBoard {
        std::mem::replace(&mut self.encrypted, encrypted)
    }

    pub(crate) fn record_guess(&mut self, at: Coord, outcome: &ShotOutcome) -> Result<(), GameError> {
        self.guesses.record(at, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ship::TOTAL_SHIP_CELLS;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn cfg() -> GameConfig {
        GameConfig {
            key_bits: 512,
            ..GameConfig::default()
        }
    }

    #[test]
    fn setup_places_and_encrypts_full_fleet() {
        let mut rng = StdRng::seed_from_u64(51);
        let p = Player::setup("Alice", &cfg(), &mut rng).unwrap();
        assert_eq!(p.total_ship_cells(), TOTAL_SHIP_CELLS);
        assert_eq!(p.board().occupied_count(), TOTAL_SHIP_CELLS);
        assert_eq!(p.encrypted_board().key_id(), p.key_id());
        assert_eq!(p.hits_received(), 0);
        assert!(!p.has_lost());
    }

    #[test]
    fn answering_every_ship_cell_loses() {
        let mut rng = StdRng::seed_from_u64(52);
        let mut p = Player::setup("Bob", &cfg(), &mut rng).unwrap();
        let cells: Vec<Coord> = p.ships().iter().flat_map(|s| s.coordinates().to_vec()).collect();
        let mut sunk = 0;
        for (turn, at) in cells.iter().enumerate() {
            assert!(!p.has_lost());
            let req = ProbeReq {
                turn: turn as u32,
                row: at.row,
                col: at.col,
            };
            let resp = p.answer_probe(&req, &mut rng).unwrap();
            assert!(resp.outcome.is_hit());
            assert_ne!(resp.blinded_value(), 0);
            if matches!(resp.outcome, ShotOutcome::Sunk { .. }) {
                sunk += 1;
            }
        }
        assert_eq!(sunk, 5);
        assert_eq!(p.hits_received(), TOTAL_SHIP_CELLS);
        assert!(p.has_lost());
    }

    #[test]
    fn frame_round_trip_answers_a_miss() {
        let mut rng = StdRng::seed_from_u64(53);
        let layout = [ShipPlacement::new("Destroyer", 2, 0, 0, true)];
        let mut p = Player::with_layout("Bob", &cfg(), &layout, &mut rng).unwrap();
        let req = encode_frame(
            &Msg::ProbeReq(ProbeReq {
                turn: 0,
                row: 5,
                col: 5,
            }),
            PAD_TO_PROBE,
        )
        .unwrap();
        let resp = decode_frame(&p.answer_frame(&req, &mut rng).unwrap())
            .unwrap()
            .into_probe_resp()
            .unwrap();
        assert_eq!(resp.outcome, ShotOutcome::Miss);
        assert_eq!(resp.blinded_value(), 0);
        assert_eq!(p.hits_received(), 0);
    }

    #[test]
    fn off_board_probe_is_rejected_without_state_change() {
        let mut rng = StdRng::seed_from_u64(54);
        let layout = [ShipPlacement::new("Destroyer", 2, 0, 0, true)];
        let mut p = Player::with_layout("Bob", &cfg(), &layout, &mut rng).unwrap();
        let err = p
            .answer_probe(
                &ProbeReq {
                    turn: 0,
                    row: 10,
                    col: 0,
                },
                &mut rng,
            )
            .unwrap_err();
        assert!(matches!(err, GameError::OutOfBounds { row: 10, col: 0 }));
        assert_eq!(p.hits_received(), 0);
    }
}
