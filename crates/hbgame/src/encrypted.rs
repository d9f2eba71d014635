//! Per-cell ciphertexts of a player's occupancy bits.

use crate::board::{Board, Coord};
use crate::error::GameError;
use hbcrypto::{add, enc, Ciphertext, KeyId, PaillierPublicKey};
use rand::Rng;
use rug::Integer;
use std::collections::BTreeMap;
use tracing::debug;

/// `Enc_pk(board[r][c])` for every cell, keyed by coordinate. Built once after
/// placement; stored ciphertexts are never modified afterwards.
#[derive(Clone, Debug)]
pub struct EncryptedBoard {
    key_id: KeyId,
    cells: BTreeMap<Coord, Ciphertext>,
}

impl EncryptedBoard {
    pub fn encrypt<R: Rng>(board: &Board, pk: &PaillierPublicKey, rng: &mut R) -> Result<Self, GameError> {
        let mut cells = BTreeMap::new();
        for at in Coord::all() {
            let bit = Integer::from(board.get(at));
            cells.insert(at, enc(pk, &bit, rng)?);
        }
        debug!(key_id = %pk.key_id(), cells = cells.len(), "encrypted board");
        Ok(EncryptedBoard {
            key_id: pk.key_id(),
            cells,
        })
    }

    pub fn get(&self, at: Coord) -> Option<&Ciphertext> {
        self.cells.get(&at)
    }

    pub fn key_id(&self) -> KeyId {
        self.key_id
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Coord, &Ciphertext)> {
        self.cells.iter()
    }

    /// Homomorphic sum of all cells: an encryption of the occupied-cell count.
    pub fn occupied_total(&self, pk: &PaillierPublicKey) -> Result<Ciphertext, GameError> {
        let mut cells = self.cells.values();
        let first = cells
            .next()
            .ok_or_else(|| GameError::IntegrityViolation("encrypted board has no cells".into()))?;
        let mut acc = first.clone();
        for ct in cells {
            acc = add(pk, &acc, ct)?;
        }
        Ok(acc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::place_fleet_random;
    use crate::ship::TOTAL_SHIP_CELLS;
    use hbcrypto::{dec, keygen};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn every_cell_decrypts_to_its_bit() {
        let mut rng = StdRng::seed_from_u64(31);
        let (pk, sk) = keygen(512, &mut rng).unwrap();
        let (board, _fleet) = place_fleet_random(&mut rng, 10_000).unwrap();
        let enc_board = EncryptedBoard::encrypt(&board, &pk, &mut rng).unwrap();

        assert_eq!(enc_board.len(), 100);
        assert_eq!(enc_board.key_id(), pk.key_id());
        for (&at, ct) in enc_board.iter() {
            assert_eq!(dec(&sk, ct).unwrap(), board.get(at), "cell {at}");
        }
    }

    #[test]
    fn total_decrypts_to_fleet_size() {
        let mut rng = StdRng::seed_from_u64(32);
        let (pk, sk) = keygen(512, &mut rng).unwrap();
        let (board, _fleet) = place_fleet_random(&mut rng, 10_000).unwrap();
        let enc_board = EncryptedBoard::encrypt(&board, &pk, &mut rng).unwrap();
        let total = enc_board.occupied_total(&pk).unwrap();
        assert_eq!(dec(&sk, &total).unwrap(), TOTAL_SHIP_CELLS as u32);
    }
}
