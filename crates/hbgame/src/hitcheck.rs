//! Blinded zero-test on one encrypted cell.
//!
//! The defender raises the stored ciphertext `Enc(b)` to a fresh random power
//! `k`, giving `Enc(k*b)`, and decrypts that with its own key. Because `k` is
//! never zero and `k < n`, the plaintext `v = k*b` is zero exactly when the
//! cell is water. Only that zero/nonzero split carries meaning. On a miss
//! `v` is zero and `k` stays with the defender; on a hit `v` equals `k` and is
//! the one value that leaves the defender.

use crate::board::Coord;
use crate::config::BlindingRange;
use crate::encrypted::EncryptedBoard;
use crate::error::GameError;
use crate::keys::PlayerKeys;
use hbcrypto::{dec, mul_plain, Ciphertext};
use rand::Rng;
use rug::Integer;

/// Defender-side result of one evaluation. `blinded` is the only value that
/// may leave the defender.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlindedProbe {
    pub blinded: Integer,
    pub hit: bool,
}

/// Run the zero-test on `cell` with the given blinding factor `k`.
pub fn blinded_zero_test(
    cell: &Ciphertext,
    keys: &PlayerKeys,
    k: &Integer,
) -> Result<BlindedProbe, GameError> {
    let pk = keys.public();
    if *k <= 0 || k >= &pk.n() {
        return Err(GameError::BlindingOutOfRange(format!(
            "factor not in (0, n) for a {}-bit modulus",
            pk.bits()
        )));
    }
    let c1 = mul_plain(pk, cell, k)?;
    let v = dec(keys.private(), &c1)?;
    let hit = if v == 0 {
        false
    } else if &v == k {
        true
    } else {
        // the cell did not hold a 0/1 bit under this key
        return Err(GameError::IntegrityViolation(
            "blinded plaintext is neither 0 nor the blinding factor".into(),
        ));
    };
    Ok(BlindedProbe { blinded: v, hit })
}

/// Draw a fresh blinding factor and zero-test the cell at `at`.
pub fn probe_cell<R: Rng>(
    board: &EncryptedBoard,
    at: Coord,
    keys: &PlayerKeys,
    blinding: &BlindingRange,
    rng: &mut R,
) -> Result<BlindedProbe, GameError> {
    let cell = board.get(at).ok_or(GameError::OutOfBounds {
        row: at.row as usize,
        col: at.col as usize,
    })?;
    let k = Integer::from(blinding.sample(rng));
    blinded_zero_test(cell, keys, &k)
}
