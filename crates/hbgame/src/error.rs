use crate::board::Coord;
use hbcrypto::CryptoError;
use hbproto::ProtoError;

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("cell ({row}, {col}) is off the 10x10 board")]
    OutOfBounds { row: usize, col: usize },
    #[error("cell {0} was already guessed")]
    AlreadyGuessed(Coord),
    #[error("{ship} overlaps another ship at {at}")]
    Overlap { ship: String, at: Coord },
    #[error("could not place {ship} after {attempts} attempts")]
    PlacementExhausted { ship: String, attempts: u32 },
    #[error("blinding factor outside the message space: {0}")]
    BlindingOutOfRange(String),
    #[error("protocol integrity violation: {0}")]
    IntegrityViolation(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("the game is over")]
    GameOver,
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    #[error(transparent)]
    Proto(#[from] ProtoError),
}

impl GameError {
    /// Input errors leave the game untouched and the turn unconsumed; every
    /// other error means the game cannot continue.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            GameError::OutOfBounds { .. } | GameError::AlreadyGuessed(_) | GameError::GameOver
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_errors_are_recoverable() {
        assert!(!GameError::OutOfBounds { row: 11, col: 0 }.is_fatal());
        assert!(!GameError::AlreadyGuessed(Coord { row: 1, col: 1 }).is_fatal());
        assert!(GameError::IntegrityViolation("x".into()).is_fatal());
        assert!(GameError::PlacementExhausted {
            ship: "Carrier".into(),
            attempts: 3
        }
        .is_fatal());
        assert!(GameError::Crypto(CryptoError::MalformedCiphertext).is_fatal());
    }
}
