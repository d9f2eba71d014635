//! Game parameters. Loaded from JSON (every field optional) and then
//! overridden from the command line.

use crate::error::GameError;
use hbcrypto::{PaillierPublicKey, MIN_KEY_BITS};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rug::Integer;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_KEY_BITS: u32 = 2048;
pub const DEFAULT_MAX_PLACEMENT_ATTEMPTS: u32 = 10_000;

/// Inclusive range the per-query blinding factor is drawn from. Never contains 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlindingRange {
    pub min: u64,
    pub max: u64,
}

impl Default for BlindingRange {
    fn default() -> Self {
        BlindingRange {
            min: 1,
            max: 999_999,
        }
    }
}

impl BlindingRange {
    pub fn validate(&self) -> Result<(), GameError> {
        if self.min == 0 {
            return Err(GameError::InvalidConfig(
                "blinding range must exclude zero".into(),
            ));
        }
        if self.min > self.max {
            return Err(GameError::InvalidConfig(format!(
                "blinding range [{}, {}] is empty",
                self.min, self.max
            )));
        }
        Ok(())
    }

    /// k * 1 must stay below n, or a hit could wrap around to a zero plaintext.
    pub fn check_fits(&self, pk: &PaillierPublicKey) -> Result<(), GameError> {
        if Integer::from(self.max) >= pk.n() {
            return Err(GameError::BlindingOutOfRange(format!(
                "max {} does not fit a {}-bit modulus",
                self.max,
                pk.bits()
            )));
        }
        Ok(())
    }

    pub fn sample<R: Rng>(&self, rng: &mut R) -> u64 {
        rng.gen_range(self.min..=self.max)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub key_bits: u32,
    pub blinding: BlindingRange,
    pub max_placement_attempts: u32,
    /// Fixed seed for reproducible games; fresh OS entropy when absent.
    pub seed: Option<u64>,
    pub players: [String; 2],
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            key_bits: DEFAULT_KEY_BITS,
            blinding: BlindingRange::default(),
            max_placement_attempts: DEFAULT_MAX_PLACEMENT_ATTEMPTS,
            seed: None,
            players: ["Alice".to_string(), "Bob".to_string()],
        }
    }
}

impl GameConfig {
    /// Read a config file. Not validated here: callers apply their overrides
    /// first and then call [`GameConfig::validate`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GameError> {
        Ok(hbcrypto::load_json(path)?)
    }

    pub fn validate(&self) -> Result<(), GameError> {
        if self.key_bits < MIN_KEY_BITS {
            return Err(GameError::InvalidConfig(format!(
                "key_bits {} is below the minimum of {}",
                self.key_bits, MIN_KEY_BITS
            )));
        }
        if self.max_placement_attempts == 0 {
            return Err(GameError::InvalidConfig(
                "max_placement_attempts must be positive".into(),
            ));
        }
        if self.players[0] == self.players[1] {
            return Err(GameError::InvalidConfig(
                "players need distinct names".into(),
            ));
        }
        self.blinding.validate()
    }

    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = GameConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.blinding, BlindingRange { min: 1, max: 999_999 });
        assert_eq!(cfg.players, ["Alice".to_string(), "Bob".to_string()]);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: GameConfig = serde_json::from_str(r#"{ "key_bits": 512, "seed": 7 }"#).unwrap();
        assert_eq!(cfg.key_bits, 512);
        assert_eq!(cfg.seed, Some(7));
        assert_eq!(cfg.max_placement_attempts, DEFAULT_MAX_PLACEMENT_ATTEMPTS);
        cfg.validate().unwrap();
    }

    #[test]
    fn loaded_file_can_be_repaired_before_validation() {
        let dir = std::env::temp_dir().join(format!("hbgame-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("game.json");
        std::fs::write(&path, r#"{ "key_bits": 128 }"#).unwrap();

        let mut cfg = GameConfig::load(&path).unwrap();
        assert_eq!(cfg.key_bits, 128);
        assert!(matches!(cfg.validate(), Err(GameError::InvalidConfig(_))));
        cfg.key_bits = 512;
        cfg.validate().unwrap();
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn rejects_bad_parameters() {
        let mut cfg = GameConfig {
            key_bits: 64,
            ..GameConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(GameError::InvalidConfig(_))));

        cfg.key_bits = 512;
        cfg.blinding = BlindingRange { min: 0, max: 10 };
        assert!(matches!(cfg.validate(), Err(GameError::InvalidConfig(_))));

        cfg.blinding = BlindingRange { min: 10, max: 9 };
        assert!(matches!(cfg.validate(), Err(GameError::InvalidConfig(_))));

        cfg.blinding = BlindingRange::default();
        cfg.max_placement_attempts = 0;
        assert!(matches!(cfg.validate(), Err(GameError::InvalidConfig(_))));
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        let cfg = GameConfig {
            seed: Some(99),
            ..GameConfig::default()
        };
        let a: u64 = cfg.rng().gen();
        let b: u64 = cfg.rng().gen();
        assert_eq!(a, b);
    }

    #[test]
    fn blinding_samples_stay_in_range() {
        let range = BlindingRange { min: 5, max: 9 };
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..200 {
            let k = range.sample(&mut rng);
            assert!((5..=9).contains(&k));
        }
    }

    #[test]
    fn blinding_must_fit_below_modulus() {
        let mut rng = StdRng::seed_from_u64(2);
        let (pk, _sk) = hbcrypto::keygen(512, &mut rng).unwrap();
        BlindingRange::default().check_fits(&pk).unwrap();
        BlindingRange { min: 1, max: u64::MAX }.check_fits(&pk).unwrap();

        // toy modulus n = 1003 cannot hold a factor up to 999_999
        let toy = PaillierPublicKey {
            n: hbcrypto::int_to_be(&Integer::from(1003)),
            n2: hbcrypto::int_to_be(&Integer::from(1003 * 1003)),
        };
        assert!(matches!(
            BlindingRange::default().check_fits(&toy),
            Err(GameError::BlindingOutOfRange(_))
        ));
        BlindingRange { min: 1, max: 1002 }.check_fits(&toy).unwrap();
    }
}
