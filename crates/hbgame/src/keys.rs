use crate::config::GameConfig;
use crate::error::GameError;
use hbcrypto::{keygen, KeyId, PaillierPrivateKey, PaillierPublicKey};
use rand::Rng;
use tracing::info;

/// One player's Paillier keypair. The private half is only reachable from
/// inside this crate, where the owning player decrypts its own probes.
#[derive(Debug)]
pub struct PlayerKeys {
    pk: PaillierPublicKey,
    sk: PaillierPrivateKey,
}

impl PlayerKeys {
    pub fn public(&self) -> &PaillierPublicKey {
        &self.pk
    }

    pub(crate) fn private(&self) -> &PaillierPrivateKey {
        &self.sk
    }

    pub fn key_id(&self) -> KeyId {
        self.pk.key_id()
    }
}

/// Fresh keypair for one player, checked against the configured blinding range.
pub fn generate_keys<R: Rng>(config: &GameConfig, rng: &mut R) -> Result<PlayerKeys, GameError> {
    let (pk, sk) = keygen(config.key_bits, rng)?;
    config.blinding.check_fits(&pk)?;
    info!(key_id = %pk.key_id(), bits = pk.bits(), "generated Paillier keypair");
    Ok(PlayerKeys { pk, sk })
}
