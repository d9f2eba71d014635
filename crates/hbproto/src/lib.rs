//! Messages that cross the boundary between two players during a game, and
//! the frame codec used to carry them.
//!
//! Only public keys, cell coordinates, the shot outcome and one blinded
//! plaintext per query are ever encoded here. Private keys and blinding
//! factors have no wire representation.

use hbcrypto::{int_from_be, int_to_be, PaillierPublicKey};
use rug::Integer;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const PROTO_VER: u32 = 1;

/// On-wire padding targets (bytes). Frames are padded to a multiple of these
/// so hit and miss responses have the same length.
pub const PAD_TO_KEY: usize = 1024;
pub const PAD_TO_PROBE: usize = 1024;

const LEN_PREFIX: usize = 4;

#[derive(Debug, thiserror::Error)]
pub enum ProtoError {
    #[error("bincode: {0}")]
    Codec(#[from] bincode::Error),
    #[error("frame too short: need {need} bytes, have {have}")]
    ShortFrame { need: usize, have: usize },
    #[error("protocol version mismatch: ours {ours}, peer {theirs}")]
    VersionMismatch { ours: u32, theirs: u32 },
    #[error("unexpected message: wanted {wanted}, got {got}")]
    Unexpected { wanted: &'static str, got: &'static str },
}

/// What the attacker learns about one cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShotOutcome {
    Miss,
    Hit,
    Sunk { ship: String },
}

impl ShotOutcome {
    pub fn is_hit(&self) -> bool {
        !matches!(self, ShotOutcome::Miss)
    }
}

impl fmt::Display for ShotOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShotOutcome::Miss => f.write_str("MISS"),
            ShotOutcome::Hit => f.write_str("HIT"),
            ShotOutcome::Sunk { ship } => write!(f, "SUNK({ship})"),
        }
    }
}

/// Announces a player's public key at setup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyAnnounce {
    pub proto_ver: u32,
    pub player: String,
    pub pk: PaillierPublicKey,
}

impl KeyAnnounce {
    pub fn new(player: impl Into<String>, pk: PaillierPublicKey) -> Self {
        KeyAnnounce {
            proto_ver: PROTO_VER,
            player: player.into(),
            pk,
        }
    }

    pub fn check_version(&self) -> Result<(), ProtoError> {
        if self.proto_ver != PROTO_VER {
            return Err(ProtoError::VersionMismatch {
                ours: PROTO_VER,
                theirs: self.proto_ver,
            });
        }
        Ok(())
    }
}

/// Attacker -> defender: "is this cell occupied?"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeReq {
    pub turn: u32,
    pub row: u8,
    pub col: u8,
}

/// Defender -> attacker: the classification plus the blinded plaintext k*b
/// it was derived from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeResp {
    pub turn: u32,
    pub outcome: ShotOutcome,
    #[serde(with = "serde_bytes")]
    pub blinded: Vec<u8>,
}

impl ProbeResp {
    pub fn new(turn: u32, outcome: ShotOutcome, blinded: &Integer) -> Self {
        ProbeResp {
            turn,
            outcome,
            blinded: int_to_be(blinded),
        }
    }

    pub fn blinded_value(&self) -> Integer {
        int_from_be(&self.blinded)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub enum Msg {
    KeyAnnounce(KeyAnnounce),
    ProbeReq(ProbeReq),
    ProbeResp(ProbeResp),
}

impl Msg {
    fn kind(&self) -> &'static str {
        match self {
            Msg::KeyAnnounce(_) => "KeyAnnounce",
            Msg::ProbeReq(_) => "ProbeReq",
            Msg::ProbeResp(_) => "ProbeResp",
        }
    }

    pub fn into_key_announce(self) -> Result<KeyAnnounce, ProtoError> {
        match self {
            Msg::KeyAnnounce(k) => Ok(k),
            other => Err(ProtoError::Unexpected {
                wanted: "KeyAnnounce",
                got: other.kind(),
            }),
        }
    }

    pub fn into_probe_req(self) -> Result<ProbeReq, ProtoError> {
        match self {
            Msg::ProbeReq(r) => Ok(r),
            other => Err(ProtoError::Unexpected {
                wanted: "ProbeReq",
                got: other.kind(),
            }),
        }
    }

    pub fn into_probe_resp(self) -> Result<ProbeResp, ProtoError> {
        match self {
            Msg::ProbeResp(r) => Ok(r),
            other => Err(ProtoError::Unexpected {
                wanted: "ProbeResp",
                got: other.kind(),
            }),
        }
    }
}

// ------- Framing (length-prefixed + padded) -------

fn pad_len(len: usize, pad_to: usize) -> usize {
    (pad_to - (len % pad_to)) % pad_to
}

/// Encode one message as `[u32 LE: payload_len] [payload] [zero padding]`,
/// with the whole frame a multiple of `pad_to`.
pub fn encode_frame(msg: &Msg, pad_to: usize) -> Result<Vec<u8>, ProtoError> {
    let payload = bincode::serialize(msg)?;
    let mut frame = Vec::with_capacity(LEN_PREFIX + payload.len() + pad_to);
    frame.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    frame.extend_from_slice(&payload);
    let rem = pad_len(frame.len(), pad_to.max(1));
    frame.resize(frame.len() + rem, 0u8);
    Ok(frame)
}

/// Decode a frame produced by [`encode_frame`]; trailing padding is ignored.
pub fn decode_frame(frame: &[u8]) -> Result<Msg, ProtoError> {
    if frame.len() < LEN_PREFIX {
        return Err(ProtoError::ShortFrame {
            need: LEN_PREFIX,
            have: frame.len(),
        });
    }
    let mut len_le = [0u8; LEN_PREFIX];
    len_le.copy_from_slice(&frame[..LEN_PREFIX]);
    let n = u32::from_le_bytes(len_le) as usize;
    let end = LEN_PREFIX + n;
    if frame.len() < end {
        return Err(ProtoError::ShortFrame {
            need: end,
            have: frame.len(),
        });
    }
    Ok(bincode::deserialize::<Msg>(&frame[LEN_PREFIX..end])?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn probe_frames_pad_to_constant_bucket() {
        let miss = Msg::ProbeResp(ProbeResp::new(3, ShotOutcome::Miss, &Integer::from(0)));
        let sunk = Msg::ProbeResp(ProbeResp::new(
            3,
            ShotOutcome::Sunk {
                ship: "Battleship".into(),
            },
            &Integer::from(999_999),
        ));
        let a = encode_frame(&miss, PAD_TO_PROBE).unwrap();
        let b = encode_frame(&sunk, PAD_TO_PROBE).unwrap();
        assert_eq!(a.len(), PAD_TO_PROBE);
        assert_eq!(a.len(), b.len());
    }

    #[test]
    fn padded_frame_decodes_to_original() {
        let req = ProbeReq {
            turn: 7,
            row: 4,
            col: 9,
        };
        let frame = encode_frame(&Msg::ProbeReq(req), PAD_TO_PROBE).unwrap();
        let back = decode_frame(&frame).unwrap().into_probe_req().unwrap();
        assert_eq!(back, req);
    }

    #[test]
    fn blinded_value_survives_the_wire() {
        let v = Integer::from(424_242);
        let frame = encode_frame(
            &Msg::ProbeResp(ProbeResp::new(1, ShotOutcome::Hit, &v)),
            PAD_TO_PROBE,
        )
        .unwrap();
        let resp = decode_frame(&frame).unwrap().into_probe_resp().unwrap();
        assert_eq!(resp.blinded_value(), v);
        assert_eq!(resp.outcome, ShotOutcome::Hit);
    }

    #[test]
    fn truncated_frame_is_rejected() {
        let frame = encode_frame(
            &Msg::ProbeReq(ProbeReq {
                turn: 0,
                row: 0,
                col: 0,
            }),
            PAD_TO_PROBE,
        )
        .unwrap();
        assert!(matches!(
            decode_frame(&frame[..2]),
            Err(ProtoError::ShortFrame { need: 4, have: 2 })
        ));
        assert!(matches!(
            decode_frame(&frame[..5]),
            Err(ProtoError::ShortFrame { .. })
        ));
    }

    #[test]
    fn wrong_message_kind_is_reported() {
        let frame = encode_frame(
            &Msg::ProbeReq(ProbeReq {
                turn: 0,
                row: 1,
                col: 1,
            }),
            PAD_TO_PROBE,
        )
        .unwrap();
        let err = decode_frame(&frame).unwrap().into_probe_resp().unwrap_err();
        assert!(matches!(
            err,
            ProtoError::Unexpected {
                wanted: "ProbeResp",
                got: "ProbeReq"
            }
        ));
    }

    #[test]
    fn key_announce_checks_version() {
        let mut rng = StdRng::seed_from_u64(11);
        let (pk, _sk) = hbcrypto::keygen(512, &mut rng).unwrap();
        let mut ka = KeyAnnounce::new("Alice", pk.clone());
        let frame = encode_frame(&Msg::KeyAnnounce(ka.clone()), PAD_TO_KEY).unwrap();
        let back = decode_frame(&frame).unwrap().into_key_announce().unwrap();
        assert!(back.check_version().is_ok());
        assert_eq!(back.pk, pk);

        ka.proto_ver = PROTO_VER + 1;
        assert!(matches!(
            ka.check_version(),
            Err(ProtoError::VersionMismatch { .. })
        ));
    }

    #[test]
    fn outcome_display() {
        assert_eq!(ShotOutcome::Miss.to_string(), "MISS");
        assert_eq!(
            ShotOutcome::Sunk {
                ship: "Destroyer".into()
            }
            .to_string(),
            "SUNK(Destroyer)"
        );
        assert!(ShotOutcome::Hit.is_hit());
        assert!(!ShotOutcome::Miss.is_hit());
    }
}
