//! hbcrypto: Paillier keys, ciphertexts and the homomorphic operations the
//! encrypted Battleship boards are built on.
//!
//! Every [`Ciphertext`] carries the [`KeyId`] of the public key that produced
//! it. Decrypting or combining a ciphertext under any other key fails with
//! [`CryptoError::KeyMismatch`] instead of yielding an unrelated plaintext.

use rand::RngCore;
use rug::integer::{IsPrime, Order};
use rug::Integer;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Smallest modulus size accepted by [`keygen`].
pub const MIN_KEY_BITS: u32 = 256;

#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("key size {bits} is below the minimum of {min} bits")]
    KeyTooSmall { bits: u32, min: u32 },
    #[error("ciphertext was produced under key {found}, expected key {expected}")]
    KeyMismatch { expected: KeyId, found: KeyId },
    #[error("ciphertext is not a unit modulo n^2")]
    MalformedCiphertext,
    #[error("plaintext is outside the message space [0, n)")]
    PlaintextOutOfRange,
    #[error("modular arithmetic failed: {0}")]
    Arithmetic(&'static str),
    #[error("key file i/o: {0}")]
    Io(#[from] std::io::Error),
    #[error("key file format: {0}")]
    Json(#[from] serde_json::Error),
}

// ---------------- Key material ----------------

/// Short fingerprint of a Paillier modulus (first 16 bytes of blake3(n)).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyId(pub [u8; 16]);

impl KeyId {
    fn of_modulus(n_be: &[u8]) -> Self {
        let digest = blake3::hash(n_be);
        let mut id = [0u8; 16];
        id.copy_from_slice(&digest.as_bytes()[..16]);
        KeyId(id)
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyId({self})")
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaillierPublicKey {
    #[serde(with = "serde_bytes")]
    pub n: Vec<u8>,
    #[serde(with = "serde_bytes")]
    pub n2: Vec<u8>,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct PaillierPrivateKey {
    #[serde(with = "serde_bytes")]
    lambda: Vec<u8>,
    #[serde(with = "serde_bytes")]
    mu: Vec<u8>,
    #[serde(with = "serde_bytes")]
    n: Vec<u8>,
    #[serde(with = "serde_bytes")]
    n2: Vec<u8>,
}

impl PaillierPublicKey {
    pub fn n(&self) -> Integer {
        int_from_be(&self.n)
    }
    pub fn n2(&self) -> Integer {
        int_from_be(&self.n2)
    }
    pub fn key_id(&self) -> KeyId {
        KeyId::of_modulus(&self.n)
    }
    /// Size of the modulus in bits.
    pub fn bits(&self) -> u32 {
        self.n().significant_bits()
    }
}

impl PaillierPrivateKey {
    pub fn n(&self) -> Integer {
        int_from_be(&self.n)
    }
    pub fn n2(&self) -> Integer {
        int_from_be(&self.n2)
    }
    fn lambda(&self) -> Integer {
        int_from_be(&self.lambda)
    }
    fn mu(&self) -> Integer {
        int_from_be(&self.mu)
    }
    pub fn key_id(&self) -> KeyId {
        KeyId::of_modulus(&self.n)
    }
    /// The public half of this keypair.
    pub fn public_key(&self) -> PaillierPublicKey {
        PaillierPublicKey {
            n: self.n.clone(),
            n2: self.n2.clone(),
        }
    }
}

// lambda and mu stay out of logs
impl fmt::Debug for PaillierPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaillierPrivateKey")
            .field("key_id", &self.key_id())
            .finish_non_exhaustive()
    }
}

/// A Paillier ciphertext tagged with the key it was produced under.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ciphertext {
    pub key_id: KeyId,
    #[serde(with = "serde_bytes")]
    pub c: Vec<u8>,
}

impl Ciphertext {
    fn new(key_id: KeyId, c: &Integer) -> Self {
        Ciphertext {
            key_id,
            c: int_to_be(c),
        }
    }
    pub fn value(&self) -> Integer {
        int_from_be(&self.c)
    }
}

#[inline]
pub fn int_from_be(bytes: &[u8]) -> Integer {
    Integer::from_digits(bytes, Order::MsfBe)
}

#[inline]
pub fn int_to_be(i: &Integer) -> Vec<u8> {
    i.to_digits::<u8>(Order::MsfBe)
}

// ---------------- Paillier core ----------------

fn gen_prime<R: RngCore + ?Sized>(bits: u32, rng: &mut R) -> Integer {
    let nbytes = (bits as usize + 7) / 8;
    let excess = 8 * nbytes - bits as usize;
    loop {
        let mut bytes = vec![0u8; nbytes];
        rng.fill_bytes(&mut bytes);
        // top two bits set so that p*q has the full modulus length; odd
        bytes[0] &= 0xFFu8 >> excess;
        bytes[0] |= 0xC0u8 >> excess;
        if let Some(b) = bytes.last_mut() {
            *b |= 1;
        }
        let mut p = Integer::from_digits(&bytes, Order::MsfBe);
        p.next_prime_mut();
        if p.significant_bits() == bits && p.is_probably_prime(25) != IsPrime::No {
            return p;
        }
    }
}

/// Generate a Paillier keypair with a modulus of `bits` bits (g = n + 1).
pub fn keygen<R: RngCore + ?Sized>(
    bits: u32,
    rng: &mut R,
) -> Result<(PaillierPublicKey, PaillierPrivateKey), CryptoError> {
    if bits < MIN_KEY_BITS {
        return Err(CryptoError::KeyTooSmall {
            bits,
            min: MIN_KEY_BITS,
        });
    }
    let half = bits / 2;
    let p = gen_prime(half, rng);
    let mut q = gen_prime(bits - half, rng);
    while q == p {
        q = gen_prime(bits - half, rng);
    }
    let n: Integer = (&p * &q).into();
    let n2: Integer = (&n * &n).into();
    let lambda = (p - 1u32).lcm(&(q - 1u32));

    let g: Integer = n.clone() + 1u32;
    let gl = g
        .pow_mod(&lambda, &n2)
        .map_err(|_| CryptoError::Arithmetic("g^lambda mod n^2"))?;
    let mu = l_fn(&gl, &n)
        .invert(&n)
        .map_err(|_| CryptoError::Arithmetic("L(g^lambda) has no inverse mod n"))?;

    let pk = PaillierPublicKey {
        n: int_to_be(&n),
        n2: int_to_be(&n2),
    };
    let sk = PaillierPrivateKey {
        lambda: int_to_be(&lambda),
        mu: int_to_be(&mu),
        n: pk.n.clone(),
        n2: pk.n2.clone(),
    };
    Ok((pk, sk))
}

// L(u) = (u - 1) / n
fn l_fn(u: &Integer, n: &Integer) -> Integer {
    Integer::from(u - 1u32) / n
}

fn random_unit<R: RngCore + ?Sized>(n: &Integer, rng: &mut R) -> Integer {
    let nbytes = (n.significant_bits() as usize + 7) / 8;
    loop {
        let mut r_bytes = vec![0u8; nbytes];
        rng.fill_bytes(&mut r_bytes);
        let mut r = int_from_be(&r_bytes);
        r %= n;
        if r != 0 && Integer::from(r.gcd_ref(n)) == 1 {
            return r;
        }
    }
}

/// Check the tag and range of `ct` before it enters any arithmetic.
fn checked_value(
    expected: KeyId,
    n: &Integer,
    n2: &Integer,
    ct: &Ciphertext,
) -> Result<Integer, CryptoError> {
    if ct.key_id != expected {
        return Err(CryptoError::KeyMismatch {
            expected,
            found: ct.key_id,
        });
    }
    let c = ct.value();
    if c == 0 || &c >= n2 || Integer::from(c.gcd_ref(n)) != 1 {
        return Err(CryptoError::MalformedCiphertext);
    }
    Ok(c)
}

/// Encrypt `m ∈ [0, n)` under `pk`.
pub fn enc<R: RngCore + ?Sized>(
    pk: &PaillierPublicKey,
    m: &Integer,
    rng: &mut R,
) -> Result<Ciphertext, CryptoError> {
    let n = pk.n();
    let n2 = pk.n2();
    if m.is_negative() || m >= &n {
        return Err(CryptoError::PlaintextOutOfRange);
    }
    let r = random_unit(&n, rng);
    // (n + 1)^m = 1 + m*n (mod n^2)
    let gm = (Integer::from(m * &n) + 1u32) % &n2;
    let rn = r
        .pow_mod(&n, &n2)
        .map_err(|_| CryptoError::Arithmetic("r^n mod n^2"))?;
    Ok(Ciphertext::new(pk.key_id(), &((gm * rn) % &n2)))
}

pub fn dec(sk: &PaillierPrivateKey, ct: &Ciphertext) -> Result<Integer, CryptoError> {
    let n = sk.n();
    let n2 = sk.n2();
    let c = checked_value(sk.key_id(), &n, &n2, ct)?;
    let u = c
        .pow_mod(&sk.lambda(), &n2)
        .map_err(|_| CryptoError::Arithmetic("c^lambda mod n^2"))?;
    Ok((l_fn(&u, &n) * sk.mu()) % &n)
}

/// Homomorphic addition: Dec(add(a, b)) = a + b (mod n).
pub fn add(
    pk: &PaillierPublicKey,
    a: &Ciphertext,
    b: &Ciphertext,
) -> Result<Ciphertext, CryptoError> {
    let n = pk.n();
    let n2 = pk.n2();
    let ai = checked_value(pk.key_id(), &n, &n2, a)?;
    let bi = checked_value(pk.key_id(), &n, &n2, b)?;
    Ok(Ciphertext::new(pk.key_id(), &((ai * bi) % &n2)))
}

/// Scalar multiplication: Dec(mul_plain(a, k)) = k * a (mod n).
pub fn mul_plain(
    pk: &PaillierPublicKey,
    a: &Ciphertext,
    k: &Integer,
) -> Result<Ciphertext, CryptoError> {
    let n = pk.n();
    let n2 = pk.n2();
    let mut ai = checked_value(pk.key_id(), &n, &n2, a)?;
    // exponentiate by k modulo n^2 (negative k taken mod n)
    let mut kk = k.clone();
    if kk.is_negative() {
        kk = (kk % &n + &n) % &n;
    }
    ai.pow_mod_mut(&kk, &n2)
        .map_err(|_| CryptoError::Arithmetic("c^k mod n^2"))?;
    Ok(Ciphertext::new(pk.key_id(), &ai))
}

/// Fresh encryption of the same plaintext: multiplies in `r^n` for a new unit `r`.
pub fn rerandomize<R: RngCore + ?Sized>(
    pk: &PaillierPublicKey,
    a: &Ciphertext,
    rng: &mut R,
) -> Result<Ciphertext, CryptoError> {
    let n = pk.n();
    let n2 = pk.n2();
    let ai = checked_value(pk.key_id(), &n, &n2, a)?;
    let rn = random_unit(&n, rng)
        .pow_mod(&n, &n2)
        .map_err(|_| CryptoError::Arithmetic("r^n mod n^2"))?;
    Ok(Ciphertext::new(pk.key_id(), &((ai * rn) % &n2)))
}

/// Full blake3 hex digest of a public key, for pinning and logs.
pub fn hash_key(pk: &PaillierPublicKey) -> String {
    let mut h = blake3::Hasher::new();
    h.update(&pk.n);
    h.update(&pk.n2);
    h.finalize().to_hex().to_string()
}

// --- JSON (de)serialization helpers for keys and config ---

pub fn save_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<(), CryptoError> {
    std::fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}

pub fn load_json<T: for<'de> Deserialize<'de>>(path: impl AsRef<Path>) -> Result<T, CryptoError> {
    let data = std::fs::read(path)?;
    Ok(serde_json::from_slice(&data)?)
}

// ------------------- Tests -------------------
