//! Public key codecs.
//!
//! The engine never interprets key bytes itself: keys received from a peer
//! go through a [`KeyCodec`], which validates them and produces the
//! canonical encoding the family's provider expects.

use crate::family::AlgorithmFamily;
use crate::keys::{KeyPair, PublicKey};
use crate::kex::ffdh::{self, FfdhGroup};
use crate::kex::{ecdh_p256, ml_kem, saber, sm2, x25519, x448};
use crate::{Error, Result};

/// Encodes and validates public keys for the wire.
pub trait KeyCodec: Send + Sync {
    /// Encode a public key for transmission.
    fn encode_public_key(&self, key: &PublicKey) -> Vec<u8> {
        key.as_bytes().to_vec()
    }

    /// Decode and validate a public key received from a peer.
    fn decode_public_key(&self, family: AlgorithmFamily, bytes: &[u8]) -> Result<PublicKey>;

    /// Import a static key pair from its private encoding.
    ///
    /// The public half is recomputed from the private key.
    fn decode_private_key(&self, family: AlgorithmFamily, bytes: &[u8]) -> Result<KeyPair> {
        KeyPair::from_private_bytes(family, bytes)
    }
}

/// Codec for the built-in families.
///
/// Validation per family:
/// - FFDHE: exact length, `1 < y < p - 1`, `y^q mod p == 1`
/// - P-256 / SM2: valid SEC1 point (compressed input is normalised to
///   uncompressed)
/// - X25519 / X448: exact length, not all-zero
/// - ML-KEM: exact length, coefficients reduced mod q
/// - SABER: exact length
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardKeyCodec;

impl KeyCodec for StandardKeyCodec {
    fn decode_public_key(&self, family: AlgorithmFamily, bytes: &[u8]) -> Result<PublicKey> {
        let canonical = match family {
            AlgorithmFamily::Ffdhe2048 | AlgorithmFamily::Ffdhe3072 => {
                let group = FfdhGroup::from_family(family).ok_or_else(|| {
                    Error::Unsupported(format!("{:?} has no FFDH group", family))
                })?;
                ffdh::validate_public_key(group, bytes)?
            }
            AlgorithmFamily::EcdhP256 => ecdh_p256::validate_public_key(bytes)?,
            AlgorithmFamily::Sm2 => sm2::validate_public_key(bytes)?,
            AlgorithmFamily::X25519 => x25519::validate_public_key(bytes)?.to_vec(),
            AlgorithmFamily::X448 => x448::validate_public_key(bytes)?.to_vec(),
            AlgorithmFamily::MlKem512 | AlgorithmFamily::MlKem768 | AlgorithmFamily::MlKem1024 => {
                ml_kem::validate_public_key(bytes, family.public_key_len())?;
                bytes.to_vec()
            }
            AlgorithmFamily::LightSaber | AlgorithmFamily::Saber | AlgorithmFamily::FireSaber => {
                saber::validate_public_key(bytes, family.public_key_len())?;
                bytes.to_vec()
            }
        };
        Ok(PublicKey::from_encoded(family, canonical))
    }
}
