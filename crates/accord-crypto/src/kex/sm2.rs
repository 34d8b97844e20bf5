//! SM2 Diffie-Hellman and SM2 key exchange (GB/T 32918.3).
//!
//! Raw agreement is plain ECDH on the SM2 curve and yields the x-coordinate.
//! The key exchange protocol combines both parties' static and ephemeral keys
//! with their user hashes `Z`, so unlike ECMQV it depends on which side of the
//! handshake each party plays.
//!
//! # Security
//!
//! - Private scalars live in `SecretKey` (zeroed on drop); the implicit
//!   signature `t` is zeroed after use.
//! - Peer points are validated by `sm2` (on-curve, not the identity).
//! - Public keys are encoded in uncompressed form (0x04 || x || y).
//!
//! # Example
//!
//! ```
//! use accord_crypto::kex::Sm2KeyPair;
//! use accord_crypto::Role;
//!
//! # fn example() -> Result<(), accord_crypto::Error> {
//! let (a_static, a_ephemeral) = (Sm2KeyPair::generate()?, Sm2KeyPair::generate()?);
//! let (b_static, b_ephemeral) = (Sm2KeyPair::generate()?, Sm2KeyPair::generate()?);
//!
//! let a_key = a_static.key_exchange(
//!     &a_ephemeral,
//!     b_static.public_key(),
//!     b_ephemeral.public_key(),
//!     Role::Initiator,
//! )?;
//! let b_key = b_static.key_exchange(
//!     &b_ephemeral,
//!     a_static.public_key(),
//!     a_ephemeral.public_key(),
//!     Role::Responder,
//! )?;
//!
//! assert_eq!(*a_key, *b_key);
//! # Ok(())
//! # }
//! ```

use crate::kdf::x963_kdf_sm3;
use crate::role::Role;
use crate::{Error, Result};
use sm2::elliptic_curve::ff::PrimeField;
use sm2::elliptic_curve::point::AffineCoordinates;
use sm2::elliptic_curve::sec1::ToEncodedPoint;
use sm2::{AffinePoint, FieldBytes, PublicKey, Scalar, SecretKey};
use sm3::{Digest, Sm3};
use zeroize::{Zeroize, Zeroizing};

/// Length of an uncompressed SEC1 public key.
pub const UNCOMPRESSED_LEN: usize = 65;

/// Length of the key produced by [`Sm2KeyPair::key_exchange`].
pub const EXCHANGE_KEY_LEN: usize = 32;

/// Distinguishing identifier used when neither party supplies one.
pub const DEFAULT_ID: &[u8] = b"1234567812345678";

const CURVE_A: [u8; 32] = [
    0xff, 0xff, 0xff, 0xfe, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0x00, 0x00, 0x00, 0x00,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfc,
];

const CURVE_B: [u8; 32] = [
    0x28, 0xe9, 0xfa, 0x9e, 0x9d, 0x9f, 0x5e, 0x34,
    0x4d, 0x5a, 0x9e, 0x4b, 0xcf, 0x65, 0x09, 0xa7,
    0xf3, 0x97, 0x89, 0xf5, 0x15, 0xab, 0x8f, 0x92,
    0xdd, 0xbc, 0xbd, 0x41, 0x4d, 0x94, 0x0e, 0x93,
];

/// SM2 key pair.
pub struct Sm2KeyPair {
    /// Secret scalar, zeroed on drop.
    secret_key: SecretKey,
    /// Public key in uncompressed form, cached.
    public_key_bytes: Vec<u8>,
}

impl Sm2KeyPair {
    /// Generate a new random keypair.
    pub fn generate() -> Result<Self> {
        let secret_key = SecretKey::random(&mut rand::rngs::OsRng);
        Ok(Self::from_secret_key(secret_key))
    }

    /// Create a keypair from a 32-byte big-endian private scalar.
    ///
    /// # Errors
    ///
    /// Returns an error if the scalar is zero or not below the group order.
    pub fn from_private(private_key: &[u8]) -> Result<Self> {
        if private_key.len() != 32 {
            return Err(Error::InvalidLength {
                expected: 32,
                actual: private_key.len(),
            });
        }

        let secret_key = SecretKey::from_slice(private_key)
            .map_err(|_| Error::InvalidPrivateKey("Invalid SM2 private key".into()))?;

        Ok(Self::from_secret_key(secret_key))
    }

    fn from_secret_key(secret_key: SecretKey) -> Self {
        let public_key_bytes = secret_key
            .public_key()
            .to_encoded_point(false)
            .as_bytes()
            .to_vec();
        Self {
            secret_key,
            public_key_bytes,
        }
    }

    /// Get the public key in uncompressed form (65 bytes: 0x04 || x || y).
    pub fn public_key(&self) -> &[u8] {
        &self.public_key_bytes
    }

    /// Export the private scalar as 32 big-endian bytes.
    pub fn private_bytes(&self) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(self.secret_key.to_bytes().to_vec())
    }

    /// Plain ECDH on the SM2 curve: the x-coordinate of `d * Q'`.
    pub fn exchange(&self, peer_public: &[u8]) -> Result<Zeroizing<[u8; 32]>> {
        let peer = parse_uncompressed(peer_public)?;
        let shared_point =
            (peer.to_projective() * *self.secret_key.to_nonzero_scalar()).to_affine();

        let mut result = [0u8; 32];
        result.copy_from_slice(shared_point.x().as_slice());
        Ok(Zeroizing::new(result))
    }

    /// SM2 key exchange with this key pair as the static key.
    ///
    /// Computes `t = d + avf(R) * r` from the own static `d` and ephemeral
    /// `r`/`R`, then `V = t * (P' + avf(R') * R')`. The agreed key is
    /// `KDF(xV || yV || Z_A || Z_B)` where `Z_A` belongs to the initiator.
    ///
    /// # Errors
    ///
    /// Returns `Error::KeyExchange` if `V` is the point at infinity.
    pub fn key_exchange(
        &self,
        own_ephemeral: &Sm2KeyPair,
        peer_static: &[u8],
        peer_ephemeral: &[u8],
        role: Role,
    ) -> Result<Zeroizing<[u8; EXCHANGE_KEY_LEN]>> {
        let peer_static = parse_uncompressed(peer_static)?;
        let peer_ephemeral = parse_uncompressed(peer_ephemeral)?;

        let own_ephemeral_public = own_ephemeral.secret_key.public_key();
        let static_scalar: Scalar = *self.secret_key.to_nonzero_scalar();
        let ephemeral_scalar: Scalar = *own_ephemeral.secret_key.to_nonzero_scalar();

        let mut implicit =
            static_scalar + associate_value(&own_ephemeral_public) * ephemeral_scalar;

        let peer_point = peer_static.to_projective()
            + peer_ephemeral.to_projective() * associate_value(&peer_ephemeral);
        let shared_point = peer_point * implicit;
        implicit.zeroize();

        let shared = PublicKey::from_affine(shared_point.to_affine()).map_err(|_| {
            Error::KeyExchange("SM2 key exchange produced the point at infinity".into())
        })?;

        let own_hash = user_hash(&self.secret_key.public_key(), DEFAULT_ID);
        let peer_hash = user_hash(&peer_static, DEFAULT_ID);
        let (initiator_hash, responder_hash) = match role {
            Role::Initiator => (own_hash, peer_hash),
            Role::Responder => (peer_hash, own_hash),
        };

        let encoded = shared.to_encoded_point(false);
        let mut input = Zeroizing::new(Vec::with_capacity(128));
        input.extend_from_slice(&encoded.as_bytes()[1..]);
        input.extend_from_slice(&initiator_hash);
        input.extend_from_slice(&responder_hash);

        let okm = x963_kdf_sm3(&input, &[], EXCHANGE_KEY_LEN)?;
        let mut result = Zeroizing::new([0u8; EXCHANGE_KEY_LEN]);
        result.copy_from_slice(&okm);
        Ok(result)
    }
}

/// User hash `Z = SM3(ENTL || ID || a || b || xG || yG || xP || yP)`.
pub fn user_hash(public_key: &PublicKey, id: &[u8]) -> [u8; 32] {
    let entl = (id.len() as u16).wrapping_mul(8);
    let generator = AffinePoint::GENERATOR.to_encoded_point(false);
    let point = public_key.to_encoded_point(false);

    let mut hasher = Sm3::new();
    hasher.update(entl.to_be_bytes());
    hasher.update(id);
    hasher.update(CURVE_A);
    hasher.update(CURVE_B);
    hasher.update(&generator.as_bytes()[1..]);
    hasher.update(&point.as_bytes()[1..]);
    hasher.finalize().into()
}

/// Associate value with `w = 127`: `2^127 + (x mod 2^127)`.
fn associate_value(point: &PublicKey) -> Scalar {
    let x = point.as_affine().x();
    let mut repr = FieldBytes::default();
    repr[16..].copy_from_slice(&x[16..]);
    repr[16] |= 0x80;
    // Below 2^128 and therefore below the group order.
    Option::<Scalar>::from(Scalar::from_repr(repr)).unwrap_or(Scalar::ONE)
}

fn parse_uncompressed(bytes: &[u8]) -> Result<PublicKey> {
    if bytes.len() != UNCOMPRESSED_LEN {
        return Err(Error::InvalidLength {
            expected: UNCOMPRESSED_LEN,
            actual: bytes.len(),
        });
    }
    if bytes[0] != 0x04 {
        return Err(Error::InvalidPublicKey(
            "SM2 public key must use uncompressed format (0x04 prefix)".into(),
        ));
    }
    PublicKey::from_sec1_bytes(bytes)
        .map_err(|_| Error::InvalidPublicKey("Invalid SM2 public key point".into()))
}

/// Validate a SEC1 public key (compressed or uncompressed) and return its
/// uncompressed encoding.
pub fn validate_public_key(bytes: &[u8]) -> Result<Vec<u8>> {
    let key = PublicKey::from_sec1_bytes(bytes)
        .map_err(|_| Error::InvalidPublicKey("Invalid SM2 public key point".into()))?;
    Ok(key.to_encoded_point(false).as_bytes().to_vec())
}
