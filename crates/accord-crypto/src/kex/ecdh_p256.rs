//! ECDH-P256 key exchange and ECMQV (NIST SP 800-56A).
//!
//! # Security
//!
//! - All private keys and shared secrets are wrapped in `Zeroizing<>` or
//!   zeroed explicitly once used.
//! - Peer points are validated by `p256` (on-curve, not the identity).
//! - Public keys are encoded in uncompressed form (0x04 || x || y) per SEC 1.
//!
//! # Example
//!
//! ```
//! use accord_crypto::kex::EcdhP256KeyPair;
//!
//! # fn example() -> Result<(), accord_crypto::Error> {
//! let alice = EcdhP256KeyPair::generate()?;
//! let bob = EcdhP256KeyPair::generate()?;
//!
//! let alice_shared = alice.exchange(bob.public_key())?;
//! let bob_shared = bob.exchange(alice.public_key())?;
//!
//! assert_eq!(*alice_shared, *bob_shared);
//! # Ok(())
//! # }
//! ```

use crate::{Error, Result};
use p256::ecdh::diffie_hellman;
use p256::elliptic_curve::ff::PrimeField;
use p256::elliptic_curve::point::AffineCoordinates;
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::{FieldBytes, PublicKey, Scalar, SecretKey};
use zeroize::{Zeroize, Zeroizing};

/// Length of an uncompressed SEC1 public key.
pub const UNCOMPRESSED_LEN: usize = 65;

/// ECDH-P256 key pair.
///
/// Public keys are encoded in uncompressed form: 0x04 || x || y (65 bytes total).
pub struct EcdhP256KeyPair {
    /// Secret key (32 bytes), zeroed on drop.
    secret_key: SecretKey,
    /// Public key in uncompressed form, cached.
    public_key_bytes: Vec<u8>,
}

impl EcdhP256KeyPair {
    /// Generate a new random P-256 keypair using a cryptographically secure RNG.
    ///
    /// # Example
    ///
    /// ```
    /// use accord_crypto::kex::EcdhP256KeyPair;
    ///
    /// let keypair = EcdhP256KeyPair::generate().unwrap();
    /// assert_eq!(keypair.public_key().len(), 65);
    /// assert_eq!(keypair.public_key()[0], 0x04);
    /// ```
    pub fn generate() -> Result<Self> {
        let secret_key = SecretKey::random(&mut rand::rngs::OsRng);
        Ok(Self::from_secret_key(secret_key))
    }

    /// Create a keypair from an existing 32-byte big-endian private scalar.
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
            .map_err(|_| Error::InvalidPrivateKey("Invalid P-256 private key".into()))?;

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

    /// Perform P-256 ECDH key exchange with a peer's public key.
    ///
    /// The shared secret is the 32-byte x-coordinate of the result point.
    ///
    /// # Errors
    ///
    /// Returns an error if the peer key is not an uncompressed point on P-256.
    ///
    /// # Example
    ///
    /// ```
    /// use accord_crypto::kex::EcdhP256KeyPair;
    ///
    /// let alice = EcdhP256KeyPair::generate().unwrap();
    /// let bob = EcdhP256KeyPair::generate().unwrap();
    ///
    /// let shared_secret = alice.exchange(bob.public_key()).unwrap();
    /// assert_eq!(shared_secret.len(), 32);
    /// ```
    pub fn exchange(&self, peer_public: &[u8]) -> Result<Zeroizing<[u8; 32]>> {
        let peer_public_key = parse_uncompressed(peer_public)?;

        let shared_secret = diffie_hellman(
            self.secret_key.to_nonzero_scalar(),
            peer_public_key.as_affine(),
        );

        let mut result = [0u8; 32];
        result.copy_from_slice(shared_secret.raw_secret_bytes().as_slice());

        Ok(Zeroizing::new(result))
    }

    /// ECMQV with this key pair as the static key (NIST SP 800-56A §6.1.1.3).
    ///
    /// Computes `S = r + avf(R) * x` from the own ephemeral `r`/`R` and static
    /// `x`, then `P = S * (R' + avf(R') * Q')` from the peer's ephemeral `R'`
    /// and static `Q'`. The shared secret is the x-coordinate of `P`.
    ///
    /// # Errors
    ///
    /// Returns `Error::KeyExchange` if `P` is the point at infinity.
    pub fn mqv(
        &self,
        own_ephemeral: &EcdhP256KeyPair,
        peer_static: &[u8],
        peer_ephemeral: &[u8],
    ) -> Result<Zeroizing<[u8; 32]>> {
        let peer_static = parse_uncompressed(peer_static)?;
        let peer_ephemeral = parse_uncompressed(peer_ephemeral)?;

        let own_ephemeral_public = own_ephemeral.secret_key.public_key();
        let static_scalar: Scalar = *self.secret_key.to_nonzero_scalar();
        let ephemeral_scalar: Scalar = *own_ephemeral.secret_key.to_nonzero_scalar();

        let mut implicit = ephemeral_scalar + associate_value(&own_ephemeral_public) * static_scalar;

        let peer_point = peer_ephemeral.to_projective()
            + peer_static.to_projective() * associate_value(&peer_ephemeral);
        let shared_point = peer_point * implicit;
        implicit.zeroize();

        let shared = PublicKey::from_affine(shared_point.to_affine())
            .map_err(|_| Error::KeyExchange("ECMQV produced the point at infinity".into()))?;

        let mut result = [0u8; 32];
        result.copy_from_slice(shared.as_affine().x().as_slice());

        Ok(Zeroizing::new(result))
    }
}

/// Associate value function: `(x mod 2^128) + 2^128` for P-256.
fn associate_value(point: &PublicKey) -> Scalar {
    let x = point.as_affine().x();
    let mut repr = FieldBytes::default();
    repr[16..].copy_from_slice(&x[16..]);
    repr[15] = 0x01;
    // Always below the group order, so the conversion cannot fail.
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
            "P-256 public key must use uncompressed format (0x04 prefix)".into(),
        ));
    }
    PublicKey::from_sec1_bytes(bytes)
        .map_err(|_| Error::InvalidPublicKey("Invalid P-256 public key point".into()))
}

/// Validate a SEC1 public key (compressed or uncompressed) and return its
/// uncompressed encoding.
pub fn validate_public_key(bytes: &[u8]) -> Result<Vec<u8>> {
    let key = PublicKey::from_sec1_bytes(bytes)
        .map_err(|_| Error::InvalidPublicKey("Invalid P-256 public key point".into()))?;
    Ok(key.to_encoded_point(false).as_bytes().to_vec())
}
