//! X25519 key exchange (RFC 7748).
//!
//! # Security
//!
//! - Private keys and shared secrets are wrapped in `Zeroizing<>`.
//! - Uses the `x25519-dalek` crate.
//! - An all-zero shared secret (low-order peer point) is rejected.
//!
//! # Example
//!
//! ```
//! use accord_crypto::kex::X25519KeyPair;
//!
//! # fn example() -> Result<(), accord_crypto::Error> {
//! let alice = X25519KeyPair::generate()?;
//! let bob = X25519KeyPair::generate()?;
//!
//! let alice_shared = alice.exchange(bob.public_key())?;
//! let bob_shared = bob.exchange(alice.public_key())?;
//!
//! assert_eq!(*alice_shared, *bob_shared);
//! # Ok(())
//! # }
//! ```

use crate::{Error, Result};
use subtle::ConstantTimeEq;
use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::Zeroizing;

/// X25519 public key and shared secret length.
pub const X25519_LEN: usize = 32;

/// X25519 key pair.
///
/// The private scalar is zeroed when dropped.
pub struct X25519KeyPair {
    /// Private scalar (32 bytes), zeroed on drop.
    private_key: Zeroizing<StaticSecret>,
    /// Public key (32 bytes).
    public_key: PublicKey,
}

impl X25519KeyPair {
    /// Generate a new random X25519 keypair using a cryptographically secure RNG.
    ///
    /// # Errors
    ///
    /// This function should not fail under normal circumstances. It returns a `Result`
    /// for consistency with other key generation functions.
    pub fn generate() -> Result<Self> {
        let private_key = StaticSecret::random_from_rng(rand::rngs::OsRng);
        let public_key = PublicKey::from(&private_key);

        Ok(Self {
            private_key: Zeroizing::new(private_key),
            public_key,
        })
    }

    /// Create an X25519 keypair from a raw private key.
    pub fn from_private(private: [u8; 32]) -> Result<Self> {
        let private_key = StaticSecret::from(private);
        let public_key = PublicKey::from(&private_key);

        Ok(Self {
            private_key: Zeroizing::new(private_key),
            public_key,
        })
    }

    /// Create an X25519 keypair from a private key slice.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidLength` if `private` is not 32 bytes.
    pub fn from_private_slice(private: &[u8]) -> Result<Self> {
        let bytes: [u8; 32] = private.try_into().map_err(|_| Error::InvalidLength {
            expected: X25519_LEN,
            actual: private.len(),
        })?;
        let bytes = Zeroizing::new(bytes);
        Self::from_private(*bytes)
    }

    /// Get the public key as a 32-byte array.
    pub fn public_key(&self) -> &[u8; 32] {
        self.public_key.as_bytes()
    }

    /// Export the private scalar.
    pub fn private_bytes(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.private_key.to_bytes())
    }

    /// Perform X25519 key exchange with a peer's public key.
    ///
    /// # Errors
    ///
    /// Returns `Error::KeyExchange` if the result is the all-zero value,
    /// which indicates a low-order peer point (RFC 7748 §6.1).
    pub fn exchange(&self, peer_public: &[u8; 32]) -> Result<Zeroizing<[u8; 32]>> {
        let peer_key = PublicKey::from(*peer_public);
        let shared = self.private_key.diffie_hellman(&peer_key);

        if bool::from(shared.as_bytes().ct_eq(&[0u8; 32])) {
            return Err(Error::KeyExchange(
                "Invalid peer public key (low-order point)".into(),
            ));
        }

        Ok(Zeroizing::new(*shared.as_bytes()))
    }
}

/// Check the encoding of an X25519 public key received from a peer.
///
/// Low-order points are caught when the exchange produces an all-zero value;
/// this only rejects wrong lengths and the all-zero encoding.
pub fn validate_public_key(bytes: &[u8]) -> Result<[u8; 32]> {
    let key: [u8; 32] = bytes.try_into().map_err(|_| Error::InvalidLength {
        expected: X25519_LEN,
        actual: bytes.len(),
    })?;
    if bool::from(key.ct_eq(&[0u8; 32])) {
        return Err(Error::InvalidPublicKey(
            "X25519 public key is the all-zero point".into(),
        ));
    }
    Ok(key)
}
