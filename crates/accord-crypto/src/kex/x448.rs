//! X448 key exchange (RFC 7748).
//!
//! Uses the `x448` crate. The clamped scalar is kept in a `Zeroizing`
//! buffer; the crate's secret type is only built for the duration of an
//! exchange.

use crate::{Error, Result};
use rand::RngCore;
use subtle::ConstantTimeEq;
use x448::{PublicKey, Secret};
use zeroize::Zeroizing;

/// X448 public key and shared secret length.
pub const X448_LEN: usize = 56;

/// X448 key pair.
pub struct X448KeyPair {
    /// Clamped private scalar, zeroed on drop.
    private_key: Zeroizing<[u8; 56]>,
    public_key: [u8; 56],
}

impl X448KeyPair {
    /// Generate a new random X448 keypair.
    pub fn generate() -> Result<Self> {
        let mut private = Zeroizing::new([0u8; 56]);
        rand::rngs::OsRng.fill_bytes(&mut private[..]);
        Self::from_private(*private)
    }

    /// Create an X448 keypair from a raw private key. The scalar is clamped.
    pub fn from_private(private: [u8; 56]) -> Result<Self> {
        let secret = Secret::from(private);
        let public_key = *PublicKey::from(&secret).as_bytes();

        Ok(Self {
            private_key: Zeroizing::new(*secret.as_bytes()),
            public_key,
        })
    }

    /// Create an X448 keypair from a private key slice.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidLength` if `private` is not 56 bytes.
    pub fn from_private_slice(private: &[u8]) -> Result<Self> {
        let bytes: [u8; 56] = private.try_into().map_err(|_| Error::InvalidLength {
            expected: X448_LEN,
            actual: private.len(),
        })?;
        let bytes = Zeroizing::new(bytes);
        Self::from_private(*bytes)
    }

    /// Get the public key as a 56-byte array.
    pub fn public_key(&self) -> &[u8; 56] {
        &self.public_key
    }

    /// Export the clamped private scalar.
    pub fn private_bytes(&self) -> Zeroizing<[u8; 56]> {
        Zeroizing::new(*self.private_key)
    }

    /// Perform X448 key exchange with a peer's public key.
    ///
    /// # Errors
    ///
    /// Returns `Error::KeyExchange` for a low-order peer point.
    pub fn exchange(&self, peer_public: &[u8; 56]) -> Result<Zeroizing<[u8; 56]>> {
        let peer = PublicKey::from_bytes(peer_public).ok_or_else(|| {
            Error::KeyExchange("Invalid peer public key (low-order point)".into())
        })?;
        let secret = Secret::from(*self.private_key);
        let shared = secret.as_diffie_hellman(&peer).ok_or_else(|| {
            Error::KeyExchange("Invalid peer public key (low-order point)".into())
        })?;

        let shared = Zeroizing::new(*shared.as_bytes());
        if bool::from(shared.ct_eq(&[0u8; 56])) {
            return Err(Error::KeyExchange(
                "Invalid peer public key (low-order point)".into(),
            ));
        }
        Ok(shared)
    }
}

/// Check the encoding of an X448 public key received from a peer.
pub fn validate_public_key(bytes: &[u8]) -> Result<[u8; 56]> {
    let key: [u8; 56] = bytes.try_into().map_err(|_| Error::InvalidLength {
        expected: X448_LEN,
        actual: bytes.len(),
    })?;
    if bool::from(key.ct_eq(&[0u8; 56])) {
        return Err(Error::InvalidPublicKey(
            "X448 public key is the all-zero point".into(),
        ));
    }
    Ok(key)
}
