//! Ed25519 signing keys for the signed handshake category.
//!
//! Signing keys are independent of the agreement family: the same Ed25519
//! key can authenticate ephemeral keys of any family.

use crate::{Error, Result};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier};
use rand::rngs::OsRng;
use zeroize::Zeroizing;

/// Ed25519 signature length.
pub const SIGNATURE_LEN: usize = 64;

/// Ed25519 public key length.
pub const VERIFYING_KEY_LEN: usize = 32;

/// Ed25519 signing key pair. The secret seed is zeroed on drop.
pub struct SigningKeyPair {
    signing_key: SigningKey,
}

impl SigningKeyPair {
    /// Generate a fresh signing key.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Rebuild a signing key from its 32-byte seed.
    pub fn from_seed(seed: &[u8]) -> Result<Self> {
        let seed: Zeroizing<[u8; 32]> =
            Zeroizing::new(seed.try_into().map_err(|_| Error::InvalidLength {
                expected: 32,
                actual: seed.len(),
            })?);
        Ok(Self {
            signing_key: SigningKey::from_bytes(&seed),
        })
    }

    /// Export the 32-byte seed.
    pub fn seed(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.signing_key.to_bytes())
    }

    /// Public half.
    pub fn verifying_key(&self) -> VerifyingKey {
        VerifyingKey {
            key: self.signing_key.verifying_key(),
        }
    }

    /// Sign `message`, returning the 64-byte signature.
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        self.signing_key.sign(message).to_bytes().to_vec()
    }
}

impl core::fmt::Debug for SigningKeyPair {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SigningKeyPair")
            .field("verifying_key", &self.verifying_key())
            .finish_non_exhaustive()
    }
}

/// Ed25519 public key.
#[derive(Clone, PartialEq, Eq)]
pub struct VerifyingKey {
    key: ed25519_dalek::VerifyingKey,
}

impl VerifyingKey {
    /// Parse a 32-byte compressed Edwards point.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let bytes: &[u8; 32] = bytes.try_into().map_err(|_| Error::InvalidLength {
            expected: VERIFYING_KEY_LEN,
            actual: bytes.len(),
        })?;
        let key = ed25519_dalek::VerifyingKey::from_bytes(bytes)
            .map_err(|e| Error::InvalidPublicKey(format!("Ed25519 key: {}", e)))?;
        Ok(Self { key })
    }

    /// Encoded key bytes.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.key.to_bytes()
    }

    /// Verify `signature` over `message`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Signature` if the signature is malformed or does not verify.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<()> {
        let signature = Signature::from_slice(signature)
            .map_err(|e| Error::Signature(format!("malformed signature: {}", e)))?;
        self.key
            .verify(message, &signature)
            .map_err(|e| Error::Signature(format!("verification failed: {}", e)))
    }
}

impl core::fmt::Debug for VerifyingKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let bytes = self.key.to_bytes();
        write!(f, "VerifyingKey({:02x?}..)", &bytes[..4])
    }
}
