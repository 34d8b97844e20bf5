//! Family-tagged key material passed between the engine and providers.
//!
//! Keys are carried in their transport encoding so that any provider
//! registered for a family can interpret them. Private bytes are zeroed on drop.

use crate::family::AlgorithmFamily;
use crate::provider::native_provider;
use crate::{Error, Result};
use zeroize::Zeroizing;

/// A public key in the transport encoding of its family.
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey {
    family: AlgorithmFamily,
    bytes: Vec<u8>,
}

impl PublicKey {
    /// Wrap already-validated encoded bytes.
    ///
    /// Use [`crate::KeyCodec::decode_public_key`] for bytes received from a peer.
    pub fn from_encoded(family: AlgorithmFamily, bytes: Vec<u8>) -> Self {
        Self { family, bytes }
    }

    /// Family this key belongs to.
    pub fn family(&self) -> AlgorithmFamily {
        self.family
    }

    /// Encoded key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the key, returning its encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl AsRef<[u8]> for PublicKey {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl core::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let shown = self.bytes.len().min(4);
        write!(
            f,
            "PublicKey({:?}, {:02x?}..{}B)",
            self.family,
            &self.bytes[..shown],
            self.bytes.len()
        )
    }
}

/// A private key in the encoding of its family, zeroed on drop.
pub struct PrivateKey {
    family: AlgorithmFamily,
    bytes: Zeroizing<Vec<u8>>,
}

impl PrivateKey {
    /// Wrap private key bytes.
    pub fn from_bytes(family: AlgorithmFamily, bytes: Zeroizing<Vec<u8>>) -> Self {
        Self { family, bytes }
    }

    /// Family this key belongs to.
    pub fn family(&self) -> AlgorithmFamily {
        self.family
    }

    /// Raw private key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl core::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "PrivateKey({:?}, [REDACTED])", self.family)
    }
}

/// A key pair of a single family.
///
/// Static key pairs are created by the caller and lent to the engine;
/// ephemeral key pairs are created by the engine through its provider and
/// dropped as soon as the agreement has been computed.
#[derive(Debug)]
pub struct KeyPair {
    public: PublicKey,
    private: PrivateKey,
}

impl KeyPair {
    /// Assemble a key pair from its halves.
    ///
    /// # Errors
    ///
    /// Returns `Error::FamilyMismatch` if the halves belong to different families.
    pub fn from_parts(public: PublicKey, private: PrivateKey) -> Result<Self> {
        if public.family != private.family {
            return Err(Error::FamilyMismatch {
                expected: public.family,
                actual: private.family,
            });
        }
        Ok(Self { public, private })
    }

    /// Generate a fresh key pair with the native provider for `family`.
    ///
    /// # Example
    ///
    /// ```
    /// use accord_crypto::{AlgorithmFamily, KeyPair};
    ///
    /// let pair = KeyPair::generate(AlgorithmFamily::X25519).unwrap();
    /// assert_eq!(pair.public_key().as_bytes().len(), 32);
    /// ```
    pub fn generate(family: AlgorithmFamily) -> Result<Self> {
        native_provider(family).generate_key_pair()
    }

    /// Rebuild a key pair from private key bytes, deriving the public half.
    pub fn from_private_bytes(family: AlgorithmFamily, private: &[u8]) -> Result<Self> {
        native_provider(family).key_pair_from_private(private)
    }

    /// Family of this key pair.
    pub fn family(&self) -> AlgorithmFamily {
        self.public.family
    }

    /// Public half.
    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    /// Private half.
    pub fn private_key(&self) -> &PrivateKey {
        &self.private
    }
}
