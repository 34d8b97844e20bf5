//! SABER key encapsulation mechanism (LightSaber, Saber, FireSaber).
//!
//! Wraps the round-3 reference implementation from `pqcrypto-saber`. The three
//! parameter sets share one implementation generated by `saber_key_pair!`.
//!
//! # Security
//!
//! - Secret keys and shared secrets are wrapped in `Zeroizing<>`.
//! - Peer public keys are only length-checked: any byte string of the right
//!   length decodes to a valid SABER public key.
//! - Decapsulation uses the Fujisaki-Okamoto re-encryption check, so a
//!   tampered ciphertext yields an unrelated secret rather than an error.
//!
//! # Example
//!
//! ```
//! use accord_crypto::kex::SaberKeyPair;
//!
//! # fn example() -> Result<(), accord_crypto::Error> {
//! let recipient = SaberKeyPair::generate()?;
//!
//! let (ciphertext, sender_shared) = SaberKeyPair::encapsulate(recipient.public_key())?;
//! let recipient_shared = recipient.decapsulate(&ciphertext)?;
//!
//! assert_eq!(&*sender_shared, &*recipient_shared);
//! # Ok(())
//! # }
//! ```

use crate::{Error, Result};
use pqcrypto_traits::kem::{Ciphertext, PublicKey, SecretKey, SharedSecret};
use zeroize::Zeroizing;

/// SABER shared secret length, identical for every parameter set.
pub const SHARED_SECRET_LEN: usize = 32;

/// `H(pk) || z` trailing the embedded public key in a secret key.
const SECRET_KEY_TRAILER_LEN: usize = 64;

macro_rules! saber_key_pair {
    (
        $(#[$meta:meta])*
        $name:ident, $module:ident, sk = $sk_len:expr, pk = $pk_len:expr, ct = $ct_len:expr
    ) => {
        $(#[$meta])*
        pub struct $name {
            /// Secret key bytes, zeroed on drop.
            secret_key_bytes: Zeroizing<Vec<u8>>,
            /// Public key bytes.
            public_key_bytes: Vec<u8>,
        }

        impl $name {
            /// Public key length in bytes.
            pub const PUBLIC_KEY_LEN: usize = $pk_len;
            /// Secret key length in bytes.
            pub const PRIVATE_KEY_LEN: usize = $sk_len;
            /// Ciphertext length in bytes.
            pub const CIPHERTEXT_LEN: usize = $ct_len;

            /// Generate a new random keypair.
            pub fn generate() -> Result<Self> {
                let (public_key, secret_key) = pqcrypto_saber::$module::keypair();
                Ok(Self {
                    secret_key_bytes: Zeroizing::new(secret_key.as_bytes().to_vec()),
                    public_key_bytes: public_key.as_bytes().to_vec(),
                })
            }

            /// Rebuild a keypair from an encoded secret key.
            ///
            /// The secret key layout is `s || pk || H(pk) || z`, so the public
            /// key is recovered from it.
            pub fn from_private(private: &[u8]) -> Result<Self> {
                if private.len() != $sk_len {
                    return Err(Error::InvalidLength {
                        expected: $sk_len,
                        actual: private.len(),
                    });
                }

                let end = $sk_len - SECRET_KEY_TRAILER_LEN;
                let embedded = &private[end - $pk_len..end];

                Ok(Self {
                    secret_key_bytes: Zeroizing::new(private.to_vec()),
                    public_key_bytes: embedded.to_vec(),
                })
            }

            /// Get the public key as bytes.
            pub fn public_key(&self) -> &[u8] {
                &self.public_key_bytes
            }

            /// Get the encoded secret key.
            pub fn private_bytes(&self) -> &[u8] {
                &self.secret_key_bytes
            }

            /// Encapsulate a fresh shared secret to `recipient_public`.
            ///
            /// Returns the ciphertext to send and the sender's copy of the secret.
            pub fn encapsulate(
                recipient_public: &[u8],
            ) -> Result<(Vec<u8>, Zeroizing<[u8; SHARED_SECRET_LEN]>)> {
                validate_public_key(recipient_public, $pk_len)?;

                let public_key =
                    <pqcrypto_saber::$module::PublicKey as PublicKey>::from_bytes(
                        recipient_public,
                    )
                    .map_err(|e| Error::InvalidPublicKey(format!("SABER public key: {:?}", e)))?;

                let (shared_secret, ciphertext) = pqcrypto_saber::$module::encapsulate(&public_key);

                Ok((ciphertext.as_bytes().to_vec(), copy_secret(shared_secret.as_bytes())?))
            }

            /// Recover the shared secret from a ciphertext.
            ///
            /// # Errors
            ///
            /// Returns `Error::InvalidLength` if the ciphertext is wrongly sized.
            pub fn decapsulate(
                &self,
                ciphertext: &[u8],
            ) -> Result<Zeroizing<[u8; SHARED_SECRET_LEN]>> {
                if ciphertext.len() != $ct_len {
                    return Err(Error::InvalidLength {
                        expected: $ct_len,
                        actual: ciphertext.len(),
                    });
                }

                let ciphertext =
                    <pqcrypto_saber::$module::Ciphertext as Ciphertext>::from_bytes(ciphertext)
                        .map_err(|e| Error::KeyExchange(format!("SABER ciphertext: {:?}", e)))?;
                let secret_key =
                    <pqcrypto_saber::$module::SecretKey as SecretKey>::from_bytes(
                        &self.secret_key_bytes,
                    )
                    .map_err(|e| Error::InvalidPrivateKey(format!("SABER secret key: {:?}", e)))?;

                let shared_secret = pqcrypto_saber::$module::decapsulate(&ciphertext, &secret_key);
                copy_secret(shared_secret.as_bytes())
            }
        }
    };
}

saber_key_pair!(
    /// LightSaber key pair (NIST security category 1).
    ///
    /// Public key 672 bytes, secret key 1568 bytes, ciphertext 736 bytes.
    LightSaberKeyPair, lightsaber, sk = 1568, pk = 672, ct = 736
);

saber_key_pair!(
    /// Saber key pair (NIST security category 3).
    ///
    /// Public key 992 bytes, secret key 2304 bytes, ciphertext 1088 bytes.
    SaberKeyPair, saber, sk = 2304, pk = 992, ct = 1088
);

saber_key_pair!(
    /// FireSaber key pair (NIST security category 5).
    ///
    /// Public key 1312 bytes, secret key 3040 bytes, ciphertext 1472 bytes.
    FireSaberKeyPair, firesaber, sk = 3040, pk = 1312, ct = 1472
);

fn copy_secret(bytes: &[u8]) -> Result<Zeroizing<[u8; SHARED_SECRET_LEN]>> {
    if bytes.len() != SHARED_SECRET_LEN {
        return Err(Error::InvalidLength {
            expected: SHARED_SECRET_LEN,
            actual: bytes.len(),
        });
    }
    let mut secret = Zeroizing::new([0u8; SHARED_SECRET_LEN]);
    secret.copy_from_slice(bytes);
    Ok(secret)
}

/// Check a SABER public key received from a peer.
pub fn validate_public_key(bytes: &[u8], expected_len: usize) -> Result<()> {
    if bytes.len() != expected_len {
        return Err(Error::InvalidLength {
            expected: expected_len,
            actual: bytes.len(),
        });
    }
    Ok(())
}
