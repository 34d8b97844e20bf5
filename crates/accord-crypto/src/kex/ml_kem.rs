//! ML-KEM key encapsulation mechanism (FIPS 203).
//!
//! Implements ML-KEM-512, ML-KEM-768 and ML-KEM-1024 on top of the `ml-kem`
//! crate. All three parameter sets share one implementation generated by
//! `ml_kem_key_pair!`.
//!
//! # Security
//!
//! - Decapsulation keys and shared secrets are wrapped in `Zeroizing<>`.
//! - Encapsulation keys received from peers pass the FIPS 203 §7.2 modulus
//!   check before use.
//! - Decapsulation uses implicit rejection: a tampered ciphertext yields an
//!   unrelated secret rather than an error.
//!
//! # Example
//!
//! ```
//! use accord_crypto::kex::MlKem768KeyPair;
//!
//! # fn example() -> Result<(), accord_crypto::Error> {
//! let recipient = MlKem768KeyPair::generate()?;
//!
//! let (ciphertext, sender_shared) = MlKem768KeyPair::encapsulate(recipient.public_key())?;
//! let recipient_shared = recipient.decapsulate(&ciphertext)?;
//!
//! assert_eq!(&*sender_shared, &*recipient_shared);
//! # Ok(())
//! # }
//! ```

use crate::{Error, Result};
use kem::{Decapsulate, Encapsulate};
use ml_kem::kem::{DecapsulationKey, EncapsulationKey};
use ml_kem::{EncodedSizeUser, KemCore, MlKem1024, MlKem512, MlKem768};
use zeroize::Zeroizing;

/// ML-KEM shared secret length.
pub const SHARED_SECRET_LEN: usize = 32;

/// ML-KEM modulus.
const Q: u16 = 3329;

/// FIPS 203 §7.2 modulus check: every 12-bit coefficient of the encoded
/// vector must be below `q`.
fn coefficients_reduced(encoded: &[u8]) -> bool {
    encoded.chunks_exact(3).all(|chunk| {
        let low = u16::from(chunk[0]) | (u16::from(chunk[1] & 0x0F) << 8);
        let high = u16::from(chunk[1] >> 4) | (u16::from(chunk[2]) << 4);
        low < Q && high < Q
    })
}

macro_rules! ml_kem_key_pair {
    (
        $(#[$meta:meta])*
        $name:ident, $kem:ty, $params:ty,
        dk = $dk_len:expr, ek = $ek_len:expr, ct = $ct_len:expr, vector = $vector_len:expr
    ) => {
        $(#[$meta])*
        pub struct $name {
            /// Decapsulation key bytes, zeroed on drop.
            decapsulation_key_bytes: Zeroizing<[u8; $dk_len]>,
            /// Encapsulation key bytes.
            encapsulation_key_bytes: [u8; $ek_len],
        }

        impl $name {
            /// Encapsulation key length in bytes.
            pub const PUBLIC_KEY_LEN: usize = $ek_len;
            /// Decapsulation key length in bytes.
            pub const PRIVATE_KEY_LEN: usize = $dk_len;
            /// Ciphertext length in bytes.
            pub const CIPHERTEXT_LEN: usize = $ct_len;

            /// Generate a new random keypair using a cryptographically secure RNG.
            pub fn generate() -> Result<Self> {
                let mut rng = rand::rngs::OsRng;
                let (decapsulation_key, encapsulation_key) = <$kem>::generate(&mut rng);

                let mut dk_bytes = Zeroizing::new([0u8; $dk_len]);
                let mut ek_bytes = [0u8; $ek_len];
                dk_bytes.copy_from_slice(&decapsulation_key.as_bytes()[..]);
                ek_bytes.copy_from_slice(&encapsulation_key.as_bytes()[..]);

                Ok(Self {
                    decapsulation_key_bytes: dk_bytes,
                    encapsulation_key_bytes: ek_bytes,
                })
            }

            /// Rebuild a keypair from an encoded decapsulation key.
            ///
            /// The encapsulation key is embedded in the decapsulation key
            /// (FIPS 203 Algorithm 16) and is extracted from it.
            pub fn from_private(private: &[u8]) -> Result<Self> {
                if private.len() != $dk_len {
                    return Err(Error::InvalidLength {
                        expected: $dk_len,
                        actual: private.len(),
                    });
                }

                let embedded = &private[$vector_len..$vector_len + $ek_len];
                validate_public_key(embedded, $ek_len)?;

                let mut dk_bytes = Zeroizing::new([0u8; $dk_len]);
                let mut ek_bytes = [0u8; $ek_len];
                dk_bytes.copy_from_slice(private);
                ek_bytes.copy_from_slice(embedded);

                Ok(Self {
                    decapsulation_key_bytes: dk_bytes,
                    encapsulation_key_bytes: ek_bytes,
                })
            }

            /// Get the public key (encapsulation key) as bytes.
            pub fn public_key(&self) -> &[u8] {
                &self.encapsulation_key_bytes
            }

            /// Get the encoded decapsulation key.
            pub fn private_bytes(&self) -> &[u8] {
                &self.decapsulation_key_bytes[..]
            }

            /// Encapsulate a fresh shared secret to `recipient_public`.
            ///
            /// Returns the ciphertext to send and the sender's copy of the secret.
            ///
            /// # Errors
            ///
            /// Returns `Error::InvalidLength` for a wrongly sized key and
            /// `Error::InvalidPublicKey` if the key fails the modulus check.
            pub fn encapsulate(
                recipient_public: &[u8],
            ) -> Result<(Vec<u8>, Zeroizing<[u8; SHARED_SECRET_LEN]>)> {
                validate_public_key(recipient_public, $ek_len)?;

                let ek_bytes: &[u8; $ek_len] = recipient_public
                    .try_into()
                    .map_err(|_| Error::KeyExchange("Failed to parse public key".into()))?;

                let encapsulation_key =
                    EncapsulationKey::<$params>::from_bytes(&(*ek_bytes).into());

                let mut rng = rand::rngs::OsRng;
                let (ciphertext, shared_secret) = encapsulation_key
                    .encapsulate(&mut rng)
                    .map_err(|e| Error::KeyExchange(format!("Encapsulation failed: {:?}", e)))?;

                let mut ss_array = Zeroizing::new([0u8; SHARED_SECRET_LEN]);
                ss_array.copy_from_slice(&shared_secret[..]);

                Ok((ciphertext[..].to_vec(), ss_array))
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
                let ct_bytes: &[u8; $ct_len] =
                    ciphertext.try_into().map_err(|_| Error::InvalidLength {
                        expected: $ct_len,
                        actual: ciphertext.len(),
                    })?;

                let decapsulation_key = DecapsulationKey::<$params>::from_bytes(
                    &(*self.decapsulation_key_bytes).into(),
                );

                let shared_secret = decapsulation_key
                    .decapsulate(&(*ct_bytes).into())
                    .map_err(|e| Error::KeyExchange(format!("Decapsulation failed: {:?}", e)))?;

                let mut ss_array = Zeroizing::new([0u8; SHARED_SECRET_LEN]);
                ss_array.copy_from_slice(&shared_secret[..]);
                Ok(ss_array)
            }
        }
    };
}

ml_kem_key_pair!(
    /// ML-KEM-512 key pair (NIST security category 1).
    ///
    /// Public key 800 bytes, private key 1632 bytes, ciphertext 768 bytes.
    MlKem512KeyPair, MlKem512, ml_kem::MlKem512Params,
    dk = 1632, ek = 800, ct = 768, vector = 768
);

ml_kem_key_pair!(
    /// ML-KEM-768 key pair (NIST security category 3).
    ///
    /// Public key 1184 bytes, private key 2400 bytes, ciphertext 1088 bytes.
    MlKem768KeyPair, MlKem768, ml_kem::MlKem768Params,
    dk = 2400, ek = 1184, ct = 1088, vector = 1152
);

ml_kem_key_pair!(
    /// ML-KEM-1024 key pair (NIST security category 5).
    ///
    /// Public key 1568 bytes, private key 3168 bytes, ciphertext 1568 bytes.
    MlKem1024KeyPair, MlKem1024, ml_kem::MlKem1024Params,
    dk = 3168, ek = 1568, ct = 1568, vector = 1536
);

/// Check an encapsulation key received from a peer: exact length, then the
/// modulus check over its polynomial vector (everything except the trailing
/// 32-byte seed).
pub fn validate_public_key(bytes: &[u8], expected_len: usize) -> Result<()> {
    if bytes.len() != expected_len {
        return Err(Error::InvalidLength {
            expected: expected_len,
            actual: bytes.len(),
        });
    }
    if !coefficients_reduced(&bytes[..expected_len - 32]) {
        return Err(Error::InvalidPublicKey(
            "ML-KEM encapsulation key coefficient not reduced mod q".into(),
        ));
    }
    Ok(())
}
