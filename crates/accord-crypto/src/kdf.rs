//! Key derivation functions.
//!
//! - HKDF-SHA256 and HKDF-SHA512 (RFC 5869)
//! - ANSI X9.63 KDF with SHA-256 (SEC 1 §3.6.1)
//! - The same counter construction over SM3, as used by SM2 key exchange
//!
//! Outputs are wrapped in `Zeroizing`.

use crate::{Error, Result};
use hkdf::Hkdf;
use sha2::{Digest, Sha256, Sha512};
use sm3::Sm3;
use zeroize::Zeroizing;

/// Largest output HKDF-SHA256 can produce (255 blocks).
pub const HKDF_SHA256_MAX_LEN: usize = 255 * 32;

/// Largest output HKDF-SHA512 can produce (255 blocks).
pub const HKDF_SHA512_MAX_LEN: usize = 255 * 64;

/// Largest output accepted by [`x963_kdf_sha256`].
pub const X963_SHA256_MAX_LEN: usize = 255 * 32;

/// Generic HKDF-SHA256 key derivation per RFC 5869.
///
/// # Arguments
/// * `ikm` - Input key material
/// * `salt` - Salt value (empty slice for no salt)
/// * `info` - Context and application-specific information
/// * `output_len` - Length of output key material
///
/// # Example
/// ```
/// use accord_crypto::kdf::hkdf_sha256;
///
/// let ikm = &[0x0b; 22];
/// let salt = &hex::decode("000102030405060708090a0b0c").unwrap();
/// let info = &hex::decode("f0f1f2f3f4f5f6f7f8f9").unwrap();
///
/// let okm = hkdf_sha256(ikm, salt, info, 42).unwrap();
/// assert_eq!(okm.len(), 42);
/// ```
pub fn hkdf_sha256(
    ikm: &[u8],
    salt: &[u8],
    info: &[u8],
    output_len: usize,
) -> Result<Zeroizing<Vec<u8>>> {
    let hk = Hkdf::<Sha256>::new(Some(salt), ikm);

    let mut okm = Zeroizing::new(vec![0u8; output_len]);
    hk.expand(info, &mut okm)
        .map_err(|_| Error::KeyDerivation("HKDF-SHA256 expansion failed".into()))?;

    Ok(okm)
}

/// HKDF-SHA512 key derivation per RFC 5869.
pub fn hkdf_sha512(
    ikm: &[u8],
    salt: &[u8],
    info: &[u8],
    output_len: usize,
) -> Result<Zeroizing<Vec<u8>>> {
    let hk = Hkdf::<Sha512>::new(Some(salt), ikm);

    let mut okm = Zeroizing::new(vec![0u8; output_len]);
    hk.expand(info, &mut okm)
        .map_err(|_| Error::KeyDerivation("HKDF-SHA512 expansion failed".into()))?;

    Ok(okm)
}

/// ANSI X9.63 KDF with SHA-256.
///
/// `K = SHA-256(Z || counter || SharedInfo)` for a big-endian 32-bit counter
/// starting at 1, concatenated and truncated to `output_len`.
pub fn x963_kdf_sha256(
    shared_secret: &[u8],
    shared_info: &[u8],
    output_len: usize,
) -> Result<Zeroizing<Vec<u8>>> {
    x963_kdf::<Sha256>(shared_secret, shared_info, output_len)
}

/// X9.63 counter KDF with SM3 (GB/T 32918.4 §5.4.3).
pub fn x963_kdf_sm3(
    shared_secret: &[u8],
    shared_info: &[u8],
    output_len: usize,
) -> Result<Zeroizing<Vec<u8>>> {
    x963_kdf::<Sm3>(shared_secret, shared_info, output_len)
}

fn x963_kdf<D: Digest>(
    shared_secret: &[u8],
    shared_info: &[u8],
    output_len: usize,
) -> Result<Zeroizing<Vec<u8>>> {
    if output_len == 0 || output_len > 255 * <D as Digest>::output_size() {
        return Err(Error::KeyDerivation(format!(
            "X9.63 output length {} out of range",
            output_len
        )));
    }

    let mut okm = Zeroizing::new(Vec::with_capacity(output_len));
    let mut counter: u32 = 1;
    while okm.len() < output_len {
        let mut hasher = D::new();
        hasher.update(shared_secret);
        hasher.update(counter.to_be_bytes());
        hasher.update(shared_info);
        let block = hasher.finalize();

        let take = (output_len - okm.len()).min(block.len());
        okm.extend_from_slice(&block[..take]);
        counter += 1;
    }

    Ok(okm)
}
