//! Secret derivation: turns the raw agreement output into the final secret.

use crate::secret::SecretBuffer;
use crate::spec::{DerivationConfig, Kdf};
use crate::Result;
use accord_crypto::kdf::{hkdf_sha256, hkdf_sha512, x963_kdf_sha256};
use zeroize::Zeroizing;

/// Derive the final secret from `raw` as described by `config`.
///
/// Deterministic: equal inputs give equal outputs.
pub fn derive(config: &DerivationConfig, raw: &[u8]) -> Result<SecretBuffer> {
    let info = config.info();
    let okm = match config.kdf {
        Kdf::HkdfSha256 => hkdf_sha256(raw, &config.salt, &info, config.output_len)?,
        Kdf::HkdfSha512 => hkdf_sha512(raw, &config.salt, &info, config.output_len)?,
        Kdf::X963Sha256 => x963_kdf_sha256(raw, &info, config.output_len)?,
    };
    Ok(SecretBuffer::new(okm))
}

/// Final secret for a handshake: derived when a config is present, the raw
/// agreement otherwise.
pub(crate) fn finalize(
    config: Option<&DerivationConfig>,
    raw: Zeroizing<Vec<u8>>,
) -> Result<SecretBuffer> {
    match config {
        Some(config) => derive(config, &raw),
        None => Ok(SecretBuffer::new(raw)),
    }
}
