//! Key confirmation.
//!
//! `K = HKDF-SHA256(raw secret, info = "accord confirmation key")`, then
//! `tag = HMAC-SHA256(K, role label || transcript)`. The responder tag rides
//! on the `ServerHello`; with mutual confirmation the initiator tag rides on
//! the `ClientConfirm`.

use crate::engine::Role;
use crate::message::ConfirmationTag;
use crate::{Error, Result};
use accord_crypto::kdf::hkdf_sha256;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::Zeroizing;

type HmacSha256 = Hmac<Sha256>;

/// HKDF info for the confirmation key.
pub const CONFIRMATION_KEY_INFO: &[u8] = b"accord confirmation key";
/// MAC label for the responder tag.
pub const RESPONDER_LABEL: &[u8] = b"accord responder confirmation";
/// MAC label for the initiator tag.
pub const INITIATOR_LABEL: &[u8] = b"accord initiator confirmation";

/// Confirmation MAC key, zeroed on drop.
pub struct ConfirmationKey {
    key: Zeroizing<Vec<u8>>,
}

impl ConfirmationKey {
    /// Derive the key from the raw agreement output.
    pub fn derive(raw_secret: &[u8]) -> Result<Self> {
        let key = hkdf_sha256(raw_secret, &[], CONFIRMATION_KEY_INFO, 32)?;
        Ok(Self { key })
    }

    /// Tag `transcript` on behalf of `role`.
    pub fn tag(&self, role: Role, transcript: &[u8]) -> Result<ConfirmationTag> {
        let label = match role {
            Role::Initiator => INITIATOR_LABEL,
            Role::Responder => RESPONDER_LABEL,
        };
        let mut mac = <HmacSha256 as Mac>::new_from_slice(&self.key).map_err(|_| {
            accord_crypto::Error::KeyDerivation("invalid confirmation key length".into())
        })?;
        mac.update(label);
        mac.update(transcript);

        let mut tag = [0u8; 32];
        tag.copy_from_slice(&mac.finalize().into_bytes());
        Ok(ConfirmationTag::new(tag))
    }

    /// Recompute `role`'s tag and compare in constant time.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfirmationFailed` on mismatch.
    pub fn verify(&self, role: Role, transcript: &[u8], received: &ConfirmationTag) -> Result<()> {
        let expected = self.tag(role, transcript)?;
        if expected.ct_eq(received) {
            Ok(())
        } else {
            Err(Error::ConfirmationFailed)
        }
    }
}

impl core::fmt::Debug for ConfirmationKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "ConfirmationKey([REDACTED])")
    }
}
