//! The agreed secret handed to the caller.

use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

/// Agreed secret bytes.
///
/// Move-only: there is no `Clone`, and the bytes are zeroed when the buffer
/// is dropped. `Debug` never shows the contents and equality is constant-time.
pub struct SecretBuffer {
    bytes: Zeroizing<Vec<u8>>,
}

impl SecretBuffer {
    pub(crate) fn new(bytes: Zeroizing<Vec<u8>>) -> Self {
        Self { bytes }
    }

    /// Secret bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True if the secret is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Constant-time comparison.
    pub fn ct_eq(&self, other: &SecretBuffer) -> bool {
        self.bytes.len() == other.bytes.len()
            && bool::from(self.bytes.as_slice().ct_eq(other.bytes.as_slice()))
    }

    /// Take ownership of the bytes, still zeroed on drop.
    pub fn into_bytes(self) -> Zeroizing<Vec<u8>> {
        self.bytes
    }
}

impl PartialEq for SecretBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other)
    }
}

impl Eq for SecretBuffer {}

impl core::fmt::Debug for SecretBuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "SecretBuffer({} bytes, [REDACTED])", self.bytes.len())
    }
}
