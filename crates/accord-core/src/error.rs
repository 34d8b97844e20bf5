//! Error types for handshake operations.

use accord_crypto::AlgorithmFamily;
use thiserror::Error;

/// Result type alias for handshake operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Handshake errors.
///
/// Every error except [`Error::InvalidState`] aborts the handshake: the
/// engine moves to `Phase::Failed` and discards its secret material.
#[derive(Debug, Error)]
pub enum Error {
    /// A supplied key does not belong to the spec's algorithm family.
    #[error("Key pair does not match spec: expected {expected:?}, got {actual:?}")]
    KeyPairSpecMismatch {
        /// Family named by the spec.
        expected: AlgorithmFamily,
        /// Family of the supplied key.
        actual: AlgorithmFamily,
    },

    /// A public key received from the peer failed decoding or validation.
    #[error("Malformed key: {0}")]
    MalformedKey(String),

    /// A handshake message is structurally invalid or does not fit the spec.
    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    /// A peer signature did not verify.
    #[error("Signature verification failed")]
    SignatureInvalid,

    /// A confirmation tag did not match.
    #[error("Key confirmation failed")]
    ConfirmationFailed,

    /// The primitive provider reported an error.
    #[error("Primitive failure: {0}")]
    PrimitiveFailure(#[from] accord_crypto::Error),

    /// The secret was already taken from this engine.
    #[error("Secret already consumed")]
    SecretAlreadyConsumed,

    /// The handshake failed, so no secret exists.
    #[error("Secret unavailable: handshake failed")]
    SecretUnavailable,

    /// Operation called in the wrong phase.
    #[error("Invalid state transition")]
    InvalidState,

    /// The agreement spec is not a supported combination.
    #[error("Invalid agreement spec: {0}")]
    InvalidSpec(String),

    /// A credential the category needs was not supplied.
    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),
}
