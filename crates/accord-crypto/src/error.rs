//! Error types for cryptographic operations.

use crate::family::AlgorithmFamily;
use thiserror::Error;

/// Result type alias for cryptographic operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Cryptographic operation errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Key exchange, combination, encapsulation or decapsulation failed.
    #[error("Key exchange failed: {0}")]
    KeyExchange(String),

    /// Key generation failed.
    #[error("Key generation failed: {0}")]
    KeyGeneration(String),

    /// Key derivation failed.
    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    /// Invalid input length.
    #[error("Invalid input length: expected {expected}, got {actual}")]
    InvalidLength {
        /// Expected length in bytes.
        expected: usize,
        /// Actual length received in bytes.
        actual: usize,
    },

    /// Invalid public key.
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Invalid private key.
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// Signature creation or parsing failed.
    #[error("Signature error: {0}")]
    Signature(String),

    /// Operation not offered by this family's provider.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// A key of one family was handed to another family's provider.
    #[error("Algorithm family mismatch: expected {expected:?}, got {actual:?}")]
    FamilyMismatch {
        /// Family the provider serves.
        expected: AlgorithmFamily,
        /// Family carried by the key.
        actual: AlgorithmFamily,
    },
}
