//! Agreement engine: the Initiator and Responder state machines.
//!
//! One engine runs one handshake. Both sides are generic over the algorithm
//! family; the capability entry for the spec decides which keys are used and
//! whether a reply is expected. Every error except [`Error::InvalidState`]
//! moves the engine to [`Phase::Failed`] and drops its key material.

mod initiator;
mod responder;

pub use initiator::Initiator;
pub use responder::Responder;

use crate::{Error, Result};
use accord_crypto::{
    AlgorithmFamily, KeyCodec, KeyPair, PrimitiveProvider, PublicKey, SigningKeyPair,
    VerifyingKey,
};

/// Prefix of every signed-hello payload.
pub const SIGNED_HELLO_LABEL: &[u8] = b"accord signed hello";

pub use accord_crypto::Role;

/// Externally visible engine phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing sent or received yet.
    Init,
    /// Initiator waiting for the `ServerHello`.
    HelloSent,
    /// Responder waiting for the `ClientConfirm`.
    AwaitingConfirm,
    /// Secret computed and not yet taken.
    SecretReady,
    /// Secret taken.
    Consumed,
    /// Handshake aborted.
    Failed,
}

/// Key material lent to an engine for one handshake.
///
/// Which fields are needed depends on the category:
///
/// | category | initiator | responder |
/// |---|---|---|
/// | Anonymous, KEM encapsulation | `peer_static_key` (or the `create_hello` argument) | `static_key_pair` (or the `accept_hello` argument) |
/// | Basic, Unified, MQV | `static_key_pair` and the responder static key | own static key pair and `peer_static_key` |
/// | Signed | `signing_key`, `peer_verifying_key` | `signing_key`, `peer_verifying_key` |
#[derive(Debug, Clone, Copy, Default)]
pub struct Credentials<'k> {
    /// Own static key pair.
    pub static_key_pair: Option<&'k KeyPair>,
    /// Peer static public key.
    pub peer_static_key: Option<&'k PublicKey>,
    /// Own signing key pair (Signed category).
    pub signing_key: Option<&'k SigningKeyPair>,
    /// Peer verifying key (Signed category).
    pub peer_verifying_key: Option<&'k VerifyingKey>,
}

impl<'k> Credentials<'k> {
    /// No credentials.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the own static key pair.
    pub fn with_static_key_pair(mut self, key_pair: &'k KeyPair) -> Self {
        self.static_key_pair = Some(key_pair);
        self
    }

    /// Set the peer static public key.
    pub fn with_peer_static_key(mut self, key: &'k PublicKey) -> Self {
        self.peer_static_key = Some(key);
        self
    }

    /// Set the own signing key pair.
    pub fn with_signing_key(mut self, key: &'k SigningKeyPair) -> Self {
        self.signing_key = Some(key);
        self
    }

    /// Set the peer verifying key.
    pub fn with_peer_verifying_key(mut self, key: &'k VerifyingKey) -> Self {
        self.peer_verifying_key = Some(key);
        self
    }

    fn check_families(&self, family: AlgorithmFamily) -> Result<()> {
        if let Some(pair) = self.static_key_pair {
            check_family(family, pair.family())?;
        }
        if let Some(key) = self.peer_static_key {
            check_family(family, key.family())?;
        }
        Ok(())
    }
}

/// Bytes covered by a hello signature:
/// `"accord signed hello" || role || family (u16 LE) || ephemeral public key`.
pub fn signed_payload(role: Role, family: AlgorithmFamily, ephemeral_public_key: &[u8]) -> Vec<u8> {
    let mut payload =
        Vec::with_capacity(SIGNED_HELLO_LABEL.len() + 3 + ephemeral_public_key.len());
    payload.extend_from_slice(SIGNED_HELLO_LABEL);
    payload.push(role.to_u8());
    payload.extend_from_slice(&family.to_u16().to_le_bytes());
    payload.extend_from_slice(ephemeral_public_key);
    payload
}

fn check_family(expected: AlgorithmFamily, actual: AlgorithmFamily) -> Result<()> {
    if expected != actual {
        return Err(Error::KeyPairSpecMismatch { expected, actual });
    }
    Ok(())
}

fn require<T>(value: Option<T>, name: &'static str) -> Result<T> {
    value.ok_or(Error::MissingCredential(name))
}

fn check_message_spec(
    expected: (AlgorithmFamily, crate::Category),
    actual: (AlgorithmFamily, crate::Category),
) -> Result<()> {
    if expected != actual {
        return Err(Error::MalformedMessage(format!(
            "message is for {:?}/{:?}, engine runs {:?}/{:?}",
            actual.0, actual.1, expected.0, expected.1
        )));
    }
    Ok(())
}

fn decode_peer_key(
    codec: &dyn KeyCodec,
    family: AlgorithmFamily,
    bytes: &[u8],
) -> Result<PublicKey> {
    codec
        .decode_public_key(family, bytes)
        .map_err(|e| Error::MalformedKey(e.to_string()))
}

fn verify_hello(
    provider: &dyn PrimitiveProvider,
    key: &VerifyingKey,
    signer: Role,
    ephemeral_public_key: &[u8],
    signature: &[u8],
) -> Result<()> {
    let payload = signed_payload(signer, provider.family(), ephemeral_public_key);
    provider
        .verify(key, &payload, signature)
        .map_err(|_| Error::SignatureInvalid)
}
