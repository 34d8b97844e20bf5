//! Key-agreement handshake engine.
//!
//! This crate drives two parties to the same secret over one of several
//! handshake categories:
//! - Agreement specs and the capability table of supported combinations
//! - Handshake messages and their wire envelope
//! - Initiator and Responder state machines
//! - Key confirmation over the handshake transcript
//! - Secret derivation and the move-only secret buffer
//!
//! All cryptography is delegated to `accord-crypto` through a
//! [`ProviderRegistry`]. The engine performs no I/O: callers carry the
//! serialized messages between the two sides.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod capability;
pub mod confirm;
pub mod engine;
pub mod error;
pub mod message;
pub mod registry;
pub mod sdf;
pub mod secret;
pub mod spec;
pub mod transcript;

pub use capability::{AgreementRule, Capability};
pub use engine::{Credentials, Initiator, Phase, Responder, Role};
pub use error::{Error, Result};
pub use message::{
    ClientConfirm, ClientHello, ClientHelloBody, ConfirmationTag, HandshakeMessage, ServerHello,
    ServerHelloBody,
};
pub use registry::ProviderRegistry;
pub use secret::SecretBuffer;
pub use spec::{AgreementSpec, AgreementSpecBuilder, Category, Confirmation, DerivationConfig, Kdf};
