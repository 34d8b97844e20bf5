//! accord: a key-agreement handshake engine.
//!
//! Two parties agree on a shared secret over one of several handshake
//! categories (anonymous, basic, signed, unified, MQV, KEM encapsulation)
//! with finite-field DH, P-256, SM2, X25519, X448, ML-KEM or SABER.
//!
//! - [`accord_core`] holds the engine, messages and agreement specs.
//! - [`accord_crypto`] holds the primitive providers and key codecs.
//!
//! # Example
//!
//! ```
//! use accord::{AgreementSpec, AlgorithmFamily, Category, Credentials, Initiator, KeyPair, Responder};
//!
//! let spec = AgreementSpec::new(AlgorithmFamily::EcdhP256, Category::Basic).unwrap();
//! let alice = KeyPair::generate(AlgorithmFamily::EcdhP256).unwrap();
//! let bob = KeyPair::generate(AlgorithmFamily::EcdhP256).unwrap();
//!
//! let mut initiator =
//!     Initiator::new(spec.clone(), Credentials::new().with_static_key_pair(&alice)).unwrap();
//! let mut responder =
//!     Responder::new(spec, Credentials::new().with_peer_static_key(alice.public_key())).unwrap();
//!
//! let hello = initiator.create_hello(Some(bob.public_key())).unwrap();
//! let reply = responder.accept_hello(Some(&bob), hello).unwrap().unwrap();
//! initiator.accept_reply(reply).unwrap();
//!
//! assert_eq!(initiator.take_secret().unwrap(), responder.take_secret().unwrap());
//! ```

#![forbid(unsafe_code)]

pub use accord_core;
pub use accord_crypto;

pub use accord_core::{
    AgreementSpec, Category, ClientConfirm, ClientHello, Confirmation, Credentials,
    DerivationConfig, Error, HandshakeMessage, Initiator, Kdf, Phase, ProviderRegistry, Responder,
    Result, SecretBuffer, ServerHello,
};
pub use accord_crypto::{AlgorithmFamily, KeyPair, PublicKey, SigningKeyPair, VerifyingKey};
