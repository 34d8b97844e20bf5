//! Cryptographic primitives for the accord key-agreement engine.
//!
//! This crate supplies everything the handshake engine delegates:
//! - Key exchange wrappers (FFDHE-2048/3072, ECDH-P256, SM2, X25519, X448,
//!   ML-KEM-512/768/1024, LightSaber/Saber/FireSaber)
//! - Primitive providers exposing those wrappers behind one object-safe trait
//! - Key codecs validating peer public keys received from the wire
//! - Key derivation (HKDF-SHA256/512, ANSI X9.63 over SHA-256 and SM3)
//! - Ed25519 signing keys for the signed handshake category
//!
//! Security conventions:
//! - All private keys and shared secrets use `Zeroizing` wrappers
//! - Constant-time comparisons via the `subtle` crate
//! - No logging of key material

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod codec;
pub mod error;
pub mod family;
pub mod kdf;
pub mod keys;
pub mod kex;
pub mod provider;
pub mod role;
pub mod sign;

pub use codec::{KeyCodec, StandardKeyCodec};
pub use error::{Error, Result};
pub use family::{AlgorithmFamily, FamilyKind};
pub use keys::{KeyPair, PrivateKey, PublicKey};
pub use provider::{
    native_provider, Combiner, EcdhP256Provider, FfdhProvider, MlKemProvider, PrimitiveProvider,
    SaberProvider, Sm2Provider, X25519Provider, X448Provider,
};
pub use role::Role;
pub use sign::{SigningKeyPair, VerifyingKey};
