//! Key exchange implementations.
//!
//! Implements:
//! - FFDHE-2048 / FFDHE-3072 (RFC 7919), including the MQV2 combiner
//! - ECDH-P256 (NIST SP 800-56A), including the ECMQV combiner
//! - SM2 ECDH and SM2 key exchange (GB/T 32918.3)
//! - X25519 and X448 (RFC 7748)
//! - ML-KEM-512 / 768 / 1024 (FIPS 203)
//! - LightSaber / Saber / FireSaber (NIST round 3)

pub mod ecdh_p256;
pub mod ffdh;
pub mod ml_kem;
pub mod saber;
pub mod sm2;
pub mod x25519;
pub mod x448;

pub use self::ecdh_p256::EcdhP256KeyPair;
pub use self::ffdh::{FfdhGroup, FfdhKeyPair};
pub use self::ml_kem::{MlKem1024KeyPair, MlKem512KeyPair, MlKem768KeyPair};
pub use self::saber::{FireSaberKeyPair, LightSaberKeyPair, SaberKeyPair};
pub use self::sm2::Sm2KeyPair;
pub use self::x25519::X25519KeyPair;
pub use self::x448::X448KeyPair;
