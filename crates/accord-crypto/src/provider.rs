//! Primitive providers: the operations the handshake engine delegates.
//!
//! A provider serves exactly one [`AlgorithmFamily`]. Keys cross the trait
//! boundary in their family encoding ([`KeyPair`], [`PublicKey`]), so a
//! replacement provider (hardware token, FIPS module) can be registered
//! without touching the engine.

use crate::family::AlgorithmFamily;
use crate::keys::{KeyPair, PrivateKey, PublicKey};
use crate::kex::ffdh::FfdhGroup;
use crate::kex::{
    EcdhP256KeyPair, FfdhKeyPair, FireSaberKeyPair, LightSaberKeyPair, MlKem1024KeyPair,
    MlKem512KeyPair, MlKem768KeyPair, SaberKeyPair, Sm2KeyPair, X25519KeyPair, X448KeyPair,
};
use crate::kex::{x25519, x448};
use crate::role::Role;
use crate::sign::{SigningKeyPair, VerifyingKey};
use crate::{Error, Result};
use std::sync::Arc;
use zeroize::Zeroizing;

/// How static and ephemeral agreements are folded into one secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Combiner {
    /// `Z = Z_e || Z_s`: ephemeral-ephemeral then static-static agreement.
    Unified,
    /// Family-specific MQV (FFC MQV2 or ECMQV).
    Mqv,
    /// SM2 key exchange (GB/T 32918.3); the result depends on the role.
    Sm2,
}

/// Cryptographic operations for one algorithm family.
///
/// Every method checks that the keys it receives belong to
/// [`PrimitiveProvider::family`] and fails with `Error::FamilyMismatch`
/// otherwise.
pub trait PrimitiveProvider: Send + Sync {
    /// Family served by this provider.
    fn family(&self) -> AlgorithmFamily;

    /// Generate a fresh key pair.
    fn generate_key_pair(&self) -> Result<KeyPair>;

    /// Rebuild a key pair from its private encoding.
    fn key_pair_from_private(&self, private: &[u8]) -> Result<KeyPair>;

    /// Two-party agreement between an own key pair and a peer public key.
    fn raw_agree(&self, own: &KeyPair, peer: &PublicKey) -> Result<Zeroizing<Vec<u8>>>;

    /// Four-key agreement used by the unified, MQV and SM2 categories.
    ///
    /// The role is the side of the handshake the caller plays. The default
    /// implements [`Combiner::Unified`] on top of
    /// [`PrimitiveProvider::raw_agree`] and rejects every other combiner.
    fn combined_agree(
        &self,
        combiner: Combiner,
        _role: Role,
        own_static: &KeyPair,
        own_ephemeral: &KeyPair,
        peer_static: &PublicKey,
        peer_ephemeral: &PublicKey,
    ) -> Result<Zeroizing<Vec<u8>>> {
        match combiner {
            Combiner::Unified => {
                unified_agree(self, own_static, own_ephemeral, peer_static, peer_ephemeral)
            }
            other => Err(unsupported_combiner(self.family(), other)),
        }
    }

    /// Encapsulate a fresh secret to `peer`, returning `(ciphertext, secret)`.
    fn encapsulate(&self, _peer: &PublicKey) -> Result<(Vec<u8>, Zeroizing<Vec<u8>>)> {
        Err(Error::Unsupported(format!(
            "{:?} does not support encapsulation",
            self.family()
        )))
    }

    /// Recover an encapsulated secret with an own key pair.
    fn decapsulate(&self, _own: &KeyPair, _ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        Err(Error::Unsupported(format!(
            "{:?} does not support decapsulation",
            self.family()
        )))
    }

    /// Sign a handshake payload. Defaults to Ed25519.
    fn sign(&self, signer: &SigningKeyPair, message: &[u8]) -> Result<Vec<u8>> {
        Ok(signer.sign(message))
    }

    /// Verify a handshake payload signature. Defaults to Ed25519.
    fn verify(&self, key: &VerifyingKey, message: &[u8], signature: &[u8]) -> Result<()> {
        key.verify(message, signature)
    }
}

fn ensure_family(expected: AlgorithmFamily, actual: AlgorithmFamily) -> Result<()> {
    if expected != actual {
        return Err(Error::FamilyMismatch { expected, actual });
    }
    Ok(())
}

/// `Z = Z_e || Z_s` from two raw agreements.
fn unified_agree<P: PrimitiveProvider + ?Sized>(
    provider: &P,
    own_static: &KeyPair,
    own_ephemeral: &KeyPair,
    peer_static: &PublicKey,
    peer_ephemeral: &PublicKey,
) -> Result<Zeroizing<Vec<u8>>> {
    let mut combined = provider.raw_agree(own_ephemeral, peer_ephemeral)?;
    combined.extend_from_slice(&provider.raw_agree(own_static, peer_static)?);
    Ok(combined)
}

fn unsupported_combiner(family: AlgorithmFamily, combiner: Combiner) -> Error {
    Error::Unsupported(format!("{:?} does not support the {:?} combiner", family, combiner))
}

fn key_pair(
    family: AlgorithmFamily,
    public: Vec<u8>,
    private: Zeroizing<Vec<u8>>,
) -> Result<KeyPair> {
    KeyPair::from_parts(
        PublicKey::from_encoded(family, public),
        PrivateKey::from_bytes(family, private),
    )
}

/// Finite-field Diffie-Hellman over an RFC 7919 group.
#[derive(Debug, Clone, Copy)]
pub struct FfdhProvider {
    group: FfdhGroup,
}

impl FfdhProvider {
    /// Provider for `group`.
    pub fn new(group: FfdhGroup) -> Self {
        Self { group }
    }

    fn load(&self, pair: &KeyPair) -> Result<FfdhKeyPair> {
        ensure_family(self.family(), pair.family())?;
        FfdhKeyPair::from_private(self.group, pair.private_key().as_bytes())
    }
}

impl PrimitiveProvider for FfdhProvider {
    fn family(&self) -> AlgorithmFamily {
        self.group.family()
    }

    fn generate_key_pair(&self) -> Result<KeyPair> {
        let pair = FfdhKeyPair::generate(self.group)?;
        key_pair(self.family(), pair.public_key().to_vec(), pair.private_bytes())
    }

    fn key_pair_from_private(&self, private: &[u8]) -> Result<KeyPair> {
        let pair = FfdhKeyPair::from_private(self.group, private)?;
        key_pair(self.family(), pair.public_key().to_vec(), pair.private_bytes())
    }

    fn raw_agree(&self, own: &KeyPair, peer: &PublicKey) -> Result<Zeroizing<Vec<u8>>> {
        ensure_family(self.family(), peer.family())?;
        self.load(own)?.exchange(peer.as_bytes())
    }

    fn combined_agree(
        &self,
        combiner: Combiner,
        _role: Role,
        own_static: &KeyPair,
        own_ephemeral: &KeyPair,
        peer_static: &PublicKey,
        peer_ephemeral: &PublicKey,
    ) -> Result<Zeroizing<Vec<u8>>> {
        match combiner {
            Combiner::Mqv => {
                ensure_family(self.family(), peer_static.family())?;
                ensure_family(self.family(), peer_ephemeral.family())?;
                self.load(own_static)?.mqv(
                    &self.load(own_ephemeral)?,
                    peer_static.as_bytes(),
                    peer_ephemeral.as_bytes(),
                )
            }
            Combiner::Unified => {
                unified_agree(self, own_static, own_ephemeral, peer_static, peer_ephemeral)
            }
            other => Err(unsupported_combiner(self.family(), other)),
        }
    }
}

/// ECDH and ECMQV over NIST P-256.
#[derive(Debug, Clone, Copy, Default)]
pub struct EcdhP256Provider;

impl EcdhP256Provider {
    fn load(&self, pair: &KeyPair) -> Result<EcdhP256KeyPair> {
        ensure_family(AlgorithmFamily::EcdhP256, pair.family())?;
        EcdhP256KeyPair::from_private(pair.private_key().as_bytes())
    }
}

impl PrimitiveProvider for EcdhP256Provider {
    fn family(&self) -> AlgorithmFamily {
        AlgorithmFamily::EcdhP256
    }

    fn generate_key_pair(&self) -> Result<KeyPair> {
        let pair = EcdhP256KeyPair::generate()?;
        key_pair(self.family(), pair.public_key().to_vec(), pair.private_bytes())
    }

    fn key_pair_from_private(&self, private: &[u8]) -> Result<KeyPair> {
        let pair = EcdhP256KeyPair::from_private(private)?;
        key_pair(self.family(), pair.public_key().to_vec(), pair.private_bytes())
    }

    fn raw_agree(&self, own: &KeyPair, peer: &PublicKey) -> Result<Zeroizing<Vec<u8>>> {
        ensure_family(self.family(), peer.family())?;
        let shared = self.load(own)?.exchange(peer.as_bytes())?;
        Ok(Zeroizing::new(shared.to_vec()))
    }

    fn combined_agree(
        &self,
        combiner: Combiner,
        _role: Role,
        own_static: &KeyPair,
        own_ephemeral: &KeyPair,
        peer_static: &PublicKey,
        peer_ephemeral: &PublicKey,
    ) -> Result<Zeroizing<Vec<u8>>> {
        match combiner {
            Combiner::Mqv => {
                ensure_family(self.family(), peer_static.family())?;
                ensure_family(self.family(), peer_ephemeral.family())?;
                let shared = self.load(own_static)?.mqv(
                    &self.load(own_ephemeral)?,
                    peer_static.as_bytes(),
                    peer_ephemeral.as_bytes(),
                )?;
                Ok(Zeroizing::new(shared.to_vec()))
            }
            Combiner::Unified => {
                unified_agree(self, own_static, own_ephemeral, peer_static, peer_ephemeral)
            }
            other => Err(unsupported_combiner(self.family(), other)),
        }
    }
}

/// ECDH and SM2 key exchange over the SM2 curve.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sm2Provider;

impl Sm2Provider {
    fn load(&self, pair: &KeyPair) -> Result<Sm2KeyPair> {
        ensure_family(AlgorithmFamily::Sm2, pair.family())?;
        Sm2KeyPair::from_private(pair.private_key().as_bytes())
    }
}

impl PrimitiveProvider for Sm2Provider {
    fn family(&self) -> AlgorithmFamily {
        AlgorithmFamily::Sm2
    }

    fn generate_key_pair(&self) -> Result<KeyPair> {
        let pair = Sm2KeyPair::generate()?;
        key_pair(self.family(), pair.public_key().to_vec(), pair.private_bytes())
    }

    fn key_pair_from_private(&self, private: &[u8]) -> Result<KeyPair> {
        let pair = Sm2KeyPair::from_private(private)?;
        key_pair(self.family(), pair.public_key().to_vec(), pair.private_bytes())
    }

    fn raw_agree(&self, own: &KeyPair, peer: &PublicKey) -> Result<Zeroizing<Vec<u8>>> {
        ensure_family(self.family(), peer.family())?;
        let shared = self.load(own)?.exchange(peer.as_bytes())?;
        Ok(Zeroizing::new(shared.to_vec()))
    }

    fn combined_agree(
        &self,
        combiner: Combiner,
        role: Role,
        own_static: &KeyPair,
        own_ephemeral: &KeyPair,
        peer_static: &PublicKey,
        peer_ephemeral: &PublicKey,
    ) -> Result<Zeroizing<Vec<u8>>> {
        match combiner {
            Combiner::Sm2 => {
                ensure_family(self.family(), peer_static.family())?;
                ensure_family(self.family(), peer_ephemeral.family())?;
                let shared = self.load(own_static)?.key_exchange(
                    &self.load(own_ephemeral)?,
                    peer_static.as_bytes(),
                    peer_ephemeral.as_bytes(),
                    role,
                )?;
                Ok(Zeroizing::new(shared.to_vec()))
            }
            Combiner::Unified => {
                unified_agree(self, own_static, own_ephemeral, peer_static, peer_ephemeral)
            }
            other => Err(unsupported_combiner(self.family(), other)),
        }
    }
}

/// X25519 (RFC 7748). Uses the default unified combiner.
#[derive(Debug, Clone, Copy, Default)]
pub struct X25519Provider;

impl PrimitiveProvider for X25519Provider {
    fn family(&self) -> AlgorithmFamily {
        AlgorithmFamily::X25519
    }

    fn generate_key_pair(&self) -> Result<KeyPair> {
        let pair = X25519KeyPair::generate()?;
        key_pair(
            self.family(),
            pair.public_key().to_vec(),
            Zeroizing::new(pair.private_bytes().to_vec()),
        )
    }

    fn key_pair_from_private(&self, private: &[u8]) -> Result<KeyPair> {
        let pair = X25519KeyPair::from_private_slice(private)?;
        key_pair(
            self.family(),
            pair.public_key().to_vec(),
            Zeroizing::new(pair.private_bytes().to_vec()),
        )
    }

    fn raw_agree(&self, own: &KeyPair, peer: &PublicKey) -> Result<Zeroizing<Vec<u8>>> {
        ensure_family(self.family(), own.family())?;
        ensure_family(self.family(), peer.family())?;
        let pair = X25519KeyPair::from_private_slice(own.private_key().as_bytes())?;
        let shared = pair.exchange(&x25519::validate_public_key(peer.as_bytes())?)?;
        Ok(Zeroizing::new(shared.to_vec()))
    }
}

/// X448 (RFC 7748). Uses the default unified combiner.
#[derive(Debug, Clone, Copy, Default)]
pub struct X448Provider;

impl PrimitiveProvider for X448Provider {
    fn family(&self) -> AlgorithmFamily {
        AlgorithmFamily::X448
    }

    fn generate_key_pair(&self) -> Result<KeyPair> {
        let pair = X448KeyPair::generate()?;
        key_pair(
            self.family(),
            pair.public_key().to_vec(),
            Zeroizing::new(pair.private_bytes().to_vec()),
        )
    }

    fn key_pair_from_private(&self, private: &[u8]) -> Result<KeyPair> {
        let pair = X448KeyPair::from_private_slice(private)?;
        key_pair(
            self.family(),
            pair.public_key().to_vec(),
            Zeroizing::new(pair.private_bytes().to_vec()),
        )
    }

    fn raw_agree(&self, own: &KeyPair, peer: &PublicKey) -> Result<Zeroizing<Vec<u8>>> {
        ensure_family(self.family(), own.family())?;
        ensure_family(self.family(), peer.family())?;
        let pair = X448KeyPair::from_private_slice(own.private_key().as_bytes())?;
        let shared = pair.exchange(&x448::validate_public_key(peer.as_bytes())?)?;
        Ok(Zeroizing::new(shared.to_vec()))
    }
}

/// ML-KEM encapsulation. Offers no two-party agreement.
#[derive(Debug, Clone, Copy)]
pub struct MlKemProvider {
    family: AlgorithmFamily,
}

impl MlKemProvider {
    /// Provider for an ML-KEM family.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unsupported` if `family` is not an ML-KEM parameter set.
    pub fn new(family: AlgorithmFamily) -> Result<Self> {
        match family {
            AlgorithmFamily::MlKem512 | AlgorithmFamily::MlKem768 | AlgorithmFamily::MlKem1024 => {
                Ok(Self { family })
            }
            other => Err(Error::Unsupported(format!("{:?} is not an ML-KEM family", other))),
        }
    }
}

/// Expands to `$body` with `$pair` bound to the ML-KEM key pair type of `$family`.
macro_rules! with_ml_kem {
    ($family:expr, $pair:ident => $body:expr) => {
        match $family {
            AlgorithmFamily::MlKem512 => {
                type $pair = MlKem512KeyPair;
                $body
            }
            AlgorithmFamily::MlKem768 => {
                type $pair = MlKem768KeyPair;
                $body
            }
            AlgorithmFamily::MlKem1024 => {
                type $pair = MlKem1024KeyPair;
                $body
            }
            other => Err(Error::Unsupported(format!("{:?} is not an ML-KEM family", other))),
        }
    };
}

impl PrimitiveProvider for MlKemProvider {
    fn family(&self) -> AlgorithmFamily {
        self.family
    }

    fn generate_key_pair(&self) -> Result<KeyPair> {
        with_ml_kem!(self.family, Kem => {
            let pair = Kem::generate()?;
            key_pair(
                self.family,
                pair.public_key().to_vec(),
                Zeroizing::new(pair.private_bytes().to_vec()),
            )
        })
    }

    fn key_pair_from_private(&self, private: &[u8]) -> Result<KeyPair> {
        with_ml_kem!(self.family, Kem => {
            let pair = Kem::from_private(private)?;
            key_pair(
                self.family,
                pair.public_key().to_vec(),
                Zeroizing::new(pair.private_bytes().to_vec()),
            )
        })
    }

    fn raw_agree(&self, _own: &KeyPair, _peer: &PublicKey) -> Result<Zeroizing<Vec<u8>>> {
        Err(Error::Unsupported(format!(
            "{:?} is a KEM and has no two-party agreement",
            self.family
        )))
    }

    fn encapsulate(&self, peer: &PublicKey) -> Result<(Vec<u8>, Zeroizing<Vec<u8>>)> {
        ensure_family(self.family, peer.family())?;
        with_ml_kem!(self.family, Kem => {
            let (ciphertext, shared) = Kem::encapsulate(peer.as_bytes())?;
            Ok((ciphertext, Zeroizing::new(shared.to_vec())))
        })
    }

    fn decapsulate(&self, own: &KeyPair, ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        ensure_family(self.family, own.family())?;
        with_ml_kem!(self.family, Kem => {
            let pair = Kem::from_private(own.private_key().as_bytes())?;
            let shared = pair.decapsulate(ciphertext)?;
            Ok(Zeroizing::new(shared.to_vec()))
        })
    }
}

/// SABER encapsulation. Offers no two-party agreement.
#[derive(Debug, Clone, Copy)]
pub struct SaberProvider {
    family: AlgorithmFamily,
}

impl SaberProvider {
    /// Provider for a SABER family.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unsupported` if `family` is not a SABER parameter set.
    pub fn new(family: AlgorithmFamily) -> Result<Self> {
        match family {
            AlgorithmFamily::LightSaber | AlgorithmFamily::Saber | AlgorithmFamily::FireSaber => {
                Ok(Self { family })
            }
            other => Err(Error::Unsupported(format!("{:?} is not a SABER family", other))),
        }
    }
}

/// Expands to `$body` with `$pair` bound to the SABER key pair type of `$family`.
macro_rules! with_saber {
    ($family:expr, $pair:ident => $body:expr) => {
        match $family {
            AlgorithmFamily::LightSaber => {
                type $pair = LightSaberKeyPair;
                $body
            }
            AlgorithmFamily::Saber => {
                type $pair = SaberKeyPair;
                $body
            }
            AlgorithmFamily::FireSaber => {
                type $pair = FireSaberKeyPair;
                $body
            }
            other => Err(Error::Unsupported(format!("{:?} is not a SABER family", other))),
        }
    };
}

impl PrimitiveProvider for SaberProvider {
    fn family(&self) -> AlgorithmFamily {
        self.family
    }

    fn generate_key_pair(&self) -> Result<KeyPair> {
        with_saber!(self.family, Kem => {
            let pair = Kem::generate()?;
            key_pair(
                self.family,
                pair.public_key().to_vec(),
                Zeroizing::new(pair.private_bytes().to_vec()),
            )
        })
    }

    fn key_pair_from_private(&self, private: &[u8]) -> Result<KeyPair> {
        with_saber!(self.family, Kem => {
            let pair = Kem::from_private(private)?;
            key_pair(
                self.family,
                pair.public_key().to_vec(),
                Zeroizing::new(pair.private_bytes().to_vec()),
            )
        })
    }

    fn raw_agree(&self, _own: &KeyPair, _peer: &PublicKey) -> Result<Zeroizing<Vec<u8>>> {
        Err(Error::Unsupported(format!(
            "{:?} is a KEM and has no two-party agreement",
            self.family
        )))
    }

    fn encapsulate(&self, peer: &PublicKey) -> Result<(Vec<u8>, Zeroizing<Vec<u8>>)> {
        ensure_family(self.family, peer.family())?;
        with_saber!(self.family, Kem => {
            let (ciphertext, shared) = Kem::encapsulate(peer.as_bytes())?;
            Ok((ciphertext, Zeroizing::new(shared.to_vec())))
        })
    }

    fn decapsulate(&self, own: &KeyPair, ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        ensure_family(self.family, own.family())?;
        with_saber!(self.family, Kem => {
            let pair = Kem::from_private(own.private_key().as_bytes())?;
            let shared = pair.decapsulate(ciphertext)?;
            Ok(Zeroizing::new(shared.to_vec()))
        })
    }
}

/// Built-in provider for `family`.
pub fn native_provider(family: AlgorithmFamily) -> Arc<dyn PrimitiveProvider> {
    match family {
        AlgorithmFamily::Ffdhe2048 => Arc::new(FfdhProvider::new(FfdhGroup::Ffdhe2048)),
        AlgorithmFamily::Ffdhe3072 => Arc::new(FfdhProvider::new(FfdhGroup::Ffdhe3072)),
        AlgorithmFamily::EcdhP256 => Arc::new(EcdhP256Provider),
        AlgorithmFamily::Sm2 => Arc::new(Sm2Provider),
        AlgorithmFamily::X25519 => Arc::new(X25519Provider),
        AlgorithmFamily::X448 => Arc::new(X448Provider),
        AlgorithmFamily::MlKem512 | AlgorithmFamily::MlKem768 | AlgorithmFamily::MlKem1024 => {
            Arc::new(MlKemProvider { family })
        }
        AlgorithmFamily::LightSaber | AlgorithmFamily::Saber | AlgorithmFamily::FireSaber => {
            Arc::new(SaberProvider { family })
        }
    }
}
