//! Agreement specs: which family, which category, and what happens to the
//! raw agreement output.

use crate::capability::{self, Capability};
use crate::{Error, Result};
use accord_crypto::kdf::{HKDF_SHA256_MAX_LEN, HKDF_SHA512_MAX_LEN, X963_SHA256_MAX_LEN};
use accord_crypto::AlgorithmFamily;

/// Handshake categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Category {
    /// One-pass: initiator ephemeral (or KEM encapsulation) against the
    /// responder's static key. Only the responder is authenticated.
    Anonymous = 0x01,
    /// Two-pass static-static agreement.
    Basic = 0x02,
    /// Two-pass ephemeral-ephemeral agreement authenticated by signatures.
    Signed = 0x03,
    /// Two-pass: ephemeral and static agreements concatenated.
    Unified = 0x04,
    /// Two-pass MQV; the SM2 family runs SM2 key exchange instead.
    Mqv = 0x05,
    /// One-pass KEM encapsulation to the responder's static key.
    KemEncapsulation = 0x06,
}

impl Category {
    /// Every category, in wire-identifier order.
    pub const ALL: [Category; 6] = [
        Self::Anonymous,
        Self::Basic,
        Self::Signed,
        Self::Unified,
        Self::Mqv,
        Self::KemEncapsulation,
    ];

    /// Convert from wire format (u8).
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(Self::Anonymous),
            0x02 => Some(Self::Basic),
            0x03 => Some(Self::Signed),
            0x04 => Some(Self::Unified),
            0x05 => Some(Self::Mqv),
            0x06 => Some(Self::KemEncapsulation),
            _ => None,
        }
    }

    /// Convert to wire format (u8).
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// True if the responder replies with a `ServerHello`.
    pub fn is_two_pass(&self) -> bool {
        matches!(self, Self::Basic | Self::Signed | Self::Unified | Self::Mqv)
    }
}

/// Key confirmation requested by a spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Confirmation {
    /// No confirmation.
    #[default]
    None,
    /// The responder attaches a tag to its `ServerHello`.
    Responder,
    /// Responder tag plus an initiator tag in a `ClientConfirm`.
    Mutual,
}

/// Key derivation function applied to the raw agreement output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Kdf {
    /// HKDF with SHA-256 (RFC 5869).
    #[default]
    HkdfSha256,
    /// HKDF with SHA-512 (RFC 5869).
    HkdfSha512,
    /// ANSI X9.63 KDF with SHA-256.
    X963Sha256,
}

impl Kdf {
    /// Largest output length this function can produce.
    pub fn max_output_len(&self) -> usize {
        match self {
            Self::HkdfSha256 => HKDF_SHA256_MAX_LEN,
            Self::HkdfSha512 => HKDF_SHA512_MAX_LEN,
            Self::X963Sha256 => X963_SHA256_MAX_LEN,
        }
    }
}

/// Default derivation label.
pub const DEFAULT_LABEL: &[u8] = b"accord session secret";

/// Secret derivation parameters.
///
/// The KDF info (HKDF) or SharedInfo (X9.63) is `label || 0x00 || context`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivationConfig {
    /// Key derivation function.
    pub kdf: Kdf,
    /// Salt (HKDF only; ignored by X9.63).
    pub salt: Vec<u8>,
    /// Purpose label.
    pub label: Vec<u8>,
    /// Application context, for example a session identifier.
    pub context: Vec<u8>,
    /// Output length in bytes.
    pub output_len: usize,
}

impl Default for DerivationConfig {
    fn default() -> Self {
        Self {
            kdf: Kdf::HkdfSha256,
            salt: Vec::new(),
            label: DEFAULT_LABEL.to_vec(),
            context: Vec::new(),
            output_len: 32,
        }
    }
}

impl DerivationConfig {
    /// Config with the default label and no salt or context.
    pub fn new(kdf: Kdf, output_len: usize) -> Self {
        Self {
            kdf,
            output_len,
            ..Self::default()
        }
    }

    /// Set the salt.
    pub fn with_salt(mut self, salt: impl Into<Vec<u8>>) -> Self {
        self.salt = salt.into();
        self
    }

    /// Set the label.
    pub fn with_label(mut self, label: impl Into<Vec<u8>>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the context.
    pub fn with_context(mut self, context: impl Into<Vec<u8>>) -> Self {
        self.context = context.into();
        self
    }

    /// `label || 0x00 || context`.
    pub fn info(&self) -> Vec<u8> {
        let mut info = Vec::with_capacity(self.label.len() + 1 + self.context.len());
        info.extend_from_slice(&self.label);
        info.push(0x00);
        info.extend_from_slice(&self.context);
        info
    }

    fn validate(&self) -> Result<()> {
        let max = self.kdf.max_output_len();
        if self.output_len == 0 || self.output_len > max {
            return Err(Error::InvalidSpec(format!(
                "output length {} outside 1..={} for {:?}",
                self.output_len, max, self.kdf
            )));
        }
        Ok(())
    }
}

/// Immutable description of one kind of handshake.
///
/// # Example
///
/// ```
/// use accord_core::{AgreementSpec, Category, Confirmation};
/// use accord_crypto::AlgorithmFamily;
///
/// let spec = AgreementSpec::builder(AlgorithmFamily::EcdhP256, Category::Basic)
///     .confirmation(Confirmation::Mutual)
///     .build()
///     .unwrap();
/// assert!(spec.confirm_requested());
///
/// // X25519 has no MQV combiner.
/// assert!(AgreementSpec::builder(AlgorithmFamily::X25519, Category::Mqv).build().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgreementSpec {
    family: AlgorithmFamily,
    category: Category,
    confirmation: Confirmation,
    derivation: Option<DerivationConfig>,
}

impl AgreementSpec {
    /// Start building a spec.
    pub fn builder(family: AlgorithmFamily, category: Category) -> AgreementSpecBuilder {
        AgreementSpecBuilder {
            family,
            category,
            confirmation: Confirmation::None,
            derivation: None,
        }
    }

    /// Shorthand for a spec without confirmation or derivation.
    pub fn new(family: AlgorithmFamily, category: Category) -> Result<Self> {
        Self::builder(family, category).build()
    }

    /// Algorithm family.
    pub fn family(&self) -> AlgorithmFamily {
        self.family
    }

    /// Handshake category.
    pub fn category(&self) -> Category {
        self.category
    }

    /// Requested confirmation.
    pub fn confirmation(&self) -> Confirmation {
        self.confirmation
    }

    /// True if any key confirmation is requested.
    pub fn confirm_requested(&self) -> bool {
        self.confirmation != Confirmation::None
    }

    /// Derivation applied to the raw agreement, if any.
    pub fn derivation(&self) -> Option<&DerivationConfig> {
        self.derivation.as_ref()
    }

    /// Capability entry for this spec's family kind and category.
    pub fn capability(&self) -> Result<&'static Capability> {
        capability::lookup(self.family.kind(), self.category).ok_or_else(|| {
            Error::InvalidSpec(format!(
                "{:?} does not support the {:?} category",
                self.family, self.category
            ))
        })
    }
}

/// Builder for [`AgreementSpec`].
#[derive(Debug, Clone)]
pub struct AgreementSpecBuilder {
    family: AlgorithmFamily,
    category: Category,
    confirmation: Confirmation,
    derivation: Option<DerivationConfig>,
}

impl AgreementSpecBuilder {
    /// Request key confirmation.
    pub fn confirmation(mut self, confirmation: Confirmation) -> Self {
        self.confirmation = confirmation;
        self
    }

    /// Derive the final secret from the raw agreement.
    pub fn derivation(mut self, derivation: DerivationConfig) -> Self {
        self.derivation = Some(derivation);
        self
    }

    /// Validate and build.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidSpec` if the family does not support the
    /// category, confirmation is requested for a one-pass category, or the
    /// derivation output length is out of range.
    pub fn build(self) -> Result<AgreementSpec> {
        let spec = AgreementSpec {
            family: self.family,
            category: self.category,
            confirmation: self.confirmation,
            derivation: self.derivation,
        };

        let capability = spec.capability()?;
        if spec.confirm_requested() && !capability.two_pass {
            return Err(Error::InvalidSpec(format!(
                "confirmation requires a two-pass category, {:?} is one-pass",
                spec.category
            )));
        }
        if let Some(derivation) = &spec.derivation {
            derivation.validate()?;
        }
        Ok(spec)
    }
}
