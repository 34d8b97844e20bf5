//! Algorithm families understood by the agreement engine.

/// Algorithm families with their wire identifiers.
///
/// The high byte of the identifier groups families by kind, the low byte
/// selects the parameter set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum AlgorithmFamily {
    /// Finite-field Diffie-Hellman over the RFC 7919 ffdhe2048 group.
    Ffdhe2048 = 0x0101,
    /// Finite-field Diffie-Hellman over the RFC 7919 ffdhe3072 group.
    Ffdhe3072 = 0x0102,
    /// Elliptic-curve Diffie-Hellman over NIST P-256.
    EcdhP256 = 0x0201,
    /// SM2 curve with the GB/T 32918.3 key exchange.
    Sm2 = 0x0202,
    /// X25519 (RFC 7748).
    X25519 = 0x0301,
    /// X448 (RFC 7748).
    X448 = 0x0302,
    /// ML-KEM-512 (FIPS 203, security category 1).
    MlKem512 = 0x0401,
    /// ML-KEM-768 (FIPS 203, security category 3).
    MlKem768 = 0x0402,
    /// ML-KEM-1024 (FIPS 203, security category 5).
    MlKem1024 = 0x0403,
    /// LightSaber (security category 1).
    LightSaber = 0x0404,
    /// Saber (security category 3).
    Saber = 0x0405,
    /// FireSaber (security category 5).
    FireSaber = 0x0406,
}

/// Coarse grouping of families that share handshake capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FamilyKind {
    /// Finite-field Diffie-Hellman.
    Dh,
    /// Weierstrass-curve Diffie-Hellman.
    Ec,
    /// SM2, whose authenticated exchange depends on the party's role.
    Sm2,
    /// Montgomery-curve Diffie-Hellman (RFC 7748).
    Xdh,
    /// Key encapsulation mechanism.
    Kem,
}

impl AlgorithmFamily {
    /// Every family, in wire-identifier order.
    pub const ALL: [AlgorithmFamily; 12] = [
        Self::Ffdhe2048,
        Self::Ffdhe3072,
        Self::EcdhP256,
        Self::Sm2,
        Self::X25519,
        Self::X448,
        Self::MlKem512,
        Self::MlKem768,
        Self::MlKem1024,
        Self::LightSaber,
        Self::Saber,
        Self::FireSaber,
    ];

    /// Convert from wire format (u16).
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            0x0101 => Some(Self::Ffdhe2048),
            0x0102 => Some(Self::Ffdhe3072),
            0x0201 => Some(Self::EcdhP256),
            0x0202 => Some(Self::Sm2),
            0x0301 => Some(Self::X25519),
            0x0302 => Some(Self::X448),
            0x0401 => Some(Self::MlKem512),
            0x0402 => Some(Self::MlKem768),
            0x0403 => Some(Self::MlKem1024),
            0x0404 => Some(Self::LightSaber),
            0x0405 => Some(Self::Saber),
            0x0406 => Some(Self::FireSaber),
            _ => None,
        }
    }

    /// Convert to wire format (u16).
    pub fn to_u16(self) -> u16 {
        self as u16
    }

    /// Kind of this family.
    pub fn kind(&self) -> FamilyKind {
        match self {
            Self::Ffdhe2048 | Self::Ffdhe3072 => FamilyKind::Dh,
            Self::EcdhP256 => FamilyKind::Ec,
            Self::Sm2 => FamilyKind::Sm2,
            Self::X25519 | Self::X448 => FamilyKind::Xdh,
            Self::MlKem512
            | Self::MlKem768
            | Self::MlKem1024
            | Self::LightSaber
            | Self::Saber
            | Self::FireSaber => FamilyKind::Kem,
        }
    }

    /// Check if this family is a post-quantum KEM.
    pub fn is_post_quantum(&self) -> bool {
        self.kind() == FamilyKind::Kem
    }

    /// Length of an encoded public key in bytes.
    ///
    /// For P-256 and SM2 this is the uncompressed SEC1 length produced by the
    /// codec.
    pub fn public_key_len(&self) -> usize {
        match self {
            Self::Ffdhe2048 => 256,
            Self::Ffdhe3072 => 384,
            Self::EcdhP256 | Self::Sm2 => 65,
            Self::X25519 => 32,
            Self::X448 => 56,
            Self::MlKem512 => 800,
            Self::MlKem768 => 1184,
            Self::MlKem1024 => 1568,
            Self::LightSaber => 672,
            Self::Saber => 992,
            Self::FireSaber => 1312,
        }
    }

    /// Length of the raw two-party agreement output in bytes.
    pub fn shared_secret_len(&self) -> usize {
        match self {
            Self::Ffdhe2048 => 256,
            Self::Ffdhe3072 => 384,
            Self::EcdhP256 | Self::Sm2 | Self::X25519 => 32,
            Self::X448 => 56,
            Self::MlKem512
            | Self::MlKem768
            | Self::MlKem1024
            | Self::LightSaber
            | Self::Saber
            | Self::FireSaber => 32,
        }
    }

    /// Length of a KEM ciphertext, if this is a KEM family.
    pub fn ciphertext_len(&self) -> Option<usize> {
        match self {
            Self::MlKem512 => Some(768),
            Self::MlKem768 => Some(1088),
            Self::MlKem1024 => Some(1568),
            Self::LightSaber => Some(736),
            Self::Saber => Some(1088),
            Self::FireSaber => Some(1472),
            _ => None,
        }
    }
}
