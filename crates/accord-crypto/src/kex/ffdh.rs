//! Finite-field Diffie-Hellman over the RFC 7919 groups, with FFC MQV2.
//!
//! Both groups are safe-prime groups with generator 2, so the prime-order
//! subgroup has order `q = (p - 1) / 2`. Public values and shared secrets
//! are big-endian and left-padded to the byte length of `p`.
//!
//! # Security
//!
//! - Peer public values are range- and subgroup-checked (SP 800-56A §5.6.2.3.1).
//! - A shared secret equal to 1 is rejected.
//! - Every exponentiation by secret data runs in Montgomery form with a
//!   fixed window over a public bit bound: the length of the private key
//!   encoding, or the full width of `q` for the MQV implicit signature.
//! - Private exponents and implicit signatures live in `Zeroizing` buffers.

use crate::family::AlgorithmFamily;
use crate::{Error, Result};
use crypto_bigint::modular::runtime_mod::{DynResidue, DynResidueParams};
use crypto_bigint::{Encoding, Uint, U2048, U3072};
use rand::RngCore;
use std::sync::OnceLock;
use zeroize::Zeroizing;

const FFDHE2048_P: U2048 = U2048::from_be_hex(concat!(
    "FFFFFFFFFFFFFFFFADF85458A2BB4A9AAFDC5620273D3CF1D8B9C583CE2D3695",
    "A9E13641146433FBCC939DCE249B3EF97D2FE363630C75D8F681B202AEC4617A",
    "D3DF1ED5D5FD65612433F51F5F066ED0856365553DED1AF3B557135E7F57C935",
    "984F0C70E0E68B77E2A689DAF3EFE8721DF158A136ADE73530ACCA4F483A797A",
    "BC0AB182B324FB61D108A94BB2C8E3FBB96ADAB760D7F4681D4F42A3DE394DF4",
    "AE56EDE76372BB190B07A7C8EE0A6D709E02FCE1CDF7E2ECC03404CD28342F61",
    "9172FE9CE98583FF8E4F1232EEF28183C3FE3B1B4C6FAD733BB5FCBC2EC22005",
    "C58EF1837D1683B2C6F34A26C1B2EFFA886B423861285C97FFFFFFFFFFFFFFFF",
));
const FFDHE3072_P: U3072 = U3072::from_be_hex(concat!(
    "FFFFFFFFFFFFFFFFADF85458A2BB4A9AAFDC5620273D3CF1D8B9C583CE2D3695",
    "A9E13641146433FBCC939DCE249B3EF97D2FE363630C75D8F681B202AEC4617A",
    "D3DF1ED5D5FD65612433F51F5F066ED0856365553DED1AF3B557135E7F57C935",
    "984F0C70E0E68B77E2A689DAF3EFE8721DF158A136ADE73530ACCA4F483A797A",
    "BC0AB182B324FB61D108A94BB2C8E3FBB96ADAB760D7F4681D4F42A3DE394DF4",
    "AE56EDE76372BB190B07A7C8EE0A6D709E02FCE1CDF7E2ECC03404CD28342F61",
    "9172FE9CE98583FF8E4F1232EEF28183C3FE3B1B4C6FAD733BB5FCBC2EC22005",
    "C58EF1837D1683B2C6F34A26C1B2EFFA886B4238611FCFDCDE355B3B6519035B",
    "BC34F4DEF99C023861B46FC9D6E6C9077AD91D2691F7F7EE598CB0FAC186D91C",
    "AEFE130985139270B4130C93BC437944F4FD4452E2D74DD364F2E21E71F54BFF",
    "5CAE82AB9C9DF69EE86D2BC522363A0DABC521979B0DEADA1DBF9A42D5C4484E",
    "0ABCD06BFA53DDEF3C1B20EE3FD59D7C25E41D2B66C62E37FFFFFFFFFFFFFFFF",
));

/// Length in bytes of a freshly generated private exponent.
const PRIVATE_EXPONENT_LEN: usize = 32;

/// RFC 7919 named groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FfdhGroup {
    /// ffdhe2048.
    Ffdhe2048,
    /// ffdhe3072.
    Ffdhe3072,
}

struct GroupParams<const LIMBS: usize> {
    p_minus_one: Uint<LIMBS>,
    q: Uint<LIMBS>,
    mod_p: DynResidueParams<LIMBS>,
    mod_q: DynResidueParams<LIMBS>,
}

static FFDHE2048: OnceLock<GroupParams<{ U2048::LIMBS }>> = OnceLock::new();
static FFDHE3072: OnceLock<GroupParams<{ U3072::LIMBS }>> = OnceLock::new();

/// Expands to `$body` with `$params` bound to the parameters of `$group`.
macro_rules! with_params {
    ($group:expr, $params:ident => $body:expr) => {
        match $group {
            FfdhGroup::Ffdhe2048 => {
                let $params = FFDHE2048.get_or_init(|| GroupParams::new(&FFDHE2048_P));
                $body
            }
            FfdhGroup::Ffdhe3072 => {
                let $params = FFDHE3072.get_or_init(|| GroupParams::new(&FFDHE3072_P));
                $body
            }
        }
    };
}

impl<const LIMBS: usize> GroupParams<LIMBS>
where
    Uint<LIMBS>: Encoding,
{
    fn new(p: &Uint<LIMBS>) -> Self {
        let p_minus_one = p.wrapping_sub(&Uint::ONE);
        let q = p_minus_one.shr_vartime(1);
        Self {
            p_minus_one,
            q,
            mod_p: DynResidueParams::new(p),
            mod_q: DynResidueParams::new(&q),
        }
    }

    /// `ceil(bits(q) / 2)`. `q` is one bit shorter than `p`, whose top byte is full.
    fn mqv_width() -> usize {
        Uint::<LIMBS>::BITS / 2
    }

    fn decode(bytes: &[u8]) -> Result<Uint<LIMBS>> {
        if bytes.len() != Uint::<LIMBS>::BYTES {
            return Err(Error::InvalidLength {
                expected: Uint::<LIMBS>::BYTES,
                actual: bytes.len(),
            });
        }
        Ok(Uint::from_be_slice(bytes))
    }

    fn encode(value: &Uint<LIMBS>) -> Vec<u8> {
        value.to_be_bytes().as_ref().to_vec()
    }

    /// Full public key validation: `1 < y < p - 1` and `y^q mod p == 1`.
    fn decode_public(&self, bytes: &[u8]) -> Result<Uint<LIMBS>> {
        let y = Self::decode(bytes)?;
        if y <= Uint::ONE || y >= self.p_minus_one {
            return Err(Error::InvalidPublicKey(
                "FFDH public value out of range".into(),
            ));
        }
        if DynResidue::new(&y, self.mod_p).pow(&self.q).retrieve() != Uint::ONE {
            return Err(Error::InvalidPublicKey(
                "FFDH public value outside the prime-order subgroup".into(),
            ));
        }
        Ok(y)
    }

    /// Load a big-endian private exponent, requiring `1 < x < q`.
    ///
    /// Returns the exponent and its public bit bound.
    fn decode_private(&self, bytes: &[u8]) -> Result<(Zeroizing<Uint<LIMBS>>, usize)> {
        let len = Uint::<LIMBS>::BYTES;
        if bytes.is_empty() || bytes.len() > len {
            return Err(Error::InvalidLength {
                expected: len,
                actual: bytes.len(),
            });
        }
        let mut padded = Zeroizing::new(vec![0u8; len]);
        padded[len - bytes.len()..].copy_from_slice(bytes);
        let x = Zeroizing::new(Uint::from_be_slice(&padded));
        if *x <= Uint::ONE || *x >= self.q {
            return Err(Error::InvalidPrivateKey(
                "FFDH private exponent out of range".into(),
            ));
        }
        Ok((x, bytes.len() * 8))
    }

    /// `base^exponent mod p` over the lowest `bits` bits of the exponent.
    fn pow_mod_p(
        &self,
        base: &Uint<LIMBS>,
        exponent: &Uint<LIMBS>,
        bits: usize,
    ) -> Zeroizing<Uint<LIMBS>> {
        Zeroizing::new(
            DynResidue::new(base, self.mod_p)
                .pow_bounded_exp(exponent, bits)
                .retrieve(),
        )
    }

    /// Encode a shared value, rejecting the degenerate result 1.
    fn shared_secret(z: &Uint<LIMBS>) -> Result<Zeroizing<Vec<u8>>> {
        if *z <= Uint::ONE {
            return Err(Error::KeyExchange("FFDH shared secret is degenerate".into()));
        }
        Ok(Zeroizing::new(Self::encode(z)))
    }

    /// Associate value function: `2^w + (t mod 2^w)`. Only applied to public values.
    fn associate_value(t: &Uint<LIMBS>) -> Uint<LIMBS> {
        let bound = Uint::<LIMBS>::ONE.shl_vartime(Self::mqv_width());
        let mask = bound.wrapping_sub(&Uint::ONE);
        t.bitand(&mask).bitor(&bound)
    }

    fn public_key(&self, private: &[u8]) -> Result<Vec<u8>> {
        let (x, bits) = self.decode_private(private)?;
        let g = Uint::<LIMBS>::from_u8(2);
        Ok(Self::encode(&self.pow_mod_p(&g, &x, bits)))
    }

    fn exchange(&self, private: &[u8], peer_public: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        let (x, bits) = self.decode_private(private)?;
        let y = self.decode_public(peer_public)?;
        Self::shared_secret(&self.pow_mod_p(&y, &x, bits))
    }

    fn mqv(
        &self,
        own_static: &[u8],
        own_ephemeral: &[u8],
        own_ephemeral_public: &[u8],
        peer_static: &[u8],
        peer_ephemeral: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>> {
        let peer_static = self.decode_public(peer_static)?;
        let peer_ephemeral = self.decode_public(peer_ephemeral)?;
        let (x, _) = self.decode_private(own_static)?;
        let (r, _) = self.decode_private(own_ephemeral)?;

        let own_avf = Self::associate_value(&Self::decode(own_ephemeral_public)?);
        let implicit = Zeroizing::new(
            (DynResidue::new(&r, self.mod_q)
                + DynResidue::new(&own_avf, self.mod_q) * DynResidue::new(&x, self.mod_q))
            .retrieve(),
        );

        let peer_avf = Self::associate_value(&peer_ephemeral);
        let base = (DynResidue::new(&peer_ephemeral, self.mod_p)
            * DynResidue::new(&peer_static, self.mod_p)
                .pow_bounded_exp(&peer_avf, Self::mqv_width() + 1))
        .retrieve();
        let z = self.pow_mod_p(&base, &implicit, Uint::<LIMBS>::BITS);
        Self::shared_secret(&z)
    }
}

impl FfdhGroup {
    /// Group used by a Dh-kind family.
    pub fn from_family(family: AlgorithmFamily) -> Option<Self> {
        match family {
            AlgorithmFamily::Ffdhe2048 => Some(Self::Ffdhe2048),
            AlgorithmFamily::Ffdhe3072 => Some(Self::Ffdhe3072),
            _ => None,
        }
    }

    /// Family identifier of this group.
    pub fn family(&self) -> AlgorithmFamily {
        match self {
            Self::Ffdhe2048 => AlgorithmFamily::Ffdhe2048,
            Self::Ffdhe3072 => AlgorithmFamily::Ffdhe3072,
        }
    }

    /// Byte length of the prime, public values and shared secrets.
    pub fn byte_len(&self) -> usize {
        match self {
            Self::Ffdhe2048 => U2048::BYTES,
            Self::Ffdhe3072 => U3072::BYTES,
        }
    }
}

/// Validate a public value received from a peer and return it unchanged.
pub fn validate_public_key(group: FfdhGroup, bytes: &[u8]) -> Result<Vec<u8>> {
    with_params!(group, params => params.decode_public(bytes).map(|_| ()))?;
    Ok(bytes.to_vec())
}

/// FFDH key pair over one of the RFC 7919 groups.
pub struct FfdhKeyPair {
    group: FfdhGroup,
    /// Private exponent, big-endian, zeroed on drop.
    private_exponent: Zeroizing<Vec<u8>>,
    /// Public value `g^x mod p`, padded.
    public_key_bytes: Vec<u8>,
}

impl FfdhKeyPair {
    /// Generate a new key pair with a random 256-bit exponent.
    pub fn generate(group: FfdhGroup) -> Result<Self> {
        let mut exponent = Zeroizing::new(vec![0u8; PRIVATE_EXPONENT_LEN]);
        loop {
            rand::rngs::OsRng.fill_bytes(&mut exponent);
            let (high, low) = exponent.split_at(PRIVATE_EXPONENT_LEN - 1);
            if high.iter().any(|&b| b != 0) || low[0] > 1 {
                break;
            }
        }
        Self::from_private(group, &exponent)
    }

    /// Rebuild a key pair from a big-endian private exponent.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidPrivateKey` unless `1 < x < q`.
    pub fn from_private(group: FfdhGroup, private: &[u8]) -> Result<Self> {
        let public_key_bytes = with_params!(group, params => params.public_key(private))?;
        Ok(Self {
            group,
            private_exponent: Zeroizing::new(private.to_vec()),
            public_key_bytes,
        })
    }

    /// Group of this key pair.
    pub fn group(&self) -> FfdhGroup {
        self.group
    }

    /// Public value, big-endian and padded to the group length.
    pub fn public_key(&self) -> &[u8] {
        &self.public_key_bytes
    }

    /// Export the private exponent.
    pub fn private_bytes(&self) -> Zeroizing<Vec<u8>> {
        self.private_exponent.clone()
    }

    /// Compute `Z = y_peer^x mod p`.
    pub fn exchange(&self, peer_public: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        with_params!(self.group, params => params.exchange(&self.private_exponent, peer_public))
    }

    /// FFC MQV2 with this key pair as the static key (NIST SP 800-56A §5.7.2.1).
    ///
    /// `S = (r + avf(t) * x) mod q` from the own ephemeral `r`/`t` and static
    /// `x`, then `Z = (t' * y'^avf(t'))^S mod p` from the peer's ephemeral
    /// `t'` and static `y'`.
    pub fn mqv(
        &self,
        own_ephemeral: &FfdhKeyPair,
        peer_static: &[u8],
        peer_ephemeral: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>> {
        if own_ephemeral.group != self.group {
            return Err(Error::KeyExchange("MQV key pairs use different groups".into()));
        }
        with_params!(self.group, params => params.mqv(
            &self.private_exponent,
            &own_ephemeral.private_exponent,
            &own_ephemeral.public_key_bytes,
            peer_static,
            peer_ephemeral,
        ))
    }
}
