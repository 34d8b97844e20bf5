//! Handshake messages and their wire format.
//!
//! Every message travels in one [`Envelope`]:
//!
//! ```text
//! magic    u32 LE   per message type ("ACCH", "ACSH", "ACCC")
//! type     u8       0x01 ClientHello, 0x02 ServerHello, 0x03 ClientConfirm
//! family   u16 LE   algorithm family identifier
//! category u8       handshake category identifier
//! flags    u8       bit0 ephemeral, bit1 ciphertext, bit2 signature, bit3 tag
//! fields            each present field as u16 LE length || bytes, in flag order
//! ```
//!
//! Absent fields are absent on the wire, never zero-filled. Parsing is
//! strict: unknown flags, truncated fields and trailing bytes are rejected,
//! so a parsed message re-serializes to the same bytes.

use crate::capability;
use crate::spec::Category;
use crate::{Error, Result};
use accord_crypto::{AlgorithmFamily, FamilyKind};
use subtle::ConstantTimeEq;

// Message magic numbers (4 bytes, ASCII mnemonic)
/// Magic number for ClientHello (0x41434348 = "ACCH").
pub const MAGIC_CLIENT_HELLO: u32 = 0x4143_4348;
/// Magic number for ServerHello (0x41435348 = "ACSH").
pub const MAGIC_SERVER_HELLO: u32 = 0x4143_5348;
/// Magic number for ClientConfirm (0x41434343 = "ACCC").
pub const MAGIC_CLIENT_CONFIRM: u32 = 0x4143_4343;

/// Presence flag: ephemeral public key.
pub const FLAG_EPHEMERAL: u8 = 0x01;
/// Presence flag: KEM ciphertext.
pub const FLAG_CIPHERTEXT: u8 = 0x02;
/// Presence flag: signature.
pub const FLAG_SIGNATURE: u8 = 0x04;
/// Presence flag: confirmation tag.
pub const FLAG_TAG: u8 = 0x08;
const KNOWN_FLAGS: u8 = FLAG_EPHEMERAL | FLAG_CIPHERTEXT | FLAG_SIGNATURE | FLAG_TAG;

/// Envelope header length: magic, type, family, category, flags.
pub const HEADER_LEN: usize = 9;

/// Message types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageType {
    /// Initiator's first message.
    ClientHello = 0x01,
    /// Responder's reply in two-pass categories.
    ServerHello = 0x02,
    /// Initiator's confirmation tag (mutual confirmation only).
    ClientConfirm = 0x03,
}

impl MessageType {
    /// Magic number for this message type.
    pub fn magic(self) -> u32 {
        match self {
            Self::ClientHello => MAGIC_CLIENT_HELLO,
            Self::ServerHello => MAGIC_SERVER_HELLO,
            Self::ClientConfirm => MAGIC_CLIENT_CONFIRM,
        }
    }

    /// Convert to wire format (u8).
    pub fn to_u8(self) -> u8 {
        self as u8
    }
}

/// Untyped wire form of a handshake message.
///
/// Family and category stay raw so that any byte string that parses can be
/// represented; the typed messages validate them on conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Message type.
    pub message_type: MessageType,
    /// Raw family identifier.
    pub family: u16,
    /// Raw category identifier.
    pub category: u8,
    /// Ephemeral public key.
    pub ephemeral: Option<Vec<u8>>,
    /// KEM ciphertext.
    pub ciphertext: Option<Vec<u8>>,
    /// Signature over the sender's ephemeral key.
    pub signature: Option<Vec<u8>>,
    /// Confirmation tag.
    pub tag: Option<Vec<u8>>,
}

impl Envelope {
    /// Envelope with no fields.
    pub fn new(message_type: MessageType, family: u16, category: u8) -> Self {
        Self {
            message_type,
            family,
            category,
            ephemeral: None,
            ciphertext: None,
            signature: None,
            tag: None,
        }
    }

    fn flags(&self) -> u8 {
        let mut flags = 0;
        if self.ephemeral.is_some() {
            flags |= FLAG_EPHEMERAL;
        }
        if self.ciphertext.is_some() {
            flags |= FLAG_CIPHERTEXT;
        }
        if self.signature.is_some() {
            flags |= FLAG_SIGNATURE;
        }
        if self.tag.is_some() {
            flags |= FLAG_TAG;
        }
        flags
    }

    /// Parse an envelope from bytes.
    pub fn parse(data: &[u8]) -> Result<Self> {
        check_len(data, HEADER_LEN)?;

        let magic = read_u32_le(&data[0..4]);
        let message_type = match (magic, data[4]) {
            (MAGIC_CLIENT_HELLO, 0x01) => MessageType::ClientHello,
            (MAGIC_SERVER_HELLO, 0x02) => MessageType::ServerHello,
            (MAGIC_CLIENT_CONFIRM, 0x03) => MessageType::ClientConfirm,
            (magic, message_type) => {
                return Err(Error::MalformedMessage(format!(
                    "Unknown message: magic=0x{:08X}, type=0x{:02X}",
                    magic, message_type
                )))
            }
        };
        let family = read_u16_le(&data[5..7]);
        let category = data[7];
        let flags = data[8];

        if flags & !KNOWN_FLAGS != 0 {
            return Err(Error::MalformedMessage(format!(
                "Unknown presence flags: 0x{:02X}",
                flags
            )));
        }

        let mut offset = HEADER_LEN;
        let mut envelope = Self::new(message_type, family, category);
        envelope.ephemeral = read_field(data, &mut offset, flags & FLAG_EPHEMERAL != 0)?;
        envelope.ciphertext = read_field(data, &mut offset, flags & FLAG_CIPHERTEXT != 0)?;
        envelope.signature = read_field(data, &mut offset, flags & FLAG_SIGNATURE != 0)?;
        envelope.tag = read_field(data, &mut offset, flags & FLAG_TAG != 0)?;

        if offset != data.len() {
            return Err(Error::MalformedMessage(format!(
                "{} trailing bytes",
                data.len() - offset
            )));
        }

        Ok(envelope)
    }

    /// Serialize to bytes.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let fields = [&self.ephemeral, &self.ciphertext, &self.signature, &self.tag];
        let body_len: usize = fields
            .into_iter()
            .flatten()
            .map(|field| 2 + field.len())
            .sum();

        let mut buf = Vec::with_capacity(HEADER_LEN + body_len);
        buf.extend_from_slice(&self.message_type.magic().to_le_bytes());
        buf.push(self.message_type.to_u8());
        buf.extend_from_slice(&self.family.to_le_bytes());
        buf.push(self.category);
        buf.push(self.flags());

        for field in fields.into_iter().flatten() {
            let len = u16::try_from(field.len()).map_err(|_| {
                Error::MalformedMessage(format!("field of {} bytes is too long", field.len()))
            })?;
            buf.extend_from_slice(&len.to_le_bytes());
            buf.extend_from_slice(field);
        }

        Ok(buf)
    }

    fn expect_type(&self, expected: MessageType) -> Result<()> {
        if self.message_type != expected {
            return Err(Error::MalformedMessage(format!(
                "expected {:?}, got {:?}",
                expected, self.message_type
            )));
        }
        Ok(())
    }

    fn typed_family(&self) -> Result<AlgorithmFamily> {
        AlgorithmFamily::from_u16(self.family).ok_or_else(|| {
            Error::MalformedMessage(format!("Unknown family: 0x{:04X}", self.family))
        })
    }

    fn typed_category(&self) -> Result<Category> {
        Category::from_u8(self.category).ok_or_else(|| {
            Error::MalformedMessage(format!("Unknown category: 0x{:02X}", self.category))
        })
    }
}

/// 32-byte HMAC-SHA256 confirmation tag.
///
/// Equality is constant-time. `Debug` does not print the tag.
#[derive(Clone)]
pub struct ConfirmationTag([u8; 32]);

impl ConfirmationTag {
    /// Tag length in bytes.
    pub const LEN: usize = 32;

    /// Wrap tag bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse a tag from a wire field.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; 32] = bytes.try_into().map_err(|_| {
            Error::MalformedMessage(format!(
                "confirmation tag must be {} bytes, got {}",
                Self::LEN,
                bytes.len()
            ))
        })?;
        Ok(Self(bytes))
    }

    /// Tag bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Constant-time comparison.
    pub fn ct_eq(&self, other: &ConfirmationTag) -> bool {
        bool::from(self.0.ct_eq(&other.0))
    }
}

impl PartialEq for ConfirmationTag {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other)
    }
}

impl Eq for ConfirmationTag {}

impl core::fmt::Debug for ConfirmationTag {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "ConfirmationTag(..)")
    }
}

/// Content of a `ClientHello`, one variant per category shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientHelloBody {
    /// Anonymous category over a Diffie-Hellman family.
    AnonymousEphemeral {
        /// Initiator ephemeral public key.
        ephemeral_public_key: Vec<u8>,
    },
    /// Anonymous category over a KEM family.
    AnonymousKem {
        /// Encapsulation to the responder static key.
        kem_ciphertext: Vec<u8>,
    },
    /// Static-static agreement; no fields.
    Basic,
    /// Signed ephemeral key.
    Signed {
        /// Initiator ephemeral public key.
        ephemeral_public_key: Vec<u8>,
        /// Ed25519 signature over the signed-hello payload.
        signature: Vec<u8>,
    },
    /// Unified model.
    Unified {
        /// Initiator ephemeral public key.
        ephemeral_public_key: Vec<u8>,
    },
    /// MQV.
    Mqv {
        /// Initiator ephemeral public key.
        ephemeral_public_key: Vec<u8>,
    },
    /// KEM encapsulation.
    KemEncapsulation {
        /// Encapsulation to the responder static key.
        kem_ciphertext: Vec<u8>,
    },
}

impl ClientHelloBody {
    /// Category this body belongs to.
    pub fn category(&self) -> Category {
        match self {
            Self::AnonymousEphemeral { .. } | Self::AnonymousKem { .. } => Category::Anonymous,
            Self::Basic => Category::Basic,
            Self::Signed { .. } => Category::Signed,
            Self::Unified { .. } => Category::Unified,
            Self::Mqv { .. } => Category::Mqv,
            Self::KemEncapsulation { .. } => Category::KemEncapsulation,
        }
    }

    /// Ephemeral public key, if the body carries one.
    pub fn ephemeral_public_key(&self) -> Option<&[u8]> {
        match self {
            Self::AnonymousEphemeral {
                ephemeral_public_key,
            }
            | Self::Signed {
                ephemeral_public_key,
                ..
            }
            | Self::Unified {
                ephemeral_public_key,
            }
            | Self::Mqv {
                ephemeral_public_key,
            } => Some(ephemeral_public_key),
            _ => None,
        }
    }

    /// KEM ciphertext, if the body carries one.
    pub fn kem_ciphertext(&self) -> Option<&[u8]> {
        match self {
            Self::AnonymousKem { kem_ciphertext } | Self::KemEncapsulation { kem_ciphertext } => {
                Some(kem_ciphertext)
            }
            _ => None,
        }
    }
}

/// Content of a `ServerHello`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerHelloBody {
    /// Static-static agreement; no fields.
    Basic,
    /// Signed ephemeral key.
    Signed {
        /// Responder ephemeral public key.
        ephemeral_public_key: Vec<u8>,
        /// Ed25519 signature over the signed-hello payload.
        signature: Vec<u8>,
    },
    /// Unified model.
    Unified {
        /// Responder ephemeral public key.
        ephemeral_public_key: Vec<u8>,
    },
    /// MQV.
    Mqv {
        /// Responder ephemeral public key.
        ephemeral_public_key: Vec<u8>,
    },
}

impl ServerHelloBody {
    /// Category this body belongs to.
    pub fn category(&self) -> Category {
        match self {
            Self::Basic => Category::Basic,
            Self::Signed { .. } => Category::Signed,
            Self::Unified { .. } => Category::Unified,
            Self::Mqv { .. } => Category::Mqv,
        }
    }

    /// Ephemeral public key, if the body carries one.
    pub fn ephemeral_public_key(&self) -> Option<&[u8]> {
        match self {
            Self::Basic => None,
            Self::Signed {
                ephemeral_public_key,
                ..
            }
            | Self::Unified {
                ephemeral_public_key,
            }
            | Self::Mqv {
                ephemeral_public_key,
            } => Some(ephemeral_public_key),
        }
    }
}

fn check_supported(family: AlgorithmFamily, category: Category) -> Result<()> {
    if !capability::supports(family.kind(), category) {
        return Err(Error::MalformedMessage(format!(
            "{:?} does not support the {:?} category",
            family, category
        )));
    }
    Ok(())
}

fn check_ciphertext(family: AlgorithmFamily, ciphertext: &[u8]) -> Result<()> {
    match family.ciphertext_len() {
        Some(len) if len == ciphertext.len() => Ok(()),
        Some(len) => Err(Error::MalformedMessage(format!(
            "{:?} ciphertext must be {} bytes, got {}",
            family,
            len,
            ciphertext.len()
        ))),
        None => Err(Error::MalformedMessage(format!(
            "{:?} is not a KEM family",
            family
        ))),
    }
}

/// Initiator's first message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientHello {
    family: AlgorithmFamily,
    body: ClientHelloBody,
}

impl ClientHello {
    /// Build a `ClientHello`, checking that `body` fits `family`.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedMessage` if the family does not support the
    /// body's category, the anonymous variant does not match the family
    /// kind, or a KEM ciphertext has the wrong length.
    pub fn new(family: AlgorithmFamily, body: ClientHelloBody) -> Result<Self> {
        check_supported(family, body.category())?;
        match &body {
            ClientHelloBody::AnonymousEphemeral { .. } if family.kind() == FamilyKind::Kem => {
                return Err(Error::MalformedMessage(format!(
                    "{:?} is a KEM family and needs an encapsulation",
                    family
                )));
            }
            ClientHelloBody::AnonymousKem { kem_ciphertext }
            | ClientHelloBody::KemEncapsulation { kem_ciphertext } => {
                check_ciphertext(family, kem_ciphertext)?;
            }
            _ => {}
        }
        Ok(Self { family, body })
    }

    /// Algorithm family.
    pub fn family(&self) -> AlgorithmFamily {
        self.family
    }

    /// Category.
    pub fn category(&self) -> Category {
        self.body.category()
    }

    /// Message body.
    pub fn body(&self) -> &ClientHelloBody {
        &self.body
    }

    /// Wire envelope for this message.
    pub fn to_envelope(&self) -> Envelope {
        let mut envelope = Envelope::new(
            MessageType::ClientHello,
            self.family.to_u16(),
            self.category().to_u8(),
        );
        match &self.body {
            ClientHelloBody::AnonymousEphemeral {
                ephemeral_public_key,
            }
            | ClientHelloBody::Unified {
                ephemeral_public_key,
            }
            | ClientHelloBody::Mqv {
                ephemeral_public_key,
            } => envelope.ephemeral = Some(ephemeral_public_key.clone()),
            ClientHelloBody::Signed {
                ephemeral_public_key,
                signature,
            } => {
                envelope.ephemeral = Some(ephemeral_public_key.clone());
                envelope.signature = Some(signature.clone());
            }
            ClientHelloBody::AnonymousKem { kem_ciphertext }
            | ClientHelloBody::KemEncapsulation { kem_ciphertext } => {
                envelope.ciphertext = Some(kem_ciphertext.clone())
            }
            ClientHelloBody::Basic => {}
        }
        envelope
    }

    /// Serialize to bytes.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        self.to_envelope().serialize()
    }

    /// Parse from bytes.
    pub fn parse(data: &[u8]) -> Result<Self> {
        Self::try_from(Envelope::parse(data)?)
    }
}

impl TryFrom<Envelope> for ClientHello {
    type Error = Error;

    fn try_from(envelope: Envelope) -> Result<Self> {
        envelope.expect_type(MessageType::ClientHello)?;
        let family = envelope.typed_family()?;
        let category = envelope.typed_category()?;
        if envelope.tag.is_some() {
            return Err(Error::MalformedMessage(
                "ClientHello cannot carry a confirmation tag".into(),
            ));
        }

        let body = match (
            category,
            envelope.ephemeral,
            envelope.ciphertext,
            envelope.signature,
        ) {
            (Category::Anonymous, Some(ephemeral_public_key), None, None) => {
                ClientHelloBody::AnonymousEphemeral {
                    ephemeral_public_key,
                }
            }
            (Category::Anonymous, None, Some(kem_ciphertext), None) => {
                ClientHelloBody::AnonymousKem { kem_ciphertext }
            }
            (Category::Basic, None, None, None) => ClientHelloBody::Basic,
            (Category::Signed, Some(ephemeral_public_key), None, Some(signature)) => {
                ClientHelloBody::Signed {
                    ephemeral_public_key,
                    signature,
                }
            }
            (Category::Unified, Some(ephemeral_public_key), None, None) => {
                ClientHelloBody::Unified {
                    ephemeral_public_key,
                }
            }
            (Category::Mqv, Some(ephemeral_public_key), None, None) => ClientHelloBody::Mqv {
                ephemeral_public_key,
            },
            (Category::KemEncapsulation, None, Some(kem_ciphertext), None) => {
                ClientHelloBody::KemEncapsulation { kem_ciphertext }
            }
            (category, ..) => {
                return Err(Error::MalformedMessage(format!(
                    "ClientHello fields do not match the {:?} category",
                    category
                )))
            }
        };

        Self::new(family, body)
    }
}

/// Responder's reply in two-pass categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerHello {
    family: AlgorithmFamily,
    body: ServerHelloBody,
    confirmation_tag: Option<ConfirmationTag>,
}

impl ServerHello {
    /// Build a `ServerHello`, checking that `body` fits `family`.
    pub fn new(
        family: AlgorithmFamily,
        body: ServerHelloBody,
        confirmation_tag: Option<ConfirmationTag>,
    ) -> Result<Self> {
        check_supported(family, body.category())?;
        Ok(Self {
            family,
            body,
            confirmation_tag,
        })
    }

    /// Algorithm family.
    pub fn family(&self) -> AlgorithmFamily {
        self.family
    }

    /// Category.
    pub fn category(&self) -> Category {
        self.body.category()
    }

    /// Message body.
    pub fn body(&self) -> &ServerHelloBody {
        &self.body
    }

    /// Responder confirmation tag, if present.
    pub fn confirmation_tag(&self) -> Option<&ConfirmationTag> {
        self.confirmation_tag.as_ref()
    }

    /// Replace the confirmation tag.
    pub fn with_confirmation_tag(mut self, tag: Option<ConfirmationTag>) -> Self {
        self.confirmation_tag = tag;
        self
    }

    fn envelope_without_tag(&self) -> Envelope {
        let mut envelope = Envelope::new(
            MessageType::ServerHello,
            self.family.to_u16(),
            self.category().to_u8(),
        );
        match &self.body {
            ServerHelloBody::Basic => {}
            ServerHelloBody::Signed {
                ephemeral_public_key,
                signature,
            } => {
                envelope.ephemeral = Some(ephemeral_public_key.clone());
                envelope.signature = Some(signature.clone());
            }
            ServerHelloBody::Unified {
                ephemeral_public_key,
            }
            | ServerHelloBody::Mqv {
                ephemeral_public_key,
            } => envelope.ephemeral = Some(ephemeral_public_key.clone()),
        }
        envelope
    }

    /// Wire envelope for this message.
    pub fn to_envelope(&self) -> Envelope {
        let mut envelope = self.envelope_without_tag();
        envelope.tag = self
            .confirmation_tag
            .as_ref()
            .map(|tag| tag.as_bytes().to_vec());
        envelope
    }

    /// Bytes that enter the transcript: the message with the tag absent.
    pub fn transcript_bytes(&self) -> Result<Vec<u8>> {
        self.envelope_without_tag().serialize()
    }

    /// Serialize to bytes.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        self.to_envelope().serialize()
    }

    /// Parse from bytes.
    pub fn parse(data: &[u8]) -> Result<Self> {
        Self::try_from(Envelope::parse(data)?)
    }
}

impl TryFrom<Envelope> for ServerHello {
    type Error = Error;

    fn try_from(envelope: Envelope) -> Result<Self> {
        envelope.expect_type(MessageType::ServerHello)?;
        let family = envelope.typed_family()?;
        let category = envelope.typed_category()?;
        if envelope.ciphertext.is_some() {
            return Err(Error::MalformedMessage(
                "ServerHello cannot carry a ciphertext".into(),
            ));
        }
        let confirmation_tag = envelope
            .tag
            .as_deref()
            .map(ConfirmationTag::from_slice)
            .transpose()?;

        let body = match (category, envelope.ephemeral, envelope.signature) {
            (Category::Basic, None, None) => ServerHelloBody::Basic,
            (Category::Signed, Some(ephemeral_public_key), Some(signature)) => {
                ServerHelloBody::Signed {
                    ephemeral_public_key,
                    signature,
                }
            }
            (Category::Unified, Some(ephemeral_public_key), None) => ServerHelloBody::Unified {
                ephemeral_public_key,
            },
            (Category::Mqv, Some(ephemeral_public_key), None) => ServerHelloBody::Mqv {
                ephemeral_public_key,
            },
            (category, ..) => {
                return Err(Error::MalformedMessage(format!(
                    "ServerHello fields do not match the {:?} category",
                    category
                )))
            }
        };

        Self::new(family, body, confirmation_tag)
    }
}

/// Initiator's confirmation tag, sent only with mutual confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfirm {
    family: AlgorithmFamily,
    category: Category,
    confirmation_tag: ConfirmationTag,
}

impl ClientConfirm {
    /// Build a `ClientConfirm` for a two-pass category.
    pub fn new(
        family: AlgorithmFamily,
        category: Category,
        confirmation_tag: ConfirmationTag,
    ) -> Result<Self> {
        check_supported(family, category)?;
        if !category.is_two_pass() {
            return Err(Error::MalformedMessage(format!(
                "{:?} is a one-pass category",
                category
            )));
        }
        Ok(Self {
            family,
            category,
            confirmation_tag,
        })
    }

    /// Algorithm family.
    pub fn family(&self) -> AlgorithmFamily {
        self.family
    }

    /// Category.
    pub fn category(&self) -> Category {
        self.category
    }

    /// Initiator confirmation tag.
    pub fn confirmation_tag(&self) -> &ConfirmationTag {
        &self.confirmation_tag
    }

    /// Replace the confirmation tag.
    pub fn with_confirmation_tag(mut self, tag: ConfirmationTag) -> Self {
        self.confirmation_tag = tag;
        self
    }

    /// Wire envelope for this message.
    pub fn to_envelope(&self) -> Envelope {
        let mut envelope = Envelope::new(
            MessageType::ClientConfirm,
            self.family.to_u16(),
            self.category.to_u8(),
        );
        envelope.tag = Some(self.confirmation_tag.as_bytes().to_vec());
        envelope
    }

    /// Serialize to bytes.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        self.to_envelope().serialize()
    }

    /// Parse from bytes.
    pub fn parse(data: &[u8]) -> Result<Self> {
        Self::try_from(Envelope::parse(data)?)
    }
}

impl TryFrom<Envelope> for ClientConfirm {
    type Error = Error;

    fn try_from(envelope: Envelope) -> Result<Self> {
        envelope.expect_type(MessageType::ClientConfirm)?;
        let family = envelope.typed_family()?;
        let category = envelope.typed_category()?;
        let tag = match (
            envelope.ephemeral,
            envelope.ciphertext,
            envelope.signature,
            envelope.tag,
        ) {
            (None, None, None, Some(tag)) => ConfirmationTag::from_slice(&tag)?,
            _ => {
                return Err(Error::MalformedMessage(
                    "ClientConfirm must carry only a confirmation tag".into(),
                ))
            }
        };
        Self::new(family, category, tag)
    }
}

/// Any handshake message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandshakeMessage {
    /// Initiator's first message.
    ClientHello(ClientHello),
    /// Responder's reply.
    ServerHello(ServerHello),
    /// Initiator's confirmation.
    ClientConfirm(ClientConfirm),
}

impl HandshakeMessage {
    /// Parse any handshake message, dispatching on its type.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let envelope = Envelope::parse(data)?;
        match envelope.message_type {
            MessageType::ClientHello => ClientHello::try_from(envelope).map(Self::ClientHello),
            MessageType::ServerHello => ServerHello::try_from(envelope).map(Self::ServerHello),
            MessageType::ClientConfirm => {
                ClientConfirm::try_from(envelope).map(Self::ClientConfirm)
            }
        }
    }

    /// Serialize to bytes.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        match self {
            Self::ClientHello(message) => message.serialize(),
            Self::ServerHello(message) => message.serialize(),
            Self::ClientConfirm(message) => message.serialize(),
        }
    }

    /// Algorithm family.
    pub fn family(&self) -> AlgorithmFamily {
        match self {
            Self::ClientHello(message) => message.family(),
            Self::ServerHello(message) => message.family(),
            Self::ClientConfirm(message) => message.family(),
        }
    }

    /// Category.
    pub fn category(&self) -> Category {
        match self {
            Self::ClientHello(message) => message.category(),
            Self::ServerHello(message) => message.category(),
            Self::ClientConfirm(message) => message.category(),
        }
    }
}

impl From<ClientHello> for HandshakeMessage {
    fn from(message: ClientHello) -> Self {
        Self::ClientHello(message)
    }
}

impl From<ServerHello> for HandshakeMessage {
    fn from(message: ServerHello) -> Self {
        Self::ServerHello(message)
    }
}

impl From<ClientConfirm> for HandshakeMessage {
    fn from(message: ClientConfirm) -> Self {
        Self::ClientConfirm(message)
    }
}

fn read_field(data: &[u8], offset: &mut usize, present: bool) -> Result<Option<Vec<u8>>> {
    if !present {
        return Ok(None);
    }
    check_len(data, *offset + 2)?;
    let len = read_u16_le(&data[*offset..]) as usize;
    *offset += 2;

    check_len(data, *offset + len)?;
    let field = data[*offset..*offset + len].to_vec();
    *offset += len;
    Ok(Some(field))
}

fn check_len(data: &[u8], needed: usize) -> Result<()> {
    if data.len() < needed {
        Err(Error::MalformedMessage(format!(
            "truncated: need {} bytes, have {}",
            needed,
            data.len()
        )))
    } else {
        Ok(())
    }
}

#[inline]
fn read_u16_le(data: &[u8]) -> u16 {
    u16::from_le_bytes([data[0], data[1]])
}

#[inline]
fn read_u32_le(data: &[u8]) -> u32 {
    u32::from_le_bytes([data[0], data[1], data[2], data[3]])
}
