//! Handshake roles.

/// Which side of a handshake a party plays.
///
/// Role-asymmetric primitives (SM2 key exchange) and the engine's signed
/// payloads and confirmation labels depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Role {
    /// Sends the `ClientHello`.
    Initiator = 0x01,
    /// Receives the `ClientHello`.
    Responder = 0x02,
}

impl Role {
    /// Wire value used in signed payloads.
    pub fn to_u8(self) -> u8 {
        self as u8
    }
}
