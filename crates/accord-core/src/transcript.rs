//! Handshake transcript: the canonical bytes both sides have seen.

/// Ordered concatenation of serialized handshake messages.
///
/// Each confirmation tag covers everything sent before it:
/// - the responder's tag covers the `ClientHello` bytes followed by the
///   `ServerHello` bytes with the tag field absent
/// - the initiator's tag covers the `ClientHello` bytes followed by the full
///   `ServerHello`, responder tag included
///
/// It is never transmitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    bytes: Vec<u8>,
}

impl Transcript {
    /// Empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one serialized message.
    pub fn append(&mut self, message: &[u8]) {
        self.bytes.extend_from_slice(message);
    }

    /// Transcript bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}
