#![no_main]

use accord_core::HandshakeMessage;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Parsing must never panic, and anything accepted must re-serialize
    // to the exact input.
    if let Ok(message) = HandshakeMessage::parse(data) {
        let serialized = message
            .serialize()
            .expect("parsed message failed to serialize");
        assert_eq!(serialized, data, "serialization not canonical");
    }
});
