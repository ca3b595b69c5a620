//! Fuzz decode/encode consistency.
//!
//! Anything the decoder accepts must re-encode to something the decoder
//! accepts again, and both decodes must agree.

#![no_main]

use libfuzzer_sys::fuzz_target;
use tableside_proto::EventFrame;

fuzz_target!(|data: &[u8]| {
    if let Ok(event) = EventFrame::decode(data) {
        let encoded = EventFrame::encode(&event).expect("re-encode of decoded event");
        let reparsed = EventFrame::decode(&encoded).expect("decode of own encoding");
        assert_eq!(event, reparsed);
    }
});
