//! Fuzz the event frame decoder with arbitrary bytes.
//!
//! Decoding must be total: any input yields Ok or a typed error, never a
//! panic or unbounded allocation.

#![no_main]

use libfuzzer_sys::fuzz_target;
use tableside_proto::EventFrame;

fuzz_target!(|data: &[u8]| {
    let _ = EventFrame::decode(data);
});
