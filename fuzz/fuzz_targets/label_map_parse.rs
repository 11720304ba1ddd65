//! Fuzz target for label map loading, text with binary fallback.

#![no_main]

use facebox::label_map::from_label_map_slice;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 1024 * 1024 {
        return;
    }

    let _ = from_label_map_slice(data);
});
