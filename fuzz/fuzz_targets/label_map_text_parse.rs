//! Fuzz target for the text-format label map parser.
//!
//! Feeds arbitrary UTF-8 to the parser, checking for panics or hangs.

#![no_main]

use facebox::label_map::fuzz_parse_text;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 1024 * 1024 {
        return;
    }

    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    let _ = fuzz_parse_text(input);
});
