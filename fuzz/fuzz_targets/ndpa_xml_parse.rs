//! Fuzz target for NDPA XML parsing.
//!
//! Feeds arbitrary bytes to the NDPA reader, checking for panics, crashes,
//! or hangs.

#![no_main]

use libfuzzer_sys::fuzz_target;
use microbridge::ir::io_ndpa_xml::from_ndpa_xml_slice;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let _ = from_ndpa_xml_slice(data);
});
