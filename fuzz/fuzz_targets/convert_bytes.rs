//! Fuzz target for the full in-memory conversion pipeline.
//!
//! The first byte picks the source format and the placeholder policy; the
//! rest is the file content.

#![no_main]

use libfuzzer_sys::fuzz_target;
use microbridge::conversion::{convert_bytes, SourceFormat};

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }
    let Some((&selector, body)) = data.split_first() else {
        return;
    };

    let format = if selector & 1 == 0 {
        SourceFormat::NdpaXml
    } else {
        SourceFormat::RegionCsv
    };
    let _ = convert_bytes(body, format, selector & 2 != 0);
});
