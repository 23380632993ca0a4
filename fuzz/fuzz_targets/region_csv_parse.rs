//! Fuzz target for region CSV parsing.

#![no_main]

use libfuzzer_sys::fuzz_target;
use microbridge::ir::io_region_csv::from_region_csv_slice;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let _ = from_region_csv_slice(data);
});
