//! Fuzz target for per-image annotation XML parsing.
//!
//! Run with:
//!   cargo +nightly fuzz run xml_parse

#![no_main]

use libfuzzer_sys::fuzz_target;
use xml2coco::ir::io_xml::parse_annotation_slice;

fuzz_target!(|data: &[u8]| {
    if data.len() > 4 * 1024 * 1024 {
        return;
    }

    // Errors are expected; only panics and hangs are failures.
    let _ = parse_annotation_slice(data);
});
