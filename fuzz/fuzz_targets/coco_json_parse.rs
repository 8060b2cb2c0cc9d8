//! Fuzz target for COCO JSON parsing, as used by `xml2coco validate`.
//!
//! Run with:
//!   cargo +nightly fuzz run coco_json_parse
//!
//! Or with a corpus:
//!   cargo +nightly fuzz run coco_json_parse fuzz/corpus/coco_json_parse/

#![no_main]

use libfuzzer_sys::fuzz_target;
use xml2coco::ir::io_coco_json::from_coco_slice;
use xml2coco::validation::{validate_dataset, ValidateOptions};

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    if let Ok(dataset) = from_coco_slice(data) {
        let _ = validate_dataset(&dataset, &ValidateOptions::default());
    }
});
