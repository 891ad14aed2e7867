//! Fuzz target: `MeasurementRecord::decode`
//!
//! Decodes arbitrary bytes against every layout and asserts that decoding
//! never panics, accepts exactly the layout's length, and re-encodes to
//! the same bytes.
//!
//! cargo fuzz run fuzz_record_decode

#![no_main]

use envnode::radio::record::{MeasurementRecord, RecordLayout};
use libfuzzer_sys::fuzz_target;

const LAYOUTS: [RecordLayout; 4] = [
    RecordLayout::Basic,
    RecordLayout::Battery,
    RecordLayout::Contact,
    RecordLayout::Dual,
];

fuzz_target!(|data: &[u8]| {
    for layout in LAYOUTS {
        match MeasurementRecord::decode(layout, data) {
            Ok(record) => {
                assert_eq!(data.len(), layout.encoded_len());
                assert_eq!(record.encode(layout).as_slice(), data);
            }
            Err(_) => assert_ne!(data.len(), layout.encoded_len()),
        }
    }
});
