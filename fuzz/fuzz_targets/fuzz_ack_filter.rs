//! Fuzz target: ESP-NOW receive filtering
//!
//! Feeds arbitrary over-the-air frames through the group filter and checks
//! that only the exact acknowledgement header for our node is ever taken
//! as an ack.
//!
//! cargo fuzz run fuzz_ack_filter

#![no_main]

use envnode::adapters::radio::accept_frame;
use envnode::config::NodeId;
use envnode::radio::header;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&node_byte, frame)) = data.split_first() else {
        return;
    };
    let Ok(node) = NodeId::new(node_byte % 32) else {
        return;
    };
    let group = 210;

    if let Some(hdr) = accept_frame(group, frame) {
        assert_eq!(frame[0], group);
        assert_eq!(hdr, frame[1]);
        if hdr == header::ack_header(node) {
            assert_eq!(header::node_of(hdr), node.get());
            assert_eq!(hdr & (header::CTL | header::DST), header::CTL | header::DST);
        }
    }
});
