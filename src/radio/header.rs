//! One-byte frame header.
//!
//! ```text
//!   7     6     5     4 .. 0
//! ┌─────┬─────┬─────┬─────────┐
//! │ CTL │ DST │ ACK │ node id │
//! └─────┴─────┴─────┴─────────┘
//! ```
//!
//! - Data frame from a node: `ACK` (if an acknowledgement is wanted) | own id.
//! - Acknowledgement to a node: `CTL | DST | node id`.

use crate::config::NodeId;

pub const CTL: u8 = 0x80;
pub const DST: u8 = 0x40;
pub const ACK: u8 = 0x20;
pub const NODE_MASK: u8 = 0x1F;

/// Header for an outgoing data frame.
pub const fn data_header(node: NodeId, ack_requested: bool) -> u8 {
    let ack = if ack_requested { ACK } else { 0 };
    ack | (node.get() & NODE_MASK)
}

/// The only header value accepted as an acknowledgement for `node`.
pub const fn ack_header(node: NodeId) -> u8 {
    DST | CTL | (node.get() & NODE_MASK)
}

/// Node id field of any header.
pub const fn node_of(header: u8) -> u8 {
    header & NODE_MASK
}
