//! Door / contact switch.
//!
//! The level is sampled once per cycle as part of acquisition.  Edges are
//! handled separately: the GPIO interrupt only raises
//! [`CONTACT_EVENT`](crate::events::CONTACT_EVENT) so the next cycle runs
//! early.

use crate::app::ports::SensorPort;

pub const CLOSED: i16 = 1;
pub const OPEN: i16 = 0;

/// Current contact level in record form (1 = closed, 0 = open).
pub fn sample_contact(hw: &mut impl SensorPort) -> i16 {
    if hw.contact_closed() { CLOSED } else { OPEN }
}
