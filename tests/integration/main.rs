//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against the scripted board in [`mock_hw`].  All tests run on the host
//! (x86_64) with no real hardware required.

mod acquisition_tests;
mod mock_hw;
mod sequencer_tests;
