//! tally-core
//!
//! Pure domain types for the Tally measurement pipeline. No I/O: this is
//! the shared vocabulary of the Tally system: canonical form submissions on
//! the way in, measurement events and diagnostics on the way out.

pub mod ids;
pub mod models;
