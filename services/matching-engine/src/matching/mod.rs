//! Matching logic module
//!
//! Crossing detection and the read-only fill planner used by
//! all-or-nothing orders. The match loop itself lives on the engine, which
//! owns the book state it mutates.

pub mod crossing;
pub(crate) mod fok;

pub use crossing::can_match;
