//! telemetry/mod.rs
//! Per-session counters.
//!
//! Notes:
//! - Counters are plain data, updated on the calling thread only.
//! - Serializable so callers can ship them to their own metrics sink.

pub mod counters;

pub use counters::*;
