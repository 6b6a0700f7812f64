//! dictionary/mod.rs
//! Shared dictionaries: preparation for sessions, and the canonical dictionary.
//!
//! Notes:
//! - A prepared dictionary is immutable and may be bound by many sessions.
//! - The canonical dictionary is process-wide state, installed at most once.
//! - Digest checks compare against embedded reference values only.

pub mod canonical;
pub mod digest;
pub mod prepared;

pub use canonical::*;
pub use digest::*;
pub use prepared::*;
