//! compression/mod.rs
//! Encoder sessions over pluggable compression engines.
//!
//! Notes:
//! - Output is deterministic for a fixed sequence of pushes, bytes and params.
//! - The registry resolves codec ids to engine implementations.
//! - Sessions are single-writer; no internal locking.

pub mod constants;
pub mod types;
pub mod registry;
pub mod codecs;
pub mod session;
pub mod stream;

pub use constants::*;
pub use types::*;
pub use registry::*;
pub use session::EncoderSession;
pub use stream::{compress_reader, compress_to_vec, compress_to_vec_with_dictionary};
