//! encoder-core
//!
//! Streaming encoder sessions with a push-input / pull-output protocol,
//! plus shared dictionary preparation and the canonical dictionary installer.
//!
//! ```no_run
//! use encoder_core::compression::{EncoderSession, EncoderMode, Operation};
//!
//! # fn main() -> Result<(), encoder_core::types::SessionError> {
//! let mut session = EncoderSession::with_settings(4096, 5, 22, Some(EncoderMode::Generic))?;
//! session.input_region()[..11].copy_from_slice(b"hello world");
//! session.push(Operation::Finish, 11)?;
//!
//! let mut compressed = Vec::new();
//! while session.has_more_output() {
//!     compressed.extend_from_slice(&session.pull()?);
//! }
//! assert!(session.is_finished());
//! session.destroy()?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod utils;

pub mod compression;
pub mod dictionary;
pub mod telemetry;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::compression::{
        CompressionCodec, EncoderMode, EncoderParams, EncoderSession, Operation, SessionStatus,
    };
    pub use crate::dictionary::{
        check_digest, prepare_dictionary, DigestKind, PreparedDictionary, SharedDictionaryType,
    };
    pub use crate::types::SessionError;
}
