//! types.rs
//! Unified error for sessions, dictionaries and the canonical installer.
//!
//! Notes:
//! - Argument and ordering violations are detected before the engine is called.
//! - Engine failures carry the codec name for logs.
//! - `From<io::Error>` enables `?` on reader-driven paths.

use std::io;

use crate::compression::CompressionCodec;
use crate::utils::enum_name_or_hex;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Malformed caller input (bad length, wrong dictionary size, bad params).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation invoked out of protocol order.
    #[error("illegal state: {0}")]
    IllegalState(&'static str),

    /// The engine instance could not be created.
    #[error("engine {codec} init failed: {msg}")]
    EngineInit { codec: &'static str, msg: String },

    /// Engine-side allocation failure.
    #[error("out of memory: {0}")]
    OutOfMemory(String),

    /// Unrecoverable engine error; only `destroy` is safe afterwards.
    #[error("engine {codec} failed: {msg}")]
    EngineFailure { codec: &'static str, msg: String },

    /// Codec id not present in the registry.
    #[error("unsupported codec: {}", codec_label(.codec_id))]
    UnsupportedCodec { codec_id: u16 },

    /// Configuration could not be parsed.
    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl SessionError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        SessionError::InvalidArgument(msg.into())
    }
}

fn codec_label(codec_id: &u16) -> String {
    enum_name_or_hex::<CompressionCodec>(*codec_id)
}

impl From<serde_json::Error> for SessionError {
    fn from(e: serde_json::Error) -> Self {
        SessionError::Config(e.to_string())
    }
}
