//! compression/codecs/mod.rs
//! Engine backends behind `EncoderEngine`.

pub mod brotli;
pub mod zstd;

pub use self::brotli::BrotliEngine;
pub use self::zstd::ZstdEngine;
