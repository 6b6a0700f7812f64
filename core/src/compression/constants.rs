//! compression/constants.rs
//! Stable codec ids and per-engine parameter ranges.

/// Stable codec IDs (u16) for configuration and logs.
pub mod codec_ids {
    pub const BROTLI: u16 = 0x0001;
    pub const ZSTD: u16   = 0x0002;
}

/// Default quality levels: brotli at its maximum, zstd at the library default.
pub const DEFAULT_QUALITY_BROTLI: u32 = 11;
pub const DEFAULT_QUALITY_ZSTD: u32 = 3;

/// Brotli: quality 0..=11, window 10..=24.
pub const BROTLI_QUALITY_RANGE: (u32, u32) = (0, 11);
pub const BROTLI_LGWIN_RANGE: (u32, u32) = (10, 24);

/// Zstd: quality 1..=22, window 10..=27.
/// Windows above 2^27 need `window_log_max` on the decoder side.
pub const ZSTD_QUALITY_RANGE: (u32, u32) = (1, 22);
pub const ZSTD_LGWIN_RANGE: (u32, u32) = (10, 27);

/// Magic number opening a serialized (trained) zstd dictionary.
pub const ZSTD_DICT_MAGIC: [u8; 4] = [0x37, 0xa4, 0x30, 0xec];
