//! constants.rs
//! Stable sizes, defaults and wire identifiers shared across the crate.

/// Defaults when `Option<T>` is `None` in `EncoderParams`.
pub const DEFAULT_INPUT_CAPACITY: usize = 64 * 1024; // 64 KiB
pub const DEFAULT_OUTPUT_CHUNK_SIZE: usize = 64 * 1024; // 64 KiB
pub const DEFAULT_LGWIN: u32 = 22; // 4 MiB window

/// Max input buffer sanity bound (32 MiB).
pub const MAX_INPUT_CAPACITY: usize = 32 * 1024 * 1024;

/// Smallest output region a pull may be bounded to.
pub const MIN_OUTPUT_CHUNK_SIZE: usize = 64;

/// Size in bytes of the canonical shared dictionary (RFC 7932, appendix A).
pub const RFC_DICTIONARY_SIZE: usize = 122_784;

/// Upper bound for caller-supplied shared dictionaries (16 MiB).
pub const MAX_DICTIONARY_SIZE: usize = 16 * 1024 * 1024;

/// Read block used when installing the canonical dictionary from a stream.
pub const INSTALL_READ_BLOCK: usize = 4096;

/// Reference digests of the canonical dictionary.
pub mod rfc_digests {
    /// 96cecd2ee7a666d5aa3627d74735b32a
    pub const MD5: [u8; 16] = [
        0x96, 0xce, 0xcd, 0x2e, 0xe7, 0xa6, 0x66, 0xd5,
        0xaa, 0x36, 0x27, 0xd7, 0x47, 0x35, 0xb3, 0x2a,
    ];

    /// 72b41051cb61a9281ba3c4414c289da50d9a7640
    pub const SHA1: [u8; 20] = [
        0x72, 0xb4, 0x10, 0x51, 0xcb, 0x61, 0xa9, 0x28, 0x1b, 0xa3,
        0xc4, 0x41, 0x4c, 0x28, 0x9d, 0xa5, 0x0d, 0x9a, 0x76, 0x40,
    ];

    /// 20e42eb1b511c21806d4d227d07e5dd06877d8ce7b3a817f378f313653f35c70
    pub const SHA256: [u8; 32] = [
        0x20, 0xe4, 0x2e, 0xb1, 0xb5, 0x11, 0xc2, 0x18,
        0x06, 0xd4, 0xd2, 0x27, 0xd0, 0x7e, 0x5d, 0xd0,
        0x68, 0x77, 0xd8, 0xce, 0x7b, 0x3a, 0x81, 0x7f,
        0x37, 0x8f, 0x31, 0x36, 0x53, 0xf3, 0x5c, 0x70,
    ];
}
