//! compression/types.rs
//! Operation / mode / codec enums, session status, parameters and the engine seam.
use bytes::Bytes;
use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};

use crate::compression::constants::codec_ids;
use crate::constants::{
    DEFAULT_INPUT_CAPACITY, DEFAULT_LGWIN, DEFAULT_OUTPUT_CHUNK_SIZE, MAX_INPUT_CAPACITY,
    MIN_OUTPUT_CHUNK_SIZE,
};
use crate::dictionary::PreparedDictionary;
use crate::types::SessionError;

/// Engine backends selectable by id.
#[repr(u16)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionCodec {
    Brotli = codec_ids::BROTLI,
    Zstd   = codec_ids::ZSTD,
}

impl CompressionCodec {
    pub fn name(self) -> &'static str {
        match self {
            CompressionCodec::Brotli => "brotli",
            CompressionCodec::Zstd => "zstd",
        }
    }
}

/// What a single push asks the engine to do.
///
/// The discriminants are positional and part of the caller contract.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, TryFromPrimitive)]
pub enum Operation {
    /// Compress what is available; the engine may hold some back.
    Process = 0,
    /// Push everything buffered through and emit a self-contained boundary.
    Flush   = 1,
    /// Drain everything and terminate the stream.
    Finish  = 2,
}

/// Input hint for the engine. `None` in params means "unspecified".
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, TryFromPrimitive, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncoderMode {
    Generic = 0,
    Text    = 1,
    Font    = 2,
}

/// Status flags refreshed after every engine call.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SessionStatus {
    /// Last operation completed without an unrecoverable error.
    pub success: bool,
    /// A compressed region is ready to be pulled.
    pub has_more_output: bool,
    /// Previously pushed input has not been fully consumed.
    pub has_remaining_input: bool,
    /// FINISH has been fully drained.
    pub is_finished: bool,
}

impl Default for SessionStatus {
    fn default() -> Self {
        Self {
            success: true,
            has_more_output: false,
            has_remaining_input: false,
            is_finished: false,
        }
    }
}

/// Construction parameters for an `EncoderSession`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderParams {
    pub codec: CompressionCodec,
    /// Fixed capacity of the input region (bytes).
    pub input_capacity: usize,
    /// Engine quality; `None` selects the codec default.
    pub quality: Option<u32>,
    /// Window size exponent.
    pub lgwin: u32,
    pub mode: Option<EncoderMode>,
    /// Upper bound on the size of one pulled region.
    pub output_chunk_size: usize,
}

impl Default for EncoderParams {
    fn default() -> Self {
        Self {
            codec: CompressionCodec::Brotli,
            input_capacity: DEFAULT_INPUT_CAPACITY,
            quality: None,
            lgwin: DEFAULT_LGWIN,
            mode: None,
            output_chunk_size: DEFAULT_OUTPUT_CHUNK_SIZE,
        }
    }
}

impl EncoderParams {
    pub fn new(codec: CompressionCodec, input_capacity: usize) -> Self {
        Self { codec, input_capacity, ..Self::default() }
    }

    pub fn with_quality(mut self, quality: u32) -> Self {
        self.quality = Some(quality);
        self
    }

    pub fn with_lgwin(mut self, lgwin: u32) -> Self {
        self.lgwin = lgwin;
        self
    }

    pub fn with_mode(mut self, mode: EncoderMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn with_output_chunk_size(mut self, size: usize) -> Self {
        self.output_chunk_size = size;
        self
    }

    /// Parse params from JSON; missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self, SessionError> {
        let params: EncoderParams = serde_json::from_str(text)?;
        params.validate()?;
        Ok(params)
    }

    /// Buffer-shape checks. Quality and window are the engine's call.
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.input_capacity == 0 {
            return Err(SessionError::invalid("buffer size must be positive"));
        }
        if self.input_capacity > MAX_INPUT_CAPACITY {
            return Err(SessionError::invalid(format!(
                "buffer size too large: {} > {}",
                self.input_capacity, MAX_INPUT_CAPACITY
            )));
        }
        if self.output_chunk_size < MIN_OUTPUT_CHUNK_SIZE {
            return Err(SessionError::invalid(format!(
                "output chunk size too small: {} < {}",
                self.output_chunk_size, MIN_OUTPUT_CHUNK_SIZE
            )));
        }
        Ok(())
    }
}

/// The external compression engine a session drives.
///
/// Output produced by `compress_stream` stays inside the engine until taken.
pub trait EncoderEngine: Send {
    fn codec(&self) -> CompressionCodec;

    /// Bind a prepared dictionary. `Ok(false)` means the engine declined it.
    fn attach_dictionary(&mut self, dict: &PreparedDictionary) -> Result<bool, SessionError>;

    /// Run `op` over `input`; returns how many bytes were consumed.
    fn compress_stream(&mut self, op: Operation, input: &[u8]) -> Result<usize, SessionError>;

    /// Hand out at most `max` bytes of ready output.
    fn take_output(&mut self, max: usize) -> Result<Bytes, SessionError>;

    fn has_more_output(&self) -> bool;

    /// Stream terminated and fully drained.
    fn is_finished(&self) -> bool;
}
