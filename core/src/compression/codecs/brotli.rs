//! codecs/brotli.rs
//! Brotli engine over the `brotli` crate's native encoder state.
//!
//! Design notes:
//! - Output stays inside the encoder state until `take_output`; no copy queue.
//! - The state takes input at most one block past its ring buffer, so a large
//!   push can leave bytes unconsumed until the caller pulls.
//! - Custom dictionaries are ignored by the encoder at quality 0 and 1, so
//!   they are declined there.

use brotli::enc::encode::{
    BrotliEncoderDestroyInstance, BrotliEncoderOperation, BrotliEncoderParameter,
    BrotliEncoderStateStruct,
};
use brotli::enc::{interface, StandardAlloc};
use bytes::Bytes;

use crate::compression::types::{CompressionCodec, EncoderEngine, EncoderMode, Operation};
use crate::dictionary::PreparedDictionary;
use crate::types::SessionError;

/// Lowest quality at which the encoder honours a custom dictionary.
const MIN_DICT_QUALITY: u32 = 2;

fn map_op(op: Operation) -> BrotliEncoderOperation {
    match op {
        Operation::Process => BrotliEncoderOperation::BROTLI_OPERATION_PROCESS,
        Operation::Flush => BrotliEncoderOperation::BROTLI_OPERATION_FLUSH,
        Operation::Finish => BrotliEncoderOperation::BROTLI_OPERATION_FINISH,
    }
}

pub struct BrotliEngine {
    state: BrotliEncoderStateStruct<StandardAlloc>,
    quality: u32,
}

impl BrotliEngine {
    /// Range checks happen in the registry; this only configures the state.
    pub fn new(quality: u32, lgwin: u32, mode: Option<EncoderMode>) -> Result<Self, SessionError> {
        let mut state = BrotliEncoderStateStruct::new(StandardAlloc::default());
        let mode = mode.unwrap_or(EncoderMode::Generic) as u32;

        let accepted = state.set_parameter(BrotliEncoderParameter::BROTLI_PARAM_QUALITY, quality)
            && state.set_parameter(BrotliEncoderParameter::BROTLI_PARAM_LGWIN, lgwin)
            && state.set_parameter(BrotliEncoderParameter::BROTLI_PARAM_MODE, mode);
        if !accepted {
            return Err(SessionError::EngineInit {
                codec: "brotli",
                msg: format!("rejected quality {} / window {} / mode {}", quality, lgwin, mode),
            });
        }
        Ok(Self { state, quality })
    }
}

impl EncoderEngine for BrotliEngine {
    fn codec(&self) -> CompressionCodec {
        CompressionCodec::Brotli
    }

    fn attach_dictionary(&mut self, dict: &PreparedDictionary) -> Result<bool, SessionError> {
        if self.quality < MIN_DICT_QUALITY {
            tracing::debug!(quality = self.quality, "brotli fast mode declined shared dictionary");
            return Ok(false);
        }
        self.state.set_custom_dictionary(dict.len(), dict.as_bytes());
        Ok(true)
    }

    fn compress_stream(&mut self, op: Operation, input: &[u8]) -> Result<usize, SessionError> {
        let mut nop_callback =
            |_data: &mut interface::PredictionModeContextMap<interface::InputReferenceMut>,
             _cmds: &mut [interface::StaticCommand],
             _mb: interface::InputPair,
             _alloc: &mut StandardAlloc| ();

        let mut available_in = input.len();
        let mut input_offset = 0usize;
        // Zero output space keeps everything in the state's own storage.
        let mut available_out = 0usize;
        let mut output_offset = 0usize;
        let mut total_out: Option<usize> = None;

        let ok = self.state.compress_stream(
            map_op(op),
            &mut available_in,
            input,
            &mut input_offset,
            &mut available_out,
            &mut [],
            &mut output_offset,
            &mut total_out,
            &mut nop_callback,
        );
        if !ok {
            return Err(SessionError::EngineFailure {
                codec: "brotli",
                msg: format!("encoder rejected {:?} over {} bytes", op, input.len()),
            });
        }
        Ok(input.len() - available_in)
    }

    fn take_output(&mut self, max: usize) -> Result<Bytes, SessionError> {
        let mut size = max;
        let region = self.state.take_output(&mut size);
        Ok(Bytes::copy_from_slice(region))
    }

    fn has_more_output(&self) -> bool {
        self.state.has_more_output()
    }

    fn is_finished(&self) -> bool {
        self.state.is_finished()
    }
}

impl Drop for BrotliEngine {
    fn drop(&mut self) {
        BrotliEncoderDestroyInstance(&mut self.state);
    }
}
