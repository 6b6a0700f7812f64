//! src/compression/codecs/zstd.rs
//!
//! Zstd engine over a raw `zstd_safe` compression context.
//!
//! Design notes:
//! - Every call writes into a scratch region of `out_chunk` bytes, so a large
//!   input can leave bytes unconsumed until the caller pulls.
//! - FLUSH / FINISH are recorded in `drain` until the context reports nothing
//!   left; pulls keep driving them.
//! - Dictionaries are loaded into the context after level and window are set,
//!   so both still apply to dictionary streams.

use bytes::{Bytes, BytesMut};
use zstd_safe::zstd_sys::{ZSTD_EndDirective, ZSTD_ErrorCode};
use zstd_safe::{CCtx, CParameter, ErrorCode, InBuffer, OutBuffer};

use crate::compression::types::{CompressionCodec, EncoderEngine, Operation};
use crate::dictionary::PreparedDictionary;
use crate::types::SessionError;

/// Map a context error code; allocation failures keep their own variant.
fn engine_error(code: ErrorCode) -> SessionError {
    let name = zstd_safe::get_error_name(code);
    let alloc_failure = 0usize.wrapping_sub(ZSTD_ErrorCode::ZSTD_error_memory_allocation as usize);
    if code == alloc_failure {
        SessionError::OutOfMemory(format!("zstd: {}", name))
    } else {
        SessionError::EngineFailure { codec: "zstd", msg: name.to_string() }
    }
}

pub struct ZstdEngine {
    context: CCtx<'static>,
    out_chunk: usize,
    pending: BytesMut,
    drain: Option<Operation>,
    finished: bool,
}

impl ZstdEngine {
    pub fn new(quality: u32, lgwin: u32, out_chunk: usize) -> Result<Self, SessionError> {
        let init = |msg: String| SessionError::EngineInit { codec: "zstd", msg };

        let mut context = CCtx::try_create().ok_or_else(|| init("context allocation failed".into()))?;
        context
            .set_parameter(CParameter::CompressionLevel(quality as i32))
            .map_err(|c| init(zstd_safe::get_error_name(c).to_string()))?;
        context
            .set_parameter(CParameter::WindowLog(lgwin))
            .map_err(|c| init(zstd_safe::get_error_name(c).to_string()))?;

        Ok(Self {
            context,
            out_chunk,
            pending: BytesMut::new(),
            drain: None,
            finished: false,
        })
    }

    /// One flush/end step into `out`. Clears `drain` once the context is empty.
    fn step_drain(&mut self, op: Operation, out: &mut OutBuffer<'_, [u8]>) -> Result<(), SessionError> {
        let remaining = match op {
            Operation::Flush => self.context.flush_stream(out),
            Operation::Finish => self.context.end_stream(out),
            Operation::Process => return Ok(()),
        }
        .map_err(engine_error)?;

        if remaining == 0 {
            self.drain = None;
            if op == Operation::Finish {
                self.finished = true;
            }
        }
        Ok(())
    }

    fn drive_drain(&mut self) -> Result<(), SessionError> {
        let Some(op) = self.drain else {
            return Ok(());
        };
        let mut scratch = vec![0u8; self.out_chunk];
        let produced = {
            let mut out = OutBuffer::around(&mut scratch[..]);
            self.step_drain(op, &mut out)?;
            out.pos()
        };
        self.pending.extend_from_slice(&scratch[..produced]);
        Ok(())
    }
}

impl EncoderEngine for ZstdEngine {
    fn codec(&self) -> CompressionCodec {
        CompressionCodec::Zstd
    }

    fn attach_dictionary(&mut self, dict: &PreparedDictionary) -> Result<bool, SessionError> {
        match self.context.load_dictionary(dict.as_bytes()) {
            Ok(_) => Ok(true),
            Err(code) => match engine_error(code) {
                SessionError::OutOfMemory(msg) => Err(SessionError::OutOfMemory(msg)),
                other => {
                    tracing::warn!(error = %other, "zstd engine rejected dictionary");
                    Ok(false)
                }
            },
        }
    }

    fn compress_stream(&mut self, op: Operation, input: &[u8]) -> Result<usize, SessionError> {
        if self.finished {
            if input.is_empty() {
                return Ok(0);
            }
            return Err(SessionError::EngineFailure {
                codec: "zstd",
                msg: "input after end of stream".into(),
            });
        }

        let mut scratch = vec![0u8; self.out_chunk];
        let cap = scratch.len();
        let (consumed, produced) = {
            let mut out = OutBuffer::around(&mut scratch[..]);
            let mut src = InBuffer::around(input);

            while src.pos() < input.len() && out.pos() < cap {
                let before = (src.pos(), out.pos());
                self.context
                    .compress_stream2(&mut out, &mut src, ZSTD_EndDirective::ZSTD_e_continue)
                    .map_err(engine_error)?;
                if (src.pos(), out.pos()) == before {
                    break;
                }
            }

            if src.pos() == input.len() && op != Operation::Process {
                self.drain = Some(op);
                if out.pos() < cap {
                    self.step_drain(op, &mut out)?;
                }
            }
            (src.pos(), out.pos())
        };

        self.pending.extend_from_slice(&scratch[..produced]);
        Ok(consumed)
    }

    fn take_output(&mut self, max: usize) -> Result<Bytes, SessionError> {
        if self.pending.is_empty() {
            self.drive_drain()?;
        }
        let n = self.pending.len().min(max);
        Ok(self.pending.split_to(n).freeze())
    }

    fn has_more_output(&self) -> bool {
        !self.pending.is_empty() || self.drain.is_some()
    }

    fn is_finished(&self) -> bool {
        self.finished && self.pending.is_empty()
    }
}
