//! compression/registry.rs
//! Codec registry and engine factory.

use crate::compression::codecs::{brotli::BrotliEngine, zstd::ZstdEngine};
use crate::compression::constants::*;
use crate::compression::types::{CompressionCodec, EncoderEngine, EncoderParams};
use crate::types::SessionError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodecInfo {
    pub name: &'static str,
    pub supports_dict: bool,
    pub default_quality: u32,
    pub quality_range: (u32, u32),
    pub lgwin_range: (u32, u32),
}

impl CodecInfo {
    /// Reject quality/window values outside the engine's range.
    pub fn check(&self, quality: u32, lgwin: u32) -> Result<(), SessionError> {
        let (qmin, qmax) = self.quality_range;
        if quality < qmin || quality > qmax {
            return Err(SessionError::EngineInit {
                codec: self.name,
                msg: format!("quality {} outside {}..={}", quality, qmin, qmax),
            });
        }
        let (wmin, wmax) = self.lgwin_range;
        if lgwin < wmin || lgwin > wmax {
            return Err(SessionError::EngineInit {
                codec: self.name,
                msg: format!("window log {} outside {}..={}", lgwin, wmin, wmax),
            });
        }
        Ok(())
    }
}

pub fn resolve(codec_id: u16) -> Result<CodecInfo, SessionError> {
    match codec_id {
        x if x == codec_ids::BROTLI => Ok(CodecInfo {
            name: "brotli",
            supports_dict: true,
            default_quality: DEFAULT_QUALITY_BROTLI,
            quality_range: BROTLI_QUALITY_RANGE,
            lgwin_range: BROTLI_LGWIN_RANGE,
        }),
        x if x == codec_ids::ZSTD => Ok(CodecInfo {
            name: "zstd",
            supports_dict: true,
            default_quality: DEFAULT_QUALITY_ZSTD,
            quality_range: ZSTD_QUALITY_RANGE,
            lgwin_range: ZSTD_LGWIN_RANGE,
        }),
        other => Err(SessionError::UnsupportedCodec { codec_id: other }),
    }
}

/// Build a fresh engine for `params`. Quality falls back to the codec default.
pub fn create_engine(params: &EncoderParams) -> Result<Box<dyn EncoderEngine>, SessionError> {
    let info = resolve(params.codec as u16)?;
    let quality = params.quality.unwrap_or(info.default_quality);
    info.check(quality, params.lgwin)?;

    match params.codec {
        CompressionCodec::Brotli => Ok(Box::new(BrotliEngine::new(
            quality,
            params.lgwin,
            params.mode,
        )?)),
        CompressionCodec::Zstd => Ok(Box::new(ZstdEngine::new(
            quality,
            params.lgwin,
            params.output_chunk_size,
        )?)),
    }
}
