//! compression/session.rs
//! Push-input / pull-output encoder session.
//!
//! Protocol notes:
//! - One fixed input region, filled by the caller before each push.
//! - All pending output must be pulled before the next push, for every
//!   operation, zero-length drains included.
//! - Unconsumed input must be finished with zero-length pushes; it can never
//!   be overwritten.
//! - A dictionary may only be attached before the first push.
//! - `destroy` is the primary release path. `Drop` only catches leaks.

use bytes::Bytes;

use crate::compression::registry::create_engine;
use crate::compression::types::{
    CompressionCodec, EncoderEngine, EncoderMode, EncoderParams, Operation, SessionStatus,
};
use crate::dictionary::{prepare_dictionary, PreparedDictionary, SharedDictionaryType};
use crate::telemetry::SessionCounters;
use crate::types::SessionError;

pub struct EncoderSession {
    engine: Option<Box<dyn EncoderEngine>>,
    codec: CompressionCodec,
    input: Vec<u8>,
    /// Unconsumed window of `input` from the last push.
    input_pos: usize,
    input_end: usize,
    output_chunk_size: usize,
    status: SessionStatus,
    fresh: bool,
    finishing: bool,
    counters: SessionCounters,
}

impl EncoderSession {
    /// Create a session with a fresh engine.
    ///
    /// # Errors
    /// - `InvalidArgument` if the buffer sizes are unusable.
    /// - `EngineInit` if the engine rejects quality/window or cannot be created.
    pub fn new(params: EncoderParams) -> Result<Self, SessionError> {
        params.validate()?;
        let engine = create_engine(&params)?;

        tracing::debug!(
            codec = params.codec.name(),
            input_capacity = params.input_capacity,
            quality = ?params.quality,
            lgwin = params.lgwin,
            mode = ?params.mode,
            "encoder session created"
        );

        Ok(Self {
            engine: Some(engine),
            codec: params.codec,
            input: vec![0u8; params.input_capacity],
            input_pos: 0,
            input_end: 0,
            output_chunk_size: params.output_chunk_size,
            status: SessionStatus::default(),
            fresh: true,
            finishing: false,
            counters: SessionCounters::default(),
        })
    }

    /// Brotli session from the four classic tuning knobs.
    pub fn with_settings(
        input_capacity: usize,
        quality: u32,
        lgwin: u32,
        mode: Option<EncoderMode>,
    ) -> Result<Self, SessionError> {
        let mut params = EncoderParams::new(CompressionCodec::Brotli, input_capacity)
            .with_quality(quality)
            .with_lgwin(lgwin);
        params.mode = mode;
        Self::new(params)
    }

    /// Session around an already built engine.
    #[cfg(test)]
    pub(crate) fn with_engine(
        engine: Box<dyn EncoderEngine>,
        input_capacity: usize,
        output_chunk_size: usize,
    ) -> Self {
        Self {
            codec: engine.codec(),
            engine: Some(engine),
            input: vec![0u8; input_capacity],
            input_pos: 0,
            input_end: 0,
            output_chunk_size,
            status: SessionStatus::default(),
            fresh: true,
            finishing: false,
            counters: SessionCounters::default(),
        }
    }

    fn engine_mut(&mut self) -> Result<&mut Box<dyn EncoderEngine>, SessionError> {
        self.engine
            .as_mut()
            .ok_or(SessionError::IllegalState("encoder is already destroyed"))
    }

    pub fn codec(&self) -> CompressionCodec {
        self.codec
    }

    /// Bind a prepared dictionary. Only legal before the first push.
    ///
    /// Returns `Ok(false)` when the engine declines; nothing is bound then.
    pub fn attach_dictionary(&mut self, dict: &PreparedDictionary) -> Result<bool, SessionError> {
        let fresh = self.fresh;
        let engine = self.engine_mut()?;
        if !fresh {
            return Err(SessionError::IllegalState("encoding is already started"));
        }
        let attached = engine.attach_dictionary(dict)?;
        tracing::debug!(attached, dict_len = dict.len(), "attach dictionary");
        Ok(attached)
    }

    /// Prepare `data` and bind it in one step.
    pub fn attach_raw_dictionary(
        &mut self,
        data: &[u8],
        kind: SharedDictionaryType,
    ) -> Result<bool, SessionError> {
        // Check ordering before spending time on preparation.
        self.engine_mut()?;
        if !self.fresh {
            return Err(SessionError::IllegalState("encoding is already started"));
        }
        let dict = prepare_dictionary(data, kind)?;
        self.attach_dictionary(&dict)
    }

    /// The fixed input region. Write a prefix, then `push` its length.
    pub fn input_region(&mut self) -> &mut [u8] {
        &mut self.input
    }

    pub fn input_capacity(&self) -> usize {
        self.input.len()
    }

    /// Run `op` over the first `length` bytes of the input region.
    ///
    /// With remaining input from the previous push, `length` must be 0 and the
    /// engine continues on the unconsumed bytes.
    pub fn push(&mut self, op: Operation, length: usize) -> Result<(), SessionError> {
        if length > self.input.len() {
            return Err(SessionError::invalid(format!(
                "block length {} exceeds input capacity {}",
                length,
                self.input.len()
            )));
        }
        if self.engine.is_none() {
            return Err(SessionError::IllegalState("encoder is already destroyed"));
        }
        if !self.status.success || self.status.has_more_output {
            return Err(SessionError::IllegalState("pushing input to encoder in unexpected state"));
        }
        if self.status.has_remaining_input && length != 0 {
            return Err(SessionError::IllegalState("pushing input to encoder over previous input"));
        }
        if self.status.is_finished && length != 0 {
            return Err(SessionError::IllegalState("pushing input to finished encoder"));
        }
        if self.finishing && op != Operation::Finish {
            return Err(SessionError::IllegalState("only FINISH is allowed after FINISH"));
        }

        // A fresh block replaces the window; a zero-length push continues it.
        let (start, end) = if length != 0 {
            (0, length)
        } else {
            (self.input_pos, self.input_end)
        };
        let engine = match self.engine.as_mut() {
            Some(e) => e,
            None => return Err(SessionError::IllegalState("encoder is already destroyed")),
        };

        let consumed = match engine.compress_stream(op, &self.input[start..end]) {
            Ok(n) => n,
            Err(SessionError::OutOfMemory(msg)) => {
                tracing::warn!(%msg, "engine out of memory during push");
                return Err(SessionError::OutOfMemory(msg));
            }
            Err(e) => {
                tracing::warn!(error = %e, op = ?op, "engine failure during push");
                self.status.success = false;
                return Err(e);
            }
        };

        self.input_pos = start + consumed;
        self.input_end = end;
        self.fresh = false;
        if op == Operation::Finish {
            self.finishing = true;
        }
        self.counters.add_push(op, consumed);
        self.refresh_status();

        tracing::trace!(
            op = ?op,
            length,
            consumed,
            status = ?self.status,
            "push"
        );
        Ok(())
    }

    fn refresh_status(&mut self) {
        if let Some(engine) = self.engine.as_ref() {
            self.status.has_more_output = engine.has_more_output();
            self.status.is_finished = engine.is_finished();
        }
        self.status.has_remaining_input = self.input_pos < self.input_end;
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_success(&self) -> bool {
        self.status.success
    }

    pub fn has_more_output(&self) -> bool {
        self.status.has_more_output
    }

    pub fn has_remaining_input(&self) -> bool {
        self.status.has_remaining_input
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_finished
    }

    /// No push has happened yet.
    pub fn is_fresh(&self) -> bool {
        self.fresh
    }

    pub fn is_destroyed(&self) -> bool {
        self.engine.is_none()
    }

    /// Take one region of ready output, at most `output_chunk_size` bytes.
    pub fn pull(&mut self) -> Result<Bytes, SessionError> {
        let max = self.output_chunk_size;
        let (success, ready) = (self.status.success, self.status.has_more_output);
        let engine = self.engine_mut()?;
        if !success || !ready {
            return Err(SessionError::IllegalState("pulling while data is not ready"));
        }

        let region = match engine.take_output(max) {
            Ok(region) => region,
            Err(e) => {
                tracing::warn!(error = %e, "engine failure during pull");
                if !matches!(e, SessionError::OutOfMemory(_)) {
                    self.status.success = false;
                }
                return Err(e);
            }
        };

        self.fresh = false;
        self.counters.add_pull(region.len());
        self.refresh_status();
        tracing::trace!(len = region.len(), status = ?self.status, "pull");
        Ok(region)
    }

    pub fn counters(&self) -> &SessionCounters {
        &self.counters
    }

    /// Release the engine. Every later call fails with `IllegalState`.
    pub fn destroy(&mut self) -> Result<(), SessionError> {
        match self.engine.take() {
            Some(engine) => {
                tracing::debug!(codec = engine.codec().name(), counters = ?self.counters, "encoder session destroyed");
                drop(engine);
                Ok(())
            }
            None => Err(SessionError::IllegalState("encoder is already destroyed")),
        }
    }
}

impl Drop for EncoderSession {
    fn drop(&mut self) {
        if let Some(engine) = self.engine.take() {
            tracing::warn!(codec = engine.codec().name(), "encoder session dropped without destroy; releasing engine");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::{Arc, Mutex};

    /// Failure injected into the next engine call.
    #[derive(Clone, Copy, Debug, PartialEq)]
    enum Fault {
        None,
        OutOfMemory,
        Broken,
    }

    /// Scripted engine: echoes input as output unless a fault is armed.
    struct ScriptedEngine {
        fault: Arc<Mutex<Fault>>,
        seen: Arc<Mutex<Vec<Vec<u8>>>>,
        pending: Vec<u8>,
        finished: bool,
    }

    impl ScriptedEngine {
        fn fail(&self) -> Result<(), SessionError> {
            match *self.fault.lock().unwrap() {
                Fault::None => Ok(()),
                Fault::OutOfMemory => Err(SessionError::OutOfMemory("scripted".into())),
                Fault::Broken => Err(SessionError::EngineFailure {
                    codec: "scripted",
                    msg: "scripted".into(),
                }),
            }
        }
    }

    impl EncoderEngine for ScriptedEngine {
        fn codec(&self) -> CompressionCodec {
            CompressionCodec::Brotli
        }

        fn attach_dictionary(&mut self, _dict: &PreparedDictionary) -> Result<bool, SessionError> {
            Ok(true)
        }

        fn compress_stream(&mut self, op: Operation, input: &[u8]) -> Result<usize, SessionError> {
            self.fail()?;
            self.seen.lock().unwrap().push(input.to_vec());
            self.pending.extend_from_slice(input);
            if op == Operation::Finish {
                self.finished = true;
            }
            Ok(input.len())
        }

        fn take_output(&mut self, max: usize) -> Result<Bytes, SessionError> {
            self.fail()?;
            let n = self.pending.len().min(max);
            Ok(Bytes::from(self.pending.drain(..n).collect::<Vec<u8>>()))
        }

        fn has_more_output(&self) -> bool {
            !self.pending.is_empty()
        }

        fn is_finished(&self) -> bool {
            self.finished && self.pending.is_empty()
        }
    }

    type Handles = (Arc<Mutex<Fault>>, Arc<Mutex<Vec<Vec<u8>>>>);

    fn scripted_session() -> (EncoderSession, Handles) {
        let fault = Arc::new(Mutex::new(Fault::None));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let engine = ScriptedEngine {
            fault: Arc::clone(&fault),
            seen: Arc::clone(&seen),
            pending: Vec::new(),
            finished: false,
        };
        (EncoderSession::with_engine(Box::new(engine), 64, 64), (fault, seen))
    }

    #[test]
    fn out_of_memory_on_push_keeps_prior_state() {
        let (mut s, (fault, seen)) = scripted_session();
        s.input_region()[..4].copy_from_slice(b"abcd");
        *fault.lock().unwrap() = Fault::OutOfMemory;

        let before = s.status();
        let err = s.push(Operation::Finish, 4).unwrap_err();
        assert!(matches!(err, SessionError::OutOfMemory(_)));
        assert_eq!(s.status(), before);
        assert!(s.is_fresh());

        // Still fresh: a dictionary may be attached, and PROCESS is still legal.
        let dict = prepare_dictionary(b"dictionary words", SharedDictionaryType::Raw).unwrap();
        assert!(s.attach_dictionary(&dict).unwrap());

        // Neither the window nor FINISH was committed.
        *fault.lock().unwrap() = Fault::None;
        s.push(Operation::Process, 0).unwrap();
        assert!(seen.lock().unwrap().last().unwrap().is_empty());
        assert!(!s.is_fresh());

        s.input_region()[..2].copy_from_slice(b"xy");
        s.push(Operation::Finish, 2).unwrap();
        assert_eq!(s.pull().unwrap(), Bytes::from_static(b"xy"));
        assert!(s.is_finished());
        s.destroy().unwrap();
    }

    #[test]
    fn engine_failure_on_push_poisons_session() {
        let (mut s, (fault, _)) = scripted_session();
        s.input_region()[..3].copy_from_slice(b"abc");
        *fault.lock().unwrap() = Fault::Broken;

        let err = s.push(Operation::Process, 3).unwrap_err();
        assert!(matches!(err, SessionError::EngineFailure { .. }));
        assert!(!s.is_success());

        *fault.lock().unwrap() = Fault::None;
        assert!(matches!(s.push(Operation::Process, 0), Err(SessionError::IllegalState(_))));
        assert!(matches!(s.pull(), Err(SessionError::IllegalState(_))));
        s.destroy().unwrap();
    }

    #[test]
    fn failures_during_pull() {
        let (mut s, (fault, _)) = scripted_session();
        s.input_region()[..3].copy_from_slice(b"abc");
        s.push(Operation::Process, 3).unwrap();

        *fault.lock().unwrap() = Fault::OutOfMemory;
        assert!(matches!(s.pull(), Err(SessionError::OutOfMemory(_))));
        assert!(s.is_success() && s.has_more_output());

        *fault.lock().unwrap() = Fault::Broken;
        assert!(matches!(s.pull(), Err(SessionError::EngineFailure { .. })));
        assert!(!s.is_success());
        assert!(matches!(s.pull(), Err(SessionError::IllegalState(_))));
        s.destroy().unwrap();
    }

    fn session(codec: CompressionCodec) -> EncoderSession {
        EncoderSession::new(EncoderParams::new(codec, 1024).with_quality(5)).unwrap()
    }

    #[test]
    fn zero_capacity_is_invalid() {
        let err = EncoderSession::with_settings(0, 5, 22, None).err().unwrap();
        assert!(matches!(err, SessionError::InvalidArgument(_)));
    }

    #[test]
    fn bad_window_is_engine_init_failure() {
        let err = EncoderSession::with_settings(1024, 5, 30, None).err().unwrap();
        assert!(matches!(err, SessionError::EngineInit { .. }));
    }

    #[test]
    fn fresh_status() {
        let s = session(CompressionCodec::Brotli);
        assert!(s.is_fresh());
        assert_eq!(s.status(), SessionStatus::default());
        assert!(s.is_success());
        assert!(!s.has_more_output() && !s.has_remaining_input() && !s.is_finished());
    }

    #[test]
    fn length_over_capacity_is_invalid_and_keeps_fresh() {
        let mut s = session(CompressionCodec::Brotli);
        let err = s.push(Operation::Process, 1025).unwrap_err();
        assert!(matches!(err, SessionError::InvalidArgument(_)));
        assert!(s.is_fresh());
    }

    #[test]
    fn pull_before_ready_is_illegal() {
        let mut s = session(CompressionCodec::Zstd);
        assert!(matches!(s.pull(), Err(SessionError::IllegalState(_))));
    }

    #[test]
    fn double_destroy_is_illegal() {
        let mut s = session(CompressionCodec::Zstd);
        s.destroy().unwrap();
        assert!(s.is_destroyed());
        assert!(matches!(s.destroy(), Err(SessionError::IllegalState(_))));
        assert!(matches!(s.push(Operation::Process, 0), Err(SessionError::IllegalState(_))));
        assert!(matches!(s.pull(), Err(SessionError::IllegalState(_))));
    }

    #[test]
    fn process_after_finish_is_illegal() {
        let mut s = session(CompressionCodec::Brotli);
        s.input_region()[..3].copy_from_slice(b"abc");
        s.push(Operation::Finish, 3).unwrap();
        while s.has_more_output() {
            s.pull().unwrap();
        }
        assert!(s.is_finished());
        assert!(matches!(s.push(Operation::Process, 0), Err(SessionError::IllegalState(_))));
        assert!(matches!(s.push(Operation::Finish, 1), Err(SessionError::IllegalState(_))));
        s.push(Operation::Finish, 0).unwrap();
        s.destroy().unwrap();
    }
}
