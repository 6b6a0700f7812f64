//! compression/stream.rs
//! Drive a session from any `Read`, yielding compressed regions.
use std::io::{ErrorKind, Read};

use bytes::Bytes;

use crate::compression::session::EncoderSession;
use crate::compression::types::{EncoderParams, Operation};
use crate::dictionary::PreparedDictionary;
use crate::types::SessionError;

/// Compress everything `r` yields, one input-region-sized block at a time.
///
/// - PROCESS per block, FINISH at EOF.
/// - All output is pulled before the next push.
/// - The session is destroyed once the stream is finished.
pub fn compress_reader<R: Read>(
    mut r: R,
    mut session: EncoderSession,
) -> impl Iterator<Item = Result<Bytes, SessionError>> {
    let mut eof = false;
    let mut done = false;

    std::iter::from_fn(move || loop {
        if done {
            return None;
        }

        let step = if session.has_more_output() {
            match session.pull() {
                Ok(region) if region.is_empty() => Ok(()),
                Ok(region) => return Some(Ok(region)),
                Err(e) => Err(e),
            }
        } else if session.is_finished() {
            done = true;
            return match session.destroy() {
                Ok(()) => None,
                Err(e) => Some(Err(e)),
            };
        } else if session.has_remaining_input() || eof {
            let op = if eof { Operation::Finish } else { Operation::Process };
            session.push(op, 0)
        } else {
            match read_block(&mut r, session.input_region()) {
                Ok(0) => {
                    eof = true;
                    session.push(Operation::Finish, 0)
                }
                Ok(n) => session.push(Operation::Process, n),
                Err(e) => Err(e),
            }
        };

        if let Err(e) = step {
            done = true;
            return Some(Err(e));
        }
    })
}

fn read_block<R: Read>(r: &mut R, buf: &mut [u8]) -> Result<usize, SessionError> {
    loop {
        match r.read(buf) {
            Ok(n) => return Ok(n),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
}

/// One-shot helper: compress `data` with a new session built from `params`.
pub fn compress_to_vec(params: EncoderParams, data: &[u8]) -> Result<Vec<u8>, SessionError> {
    let session = EncoderSession::new(params)?;
    collect(compress_reader(data, session))
}

/// One-shot helper with a dictionary bound before the first push.
///
/// Fails with `IllegalState` if the engine declines the dictionary.
pub fn compress_to_vec_with_dictionary(
    params: EncoderParams,
    dict: &PreparedDictionary,
    data: &[u8],
) -> Result<Vec<u8>, SessionError> {
    let mut session = EncoderSession::new(params)?;
    if !session.attach_dictionary(dict)? {
        session.destroy()?;
        return Err(SessionError::IllegalState("engine declined dictionary"));
    }
    collect(compress_reader(data, session))
}

fn collect(regions: impl Iterator<Item = Result<Bytes, SessionError>>) -> Result<Vec<u8>, SessionError> {
    let mut out = Vec::new();
    for region in regions {
        out.extend_from_slice(&region?);
    }
    Ok(out)
}
