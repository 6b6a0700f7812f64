//! dictionary/prepared.rs
//! Transform raw dictionary bytes into an engine-ready, shareable form.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use num_enum::TryFromPrimitive;

use crate::compression::constants::ZSTD_DICT_MAGIC;
use crate::constants::MAX_DICTIONARY_SIZE;
use crate::types::SessionError;

/// How the dictionary bytes are laid out.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, TryFromPrimitive)]
pub enum SharedDictionaryType {
    /// Plain content; any bytes are acceptable.
    Raw        = 0,
    /// Engine-serialized (trained) dictionary with a leading magic number.
    Serialized = 1,
}

struct PreparedInner {
    kind: SharedDictionaryType,
    raw: Bytes,
}

impl Drop for PreparedInner {
    fn drop(&mut self) {
        tracing::trace!(len = self.raw.len(), kind = ?self.kind, "releasing prepared dictionary");
    }
}

/// Immutable prepared dictionary.
///
/// Clones share one validated copy of the bytes, released exactly once when
/// the last handle goes away. Engines load it at their own quality and window.
#[derive(Clone)]
pub struct PreparedDictionary {
    inner: Arc<PreparedInner>,
}

impl PreparedDictionary {
    pub fn kind(&self) -> SharedDictionaryType {
        self.inner.kind
    }

    pub fn len(&self) -> usize {
        self.inner.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.raw.is_empty()
    }

    /// The bytes this dictionary was prepared from.
    pub fn as_bytes(&self) -> &[u8] {
        &self.inner.raw
    }

    /// Number of live handles sharing the engine-side resource.
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Release this handle now instead of at end of scope.
    pub fn destroy(self) {
        tracing::debug!(remaining = self.handle_count() - 1, "destroying prepared dictionary handle");
        drop(self);
    }
}

impl fmt::Debug for PreparedDictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreparedDictionary")
            .field("kind", &self.inner.kind)
            .field("len", &self.inner.raw.len())
            .finish()
    }
}

/// Validate and transform `data` into a `PreparedDictionary`.
///
/// # Errors
/// - `InvalidArgument` for an empty or oversized region, or a serialized
///   dictionary without its magic number.
/// - `OutOfMemory` if the shared copy cannot be allocated.
pub fn prepare_dictionary(
    data: &[u8],
    kind: SharedDictionaryType,
) -> Result<PreparedDictionary, SessionError> {
    if data.is_empty() {
        return Err(SessionError::invalid("empty dictionary"));
    }
    if data.len() > MAX_DICTIONARY_SIZE {
        return Err(SessionError::invalid(format!(
            "dictionary too large: {} > {}",
            data.len(),
            MAX_DICTIONARY_SIZE
        )));
    }
    if kind == SharedDictionaryType::Serialized && !data.starts_with(&ZSTD_DICT_MAGIC) {
        return Err(SessionError::invalid("serialized dictionary lacks magic number"));
    }

    let mut copy = Vec::new();
    copy.try_reserve_exact(data.len()).map_err(|e| {
        SessionError::OutOfMemory(format!("preparing {} byte dictionary: {}", data.len(), e))
    })?;
    copy.extend_from_slice(data);

    tracing::debug!(len = data.len(), kind = ?kind, "prepared shared dictionary");
    Ok(PreparedDictionary {
        inner: Arc::new(PreparedInner {
            kind,
            raw: Bytes::from(copy),
        }),
    })
}
