//! dictionary/digest.rs
//! Reference digests of the canonical dictionary and comparison helpers.

use std::convert::TryFrom;

use md5::Md5;
use sha1::Sha1;
use sha2::{Digest as _, Sha256};

use crate::constants::rfc_digests;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum DigestError {
    #[error("unknown digest algorithm: 0x{0:04x}")]
    UnknownAlgorithm(u16),
}

/// Digest algorithms with an embedded reference value.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DigestKind {
    Md5    = 0x0001,
    Sha1   = 0x0002,
    Sha256 = 0x0003,
}

impl TryFrom<u16> for DigestKind {
    type Error = DigestError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0x0001 => Ok(DigestKind::Md5),
            0x0002 => Ok(DigestKind::Sha1),
            0x0003 => Ok(DigestKind::Sha256),
            _ => Err(DigestError::UnknownAlgorithm(value)),
        }
    }
}

impl DigestKind {
    pub const ALL: [DigestKind; 3] = [DigestKind::Md5, DigestKind::Sha1, DigestKind::Sha256];

    /// Reference digest of the canonical dictionary.
    pub fn reference(self) -> &'static [u8] {
        match self {
            DigestKind::Md5 => &rfc_digests::MD5,
            DigestKind::Sha1 => &rfc_digests::SHA1,
            DigestKind::Sha256 => &rfc_digests::SHA256,
        }
    }

    pub fn output_len(self) -> usize {
        self.reference().len()
    }

    pub fn compute(self, data: &[u8]) -> Vec<u8> {
        let mut state = DigestState::new(self);
        state.update(data);
        state.finalize()
    }
}

/// Internal hashing state.
pub enum DigestState {
    Md5(Md5),
    Sha1(Sha1),
    Sha256(Sha256),
}

impl DigestState {
    pub fn new(kind: DigestKind) -> Self {
        match kind {
            DigestKind::Md5 => DigestState::Md5(Md5::new()),
            DigestKind::Sha1 => DigestState::Sha1(Sha1::new()),
            DigestKind::Sha256 => DigestState::Sha256(Sha256::new()),
        }
    }

    #[inline]
    pub fn update(&mut self, data: &[u8]) {
        match self {
            DigestState::Md5(h) => h.update(data),
            DigestState::Sha1(h) => h.update(data),
            DigestState::Sha256(h) => h.update(data),
        }
    }

    #[inline]
    pub fn finalize(self) -> Vec<u8> {
        match self {
            DigestState::Md5(h) => h.finalize().to_vec(),
            DigestState::Sha1(h) => h.finalize().to_vec(),
            DigestState::Sha256(h) => h.finalize().to_vec(),
        }
    }
}

/// Compare a caller-computed digest with the canonical reference. Pure.
pub fn check_digest(digest: &[u8], kind: DigestKind) -> bool {
    digest == kind.reference()
}

/// Hash `data` and compare it with the canonical reference.
pub fn verify_canonical(data: &[u8], kind: DigestKind) -> bool {
    check_digest(&kind.compute(data), kind)
}

/// Lowercase hex of the reference digest, as published.
pub fn reference_hex(kind: DigestKind) -> String {
    hex::encode(kind.reference())
}
