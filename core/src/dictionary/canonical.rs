//! dictionary/canonical.rs
//! Process-wide, install-once canonical dictionary.
//!
//! Notes:
//! - The installed check and the install itself happen under one lock, so two
//!   threads racing to install cannot both win.
//! - Repeat installs after the first success are silent no-ops.
//! - Size is an exact contract: short, long and overflowing streams are rejected.

use std::io::{ErrorKind, Read};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::constants::{INSTALL_READ_BLOCK, RFC_DICTIONARY_SIZE};
use crate::types::SessionError;

pub struct DictionaryInstaller {
    installed: Mutex<Option<Arc<[u8]>>>,
}

impl Default for DictionaryInstaller {
    fn default() -> Self {
        Self::new()
    }
}

impl DictionaryInstaller {
    pub const fn new() -> Self {
        Self { installed: Mutex::new(None) }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Arc<[u8]>>> {
        match self.installed.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Install from an in-memory region of exactly `RFC_DICTIONARY_SIZE` bytes.
    pub fn install(&self, data: &[u8]) -> Result<(), SessionError> {
        if data.len() != RFC_DICTIONARY_SIZE {
            return Err(SessionError::invalid(format!(
                "invalid dictionary size: {} != {}",
                data.len(),
                RFC_DICTIONARY_SIZE
            )));
        }

        let mut slot = self.lock();
        if slot.is_some() {
            return Ok(());
        }
        *slot = Some(Arc::from(data));
        tracing::info!(len = data.len(), "canonical dictionary installed");
        Ok(())
    }

    /// Install from a stream yielding exactly `RFC_DICTIONARY_SIZE` bytes.
    ///
    /// The stream is not read at all when a dictionary is already installed.
    pub fn install_from_reader<R: Read>(&self, mut src: R) -> Result<(), SessionError> {
        let mut slot = self.lock();
        if slot.is_some() {
            return Ok(());
        }

        let mut copy = Vec::with_capacity(RFC_DICTIONARY_SIZE);
        let mut buffer = [0u8; INSTALL_READ_BLOCK];
        loop {
            let n = match src.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            if RFC_DICTIONARY_SIZE - copy.len() < n {
                return Err(SessionError::invalid("invalid dictionary size: stream too long"));
            }
            copy.extend_from_slice(&buffer[..n]);
        }
        if copy.len() != RFC_DICTIONARY_SIZE {
            return Err(SessionError::invalid(format!(
                "invalid dictionary size: {} bytes short",
                RFC_DICTIONARY_SIZE - copy.len()
            )));
        }

        *slot = Some(Arc::from(copy));
        tracing::info!(len = RFC_DICTIONARY_SIZE, "canonical dictionary installed from stream");
        Ok(())
    }

    pub fn is_installed(&self) -> bool {
        self.lock().is_some()
    }

    pub fn installed(&self) -> Option<Arc<[u8]>> {
        self.lock().clone()
    }
}

static GLOBAL_INSTALLER: DictionaryInstaller = DictionaryInstaller::new();

/// The process-wide installer.
pub fn global_installer() -> &'static DictionaryInstaller {
    &GLOBAL_INSTALLER
}

pub fn install_dictionary_data(data: &[u8]) -> Result<(), SessionError> {
    GLOBAL_INSTALLER.install(data)
}

pub fn install_dictionary_reader<R: Read>(src: R) -> Result<(), SessionError> {
    GLOBAL_INSTALLER.install_from_reader(src)
}

pub fn is_dictionary_installed() -> bool {
    GLOBAL_INSTALLER.is_installed()
}

pub fn installed_dictionary() -> Option<Arc<[u8]>> {
    GLOBAL_INSTALLER.installed()
}
