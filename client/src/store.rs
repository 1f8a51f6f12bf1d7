//! Durable session-token storage.
//!
//! DESIGN
//! ======
//! All reads and writes of the persisted token go through [`TokenStore`];
//! no other component touches storage. At most one token exists per
//! profile. No expiry is tracked here — the backend rejects stale tokens
//! on validation.

use std::io;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

/// File name holding the token under the store directory.
pub const TOKEN_FILE_NAME: &str = "session_token";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("token storage i/o error: {0}")]
    Io(#[from] io::Error),
}

/// Synchronous token persistence. `save` overwrites any previous token;
/// `clear` is a no-op when nothing is stored.
pub trait TokenStore: Send + Sync {
    /// Persist the token, replacing any existing one.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backing storage cannot be written.
    fn save(&self, token: &str) -> Result<(), StoreError>;

    /// Read the stored token, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backing storage cannot be read.
    fn load(&self) -> Result<Option<String>, StoreError>;

    /// Remove the stored token.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backing storage cannot be written.
    fn clear(&self) -> Result<(), StoreError>;
}

// =============================================================================
// FILE-BACKED STORE
// =============================================================================

/// Token persisted as a single file under a caller-supplied directory.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Store under `dir`, in a file named [`TOKEN_FILE_NAME`].
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { path: dir.into().join(TOKEN_FILE_NAME) }
    }
}

impl TokenStore for FileTokenStore {
    // Write-to-temp-then-rename, so a crash mid-write never leaves a
    // truncated token behind. The rename is atomic on the same filesystem.
    fn save(&self, token: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, token.trim())?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn load(&self) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => {
                let token = raw.trim();
                if token.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(token.to_owned()))
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn clear(&self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// =============================================================================
// IN-MEMORY STORE
// =============================================================================

/// Volatile store for tests and embedders without a durable profile dir.
#[derive(Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn save(&self, token: &str) -> Result<(), StoreError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) =
            Some(token.trim().to_owned());
        Ok(())
    }

    fn load(&self) -> Result<Option<String>, StoreError> {
        Ok(self
            .token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
