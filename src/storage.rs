//! Secure Storage Module
//!
//! Durable key/value storage for session tokens. On Windows the values are
//! encrypted with DPAPI before they touch the disk.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, error, info};

#[cfg(windows)]
use windows::Win32::Security::Cryptography::{
    CryptProtectData, CryptUnprotectData, CRYPTPROTECT_UI_FORBIDDEN,
};

/// Storage key holding the access token
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Storage key holding the refresh token
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Persistent string storage used by the auth store.
///
/// A missing key is `Ok(None)`, not an error. Removing a missing key succeeds.
pub trait TokenStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// File-backed storage, one encrypted file per key
pub struct SecureStorage {
    storage_path: PathBuf,
}

impl SecureStorage {
    /// Create storage under the platform's local data directory
    pub fn new() -> Self {
        Self::at(default_storage_dir())
    }

    /// Create storage rooted at `path`
    pub fn at(path: impl Into<PathBuf>) -> Self {
        let storage_path = path.into();

        if let Err(e) = std::fs::create_dir_all(&storage_path) {
            error!("Failed to create storage directory: {}", e);
        }

        debug!("Secure storage initialized at: {:?}", storage_path);

        Self { storage_path }
    }

    fn file_for(&self, key: &str) -> PathBuf {
        self.storage_path.join(format!("{}.dat", key))
    }

    #[cfg(windows)]
    fn encrypt(&self, data: &[u8]) -> Result<Vec<u8>, StorageError> {
        let input = dpapi::blob_in(data);
        let mut output = dpapi::blob_out();

        // SAFETY: `input` borrows `data` for the duration of the call and
        // `output` is released by `take` below
        unsafe {
            CryptProtectData(&input, None, None, None, None, CRYPTPROTECT_UI_FORBIDDEN, &mut output)
                .map_err(|e| StorageError::Encryption(format!("DPAPI encryption failed: {}", e)))?;
            Ok(dpapi::take(output))
        }
    }

    #[cfg(windows)]
    fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, StorageError> {
        let input = dpapi::blob_in(data);
        let mut output = dpapi::blob_out();

        // SAFETY: as in `encrypt`
        unsafe {
            CryptUnprotectData(&input, None, None, None, None, CRYPTPROTECT_UI_FORBIDDEN, &mut output)
                .map_err(|e| StorageError::Decryption(format!("DPAPI decryption failed: {}", e)))?;
            Ok(dpapi::take(output))
        }
    }

    #[cfg(not(windows))]
    fn encrypt(&self, data: &[u8]) -> Result<Vec<u8>, StorageError> {
        // No platform keystore wired up outside Windows
        Ok(data.to_vec())
    }

    #[cfg(not(windows))]
    fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, StorageError> {
        Ok(data.to_vec())
    }
}

impl TokenStorage for SecureStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let encrypted = match std::fs::read(self.file_for(key)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::Io(e.to_string())),
        };

        let decrypted = self.decrypt(&encrypted)?;

        String::from_utf8(decrypted)
            .map(Some)
            .map_err(|e| StorageError::Decryption(e.to_string()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let encrypted = self.encrypt(value.as_bytes())?;

        std::fs::write(self.file_for(key), encrypted).map_err(|e| StorageError::Io(e.to_string()))?;

        debug!("Saved encrypted value for key: {}", key);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.file_for(key)) {
            Ok(()) => {
                info!("Deleted stored value for key: {}", key);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e.to_string())),
        }
    }
}

impl Default for SecureStorage {
    fn default() -> Self {
        Self::new()
    }
}

/// In-process storage; nothing survives the process
#[derive(Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.values
            .lock()
            .map_err(|_| StorageError::Io("memory storage lock poisoned".into()))
    }
}

impl TokenStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.values()?.remove(key);
        Ok(())
    }
}

#[cfg(windows)]
mod dpapi {
    use windows::Win32::Foundation::{LocalFree, HLOCAL};
    use windows::Win32::Security::Cryptography::CRYPT_INTEGER_BLOB;

    pub(super) fn blob_in(data: &[u8]) -> CRYPT_INTEGER_BLOB {
        CRYPT_INTEGER_BLOB {
            cbData: data.len() as u32,
            pbData: data.as_ptr() as *mut u8,
        }
    }

    pub(super) fn blob_out() -> CRYPT_INTEGER_BLOB {
        CRYPT_INTEGER_BLOB {
            cbData: 0,
            pbData: std::ptr::null_mut(),
        }
    }

    /// Copy a DPAPI-allocated blob into a `Vec` and free the original
    pub(super) unsafe fn take(blob: CRYPT_INTEGER_BLOB) -> Vec<u8> {
        let bytes = std::slice::from_raw_parts(blob.pbData, blob.cbData as usize).to_vec();
        // DPAPI allocates with LocalAlloc; the caller owns the buffer
        let _ = LocalFree(HLOCAL(blob.pbData as *mut std::ffi::c_void));
        bytes
    }
}

/// Default on-disk location for persisted tokens
pub fn default_storage_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("WheelTracker")
}

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("Decryption error: {0}")]
    Decryption(String),
}
