//! Encrypted key/value persistence.
//!
//! All entries live in memory and are mirrored to a single file on every
//! write. The file holds a ChaCha20-Poly1305 ciphertext of the entry map,
//! written atomically under an exclusive lock. Reads never fail at the call
//! site: missing, unreadable or malformed values come back as `None`.

use crate::{Error, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Key, Nonce,
};
use fs2::FileExt;
use rand::{rngs::OsRng, RngCore};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tempfile::NamedTempFile;

const CURRENT_VERSION: u32 = 1;
const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;

#[derive(Serialize, Deserialize, Default)]
struct PlainEntries {
    version: u32,
    entries: HashMap<String, String>,
}

#[derive(Serialize, Deserialize)]
struct EncryptedFile {
    version: u32,
    nonce: String,
    ciphertext: String,
}

/// Synchronous encrypted key/value store
pub struct SecureStorage {
    path: Option<PathBuf>,
    key: [u8; KEY_LEN],
    entries: Mutex<HashMap<String, String>>,
}

impl SecureStorage {
    /// Open (or create) the store at `path` encrypted with `key`
    ///
    /// A file that cannot be read, decrypted or parsed is logged and
    /// treated as empty; it is overwritten on the next write.
    pub fn open(path: impl Into<PathBuf>, key: [u8; KEY_LEN]) -> Self {
        let path = path.into();
        let entries = load_entries(&path, &key);
        tracing::debug!("Opened secure storage at {:?} ({} entries)", path, entries.len());
        Self {
            path: Some(path),
            key,
            entries: Mutex::new(entries),
        }
    }

    /// A store that never touches disk
    pub fn in_memory() -> Self {
        Self {
            path: None,
            key: [0u8; KEY_LEN],
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get_string(&self, key: impl AsRef<str>) -> Option<String> {
        self.entries().get(key.as_ref()).cloned()
    }

    pub fn set_string(&self, key: impl AsRef<str>, value: &str) -> Result<()> {
        self.write(|entries| {
            entries.insert(key.as_ref().to_string(), value.to_string());
            Ok(())
        })
    }

    pub fn get_bool(&self, key: impl AsRef<str>) -> Option<bool> {
        let key = key.as_ref();
        let raw = self.get_string(key)?;
        match raw.as_str() {
            "true" => Some(true),
            "false" => Some(false),
            other => {
                tracing::warn!("Stored value for {} is not a boolean: {:?}", key, other);
                None
            }
        }
    }

    pub fn set_bool(&self, key: impl AsRef<str>, value: bool) -> Result<()> {
        self.set_string(key, if value { "true" } else { "false" })
    }

    pub fn get_number(&self, key: impl AsRef<str>) -> Option<f64> {
        let key = key.as_ref();
        let raw = self.get_string(key)?;
        match raw.parse::<f64>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Stored value for {} is not a number: {}", key, e);
                None
            }
        }
    }

    pub fn set_number(&self, key: impl AsRef<str>, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(Error::InvalidValue(format!(
                "cannot store non-finite number under {}",
                key.as_ref()
            )));
        }
        self.set_string(key, &value.to_string())
    }

    /// Read a JSON-encoded value
    ///
    /// Returns `None` when the key is absent or the stored text does not
    /// decode as `T`.
    pub fn get_object<T: DeserializeOwned>(&self, key: impl AsRef<str>) -> Option<T> {
        let key = key.as_ref();
        let raw = self.get_string(key)?;
        parse_object(key, &raw)
    }

    pub fn set_object<T: Serialize + ?Sized>(&self, key: impl AsRef<str>, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.set_string(key, &json)
    }

    /// Read-modify-write of a JSON value against the latest stored state
    ///
    /// `f` receives the current value (`None` when absent or unreadable) and
    /// returns the value to store. Concurrent writers to the same file are
    /// serialized, so an update made by another process is never overwritten.
    pub fn update_object<T, F>(&self, key: impl AsRef<str>, f: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(Option<T>) -> T,
    {
        let key = key.as_ref();
        self.write(|entries| {
            let current = entries.get(key).and_then(|raw| parse_object::<T>(key, raw));
            let next = f(current);
            entries.insert(key.to_string(), serde_json::to_string(&next)?);
            Ok(next)
        })
    }

    pub fn contains(&self, key: impl AsRef<str>) -> bool {
        self.entries().contains_key(key.as_ref())
    }

    pub fn remove(&self, key: impl AsRef<str>) -> Result<()> {
        self.write(|entries| {
            entries.remove(key.as_ref());
            Ok(())
        })
    }

    /// Stored keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn clear_all(&self) -> Result<()> {
        self.write(|entries| {
            entries.clear();
            Ok(())
        })
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Apply `op` to a copy of the latest entries, persist the copy, then
    /// publish it in memory. A failed write leaves memory untouched.
    ///
    /// On disk the cycle runs under an exclusive lock on `<store>.lock` and
    /// starts by re-reading the file, so writes from other processes that
    /// share the store are merged rather than overwritten.
    fn write<R, F>(&self, op: F) -> Result<R>
    where
        F: FnOnce(&mut HashMap<String, String>) -> Result<R>,
    {
        let mut entries = self.entries();
        match &self.path {
            Some(path) => {
                let _lock = WriteLock::acquire(path)?;
                let mut next = load_entries(path, &self.key);
                let result = op(&mut next)?;
                persist_entries(path, &self.key, &next)?;
                *entries = next;
                Ok(result)
            }
            None => {
                let mut next = entries.clone();
                let result = op(&mut next)?;
                *entries = next;
                Ok(result)
            }
        }
    }
}

fn parse_object<T: DeserializeOwned>(key: &str, raw: &str) -> Option<T> {
    match serde_json::from_str::<T>(raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Failed to parse stored object for {}: {}", key, e);
            None
        }
    }
}

/// Exclusive lock on the sidecar `<store>.lock`, released on drop
struct WriteLock {
    file: File,
}

impl WriteLock {
    fn acquire(store_path: &Path) -> Result<Self> {
        if let Some(parent) = store_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut lock_path = store_path.as_os_str().to_owned();
        lock_path.push(".lock");

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(PathBuf::from(lock_path))?;
        file.lock_exclusive()?;
        Ok(Self { file })
    }
}

impl Drop for WriteLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

/// Load the storage key from `env_var` (base64) or from `key_path`,
/// generating and saving a fresh key if neither exists.
pub fn load_or_create_key(key_path: &Path, env_var: &str) -> Result<[u8; KEY_LEN]> {
    if let Ok(value) = std::env::var(env_var) {
        if !value.trim().is_empty() {
            tracing::debug!("Using storage key from {}", env_var);
            return decode_key(value.trim());
        }
    }

    if key_path.exists() {
        return read_key_file(key_path);
    }

    let dir = match key_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut key = [0u8; KEY_LEN];
    OsRng.fill_bytes(&mut key);

    // The key is written in full to an owner-only temp file and only then
    // linked into place, so no one sees a partial or world-readable key.
    let mut temp = NamedTempFile::new_in(dir)?;
    restrict_permissions(temp.path())?;
    temp.write_all(BASE64.encode(key).as_bytes())?;
    temp.as_file().sync_all()?;

    match temp.persist_noclobber(key_path) {
        Ok(_) => {
            tracing::info!("Generated new storage key at {:?}", key_path);
            Ok(key)
        }
        Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists => {
            tracing::debug!("Storage key at {:?} was created by another process", key_path);
            read_key_file(key_path)
        }
        Err(e) => Err(Error::Io(e.error)),
    }
}

fn read_key_file(key_path: &Path) -> Result<[u8; KEY_LEN]> {
    let contents = std::fs::read_to_string(key_path)?;
    decode_key(contents.trim())
}

fn decode_key(encoded: &str) -> Result<[u8; KEY_LEN]> {
    let bytes = BASE64
        .decode(encoded)
        .map_err(|e| Error::Crypto(format!("Failed to decode storage key: {e}")))?;
    bytes
        .try_into()
        .map_err(|_| Error::Crypto(format!("Storage key must be {KEY_LEN} bytes")))
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

fn load_entries(path: &Path, key: &[u8; KEY_LEN]) -> HashMap<String, String> {
    if !path.exists() {
        tracing::info!("No storage file found at {:?}, starting empty", path);
        return HashMap::new();
    }

    match read_entries(path, key) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(
                "Unable to load storage file {:?}: {}. Starting empty.",
                path,
                e
            );
            HashMap::new()
        }
    }
}

fn read_entries(path: &Path, key: &[u8; KEY_LEN]) -> Result<HashMap<String, String>> {
    let file = File::open(path)?;
    file.lock_shared()?;

    let mut raw = Vec::new();
    let read = std::io::BufReader::new(&file).read_to_end(&mut raw);
    let _ = file.unlock();
    read?;

    if raw.is_empty() {
        return Ok(HashMap::new());
    }

    let enc: EncryptedFile = serde_json::from_slice(&raw)?;
    let nonce_bytes = BASE64
        .decode(enc.nonce)
        .map_err(|e| Error::Crypto(format!("Failed to decode nonce: {e}")))?;
    if nonce_bytes.len() != NONCE_LEN {
        return Err(Error::Crypto("Invalid nonce length".into()));
    }
    let cipher_bytes = BASE64
        .decode(enc.ciphertext)
        .map_err(|e| Error::Crypto(format!("Failed to decode ciphertext: {e}")))?;

    let cipher = ChaCha20Poly1305::new(Key::from_slice(key));
    let plaintext = cipher
        .decrypt(Nonce::from_slice(&nonce_bytes), cipher_bytes.as_ref())
        .map_err(|_| Error::Crypto("Failed to decrypt storage file".into()))?;

    let plain: PlainEntries = serde_json::from_slice(&plaintext)?;
    Ok(plain.entries)
}

fn persist_entries(
    path: &Path,
    key: &[u8; KEY_LEN],
    entries: &HashMap<String, String>,
) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| Error::Storage("storage path missing parent".into()))?;
    std::fs::create_dir_all(parent)?;

    let plain = PlainEntries {
        version: CURRENT_VERSION,
        entries: entries.clone(),
    };
    let serialized = serde_json::to_vec(&plain)?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);
    let cipher = ChaCha20Poly1305::new(Key::from_slice(key));
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), serialized.as_ref())
        .map_err(|_| Error::Crypto("Failed to encrypt storage".into()))?;

    let enc = EncryptedFile {
        version: CURRENT_VERSION,
        nonce: BASE64.encode(nonce_bytes),
        ciphertext: BASE64.encode(ciphertext),
    };

    let temp = NamedTempFile::new_in(parent)?;
    temp.as_file().lock_exclusive()?;
    {
        let mut writer = std::io::BufWriter::new(temp.as_file());
        serde_json::to_writer(&mut writer, &enc)?;
        writer.flush()?;
    }
    temp.as_file().sync_all()?;
    temp.as_file().unlock()?;

    temp.persist(path).map_err(|e| Error::Io(e.error))?;
    tracing::debug!("Persisted {} storage entries to {:?}", entries.len(), path);
    Ok(())
}
