use crate::{Error, Result};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// Storage keys, one json document each.
pub const LAST_SUBMIT_TIME: &str = "last_submit_time";
pub const SUBMITTED_EVENT_IDS: &str = "submitted_event_ids";
pub const SUBMITTED_CONTENT_HASHES: &str = "submitted_content_hashes";
pub const TARGET_SUBMISSIONS: &str = "target_submissions";
pub const FOLLOWING_PUBKEYS: &str = "following_pubkeys";

/// Where client state lives on disk.
#[derive(Debug, Clone)]
pub struct DataDir {
    base: PathBuf,
}

impl DataDir {
    pub fn new(base: impl AsRef<Path>) -> Self {
        Self {
            base: base.as_ref().to_path_buf(),
        }
    }

    pub fn default_base() -> Option<PathBuf> {
        dirs::data_local_dir().map(|pb| pb.join("anonostr"))
    }

    pub fn default_base_or_cwd() -> PathBuf {
        Self::default_base().unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn storage_path(&self) -> PathBuf {
        self.base.join("storage")
    }
}

impl Default for DataDir {
    fn default() -> Self {
        Self::new(Self::default_base_or_cwd())
    }
}

enum Backend {
    Disk { dir: PathBuf },
    Memory { map: HashMap<String, String> },
}

/// The client's only shared mutable resource: a small key/value store
/// of json documents. All access goes through one mutex so interleaved
/// submissions cannot lose a read-modify-write of the counters.
pub struct ClientStorage {
    inner: Mutex<Backend>,
}

impl ClientStorage {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(ClientStorage {
            inner: Mutex::new(Backend::Disk { dir }),
        })
    }

    /// A throwaway store, for tests and ephemeral sessions.
    pub fn in_memory() -> Self {
        ClientStorage {
            inner: Mutex::new(Backend::Memory {
                map: HashMap::new(),
            }),
        }
    }

    /// Load a key. Missing or unparseable values read as `None`; a
    /// corrupt document is the same as a cleared one.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let inner = self.inner.lock().expect("storage lock");
        let raw = match &*inner {
            Backend::Disk { dir } => fs::read_to_string(dir.join(key)).ok()?,
            Backend::Memory { map } => map.get(key)?.clone(),
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!("discarding unreadable storage value for '{key}': {err}");
                None
            }
        }
    }

    pub fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        let mut inner = self.inner.lock().expect("storage lock");
        match &mut *inner {
            Backend::Disk { dir } => fs::write(dir.join(key), json).map_err(Error::Io),
            Backend::Memory { map } => {
                map.insert(key.to_owned(), json);
                Ok(())
            }
        }
    }

    /// Atomically read, transform and write back one key. The lock is
    /// held across the whole cycle.
    pub fn update<T, R, F>(&self, key: &str, f: F) -> Result<R>
    where
        T: DeserializeOwned + Serialize + Default,
        F: FnOnce(T) -> (T, R),
    {
        let mut inner = self.inner.lock().expect("storage lock");

        let raw = match &*inner {
            Backend::Disk { dir } => fs::read_to_string(dir.join(key)).ok(),
            Backend::Memory { map } => map.get(key).cloned(),
        };
        let current: T = raw
            .and_then(|raw| match serde_json::from_str(&raw) {
                Ok(value) => Some(value),
                Err(err) => {
                    warn!("discarding unreadable storage value for '{key}': {err}");
                    None
                }
            })
            .unwrap_or_default();

        let (next, result) = f(current);

        let json = serde_json::to_string(&next)?;
        match &mut *inner {
            Backend::Disk { dir } => fs::write(dir.join(key), json).map_err(Error::Io)?,
            Backend::Memory { map } => {
                map.insert(key.to_owned(), json);
            }
        }

        Ok(result)
    }
}
