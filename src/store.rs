//! Stored admin profiles, keyed by session subject.
//!
//! Profiles are kept as the raw JSON the portal API delivered, so a restore
//! sees exactly what was stored and a corrupt entry is detected when the
//! session is rebuilt.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{Error, Result};

pub trait ProfileStore: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<String>>;
    fn save(&self, key: &str, profile: &str) -> Result<()>;
    /// Removing a key that is not stored is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// In-process store. Profiles are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    profiles: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.profiles
            .lock()
            .map_err(|_| Error::Internal("profile store lock poisoned".to_string()))
    }
}

impl ProfileStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn save(&self, key: &str, profile: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), profile.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// Longest session key a file name can hold once hex-encoded.
const MAX_KEY_LEN: usize = 120;

/// One `<hex(key)>.json` file per profile under a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        tracing::info!(dir = %dir.display(), "using file profile store");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> Result<PathBuf> {
        if key.trim().is_empty() {
            return Err(Error::BadRequest("empty session key".to_string()));
        }
        if key.len() > MAX_KEY_LEN {
            return Err(Error::BadRequest("session key too long".to_string()));
        }
        Ok(self.dir.join(file_name(key)))
    }
}

/// Distinct keys always map to distinct file names.
fn file_name(key: &str) -> String {
    format!("{}.json", hex::encode(key.as_bytes()))
}

impl ProfileStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        match std::fs::read_to_string(self.path(key)?) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, key: &str, profile: &str) -> Result<()> {
        std::fs::write(self.path(key)?, profile)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match std::fs::remove_file(self.path(key)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
