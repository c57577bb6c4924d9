// Credential persistence. Commands receive a `TokenStore` instead of
// reading the token file themselves, so tests can swap in memory storage.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// What a successful login leaves behind.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
    pub username: String,
}

pub trait TokenStore {
    fn save(&self, credentials: &Credentials) -> Result<()>;
    fn load(&self) -> Result<Option<Credentials>>;
    fn delete(&self) -> Result<()>;
}

/// Stores credentials as `token.json` inside the config directory.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub const FILE_NAME: &'static str = "token.json";

    pub fn new(config_dir: &Path) -> Self {
        Self {
            path: config_dir.join(Self::FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    /// Write through a temp file in the same directory and rename it into
    /// place, so a reader never sees half a file. The temp file is created
    /// owner-only, which the rename keeps.
    fn save(&self, credentials: &Credentials) -> Result<()> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir)?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer(&mut tmp, credentials)?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        debug!(path = %self.path.display(), "saved credentials");
        Ok(())
    }

    fn load(&self) -> Result<Option<Credentials>> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&data)?))
    }

    fn delete(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "removed credentials");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Process-local store, used where nothing should touch the disk.
#[derive(Default)]
pub struct MemoryTokenStore {
    inner: RefCell<Option<Credentials>>,
}

impl MemoryTokenStore {
    pub fn with(credentials: Credentials) -> Self {
        Self {
            inner: RefCell::new(Some(credentials)),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn save(&self, credentials: &Credentials) -> Result<()> {
        *self.inner.borrow_mut() = Some(credentials.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<Credentials>> {
        Ok(self.inner.borrow().clone())
    }

    fn delete(&self) -> Result<()> {
        self.inner.borrow_mut().take();
        Ok(())
    }
}
