//! File-backed key-value store.
//!
//! All records live in one JSON object at the configured path. Every write
//! produces a complete new document in a sibling temp file, flushes it, and
//! renames it over the old one, so readers only ever see a whole document.
//! Writers inside one process are serialized by a mutex; sharing a path
//! between processes is not supported.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::{KeyValueStore, StorageError, StorageResult};

type Records = BTreeMap<String, String>;

/// Key-value store persisted as a single JSON document.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    /// `true` once closed. Held for the duration of every operation.
    closed: Mutex<bool>,
}

impl FileStore {
    /// Opens the store at `path`, creating parent directories as needed.
    ///
    /// The file itself is created lazily on the first write.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created or an
    /// existing file is not a valid store document.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|err| StorageError::io("creating store directory", err))?;
            }
        }
        // Fail early on a corrupt document rather than on first use.
        read_records(&path)?;
        log::debug!("opened file store at {}", path.display());
        Ok(Self {
            path,
            closed: Mutex::new(false),
        })
    }

    /// Returns the path of the backing document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn guard(&self) -> StorageResult<MutexGuard<'_, bool>> {
        let guard = self
            .closed
            .lock()
            .map_err(|_| StorageError::Backend("file store lock poisoned".to_string()))?;
        if *guard {
            return Err(StorageError::Closed);
        }
        Ok(guard)
    }

    fn update(&self, f: impl FnOnce(&mut Records)) -> StorageResult<()> {
        let _guard = self.guard()?;
        let mut records = read_records(&self.path)?;
        f(&mut records);
        write_records(&self.path, &records)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let _guard = self.guard()?;
        Ok(read_records(&self.path)?.remove(key))
    }

    fn put(&self, key: &str, value: &str) -> StorageResult<()> {
        self.update(|records| {
            records.insert(key.to_string(), value.to_string());
        })
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        self.update(|records| {
            records.remove(key);
        })
    }

    fn clear(&self) -> StorageResult<()> {
        let _guard = self.guard()?;
        write_records(&self.path, &Records::new())
    }

    fn close(&self) -> StorageResult<()> {
        let mut guard = self
            .closed
            .lock()
            .map_err(|_| StorageError::Backend("file store lock poisoned".to_string()))?;
        *guard = true;
        Ok(())
    }

    fn replace_all(&self, records: &[(&str, &str)]) -> StorageResult<()> {
        let _guard = self.guard()?;
        let records: Records = records
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        write_records(&self.path, &records)
    }
}

fn read_records(path: &Path) -> StorageResult<Records> {
    match fs::read(path) {
        Ok(bytes) => serde_json::from_slice(&bytes)
            .map_err(|err| StorageError::Serialization(err.to_string())),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(Records::new()),
        Err(err) => Err(StorageError::io("reading store document", err)),
    }
}

fn write_records(path: &Path, records: &Records) -> StorageResult<()> {
    let bytes = serde_json::to_vec_pretty(records)
        .map_err(|err| StorageError::Serialization(err.to_string()))?;

    let tmp_path = temp_path(path);
    let mut file =
        create_private(&tmp_path).map_err(|err| StorageError::io("creating temp file", err))?;
    let written = file
        .write_all(&bytes)
        .map_err(|err| StorageError::io("writing temp file", err))
        .and_then(|()| {
            file.sync_all()
                .map_err(|err| StorageError::io("syncing temp file", err))
        });
    drop(file);

    let result = written.and_then(|()| {
        fs::rename(&tmp_path, path)
            .map_err(|err| StorageError::io("replacing store document", err))
    });
    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

/// Creates (or truncates) `path`, readable by the owner only on unix.
fn create_private(path: &Path) -> std::io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let file = options.open(path)?;
    // `mode` only applies on creation; a stale temp file keeps its bits.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }
    Ok(file)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
