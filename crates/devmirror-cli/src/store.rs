//! File-backed history store
//!
//! One pretty-printed JSON array per subject, `<root>/<subject>.json`.
//! Appends hold an exclusive lock on `<root>/<subject>.lock` while they
//! re-read, extend and replace the file. The new content is staged in a
//! uniquely named temp file and renamed over the old one.

use devmirror_core::{History, HistoryEntry, HistoryStore};
use devmirror_shared::{DevMirrorError, Result, StorageError};
use fd_lock::RwLock;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

const HISTORY_EXTENSION: &str = "json";
const LOCK_EXTENSION: &str = "lock";
const MAX_SUBJECT_LEN: usize = 128;

/// History store keeping one JSON file per subject
#[derive(Debug, Clone)]
pub struct JsonHistoryStore {
    root: PathBuf,
}

impl JsonHistoryStore {
    /// Open a store rooted at `root`, creating the directory if needed
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| StorageError::DirectoryUnavailable {
            path: root.display().to_string(),
            message: e.to_string(),
        })?;

        Ok(Self { root })
    }

    fn path_for(&self, subject: &str, extension: &str) -> Result<PathBuf> {
        validate_subject(subject)?;
        Ok(self.root.join(format!("{subject}.{extension}")))
    }

    fn read(&self, subject: &str, path: &Path) -> Result<History> {
        if !path.exists() {
            return Ok(History::new());
        }

        let raw = fs::read_to_string(path)?;
        serde_json::from_str(&raw).map_err(|e| {
            DevMirrorError::from(StorageError::CorruptHistory {
                subject: subject.to_string(),
                message: e.to_string(),
            })
        })
    }

    fn replace(&self, path: &Path, history: &History) -> Result<()> {
        let mut staging = NamedTempFile::new_in(&self.root)?;
        serde_json::to_writer_pretty(&mut staging, history)?;
        staging.flush()?;
        staging.as_file().sync_all()?;
        staging.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl HistoryStore for JsonHistoryStore {
    fn load(&self, subject: &str) -> Result<History> {
        let path = self.path_for(subject, HISTORY_EXTENSION)?;
        self.read(subject, &path)
    }

    fn append(&mut self, subject: &str, entry: HistoryEntry) -> Result<()> {
        let path = self.path_for(subject, HISTORY_EXTENSION)?;
        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(self.path_for(subject, LOCK_EXTENSION)?)?;
        let mut lock = RwLock::new(lock_file);
        let _guard = lock.write()?;

        let mut history = self.read(subject, &path)?;
        let index = history.append(entry);
        self.replace(&path, &history)?;

        debug!(subject, index, path = %path.display(), "History entry appended");
        Ok(())
    }
}

/// Subject ids become file names: `[A-Za-z0-9_.-]`, non-empty, no leading dot
pub fn validate_subject(subject: &str) -> Result<()> {
    let valid = !subject.is_empty()
        && subject.len() <= MAX_SUBJECT_LEN
        && !subject.starts_with('.')
        && subject
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));

    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidSubject {
            subject: subject.to_string(),
        }
        .into())
    }
}
