//! Durable cursor store - crash-safe JSON file persistence
//!
//! Saves write a temp file and atomically rename it over the target
//! under an exclusive file lock, so a crash mid-write leaves the old
//! cursor intact rather than a torn file.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::warn;

use super::cursor::Cursor;
use crate::error::PersistenceFailure;

pub struct CursorStore {
    path: PathBuf,
}

impl CursorStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default cursor location.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("order-notify")
            .join("cursor.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the cursor, returning a zero-value cursor when the file is
    /// absent. A corrupt file is treated the same way, with a warning:
    /// reprocessing (duplicate sends) beats refusing to start.
    pub fn load(&self) -> Cursor {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(_) => return Cursor::default(),
        };

        match serde_json::from_str(&data) {
            Ok(cursor) => cursor,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "corrupt cursor file, starting from empty cursor");
                Cursor::default()
            }
        }
    }

    /// Persist the cursor. Must complete before a commit is considered
    /// durable; any failure surfaces as `PersistenceFailure`.
    pub fn save(&self, cursor: &Cursor) -> Result<(), PersistenceFailure> {
        let io_err = |e: std::io::Error| PersistenceFailure(e.to_string());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        // Lock the target so concurrent processes serialize their saves.
        let lock = OpenOptions::new()
            .create(true)
            .write(true)
            .open(&self.path)
            .map_err(io_err)?;
        lock.lock_exclusive().map_err(io_err)?;

        let json = serde_json::to_string_pretty(cursor)
            .map_err(|e| PersistenceFailure(e.to_string()))?;

        let temp_path = self.path.with_extension("tmp");
        let result = (|| {
            let mut temp = fs::File::create(&temp_path)?;
            temp.write_all(json.as_bytes())?;
            temp.sync_all()?;
            fs::rename(&temp_path, &self.path)
        })();

        let unlocked = lock.unlock();
        result.map_err(io_err)?;
        unlocked.map_err(io_err)?;
        Ok(())
    }
}
