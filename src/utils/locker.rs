//! File-based locking to prevent overlapping runs

use anyhow::{Context, Result};
use fd_lock::{RwLock, RwLockWriteGuard};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// An open lock file. Call [`RunLock::try_acquire`] and keep the guard alive
/// for the duration of the run.
pub struct RunLock {
    lock: RwLock<File>,
    path: PathBuf,
}

impl RunLock {
    /// Open or create the lock file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create lock directory: {:?}", parent))?;
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .with_context(|| format!("Failed to open lock file: {:?}", path))?;

        Ok(Self {
            lock: RwLock::new(file),
            path,
        })
    }

    /// Take the exclusive lock without waiting
    /// Returns error if another run holds it
    pub fn try_acquire(&mut self) -> Result<RunLockGuard<'_>> {
        debug!("Attempting to acquire lock: {:?}", self.path);

        let guard = self.lock.try_write().with_context(|| {
            format!("Another backup run is in progress (lock held: {:?})", self.path)
        })?;

        info!("Acquired run lock: {:?}", self.path);

        Ok(RunLockGuard {
            _guard: guard,
            path: &self.path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Held lock, released on drop
pub struct RunLockGuard<'a> {
    _guard: RwLockWriteGuard<'a, File>,
    path: &'a Path,
}

impl Drop for RunLockGuard<'_> {
    fn drop(&mut self) {
        info!("Released run lock: {:?}", self.path);
    }
}
