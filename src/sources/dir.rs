//! Plain directory source

use super::{Source, SourceError};
use std::path::{Path, PathBuf};

/// Backs up a directory as-is. No preparation or cleanup needed.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    path: PathBuf,
    excludes: Vec<String>,
}

impl DirectorySource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            excludes: Vec::new(),
        }
    }

    pub fn with_excludes(mut self, excludes: Vec<String>) -> Self {
        self.excludes = excludes;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Source for DirectorySource {
    fn pretty_name(&self) -> String {
        self.path.display().to_string()
    }

    fn dest_name(&self) -> String {
        // `/` and friends have no final component
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "root".to_string())
    }

    fn transport_url(&self) -> Result<String, SourceError> {
        Ok(self.path.display().to_string())
    }

    fn transport_options(&self) -> Vec<String> {
        self.excludes
            .iter()
            .map(|pattern| format!("--exclude={}", pattern))
            .collect()
    }
}
