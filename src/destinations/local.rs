//! Local or mounted filesystem target

use super::Destination;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct LocalDestination {
    path: PathBuf,
}

impl LocalDestination {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl Destination for LocalDestination {
    fn pretty_name(&self) -> String {
        format!("file:{}", self.path.display())
    }

    fn transport_url(&self, server_name: &str) -> String {
        let base = self.path.display().to_string();
        format!(
            "file://{}/{}",
            base.trim_end_matches('/'),
            server_name.to_lowercase()
        )
    }
}
