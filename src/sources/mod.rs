//! Backup sources
//!
//! A [`Source`] is one logical thing to back up. The backup manager only talks
//! to the trait; adding a new kind means a new implementation plus an arm in
//! [`build_source`].

pub mod dir;
pub mod mysql;

pub use dir::DirectorySource;
pub use mysql::MysqlSource;

use crate::config::{PlanSettings, SourceConfig};
use crate::managers::report::Reporter;
use crate::utils::executor::CommandExecutor;
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Failed to allocate workspace: {0}")]
    WorkspaceAllocation(#[source] std::io::Error),

    #[error("Failed to write credentials file {path:?}: {source}")]
    CredentialsFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to launch dump of '{database}': {message}")]
    DumpLaunch { database: String, message: String },

    #[error("Error creating dump of '{database}' (exit code {exit_code:?}):\n{log}")]
    DumpFailed {
        database: String,
        exit_code: Option<i32>,
        log: String,
    },

    #[error("Source '{0}' has not been prepared")]
    NotPrepared(String),

    #[error("Failed to clean up workspace {path:?}: {source}")]
    Cleanup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What a source may use while preparing itself
pub struct SourceContext<'a> {
    pub executor: &'a dyn CommandExecutor,
    pub reporter: &'a mut Reporter,
    pub settings: &'a PlanSettings,
}

/// Trait for backup sources
pub trait Source {
    /// Human-readable name used in progress output and failure keys
    fn pretty_name(&self) -> String;

    /// Short, path-safe name appended under each destination
    fn dest_name(&self) -> String;

    /// Local path duplicity reads from
    fn transport_url(&self) -> Result<String, SourceError>;

    /// Additional options for duplicity
    fn transport_options(&self) -> Vec<String> {
        Vec::new()
    }

    /// Additional env for duplicity
    fn transport_env(&self) -> HashMap<String, String> {
        HashMap::new()
    }

    /// Run before the source is sent to any destination
    fn pre(&mut self, _ctx: &mut SourceContext<'_>) -> Result<(), SourceError> {
        Ok(())
    }

    /// Run after every destination was attempted. Must be safe to call after
    /// failed destinations.
    fn post(&mut self) -> Result<(), SourceError> {
        Ok(())
    }
}

/// Create the source declared by a config entry
pub fn build_source(config: &SourceConfig) -> Box<dyn Source> {
    match config {
        SourceConfig::Dir(dir) => {
            Box::new(DirectorySource::new(&dir.path).with_excludes(dir.excludes.clone()))
        }
        SourceConfig::Mysql(mysql) => Box::new(
            MysqlSource::new(&mysql.database).with_auth(mysql.user.clone(), mysql.password.clone()),
        ),
    }
}
