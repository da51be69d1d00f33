//! The backup plan consumed by the orchestrator

use super::secret::Secret;
use crate::destinations::Destination;
use crate::sources::Source;
use std::time::Duration;

/// Fallback credentials for database sources without their own
#[derive(Debug, Clone, Default)]
pub struct DatabaseDefaults {
    pub user: Option<String>,
    pub password: Option<Secret>,
}

/// Executables invoked by a run
#[derive(Debug, Clone)]
pub struct ToolPaths {
    pub duplicity: String,
    pub mysqldump: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            duplicity: "duplicity".to_string(),
            mysqldump: "mysqldump".to_string(),
        }
    }
}

/// Plan-wide settings shared by every source and destination
#[derive(Debug, Clone, Default)]
pub struct PlanSettings {
    pub server_name: String,
    pub passphrase: Secret,
    pub database: DatabaseDefaults,
    pub tools: ToolPaths,
    pub timeout: Option<Duration>,
}

/// Ordered sources and destinations plus global settings
#[derive(Default)]
pub struct BackupPlan {
    pub settings: PlanSettings,
    pub sources: Vec<Box<dyn Source>>,
    pub destinations: Vec<Box<dyn Destination>>,
}

impl BackupPlan {
    pub fn new(settings: PlanSettings) -> Self {
        Self {
            settings,
            sources: Vec::new(),
            destinations: Vec::new(),
        }
    }

    /// Declare a source. Sources are backed up in declaration order.
    pub fn add_source(&mut self, source: Box<dyn Source>) -> &mut Self {
        self.sources.push(source);
        self
    }

    /// Declare a destination. Every source is sent to every destination.
    pub fn add_destination(&mut self, destination: Box<dyn Destination>) -> &mut Self {
        self.destinations.push(destination);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty() || self.destinations.is_empty()
    }

    /// Source × destination pairs in attempt order, by pretty name
    pub fn pairs(&self) -> Vec<(String, String)> {
        self.sources
            .iter()
            .flat_map(|source| {
                self.destinations
                    .iter()
                    .map(move |dest| (source.pretty_name(), dest.pretty_name()))
            })
            .collect()
    }
}

impl std::fmt::Debug for BackupPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackupPlan")
            .field("settings", &self.settings)
            .field(
                "sources",
                &self.sources.iter().map(|s| s.pretty_name()).collect::<Vec<_>>(),
            )
            .field(
                "destinations",
                &self.destinations.iter().map(|d| d.pretty_name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
