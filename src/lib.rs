//! Server Backup Library
//!
//! This library orchestrates backups of directories and database dumps to
//! remote destinations, wrapping duplicity.

pub mod config;
pub mod destinations;
pub mod managers;
pub mod sources;
pub mod utils;

// Re-export commonly used types
pub use config::{build_plan, load_config, BackupPlan, Config, PlanSettings};
pub use destinations::Destination;
pub use managers::backup::{BackupError, BackupManager, RunSummary};
pub use managers::logging::{init_logging, LogGuard, LoggingConfig};
pub use managers::report::{FailureLedger, Reporter};
pub use sources::{Source, SourceError};
