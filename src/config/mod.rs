//! Configuration module for server-backup
//!
//! This module handles loading and validating configuration from TOML files and
//! turning it into a [`BackupPlan`].
//!
//! ## Layout
//!
//! - `[global]` sets plan-wide options (server name, passphrase, database
//!   defaults, tool paths, logging)
//! - every `[[sources]]` entry declares one source of a given `type`
//! - every `[[destinations]]` entry declares one destination of a given `type`
//!
//! ## Example Usage
//!
//! ```no_run
//! use server_backup::config;
//!
//! let config = config::load_config("/etc/server-backup.toml")?;
//! let plan = config::build_plan(&config);
//!
//! for (source, destination) in plan.pairs() {
//!     println!("{} -> {}", source, destination);
//! }
//! # Ok::<(), config::ConfigError>(())
//! ```

mod loader;
mod plan;
mod secret;
mod types;

pub use loader::{build_plan, load_config, parse_config, resolve_settings, ConfigError, Result};
pub use plan::{BackupPlan, DatabaseDefaults, PlanSettings, ToolPaths};
pub use secret::{Secret, REDACTED};
pub use types::*;

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "/etc/server-backup.toml";

/// Expand tilde (~) in path
pub fn expand_tilde(path: &std::path::Path) -> std::path::PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    path.to_path_buf()
}
