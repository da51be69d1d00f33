use super::secret::Secret;
use serde::Deserialize;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub global: GlobalConfig,
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
    #[serde(default)]
    pub destinations: Vec<DestinationConfig>,
}

/// Global configuration settings
#[derive(Debug, Clone, Deserialize)]
pub struct GlobalConfig {
    /// Identity of this server, used as the path segment under each destination
    pub server_name: String,

    /// Passphrase handed to duplicity for encryption
    pub passphrase: Secret,

    /// Default database credentials for database sources
    #[serde(default)]
    pub db_user: Option<String>,
    #[serde(default)]
    pub db_password: Option<Secret>,

    /// External tools
    #[serde(default = "default_duplicity_binary")]
    pub duplicity_binary: String,
    #[serde(default = "default_mysqldump_binary")]
    pub mysqldump_binary: String,

    /// Optional timeout for every subprocess (no timeout when absent)
    #[serde(default)]
    pub timeout_seconds: Option<u64>,

    /// Logging configuration
    #[serde(default)]
    pub log_directory: Option<PathBuf>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_max_files")]
    pub log_max_files: u32,

    /// Lock file preventing overlapping runs
    #[serde(default)]
    pub lock_file: Option<PathBuf>,
}

/// A source declaration
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceConfig {
    Dir(DirSourceConfig),
    Mysql(MysqlSourceConfig),
}

#[derive(Debug, Clone, Deserialize)]
pub struct DirSourceConfig {
    pub path: PathBuf,

    /// Exclusion patterns passed to duplicity
    #[serde(default)]
    pub excludes: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MysqlSourceConfig {
    pub database: String,

    /// Per-source credential overrides
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<Secret>,
}

/// A destination declaration
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DestinationConfig {
    S3(S3DestinationConfig),
    Local(LocalDestinationConfig),
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3DestinationConfig {
    pub bucket: String,
    pub access_key_id: String,
    pub secret_access_key: Secret,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocalDestinationConfig {
    pub path: PathBuf,
}

// Default value functions

fn default_duplicity_binary() -> String { "duplicity".to_string() }
fn default_mysqldump_binary() -> String { "mysqldump".to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_log_max_files() -> u32 { 10 }
