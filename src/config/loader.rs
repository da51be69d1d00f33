use super::plan::{BackupPlan, DatabaseDefaults, PlanSettings, ToolPaths};
use super::types::*;
use crate::destinations::build_destination;
use crate::sources::build_source;
use std::fs;
use std::path::{Component, Path};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Load and validate configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Parse and validate configuration from a TOML string
pub fn parse_config(contents: &str) -> Result<Config> {
    let config: Config = toml::from_str(contents)?;
    validate_config(&config)?;
    Ok(config)
}

/// Validate the configuration
fn validate_config(config: &Config) -> Result<()> {
    if config.global.server_name.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "server_name must not be empty".to_string(),
        ));
    }

    if config.global.passphrase.is_empty() {
        return Err(ConfigError::ValidationError(
            "passphrase must not be empty".to_string(),
        ));
    }

    if config.sources.is_empty() {
        return Err(ConfigError::ValidationError("No sources defined".to_string()));
    }

    if config.destinations.is_empty() {
        return Err(ConfigError::ValidationError(
            "No destinations defined".to_string(),
        ));
    }

    for (index, source) in config.sources.iter().enumerate() {
        validate_source(index, source)?;
    }

    for (index, destination) in config.destinations.iter().enumerate() {
        validate_destination(index, destination)?;
    }

    Ok(())
}

fn validate_source(index: usize, source: &SourceConfig) -> Result<()> {
    match source {
        SourceConfig::Dir(dir) if dir.path.as_os_str().is_empty() => Err(
            ConfigError::ValidationError(format!("Source #{}: directory path is empty", index + 1)),
        ),
        // `..` would make the destination segment disagree with the directory
        SourceConfig::Dir(dir)
            if dir
                .path
                .components()
                .any(|c| matches!(c, Component::ParentDir)) =>
        {
            Err(ConfigError::ValidationError(format!(
                "Source #{}: directory path {:?} must not contain '..'",
                index + 1,
                dir.path
            )))
        }
        SourceConfig::Mysql(mysql) if mysql.database.trim().is_empty() => Err(
            ConfigError::ValidationError(format!("Source #{}: database name is empty", index + 1)),
        ),
        _ => Ok(()),
    }
}

fn validate_destination(index: usize, destination: &DestinationConfig) -> Result<()> {
    match destination {
        DestinationConfig::S3(s3) if s3.bucket.trim().is_empty() => {
            Err(ConfigError::ValidationError(format!(
                "Destination #{}: bucket name is empty",
                index + 1
            )))
        }
        DestinationConfig::Local(local) if local.path.as_os_str().is_empty() => {
            Err(ConfigError::ValidationError(format!(
                "Destination #{}: path is empty",
                index + 1
            )))
        }
        _ => Ok(()),
    }
}

/// Resolve the plan-wide settings from the global section
pub fn resolve_settings(global: &GlobalConfig) -> PlanSettings {
    PlanSettings {
        server_name: global.server_name.clone(),
        passphrase: global.passphrase.clone(),
        database: DatabaseDefaults {
            user: global.db_user.clone(),
            password: global.db_password.clone(),
        },
        tools: ToolPaths {
            duplicity: global.duplicity_binary.clone(),
            mysqldump: global.mysqldump_binary.clone(),
        },
        timeout: global.timeout_seconds.map(Duration::from_secs),
    }
}

/// Build the backup plan from a validated configuration
pub fn build_plan(config: &Config) -> BackupPlan {
    let mut plan = BackupPlan::new(resolve_settings(&config.global));

    for source in &config.sources {
        plan.add_source(build_source(source));
    }

    for destination in &config.destinations {
        plan.add_destination(build_destination(destination));
    }

    plan
}
