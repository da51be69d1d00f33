//! Fluent API for building test configurations
//!
//! Provides a builder pattern for creating test configurations with sensible defaults.

use server_backup::config::{
    Config, DestinationConfig, DirSourceConfig, GlobalConfig, LocalDestinationConfig,
    MysqlSourceConfig, S3DestinationConfig, Secret, SourceConfig,
};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Builder for creating test configurations
pub struct ConfigBuilder {
    temp_dir: TempDir,
    global: GlobalConfig,
    sources: Vec<SourceConfig>,
    destinations: Vec<DestinationConfig>,
}

impl ConfigBuilder {
    /// Create a new ConfigBuilder with a global section and nothing else
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let global = GlobalConfig {
            server_name: "WEB1".to_string(),
            passphrase: Secret::new("test-passphrase-123"),
            db_user: None,
            db_password: None,
            duplicity_binary: "duplicity".to_string(),
            mysqldump_binary: "mysqldump".to_string(),
            timeout_seconds: None,
            log_directory: None,
            log_level: "info".to_string(),
            log_max_files: 5,
            lock_file: None,
        };

        Self {
            temp_dir,
            global,
            sources: Vec::new(),
            destinations: Vec::new(),
        }
    }

    /// Create a minimal config with a single S3 destination
    pub fn minimal() -> Self {
        Self::new().add_s3_destination("b")
    }

    /// Set the server name
    pub fn with_server_name(mut self, name: &str) -> Self {
        self.global.server_name = name.to_string();
        self
    }

    /// Set the duplicity passphrase
    pub fn with_passphrase(mut self, passphrase: &str) -> Self {
        self.global.passphrase = Secret::new(passphrase);
        self
    }

    /// Set the default database credentials
    pub fn with_db_defaults(mut self, user: &str, password: &str) -> Self {
        self.global.db_user = Some(user.to_string());
        self.global.db_password = Some(Secret::new(password));
        self
    }

    /// Set the subprocess timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.global.timeout_seconds = Some(seconds);
        self
    }

    /// Add a directory source
    pub fn add_dir_source(self, path: &str) -> Self {
        self.add_dir_source_with_excludes(path, Vec::new())
    }

    /// Add a directory source with exclusion patterns
    pub fn add_dir_source_with_excludes(mut self, path: &str, excludes: Vec<String>) -> Self {
        self.sources.push(SourceConfig::Dir(DirSourceConfig {
            path: PathBuf::from(path),
            excludes,
        }));
        self
    }

    /// Add a MySQL source using the default credentials
    pub fn add_mysql_source(mut self, database: &str) -> Self {
        self.sources.push(SourceConfig::Mysql(MysqlSourceConfig {
            database: database.to_string(),
            user: None,
            password: None,
        }));
        self
    }

    /// Add a MySQL source with its own credentials
    pub fn add_mysql_source_with_auth(mut self, database: &str, user: &str, password: &str) -> Self {
        self.sources.push(SourceConfig::Mysql(MysqlSourceConfig {
            database: database.to_string(),
            user: Some(user.to_string()),
            password: Some(Secret::new(password)),
        }));
        self
    }

    /// Add an S3 destination with test credentials
    pub fn add_s3_destination(mut self, bucket: &str) -> Self {
        self.destinations
            .push(DestinationConfig::S3(S3DestinationConfig {
                bucket: bucket.to_string(),
                access_key_id: "AKIATEST".to_string(),
                secret_access_key: Secret::new("aws-test-secret"),
            }));
        self
    }

    /// Add a local destination
    pub fn add_local_destination(mut self, path: &Path) -> Self {
        self.destinations
            .push(DestinationConfig::Local(LocalDestinationConfig {
                path: path.to_path_buf(),
            }));
        self
    }

    /// Get the temp directory path
    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Build the Config
    pub fn build(self) -> Config {
        self.persist().0
    }

    /// Keep the temp directory (don't delete on drop)
    pub fn persist(self) -> (Config, TempDir) {
        let config = Config {
            global: self.global,
            sources: self.sources,
            destinations: self.destinations,
        };
        (config, self.temp_dir)
    }

    /// Render the configuration as TOML
    pub fn to_toml(&self) -> String {
        let global = &self.global;
        let mut out = String::from("[global]\n");
        out.push_str(&format!("server_name = {}\n", quote(&global.server_name)));
        out.push_str(&format!("passphrase = {}\n", quote(global.passphrase.expose())));
        if let Some(ref user) = global.db_user {
            out.push_str(&format!("db_user = {}\n", quote(user)));
        }
        if let Some(ref password) = global.db_password {
            out.push_str(&format!("db_password = {}\n", quote(password.expose())));
        }
        out.push_str(&format!("duplicity_binary = {}\n", quote(&global.duplicity_binary)));
        out.push_str(&format!("mysqldump_binary = {}\n", quote(&global.mysqldump_binary)));
        if let Some(seconds) = global.timeout_seconds {
            out.push_str(&format!("timeout_seconds = {}\n", seconds));
        }

        for source in &self.sources {
            out.push_str("\n[[sources]]\n");
            match source {
                SourceConfig::Dir(dir) => {
                    out.push_str("type = \"dir\"\n");
                    out.push_str(&format!("path = {}\n", quote(&dir.path.display().to_string())));
                    if !dir.excludes.is_empty() {
                        let excludes: Vec<String> = dir.excludes.iter().map(|e| quote(e)).collect();
                        out.push_str(&format!("excludes = [{}]\n", excludes.join(", ")));
                    }
                }
                SourceConfig::Mysql(mysql) => {
                    out.push_str("type = \"mysql\"\n");
                    out.push_str(&format!("database = {}\n", quote(&mysql.database)));
                    if let Some(ref user) = mysql.user {
                        out.push_str(&format!("user = {}\n", quote(user)));
                    }
                    if let Some(ref password) = mysql.password {
                        out.push_str(&format!("password = {}\n", quote(password.expose())));
                    }
                }
            }
        }

        for destination in &self.destinations {
            out.push_str("\n[[destinations]]\n");
            match destination {
                DestinationConfig::S3(s3) => {
                    out.push_str("type = \"s3\"\n");
                    out.push_str(&format!("bucket = {}\n", quote(&s3.bucket)));
                    out.push_str(&format!("access_key_id = {}\n", quote(&s3.access_key_id)));
                    out.push_str(&format!(
                        "secret_access_key = {}\n",
                        quote(s3.secret_access_key.expose())
                    ));
                }
                DestinationConfig::Local(local) => {
                    out.push_str("type = \"local\"\n");
                    out.push_str(&format!("path = {}\n", quote(&local.path.display().to_string())));
                }
            }
        }

        out
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// TOML basic string
fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}
