//! Test fixtures and sample data
//!
//! Provides pre-built configuration text.

/// Minimal valid config: one directory, one S3 bucket
pub fn minimal_config_toml() -> &'static str {
    r#"
[global]
server_name = "WEB1"
passphrase = "secret-passphrase"

[[sources]]
type = "dir"
path = "/data/app"

[[destinations]]
type = "s3"
bucket = "b"
access_key_id = "AKIAEXAMPLE"
secret_access_key = "aws-secret"
"#
}

/// Config with every source and destination kind
pub fn full_config_toml() -> &'static str {
    r#"
[global]
server_name = "Web1"
passphrase = "secret-passphrase"
db_user = "backup"
db_password = "db-secret"
timeout_seconds = 3600
log_level = "debug"
log_max_files = 3

[[sources]]
type = "dir"
path = "/var/www"
excludes = ["/var/www/cache", "**/*.tmp"]

[[sources]]
type = "mysql"
database = "shop"

[[sources]]
type = "mysql"
database = "crm"
user = "crm"
password = "crm-secret"

[[destinations]]
type = "s3"
bucket = "offsite"
access_key_id = "AKIAEXAMPLE"
secret_access_key = "aws-secret"

[[destinations]]
type = "local"
path = "/mnt/backup/"
"#
}

/// Config that parses but declares no destinations
pub fn no_destinations_config_toml() -> &'static str {
    r#"
[global]
server_name = "WEB1"
passphrase = "secret-passphrase"

[[sources]]
type = "dir"
path = "/data/app"
"#
}

/// Config naming an unknown source type
pub fn unknown_source_type_toml() -> &'static str {
    r#"
[global]
server_name = "WEB1"
passphrase = "secret-passphrase"

[[sources]]
type = "postgres"
database = "shop"

[[destinations]]
type = "local"
path = "/mnt/backup"
"#
}
