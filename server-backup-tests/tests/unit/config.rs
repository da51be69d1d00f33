//! Configuration parsing, validation and plan building

use rstest::rstest;
use server_backup::config::{build_plan, load_config, parse_config, ConfigError, SourceConfig};
use server_backup::sources::Source;
use std::fs;
use std::time::Duration;
use test_utils::*;

#[test]
fn test_full_config_parses() {
    let config = parse_config(full_config_toml()).assert_ok();

    assert_eq!(config.global.server_name, "Web1");
    assert_eq!(config.global.timeout_seconds, Some(3600));
    assert_eq!(config.sources.len(), 3);
    assert_eq!(config.destinations.len(), 2);

    match &config.sources[0] {
        SourceConfig::Dir(dir) => assert_eq!(dir.excludes.len(), 2),
        other => panic!("Expected dir source, got {:?}", other),
    }
}

#[test]
fn test_defaults_applied() {
    let config = parse_config(minimal_config_toml()).assert_ok();

    assert_eq!(config.global.duplicity_binary, "duplicity");
    assert_eq!(config.global.mysqldump_binary, "mysqldump");
    assert_eq!(config.global.log_level, "info");
    assert!(config.global.timeout_seconds.is_none());
    assert!(config.global.lock_file.is_none());
}

#[test]
fn test_secrets_redacted_in_debug() {
    let config = parse_config(full_config_toml()).assert_ok();
    let debug = format!("{:?}", config);

    assert!(!debug.contains("secret-passphrase"));
    assert!(!debug.contains("aws-secret"));
    assert!(!debug.contains("crm-secret"));
}

#[test]
fn test_no_destinations_rejected() {
    parse_config(no_destinations_config_toml()).assert_err_contains("No destinations defined");
}

#[test]
fn test_unknown_source_type_rejected() {
    assert!(matches!(
        parse_config(unknown_source_type_toml()),
        Err(ConfigError::ParseError(_))
    ));
}

#[rstest]
#[case("server_name = \"\"", "server_name must not be empty")]
#[case("passphrase = \"\"", "passphrase must not be empty")]
fn test_empty_global_values_rejected(#[case] line: &str, #[case] message: &str) {
    let key = line.split(' ').next().unwrap();
    let contents: String = minimal_config_toml()
        .lines()
        .map(|l| if l.starts_with(key) { line } else { l })
        .collect::<Vec<_>>()
        .join("\n");

    parse_config(&contents).assert_err_contains(message);
}

#[test]
fn test_missing_file_is_read_error() {
    let builder = ConfigBuilder::new();
    let result = load_config(builder.temp_dir().join("absent.toml"));
    assert!(matches!(result, Err(ConfigError::ReadError(_))));
}

#[test]
fn test_config_file_round_trips_into_plan() {
    let builder = ConfigBuilder::minimal()
        .with_timeout(120)
        .add_dir_source_with_excludes("/var/www", vec!["/var/www/cache".to_string()])
        .add_mysql_source_with_auth("crm", "crm", "c#m pw ");
    let path = builder.temp_dir().join("config.toml");
    fs::write(&path, builder.to_toml()).unwrap();

    let config = load_config(&path).assert_ok();
    let plan = build_plan(&config);

    assert_eq!(plan.settings.timeout, Some(Duration::from_secs(120)));
    assert_eq!(plan.sources[0].transport_options(), vec!["--exclude=/var/www/cache"]);
    match &config.sources[1] {
        SourceConfig::Mysql(mysql) => {
            assert_eq!(mysql.user.as_deref(), Some("crm"));
            assert_eq!(mysql.password.as_ref().map(Secret::expose), Some("c#m pw "));
        }
        other => panic!("Expected mysql source, got {:?}", other),
    }
}

#[rstest]
#[case("/data/..")]
#[case("/srv/app/../../etc")]
fn test_parent_dir_in_source_path_rejected(#[case] path: &str) {
    let contents = minimal_config_toml().replace("\"/data/app\"", &format!("{:?}", path));
    parse_config(&contents).assert_err_contains("must not contain '..'");
}

#[test]
fn test_plan_preserves_order_and_settings() {
    let config = parse_config(full_config_toml()).assert_ok();
    let plan = build_plan(&config);

    assert_eq!(plan.settings.timeout, Some(Duration::from_secs(3600)));
    assert_eq!(plan.settings.database.user.as_deref(), Some("backup"));
    assert_eq!(
        plan.pairs()
            .iter()
            .map(|(s, d)| format!("{}->{}", s, d))
            .collect::<Vec<_>>(),
        vec![
            "/var/www->s3:offsite",
            "/var/www->file:/mnt/backup/",
            "mysql:shop->s3:offsite",
            "mysql:shop->file:/mnt/backup/",
            "mysql:crm->s3:offsite",
            "mysql:crm->file:/mnt/backup/",
        ]
    );
}
