//! Destination naming and environment

use rstest::rstest;
use server_backup::config::{build_plan, parse_config, Secret};
use server_backup::destinations::{Destination, LocalDestination, S3Destination};
use test_utils::*;

#[rstest]
#[case("/mnt/backup", "WEB1", "file:///mnt/backup/web1")]
#[case("/mnt/backup/", "web1", "file:///mnt/backup/web1")]
#[case("/srv", "Db-Server", "file:///srv/db-server")]
fn test_local_urls(#[case] path: &str, #[case] server: &str, #[case] expected: &str) {
    assert_eq!(LocalDestination::new(path).transport_url(server), expected);
}

#[test]
fn test_s3_credentials_only_in_env() {
    let destination = S3Destination::new("bucket", "AKIA", Secret::new("very-secret"));

    assert_eq!(destination.pretty_name(), "s3:bucket");
    assert!(destination
        .transport_options()
        .iter()
        .all(|o| !o.contains("very-secret") && !o.contains("AKIA")));
    assert_eq!(destination.transport_env().len(), 2);
}

#[test]
fn test_destinations_built_from_config() {
    let plan = build_plan(&parse_config(full_config_toml()).assert_ok());
    let names: Vec<String> = plan.destinations.iter().map(|d| d.pretty_name()).collect();

    assert_eq!(names, vec!["s3:offsite", "file:/mnt/backup/"]);
}
