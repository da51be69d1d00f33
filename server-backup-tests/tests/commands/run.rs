//! Tests for a full backup run
//!
//! A run backs up every source to every destination and reports what failed.

use rstest::rstest;
use serial_test::serial;
use server_backup::config::build_plan;
use test_utils::*;

fn failure(output: &str) -> MockResponse {
    MockResponse::Failure {
        output: output.to_string(),
        exit_code: 1,
    }
}

#[test]
fn test_every_pair_attempted_in_order() {
    let config = ConfigBuilder::minimal()
        .add_s3_destination("second")
        .add_dir_source("/etc")
        .add_dir_source("/var/www")
        .build();
    let executor = MockExecutor::new();

    let (summary, output) = run_plan(build_plan(&config), &executor);

    assert!(summary.succeeded());
    assert_eq!(summary.exit_code(), 0);
    let targets: Vec<String> = executor
        .calls_to("duplicity")
        .iter()
        .map(|c| c.args.last().cloned().unwrap_or_default())
        .collect();
    assert_eq!(
        targets,
        vec![
            "s3+http://b/web1/etc",
            "s3+http://second/web1/etc",
            "s3+http://b/web1/www",
            "s3+http://second/web1/www",
        ]
    );
    assert_eq!(
        output,
        "Backup /etc\n -> s3:b...ok.\n -> s3:second...ok.\n\
         Backup /var/www\n -> s3:b...ok.\n -> s3:second...ok.\n\
         \nEverything succeded =)\n"
    );
}

#[test]
fn test_single_failure_reported_with_diagnostic() {
    let config = ConfigBuilder::minimal().add_dir_source("/data/app").build();
    let executor = MockExecutor::new().expect("duplicity", failure("connection refused"));

    let (summary, output) = run_plan(build_plan(&config), &executor);

    assert_eq!(summary.exit_code(), 1);
    assert_eq!(summary.ledger.keys(), vec!["/data/app->s3:b"]);
    assert_eq!(summary.ledger.get("/data/app->s3:b"), Some("connection refused"));
    assert!(output.contains(" -> s3:b...failed.\n"));
    assert!(output.contains("/data/app->s3:b failed:\nconnection refused\n"));
    assert!(!output.contains("Everything succeded"));
}

#[test]
fn test_failure_does_not_stop_later_pairs() {
    let config = ConfigBuilder::minimal()
        .add_s3_destination("c")
        .add_dir_source("/a")
        .add_dir_source("/b")
        .build();
    let executor = MockExecutor::new().expect_sequence(
        "duplicity",
        vec![
            failure("boom"),
            MockResponse::default(),
            MockResponse::default(),
        ],
    );

    let (summary, _) = run_plan(build_plan(&config), &executor);

    assert_eq!(executor.call_count("duplicity"), 4);
    assert_eq!(summary.attempts.len(), 4);
    assert_eq!(summary.ledger.keys(), vec!["/a->s3:b"]);
}

#[test]
#[serial]
fn test_failed_dump_skips_its_destinations() {
    let config = ConfigBuilder::minimal()
        .add_mysql_source("shop")
        .add_dir_source("/etc")
        .build();
    let executor = MockExecutor::new().expect("mysqldump", failure("Access denied"));

    let (summary, output) = run_plan(build_plan(&config), &executor);

    assert_eq!(summary.ledger.keys(), vec!["mysql:shop"]);
    assert!(summary.ledger.get("mysql:shop").unwrap_or_default().contains("Access denied"));
    assert_eq!(executor.call_count("duplicity"), 1);
    assert!(output.starts_with("Backup mysql:shop\nfailed.\nBackup /etc\n"));
}

#[test]
fn test_launch_error_recorded_for_pair() {
    let config = ConfigBuilder::minimal().add_dir_source("/etc").build();
    let executor = MockExecutor::new().expect(
        "duplicity",
        MockResponse::LaunchError {
            message: "No such file or directory".to_string(),
        },
    );

    let (summary, _) = run_plan(build_plan(&config), &executor);

    assert!(summary
        .ledger
        .get("/etc->s3:b")
        .unwrap_or_default()
        .contains("No such file or directory"));
}

#[rstest]
#[case(false, 0)]
#[case(true, 2)]
#[serial]
fn test_verbose_echoes_commands(#[case] verbose: bool, #[case] echoed: usize) {
    let config = ConfigBuilder::minimal()
        .with_db_defaults("backup", "db-secret")
        .add_mysql_source("shop")
        .build();
    let executor = MockExecutor::new();

    let (_, output) = run_plan_with(build_plan(&config), &executor, verbose);

    let command_lines = output
        .lines()
        .filter(|l| l.contains("mysqldump ") || l.contains("duplicity "))
        .count();
    assert_eq!(command_lines, echoed);
    assert!(!output.contains("db-secret"));
    assert!(!output.contains("test-passphrase-123"));
    assert!(!output.contains("aws-test-secret"));
}

#[test]
fn test_passphrase_and_credentials_reach_duplicity_env() {
    let config = ConfigBuilder::minimal()
        .with_passphrase("hunter2")
        .add_dir_source("/etc")
        .build();
    let executor = MockExecutor::new();

    run_plan(build_plan(&config), &executor);

    let calls = executor.calls_to("duplicity");
    let call = &calls[0];
    assert_eq!(call.env.get("PASSPHRASE").map(String::as_str), Some("hunter2"));
    assert_eq!(call.env.get("AWS_ACCESS_KEY_ID").map(String::as_str), Some("AKIATEST"));
}

#[test]
fn test_local_destination_path() {
    let builder = ConfigBuilder::new().with_server_name("DB2").add_dir_source("/srv");
    let target = builder.temp_dir().join("backups");
    let config = builder.add_local_destination(&target).build();
    let executor = MockExecutor::new();

    let (summary, _) = run_plan(build_plan(&config), &executor);

    assert!(summary.succeeded());
    assert_eq!(
        executor.calls_to("duplicity")[0].args,
        vec![
            "/srv".to_string(),
            format!("file://{}/db2/srv", target.display()),
        ]
    );
}
