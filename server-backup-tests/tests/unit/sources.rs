//! Directory and MySQL sources

use rstest::rstest;
use serial_test::serial;
use server_backup::config::{DatabaseDefaults, PlanSettings, Secret};
use server_backup::managers::report::Reporter;
use server_backup::sources::{DirectorySource, MysqlSource, Source, SourceContext, SourceError};
use std::fs;
use test_utils::*;

#[rstest]
#[case("/data/app", "app")]
#[case("/data/app/", "app")]
#[case("/etc", "etc")]
#[case("/", "root")]
fn test_directory_dest_name(#[case] path: &str, #[case] expected: &str) {
    assert_eq!(DirectorySource::new(path).dest_name(), expected);
}

#[test]
fn test_directory_excludes_become_options() {
    let source = DirectorySource::new("/var/www")
        .with_excludes(vec!["/var/www/cache".to_string(), "**/*.tmp".to_string()]);

    assert_eq!(
        source.transport_options(),
        vec!["--exclude=/var/www/cache", "--exclude=**/*.tmp"]
    );
}

fn settings() -> PlanSettings {
    PlanSettings {
        server_name: "web1".to_string(),
        passphrase: Secret::new("p"),
        database: DatabaseDefaults {
            user: Some("backup".to_string()),
            password: Some(Secret::new("default-pw")),
        },
        ..Default::default()
    }
}

fn prepare(source: &mut MysqlSource, executor: &MockExecutor) -> Result<(), SourceError> {
    let settings = settings();
    let mut reporter = Reporter::sink();
    let mut ctx = SourceContext {
        executor,
        reporter: &mut reporter,
        settings: &settings,
    };
    source.pre(&mut ctx)
}

#[test]
#[serial]
fn test_mysql_dump_lifecycle() {
    let executor = MockExecutor::new().expect(
        "mysqldump",
        MockResponse::Success {
            stdout: "CREATE TABLE t;".to_string(),
        },
    );
    let mut source = MysqlSource::new("shop");

    prepare(&mut source, &executor).assert_ok();

    let workspace = source.workspace_path().assert_some().to_path_buf();
    assert_eq!(
        fs::read_to_string(workspace.join("dump.sql")).unwrap(),
        "CREATE TABLE t;"
    );
    let credentials = fs::read_to_string(workspace.join("my.cnf")).unwrap();
    assert!(credentials.contains("password=\"default-pw\"\n"));

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(workspace.join("my.cnf")).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    let calls = executor.calls_to("mysqldump");
    let call = &calls[0];
    assert_eq!(call.args.len(), 3);
    assert!(call.args[0].starts_with("--defaults-extra-file="));
    assert_eq!(call.args[1], "-ubackup");
    assert_eq!(call.args[2], "shop");
    assert!(!call.command_line().contains("default-pw"));

    assert_eq!(source.transport_url().unwrap(), workspace.display().to_string());
    assert_eq!(
        source.transport_options(),
        vec![format!("--exclude={}", workspace.join("my.cnf").display())]
    );

    source.post().assert_ok();
    assert!(!workspace.exists());
    assert!(source.workspace_path().is_none());
}

#[test]
#[serial]
fn test_mysql_source_credentials_override_defaults() {
    let executor = MockExecutor::new();
    let mut source =
        MysqlSource::new("crm").with_auth(Some("crm".to_string()), Some(Secret::new("crm-pw")));

    prepare(&mut source, &executor).assert_ok();

    let workspace = source.workspace_path().assert_some().to_path_buf();
    assert!(fs::read_to_string(workspace.join("my.cnf"))
        .unwrap()
        .contains("password=\"crm-pw\"\n"));
    assert_eq!(executor.calls_to("mysqldump")[0].args[1], "-ucrm");

    source.post().assert_ok();
}

#[test]
#[serial]
fn test_mysql_dump_failure_leaves_nothing_behind() {
    let executor = MockExecutor::new().expect(
        "mysqldump",
        MockResponse::Failure {
            output: "Access denied for user 'backup'".to_string(),
            exit_code: 2,
        },
    );
    let mut source = MysqlSource::new("shop");
    let before = server_backup::utils::workspace::registered_workspaces();

    prepare(&mut source, &executor).assert_err_contains("Access denied");

    assert!(source.workspace_path().is_none());
    let after = server_backup::utils::workspace::registered_workspaces();
    for path in after.iter().filter(|p| !before.contains(p)) {
        assert!(!path.exists(), "workspace {:?} left behind", path);
    }
}

#[test]
#[serial]
fn test_mysql_unprepared_has_no_url() {
    let source = MysqlSource::new("shop");

    assert_eq!(source.pretty_name(), "mysql:shop");
    assert_eq!(source.dest_name(), "mysql-shop");
    assert!(matches!(
        source.transport_url(),
        Err(SourceError::NotPrepared(_))
    ));
    assert!(source.transport_options().is_empty());
}

#[test]
#[serial]
fn test_mysql_post_is_idempotent() {
    let mut source = MysqlSource::new("shop");
    source.post().assert_ok();
    source.post().assert_ok();
}
