//! Dump workspaces never outlive a run

use serial_test::serial;
use server_backup::config::build_plan;
use server_backup::utils::workspace::{registered_workspaces, sweep_registered_workspaces};
use std::path::PathBuf;
use test_utils::*;

fn new_workspaces(before: &[PathBuf]) -> Vec<PathBuf> {
    registered_workspaces()
        .into_iter()
        .filter(|p| !before.contains(p))
        .collect()
}

#[test]
#[serial]
fn test_workspace_removed_after_successful_run() {
    let before = registered_workspaces();
    let config = ConfigBuilder::minimal().add_mysql_source("shop").build();
    let executor = MockExecutor::new();

    let (summary, _) = run_plan(build_plan(&config), &executor);

    assert!(summary.succeeded());
    let created = new_workspaces(&before);
    assert_eq!(created.len(), 1);
    assert!(!created[0].exists());

    // duplicity was pointed at the workspace while it existed
    let calls = executor.calls_to("duplicity");
    let call = &calls[0];
    assert_eq!(call.args[2], created[0].display().to_string());
}

#[test]
#[serial]
fn test_workspace_removed_when_every_destination_fails() {
    let before = registered_workspaces();
    let config = ConfigBuilder::minimal()
        .add_s3_destination("c")
        .add_mysql_source("shop")
        .build();
    let executor = MockExecutor::new().expect(
        "duplicity",
        MockResponse::Failure {
            output: "network down".to_string(),
            exit_code: 50,
        },
    );

    let (summary, _) = run_plan(build_plan(&config), &executor);

    assert_eq!(
        summary.ledger.keys(),
        vec!["mysql:shop->s3:b", "mysql:shop->s3:c"]
    );
    for path in new_workspaces(&before) {
        assert!(!path.exists());
    }
}

#[test]
#[serial]
fn test_sweep_after_run_finds_nothing() {
    let config = ConfigBuilder::minimal()
        .add_mysql_source("a")
        .add_mysql_source("b")
        .build();
    let executor = MockExecutor::new();

    run_plan(build_plan(&config), &executor);

    assert_eq!(sweep_registered_workspaces(), 0);
}
