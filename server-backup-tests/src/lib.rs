//! Test utilities for server-backup
//!
//! This crate provides shared test utilities, fixtures and helper functions
//! for testing the server-backup application.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use test_utils::{ConfigBuilder, MockExecutor, run_plan};
//!
//! #[test]
//! fn my_test() {
//!     let config = ConfigBuilder::minimal().add_dir_source("/data/app").build();
//!     let executor = MockExecutor::new();
//!     let (summary, output) = run_plan(build_plan(&config), &executor);
//!     // ... assertions
//! }
//! ```

pub mod assertions;
pub mod config_builder;
pub mod fixtures;

// Re-export commonly used items
pub use assertions::{OptionAssertions, ResultAssertions};
pub use config_builder::ConfigBuilder;
pub use fixtures::*;

// Re-export types from the main crate for convenience
pub use server_backup::config::{
    build_plan, parse_config, BackupPlan, Config, DestinationConfig, GlobalConfig, PlanSettings,
    Secret, SourceConfig,
};
pub use server_backup::managers::backup::{BackupManager, RunSummary};
pub use server_backup::managers::report::{Reporter, SharedBuffer};

// Re-export mock implementations from the main crate
pub use server_backup::utils::executor::mock::{MockExecutor, MockResponse};
pub use server_backup::utils::executor::CommandExecutor;

/// Run a plan against a mock executor, returning the summary and everything
/// the reporter printed
pub fn run_plan(plan: BackupPlan, executor: &MockExecutor) -> (RunSummary, String) {
    run_plan_with(plan, executor, false)
}

/// Same as [`run_plan`] with control over verbose output
pub fn run_plan_with(
    plan: BackupPlan,
    executor: &MockExecutor,
    verbose: bool,
) -> (RunSummary, String) {
    let buffer = SharedBuffer::new();
    let mut manager = BackupManager::new(
        plan,
        Box::new(executor.clone()),
        Reporter::new(Box::new(buffer.clone()), verbose),
    );
    let summary = manager.run();
    (summary, buffer.contents())
}
