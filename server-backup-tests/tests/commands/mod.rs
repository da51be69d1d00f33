//! Command tests for server-backup
//!
//! These tests drive whole backup runs through the library using the mock executor.

mod run;
mod workspaces;
