//! Unit tests for server-backup building blocks

mod config;
mod destinations;
mod sources;
