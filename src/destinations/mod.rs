//! Backup destinations
//!
//! A [`Destination`] is one remote target. Destinations are immutable once the
//! plan is built; adding a new kind needs no change in the backup manager.

pub mod local;
pub mod s3;

pub use local::LocalDestination;
pub use s3::S3Destination;

use crate::config::DestinationConfig;
use std::collections::HashMap;

/// Trait for backup destinations
pub trait Destination {
    /// Human-readable name used in progress output and failure keys
    fn pretty_name(&self) -> String;

    /// Scheme-qualified URL for this server under the destination
    fn transport_url(&self, server_name: &str) -> String;

    /// Additional options for duplicity
    fn transport_options(&self) -> Vec<String> {
        Vec::new()
    }

    /// Additional env for duplicity. Credentials go here, never into options.
    fn transport_env(&self) -> HashMap<String, String> {
        HashMap::new()
    }
}

/// Create the destination declared by a config entry
pub fn build_destination(config: &DestinationConfig) -> Box<dyn Destination> {
    match config {
        DestinationConfig::S3(s3) => Box::new(S3Destination::new(
            &s3.bucket,
            &s3.access_key_id,
            s3.secret_access_key.clone(),
        )),
        DestinationConfig::Local(local) => Box::new(LocalDestination::new(&local.path)),
    }
}
