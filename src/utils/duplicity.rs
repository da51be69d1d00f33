//! Composition of duplicity invocations
//!
//! Environment layers, later overriding earlier on key collision:
//! 1. `PASSPHRASE` from the plan
//! 2. destination env (credentials)
//! 3. source env
//!
//! Arguments: destination options, source options, source URL, remote path.
//! Options are appended, never merged; duplicity sees both if they repeat a flag.

use super::command::Invocation;
use crate::config::PlanSettings;
use crate::destinations::Destination;
use crate::sources::{Source, SourceError};
use std::collections::HashMap;

pub const PASSPHRASE_ENV: &str = "PASSPHRASE";

/// Merge the environment layers for one source/destination pair
pub fn compose_env(
    settings: &PlanSettings,
    source: &dyn Source,
    destination: &dyn Destination,
) -> HashMap<String, String> {
    let mut env = HashMap::from([(
        PASSPHRASE_ENV.to_string(),
        settings.passphrase.expose().to_string(),
    )]);

    env.extend(destination.transport_env());
    env.extend(source.transport_env());
    env
}

/// Target path for a source under a destination URL
pub fn remote_path(destination_url: &str, dest_name: &str) -> String {
    format!("{}/{}", destination_url.trim_end_matches('/'), dest_name)
}

/// Build the full duplicity invocation for one source/destination pair
pub fn compose(
    settings: &PlanSettings,
    source: &dyn Source,
    destination: &dyn Destination,
) -> Result<Invocation, SourceError> {
    let source_url = source.transport_url()?;
    let target = remote_path(
        &destination.transport_url(&settings.server_name),
        &source.dest_name(),
    );

    let mut args = destination.transport_options();
    args.extend(source.transport_options());
    args.push(source_url);
    args.push(target);

    Ok(Invocation {
        program: settings.tools.duplicity.clone(),
        args,
        env: compose_env(settings, source, destination),
        stdout_file: None,
    })
}
