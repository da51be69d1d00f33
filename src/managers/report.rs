//! Progress output and the final failure report
//!
//! Progress and the report go to stdout (or any writer in tests); tracing
//! output stays on stderr.

use crate::utils::command::Invocation;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use tracing::warn;

/// Process exit codes
pub mod exit {
    pub const SUCCESS: u8 = 0;
    pub const FAILURE: u8 = 1;
}

/// Failures of a run, in attempt order
///
/// Keys are `"<source>-><destination>"` for a failed pair and `"<source>"`
/// for a failed pre or post hook.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailureLedger {
    entries: Vec<(String, String)>,
}

impl FailureLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pair_key(source: &str, destination: &str) -> String {
        format!("{}->{}", source, destination)
    }

    /// Record a failure. A repeated key replaces the earlier diagnostic in place.
    pub fn record(&mut self, key: impl Into<String>, diagnostic: impl Into<String>) {
        let key = key.into();
        let diagnostic = diagnostic.into();

        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = diagnostic,
            None => self.entries.push((key, diagnostic)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, diagnostic)| diagnostic.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, d)| (k.as_str(), d.as_str()))
    }

    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|(k, _)| k.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exit status for a run that produced this ledger
    pub fn exit_code(&self) -> u8 {
        if self.is_empty() {
            exit::SUCCESS
        } else {
            exit::FAILURE
        }
    }
}

/// Writes progress lines and the final summary
pub struct Reporter {
    out: Box<dyn Write + Send>,
    verbose: bool,
}

impl Reporter {
    pub fn new(out: Box<dyn Write + Send>, verbose: bool) -> Self {
        Self { out, verbose }
    }

    pub fn stdout(verbose: bool) -> Self {
        Self::new(Box::new(io::stdout()), verbose)
    }

    /// Discard everything
    pub fn sink() -> Self {
        Self::new(Box::new(io::sink()), false)
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn begin_source(&mut self, source: &str) {
        self.emit(format_args!("Backup {}\n", source));
    }

    pub fn begin_destination(&mut self, destination: &str) {
        self.emit(format_args!(" -> {}...", destination));
    }

    /// Echo a composed command line when verbose. The environment is never
    /// printed.
    pub fn command(&mut self, invocation: &Invocation) {
        if self.verbose {
            self.emit(format_args!("{}\n", invocation.command_line()));
        }
    }

    pub fn ok(&mut self) {
        self.emit(format_args!("ok.\n"));
    }

    pub fn failed(&mut self) {
        self.emit(format_args!("failed.\n"));
    }

    pub fn cleanup_failed(&mut self, source: &str) {
        self.emit(format_args!("Cleanup of {} failed.\n", source));
    }

    /// Print every failure with its diagnostic, or the success line
    pub fn report(&mut self, ledger: &FailureLedger) {
        self.emit(format_args!("\n"));

        if ledger.is_empty() {
            self.emit(format_args!("Everything succeded =)\n"));
            return;
        }

        self.emit(format_args!("During backups an error did occur:\n"));
        for (key, diagnostic) in ledger.iter() {
            self.emit(format_args!("{} failed:\n", key));
            if diagnostic.ends_with('\n') {
                self.emit(format_args!("{}\n", diagnostic));
            } else {
                self.emit(format_args!("{}\n\n", diagnostic));
            }
        }
    }

    fn emit(&mut self, args: std::fmt::Arguments<'_>) {
        if let Err(e) = self.out.write_fmt(args).and_then(|_| self.out.flush()) {
            warn!("Failed to write progress output: {}", e);
        }
    }
}

/// Clonable in-memory writer, handy for capturing reporter output
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        let bytes = self.0.lock().unwrap_or_else(|p| p.into_inner());
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
