//! Backup manager - orchestrates backup execution
//!
//! Sources are processed one at a time in plan order. Each source is prepared,
//! sent to every destination in plan order, then cleaned up. A failing pair
//! never stops the run; it ends up in the [`FailureLedger`].

use crate::config::{BackupPlan, PlanSettings};
use crate::destinations::Destination;
use crate::managers::report::{FailureLedger, Reporter};
use crate::sources::{Source, SourceContext, SourceError};
use crate::utils::duplicity;
use crate::utils::executor::CommandExecutor;
use std::time::Instant;
use tracing::{debug, error, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    #[error("Source preparation failed: {0}")]
    SourcePreparationFailed(#[source] SourceError),

    #[error("Source cleanup failed: {0}")]
    SourceCleanupFailed(#[source] SourceError),

    #[error("duplicity exited with code {exit_code:?}")]
    TransportFailed { exit_code: Option<i32>, log: String },

    #[error("Failed to launch duplicity: {0}")]
    TransportLaunchFailed(String),
}

impl BackupError {
    /// Text recorded in the failure ledger
    pub fn diagnostic(&self) -> String {
        match self {
            BackupError::SourcePreparationFailed(e) | BackupError::SourceCleanupFailed(e) => {
                e.to_string()
            }
            BackupError::TransportFailed { log, .. } => log.clone(),
            BackupError::TransportLaunchFailed(message) => message.clone(),
        }
    }
}

/// Final state of one source/destination attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairOutcome {
    Succeeded,
    Failed { diagnostic: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub source: String,
    pub destination: String,
    pub outcome: PairOutcome,
}

/// Everything a run produced
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Attempted pairs in attempt order
    pub attempts: Vec<ExecutionResult>,
    pub ledger: FailureLedger,
}

impl RunSummary {
    pub fn succeeded(&self) -> bool {
        self.ledger.is_empty()
    }

    pub fn exit_code(&self) -> u8 {
        self.ledger.exit_code()
    }
}

pub struct BackupManager {
    plan: BackupPlan,
    executor: Box<dyn CommandExecutor>,
    reporter: Reporter,
}

impl BackupManager {
    /// Create new backup manager
    pub fn new(plan: BackupPlan, executor: Box<dyn CommandExecutor>, reporter: Reporter) -> Self {
        Self {
            plan,
            executor,
            reporter,
        }
    }

    pub fn plan(&self) -> &BackupPlan {
        &self.plan
    }

    /// Back up every source to every destination and print the report
    pub fn run(&mut self) -> RunSummary {
        let start_time = Instant::now();
        let mut summary = RunSummary::default();

        if self.plan.is_empty() {
            warn!("Backup plan has no sources or no destinations, nothing to do");
        }

        info!(
            "Starting backup run: {} source(s), {} destination(s)",
            self.plan.sources.len(),
            self.plan.destinations.len()
        );

        let BackupPlan {
            settings,
            sources,
            destinations,
        } = &mut self.plan;

        let mut run = Run {
            executor: self.executor.as_ref(),
            reporter: &mut self.reporter,
            settings,
            destinations,
        };

        for source in sources.iter_mut() {
            run.backup_source(source.as_mut(), &mut summary);
        }

        info!(
            "Backup run completed in {:.2}s: {} attempt(s), {} failure(s)",
            start_time.elapsed().as_secs_f64(),
            summary.attempts.len(),
            summary.ledger.len()
        );

        self.reporter.report(&summary.ledger);
        summary
    }
}

/// Borrowed state of one run
struct Run<'a> {
    executor: &'a dyn CommandExecutor,
    reporter: &'a mut Reporter,
    settings: &'a PlanSettings,
    destinations: &'a [Box<dyn Destination>],
}

impl Run<'_> {
    fn backup_source(&mut self, source: &mut dyn Source, summary: &mut RunSummary) {
        let source_name = source.pretty_name();
        self.reporter.begin_source(&source_name);
        info!("Starting backup of '{}'", source_name);

        let mut ctx = SourceContext {
            executor: self.executor,
            reporter: &mut *self.reporter,
            settings: self.settings,
        };

        // No destination is attempted and post is skipped when pre fails
        if let Err(e) = source.pre(&mut ctx) {
            let err = BackupError::SourcePreparationFailed(e);
            error!("Failed to prepare '{}': {}", source_name, err);
            self.reporter.failed();
            summary.ledger.record(source_name, err.diagnostic());
            return;
        }

        let destinations = self.destinations;
        for destination in destinations {
            let destination_name = destination.pretty_name();
            self.reporter.begin_destination(&destination_name);

            let outcome = match self.backup_to_destination(&*source, destination.as_ref()) {
                Ok(()) => {
                    info!(
                        "Successfully backed up '{}' to '{}'",
                        source_name, destination_name
                    );
                    self.reporter.ok();
                    PairOutcome::Succeeded
                }
                Err(e) => {
                    error!(
                        "Failed to backup '{}' to '{}': {}",
                        source_name, destination_name, e
                    );
                    self.reporter.failed();
                    let diagnostic = e.diagnostic();
                    summary.ledger.record(
                        FailureLedger::pair_key(&source_name, &destination_name),
                        diagnostic.clone(),
                    );
                    PairOutcome::Failed { diagnostic }
                }
            };

            summary.attempts.push(ExecutionResult {
                source: source_name.clone(),
                destination: destination_name,
                outcome,
            });
        }

        if let Err(e) = source.post() {
            let err = BackupError::SourceCleanupFailed(e);
            error!("Failed to clean up '{}': {}", source_name, err);
            self.reporter.cleanup_failed(&source_name);
            summary.ledger.record(source_name, err.diagnostic());
        }
    }

    /// Perform backup to a specific destination
    fn backup_to_destination(
        &mut self,
        source: &dyn Source,
        destination: &dyn Destination,
    ) -> Result<(), BackupError> {
        let invocation = duplicity::compose(self.settings, source, destination)
            .map_err(|e| BackupError::TransportLaunchFailed(e.to_string()))?;

        self.reporter.command(&invocation);
        debug!("Running duplicity: {}", invocation.command_line());

        let output = self
            .executor
            .execute(&invocation, self.settings.timeout)
            .map_err(|e| BackupError::TransportLaunchFailed(format!("{:#}", e)))?;

        if output.success {
            Ok(())
        } else {
            Err(BackupError::TransportFailed {
                exit_code: output.exit_code,
                log: output.log,
            })
        }
    }
}
