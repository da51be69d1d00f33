use anyhow::{Context, Result};
use clap::Parser;
use server_backup::config::{self, DEFAULT_CONFIG_PATH};
use server_backup::managers::backup::BackupManager;
use server_backup::managers::logging::{self, LoggingConfig};
use server_backup::managers::report::Reporter;
use server_backup::utils::executor::RealExecutor;
use server_backup::utils::locker::RunLock;
use server_backup::utils::workspace;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "server-backup")]
#[command(about = "Backs up directories and databases to remote storage using duplicity", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Print every command line before running it
    #[arg(short, long)]
    verbose: bool,

    /// Validate the configuration and show planned backups without running them
    #[arg(long)]
    check: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // An unreadable config ends the process before anything runs
    let config = config::load_config(&cli.config)
        .with_context(|| format!("Failed to load configuration from {:?}", cli.config))?;

    // Setup logging (must keep guard alive)
    let logging_config = LoggingConfig::from_config(
        config.global.log_directory.as_deref(),
        &config.global.log_level,
        config.global.log_max_files,
        cli.verbose,
    );
    let _log_guard = logging::init_logging(&logging_config)?;

    let plan = config::build_plan(&config);

    if cli.check {
        println!("Configuration is valid!");
        println!("Server: {}", plan.settings.server_name);
        println!("Sources: {}", plan.sources.len());
        println!("Destinations: {}", plan.destinations.len());
        println!("\nPlanned backups:");
        for (source, destination) in plan.pairs() {
            println!("  {} -> {}", source, destination);
        }
        return Ok(ExitCode::SUCCESS);
    }

    // Prevent overlapping runs when a lock file is configured
    let mut lock = config
        .global
        .lock_file
        .as_deref()
        .map(|path| RunLock::open(config::expand_tilde(path)))
        .transpose()?;
    let _lock_guard = lock.as_mut().map(|lock| lock.try_acquire()).transpose()?;

    workspace::install_cleanup_handlers();

    let mut manager = BackupManager::new(
        plan,
        Box::new(RealExecutor::new()),
        Reporter::stdout(cli.verbose),
    );
    let summary = manager.run();

    // Dump workspaces are normally gone already
    workspace::sweep_registered_workspaces();

    Ok(ExitCode::from(summary.exit_code()))
}
