//! Private temporary workspaces with crash-safe cleanup
//!
//! Dump sources write credentials into their workspace, so a workspace must
//! not outlive the process. Every allocated path is appended to a process-wide
//! registry; [`sweep_registered_workspaces`] removes whatever is left and is
//! called on normal exit, from the panic hook and on SIGINT/SIGTERM.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, Once, OnceLock};
use tempfile::TempDir;
use tracing::{debug, info, warn};

static REGISTRY: OnceLock<Mutex<Vec<PathBuf>>> = OnceLock::new();
static HANDLERS: Once = Once::new();

fn registry() -> &'static Mutex<Vec<PathBuf>> {
    REGISTRY.get_or_init(|| Mutex::new(Vec::new()))
}

/// A temporary directory removed on release or drop
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Create a private directory under the system temp dir
    pub fn allocate(prefix: &str) -> io::Result<Self> {
        let dir = tempfile::Builder::new().prefix(prefix).tempdir()?;

        registry()
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(dir.path().to_path_buf());

        debug!("Allocated workspace: {:?}", dir.path());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn join(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Recursively remove the workspace, reporting failures
    pub fn release(self) -> io::Result<()> {
        let path = self.dir.path().to_path_buf();
        self.dir.close()?;
        debug!("Released workspace: {:?}", path);
        Ok(())
    }
}

/// Paths of every workspace allocated by this process
pub fn registered_workspaces() -> Vec<PathBuf> {
    registry()
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}

/// Remove every registered workspace that still exists. Returns how many were
/// removed.
pub fn sweep_registered_workspaces() -> usize {
    let paths = registered_workspaces();
    let mut removed = 0;

    for path in paths.iter().filter(|p| p.exists()) {
        match std::fs::remove_dir_all(path) {
            Ok(()) => {
                removed += 1;
                info!("Removed leftover workspace: {:?}", path);
            }
            Err(e) => warn!("Failed to remove leftover workspace {:?}: {}", path, e),
        }
    }

    removed
}

/// Sweep workspaces on panic and on SIGINT/SIGTERM. Safe to call more than once.
pub fn install_cleanup_handlers() {
    HANDLERS.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            sweep_registered_workspaces();
            previous(panic_info);
        }));

        if let Err(e) = spawn_signal_watcher() {
            warn!("Failed to install signal handlers: {}", e);
        }
    });
}

fn spawn_signal_watcher() -> io::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    std::thread::Builder::new()
        .name("workspace-cleanup".to_string())
        .spawn(move || {
            let code = runtime.block_on(wait_for_signal());
            warn!("Interrupted, removing temporary workspaces");
            sweep_registered_workspaces();
            std::process::exit(code);
        })?;

    Ok(())
}

/// Resolve with the conventional exit code of the received signal
#[cfg(unix)]
async fn wait_for_signal() -> i32 {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut terminate) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => 130,
                _ = terminate.recv() => 143,
            }
        }
        Err(_) => {
            let _ = tokio::signal::ctrl_c().await;
            130
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> i32 {
    let _ = tokio::signal::ctrl_c().await;
    130
}
