//! MySQL dump source
//!
//! `pre` dumps the database into a private workspace, duplicity then backs up
//! the whole workspace and `post` removes it again. The credentials file that
//! `mysqldump` reads lives in the same workspace and is excluded from the
//! upload.

use super::{Source, SourceContext, SourceError};
use crate::config::Secret;
use crate::utils::command::Invocation;
use crate::utils::workspace::Workspace;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::{error, info};

const WORKSPACE_PREFIX: &str = "mysql-backup";
const CREDENTIALS_FILE: &str = "my.cnf";
const DUMP_FILE: &str = "dump.sql";

#[derive(Debug)]
pub struct MysqlSource {
    database: String,
    user: Option<String>,
    password: Option<Secret>,
    workspace: Option<Workspace>,
}

impl MysqlSource {
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            user: None,
            password: None,
            workspace: None,
        }
    }

    /// Per-source credentials, overriding the plan defaults
    pub fn with_auth(mut self, user: Option<String>, password: Option<Secret>) -> Self {
        self.user = user;
        self.password = password;
        self
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    /// The current workspace, if `pre` succeeded and `post` has not run yet
    pub fn workspace_path(&self) -> Option<&Path> {
        self.workspace.as_ref().map(Workspace::path)
    }

    fn dump(&self, workspace: &Workspace, ctx: &mut SourceContext<'_>) -> Result<(), SourceError> {
        let defaults = &ctx.settings.database;
        let user = self.user.as_ref().or(defaults.user.as_ref());
        let password = self.password.as_ref().or(defaults.password.as_ref());

        let credentials_path = workspace.join(CREDENTIALS_FILE);
        write_credentials_file(&credentials_path, password).map_err(|source| {
            SourceError::CredentialsFile {
                path: credentials_path.clone(),
                source,
            }
        })?;

        // --defaults-extra-file has to come first
        let mut invocation = Invocation::new(&ctx.settings.tools.mysqldump).arg(format!(
            "--defaults-extra-file={}",
            credentials_path.display()
        ));
        if let Some(user) = user {
            invocation = invocation.arg(format!("-u{}", user));
        }
        let invocation = invocation
            .arg(&self.database)
            .stdout_to(workspace.join(DUMP_FILE));

        ctx.reporter.command(&invocation);

        let output = ctx
            .executor
            .execute(&invocation, ctx.settings.timeout)
            .map_err(|e| SourceError::DumpLaunch {
                database: self.database.clone(),
                message: format!("{:#}", e),
            })?;

        if !output.success {
            error!("mysqldump failed for '{}': {}", self.database, output.log);
            return Err(SourceError::DumpFailed {
                database: self.database.clone(),
                exit_code: output.exit_code,
                log: output.log,
            });
        }

        Ok(())
    }
}

fn write_credentials_file(path: &Path, password: Option<&Secret>) -> std::io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    writeln!(file, "[client]")?;
    if let Some(password) = password {
        writeln!(file, "password={}", quote_option_value(password.expose()))?;
    }
    file.sync_all()
}

/// Double-quote a value for a MySQL option file. Unquoted values lose
/// everything after `#` and their trailing whitespace.
fn quote_option_value(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

impl Source for MysqlSource {
    fn pretty_name(&self) -> String {
        format!("mysql:{}", self.database)
    }

    fn dest_name(&self) -> String {
        format!("mysql-{}", self.database)
    }

    fn transport_url(&self) -> Result<String, SourceError> {
        self.workspace_path()
            .map(|path| path.display().to_string())
            .ok_or_else(|| SourceError::NotPrepared(self.pretty_name()))
    }

    fn transport_options(&self) -> Vec<String> {
        match self.workspace {
            Some(ref workspace) => vec![format!(
                "--exclude={}",
                workspace.join(CREDENTIALS_FILE).display()
            )],
            None => Vec::new(),
        }
    }

    fn pre(&mut self, ctx: &mut SourceContext<'_>) -> Result<(), SourceError> {
        // A previous run that skipped post must not leak its workspace
        self.post()?;

        let workspace =
            Workspace::allocate(WORKSPACE_PREFIX).map_err(SourceError::WorkspaceAllocation)?;

        // On failure the workspace is dropped here, which removes it
        self.dump(&workspace, ctx)?;

        info!(
            "Dumped database '{}' into {:?}",
            self.database,
            workspace.path()
        );
        self.workspace = Some(workspace);
        Ok(())
    }

    fn post(&mut self) -> Result<(), SourceError> {
        let Some(workspace) = self.workspace.take() else {
            return Ok(());
        };

        let path = workspace.path().to_path_buf();
        workspace
            .release()
            .map_err(|source| SourceError::Cleanup { path, source })
    }
}
