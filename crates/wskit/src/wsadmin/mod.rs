//! wsadmin executor
//!
//! Drives the deployment manager's `wsadmin.sh` to discover, create and
//! destroy JDBC providers. Each operation writes a short Jython script to a
//! temporary file and runs it with `-lang jython -f`.
//!
//! Process execution goes through the [`CommandRunner`] trait so the
//! executor can be exercised without an application server.

pub mod command;
pub mod retry;
pub mod script;

use crate::error::{Error, Result};
use crate::record::JdbcProvider;
use declarative::{CommandOutput, Ensure, Executor};
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

pub use command::{RunAs, WsadminCommand};
pub use retry::{LogCallback, NoCallback, RetryCallback, RetryConfig, with_retry};

/// Runs an external program and captures its output.
pub trait CommandRunner: Send + Sync {
    fn run(&self, program: &str, args: &[String]) -> std::io::Result<CommandOutput>;
}

/// Runner that spawns real processes.
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> std::io::Result<CommandOutput> {
        Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map(CommandOutput::from)
    }
}

/// [`Executor`] for [`JdbcProvider`] backed by wsadmin.
pub struct WsadminExecutor<C = SystemRunner> {
    runner: C,
    run_as: RunAs,
    retry: RetryConfig,
    current_user: Option<String>,
    script_dir: Option<PathBuf>,
}

impl WsadminExecutor<SystemRunner> {
    /// Create an executor that spawns real processes.
    ///
    /// The current account is read from `USER` (or `LOGNAME`).
    pub fn new() -> Self {
        Self::with_runner(SystemRunner)
    }
}

impl Default for WsadminExecutor<SystemRunner> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: CommandRunner> WsadminExecutor<C> {
    /// Create an executor with a custom runner (useful for testing).
    pub fn with_runner(runner: C) -> Self {
        let current_user = std::env::var("USER")
            .or_else(|_| std::env::var("LOGNAME"))
            .ok();
        Self {
            runner,
            run_as: RunAs::default(),
            retry: RetryConfig::default(),
            current_user,
            script_dir: None,
        }
    }

    pub fn run_as(mut self, run_as: RunAs) -> Self {
        self.run_as = run_as;
        self
    }

    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn current_user(mut self, user: Option<String>) -> Self {
        self.current_user = user;
        self
    }

    /// Write scripts under `dir` instead of the system temp directory
    pub fn script_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.script_dir = Some(dir.into());
        self
    }

    pub fn runner(&self) -> &C {
        &self.runner
    }

    fn command_for(&self, provider: &JdbcProvider, script: PathBuf) -> WsadminCommand {
        let command = WsadminCommand::new(provider.wsadmin_path(), script).with_credentials(
            provider.wsadmin_user.as_deref(),
            provider.wsadmin_pass.as_ref(),
        );
        if self
            .run_as
            .needs_sudo(self.current_user.as_deref(), &provider.user)
        {
            command.as_user(provider.user.clone())
        } else {
            command
        }
    }

    fn write_script(&self, contents: &str) -> Result<tempfile::NamedTempFile> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("wasctl-").suffix(".py");
        let mut file = match &self.script_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        file.write_all(contents.as_bytes())?;
        file.flush()?;

        // The script holds no credentials and may be run by another account
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.as_file()
                .set_permissions(std::fs::Permissions::from_mode(0o644))?;
        }

        Ok(file)
    }

    /// Run a script once for a provider and check the exit status
    fn run_once(&self, provider: &JdbcProvider, contents: &str) -> Result<CommandOutput> {
        let file = self.write_script(contents)?;
        let command = self.command_for(provider, file.path().to_path_buf());
        log::debug!("Running {command}");

        let output = self
            .runner
            .run(&command.program(), &command.args())
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound && !command.uses_sudo() {
                    Error::ToolNotFound(command.tool().to_path_buf())
                } else {
                    Error::Io(e)
                }
            })?;

        if output.success {
            Ok(output)
        } else {
            Err(Error::from_wsadmin_output(
                &command.to_string(),
                output.code_str(),
                &output.stdout_str(),
                &output.stderr_str(),
                command.tool(),
            ))
        }
    }

    fn run_script(&self, provider: &JdbcProvider, contents: &str) -> Result<CommandOutput> {
        with_retry(&self.retry, Some(&LogCallback), || {
            self.run_once(provider, contents)
        })
    }
}

impl<C: CommandRunner> Executor<JdbcProvider> for WsadminExecutor<C> {
    type Error = Error;

    fn discover(&self, provider: &JdbcProvider) -> Result<Ensure> {
        let output = self.run_script(provider, &script::discover(provider)?)?;
        let stdout = output.stdout_str();
        script::parse_state(&stdout).ok_or_else(|| {
            Error::UnexpectedOutput(
                stdout
                    .lines()
                    .next_back()
                    .unwrap_or("no output")
                    .trim()
                    .to_string(),
            )
        })
    }

    fn create(&self, provider: &JdbcProvider) -> Result<()> {
        log::info!("Creating JDBC provider {}", provider.name);
        self.run_script(provider, &script::create(provider)?)?;
        Ok(())
    }

    fn destroy(&self, provider: &JdbcProvider) -> Result<()> {
        log::info!("Removing JDBC provider {}", provider.name);
        self.run_script(provider, &script::destroy(provider)?)?;
        Ok(())
    }
}
