//! wsadmin command lines

use crate::record::{REDACTED, Sensitive};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// How wsadmin is started relative to the declared `user`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunAs {
    /// Use sudo only when the current account differs from `user`
    #[default]
    Auto,
    /// Always go through `sudo -n -u <user> --`
    Sudo,
    /// Run as the current account and ignore `user`
    Never,
}

impl RunAs {
    /// Whether wsadmin must be started through sudo
    pub fn needs_sudo(self, current_user: Option<&str>, target: &str) -> bool {
        match self {
            RunAs::Auto => current_user != Some(target),
            RunAs::Sudo => true,
            RunAs::Never => false,
        }
    }
}

impl FromStr for RunAs {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(RunAs::Auto),
            "sudo" => Ok(RunAs::Sudo),
            "never" => Ok(RunAs::Never),
            other => Err(format!(
                "invalid run-as mode '{other}', expected one of: auto, sudo, never"
            )),
        }
    }
}

impl fmt::Display for RunAs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunAs::Auto => f.write_str("auto"),
            RunAs::Sudo => f.write_str("sudo"),
            RunAs::Never => f.write_str("never"),
        }
    }
}

/// One wsadmin invocation
///
/// [`WsadminCommand::args`] carries the real password; the `Display`
/// rendering shows `-password ****` and is what gets logged.
#[derive(Debug, Clone)]
pub struct WsadminCommand {
    tool: PathBuf,
    script: PathBuf,
    user: Option<String>,
    password: Option<Sensitive>,
    sudo_user: Option<String>,
}

impl WsadminCommand {
    pub fn new(tool: impl Into<PathBuf>, script: impl Into<PathBuf>) -> Self {
        Self {
            tool: tool.into(),
            script: script.into(),
            user: None,
            password: None,
            sudo_user: None,
        }
    }

    /// Add `-user` / `-password` for administrative security
    pub fn with_credentials(mut self, user: Option<&str>, password: Option<&Sensitive>) -> Self {
        self.user = user.map(str::to_string);
        self.password = password.cloned();
        self
    }

    /// Run through `sudo -n -u <account> --`
    pub fn as_user(mut self, account: impl Into<String>) -> Self {
        self.sudo_user = Some(account.into());
        self
    }

    pub fn tool(&self) -> &Path {
        &self.tool
    }

    pub fn uses_sudo(&self) -> bool {
        self.sudo_user.is_some()
    }

    /// Program to execute
    pub fn program(&self) -> String {
        if self.sudo_user.is_some() {
            "sudo".to_string()
        } else {
            self.tool.display().to_string()
        }
    }

    /// Arguments, including the real password
    pub fn args(&self) -> Vec<String> {
        self.render(false)
    }

    fn render(&self, redact: bool) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(account) = &self.sudo_user {
            args.extend([
                "-n".to_string(),
                "-u".to_string(),
                account.clone(),
                "--".to_string(),
                self.tool.display().to_string(),
            ]);
        }
        args.extend([
            "-lang".to_string(),
            "jython".to_string(),
            "-f".to_string(),
            self.script.display().to_string(),
        ]);
        if let Some(user) = &self.user {
            args.extend(["-user".to_string(), user.clone()]);
        }
        if let Some(password) = &self.password {
            let shown = if redact {
                REDACTED.to_string()
            } else {
                password.expose().to_string()
            };
            args.extend(["-password".to_string(), shown]);
        }
        args
    }
}

impl fmt::Display for WsadminCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.program(), self.render(true).join(" "))
    }
}
