//! User settings (`config.toml`)
//!
//! ```toml
//! declarations = "~/ops/providers.toml"
//! jobs = 4
//! run_as = "auto"
//!
//! [retry]
//! max_attempts = 3
//! base_delay_secs = 10
//! ```

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use wskit::{RetryConfig, RunAs};

use crate::paths;

/// Name of the settings file inside the config directory
pub const SETTINGS_FILE: &str = "config.toml";

/// Longest wait between wsadmin retries (one hour)
pub const MAX_RETRY_DELAY_SECS: u64 = 3600;

/// Name of the default declarations file inside the config directory
pub const DECLARATIONS_FILE: &str = "declarations.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Declarations file; `~` and `$VARS` are expanded
    pub declarations: Option<String>,
    /// Providers reconciled in parallel
    pub jobs: usize,
    pub run_as: RunAs,
    /// Where generated wsadmin scripts are written (system temp dir if unset)
    pub script_dir: Option<String>,
    pub retry: RetrySettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            declarations: None,
            jobs: 4,
            run_as: RunAs::Auto,
            script_dir: None,
            retry: RetrySettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub base_delay_secs: u64,
    pub backoff_factor: f64,
    pub max_delay_secs: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            base_delay_secs: 5,
            backoff_factor: 2.0,
            max_delay_secs: 120,
        }
    }
}

impl RetrySettings {
    /// Reject values that would make backoff shrink or never end
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.backoff_factor.is_finite() && self.backoff_factor >= 1.0,
            "retry.backoff_factor must be a finite number >= 1.0, found {}",
            self.backoff_factor
        );
        ensure!(
            self.max_delay_secs <= MAX_RETRY_DELAY_SECS,
            "retry.max_delay_secs must be at most {MAX_RETRY_DELAY_SECS}, found {}",
            self.max_delay_secs
        );
        ensure!(
            self.base_delay_secs <= self.max_delay_secs,
            "retry.base_delay_secs ({}) exceeds retry.max_delay_secs ({})",
            self.base_delay_secs,
            self.max_delay_secs
        );
        Ok(())
    }

    pub fn to_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.max_attempts.max(1),
            base_delay: Duration::from_secs(self.base_delay_secs),
            backoff_factor: self.backoff_factor,
            max_delay: Duration::from_secs(self.max_delay_secs),
        }
    }
}

impl Settings {
    /// Load settings, falling back to defaults when the file doesn't exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings: {}", path.display()))?;
        let settings: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings: {}", path.display()))?;
        settings
            .retry
            .validate()
            .with_context(|| format!("Invalid settings: {}", path.display()))?;

        log::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Declarations file named by the settings, or the default one
    pub fn declarations_path(&self) -> Result<PathBuf> {
        match &self.declarations {
            Some(path) => Ok(paths::expand(path)),
            None => Ok(paths::config_dir()?.join(DECLARATIONS_FILE)),
        }
    }

    pub fn script_dir(&self) -> Option<PathBuf> {
        self.script_dir.as_deref().map(paths::expand)
    }
}

/// Default settings file location
pub fn settings_path() -> Result<PathBuf> {
    Ok(paths::config_dir()?.join(SETTINGS_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::load(&dir.path().join(SETTINGS_FILE)).unwrap();

        assert_eq!(settings, Settings::default());
        assert_eq!(settings.jobs, 4);
        assert_eq!(settings.retry.to_config(), RetryConfig::no_retry());
    }

    #[test]
    fn test_load_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(
            &path,
            r#"
declarations = "/etc/wasctl/providers.toml"
run_as = "sudo"

[retry]
max_attempts = 3
"#,
        )
        .unwrap();

        let settings = Settings::load(&path).unwrap();

        assert_eq!(settings.run_as, RunAs::Sudo);
        assert_eq!(settings.jobs, 4);
        assert_eq!(settings.retry.max_attempts, 3);
        assert_eq!(settings.retry.base_delay_secs, 5);
        assert_eq!(
            settings.declarations_path().unwrap(),
            PathBuf::from("/etc/wasctl/providers.toml")
        );
    }

    #[test]
    fn test_unknown_setting_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, "job = 2\n").unwrap();

        let err = Settings::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("job"));
    }

    #[test]
    fn test_invalid_run_as_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, "run_as = \"always\"\n").unwrap();

        assert!(Settings::load(&path).is_err());
    }

    #[test]
    fn test_retry_attempts_floor() {
        let retry = RetrySettings {
            max_attempts: 0,
            ..RetrySettings::default()
        };
        assert_eq!(retry.to_config().max_attempts, 1);
    }

    #[test]
    fn test_negative_backoff_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, "[retry]\nmax_attempts = 3\nbackoff_factor = -2.0\n").unwrap();

        let err = Settings::load(&path).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("Invalid settings"));
        assert!(message.contains("backoff_factor"));
    }

    #[test]
    fn test_retry_validation() {
        assert!(RetrySettings::default().validate().is_ok());

        let shrinking = RetrySettings {
            backoff_factor: 0.5,
            ..RetrySettings::default()
        };
        assert!(shrinking.validate().is_err());

        let nan = RetrySettings {
            backoff_factor: f64::NAN,
            ..RetrySettings::default()
        };
        assert!(nan.validate().is_err());

        let endless = RetrySettings {
            max_delay_secs: u64::MAX,
            ..RetrySettings::default()
        };
        assert!(endless.validate().is_err());

        let inverted = RetrySettings {
            base_delay_secs: 300,
            max_delay_secs: 60,
            ..RetrySettings::default()
        };
        assert!(inverted.validate().is_err());
    }
}
