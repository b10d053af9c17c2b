//! Centralized path resolution for wasctl
//!
//! # Environment Variables
//!
//! - `WASCTL_CONFIG_DIR` - Override config directory (e.g., `/etc/wasctl`)
//! - `WASCTL_STATE_DIR` - Override state directory
//!
//! # Path Resolution Priority
//!
//! For config_dir():
//! 1. `WASCTL_CONFIG_DIR` environment variable
//! 2. `XDG_CONFIG_HOME/wasctl` (if set)
//! 3. Platform default: `~/.config/wasctl`
//!
//! For state_dir():
//! 1. `WASCTL_STATE_DIR` environment variable
//! 2. `XDG_STATE_HOME/wasctl` (if set)
//! 3. Platform default: `~/.local/state/wasctl`

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Environment variable for config directory override
pub const ENV_CONFIG_DIR: &str = "WASCTL_CONFIG_DIR";

/// Environment variable for state directory override
pub const ENV_STATE_DIR: &str = "WASCTL_STATE_DIR";

const APP: &str = "wasctl";

/// Get the wasctl config directory path
pub fn config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = expand(&dir);
        log::debug!(
            "Using config dir from {}: {}",
            ENV_CONFIG_DIR,
            path.display()
        );
        return Ok(path);
    }

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        let path = PathBuf::from(xdg_config).join(APP);
        log::debug!("Using XDG_CONFIG_HOME: {}", path.display());
        return Ok(path);
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    let path = home.join(".config").join(APP);
    log::debug!("Using default config dir: {}", path.display());
    Ok(path)
}

/// Get the wasctl state directory path
pub fn state_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_STATE_DIR) {
        let path = expand(&dir);
        log::debug!("Using state dir from {}: {}", ENV_STATE_DIR, path.display());
        return Ok(path);
    }

    if let Ok(xdg_state) = std::env::var("XDG_STATE_HOME") {
        let path = PathBuf::from(xdg_state).join(APP);
        log::debug!("Using XDG_STATE_HOME: {}", path.display());
        return Ok(path);
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    let path = home.join(".local").join("state").join(APP);
    log::debug!("Using default state dir: {}", path.display());
    Ok(path)
}

/// Expand ~ and environment variables in a path string.
///
/// Unknown variables are left as written.
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Tests in this module mutate process-wide env vars
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn with_env<F, R>(vars: &[(&str, Option<&str>)], f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let originals: Vec<_> = vars
            .iter()
            .map(|(key, _)| (*key, env::var(key).ok()))
            .collect();
        for (key, value) in vars {
            // SAFETY: serialized by ENV_LOCK; no other test reads these vars
            match value {
                Some(v) => unsafe { env::set_var(key, v) },
                None => unsafe { env::remove_var(key) },
            }
        }
        let result = f();
        for (key, original) in originals {
            // SAFETY: as above
            match original {
                Some(v) => unsafe { env::set_var(key, v) },
                None => unsafe { env::remove_var(key) },
            }
        }
        result
    }

    #[test]
    fn test_config_dir_env_override() {
        with_env(&[(ENV_CONFIG_DIR, Some("/etc/wasctl"))], || {
            assert_eq!(config_dir().unwrap(), PathBuf::from("/etc/wasctl"));
        });
    }

    #[test]
    fn test_config_dir_env_override_with_tilde() {
        let home = dirs::home_dir().unwrap();
        with_env(&[(ENV_CONFIG_DIR, Some("~/ops/wasctl"))], || {
            assert_eq!(config_dir().unwrap(), home.join("ops").join("wasctl"));
        });
    }

    #[test]
    fn test_xdg_config_home() {
        with_env(
            &[
                (ENV_CONFIG_DIR, None),
                ("XDG_CONFIG_HOME", Some("/tmp/xdg-config-test")),
            ],
            || {
                assert_eq!(
                    config_dir().unwrap(),
                    PathBuf::from("/tmp/xdg-config-test/wasctl")
                );
            },
        );
    }

    #[test]
    fn test_state_dir_env_override() {
        with_env(&[(ENV_STATE_DIR, Some("/var/lib/wasctl"))], || {
            assert_eq!(state_dir().unwrap(), PathBuf::from("/var/lib/wasctl"));
        });
    }

    #[cfg(unix)]
    #[test]
    fn test_default_state_dir_unix() {
        with_env(&[(ENV_STATE_DIR, None), ("XDG_STATE_HOME", None)], || {
            let home = dirs::home_dir().unwrap();
            assert_eq!(
                state_dir().unwrap(),
                home.join(".local").join("state").join("wasctl")
            );
        });
    }

    #[test]
    fn test_expand_absolute() {
        assert_eq!(
            expand("/opt/IBM/WebSphere"),
            PathBuf::from("/opt/IBM/WebSphere")
        );
    }

    #[test]
    fn test_expand_unknown_env_var_unchanged() {
        let result = expand("/path/$NONEXISTENT_WASCTL_VAR_12345/file");
        assert_eq!(
            result,
            PathBuf::from("/path/$NONEXISTENT_WASCTL_VAR_12345/file")
        );
    }
}
