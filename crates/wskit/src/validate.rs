//! Field validators
//!
//! Pure checks run once while a declaration is built. Each returns the value
//! unchanged when it is accepted.

use crate::error::ValidationError;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

static IDENTIFIER_RE: OnceLock<Regex> = OnceLock::new();

fn identifier_regex() -> &'static Regex {
    IDENTIFIER_RE.get_or_init(|| {
        Regex::new("^[-0-9A-Za-z._]+$")
            .unwrap_or_else(|error| panic!("identifier regex failed to compile: {error}"))
    })
}

/// Accept profile and account names: one or more of `[-0-9A-Za-z._]`.
pub fn identifier(field: &str, value: &str) -> Result<String, ValidationError> {
    if identifier_regex().is_match(value) {
        Ok(value.to_string())
    } else {
        Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            value: value.to_string(),
        })
    }
}

/// Accept absolute paths for the host platform.
///
/// Only absoluteness is checked; `..` segments and non-existent paths pass.
pub fn absolute_path(field: &str, value: &str) -> Result<String, ValidationError> {
    if Path::new(value).is_absolute() {
        Ok(value.to_string())
    } else {
        Err(ValidationError::InvalidPath {
            field: field.to_string(),
            value: value.to_string(),
        })
    }
}

/// Accept exactly one of `allowed` (case-sensitive).
pub fn one_of(field: &str, value: &str, allowed: &[&str]) -> Result<String, ValidationError> {
    if allowed.contains(&value) {
        Ok(value.to_string())
    } else {
        Err(ValidationError::InvalidEnum {
            field: field.to_string(),
            value: value.to_string(),
            expected: allowed.iter().map(|s| (*s).to_string()).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_accepts_charset() {
        for value in ["Dmgr01", "was-admin", "profile_1.bak", "-", "..", "A"] {
            assert_eq!(identifier("dmgr_profile", value).unwrap(), value);
        }
    }

    #[test]
    fn test_identifier_rejects_other_characters() {
        for value in ["", "Dmgr 01", "dmgr/01", "root;id", "dmgré", "a\n"] {
            let err = identifier("user", value).unwrap_err();
            assert!(
                matches!(err, ValidationError::InvalidFormat { ref field, .. } if field == "user"),
                "{value:?} gave {err:?}"
            );
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_absolute_path() {
        assert!(absolute_path("profile_base", "/opt/IBM/WebSphere/AppServer/profiles").is_ok());
        assert!(absolute_path("profile_base", "/opt/IBM/../IBM").is_ok());
        assert!(absolute_path("profile_base", "/").is_ok());
    }

    #[test]
    fn test_relative_path_rejected() {
        for value in ["opt/IBM", "./profiles", "", "~/profiles"] {
            assert!(matches!(
                absolute_path("profile_base", value),
                Err(ValidationError::InvalidPath { .. })
            ));
        }
    }

    #[test]
    fn test_one_of() {
        let allowed = ["present", "absent"];
        assert_eq!(one_of("ensure", "absent", &allowed).unwrap(), "absent");

        let err = one_of("ensure", "Present", &allowed).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid ensure 'Present', expected one of: present, absent"
        );
    }
}
