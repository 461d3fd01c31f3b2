//! Environment variable sources.
//!
//! # Responsibilities
//! - Collect `ACDCN_*` variables from the process environment
//! - Merge the optional `.env` override file underneath them
//! - Fold names to upper case so matching is case-insensitive

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::config::loader::ConfigError;
use crate::config::schema::ENV_PREFIX;

/// Name of the override file looked up in the working directory.
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Where configuration variables come from.
#[derive(Debug, Clone)]
pub enum EnvSource {
    /// The process environment, layered over an optional `.env` file.
    Process {
        /// Override file path.
        env_file: Option<PathBuf>,
        /// Whether a missing override file is an error.
        require_env_file: bool,
    },
    /// A fixed set of variables. The process environment is not consulted.
    Fixed(Vec<(String, String)>),
}

impl EnvSource {
    /// Process environment plus `./.env` when it exists.
    pub fn process() -> Self {
        EnvSource::Process {
            env_file: Some(PathBuf::from(DEFAULT_ENV_FILE)),
            require_env_file: false,
        }
    }

    /// Read every prefixed variable, with the process environment taking
    /// precedence over the override file.
    pub fn collect(&self) -> Result<EnvVars, ConfigError> {
        let mut vars = EnvVars::default();

        match self {
            EnvSource::Process {
                env_file,
                require_env_file,
            } => {
                if let Some(path) = env_file {
                    for (key, value) in read_env_file(path, *require_env_file)? {
                        vars.insert(&key, value);
                    }
                }
                for (key, value) in std::env::vars_os() {
                    // Non-unicode entries cannot name one of our variables.
                    if let (Ok(key), Ok(value)) = (key.into_string(), value.into_string()) {
                        vars.insert(&key, value);
                    }
                }
            }
            EnvSource::Fixed(pairs) => {
                for (key, value) in pairs {
                    vars.insert(key, value.clone());
                }
            }
        }

        Ok(vars)
    }
}

/// Prefixed variables keyed by their upper-cased name.
#[derive(Debug, Clone, Default)]
pub struct EnvVars {
    inner: HashMap<String, String>,
}

impl EnvVars {
    /// Insert a variable if it carries the prefix. Later inserts win.
    fn insert(&mut self, key: &str, value: String) {
        let key = key.to_ascii_uppercase();
        if key.starts_with(ENV_PREFIX) {
            self.inner.insert(key, value);
        }
    }

    /// Look up a variable by its full upper-case name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

fn read_env_file(path: &Path, required: bool) -> Result<Vec<(String, String)>, ConfigError> {
    let iter = match dotenvy::from_path_iter(path) {
        Ok(iter) => iter,
        Err(e) if e.not_found() && !required => {
            tracing::debug!(path = %path.display(), "No env override file, skipping");
            return Ok(Vec::new());
        }
        Err(e) => {
            return Err(ConfigError::EnvFile {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
        }
    };

    let mut pairs = Vec::new();
    for item in iter {
        let (key, value) = item.map_err(|e| ConfigError::EnvFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        pairs.push((key, value));
    }

    tracing::debug!(path = %path.display(), entries = pairs.len(), "Env override file read");
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn fixed(pairs: &[(&str, &str)]) -> EnvSource {
        EnvSource::Fixed(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_prefix_is_case_insensitive() {
        let vars = fixed(&[("acdcn_api_port", "9090"), ("Acdcn_Batch_Size", "10")])
            .collect()
            .unwrap();
        assert_eq!(vars.get("ACDCN_API_PORT"), Some("9090"));
        assert_eq!(vars.get("ACDCN_BATCH_SIZE"), Some("10"));
    }

    #[test]
    fn test_unprefixed_variables_are_dropped() {
        let vars = fixed(&[("PATH", "/usr/bin"), ("API_PORT", "1"), ("ACDCN_API_HOST", "h")])
            .collect()
            .unwrap();
        assert_eq!(vars.len(), 1);
        assert_eq!(vars.get("API_PORT"), None);
    }

    #[test]
    fn test_env_file_is_read() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# local overrides").unwrap();
        writeln!(file, "ACDCN_TEST_ENV_FILE_ONLY=from-file").unwrap();
        writeln!(file, "UNRELATED=ignored").unwrap();

        let source = EnvSource::Process {
            env_file: Some(file.path().to_path_buf()),
            require_env_file: true,
        };
        let vars = source.collect().unwrap();
        assert_eq!(vars.get("ACDCN_TEST_ENV_FILE_ONLY"), Some("from-file"));
        assert_eq!(vars.get("UNRELATED"), None);
    }

    #[test]
    fn test_missing_optional_env_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let source = EnvSource::Process {
            env_file: Some(dir.path().join("absent.env")),
            require_env_file: false,
        };
        assert!(source.collect().is_ok());
    }

    #[test]
    fn test_missing_required_env_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let source = EnvSource::Process {
            env_file: Some(dir.path().join("absent.env")),
            require_env_file: true,
        };
        let err = source.collect().unwrap_err();
        assert!(matches!(err, ConfigError::EnvFile { .. }));
    }
}
