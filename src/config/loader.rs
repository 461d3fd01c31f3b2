//! Configuration loading from the environment.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use thiserror::Error;

use crate::config::env::EnvSource;
use crate::config::schema::AcdcnConfig;
use crate::config::validation::{validate_vars, FieldError};

/// Where to generate a replacement service-account key.
pub const CREDENTIAL_HINT: &str =
    "https://console.firebase.google.com/project/_/settings/serviceaccounts/adminsdk";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// One or more fields failed coercion or a range check.
    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<FieldError>),

    /// The credential file does not exist.
    #[error("Firebase credential file not found at {}. Generate via: {}", .path.display(), CREDENTIAL_HINT)]
    CredentialMissing { path: PathBuf },

    /// The env override file could not be read or parsed.
    #[error("Env file {} could not be read: {reason}", .path.display())]
    EnvFile { path: PathBuf, reason: String },
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate a snapshot from a variable source, without caching.
pub fn load_config(source: &EnvSource) -> Result<AcdcnConfig, ConfigError> {
    let vars = source.collect()?;
    let config = validate_vars(&vars).map_err(ConfigError::Validation)?;

    if !config.credential_path.is_file() {
        tracing::error!(
            path = %config.credential_path.display(),
            "firebase_credential_missing"
        );
        return Err(ConfigError::CredentialMissing {
            path: config.credential_path,
        });
    }

    Ok(config)
}

/// Loads the configuration snapshot once and hands out the same `Arc` after.
#[derive(Debug)]
pub struct ConfigLoader {
    source: EnvSource,
    snapshot: OnceLock<Arc<AcdcnConfig>>,
    init_lock: Mutex<()>,
}

impl ConfigLoader {
    /// Create a loader over an explicit variable source.
    pub fn new(source: EnvSource) -> Self {
        Self {
            source,
            snapshot: OnceLock::new(),
            init_lock: Mutex::new(()),
        }
    }

    /// Process environment plus `./.env` when present.
    pub fn from_env() -> Self {
        Self::new(EnvSource::process())
    }

    /// Process environment layered over the given override file, which must exist.
    pub fn with_env_file(path: &Path) -> Self {
        Self::new(EnvSource::Process {
            env_file: Some(path.to_path_buf()),
            require_env_file: true,
        })
    }

    /// A fixed variable set; the process environment is ignored.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::new(EnvSource::Fixed(
            vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        ))
    }

    /// Get the configuration, loading it on first use.
    ///
    /// Later calls return the same snapshot without touching the environment.
    /// A failed load caches nothing.
    pub fn get_configuration(&self) -> Result<Arc<AcdcnConfig>, ConfigError> {
        if let Some(config) = self.snapshot.get() {
            return Ok(config.clone());
        }

        // Serialize first-time loaders; the loser of the race finds the
        // snapshot already set.
        let _guard = self.init_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(config) = self.snapshot.get() {
            return Ok(config.clone());
        }

        match load_config(&self.source) {
            Ok(config) => {
                tracing::info!(
                    database_name = %config.database_name,
                    synergy_threshold = config.synergy_threshold,
                    max_domain_connections = config.max_domain_connections,
                    api_host = %config.api_host,
                    api_port = config.api_port,
                    batch_size = config.batch_size,
                    max_retry_attempts = config.max_retry_attempts,
                    retry_base_delay_ms = config.retry_base_delay_ms,
                    retry_max_delay_ms = config.retry_max_delay_ms,
                    connect_timeout_secs = config.connect_timeout_secs,
                    operation_timeout_secs = config.operation_timeout_secs,
                    "configuration_loaded"
                );
                let config = Arc::new(config);
                Ok(self.snapshot.get_or_init(|| config).clone())
            }
            Err(e) => {
                tracing::error!(error = %e, "configuration_failed");
                Err(e)
            }
        }
    }

    /// The snapshot if it has already been loaded.
    pub fn loaded(&self) -> Option<Arc<AcdcnConfig>> {
        self.snapshot.get().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConfigError::CredentialMissing {
            path: PathBuf::from("/nope/key.json"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/nope/key.json"));
        assert!(msg.contains("serviceaccounts"));
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let loader = ConfigLoader::from_vars([(
            "ACDCN_FIREBASE_CREDENTIAL_PATH",
            "/definitely/not/here.json",
        )]);
        assert!(loader.get_configuration().is_err());
        assert!(loader.loaded().is_none());
        assert!(loader.get_configuration().is_err());
    }
}
