//! Configuration schema definitions.
//!
//! This module defines the validated configuration snapshot for ACDCN and the
//! table of environment variables that feed it. The snapshot is only ever
//! constructed by [`crate::config::validation`] and
//! [`crate::config::loader`]; there is no way to observe a partially valid one.

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

/// Prefix shared by every recognised environment variable.
pub const ENV_PREFIX: &str = "ACDCN_";

/// Sentinel database name meaning "the project's default instance".
pub const DEFAULT_DATABASE_NAME: &str = "(default)";

pub const DEFAULT_CREDENTIAL_PATH: &str = "firebase-credentials.json";
pub const DEFAULT_SYNERGY_THRESHOLD: f64 = 0.75;
pub const DEFAULT_MAX_DOMAIN_CONNECTIONS: u32 = 50;
pub const DEFAULT_API_HOST: &str = "0.0.0.0";
pub const DEFAULT_API_PORT: u16 = 8000;
pub const DEFAULT_BATCH_SIZE: usize = 100;
pub const DEFAULT_MAX_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 100;
pub const DEFAULT_RETRY_MAX_DELAY_MS: u64 = 2000;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_OPERATION_TIMEOUT_SECS: u64 = 30;

/// Validated, immutable configuration snapshot.
///
/// Shared as `Arc<AcdcnConfig>` once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct AcdcnConfig {
    /// Path to the service-account credential file. Sensitive: never logged.
    pub credential_path: PathBuf,

    /// Document database instance name.
    pub database_name: String,

    /// Minimum synergy score for collaboration consideration, in [0, 1].
    pub synergy_threshold: f64,

    /// Maximum connections per domain in the knowledge graph.
    pub max_domain_connections: u32,

    /// API binding host.
    pub api_host: String,

    /// API binding port, strictly between 1024 and 65536.
    pub api_port: u16,

    /// Maximum number of writes committed in one batch.
    pub batch_size: usize,

    /// Total attempts allowed for a transient failure (first try included).
    pub max_retry_attempts: u32,

    /// Base delay for retry backoff in milliseconds.
    pub retry_base_delay_ms: u64,

    /// Cap on retry backoff in milliseconds.
    pub retry_max_delay_ms: u64,

    /// Deadline for a single connection attempt, in seconds.
    pub connect_timeout_secs: u64,

    /// Deadline for a single operation attempt, in seconds.
    pub operation_timeout_secs: u64,
}

impl Default for AcdcnConfig {
    fn default() -> Self {
        Self {
            credential_path: PathBuf::from(DEFAULT_CREDENTIAL_PATH),
            database_name: DEFAULT_DATABASE_NAME.to_string(),
            synergy_threshold: DEFAULT_SYNERGY_THRESHOLD,
            max_domain_connections: DEFAULT_MAX_DOMAIN_CONNECTIONS,
            api_host: DEFAULT_API_HOST.to_string(),
            api_port: DEFAULT_API_PORT,
            batch_size: DEFAULT_BATCH_SIZE,
            max_retry_attempts: DEFAULT_MAX_RETRY_ATTEMPTS,
            retry_base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
            retry_max_delay_ms: DEFAULT_RETRY_MAX_DELAY_MS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            operation_timeout_secs: DEFAULT_OPERATION_TIMEOUT_SECS,
        }
    }
}

impl AcdcnConfig {
    /// View of the snapshot that is safe to log or print.
    pub fn redacted(&self) -> RedactedConfig<'_> {
        RedactedConfig {
            database_name: &self.database_name,
            synergy_threshold: self.synergy_threshold,
            max_domain_connections: self.max_domain_connections,
            api_host: &self.api_host,
            api_port: self.api_port,
            batch_size: self.batch_size,
            max_retry_attempts: self.max_retry_attempts,
            retry_base_delay_ms: self.retry_base_delay_ms,
            retry_max_delay_ms: self.retry_max_delay_ms,
            connect_timeout_secs: self.connect_timeout_secs,
            operation_timeout_secs: self.operation_timeout_secs,
        }
    }

    /// API bind address as `host:port`.
    pub fn api_bind_address(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_secs)
    }
}

/// Every field of [`AcdcnConfig`] except the credential path.
#[derive(Debug, Clone, Serialize)]
pub struct RedactedConfig<'a> {
    pub database_name: &'a str,
    pub synergy_threshold: f64,
    pub max_domain_connections: u32,
    pub api_host: &'a str,
    pub api_port: u16,
    pub batch_size: usize,
    pub max_retry_attempts: u32,
    pub retry_base_delay_ms: u64,
    pub retry_max_delay_ms: u64,
    pub connect_timeout_secs: u64,
    pub operation_timeout_secs: u64,
}

/// A recognised environment variable.
#[derive(Debug, Clone, Copy)]
pub struct EnvVar {
    /// Full variable name, prefix included.
    pub name: &'static str,
    /// Default used when unset, as it would be written in the environment.
    pub default: &'static str,
    pub description: &'static str,
}

pub const CREDENTIAL_PATH_VAR: &str = "ACDCN_FIREBASE_CREDENTIAL_PATH";
pub const DATABASE_NAME_VAR: &str = "ACDCN_FIRESTORE_DATABASE_NAME";
pub const SYNERGY_THRESHOLD_VAR: &str = "ACDCN_KG_SYNERGY_THRESHOLD";
pub const MAX_DOMAIN_CONNECTIONS_VAR: &str = "ACDCN_MAX_DOMAIN_CONNECTIONS";
pub const API_HOST_VAR: &str = "ACDCN_API_HOST";
pub const API_PORT_VAR: &str = "ACDCN_API_PORT";
pub const BATCH_SIZE_VAR: &str = "ACDCN_BATCH_SIZE";
pub const MAX_RETRY_ATTEMPTS_VAR: &str = "ACDCN_MAX_RETRY_ATTEMPTS";
pub const RETRY_BASE_DELAY_MS_VAR: &str = "ACDCN_RETRY_BASE_DELAY_MS";
pub const RETRY_MAX_DELAY_MS_VAR: &str = "ACDCN_RETRY_MAX_DELAY_MS";
pub const CONNECT_TIMEOUT_SECS_VAR: &str = "ACDCN_CONNECT_TIMEOUT_SECS";
pub const OPERATION_TIMEOUT_SECS_VAR: &str = "ACDCN_OPERATION_TIMEOUT_SECS";

/// All recognised variables, in snapshot field order.
pub const VARIABLES: &[EnvVar] = &[
    EnvVar {
        name: CREDENTIAL_PATH_VAR,
        default: DEFAULT_CREDENTIAL_PATH,
        description: "Path to the Firebase service account credentials",
    },
    EnvVar {
        name: DATABASE_NAME_VAR,
        default: DEFAULT_DATABASE_NAME,
        description: "Firestore database instance name",
    },
    EnvVar {
        name: SYNERGY_THRESHOLD_VAR,
        default: "0.75",
        description: "Minimum synergy score for collaboration consideration (0.0-1.0)",
    },
    EnvVar {
        name: MAX_DOMAIN_CONNECTIONS_VAR,
        default: "50",
        description: "Maximum connections per domain",
    },
    EnvVar {
        name: API_HOST_VAR,
        default: DEFAULT_API_HOST,
        description: "API binding host",
    },
    EnvVar {
        name: API_PORT_VAR,
        default: "8000",
        description: "API port (1025-65535)",
    },
    EnvVar {
        name: BATCH_SIZE_VAR,
        default: "100",
        description: "Maximum writes per Firestore batch",
    },
    EnvVar {
        name: MAX_RETRY_ATTEMPTS_VAR,
        default: "3",
        description: "Maximum attempts for transient failures",
    },
    EnvVar {
        name: RETRY_BASE_DELAY_MS_VAR,
        default: "100",
        description: "Base retry backoff in milliseconds (0 disables backoff)",
    },
    EnvVar {
        name: RETRY_MAX_DELAY_MS_VAR,
        default: "2000",
        description: "Retry backoff cap in milliseconds",
    },
    EnvVar {
        name: CONNECT_TIMEOUT_SECS_VAR,
        default: "10",
        description: "Deadline for one connection attempt in seconds",
    },
    EnvVar {
        name: OPERATION_TIMEOUT_SECS_VAR,
        default: "30",
        description: "Deadline for one database operation attempt in seconds",
    },
];
