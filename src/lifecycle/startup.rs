//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Build the client manager on top of the snapshot
//! - Hand both to the rest of the process as one explicit context
//!
//! # Design Decisions
//! - Fail fast: configuration and credential errors are fatal
//! - The database client is still lazy; it connects on first `acquire`

use std::sync::Arc;

use thiserror::Error;

use crate::config::{AcdcnConfig, ConfigError, ConfigLoader};
use crate::database::{ClientError, ClientHandle, ClientManager, Connector};

/// Fatal startup failures.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("database client error: {0}")]
    Client(#[from] ClientError),
}

/// Process-wide state, built once at startup and passed by reference.
#[derive(Debug)]
pub struct AppContext {
    config: Arc<AcdcnConfig>,
    clients: ClientManager,
}

impl AppContext {
    /// Load the configuration and prepare the client manager.
    pub fn bootstrap(
        loader: &ConfigLoader,
        connector: Arc<dyn Connector>,
    ) -> Result<Self, StartupError> {
        let config = loader.get_configuration()?;
        Ok(Self::with_config(config, connector))
    }

    /// Build a context around an already validated snapshot.
    pub fn with_config(config: Arc<AcdcnConfig>, connector: Arc<dyn Connector>) -> Self {
        let clients = ClientManager::new(config.clone(), connector);
        Self { config, clients }
    }

    /// Bootstrap and connect immediately instead of on first use.
    pub async fn bootstrap_connected(
        loader: &ConfigLoader,
        connector: Arc<dyn Connector>,
    ) -> Result<Self, StartupError> {
        let context = Self::bootstrap(loader, connector)?;
        context.clients.acquire().await?;
        Ok(context)
    }

    pub fn config(&self) -> &Arc<AcdcnConfig> {
        &self.config
    }

    pub fn clients(&self) -> &ClientManager {
        &self.clients
    }

    /// Shorthand for `clients().acquire()`.
    pub async fn client(&self) -> Result<Arc<ClientHandle>, ClientError> {
        self.clients.acquire().await
    }
}
