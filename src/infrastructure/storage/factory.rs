//! Store factory for runtime backend selection

use std::str::FromStr;
use std::sync::Arc;

use tracing::info;

use crate::domain::storage::Store;
use crate::domain::DomainError;

use super::in_memory::InMemoryStore;
use super::postgres::{PostgresConfig, PostgresStore};

/// Default table holding every stored document
pub const DEFAULT_TABLE_NAME: &str = "documents";

/// Supported storage backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageType {
    /// In-memory storage (for testing/development)
    InMemory,
    /// PostgreSQL storage
    Postgres,
}

impl FromStr for StorageType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" | "inmemory" | "in-memory" | "in_memory" => Ok(Self::InMemory),
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            other => Err(DomainError::configuration(format!(
                "Unknown storage backend '{}'",
                other
            ))),
        }
    }
}

/// Resolved backend selection
#[derive(Debug, Clone)]
pub enum StorageConfig {
    InMemory,
    Postgres(PostgresConfig),
}

impl StorageConfig {
    pub fn storage_type(&self) -> StorageType {
        match self {
            Self::InMemory => StorageType::InMemory,
            Self::Postgres(_) => StorageType::Postgres,
        }
    }
}

/// Factory for creating store instances
#[derive(Debug)]
pub struct StoreFactory;

impl StoreFactory {
    /// Creates a store based on the configuration
    ///
    /// PostgreSQL stores are connected and have their table created before
    /// they are returned.
    pub async fn create(
        config: &StorageConfig,
        table_name: &str,
    ) -> Result<Arc<dyn Store>, DomainError> {
        info!(backend = ?config.storage_type(), "Creating store");

        match config {
            StorageConfig::InMemory => Ok(Arc::new(InMemoryStore::new())),
            StorageConfig::Postgres(pg_config) => {
                let store = PostgresStore::connect(pg_config, table_name).await?;
                store.ensure_table().await?;
                Ok(Arc::new(store))
            }
        }
    }
}
