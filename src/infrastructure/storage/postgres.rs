//! PostgreSQL store implementation with connection pooling

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::info;

use crate::domain::storage::{EntityKey, Kind, Store, StoreQuery};
use crate::domain::DomainError;

/// PostgreSQL connection pool settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PostgresConfig {
    /// Database connection URL
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Pool acquire timeout in seconds
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/rolebinding_store".to_string(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_secs: 30,
            idle_timeout_secs: 600,
        }
    }
}

impl PostgresConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Pool options derived from these settings
    pub fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(Duration::from_secs(self.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(self.idle_timeout_secs))
    }
}

/// PostgreSQL store
///
/// Stores every kind in one table keyed by `(kind, project, name)`, with the
/// document in a JSONB column. Global kinds use an empty project.
pub struct PostgresStore {
    pool: PgPool,
    table_name: String,
}

impl Debug for PostgresStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresStore")
            .field("table_name", &self.table_name)
            .finish()
    }
}

impl PostgresStore {
    /// Creates a new store over an existing pool
    pub fn new(pool: PgPool, table_name: impl Into<String>) -> Self {
        Self {
            pool,
            table_name: table_name.into(),
        }
    }

    /// Creates a new store with its own connection pool
    pub async fn connect(
        config: &PostgresConfig,
        table_name: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let pool = config
            .pool_options()
            .connect(&config.url)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to connect to PostgreSQL: {}", e)))?;

        Ok(Self::new(pool, table_name))
    }

    /// Ensures the document table exists
    pub async fn ensure_table(&self) -> Result<(), DomainError> {
        let query = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                kind VARCHAR(64) NOT NULL,
                project VARCHAR(255) NOT NULL DEFAULT '',
                name VARCHAR(255) NOT NULL,
                data JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                PRIMARY KEY (kind, project, name)
            )
            "#,
            self.table_name
        );

        sqlx::query(&query)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to create table: {}", e)))?;

        info!(table = %self.table_name, "Document table ready");
        Ok(())
    }

    /// Runs `SELECT {select} ... WHERE <query filter>` and returns the `data` column of each row
    async fn select_matching(
        &self,
        select: &str,
        query: &dyn StoreQuery,
    ) -> Result<Vec<Vec<u8>>, DomainError> {
        query.validate()?;
        let (project, prefix) = filters(query);

        let sql = select_sql(select, &self.table_name);

        let rows = sqlx::query(&sql)
            .bind(query.kind().as_str())
            .bind(project)
            .bind(prefix)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to query entities: {}", e)))?;

        rows.iter().map(row_data).collect()
    }
}

/// Selects matching rows ordered byte-wise by `(project, name)`
fn select_sql(select: &str, table_name: &str) -> String {
    format!(
        r#"
        SELECT {} AS data FROM {}
        WHERE kind = $1
          AND ($2::TEXT IS NULL OR project = $2)
          AND ($3::TEXT IS NULL OR starts_with(name, $3))
        ORDER BY project COLLATE "C", name COLLATE "C"
        "#,
        select, table_name
    )
}

fn filters(query: &dyn StoreQuery) -> (Option<&str>, Option<&str>) {
    (
        query.project().filter(|p| !p.is_empty()),
        query.name_prefix().filter(|p| !p.is_empty()),
    )
}

fn project_column(key: &EntityKey) -> &str {
    key.project_name().unwrap_or("")
}

fn to_json(document: &[u8]) -> Result<Value, DomainError> {
    serde_json::from_slice(document)
        .map_err(|e| DomainError::storage(format!("Document is not valid JSON: {}", e)))
}

fn row_data(row: &PgRow) -> Result<Vec<u8>, DomainError> {
    let data: Value = row
        .try_get("data")
        .map_err(|e| DomainError::storage(format!("Failed to read document: {}", e)))?;

    serde_json::to_vec(&data)
        .map_err(|e| DomainError::storage(format!("Failed to serialize document: {}", e)))
}

#[async_trait]
impl Store for PostgresStore {
    async fn create(
        &self,
        kind: Kind,
        key: &EntityKey,
        document: Vec<u8>,
    ) -> Result<(), DomainError> {
        key.ensure_addresses(kind)?;
        let data = to_json(&document)?;

        let query = format!(
            r#"
            INSERT INTO {} (kind, project, name, data)
            VALUES ($1, $2, $3, $4)
            "#,
            self.table_name
        );

        sqlx::query(&query)
            .bind(kind.as_str())
            .bind(project_column(key))
            .bind(key.name())
            .bind(&data)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                let duplicate = e
                    .as_database_error()
                    .map(|db| db.is_unique_violation())
                    .unwrap_or(false);

                if duplicate {
                    DomainError::already_exists(format!("{} '{}' already exists", kind, key))
                } else {
                    DomainError::storage(format!("Failed to create entity: {}", e))
                }
            })?;

        Ok(())
    }

    async fn upsert(
        &self,
        kind: Kind,
        key: &EntityKey,
        document: Vec<u8>,
    ) -> Result<(), DomainError> {
        key.ensure_addresses(kind)?;
        let data = to_json(&document)?;

        let query = format!(
            r#"
            INSERT INTO {} (kind, project, name, data)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (kind, project, name)
            DO UPDATE SET data = EXCLUDED.data, updated_at = NOW()
            "#,
            self.table_name
        );

        sqlx::query(&query)
            .bind(kind.as_str())
            .bind(project_column(key))
            .bind(key.name())
            .bind(&data)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to upsert entity: {}", e)))?;

        Ok(())
    }

    async fn delete(&self, kind: Kind, key: &EntityKey) -> Result<(), DomainError> {
        let query = format!(
            "DELETE FROM {} WHERE kind = $1 AND project = $2 AND name = $3",
            self.table_name
        );

        let result = sqlx::query(&query)
            .bind(kind.as_str())
            .bind(project_column(key))
            .bind(key.name())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete entity: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!("{} '{}' not found", kind, key)));
        }

        Ok(())
    }

    async fn delete_by_query(&self, query: &dyn StoreQuery) -> Result<usize, DomainError> {
        query.validate()?;
        let (project, prefix) = filters(query);

        let sql = format!(
            r#"
            DELETE FROM {}
            WHERE kind = $1
              AND ($2::TEXT IS NULL OR project = $2)
              AND ($3::TEXT IS NULL OR starts_with(name, $3))
            "#,
            self.table_name
        );

        let result = sqlx::query(&sql)
            .bind(query.kind().as_str())
            .bind(project)
            .bind(prefix)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete entities: {}", e)))?;

        Ok(result.rows_affected() as usize)
    }

    async fn get_raw(&self, kind: Kind, key: &EntityKey) -> Result<Vec<u8>, DomainError> {
        let query = format!(
            "SELECT data FROM {} WHERE kind = $1 AND project = $2 AND name = $3",
            self.table_name
        );

        let row = sqlx::query(&query)
            .bind(kind.as_str())
            .bind(project_column(key))
            .bind(key.name())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get entity: {}", e)))?;

        match row {
            Some(row) => row_data(&row),
            None => Err(DomainError::not_found(format!("{} '{}' not found", kind, key))),
        }
    }

    async fn raw_query(&self, query: &dyn StoreQuery) -> Result<Vec<Vec<u8>>, DomainError> {
        self.select_matching("data", query).await
    }

    async fn raw_metadata_query(
        &self,
        query: &dyn StoreQuery,
        kind: Kind,
    ) -> Result<Vec<Vec<u8>>, DomainError> {
        if query.kind() != kind {
            return Err(DomainError::invalid_query(format!(
                "Query selects {} but metadata was requested for {}",
                query.kind(),
                kind
            )));
        }

        self.select_matching(
            "jsonb_build_object('kind', data->'kind', 'metadata', data->'metadata')",
            query,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_options_follow_config() {
        let config = PostgresConfig {
            max_connections: 20,
            min_connections: 5,
            connect_timeout_secs: 60,
            ..PostgresConfig::new("postgres://localhost/test")
        };

        let options = config.pool_options();
        assert_eq!(options.get_max_connections(), 20);
        assert_eq!(options.get_min_connections(), 5);
        assert_eq!(options.get_acquire_timeout(), Duration::from_secs(60));
        assert_eq!(options.get_idle_timeout(), Some(Duration::from_secs(600)));
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: PostgresConfig =
            serde_json::from_value(serde_json::json!({ "url": "postgres://db/perses" })).unwrap();

        assert_eq!(config.url, "postgres://db/perses");
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.idle_timeout_secs, 600);
    }

    #[test]
    fn test_select_orders_bytewise() {
        let sql = select_sql("data", "documents");

        assert!(sql.contains("FROM documents"));
        assert!(sql.contains(r#"ORDER BY project COLLATE "C", name COLLATE "C""#));
    }

    #[test]
    fn test_project_column_for_global_key() {
        let global = EntityKey::global("admin").unwrap();
        let scoped = EntityKey::project("perses", "admins").unwrap();

        assert_eq!(project_column(&global), "");
        assert_eq!(project_column(&scoped), "perses");
    }

    #[test]
    fn test_to_json_rejects_garbage() {
        assert!(to_json(b"{\"kind\":\"Role\"}").is_ok());
        assert!(matches!(
            to_json(b"not json").unwrap_err(),
            DomainError::Storage { .. }
        ));
    }
}
