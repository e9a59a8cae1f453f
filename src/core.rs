//! Core TableMap functionality
//!
//! This module contains the main TableMap struct: it owns the connection pool
//! and hands out mappers and transactions bound to it.

use sqlx::PgPool;
use std::time::Duration;
use table_mapper::{MappedObject, MapperTransaction, TableBinding, TableMapper, UniformTableMapper};

use crate::errors::TableMapError;
use config::{AppConfig, DatabaseConfig};
use sql_builder::debug_log;

/// Main TableMap coordinator that manages the database connection
#[derive(Debug, Clone)]
pub struct TableMap {
    pool: PgPool,
}

impl TableMap {
    /// Create new TableMap with database connection
    pub async fn new(config: DatabaseConfig) -> Result<Self, TableMapError> {
        config.validate()?;
        let connection_string = config.connection_string();

        let mut pool_options = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds));

        // Set max lifetime if specified
        if config.max_lifetime_seconds > 0 {
            pool_options =
                pool_options.max_lifetime(Duration::from_secs(config.max_lifetime_seconds));
        }

        debug_log!(
            "Connecting to {}:{}/{}",
            config.host,
            config.port,
            config.database
        );
        let pool = pool_options.connect(&connection_string).await?;

        Ok(Self { pool })
    }

    /// Create TableMap from the configuration file named by `TABLEMAP_CONFIG`
    /// or `./tablemap.toml`
    pub async fn from_config() -> Result<Self, TableMapError> {
        let config = AppConfig::load()?;
        Self::new(config.database).await
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get database pool reference
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Mapper for a table, running its queries on the pool
    pub fn mapper(&self, binding: TableBinding) -> TableMapper {
        TableMapper::new(self.pool.clone(), binding)
    }

    /// Uniform mapper for a table whose rows map to one object type
    pub fn uniform_mapper<M, F>(
        &self,
        binding: TableBinding,
        is_mapped_object: F,
    ) -> Result<UniformTableMapper<M>, TableMapError>
    where
        M: MappedObject,
        F: Fn(&serde_json::Value) -> bool + Send + Sync + 'static,
    {
        Ok(UniformTableMapper::new(
            self.pool.clone(),
            binding,
            is_mapped_object,
        )?)
    }

    /// Begin a transaction; rebind mappers to it with `for_transaction`
    pub async fn begin_transaction(&self) -> Result<MapperTransaction, TableMapError> {
        Ok(MapperTransaction::begin(&self.pool).await?)
    }

    /// Check database connection health
    pub async fn health_check(&self) -> Result<(), TableMapError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}
