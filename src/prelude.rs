//! Convenience re-exports for common TableMap usage
//!
//! This prelude module re-exports the most commonly used items from the TableMap workspace,
//! making it easier to import everything you need with a single use statement.
//!
//! # Example
//!
//! ```rust
//! use tablemap::prelude::*;
//!
//! // Now you have access to all the common TableMap types and traits
//! ```

// Core TableMap components
pub use crate::core::TableMap;
pub use crate::errors::TableMapError;

// Re-export centralized config
pub use config::{AppConfig, DatabaseConfig};

// Mapping layer
pub use table_mapper::prelude::*;
pub use table_mapper::{
    CompilingDeleteQuery, CompilingInsertQuery, CompilingSelectQuery, CompilingUpdateQuery,
    MappingDeleteQuery, MappingInsertQuery, MappingSelectQuery, MappingUpdateQuery,
};

// Statement builders, for `modify` closures
pub use sql_builder::{
    DeleteQuery, InsertQuery, Placeholder, SelectQuery, Statement, UpdateQuery,
};

// Common external dependencies
pub use anyhow;
pub use async_trait;
pub use sqlx;
pub use tokio;

// Commonly used sqlx types
pub use sqlx::{PgPool, Postgres, Transaction};
