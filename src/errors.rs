//! Error types for the TableMap crate
//!
//! This module contains all error types that can be returned by TableMap operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TableMapError {
    #[error("Database connection error: {0}")]
    DatabaseConnection(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Mapper error: {0}")]
    Mapper(#[from] table_mapper::MapperError),
}
