use sql_builder::{BuildError, ValidationError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MapperError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("column '{column}' missing from values object")]
    MissingColumn { column: String },

    #[error("parameter '{name}' missing from parameters object")]
    MissingParameter { name: String },

    #[error("Transform error: {0}")]
    Transform(String),

    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error("Transaction has already been committed or rolled back")]
    TransactionClosed,
}

impl From<ValidationError> for MapperError {
    fn from(error: ValidationError) -> Self {
        MapperError::Build(BuildError::Validation(error))
    }
}

impl MapperError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        MapperError::Configuration(message.into())
    }

    pub(crate) fn missing_column(column: &str) -> Self {
        MapperError::MissingColumn {
            column: column.to_string(),
        }
    }
}
