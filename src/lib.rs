//! # TableMap
//!
//! Typed table mappers for PostgreSQL. A mapper binds a table's key and
//! projection columns to a set of transform hooks, and runs select, insert,
//! update and delete queries through them. Queries compiled once can be
//! re-executed with new values and parameters without rebuilding their SQL.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tablemap::prelude::*;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig::new(
//!         "localhost".to_string(), 5432, "tablemap".to_string(),
//!         "postgres".to_string(), "password".to_string(),
//!         1, 5, 30, 600, 3600,
//!     );
//!     let tablemap = TableMap::new(config).await?;
//!
//!     let users = tablemap.mapper(
//!         TableBinding::builder("users")
//!             .key_columns(["id"])
//!             .build()?,
//!     );
//!
//!     let values = json!({"name": "Sue", "handle": "s1", "email": "a@b.com"});
//!     let returned = users
//!         .insert()
//!         .return_one(values.as_object().unwrap())
//!         .await?;
//!     println!("Inserted: {:?}", returned);
//!
//!     // Compile once, execute with different parameters
//!     let by_handle = users
//!         .select(MapperFilter::callback(|eb| eb.eq("handle", eb.param("handle"))))?
//!         .compile();
//!     for handle in ["s1", "s2"] {
//!         let params = json!({"handle": handle});
//!         let found = by_handle.return_one(params.as_object().unwrap()).await?;
//!         println!("{}: {:?}", handle, found);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod errors;
pub mod prelude;

// Re-export the main public types for convenience
pub use core::TableMap;
pub use errors::TableMapError;

// Re-export centralized config
pub use config::{AppConfig, DatabaseConfig};

// Re-export member crates
pub use config;
pub use sql_builder;
pub use table_mapper;

// Conditional logging macros shared by the workspace
pub use sql_builder::{debug_log, trace_log};

// Re-export external dependencies used in public API
pub use async_trait;
pub use sqlx;
