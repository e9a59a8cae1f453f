//! Transaction support for table mappers
//!
//! A [`MapperTransaction`] is a connection handle mappers can be rebound to
//! with [`TableMapper::for_transaction`](crate::TableMapper::for_transaction),
//! so several mapper operations run atomically.

use crate::errors::MapperError;
use crate::executor::{bind_row_statement, bind_statement, QueryExecutor};
use crate::Row;
use async_trait::async_trait;
use sql_builder::{debug_log, BoundQuery};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};
use std::sync::Arc;
use tokio::sync::Mutex;

/// A shared, cloneable handle on an open database transaction
///
/// # Example
/// ```ignore
/// let tx = MapperTransaction::begin(&pool).await?;
///
/// let users = user_mapper.for_transaction(tx.clone());
/// let audit = audit_mapper.for_transaction(tx.clone());
/// users.update(json!(1))?.run(&changes).await?;
/// audit.insert().run(&[entry]).await?;
///
/// tx.commit().await?;
/// ```
#[derive(Clone)]
pub struct MapperTransaction {
    tx: Arc<Mutex<Option<Transaction<'static, Postgres>>>>,
}

impl std::fmt::Debug for MapperTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapperTransaction").finish_non_exhaustive()
    }
}

impl MapperTransaction {
    /// Begin a new database transaction
    pub async fn begin(pool: &PgPool) -> Result<Self, MapperError> {
        let tx = pool.begin().await?;
        debug_log!("[TRANSACTION] begin");
        Ok(Self::new(tx))
    }

    pub fn new(tx: Transaction<'static, Postgres>) -> Self {
        Self {
            tx: Arc::new(Mutex::new(Some(tx))),
        }
    }

    /// Commit the transaction
    pub async fn commit(&self) -> Result<(), MapperError> {
        let tx = self
            .tx
            .lock()
            .await
            .take()
            .ok_or(MapperError::TransactionClosed)?;
        tx.commit().await?;
        debug_log!("[TRANSACTION] commit");
        Ok(())
    }

    /// Rollback the transaction
    pub async fn rollback(&self) -> Result<(), MapperError> {
        let tx = self
            .tx
            .lock()
            .await
            .take()
            .ok_or(MapperError::TransactionClosed)?;
        tx.rollback().await?;
        debug_log!("[TRANSACTION] rollback");
        Ok(())
    }

    /// False once committed or rolled back
    pub async fn is_open(&self) -> bool {
        self.tx.lock().await.is_some()
    }
}

#[async_trait]
impl QueryExecutor for MapperTransaction {
    async fn fetch_rows(&self, query: &BoundQuery) -> Result<Vec<Row>, MapperError> {
        let mut guard = self.tx.lock().await;
        let tx = guard.as_mut().ok_or(MapperError::TransactionClosed)?;

        debug_log!("[FETCH][TX] SQL: {}", query.sql());
        let rows = bind_row_statement(query)
            .fetch_all(&mut **tx)
            .await?;
        Ok(rows.into_iter().map(|Json(row)| row).collect())
    }

    async fn execute(&self, query: &BoundQuery) -> Result<u64, MapperError> {
        let mut guard = self.tx.lock().await;
        let tx = guard.as_mut().ok_or(MapperError::TransactionClosed)?;

        debug_log!("[EXECUTE][TX] SQL: {}", query.sql());
        let result = bind_statement(query)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }
}
