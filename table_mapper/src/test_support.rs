//! In-memory executor recording every statement it is asked to run

use crate::errors::MapperError;
use crate::executor::QueryExecutor;
use crate::Row;
use async_trait::async_trait;
use serde_json::Value;
use sql_builder::BoundQuery;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Recorded {
    statements: Vec<BoundQuery>,
    row_responses: VecDeque<Vec<Row>>,
    count_responses: VecDeque<u64>,
}

/// Answers fetches and executions from queued responses, defaulting to no
/// rows and a zero count
#[derive(Clone, Default)]
pub(crate) struct RecordingExecutor {
    recorded: Arc<Mutex<Recorded>>,
}

impl RecordingExecutor {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond_rows(&self, rows: Vec<Value>) {
        let rows = rows.into_iter().map(row).collect();
        self.recorded.lock().unwrap().row_responses.push_back(rows);
    }

    pub(crate) fn respond_count(&self, count: u64) {
        self.recorded.lock().unwrap().count_responses.push_back(count);
    }

    pub(crate) fn statements(&self) -> Vec<BoundQuery> {
        self.recorded.lock().unwrap().statements.clone()
    }

    pub(crate) fn last(&self) -> BoundQuery {
        self.statements()
            .pop()
            .expect("no statement was executed")
    }
}

#[async_trait]
impl QueryExecutor for RecordingExecutor {
    async fn fetch_rows(&self, query: &BoundQuery) -> Result<Vec<Row>, MapperError> {
        let mut recorded = self.recorded.lock().unwrap();
        recorded.statements.push(query.clone());
        Ok(recorded.row_responses.pop_front().unwrap_or_default())
    }

    async fn execute(&self, query: &BoundQuery) -> Result<u64, MapperError> {
        let mut recorded = self.recorded.lock().unwrap();
        recorded.statements.push(query.clone());
        Ok(recorded.count_responses.pop_front().unwrap_or(0))
    }
}

/// A JSON object literal as a row
pub(crate) fn row(value: Value) -> Row {
    match value {
        Value::Object(row) => row,
        other => panic!("expected a JSON object, got {}", other),
    }
}
