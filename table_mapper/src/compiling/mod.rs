//! Compiling query variants
//!
//! A compiling query holds its statement builder uncompiled until the first
//! execution. That execution compiles the statement (once without and once
//! with return columns), caches the compiled plans and releases the builder.
//! Every later execution only resolves placeholders against the values and
//! parameters passed to it.

mod cache;
mod delete;
mod insert;
mod select;
mod update;

pub use delete::CompilingDeleteQuery;
pub use insert::CompilingInsertQuery;
pub use select::CompilingSelectQuery;
pub use update::CompilingUpdateQuery;

use crate::errors::MapperError;
use crate::Row;
use sql_builder::{BoundQuery, CompiledQuery, Placeholder, ReturningStatement, Returning, Statement};

/// Compiled forms of an insert, update or delete
#[derive(Debug)]
pub(crate) struct DmlPlans {
    pub(crate) plain: CompiledQuery,
    pub(crate) returning: Option<CompiledQuery>,
}

impl DmlPlans {
    pub(crate) fn compile<B: ReturningStatement>(
        builder: &B,
        returning: &Returning,
    ) -> Result<Self, MapperError> {
        let plain = builder.clone().with_returning(Returning::Nothing).compile()?;
        let returning = if returning.returns_rows() {
            Some(builder.clone().with_returning(returning.clone()).compile()?)
        } else {
            None
        };
        Ok(Self { plain, returning })
    }
}

/// Fill a compiled statement's placeholders: column placeholders from
/// `values`, named parameters from `params`
pub(crate) fn bind_placeholders(
    compiled: &CompiledQuery,
    params: &Row,
    values: &Row,
) -> Result<BoundQuery, MapperError> {
    compiled.resolve(|placeholder| match placeholder {
        Placeholder::Column(name) => values
            .get(name)
            .cloned()
            .ok_or_else(|| MapperError::missing_column(name)),
        Placeholder::Param(name) => {
            params
                .get(name)
                .cloned()
                .ok_or_else(|| MapperError::MissingParameter {
                    name: name.clone(),
                })
        }
    })
}

/// Pair each column with its own column placeholder
pub(crate) fn placeholder_row(columns: &[String]) -> Vec<(String, Placeholder)> {
    columns
        .iter()
        .map(|column| (column.clone(), Placeholder::column(column.as_str())))
        .collect()
}
