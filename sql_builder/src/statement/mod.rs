//! Statement builders
//!
//! One builder per statement kind. Builders are plain values: cloning one and
//! changing its RETURNING setting is how a caller obtains both variants of a
//! data-modifying statement.

pub mod delete;
pub mod insert;
pub mod select;
pub mod update;

pub use delete::DeleteQuery;
pub use insert::InsertQuery;
pub use select::SelectQuery;
pub use update::{UpdateOperation, UpdateQuery};

use crate::columns::Returning;
use crate::compiled::CompiledQuery;
use crate::errors::BuildError;

/// A builder that can be compiled into SQL text and parameters
pub trait Statement: Clone + Send + Sync {
    fn table(&self) -> &str;

    fn compile(&self) -> Result<CompiledQuery, BuildError>;
}

/// A data-modifying statement with a RETURNING clause
pub trait ReturningStatement: Statement {
    fn set_returning(&mut self, returning: Returning);

    fn with_returning(mut self, returning: Returning) -> Self
    where
        Self: Sized,
    {
        self.set_returning(returning);
        self
    }
}
