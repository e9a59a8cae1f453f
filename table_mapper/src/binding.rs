//! Table bindings and column-set resolution
//!
//! A [`TableBinding`] is the immutable per-table configuration a mapper runs
//! with: the table name, its key columns and the column lists used for
//! selection and for the rows returned by inserts and updates. Columns whose
//! PostgreSQL type is not text-compatible (uuid, timestamptz, jsonb, enums)
//! should have their type declared so values are cast to it.

use crate::errors::MapperError;
use sql_builder::validation::validate_identifier;
use sql_builder::{ColumnRef, ColumnType, ColumnTypes, Returning, Selection};

/// Most key columns a binding may declare
pub const MAX_KEY_COLUMNS: usize = 4;

/// A column projection: every column, or an ordered list
///
/// List entries may carry an alias (`"name as handle"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSet {
    All,
    Columns(Vec<String>),
}

impl ColumnSet {
    pub fn list<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ColumnSet::Columns(columns.into_iter().map(Into::into).collect())
    }

    pub fn none() -> Self {
        ColumnSet::Columns(Vec::new())
    }

    /// True for an explicit empty list
    pub fn is_empty(&self) -> bool {
        matches!(self, ColumnSet::Columns(columns) if columns.is_empty())
    }

    fn column_refs(&self) -> Result<Vec<ColumnRef>, MapperError> {
        match self {
            ColumnSet::All => Ok(Vec::new()),
            ColumnSet::Columns(columns) => columns
                .iter()
                .map(|spec| ColumnRef::parse(spec).map_err(MapperError::from))
                .collect(),
        }
    }

    fn to_selection(&self) -> Result<Selection, MapperError> {
        match self {
            ColumnSet::All => Ok(Selection::All),
            ColumnSet::Columns(_) => Ok(Selection::Columns(self.column_refs()?)),
        }
    }

    fn to_returning(&self) -> Result<Returning, MapperError> {
        match self {
            ColumnSet::All => Ok(Returning::All),
            ColumnSet::Columns(columns) if columns.is_empty() => Ok(Returning::Nothing),
            ColumnSet::Columns(_) => Ok(Returning::Columns(self.column_refs()?)),
        }
    }
}

impl From<Vec<&str>> for ColumnSet {
    fn from(columns: Vec<&str>) -> Self {
        ColumnSet::list(columns)
    }
}

impl From<Vec<String>> for ColumnSet {
    fn from(columns: Vec<String>) -> Self {
        ColumnSet::Columns(columns)
    }
}

/// Declared return columns of an insert or update
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ReturnColumns {
    /// No list declared: return the key columns
    #[default]
    Keys,
    Set(ColumnSet),
}

impl ReturnColumns {
    pub fn resolve(&self, key_columns: &[String]) -> ColumnSet {
        match self {
            ReturnColumns::Keys => ColumnSet::Columns(key_columns.to_vec()),
            ReturnColumns::Set(set) => set.clone(),
        }
    }
}

impl From<ColumnSet> for ReturnColumns {
    fn from(set: ColumnSet) -> Self {
        ReturnColumns::Set(set)
    }
}

impl From<Vec<&str>> for ReturnColumns {
    fn from(columns: Vec<&str>) -> Self {
        ReturnColumns::Set(columns.into())
    }
}

impl From<Vec<String>> for ReturnColumns {
    fn from(columns: Vec<String>) -> Self {
        ReturnColumns::Set(columns.into())
    }
}

#[derive(Debug, Clone)]
pub struct TableBinding {
    table: String,
    columns: Option<Vec<String>>,
    key_columns: Vec<String>,
    selected_columns: ColumnSet,
    insert_return_columns: ColumnSet,
    update_return_columns: ColumnSet,
    column_types: ColumnTypes,
    selection: Selection,
    insert_returning: Returning,
    update_returning: Returning,
}

impl TableBinding {
    pub fn builder(table: impl Into<String>) -> TableBindingBuilder {
        TableBindingBuilder {
            table: table.into(),
            columns: None,
            key_columns: Vec::new(),
            selected_columns: ColumnSet::All,
            insert_return_columns: ReturnColumns::Keys,
            update_return_columns: ReturnColumns::Keys,
            column_types: ColumnTypes::new(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Full column list, when one was declared
    pub fn columns(&self) -> Option<&[String]> {
        self.columns.as_deref()
    }

    pub fn key_columns(&self) -> &[String] {
        &self.key_columns
    }

    pub fn selected_columns(&self) -> &ColumnSet {
        &self.selected_columns
    }

    pub fn insert_return_columns(&self) -> &ColumnSet {
        &self.insert_return_columns
    }

    pub fn update_return_columns(&self) -> &ColumnSet {
        &self.update_return_columns
    }

    /// Declared column types
    pub fn column_types(&self) -> &ColumnTypes {
        &self.column_types
    }

    pub(crate) fn selection(&self) -> &Selection {
        &self.selection
    }

    pub(crate) fn insert_returning(&self) -> &Returning {
        &self.insert_returning
    }

    pub(crate) fn update_returning(&self) -> &Returning {
        &self.update_returning
    }

    /// Key columns for a by-key operation; an empty key is a configuration error
    pub fn require_key_columns(&self) -> Result<&[String], MapperError> {
        if self.key_columns.is_empty() {
            return Err(MapperError::configuration(format!(
                "table '{}' declares no key columns for a by-key operation",
                self.table
            )));
        }
        Ok(&self.key_columns)
    }

    /// Check a column name against the declared column list, if any
    pub fn check_column(&self, column: &str) -> Result<(), MapperError> {
        match &self.columns {
            Some(columns) if !columns.iter().any(|c| c == column) => {
                Err(MapperError::configuration(format!(
                    "column '{}' is not a column of table '{}'",
                    column, self.table
                )))
            }
            _ => Ok(()),
        }
    }

    fn check_column_set(&self, set: &ColumnSet) -> Result<(), MapperError> {
        for column_ref in set.column_refs()? {
            self.check_column(&column_ref.column)?;
        }
        Ok(())
    }
}

pub struct TableBindingBuilder {
    table: String,
    columns: Option<Vec<String>>,
    key_columns: Vec<String>,
    selected_columns: ColumnSet,
    insert_return_columns: ReturnColumns,
    update_return_columns: ReturnColumns,
    column_types: ColumnTypes,
}

impl TableBindingBuilder {
    /// Declare every column of the table, enabling membership checks
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn key_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.key_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn selected_columns(mut self, columns: impl Into<ColumnSet>) -> Self {
        self.selected_columns = columns.into();
        self
    }

    pub fn insert_return_columns(mut self, columns: impl Into<ReturnColumns>) -> Self {
        self.insert_return_columns = columns.into();
        self
    }

    pub fn update_return_columns(mut self, columns: impl Into<ReturnColumns>) -> Self {
        self.update_return_columns = columns.into();
        self
    }

    /// Declare a column's PostgreSQL type
    pub fn column_type(mut self, column: impl Into<String>, column_type: ColumnType) -> Self {
        self.column_types = self.column_types.with(column, column_type);
        self
    }

    pub fn column_types(mut self, column_types: ColumnTypes) -> Self {
        self.column_types = column_types;
        self
    }

    pub fn build(self) -> Result<TableBinding, MapperError> {
        validate_identifier(&self.table)?;

        if self.key_columns.len() > MAX_KEY_COLUMNS {
            return Err(MapperError::configuration(format!(
                "table '{}' declares {} key columns, at most {} are supported",
                self.table,
                self.key_columns.len(),
                MAX_KEY_COLUMNS
            )));
        }

        if let Some(columns) = &self.columns {
            for column in columns {
                validate_identifier(column)?;
            }
        }
        for column in self
            .key_columns
            .iter()
            .chain(self.column_types.iter().map(|(column, _)| column))
        {
            validate_identifier(column)?;
        }

        let insert_return_columns = self.insert_return_columns.resolve(&self.key_columns);
        let update_return_columns = self.update_return_columns.resolve(&self.key_columns);

        let binding = TableBinding {
            selection: self.selected_columns.to_selection()?,
            insert_returning: insert_return_columns.to_returning()?,
            update_returning: update_return_columns.to_returning()?,
            table: self.table,
            columns: self.columns,
            key_columns: self.key_columns,
            selected_columns: self.selected_columns,
            insert_return_columns,
            update_return_columns,
            column_types: self.column_types,
        };

        for column in &binding.key_columns {
            binding.check_column(column)?;
        }
        for (column, _) in binding.column_types.iter() {
            binding.check_column(column)?;
        }
        binding.check_column_set(&binding.selected_columns)?;
        binding.check_column_set(&binding.insert_return_columns)?;
        binding.check_column_set(&binding.update_return_columns)?;

        Ok(binding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_return_columns_default_to_keys() {
        let binding = TableBinding::builder("users")
            .key_columns(["id"])
            .build()
            .unwrap();

        assert_eq!(binding.insert_return_columns(), &ColumnSet::list(["id"]));
        assert_eq!(
            binding.insert_returning(),
            &Returning::Columns(vec![ColumnRef::new("id")])
        );
        assert_eq!(binding.selection(), &Selection::All);
    }

    #[test]
    fn test_empty_return_list_returns_nothing() {
        let binding = TableBinding::builder("users")
            .key_columns(["id"])
            .insert_return_columns(ColumnSet::none())
            .update_return_columns(ColumnSet::All)
            .build()
            .unwrap();

        assert!(binding.insert_return_columns().is_empty());
        assert_eq!(binding.insert_returning(), &Returning::Nothing);
        assert_eq!(binding.update_returning(), &Returning::All);
    }

    #[test]
    fn test_aliased_selection() {
        let binding = TableBinding::builder("users")
            .selected_columns(vec!["id", "name as handle"])
            .build()
            .unwrap();

        assert_eq!(
            binding.selection(),
            &Selection::Columns(vec![
                ColumnRef::new("id"),
                ColumnRef::aliased("name", "handle")
            ])
        );
    }

    #[test]
    fn test_too_many_key_columns() {
        let result = TableBinding::builder("events")
            .key_columns(["a", "b", "c", "d", "e"])
            .build();
        assert!(matches!(result, Err(MapperError::Configuration(_))));
    }

    #[test]
    fn test_unknown_columns_rejected_when_declared() {
        let result = TableBinding::builder("users")
            .columns(["id", "handle", "name", "email"])
            .key_columns(["uid"])
            .build();
        assert!(matches!(result, Err(MapperError::Configuration(_))));

        let result = TableBinding::builder("users")
            .columns(["id", "handle", "name", "email"])
            .key_columns(["id"])
            .update_return_columns(vec!["id", "created_at"])
            .build();
        assert!(matches!(result, Err(MapperError::Configuration(_))));
    }

    #[test]
    fn test_invalid_identifiers_rejected() {
        let result = TableBinding::builder("users; DROP TABLE users").build();
        assert!(matches!(result, Err(MapperError::Build(_))));

        let result = TableBinding::builder("users")
            .selected_columns(vec!["name as"])
            .build();
        assert!(matches!(result, Err(MapperError::Build(_))));
    }

    #[test]
    fn test_declared_column_types() {
        let binding = TableBinding::builder("users")
            .columns(["id", "account_id", "settings"])
            .column_type("account_id", ColumnType::Uuid)
            .column_type("settings", ColumnType::Jsonb)
            .build()
            .unwrap();
        assert_eq!(
            binding.column_types().get("account_id"),
            Some(&ColumnType::Uuid)
        );
        assert_eq!(binding.column_types().get("id"), None);

        let result = TableBinding::builder("users")
            .columns(["id", "handle"])
            .column_type("created_at", ColumnType::Timestamptz)
            .build();
        assert!(matches!(result, Err(MapperError::Configuration(_))));

        let result = TableBinding::builder("users")
            .column_type("bad name", ColumnType::Text)
            .build();
        assert!(matches!(result, Err(MapperError::Build(_))));
    }

    #[test]
    fn test_require_key_columns() {
        let keyless = TableBinding::builder("log_lines").build().unwrap();
        assert!(matches!(
            keyless.require_key_columns(),
            Err(MapperError::Configuration(_))
        ));
    }
}
