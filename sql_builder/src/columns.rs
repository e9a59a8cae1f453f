//! Column projections for SELECT lists and RETURNING clauses

use crate::errors::BuildError;
use crate::validation::validate_column_reference;
use crate::validation::validate_identifier;

/// A column in a projection, optionally renamed with `AS`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    pub column: String,
    pub alias: Option<String>,
}

impl ColumnRef {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            alias: None,
        }
    }

    pub fn aliased(column: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            alias: Some(alias.into()),
        }
    }

    /// Parse `"column"` or `"column as alias"` (case-insensitive `as`)
    pub fn parse(spec: &str) -> Result<Self, BuildError> {
        let parts: Vec<&str> = spec.split_whitespace().collect();
        let column_ref = match parts.as_slice() {
            [column] => Self::new(*column),
            [column, keyword, alias] if keyword.eq_ignore_ascii_case("as") => {
                Self::aliased(*column, *alias)
            }
            _ => return Err(BuildError::InvalidSelection(spec.to_string())),
        };
        column_ref.validate()?;
        Ok(column_ref)
    }

    /// Name of the column in the result row
    pub fn output_name(&self) -> &str {
        match &self.alias {
            Some(alias) => alias,
            None => self
                .column
                .rsplit('.')
                .next()
                .unwrap_or(self.column.as_str()),
        }
    }

    pub fn validate(&self) -> Result<(), BuildError> {
        validate_column_reference(&self.column)?;
        if let Some(alias) = &self.alias {
            validate_identifier(alias)?;
        }
        Ok(())
    }

    pub fn to_sql(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{} AS {}", self.column, alias),
            None => self.column.clone(),
        }
    }
}

/// SELECT list
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    All,
    Columns(Vec<ColumnRef>),
}

impl Selection {
    pub fn to_sql(&self) -> Result<String, BuildError> {
        match self {
            Selection::All => Ok("*".to_string()),
            Selection::Columns(columns) if columns.is_empty() => Ok("*".to_string()),
            Selection::Columns(columns) => {
                let mut parts = Vec::with_capacity(columns.len());
                for column in columns {
                    column.validate()?;
                    parts.push(column.to_sql());
                }
                Ok(parts.join(", "))
            }
        }
    }
}

/// RETURNING setting of a data-modifying statement
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Returning {
    #[default]
    Nothing,
    All,
    Columns(Vec<ColumnRef>),
}

impl Returning {
    /// Whether the statement produces rows
    pub fn returns_rows(&self) -> bool {
        match self {
            Returning::Nothing => false,
            Returning::All => true,
            Returning::Columns(columns) => !columns.is_empty(),
        }
    }

    /// `RETURNING ...` clause, empty when nothing is returned
    pub fn to_sql(&self) -> Result<String, BuildError> {
        match self {
            Returning::All => Ok("RETURNING *".to_string()),
            Returning::Columns(columns) if !columns.is_empty() => {
                let mut parts = Vec::with_capacity(columns.len());
                for column in columns {
                    column.validate()?;
                    parts.push(column.to_sql());
                }
                Ok(format!("RETURNING {}", parts.join(", ")))
            }
            _ => Ok(String::new()),
        }
    }
}
