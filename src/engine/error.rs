//! Schema engine error definitions

use crate::store::error::StoreError;
use crate::types::{ColumnId, DatabaseId};
use std::error::Error;
use std::fmt;

/// Schema engine error types
///
/// Represents all possible errors during table create, full replace, and
/// partial patch. Guard errors (`ForbiddenTypeChange`,
/// `UniquenessViolation`, `DuplicateColumnName`) are raised before any
/// mutation is committed.
#[derive(Debug)]
pub enum SchemaEngineError {
    /// (name, database) pair already taken by another table
    UniquenessViolation {
        /// Conflicting table name
        name: String,
        /// Database the name is taken in
        database_id: DatabaseId,
    },
    /// field_type edited on a column of a table that has entries;
    /// carries the offending column id
    ForbiddenTypeChange(ColumnId),
    /// Two columns of one table would resolve to the same internal name
    DuplicateColumnName(String),
    /// A referenced table or column id does not exist
    ReferenceNotFound(String),
    /// Malformed submission
    InvalidArgument(String),
    /// Error from a backing store
    StoreError(StoreError),
}

impl fmt::Display for SchemaEngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaEngineError::UniquenessViolation { name, database_id } => {
                write!(
                    f,
                    "This table name is already being used in database {}: {}",
                    database_id, name
                )
            }
            SchemaEngineError::ForbiddenTypeChange(id) => {
                write!(
                    f,
                    "fields-{}: Changing field type is not permitted on a table with entries",
                    id
                )
            }
            SchemaEngineError::DuplicateColumnName(name) => {
                write!(f, "Column internal name already used: {}", name)
            }
            SchemaEngineError::ReferenceNotFound(what) => {
                write!(f, "Reference not found: {}", what)
            }
            SchemaEngineError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            SchemaEngineError::StoreError(err) => write!(f, "Store error: {}", err),
        }
    }
}

impl Error for SchemaEngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SchemaEngineError::StoreError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for SchemaEngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::TableNotFound(id) => {
                SchemaEngineError::ReferenceNotFound(format!("table {}", id))
            }
            StoreError::ColumnNotFound(id) => {
                SchemaEngineError::ReferenceNotFound(format!("column {}", id))
            }
            StoreError::DuplicateTableName { name, database_id } => {
                SchemaEngineError::UniquenessViolation { name, database_id }
            }
            other => SchemaEngineError::StoreError(other),
        }
    }
}

/// Result type for schema engine operations
pub type SchemaEngineResult<T> = Result<T, SchemaEngineError>;
