//! Store error definitions

use crate::types::{ColumnId, DatabaseId, EntryId, TableId, UserId};
use std::error::Error;
use std::fmt;

/// Store error types
///
/// Represents all possible errors that can occur in the collaborator
/// stores backing tables, columns, entries, permissions, and identities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Table id does not exist
    TableNotFound(TableId),
    /// Column id does not exist
    ColumnNotFound(ColumnId),
    /// Entry id does not exist
    EntryNotFound(EntryId),
    /// Database id does not exist
    DatabaseNotFound(DatabaseId),
    /// User id does not exist
    UserNotFound(UserId),
    /// (name, database) pair is already taken
    DuplicateTableName {
        /// Conflicting table name
        name: String,
        /// Database the name is taken in
        database_id: DatabaseId,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::TableNotFound(id) => write!(f, "Table not found: {}", id),
            StoreError::ColumnNotFound(id) => write!(f, "Column not found: {}", id),
            StoreError::EntryNotFound(id) => write!(f, "Entry not found: {}", id),
            StoreError::DatabaseNotFound(id) => write!(f, "Database not found: {}", id),
            StoreError::UserNotFound(id) => write!(f, "User not found: {}", id),
            StoreError::DuplicateTableName { name, database_id } => {
                write!(
                    f,
                    "Table name already used in database {}: {}",
                    database_id, name
                )
            }
        }
    }
}

impl Error for StoreError {}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
