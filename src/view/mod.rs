//! Read-side composition of a table's external representation
//!
//! Assembles everything a reader needs in one shape:
//! - Table attributes and the ordered column list
//! - Nested database, owner, and last-editor summaries
//! - A link to the entries collection and the entry count
//! - Resolved default-field names
//! - The viewer's single effective permission label

use crate::perm::PermissionResolver;
use crate::schema::{Column, Table};
use crate::store::error::StoreError;
use crate::store::interface::{
    ColumnStore, DatabaseSummary, DirectoryStore, EntryStore, TableStore, UrlBuilder, UserSummary,
};
use crate::types::{ColumnId, TableId, Timestamp, UserId};
use serde::Serialize;
use std::collections::HashSet;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// View error types
#[derive(Debug)]
pub enum ViewError {
    /// A referenced table, user, or database does not exist
    ReferenceNotFound(String),
    /// Error from a backing store
    StoreError(StoreError),
}

impl fmt::Display for ViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewError::ReferenceNotFound(what) => write!(f, "Reference not found: {}", what),
            ViewError::StoreError(err) => write!(f, "Store error: {}", err),
        }
    }
}

impl Error for ViewError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ViewError::StoreError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for ViewError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::TableNotFound(id) => {
                ViewError::ReferenceNotFound(format!("table {}", id))
            }
            StoreError::UserNotFound(id) => ViewError::ReferenceNotFound(format!("user {}", id)),
            StoreError::DatabaseNotFound(id) => {
                ViewError::ReferenceNotFound(format!("database {}", id))
            }
            other => ViewError::StoreError(other),
        }
    }
}

/// Result type for view composition
pub type ViewResult<T> = Result<T, ViewError>;

/// The composed external representation of a table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRead {
    /// Table identifier
    pub id: TableId,
    /// Table name
    pub name: String,
    /// Absolute link to the entries collection
    pub entries: String,
    /// Number of stored entries
    pub entries_count: u64,
    /// Owning database
    pub database: DatabaseSummary,
    /// Owning user
    pub owner: UserSummary,
    /// Last user to edit the schema
    pub last_edit_user: UserSummary,
    /// Last schema edit time
    pub last_edit_date: Timestamp,
    /// Creation time
    pub date_created: Timestamp,
    /// Active flag
    pub active: bool,
    /// Resolved default-field internal names
    pub default_fields: Vec<String>,
    /// Ordered column list
    pub fields: Vec<Column>,
    /// Opaque filter blob, passed through untouched
    pub filters: serde_json::Value,
    /// One-element list holding the viewer's effective label (or "")
    pub current_user_permissions: Vec<String>,
}

/// Resolve the default-field name list for a table
///
/// An explicit non-empty default-field set yields those columns' internal
/// names; an empty set yields all column names. Either way the order is
/// ascending column id, which is how the store lists columns.
pub fn resolve_default_fields(table: &Table, columns: &[Column]) -> Vec<String> {
    if table.default_fields.is_empty() {
        columns.iter().map(|c| c.name().to_string()).collect()
    } else {
        let chosen: HashSet<ColumnId> = table.default_fields.iter().copied().collect();
        columns
            .iter()
            .filter(|c| chosen.contains(&c.column_id()))
            .map(|c| c.name().to_string())
            .collect()
    }
}

/// Composes [`TableRead`] shapes from the collaborator stores
pub struct TableView {
    tables: Arc<dyn TableStore>,
    columns: Arc<dyn ColumnStore>,
    entries: Arc<dyn EntryStore>,
    directory: Arc<dyn DirectoryStore>,
    urls: Arc<dyn UrlBuilder>,
    resolver: PermissionResolver,
}

impl TableView {
    /// Create a view over the given stores
    pub fn new(
        tables: Arc<dyn TableStore>,
        columns: Arc<dyn ColumnStore>,
        entries: Arc<dyn EntryStore>,
        directory: Arc<dyn DirectoryStore>,
        urls: Arc<dyn UrlBuilder>,
        resolver: PermissionResolver,
    ) -> Self {
        Self {
            tables,
            columns,
            entries,
            directory,
            urls,
            resolver,
        }
    }

    /// Build the read representation of a table for a viewer
    pub fn compose(&self, table_id: TableId, viewer: Option<UserId>) -> ViewResult<TableRead> {
        let table = self.tables.get(table_id)?;
        let columns = self.columns.list_for_table(table_id)?;
        let entries_count = self.entries.count_for_table(table_id)?;

        let database = self.directory.database(table.database_id)?;
        let owner = self.directory.user(table.owner)?;
        let last_edit_user = self.directory.user(table.last_edit_user)?;

        let default_fields = resolve_default_fields(&table, &columns);
        let current_user_permissions = self.resolver.permission_labels(viewer, table_id)?;

        Ok(TableRead {
            id: table.table_id,
            name: table.name.clone(),
            entries: self.urls.entries_url(table_id),
            entries_count,
            database,
            owner,
            last_edit_user,
            last_edit_date: table.last_edit_date,
            date_created: table.created_at,
            active: table.active,
            default_fields,
            fields: columns,
            filters: table.filters,
            current_user_permissions,
        })
    }
}
