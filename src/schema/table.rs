//! Table structure for storing table metadata

use crate::types::{current_timestamp, ColumnId, DatabaseId, TableId, Timestamp, UserId};
use serde::{Deserialize, Serialize};

/// Table metadata structure
///
/// Stores basic metadata for a user-defined table including:
/// - table_id: Unique identifier for the table
/// - name: Human-readable name, unique within its database
/// - database_id: Owning database
/// - owner / last_edit_user: Ownership and edit tracking
/// - default_fields: Ordered references into the table's own columns
/// - filters: Opaque blob, stored but never interpreted here
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Unique table identifier
    pub table_id: TableId,
    /// Table name
    pub name: String,
    /// Owning database
    pub database_id: DatabaseId,
    /// Owning user
    pub owner: UserId,
    /// Last user to edit the schema
    pub last_edit_user: UserId,
    /// Last schema edit time
    pub last_edit_date: Timestamp,
    /// Creation time
    pub created_at: Timestamp,
    /// Active flag
    pub active: bool,
    /// Opaque filter blob
    pub filters: serde_json::Value,
    /// Ordered default-field column references
    pub default_fields: Vec<ColumnId>,
}

impl Table {
    /// Create a new table with basic fields
    pub fn new(table_id: TableId, name: String, database_id: DatabaseId, owner: UserId) -> Self {
        let now = current_timestamp();
        Self {
            table_id,
            name,
            database_id,
            owner,
            last_edit_user: owner,
            last_edit_date: now,
            created_at: now,
            active: true,
            filters: serde_json::Value::Null,
            default_fields: Vec::new(),
        }
    }

    /// Get table ID
    pub fn table_id(&self) -> TableId {
        self.table_id
    }

    /// Get table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get owning database ID
    pub fn database_id(&self) -> DatabaseId {
        self.database_id
    }

    /// Check whether the table is active
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Add a default-field reference if not already present
    ///
    /// Default fields only ever grow through patching; a full replacement
    /// never happens (monotonic union).
    pub fn add_default_field(&mut self, column_id: ColumnId) {
        if !self.default_fields.contains(&column_id) {
            self.default_fields.push(column_id);
        }
    }

    /// Drop default-field references to columns that no longer exist
    pub fn retain_default_fields(&mut self, exists: impl Fn(ColumnId) -> bool) {
        self.default_fields.retain(|id| exists(*id));
    }

    /// Stamp a schema edit
    pub fn touch(&mut self, editor: UserId) {
        self.last_edit_user = editor;
        self.last_edit_date = current_timestamp();
    }
}
