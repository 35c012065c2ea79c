//! Store interface definitions
//!
//! These traits are the seams to the surrounding persistence and identity
//! layers. The schema engine and the read composition only ever talk to
//! these contracts; in-memory reference implementations live in
//! `store::memory`.

use crate::perm::{PermissionAction, Principal};
use crate::schema::{Column, Table};
use crate::store::error::StoreResult;
use crate::types::{ColumnId, DatabaseId, EntryId, FieldValue, TableId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// An entry's document: column internal name -> typed value
pub type Document = BTreeMap<String, FieldValue>;

/// A stored row of a table
///
/// Belongs to exactly one table and holds a string-keyed document whose
/// valid keys are dictated by the table's column schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Unique entry identifier
    pub entry_id: EntryId,
    /// Owning table
    pub table_id: TableId,
    /// Column internal name -> value mapping
    pub document: Document,
}

/// Lightweight user representation nested into read shapes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    /// User identifier
    pub id: UserId,
    /// Login name
    pub username: String,
}

/// Lightweight database representation nested into read shapes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSummary {
    /// Database identifier
    pub id: DatabaseId,
    /// Database name
    pub name: String,
    /// URL slug
    pub slug: String,
}

/// Table persistence contract
///
/// Enforces the (name, database) uniqueness constraint on both create
/// and update.
pub trait TableStore: Send + Sync {
    /// Persist a new table, allocating and returning its id
    fn create(&self, table: Table) -> StoreResult<Table>;

    /// Get a table by id
    fn get(&self, table_id: TableId) -> StoreResult<Table>;

    /// Find a table id by (database, name)
    fn find_by_name(&self, database_id: DatabaseId, name: &str) -> StoreResult<Option<TableId>>;

    /// Overwrite a stored table
    fn update(&self, table: &Table) -> StoreResult<()>;
}

/// Column persistence contract
pub trait ColumnStore: Send + Sync {
    /// Persist a new column, allocating and returning its id
    fn create(&self, column: Column) -> StoreResult<Column>;

    /// Get a column by id
    fn get(&self, column_id: ColumnId) -> StoreResult<Column>;

    /// List a table's columns ordered by ascending id
    fn list_for_table(&self, table_id: TableId) -> StoreResult<Vec<Column>>;

    /// Apply a reconciliation batch: upsert the given columns and delete
    /// the given ids, as one unit
    fn apply(&self, upserts: Vec<Column>, deletes: Vec<ColumnId>) -> StoreResult<Vec<Column>>;
}

/// Entry persistence contract
///
/// Entries are created and destroyed by external collaborators; the
/// schema engine only rewrites their documents during a cascade.
pub trait EntryStore: Send + Sync {
    /// Persist a new entry, allocating and returning its id
    fn create(&self, table_id: TableId, document: Document) -> StoreResult<Entry>;

    /// List a table's entries
    fn list_for_table(&self, table_id: TableId) -> StoreResult<Vec<Entry>>;

    /// Count a table's entries
    fn count_for_table(&self, table_id: TableId) -> StoreResult<u64>;

    /// Persist a mutated entry document
    fn save(&self, entry: &Entry) -> StoreResult<()>;

    /// Persist a batch of mutated entries as one unit
    fn save_all(&self, entries: &[Entry]) -> StoreResult<()>;
}

/// Permission persistence contract
pub trait PermissionStore: Send + Sync {
    /// Grant an action on a table to a principal
    fn assign(&self, action: PermissionAction, principal: Principal, table_id: TableId)
        -> StoreResult<()>;

    /// Collect every action the viewer holds on a table, directly or
    /// through group membership
    fn check_perms(&self, viewer: UserId, table_id: TableId)
        -> StoreResult<HashSet<PermissionAction>>;
}

/// Identity contract: resolves users and databases into summaries
pub trait DirectoryStore: Send + Sync {
    /// Resolve a user into its summary
    fn user(&self, user_id: UserId) -> StoreResult<UserSummary>;

    /// Resolve a database into its summary
    fn database(&self, database_id: DatabaseId) -> StoreResult<DatabaseSummary>;
}

/// URL construction contract for related resources
pub trait UrlBuilder: Send + Sync {
    /// Absolute link to a table's entries collection
    fn entries_url(&self, table_id: TableId) -> String;
}
