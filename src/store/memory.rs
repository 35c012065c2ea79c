//! In-memory reference store implementations
//!
//! Thread-safe, map-backed implementations of the store contracts. They
//! carry the same semantics the engine expects from a real backend:
//! (name, database) uniqueness, ascending-id column listing, and
//! batch writes applied under a single lock.

use crate::perm::{PermissionAction, Principal};
use crate::schema::{Column, Table};
use crate::store::error::{StoreError, StoreResult};
use crate::store::interface::{
    ColumnStore, DatabaseSummary, DirectoryStore, Document, Entry, EntryStore, PermissionStore,
    TableStore, UrlBuilder, UserSummary,
};
use crate::types::{ColumnId, DatabaseId, EntryId, GroupId, TableId, UserId};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap, HashSet};

/// In-memory table store
pub struct MemoryTableStore {
    tables: RwLock<HashMap<TableId, Table>>,
    next_id: RwLock<TableId>,
}

impl MemoryTableStore {
    /// Create an empty table store
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            next_id: RwLock::new(1),
        }
    }
}

impl Default for MemoryTableStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TableStore for MemoryTableStore {
    fn create(&self, mut table: Table) -> StoreResult<Table> {
        let mut tables = self.tables.write();

        let taken = tables
            .values()
            .any(|t| t.database_id == table.database_id && t.name == table.name);
        if taken {
            return Err(StoreError::DuplicateTableName {
                name: table.name.clone(),
                database_id: table.database_id,
            });
        }

        let mut next_id = self.next_id.write();
        table.table_id = *next_id;
        *next_id += 1;

        tables.insert(table.table_id, table.clone());
        Ok(table)
    }

    fn get(&self, table_id: TableId) -> StoreResult<Table> {
        self.tables
            .read()
            .get(&table_id)
            .cloned()
            .ok_or(StoreError::TableNotFound(table_id))
    }

    fn find_by_name(&self, database_id: DatabaseId, name: &str) -> StoreResult<Option<TableId>> {
        Ok(self
            .tables
            .read()
            .values()
            .find(|t| t.database_id == database_id && t.name == name)
            .map(|t| t.table_id))
    }

    fn update(&self, table: &Table) -> StoreResult<()> {
        let mut tables = self.tables.write();

        if !tables.contains_key(&table.table_id) {
            return Err(StoreError::TableNotFound(table.table_id));
        }

        let taken = tables.values().any(|t| {
            t.table_id != table.table_id
                && t.database_id == table.database_id
                && t.name == table.name
        });
        if taken {
            return Err(StoreError::DuplicateTableName {
                name: table.name.clone(),
                database_id: table.database_id,
            });
        }

        tables.insert(table.table_id, table.clone());
        Ok(())
    }
}

/// In-memory column store
///
/// Backed by a `BTreeMap` so per-table listings come out in ascending-id
/// order without sorting.
pub struct MemoryColumnStore {
    columns: RwLock<BTreeMap<ColumnId, Column>>,
    next_id: RwLock<ColumnId>,
}

impl MemoryColumnStore {
    /// Create an empty column store
    pub fn new() -> Self {
        Self {
            columns: RwLock::new(BTreeMap::new()),
            next_id: RwLock::new(1),
        }
    }

    fn allocate_id(&self) -> ColumnId {
        let mut next_id = self.next_id.write();
        let id = *next_id;
        *next_id += 1;
        id
    }
}

impl Default for MemoryColumnStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ColumnStore for MemoryColumnStore {
    fn create(&self, column: Column) -> StoreResult<Column> {
        let column = column.with_column_id(self.allocate_id());
        self.columns.write().insert(column.column_id(), column.clone());
        Ok(column)
    }

    fn get(&self, column_id: ColumnId) -> StoreResult<Column> {
        self.columns
            .read()
            .get(&column_id)
            .cloned()
            .ok_or(StoreError::ColumnNotFound(column_id))
    }

    fn list_for_table(&self, table_id: TableId) -> StoreResult<Vec<Column>> {
        Ok(self
            .columns
            .read()
            .values()
            .filter(|c| c.table_id() == table_id)
            .cloned()
            .collect())
    }

    fn apply(&self, upserts: Vec<Column>, deletes: Vec<ColumnId>) -> StoreResult<Vec<Column>> {
        let mut columns = self.columns.write();

        for id in &deletes {
            if !columns.contains_key(id) {
                return Err(StoreError::ColumnNotFound(*id));
            }
        }
        for col in &upserts {
            if col.column_id() != 0 && !columns.contains_key(&col.column_id()) {
                return Err(StoreError::ColumnNotFound(col.column_id()));
            }
        }

        for id in deletes {
            columns.remove(&id);
        }

        let mut stored = Vec::with_capacity(upserts.len());
        for col in upserts {
            let col = if col.column_id() == 0 {
                col.with_column_id(self.allocate_id())
            } else {
                col
            };
            columns.insert(col.column_id(), col.clone());
            stored.push(col);
        }

        Ok(stored)
    }
}

/// In-memory entry store
pub struct MemoryEntryStore {
    entries: RwLock<BTreeMap<EntryId, Entry>>,
    next_id: RwLock<EntryId>,
}

impl MemoryEntryStore {
    /// Create an empty entry store
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            next_id: RwLock::new(1),
        }
    }
}

impl Default for MemoryEntryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntryStore for MemoryEntryStore {
    fn create(&self, table_id: TableId, document: Document) -> StoreResult<Entry> {
        let mut next_id = self.next_id.write();
        let entry = Entry {
            entry_id: *next_id,
            table_id,
            document,
        };
        *next_id += 1;

        self.entries.write().insert(entry.entry_id, entry.clone());
        Ok(entry)
    }

    fn list_for_table(&self, table_id: TableId) -> StoreResult<Vec<Entry>> {
        Ok(self
            .entries
            .read()
            .values()
            .filter(|e| e.table_id == table_id)
            .cloned()
            .collect())
    }

    fn count_for_table(&self, table_id: TableId) -> StoreResult<u64> {
        Ok(self
            .entries
            .read()
            .values()
            .filter(|e| e.table_id == table_id)
            .count() as u64)
    }

    fn save(&self, entry: &Entry) -> StoreResult<()> {
        let mut entries = self.entries.write();
        if !entries.contains_key(&entry.entry_id) {
            return Err(StoreError::EntryNotFound(entry.entry_id));
        }
        entries.insert(entry.entry_id, entry.clone());
        Ok(())
    }

    fn save_all(&self, batch: &[Entry]) -> StoreResult<()> {
        let mut entries = self.entries.write();

        // Verify the whole batch before writing any of it
        for entry in batch {
            if !entries.contains_key(&entry.entry_id) {
                return Err(StoreError::EntryNotFound(entry.entry_id));
            }
        }
        for entry in batch {
            entries.insert(entry.entry_id, entry.clone());
        }
        Ok(())
    }
}

/// In-memory permission store
///
/// Grants are keyed by (table, principal); a viewer's effective set is
/// the union of their direct grants and the grants of every group they
/// belong to.
pub struct MemoryPermissionStore {
    grants: RwLock<HashMap<(TableId, Principal), HashSet<PermissionAction>>>,
    memberships: RwLock<HashMap<UserId, HashSet<GroupId>>>,
}

impl MemoryPermissionStore {
    /// Create an empty permission store
    pub fn new() -> Self {
        Self {
            grants: RwLock::new(HashMap::new()),
            memberships: RwLock::new(HashMap::new()),
        }
    }

    /// Add a user to a group
    pub fn add_member(&self, user_id: UserId, group_id: GroupId) {
        self.memberships
            .write()
            .entry(user_id)
            .or_default()
            .insert(group_id);
    }
}

impl Default for MemoryPermissionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PermissionStore for MemoryPermissionStore {
    fn assign(
        &self,
        action: PermissionAction,
        principal: Principal,
        table_id: TableId,
    ) -> StoreResult<()> {
        self.grants
            .write()
            .entry((table_id, principal))
            .or_default()
            .insert(action);
        Ok(())
    }

    fn check_perms(
        &self,
        viewer: UserId,
        table_id: TableId,
    ) -> StoreResult<HashSet<PermissionAction>> {
        let grants = self.grants.read();
        let mut perms = grants
            .get(&(table_id, Principal::User(viewer)))
            .cloned()
            .unwrap_or_default();

        if let Some(groups) = self.memberships.read().get(&viewer) {
            for group in groups {
                if let Some(actions) = grants.get(&(table_id, Principal::Group(*group))) {
                    perms.extend(actions.iter().copied());
                }
            }
        }

        Ok(perms)
    }
}

/// In-memory directory of users and databases
pub struct MemoryDirectory {
    users: RwLock<HashMap<UserId, UserSummary>>,
    databases: RwLock<HashMap<DatabaseId, DatabaseSummary>>,
}

impl MemoryDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            databases: RwLock::new(HashMap::new()),
        }
    }

    /// Register a user
    pub fn add_user(&self, id: UserId, username: impl Into<String>) {
        self.users.write().insert(
            id,
            UserSummary {
                id,
                username: username.into(),
            },
        );
    }

    /// Register a database
    pub fn add_database(&self, id: DatabaseId, name: impl Into<String>, slug: impl Into<String>) {
        self.databases.write().insert(
            id,
            DatabaseSummary {
                id,
                name: name.into(),
                slug: slug.into(),
            },
        );
    }
}

impl Default for MemoryDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectoryStore for MemoryDirectory {
    fn user(&self, user_id: UserId) -> StoreResult<UserSummary> {
        self.users
            .read()
            .get(&user_id)
            .cloned()
            .ok_or(StoreError::UserNotFound(user_id))
    }

    fn database(&self, database_id: DatabaseId) -> StoreResult<DatabaseSummary> {
        self.databases
            .read()
            .get(&database_id)
            .cloned()
            .ok_or(StoreError::DatabaseNotFound(database_id))
    }
}

/// URL builder producing absolute links under a fixed base
pub struct PathUrlBuilder {
    base: String,
}

impl PathUrlBuilder {
    /// Create a builder with the given base URL (no trailing slash)
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }
}

impl UrlBuilder for PathUrlBuilder {
    fn entries_url(&self, table_id: TableId) -> String {
        format!("{}/tables/{}/entries/", self.base, table_id)
    }
}
