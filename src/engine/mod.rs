//! Schema engine for table and column evolution
//!
//! This module orchestrates the three schema-mutating operations:
//! - Create: table + columns in one shot, with grant seeding
//! - Full replace (PUT): attribute overwrite plus column reconciliation
//!   (removed / matched / new) and the entry-document cascade
//! - Partial patch (PATCH): filters, default fields, and the active flag
//!
//! The cascade is computed once per replace as a rename-map plus a
//! delete-set and applied to each entry document in a single pass. Every
//! guard runs before anything is written, the staged result is committed
//! through batch store writes, and schema mutations are serialized per
//! table id.

use crate::perm::PermissionResolver;
use crate::schema::{Column, Table, TablePatch, TableReplace, TableSpec};
use crate::store::interface::{ColumnStore, Entry, EntryStore, TableStore};
use crate::types::{ColumnId, TableId};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

pub mod error;
pub use error::{SchemaEngineError, SchemaEngineResult};

/// Schema engine over the collaborator stores
pub struct SchemaEngine {
    tables: Arc<dyn TableStore>,
    columns: Arc<dyn ColumnStore>,
    entries: Arc<dyn EntryStore>,
    resolver: PermissionResolver,
    table_locks: Mutex<HashMap<TableId, Arc<Mutex<()>>>>,
}

impl SchemaEngine {
    /// Create an engine over the given stores
    pub fn new(
        tables: Arc<dyn TableStore>,
        columns: Arc<dyn ColumnStore>,
        entries: Arc<dyn EntryStore>,
        resolver: PermissionResolver,
    ) -> Self {
        Self {
            tables,
            columns,
            entries,
            resolver,
            table_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Create a table together with its columns
    ///
    /// Columns are persisted in submission order. Each spec's internal
    /// name and display name are resolved by the derivation rule; two
    /// specs resolving to the same internal name are rejected. Exactly
    /// four permission grants are seeded for the creator and the
    /// administrators principal.
    pub fn create_table(&self, spec: TableSpec) -> SchemaEngineResult<Table> {
        if self
            .tables
            .find_by_name(spec.database_id, &spec.name)?
            .is_some()
        {
            return Err(SchemaEngineError::UniquenessViolation {
                name: spec.name.clone(),
                database_id: spec.database_id,
            });
        }

        // Resolve every column name before creating anything
        let mut resolved = Vec::with_capacity(spec.columns.len());
        let mut seen = HashSet::new();
        for col_spec in &spec.columns {
            let (name, display) = col_spec
                .resolved_names()
                .map_err(SchemaEngineError::InvalidArgument)?;
            if !seen.insert(name.clone()) {
                return Err(SchemaEngineError::DuplicateColumnName(name));
            }
            resolved.push((name, display));
        }

        let mut table = Table::new(0, spec.name.clone(), spec.database_id, spec.owner);
        table.active = spec.active;
        table.filters = spec.filters.clone();
        let table = self.tables.create(table)?;

        for (col_spec, (name, display)) in spec.columns.iter().zip(resolved) {
            self.columns.create(Column::new(
                0,
                table.table_id,
                name,
                display,
                col_spec.field_type,
                col_spec.help_text.clone(),
                col_spec.required,
                col_spec.unique,
                col_spec.choices.clone(),
            ))?;
        }

        self.resolver.seed_table_grants(table.table_id, spec.owner)?;

        log::info!(
            "created table {} ({:?}) with {} columns",
            table.table_id,
            table.name,
            spec.columns.len()
        );
        Ok(table)
    }

    /// Fully replace a table's attributes and column set (PUT semantics)
    ///
    /// Callers resend unchanged fields; name, active flag, database, and
    /// last-edit user are overwritten unconditionally. The submitted
    /// column list drives the reconciliation: existing ids not resubmitted
    /// are deleted (their key dropped from every entry document), matched
    /// ids are renamed/merged (documents migrated from the old key to the
    /// new), and id-less specs become new columns.
    pub fn replace_table(
        &self,
        table_id: TableId,
        payload: TableReplace,
    ) -> SchemaEngineResult<Table> {
        let lock = self.lock_for(table_id);
        let _guard = lock.lock();

        let table = self.tables.get(table_id)?;
        let existing = self.columns.list_for_table(table_id)?;
        let entry_count = self.entries.count_for_table(table_id)?;
        let by_id: HashMap<ColumnId, &Column> =
            existing.iter().map(|c| (c.column_id(), c)).collect();

        // Type-change guard: runs before any mutation
        if entry_count > 0 {
            for spec in &payload.columns {
                if let Some(id) = spec.id {
                    let stored = by_id.get(&id).ok_or_else(|| {
                        SchemaEngineError::ReferenceNotFound(format!("column {}", id))
                    })?;
                    if stored.field_type() != spec.field_type {
                        return Err(SchemaEngineError::ForbiddenTypeChange(id));
                    }
                }
            }
        }

        if let Some(other) = self.tables.find_by_name(payload.database_id, &payload.name)? {
            if other != table_id {
                return Err(SchemaEngineError::UniquenessViolation {
                    name: payload.name.clone(),
                    database_id: payload.database_id,
                });
            }
        }

        // Stage the attribute overwrite
        let mut new_table = table;
        new_table.name = payload.name.clone();
        new_table.active = payload.active;
        new_table.database_id = payload.database_id;
        new_table.touch(payload.last_edit_user);

        // Removed: existing ids not resubmitted
        let submitted_ids: HashSet<ColumnId> = payload.columns.iter().filter_map(|s| s.id).collect();
        let mut deletes = Vec::new();
        let mut delete_keys = Vec::new();
        for col in &existing {
            if !submitted_ids.contains(&col.column_id()) {
                deletes.push(col.column_id());
                delete_keys.push(col.name().to_string());
            }
        }

        // Matched and new columns
        let mut upserts = Vec::new();
        let mut rename_map: Vec<(String, String)> = Vec::new();
        let mut final_names = HashSet::new();
        for spec in &payload.columns {
            match spec.id {
                Some(id) => {
                    let stored = *by_id.get(&id).ok_or_else(|| {
                        SchemaEngineError::ReferenceNotFound(format!("column {}", id))
                    })?;
                    let (name, display) = spec
                        .resolved_names()
                        .map_err(SchemaEngineError::InvalidArgument)?;
                    if !final_names.insert(name.clone()) {
                        return Err(SchemaEngineError::DuplicateColumnName(name));
                    }
                    let mut col = stored.clone();
                    if stored.name() != name {
                        rename_map.push((stored.name().to_string(), name.clone()));
                        col.set_name(name);
                    }
                    // Guard above already rejected a differing type when
                    // entries exist, so this only retypes empty tables
                    col.set_field_type(spec.field_type);
                    col.merge_attributes(
                        display,
                        spec.help_text.clone(),
                        spec.required,
                        spec.unique,
                        spec.choices.clone(),
                    );
                    upserts.push(col);
                }
                None => {
                    // New columns derive their internal name from the
                    // display name; a name-only spec falls back to the
                    // create-path rule
                    let (name, display) = match &spec.display_name {
                        Some(display) => (crate::naming::derive_name(display), display.clone()),
                        None => spec
                            .resolved_names()
                            .map_err(SchemaEngineError::InvalidArgument)?,
                    };
                    if !final_names.insert(name.clone()) {
                        return Err(SchemaEngineError::DuplicateColumnName(name));
                    }
                    upserts.push(Column::new(
                        0,
                        table_id,
                        name,
                        display,
                        spec.field_type,
                        spec.help_text.clone(),
                        spec.required,
                        spec.unique,
                        spec.choices.clone(),
                    ));
                }
            }
        }

        // Stage the document cascade: one pass per entry over the
        // delete-set and rename-map
        let mut migrated: Vec<Entry> = Vec::new();
        if entry_count > 0 && (!delete_keys.is_empty() || !rename_map.is_empty()) {
            for mut entry in self.entries.list_for_table(table_id)? {
                let mut touched = false;
                // Read every rename source from the untouched document
                // first; chained or swapped renames in one replace must
                // all see the original values
                let mut moves = Vec::new();
                for (old, new) in &rename_map {
                    if let Some(value) = entry.document.get(old) {
                        moves.push((new.clone(), value.clone()));
                    }
                }
                for key in &delete_keys {
                    if entry.document.remove(key).is_some() {
                        touched = true;
                    }
                }
                for (old, _) in &rename_map {
                    if entry.document.remove(old).is_some() {
                        touched = true;
                    }
                }
                for (new, value) in moves {
                    entry.document.insert(new, value);
                    touched = true;
                }
                if touched {
                    migrated.push(entry);
                }
            }
        }

        // Default-field references to deleted columns go away with them
        let removed: HashSet<ColumnId> = deletes.iter().copied().collect();
        new_table.retain_default_fields(|id| !removed.contains(&id));

        // Commit: everything above validated, nothing written yet
        self.tables.update(&new_table)?;
        self.columns.apply(upserts, deletes.clone())?;
        if !migrated.is_empty() {
            self.entries.save_all(&migrated)?;
        }

        log::debug!(
            "replaced table {}: {} deleted, {} renamed, {} entries migrated",
            table_id,
            deletes.len(),
            rename_map.len(),
            migrated.len()
        );
        Ok(new_table)
    }

    /// Apply a partial patch (PATCH semantics)
    ///
    /// Only the supplied subset applies: filters are replaced whole (and
    /// only when the supplied blob is truthy), default-field references
    /// are unioned into the existing set, the active flag is overwritten.
    /// Column changes cannot be expressed through this operation.
    pub fn patch_table(&self, table_id: TableId, patch: TablePatch) -> SchemaEngineResult<Table> {
        let lock = self.lock_for(table_id);
        let _guard = lock.lock();

        let mut table = self.tables.get(table_id)?;

        if let Some(filters) = patch.filters {
            if filters_is_truthy(&filters) {
                table.filters = filters;
            }
        }

        if let Some(default_fields) = &patch.default_fields {
            let known: HashSet<ColumnId> = self
                .columns
                .list_for_table(table_id)?
                .iter()
                .map(|c| c.column_id())
                .collect();
            for id in default_fields {
                if !known.contains(id) {
                    return Err(SchemaEngineError::ReferenceNotFound(format!(
                        "column {}",
                        id
                    )));
                }
            }
            for id in default_fields {
                table.add_default_field(*id);
            }
        }

        if let Some(active) = patch.active {
            table.active = active;
        }

        self.tables.update(&table)?;
        Ok(table)
    }

    /// Get the mutation lock for a table id
    ///
    /// Schema-mutating operations on one table never interleave; reads
    /// are not blocked. The map keeps one entry per table id ever
    /// mutated and is not pruned; no engine operation deletes a table,
    /// so entries do not go stale.
    fn lock_for(&self, table_id: TableId) -> Arc<Mutex<()>> {
        self.table_locks
            .lock()
            .entry(table_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

/// Truthiness of the opaque filter blob: only a non-null, non-empty,
/// non-zero value replaces the stored one
fn filters_is_truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Array(a) => !a.is_empty(),
        serde_json::Value::Object(o) => !o.is_empty(),
    }
}
