use super::*;
use crate::perm::{PermissionAction, PermissionResolver};
use crate::schema::{ColumnSpec, TablePatch, TableReplace, TableSpec};
use crate::store::interface::{Document, PermissionStore};
use crate::store::memory::{
    MemoryColumnStore, MemoryEntryStore, MemoryPermissionStore, MemoryTableStore,
};
use crate::types::{FieldType, FieldValue};

const ADMINS: u64 = 99;

struct Fixture {
    engine: SchemaEngine,
    columns: Arc<MemoryColumnStore>,
    entries: Arc<MemoryEntryStore>,
    perms: Arc<MemoryPermissionStore>,
}

fn fixture() -> Fixture {
    let tables = Arc::new(MemoryTableStore::new());
    let columns = Arc::new(MemoryColumnStore::new());
    let entries = Arc::new(MemoryEntryStore::new());
    let perms = Arc::new(MemoryPermissionStore::new());
    let resolver = PermissionResolver::new(perms.clone(), ADMINS);
    let engine = SchemaEngine::new(tables, columns.clone(), entries.clone(), resolver);
    Fixture {
        engine,
        columns,
        entries,
        perms,
    }
}

fn spec_from(col: &Column) -> ColumnSpec {
    ColumnSpec {
        id: Some(col.column_id()),
        name: Some(col.name().to_string()),
        display_name: Some(col.display_name().to_string()),
        field_type: col.field_type(),
        help_text: col.help_text().to_string(),
        required: col.is_required(),
        unique: col.is_unique(),
        choices: col.choices().map(|c| c.to_vec()),
    }
}

fn replace_echo(table: &Table, columns: Vec<ColumnSpec>) -> TableReplace {
    TableReplace {
        name: table.name.clone(),
        active: table.active,
        database_id: table.database_id,
        last_edit_user: table.last_edit_user,
        columns,
    }
}

#[test]
fn test_create_derives_internal_name_from_display_name() {
    let f = fixture();
    let table = f
        .engine
        .create_table(
            TableSpec::new("contacts", 1, 5)
                .column(ColumnSpec::from_display_name("User Name", FieldType::Text)),
        )
        .unwrap();

    let cols = f.columns.list_for_table(table.table_id).unwrap();
    assert_eq!(cols.len(), 1);
    assert_eq!(cols[0].name(), "user_name");
    assert_eq!(cols[0].display_name(), "User Name");
}

#[test]
fn test_create_takes_display_name_from_name() {
    let f = fixture();
    let table = f
        .engine
        .create_table(
            TableSpec::new("contacts", 1, 5)
                .column(ColumnSpec::from_name("user_name", FieldType::Text)),
        )
        .unwrap();

    let cols = f.columns.list_for_table(table.table_id).unwrap();
    assert_eq!(cols[0].name(), "user_name");
    assert_eq!(cols[0].display_name(), "user_name");
}

#[test]
fn test_create_persists_columns_in_submission_order() {
    let f = fixture();
    let table = f
        .engine
        .create_table(
            TableSpec::new("contacts", 1, 5)
                .column(ColumnSpec::from_display_name("Zeta", FieldType::Text))
                .column(ColumnSpec::from_display_name("Alpha", FieldType::Int))
                .column(ColumnSpec::from_display_name("Mid", FieldType::Bool)),
        )
        .unwrap();

    let cols = f.columns.list_for_table(table.table_id).unwrap();
    let names: Vec<&str> = cols.iter().map(|c| c.name()).collect();
    // Ascending-id order is submission order
    assert_eq!(names, vec!["zeta", "alpha", "mid"]);
}

#[test]
fn test_create_rejects_duplicate_table_name_per_database() {
    let f = fixture();
    f.engine.create_table(TableSpec::new("users", 1, 5)).unwrap();

    let result = f.engine.create_table(TableSpec::new("users", 1, 5));
    assert!(matches!(
        result,
        Err(SchemaEngineError::UniquenessViolation { .. })
    ));

    // Same name in another database is fine
    f.engine.create_table(TableSpec::new("users", 2, 5)).unwrap();
}

#[test]
fn test_create_rejects_colliding_internal_names() {
    let f = fixture();
    let result = f.engine.create_table(
        TableSpec::new("contacts", 1, 5)
            .column(ColumnSpec::from_display_name("User Name", FieldType::Text))
            .column(ColumnSpec::from_display_name("user  name", FieldType::Int)),
    );
    assert!(matches!(
        result,
        Err(SchemaEngineError::DuplicateColumnName(name)) if name == "user_name"
    ));
}

#[test]
fn test_create_seeds_four_grants_for_creator_and_admins() {
    let f = fixture();
    let table = f.engine.create_table(TableSpec::new("users", 1, 5)).unwrap();

    let creator_perms = f.perms.check_perms(5, table.table_id).unwrap();
    assert_eq!(creator_perms.len(), 4);
    for action in PermissionAction::ALL {
        assert!(creator_perms.contains(&action));
    }

    f.perms.add_member(6, ADMINS);
    let admin_perms = f.perms.check_perms(6, table.table_id).unwrap();
    assert_eq!(admin_perms.len(), 4);
}

fn seeded_table(f: &Fixture) -> (Table, Vec<Column>) {
    let table = f
        .engine
        .create_table(
            TableSpec::new("contacts", 1, 5)
                .column(ColumnSpec::from_display_name("Old Key", FieldType::Text))
                .column(ColumnSpec::from_display_name("Age", FieldType::Int)),
        )
        .unwrap();
    let columns = f.columns.list_for_table(table.table_id).unwrap();

    let mut doc = Document::new();
    doc.insert(
        "old_key".to_string(),
        FieldValue::Text("hello".to_string()),
    );
    doc.insert("age".to_string(), FieldValue::Int(30));
    f.entries.create(table.table_id, doc).unwrap();

    (table, columns)
}

#[test]
fn test_replace_forbids_type_change_with_entries() {
    let f = fixture();
    let (table, columns) = seeded_table(&f);

    let mut changed = spec_from(&columns[0]);
    changed.field_type = FieldType::Int;
    let payload = replace_echo(&table, vec![changed, spec_from(&columns[1])]);

    let result = f.engine.replace_table(table.table_id, payload);
    let offending = columns[0].column_id();
    assert!(matches!(
        result,
        Err(SchemaEngineError::ForbiddenTypeChange(id)) if id == offending
    ));

    // No column or entry was modified
    let cols = f.columns.list_for_table(table.table_id).unwrap();
    assert_eq!(cols[0].field_type(), FieldType::Text);
    let entries = f.entries.list_for_table(table.table_id).unwrap();
    let entry = &entries[0];
    assert_eq!(
        entry.document.get("old_key"),
        Some(&FieldValue::Text("hello".to_string()))
    );
}

#[test]
fn test_replace_allows_type_change_without_entries() {
    let f = fixture();
    let table = f
        .engine
        .create_table(
            TableSpec::new("contacts", 1, 5)
                .column(ColumnSpec::from_display_name("Score", FieldType::Int)),
        )
        .unwrap();
    let columns = f.columns.list_for_table(table.table_id).unwrap();

    let mut changed = spec_from(&columns[0]);
    changed.field_type = FieldType::Float;
    f.engine
        .replace_table(table.table_id, replace_echo(&table, vec![changed]))
        .unwrap();

    let cols = f.columns.list_for_table(table.table_id).unwrap();
    assert_eq!(cols[0].field_type(), FieldType::Float);
}

#[test]
fn test_replace_rename_migrates_every_entry_document() {
    let f = fixture();
    let (table, columns) = seeded_table(&f);

    // A second entry, and one that never had the key
    let mut doc = Document::new();
    doc.insert("old_key".to_string(), FieldValue::Text("bye".to_string()));
    f.entries.create(table.table_id, doc).unwrap();
    f.entries.create(table.table_id, Document::new()).unwrap();

    let mut renamed = spec_from(&columns[0]);
    renamed.name = Some("new_key".to_string());
    let payload = replace_echo(&table, vec![renamed, spec_from(&columns[1])]);
    f.engine.replace_table(table.table_id, payload).unwrap();

    let entries = f.entries.list_for_table(table.table_id).unwrap();
    assert_eq!(
        entries[0].document.get("new_key"),
        Some(&FieldValue::Text("hello".to_string()))
    );
    assert!(!entries[0].document.contains_key("old_key"));
    assert_eq!(
        entries[1].document.get("new_key"),
        Some(&FieldValue::Text("bye".to_string()))
    );
    assert!(entries[2].document.is_empty());

    let cols = f.columns.list_for_table(table.table_id).unwrap();
    assert_eq!(cols[0].name(), "new_key");
}

#[test]
fn test_replace_omitted_column_is_deleted_with_its_keys() {
    let f = fixture();
    let (table, columns) = seeded_table(&f);

    // Resubmit only the first column; "age" disappears
    let payload = replace_echo(&table, vec![spec_from(&columns[0])]);
    f.engine.replace_table(table.table_id, payload).unwrap();

    let cols = f.columns.list_for_table(table.table_id).unwrap();
    assert_eq!(cols.len(), 1);
    assert_eq!(cols[0].name(), "old_key");

    let entries = f.entries.list_for_table(table.table_id).unwrap();
    let entry = &entries[0];
    assert!(!entry.document.contains_key("age"));
    assert!(entry.document.contains_key("old_key"));
}

#[test]
fn test_replace_adds_new_column_derived_from_display_name() {
    let f = fixture();
    let (table, columns) = seeded_table(&f);

    let mut specs: Vec<ColumnSpec> = columns.iter().map(spec_from).collect();
    specs.push(ColumnSpec::from_display_name("Home Town", FieldType::Text));
    f.engine
        .replace_table(table.table_id, replace_echo(&table, specs))
        .unwrap();

    let cols = f.columns.list_for_table(table.table_id).unwrap();
    assert_eq!(cols.len(), 3);
    assert_eq!(cols[2].name(), "home_town");
    assert_eq!(cols[2].display_name(), "Home Town");
}

#[test]
fn test_replace_rename_and_delete_touch_one_entry_once() {
    let f = fixture();
    let (table, columns) = seeded_table(&f);

    // Rename old_key -> key and drop age in the same replace
    let mut renamed = spec_from(&columns[0]);
    renamed.name = Some("key".to_string());
    f.engine
        .replace_table(table.table_id, replace_echo(&table, vec![renamed]))
        .unwrap();

    let entries = f.entries.list_for_table(table.table_id).unwrap();
    let entry = &entries[0];
    assert_eq!(
        entry.document.get("key"),
        Some(&FieldValue::Text("hello".to_string()))
    );
    assert!(!entry.document.contains_key("old_key"));
    assert!(!entry.document.contains_key("age"));
}

fn ab_table_with_entry(f: &Fixture) -> (Table, Vec<Column>) {
    let table = f
        .engine
        .create_table(
            TableSpec::new("pairs", 1, 5)
                .column(ColumnSpec::from_name("a", FieldType::Int))
                .column(ColumnSpec::from_name("b", FieldType::Int)),
        )
        .unwrap();
    let columns = f.columns.list_for_table(table.table_id).unwrap();

    let mut doc = Document::new();
    doc.insert("a".to_string(), FieldValue::Int(1));
    doc.insert("b".to_string(), FieldValue::Int(2));
    f.entries.create(table.table_id, doc).unwrap();

    (table, columns)
}

#[test]
fn test_replace_chained_renames_keep_both_values() {
    let f = fixture();
    let (table, columns) = ab_table_with_entry(&f);

    // a -> b and b -> c in one replace; both values must survive under
    // their columns' new keys
    let mut first = spec_from(&columns[0]);
    first.name = Some("b".to_string());
    let mut second = spec_from(&columns[1]);
    second.name = Some("c".to_string());
    f.engine
        .replace_table(table.table_id, replace_echo(&table, vec![first, second]))
        .unwrap();

    let entries = f.entries.list_for_table(table.table_id).unwrap();
    let entry = &entries[0];
    assert_eq!(entry.document.get("b"), Some(&FieldValue::Int(1)));
    assert_eq!(entry.document.get("c"), Some(&FieldValue::Int(2)));
    assert!(!entry.document.contains_key("a"));
    assert_eq!(entry.document.len(), 2);
}

#[test]
fn test_replace_swapped_renames_exchange_keys() {
    let f = fixture();
    let (table, columns) = ab_table_with_entry(&f);

    let mut first = spec_from(&columns[0]);
    first.name = Some("b".to_string());
    let mut second = spec_from(&columns[1]);
    second.name = Some("a".to_string());
    f.engine
        .replace_table(table.table_id, replace_echo(&table, vec![first, second]))
        .unwrap();

    let entries = f.entries.list_for_table(table.table_id).unwrap();
    let entry = &entries[0];
    assert_eq!(entry.document.get("b"), Some(&FieldValue::Int(1)));
    assert_eq!(entry.document.get("a"), Some(&FieldValue::Int(2)));
    assert_eq!(entry.document.len(), 2);
}

#[test]
fn test_replace_overwrites_table_attributes() {
    let f = fixture();
    let (table, columns) = seeded_table(&f);

    let payload = TableReplace {
        name: "people".to_string(),
        active: false,
        database_id: 1,
        last_edit_user: 8,
        columns: columns.iter().map(spec_from).collect(),
    };
    let updated = f.engine.replace_table(table.table_id, payload).unwrap();

    assert_eq!(updated.name, "people");
    assert!(!updated.active);
    assert_eq!(updated.last_edit_user, 8);
}

#[test]
fn test_replace_merges_mutable_column_attributes() {
    let f = fixture();
    let (table, columns) = seeded_table(&f);

    let mut spec = spec_from(&columns[0]);
    spec.display_name = Some("Primary Key".to_string());
    spec.help_text = "the lookup key".to_string();
    spec.required = true;
    spec.unique = true;
    let payload = replace_echo(&table, vec![spec, spec_from(&columns[1])]);
    f.engine.replace_table(table.table_id, payload).unwrap();

    let cols = f.columns.list_for_table(table.table_id).unwrap();
    let col = &cols[0];
    assert_eq!(col.display_name(), "Primary Key");
    assert_eq!(col.help_text(), "the lookup key");
    assert!(col.is_required());
    assert!(col.is_unique());
    // Internal name untouched by the merge
    assert_eq!(col.name(), "old_key");
}

#[test]
fn test_replace_rejects_rename_collision_before_mutating() {
    let f = fixture();
    let (table, columns) = seeded_table(&f);

    // Rename old_key onto the other column's name
    let mut renamed = spec_from(&columns[0]);
    renamed.name = Some("age".to_string());
    let payload = replace_echo(&table, vec![renamed, spec_from(&columns[1])]);

    let result = f.engine.replace_table(table.table_id, payload);
    assert!(matches!(
        result,
        Err(SchemaEngineError::DuplicateColumnName(name)) if name == "age"
    ));

    let entries = f.entries.list_for_table(table.table_id).unwrap();
    let entry = &entries[0];
    assert!(entry.document.contains_key("old_key"));
}

#[test]
fn test_replace_drops_default_field_refs_of_deleted_columns() {
    let f = fixture();
    let (table, columns) = seeded_table(&f);
    f.engine
        .patch_table(
            table.table_id,
            TablePatch {
                default_fields: Some(vec![columns[1].column_id()]),
                ..Default::default()
            },
        )
        .unwrap();

    // Delete the referenced column
    let table = f
        .engine
        .replace_table(
            table.table_id,
            replace_echo(&table, vec![spec_from(&columns[0])]),
        )
        .unwrap();
    assert!(table.default_fields.is_empty());
}

#[test]
fn test_replace_unknown_table_or_column() {
    let f = fixture();
    let result = f.engine.replace_table(
        999,
        TableReplace {
            name: "x".to_string(),
            active: true,
            database_id: 1,
            last_edit_user: 1,
            columns: Vec::new(),
        },
    );
    assert!(matches!(result, Err(SchemaEngineError::ReferenceNotFound(_))));

    let (table, _) = seeded_table(&f);
    let payload = replace_echo(
        &table,
        vec![ColumnSpec::from_name("ghost", FieldType::Text).with_id(12345)],
    );
    let result = f.engine.replace_table(table.table_id, payload);
    assert!(matches!(result, Err(SchemaEngineError::ReferenceNotFound(_))));
}

#[test]
fn test_patch_default_fields_is_monotonic_union() {
    let f = fixture();
    let (table, columns) = seeded_table(&f);
    let (c0, c1) = (columns[0].column_id(), columns[1].column_id());

    let table = f
        .engine
        .patch_table(
            table.table_id,
            TablePatch {
                default_fields: Some(vec![c0]),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(table.default_fields, vec![c0]);

    // Patching in the second reference keeps the first
    let table = f
        .engine
        .patch_table(
            table.table_id,
            TablePatch {
                default_fields: Some(vec![c1]),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(table.default_fields, vec![c0, c1]);
}

#[test]
fn test_patch_rejects_unknown_default_field() {
    let f = fixture();
    let (table, _) = seeded_table(&f);

    let result = f.engine.patch_table(
        table.table_id,
        TablePatch {
            default_fields: Some(vec![999]),
            ..Default::default()
        },
    );
    assert!(matches!(result, Err(SchemaEngineError::ReferenceNotFound(_))));
}

#[test]
fn test_patch_filters_only_replaced_when_truthy() {
    let f = fixture();
    let (table, _) = seeded_table(&f);

    let table = f
        .engine
        .patch_table(
            table.table_id,
            TablePatch {
                filters: Some(serde_json::json!({"col": "age", "gt": 18})),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(table.filters["col"], "age");

    // Null and empty blobs leave the stored filters alone
    let table = f
        .engine
        .patch_table(
            table.table_id,
            TablePatch {
                filters: Some(serde_json::Value::Null),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(table.filters["col"], "age");

    let table = f
        .engine
        .patch_table(
            table.table_id,
            TablePatch {
                filters: Some(serde_json::json!({})),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(table.filters["col"], "age");
}

#[test]
fn test_patch_toggles_active() {
    let f = fixture();
    let (table, _) = seeded_table(&f);

    let table = f
        .engine
        .patch_table(
            table.table_id,
            TablePatch {
                active: Some(false),
                ..Default::default()
            },
        )
        .unwrap();
    assert!(!table.active);
}

#[test]
fn test_concurrent_replaces_serialize_per_table() {
    use std::thread;

    let f = Arc::new(fixture());
    let table = f
        .engine
        .create_table(
            TableSpec::new("contacts", 1, 5)
                .column(ColumnSpec::from_display_name("K0", FieldType::Text)),
        )
        .unwrap();
    let table_id = table.table_id;
    let base_col = f.columns.list_for_table(table_id).unwrap()[0].clone();

    let mut doc = Document::new();
    doc.insert("k0".to_string(), FieldValue::Int(1));
    f.entries.create(table_id, doc).unwrap();

    // Each thread renames the column through a full replace; serialization
    // means every rename lands on the current key, so no migration is lost.
    let mut handles = Vec::new();
    for i in 0..4 {
        let f = f.clone();
        let mut spec = spec_from(&base_col);
        spec.name = Some(format!("k{}", i + 1));
        let payload = TableReplace {
            name: "contacts".to_string(),
            active: true,
            database_id: 1,
            last_edit_user: 5,
            columns: vec![spec],
        };
        handles.push(thread::spawn(move || {
            f.engine.replace_table(table_id, payload).unwrap();
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    // Exactly one key survives, named after the stored column
    let cols = f.columns.list_for_table(table_id).unwrap();
    let col = &cols[0];
    let entries = f.entries.list_for_table(table_id).unwrap();
    let entry = &entries[0];
    assert_eq!(entry.document.len(), 1);
    assert_eq!(entry.document.get(col.name()), Some(&FieldValue::Int(1)));
}
