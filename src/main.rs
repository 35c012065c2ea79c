//! Gridstore main program entry

// Use jemalloc as global allocator
#[global_allocator]
static GLOBAL: jemallocator::Jemalloc = jemallocator::Jemalloc;

use gridstore::perm::PermissionResolver;
use gridstore::schema::{ColumnSpec, TableSpec};
use gridstore::store::memory::{
    MemoryColumnStore, MemoryDirectory, MemoryEntryStore, MemoryPermissionStore, MemoryTableStore,
    PathUrlBuilder,
};
use gridstore::types::FieldType;
use gridstore::{SchemaEngine, TableView};
use std::sync::Arc;

const ADMINS_GROUP: u64 = 1;

fn main() {
    println!("Gridstore table engine starting...");

    let tables = Arc::new(MemoryTableStore::new());
    let columns = Arc::new(MemoryColumnStore::new());
    let entries = Arc::new(MemoryEntryStore::new());
    let perms = Arc::new(MemoryPermissionStore::new());
    let directory = Arc::new(MemoryDirectory::new());
    directory.add_user(1, "demo");
    directory.add_database(1, "Demo DB", "demo-db");

    let resolver = PermissionResolver::new(perms, ADMINS_GROUP);
    let engine = SchemaEngine::new(
        tables.clone(),
        columns.clone(),
        entries.clone(),
        resolver.clone(),
    );
    let view = TableView::new(
        tables,
        columns,
        entries,
        directory,
        Arc::new(PathUrlBuilder::new("http://localhost:8000")),
        resolver,
    );

    let table = engine
        .create_table(
            TableSpec::new("contacts", 1, 1)
                .column(ColumnSpec::from_display_name("Full Name", FieldType::Text))
                .column(ColumnSpec::from_display_name("Age", FieldType::Int)),
        )
        .expect("demo table creation failed");

    let read = view
        .compose(table.table_id, Some(1))
        .expect("demo table read failed");
    println!(
        "{}",
        serde_json::to_string_pretty(&read).expect("serialization failed")
    );

    println!("Gridstore table engine startup completed!");
}
