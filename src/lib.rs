//! Gridstore user-defined-table engine library

// Global type definitions
pub mod types;

// Import various modules
pub mod engine;
pub mod naming;
pub mod perm;
pub mod schema;
pub mod store;
pub mod view;

// Re-export engine items for easier access
pub use engine::SchemaEngine;
pub use engine::SchemaEngineError;

// Re-export schema items for easier access
pub use schema::{Column, ColumnSpec, Table, TablePatch, TableReplace, TableSpec};

// Re-export permission items for easier access
pub use perm::{PermissionAction, PermissionLevel, PermissionResolver, Principal};

// Re-export view items for easier access
pub use view::{TableRead, TableView};
