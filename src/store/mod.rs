//! Store module: collaborator contracts and reference implementations
//!
//! This module provides the seams between the schema core and its
//! external collaborators, with an in-memory implementation of each:
//! - Tables, columns, entries (persistence)
//! - Permissions (grant storage and lookup)
//! - Directory (user/database summaries)
//! - URL construction for related resources

// Re-export error types and result type
pub mod error;
pub use error::{StoreError, StoreResult};

// Re-export interface traits
pub mod interface;
pub use interface::{
    ColumnStore, DatabaseSummary, DirectoryStore, Document, Entry, EntryStore, PermissionStore,
    TableStore, UrlBuilder, UserSummary,
};

// Re-export in-memory implementations
pub mod memory;
pub use memory::{
    MemoryColumnStore, MemoryDirectory, MemoryEntryStore, MemoryPermissionStore, MemoryTableStore,
    PathUrlBuilder,
};
