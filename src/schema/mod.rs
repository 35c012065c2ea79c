//! Schema module for table and column metadata
//!
//! This module implements the schema data model with the following pieces:
//! - Table metadata (name, database, ownership, default fields, filters)
//! - Column metadata (internal name, display name, field type, constraints)
//! - Submission payloads for create, full replace, and partial patch

pub mod column;
pub mod payload;
pub mod table;

pub use column::Column;
pub use payload::{ColumnSpec, TablePatch, TableReplace, TableSpec};
pub use table::Table;
