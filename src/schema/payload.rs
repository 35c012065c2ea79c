//! Submission payloads for schema operations
//!
//! Three shapes, one per operation:
//! - `TableSpec`: create a table together with its columns
//! - `TableReplace`: full replace (PUT); callers resend unchanged fields
//! - `TablePatch`: partial patch (PATCH); column data cannot be expressed

use crate::naming::derive_name;
use crate::types::{ColumnId, DatabaseId, FieldType, UserId};
use serde::{Deserialize, Serialize};

/// A submitted column, as it arrives in a create or full-replace payload
///
/// Supplies either `display_name` or internal `name` (or both). Carries an
/// id only when it refers to an existing column of the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Existing column id; absent for new columns
    #[serde(default)]
    pub id: Option<ColumnId>,
    /// Internal name (document key)
    #[serde(default)]
    pub name: Option<String>,
    /// Display name
    #[serde(default)]
    pub display_name: Option<String>,
    /// Value type
    pub field_type: FieldType,
    /// Help text
    #[serde(default)]
    pub help_text: String,
    /// Whether a value is required
    #[serde(default)]
    pub required: bool,
    /// Whether values must be unique
    #[serde(default)]
    pub unique: bool,
    /// Ordered choice strings
    #[serde(default)]
    pub choices: Option<Vec<String>>,
}

impl ColumnSpec {
    /// Create a spec from a display name alone
    pub fn from_display_name(display_name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            id: None,
            name: None,
            display_name: Some(display_name.into()),
            field_type,
            help_text: String::new(),
            required: false,
            unique: false,
            choices: None,
        }
    }

    /// Create a spec from an internal name alone
    pub fn from_name(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
            display_name: None,
            field_type,
            help_text: String::new(),
            required: false,
            unique: false,
            choices: None,
        }
    }

    /// Attach an existing column id to this spec
    pub fn with_id(mut self, id: ColumnId) -> Self {
        self.id = Some(id);
        self
    }

    /// Resolve the (internal name, display name) pair for this spec
    ///
    /// Rule: a missing display name takes the submitted name's original
    /// value and the internal name becomes its derivation; a missing
    /// internal name is derived from the display name; both present are
    /// kept as given.
    pub fn resolved_names(&self) -> Result<(String, String), String> {
        match (&self.name, &self.display_name) {
            (Some(name), None) => Ok((derive_name(name), name.clone())),
            (None, Some(display)) => Ok((derive_name(display), display.clone())),
            (Some(name), Some(display)) => Ok((name.clone(), display.clone())),
            (None, None) => Err("column spec needs a name or a display_name".to_string()),
        }
    }
}

/// Create payload: table attributes plus an ordered list of column specs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSpec {
    /// Table name, unique within the database
    pub name: String,
    /// Owning database
    pub database_id: DatabaseId,
    /// Creating user (also the initial last-edit user)
    pub owner: UserId,
    /// Active flag
    #[serde(default = "default_active")]
    pub active: bool,
    /// Opaque filter blob
    #[serde(default)]
    pub filters: serde_json::Value,
    /// Columns, persisted in submission order
    #[serde(default)]
    pub columns: Vec<ColumnSpec>,
}

fn default_active() -> bool {
    true
}

impl TableSpec {
    /// Create a spec with defaults (active, no filters, no columns)
    pub fn new(name: impl Into<String>, database_id: DatabaseId, owner: UserId) -> Self {
        Self {
            name: name.into(),
            database_id,
            owner,
            active: true,
            filters: serde_json::Value::Null,
            columns: Vec::new(),
        }
    }

    /// Append a column spec
    pub fn column(mut self, spec: ColumnSpec) -> Self {
        self.columns.push(spec);
        self
    }
}

/// Full-replace payload (PUT semantics)
///
/// Every attribute here overwrites the stored one unconditionally; the
/// column list drives the reconciliation (removed / matched / new).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableReplace {
    /// New table name
    pub name: String,
    /// New active flag
    pub active: bool,
    /// New owning database
    pub database_id: DatabaseId,
    /// User performing the edit
    pub last_edit_user: UserId,
    /// Complete column list; omitted existing ids are deleted
    pub columns: Vec<ColumnSpec>,
}

/// Partial-patch payload (PATCH semantics)
///
/// Only the supplied subset applies. There is deliberately no column
/// field: column add/rename/remove is not reachable through patching.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TablePatch {
    /// Replacement filter blob; applied only when truthy (non-null, non-empty)
    #[serde(default)]
    pub filters: Option<serde_json::Value>,
    /// Default-field references to union into the existing set
    #[serde(default)]
    pub default_fields: Option<Vec<ColumnId>>,
    /// New active flag
    #[serde(default)]
    pub active: Option<bool>,
}
