//! Column structure for table schema definition

use crate::types::{ColumnId, FieldType, TableId};
use serde::{Deserialize, Serialize};

/// Column metadata structure
///
/// Represents a single column in a table schema with:
/// - name: Internal key used inside entry documents
/// - display_name: Human-readable label
/// - field_type: Value kind; locked once the owning table has entries
/// - required / unique: Constraint flags
/// - choices: Ordered choice strings for enum-like columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Unique column identifier
    column_id: ColumnId,
    /// Owning table
    table_id: TableId,
    /// Internal name (document key)
    name: String,
    /// Display name
    display_name: String,
    /// Value type
    field_type: FieldType,
    /// Help text shown alongside the column
    help_text: String,
    /// Whether a value is required
    required: bool,
    /// Whether values must be unique across the table's entries
    unique: bool,
    /// Ordered choice strings (enum-like columns)
    choices: Option<Vec<String>>,
}

impl Column {
    /// Create a new column
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        column_id: ColumnId,
        table_id: TableId,
        name: String,
        display_name: String,
        field_type: FieldType,
        help_text: String,
        required: bool,
        unique: bool,
        choices: Option<Vec<String>>,
    ) -> Self {
        Self {
            column_id,
            table_id,
            name,
            display_name,
            field_type,
            help_text,
            required,
            unique,
            choices,
        }
    }

    /// Get column ID
    pub fn column_id(&self) -> ColumnId {
        self.column_id
    }

    /// Get owning table ID
    pub fn table_id(&self) -> TableId {
        self.table_id
    }

    /// Get internal name (the document key)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get display name
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Get field type
    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Get help text
    pub fn help_text(&self) -> &str {
        &self.help_text
    }

    /// Check if a value is required
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Check if values must be unique
    pub fn is_unique(&self) -> bool {
        self.unique
    }

    /// Get choice strings, if any
    pub fn choices(&self) -> Option<&[String]> {
        self.choices.as_deref()
    }

    /// Replace the id after store-side allocation
    pub(crate) fn with_column_id(mut self, column_id: ColumnId) -> Self {
        self.column_id = column_id;
        self
    }

    /// Rename the column's internal name
    ///
    /// Only the schema engine calls this, after migrating every entry
    /// document from the old key to the new one.
    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    /// Retype the column
    ///
    /// Only the schema engine calls this, and only while the owning
    /// table has no entries; with entries the type-change guard rejects
    /// the submission first.
    pub(crate) fn set_field_type(&mut self, field_type: FieldType) {
        self.field_type = field_type;
    }

    /// Merge the mutable attributes from a submission
    ///
    /// Covers exactly display name, help text, required, unique, and
    /// choices. Internal name and field type never travel through this
    /// merge; they are handled by the rename and type-guard rules.
    pub(crate) fn merge_attributes(
        &mut self,
        display_name: String,
        help_text: String,
        required: bool,
        unique: bool,
        choices: Option<Vec<String>>,
    ) {
        self.display_name = display_name;
        self.help_text = help_text;
        self.required = required;
        self.unique = unique;
        self.choices = choices;
    }
}
