use serde::{Deserialize, Serialize};
use std::fmt;

/// Global type definitions
///
/// Stores id aliases, value enums, and helpers used globally by the table engine
/// Table ID type
pub type TableId = u64;

/// Column ID type
pub type ColumnId = u64;

/// Entry ID type
pub type EntryId = u64;

/// Database ID type
pub type DatabaseId = u64;

/// User ID type
pub type UserId = u64;

/// Group ID type
pub type GroupId = u64;

/// Timestamp type (epoch seconds)
pub type Timestamp = u64;

/// Value type of a column
///
/// Closed enum: every stored value in an entry document is tagged with
/// exactly one of these kinds. Once a table has entries, a column's
/// field type is locked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Free-form text
    Text,
    /// Signed integer
    Int,
    /// Floating point number
    Float,
    /// Epoch-seconds timestamp
    Date,
    /// Boolean flag
    Bool,
    /// One value out of the column's choice list
    Enum,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Text => write!(f, "text"),
            FieldType::Int => write!(f, "int"),
            FieldType::Float => write!(f, "float"),
            FieldType::Date => write!(f, "date"),
            FieldType::Bool => write!(f, "bool"),
            FieldType::Enum => write!(f, "enum"),
        }
    }
}

/// A single typed value inside an entry document
///
/// Tagged union mirroring [`FieldType`] variant for variant, plus `Null`
/// for absent values on non-required columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
    /// Free-form text
    Text(String),
    /// Signed integer
    Int(i64),
    /// Floating point number
    Float(f64),
    /// Epoch-seconds timestamp
    Date(Timestamp),
    /// Boolean flag
    Bool(bool),
    /// Selected choice value
    Enum(String),
    /// Absent value
    Null,
}

impl FieldValue {
    /// Get the field type this value is tagged with, if any
    pub fn field_type(&self) -> Option<FieldType> {
        match self {
            FieldValue::Text(_) => Some(FieldType::Text),
            FieldValue::Int(_) => Some(FieldType::Int),
            FieldValue::Float(_) => Some(FieldType::Float),
            FieldValue::Date(_) => Some(FieldType::Date),
            FieldValue::Bool(_) => Some(FieldType::Bool),
            FieldValue::Enum(_) => Some(FieldType::Enum),
            FieldValue::Null => None,
        }
    }

    /// Check whether this value is `Null`
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

/// Get current timestamp in epoch seconds
pub fn current_timestamp() -> Timestamp {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
