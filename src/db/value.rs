use std::fmt;

use rusqlite::types::ValueRef;
use serde::{Serialize, Serializer};

/// A single field read back from the database, typed the way SQLite stored it.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// SQL `NULL`.
    Null,
    /// 64-bit signed integer.
    Integer(i64),
    /// IEEE double.
    Real(f64),
    /// UTF-8 text (invalid sequences replaced).
    Text(String),
    /// Raw bytes.
    Blob(Vec<u8>),
}

impl CellValue {
    /// Renders the value as a CSV field.
    ///
    /// `NULL` becomes an empty field and blobs become `0x` followed by hex.
    pub fn to_csv_field(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Integer(v) => v.to_string(),
            CellValue::Real(v) => v.to_string(),
            CellValue::Text(v) => v.clone(),
            CellValue::Blob(bytes) => format!("0x{}", hex::encode(bytes)),
        }
    }
}

impl From<ValueRef<'_>> for CellValue {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => CellValue::Null,
            ValueRef::Integer(v) => CellValue::Integer(v),
            ValueRef::Real(v) => CellValue::Real(v),
            ValueRef::Text(bytes) => CellValue::Text(String::from_utf8_lossy(bytes).into_owned()),
            ValueRef::Blob(bytes) => CellValue::Blob(bytes.to_vec()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => f.write_str("NULL"),
            CellValue::Integer(v) => write!(f, "{v}"),
            CellValue::Real(v) => write!(f, "{v}"),
            CellValue::Text(v) => write!(f, "'{}'", v.replace('\'', "\\'")),
            CellValue::Blob(bytes) => write!(f, "0x{}", hex::encode(bytes)),
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Null => serializer.serialize_none(),
            CellValue::Integer(v) => serializer.serialize_i64(*v),
            CellValue::Real(v) => serializer.serialize_f64(*v),
            CellValue::Text(v) => serializer.serialize_str(v),
            CellValue::Blob(bytes) => {
                serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
            }
        }
    }
}

/// Console form of one listed row: `(1, 'Ada', NULL)`.
pub struct RowDisplay<'a>(pub &'a [CellValue]);

impl fmt::Display for RowDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (idx, value) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{value}")?;
        }
        f.write_str(")")
    }
}
