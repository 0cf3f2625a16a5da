use std::fmt;

use crate::db::error::{DbError, Result};

/// A table reference that has been validated and quoted for SQL text.
///
/// Operator input never reaches a statement unquoted: `main.users` becomes
/// `"main"."users"` and embedded double quotes are doubled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableName {
    raw: String,
    quoted: String,
}

impl TableName {
    /// Validates `name` and builds its quoted form.
    ///
    /// A single `.` separating two non-empty parts is read as `schema.table`;
    /// anything else is taken as one identifier.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidIdentifier`] for empty names, names with
    /// surrounding whitespace, or names containing NUL.
    pub fn parse(name: &str) -> Result<Self> {
        check_identifier(name)?;
        let quoted = match name.split_once('.') {
            Some((schema, table))
                if !schema.is_empty() && !table.is_empty() && !table.contains('.') =>
            {
                format!("{}.{}", quote(schema), quote(table))
            }
            _ => quote(name),
        };
        Ok(Self {
            raw: name.to_string(),
            quoted,
        })
    }

    /// The quoted form to splice into SQL text.
    pub fn quoted(&self) -> &str {
        &self.quoted
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Quotes a column name for SQL text.
///
/// # Errors
///
/// Same rules as [`TableName::parse`], except dots are never split.
pub fn quote_column(name: &str) -> Result<String> {
    check_identifier(name)?;
    Ok(quote(name))
}

fn check_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(DbError::invalid_identifier(name, "name is empty"));
    }
    if name.trim() != name {
        return Err(DbError::invalid_identifier(
            name,
            "name has leading or trailing whitespace",
        ));
    }
    if name.contains('\0') {
        return Err(DbError::invalid_identifier(name, "name contains NUL"));
    }
    Ok(())
}

fn quote(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}
