//! The row source contract.
//!
//! A [`Row`] is one record exposed by the underlying data-access layer.
//! The mapping engine consumes rows through this trait only; connection
//! handling, SQL execution, and ordering semantics stay on the
//! implementor's side of the boundary.

use std::collections::HashMap;

use crate::value::Value;

/// A single record exposed by the underlying data-access layer.
pub trait Row {
    /// Scalar value of the named column.
    ///
    /// Returns [`Value::Null`] for SQL NULL and for columns the row does
    /// not carry.
    fn column(&self, name: &str) -> Value;

    /// Scalar key uniquely identifying this row within its table, if the
    /// row source exposes one. Related rows that all expose a usable key
    /// are delivered to collection setters as a keyed mapping.
    fn unique_key(&self) -> Option<Value> {
        None
    }

    /// Join navigation from this row, when the row source supports it.
    ///
    /// Row sources without relation support return `None`; hydrating a
    /// reference or collection property against such a row is an error.
    fn relations(&self) -> Option<&dyn RowRelations> {
        None
    }
}

/// Join navigation from one row to rows of related tables.
pub trait RowRelations {
    /// The single row joined via `local_key` on this row and
    /// `foreign_key` on the target table, if any.
    fn referenced_row(&self, local_key: &str, foreign_key: &str) -> Option<Box<dyn Row>>;

    /// Rows of the related table whose `foreign_key` points back at this
    /// row's `local_key`, in row-source order. `order` is an opaque
    /// ordering clause passed through unchanged.
    fn related_rows(
        &self,
        local_key: &str,
        foreign_key: &str,
        order: Option<&str>,
    ) -> Vec<Box<dyn Row>>;
}

/// A map-backed [`Row`] with no relation support.
///
/// Useful for tests and for flat sources that have already been fetched
/// into memory.
#[derive(Debug, Clone, Default)]
pub struct MapRow {
    columns: HashMap<String, Value>,
}

impl MapRow {
    /// Create an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column value.
    pub fn with_column(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.columns.insert(name.into(), value.into());
        self
    }
}

impl From<HashMap<String, Value>> for MapRow {
    fn from(columns: HashMap<String, Value>) -> Self {
        Self { columns }
    }
}

impl Row for MapRow {
    fn column(&self, name: &str) -> Value {
        self.columns.get(name).cloned().unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_row_columns() {
        let row = MapRow::new()
            .with_column("id", 7i64)
            .with_column("name", "Alice");

        assert_eq!(row.column("id"), Value::Int(7));
        assert_eq!(row.column("name"), Value::Text("Alice".into()));
        assert_eq!(row.column("missing"), Value::Null);
    }

    #[test]
    fn test_map_row_has_no_relations() {
        let row = MapRow::new();
        assert!(row.relations().is_none());
        assert!(row.unique_key().is_none());
    }
}
