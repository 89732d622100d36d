//! Classified property metadata.

use std::collections::HashMap;

use super::decl::ScalarType;

/// Metadata for one mapped property. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyMetadata {
    /// Property identifier, unique within its entity type.
    pub name: String,
    /// How the property maps to row data.
    pub kind: PropertyKind,
}

/// The three ways a property maps to row data.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKind {
    /// A scalar column on the entity's own table.
    Column {
        /// Column name in the row source.
        column: String,
        /// Declared scalar type.
        scalar: ScalarType,
        /// Whether null is admissible.
        nullable: bool,
        /// Whether the stored value is encrypted.
        encrypted: bool,
    },
    /// A to-one relation resolved via a join lookup.
    Reference {
        local_key: String,
        foreign_key: String,
        /// Target entity type identifier.
        target: String,
    },
    /// A to-many relation resolved via a reverse join.
    Collection {
        local_key: String,
        foreign_key: String,
        /// Target entity type identifier.
        target: String,
        /// Opaque ordering clause passed through to the row source.
        order: Option<String>,
    },
}

impl PropertyMetadata {
    /// Check if this property maps to a scalar column.
    pub fn is_column(&self) -> bool {
        matches!(self.kind, PropertyKind::Column { .. })
    }

    /// Whether the property's column value is encrypted at rest.
    pub fn is_encrypted(&self) -> bool {
        matches!(
            self.kind,
            PropertyKind::Column {
                encrypted: true,
                ..
            }
        )
    }
}

/// Ordered property metadata for one entity type.
///
/// Built once per type on first use and shared for the registry's
/// lifetime; declaration order is preserved.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityMetadata {
    /// Entity type identifier.
    pub entity: String,
    /// Properties in declaration order.
    pub properties: Vec<PropertyMetadata>,
}

impl EntityMetadata {
    /// Get a property by name.
    pub fn get(&self, name: &str) -> Option<&PropertyMetadata> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Whether any column property is encrypted.
    pub fn has_encrypted(&self) -> bool {
        self.properties.iter().any(PropertyMetadata::is_encrypted)
    }

    /// Map from column name to column property, for flat-map hydration.
    pub fn column_index(&self) -> HashMap<&str, &PropertyMetadata> {
        self.properties
            .iter()
            .filter_map(|p| match &p.kind {
                PropertyKind::Column { column, .. } => Some((column.as_str(), p)),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EntityMetadata {
        EntityMetadata {
            entity: "Invoice".into(),
            properties: vec![
                PropertyMetadata {
                    name: "id".into(),
                    kind: PropertyKind::Column {
                        column: "id".into(),
                        scalar: ScalarType::Int,
                        nullable: false,
                        encrypted: false,
                    },
                },
                PropertyMetadata {
                    name: "iban".into(),
                    kind: PropertyKind::Column {
                        column: "iban".into(),
                        scalar: ScalarType::Text,
                        nullable: true,
                        encrypted: true,
                    },
                },
                PropertyMetadata {
                    name: "customer".into(),
                    kind: PropertyKind::Reference {
                        local_key: "customer_id".into(),
                        foreign_key: "id".into(),
                        target: "Customer".into(),
                    },
                },
            ],
        }
    }

    #[test]
    fn test_lookup_and_flags() {
        let metadata = sample();

        assert!(metadata.get("id").unwrap().is_column());
        assert!(metadata.get("iban").unwrap().is_encrypted());
        assert!(!metadata.get("customer").unwrap().is_column());
        assert!(metadata.get("missing").is_none());
        assert!(metadata.has_encrypted());
    }

    #[test]
    fn test_column_index_skips_relations() {
        let metadata = sample();
        let index = metadata.column_index();

        assert_eq!(index.len(), 2);
        assert_eq!(index["iban"].name, "iban");
        assert!(!index.contains_key("customer"));
    }
}
