//! The entity accessor contract.
//!
//! The mapper never touches entity storage directly: values flow through
//! [`EntityObject::set_property`] and [`EntityObject::get_property`].
//! Concrete entity types implement [`Entity`] to expose their type
//! identifier and property declarations to the registry.

use std::any::Any;
use std::collections::BTreeMap;

use rowmap_types::Value;

use crate::error::{MapError, PropertyAccessError};
use crate::metadata::PropertyDecl;

/// Dynamic accessor surface of a mapped entity instance.
pub trait EntityObject: Any {
    /// The entity-type identifier this instance belongs to.
    fn entity_type(&self) -> &str;

    /// Deliver a mapped value to the named property.
    fn set_property(
        &mut self,
        property: &str,
        value: PropertyValue,
    ) -> Result<(), PropertyAccessError>;

    /// Read the named column property back for extraction.
    fn get_property(&self, property: &str) -> Result<Value, PropertyAccessError>;

    /// Upcast for downcasting by reference.
    fn as_any(&self) -> &dyn Any;

    /// Upcast for downcasting by value.
    fn as_any_box(self: Box<Self>) -> Box<dyn Any>;
}

/// A registrable entity type.
///
/// `TYPE` is the identifier relation declarations refer to; it must be
/// unique within a registry. Declarations are returned in declaration
/// order, which the mapper preserves.
pub trait Entity: EntityObject + Default + Sized {
    /// Entity-type identifier.
    const TYPE: &'static str;

    /// Property declarations in declaration order.
    fn declarations() -> Vec<PropertyDecl>;
}

/// What a property setter receives.
pub enum PropertyValue {
    /// A coerced (and possibly decrypted) column value.
    Scalar(Value),
    /// A hydrated to-one relation, or `None` when no row joined.
    Reference(Option<Box<dyn EntityObject>>),
    /// A hydrated to-many relation.
    Collection(EntityCollection),
}

impl PropertyValue {
    /// Shape name for mismatch diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            PropertyValue::Scalar(_) => "scalar",
            PropertyValue::Reference(_) => "reference",
            PropertyValue::Collection(_) => "collection",
        }
    }

    /// Unwrap a scalar value.
    pub fn into_scalar(self) -> Option<Value> {
        match self {
            PropertyValue::Scalar(value) => Some(value),
            _ => None,
        }
    }

    /// Unwrap and downcast a reference value.
    ///
    /// Returns `Some(None)` for an unmatched join, `None` when the value
    /// is not a reference or the target type does not match.
    pub fn into_reference<E: Entity>(self) -> Option<Option<E>> {
        match self {
            PropertyValue::Reference(None) => Some(None),
            PropertyValue::Reference(Some(obj)) => downcast_entity::<E>(obj).ok().map(Some),
            _ => None,
        }
    }

    /// Unwrap a collection value.
    pub fn into_collection(self) -> Option<EntityCollection> {
        match self {
            PropertyValue::Collection(collection) => Some(collection),
            _ => None,
        }
    }
}

/// A hydrated to-many relation.
///
/// Related rows that all expose a usable unique key arrive keyed by it;
/// otherwise the collection preserves row order.
pub enum EntityCollection {
    /// Entities keyed by their row's unique key.
    Keyed(BTreeMap<CollectionKey, Box<dyn EntityObject>>),
    /// Entities in row-source order.
    Ordered(Vec<Box<dyn EntityObject>>),
}

impl std::fmt::Debug for EntityCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityCollection::Keyed(map) => f
                .debug_struct("Keyed")
                .field("keys", &map.keys().collect::<Vec<_>>())
                .field("len", &map.len())
                .finish(),
            EntityCollection::Ordered(entities) => f
                .debug_struct("Ordered")
                .field("len", &entities.len())
                .finish(),
        }
    }
}

impl EntityCollection {
    /// The empty collection delivered when relation following is off.
    pub fn empty() -> Self {
        EntityCollection::Ordered(Vec::new())
    }

    /// Number of contained entities.
    pub fn len(&self) -> usize {
        match self {
            EntityCollection::Keyed(map) => map.len(),
            EntityCollection::Ordered(entities) => entities.len(),
        }
    }

    /// Check if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Downcast every entity to `E`, discarding keys.
    ///
    /// Returns `None` if any element is of a different concrete type.
    pub fn into_entities<E: Entity>(self) -> Option<Vec<E>> {
        let objects: Vec<Box<dyn EntityObject>> = match self {
            EntityCollection::Keyed(map) => map.into_values().collect(),
            EntityCollection::Ordered(entities) => entities,
        };
        objects
            .into_iter()
            .map(|obj| downcast_entity::<E>(obj).ok())
            .collect()
    }

    /// Downcast to a keyed map of `E`.
    ///
    /// Returns `None` for ordered collections or on a type mismatch.
    pub fn into_keyed_entities<E: Entity>(self) -> Option<BTreeMap<CollectionKey, E>> {
        match self {
            EntityCollection::Keyed(map) => map
                .into_iter()
                .map(|(key, obj)| downcast_entity::<E>(obj).ok().map(|e| (key, e)))
                .collect(),
            EntityCollection::Ordered(_) => None,
        }
    }
}

/// Scalar key of a keyed collection entry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CollectionKey {
    /// Integer key.
    Int(i64),
    /// Text key.
    Text(String),
}

impl CollectionKey {
    /// Convert a row's unique-key value into a usable collection key.
    ///
    /// Bools index as 0/1; floats, timestamps and null are not usable
    /// keys and make the whole collection fall back to ordered form.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(i) => Some(CollectionKey::Int(*i)),
            Value::Bool(b) => Some(CollectionKey::Int(i64::from(*b))),
            Value::Text(s) => Some(CollectionKey::Text(s.clone())),
            _ => None,
        }
    }
}

impl From<i64> for CollectionKey {
    fn from(v: i64) -> Self {
        CollectionKey::Int(v)
    }
}

impl From<&str> for CollectionKey {
    fn from(v: &str) -> Self {
        CollectionKey::Text(v.to_string())
    }
}

/// Downcast a hydrated object to its concrete entity type.
pub fn downcast_entity<E: Entity>(obj: Box<dyn EntityObject>) -> Result<E, MapError> {
    let entity_type = obj.entity_type().to_string();
    obj.as_any_box()
        .downcast::<E>()
        .map(|boxed| *boxed)
        .map_err(|_| {
            MapError::Logic(format!(
                "hydrated \"{entity_type}\" cannot be downcast to \"{}\"",
                E::TYPE
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::ScalarType;

    #[derive(Debug, Default, PartialEq)]
    struct Probe {
        id: i64,
    }

    impl EntityObject for Probe {
        fn entity_type(&self) -> &str {
            Self::TYPE
        }

        fn set_property(
            &mut self,
            property: &str,
            value: PropertyValue,
        ) -> Result<(), PropertyAccessError> {
            match property {
                "id" => {
                    self.id = value
                        .into_scalar()
                        .and_then(|v| v.as_i64())
                        .ok_or_else(|| PropertyAccessError::TypeMismatch {
                            property: property.to_string(),
                            given: "non-int",
                        })?;
                    Ok(())
                }
                other => Err(PropertyAccessError::NoSuchProperty(other.to_string())),
            }
        }

        fn get_property(&self, property: &str) -> Result<Value, PropertyAccessError> {
            match property {
                "id" => Ok(Value::Int(self.id)),
                other => Err(PropertyAccessError::NoSuchProperty(other.to_string())),
            }
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_box(self: Box<Self>) -> Box<dyn Any> {
            self
        }
    }

    impl Entity for Probe {
        const TYPE: &'static str = "Probe";

        fn declarations() -> Vec<PropertyDecl> {
            vec![PropertyDecl::column("id", ScalarType::Int)]
        }
    }

    #[test]
    fn test_collection_key_conversion() {
        assert_eq!(
            CollectionKey::from_value(&Value::Int(3)),
            Some(CollectionKey::Int(3))
        );
        assert_eq!(
            CollectionKey::from_value(&Value::Bool(true)),
            Some(CollectionKey::Int(1))
        );
        assert_eq!(
            CollectionKey::from_value(&Value::Text("k".into())),
            Some(CollectionKey::Text("k".into()))
        );
        assert_eq!(CollectionKey::from_value(&Value::Float(1.5)), None);
        assert_eq!(CollectionKey::from_value(&Value::Null), None);
    }

    #[test]
    fn test_downcast_roundtrip() {
        let boxed: Box<dyn EntityObject> = Box::new(Probe { id: 9 });
        let probe = downcast_entity::<Probe>(boxed).unwrap();
        assert_eq!(probe, Probe { id: 9 });
    }

    #[test]
    fn test_collection_downcast() {
        let mut map: BTreeMap<CollectionKey, Box<dyn EntityObject>> = BTreeMap::new();
        map.insert(CollectionKey::Int(2), Box::new(Probe { id: 2 }));
        map.insert(CollectionKey::Int(1), Box::new(Probe { id: 1 }));

        let entities = EntityCollection::Keyed(map).into_entities::<Probe>().unwrap();
        assert_eq!(entities, vec![Probe { id: 1 }, Probe { id: 2 }]);

        assert!(EntityCollection::empty().is_empty());
        assert!(EntityCollection::empty()
            .into_keyed_entities::<Probe>()
            .is_none());
    }
}
