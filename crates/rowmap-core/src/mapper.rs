//! The mapping engine: hydration, flat-map hydration, and extraction.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::trace;

use rowmap_types::{Row, RowRelations, Value};

use crate::cipher::ValueCipher;
use crate::coerce::coerce;
use crate::config::MapperConfig;
use crate::entity::{
    CollectionKey, Entity, EntityCollection, EntityObject, PropertyValue, downcast_entity,
};
use crate::error::MapError;
use crate::metadata::{MetadataRegistry, PropertyKind};

/// A flat, column-keyed value map. Result ordering is unspecified.
pub type ColumnMap = HashMap<String, Value>;

/// Maps rows to entities and back using registered metadata.
///
/// The mapper owns no state beyond the injected registry and the cipher
/// derived from its configuration; every call builds its own entity
/// graph.
pub struct EntityMapper {
    registry: Arc<MetadataRegistry>,
    cipher: ValueCipher,
    max_depth: usize,
}

impl EntityMapper {
    /// Create a mapper over a registry.
    pub fn new(registry: Arc<MetadataRegistry>, config: MapperConfig) -> Self {
        let cipher = ValueCipher::from_passphrase(config.passphrase.as_deref());
        Self {
            registry,
            cipher,
            max_depth: config.max_depth,
        }
    }

    /// The injected metadata registry.
    pub fn registry(&self) -> &Arc<MetadataRegistry> {
        &self.registry
    }

    /// Hydrate an entity from a row, following relations.
    pub fn hydrate<E: Entity>(&self, row: &dyn Row) -> Result<E, MapError> {
        self.hydrate_with(row, true)
    }

    /// Hydrate an entity from a row.
    ///
    /// With `follow_relations` off, collection properties are set to
    /// empty collections without querying the row source. Reference
    /// properties are always resolved.
    pub fn hydrate_with<E: Entity>(
        &self,
        row: &dyn Row,
        follow_relations: bool,
    ) -> Result<E, MapError> {
        let obj = self.hydrate_dyn(E::TYPE, row, follow_relations)?;
        downcast_entity(obj)
    }

    /// Hydrate an entity by type identifier.
    pub fn hydrate_dyn(
        &self,
        entity: &str,
        row: &dyn Row,
        follow_relations: bool,
    ) -> Result<Box<dyn EntityObject>, MapError> {
        trace!(entity, follow_relations, "hydrating entity");
        self.hydrate_guarded(entity, row, follow_relations, 0)
    }

    fn hydrate_guarded(
        &self,
        entity: &str,
        row: &dyn Row,
        follow: bool,
        depth: usize,
    ) -> Result<Box<dyn EntityObject>, MapError> {
        if depth > self.max_depth {
            return Err(MapError::RecursionLimit {
                entity: entity.to_string(),
                depth,
            });
        }

        let metadata = self.registry.metadata(entity)?;
        // Surface a missing passphrase before any setter runs.
        if metadata.has_encrypted() {
            self.cipher.ensure_configured()?;
        }

        let mut obj = self.registry.instantiate(entity)?;
        for property in &metadata.properties {
            let value = match &property.kind {
                PropertyKind::Column {
                    column,
                    scalar,
                    encrypted,
                    ..
                } => {
                    let mut value = coerce(row.column(column), *scalar, column)?;
                    if *encrypted {
                        value = self.cipher.decrypt(&value)?;
                    }
                    PropertyValue::Scalar(value)
                }
                PropertyKind::Reference {
                    local_key,
                    foreign_key,
                    target,
                } => {
                    let relations = require_relations(row, entity, &property.name)?;
                    match relations.referenced_row(local_key, foreign_key) {
                        Some(joined) => {
                            let nested =
                                self.hydrate_guarded(target, joined.as_ref(), true, depth + 1)?;
                            PropertyValue::Reference(Some(nested))
                        }
                        None => PropertyValue::Reference(None),
                    }
                }
                PropertyKind::Collection {
                    local_key,
                    foreign_key,
                    target,
                    order,
                } => {
                    let relations = require_relations(row, entity, &property.name)?;
                    if follow {
                        let rows =
                            relations.related_rows(local_key, foreign_key, order.as_deref());
                        let collection = self.hydrate_collection(target, rows, follow, depth)?;
                        PropertyValue::Collection(collection)
                    } else {
                        PropertyValue::Collection(EntityCollection::empty())
                    }
                }
            };

            obj.set_property(&property.name, value)
                .map_err(|source| MapError::UndefinedProperty {
                    entity: entity.to_string(),
                    property: property.name.clone(),
                    source,
                })?;
        }

        Ok(obj)
    }

    /// Hydrate related rows into a keyed or ordered collection.
    ///
    /// The collection is keyed only when every related row yields a
    /// usable unique key; later duplicate keys overwrite earlier ones.
    fn hydrate_collection(
        &self,
        target: &str,
        rows: Vec<Box<dyn Row>>,
        follow: bool,
        depth: usize,
    ) -> Result<EntityCollection, MapError> {
        let mut hydrated = Vec::with_capacity(rows.len());
        for row in &rows {
            let key = row.unique_key().and_then(|k| CollectionKey::from_value(&k));
            let entity = self.hydrate_guarded(target, row.as_ref(), follow, depth + 1)?;
            hydrated.push((key, entity));
        }

        let all_keyed = !hydrated.is_empty() && hydrated.iter().all(|(key, _)| key.is_some());
        if all_keyed {
            let mut map = BTreeMap::new();
            for (key, entity) in hydrated {
                if let Some(key) = key {
                    map.insert(key, entity);
                }
            }
            Ok(EntityCollection::Keyed(map))
        } else {
            Ok(EntityCollection::Ordered(
                hydrated.into_iter().map(|(_, entity)| entity).collect(),
            ))
        }
    }

    /// Hydrate a fresh entity from a flat column map.
    ///
    /// Only column properties participate; map keys matching no known
    /// column are silently ignored (partial-update contract). Encrypted
    /// properties are encrypted on write.
    pub fn hydrate_from_map<E: Entity>(&self, values: &ColumnMap) -> Result<E, MapError> {
        let mut entity = E::default();
        self.apply_map(&mut entity, values, true)?;
        Ok(entity)
    }

    /// Apply a flat column map to an existing entity in place.
    pub fn apply_map(
        &self,
        entity: &mut dyn EntityObject,
        values: &ColumnMap,
        encrypt_on_write: bool,
    ) -> Result<(), MapError> {
        let entity_type = entity.entity_type().to_string();
        let metadata = self.registry.metadata(&entity_type)?;
        let columns = metadata.column_index();

        for (key, raw) in values {
            let Some(property) = columns.get(key.as_str()) else {
                continue;
            };
            let PropertyKind::Column {
                column,
                scalar,
                encrypted,
                ..
            } = &property.kind
            else {
                continue;
            };

            // Encryption sees the pre-coercion value.
            let mut value = raw.clone();
            if encrypt_on_write && *encrypted {
                value = self.cipher.encrypt(&value)?;
            }
            let value = coerce(value, *scalar, column)?;

            entity
                .set_property(&property.name, PropertyValue::Scalar(value))
                .map_err(|source| MapError::UndefinedProperty {
                    entity: entity_type.clone(),
                    property: property.name.clone(),
                    source,
                })?;
        }

        Ok(())
    }

    /// Extract a flat column map from an entity, encrypting on read.
    pub fn extract(&self, entity: &dyn EntityObject) -> Result<ColumnMap, MapError> {
        self.extract_with(entity, &[], true)
    }

    /// Extract a flat column map from an entity.
    ///
    /// Properties named in `ignored` are skipped; reference and
    /// collection properties are never extracted.
    pub fn extract_with(
        &self,
        entity: &dyn EntityObject,
        ignored: &[&str],
        encrypt_on_read: bool,
    ) -> Result<ColumnMap, MapError> {
        let entity_type = entity.entity_type().to_string();
        let metadata = self.registry.metadata(&entity_type)?;

        let mut values = ColumnMap::new();
        for property in &metadata.properties {
            if ignored.contains(&property.name.as_str()) {
                continue;
            }
            let PropertyKind::Column {
                column, encrypted, ..
            } = &property.kind
            else {
                continue;
            };

            let value = entity.get_property(&property.name).map_err(|source| {
                MapError::Logic(format!(
                    "no readable accessor for {entity_type}.{}: {source}",
                    property.name
                ))
            })?;
            let value = if encrypt_on_read && *encrypted {
                self.cipher.encrypt(&value)?
            } else {
                value
            };
            values.insert(column.clone(), value);
        }

        Ok(values)
    }
}

fn require_relations<'a>(
    row: &'a dyn Row,
    entity: &str,
    property: &str,
) -> Result<&'a dyn RowRelations, MapError> {
    row.relations().ok_or_else(|| {
        MapError::Logic(format!(
            "row source for {entity}.{property} does not support relation navigation"
        ))
    })
}
