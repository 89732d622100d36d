//! The shared metadata registry.
//!
//! Entity types are registered up front; their metadata is built lazily
//! on first use and memoized for the registry's lifetime. The registry is
//! an explicitly constructed, injected component — typically one
//! `Arc<MetadataRegistry>` per mapper — never ambient global state.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use super::build::build_metadata;
use super::decl::PropertyDecl;
use super::property::EntityMetadata;
use crate::entity::{Entity, EntityObject};
use crate::error::MapError;

struct EntitySpec {
    decls: Vec<PropertyDecl>,
    construct: fn() -> Box<dyn EntityObject>,
}

fn construct_boxed<E: Entity>() -> Box<dyn EntityObject> {
    Box::new(E::default())
}

/// Registry of entity specs and their memoized metadata.
#[derive(Default)]
pub struct MetadataRegistry {
    specs: DashMap<String, EntitySpec>,
    built: DashMap<String, Arc<EntityMetadata>>,
}

impl MetadataRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity type.
    ///
    /// Re-registering a type replaces its spec for future builds but
    /// never mutates metadata that was already built.
    pub fn register<E: Entity>(&self) {
        self.specs.insert(
            E::TYPE.to_string(),
            EntitySpec {
                decls: E::declarations(),
                construct: construct_boxed::<E>,
            },
        );
    }

    /// Builder-style registration for construction chains.
    pub fn with_entity<E: Entity>(self) -> Self {
        self.register::<E>();
        self
    }

    /// Check if an entity type is registered.
    pub fn is_registered(&self, entity: &str) -> bool {
        self.specs.contains_key(entity)
    }

    /// Get the metadata for an entity type, building it on first access.
    ///
    /// The build is a pure function of the registered spec, so racing
    /// first-access builders are allowed: whichever result lands in the
    /// cache first wins and every caller converges on an equal value.
    pub fn metadata(&self, entity: &str) -> Result<Arc<EntityMetadata>, MapError> {
        if let Some(found) = self.built.get(entity) {
            return Ok(Arc::clone(&found));
        }

        let decls = {
            let spec = self
                .specs
                .get(entity)
                .ok_or_else(|| MapError::UnknownEntity(entity.to_string()))?;
            spec.decls.clone()
        };
        let metadata = Arc::new(build_metadata(entity, &decls, &|target| {
            self.specs.contains_key(target)
        })?);
        debug!(
            entity,
            properties = metadata.properties.len(),
            "built entity metadata"
        );

        let entry = self.built.entry(entity.to_string()).or_insert(metadata);
        Ok(Arc::clone(entry.value()))
    }

    /// Construct a fresh instance of the named entity type.
    pub(crate) fn instantiate(&self, entity: &str) -> Result<Box<dyn EntityObject>, MapError> {
        let spec = self
            .specs
            .get(entity)
            .ok_or_else(|| MapError::UnknownEntity(entity.to_string()))?;
        Ok((spec.construct)())
    }
}
