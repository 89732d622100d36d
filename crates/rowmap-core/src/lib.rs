//! Rowmap core - metadata-driven mapping between rows and entities.
//!
//! Entity types register structured property declarations with a
//! [`MetadataRegistry`]; the [`EntityMapper`] uses the classified,
//! memoized metadata to hydrate entities from rows (following to-one and
//! to-many relations), apply flat column maps, and extract column maps
//! back out, with strict scalar coercion and optional value encryption
//! along the way.

pub mod cipher;
pub mod coerce;
pub mod config;
pub mod entity;
pub mod error;
pub mod mapper;
pub mod metadata;

pub use cipher::ValueCipher;
pub use coerce::coerce;
pub use config::MapperConfig;
pub use entity::{
    CollectionKey, Entity, EntityCollection, EntityObject, PropertyValue, downcast_entity,
};
pub use error::{MapError, PropertyAccessError};
pub use mapper::{ColumnMap, EntityMapper};
pub use metadata::{
    EntityMetadata, JoinDecl, MetadataRegistry, PropertyDecl, PropertyKind, PropertyMetadata,
    ScalarDecl, ScalarType,
};

/// Re-export boundary types.
pub use rowmap_types as types;
