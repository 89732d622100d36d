//! Mapping error types.

use thiserror::Error;

/// Errors surfaced by the mapping engine.
///
/// No error is caught and retried inside the core: every failure aborts
/// the current hydrate/extract call and carries enough context (entity
/// type, property, column) to diagnose the schema mismatch.
#[derive(Debug, Error)]
pub enum MapError {
    /// A property's declarations cannot be classified, or a relation
    /// target/join spec is invalid.
    #[error("metadata error for {entity}.{property}: {reason}")]
    Metadata {
        entity: String,
        property: String,
        reason: String,
    },

    /// Operation on an entity type that was never registered.
    #[error("unknown entity type \"{0}\"")]
    UnknownEntity(String),

    /// A raw value cannot be cast to its declared scalar type.
    #[error("column \"{column}\": cannot coerce {value} to {target}")]
    Coercion {
        column: String,
        target: &'static str,
        value: String,
    },

    /// Encryption or decryption requested with no passphrase configured.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A configured cipher failed to process a value.
    #[error("cipher error: {0}")]
    Cipher(String),

    /// A relation property used against a row source without relation
    /// navigation, or an extract call with no readable accessor.
    #[error("{0}")]
    Logic(String),

    /// The entity instance lacks or rejects the setter for a mapped
    /// property.
    #[error("undefined property {entity}.{property}")]
    UndefinedProperty {
        entity: String,
        property: String,
        #[source]
        source: PropertyAccessError,
    },

    /// Relation traversal exceeded the configured depth bound.
    #[error("relation recursion limit ({depth}) reached while hydrating \"{entity}\"")]
    RecursionLimit { entity: String, depth: usize },
}

/// Failure reported by an entity's accessor surface.
#[derive(Debug, Error)]
pub enum PropertyAccessError {
    /// The entity does not implement the named property.
    #[error("no accessor for property \"{0}\"")]
    NoSuchProperty(String),

    /// The accessor exists but cannot accept the delivered value shape.
    #[error("property \"{property}\" cannot accept a {given} value")]
    TypeMismatch {
        property: String,
        given: &'static str,
    },
}
