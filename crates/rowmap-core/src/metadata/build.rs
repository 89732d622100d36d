//! Declaration classification and validation.

use std::collections::HashSet;

use convert_case::{Case, Casing};

use super::decl::PropertyDecl;
use super::property::{EntityMetadata, PropertyKind, PropertyMetadata};
use crate::error::MapError;

/// Build validated metadata from an entity type's declarations.
///
/// `resolves` reports whether a relation target type is registered.
/// Transient declarations are skipped; everything else must classify or
/// the whole build fails.
pub(crate) fn build_metadata(
    entity: &str,
    decls: &[PropertyDecl],
    resolves: &dyn Fn(&str) -> bool,
) -> Result<EntityMetadata, MapError> {
    let mut properties = Vec::with_capacity(decls.len());
    let mut seen = HashSet::new();

    for decl in decls {
        if decl.transient {
            continue;
        }
        if !seen.insert(decl.name.as_str()) {
            return Err(metadata_error(entity, &decl.name, "duplicate property name"));
        }
        properties.push(classify(entity, decl, resolves)?);
    }

    Ok(EntityMetadata {
        entity: entity.to_string(),
        properties,
    })
}

/// Classify one declaration into column/reference/collection metadata.
///
/// Precedence: reference, then related, then plain column. A declaration
/// with no recognized facet is an error, never a silently-skipped
/// property.
fn classify(
    entity: &str,
    decl: &PropertyDecl,
    resolves: &dyn Fn(&str) -> bool,
) -> Result<PropertyMetadata, MapError> {
    if let Some(join) = &decl.reference {
        if !join.is_complete() {
            return Err(metadata_error(
                entity,
                &decl.name,
                "reference declaration with incomplete join-column pair",
            ));
        }
        let target = resolve_target(entity, decl, resolves)?;
        return Ok(PropertyMetadata {
            name: decl.name.clone(),
            kind: PropertyKind::Reference {
                local_key: join.local_key.clone(),
                foreign_key: join.foreign_key.clone(),
                target,
            },
        });
    }

    if let Some(join) = &decl.related {
        if !join.is_complete() {
            return Err(metadata_error(
                entity,
                &decl.name,
                "related declaration with incomplete join-column pair",
            ));
        }
        let target = resolve_target(entity, decl, resolves)?;
        return Ok(PropertyMetadata {
            name: decl.name.clone(),
            kind: PropertyKind::Collection {
                local_key: join.local_key.clone(),
                foreign_key: join.foreign_key.clone(),
                target,
                order: decl.order.clone(),
            },
        });
    }

    if let Some(scalar) = decl.scalar {
        let column = decl
            .column
            .clone()
            .unwrap_or_else(|| decl.name.to_case(Case::Snake));
        return Ok(PropertyMetadata {
            name: decl.name.clone(),
            kind: PropertyKind::Column {
                column,
                scalar: scalar.scalar,
                nullable: scalar.nullable,
                encrypted: decl.encrypted,
            },
        });
    }

    if decl.target.is_some() {
        return Err(metadata_error(
            entity,
            &decl.name,
            "entity-typed property without a reference or related declaration",
        ));
    }

    Err(metadata_error(
        entity,
        &decl.name,
        "no recognized type or relation declaration",
    ))
}

/// Resolve the declared target type, stripping a trailing `[]` container
/// marker, and require it to be registered.
fn resolve_target(
    entity: &str,
    decl: &PropertyDecl,
    resolves: &dyn Fn(&str) -> bool,
) -> Result<String, MapError> {
    let target = decl.target.as_deref().unwrap_or("");
    let target = target.strip_suffix("[]").unwrap_or(target);
    if target.is_empty() {
        return Err(metadata_error(
            entity,
            &decl.name,
            "relation declaration without a target type",
        ));
    }
    if !resolves(target) {
        return Err(metadata_error(
            entity,
            &decl.name,
            format!("target type \"{target}\" is not registered"),
        ));
    }
    Ok(target.to_string())
}

fn metadata_error(entity: &str, property: &str, reason: impl Into<String>) -> MapError {
    MapError::Metadata {
        entity: entity.to_string(),
        property: property.to_string(),
        reason: reason.into(),
    }
}
