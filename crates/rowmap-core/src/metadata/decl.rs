//! Property declarations registered by entity types.
//!
//! Declarations are the structured input to metadata extraction: each
//! entity type registers one [`PropertyDecl`] per declared property, in
//! declaration order. Extraction classifies and validates them once; the
//! result is cached for the registry's lifetime.

use serde::{Deserialize, Serialize};

/// Scalar column types understood by the coercer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScalarType {
    /// Boolean value.
    Bool,
    /// 64-bit signed integer.
    Int,
    /// 64-bit floating point.
    Float,
    /// UTF-8 string.
    Text,
    /// Date/time value, passed through uncoerced.
    Temporal,
}

impl ScalarType {
    /// Lowercase name for error messages.
    pub fn name(&self) -> &'static str {
        match self {
            ScalarType::Bool => "bool",
            ScalarType::Int => "int",
            ScalarType::Float => "float",
            ScalarType::Text => "text",
            ScalarType::Temporal => "temporal",
        }
    }
}

/// Scalar type declaration for a column property.
///
/// Nullability is tracked separately from the type itself: a declaration
/// may permit null alongside the authoritative scalar type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalarDecl {
    /// The authoritative scalar type.
    pub scalar: ScalarType,
    /// Whether null is an admissible value.
    pub nullable: bool,
}

/// Join-column pair for a relation declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinDecl {
    /// Column on this entity's side of the join.
    pub local_key: String,
    /// Column on the target table's side of the join.
    pub foreign_key: String,
}

impl JoinDecl {
    /// Create a join pair.
    pub fn new(local_key: impl Into<String>, foreign_key: impl Into<String>) -> Self {
        Self {
            local_key: local_key.into(),
            foreign_key: foreign_key.into(),
        }
    }

    pub(crate) fn is_complete(&self) -> bool {
        !self.local_key.is_empty() && !self.foreign_key.is_empty()
    }
}

/// One declared property of an entity type, before classification.
///
/// The builder constructors cover the well-formed shapes; the facet
/// setters allow any combination, leaving validation to extraction.
#[derive(Debug, Clone)]
pub struct PropertyDecl {
    pub(crate) name: String,
    pub(crate) scalar: Option<ScalarDecl>,
    pub(crate) target: Option<String>,
    pub(crate) reference: Option<JoinDecl>,
    pub(crate) related: Option<JoinDecl>,
    pub(crate) column: Option<String>,
    pub(crate) order: Option<String>,
    pub(crate) encrypted: bool,
    pub(crate) transient: bool,
}

impl PropertyDecl {
    /// Create a bare declaration with no facets.
    ///
    /// Extraction rejects it unless facets are added; this is the escape
    /// hatch for building declarations programmatically.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scalar: None,
            target: None,
            reference: None,
            related: None,
            column: None,
            order: None,
            encrypted: false,
            transient: false,
        }
    }

    /// Declare a column property of the given scalar type.
    pub fn column(name: impl Into<String>, scalar: ScalarType) -> Self {
        Self::new(name).with_scalar(scalar)
    }

    /// Declare a to-one relation resolved via a join-column pair.
    pub fn reference(
        name: impl Into<String>,
        local_key: impl Into<String>,
        foreign_key: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        let mut decl = Self::new(name);
        decl.reference = Some(JoinDecl::new(local_key, foreign_key));
        decl.target = Some(target.into());
        decl
    }

    /// Declare a to-many relation resolved via a reverse join.
    pub fn collection(
        name: impl Into<String>,
        local_key: impl Into<String>,
        foreign_key: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        let mut decl = Self::new(name);
        decl.related = Some(JoinDecl::new(local_key, foreign_key));
        decl.target = Some(target.into());
        decl
    }

    /// Declare a property the mapper must skip entirely.
    pub fn transient(name: impl Into<String>) -> Self {
        let mut decl = Self::new(name);
        decl.transient = true;
        decl
    }

    /// Set the scalar type facet.
    pub fn with_scalar(mut self, scalar: ScalarType) -> Self {
        self.scalar = Some(ScalarDecl {
            scalar,
            nullable: self.scalar.map(|s| s.nullable).unwrap_or(false),
        });
        self
    }

    /// Mark null as admissible alongside the scalar type.
    pub fn nullable(mut self) -> Self {
        if let Some(scalar) = self.scalar.as_mut() {
            scalar.nullable = true;
        }
        self
    }

    /// Set the entity target type facet.
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Set the reference join facet.
    pub fn with_reference(
        mut self,
        local_key: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Self {
        self.reference = Some(JoinDecl::new(local_key, foreign_key));
        self
    }

    /// Set the related join facet.
    pub fn with_related(
        mut self,
        local_key: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Self {
        self.related = Some(JoinDecl::new(local_key, foreign_key));
        self
    }

    /// Override the default snake-cased column name.
    pub fn with_column_name(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    /// Set the ordering clause passed through to the row source.
    pub fn with_order(mut self, order: impl Into<String>) -> Self {
        self.order = Some(order.into());
        self
    }

    /// Mark the column value as encrypted at rest.
    pub fn encrypted(mut self) -> Self {
        self.encrypted = true;
        self
    }

    /// The declared property name.
    pub fn name(&self) -> &str {
        &self.name
    }
}
