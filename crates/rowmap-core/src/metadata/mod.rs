//! Entity metadata: declarations, classification, and the shared registry.

mod build;
mod decl;
mod property;
mod registry;

pub use decl::{JoinDecl, PropertyDecl, ScalarDecl, ScalarType};
pub use property::{EntityMetadata, PropertyKind, PropertyMetadata};
pub use registry::MetadataRegistry;
