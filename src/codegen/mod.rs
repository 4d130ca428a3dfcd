//! Rendering Projection
//!
//! The rendering layer never inspects raw schema nodes. It consumes one
//! `Region` per named definition: a read-only projection carrying the kind,
//! owning namespace, names, dependencies and enumerators the templates need.
//!
//! File layout, template rendering and formatting stay with the renderer.

pub mod names;

use serde::Serialize;
use std::collections::BTreeSet;

use crate::graph::resolve::namespace_segments;
use crate::graph::{PrimitiveKind, TypeDefinition, TypeGraph, TypeKind, TypeRef};
use names::{enumerator_identifier, to_snake_case};

// =============================================================================
// Region
// =============================================================================

/// A generated enumerator: schema value plus identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Enumerator {
    pub value: String,
    pub identifier: String,
}

/// What the renderer needs for one named definition
#[derive(Debug, Clone, Serialize)]
pub struct Region<'g> {
    /// The definition being rendered
    pub definition: &'g TypeDefinition,
    pub kind: TypeKind,
    pub namespace: String,
    pub namespace_segments: Vec<String>,
    pub name: String,
    /// Normalized name for files and symbols
    pub file_stem: String,
    /// Named types this definition mentions, sorted and deduplicated
    pub deps: Vec<TypeRef>,
    /// Primitive kinds this definition mentions
    pub primitives: Vec<PrimitiveKind>,
    /// Whether any field is optional
    pub uses_optional: bool,
    /// Enumerators, empty unless `kind` is `Enum`
    pub enumerators: Vec<Enumerator>,
}

impl<'g> Region<'g> {
    /// Project a named definition. Returns `None` for primitives, references
    /// and optionals, which the renderer never emits on their own.
    pub fn from_definition(definition: &'g TypeDefinition) -> Option<Self> {
        let this = definition.type_ref()?;
        if matches!(definition, TypeDefinition::Reference(_)) {
            return None;
        }

        let mut deps = BTreeSet::new();
        let mut primitives = BTreeSet::new();
        let mut uses_optional = false;
        for child in definition.children() {
            if child.is_optional() {
                uses_optional = true;
            }
            match child.unwrap_optional() {
                TypeDefinition::Primitive { primitive } => {
                    primitives.insert(*primitive);
                }
                other => {
                    if let Some(dep) = other.type_ref() {
                        deps.insert(dep);
                    }
                }
            }
        }

        let enumerators = match definition {
            TypeDefinition::Enum(e) => e
                .values
                .iter()
                .map(|value| Enumerator {
                    value: value.clone(),
                    identifier: enumerator_identifier(value),
                })
                .collect(),
            _ => Vec::new(),
        };

        Some(Self {
            definition,
            kind: definition.kind(),
            namespace_segments: namespace_segments(&this.namespace)
                .into_iter()
                .map(str::to_string)
                .collect(),
            file_stem: to_snake_case(&this.name),
            namespace: this.namespace,
            name: this.name,
            deps: deps.into_iter().collect(),
            primitives: primitives.into_iter().collect(),
            uses_optional,
            enumerators,
        })
    }
}

/// Regions for every named definition in the graph, in graph order
pub fn regions(graph: &TypeGraph) -> Vec<Region<'_>> {
    graph.types().filter_map(Region::from_definition).collect()
}
