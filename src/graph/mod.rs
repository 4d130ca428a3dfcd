//! Type Graph
//!
//! The resolved, in-memory result of compiling schema documents. One
//! `Namespace` per document, each owning a flat table of named definitions.
//! The aggregate `TypeGraph` is what the rendering layer consumes.
//!
//! Definitions are created in a single build pass and never mutated after.

pub mod builder;
pub mod diagnostics;
pub mod link;
pub mod loader;
pub mod patterns;
pub mod resolve;

pub use builder::{build_namespace, Builder};
pub use diagnostics::{DiagnosticCode, DiagnosticItem, Diagnostics, Severity};
pub use link::link;
pub use loader::{collect_inputs, load_document, load_documents, parse_document};
pub use patterns::{detect_shape, NodeShape, PrimitiveKind};
pub use resolve::resolve;

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Result, SchemaError};

// =============================================================================
// Type References
// =============================================================================

/// Symbolic pointer to a named type: local name plus owning namespace.
///
/// Never resolved to a definition by the builder; see `link` for the
/// optional post-load check.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeRef {
    pub name: String,
    pub namespace: String,
}

impl TypeRef {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.name)
    }
}

// =============================================================================
// Type Definitions
// =============================================================================

/// A field of an object, in declaration order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeDefinition,
}

/// An object with ordered fields
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectDef {
    pub namespace: String,
    pub name: String,
    pub fields: Vec<Field>,
}

impl ObjectDef {
    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A homogeneous array with exactly one item type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrayDef {
    pub namespace: String,
    pub name: String,
    pub item: Box<TypeDefinition>,
}

/// A closed set of named values, in declaration order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumDef {
    pub namespace: String,
    pub name: String,
    pub values: Vec<String>,
}

/// One node of the type graph
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeDefinition {
    Primitive { primitive: PrimitiveKind },
    Reference(TypeRef),
    Object(ObjectDef),
    Array(ArrayDef),
    Enum(EnumDef),
    /// Never wraps another `Optional`; construct through `TypeDefinition::optional`
    Optional { inner: Box<TypeDefinition> },
}

/// Kind tag of a definition, without payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Primitive,
    Reference,
    Object,
    Array,
    Enum,
    Optional,
}

impl TypeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primitive => "primitive",
            Self::Reference => "reference",
            Self::Object => "object",
            Self::Array => "array",
            Self::Enum => "enum",
            Self::Optional => "optional",
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TypeDefinition {
    /// Wrap a definition in `Optional`, rejecting double-optional.
    ///
    /// `node_path` names the offending node in the error.
    pub fn optional(inner: TypeDefinition, node_path: &str) -> Result<Self> {
        if inner.is_optional() {
            return Err(SchemaError::DoubleOptional {
                node_path: node_path.to_string(),
            });
        }
        Ok(TypeDefinition::Optional {
            inner: Box::new(inner),
        })
    }

    pub fn kind(&self) -> TypeKind {
        match self {
            Self::Primitive { .. } => TypeKind::Primitive,
            Self::Reference(_) => TypeKind::Reference,
            Self::Object(_) => TypeKind::Object,
            Self::Array(_) => TypeKind::Array,
            Self::Enum(_) => TypeKind::Enum,
            Self::Optional { .. } => TypeKind::Optional,
        }
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, Self::Optional { .. })
    }

    /// Strip one level of `Optional`, if any
    pub fn unwrap_optional(&self) -> &TypeDefinition {
        match self {
            Self::Optional { inner } => inner,
            other => other,
        }
    }

    /// Declared or synthesized name of a named definition (Object/Array/Enum)
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Object(o) => Some(&o.name),
            Self::Array(a) => Some(&a.name),
            Self::Enum(e) => Some(&e.name),
            _ => None,
        }
    }

    /// Owning namespace of a named definition or reference
    pub fn namespace(&self) -> Option<&str> {
        match self {
            Self::Object(o) => Some(&o.namespace),
            Self::Array(a) => Some(&a.namespace),
            Self::Enum(e) => Some(&e.namespace),
            Self::Reference(r) => Some(&r.namespace),
            _ => None,
        }
    }

    /// Pointer to this definition by name, for anything that has one
    pub fn type_ref(&self) -> Option<TypeRef> {
        match self {
            Self::Reference(r) => Some(r.clone()),
            _ => match (self.name(), self.namespace()) {
                (Some(name), Some(namespace)) => Some(TypeRef::new(name, namespace)),
                _ => None,
            },
        }
    }

    /// Visit the definitions directly referenced by this one
    /// (fields of an object, the item of an array, the inner of an optional)
    pub fn children(&self) -> Vec<&TypeDefinition> {
        match self {
            Self::Object(o) => o.fields.iter().map(|f| &f.ty).collect(),
            Self::Array(a) => vec![a.item.as_ref()],
            Self::Optional { inner } => vec![inner.as_ref()],
            _ => Vec::new(),
        }
    }
}

// =============================================================================
// Namespace
// =============================================================================

/// A named, flat collection of type definitions from one schema document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Namespace {
    pub name: String,
    /// SHA-256 of the document source, when loaded from a file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_digest: Option<String>,
    types: BTreeMap<String, TypeDefinition>,
}

impl Namespace {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source_digest: None,
            types: BTreeMap::new(),
        }
    }

    /// Register a named definition under its own name.
    ///
    /// Fails on a second registration of the same name.
    pub fn register(&mut self, definition: TypeDefinition) -> Result<()> {
        let Some(name) = definition.name() else {
            // Primitives, references and optionals are never registered
            return Ok(());
        };
        if self.types.contains_key(name) {
            return Err(SchemaError::DuplicateType {
                namespace: self.name.clone(),
                name: name.to_string(),
            });
        }
        tracing::debug!(namespace = %self.name, name, kind = %definition.kind(), "registered type");
        self.types.insert(name.to_string(), definition);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Named definitions in stable (name) order
    pub fn types(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.types.values()
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

// =============================================================================
// Type Graph
// =============================================================================

/// All namespaces loaded in one run, in load order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TypeGraph {
    namespaces: Vec<Namespace>,
}

impl TypeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a namespace. Each declared namespace name may appear once.
    pub fn insert(&mut self, namespace: Namespace) -> Result<()> {
        if self.namespace(&namespace.name).is_some() {
            return Err(SchemaError::DuplicateNamespace(namespace.name));
        }
        self.namespaces.push(namespace);
        Ok(())
    }

    pub fn namespace(&self, name: &str) -> Option<&Namespace> {
        self.namespaces.iter().find(|ns| ns.name == name)
    }

    pub fn namespaces(&self) -> &[Namespace] {
        &self.namespaces
    }

    /// Find the definition a reference points at, if it was loaded
    pub fn lookup(&self, target: &TypeRef) -> Option<&TypeDefinition> {
        self.namespace(&target.namespace)?.get(&target.name)
    }

    /// Every named definition: namespace order, then type-table order
    pub fn types(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.namespaces.iter().flat_map(|ns| ns.types())
    }

    pub fn type_count(&self) -> usize {
        self.namespaces.iter().map(Namespace::len).sum()
    }

    /// SHA-256 over the canonical JSON form of the graph.
    ///
    /// Equal inputs in equal order give equal fingerprints.
    pub fn fingerprint(&self) -> Result<String> {
        let canonical = serde_json::to_vec(self)?;
        let mut hasher = Sha256::new();
        hasher.update(&canonical);
        Ok(format!("{:x}", hasher.finalize()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string() -> TypeDefinition {
        TypeDefinition::Primitive {
            primitive: PrimitiveKind::String,
        }
    }

    #[test]
    fn test_optional_rejects_optional() {
        let once = TypeDefinition::optional(string(), "Point.label").unwrap();
        assert!(once.is_optional());
        assert_eq!(once.unwrap_optional(), &string());

        let err = TypeDefinition::optional(once, "Point.label").unwrap_err();
        assert!(matches!(err, SchemaError::DoubleOptional { ref node_path } if node_path == "Point.label"));
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let mut ns = Namespace::new("geo");
        let color = TypeDefinition::Enum(EnumDef {
            namespace: "geo".to_string(),
            name: "Color".to_string(),
            values: vec!["red".to_string()],
        });
        ns.register(color.clone()).unwrap();
        let err = ns.register(color).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateType { ref name, .. } if name == "Color"));
        assert_eq!(ns.len(), 1);
    }

    #[test]
    fn test_register_skips_unnamed() {
        let mut ns = Namespace::new("geo");
        ns.register(string()).unwrap();
        ns.register(TypeDefinition::Reference(TypeRef::new("T", "geo"))).unwrap();
        assert!(ns.is_empty());
    }

    #[test]
    fn test_graph_rejects_duplicate_namespace() {
        let mut graph = TypeGraph::new();
        graph.insert(Namespace::new("geo")).unwrap();
        let err = graph.insert(Namespace::new("geo")).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateNamespace(ref n) if n == "geo"));
    }

    #[test]
    fn test_type_ref_display() {
        assert_eq!(TypeRef::new("T", "pkg.b").to_string(), "pkg.b.T");
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let mut graph = TypeGraph::new();
        graph.insert(Namespace::new("geo")).unwrap();
        let a = graph.fingerprint().unwrap();
        let b = graph.clone().fingerprint().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }
}
