//! Type Graph Construction
//!
//! Recursive descent over schema nodes. Each node is classified once by
//! `detect_shape` and turned into a `TypeDefinition`; every named result
//! (object, array, enum) is registered in the namespace being built.
//!
//! Anonymous nested types get deterministic names derived from their parent:
//! - object field `label` of `Point` -> `PointLabel`
//! - array item of `Path` -> `PathItem`
//!
//! The namespace is passed explicitly; nothing is shared between documents.

use serde_yaml::{Mapping, Sequence, Value};
use std::collections::HashSet;

use super::patterns::{describe_node, detect_shape, NodeShape, PrimitiveKind};
use super::resolve::{resolve, PATH_SEPARATOR};
use super::{ArrayDef, EnumDef, Field, Namespace, ObjectDef, TypeDefinition};
use crate::codegen::names::child_type_name;
use crate::error::{Result, SchemaError};

/// Suffix marking an optional field
pub const OPTIONAL_MARKER: char = '?';

/// Suffix of a synthesized array item type
pub const ITEM_SUFFIX: &str = "Item";

/// Builds definitions into one namespace
pub struct Builder<'ns> {
    namespace: &'ns mut Namespace,
}

impl<'ns> Builder<'ns> {
    pub fn new(namespace: &'ns mut Namespace) -> Self {
        Self { namespace }
    }

    /// Build `node` with `name` as registration key and naming seed
    pub fn build(&mut self, name: &str, node: &Value) -> Result<TypeDefinition> {
        self.build_at(name, node, name)
    }

    fn build_at(&mut self, name: &str, node: &Value, node_path: &str) -> Result<TypeDefinition> {
        let shape = detect_shape(node).map_err(|found| SchemaError::UnsupportedNode {
            node_path: node_path.to_string(),
            found,
        })?;

        match shape {
            NodeShape::Enum(values) => self.build_enum(name, values, node_path),
            NodeShape::Structure(inner) => self.build_at(name, inner, node_path),
            NodeShape::Scalar(scalar) => self.build_scalar(scalar, node_path),
            NodeShape::Object(fields) => self.build_object(name, fields, node_path),
            NodeShape::Array(items) => self.build_array(name, items, node_path),
        }
    }

    fn build_enum(&mut self, name: &str, values: &Sequence, node_path: &str) -> Result<TypeDefinition> {
        let mut seen = HashSet::with_capacity(values.len());
        let mut names = Vec::with_capacity(values.len());

        for value in values {
            let Value::String(value) = value else {
                return Err(SchemaError::UnsupportedNode {
                    node_path: node_path.to_string(),
                    found: format!("enum value {}", describe_node(value)),
                });
            };
            if !seen.insert(value.as_str()) {
                return Err(SchemaError::DuplicateEnumValue {
                    node_path: node_path.to_string(),
                    value: value.clone(),
                });
            }
            names.push(value.clone());
        }

        self.register(TypeDefinition::Enum(EnumDef {
            namespace: self.namespace.name.clone(),
            name: name.to_string(),
            values: names,
        }))
    }

    fn build_scalar(&mut self, scalar: &str, node_path: &str) -> Result<TypeDefinition> {
        if let Some(primitive) = PrimitiveKind::from_keyword(scalar) {
            return Ok(TypeDefinition::Primitive { primitive });
        }

        if scalar.split(PATH_SEPARATOR).any(str::is_empty) {
            return Err(SchemaError::InvalidReference {
                node_path: node_path.to_string(),
                reference: scalar.to_string(),
            });
        }

        Ok(TypeDefinition::Reference(resolve(&self.namespace.name, scalar)))
    }

    fn build_object(&mut self, name: &str, fields: &Mapping, node_path: &str) -> Result<TypeDefinition> {
        let mut built: Vec<Field> = Vec::with_capacity(fields.len());

        for (key, node) in fields {
            let Value::String(key) = key else {
                return Err(SchemaError::UnsupportedNode {
                    node_path: node_path.to_string(),
                    found: format!("field key {}", describe_node(key)),
                });
            };

            let (field_name, optional) = match key.strip_suffix(OPTIONAL_MARKER) {
                Some(stripped) => (stripped, true),
                None => (key.as_str(), false),
            };
            let field_path = format!("{}.{}", node_path, field_name);

            if optional && field_name.ends_with(OPTIONAL_MARKER) {
                return Err(SchemaError::DoubleOptional { node_path: field_path });
            }
            if field_name.is_empty() {
                return Err(SchemaError::UnsupportedNode {
                    node_path: node_path.to_string(),
                    found: format!("empty field name '{}'", key),
                });
            }
            if built.iter().any(|f| f.name == field_name) {
                return Err(SchemaError::UnsupportedNode {
                    node_path: field_path,
                    found: format!("duplicate field '{}'", field_name),
                });
            }

            let child_name = child_type_name(name, field_name);
            let mut ty = self.build_at(&child_name, node, &field_path)?;
            if optional {
                ty = TypeDefinition::optional(ty, &field_path)?;
            }

            built.push(Field {
                name: field_name.to_string(),
                ty,
            });
        }

        self.register(TypeDefinition::Object(ObjectDef {
            namespace: self.namespace.name.clone(),
            name: name.to_string(),
            fields: built,
        }))
    }

    fn build_array(&mut self, name: &str, items: &Sequence, node_path: &str) -> Result<TypeDefinition> {
        let [item] = items.as_slice() else {
            return Err(SchemaError::ArrayArity {
                node_path: node_path.to_string(),
                count: items.len(),
            });
        };

        let item_name = format!("{}{}", name, ITEM_SUFFIX);
        let item_path = format!("{}[]", node_path);
        let item = self.build_at(&item_name, item, &item_path)?;

        self.register(TypeDefinition::Array(ArrayDef {
            namespace: self.namespace.name.clone(),
            name: name.to_string(),
            item: Box::new(item),
        }))
    }

    fn register(&mut self, definition: TypeDefinition) -> Result<TypeDefinition> {
        self.namespace.register(definition.clone())?;
        Ok(definition)
    }
}

/// Build a whole namespace from its declared name and `types` mapping.
///
/// Each top-level key is both registration key and naming seed. Top-level
/// aliases (primitives and references) produce nothing to register.
pub fn build_namespace(name: &str, types: &Mapping) -> Result<Namespace> {
    let mut namespace = Namespace::new(name);
    let mut builder = Builder::new(&mut namespace);

    for (key, node) in types {
        let type_name = match key {
            Value::String(s) if !s.is_empty() => s.as_str(),
            other => {
                return Err(SchemaError::UnsupportedNode {
                    node_path: name.to_string(),
                    found: format!("type name {}", describe_node(other)),
                })
            }
        };

        let built = builder.build(type_name, node)?;
        if built.name().is_none() {
            tracing::debug!(namespace = name, type_name, kind = %built.kind(), "top-level alias is not registered");
        }
    }

    Ok(namespace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{TypeKind, TypeRef};

    fn yaml(src: &str) -> Value {
        serde_yaml::from_str(src).unwrap()
    }

    fn build(src: &str) -> Result<Namespace> {
        let types = yaml(src);
        build_namespace("geo", types.as_mapping().unwrap())
    }

    #[test]
    fn test_primitive_is_not_registered() {
        let mut ns = Namespace::new("geo");
        let ty = Builder::new(&mut ns).build("Label", &yaml("str")).unwrap();
        assert_eq!(ty, TypeDefinition::Primitive { primitive: PrimitiveKind::String });
        assert!(ns.is_empty());
    }

    #[test]
    fn test_reference_defaults_to_current_namespace() {
        let mut ns = Namespace::new("pkg.a");
        let ty = Builder::new(&mut ns).build("Alias", &yaml("T")).unwrap();
        assert_eq!(ty, TypeDefinition::Reference(TypeRef::new("T", "pkg.a")));

        let ty = Builder::new(&mut ns).build("Alias", &yaml("pkg.b.T")).unwrap();
        assert_eq!(ty, TypeDefinition::Reference(TypeRef::new("T", "pkg.b")));
        assert!(ns.is_empty());
    }

    #[test]
    fn test_invalid_reference() {
        let err = build("Point: {origin: geo.}").unwrap_err();
        assert!(matches!(
            err,
            SchemaError::InvalidReference { ref node_path, ref reference }
                if node_path == "Point.origin" && reference == "geo."
        ));
    }

    #[test]
    fn test_object_fields_keep_order() {
        let ns = build("Point: {y: float, x: float, label?: str}").unwrap();
        let Some(TypeDefinition::Object(point)) = ns.get("Point") else {
            panic!("Point not registered as object");
        };
        let names: Vec<_> = point.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["y", "x", "label"]);
        assert_eq!(point.field("label").unwrap().ty.kind(), TypeKind::Optional);
        assert_eq!(ns.len(), 1);
    }

    #[test]
    fn test_nested_object_gets_synthesized_name() {
        let ns = build("Line: {start: {x: int}, end?: {x: int}}").unwrap();
        assert!(ns.contains("Line"));
        assert!(ns.contains("LineStart"));
        assert!(ns.contains("LineEnd"));

        let Some(TypeDefinition::Object(line)) = ns.get("Line") else {
            panic!("Line not registered as object");
        };
        let end = line.field("end").unwrap().ty.unwrap_optional();
        assert_eq!(end.name(), Some("LineEnd"));
        assert_eq!(end.namespace(), Some("geo"));
    }

    #[test]
    fn test_snake_field_names_are_camel_cased() {
        let ns = build("User: {home_address: {city: str}}").unwrap();
        assert!(ns.contains("UserHomeAddress"));
    }

    #[test]
    fn test_array_item_name() {
        let ns = build("Tags: [{name: str}]").unwrap();
        let Some(TypeDefinition::Array(tags)) = ns.get("Tags") else {
            panic!("Tags not registered as array");
        };
        assert_eq!(tags.item.name(), Some("TagsItem"));
        assert!(ns.contains("TagsItem"));
    }

    #[test]
    fn test_array_of_arrays() {
        let ns = build("Grid: [[int]]").unwrap();
        assert!(ns.contains("Grid"));
        assert!(ns.contains("GridItem"));
        assert!(!ns.contains("GridItemItem"));
    }

    #[test]
    fn test_array_arity() {
        let err = build("Pair: [int, str]").unwrap_err();
        assert!(matches!(err, SchemaError::ArrayArity { ref node_path, count: 2 } if node_path == "Pair"));

        let err = build("Nothing: []").unwrap_err();
        assert!(matches!(err, SchemaError::ArrayArity { count: 0, .. }));
    }

    #[test]
    fn test_structure_is_unwrapped_and_reclassified() {
        let ns = build("Size: {structure: {enum: [small, large]}}").unwrap();
        assert_eq!(ns.get("Size").map(TypeDefinition::kind), Some(TypeKind::Enum));

        let ns = build("Box: {structure: {w: int}}").unwrap();
        let Some(TypeDefinition::Object(b)) = ns.get("Box") else {
            panic!("Box not registered as object");
        };
        assert_eq!(b.fields.len(), 1);
    }

    #[test]
    fn test_enum_values_verbatim() {
        let ns = build("Color: {enum: [red, dark_green, Blue]}").unwrap();
        let Some(TypeDefinition::Enum(color)) = ns.get("Color") else {
            panic!("Color not registered as enum");
        };
        assert_eq!(color.values, vec!["red", "dark_green", "Blue"]);
    }

    #[test]
    fn test_enum_rejects_duplicates_and_non_strings() {
        let err = build("Color: {enum: [red, red]}").unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateEnumValue { ref value, .. } if value == "red"));

        let err = build("Level: {enum: [1, 2]}").unwrap_err();
        assert!(matches!(err, SchemaError::UnsupportedNode { .. }));
    }

    #[test]
    fn test_double_optional_rejected() {
        let err = build("Point: {label??: str}").unwrap_err();
        assert!(matches!(err, SchemaError::DoubleOptional { ref node_path } if node_path == "Point.label?"));
    }

    #[test]
    fn test_unsupported_node_reports_path() {
        let err = build("Point: {x: 3}").unwrap_err();
        match err {
            SchemaError::UnsupportedNode { node_path, found } => {
                assert_eq!(node_path, "Point.x");
                assert_eq!(found, "number 3");
            }
            other => panic!("Expected UnsupportedNode, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_and_duplicate_field_names() {
        assert!(matches!(build("A: {'?': int}").unwrap_err(), SchemaError::UnsupportedNode { .. }));
        assert!(matches!(build("A: {x: int, x?: int}").unwrap_err(), SchemaError::UnsupportedNode { .. }));
    }

    #[test]
    fn test_synthesized_name_collision_is_fatal() {
        // `Point.label` synthesizes `PointLabel`, which is also declared explicitly
        let err = build("PointLabel: {text: str}\nPoint: {label: {text: str}}").unwrap_err();
        assert!(matches!(
            err,
            SchemaError::DuplicateType { ref namespace, ref name } if namespace == "geo" && name == "PointLabel"
        ));
    }

    #[test]
    fn test_top_level_aliases_not_registered() {
        let ns = build("Name: str\nOther: pkg.b.T\nColor: {enum: [red]}").unwrap();
        let names: Vec<_> = ns.type_names().collect();
        assert_eq!(names, vec!["Color"]);
    }
}
