//! Schema Shape Detection
//!
//! Decides which of the five recognised shapes a raw schema node has. This is
//! pure shape detection; the builder consumes the shape with an exhaustive
//! match and decides what definition to produce.
//!
//! Priority: `enum` mapping > `structure` mapping > bare string > mapping > sequence.

use serde::Serialize;
use serde_yaml::{Mapping, Sequence, Value};
use std::fmt;

/// Key marking an enum node
pub const ENUM_KEY: &str = "enum";

/// Key marking an explicit structure wrapper
pub const STRUCTURE_KEY: &str = "structure";

// =============================================================================
// Primitive Kinds
// =============================================================================

/// The closed set of primitive types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    String,
    Boolean,
    Integer,
    Float,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 4] = [Self::String, Self::Boolean, Self::Integer, Self::Float];

    /// Match a schema keyword (`str`, `bool`, `int`, `float`)
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "str" => Some(Self::String),
            "bool" => Some(Self::Boolean),
            "int" => Some(Self::Integer),
            "float" => Some(Self::Float),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Self::String => "str",
            Self::Boolean => "bool",
            Self::Integer => "int",
            Self::Float => "float",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

// =============================================================================
// Node Shape
// =============================================================================

/// Shape of one raw schema node, borrowed from the document tree
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeShape<'a> {
    /// `{enum: [a, b, c]}`
    Enum(&'a Sequence),
    /// `{structure: <node>}` - unwrap and reclassify the inner node
    Structure(&'a Value),
    /// `str`, `int`, `pkg.Type`, ...
    Scalar(&'a str),
    /// `{field: <node>, field?: <node>}`
    Object(&'a Mapping),
    /// `[<node>]`
    Array(&'a Sequence),
}

/// Classify a node.
///
/// Returns a description of the node when it has no supported shape.
pub fn detect_shape(node: &Value) -> Result<NodeShape<'_>, String> {
    match node {
        Value::Mapping(map) => {
            if let Some(values) = map.get(ENUM_KEY) {
                return match values {
                    Value::Sequence(seq) => Ok(NodeShape::Enum(seq)),
                    other => Err(format!("'{}' must be a list, found {}", ENUM_KEY, describe_node(other))),
                };
            }
            if let Some(inner) = map.get(STRUCTURE_KEY) {
                return Ok(NodeShape::Structure(inner));
            }
            Ok(NodeShape::Object(map))
        }
        Value::String(s) => Ok(NodeShape::Scalar(s)),
        Value::Sequence(seq) => Ok(NodeShape::Array(seq)),
        other => Err(describe_node(other)),
    }
}

/// Short human-readable description of a node for diagnostics
pub fn describe_node(node: &Value) -> String {
    match node {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean {}", b),
        Value::Number(n) => format!("number {}", n),
        Value::String(s) => format!("string '{}'", s),
        Value::Sequence(seq) => format!("list of {} item(s)", seq.len()),
        Value::Mapping(map) => format!("mapping of {} key(s)", map.len()),
        Value::Tagged(tagged) => format!("tagged value {}", tagged.tag),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(src: &str) -> Value {
        serde_yaml::from_str(src).unwrap()
    }

    #[test]
    fn test_primitive_keywords() {
        for kind in PrimitiveKind::ALL {
            assert_eq!(PrimitiveKind::from_keyword(kind.keyword()), Some(kind));
        }
        assert_eq!(PrimitiveKind::from_keyword("string"), None);
        assert_eq!(PrimitiveKind::from_keyword("Point"), None);
    }

    #[test]
    fn test_enum_detection() {
        let node = yaml("enum: [red, green, blue]");
        match detect_shape(&node).unwrap() {
            NodeShape::Enum(values) => assert_eq!(values.len(), 3),
            other => panic!("Expected Enum, got {:?}", other),
        }
    }

    #[test]
    fn test_enum_beats_structure() {
        let node = yaml("{enum: [a], structure: str}");
        assert!(matches!(detect_shape(&node).unwrap(), NodeShape::Enum(_)));
    }

    #[test]
    fn test_enum_must_be_list() {
        let node = yaml("enum: red");
        let err = detect_shape(&node).unwrap_err();
        assert!(err.contains("must be a list"));
    }

    #[test]
    fn test_structure_detection() {
        let node = yaml("structure: {x: float}");
        match detect_shape(&node).unwrap() {
            NodeShape::Structure(inner) => assert!(inner.is_mapping()),
            other => panic!("Expected Structure, got {:?}", other),
        }
    }

    #[test]
    fn test_scalar_object_array_detection() {
        assert!(matches!(detect_shape(&yaml("str")).unwrap(), NodeShape::Scalar("str")));
        assert!(matches!(detect_shape(&yaml("{x: int}")).unwrap(), NodeShape::Object(_)));
        assert!(matches!(detect_shape(&yaml("[int]")).unwrap(), NodeShape::Array(_)));
    }

    #[test]
    fn test_unsupported_nodes() {
        assert_eq!(detect_shape(&yaml("42")).unwrap_err(), "number 42");
        assert_eq!(detect_shape(&yaml("true")).unwrap_err(), "boolean true");
        assert_eq!(detect_shape(&yaml("~")).unwrap_err(), "null");
    }
}
