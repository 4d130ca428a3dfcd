//! Error types for the schema compiler

use std::path::PathBuf;

use thiserror::Error;

/// Result type for schema compiler operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Schema compiler errors
///
/// Every variant is fatal: a build aborts on the first one.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed document {}: {message}", path.display())]
    MalformedDocument { path: PathBuf, message: String },

    #[error("In document {}: {source}", path.display())]
    InDocument {
        path: PathBuf,
        #[source]
        source: Box<SchemaError>,
    },

    #[error("Unsupported schema node at '{node_path}': {found}")]
    UnsupportedNode { node_path: String, found: String },

    #[error("Array at '{node_path}' must declare exactly one item schema, found {count}")]
    ArrayArity { node_path: String, count: usize },

    #[error("Optional field at '{node_path}' cannot wrap another optional")]
    DoubleOptional { node_path: String },

    #[error("Type '{name}' is defined more than once in namespace '{namespace}'")]
    DuplicateType { namespace: String, name: String },

    #[error("Namespace '{0}' is declared by more than one document")]
    DuplicateNamespace(String),

    #[error("Enum at '{node_path}' declares value '{value}' more than once")]
    DuplicateEnumValue { node_path: String, value: String },

    #[error("Invalid type reference '{reference}' at '{node_path}'")]
    InvalidReference { node_path: String, reference: String },

    #[error("Link pass reported {0} error(s)")]
    LinkFailed(usize),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SchemaError {
    /// Attach the path of the document being built
    pub fn in_document(self, path: impl Into<PathBuf>) -> Self {
        match self {
            // Already carries a path
            err @ (SchemaError::Io { .. }
            | SchemaError::MalformedDocument { .. }
            | SchemaError::InDocument { .. }) => err,
            other => SchemaError::InDocument {
                path: path.into(),
                source: Box::new(other),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_document_wraps_build_errors() {
        let err = SchemaError::ArrayArity {
            node_path: "Path".to_string(),
            count: 2,
        }
        .in_document("geo.yaml");

        let msg = err.to_string();
        assert!(msg.contains("geo.yaml"));
        assert!(msg.contains("Path"));
        assert!(msg.contains("found 2"));
    }

    #[test]
    fn test_in_document_keeps_existing_path() {
        let err = SchemaError::MalformedDocument {
            path: PathBuf::from("a.yaml"),
            message: "missing 'namespace'".to_string(),
        }
        .in_document("b.yaml");

        assert!(matches!(err, SchemaError::MalformedDocument { ref path, .. } if path == &PathBuf::from("a.yaml")));
    }
}
