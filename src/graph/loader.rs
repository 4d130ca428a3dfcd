//! Schema Loading
//!
//! Reads schema documents, parses them into generic YAML trees and drives one
//! build pass per document. Documents are processed strictly in order and the
//! first error aborts the run.

use serde_yaml::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::builder::build_namespace;
use super::{Namespace, TypeGraph};
use crate::error::{Result, SchemaError};

/// Document key holding the namespace name
pub const NAMESPACE_KEY: &str = "namespace";

/// Document key holding the type declarations
pub const TYPES_KEY: &str = "types";

/// Parse one document's source text into a namespace.
///
/// `path` is only used for diagnostics.
pub fn parse_document(source: &str, path: &Path) -> Result<Namespace> {
    let malformed = |message: String| SchemaError::MalformedDocument {
        path: path.to_path_buf(),
        message,
    };

    let document: Value = serde_yaml::from_str(source).map_err(|e| malformed(e.to_string()))?;
    let Value::Mapping(document) = document else {
        return Err(malformed("top level must be a mapping".to_string()));
    };

    let namespace = match document.get(NAMESPACE_KEY) {
        Some(Value::String(name)) if !name.is_empty() => name,
        Some(_) => return Err(malformed(format!("'{}' must be a non-empty string", NAMESPACE_KEY))),
        None => return Err(malformed(format!("missing '{}'", NAMESPACE_KEY))),
    };
    let types = match document.get(TYPES_KEY) {
        Some(Value::Mapping(types)) => types,
        Some(_) => return Err(malformed(format!("'{}' must be a mapping", TYPES_KEY))),
        None => return Err(malformed(format!("missing '{}'", TYPES_KEY))),
    };

    let mut built = build_namespace(namespace, types).map_err(|e| e.in_document(path))?;
    built.source_digest = Some(digest(source));
    Ok(built)
}

/// Read and build a single document
pub fn load_document(path: &Path) -> Result<Namespace> {
    let source = fs::read_to_string(path).map_err(|source| SchemaError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let namespace = parse_document(&source, path)?;
    tracing::info!(
        path = %path.display(),
        namespace = %namespace.name,
        types = namespace.len(),
        "loaded schema document"
    );
    Ok(namespace)
}

/// Load documents in order into one graph
pub fn load_documents<P: AsRef<Path>>(paths: &[P]) -> Result<TypeGraph> {
    let mut graph = TypeGraph::new();
    for path in paths {
        let path = path.as_ref();
        let namespace = load_document(path)?;
        graph.insert(namespace).map_err(|e| e.in_document(path))?;
    }
    Ok(graph)
}

/// Expand input paths: files are kept as given, directories are walked
/// (sorted by file name) for files with one of `extensions`.
pub fn collect_inputs<P: AsRef<Path>>(paths: &[P], extensions: &[String]) -> Result<Vec<PathBuf>> {
    let mut inputs = Vec::new();

    for path in paths {
        let path = path.as_ref();
        if !path.is_dir() {
            inputs.push(path.to_path_buf());
            continue;
        }

        for entry in WalkDir::new(path).sort_by_file_name() {
            let entry = entry.map_err(|e| SchemaError::Io {
                path: e.path().unwrap_or(path).to_path_buf(),
                source: e.into_io_error().unwrap_or_else(|| {
                    std::io::Error::new(std::io::ErrorKind::Other, "filesystem loop")
                }),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let matches = entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| extensions.iter().any(|e| e == ext))
                .unwrap_or(false);
            if matches {
                inputs.push(entry.into_path());
            }
        }
    }

    Ok(inputs)
}

fn digest(source: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    format!("{:x}", hasher.finalize())
}
