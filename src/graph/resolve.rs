//! Reference Resolution
//!
//! Purely syntactic: a dotted path is split into a local name and an owning
//! namespace. No lookup happens here, so documents can be built independently.

use super::TypeRef;

/// Namespace path separator
pub const PATH_SEPARATOR: char = '.';

/// Split `path` on its last `.`.
///
/// Without a separator the whole path is the local name and the owner is
/// `current_namespace`.
pub fn resolve(current_namespace: &str, path: &str) -> TypeRef {
    match path.rsplit_once(PATH_SEPARATOR) {
        Some((namespace, name)) => TypeRef::new(name, namespace),
        None => TypeRef::new(path, current_namespace),
    }
}

/// Namespace segments of a dotted namespace name (`pkg.geo` -> `["pkg", "geo"]`)
pub fn namespace_segments(namespace: &str) -> Vec<&str> {
    namespace.split(PATH_SEPARATOR).collect()
}
