//! Schema Compiler
//!
//! Compiles declarative type-schema documents, one per namespace, into an
//! in-memory type graph that a code-generation layer renders into source.
//!
//! ## Pipeline
//!
//! ```text
//! paths ─▶ loader ─▶ (per document) builder ─▶ Namespace ─▶ TypeGraph ─▶ link ─▶ codegen::Region
//!                     ├─ patterns::detect_shape
//!                     ├─ resolve::resolve
//!                     └─ codegen::names
//! ```
//!
//! ## Schema documents
//!
//! ```yaml
//! namespace: geo
//! types:
//!   Point: {x: float, y: float, label?: str}
//!   Path: [{x: float, y: float}]        # Path + synthesized PathItem
//!   Color: {enum: [red, green, blue]}
//!   Route: {start: Point, owner?: people.Person}
//! ```

pub mod codegen;
pub mod config;
pub mod error;
pub mod graph;

pub use codegen::{regions, Region};
pub use config::{CompilerConfig, OutputFormat};
pub use error::{Result, SchemaError};
pub use graph::{
    Diagnostics, Namespace, PrimitiveKind, TypeDefinition, TypeGraph, TypeKind, TypeRef,
};

use std::path::Path;

/// Result of one compiler run
#[derive(Debug)]
pub struct Compilation {
    pub graph: TypeGraph,
    /// Link pass output; empty when linking is disabled
    pub diagnostics: Diagnostics,
}

/// Collect inputs, load every document in order, then run the link pass if
/// enabled. In strict mode link errors fail the run.
pub fn compile<P: AsRef<Path>>(inputs: &[P], config: &CompilerConfig) -> Result<Compilation> {
    let paths = graph::collect_inputs(inputs, &config.input.extensions)?;
    let graph = graph::load_documents(&paths)?;

    let diagnostics = if config.link.enabled {
        graph::link(&graph)
    } else {
        Diagnostics::new()
    };

    if config.link.strict && diagnostics.has_errors() {
        for item in diagnostics.errors() {
            tracing::error!("{}", item);
        }
        return Err(SchemaError::LinkFailed(diagnostics.error_count()));
    }

    Ok(Compilation { graph, diagnostics })
}
