//! Link Pass
//!
//! Optional check run after every document is loaded. The builder resolves
//! references syntactically only; this pass looks each reference up in the
//! loaded graph and reports what it cannot find. It never changes the graph.

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use std::collections::BTreeMap;

use super::diagnostics::Diagnostics;
use super::{Namespace, TypeDefinition, TypeGraph, TypeRef};
use crate::codegen::names::enumerator_identifier;

/// Check every reference and enum in `graph`
pub fn link(graph: &TypeGraph) -> Diagnostics {
    let mut diagnostics = Diagnostics::new();

    for definition in graph.types() {
        let Some(origin) = definition.type_ref() else {
            continue;
        };

        // Only direct children: nested named types are table entries of their own
        for child in definition.children() {
            check_reference(graph, &origin, child.unwrap_optional(), &mut diagnostics);
        }

        if let TypeDefinition::Enum(e) = definition {
            check_enumerators(&origin, &e.values, &mut diagnostics);
        }
    }

    for item in diagnostics.warnings() {
        tracing::warn!("{}", item);
    }

    diagnostics
}

fn check_reference(graph: &TypeGraph, origin: &TypeRef, child: &TypeDefinition, diagnostics: &mut Diagnostics) {
    let TypeDefinition::Reference(target) = child else {
        return;
    };

    match graph.namespace(&target.namespace) {
        None => diagnostics.unknown_namespace(origin, target),
        Some(namespace) if !namespace.contains(&target.name) => {
            let suggestion = suggest(namespace, &target.name);
            diagnostics.unresolved_ref(origin, target, suggestion);
        }
        Some(_) => {}
    }
}

/// Closest type name in `namespace`, if any scores at all
fn suggest<'a>(namespace: &'a Namespace, name: &str) -> Option<&'a str> {
    let matcher = SkimMatcherV2::default().ignore_case();
    namespace
        .type_names()
        .filter_map(|candidate| {
            let forward = matcher.fuzzy_match(candidate, name);
            let backward = matcher.fuzzy_match(name, candidate);
            forward.max(backward).map(|score| (score, candidate))
        })
        .max_by(|a, b| a.0.cmp(&b.0).then_with(|| b.1.cmp(a.1)))
        .map(|(_, candidate)| candidate)
}

fn check_enumerators(origin: &TypeRef, values: &[String], diagnostics: &mut Diagnostics) {
    let mut by_identifier: BTreeMap<String, Vec<&str>> = BTreeMap::new();
    for value in values {
        by_identifier
            .entry(enumerator_identifier(value))
            .or_default()
            .push(value);
    }

    for (identifier, values) in by_identifier {
        if values.len() > 1 {
            diagnostics.enum_identifier_conflict(origin, &values, &identifier);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{parse_document, DiagnosticCode};
    use std::path::Path;

    fn graph(documents: &[&str]) -> TypeGraph {
        let mut graph = TypeGraph::new();
        for (i, source) in documents.iter().enumerate() {
            let path = format!("doc{}.yaml", i);
            graph.insert(parse_document(source, Path::new(&path)).unwrap()).unwrap();
        }
        graph
    }

    fn codes(diagnostics: &Diagnostics) -> Vec<DiagnosticCode> {
        diagnostics.all().iter().map(|d| d.code).collect()
    }

    #[test]
    fn test_resolved_references_are_clean() {
        let graph = graph(&[
            "namespace: pkg.a\ntypes:\n  Route: {stops: [pkg.b.Stop], color?: Color}\n  Color: {enum: [red]}\n",
            "namespace: pkg.b\ntypes:\n  Stop: {name: str}\n",
        ]);
        assert!(link(&graph).is_empty());
    }

    #[test]
    fn test_unresolved_reference_with_suggestion() {
        let graph = graph(&["namespace: geo\ntypes:\n  Point: {x: float}\n  Route: {start: Pont}\n"]);
        let diagnostics = link(&graph);

        assert_eq!(codes(&diagnostics), vec![DiagnosticCode::UnresolvedRef]);
        let item = &diagnostics.all()[0];
        assert_eq!(item.origin, TypeRef::new("Route", "geo"));
        assert_eq!(item.context, vec!["did you mean 'geo.Point'?".to_string()]);
    }

    #[test]
    fn test_unknown_namespace_is_a_warning() {
        let graph = graph(&["namespace: geo\ntypes:\n  Route: {owner?: people.Person}\n"]);
        let diagnostics = link(&graph);

        assert_eq!(codes(&diagnostics), vec![DiagnosticCode::UnknownNamespace]);
        assert!(!diagnostics.has_errors());
    }

    #[test]
    fn test_reference_in_array_item() {
        let graph = graph(&["namespace: geo\ntypes:\n  Path: [Missing]\n"]);
        assert_eq!(codes(&link(&graph)), vec![DiagnosticCode::UnresolvedRef]);
    }

    #[test]
    fn test_enumerator_conflict() {
        let graph = graph(&["namespace: geo\ntypes:\n  Mode: {enum: [dark_mode, DarkMode, Dark_Mode, light]}\n"]);
        let diagnostics = link(&graph);

        assert_eq!(codes(&diagnostics), vec![DiagnosticCode::EnumIdentifierConflict]);
        assert!(diagnostics.all()[0].message.contains("kDarkMode"));
    }
}
