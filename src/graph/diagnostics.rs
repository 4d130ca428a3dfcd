//! Diagnostics
//!
//! Collects warnings and errors from post-build passes. Build errors are
//! fatal `SchemaError`s; diagnostics are for checks that span documents.

use serde::Serialize;
use std::fmt;

use super::TypeRef;

// =============================================================================
// Diagnostic Codes
// =============================================================================

/// Diagnostic code for categorizing issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticCode {
    /// Reference target not found in a loaded namespace
    UnresolvedRef,
    /// Reference into a namespace that was not loaded in this run
    UnknownNamespace,
    /// Enum values would produce the same enumerator identifier
    EnumIdentifierConflict,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnresolvedRef => "E001",
            Self::UnknownNamespace => "W001",
            Self::EnumIdentifierConflict => "W002",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::UnresolvedRef => Severity::Error,
            Self::UnknownNamespace | Self::EnumIdentifierConflict => Severity::Warning,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Severity
// =============================================================================

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

// =============================================================================
// Diagnostic Item
// =============================================================================

/// A single diagnostic item
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticItem {
    /// Named type the diagnostic was found in
    pub origin: TypeRef,
    pub code: DiagnosticCode,
    pub message: String,
    /// Additional context (suggestions, offending values)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<String>,
}

impl DiagnosticItem {
    pub fn new(origin: TypeRef, code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            origin,
            code,
            message: message.into(),
            context: Vec::new(),
        }
    }

    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }
}

impl fmt::Display for DiagnosticItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} ({})",
            self.code,
            self.code.severity(),
            self.message,
            self.origin
        )?;

        for ctx in &self.context {
            write!(f, "\n  - {}", ctx)?;
        }

        Ok(())
    }
}

// =============================================================================
// Diagnostics Collection
// =============================================================================

/// Collection of diagnostics from a pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    items: Vec<DiagnosticItem>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: DiagnosticItem) {
        self.items.push(item);
    }

    /// Reference whose target is missing from a loaded namespace
    pub fn unresolved_ref(&mut self, origin: &TypeRef, target: &TypeRef, suggestion: Option<&str>) {
        let mut item = DiagnosticItem::new(
            origin.clone(),
            DiagnosticCode::UnresolvedRef,
            format!("reference '{}' does not name a type in namespace '{}'", target, target.namespace),
        );
        if let Some(suggestion) = suggestion {
            item = item.with_context(format!("did you mean '{}.{}'?", target.namespace, suggestion));
        }
        self.push(item);
    }

    /// Reference into a namespace not loaded in this run
    pub fn unknown_namespace(&mut self, origin: &TypeRef, target: &TypeRef) {
        self.push(DiagnosticItem::new(
            origin.clone(),
            DiagnosticCode::UnknownNamespace,
            format!("reference '{}' points into namespace '{}', which was not loaded", target, target.namespace),
        ));
    }

    /// Enum values collapsing to one enumerator identifier
    pub fn enum_identifier_conflict(&mut self, origin: &TypeRef, values: &[&str], identifier: &str) {
        self.push(
            DiagnosticItem::new(
                origin.clone(),
                DiagnosticCode::EnumIdentifierConflict,
                format!("enum values would share the identifier '{}'", identifier),
            )
            .with_context(format!("values: {:?}", values)),
        );
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(|i| i.severity() == Severity::Error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &DiagnosticItem> {
        self.items.iter().filter(|i| i.severity() == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &DiagnosticItem> {
        self.items.iter().filter(|i| i.severity() == Severity::Warning)
    }

    pub fn all(&self) -> &[DiagnosticItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// Format all diagnostics for display
    pub fn format_all(&self) -> String {
        let mut output = String::new();

        for item in &self.items {
            output.push_str(&format!("{}\n", item));
        }

        if self.has_errors() {
            output.push_str(&format!(
                "\n{} error(s), {} warning(s)\n",
                self.error_count(),
                self.warning_count()
            ));
        } else if !self.is_empty() {
            output.push_str(&format!("\n{} warning(s)\n", self.warning_count()));
        }

        output
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_all())
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a DiagnosticItem;
    type IntoIter = std::slice::Iter<'a, DiagnosticItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_severity() {
        assert_eq!(DiagnosticCode::UnresolvedRef.severity(), Severity::Error);
        assert_eq!(DiagnosticCode::UnknownNamespace.severity(), Severity::Warning);
    }

    #[test]
    fn test_diagnostics_collection() {
        let origin = TypeRef::new("Route", "geo");
        let mut diags = Diagnostics::new();
        diags.unresolved_ref(&origin, &TypeRef::new("Pont", "geo"), Some("Point"));
        diags.unknown_namespace(&origin, &TypeRef::new("T", "other"));

        assert_eq!(diags.error_count(), 1);
        assert_eq!(diags.warning_count(), 1);
        assert!(diags.has_errors());

        let text = diags.format_all();
        assert!(text.contains("[E001] error"));
        assert!(text.contains("did you mean 'geo.Point'?"));
        assert!(text.contains("1 error(s), 1 warning(s)"));
    }
}
