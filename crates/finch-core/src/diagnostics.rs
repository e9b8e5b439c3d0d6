//! Diagnostics: the finality violation taxonomy and the sink that collects
//! violations during a check.
//!
//! Every violation is recoverable: the checkers push a [`Diagnostic`] and
//! continue, so a single pass reports the complete set. Nothing here stops
//! the analyzed program from executing; these surface only as static
//! analysis output.

use serde::{Deserialize, Serialize};

use crate::types::Location;

// ============================================================================
// Diagnostic Kinds
// ============================================================================

/// The finality violation taxonomy.
///
/// Each kind carries a stable string code that appears in JSON output and
/// never changes across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// A class lists a final class among its bases.
    IllegalSubclass,
    /// A descendant class redefines a final method or attribute.
    IllegalOverride,
    /// A final name or attribute is bound more than once in its scope.
    IllegalReassignment,
    /// A final declaration has no initializing binding anywhere legal.
    MissingInitializer,
    /// The finality marker appears at a non-outermost type position or in
    /// a function signature.
    IllegalQualifierPosition,
    /// A symbol combines the class-variable and finality qualifiers.
    #[serde(rename = "redundant-classvar-final")]
    RedundantQualifier,
    /// The finality decorator is applied to something it cannot seal.
    #[serde(rename = "qualifier-on-non-method")]
    QualifierMisuse,
}

impl DiagnosticKind {
    /// Stable string code for JSON output and text rendering.
    pub fn code(&self) -> &'static str {
        match self {
            DiagnosticKind::IllegalSubclass => "illegal-subclass",
            DiagnosticKind::IllegalOverride => "illegal-override",
            DiagnosticKind::IllegalReassignment => "illegal-reassignment",
            DiagnosticKind::MissingInitializer => "missing-initializer",
            DiagnosticKind::IllegalQualifierPosition => "illegal-qualifier-position",
            DiagnosticKind::RedundantQualifier => "redundant-classvar-final",
            DiagnosticKind::QualifierMisuse => "qualifier-on-non-method",
        }
    }
}

impl std::fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Diagnostic
// ============================================================================

/// A single finality violation with its source location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Violation kind (stable code).
    pub kind: DiagnosticKind,
    /// Human-readable message.
    pub message: String,
    /// Where the violation occurred.
    pub location: Location,
}

impl Diagnostic {
    /// Create a new diagnostic.
    pub fn new(kind: DiagnosticKind, message: impl Into<String>, location: Location) -> Self {
        Diagnostic {
            kind,
            message: message.into(),
            location,
        }
    }

    /// Comparison key for deterministic ordering: location first, then
    /// kind code, then message.
    fn sort_key(&self) -> (&Location, &'static str, &str) {
        (&self.location, self.kind.code(), &self.message)
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}: {}", self.location, self.kind, self.message)
    }
}

// ============================================================================
// Diagnostic Sink
// ============================================================================

/// Collects diagnostics across the collector and both validators.
///
/// The sink preserves push order internally; [`DiagnosticSink::into_sorted`]
/// produces the deterministic stream callers see, so the validators may run
/// in either order without affecting output.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        DiagnosticSink::default()
    }

    /// Push a diagnostic.
    pub fn push(&mut self, kind: DiagnosticKind, message: impl Into<String>, location: Location) {
        self.diagnostics.push(Diagnostic::new(kind, message, location));
    }

    /// Number of collected diagnostics.
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// True if nothing was collected.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Diagnostics in push order (not yet sorted).
    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Consume the sink, returning diagnostics sorted by (location, kind,
    /// message) with exact duplicates removed.
    pub fn into_sorted(self) -> Vec<Diagnostic> {
        let mut diagnostics = self.diagnostics;
        diagnostics.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        diagnostics.dedup();
        diagnostics
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod codes {
        use super::*;

        #[test]
        fn codes_are_stable() {
            assert_eq!(DiagnosticKind::IllegalSubclass.code(), "illegal-subclass");
            assert_eq!(DiagnosticKind::IllegalOverride.code(), "illegal-override");
            assert_eq!(
                DiagnosticKind::IllegalReassignment.code(),
                "illegal-reassignment"
            );
            assert_eq!(
                DiagnosticKind::MissingInitializer.code(),
                "missing-initializer"
            );
            assert_eq!(
                DiagnosticKind::IllegalQualifierPosition.code(),
                "illegal-qualifier-position"
            );
            assert_eq!(
                DiagnosticKind::RedundantQualifier.code(),
                "redundant-classvar-final"
            );
            assert_eq!(
                DiagnosticKind::QualifierMisuse.code(),
                "qualifier-on-non-method"
            );
        }

        #[test]
        fn serde_uses_stable_codes() {
            let json = serde_json::to_string(&DiagnosticKind::RedundantQualifier).unwrap();
            assert_eq!(json, "\"redundant-classvar-final\"");
            let json = serde_json::to_string(&DiagnosticKind::QualifierMisuse).unwrap();
            assert_eq!(json, "\"qualifier-on-non-method\"");
            let json = serde_json::to_string(&DiagnosticKind::IllegalSubclass).unwrap();
            assert_eq!(json, "\"illegal-subclass\"");
        }
    }

    mod sink {
        use super::*;
        use crate::types::Location;

        #[test]
        fn into_sorted_orders_by_location() {
            let mut sink = DiagnosticSink::new();
            sink.push(
                DiagnosticKind::IllegalReassignment,
                "second",
                Location::new("b.py", 3, 1),
            );
            sink.push(
                DiagnosticKind::IllegalSubclass,
                "first",
                Location::new("a.py", 9, 1),
            );
            let sorted = sink.into_sorted();
            assert_eq!(sorted[0].message, "first");
            assert_eq!(sorted[1].message, "second");
        }

        #[test]
        fn into_sorted_drops_exact_duplicates() {
            let mut sink = DiagnosticSink::new();
            let loc = Location::new("a.py", 1, 1);
            sink.push(DiagnosticKind::IllegalOverride, "dup", loc.clone());
            sink.push(DiagnosticKind::IllegalOverride, "dup", loc);
            assert_eq!(sink.into_sorted().len(), 1);
        }

        #[test]
        fn same_location_orders_by_kind_code() {
            let mut sink = DiagnosticSink::new();
            let loc = Location::new("a.py", 1, 1);
            sink.push(DiagnosticKind::QualifierMisuse, "q", loc.clone());
            sink.push(DiagnosticKind::IllegalOverride, "o", loc);
            let sorted = sink.into_sorted();
            assert_eq!(sorted[0].kind, DiagnosticKind::IllegalOverride);
            assert_eq!(sorted[1].kind, DiagnosticKind::QualifierMisuse);
        }
    }

    #[test]
    fn display_is_location_kind_message() {
        let d = Diagnostic::new(
            DiagnosticKind::IllegalSubclass,
            "cannot inherit from final class `Base`",
            Location::new("mod.py", 4, 1),
        );
        assert_eq!(
            d.to_string(),
            "mod.py:4:1: illegal-subclass: cannot inherit from final class `Base`"
        );
    }
}
