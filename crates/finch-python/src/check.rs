//! Check orchestration: collect, validate, and produce the deterministic
//! diagnostic stream.
//!
//! The collector runs first and builds the facts store; the hierarchy and
//! assignment validators then each consume it independently. They inspect
//! disjoint concerns (type hierarchy vs binding sites) over an immutable
//! store, so their relative order is unobservable — the merged output is
//! sorted by (location, kind, message) either way.

use tracing::debug;

use finch_core::diagnostics::{Diagnostic, DiagnosticSink};
use finch_core::facts::FinalityStore;

use crate::assign::{validate_assignments, LiteralHints};
use crate::collect::collect_modules;
use crate::decl::Module;
use crate::hierarchy::validate_hierarchy;
use crate::options::FinalityOptions;

// ============================================================================
// Outcome
// ============================================================================

/// Summary counts for a completed check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckSummary {
    /// Modules analyzed.
    pub modules: usize,
    /// Classes registered.
    pub classes: usize,
    /// Final classes.
    pub final_classes: usize,
    /// Final methods.
    pub final_methods: usize,
    /// Final variables/attributes.
    pub final_symbols: usize,
}

/// Result of checking one snapshot.
#[derive(Debug)]
pub struct CheckOutcome {
    /// The facts store, for downstream consumers.
    pub store: FinalityStore,
    /// Violations, sorted by (location, kind, message).
    pub diagnostics: Vec<Diagnostic>,
    /// Literal-substitution hints.
    pub literal_hints: LiteralHints,
    /// Summary counts.
    pub summary: CheckSummary,
}

impl CheckOutcome {
    /// True when no violations were reported.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

// ============================================================================
// Entry Point
// ============================================================================

/// Check a set of modules and return the full outcome.
pub fn check_modules(modules: &[Module], options: &FinalityOptions) -> CheckOutcome {
    let mut sink = DiagnosticSink::new();
    let store = collect_modules(modules, &mut sink);
    validate_hierarchy(&store, &mut sink);
    let literal_hints = validate_assignments(&store, options, &mut sink);
    let diagnostics = sink.into_sorted();

    let summary = CheckSummary {
        modules: store.modules().len(),
        classes: store.classes().len(),
        final_classes: store.classes().iter().filter(|c| c.is_final).count(),
        final_methods: store.methods().iter().filter(|m| m.is_final).count(),
        final_symbols: store.symbols().len(),
    };
    debug!(
        modules = summary.modules,
        classes = summary.classes,
        diagnostics = diagnostics.len(),
        "check complete"
    );

    CheckOutcome {
        store,
        diagnostics,
        literal_hints,
        summary,
    }
}

// ============================================================================
// Tests
// ============================================================================
