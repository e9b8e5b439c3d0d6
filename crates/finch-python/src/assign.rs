//! Assignment Validator: single-assignment semantics for final symbols.
//!
//! Consumes the qualified symbols, binding facts, and annotation facts the
//! collector produced and verifies:
//! - exactly one binding per final symbol within its legal scope (module
//!   top level, class body, or the class's `__init__` for instance
//!   attributes), with augmented assignment and deletion counting as
//!   re-bindings;
//! - a class-body declaration without initializer is bound exactly once in
//!   `__init__`, except in stub modules where zero bindings are permitted;
//! - `ClassVar` and `Final` never combine on one symbol;
//! - the finality marker never appears nested in a type constructor or in
//!   a function signature.
//!
//! When a final symbol's single initializer is a literal, the validator
//! records it in [`LiteralHints`] so downstream stages may treat references
//! to the symbol as the literal itself. Hints are a capability, never a
//! validation failure.

use std::collections::BTreeMap;

use tracing::debug;

use finch_core::diagnostics::{DiagnosticKind, DiagnosticSink};
use finch_core::facts::{
    AnnotationPosition, Binding, BindingKind, BindingScope, FinalityStore, LiteralValue,
    QualifiedSymbol, SymbolId, SymbolOwner,
};

use crate::options::FinalityOptions;

// ============================================================================
// Literal Hints
// ============================================================================

/// Literal initializer values of final symbols, keyed by symbol.
#[derive(Debug, Clone, Default)]
pub struct LiteralHints {
    entries: BTreeMap<SymbolId, LiteralValue>,
}

impl LiteralHints {
    /// The recorded literal for a symbol, if any.
    pub fn get(&self, symbol: SymbolId) -> Option<&LiteralValue> {
        self.entries.get(&symbol)
    }

    /// All hints in symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &LiteralValue)> {
        self.entries.iter().map(|(&id, value)| (id, value))
    }

    /// Number of recorded hints.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no hints were recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, symbol: SymbolId, value: LiteralValue) {
        self.entries.insert(symbol, value);
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Run the assignment checks over a collected store.
pub fn validate_assignments(
    store: &FinalityStore,
    options: &FinalityOptions,
    sink: &mut DiagnosticSink,
) -> LiteralHints {
    for fact in store.annotation_facts() {
        let message = match fact.position {
            AnnotationPosition::Nested => "final qualifier must be the outermost type annotation",
            AnnotationPosition::Parameter => {
                "final qualifier not allowed in function parameter annotation"
            }
            AnnotationPosition::ReturnType => {
                "final qualifier not allowed in return type annotation"
            }
        };
        sink.push(
            DiagnosticKind::IllegalQualifierPosition,
            message,
            fact.location.clone(),
        );
    }

    let mut hints = LiteralHints::default();
    for symbol in store.symbols() {
        if symbol.also_class_var {
            sink.push(
                DiagnosticKind::RedundantQualifier,
                format!(
                    "final attribute `{}` cannot also be a class variable",
                    symbol.name
                ),
                symbol.location.clone(),
            );
        }
        if symbol.single_assignment {
            audit_symbol(store, options, symbol, sink, &mut hints);
        }
    }
    debug!(hints = hints.len(), "assignment validation complete");
    hints
}

/// Count the bindings of one final symbol and flag everything beyond the
/// single legal one.
fn audit_symbol(
    store: &FinalityStore,
    options: &FinalityOptions,
    symbol: &QualifiedSymbol,
    sink: &mut DiagnosticSink,
    hints: &mut LiteralHints,
) {
    let what = owner_noun(symbol.owner);
    let mut candidates: Vec<&Binding> = Vec::new();
    match symbol.owner {
        SymbolOwner::Module(module) => {
            collect_named(store, BindingScope::Module(module), &symbol.name, &mut candidates);
        }
        SymbolOwner::Class(class) => {
            for scope in [
                BindingScope::ClassBody(class),
                BindingScope::InitMethod(class),
                BindingScope::Method(class),
            ] {
                collect_named(store, scope, &symbol.name, &mut candidates);
            }
        }
    }
    candidates.sort_by(|a, b| a.location.cmp(&b.location));

    let legal: Option<&Binding> = if symbol.has_initializer {
        candidates
            .iter()
            .find(|b| b.kind == BindingKind::Declaration && b.location == symbol.location)
            .copied()
    } else {
        match symbol.owner {
            SymbolOwner::Module(_) => candidates
                .iter()
                .find(|b| can_initialize(b.kind))
                .copied(),
            // Without a class-body initializer, only `__init__` may bind.
            SymbolOwner::Class(_) => candidates
                .iter()
                .find(|b| {
                    matches!(b.scope, BindingScope::InitMethod(_)) && can_initialize(b.kind)
                })
                .copied(),
        }
    };

    if legal.is_none() && !store.symbol_in_stub(symbol) {
        sink.push(
            DiagnosticKind::MissingInitializer,
            format!("final {} `{}` without an initializer", what, symbol.name),
            symbol.location.clone(),
        );
    }

    let legal_id = legal.map(|b| b.id);
    for binding in &candidates {
        if Some(binding.id) == legal_id {
            continue;
        }
        if binding.in_loop && !options.flag_loop_assignments {
            continue;
        }
        let message = match binding.kind {
            BindingKind::Deletion => {
                format!("cannot delete final {} `{}`", what, symbol.name)
            }
            _ => format!("cannot assign to final {} `{}`", what, symbol.name),
        };
        sink.push(
            DiagnosticKind::IllegalReassignment,
            message,
            binding.location.clone(),
        );
    }

    if options.record_literal_hints && candidates.len() == 1 {
        if let Some(binding) = legal {
            if let Some(value) = &binding.value {
                hints.insert(symbol.id, value.clone());
            }
        }
    }
}

fn collect_named<'a>(
    store: &'a FinalityStore,
    scope: BindingScope,
    name: &str,
    out: &mut Vec<&'a Binding>,
) {
    out.extend(store.bindings_in_scope(scope).filter(|b| b.name == name));
}

/// Deletion and augmented assignment never initialize.
fn can_initialize(kind: BindingKind) -> bool {
    matches!(kind, BindingKind::Declaration | BindingKind::Assignment)
}

fn owner_noun(owner: SymbolOwner) -> &'static str {
    match owner {
        SymbolOwner::Module(_) => "name",
        SymbolOwner::Class(_) => "attribute",
    }
}

// ============================================================================
// Tests
// ============================================================================
