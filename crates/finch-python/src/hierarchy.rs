//! Hierarchy Validator: inheritance-crossing finality checks.
//!
//! Three rules run over the resolved class DAG:
//! - a class marked final must have no subclasses;
//! - a method marked final must have no redefinition in any descendant;
//! - a final attribute declared in a base class must not be redeclared or
//!   reassigned in any descendant class scope.
//!
//! Checks are local to (ancestor, descendant) pairs, so traversal order is
//! immaterial to correctness; classes are visited in declaration order and
//! ancestors in base order to keep diagnostics deterministic. Diamond
//! shapes in the DAG are deduplicated with a visited set.

use std::collections::{BTreeSet, HashSet};

use tracing::debug;

use finch_core::diagnostics::{DiagnosticKind, DiagnosticSink};
use finch_core::facts::{BindingScope, ClassId, FinalityStore, SymbolOwner};
use finch_core::types::Location;

/// Run the hierarchy checks over a collected store.
pub fn validate_hierarchy(store: &FinalityStore, sink: &mut DiagnosticSink) {
    check_final_subclassing(store, sink);
    check_final_overrides(store, sink);
}

/// Every class listing a final class among its bases is a violation.
fn check_final_subclassing(store: &FinalityStore, sink: &mut DiagnosticSink) {
    for class in store.classes() {
        for &base in &class.bases {
            let base_node = store.class(base);
            if base_node.is_final {
                sink.push(
                    DiagnosticKind::IllegalSubclass,
                    format!("cannot inherit from final class `{}`", base_node.name),
                    class.location.clone(),
                );
            }
        }
    }
}

/// Every descendant redefinition of a final method or final attribute is a
/// violation, reported at each offending site.
fn check_final_overrides(store: &FinalityStore, sink: &mut DiagnosticSink) {
    for class in store.classes() {
        let ancestors = collect_ancestors(store, class.id);
        if ancestors.is_empty() {
            continue;
        }
        debug!(
            class = %class.qualified_name,
            ancestors = ancestors.len(),
            "checking overrides against ancestors"
        );
        for &ancestor in &ancestors {
            let ancestor_node = store.class(ancestor);
            for method in store.methods_of(ancestor) {
                if method.is_final {
                    report_redefinitions(store, class.id, &method.name, &ancestor_node.name, sink);
                }
            }
            for symbol in store.symbols_of(SymbolOwner::Class(ancestor)) {
                if symbol.single_assignment {
                    report_redefinitions(store, class.id, &symbol.name, &ancestor_node.name, sink);
                }
            }
        }
    }
}

/// Report every site in `class` that redefines `name`: method definitions,
/// assignment facts in any of the class's scopes, and duplicate final
/// declarations. Sites are deduplicated by location so a declaration that
/// also produced a binding fact reports once.
fn report_redefinitions(
    store: &FinalityStore,
    class: ClassId,
    name: &str,
    base_name: &str,
    sink: &mut DiagnosticSink,
) {
    let mut sites: BTreeSet<Location> = BTreeSet::new();
    for method in store.methods_of(class) {
        if method.name == name {
            sites.insert(method.location.clone());
        }
    }
    for scope in [
        BindingScope::ClassBody(class),
        BindingScope::InitMethod(class),
        BindingScope::Method(class),
    ] {
        for binding in store.bindings_in_scope(scope) {
            if binding.name == name {
                sites.insert(binding.location.clone());
            }
        }
    }
    for symbol in store.symbols_of(SymbolOwner::Class(class)) {
        if symbol.name == name {
            sites.insert(symbol.location.clone());
        }
    }
    for site in sites {
        sink.push(
            DiagnosticKind::IllegalOverride,
            format!(
                "cannot override final attribute `{}` (previously declared in base class `{}`)",
                name, base_name
            ),
            site,
        );
    }
}

/// All ancestors of a class, deduplicated, in depth-first base order.
fn collect_ancestors(store: &FinalityStore, id: ClassId) -> Vec<ClassId> {
    let mut out = Vec::new();
    let mut visited: HashSet<ClassId> = HashSet::new();
    visited.insert(id);
    walk_bases(store, id, &mut visited, &mut out);
    out
}

fn walk_bases(
    store: &FinalityStore,
    id: ClassId,
    visited: &mut HashSet<ClassId>,
    out: &mut Vec<ClassId>,
) {
    for &base in &store.class(id).bases {
        if visited.insert(base) {
            out.push(base);
            walk_bases(store, base, visited, out);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
