//! End-to-end scenarios for the finality check, driven through the public
//! library API.
//!
//! Each scenario builds a declaration snapshot in memory, runs the full
//! check, and asserts the exact diagnostic stream.

use finch::diagnostics::DiagnosticKind;
use finch::python::check::check_modules;
use finch::python::decl::{Expr, TypeExpr};
use finch::python::options::FinalityOptions;
use finch::python::test_helpers::*;

fn kinds(modules: &[finch::python::decl::Module]) -> Vec<DiagnosticKind> {
    check_modules(modules, &FinalityOptions::default())
        .diagnostics
        .iter()
        .map(|d| d.kind)
        .collect()
}

// ============================================================================
// Hierarchy Scenarios
// ============================================================================

#[test]
fn final_base_with_derived_yields_exactly_one_illegal_subclass() {
    let m = module(
        "mod.py",
        vec![
            typing_imports(1),
            class_def("Base", &[], vec![dec("final", 2)], vec![], 3),
            class_def("Derived", &["Base"], vec![], vec![], 6),
        ],
    );
    let outcome = check_modules(&[m], &FinalityOptions::default());
    assert_eq!(outcome.diagnostics.len(), 1);
    assert_eq!(outcome.diagnostics[0].kind, DiagnosticKind::IllegalSubclass);
    assert!(outcome.diagnostics[0].message.contains("Base"));
}

#[test]
fn final_method_redefined_in_derived_yields_exactly_one_illegal_override() {
    let m = module(
        "mod.py",
        vec![
            typing_imports(1),
            class_def(
                "Base",
                &[],
                vec![],
                vec![func("foo", vec![dec("final", 3)], vec![], 4)],
                2,
            ),
            class_def(
                "Derived",
                &["Base"],
                vec![],
                vec![func("foo", vec![], vec![], 7)],
                6,
            ),
        ],
    );
    let outcome = check_modules(&[m], &FinalityOptions::default());
    assert_eq!(outcome.diagnostics.len(), 1);
    let diagnostic = &outcome.diagnostics[0];
    assert_eq!(diagnostic.kind, DiagnosticKind::IllegalOverride);
    assert!(diagnostic.message.contains("foo"));
    assert!(diagnostic.message.contains("Base"));
}

// ============================================================================
// Assignment Scenarios
// ============================================================================

#[test]
fn module_rate_reassignment_yields_exactly_one_illegal_reassignment() {
    let m = module(
        "mod.py",
        vec![
            typing_imports(1),
            ann_assign(name_target("RATE"), final_bare(), Some(Expr::int(3000)), 2),
            assign_name("RATE", Some(Expr::int(300)), 5),
        ],
    );
    assert_eq!(kinds(&[m]), vec![DiagnosticKind::IllegalReassignment]);
}

#[test]
fn uninitialized_class_attribute_yields_missing_initializer() {
    let body = vec![ann_assign(
        name_target("x"),
        final_of(TypeExpr::name("int")),
        None,
        3,
    )];
    let m = module(
        "mod.py",
        vec![
            typing_imports(1),
            class_def("C", &[], vec![], body.clone(), 2),
        ],
    );
    assert_eq!(kinds(&[m]), vec![DiagnosticKind::MissingInitializer]);

    // The same declaration in an interface-only module is permitted.
    let stub = stub_module(
        "mod.pyi",
        vec![typing_imports(1), class_def("C", &[], vec![], body, 2)],
    );
    assert!(kinds(&[stub]).is_empty());
}

#[test]
fn final_parameter_annotation_yields_exactly_one_illegal_position() {
    let m = module(
        "mod.py",
        vec![
            typing_imports(1),
            func_full(
                "configure",
                vec![],
                vec![param("rate", Some(final_of(TypeExpr::name("int"))), 2)],
                None,
                vec![],
                2,
            ),
        ],
    );
    assert_eq!(kinds(&[m]), vec![DiagnosticKind::IllegalQualifierPosition]);
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn reanalysis_is_idempotent() {
    let build = || {
        vec![
            module(
                "a.py",
                vec![
                    typing_imports(1),
                    class_def("Base", &[], vec![dec("final", 2)], vec![], 3),
                    ann_assign(name_target("N"), final_bare(), Some(Expr::int(1)), 5),
                    assign_name("N", Some(Expr::int(2)), 6),
                ],
            ),
            module(
                "b.py",
                vec![
                    import_from("a", &[("Base", None)], 1),
                    class_def("Derived", &["Base"], vec![], vec![], 2),
                ],
            ),
        ]
    };
    let first = check_modules(&build(), &FinalityOptions::default());
    let second = check_modules(&build(), &FinalityOptions::default());
    assert_eq!(first.diagnostics, second.diagnostics);
    assert!(!first.diagnostics.is_empty());
}

#[test]
fn every_final_class_with_subclasses_is_reported() {
    let m = module(
        "mod.py",
        vec![
            typing_imports(1),
            class_def("A", &[], vec![dec("final", 2)], vec![], 3),
            class_def("B", &["A"], vec![], vec![], 5),
            class_def("C", &["A"], vec![], vec![], 7),
        ],
    );
    let outcome = check_modules(&[m], &FinalityOptions::default());
    for class in outcome.store.classes() {
        if class.is_final {
            let subclasses = outcome.store.direct_subclasses(class.id).len();
            let reports = outcome
                .diagnostics
                .iter()
                .filter(|d| {
                    d.kind == DiagnosticKind::IllegalSubclass && d.message.contains(&class.name)
                })
                .count();
            assert_eq!(subclasses, reports);
        }
    }
}

#[test]
fn final_symbols_bind_exactly_once_when_clean() {
    let m = module(
        "mod.py",
        vec![
            typing_imports(1),
            ann_assign(name_target("A"), final_bare(), Some(Expr::int(1)), 2),
            ann_assign(name_target("B"), final_bare(), Some(Expr::str("s")), 3),
        ],
    );
    let outcome = check_modules(&[m], &FinalityOptions::default());
    assert!(outcome.is_clean());
    for symbol in outcome.store.symbols() {
        let bindings = outcome
            .store
            .bindings()
            .iter()
            .filter(|b| b.name == symbol.name)
            .count();
        assert_eq!(bindings, 1);
    }
    assert_eq!(outcome.literal_hints.len(), 2);
}
