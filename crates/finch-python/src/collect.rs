//! Declaration Collector: scans declaration snapshots and builds the
//! finality facts store.
//!
//! Collection is two passes over the module set:
//!
//! 1. Register every class under its qualified name, so base-class edges
//!    can resolve forward references and cross-module inheritance.
//! 2. Walk bodies resolving base edges and collecting method bindings,
//!    qualified symbols, assignment facts, and annotation-position facts.
//!
//! The collector emits diagnostics only for misplaced qualifiers
//! (`@final` on a plain function, wrong overload placement, duplicate
//! final declarations, finality markers in method bodies). Everything
//! hierarchy- or binding-related is left to the validators.

use std::collections::HashMap;

use tracing::debug;

use finch_core::diagnostics::{DiagnosticKind, DiagnosticSink};
use finch_core::facts::{
    AnnotationPosition, BindingKind, BindingScope, ClassId, FinalityStore, LiteralValue,
    MethodKind, ModuleId, NewSymbol, SymbolOwner,
};
use finch_core::types::Location;

use crate::decl::{
    AnnAssignStmt, AssignTarget, ClassDecl, Expr, FunctionDecl, Module, Pos, Stmt, TypeExpr,
};
use crate::qualifiers::{Marker, QualifierTable};

// ============================================================================
// Annotation Analysis
// ============================================================================

/// The finality-relevant shape of one annotation.
#[derive(Debug, Clone)]
pub struct AnnotationInfo {
    /// `Final` is among the outermost wrappers.
    pub is_final: bool,
    /// `ClassVar` is among the outermost wrappers.
    pub is_class_var: bool,
    /// The inner type, rendered; `None` when inferred (`x: Final = 3`).
    pub declared_type: Option<String>,
    /// `Final` occurs below the outermost wrapper chain.
    pub nested_final: bool,
}

/// Peel the marker chain off an annotation and report what was found.
///
/// `Final[int]`, `ClassVar[Final[int]]`, and bare `Final` all peel; the
/// remaining core is the declared type. `Final` occurrences inside the
/// core (e.g. `List[Final[int]]`) are nested and therefore illegal.
pub fn analyze_annotation(expr: &TypeExpr, table: &QualifierTable) -> AnnotationInfo {
    let mut info = AnnotationInfo {
        is_final: false,
        is_class_var: false,
        declared_type: None,
        nested_final: false,
    };
    let mut current = Some(expr);
    while let Some(e) = current {
        let (marker, inner) = head_marker(e, table);
        match marker {
            Some(Marker::Final) => {
                info.is_final = true;
                current = inner;
            }
            Some(Marker::ClassVar) => {
                info.is_class_var = true;
                current = inner;
            }
            _ => {
                info.declared_type = Some(e.render());
                info.nested_final = contains_final(e, table);
                break;
            }
        }
    }
    info
}

/// The marker heading this expression, plus its subscript argument.
fn head_marker<'a>(
    expr: &'a TypeExpr,
    table: &QualifierTable,
) -> (Option<Marker>, Option<&'a TypeExpr>) {
    match expr {
        TypeExpr::Name { name } => (table.annotation_marker(name), None),
        TypeExpr::Subscript { value, args } => match value.as_ref() {
            TypeExpr::Name { name } => (table.annotation_marker(name), args.first()),
            _ => (None, None),
        },
        TypeExpr::Other => (None, None),
    }
}

/// True when `Final` occurs anywhere in the expression tree.
fn contains_final(expr: &TypeExpr, table: &QualifierTable) -> bool {
    match expr {
        TypeExpr::Name { name } => table.annotation_marker(name) == Some(Marker::Final),
        TypeExpr::Subscript { value, args } => {
            contains_final(value, table) || args.iter().any(|a| contains_final(a, table))
        }
        TypeExpr::Other => false,
    }
}

// ============================================================================
// Import Resolution
// ============================================================================

/// Per-module import resolution for base-class names.
#[derive(Debug, Default)]
struct ImportTable {
    /// Local name → qualified `module.Member`.
    named: HashMap<String, String>,
    /// Local alias → dotted module name.
    modules: HashMap<String, String>,
}

impl ImportTable {
    fn from_module(module: &Module) -> Self {
        let mut table = ImportTable::default();
        table.scan(&module.body);
        table
    }

    fn scan(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            match stmt {
                Stmt::Import(import) => {
                    let local = import.alias.as_deref().unwrap_or(&import.module);
                    self.modules
                        .insert(local.to_string(), import.module.clone());
                }
                Stmt::ImportFrom(import) => {
                    for name in &import.names {
                        self.named.insert(
                            name.local_name().to_string(),
                            format!("{}.{}", import.module, name.name),
                        );
                    }
                }
                Stmt::ClassDef(class) => self.scan(&class.body),
                Stmt::If(cond) => {
                    self.scan(&cond.body);
                    self.scan(&cond.orelse);
                }
                _ => {}
            }
        }
    }

    /// Resolve a dotted reference to a qualified name, longest prefix first.
    fn resolve(&self, dotted: &str) -> Option<String> {
        if let Some(qualified) = self.named.get(dotted) {
            return Some(qualified.clone());
        }
        for (idx, _) in dotted.match_indices('.').rev() {
            let prefix = &dotted[..idx];
            let rest = &dotted[idx + 1..];
            if let Some(module) = self.modules.get(prefix) {
                return Some(format!("{}.{}", module, rest));
            }
            if let Some(qualified) = self.named.get(prefix) {
                return Some(format!("{}.{}", qualified, rest));
            }
        }
        None
    }
}

// ============================================================================
// Collector
// ============================================================================

/// Per-module collection context.
struct ModuleCx {
    id: ModuleId,
    path: String,
    dotted: String,
    is_stub: bool,
    qualifiers: QualifierTable,
    imports: ImportTable,
    /// Dotted local class path (`Outer.Inner`) → registered class.
    local_classes: HashMap<String, ClassId>,
}

impl ModuleCx {
    fn loc(&self, pos: Pos) -> Location {
        Location::new(self.path.clone(), pos.line, pos.col)
    }
}

/// Scope the walker is currently in.
#[derive(Clone)]
enum Scope {
    /// Module top level.
    Module,
    /// Directly inside a class body; `prefix` is the dotted local path.
    ClassBody { class: ClassId, prefix: String },
    /// Inside `__init__` of the class.
    Init { class: ClassId },
    /// Inside a non-initializer method body.
    Method { class: ClassId },
    /// Inside a plain function body.
    Function,
}

/// Collect facts from a set of modules into a fresh store.
pub fn collect_modules(modules: &[Module], sink: &mut DiagnosticSink) -> FinalityStore {
    let mut store = FinalityStore::new();
    let mut contexts = Vec::with_capacity(modules.len());

    for module in modules {
        let id = store.add_module(&module.path, module.dotted_name(), module.is_stub());
        let mut cx = ModuleCx {
            id,
            path: module.path.clone(),
            dotted: module.dotted_name(),
            is_stub: module.is_stub(),
            qualifiers: QualifierTable::from_module(module),
            imports: ImportTable::from_module(module),
            local_classes: HashMap::new(),
        };
        register_classes(&mut store, &mut cx, "", &module.body);
        contexts.push(cx);
    }

    for (module, cx) in modules.iter().zip(&contexts) {
        debug!(module = %cx.dotted, "collecting declaration facts");
        let mut walker = Walker {
            store: &mut store,
            sink: &mut *sink,
            cx,
        };
        walker.walk_stmts(&module.body, &Scope::Module, false);
    }

    store
}

/// Pass 1: register every class reachable through module, class, and
/// conditional bodies. Function-local classes are not part of the checked
/// surface.
fn register_classes(store: &mut FinalityStore, cx: &mut ModuleCx, prefix: &str, stmts: &[Stmt]) {
    for stmt in stmts {
        match stmt {
            Stmt::ClassDef(class) => {
                let local = if prefix.is_empty() {
                    class.name.clone()
                } else {
                    format!("{}.{}", prefix, class.name)
                };
                let qualified = format!("{}.{}", cx.dotted, local);
                let is_final = class
                    .decorators
                    .iter()
                    .any(|d| cx.qualifiers.is_final_decorator(&d.name));
                let id = store.add_class(cx.id, &class.name, qualified, is_final, cx.loc(class.pos));
                cx.local_classes.insert(local.clone(), id);
                register_classes(store, cx, &local, &class.body);
            }
            Stmt::If(cond) => {
                register_classes(store, cx, prefix, &cond.body);
                register_classes(store, cx, prefix, &cond.orelse);
            }
            _ => {}
        }
    }
}

struct Walker<'a> {
    store: &'a mut FinalityStore,
    sink: &'a mut DiagnosticSink,
    cx: &'a ModuleCx,
}

impl Walker<'_> {
    fn walk_stmts(&mut self, stmts: &[Stmt], scope: &Scope, in_loop: bool) {
        // Class bodies group methods by name first, so overload placement
        // can be judged per group; everything else walks in order.
        if let Scope::ClassBody { class, .. } = scope {
            let class = *class;
            for group in group_methods(stmts) {
                self.visit_method_group(class, &group);
            }
            for stmt in stmts {
                if !matches!(stmt, Stmt::FunctionDef(_)) {
                    self.walk_stmt(stmt, scope, in_loop);
                }
            }
            return;
        }
        for stmt in stmts {
            self.walk_stmt(stmt, scope, in_loop);
        }
    }

    fn walk_stmt(&mut self, stmt: &Stmt, scope: &Scope, in_loop: bool) {
        match stmt {
            Stmt::ClassDef(class) => self.visit_class(class, scope),
            Stmt::FunctionDef(func) => self.visit_plain_function(func),
            Stmt::AnnAssign(ann) => self.visit_ann_assign(ann, scope, in_loop),
            Stmt::Assign(assign) => {
                for target in &assign.targets {
                    self.record_assignment(
                        target,
                        BindingKind::Assignment,
                        assign.value.as_ref(),
                        scope,
                        in_loop,
                        assign.pos,
                    );
                }
            }
            Stmt::AugAssign(aug) => self.record_assignment(
                &aug.target,
                BindingKind::AugmentedAssignment,
                None,
                scope,
                in_loop,
                aug.pos,
            ),
            Stmt::Delete(del) => {
                for target in &del.targets {
                    self.record_assignment(target, BindingKind::Deletion, None, scope, in_loop, del.pos);
                }
            }
            Stmt::For(lp) | Stmt::While(lp) => {
                self.walk_stmts(&lp.body, scope, true);
                self.walk_stmts(&lp.orelse, scope, true);
            }
            Stmt::If(cond) => {
                self.walk_stmts(&cond.body, scope, in_loop);
                self.walk_stmts(&cond.orelse, scope, in_loop);
            }
            Stmt::Import(_) | Stmt::ImportFrom(_) | Stmt::Other => {}
        }
    }

    // ------------------------------------------------------------------
    // Classes and methods
    // ------------------------------------------------------------------

    fn visit_class(&mut self, class: &ClassDecl, scope: &Scope) {
        let prefix = match scope {
            Scope::Module => class.name.clone(),
            Scope::ClassBody { prefix, .. } => format!("{}.{}", prefix, class.name),
            // Function-local classes were not registered.
            _ => return,
        };
        let Some(&class_id) = self.cx.local_classes.get(&prefix) else {
            return;
        };

        let mut bases = Vec::new();
        let mut unresolved = Vec::new();
        for base in &class.bases {
            match self.resolve_base(base, &prefix) {
                Some(id) => bases.push(id),
                None => unresolved.push(base.clone()),
            }
        }
        debug!(
            class = %self.store.class(class_id).qualified_name,
            resolved = bases.len(),
            external = unresolved.len(),
            "resolved base classes"
        );
        self.store.set_class_bases(class_id, bases, unresolved);

        let body_scope = Scope::ClassBody {
            class: class_id,
            prefix,
        };
        self.walk_stmts(&class.body, &body_scope, false);
    }

    /// Resolve a base name: innermost enclosing class scope first, then
    /// module-level classes, then imports, then fully qualified names.
    fn resolve_base(&self, name: &str, defining_prefix: &str) -> Option<ClassId> {
        let mut enclosing: Vec<&str> = defining_prefix.split('.').collect();
        enclosing.pop(); // the class being defined is not a lookup scope
        for depth in (0..=enclosing.len()).rev() {
            let candidate = if depth == 0 {
                name.to_string()
            } else {
                format!("{}.{}", enclosing[..depth].join("."), name)
            };
            if let Some(&id) = self.cx.local_classes.get(&candidate) {
                return Some(id);
            }
        }
        if let Some(qualified) = self.cx.imports.resolve(name) {
            if let Some(id) = self.store.class_by_qualified_name(&qualified) {
                return Some(id);
            }
        }
        self.store.class_by_qualified_name(name)
    }

    /// A function outside any class body: `@final` cannot seal it.
    fn visit_plain_function(&mut self, func: &FunctionDecl) {
        for decorator in &func.decorators {
            if self.cx.qualifiers.is_final_decorator(&decorator.name) {
                self.sink.push(
                    DiagnosticKind::QualifierMisuse,
                    format!("final qualifier on non-method function `{}`", func.name),
                    self.cx.loc(func.pos),
                );
            }
        }
        self.collect_signature_facts(func);
        self.walk_stmts(&func.body, &Scope::Function, false);
    }

    fn visit_method_group(&mut self, class: ClassId, defs: &[&FunctionDecl]) {
        let name = defs[0].name.as_str();
        let has_overloads = defs
            .iter()
            .any(|d| self.has_marker(d, Marker::Overload));

        if has_overloads {
            let impl_def = defs
                .iter()
                .rev()
                .find(|d| !self.has_marker(d, Marker::Overload))
                .copied();
            let expected: &FunctionDecl = match impl_def {
                Some(found) if !self.cx.is_stub => found,
                _ => defs[0],
            };
            let mut is_final = false;
            for def in defs {
                if !self.has_marker(def, Marker::FinalDecorator) {
                    continue;
                }
                is_final = true;
                if !std::ptr::eq(*def, expected) {
                    let message = if self.cx.is_stub || impl_def.is_none() {
                        format!(
                            "in overloaded method `{}`, final qualifier should be applied to the first overload",
                            name
                        )
                    } else {
                        format!(
                            "in overloaded method `{}`, final qualifier should be applied only to the implementation",
                            name
                        )
                    };
                    self.sink.push(
                        DiagnosticKind::QualifierMisuse,
                        message,
                        self.cx.loc(def.pos),
                    );
                }
            }
            let kind = self.method_kind(expected);
            self.store
                .add_method(class, name, kind, is_final, self.cx.loc(expected.pos));
            for def in defs {
                self.visit_method_body(class, def, kind);
            }
        } else {
            // Plain redefinitions each register; the last one wins at
            // runtime but every site participates in override checking.
            for def in defs {
                let kind = self.method_kind(def);
                let is_final = self.has_marker(def, Marker::FinalDecorator);
                self.store
                    .add_method(class, name, kind, is_final, self.cx.loc(def.pos));
                self.visit_method_body(class, def, kind);
            }
        }
    }

    fn visit_method_body(&mut self, class: ClassId, def: &FunctionDecl, kind: MethodKind) {
        self.collect_signature_facts(def);
        let scope = if def.name == "__init__" && kind == MethodKind::Instance {
            Scope::Init { class }
        } else {
            Scope::Method { class }
        };
        self.walk_stmts(&def.body, &scope, false);
    }

    fn has_marker(&self, def: &FunctionDecl, marker: Marker) -> bool {
        def.decorators
            .iter()
            .any(|d| self.cx.qualifiers.decorator_marker(&d.name) == Some(marker))
    }

    fn method_kind(&self, def: &FunctionDecl) -> MethodKind {
        for decorator in &def.decorators {
            match self.cx.qualifiers.decorator_marker(&decorator.name) {
                Some(Marker::StaticMethod) => return MethodKind::Static,
                Some(Marker::ClassMethod) => return MethodKind::Class,
                Some(Marker::Property) => return MethodKind::Property,
                _ => {}
            }
        }
        MethodKind::Instance
    }

    /// Finality markers in signatures are always illegal positions.
    fn collect_signature_facts(&mut self, func: &FunctionDecl) {
        for p in &func.params {
            if let Some(annotation) = &p.annotation {
                if contains_final(annotation, &self.cx.qualifiers) {
                    self.store
                        .add_annotation_fact(AnnotationPosition::Parameter, self.cx.loc(p.pos));
                }
            }
        }
        if let Some(returns) = &func.returns {
            if contains_final(returns, &self.cx.qualifiers) {
                self.store
                    .add_annotation_fact(AnnotationPosition::ReturnType, self.cx.loc(func.pos));
            }
        }
    }

    // ------------------------------------------------------------------
    // Assignments and declarations
    // ------------------------------------------------------------------

    fn visit_ann_assign(&mut self, ann: &AnnAssignStmt, scope: &Scope, in_loop: bool) {
        let info = analyze_annotation(&ann.annotation, &self.cx.qualifiers);
        if info.nested_final {
            self.store
                .add_annotation_fact(AnnotationPosition::Nested, self.cx.loc(ann.pos));
        }
        if !info.is_final {
            // A plain annotated assignment still re-binds its target.
            if ann.value.is_some() {
                self.record_assignment(
                    &ann.target,
                    BindingKind::Assignment,
                    ann.value.as_ref(),
                    scope,
                    in_loop,
                    ann.pos,
                );
            }
            return;
        }

        let literal = ann.value.as_ref().and_then(Expr::literal).cloned();
        let has_value = ann.value.is_some();
        match (&ann.target, scope) {
            (AssignTarget::Name { name }, Scope::Module) => {
                self.declare_symbol(
                    name,
                    SymbolOwner::Module(self.cx.id),
                    BindingScope::Module(self.cx.id),
                    &info,
                    has_value,
                    literal,
                    in_loop,
                    ann.pos,
                );
            }
            (AssignTarget::Name { name }, Scope::ClassBody { class, .. }) => {
                self.declare_symbol(
                    name,
                    SymbolOwner::Class(*class),
                    BindingScope::ClassBody(*class),
                    &info,
                    has_value,
                    literal,
                    in_loop,
                    ann.pos,
                );
            }
            (AssignTarget::Attribute { object, name }, Scope::Init { class })
                if object == "self" =>
            {
                self.declare_symbol(
                    name,
                    SymbolOwner::Class(*class),
                    BindingScope::InitMethod(*class),
                    &info,
                    has_value,
                    literal,
                    in_loop,
                    ann.pos,
                );
            }
            (AssignTarget::Attribute { object, .. }, Scope::Method { .. }) if object == "self" => {
                self.sink.push(
                    DiagnosticKind::IllegalQualifierPosition,
                    "final attribute may only be declared in a class body or `__init__`",
                    self.cx.loc(ann.pos),
                );
            }
            // Function-local finals and unresolvable targets are outside
            // the tracked scopes.
            _ => {}
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn declare_symbol(
        &mut self,
        name: &str,
        owner: SymbolOwner,
        declared_in: BindingScope,
        info: &AnnotationInfo,
        has_value: bool,
        literal: Option<LiteralValue>,
        in_loop: bool,
        pos: Pos,
    ) {
        if self.store.symbol_for(owner, name).is_some() {
            let what = match owner {
                SymbolOwner::Module(_) => "name",
                SymbolOwner::Class(_) => "attribute",
            };
            self.sink.push(
                DiagnosticKind::IllegalReassignment,
                format!("cannot assign to final {} `{}`", what, name),
                self.cx.loc(pos),
            );
            return;
        }
        let id = self.store.add_symbol(NewSymbol {
            name: name.to_string(),
            owner,
            declared_in,
            declared_type: info.declared_type.clone(),
            has_initializer: has_value,
            also_class_var: info.is_class_var,
            location: self.cx.loc(pos),
        });
        if has_value {
            self.store.add_binding(
                name,
                declared_in,
                BindingKind::Declaration,
                in_loop,
                literal,
                self.cx.loc(pos),
            );
        }
        debug!(symbol = %id, name, "declared final symbol");
    }

    fn record_assignment(
        &mut self,
        target: &AssignTarget,
        kind: BindingKind,
        value: Option<&Expr>,
        scope: &Scope,
        in_loop: bool,
        pos: Pos,
    ) {
        let literal = value.and_then(Expr::literal).cloned();
        let binding_scope = match (target, scope) {
            (AssignTarget::Name { .. }, Scope::Module) => BindingScope::Module(self.cx.id),
            (AssignTarget::Name { .. }, Scope::ClassBody { class, .. }) => {
                BindingScope::ClassBody(*class)
            }
            (AssignTarget::Attribute { object, .. }, Scope::Init { class })
                if object == "self" =>
            {
                BindingScope::InitMethod(*class)
            }
            (AssignTarget::Attribute { object, .. }, Scope::Method { class })
                if object == "self" =>
            {
                BindingScope::Method(*class)
            }
            // `Config.x = ...` at module level binds the class attribute.
            (AssignTarget::Attribute { object, .. }, Scope::Module) => {
                match self.cx.local_classes.get(object) {
                    Some(&class) => BindingScope::ClassBody(class),
                    None => return,
                }
            }
            _ => return,
        };
        let name = match target {
            AssignTarget::Name { name } => name,
            AssignTarget::Attribute { name, .. } => name,
            AssignTarget::Other => return,
        };
        self.store
            .add_binding(name, binding_scope, kind, in_loop, literal, self.cx.loc(pos));
    }
}

/// Group a class body's function definitions by name, preserving
/// first-occurrence order.
fn group_methods(stmts: &[Stmt]) -> Vec<Vec<&FunctionDecl>> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&FunctionDecl>> = HashMap::new();
    for stmt in stmts {
        if let Stmt::FunctionDef(func) = stmt {
            let entry = groups.entry(func.name.as_str()).or_default();
            if entry.is_empty() {
                order.push(func.name.as_str());
            }
            entry.push(func);
        }
    }
    order
        .into_iter()
        .map(|name| groups.remove(name).unwrap_or_default())
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
