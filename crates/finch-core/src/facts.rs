//! Finality facts: normalized tables describing the qualified surface of a
//! declaration snapshot.
//!
//! The collector in `finch-python` populates a [`FinalityStore`] with:
//! - [`ModuleRecord`]: analyzed modules (stub or implementation)
//! - [`ClassNode`]: classes in the inheritance graph, arena-indexed
//! - [`MethodBinding`]: methods defined within a class
//! - [`QualifiedSymbol`]: `Final`-annotated variables and attributes
//! - [`Binding`]: assignment facts in the tracked scopes
//! - [`AnnotationFact`]: occurrences of the finality marker in type positions
//!
//! The store is built once per check and read-only thereafter. Classes are
//! held in an arena referenced by [`ClassId`] — the hierarchy is a DAG with
//! potential diamonds, so base edges are id lists, never owned pointers.
//! Vectors preserve declaration order and the postings maps exist only for
//! lookups, so iteration is deterministic.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::Location;

// ============================================================================
// ID Types
// ============================================================================

/// Unique identifier for a module within a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct ModuleId(pub u32);

impl ModuleId {
    /// Create a new module ID.
    pub fn new(id: u32) -> Self {
        ModuleId(id)
    }
}

impl std::fmt::Display for ModuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "mod_{}", self.0)
    }
}

/// Unique identifier for a class within a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct ClassId(pub u32);

impl ClassId {
    /// Create a new class ID.
    pub fn new(id: u32) -> Self {
        ClassId(id)
    }
}

impl std::fmt::Display for ClassId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "class_{}", self.0)
    }
}

/// Unique identifier for a method binding within a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct MethodId(pub u32);

impl MethodId {
    /// Create a new method ID.
    pub fn new(id: u32) -> Self {
        MethodId(id)
    }
}

impl std::fmt::Display for MethodId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "method_{}", self.0)
    }
}

/// Unique identifier for a qualified symbol within a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

impl SymbolId {
    /// Create a new symbol ID.
    pub fn new(id: u32) -> Self {
        SymbolId(id)
    }
}

impl std::fmt::Display for SymbolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sym_{}", self.0)
    }
}

/// Unique identifier for a binding fact within a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct BindingId(pub u32);

impl BindingId {
    /// Create a new binding ID.
    pub fn new(id: u32) -> Self {
        BindingId(id)
    }
}

impl std::fmt::Display for BindingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "bind_{}", self.0)
    }
}

// ============================================================================
// Enumerations
// ============================================================================

/// Owner of a qualified symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolOwner {
    /// Declared at module top level.
    Module(ModuleId),
    /// Declared as a class or instance attribute.
    Class(ClassId),
}

/// Scope of a binding fact.
///
/// The first three are the legal binding scopes for final symbols; `Method`
/// records assignments inside non-initializer method bodies, which are
/// never a legal binding site for a final attribute but must be seen to be
/// flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingScope {
    /// Module top level.
    Module(ModuleId),
    /// Directly inside a class body.
    ClassBody(ClassId),
    /// Inside an initializer method (`__init__`) of the class.
    InitMethod(ClassId),
    /// Inside a non-initializer method body of the class.
    Method(ClassId),
}

/// How a binding site binds its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingKind {
    /// Annotated declaration with a value (`x: Final[int] = 1`).
    Declaration,
    /// Plain assignment (`x = 1`).
    Assignment,
    /// Augmented assignment (`x += 1`).
    AugmentedAssignment,
    /// Deletion (`del x`).
    Deletion,
}

/// Kind of a method binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodKind {
    /// Plain instance method.
    Instance,
    /// `@classmethod`.
    Class,
    /// `@staticmethod`.
    Static,
    /// `@property`.
    Property,
}

/// Where a finality marker appeared inside a type expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationPosition {
    /// Nested inside another type constructor (`List[Final[int]]`).
    Nested,
    /// In a function parameter annotation.
    Parameter,
    /// In a function return type annotation.
    ReturnType,
}

/// A literal initializer value recorded for downstream substitution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum LiteralValue {
    /// Integer literal.
    Int(i64),
    /// String literal.
    Str(String),
    /// Bytes literal.
    Bytes(Vec<u8>),
    /// Boolean literal.
    Bool(bool),
    /// The `None` literal.
    None,
}

impl std::fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LiteralValue::Int(v) => write!(f, "{}", v),
            LiteralValue::Str(v) => write!(f, "{:?}", v),
            LiteralValue::Bytes(v) => write!(f, "b<{} bytes>", v.len()),
            LiteralValue::Bool(v) => write!(f, "{}", if *v { "True" } else { "False" }),
            LiteralValue::None => write!(f, "None"),
        }
    }
}

// ============================================================================
// Records
// ============================================================================

/// An analyzed module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleRecord {
    /// Module ID.
    pub id: ModuleId,
    /// Workspace-relative path (e.g. `pkg/mod.py`).
    pub path: String,
    /// Dotted module name derived from the path (e.g. `pkg.mod`).
    pub name: String,
    /// True for interface-only (`.pyi`) modules, where missing initializers
    /// are permitted.
    pub is_stub: bool,
}

/// A class in the inheritance graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassNode {
    /// Class ID (arena index).
    pub id: ClassId,
    /// Module the class is declared in.
    pub module: ModuleId,
    /// Simple class name.
    pub name: String,
    /// Fully qualified name (`pkg.mod.Outer.Inner`).
    pub qualified_name: String,
    /// Resolved base classes, in declaration order.
    pub bases: Vec<ClassId>,
    /// Base names that did not resolve to a snapshot class (external types).
    pub unresolved_bases: Vec<String>,
    /// Sealed against subclassing (`@final`).
    pub is_final: bool,
    /// Declaration site.
    pub location: Location,
}

/// A method defined within a class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodBinding {
    /// Method ID.
    pub id: MethodId,
    /// Declaring class.
    pub owner: ClassId,
    /// Method name.
    pub name: String,
    /// Instance / class / static / property.
    pub kind: MethodKind,
    /// Sealed against overriding (`@final`).
    pub is_final: bool,
    /// Declaration site (the implementation for overloaded groups).
    pub location: Location,
}

/// A `Final`-annotated variable or attribute.
///
/// Finality spans two orthogonal axes; `single_assignment` is the axis this
/// record carries, while `sealed_from_override` lives on [`ClassNode`] and
/// [`MethodBinding`] as `is_final`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualifiedSymbol {
    /// Symbol ID.
    pub id: SymbolId,
    /// Symbol name (attribute name for `self.x`).
    pub name: String,
    /// Enclosing module or class.
    pub owner: SymbolOwner,
    /// Scope of the declaration site.
    pub declared_in: BindingScope,
    /// Explicit type inside `Final[...]`, rendered; `None` when inferred
    /// from the initializer (`x: Final = 3`).
    pub declared_type: Option<String>,
    /// Declaration carries a value.
    pub has_initializer: bool,
    /// The annotation combined `ClassVar` with `Final`.
    pub also_class_var: bool,
    /// Single-assignment axis flag.
    pub single_assignment: bool,
    /// Declaration site.
    pub location: Location,
}

/// A single assignment fact for a name in a tracked scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Binding {
    /// Binding ID.
    pub id: BindingId,
    /// Bound name (attribute name for `self.x`).
    pub name: String,
    /// Scope of the binding site.
    pub scope: BindingScope,
    /// How the site binds.
    pub kind: BindingKind,
    /// The site is inside a loop body.
    pub in_loop: bool,
    /// Literal right-hand side, when there is one.
    pub value: Option<LiteralValue>,
    /// Binding site.
    pub location: Location,
}

/// An occurrence of the finality marker at an illegal type position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationFact {
    /// Where inside the type expression the marker appeared.
    pub position: AnnotationPosition,
    /// Annotation site.
    pub location: Location,
}

// ============================================================================
// FinalityStore
// ============================================================================

/// In-memory store of finality facts for one snapshot.
///
/// Tables preserve declaration order; postings maps provide O(1) lookups.
/// Built by the collector, then read-only for both validators.
#[derive(Debug, Default)]
pub struct FinalityStore {
    modules: Vec<ModuleRecord>,
    classes: Vec<ClassNode>,
    methods: Vec<MethodBinding>,
    symbols: Vec<QualifiedSymbol>,
    bindings: Vec<Binding>,
    annotations: Vec<AnnotationFact>,

    class_by_qualified_name: HashMap<String, ClassId>,
    subclasses: HashMap<ClassId, Vec<ClassId>>,
    methods_by_class: HashMap<ClassId, Vec<MethodId>>,
    symbols_by_owner: HashMap<SymbolOwner, Vec<SymbolId>>,
    symbol_index: HashMap<(SymbolOwner, String), SymbolId>,
    bindings_by_scope: HashMap<BindingScope, Vec<BindingId>>,
}

impl FinalityStore {
    /// Create an empty store.
    pub fn new() -> Self {
        FinalityStore::default()
    }

    // ------------------------------------------------------------------
    // Construction (collector-facing)
    // ------------------------------------------------------------------

    /// Register a module, returning its ID.
    pub fn add_module(
        &mut self,
        path: impl Into<String>,
        name: impl Into<String>,
        is_stub: bool,
    ) -> ModuleId {
        let id = ModuleId::new(self.modules.len() as u32);
        self.modules.push(ModuleRecord {
            id,
            path: path.into(),
            name: name.into(),
            is_stub,
        });
        id
    }

    /// Register a class with empty base edges; bases are filled in by
    /// [`FinalityStore::set_class_bases`] once every class is known.
    pub fn add_class(
        &mut self,
        module: ModuleId,
        name: impl Into<String>,
        qualified_name: impl Into<String>,
        is_final: bool,
        location: Location,
    ) -> ClassId {
        let id = ClassId::new(self.classes.len() as u32);
        let qualified_name = qualified_name.into();
        self.class_by_qualified_name
            .entry(qualified_name.clone())
            .or_insert(id);
        self.classes.push(ClassNode {
            id,
            module,
            name: name.into(),
            qualified_name,
            bases: Vec::new(),
            unresolved_bases: Vec::new(),
            is_final,
            location,
        });
        id
    }

    /// Set the resolved base edges of a class and index the reverse
    /// (subclass) edges.
    pub fn set_class_bases(&mut self, id: ClassId, bases: Vec<ClassId>, unresolved: Vec<String>) {
        for &base in &bases {
            self.subclasses.entry(base).or_default().push(id);
        }
        let class = &mut self.classes[id.0 as usize];
        class.bases = bases;
        class.unresolved_bases = unresolved;
    }

    /// Register a method binding.
    pub fn add_method(
        &mut self,
        owner: ClassId,
        name: impl Into<String>,
        kind: MethodKind,
        is_final: bool,
        location: Location,
    ) -> MethodId {
        let id = MethodId::new(self.methods.len() as u32);
        self.methods_by_class.entry(owner).or_default().push(id);
        self.methods.push(MethodBinding {
            id,
            owner,
            name: name.into(),
            kind,
            is_final,
            location,
        });
        id
    }

    /// Register a qualified symbol. The caller must have checked
    /// [`FinalityStore::symbol_for`] first; a second symbol for the same
    /// (owner, name) pair is a collector bug.
    pub fn add_symbol(&mut self, symbol: NewSymbol) -> SymbolId {
        let id = SymbolId::new(self.symbols.len() as u32);
        debug_assert!(
            !self
                .symbol_index
                .contains_key(&(symbol.owner, symbol.name.clone())),
            "duplicate qualified symbol for {:?}.{}",
            symbol.owner,
            symbol.name
        );
        self.symbol_index
            .insert((symbol.owner, symbol.name.clone()), id);
        self.symbols_by_owner
            .entry(symbol.owner)
            .or_default()
            .push(id);
        self.symbols.push(QualifiedSymbol {
            id,
            name: symbol.name,
            owner: symbol.owner,
            declared_in: symbol.declared_in,
            declared_type: symbol.declared_type,
            has_initializer: symbol.has_initializer,
            also_class_var: symbol.also_class_var,
            single_assignment: true,
            location: symbol.location,
        });
        id
    }

    /// Register a binding fact.
    pub fn add_binding(
        &mut self,
        name: impl Into<String>,
        scope: BindingScope,
        kind: BindingKind,
        in_loop: bool,
        value: Option<LiteralValue>,
        location: Location,
    ) -> BindingId {
        let id = BindingId::new(self.bindings.len() as u32);
        self.bindings_by_scope.entry(scope).or_default().push(id);
        self.bindings.push(Binding {
            id,
            name: name.into(),
            scope,
            kind,
            in_loop,
            value,
            location,
        });
        id
    }

    /// Record a finality marker at an illegal type position.
    pub fn add_annotation_fact(&mut self, position: AnnotationPosition, location: Location) {
        self.annotations.push(AnnotationFact { position, location });
    }

    // ------------------------------------------------------------------
    // Queries (validator-facing)
    // ------------------------------------------------------------------

    /// All modules, in registration order.
    pub fn modules(&self) -> &[ModuleRecord] {
        &self.modules
    }

    /// Look up a module record.
    pub fn module(&self, id: ModuleId) -> &ModuleRecord {
        &self.modules[id.0 as usize]
    }

    /// All classes, in declaration order.
    pub fn classes(&self) -> &[ClassNode] {
        &self.classes
    }

    /// Look up a class node.
    pub fn class(&self, id: ClassId) -> &ClassNode {
        &self.classes[id.0 as usize]
    }

    /// Resolve a fully qualified class name.
    pub fn class_by_qualified_name(&self, name: &str) -> Option<ClassId> {
        self.class_by_qualified_name.get(name).copied()
    }

    /// Direct subclasses of a class, in declaration order.
    pub fn direct_subclasses(&self, id: ClassId) -> &[ClassId] {
        self.subclasses.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All methods, in declaration order.
    pub fn methods(&self) -> &[MethodBinding] {
        &self.methods
    }

    /// Methods declared by a class, in declaration order.
    pub fn methods_of(&self, class: ClassId) -> impl Iterator<Item = &MethodBinding> {
        self.methods_by_class
            .get(&class)
            .map(Vec::as_slice)
            .unwrap_or(&[])
            .iter()
            .map(|&id| &self.methods[id.0 as usize])
    }

    /// All qualified symbols, in declaration order.
    pub fn symbols(&self) -> &[QualifiedSymbol] {
        &self.symbols
    }

    /// Look up a qualified symbol.
    pub fn symbol(&self, id: SymbolId) -> &QualifiedSymbol {
        &self.symbols[id.0 as usize]
    }

    /// Symbols declared under an owner, in declaration order.
    pub fn symbols_of(&self, owner: SymbolOwner) -> impl Iterator<Item = &QualifiedSymbol> {
        self.symbols_by_owner
            .get(&owner)
            .map(Vec::as_slice)
            .unwrap_or(&[])
            .iter()
            .map(|&id| &self.symbols[id.0 as usize])
    }

    /// The symbol registered for (owner, name), if any.
    pub fn symbol_for(&self, owner: SymbolOwner, name: &str) -> Option<SymbolId> {
        self.symbol_index.get(&(owner, name.to_string())).copied()
    }

    /// All binding facts, in collection order.
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Binding facts in a scope, in collection (source) order.
    pub fn bindings_in_scope(&self, scope: BindingScope) -> impl Iterator<Item = &Binding> {
        self.bindings_by_scope
            .get(&scope)
            .map(Vec::as_slice)
            .unwrap_or(&[])
            .iter()
            .map(|&id| &self.bindings[id.0 as usize])
    }

    /// All annotation facts, in collection order.
    pub fn annotation_facts(&self) -> &[AnnotationFact] {
        &self.annotations
    }

    /// True when the symbol's declaring module is a stub.
    pub fn symbol_in_stub(&self, symbol: &QualifiedSymbol) -> bool {
        let module = match symbol.owner {
            SymbolOwner::Module(m) => m,
            SymbolOwner::Class(c) => self.class(c).module,
        };
        self.module(module).is_stub
    }
}

/// Field bundle for [`FinalityStore::add_symbol`].
#[derive(Debug, Clone)]
pub struct NewSymbol {
    /// Symbol name.
    pub name: String,
    /// Enclosing module or class.
    pub owner: SymbolOwner,
    /// Scope of the declaration site.
    pub declared_in: BindingScope,
    /// Explicit declared type, rendered.
    pub declared_type: Option<String>,
    /// Declaration carries a value.
    pub has_initializer: bool,
    /// `ClassVar` combined with `Final`.
    pub also_class_var: bool,
    /// Declaration site.
    pub location: Location,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(line: u32) -> Location {
        Location::new("mod.py", line, 1)
    }

    mod ids {
        use super::*;

        #[test]
        fn display_uses_stable_prefixes() {
            assert_eq!(ModuleId::new(0).to_string(), "mod_0");
            assert_eq!(ClassId::new(1).to_string(), "class_1");
            assert_eq!(MethodId::new(2).to_string(), "method_2");
            assert_eq!(SymbolId::new(3).to_string(), "sym_3");
            assert_eq!(BindingId::new(4).to_string(), "bind_4");
        }
    }

    mod store {
        use super::*;

        #[test]
        fn subclass_postings_follow_declaration_order() {
            let mut store = FinalityStore::new();
            let m = store.add_module("mod.py", "mod", false);
            let base = store.add_class(m, "Base", "mod.Base", true, loc(1));
            let d1 = store.add_class(m, "D1", "mod.D1", false, loc(5));
            let d2 = store.add_class(m, "D2", "mod.D2", false, loc(9));
            store.set_class_bases(base, vec![], vec![]);
            store.set_class_bases(d1, vec![base], vec![]);
            store.set_class_bases(d2, vec![base], vec![]);
            assert_eq!(store.direct_subclasses(base), &[d1, d2]);
            assert!(store.direct_subclasses(d1).is_empty());
        }

        #[test]
        fn qualified_name_lookup() {
            let mut store = FinalityStore::new();
            let m = store.add_module("pkg/mod.py", "pkg.mod", false);
            let c = store.add_class(m, "Inner", "pkg.mod.Outer.Inner", false, loc(3));
            assert_eq!(store.class_by_qualified_name("pkg.mod.Outer.Inner"), Some(c));
            assert_eq!(store.class_by_qualified_name("pkg.mod.Missing"), None);
        }

        #[test]
        fn symbol_index_is_per_owner() {
            let mut store = FinalityStore::new();
            let m = store.add_module("mod.py", "mod", false);
            let c = store.add_class(m, "C", "mod.C", false, loc(1));
            let module_owner = SymbolOwner::Module(m);
            let class_owner = SymbolOwner::Class(c);
            let s1 = store.add_symbol(NewSymbol {
                name: "x".into(),
                owner: module_owner,
                declared_in: BindingScope::Module(m),
                declared_type: None,
                has_initializer: true,
                also_class_var: false,
                location: loc(2),
            });
            let s2 = store.add_symbol(NewSymbol {
                name: "x".into(),
                owner: class_owner,
                declared_in: BindingScope::ClassBody(c),
                declared_type: Some("int".into()),
                has_initializer: false,
                also_class_var: false,
                location: loc(4),
            });
            assert_eq!(store.symbol_for(module_owner, "x"), Some(s1));
            assert_eq!(store.symbol_for(class_owner, "x"), Some(s2));
            assert_eq!(store.symbol_for(class_owner, "y"), None);
        }

        #[test]
        fn bindings_grouped_by_scope_in_source_order() {
            let mut store = FinalityStore::new();
            let m = store.add_module("mod.py", "mod", false);
            let scope = BindingScope::Module(m);
            store.add_binding("x", scope, BindingKind::Declaration, false, None, loc(1));
            store.add_binding("x", scope, BindingKind::Assignment, false, None, loc(8));
            let lines: Vec<u32> = store
                .bindings_in_scope(scope)
                .map(|b| b.location.line)
                .collect();
            assert_eq!(lines, vec![1, 8]);
        }

        #[test]
        fn stub_detection_follows_owner_module() {
            let mut store = FinalityStore::new();
            let m = store.add_module("mod.pyi", "mod", true);
            let c = store.add_class(m, "C", "mod.C", false, loc(1));
            let sid = store.add_symbol(NewSymbol {
                name: "x".into(),
                owner: SymbolOwner::Class(c),
                declared_in: BindingScope::ClassBody(c),
                declared_type: Some("int".into()),
                has_initializer: false,
                also_class_var: false,
                location: loc(2),
            });
            assert!(store.symbol_in_stub(store.symbol(sid)));
        }
    }

    mod literals {
        use super::*;

        #[test]
        fn display_renders_python_spellings() {
            assert_eq!(LiteralValue::Int(3000).to_string(), "3000");
            assert_eq!(LiteralValue::Bool(true).to_string(), "True");
            assert_eq!(LiteralValue::None.to_string(), "None");
            assert_eq!(LiteralValue::Str("a".into()).to_string(), "\"a\"");
        }

        #[test]
        fn serde_round_trip() {
            let v = LiteralValue::Int(42);
            let json = serde_json::to_string(&v).unwrap();
            assert_eq!(json, "{\"kind\":\"int\",\"value\":42}");
            let back: LiteralValue = serde_json::from_str(&json).unwrap();
            assert_eq!(back, v);
        }
    }
}
