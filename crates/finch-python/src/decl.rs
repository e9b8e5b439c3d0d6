//! Declaration snapshot model: the declaration-level abstract syntax of a
//! Python module, as produced by a host frontend.
//!
//! This is the canonical input of the checker. It deliberately stops at
//! declaration granularity — class definitions with base lists and
//! decorators, function definitions with signatures, assignments with
//! annotations, imports, and the statement containers that can hold them
//! (loops, conditionals). Expression bodies beyond literals are opaque.
//!
//! All types are serde-serializable; a snapshot on disk is one JSON
//! `Module` (or an array of them) per file.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use finch_core::facts::LiteralValue;

// ============================================================================
// Error Types
// ============================================================================

/// Errors decoding a declaration snapshot.
#[derive(Debug, Error)]
pub enum DeclError {
    /// The JSON text is not a valid module (or module list).
    #[error("invalid declaration snapshot: {0}")]
    Invalid(#[from] serde_json::Error),
}

/// Result type for snapshot decoding.
pub type DeclResult<T> = Result<T, DeclError>;

// ============================================================================
// Positions
// ============================================================================

/// Position of a declaration inside its module (1-indexed line/column).
///
/// The module path is carried on [`Module`]; the collector combines the
/// two into full source locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pos {
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed, UTF-8 bytes).
    pub col: u32,
}

impl Pos {
    /// Create a new position.
    pub fn new(line: u32, col: u32) -> Self {
        Pos { line, col }
    }
}

// ============================================================================
// Module
// ============================================================================

/// One analyzed module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    /// Workspace-relative path (e.g. `pkg/mod.py`).
    pub path: String,
    /// Explicit stub marker; when absent, inferred from a `.pyi` extension.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stub: Option<bool>,
    /// Top-level statements in source order.
    #[serde(default)]
    pub body: Vec<Stmt>,
}

impl Module {
    /// Create an empty module for the given path.
    pub fn new(path: impl Into<String>) -> Self {
        Module {
            path: path.into(),
            stub: None,
            body: Vec::new(),
        }
    }

    /// True for interface-only modules (explicit marker or `.pyi` path).
    pub fn is_stub(&self) -> bool {
        self.stub.unwrap_or_else(|| self.path.ends_with(".pyi"))
    }

    /// Dotted module name derived from the path: `pkg/mod.py` → `pkg.mod`,
    /// `pkg/__init__.py` → `pkg`.
    pub fn dotted_name(&self) -> String {
        let mut name = self.path.as_str();
        for suffix in [".pyi", ".py"] {
            if let Some(stripped) = name.strip_suffix(suffix) {
                name = stripped;
                break;
            }
        }
        let name = name.strip_suffix("/__init__").unwrap_or(name);
        name.replace('/', ".")
    }

    /// Decode one module, or a list of modules, from JSON text.
    pub fn decode_many(json: &str) -> DeclResult<Vec<Module>> {
        match serde_json::from_str::<Vec<Module>>(json) {
            Ok(modules) => Ok(modules),
            Err(_) => Ok(vec![serde_json::from_str::<Module>(json)?]),
        }
    }
}

// ============================================================================
// Statements
// ============================================================================

/// A declaration-level statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "stmt", rename_all = "snake_case")]
pub enum Stmt {
    /// `class Name(Bases): ...` with decorators.
    ClassDef(ClassDecl),
    /// `def name(params) -> ret: ...` with decorators.
    FunctionDef(FunctionDecl),
    /// Plain assignment `target = value`.
    Assign(AssignStmt),
    /// Annotated assignment `target: annotation [= value]`.
    AnnAssign(AnnAssignStmt),
    /// Augmented assignment `target += value`.
    AugAssign(AugAssignStmt),
    /// `del target, ...`.
    Delete(DeleteStmt),
    /// `import module [as alias]`.
    Import(ImportStmt),
    /// `from module import name [as alias], ...`.
    ImportFrom(ImportFromStmt),
    /// `for ...: body else: orelse` (targets are opaque).
    For(LoopStmt),
    /// `while ...: body else: orelse`.
    While(LoopStmt),
    /// `if ...: body else: orelse` (condition is opaque).
    If(IfStmt),
    /// Anything the frontend chose not to model.
    #[serde(other)]
    Other,
}

/// A class definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassDecl {
    /// Class name.
    pub name: String,
    /// Base class names as written (possibly dotted), in order.
    #[serde(default)]
    pub bases: Vec<String>,
    /// Decorators, outermost first.
    #[serde(default)]
    pub decorators: Vec<Decorator>,
    /// Class body statements in source order.
    #[serde(default)]
    pub body: Vec<Stmt>,
    /// Declaration position.
    pub pos: Pos,
}

/// A function or method definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDecl {
    /// Function name.
    pub name: String,
    /// Decorators, outermost first.
    #[serde(default)]
    pub decorators: Vec<Decorator>,
    /// Parameters in order (including `self`/`cls` when present).
    #[serde(default)]
    pub params: Vec<Param>,
    /// Return type annotation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<TypeExpr>,
    /// Body statements in source order.
    #[serde(default)]
    pub body: Vec<Stmt>,
    /// Declaration position.
    pub pos: Pos,
}

/// A decorator application, by dotted name as written (`final`,
/// `typing.final`, `staticmethod`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decorator {
    /// Dotted name as written.
    pub name: String,
    /// Decorator position.
    pub pos: Pos,
}

/// A function parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Param {
    /// Parameter name.
    pub name: String,
    /// Type annotation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<TypeExpr>,
    /// Parameter position.
    pub pos: Pos,
}

/// An assignment target.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum AssignTarget {
    /// A bare name (`x`).
    Name {
        /// The name.
        name: String,
    },
    /// An attribute on a named object (`self.x`, `Config.x`).
    Attribute {
        /// The object the attribute is accessed on.
        object: String,
        /// The attribute name.
        name: String,
    },
    /// Subscripts, stars, tuples — nothing finality tracks.
    #[serde(other)]
    Other,
}

/// Plain assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignStmt {
    /// Targets (one per `=` chain element).
    pub targets: Vec<AssignTarget>,
    /// Right-hand side, when the frontend modeled it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Expr>,
    /// Statement position.
    pub pos: Pos,
}

/// Annotated assignment (with or without a value).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnAssignStmt {
    /// The single target.
    pub target: AssignTarget,
    /// The annotation.
    pub annotation: TypeExpr,
    /// Right-hand side, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Expr>,
    /// Statement position.
    pub pos: Pos,
}

/// Augmented assignment (`+=`, `|=`, ...; the operator is irrelevant here).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AugAssignStmt {
    /// The single target.
    pub target: AssignTarget,
    /// Statement position.
    pub pos: Pos,
}

/// Deletion statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteStmt {
    /// Deleted targets.
    pub targets: Vec<AssignTarget>,
    /// Statement position.
    pub pos: Pos,
}

/// `import module [as alias]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportStmt {
    /// Dotted module name.
    pub module: String,
    /// Local alias, when given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Statement position.
    pub pos: Pos,
}

/// `from module import name [as alias], ...`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportFromStmt {
    /// Dotted source module name.
    pub module: String,
    /// Imported names.
    pub names: Vec<ImportedName>,
    /// Statement position.
    pub pos: Pos,
}

/// One name in a `from ... import` list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportedName {
    /// Name in the source module.
    pub name: String,
    /// Local alias, when given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl ImportedName {
    /// The name this import binds locally.
    pub fn local_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// A loop statement; only the bodies matter to finality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoopStmt {
    /// Loop body.
    #[serde(default)]
    pub body: Vec<Stmt>,
    /// `else:` clause body.
    #[serde(default)]
    pub orelse: Vec<Stmt>,
    /// Statement position.
    pub pos: Pos,
}

/// A conditional statement; both branches are scanned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IfStmt {
    /// `if` branch body.
    #[serde(default)]
    pub body: Vec<Stmt>,
    /// `else`/`elif` branch body.
    #[serde(default)]
    pub orelse: Vec<Stmt>,
    /// Statement position.
    pub pos: Pos,
}

// ============================================================================
// Type Expressions
// ============================================================================

/// A type annotation expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TypeExpr {
    /// A possibly dotted name (`int`, `typing.Final`).
    Name {
        /// The dotted name.
        name: String,
    },
    /// A subscripted constructor (`Final[int]`, `Dict[str, int]`).
    Subscript {
        /// The constructor being subscripted.
        value: Box<TypeExpr>,
        /// Subscript arguments in order.
        args: Vec<TypeExpr>,
    },
    /// Anything else (string forward references, unions, callables).
    #[serde(other)]
    Other,
}

impl TypeExpr {
    /// A name expression.
    pub fn name(name: impl Into<String>) -> Self {
        TypeExpr::Name { name: name.into() }
    }

    /// A subscript expression.
    pub fn subscript(value: TypeExpr, args: Vec<TypeExpr>) -> Self {
        TypeExpr::Subscript {
            value: Box::new(value),
            args,
        }
    }

    /// Render the expression back to annotation syntax.
    pub fn render(&self) -> String {
        match self {
            TypeExpr::Name { name } => name.clone(),
            TypeExpr::Subscript { value, args } => {
                let rendered: Vec<String> = args.iter().map(TypeExpr::render).collect();
                format!("{}[{}]", value.render(), rendered.join(", "))
            }
            TypeExpr::Other => "...".to_string(),
        }
    }
}

// ============================================================================
// Value Expressions
// ============================================================================

/// A right-hand-side expression; only literals are modeled, everything
/// else is opaque.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "expr", rename_all = "snake_case")]
pub enum Expr {
    /// A literal value.
    Literal {
        /// The literal.
        #[serde(flatten)]
        value: LiteralValue,
    },
    /// Any non-literal expression.
    #[serde(other)]
    Opaque,
}

impl Expr {
    /// An integer literal.
    pub fn int(v: i64) -> Self {
        Expr::Literal {
            value: LiteralValue::Int(v),
        }
    }

    /// A string literal.
    pub fn str(v: impl Into<String>) -> Self {
        Expr::Literal {
            value: LiteralValue::Str(v.into()),
        }
    }

    /// The literal carried by this expression, if any.
    pub fn literal(&self) -> Option<&LiteralValue> {
        match self {
            Expr::Literal { value } => Some(value),
            Expr::Opaque => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
