//! Construction helpers for declaration snapshots in tests.
//!
//! Building [`Module`] trees by hand is noisy; these helpers keep unit and
//! integration tests readable. Positions default to column 1, so tests
//! distinguish sites by line number.

use crate::decl::{
    AnnAssignStmt, AssignStmt, AssignTarget, AugAssignStmt, ClassDecl, Decorator, DeleteStmt, Expr,
    FunctionDecl, IfStmt, ImportFromStmt, ImportStmt, ImportedName, LoopStmt, Module, Param, Pos,
    Stmt, TypeExpr,
};

/// Position at the given line, column 1.
pub fn pos(line: u32) -> Pos {
    Pos::new(line, 1)
}

/// A module with the given path and body.
pub fn module(path: &str, body: Vec<Stmt>) -> Module {
    Module {
        path: path.to_string(),
        stub: None,
        body,
    }
}

/// A module explicitly marked as a stub.
pub fn stub_module(path: &str, body: Vec<Stmt>) -> Module {
    Module {
        path: path.to_string(),
        stub: Some(true),
        body,
    }
}

/// `import module [as alias]`.
pub fn import_module(module: &str, alias: Option<&str>, line: u32) -> Stmt {
    Stmt::Import(ImportStmt {
        module: module.to_string(),
        alias: alias.map(str::to_string),
        pos: pos(line),
    })
}

/// `from module import name [as alias], ...`.
pub fn import_from(module: &str, names: &[(&str, Option<&str>)], line: u32) -> Stmt {
    Stmt::ImportFrom(ImportFromStmt {
        module: module.to_string(),
        names: names
            .iter()
            .map(|(name, alias)| ImportedName {
                name: name.to_string(),
                alias: alias.map(str::to_string),
            })
            .collect(),
        pos: pos(line),
    })
}

/// `from typing import Final, ClassVar, final, overload` at the given line.
pub fn typing_imports(line: u32) -> Stmt {
    import_from(
        "typing",
        &[
            ("Final", None),
            ("ClassVar", None),
            ("final", None),
            ("overload", None),
        ],
        line,
    )
}

/// A decorator by dotted name.
pub fn dec(name: &str, line: u32) -> Decorator {
    Decorator {
        name: name.to_string(),
        pos: pos(line),
    }
}

/// A class definition.
pub fn class_def(
    name: &str,
    bases: &[&str],
    decorators: Vec<Decorator>,
    body: Vec<Stmt>,
    line: u32,
) -> Stmt {
    Stmt::ClassDef(ClassDecl {
        name: name.to_string(),
        bases: bases.iter().map(|b| b.to_string()).collect(),
        decorators,
        body,
        pos: pos(line),
    })
}

/// A function definition without parameters or return annotation.
pub fn func(name: &str, decorators: Vec<Decorator>, body: Vec<Stmt>, line: u32) -> Stmt {
    func_full(name, decorators, vec![], None, body, line)
}

/// A function definition with full signature control.
pub fn func_full(
    name: &str,
    decorators: Vec<Decorator>,
    params: Vec<Param>,
    returns: Option<TypeExpr>,
    body: Vec<Stmt>,
    line: u32,
) -> Stmt {
    Stmt::FunctionDef(FunctionDecl {
        name: name.to_string(),
        decorators,
        params,
        returns,
        body,
        pos: pos(line),
    })
}

/// A parameter with an optional annotation.
pub fn param(name: &str, annotation: Option<TypeExpr>, line: u32) -> Param {
    Param {
        name: name.to_string(),
        annotation,
        pos: pos(line),
    }
}

/// A bare-name assignment target.
pub fn name_target(name: &str) -> AssignTarget {
    AssignTarget::Name {
        name: name.to_string(),
    }
}

/// An attribute assignment target (`object.name`).
pub fn attr_target(object: &str, name: &str) -> AssignTarget {
    AssignTarget::Attribute {
        object: object.to_string(),
        name: name.to_string(),
    }
}

/// `target: annotation [= value]`.
pub fn ann_assign(target: AssignTarget, annotation: TypeExpr, value: Option<Expr>, line: u32) -> Stmt {
    Stmt::AnnAssign(AnnAssignStmt {
        target,
        annotation,
        value,
        pos: pos(line),
    })
}

/// `name = value`.
pub fn assign_name(name: &str, value: Option<Expr>, line: u32) -> Stmt {
    Stmt::Assign(AssignStmt {
        targets: vec![name_target(name)],
        value,
        pos: pos(line),
    })
}

/// `object.name = value`.
pub fn assign_attr(object: &str, name: &str, value: Option<Expr>, line: u32) -> Stmt {
    Stmt::Assign(AssignStmt {
        targets: vec![attr_target(object, name)],
        value,
        pos: pos(line),
    })
}

/// `name += ...`.
pub fn aug_assign_name(name: &str, line: u32) -> Stmt {
    Stmt::AugAssign(AugAssignStmt {
        target: name_target(name),
        pos: pos(line),
    })
}

/// `del name`.
pub fn del_name(name: &str, line: u32) -> Stmt {
    Stmt::Delete(DeleteStmt {
        targets: vec![name_target(name)],
        pos: pos(line),
    })
}

/// `for ...: body`.
pub fn for_loop(body: Vec<Stmt>, line: u32) -> Stmt {
    Stmt::For(LoopStmt {
        body,
        orelse: vec![],
        pos: pos(line),
    })
}

/// `while ...: body`.
pub fn while_loop(body: Vec<Stmt>, line: u32) -> Stmt {
    Stmt::While(LoopStmt {
        body,
        orelse: vec![],
        pos: pos(line),
    })
}

/// `if ...: body else: orelse`.
pub fn if_stmt(body: Vec<Stmt>, orelse: Vec<Stmt>, line: u32) -> Stmt {
    Stmt::If(IfStmt {
        body,
        orelse,
        pos: pos(line),
    })
}

/// Bare `Final`.
pub fn final_bare() -> TypeExpr {
    TypeExpr::name("Final")
}

/// `Final[inner]`.
pub fn final_of(inner: TypeExpr) -> TypeExpr {
    TypeExpr::subscript(TypeExpr::name("Final"), vec![inner])
}

/// `ClassVar[inner]`.
pub fn classvar_of(inner: TypeExpr) -> TypeExpr {
    TypeExpr::subscript(TypeExpr::name("ClassVar"), vec![inner])
}
