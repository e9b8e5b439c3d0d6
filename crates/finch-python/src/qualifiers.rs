//! Qualifier recognition: resolving finality marker spellings through a
//! module's imports.
//!
//! The two surface forms are a decorator marker (`@final`) for classes and
//! methods, and an annotation marker (`Final` / `Final[T]`) for variables
//! and attributes. Both live in `typing` (and `typing_extensions`), so what
//! they look like in a module depends on how the module imported them:
//!
//! - `from typing import Final` → `Final`
//! - `from typing import Final as F` → `F`
//! - `import typing` → `typing.Final`
//! - `import typing as t` → `t.Final`
//!
//! A local name only resolves to a marker if the module actually bound it
//! to one; an unrelated `Final` defined elsewhere never triggers the
//! checker. The builtin method decorators (`staticmethod`, `classmethod`,
//! `property`) need no import.

use std::collections::{HashMap, HashSet};

use crate::decl::{Module, Stmt};

/// Modules that export the finality markers.
const TYPING_MODULES: &[&str] = &["typing", "typing_extensions"];

// ============================================================================
// Markers
// ============================================================================

/// A recognized qualifier marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    /// `Final` in annotation position.
    Final,
    /// `ClassVar` in annotation position.
    ClassVar,
    /// `@final` in decorator position.
    FinalDecorator,
    /// `@overload`.
    Overload,
    /// `@staticmethod`.
    StaticMethod,
    /// `@classmethod`.
    ClassMethod,
    /// `@property`.
    Property,
}

fn annotation_member(name: &str) -> Option<Marker> {
    match name {
        "Final" => Some(Marker::Final),
        "ClassVar" => Some(Marker::ClassVar),
        _ => None,
    }
}

fn decorator_member(name: &str) -> Option<Marker> {
    match name {
        "final" => Some(Marker::FinalDecorator),
        "overload" => Some(Marker::Overload),
        _ => None,
    }
}

fn builtin_decorator(name: &str) -> Option<Marker> {
    match name {
        "staticmethod" => Some(Marker::StaticMethod),
        "classmethod" => Some(Marker::ClassMethod),
        "property" => Some(Marker::Property),
        _ => None,
    }
}

// ============================================================================
// Qualifier Table
// ============================================================================

/// Per-module resolution of qualifier spellings.
#[derive(Debug, Default)]
pub struct QualifierTable {
    /// Local name → annotation marker (`Final`, `ClassVar`).
    annotations: HashMap<String, Marker>,
    /// Local name → decorator marker (`final`, `overload`).
    decorators: HashMap<String, Marker>,
    /// Local aliases bound to a typing module (`typing`, `t`).
    typing_aliases: HashSet<String>,
}

impl QualifierTable {
    /// Build the table from a module's import statements. Imports are
    /// collected from every statement depth so function-local imports
    /// resolve too.
    pub fn from_module(module: &Module) -> Self {
        let mut table = QualifierTable::default();
        table.scan(&module.body);
        table
    }

    fn scan(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            match stmt {
                Stmt::Import(import) => {
                    if TYPING_MODULES.contains(&import.module.as_str()) {
                        let local = import.alias.as_deref().unwrap_or(&import.module);
                        self.typing_aliases.insert(local.to_string());
                    }
                }
                Stmt::ImportFrom(import) => {
                    if TYPING_MODULES.contains(&import.module.as_str()) {
                        for name in &import.names {
                            let local = name.local_name().to_string();
                            if let Some(marker) = annotation_member(&name.name) {
                                self.annotations.insert(local, marker);
                            } else if let Some(marker) = decorator_member(&name.name) {
                                self.decorators.insert(local, marker);
                            }
                        }
                    }
                }
                Stmt::ClassDef(class) => self.scan(&class.body),
                Stmt::FunctionDef(func) => self.scan(&func.body),
                Stmt::For(lp) | Stmt::While(lp) => {
                    self.scan(&lp.body);
                    self.scan(&lp.orelse);
                }
                Stmt::If(cond) => {
                    self.scan(&cond.body);
                    self.scan(&cond.orelse);
                }
                _ => {}
            }
        }
    }

    /// Resolve a dotted name in annotation position.
    pub fn annotation_marker(&self, dotted: &str) -> Option<Marker> {
        match dotted.rsplit_once('.') {
            None => self.annotations.get(dotted).copied(),
            Some((prefix, member)) => {
                if self.typing_aliases.contains(prefix) {
                    annotation_member(member)
                } else {
                    None
                }
            }
        }
    }

    /// Resolve a dotted name in decorator position.
    pub fn decorator_marker(&self, dotted: &str) -> Option<Marker> {
        match dotted.rsplit_once('.') {
            None => self
                .decorators
                .get(dotted)
                .copied()
                .or_else(|| builtin_decorator(dotted)),
            Some((prefix, member)) => {
                if self.typing_aliases.contains(prefix) {
                    decorator_member(member)
                } else {
                    None
                }
            }
        }
    }

    /// True when the dotted name resolves to `@final`.
    pub fn is_final_decorator(&self, dotted: &str) -> bool {
        self.decorator_marker(dotted) == Some(Marker::FinalDecorator)
    }
}

// ============================================================================
// Tests
// ============================================================================
