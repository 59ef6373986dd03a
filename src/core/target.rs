//! Target declarations and kinds.

use serde::{Deserialize, Serialize};

use crate::syntax::ast::{AssignOp, CondExpr, ListExpr, Span};
use crate::util::interning::Symbol;

/// The kind of target declared in a recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetKind {
    /// Executable binary
    Program,

    /// Static library
    Library,

    /// Shared/dynamic library
    SharedLibrary,

    /// Externally maintained project file (Visual Studio only)
    External,

    /// A named group of shell commands, no artifact
    Action,
}

impl TargetKind {
    /// Parse a target keyword from the recipe grammar.
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "program" => Some(TargetKind::Program),
            "library" => Some(TargetKind::Library),
            "shared-library" => Some(TargetKind::SharedLibrary),
            "external" => Some(TargetKind::External),
            "action" => Some(TargetKind::Action),
            _ => None,
        }
    }

    /// The keyword as written in recipes.
    pub fn keyword(&self) -> &'static str {
        match self {
            TargetKind::Program => "program",
            TargetKind::Library => "library",
            TargetKind::SharedLibrary => "shared-library",
            TargetKind::External => "external",
            TargetKind::Action => "action",
        }
    }

    /// True for kinds compiled from sources (program, libraries).
    pub fn is_compiled(&self) -> bool {
        matches!(
            self,
            TargetKind::Program | TargetKind::Library | TargetKind::SharedLibrary
        )
    }

    /// True for kinds that produce a linkable artifact.
    pub fn is_linkable(&self) -> bool {
        matches!(self, TargetKind::Library | TargetKind::SharedLibrary)
    }
}

/// One property or variable assignment, with the conditions guarding it.
///
/// `if` nesting is flattened during lowering: each assignment carries
/// the full stack of enclosing conditions, and a toolset scope when
/// written as `gnu.makefile = ...`.
#[derive(Debug, Clone)]
pub struct PropAssign {
    /// Property or variable name (without any toolset prefix).
    pub name: Symbol,
    pub name_span: Span,
    pub op: AssignOp,
    pub value: ListExpr,
    /// Enclosing `if` conditions, all of which must hold.
    pub conds: Vec<CondExpr>,
    /// Toolset prefix, e.g. the `gnu` of `gnu.makefile = ...`.
    pub toolset: Option<Symbol>,
    pub span: Span,
}

impl PropAssign {
    /// True when the assignment applies unconditionally.
    pub fn is_unconditional(&self) -> bool {
        self.conds.is_empty() && self.toolset.is_none()
    }
}

/// A lowered target declaration.
#[derive(Debug, Clone)]
pub struct TargetDecl {
    pub name: Symbol,
    pub name_span: Span,
    pub kind: TargetKind,
    /// Templates applied, in declaration order.
    pub bases: Vec<(Symbol, Span)>,
    /// Property assignments in source order.
    pub assigns: Vec<PropAssign>,
    /// Index of the module this target was declared in.
    pub module_idx: usize,
    pub span: Span,
}
