//! User-overridable settings.
//!
//! A setting is a named value the *user of the generated build files*
//! can override (`make PROGRAM_NAME=greeter`, `msbuild
//! /p:PROGRAM_NAME=greeter`). Griddle only evaluates the default;
//! references to the setting stay symbolic all the way into the output.

use crate::syntax::ast::{ListExpr, Span};
use crate::util::interning::Symbol;

/// A lowered `setting NAME { ... }` declaration.
#[derive(Debug, Clone)]
pub struct Setting {
    pub name: Symbol,
    pub name_span: Span,
    /// Help text shown by `griddle settings`.
    pub help: Option<String>,
    /// Default value, evaluated at generation time.
    pub default: ListExpr,
    pub span: Span,
}
