//! Griddle - a declarative build-file generator for C and C++
//!
//! This crate provides the core library functionality for Griddle:
//! parsing recipe files, evaluating them once per toolset, and emitting
//! toolset-native build files (GNU makefiles, Visual Studio projects).

pub mod backend;
pub mod core;
pub mod eval;
pub mod ops;
pub mod syntax;
pub mod util;

pub use self::core::{
    project::{Module, Project},
    setting::Setting,
    target::{TargetDecl, TargetKind},
};

pub use eval::{BuildItem, EvaluatedProject};
pub use util::interning::Symbol;
pub use util::shell::Shell;
