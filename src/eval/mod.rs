//! Per-toolset evaluation.
//!
//! A [`crate::core::Project`] is evaluated once per toolset. Evaluation
//! binds `$(toolset)`, resolves variables and conditions, applies
//! template and file-scope inheritance, expands source globs, and
//! orders targets topologically by `deps`. The result is a list of
//! [`BuildItem`]s with every value reduced to literals plus late-bound
//! setting placeholders, ready for a backend to render.

mod env;
mod evaluate;
mod graph;

use std::path::PathBuf;

use crate::core::expr::EvalString;
use crate::core::target::TargetKind;
use crate::util::interning::Symbol;

pub use evaluate::evaluate;

/// Windows linker subsystem for program targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Subsystem {
    #[default]
    Console,
    Windows,
}

impl Subsystem {
    /// Parse the `win32-subsystem` property value.
    pub fn from_value(value: &str) -> Option<Self> {
        match value {
            "console" => Some(Subsystem::Console),
            "windows" => Some(Subsystem::Windows),
            _ => None,
        }
    }

    /// The MSBuild `<Subsystem>` element value.
    pub fn msbuild_value(&self) -> &'static str {
        match self {
            Subsystem::Console => "Console",
            Subsystem::Windows => "Windows",
        }
    }
}

/// A user setting with its evaluated default.
#[derive(Debug, Clone)]
pub struct EvaluatedSetting {
    pub name: Symbol,
    pub help: Option<String>,
    pub default: EvalString,
}

/// One target, fully evaluated for a single toolset.
#[derive(Debug, Clone)]
pub struct BuildItem {
    pub name: Symbol,
    pub kind: TargetKind,
    /// Index of the declaring module in the evaluated project.
    pub module_idx: usize,

    /// Artifact base name; defaults to the target name. May contain a
    /// setting placeholder.
    pub basename: EvalString,
    /// Expanded source files, relative to the module directory.
    pub sources: Vec<PathBuf>,
    /// Expanded header files, relative to the module directory.
    pub headers: Vec<PathBuf>,
    pub defines: Vec<EvalString>,
    pub includedirs: Vec<EvalString>,
    pub libs: Vec<EvalString>,
    pub libdirs: Vec<EvalString>,
    pub compiler_options: Vec<EvalString>,
    pub link_options: Vec<EvalString>,
    /// Dependencies, validated to name project targets.
    pub deps: Vec<Symbol>,
    /// Artifact directory, relative to the module directory.
    pub outputdir: Option<PathBuf>,
    pub subsystem: Subsystem,
    /// `file` property of external targets.
    pub external_file: Option<PathBuf>,
    /// `commands` of action targets.
    pub commands: Vec<EvalString>,
    /// Per-toolset project file override.
    pub projectfile: Option<String>,
}

impl BuildItem {
    /// True for items compiled from sources on this toolset.
    pub fn is_compiled(&self) -> bool {
        self.kind.is_compiled()
    }
}

/// One module's evaluated contents.
#[derive(Debug, Clone)]
pub struct EvaluatedModule {
    pub module_idx: usize,
    /// Directory output files for this module land in.
    pub dir: PathBuf,
    pub src_name: String,
    /// Per-toolset makefile name override (`gnu.makefile = ...`).
    pub makefile: Option<String>,
    pub items: Vec<BuildItem>,
    /// Indices of direct submodules.
    pub submodules: Vec<usize>,
}

/// A project evaluated for one toolset.
#[derive(Debug, Clone)]
pub struct EvaluatedProject {
    pub toolset: Symbol,
    pub root_dir: PathBuf,
    pub root_stem: String,
    pub settings: Vec<EvaluatedSetting>,
    pub modules: Vec<EvaluatedModule>,
    /// All target names in dependency order (dependencies first).
    pub order: Vec<Symbol>,
}

impl EvaluatedProject {
    /// All items across all modules.
    pub fn items(&self) -> impl Iterator<Item = &BuildItem> {
        self.modules.iter().flat_map(|m| m.items.iter())
    }

    /// Find an item by target name.
    pub fn find_item(&self, name: Symbol) -> Option<&BuildItem> {
        self.items().find(|item| item.name == name)
    }

    /// Items of one module, sorted into global dependency order.
    pub fn module_items_ordered(&self, module_idx: usize) -> Vec<&BuildItem> {
        let mut items: Vec<&BuildItem> = self.modules[module_idx].items.iter().collect();
        items.sort_by_key(|item| {
            self.order
                .iter()
                .position(|n| *n == item.name)
                .unwrap_or(usize::MAX)
        });
        items
    }
}
