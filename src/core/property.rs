//! The property registry.
//!
//! Every property a recipe can set is described here: its value type,
//! which target kinds accept it, whether file-scope and template
//! assignments flow into targets that do not set it themselves, and a
//! one-line doc string shown by error messages and listings.

use crate::core::target::TargetKind;
use crate::util::diagnostic::closest_match;

/// Value type of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// A single string value.
    String,
    /// A list of strings.
    List,
    /// A single path, relative to the declaring module.
    Path,
    /// A list of paths or glob patterns.
    PathList,
}

/// Where a property may be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// On targets of the listed kinds.
    Target(&'static [TargetKind]),
    /// At file scope, once per module.
    Module,
}

use TargetKind::{Action, External, Library, Program, SharedLibrary};

const COMPILED: &[TargetKind] = &[Program, Library, SharedLibrary];
const LINKED: &[TargetKind] = &[Program, SharedLibrary];
const WITH_DEPS: &[TargetKind] = &[Program, Library, SharedLibrary, Action];

/// Description of one known property.
#[derive(Debug, Clone, Copy)]
pub struct PropDef {
    pub name: &'static str,
    pub ty: ValueType,
    pub scope: Scope,
    /// Whether a file-scope or template assignment applies to targets
    /// that do not assign the property themselves.
    pub inheritable: bool,
    /// Whether the name must carry a toolset prefix (`gnu.makefile`).
    pub toolset_scoped: bool,
    pub doc: &'static str,
}

/// All known properties.
pub const PROPERTIES: &[PropDef] = &[
    PropDef {
        name: "sources",
        ty: ValueType::PathList,
        scope: Scope::Target(COMPILED),
        inheritable: false,
        toolset_scoped: false,
        doc: "Source files to compile; entries may be glob patterns",
    },
    PropDef {
        name: "headers",
        ty: ValueType::PathList,
        scope: Scope::Target(COMPILED),
        inheritable: false,
        toolset_scoped: false,
        doc: "Header files associated with the target",
    },
    PropDef {
        name: "defines",
        ty: ValueType::List,
        scope: Scope::Target(COMPILED),
        inheritable: true,
        toolset_scoped: false,
        doc: "Preprocessor definitions, NAME or NAME=VALUE",
    },
    PropDef {
        name: "includedirs",
        ty: ValueType::PathList,
        scope: Scope::Target(COMPILED),
        inheritable: true,
        toolset_scoped: false,
        doc: "Additional include search directories",
    },
    PropDef {
        name: "libs",
        ty: ValueType::List,
        scope: Scope::Target(LINKED),
        inheritable: true,
        toolset_scoped: false,
        doc: "System libraries to link, without prefix or extension",
    },
    PropDef {
        name: "libdirs",
        ty: ValueType::PathList,
        scope: Scope::Target(LINKED),
        inheritable: true,
        toolset_scoped: false,
        doc: "Additional library search directories",
    },
    PropDef {
        name: "compiler-options",
        ty: ValueType::List,
        scope: Scope::Target(COMPILED),
        inheritable: true,
        toolset_scoped: false,
        doc: "Extra flags passed to the compiler",
    },
    PropDef {
        name: "link-options",
        ty: ValueType::List,
        scope: Scope::Target(LINKED),
        inheritable: true,
        toolset_scoped: false,
        doc: "Extra flags passed to the linker",
    },
    PropDef {
        name: "deps",
        ty: ValueType::List,
        scope: Scope::Target(WITH_DEPS),
        inheritable: false,
        toolset_scoped: false,
        doc: "Names of targets this target depends on",
    },
    PropDef {
        name: "outputdir",
        ty: ValueType::Path,
        scope: Scope::Target(COMPILED),
        inheritable: true,
        toolset_scoped: false,
        doc: "Directory for the built artifact, relative to the module",
    },
    PropDef {
        name: "basename",
        ty: ValueType::String,
        scope: Scope::Target(COMPILED),
        inheritable: false,
        toolset_scoped: false,
        doc: "Base name of the built artifact; defaults to the target name",
    },
    PropDef {
        name: "win32-subsystem",
        ty: ValueType::String,
        scope: Scope::Target(&[Program]),
        inheritable: false,
        toolset_scoped: false,
        doc: "Windows subsystem: console (default) or windows",
    },
    PropDef {
        name: "file",
        ty: ValueType::Path,
        scope: Scope::Target(&[External]),
        inheritable: false,
        toolset_scoped: false,
        doc: "File name of the external makefile or project",
    },
    PropDef {
        name: "commands",
        ty: ValueType::List,
        scope: Scope::Target(&[Action]),
        inheritable: false,
        toolset_scoped: false,
        doc: "Shell commands the action runs",
    },
    PropDef {
        name: "makefile",
        ty: ValueType::String,
        scope: Scope::Module,
        inheritable: false,
        toolset_scoped: true,
        doc: "Output makefile name for a make-based toolset",
    },
    PropDef {
        name: "projectfile",
        ty: ValueType::String,
        scope: Scope::Target(&[Program, Library, SharedLibrary, Action]),
        inheritable: false,
        toolset_scoped: true,
        doc: "Output project file name for an IDE toolset",
    },
];

/// Look up a property by name.
pub fn lookup(name: &str) -> Option<&'static PropDef> {
    PROPERTIES.iter().find(|p| p.name == name)
}

/// Whether a property applies to a target kind.
pub fn accepts(def: &PropDef, kind: TargetKind) -> bool {
    match def.scope {
        Scope::Target(kinds) => kinds.contains(&kind),
        Scope::Module => false,
    }
}

/// Kinds that accept a property, for error help text.
pub fn accepted_kinds(def: &PropDef) -> Option<String> {
    match def.scope {
        Scope::Target(kinds) => Some(
            kinds
                .iter()
                .map(|k| k.keyword())
                .collect::<Vec<_>>()
                .join(", "),
        ),
        Scope::Module => None,
    }
}

/// Closest property name for did-you-mean suggestions.
pub fn suggest(name: &str) -> Option<&'static str> {
    closest_match(name, PROPERTIES.iter().map(|p| p.name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_properties() {
        assert!(lookup("sources").is_some());
        assert!(lookup("defines").is_some());
        assert!(lookup("win32-subsystem").is_some());
        assert!(lookup("nonsense").is_none());
    }

    #[test]
    fn test_kind_acceptance() {
        let sources = lookup("sources").unwrap();
        assert!(accepts(sources, TargetKind::Program));
        assert!(accepts(sources, TargetKind::Library));
        assert!(!accepts(sources, TargetKind::External));

        let file = lookup("file").unwrap();
        assert!(accepts(file, TargetKind::External));
        assert!(!accepts(file, TargetKind::Program));

        let libs = lookup("libs").unwrap();
        assert!(!accepts(libs, TargetKind::Library));
    }

    #[test]
    fn test_inheritable_flags() {
        assert!(lookup("defines").unwrap().inheritable);
        assert!(lookup("includedirs").unwrap().inheritable);
        assert!(!lookup("sources").unwrap().inheritable);
        assert!(!lookup("basename").unwrap().inheritable);
    }

    #[test]
    fn test_toolset_scoped_properties() {
        assert!(lookup("makefile").unwrap().toolset_scoped);
        assert!(lookup("projectfile").unwrap().toolset_scoped);
        assert!(!lookup("sources").unwrap().toolset_scoped);
    }

    #[test]
    fn test_suggestions() {
        assert_eq!(suggest("surces"), Some("sources"));
        assert_eq!(suggest("define"), Some("defines"));
        assert_eq!(suggest("totally-unknown"), None);
    }

    #[test]
    fn test_accepted_kinds_listing() {
        let subsystem = lookup("win32-subsystem").unwrap();
        assert_eq!(accepted_kinds(subsystem).as_deref(), Some("program"));
    }
}
