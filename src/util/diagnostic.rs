//! User-friendly diagnostic messages.
//!
//! Every error must include the root cause, the source location when one
//! exists, and a suggested fix. Recipe errors carry spans into the
//! offending `.bkl` file and render through miette.

use std::fmt;
use std::path::PathBuf;

use miette::{Diagnostic as MietteDiagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Common suggestion messages for consistent error handling.
pub mod suggestions {
    /// Suggestion when a toolset name is not recognized.
    pub const UNKNOWN_TOOLSET: &str = "Run `griddle toolsets` to see available toolsets";

    /// Suggestion when a dependency names no known target.
    pub const DEP_NOT_FOUND: &str = "Run `griddle targets <file>` to see declared targets";

    /// Suggestion when an external project file cannot be used.
    pub const EXTERNAL_UNSUPPORTED: &str =
        "external targets require a Visual Studio toolset";
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// A free-form diagnostic message with optional suggestions.
///
/// Used for warnings and notes that carry no source span; span-bearing
/// errors use [`RecipeError`] instead.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Primary message
    pub message: String,
    /// Severity level
    pub severity: Severity,
    /// Suggested fixes
    pub suggestions: Vec<String>,
    /// Related location (file path)
    pub location: Option<PathBuf>,
}

impl Diagnostic {
    /// Create a new warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity: Severity::Warning,
            suggestions: Vec::new(),
            location: None,
        }
    }

    /// Create a new note diagnostic.
    pub fn note(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity: Severity::Note,
            suggestions: Vec::new(),
            location: None,
        }
    }

    /// Add a suggestion for fixing the issue.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Add a file location.
    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let severity_str = if color {
            match self.severity {
                Severity::Error => "\x1b[1;31merror\x1b[0m",
                Severity::Warning => "\x1b[1;33mwarning\x1b[0m",
                Severity::Note => "\x1b[1;36mnote\x1b[0m",
            }
        } else {
            match self.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
                Severity::Note => "note",
            }
        };

        let mut output = format!("{}: {}\n", severity_str, self.message);

        if let Some(ref path) = self.location {
            output.push_str(&format!("  --> {}\n", path.display()));
        }

        for suggestion in &self.suggestions {
            output.push_str(&format!("  {}\n", suggestion));
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}

/// Errors arising from parsing or evaluating a recipe.
///
/// Carried through `anyhow` inside the library; the CLI downcasts back
/// to this type and re-wraps it in a `miette::Report` so span labels
/// and help text render properly.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum RecipeError {
    /// Lexical or grammatical error in a recipe file.
    #[error("{message}")]
    #[diagnostic(code(griddle::parse::syntax))]
    Syntax {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("{label}")]
        span: SourceSpan,
        label: String,
    },

    /// A property name the registry does not know.
    #[error("unknown property `{name}`")]
    #[diagnostic(code(griddle::model::unknown_property))]
    UnknownProperty {
        name: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("not a known property")]
        span: SourceSpan,
        #[help]
        suggestion: Option<String>,
    },

    /// A known property used on a target kind that does not accept it.
    #[error("property `{name}` does not apply to {kind} targets")]
    #[diagnostic(code(griddle::model::misplaced_property))]
    MisplacedProperty {
        name: String,
        kind: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("not accepted here")]
        span: SourceSpan,
        #[help]
        accepted: Option<String>,
    },

    /// Reference to a variable that is not defined in any scope.
    #[error("undefined variable `{name}`")]
    #[diagnostic(code(griddle::eval::undefined_variable))]
    UndefinedVariable {
        name: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("not defined in any enclosing scope")]
        span: SourceSpan,
        #[help]
        suggestion: Option<String>,
    },

    /// Variable resolution entered a reference cycle.
    #[error("variable reference cycle: {chain}")]
    #[diagnostic(code(griddle::eval::reference_cycle))]
    ReferenceCycle {
        chain: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("cycle entered here")]
        span: SourceSpan,
    },

    /// A list-valued variable was embedded in string context.
    #[error("list-valued variable `{name}` cannot be embedded in a string")]
    #[diagnostic(
        code(griddle::eval::list_in_string),
        help("reference the list on its own, without surrounding text")
    )]
    ListInString {
        name: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("expands to a list here")]
        span: SourceSpan,
    },

    /// Two project items share a name.
    #[error("duplicate {what} `{name}`")]
    #[diagnostic(code(griddle::model::duplicate))]
    Duplicate {
        what: &'static str,
        name: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("redeclared here")]
        span: SourceSpan,
        #[help]
        first: String,
    },

    /// A declaration in a place it cannot appear.
    #[error("{what} {where_}")]
    #[diagnostic(code(griddle::model::misplaced_declaration))]
    MisplacedDeclaration {
        what: &'static str,
        where_: &'static str,
        #[source_code]
        src: NamedSource<String>,
        #[label("declared here")]
        span: SourceSpan,
    },

    /// A recipe file includes itself, directly or through other modules.
    #[error("submodule cycle: {path} is already part of the project")]
    #[diagnostic(code(griddle::model::submodule_cycle))]
    SubmoduleCycle {
        path: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("included again here")]
        span: SourceSpan,
    },

    /// A condition could not be reduced to true/false at generation time.
    #[error("condition cannot be evaluated at generation time")]
    #[diagnostic(
        code(griddle::eval::unresolved_condition),
        help("conditions may reference variables and $(toolset), but not settings")
    )]
    UnresolvedCondition {
        #[source_code]
        src: NamedSource<String>,
        #[label("still contains a build-time value")]
        span: SourceSpan,
    },

    /// `deps` names a target that does not exist.
    #[error("target `{target}` depends on unknown target `{dep}`")]
    #[diagnostic(code(griddle::eval::unknown_dependency))]
    UnknownDependency {
        target: String,
        dep: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("no such target")]
        span: SourceSpan,
        #[help]
        suggestion: Option<String>,
    },

    /// The target dependency graph is cyclic.
    #[error("dependency cycle between targets: {chain}")]
    #[diagnostic(
        code(griddle::eval::dependency_cycle),
        help("break the cycle by removing one of the `deps` entries")
    )]
    DependencyCycle { chain: String },

    /// A target names a template that does not exist.
    #[error("unknown template `{name}`")]
    #[diagnostic(code(griddle::eval::unknown_template))]
    UnknownTemplate {
        name: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("no template with this name")]
        span: SourceSpan,
        #[help]
        suggestion: Option<String>,
    },

    /// A glob pattern in `sources`/`headers` matched no files.
    #[error("pattern `{pattern}` matched no files")]
    #[diagnostic(
        code(griddle::eval::empty_glob),
        help("patterns are matched relative to the recipe's directory")
    )]
    EmptyGlob {
        pattern: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("no matches")]
        span: SourceSpan,
    },

    /// A target kind requires a property that was not set.
    #[error("{kind} target `{target}` requires the `{name}` property")]
    #[diagnostic(code(griddle::model::required_property))]
    RequiredProperty {
        kind: &'static str,
        target: String,
        name: &'static str,
        #[source_code]
        src: NamedSource<String>,
        #[label("declared here")]
        span: SourceSpan,
    },

    /// A toolset name is not registered.
    #[error("unknown toolset `{name}`")]
    #[diagnostic(code(griddle::backend::unknown_toolset))]
    UnknownToolset {
        name: String,
        #[help]
        known: String,
    },

    /// The root recipe declares no toolsets.
    #[error("recipe declares no toolsets")]
    #[diagnostic(
        code(griddle::model::no_toolsets),
        help("add e.g. `toolsets = gnu vs2010;` at the top of the file")
    )]
    NoToolsets { file: String },

    /// A backend was asked to emit a target kind it does not support.
    #[error("toolset `{toolset}` cannot generate {kind} target `{target}`")]
    #[diagnostic(code(griddle::backend::unsupported_target))]
    UnsupportedTarget {
        toolset: String,
        kind: String,
        target: String,
        #[help]
        advice: String,
    },

    /// An external project file has an unrecognized format version.
    #[error("unrecognized version of Visual Studio project {path}: {version}")]
    #[diagnostic(
        code(griddle::backend::external_version),
        help("supported: Version=\"7.10\"/\"8.00\"/\"9.00\" (.vcproj), ToolsVersion=\"4.0\" (.vcxproj)")
    )]
    ExternalVersion { path: String, version: String },

    /// An external project file is missing a required attribute.
    #[error("external project {path} has no {attribute} attribute")]
    #[diagnostic(code(griddle::backend::external_malformed))]
    ExternalMalformed { path: String, attribute: String },
}

/// Suggest the closest name from `candidates`, if any is within edit
/// distance 2 of `name`.
pub fn closest_match<'a, I>(name: &str, candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    candidates
        .into_iter()
        .map(|c| (edit_distance(name, c), c))
        .filter(|(d, _)| *d <= 2)
        .min_by_key(|(d, _)| *d)
        .map(|(_, c)| c)
}

/// Format a did-you-mean help line from a candidate list.
pub fn did_you_mean<'a, I>(name: &str, candidates: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    closest_match(name, candidates).map(|c| format!("did you mean `{}`?", c))
}

fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}
