//! ToolsetBackend trait definition and the output collection.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::target::TargetKind;
use crate::eval::EvaluatedProject;

/// One file a backend wants written.
#[derive(Debug, Clone)]
pub struct OutFile {
    /// Destination path.
    pub path: PathBuf,
    /// Complete file contents.
    pub contents: String,
}

/// Collects generated files during a backend run.
///
/// Backends never write to disk themselves; the ops layer decides
/// whether to write, report a dry-run plan, or diff against existing
/// files.
#[derive(Debug, Default)]
pub struct Outbox {
    files: Vec<OutFile>,
}

impl Outbox {
    /// Create an empty outbox.
    pub fn new() -> Self {
        Outbox::default()
    }

    /// Add a file to be written.
    pub fn push(&mut self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        self.files.push(OutFile {
            path: path.into(),
            contents: contents.into(),
        });
    }

    /// The collected files, in emission order.
    pub fn files(&self) -> &[OutFile] {
        &self.files
    }

    /// Consume the outbox.
    pub fn into_files(self) -> Vec<OutFile> {
        self.files
    }

    /// Number of collected files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// True when no files were emitted.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Find a file by path, for tests and reporting.
    pub fn find(&self, path: &Path) -> Option<&OutFile> {
        self.files.iter().find(|f| f.path == path)
    }
}

/// The banner placed at the top of every generated file.
pub const GENERATED_BANNER: &str =
    "This file was automatically generated by griddle.\nDo not modify, all changes will be overwritten!";

/// Render the banner with a line-comment prefix (`# `, `// `).
pub fn banner(comment_prefix: &str) -> String {
    GENERATED_BANNER
        .lines()
        .map(|line| format!("{}{}\n", comment_prefix, line))
        .collect()
}

/// Interface implemented by every toolset backend.
pub trait ToolsetBackend: Send + Sync {
    /// Toolset name as written in `toolsets = ...;`.
    fn name(&self) -> &'static str;

    /// One-line description for `griddle toolsets`.
    fn description(&self) -> &'static str;

    /// Whether this toolset can realize a target kind.
    ///
    /// Backends reject unsupported kinds during generation too; this
    /// exists so listings can report per-toolset activity without
    /// generating anything.
    fn supports_kind(&self, _kind: TargetKind) -> bool {
        true
    }

    /// Render all output files for an evaluated project.
    fn generate(&self, project: &EvaluatedProject, out: &mut Outbox) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outbox_collects_in_order() {
        let mut out = Outbox::new();
        out.push("a/GNUmakefile", "all:\n");
        out.push("b.vcxproj", "<Project/>");

        assert_eq!(out.len(), 2);
        assert_eq!(out.files()[0].path, PathBuf::from("a/GNUmakefile"));
        assert!(out.find(Path::new("b.vcxproj")).is_some());
        assert!(out.find(Path::new("missing")).is_none());
    }

    #[test]
    fn test_banner_prefixes_every_line() {
        let text = banner("# ");
        for line in text.lines() {
            assert!(line.starts_with("# "));
        }
        assert!(text.contains("generated by griddle"));
    }
}
