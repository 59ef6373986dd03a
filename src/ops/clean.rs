//! The clean operation: remove previously generated output files.
//!
//! Output paths are computed exactly the way generate computes them, so
//! clean removes what generate would have written - including outputs
//! of per-toolset `makefile`/`projectfile` overrides - and nothing else.

use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use rayon::prelude::*;

use crate::backend::{BackendRegistry, OutFile, Outbox};
use crate::core::project::Project;
use crate::eval::evaluate;
use crate::ops::generate::{collect_vars, select_toolsets};
use crate::util::config::Config;
use crate::util::diagnostic::Diagnostic;
use crate::util::fs::remove_file_if_exists;
use crate::util::interning::Symbol;
use crate::util::shell::{Shell, Status};

/// Options for [`clean`].
#[derive(Debug, Clone, Default)]
pub struct CleanOptions {
    /// Toolsets to clean; empty means every declared toolset.
    pub toolsets: Vec<String>,
    /// Variable bindings, matching the ones used to generate.
    pub defines: Vec<(String, String)>,
    /// Report what would be removed without removing it.
    pub dry_run: bool,
}

/// Result of a clean run.
#[derive(Debug, Clone, Default)]
pub struct CleanSummary {
    pub removed: usize,
}

/// Remove the files generate would produce for a recipe.
pub fn clean(
    shell: &Shell,
    config: &Config,
    path: &Path,
    opts: &CleanOptions,
) -> Result<CleanSummary> {
    let started = Instant::now();
    let registry = BackendRegistry::new();

    shell.status(Status::Parsing, path.display());
    let project = Project::load(path)?;

    let toolsets = select_toolsets(&registry, &project, config, &opts.toolsets)?;
    let predefined = collect_vars(config, &opts.defines);

    let outputs: Vec<Vec<OutFile>> = toolsets
        .par_iter()
        .map(|toolset| -> Result<Vec<OutFile>> {
            let backend = registry
                .resolve(toolset)
                .expect("validated during selection");
            let evaluated = evaluate(&project, Symbol::intern(toolset), &predefined)?;
            let mut out = Outbox::new();
            backend.generate(&evaluated, &mut out)?;
            Ok(out.into_files())
        })
        .collect::<Result<_>>()?;

    shell.status(Status::Cleaning, path.display());
    let mut summary = CleanSummary::default();
    for file in outputs.iter().flatten() {
        if opts.dry_run {
            if file.path.exists() {
                summary.removed += 1;
                shell.status(Status::Removed, format!("{} (dry run)", file.path.display()));
            }
        } else if remove_file_if_exists(&file.path)? {
            summary.removed += 1;
            shell.status(Status::Removed, file.path.display());
        }
    }

    if summary.removed == 0 {
        shell.warn(&Diagnostic::note("no generated files found").with_location(path));
    }

    shell.finished(
        format!("removed {} file(s)", summary.removed),
        started.elapsed(),
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::generate::{generate, GenerateOptions};
    use crate::util::shell::{ColorChoice, Verbosity};
    use std::fs;
    use tempfile::TempDir;

    fn quiet_shell() -> Shell {
        Shell::new(Verbosity::Quiet, ColorChoice::Never)
    }

    #[test]
    fn test_clean_removes_generated_files() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("hello.c"), "").unwrap();
        let path = tmp.path().join("hello.bkl");
        fs::write(
            &path,
            "toolsets = gnu vs2010;\nprogram hello { sources { hello.c } }\n",
        )
        .unwrap();

        let shell = quiet_shell();
        let config = Config::default();
        generate(&shell, &config, &path, &GenerateOptions::default()).unwrap();
        assert!(tmp.path().join("GNUmakefile").exists());

        let summary = clean(&shell, &config, &path, &CleanOptions::default()).unwrap();
        assert!(summary.removed >= 3);
        assert!(!tmp.path().join("GNUmakefile").exists());
        assert!(!tmp.path().join("hello.vcxproj").exists());
        assert!(!tmp.path().join("hello.sln").exists());
        // The recipe and sources stay.
        assert!(path.exists());
        assert!(tmp.path().join("hello.c").exists());
    }

    #[test]
    fn test_clean_dry_run_keeps_files() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("hello.c"), "").unwrap();
        let path = tmp.path().join("hello.bkl");
        fs::write(
            &path,
            "toolsets = gnu;\nprogram hello { sources { hello.c } }\n",
        )
        .unwrap();

        let shell = quiet_shell();
        let config = Config::default();
        generate(&shell, &config, &path, &GenerateOptions::default()).unwrap();

        let opts = CleanOptions {
            dry_run: true,
            ..Default::default()
        };
        let summary = clean(&shell, &config, &path, &opts).unwrap();
        assert_eq!(summary.removed, 1);
        assert!(tmp.path().join("GNUmakefile").exists());
    }

    #[test]
    fn test_clean_nothing_to_do() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("hello.c"), "").unwrap();
        let path = tmp.path().join("hello.bkl");
        fs::write(
            &path,
            "toolsets = gnu;\nprogram hello { sources { hello.c } }\n",
        )
        .unwrap();

        let summary = clean(
            &quiet_shell(),
            &Config::default(),
            &path,
            &CleanOptions::default(),
        )
        .unwrap();
        assert_eq!(summary.removed, 0);
    }
}
