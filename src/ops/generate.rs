//! The generate operation: load, evaluate per toolset, write outputs.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::backend::{BackendRegistry, OutFile, Outbox};
use crate::core::project::Project;
use crate::eval::evaluate;
use crate::util::config::Config;
use crate::util::fs::{write_if_changed, WriteOutcome};
use crate::util::interning::Symbol;
use crate::util::shell::{Shell, Status};

/// Options for [`generate`].
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Toolsets to generate; empty means every toolset the recipe
    /// declares (narrowed by the user config, when set).
    pub toolsets: Vec<String>,
    /// `NAME=VALUE` variable bindings applied before the recipe runs.
    pub defines: Vec<(String, String)>,
    /// Report without writing anything.
    pub dry_run: bool,
    /// Print the output plan as JSON to stdout instead of writing.
    pub plan: bool,
}

/// One planned output file, for `--plan`.
#[derive(Debug, Clone, Serialize)]
pub struct PlanEntry {
    pub toolset: String,
    pub path: PathBuf,
    pub bytes: usize,
}

/// Result of a generate run.
#[derive(Debug, Clone, Default)]
pub struct GenerateSummary {
    pub written: usize,
    pub unchanged: usize,
    pub toolsets: Vec<String>,
}

/// Generate build files for a recipe.
pub fn generate(
    shell: &Shell,
    config: &Config,
    path: &Path,
    opts: &GenerateOptions,
) -> Result<GenerateSummary> {
    let started = Instant::now();
    let registry = BackendRegistry::new();

    shell.status(Status::Parsing, path.display());
    let project = Project::load(path)?;

    let toolsets = select_toolsets(&registry, &project, config, &opts.toolsets)?;
    debug!(?toolsets, "selected toolsets");

    let predefined = collect_vars(config, &opts.defines);

    // Each toolset pass is independent; render them in parallel.
    let outputs: Vec<(String, Vec<OutFile>)> = toolsets
        .par_iter()
        .map(|toolset| -> Result<(String, Vec<OutFile>)> {
            let backend = registry
                .resolve(toolset)
                .expect("validated during selection");
            let evaluated = evaluate(&project, Symbol::intern(toolset), &predefined)?;
            let mut out = Outbox::new();
            backend.generate(&evaluated, &mut out)?;
            Ok((toolset.clone(), out.into_files()))
        })
        .collect::<Result<_>>()?;

    if opts.plan {
        let entries: Vec<PlanEntry> = outputs
            .iter()
            .flat_map(|(toolset, files)| {
                files.iter().map(|f| PlanEntry {
                    toolset: toolset.clone(),
                    path: f.path.clone(),
                    bytes: f.contents.len(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(GenerateSummary {
            toolsets: toolsets.clone(),
            ..Default::default()
        });
    }

    let total: usize = outputs.iter().map(|(_, files)| files.len()).sum();
    let progress = shell.progress(total as u64);

    let mut summary = GenerateSummary {
        toolsets: toolsets.clone(),
        ..Default::default()
    };
    for (toolset, files) in &outputs {
        shell.status(Status::Generating, format!("{} files", toolset));
        for file in files {
            let outcome = if opts.dry_run {
                match std::fs::read_to_string(&file.path) {
                    Ok(existing) if existing == file.contents => WriteOutcome::Unchanged,
                    _ => WriteOutcome::Written,
                }
            } else {
                write_if_changed(&file.path, &file.contents)
                    .with_context(|| format!("while writing {}", file.path.display()))?
            };
            match outcome {
                WriteOutcome::Written => {
                    summary.written += 1;
                    shell.status(Status::Emitted, file.path.display());
                }
                WriteOutcome::Unchanged => {
                    summary.unchanged += 1;
                    shell.verbose(format!("unchanged: {}", file.path.display()));
                }
            }
            progress.inc(1);
        }
    }
    progress.finish_and_clear();

    let what = if opts.dry_run {
        "dry run"
    } else {
        "generation"
    };
    shell.finished(
        format!(
            "{} of {} files for {} toolset(s)",
            what,
            total,
            toolsets.len()
        ),
        started.elapsed(),
    );

    Ok(summary)
}

/// Decide which toolsets this run generates.
pub(crate) fn select_toolsets(
    registry: &BackendRegistry,
    project: &Project,
    config: &Config,
    requested: &[String],
) -> Result<Vec<String>> {
    let declared: Vec<String> = project
        .toolsets
        .iter()
        .map(|t| t.as_str().to_string())
        .collect();

    let selected: Vec<String> = if !requested.is_empty() {
        for name in requested {
            registry.resolve(name)?;
            if !declared.contains(name) {
                bail!(
                    "recipe does not declare toolset `{}` (declared: {})",
                    name,
                    declared.join(", ")
                );
            }
        }
        requested.to_vec()
    } else if !config.default_toolsets.is_empty() {
        let narrowed: Vec<String> = declared
            .iter()
            .filter(|t| config.default_toolsets.contains(t))
            .cloned()
            .collect();
        if narrowed.is_empty() {
            declared
        } else {
            narrowed
        }
    } else {
        declared
    };

    // A declared-but-unregistered toolset is an error even when it was
    // not explicitly requested.
    for name in &selected {
        registry.resolve(name)?;
    }

    Ok(selected)
}

/// Merge config vars and CLI defines (CLI wins).
pub(crate) fn collect_vars(
    config: &Config,
    defines: &[(String, String)],
) -> BTreeMap<String, String> {
    let mut vars = config.vars.clone();
    for (name, value) in defines {
        vars.insert(name.clone(), value.clone());
    }
    vars
}
