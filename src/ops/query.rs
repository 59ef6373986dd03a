//! Read-only queries over a recipe: settings and targets listings.

use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use crate::backend::BackendRegistry;
use crate::core::project::Project;
use crate::eval::evaluate;
use crate::util::interning::Symbol;

/// A user setting, as shown by `griddle settings`.
#[derive(Debug, Clone, Serialize)]
pub struct SettingInfo {
    pub name: String,
    pub default: String,
    pub help: Option<String>,
}

/// A target, as shown by `griddle targets`.
#[derive(Debug, Clone, Serialize)]
pub struct TargetInfo {
    pub name: String,
    pub kind: String,
    /// Recipe file the target was declared in.
    pub module: String,
    /// Declared toolsets able to realize this target.
    pub toolsets: Vec<String>,
}

/// List the settings a recipe exposes.
///
/// Defaults are evaluated against the first declared toolset; a default
/// that differs per toolset would be resolvable only at generation
/// time, and none of the built-in properties behave that way.
pub fn list_settings(path: &Path) -> Result<Vec<SettingInfo>> {
    let project = Project::load(path)?;
    let toolset = project.toolsets[0];
    let evaluated = evaluate(&project, toolset, &Default::default())?;

    Ok(evaluated
        .settings
        .iter()
        .map(|s| SettingInfo {
            name: s.name.as_str().to_string(),
            default: s.default.render_dollar(),
            help: s.help.clone(),
        })
        .collect())
}

/// List the targets a recipe declares.
pub fn list_targets(path: &Path) -> Result<Vec<TargetInfo>> {
    let project = Project::load(path)?;
    let registry = BackendRegistry::new();

    Ok(project
        .all_targets()
        .map(|target| {
            let toolsets = project
                .toolsets
                .iter()
                .map(|t| t.as_str())
                .filter(|name| {
                    registry
                        .get(name)
                        .map(|b| b.supports_kind(target.kind))
                        // Unregistered toolsets stay listed; generate
                        // reports them properly.
                        .unwrap_or(true)
                })
                .map(str::to_string)
                .collect();
            TargetInfo {
                name: target.name.as_str().to_string(),
                kind: target.kind.keyword().to_string(),
                module: project.modules[target.module_idx].src_name.clone(),
                toolsets,
            }
        })
        .collect())
}
