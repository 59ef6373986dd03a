//! Visual Studio 2010 backend.
//!
//! Emits one `.vcxproj` per buildable target plus a solution file next
//! to the root recipe. External targets contribute their existing
//! project file to the solution without being rewritten.

pub mod project;
pub mod solution;
pub mod xml;

use std::collections::HashMap;

use anyhow::Result;

use crate::backend::external::read_vs_project;
use crate::backend::guid::project_guid;
use crate::backend::trait_def::{Outbox, ToolsetBackend};
use crate::backend::vs2010::project::render_vcxproj;
use crate::backend::vs2010::solution::{render_sln, SlnEntry};
use crate::core::target::TargetKind;
use crate::eval::EvaluatedProject;
use crate::util::diagnostic::RecipeError;
use crate::util::fs::{relative_to, windows_slashes};
use crate::util::interning::Symbol;

/// Visual Studio 2010 toolset.
pub struct Vs2010Backend;

impl Vs2010Backend {
    pub fn new() -> Self {
        Vs2010Backend
    }
}

impl Default for Vs2010Backend {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolsetBackend for Vs2010Backend {
    fn name(&self) -> &'static str {
        "vs2010"
    }

    fn description(&self) -> &'static str {
        "Visual Studio 2010 projects and solution (.vcxproj, .sln)"
    }

    fn generate(&self, project: &EvaluatedProject, out: &mut Outbox) -> Result<()> {
        // Identity of every project first: the solution needs GUIDs for
        // dependency sections regardless of emission order.
        let mut guids: HashMap<Symbol, String> = HashMap::new();
        for item in project.items() {
            match item.kind {
                TargetKind::External => {
                    let module = &project.modules[item.module_idx];
                    let file = item.external_file.as_ref().expect("validated in eval");
                    let external = read_vs_project(&module.dir.join(file))?;
                    if external.version != 2010 {
                        return Err(RecipeError::ExternalVersion {
                            path: external.path.display().to_string(),
                            version: format!("VS {} format", external.version),
                        }
                        .into());
                    }
                    guids.insert(item.name, external.guid);
                }
                _ => {
                    guids.insert(item.name, project_guid(item.name.as_str()));
                }
            }
        }

        // Emit projects and collect solution entries in dependency order.
        let mut entries = Vec::new();
        for name in &project.order {
            let item = project.find_item(*name).expect("ordered item exists");
            let module = &project.modules[item.module_idx];

            let path = match item.kind {
                TargetKind::External => {
                    let file = item.external_file.as_ref().expect("validated in eval");
                    module.dir.join(file)
                }
                _ => {
                    let file_name = item
                        .projectfile
                        .clone()
                        .unwrap_or_else(|| format!("{}.vcxproj", item.name));
                    let path = module.dir.join(file_name);
                    out.push(&path, render_vcxproj(project, item));
                    path
                }
            };

            entries.push(SlnEntry {
                name: item.name.as_str().to_string(),
                guid: guids[&item.name].clone(),
                rel_path: windows_slashes(&relative_to(&path, &project.root_dir)),
                deps: item
                    .deps
                    .iter()
                    .filter_map(|dep| guids.get(dep).cloned())
                    .collect(),
            });
        }

        let sln_path = project
            .root_dir
            .join(format!("{}.sln", project.root_stem));
        out.push(sln_path, render_sln(&entries));

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::project::Project;
    use crate::eval::evaluate;
    use std::collections::BTreeMap;
    use std::fs;
    use tempfile::TempDir;

    fn generate(tmp: &TempDir, recipe: &str, files: &[(&str, &str)]) -> Outbox {
        for (file, contents) in files {
            let path = tmp.path().join(file);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(&path, contents).unwrap();
        }
        let root = tmp.path().join("demo.bkl");
        fs::write(&root, recipe).unwrap();

        let project = Project::load(&root).unwrap();
        let evaluated = evaluate(&project, Symbol::intern("vs2010"), &BTreeMap::new()).unwrap();

        let mut out = Outbox::new();
        Vs2010Backend::new().generate(&evaluated, &mut out).unwrap();
        out
    }

    #[test]
    fn test_emits_project_and_solution() {
        let tmp = TempDir::new().unwrap();
        let out = generate(
            &tmp,
            "toolsets = vs2010;\nprogram hello { sources { hello.c } }\n",
            &[("hello.c", "")],
        );

        assert_eq!(out.len(), 2);
        assert!(out.find(&tmp.path().join("hello.vcxproj")).is_some());

        let sln = out.find(&tmp.path().join("demo.sln")).unwrap();
        assert!(sln.contents.contains("\"hello\", \"hello.vcxproj\""));
    }

    #[test]
    fn test_projectfile_override() {
        let tmp = TempDir::new().unwrap();
        let out = generate(
            &tmp,
            "toolsets = vs2010;\nprogram hello {\n  sources { hello.c }\n  vs2010.projectfile = HelloApp.vcxproj;\n}\n",
            &[("hello.c", "")],
        );

        assert!(out.find(&tmp.path().join("HelloApp.vcxproj")).is_some());
        let sln = out.find(&tmp.path().join("demo.sln")).unwrap();
        assert!(sln.contents.contains("\"hello\", \"HelloApp.vcxproj\""));
    }

    #[test]
    fn test_solution_dependencies_use_guids() {
        let tmp = TempDir::new().unwrap();
        let out = generate(
            &tmp,
            "toolsets = vs2010;\nprogram app {\n  sources { app.c }\n  deps = util;\n}\nlibrary util { sources { util.c } }\n",
            &[("app.c", ""), ("util.c", "")],
        );

        let sln = out.find(&tmp.path().join("demo.sln")).unwrap();
        let util_guid = project_guid("util");
        assert!(sln
            .contents
            .contains(&format!("\t\t{} = {}", util_guid, util_guid)));
    }

    #[test]
    fn test_external_project_referenced_not_rewritten() {
        let tmp = TempDir::new().unwrap();
        let external = r#"<?xml version="1.0" encoding="utf-8"?>
<Project DefaultTargets="Build" ToolsVersion="4.0">
  <PropertyGroup Label="Globals">
    <ProjectGuid>{12345678-ABCD-4321-9876-000011112222}</ProjectGuid>
    <RootNamespace>zlib</RootNamespace>
  </PropertyGroup>
</Project>
"#;
        let out = generate(
            &tmp,
            "toolsets = vs2010;\nexternal zlib { file = vendor/zlib.vcxproj; }\nprogram app {\n  sources { app.c }\n  deps = zlib;\n}\n",
            &[("app.c", ""), ("vendor/zlib.vcxproj", external)],
        );

        // Only app.vcxproj and the solution are generated.
        assert_eq!(out.len(), 2);
        assert!(out.find(&tmp.path().join("vendor/zlib.vcxproj")).is_none());

        let sln = out.find(&tmp.path().join("demo.sln")).unwrap();
        assert!(sln
            .contents
            .contains("\"zlib\", \"vendor\\zlib.vcxproj\", \"{12345678-ABCD-4321-9876-000011112222}\""));
        // The app depends on the external project's GUID.
        assert!(sln
            .contents
            .contains("{12345678-ABCD-4321-9876-000011112222} = {12345678-ABCD-4321-9876-000011112222}"));
    }

    #[test]
    fn test_legacy_external_format_rejected() {
        let tmp = TempDir::new().unwrap();
        let external = r#"<VisualStudioProject Version="9.00" Name="old" ProjectGUID="{AAAABBBB-CCCC-4DDD-8EEE-FFFF00001111}"/>"#;
        for (file, contents) in [("old.vcproj", external)] {
            fs::write(tmp.path().join(file), contents).unwrap();
        }
        let root = tmp.path().join("demo.bkl");
        fs::write(
            &root,
            "toolsets = vs2010;\nexternal old { file = old.vcproj; }\n",
        )
        .unwrap();

        let project = Project::load(&root).unwrap();
        let evaluated = evaluate(&project, Symbol::intern("vs2010"), &BTreeMap::new()).unwrap();

        let mut out = Outbox::new();
        let err = Vs2010Backend::new()
            .generate(&evaluated, &mut out)
            .unwrap_err();
        assert!(err.to_string().contains("VS 2008 format"));
    }

    #[test]
    fn test_submodule_project_paths_in_solution() {
        let tmp = TempDir::new().unwrap();
        let out = generate(
            &tmp,
            "toolsets = vs2010;\nsubmodule lib/inner.bkl;\nprogram app { sources { app.c } }\n",
            &[
                ("app.c", ""),
                ("lib/util.c", ""),
                ("lib/inner.bkl", "library util { sources { util.c } }\n"),
            ],
        );

        assert!(out.find(&tmp.path().join("lib/util.vcxproj")).is_some());
        let sln = out.find(&tmp.path().join("demo.sln")).unwrap();
        assert!(sln.contents.contains("\"util\", \"lib\\util.vcxproj\""));
    }
}
