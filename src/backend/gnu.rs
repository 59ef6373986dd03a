//! GNU make backend.
//!
//! Emits one `GNUmakefile` per module. Rules use conventional `CC` /
//! `CXX` / `AR` variables with `?=` defaults, so the environment can
//! override them, and settings become `NAME ?= default` assignments the
//! user can override on the make command line.

use anyhow::Result;

use crate::backend::trait_def::{banner, Outbox, ToolsetBackend};
use crate::core::expr::EvalString;
use crate::core::target::TargetKind;
use crate::eval::{BuildItem, EvaluatedModule, EvaluatedProject};
use crate::util::diagnostic::{suggestions, RecipeError};
use crate::util::fs::{relative_to, unix_slashes};

/// Default output file name; `gnu.makefile = ...` overrides it.
pub const DEFAULT_MAKEFILE: &str = "GNUmakefile";

/// GNU make toolset.
pub struct GnuBackend;

impl GnuBackend {
    pub fn new() -> Self {
        GnuBackend
    }
}

impl Default for GnuBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolsetBackend for GnuBackend {
    fn name(&self) -> &'static str {
        "gnu"
    }

    fn description(&self) -> &'static str {
        "GNU make makefiles (GNUmakefile)"
    }

    fn supports_kind(&self, kind: TargetKind) -> bool {
        kind != TargetKind::External
    }

    fn generate(&self, project: &EvaluatedProject, out: &mut Outbox) -> Result<()> {
        for module in &project.modules {
            let text = render_module(project, module)?;
            let name = module.makefile.as_deref().unwrap_or(DEFAULT_MAKEFILE);
            out.push(module.dir.join(name), text);
        }
        Ok(())
    }
}

/// True for extensions compiled as C++.
fn is_cxx_source(path: &std::path::Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("cpp" | "cc" | "cxx" | "C")
    )
}

/// Artifact file name for a compiled item, e.g. `libfoo.a`.
fn artifact_name(item: &BuildItem) -> String {
    let base = item.basename.render_dollar();
    match item.kind {
        TargetKind::Program => base,
        TargetKind::Library => format!("lib{}.a", base),
        TargetKind::SharedLibrary => format!("lib{}.so", base),
        TargetKind::External | TargetKind::Action => String::new(),
    }
}

/// Artifact path relative to the item's own module directory.
fn artifact_path(item: &BuildItem) -> String {
    let name = artifact_name(item);
    match &item.outputdir {
        Some(dir) => format!("{}/{}", unix_slashes(dir), name),
        None => name,
    }
}

/// How a dependency appears in a rule within `module`: the artifact
/// path (possibly in a sibling directory) or the phony name of an
/// action.
fn dep_ref(project: &EvaluatedProject, module: &EvaluatedModule, dep: &BuildItem) -> String {
    if dep.kind == TargetKind::Action {
        return dep.name.as_str().to_string();
    }
    let path = artifact_path(dep);
    if dep.module_idx == module.module_idx {
        path
    } else {
        let dep_dir = &project.modules[dep.module_idx].dir;
        let prefix = relative_to(dep_dir, &module.dir);
        format!("{}/{}", unix_slashes(&prefix), path)
    }
}

fn render_module(project: &EvaluatedProject, module: &EvaluatedModule) -> Result<String> {
    if let Some(item) = module
        .items
        .iter()
        .find(|item| item.kind == TargetKind::External)
    {
        return Err(RecipeError::UnsupportedTarget {
            toolset: "gnu".to_string(),
            kind: "external".to_string(),
            target: item.name.as_str().to_string(),
            advice: suggestions::EXTERNAL_UNSUPPORTED.to_string(),
        }
        .into());
    }

    let items = project.module_items_ordered(module.module_idx);
    let mut mk = String::new();

    mk.push_str(&banner("# "));
    mk.push('\n');
    mk.push_str("CC ?= cc\nCXX ?= c++\nAR ?= ar\n");

    if !project.settings.is_empty() {
        mk.push('\n');
        for setting in &project.settings {
            if let Some(help) = &setting.help {
                mk.push_str(&format!("# {}\n", help));
            }
            mk.push_str(&format!(
                "{} ?= {}\n",
                setting.name,
                setting.default.render_dollar()
            ));
        }
    }

    // Phony recursion targets for submodules.
    let submodules: Vec<(String, String)> = module
        .submodules
        .iter()
        .map(|&child_idx| {
            let child = &project.modules[child_idx];
            let rel = unix_slashes(&relative_to(&child.dir, &module.dir));
            let phony = format!("submodule_{}", rel.replace('/', "_"));
            let makefile = child.makefile.as_deref().unwrap_or(DEFAULT_MAKEFILE);
            (phony, format!("$(MAKE) -C {} -f {}", rel, makefile))
        })
        .collect();

    let mut all_targets: Vec<String> = Vec::new();
    for item in &items {
        match item.kind {
            TargetKind::Action => all_targets.push(item.name.as_str().to_string()),
            _ => all_targets.push(artifact_path(item)),
        }
    }
    all_targets.extend(submodules.iter().map(|(phony, _)| phony.clone()));

    mk.push('\n');
    mk.push_str(&format!("all: {}\n", all_targets.join(" ")));

    let mut phonies = vec!["all".to_string(), "clean".to_string()];
    let mut clean_files: Vec<String> = Vec::new();

    for item in &items {
        mk.push('\n');
        match item.kind {
            TargetKind::Program | TargetKind::Library | TargetKind::SharedLibrary => {
                render_compiled(project, module, item, &mut mk, &mut clean_files);
            }
            TargetKind::Action => {
                render_action(project, module, item, &mut mk);
                phonies.push(item.name.as_str().to_string());
            }
            TargetKind::External => unreachable!("rejected above"),
        }
    }

    mk.push('\n');
    for (phony, recurse) in &submodules {
        mk.push_str(&format!("{}:\n\t{}\n\n", phony, recurse));
        phonies.push(phony.clone());
    }

    mk.push_str("clean:\n");
    for file in &clean_files {
        mk.push_str(&format!("\trm -f {}\n", file));
    }
    for (_, recurse) in &submodules {
        mk.push_str(&format!("\t{} clean\n", recurse));
    }

    mk.push('\n');
    mk.push_str(&format!(".PHONY: {}\n", phonies.join(" ")));

    Ok(mk)
}

fn render_compiled(
    project: &EvaluatedProject,
    module: &EvaluatedModule,
    item: &BuildItem,
    mk: &mut String,
    clean_files: &mut Vec<String>,
) {
    let name = item.name.as_str();
    let artifact = artifact_path(item);
    let has_cxx = item.sources.iter().any(|s| is_cxx_source(s));

    let objects: Vec<String> = item
        .sources
        .iter()
        .map(|src| unix_slashes(&src.with_extension("o")))
        .collect();

    let cppflags: Vec<String> = item
        .defines
        .iter()
        .map(|d| format!("-D{}", d.render_dollar()))
        .chain(
            item.includedirs
                .iter()
                .map(|dir| format!("-I{}", dir.render_dollar())),
        )
        .collect();
    let extra_cflags = join_flags(&item.compiler_options);

    mk.push_str(&format!("{}_OBJECTS = {}\n", name, objects.join(" ")));
    mk.push_str(&format!("{}_CPPFLAGS = {}\n", name, cppflags.join(" ")));
    mk.push_str(&format!("{}_CFLAGS = {}\n", name, extra_cflags));
    mk.push('\n');

    // Link or archive rule.
    let dep_refs: Vec<String> = item
        .deps
        .iter()
        .filter_map(|dep| project.find_item(*dep))
        .map(|dep| dep_ref(project, module, dep))
        .collect();

    let mut prereqs = vec![format!("$({}_OBJECTS)", name)];
    prereqs.extend(dep_refs.iter().cloned());
    mk.push_str(&format!("{}: {}\n", artifact, prereqs.join(" ")));

    if item.outputdir.is_some() {
        mk.push_str("\t@mkdir -p $(@D)\n");
    }

    match item.kind {
        TargetKind::Library => {
            mk.push_str(&format!("\t$(AR) rcs $@ $({}_OBJECTS)\n", name));
        }
        TargetKind::Program | TargetKind::SharedLibrary => {
            let linker = if has_cxx { "$(CXX)" } else { "$(CC)" };
            let mut line = format!("\t{} -o $@ $(LDFLAGS)", linker);
            if item.kind == TargetKind::SharedLibrary {
                line.push_str(" -shared");
            }
            for opt in &item.link_options {
                line.push_str(&format!(" {}", opt.render_dollar()));
            }
            line.push_str(&format!(" $({}_OBJECTS)", name));
            for dir in &item.libdirs {
                line.push_str(&format!(" -L{}", dir.render_dollar()));
            }
            for dep in item
                .deps
                .iter()
                .filter_map(|d| project.find_item(*d))
                .filter(|d| d.kind.is_linkable())
            {
                line.push_str(&format!(" {}", dep_ref(project, module, dep)));
            }
            for lib in &item.libs {
                line.push_str(&format!(" -l{}", lib.render_dollar()));
            }
            mk.push_str(&line);
            mk.push('\n');
        }
        _ => {}
    }
    mk.push('\n');

    // One compile rule per source.
    let pic = if item.kind == TargetKind::SharedLibrary {
        " -fPIC"
    } else {
        ""
    };
    for (src, obj) in item.sources.iter().zip(&objects) {
        let src_str = unix_slashes(src);
        let compiler = if is_cxx_source(src) { "$(CXX)" } else { "$(CC)" };
        let base_flags = if is_cxx_source(src) {
            "$(CXXFLAGS)"
        } else {
            "$(CFLAGS)"
        };
        mk.push_str(&format!("{}: {}\n", obj, src_str));
        mk.push_str(&format!(
            "\t{} -c -o $@{} $(CPPFLAGS) $({}_CPPFLAGS) {} $({}_CFLAGS) {}\n",
            compiler, pic, name, base_flags, name, src_str
        ));
    }

    clean_files.extend(objects);
    clean_files.push(artifact);
}

fn render_action(
    project: &EvaluatedProject,
    module: &EvaluatedModule,
    item: &BuildItem,
    mk: &mut String,
) {
    let dep_refs: Vec<String> = item
        .deps
        .iter()
        .filter_map(|dep| project.find_item(*dep))
        .map(|dep| dep_ref(project, module, dep))
        .collect();

    if dep_refs.is_empty() {
        mk.push_str(&format!("{}:\n", item.name));
    } else {
        mk.push_str(&format!("{}: {}\n", item.name, dep_refs.join(" ")));
    }
    for command in &item.commands {
        mk.push_str(&format!("\t{}\n", command.render_dollar()));
    }
}

fn join_flags(flags: &[EvalString]) -> String {
    flags
        .iter()
        .map(|f| f.render_dollar())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::project::Project;
    use crate::eval::evaluate;
    use crate::util::interning::Symbol;
    use std::collections::BTreeMap;
    use std::fs;
    use tempfile::TempDir;

    fn generate(recipe: &str, files: &[&str]) -> (TempDir, Outbox) {
        let tmp = TempDir::new().unwrap();
        for file in files {
            let path = tmp.path().join(file);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(&path, "").unwrap();
        }
        let root = tmp.path().join("root.bkl");
        fs::write(&root, recipe).unwrap();

        let project = Project::load(&root).unwrap();
        let evaluated = evaluate(&project, Symbol::intern("gnu"), &BTreeMap::new()).unwrap();

        let mut out = Outbox::new();
        GnuBackend::new().generate(&evaluated, &mut out).unwrap();
        (tmp, out)
    }

    fn single_makefile(out: &Outbox) -> &str {
        assert_eq!(out.len(), 1);
        &out.files()[0].contents
    }

    #[test]
    fn test_hello_program_rules() {
        let (_tmp, out) = generate(
            "toolsets = gnu;\nprogram hello {\n  sources { hello.c }\n  defines = GREETING;\n  libs = m;\n}\n",
            &["hello.c"],
        );
        let mk = single_makefile(&out);

        assert!(mk.starts_with("# This file was automatically generated by griddle."));
        assert!(mk.contains("all: hello\n"));
        assert!(mk.contains("hello_OBJECTS = hello.o"));
        assert!(mk.contains("hello_CPPFLAGS = -DGREETING"));
        assert!(mk.contains("hello: $(hello_OBJECTS)"));
        assert!(mk.contains("$(CC) -o $@ $(LDFLAGS) $(hello_OBJECTS) -lm"));
        assert!(mk.contains("hello.o: hello.c"));
        assert!(mk.contains("rm -f hello"));
        assert!(mk.contains(".PHONY: all clean"));
    }

    #[test]
    fn test_makefile_lands_in_module_dir() {
        let (tmp, out) = generate(
            "toolsets = gnu;\nprogram hello { sources { hello.c } }\n",
            &["hello.c"],
        );
        assert_eq!(out.files()[0].path, tmp.path().join("GNUmakefile"));
    }

    #[test]
    fn test_makefile_name_override() {
        let (tmp, out) = generate(
            "toolsets = gnu;\ngnu.makefile = Makefile.hello;\nprogram hello { sources { hello.c } }\n",
            &["hello.c"],
        );
        assert_eq!(out.files()[0].path, tmp.path().join("Makefile.hello"));
    }

    #[test]
    fn test_setting_becomes_overridable_variable() {
        let (_tmp, out) = generate(
            "toolsets = gnu;\nsetting PROGRAM_NAME {\n  help = \"Name of the program\";\n  default = hello;\n}\nprogram hello {\n  sources { hello.c }\n  basename = $(PROGRAM_NAME);\n}\n",
            &["hello.c"],
        );
        let mk = single_makefile(&out);

        assert!(mk.contains("# Name of the program\n"));
        assert!(mk.contains("PROGRAM_NAME ?= hello\n"));
        // The artifact rule late-binds the setting.
        assert!(mk.contains("all: $(PROGRAM_NAME)\n"));
        assert!(mk.contains("$(PROGRAM_NAME): $(hello_OBJECTS)"));
    }

    #[test]
    fn test_static_library_archive_rule() {
        let (_tmp, out) = generate(
            "toolsets = gnu;\nlibrary util { sources { util.c } }\n",
            &["util.c"],
        );
        let mk = single_makefile(&out);

        assert!(mk.contains("libutil.a: $(util_OBJECTS)"));
        assert!(mk.contains("$(AR) rcs $@ $(util_OBJECTS)"));
    }

    #[test]
    fn test_shared_library_uses_pic_and_shared() {
        let (_tmp, out) = generate(
            "toolsets = gnu;\nshared-library util { sources { util.c } }\n",
            &["util.c"],
        );
        let mk = single_makefile(&out);

        assert!(mk.contains("libutil.so: $(util_OBJECTS)"));
        assert!(mk.contains("-shared"));
        assert!(mk.contains("-fPIC"));
    }

    #[test]
    fn test_cxx_sources_use_cxx_compiler() {
        let (_tmp, out) = generate(
            "toolsets = gnu;\nprogram hello { sources { main.cpp helper.c } }\n",
            &["main.cpp", "helper.c"],
        );
        let mk = single_makefile(&out);

        assert!(mk.contains("$(CXX) -c -o $@ $(CPPFLAGS) $(hello_CPPFLAGS) $(CXXFLAGS)"));
        assert!(mk.contains("$(CC) -c -o $@ $(CPPFLAGS) $(hello_CPPFLAGS) $(CFLAGS)"));
        // Mixed-language targets link with the C++ driver.
        assert!(mk.contains("$(CXX) -o $@"));
    }

    #[test]
    fn test_dependency_ordering_and_link_line() {
        let (_tmp, out) = generate(
            "toolsets = gnu;\nprogram app {\n  sources { app.c }\n  deps = util;\n}\nlibrary util { sources { util.c } }\n",
            &["app.c", "util.c"],
        );
        let mk = single_makefile(&out);

        // Library first in `all`, and the app links the archive.
        let all_line = mk.lines().find(|l| l.starts_with("all:")).unwrap();
        let util_pos = all_line.find("libutil.a").unwrap();
        let app_pos = all_line.find("app").unwrap();
        assert!(util_pos < app_pos, "got: {}", all_line);

        assert!(mk.contains("app: $(app_OBJECTS) libutil.a"));
        assert!(mk.contains("$(app_OBJECTS) libutil.a"));
    }

    #[test]
    fn test_action_rule_is_phony() {
        let (_tmp, out) = generate(
            "toolsets = gnu;\naction docs {\n  commands = \"doxygen Doxyfile\";\n}\n",
            &[],
        );
        let mk = single_makefile(&out);

        assert!(mk.contains("docs:\n\tdoxygen Doxyfile\n"));
        assert!(mk.contains(".PHONY: all clean docs"));
    }

    #[test]
    fn test_external_target_is_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("dep.vcxproj"), "x").unwrap();
        let root = tmp.path().join("root.bkl");
        fs::write(
            &root,
            "toolsets = gnu;\nexternal dep { file = dep.vcxproj; }\n",
        )
        .unwrap();

        let project = Project::load(&root).unwrap();
        let evaluated = evaluate(&project, Symbol::intern("gnu"), &BTreeMap::new()).unwrap();

        let mut out = Outbox::new();
        let err = GnuBackend::new().generate(&evaluated, &mut out).unwrap_err();
        assert!(err.to_string().contains("cannot generate external"));
    }

    #[test]
    fn test_submodule_recursion() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("lib")).unwrap();
        fs::write(tmp.path().join("lib/util.c"), "").unwrap();
        fs::write(
            tmp.path().join("lib/inner.bkl"),
            "library util { sources { util.c } }\n",
        )
        .unwrap();
        fs::write(tmp.path().join("app.c"), "").unwrap();
        let root = tmp.path().join("root.bkl");
        fs::write(
            &root,
            "toolsets = gnu;\nsubmodule lib/inner.bkl;\nprogram app { sources { app.c } }\n",
        )
        .unwrap();

        let project = Project::load(&root).unwrap();
        let evaluated = evaluate(&project, Symbol::intern("gnu"), &BTreeMap::new()).unwrap();

        let mut out = Outbox::new();
        GnuBackend::new().generate(&evaluated, &mut out).unwrap();

        assert_eq!(out.len(), 2);
        let root_mk = &out.files()[0].contents;
        assert!(root_mk.contains("all: app submodule_lib"));
        assert!(root_mk.contains("submodule_lib:\n\t$(MAKE) -C lib -f GNUmakefile"));
        assert!(root_mk.contains("$(MAKE) -C lib -f GNUmakefile clean"));

        let child_mk = &out.files()[1].contents;
        assert!(child_mk.contains("libutil.a"));
    }

    #[test]
    fn test_outputdir_creates_directory() {
        let (_tmp, out) = generate(
            "toolsets = gnu;\nprogram hello {\n  sources { hello.c }\n  outputdir = bin;\n}\n",
            &["hello.c"],
        );
        let mk = single_makefile(&out);

        assert!(mk.contains("bin/hello: $(hello_OBJECTS)"));
        assert!(mk.contains("@mkdir -p $(@D)"));
        assert!(mk.contains("rm -f bin/hello"));
    }
}
