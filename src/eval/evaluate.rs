//! The evaluation pass: project + toolset -> build items.

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

use anyhow::Result;
use tracing::debug;

use crate::core::expr::{EvalString, Piece};
use crate::core::project::{Module, Project};
use crate::core::property;
use crate::core::target::{PropAssign, TargetDecl, TargetKind};
use crate::eval::env::{Items, ModuleEnv, Resolver, TargetEnv};
use crate::eval::graph::dependency_order;
use crate::eval::{BuildItem, EvaluatedModule, EvaluatedProject, EvaluatedSetting, Subsystem};
use crate::syntax::ast::Span;
use crate::util::diagnostic::{did_you_mean, suggestions, RecipeError};
use crate::util::fs::glob_relative;
use crate::util::interning::Symbol;

/// Evaluate a project for one toolset.
///
/// `predefined` holds variables bound before the recipe's own
/// assignments run (from `--define` and the user config).
pub fn evaluate(
    project: &Project,
    toolset: Symbol,
    predefined: &BTreeMap<String, String>,
) -> Result<EvaluatedProject> {
    debug!(toolset = toolset.as_str(), "evaluating project");

    let setting_names: HashSet<Symbol> = project.settings().iter().map(|s| s.name).collect();

    let settings = evaluate_settings(project, toolset, &setting_names, predefined)?;

    let mut modules = Vec::with_capacity(project.modules.len());
    for (module_idx, module) in project.modules.iter().enumerate() {
        let env = ModuleEnv::new(module, toolset, setting_names.clone(), predefined);

        let makefile = module_output_override(module, &env, toolset)?;

        let mut items = Vec::with_capacity(module.targets.len());
        for target in &module.targets {
            items.push(evaluate_target(project, module, &env, target, toolset)?);
        }

        modules.push(EvaluatedModule {
            module_idx,
            dir: module.dir.clone(),
            src_name: module.src_name.clone(),
            makefile,
            items,
            submodules: module.submodules.clone(),
        });
    }

    let dep_pairs: Vec<(Symbol, Vec<Symbol>)> = modules
        .iter()
        .flat_map(|m| m.items.iter())
        .map(|item| (item.name, item.deps.clone()))
        .collect();
    let order = dependency_order(&dep_pairs)?;

    Ok(EvaluatedProject {
        toolset,
        root_dir: project.root_dir.clone(),
        root_stem: project.root_stem.clone(),
        settings,
        modules,
        order,
    })
}

fn evaluate_settings(
    project: &Project,
    toolset: Symbol,
    setting_names: &HashSet<Symbol>,
    predefined: &BTreeMap<String, String>,
) -> Result<Vec<EvaluatedSetting>> {
    let root = &project.modules[0];
    let env = ModuleEnv::new(root, toolset, setting_names.clone(), predefined);

    let mut settings = Vec::new();
    for setting in project.settings() {
        let items = env.eval_list(&setting.default)?;
        let default = join_items(&items);
        if !default.is_literal() {
            return Err(RecipeError::Syntax {
                message: format!(
                    "default of setting `{}` cannot reference another setting",
                    setting.name
                ),
                src: root.named_source(),
                span: setting.default.span.into(),
                label: "resolves to a build-time value".to_string(),
            }
            .into());
        }
        settings.push(EvaluatedSetting {
            name: setting.name,
            help: setting.help.clone(),
            default,
        });
    }
    Ok(settings)
}

/// Fold the per-toolset `makefile` override for a module.
fn module_output_override(
    module: &Module,
    env: &ModuleEnv<'_>,
    toolset: Symbol,
) -> Result<Option<String>> {
    let mut items = Items::new();
    for assign in &module.vars {
        if assign.name.as_str() == "makefile" && assign.toolset == Some(toolset) {
            env.apply_assign(assign, &mut items)?;
        }
    }
    match items.as_slice() {
        [] => Ok(None),
        [(value, span)] => Ok(Some(literal_or_err(
            module,
            value,
            *span,
            "output file names cannot reference settings",
        )?)),
        [_, (_, span), ..] => Err(RecipeError::Syntax {
            message: "expected a single file name".to_string(),
            src: module.named_source(),
            span: (*span).into(),
            label: "extra value".to_string(),
        }
        .into()),
    }
}

fn evaluate_target(
    project: &Project,
    module: &Module,
    env: &ModuleEnv<'_>,
    target: &TargetDecl,
    toolset: Symbol,
) -> Result<BuildItem> {
    let chain = build_chain(project, module, target, toolset)?;
    let tenv = TargetEnv::new(env, chain);

    let mut item = BuildItem {
        name: target.name,
        kind: target.kind,
        module_idx: target.module_idx,
        basename: EvalString::lit(target.name.as_str()),
        sources: Vec::new(),
        headers: Vec::new(),
        defines: Vec::new(),
        includedirs: Vec::new(),
        libs: Vec::new(),
        libdirs: Vec::new(),
        compiler_options: Vec::new(),
        link_options: Vec::new(),
        deps: Vec::new(),
        outputdir: None,
        subsystem: Subsystem::default(),
        external_file: None,
        commands: Vec::new(),
        projectfile: None,
    };

    let at = target.name_span;

    if let Some(items) = tenv.resolve_property(Symbol::intern("basename"), at)? {
        item.basename = single_value(module, &items, "basename")?;
    }
    if let Some(items) = tenv.resolve_property(Symbol::intern("sources"), at)? {
        item.sources = expand_patterns(module, &items)?;
    }
    if let Some(items) = tenv.resolve_property(Symbol::intern("headers"), at)? {
        item.headers = expand_patterns(module, &items)?;
    }
    if let Some(items) = tenv.resolve_property(Symbol::intern("defines"), at)? {
        item.defines = values(items);
    }
    if let Some(items) = tenv.resolve_property(Symbol::intern("includedirs"), at)? {
        item.includedirs = values(items);
    }
    if let Some(items) = tenv.resolve_property(Symbol::intern("libs"), at)? {
        item.libs = values(items);
    }
    if let Some(items) = tenv.resolve_property(Symbol::intern("libdirs"), at)? {
        item.libdirs = values(items);
    }
    if let Some(items) = tenv.resolve_property(Symbol::intern("compiler-options"), at)? {
        item.compiler_options = values(items);
    }
    if let Some(items) = tenv.resolve_property(Symbol::intern("link-options"), at)? {
        item.link_options = values(items);
    }
    if let Some(items) = tenv.resolve_property(Symbol::intern("commands"), at)? {
        item.commands = values(items);
    }
    if let Some(items) = tenv.resolve_property(Symbol::intern("outputdir"), at)? {
        let value = single_value(module, &items, "outputdir")?;
        let span = items.first().map(|(_, s)| *s).unwrap_or(at);
        item.outputdir = Some(PathBuf::from(literal_or_err(
            module,
            &value,
            span,
            "outputdir cannot reference settings",
        )?));
    }
    if let Some(items) = tenv.resolve_property(Symbol::intern("win32-subsystem"), at)? {
        let value = single_value(module, &items, "win32-subsystem")?;
        let span = items.first().map(|(_, s)| *s).unwrap_or(at);
        let text = literal_or_err(
            module,
            &value,
            span,
            "win32-subsystem cannot reference settings",
        )?;
        item.subsystem = Subsystem::from_value(&text).ok_or_else(|| RecipeError::Syntax {
            message: format!("invalid win32-subsystem `{}`", text),
            src: module.named_source(),
            span: span.into(),
            label: "expected `console` or `windows`".to_string(),
        })?;
    }
    if let Some(items) = tenv.resolve_property(Symbol::intern("file"), at)? {
        let value = single_value(module, &items, "file")?;
        let span = items.first().map(|(_, s)| *s).unwrap_or(at);
        item.external_file = Some(PathBuf::from(literal_or_err(
            module,
            &value,
            span,
            "external project paths cannot reference settings",
        )?));
    }
    if let Some(items) = tenv.resolve_property(Symbol::intern("projectfile"), at)? {
        let value = single_value(module, &items, "projectfile")?;
        let span = items.first().map(|(_, s)| *s).unwrap_or(at);
        item.projectfile = Some(literal_or_err(
            module,
            &value,
            span,
            "output file names cannot reference settings",
        )?);
    }
    if let Some(items) = tenv.resolve_property(Symbol::intern("deps"), at)? {
        for (value, span) in &items {
            let name = literal_or_err(module, value, *span, "deps cannot reference settings")?;
            let dep = Symbol::intern(&name);
            if project.find_target(dep).is_none() {
                let candidates: Vec<&str> =
                    project.all_targets().map(|t| t.name.as_str()).collect();
                return Err(RecipeError::UnknownDependency {
                    target: target.name.as_str().to_string(),
                    dep: name,
                    src: module.named_source(),
                    span: (*span).into(),
                    suggestion: did_you_mean(dep.as_str(), candidates)
                        .or_else(|| Some(suggestions::DEP_NOT_FOUND.to_string())),
                }
                .into());
            }
            item.deps.push(dep);
        }
    }

    // Kind-specific requirements.
    match target.kind {
        TargetKind::Program | TargetKind::Library | TargetKind::SharedLibrary => {
            if item.sources.is_empty() {
                return Err(RecipeError::RequiredProperty {
                    kind: target.kind.keyword(),
                    target: target.name.as_str().to_string(),
                    name: "sources",
                    src: module.named_source(),
                    span: target.name_span.into(),
                }
                .into());
            }
        }
        TargetKind::External => {
            if item.external_file.is_none() {
                return Err(RecipeError::RequiredProperty {
                    kind: "external",
                    target: target.name.as_str().to_string(),
                    name: "file",
                    src: module.named_source(),
                    span: target.name_span.into(),
                }
                .into());
            }
        }
        TargetKind::Action => {}
    }

    Ok(item)
}

/// Build the effective assignment chain for a target: inheritable
/// file-scope assignments, template bodies depth-first, then the
/// target's own assignments. Toolset-scoped assignments are kept only
/// for the active toolset.
fn build_chain<'p>(
    project: &'p Project,
    module: &'p Module,
    target: &'p TargetDecl,
    toolset: Symbol,
) -> Result<Vec<&'p PropAssign>> {
    let mut chain: Vec<&'p PropAssign> = Vec::new();

    for assign in &module.vars {
        if let Some(def) = property::lookup(assign.name.as_str()) {
            if def.inheritable && property::accepts(def, target.kind) {
                chain.push(assign);
            }
        }
    }

    let mut visiting = Vec::new();
    for (base, span) in &target.bases {
        collect_template(project, module, target, *base, *span, &mut visiting, &mut chain)?;
    }

    chain.extend(target.assigns.iter());

    Ok(chain
        .into_iter()
        .filter(|a| a.toolset.is_none() || a.toolset == Some(toolset))
        .collect())
}

fn collect_template<'p>(
    project: &'p Project,
    module: &'p Module,
    target: &'p TargetDecl,
    name: Symbol,
    span: Span,
    visiting: &mut Vec<Symbol>,
    chain: &mut Vec<&'p PropAssign>,
) -> Result<()> {
    if visiting.contains(&name) {
        let names = visiting
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(" -> ");
        return Err(RecipeError::ReferenceCycle {
            chain: names,
            src: module.named_source(),
            span: span.into(),
        }
        .into());
    }

    let Some(template) = project.find_template(name) else {
        let candidates: Vec<&str> = project.all_templates().map(|t| t.name.as_str()).collect();
        return Err(RecipeError::UnknownTemplate {
            name: name.as_str().to_string(),
            src: module.named_source(),
            span: span.into(),
            suggestion: did_you_mean(name.as_str(), candidates),
        }
        .into());
    };

    // A template property must apply to the kind it lands on.
    for assign in &template.assigns {
        if let Some(def) = property::lookup(assign.name.as_str()) {
            if !property::accepts(def, target.kind) && !def.toolset_scoped {
                return Err(RecipeError::MisplacedProperty {
                    name: assign.name.as_str().to_string(),
                    kind: target.kind.keyword().to_string(),
                    src: project.modules[template.module_idx].named_source(),
                    span: assign.name_span.into(),
                    accepted: property::accepted_kinds(def)
                        .map(|kinds| format!("accepted on: {}", kinds)),
                }
                .into());
            }
        }
    }

    visiting.push(name);
    for (base, base_span) in &template.bases {
        collect_template(project, module, target, *base, *base_span, visiting, chain)?;
    }
    visiting.pop();

    chain.extend(template.assigns.iter());
    Ok(())
}

fn values(items: Items) -> Vec<EvalString> {
    items.into_iter().map(|(value, _)| value).collect()
}

fn join_items(items: &Items) -> EvalString {
    let mut joined = EvalString::default();
    for (idx, (value, _)) in items.iter().enumerate() {
        if idx > 0 {
            joined.push(Piece::Lit(" ".to_string()));
        }
        joined.extend(value);
    }
    joined
}

fn single_value(
    module: &Module,
    items: &Items,
    what: &str,
) -> Result<EvalString, RecipeError> {
    match items.as_slice() {
        [(value, _)] => Ok(value.clone()),
        [] => Ok(EvalString::default()),
        [_, (_, span), ..] => Err(RecipeError::Syntax {
            message: format!("`{}` expects a single value", what),
            src: module.named_source(),
            span: (*span).into(),
            label: "extra value".to_string(),
        }),
    }
}

fn literal_or_err(
    module: &Module,
    value: &EvalString,
    span: Span,
    message: &str,
) -> Result<String, RecipeError> {
    value
        .as_literal()
        .map(str::to_string)
        .ok_or_else(|| RecipeError::Syntax {
            message: message.to_string(),
            src: module.named_source(),
            span: span.into(),
            label: "resolves to a build-time value".to_string(),
        })
}

/// Expand source/header patterns relative to the module directory.
fn expand_patterns(module: &Module, items: &Items) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for (value, span) in items {
        let pattern = literal_or_err(
            module,
            value,
            *span,
            "file patterns cannot reference settings",
        )?;
        let matched = glob_relative(&module.dir, &pattern)?;
        if matched.is_empty() {
            return Err(RecipeError::EmptyGlob {
                pattern,
                src: module.named_source(),
                span: (*span).into(),
            }
            .into());
        }
        paths.extend(matched);
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn sym(s: &str) -> Symbol {
        Symbol::intern(s)
    }

    fn no_vars() -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    /// Write a recipe plus the source files it mentions, then load it.
    fn project_with(dir: &TempDir, recipe: &str, files: &[&str]) -> Project {
        for file in files {
            let path = dir.path().join(file);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(&path, "").unwrap();
        }
        let path = dir.path().join("root.bkl");
        fs::write(&path, recipe).unwrap();
        Project::load(&path).unwrap()
    }

    #[test]
    fn test_toolset_conditional_selects_per_pass() {
        let tmp = TempDir::new().unwrap();
        let project = project_with(
            &tmp,
            "toolsets = gnu vs2010;\nprogram hello {\n  sources { hello.c }\n  if ( $(toolset) == gnu ) defines += BUILT_WITH_GNU;\n}\n",
            &["hello.c"],
        );

        let gnu = evaluate(&project, sym("gnu"), &no_vars()).unwrap();
        let item = gnu.find_item(sym("hello")).unwrap();
        assert_eq!(item.defines.len(), 1);
        assert_eq!(item.defines[0].as_literal(), Some("BUILT_WITH_GNU"));

        let vs = evaluate(&project, sym("vs2010"), &no_vars()).unwrap();
        let item = vs.find_item(sym("hello")).unwrap();
        assert!(item.defines.is_empty());
    }

    #[test]
    fn test_setting_reference_stays_symbolic() {
        let tmp = TempDir::new().unwrap();
        let project = project_with(
            &tmp,
            "toolsets = gnu;\nsetting PROGRAM_NAME {\n  help = \"Output name\";\n  default = hello;\n}\nprogram hello {\n  sources { hello.c }\n  basename = $(PROGRAM_NAME);\n}\n",
            &["hello.c"],
        );

        let evaluated = evaluate(&project, sym("gnu"), &no_vars()).unwrap();
        assert_eq!(evaluated.settings.len(), 1);
        assert_eq!(evaluated.settings[0].default.as_literal(), Some("hello"));

        let item = evaluated.find_item(sym("hello")).unwrap();
        assert!(!item.basename.is_literal());
        assert_eq!(item.basename.render_dollar(), "$(PROGRAM_NAME)");
    }

    #[test]
    fn test_variable_interpolation_and_splicing() {
        let tmp = TempDir::new().unwrap();
        let project = project_with(
            &tmp,
            "toolsets = gnu;\ncommon_defines = ALPHA BETA;\nprogram hello {\n  sources { hello.c }\n  defines = $(common_defines) EXTRA_$(toolset);\n}\n",
            &["hello.c"],
        );

        let evaluated = evaluate(&project, sym("gnu"), &no_vars()).unwrap();
        let item = evaluated.find_item(sym("hello")).unwrap();
        let defines: Vec<_> = item
            .defines
            .iter()
            .map(|d| d.as_literal().unwrap())
            .collect();
        assert_eq!(defines, vec!["ALPHA", "BETA", "EXTRA_gnu"]);
    }

    #[test]
    fn test_template_inheritance_order() {
        let tmp = TempDir::new().unwrap();
        let project = project_with(
            &tmp,
            "toolsets = gnu;\ntemplate base { defines = FROM_BASE; }\ntemplate extra : base { defines += FROM_EXTRA; }\nprogram hello : extra {\n  sources { hello.c }\n  defines += OWN;\n}\n",
            &["hello.c"],
        );

        let evaluated = evaluate(&project, sym("gnu"), &no_vars()).unwrap();
        let item = evaluated.find_item(sym("hello")).unwrap();
        let defines: Vec<_> = item
            .defines
            .iter()
            .map(|d| d.as_literal().unwrap())
            .collect();
        assert_eq!(defines, vec!["FROM_BASE", "FROM_EXTRA", "OWN"]);
    }

    #[test]
    fn test_file_scope_inheritance_only_for_inheritable() {
        let tmp = TempDir::new().unwrap();
        let project = project_with(
            &tmp,
            "toolsets = gnu;\ndefines = GLOBAL;\nprogram a { sources { a.c } }\nprogram b {\n  sources { b.c }\n  defines = OWN;\n}\n",
            &["a.c", "b.c"],
        );

        let evaluated = evaluate(&project, sym("gnu"), &no_vars()).unwrap();
        let a = evaluated.find_item(sym("a")).unwrap();
        assert_eq!(a.defines[0].as_literal(), Some("GLOBAL"));

        // `=` replaces the inherited value.
        let b = evaluated.find_item(sym("b")).unwrap();
        let defines: Vec<_> = b.defines.iter().map(|d| d.as_literal().unwrap()).collect();
        assert_eq!(defines, vec!["OWN"]);
    }

    #[test]
    fn test_glob_expansion_sorted() {
        let tmp = TempDir::new().unwrap();
        let project = project_with(
            &tmp,
            "toolsets = gnu;\nprogram hello { sources { src/*.c } }\n",
            &["src/zeta.c", "src/alpha.c"],
        );

        let evaluated = evaluate(&project, sym("gnu"), &no_vars()).unwrap();
        let item = evaluated.find_item(sym("hello")).unwrap();
        assert_eq!(
            item.sources,
            vec![PathBuf::from("src/alpha.c"), PathBuf::from("src/zeta.c")]
        );
    }

    #[test]
    fn test_empty_glob_errors() {
        let tmp = TempDir::new().unwrap();
        let project = project_with(
            &tmp,
            "toolsets = gnu;\nprogram hello { sources { src/*.c } }\n",
            &[],
        );

        let err = evaluate(&project, sym("gnu"), &no_vars()).unwrap_err();
        assert!(err.to_string().contains("matched no files"));
    }

    #[test]
    fn test_undefined_variable_with_suggestion() {
        let tmp = TempDir::new().unwrap();
        let project = project_with(
            &tmp,
            "toolsets = gnu;\nmy_flags = -Wall;\nprogram hello {\n  sources { hello.c }\n  compiler-options = $(my_flgas);\n}\n",
            &["hello.c"],
        );

        let err = evaluate(&project, sym("gnu"), &no_vars()).unwrap_err();
        let recipe_err = err.downcast_ref::<RecipeError>().unwrap();
        let RecipeError::UndefinedVariable { suggestion, .. } = recipe_err else {
            panic!("expected UndefinedVariable, got {:?}", recipe_err);
        };
        assert_eq!(suggestion.as_deref(), Some("did you mean `my_flags`?"));
    }

    #[test]
    fn test_reference_cycle_errors() {
        let tmp = TempDir::new().unwrap();
        let project = project_with(
            &tmp,
            "toolsets = gnu;\na = $(b);\nb = $(a);\nprogram hello {\n  sources { hello.c }\n  defines = $(a);\n}\n",
            &["hello.c"],
        );

        let err = evaluate(&project, sym("gnu"), &no_vars()).unwrap_err();
        assert!(err.to_string().contains("reference cycle"));
    }

    #[test]
    fn test_condition_on_setting_errors() {
        let tmp = TempDir::new().unwrap();
        let project = project_with(
            &tmp,
            "toolsets = gnu;\nsetting FLAVOR { default = plain; }\nprogram hello {\n  sources { hello.c }\n  if ( $(FLAVOR) == spicy ) defines += SPICY;\n}\n",
            &["hello.c"],
        );

        let err = evaluate(&project, sym("gnu"), &no_vars()).unwrap_err();
        assert!(err
            .to_string()
            .contains("cannot be evaluated at generation time"));
    }

    #[test]
    fn test_unknown_dependency_errors() {
        let tmp = TempDir::new().unwrap();
        let project = project_with(
            &tmp,
            "toolsets = gnu;\nprogram hello {\n  sources { hello.c }\n  deps = utills;\n}\nlibrary utils { sources { utils.c } }\n",
            &["hello.c", "utils.c"],
        );

        let err = evaluate(&project, sym("gnu"), &no_vars()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("unknown target `utills`"), "got: {}", msg);
    }

    #[test]
    fn test_dependency_cycle_errors() {
        let tmp = TempDir::new().unwrap();
        let project = project_with(
            &tmp,
            "toolsets = gnu;\nlibrary a {\n  sources { a.c }\n  deps = b;\n}\nlibrary b {\n  sources { b.c }\n  deps = a;\n}\n",
            &["a.c", "b.c"],
        );

        let err = evaluate(&project, sym("gnu"), &no_vars()).unwrap_err();
        assert!(err.to_string().contains("dependency cycle"));
    }

    #[test]
    fn test_predefined_variable_binding() {
        let tmp = TempDir::new().unwrap();
        let project = project_with(
            &tmp,
            "toolsets = gnu;\nprogram hello {\n  sources { hello.c }\n  defines = MODE_$(flavor);\n}\n",
            &["hello.c"],
        );

        let mut vars = BTreeMap::new();
        vars.insert("flavor".to_string(), "debug".to_string());
        let evaluated = evaluate(&project, sym("gnu"), &vars).unwrap();
        let item = evaluated.find_item(sym("hello")).unwrap();
        assert_eq!(item.defines[0].as_literal(), Some("MODE_debug"));
    }

    #[test]
    fn test_program_without_sources_errors() {
        let tmp = TempDir::new().unwrap();
        let project = project_with(&tmp, "toolsets = gnu;\nprogram hello { }\n", &[]);

        let err = evaluate(&project, sym("gnu"), &no_vars()).unwrap_err();
        assert!(err.to_string().contains("requires the `sources` property"));
    }

    #[test]
    fn test_projectfile_override_per_toolset() {
        let tmp = TempDir::new().unwrap();
        let project = project_with(
            &tmp,
            "toolsets = gnu vs2010;\nprogram hello {\n  sources { hello.c }\n  vs2010.projectfile = HelloApp.vcxproj;\n}\n",
            &["hello.c"],
        );

        let vs = evaluate(&project, sym("vs2010"), &no_vars()).unwrap();
        let item = vs.find_item(sym("hello")).unwrap();
        assert_eq!(item.projectfile.as_deref(), Some("HelloApp.vcxproj"));

        let gnu = evaluate(&project, sym("gnu"), &no_vars()).unwrap();
        let item = gnu.find_item(sym("hello")).unwrap();
        assert_eq!(item.projectfile, None);
    }

    #[test]
    fn test_order_is_dependency_first() {
        let tmp = TempDir::new().unwrap();
        let project = project_with(
            &tmp,
            "toolsets = gnu;\nprogram app {\n  sources { app.c }\n  deps = util;\n}\nlibrary util { sources { util.c } }\n",
            &["app.c", "util.c"],
        );

        let evaluated = evaluate(&project, sym("gnu"), &no_vars()).unwrap();
        let pos = |name: &str| {
            evaluated
                .order
                .iter()
                .position(|s| *s == sym(name))
                .unwrap()
        };
        assert!(pos("util") < pos("app"));
    }
}
