//! Project loading: root recipe plus submodules, lowered to the model.
//!
//! Lowering flattens `if` nesting (each assignment carries its guard
//! conditions), splits toolset-scoped names like `gnu.makefile`, and
//! validates property names and placement against the registry. What a
//! value *means* is left to evaluation.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use miette::NamedSource;

use crate::core::property::{self, Scope};
use crate::core::setting::Setting;
use crate::core::target::{PropAssign, TargetDecl, TargetKind};
use crate::syntax::ast::{self, CondExpr, Span, Stmt};
use crate::syntax::parse_str;
use crate::util::diagnostic::{closest_match, RecipeError};
use crate::util::interning::Symbol;

/// A lowered `template` declaration.
#[derive(Debug, Clone)]
pub struct Template {
    pub name: Symbol,
    pub name_span: Span,
    pub bases: Vec<(Symbol, Span)>,
    pub assigns: Vec<PropAssign>,
    pub module_idx: usize,
    pub span: Span,
}

/// One lowered recipe file.
#[derive(Debug, Clone)]
pub struct Module {
    /// Path as resolved from the parent module (or the CLI for the root).
    pub path: PathBuf,
    /// Directory containing the file; sources and output are relative to it.
    pub dir: PathBuf,
    /// Display name used in diagnostics.
    pub src_name: String,
    /// Full source text, kept for span rendering.
    pub text: String,

    /// File-scope assignments (variables and inheritable property
    /// defaults), in source order.
    pub vars: Vec<PropAssign>,
    pub settings: Vec<Setting>,
    pub templates: Vec<Template>,
    pub targets: Vec<TargetDecl>,
    /// Indices into `Project::modules` of direct submodules.
    pub submodules: Vec<usize>,
    /// Toolsets declared by this module (only honored on the root).
    pub toolsets: Vec<Symbol>,
    /// Span of the `toolsets = ...;` statement, when present.
    pub toolsets_span: Option<Span>,
}

impl Module {
    /// Source handle for diagnostics pointing into this file.
    pub fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(&self.src_name, self.text.clone())
    }
}

/// A loaded project: the root recipe and every submodule.
#[derive(Debug, Clone)]
pub struct Project {
    /// Directory of the root recipe.
    pub root_dir: PathBuf,
    /// Root file name without extension, used for solution naming.
    pub root_stem: String,
    /// All modules, root first, then submodules depth-first.
    pub modules: Vec<Module>,
    /// Toolsets the root recipe declares.
    pub toolsets: Vec<Symbol>,
}

impl Project {
    /// Load and lower a root recipe and all of its submodules.
    pub fn load(path: &Path) -> Result<Project> {
        let mut modules = Vec::new();
        let mut visited = HashSet::new();

        let root_canonical = path
            .canonicalize()
            .with_context(|| format!("failed to read recipe: {}", path.display()))?;
        visited.insert(root_canonical);

        load_module(path, &path.display().to_string(), &mut modules, &mut visited)?;

        let root_dir = modules[0].dir.clone();
        let root_stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project".to_string());

        // Toolsets and settings are project-global: root module only.
        for module in &modules[1..] {
            if !module.toolsets.is_empty() {
                return Err(RecipeError::MisplacedDeclaration {
                    what: "`toolsets`",
                    where_: "must be declared in the root recipe",
                    src: module.named_source(),
                    span: module.toolsets_span.unwrap_or_default().into(),
                }
                .into());
            }
            if let Some(setting) = module.settings.first() {
                return Err(RecipeError::MisplacedDeclaration {
                    what: "a setting",
                    where_: "must be declared in the root recipe",
                    src: module.named_source(),
                    span: setting.span.into(),
                }
                .into());
            }
        }

        let toolsets = modules[0].toolsets.clone();
        if toolsets.is_empty() {
            return Err(RecipeError::NoToolsets {
                file: modules[0].src_name.clone(),
            }
            .into());
        }

        let project = Project {
            root_dir,
            root_stem,
            modules,
            toolsets,
        };
        project.check_duplicates()?;

        Ok(project)
    }

    /// All targets across all modules, in load order.
    pub fn all_targets(&self) -> impl Iterator<Item = &TargetDecl> {
        self.modules.iter().flat_map(|m| m.targets.iter())
    }

    /// All templates across all modules.
    pub fn all_templates(&self) -> impl Iterator<Item = &Template> {
        self.modules.iter().flat_map(|m| m.templates.iter())
    }

    /// The settings table (root module).
    pub fn settings(&self) -> &[Setting] {
        &self.modules[0].settings
    }

    /// Find a target by name.
    pub fn find_target(&self, name: Symbol) -> Option<&TargetDecl> {
        self.all_targets().find(|t| t.name == name)
    }

    /// Find a template by name.
    pub fn find_template(&self, name: Symbol) -> Option<&Template> {
        self.all_templates().find(|t| t.name == name)
    }

    fn check_duplicates(&self) -> Result<()> {
        let mut seen: Vec<(&'static str, Symbol, usize, Span)> = Vec::new();

        let items = self
            .modules
            .iter()
            .enumerate()
            .flat_map(|(idx, module)| {
                let targets = module
                    .targets
                    .iter()
                    .map(move |t| ("target", t.name, idx, t.name_span));
                let templates = module
                    .templates
                    .iter()
                    .map(move |t| ("template", t.name, idx, t.name_span));
                let settings = module
                    .settings
                    .iter()
                    .map(move |s| ("setting", s.name, idx, s.name_span));
                targets.chain(templates).chain(settings)
            });

        for (what, name, idx, span) in items {
            if let Some(&(_, _, first_idx, _)) = seen
                .iter()
                .find(|(w, n, _, _)| *w == what && *n == name)
            {
                let module = &self.modules[idx];
                return Err(RecipeError::Duplicate {
                    what,
                    name: name.as_str().to_string(),
                    src: module.named_source(),
                    span: span.into(),
                    first: format!("first declared in {}", self.modules[first_idx].src_name),
                }
                .into());
            }
            seen.push((what, name, idx, span));
        }

        Ok(())
    }
}

/// Load one module, then its submodules depth-first.
fn load_module(
    path: &Path,
    src_name: &str,
    modules: &mut Vec<Module>,
    visited: &mut HashSet<PathBuf>,
) -> Result<usize> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read recipe: {}", path.display()))?;
    let file = parse_str(src_name, &text)?;

    let idx = modules.len();
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."))
        .to_path_buf();

    let lowerer = Lowerer {
        src_name,
        text: &text,
        module_idx: idx,
    };
    let lowered = lowerer.lower_file(&file)?;

    modules.push(Module {
        path: path.to_path_buf(),
        dir: dir.clone(),
        src_name: src_name.to_string(),
        text: text.clone(),
        vars: lowered.vars,
        settings: lowered.settings,
        templates: lowered.templates,
        targets: lowered.targets,
        submodules: Vec::new(),
        toolsets: lowered.toolsets,
        toolsets_span: lowered.toolsets_span,
    });

    for (rel, span) in lowered.submodule_decls {
        let child_path = dir.join(&rel);
        let canonical = child_path.canonicalize().with_context(|| {
            format!(
                "failed to read submodule {} (from {})",
                child_path.display(),
                src_name
            )
        })?;
        if !visited.insert(canonical) {
            return Err(RecipeError::SubmoduleCycle {
                path: rel.display().to_string(),
                src: modules[idx].named_source(),
                span: span.into(),
            }
            .into());
        }
        let child_name = child_path.display().to_string();
        let child_idx = load_module(&child_path, &child_name, modules, visited)?;
        modules[idx].submodules.push(child_idx);
    }

    Ok(idx)
}

struct LoweredModule {
    vars: Vec<PropAssign>,
    settings: Vec<Setting>,
    templates: Vec<Template>,
    targets: Vec<TargetDecl>,
    submodule_decls: Vec<(PathBuf, Span)>,
    toolsets: Vec<Symbol>,
    toolsets_span: Option<Span>,
}

struct Lowerer<'a> {
    src_name: &'a str,
    text: &'a str,
    module_idx: usize,
}

impl Lowerer<'_> {
    fn src(&self) -> NamedSource<String> {
        NamedSource::new(self.src_name, self.text.to_string())
    }

    fn lower_file(&self, file: &ast::File) -> Result<LoweredModule, RecipeError> {
        let mut out = LoweredModule {
            vars: Vec::new(),
            settings: Vec::new(),
            templates: Vec::new(),
            targets: Vec::new(),
            submodule_decls: Vec::new(),
            toolsets: Vec::new(),
            toolsets_span: None,
        };
        let mut conds = Vec::new();
        self.lower_file_stmts(&file.statements, &mut conds, &mut out)?;
        Ok(out)
    }

    fn lower_file_stmts(
        &self,
        stmts: &[Stmt],
        conds: &mut Vec<CondExpr>,
        out: &mut LoweredModule,
    ) -> Result<(), RecipeError> {
        for stmt in stmts {
            match stmt {
                Stmt::Assign(assign) => {
                    if assign.name == "toolsets" {
                        self.lower_toolsets(assign, conds, out)?;
                    } else {
                        out.vars.push(self.lower_assign(assign, conds, AssignScope::File)?);
                    }
                }
                Stmt::If(if_stmt) => {
                    conds.push(if_stmt.cond.clone());
                    self.lower_file_stmts(&if_stmt.body, conds, out)?;
                    conds.pop();
                }
                Stmt::Target(target) => {
                    self.forbid_conditional("a target", target.span, conds)?;
                    out.targets.push(self.lower_target(target)?);
                }
                Stmt::Template(template) => {
                    self.forbid_conditional("a template", template.span, conds)?;
                    out.templates.push(self.lower_template(template)?);
                }
                Stmt::Setting(setting) => {
                    self.forbid_conditional("a setting", setting.span, conds)?;
                    out.settings.push(self.lower_setting(setting)?);
                }
                Stmt::Submodule { path, span } => {
                    self.forbid_conditional("a submodule", *span, conds)?;
                    out.submodule_decls.push((PathBuf::from(path), *span));
                }
            }
        }
        Ok(())
    }

    fn forbid_conditional(
        &self,
        what: &'static str,
        span: Span,
        conds: &[CondExpr],
    ) -> Result<(), RecipeError> {
        if conds.is_empty() {
            return Ok(());
        }
        Err(RecipeError::MisplacedDeclaration {
            what,
            where_: "cannot be declared inside `if`",
            src: self.src(),
            span: span.into(),
        })
    }

    fn lower_toolsets(
        &self,
        assign: &ast::Assign,
        conds: &[CondExpr],
        out: &mut LoweredModule,
    ) -> Result<(), RecipeError> {
        if !conds.is_empty() {
            return Err(RecipeError::MisplacedDeclaration {
                what: "`toolsets`",
                where_: "cannot be conditional",
                src: self.src(),
                span: assign.span.into(),
            });
        }
        for word in &assign.value.words {
            let Some(name) = word.as_literal() else {
                return Err(RecipeError::Syntax {
                    message: "toolset names must be literal words".to_string(),
                    src: self.src(),
                    span: word.span.into(),
                    label: "not a literal".to_string(),
                });
            };
            out.toolsets.push(Symbol::intern(name));
        }
        out.toolsets_span = Some(assign.span);
        Ok(())
    }

    fn lower_target(&self, target: &ast::TargetStmt) -> Result<TargetDecl, RecipeError> {
        let kind = TargetKind::from_keyword(&target.kind).ok_or_else(|| RecipeError::Syntax {
            message: format!("unknown target kind `{}`", target.kind),
            src: self.src(),
            span: target.kind_span.into(),
            label: "here".to_string(),
        })?;

        let mut assigns = Vec::new();
        let mut conds = Vec::new();
        self.lower_body_stmts(&target.body, &mut conds, AssignScope::Target(kind), &mut assigns)?;

        Ok(TargetDecl {
            name: Symbol::intern(&target.name),
            name_span: target.name_span,
            kind,
            bases: target
                .bases
                .iter()
                .map(|(name, span)| (Symbol::intern(name), *span))
                .collect(),
            assigns,
            module_idx: self.module_idx,
            span: target.span,
        })
    }

    fn lower_template(&self, template: &ast::TemplateStmt) -> Result<Template, RecipeError> {
        let mut assigns = Vec::new();
        let mut conds = Vec::new();
        self.lower_body_stmts(&template.body, &mut conds, AssignScope::Template, &mut assigns)?;

        Ok(Template {
            name: Symbol::intern(&template.name),
            name_span: template.name_span,
            bases: template
                .bases
                .iter()
                .map(|(name, span)| (Symbol::intern(name), *span))
                .collect(),
            assigns,
            module_idx: self.module_idx,
            span: template.span,
        })
    }

    fn lower_setting(&self, setting: &ast::SettingStmt) -> Result<Setting, RecipeError> {
        let mut help = None;
        let mut default = None;

        for stmt in &setting.body {
            let Stmt::Assign(assign) = stmt else {
                return Err(RecipeError::MisplacedDeclaration {
                    what: "this statement",
                    where_: "is not allowed inside a setting",
                    src: self.src(),
                    span: setting.span.into(),
                });
            };
            match assign.name.as_str() {
                "help" => {
                    let text = assign
                        .value
                        .words
                        .first()
                        .and_then(|w| w.as_literal())
                        .filter(|_| assign.value.words.len() == 1);
                    let Some(text) = text else {
                        return Err(RecipeError::Syntax {
                            message: "setting help must be a single string".to_string(),
                            src: self.src(),
                            span: assign.value.span.into(),
                            label: "here".to_string(),
                        });
                    };
                    help = Some(text.to_string());
                }
                "default" => default = Some(assign.value.clone()),
                other => {
                    return Err(RecipeError::UnknownProperty {
                        name: other.to_string(),
                        src: self.src(),
                        span: assign.name_span.into(),
                        suggestion: closest_match(other, ["help", "default"])
                            .map(|s| format!("did you mean `{}`?", s)),
                    });
                }
            }
        }

        let Some(default) = default else {
            return Err(RecipeError::Syntax {
                message: format!("setting `{}` has no default", setting.name),
                src: self.src(),
                span: setting.name_span.into(),
                label: "declared here".to_string(),
            });
        };

        Ok(Setting {
            name: Symbol::intern(&setting.name),
            name_span: setting.name_span,
            help,
            default,
            span: setting.span,
        })
    }

    fn lower_body_stmts(
        &self,
        stmts: &[Stmt],
        conds: &mut Vec<CondExpr>,
        scope: AssignScope,
        out: &mut Vec<PropAssign>,
    ) -> Result<(), RecipeError> {
        for stmt in stmts {
            match stmt {
                Stmt::Assign(assign) => {
                    out.push(self.lower_assign(assign, conds, scope)?);
                }
                Stmt::If(if_stmt) => {
                    conds.push(if_stmt.cond.clone());
                    self.lower_body_stmts(&if_stmt.body, conds, scope, out)?;
                    conds.pop();
                }
                other => {
                    let span = match other {
                        Stmt::Target(t) => t.span,
                        Stmt::Template(t) => t.span,
                        Stmt::Setting(s) => s.span,
                        Stmt::Submodule { span, .. } => *span,
                        Stmt::Assign(_) | Stmt::If(_) => unreachable!(),
                    };
                    return Err(RecipeError::MisplacedDeclaration {
                        what: "this declaration",
                        where_: "is not allowed inside a target or template",
                        src: self.src(),
                        span: span.into(),
                    });
                }
            }
        }
        Ok(())
    }

    fn lower_assign(
        &self,
        assign: &ast::Assign,
        conds: &[CondExpr],
        scope: AssignScope,
    ) -> Result<PropAssign, RecipeError> {
        let (toolset, prop_name) = match assign.name.split_once('.') {
            Some((prefix, rest)) => (Some(Symbol::intern(prefix)), rest),
            None => (None, assign.name.as_str()),
        };

        let def = property::lookup(prop_name);

        match scope {
            AssignScope::File => {
                // File scope allows free variables; only validate names
                // that are known properties or carry a toolset prefix.
                if let Some(def) = def {
                    if def.toolset_scoped && toolset.is_none() {
                        return Err(RecipeError::MisplacedDeclaration {
                            what: "this property",
                            where_: "requires a toolset prefix (e.g. `gnu.makefile`)",
                            src: self.src(),
                            span: assign.name_span.into(),
                        });
                    }
                    if toolset.is_some() && def.scope != Scope::Module {
                        return Err(RecipeError::MisplacedDeclaration {
                            what: "this property",
                            where_: "must be set on a target, not at file scope",
                            src: self.src(),
                            span: assign.name_span.into(),
                        });
                    }
                } else if toolset.is_some() {
                    return Err(RecipeError::UnknownProperty {
                        name: prop_name.to_string(),
                        src: self.src(),
                        span: assign.name_span.into(),
                        suggestion: property::suggest(prop_name)
                            .map(|s| format!("did you mean `{}`?", s)),
                    });
                }
            }
            AssignScope::Target(kind) => {
                let Some(def) = def else {
                    return Err(RecipeError::UnknownProperty {
                        name: prop_name.to_string(),
                        src: self.src(),
                        span: assign.name_span.into(),
                        suggestion: property::suggest(prop_name)
                            .map(|s| format!("did you mean `{}`?", s)),
                    });
                };
                if def.toolset_scoped && toolset.is_none() {
                    return Err(RecipeError::MisplacedDeclaration {
                        what: "this property",
                        where_: "requires a toolset prefix (e.g. `vs2010.projectfile`)",
                        src: self.src(),
                        span: assign.name_span.into(),
                    });
                }
                match def.scope {
                    Scope::Module => {
                        return Err(RecipeError::MisplacedDeclaration {
                            what: "this property",
                            where_: "is set at file scope, not on a target",
                            src: self.src(),
                            span: assign.name_span.into(),
                        });
                    }
                    Scope::Target(_) if !property::accepts(def, kind) => {
                        return Err(RecipeError::MisplacedProperty {
                            name: prop_name.to_string(),
                            kind: kind.keyword().to_string(),
                            src: self.src(),
                            span: assign.name_span.into(),
                            accepted: property::accepted_kinds(def)
                                .map(|kinds| format!("accepted on: {}", kinds)),
                        });
                    }
                    Scope::Target(_) => {}
                }
            }
            AssignScope::Template => {
                let Some(def) = def else {
                    return Err(RecipeError::UnknownProperty {
                        name: prop_name.to_string(),
                        src: self.src(),
                        span: assign.name_span.into(),
                        suggestion: property::suggest(prop_name)
                            .map(|s| format!("did you mean `{}`?", s)),
                    });
                };
                if def.toolset_scoped && toolset.is_none() {
                    return Err(RecipeError::MisplacedDeclaration {
                        what: "this property",
                        where_: "requires a toolset prefix",
                        src: self.src(),
                        span: assign.name_span.into(),
                    });
                }
                if def.scope == Scope::Module {
                    return Err(RecipeError::MisplacedDeclaration {
                        what: "this property",
                        where_: "is set at file scope, not in a template",
                        src: self.src(),
                        span: assign.name_span.into(),
                    });
                }
            }
        }

        Ok(PropAssign {
            name: Symbol::intern(prop_name),
            name_span: assign.name_span,
            op: assign.op,
            value: assign.value.clone(),
            conds: conds.to_vec(),
            toolset,
            span: assign.span,
        })
    }
}

/// Scope an assignment was written in, for validation.
#[derive(Debug, Clone, Copy)]
enum AssignScope {
    File,
    Target(TargetKind),
    Template,
}
