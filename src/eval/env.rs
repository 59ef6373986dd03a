//! Variable resolution environments.
//!
//! Resolution is lazy with memoization: a variable's assignments are
//! folded (`=` replaces, `+=` appends, guards must hold) the first time
//! it is referenced. A resolving stack catches reference cycles.
//!
//! Lookup order: target properties, module variables, the `toolset`
//! builtin, then settings - which do not resolve to their defaults but
//! become late-bound placeholders.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};

use miette::NamedSource;

use crate::core::expr::{EvalString, Piece};
use crate::core::project::Module;
use crate::core::target::PropAssign;
use crate::syntax::ast::{AssignOp, Atom, CmpOp, CondExpr, ListExpr, Span, Word};
use crate::util::diagnostic::{did_you_mean, RecipeError};
use crate::util::interning::Symbol;

/// An evaluated list with the span each item came from.
pub(crate) type Items = Vec<(EvalString, Span)>;

/// Name resolution plus the expression/condition evaluation built on it.
///
/// The two environments (module scope, target scope) differ only in how
/// a name is resolved; everything else is shared through the provided
/// methods.
pub(crate) trait Resolver {
    /// Resolve a referenced name to its (spliced) list value.
    fn resolve(&self, name: Symbol, at: Span) -> Result<Items, RecipeError>;

    /// Source handle for diagnostics.
    fn named_source(&self) -> NamedSource<String>;

    /// Evaluate a list expression, splicing list-valued references.
    fn eval_list(&self, list: &ListExpr) -> Result<Items, RecipeError> {
        let mut items = Items::new();
        for word in &list.words {
            items.extend(self.eval_word(word)?);
        }
        Ok(items)
    }

    /// Evaluate one word. A bare `$(name)` splices the whole list; any
    /// concatenation must resolve to single values.
    fn eval_word(&self, word: &Word) -> Result<Items, RecipeError> {
        if let Some(name) = word.as_ref_name() {
            return self.resolve(Symbol::intern(name), word.span);
        }

        let mut value = EvalString::default();
        for atom in &word.atoms {
            match atom {
                Atom::Text(text) => value.push(Piece::Lit(text.clone())),
                Atom::Ref(name) => {
                    let resolved = self.resolve(Symbol::intern(name), word.span)?;
                    if resolved.len() != 1 {
                        return Err(RecipeError::ListInString {
                            name: name.clone(),
                            src: self.named_source(),
                            span: word.span.into(),
                        });
                    }
                    value.extend(&resolved[0].0);
                }
            }
        }
        Ok(vec![(value, word.span)])
    }

    /// Evaluate a word that must be a single value.
    fn eval_scalar(&self, word: &Word) -> Result<EvalString, RecipeError> {
        let items = self.eval_word(word)?;
        match items.len() {
            1 => Ok(items.into_iter().next().unwrap().0),
            _ => Err(RecipeError::ListInString {
                name: word.as_ref_name().unwrap_or("<expression>").to_string(),
                src: self.named_source(),
                span: word.span.into(),
            }),
        }
    }

    /// Fold one assignment into an accumulated value, honoring guards.
    fn apply_assign(&self, assign: &PropAssign, items: &mut Items) -> Result<(), RecipeError> {
        for cond in &assign.conds {
            if !self.eval_cond(cond)? {
                return Ok(());
            }
        }
        let value = self.eval_list(&assign.value)?;
        match assign.op {
            AssignOp::Set => *items = value,
            AssignOp::Append => items.extend(value),
        }
        Ok(())
    }

    /// Evaluate a condition to a generation-time boolean.
    fn eval_cond(&self, cond: &CondExpr) -> Result<bool, RecipeError> {
        match cond {
            CondExpr::Or(lhs, rhs) => Ok(self.eval_cond(lhs)? || self.eval_cond(rhs)?),
            CondExpr::And(lhs, rhs) => Ok(self.eval_cond(lhs)? && self.eval_cond(rhs)?),
            CondExpr::Not(inner) => Ok(!self.eval_cond(inner)?),
            CondExpr::Cmp { lhs, op, rhs } => {
                let left = self.cond_operand(lhs)?;
                let right = self.cond_operand(rhs)?;
                Ok(match op {
                    CmpOp::Eq => left == right,
                    CmpOp::Ne => left != right,
                })
            }
            CondExpr::Atom(word) => {
                let value = self.cond_operand(word)?;
                match value.as_str() {
                    "true" => Ok(true),
                    "false" => Ok(false),
                    other => Err(RecipeError::Syntax {
                        message: format!("condition must be `true` or `false`, got `{}`", other),
                        src: self.named_source(),
                        span: word.span.into(),
                        label: "not a boolean".to_string(),
                    }),
                }
            }
        }
    }

    /// A condition operand: single value, no setting placeholders.
    fn cond_operand(&self, word: &Word) -> Result<String, RecipeError> {
        let value = self.eval_scalar(word)?;
        match value.as_literal() {
            Some(text) => Ok(text.to_string()),
            None => Err(RecipeError::UnresolvedCondition {
                src: self.named_source(),
                span: word.span.into(),
            }),
        }
    }
}

/// Resolution context for one module during one toolset pass.
pub(crate) struct ModuleEnv<'p> {
    pub module: &'p Module,
    pub toolset: Symbol,
    pub setting_names: HashSet<Symbol>,
    /// Variables bound from the CLI/config before the recipe runs.
    pub predefined: &'p BTreeMap<String, String>,
    cache: RefCell<HashMap<Symbol, Items>>,
    resolving: RefCell<Vec<Symbol>>,
}

impl<'p> ModuleEnv<'p> {
    pub fn new(
        module: &'p Module,
        toolset: Symbol,
        setting_names: HashSet<Symbol>,
        predefined: &'p BTreeMap<String, String>,
    ) -> Self {
        ModuleEnv {
            module,
            toolset,
            setting_names,
            predefined,
            cache: RefCell::new(HashMap::new()),
            resolving: RefCell::new(Vec::new()),
        }
    }

    /// Names visible in this module, for did-you-mean suggestions.
    fn known_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = vec!["toolset"];
        for assign in &self.module.vars {
            if assign.toolset.is_none() {
                names.push(assign.name.as_str());
            }
        }
        names.extend(self.setting_names.iter().map(|s| s.as_str()));
        names
    }

    fn cycle_error(&self, at: Span) -> RecipeError {
        let chain = self
            .resolving
            .borrow()
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(" -> ");
        RecipeError::ReferenceCycle {
            chain,
            src: self.named_source(),
            span: at.into(),
        }
    }
}

impl Resolver for ModuleEnv<'_> {
    fn named_source(&self) -> NamedSource<String> {
        self.module.named_source()
    }

    fn resolve(&self, name: Symbol, at: Span) -> Result<Items, RecipeError> {
        if name.as_str() == "toolset" {
            return Ok(vec![(EvalString::lit(self.toolset.as_str()), at)]);
        }
        if let Some(cached) = self.cache.borrow().get(&name) {
            return Ok(cached.clone());
        }
        if self.resolving.borrow().contains(&name) {
            return Err(self.cycle_error(at));
        }

        let assigns: Vec<&PropAssign> = self
            .module
            .vars
            .iter()
            .filter(|a| a.name == name && a.toolset.is_none())
            .collect();
        let predefined = self.predefined.get(name.as_str());

        if assigns.is_empty() && predefined.is_none() {
            if self.setting_names.contains(&name) {
                return Ok(vec![(EvalString::setting(name), at)]);
            }
            return Err(RecipeError::UndefinedVariable {
                name: name.as_str().to_string(),
                src: self.named_source(),
                span: at.into(),
                suggestion: did_you_mean(name.as_str(), self.known_names()),
            });
        }

        self.resolving.borrow_mut().push(name);
        let result = (|| {
            let mut items: Items = predefined
                .map(|value| vec![(EvalString::lit(value), at)])
                .unwrap_or_default();
            for assign in assigns {
                self.apply_assign(assign, &mut items)?;
            }
            Ok(items)
        })();
        self.resolving.borrow_mut().pop();

        let items = result?;
        self.cache.borrow_mut().insert(name, items.clone());
        Ok(items)
    }
}

/// Resolution context for one target: its effective property chain in
/// front of the module environment.
pub(crate) struct TargetEnv<'p, 'm> {
    pub module_env: &'m ModuleEnv<'p>,
    /// Effective assignment chain per property: inheritable file-scope
    /// assignments, then template bodies, then the target's own.
    chains: HashMap<Symbol, Vec<&'p PropAssign>>,
    cache: RefCell<HashMap<Symbol, Items>>,
    resolving: RefCell<Vec<Symbol>>,
}

impl<'p, 'm> TargetEnv<'p, 'm> {
    pub fn new(module_env: &'m ModuleEnv<'p>, chain: Vec<&'p PropAssign>) -> Self {
        let mut chains: HashMap<Symbol, Vec<&'p PropAssign>> = HashMap::new();
        for assign in chain {
            chains.entry(assign.name).or_default().push(assign);
        }
        TargetEnv {
            module_env,
            chains,
            cache: RefCell::new(HashMap::new()),
            resolving: RefCell::new(Vec::new()),
        }
    }

    /// Resolve a property of this target, folding its full chain.
    ///
    /// Returns None when the target has no assignment for it; the
    /// caller decides between registry defaults and delegation.
    pub fn resolve_property(&self, name: Symbol, at: Span) -> Result<Option<Items>, RecipeError> {
        let Some(chain) = self.chains.get(&name) else {
            return Ok(None);
        };
        if let Some(cached) = self.cache.borrow().get(&name) {
            return Ok(Some(cached.clone()));
        }
        if self.resolving.borrow().contains(&name) {
            let chain_names = self
                .resolving
                .borrow()
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(RecipeError::ReferenceCycle {
                chain: chain_names,
                src: self.named_source(),
                span: at.into(),
            });
        }

        self.resolving.borrow_mut().push(name);
        let result = (|| {
            let mut items = Items::new();
            for assign in chain {
                self.apply_assign(assign, &mut items)?;
            }
            Ok(items)
        })();
        self.resolving.borrow_mut().pop();

        let items = result?;
        self.cache.borrow_mut().insert(name, items.clone());
        Ok(Some(items))
    }
}

impl Resolver for TargetEnv<'_, '_> {
    fn named_source(&self) -> NamedSource<String> {
        self.module_env.named_source()
    }

    fn resolve(&self, name: Symbol, at: Span) -> Result<Items, RecipeError> {
        if let Some(items) = self.resolve_property(name, at)? {
            return Ok(items);
        }
        self.module_env.resolve(name, at)
    }
}
