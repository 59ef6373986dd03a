//! Backend registry.
//!
//! Registry construction never fails and does no I/O; it simply knows
//! the built-in toolsets. Name lookup is the only fallible operation
//! and produces a did-you-mean style error listing what exists.

use crate::backend::gnu::GnuBackend;
use crate::backend::trait_def::ToolsetBackend;
use crate::backend::vs2010::Vs2010Backend;
use crate::util::diagnostic::{suggestions, RecipeError};

/// Registry of built-in toolset backends.
pub struct BackendRegistry {
    backends: Vec<Box<dyn ToolsetBackend>>,
}

impl BackendRegistry {
    /// Create a registry with all built-in toolsets registered.
    pub fn new() -> Self {
        let mut registry = BackendRegistry {
            backends: Vec::new(),
        };
        registry.register(Box::new(GnuBackend::new()));
        registry.register(Box::new(Vs2010Backend::new()));
        registry
    }

    /// Register a backend.
    pub fn register(&mut self, backend: Box<dyn ToolsetBackend>) {
        self.backends.push(backend);
    }

    /// Get a backend by toolset name.
    pub fn get(&self, name: &str) -> Option<&dyn ToolsetBackend> {
        self.backends
            .iter()
            .find(|b| b.name() == name)
            .map(|b| b.as_ref())
    }

    /// Get a backend by name, or an error naming the known toolsets.
    pub fn resolve(&self, name: &str) -> Result<&dyn ToolsetBackend, RecipeError> {
        self.get(name).ok_or_else(|| RecipeError::UnknownToolset {
            name: name.to_string(),
            known: format!(
                "known toolsets: {}; {}",
                self.names().join(", "),
                suggestions::UNKNOWN_TOOLSET
            ),
        })
    }

    /// All registered backends, in registration order.
    pub fn all(&self) -> impl Iterator<Item = &dyn ToolsetBackend> {
        self.backends.iter().map(|b| b.as_ref())
    }

    /// Names of all registered backends.
    pub fn names(&self) -> Vec<&'static str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    /// Check if a toolset name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}
