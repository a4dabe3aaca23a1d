//! Registry pattern for dynamic integrator management
//!
//! The registry is the lookup table behind the `solver.integrator` setting
//! and the `--integrator` flag. Each integrator is self-describing, providing
//! its own name, aliases, and convergence order; the registry indexes
//! instances by every one of those names.
//!
//! All integrators are zero-sized types, so handing out a fresh box through
//! `clone_box()` copies no state.

use super::Integrator;
use crate::error::ConfigurationError;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

static STANDARD: OnceLock<IntegratorRegistry> = OnceLock::new();

/// Registry for runtime integrator registration
pub struct IntegratorRegistry {
    /// Maps names (canonical and aliases) to integrator instances
    integrators: HashMap<String, Box<dyn Integrator>>,
}

impl IntegratorRegistry {
    /// Create an empty registry without any pre-registered integrators.
    pub fn new() -> Self {
        Self {
            integrators: HashMap::new(),
        }
    }

    /// Shared registry holding the standard integrators, built on first use.
    pub fn standard() -> &'static Self {
        STANDARD.get_or_init(Self::default)
    }

    /// Register all integrators that ship with the crate.
    ///
    /// Returns self for method chaining.
    pub fn with_standard_integrators(mut self) -> Self {
        use super::{DormandPrince, ExplicitEuler, RungeKuttaFourthOrder, RungeKuttaThreeEighths};

        self.register_integrator(Box::new(ExplicitEuler));
        self.register_integrator(Box::new(RungeKuttaFourthOrder));
        self.register_integrator(Box::new(RungeKuttaThreeEighths));
        self.register_integrator(Box::new(DormandPrince));

        self
    }

    /// Register a single integrator.
    ///
    /// Returns self for method chaining.
    pub fn with_integrator(mut self, integrator: Box<dyn Integrator>) -> Self {
        self.register_integrator(integrator);
        self
    }

    pub fn register_integrator(&mut self, integrator: Box<dyn Integrator>) {
        for alias in integrator.aliases() {
            self.integrators
                .insert(alias.to_string(), integrator.clone_box());
        }

        self.integrators
            .insert(integrator.name().to_string(), integrator);
    }

    pub fn create(&self, name: &str) -> Result<Box<dyn Integrator>, ConfigurationError> {
        self.integrators
            .get(name)
            .map(|integrator| integrator.clone_box())
            .ok_or_else(|| {
                let alias_names: Vec<String> = self
                    .list_aliases()
                    .into_iter()
                    .map(|(alias, _)| alias)
                    .collect();
                ConfigurationError::UnknownIntegrator(format!(
                    "Unknown integrator: '{}'. Available integrators: {}. Aliases: {}",
                    name,
                    self.list_available().join(", "),
                    alias_names.join(", ")
                ))
            })
    }

    pub fn list_available(&self) -> Vec<String> {
        let canonical_names: HashSet<&str> = self
            .integrators
            .values()
            .map(|integrator| integrator.name())
            .collect();

        let mut names: Vec<String> = canonical_names.into_iter().map(String::from).collect();
        names.sort();
        names
    }

    pub fn list_aliases(&self) -> Vec<(String, String)> {
        let mut aliases: Vec<(String, String)> = self
            .integrators
            .iter()
            .filter(|(key, integrator)| key.as_str() != integrator.name())
            .map(|(key, integrator)| (key.clone(), integrator.name().to_string()))
            .collect();

        aliases.sort_by(|a, b| a.0.cmp(&b.0));
        aliases
    }
}

impl Default for IntegratorRegistry {
    fn default() -> Self {
        Self::new().with_standard_integrators()
    }
}
