//! # Actor Registry
//!
//! Maps the actor names authored in policies to executable [`Actor`]s.
//! Doubles as the recipe catalog for validation, so a control loop is only
//! accepted when every recipe it names can actually run.

use std::collections::BTreeMap;
use std::sync::Arc;

use remedy_core::TargetType;
use remedy_operation::{Actor, AppcLcmActor};
use remedy_policy::ActorCatalog;

/// Name → actor, with aliases sharing one instance.
#[derive(Clone, Default)]
pub struct ActorRegistry {
    actors: BTreeMap<String, Arc<dyn Actor>>,
}

impl std::fmt::Debug for ActorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.actors.keys()).finish()
    }
}

impl ActorRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The executable actors: `APPC-LCM`, also reachable as `APPCLCM`.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        let lcm: Arc<dyn Actor> = Arc::new(AppcLcmActor::new());
        registry.register_as(AppcLcmActor::NAME, Arc::clone(&lcm));
        registry.register_as("APPCLCM", lcm);
        registry
    }

    /// Register an actor under its own name.
    pub fn register(&mut self, actor: Arc<dyn Actor>) -> &mut Self {
        let name = actor.name().to_string();
        self.register_as(&name, actor)
    }

    /// Register an actor under an explicit name or alias.
    pub fn register_as(&mut self, name: &str, actor: Arc<dyn Actor>) -> &mut Self {
        tracing::debug!(name, actor = actor.name(), "actor registered");
        self.actors.insert(name.to_string(), actor);
        self
    }

    /// Look up an actor.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Actor>> {
        self.actors.get(name).cloned()
    }

    /// Registered names, aliases included, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.actors.keys().map(String::as_str)
    }
}

impl ActorCatalog for ActorRegistry {
    fn is_valid_recipe(&self, actor: &str, recipe: &str, target: Option<TargetType>) -> bool {
        self.actors
            .get(actor)
            .is_some_and(|a| a.supports(recipe, target))
    }

    fn recipes(&self, actor: &str) -> Vec<String> {
        let mut recipes = self
            .actors
            .get(actor)
            .map(|a| a.recipes())
            .unwrap_or_default();
        recipes.sort();
        recipes
    }
}
