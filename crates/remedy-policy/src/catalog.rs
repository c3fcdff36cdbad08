//! # Actor Recipe Catalog
//!
//! Which recipes each remote actor accepts, and for which target types.
//! Validation consults the catalog to report `Policy recipe is invalid`.
//!
//! The standard catalog carries the controller families known to the
//! remediation platform; deployments with other actors implement
//! [`ActorCatalog`] or extend [`StandardActorCatalog`] with
//! [`StandardActorCatalog::register`].

use std::collections::BTreeMap;

use remedy_core::TargetType;

/// Source of truth for recipe validity.
pub trait ActorCatalog {
    /// Whether `recipe` is a valid command for `actor`.
    ///
    /// When `target` is `Some`, the recipe must also accept that target
    /// type. A missing target is reported separately by validation, so it
    /// does not invalidate the recipe on its own.
    fn is_valid_recipe(&self, actor: &str, recipe: &str, target: Option<TargetType>) -> bool;

    /// Recipes known for `actor`, sorted. Empty for an unknown actor.
    fn recipes(&self, actor: &str) -> Vec<String>;
}

impl<T: ActorCatalog + ?Sized> ActorCatalog for &T {
    fn is_valid_recipe(&self, actor: &str, recipe: &str, target: Option<TargetType>) -> bool {
        (**self).is_valid_recipe(actor, recipe, target)
    }

    fn recipes(&self, actor: &str) -> Vec<String> {
        (**self).recipes(actor)
    }
}

/// Table-driven catalog: actor → recipe → accepted target types.
#[derive(Debug, Clone, Default)]
pub struct StandardActorCatalog {
    actors: BTreeMap<String, BTreeMap<String, Vec<TargetType>>>,
}

const VM: &[TargetType] = &[TargetType::Vm];
const VNF: &[TargetType] = &[TargetType::Vnf];
const VM_OR_VNF: &[TargetType] = &[TargetType::Vm, TargetType::Vnf];

impl StandardActorCatalog {
    /// The standard actors: `APPC`, `APPC-LCM` (alias `APPCLCM`), `SO`, `VFC`.
    pub fn new() -> Self {
        let mut catalog = Self::empty();

        for (recipe, targets) in [
            ("Restart", VM),
            ("Rebuild", VM),
            ("Migrate", VM),
            ("ModifyConfig", VNF),
        ] {
            catalog.register("APPC", recipe, targets);
        }

        for actor in ["APPC-LCM", "APPCLCM"] {
            for recipe in [
                "Restart",
                "Rebuild",
                "Migrate",
                "Evacuate",
                "HealthCheck",
                "Reboot",
                "Start",
                "Stop",
            ] {
                catalog.register(actor, recipe, VM_OR_VNF);
            }
            catalog.register(actor, "ConfigModify", VNF);
        }

        catalog.register("SO", "VF Module Create", VNF);
        catalog.register("VFC", "Restart", VM);
        catalog
    }

    /// A catalog with no actors; every recipe is invalid.
    pub fn empty() -> Self {
        Self {
            actors: BTreeMap::new(),
        }
    }

    /// Add (or replace) one recipe for one actor.
    pub fn register(&mut self, actor: &str, recipe: &str, targets: &[TargetType]) -> &mut Self {
        self.actors
            .entry(actor.to_string())
            .or_default()
            .insert(recipe.to_string(), targets.to_vec());
        self
    }

    /// Names of all known actors, sorted.
    pub fn actors(&self) -> impl Iterator<Item = &str> {
        self.actors.keys().map(String::as_str)
    }
}

impl ActorCatalog for StandardActorCatalog {
    fn is_valid_recipe(&self, actor: &str, recipe: &str, target: Option<TargetType>) -> bool {
        let Some(targets) = self.actors.get(actor).and_then(|r| r.get(recipe)) else {
            return false;
        };
        target.map_or(true, |t| targets.contains(&t))
    }

    fn recipes(&self, actor: &str) -> Vec<String> {
        self.actors
            .get(actor)
            .map(|r| r.keys().cloned().collect())
            .unwrap_or_default()
    }
}
