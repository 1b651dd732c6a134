//! `BlueprintRegistry` resource and registration against the live world.

use std::collections::{HashMap, HashSet};

use bevy::prelude::*;

use crate::catalog::PieceCatalog;
use crate::materialize::{apply_definition, materialize, teardown_placeholder, BlueprintPlaceholder};
use crate::session::SessionState;
use crate::types::Blueprint;

// =============================================================================
// Resource
// =============================================================================

/// Every known blueprint, in insertion order, keyed by name.
#[derive(Resource, Debug, Default)]
pub struct BlueprintRegistry {
    blueprints: Vec<Blueprint>,
    by_name: HashMap<String, usize>,
}

impl BlueprintRegistry {
    /// Insert a blueprint. One with the same name is replaced in place.
    pub fn insert(&mut self, blueprint: Blueprint) -> usize {
        if let Some(&index) = self.by_name.get(blueprint.name()) {
            self.blueprints[index] = blueprint;
            return index;
        }
        let index = self.blueprints.len();
        self.by_name.insert(blueprint.name().to_string(), index);
        self.blueprints.push(blueprint);
        index
    }

    pub fn get(&self, name: &str) -> Option<&Blueprint> {
        self.by_name.get(name).map(|&i| &self.blueprints[i])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Blueprint> {
        self.by_name.get(name).map(|&i| &mut self.blueprints[i])
    }

    pub fn names(&self) -> Vec<String> {
        self.blueprints.iter().map(|b| b.name().to_string()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.blueprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blueprints.is_empty()
    }

    /// Remove everything, returning the old contents.
    pub fn clear(&mut self) -> Vec<Blueprint> {
        self.by_name.clear();
        std::mem::take(&mut self.blueprints)
    }

    fn unregistered(&self) -> Vec<String> {
        self.blueprints
            .iter()
            .filter(|b| !b.is_registered())
            .map(|b| b.name().to_string())
            .collect()
    }

    pub(crate) fn reset_registration(&mut self) {
        for blueprint in &mut self.blueprints {
            blueprint.clear_registration();
        }
    }
}

// =============================================================================
// Registration
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// Already registered this session; nothing happened.
    AlreadyRegistered,
    /// A placeholder already existed; it was adopted and refreshed with
    /// the current content.
    Adopted(Entity),
    /// A new placeholder was created.
    Materialized(Entity),
    /// No blueprint with that name.
    Missing,
}

/// Existing placeholder entity for `name`, found through the catalog's
/// by-name table.
fn existing_placeholder(world: &World, name: &str) -> Option<Entity> {
    world
        .resource::<PieceCatalog>()
        .resolve(name)
        .and_then(|e| e.entity)
        .filter(|&e| world.get::<BlueprintPlaceholder>(e).is_some())
}

/// Idempotent registration of one blueprint.
pub fn register(world: &mut World, name: &str) -> RegisterOutcome {
    world.resource_scope(|world, mut registry: Mut<BlueprintRegistry>| {
        let Some(blueprint) = registry.get_mut(name) else {
            return RegisterOutcome::Missing;
        };
        if blueprint.is_registered() {
            return RegisterOutcome::AlreadyRegistered;
        }
        if let Some(entity) = existing_placeholder(world, name) {
            apply_definition(world, blueprint, entity);
            blueprint.mark_registered(entity);
            return RegisterOutcome::Adopted(entity);
        }
        RegisterOutcome::Materialized(materialize(world, blueprint))
    })
}

/// Register every blueprint not yet registered. Returns how many changed.
pub fn register_all(world: &mut World) -> usize {
    let pending = world.resource::<BlueprintRegistry>().unregistered();
    let mut count = 0;
    for name in &pending {
        match register(world, name) {
            RegisterOutcome::Adopted(_) | RegisterOutcome::Materialized(_) => count += 1,
            RegisterOutcome::AlreadyRegistered | RegisterOutcome::Missing => {}
        }
    }
    if count > 0 {
        info!("Registered {count} blueprint(s)");
    }
    count
}

/// Replace the whole registry with `blueprints`.
///
/// Placeholders of blueprints absent from the new set are torn down. Ones
/// still present are kept and refreshed with the new content. When a world
/// session is active every entry is then registered.
pub fn replace_all(world: &mut World, blueprints: Vec<Blueprint>) {
    let incoming: HashSet<String> = blueprints.iter().map(|b| b.name().to_string()).collect();

    let stale: Vec<String> = world
        .resource::<PieceCatalog>()
        .placeholder_names()
        .into_iter()
        .filter(|name| !incoming.contains(name))
        .collect();
    for name in &stale {
        teardown_placeholder(world, name);
    }

    world.resource_scope(|world, mut registry: Mut<BlueprintRegistry>| {
        registry.clear();
        for mut blueprint in blueprints {
            if let Some(entity) = existing_placeholder(world, blueprint.name()) {
                apply_definition(world, &mut blueprint, entity);
                blueprint.mark_registered(entity);
            }
            registry.insert(blueprint);
        }
    });

    let active = world
        .get_resource::<SessionState>()
        .is_some_and(|s| s.is_active());
    if active {
        register_all(world);
    }
    info!(
        "Blueprint registry replaced: {} entries, {} removed",
        world.resource::<BlueprintRegistry>().len(),
        stale.len()
    );
}
