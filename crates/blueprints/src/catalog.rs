//! Prefab catalog: the lookup table of placeable pieces, craftable items,
//! crafting stations and recipes.
//!
//! Pieces are addressable by name and by a stable 32-bit name hash, the same
//! pair of tables the scene graph uses to instantiate networked objects.

use std::collections::{HashMap, HashSet};

use bevy::prelude::*;
use xxhash_rust::xxh32::xxh32;

use crate::types::Requirement;

/// Seed of the stable name hash. Must never change: hashes are shared
/// between hosts.
const NAME_HASH_SEED: u32 = 0;

/// Deterministic hash of a prefab name.
pub fn stable_hash(name: &str) -> u32 {
    xxh32(name.as_bytes(), NAME_HASH_SEED)
}

// =============================================================================
// Entries
// =============================================================================

/// One placeable piece.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PieceCatalogEntry {
    pub name: String,
    pub display_name: String,
    pub category: String,
    /// Base resource cost of placing one of these.
    pub resources: Vec<Requirement>,
    pub place_effect: Option<String>,
    pub crafting_station: Option<String>,
    pub icon: Option<String>,
    pub description: String,
    /// Set on blueprint placeholders: the blueprint they stand for.
    pub blueprint: Option<String>,
    /// Scene-graph template object, when the piece has one.
    pub entity: Option<Entity>,
}

impl PieceCatalogEntry {
    pub fn new(name: impl Into<String>, resources: Vec<Requirement>) -> Self {
        let name = name.into();
        Self {
            display_name: name.clone(),
            name,
            resources,
            ..default()
        }
    }

    pub fn with_place_effect(mut self, effect: impl Into<String>) -> Self {
        self.place_effect = Some(effect.into());
        self
    }

    pub fn is_blueprint_placeholder(&self) -> bool {
        self.blueprint.is_some()
    }
}

/// A craftable inventory item.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ItemEntry {
    pub name: String,
    pub display_name: String,
    pub description: String,
    /// What one unit of the item costs to craft.
    pub cost: Vec<Requirement>,
    pub icon: Option<String>,
}

impl ItemEntry {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            display_name: name.clone(),
            name,
            ..default()
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    pub name: String,
    pub item: String,
    pub amount: u32,
    pub station: String,
    pub min_station_level: u32,
    pub resources: Vec<Requirement>,
}

// =============================================================================
// Resource
// =============================================================================

#[derive(Resource, Debug, Default)]
pub struct PieceCatalog {
    pieces: HashMap<String, PieceCatalogEntry>,
    by_hash: HashMap<u32, String>,
    items: HashMap<String, ItemEntry>,
    stations: HashSet<String>,
    recipes: HashMap<String, Recipe>,
}

impl PieceCatalog {
    /// Insert or replace a piece; it becomes resolvable by name and hash.
    pub fn register_piece(&mut self, entry: PieceCatalogEntry) {
        self.by_hash.insert(stable_hash(&entry.name), entry.name.clone());
        self.pieces.insert(entry.name.clone(), entry);
    }

    pub fn remove_piece(&mut self, name: &str) -> Option<PieceCatalogEntry> {
        let entry = self.pieces.remove(name)?;
        self.by_hash.remove(&stable_hash(name));
        Some(entry)
    }

    pub fn resolve(&self, name: &str) -> Option<&PieceCatalogEntry> {
        self.pieces.get(name)
    }

    pub fn resolve_mut(&mut self, name: &str) -> Option<&mut PieceCatalogEntry> {
        self.pieces.get_mut(name)
    }

    pub fn resolve_hash(&self, hash: u32) -> Option<&PieceCatalogEntry> {
        self.by_hash.get(&hash).and_then(|name| self.pieces.get(name))
    }

    /// Names of all blueprint placeholders currently in the catalog.
    pub fn placeholder_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .pieces
            .values()
            .filter(|p| p.is_blueprint_placeholder())
            .map(|p| p.name.clone())
            .collect();
        names.sort();
        names
    }

    pub fn register_item(&mut self, item: ItemEntry) {
        self.items.insert(item.name.clone(), item);
    }

    pub fn remove_item(&mut self, name: &str) -> Option<ItemEntry> {
        self.items.remove(name)
    }

    pub fn item(&self, name: &str) -> Option<&ItemEntry> {
        self.items.get(name)
    }

    pub fn item_mut(&mut self, name: &str) -> Option<&mut ItemEntry> {
        self.items.get_mut(name)
    }

    pub fn register_station(&mut self, name: impl Into<String>) {
        self.stations.insert(name.into());
    }

    pub fn has_station(&self, name: &str) -> bool {
        self.stations.contains(name)
    }

    /// Insert or replace the recipe with the same name.
    pub fn upsert_recipe(&mut self, recipe: Recipe) {
        self.recipes.insert(recipe.name.clone(), recipe);
    }

    pub fn remove_recipe(&mut self, name: &str) -> Option<Recipe> {
        self.recipes.remove(name)
    }

    pub fn recipe(&self, name: &str) -> Option<&Recipe> {
        self.recipes.get(name)
    }

    pub fn recipe_mut(&mut self, name: &str) -> Option<&mut Recipe> {
        self.recipes.get_mut(name)
    }
}
