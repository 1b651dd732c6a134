//! Turns a parsed blueprint into a buildable placeholder piece.
//!
//! The placeholder is a hidden, non-persistent entity carrying a piece
//! descriptor whose cost is one crate. It is registered in the catalog by name
//! and by hash and appended to the placement table.

use bevy::prelude::*;

use crate::aggregate::{
    aggregate, build_crate, build_recipe, crate_item_name, crate_recipe_name, placeholder_cost,
    resolve_station,
};
use crate::catalog::{PieceCatalog, PieceCatalogEntry};
use crate::config::{BUILD_TOOL_ITEM, FALLBACK_STATION};
use crate::selection::PlacementTable;
use crate::settings::{bind_blueprint_settings, BlueprintSettingKeys, SettingChanged, SettingsStore};
use crate::types::{Blueprint, Requirement};

// =============================================================================
// Components
// =============================================================================

/// Binds a placeholder entity back to its blueprint.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct BlueprintPlaceholder {
    pub blueprint: String,
    /// Settings group (blueprint name without prefix).
    pub base_name: String,
    pub crate_item: String,
    pub recipe: String,
}

/// What the builder UI shows for a placeable piece.
#[derive(Component, Debug, Clone, PartialEq, Default)]
pub struct PieceDescriptor {
    pub display_name: String,
    pub description: String,
    pub icon: Option<String>,
    pub category: String,
    pub crafting_station: String,
    pub place_effect: Option<String>,
    pub resources: Vec<Requirement>,
}

/// Replication identity. Placeholders are never persisted with the world.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkIdentity {
    pub persistent: bool,
}

// =============================================================================
// Materialize
// =============================================================================

/// Spawn the placeholder for `blueprint` and mark it registered.
pub fn materialize(world: &mut World, blueprint: &mut Blueprint) -> Entity {
    let entity = world
        .spawn((
            Name::new(blueprint.name().to_string()),
            Transform::default(),
            Visibility::Hidden,
            NetworkIdentity { persistent: false },
        ))
        .id();
    apply_definition(world, blueprint, entity);
    blueprint.mark_registered(entity);
    info!(
        "Materialized {} ({} pieces, {} terrain ops)",
        blueprint.name(),
        blueprint.pieces.len(),
        blueprint.terrain.len()
    );
    entity
}

/// (Re)compute everything derived from the blueprint's content onto an
/// existing placeholder entity: settings, merged cost, crate, recipe,
/// descriptor, catalog entry and placement-table slot.
pub(crate) fn apply_definition(world: &mut World, blueprint: &mut Blueprint, entity: Entity) {
    let base = blueprint.base_name().to_string();
    let keys = bind_blueprint_settings(&mut world.resource_mut::<SettingsStore>(), &base);

    let (descriptor, marker) = {
        let store = world.resource::<SettingsStore>();
        let catalog = world.resource::<PieceCatalog>();

        blueprint.requirements = aggregate(blueprint, catalog);
        let station = resolve_station(store.text(&keys.crafting_station), catalog);

        let descriptor = PieceDescriptor {
            display_name: store.text(&keys.display_name).to_string(),
            description: format!(
                "Blueprint created by {}\n{}",
                blueprint.creator, blueprint.description
            ),
            icon: catalog.item(BUILD_TOOL_ITEM).and_then(|i| i.icon.clone()),
            category: store.text(&keys.category).to_string(),
            crafting_station: station,
            place_effect: catalog
                .resolve(FALLBACK_STATION)
                .and_then(|e| e.place_effect.clone()),
            resources: placeholder_cost(blueprint),
        };
        let marker = BlueprintPlaceholder {
            blueprint: blueprint.name().to_string(),
            base_name: base.clone(),
            crate_item: crate_item_name(blueprint),
            recipe: crate_recipe_name(blueprint),
        };
        (descriptor, marker)
    };

    let level = station_level(&world.resource::<SettingsStore>(), &keys);
    let crate_display = world
        .resource::<SettingsStore>()
        .text(&keys.crate_name)
        .to_string();

    world.resource_scope(|_, mut catalog: Mut<PieceCatalog>| {
        let item = build_crate(blueprint, &crate_display, &blueprint.requirements, &catalog);
        catalog.register_item(item);
        catalog.upsert_recipe(build_recipe(
            blueprint,
            &blueprint.requirements,
            &descriptor.crafting_station,
            level,
        ));
        catalog.register_piece(PieceCatalogEntry {
            name: blueprint.name().to_string(),
            display_name: descriptor.display_name.clone(),
            category: descriptor.category.clone(),
            resources: descriptor.resources.clone(),
            place_effect: descriptor.place_effect.clone(),
            crafting_station: Some(descriptor.crafting_station.clone()),
            icon: descriptor.icon.clone(),
            description: descriptor.description.clone(),
            blueprint: Some(blueprint.name().to_string()),
            entity: Some(entity),
        });
    });

    world.resource_mut::<PlacementTable>().add(blueprint.name());
    world.entity_mut(entity).insert((descriptor, marker));
}

fn station_level(store: &SettingsStore, keys: &BlueprintSettingKeys) -> u32 {
    store.float(&keys.station_level).round().max(1.0) as u32
}

/// Remove a placeholder and everything synthesized for it.
pub(crate) fn teardown_placeholder(world: &mut World, name: &str) {
    let entry = world.resource_mut::<PieceCatalog>().remove_piece(name);
    world.resource_mut::<PlacementTable>().remove(name);

    let Some(entity) = entry.and_then(|e| e.entity) else {
        return;
    };
    if let Some(marker) = world.get::<BlueprintPlaceholder>(entity).cloned() {
        let mut catalog = world.resource_mut::<PieceCatalog>();
        catalog.remove_item(&marker.crate_item);
        catalog.remove_recipe(&marker.recipe);
    }
    if world.get_entity(entity).is_ok() {
        world.despawn(entity);
    }
}

// =============================================================================
// Live setting changes
// =============================================================================

/// Applies per-blueprint setting changes to live placeholders without
/// re-registering them.
pub fn apply_placeholder_settings(
    mut changes: EventReader<SettingChanged>,
    store: Res<SettingsStore>,
    mut catalog: ResMut<PieceCatalog>,
    mut placeholders: Query<(&BlueprintPlaceholder, &mut PieceDescriptor)>,
) {
    for change in changes.read() {
        for (marker, mut descriptor) in &mut placeholders {
            let keys = BlueprintSettingKeys::for_base_name(&marker.base_name);
            let key = &change.key;
            if !keys.contains(key) {
                continue;
            }

            if *key == keys.display_name {
                descriptor.display_name = store.text(key).to_string();
                if let Some(entry) = catalog.resolve_mut(&marker.blueprint) {
                    entry.display_name = descriptor.display_name.clone();
                }
            } else if *key == keys.category {
                descriptor.category = store.text(key).to_string();
                if let Some(entry) = catalog.resolve_mut(&marker.blueprint) {
                    entry.category = descriptor.category.clone();
                }
            } else if *key == keys.crafting_station {
                let station = resolve_station(store.text(key), &catalog);
                descriptor.crafting_station = station.clone();
                if let Some(entry) = catalog.resolve_mut(&marker.blueprint) {
                    entry.crafting_station = Some(station.clone());
                }
                if let Some(recipe) = catalog.recipe_mut(&marker.recipe) {
                    recipe.station = station;
                }
            } else if *key == keys.crate_name {
                if let Some(item) = catalog.item_mut(&marker.crate_item) {
                    item.display_name = store.text(key).to_string();
                }
            } else if *key == keys.station_level {
                let level = station_level(&store, &keys);
                if let Some(recipe) = catalog.recipe_mut(&marker.recipe) {
                    recipe.min_station_level = level;
                }
            } else {
                continue;
            }
            debug!("{}: applied setting {}", marker.blueprint, key);
        }
    }
}
