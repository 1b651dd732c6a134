//! Resource aggregation and crate/recipe synthesis.
//!
//! A blueprint's real cost is pushed into a craftable crate: the crate's
//! recipe consumes the merged resources of every piece, and placing the
//! blueprint consumes one crate.

use bevy::prelude::*;

use crate::catalog::{ItemEntry, PieceCatalog, Recipe};
use crate::config::{BUILD_CRATE_ITEM, FALLBACK_STATION};
use crate::types::{Blueprint, Requirement};

/// Merge the base costs of every resolvable piece, keyed by item, in order of
/// first encounter. Unresolved prefabs are skipped.
pub fn aggregate(blueprint: &Blueprint, catalog: &PieceCatalog) -> Vec<Requirement> {
    let mut merged: Vec<Requirement> = Vec::new();
    for piece in &blueprint.pieces {
        let Some(entry) = catalog.resolve(&piece.prefab) else {
            debug!(
                "{}: no catalog entry for '{}', cost skipped",
                blueprint.name(),
                piece.prefab
            );
            continue;
        };
        for cost in &entry.resources {
            match merged.iter_mut().find(|r| r.item == cost.item) {
                Some(existing) => existing.amount += cost.amount,
                None => merged.push(cost.clone()),
            }
        }
    }
    merged
}

/// Human-readable listing, one `Name xN` per line.
pub fn describe_requirements(requirements: &[Requirement], catalog: &PieceCatalog) -> String {
    requirements
        .iter()
        .map(|r| {
            let name = catalog
                .item(&r.item)
                .map(|i| i.display_name.as_str())
                .unwrap_or(r.item.as_str());
            format!("{name} x{}", r.amount)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The configured station if the catalog knows it, else the fallback.
pub fn resolve_station(configured: &str, catalog: &PieceCatalog) -> String {
    if catalog.has_station(configured) {
        configured.to_string()
    } else {
        FALLBACK_STATION.to_string()
    }
}

/// Item id of a blueprint's crate.
pub fn crate_item_name(blueprint: &Blueprint) -> String {
    format!("crate_{}", blueprint.base_name())
}

pub fn crate_recipe_name(blueprint: &Blueprint) -> String {
    format!("Recipe_{}", crate_item_name(blueprint))
}

/// Crate item: costs one build crate, describes the bundled resources.
pub fn build_crate(
    blueprint: &Blueprint,
    display_name: &str,
    requirements: &[Requirement],
    catalog: &PieceCatalog,
) -> ItemEntry {
    ItemEntry {
        name: crate_item_name(blueprint),
        display_name: display_name.to_string(),
        description: describe_requirements(requirements, catalog),
        cost: vec![Requirement::new(BUILD_CRATE_ITEM, 1)],
        icon: catalog.item(BUILD_CRATE_ITEM).and_then(|i| i.icon.clone()),
    }
}

pub fn build_recipe(
    blueprint: &Blueprint,
    requirements: &[Requirement],
    station: &str,
    min_station_level: u32,
) -> Recipe {
    Recipe {
        name: crate_recipe_name(blueprint),
        item: crate_item_name(blueprint),
        amount: 1,
        station: station.to_string(),
        min_station_level,
        resources: requirements.to_vec(),
    }
}

/// Synthetic cost of placing the blueprint piece itself.
pub fn placeholder_cost(blueprint: &Blueprint) -> Vec<Requirement> {
    vec![Requirement::new(crate_item_name(blueprint), 1)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PieceCatalogEntry;
    use crate::types::PlanPiece;

    fn catalog() -> PieceCatalog {
        let mut catalog = PieceCatalog::default();
        catalog.register_piece(PieceCatalogEntry::new(
            "wood_wall",
            vec![Requirement::new("Wood", 10)],
        ));
        catalog.register_piece(PieceCatalogEntry::new(
            "stone_floor",
            vec![Requirement::new("Stone", 4), Requirement::new("Wood", 1)],
        ));
        catalog.register_item(ItemEntry {
            display_name: "Fine wood".into(),
            ..ItemEntry::new("Wood")
        });
        catalog.register_station("forge");
        catalog
    }

    fn blueprint(prefabs: &[&str]) -> Blueprint {
        let mut bp = Blueprint::new("hut.blueprint");
        bp.pieces = prefabs
            .iter()
            .map(|p| PlanPiece::new(*p, Vec3::ZERO))
            .collect();
        bp
    }

    #[test]
    fn test_merge_same_item() {
        let reqs = aggregate(&blueprint(&["wood_wall", "wood_wall"]), &catalog());
        assert_eq!(reqs, vec![Requirement::new("Wood", 20)]);
    }

    #[test]
    fn test_first_encounter_order() {
        let reqs = aggregate(&blueprint(&["stone_floor", "wood_wall"]), &catalog());
        assert_eq!(
            reqs,
            vec![Requirement::new("Stone", 4), Requirement::new("Wood", 11)]
        );
    }

    #[test]
    fn test_aggregate_is_deterministic() {
        let bp = blueprint(&["wood_wall", "stone_floor", "wood_wall", "stone_floor"]);
        let catalog = catalog();
        assert_eq!(aggregate(&bp, &catalog), aggregate(&bp, &catalog));
    }

    #[test]
    fn test_unresolved_prefab_is_skipped() {
        let reqs = aggregate(&blueprint(&["ghost_piece", "wood_wall"]), &catalog());
        assert_eq!(reqs, vec![Requirement::new("Wood", 10)]);
        assert!(aggregate(&blueprint(&["ghost_piece"]), &catalog()).is_empty());
    }

    #[test]
    fn test_describe_uses_display_names() {
        let text = describe_requirements(
            &[Requirement::new("Wood", 20), Requirement::new("Resin", 2)],
            &catalog(),
        );
        assert_eq!(text, "Fine wood x20\nResin x2");
    }

    #[test]
    fn test_station_fallback() {
        let catalog = catalog();
        assert_eq!(resolve_station("forge", &catalog), "forge");
        assert_eq!(resolve_station("nonsense", &catalog), FALLBACK_STATION);
    }

    #[test]
    fn test_crate_and_recipe() {
        let bp = blueprint(&["wood_wall"]);
        let reqs = aggregate(&bp, &catalog());
        let item = build_crate(&bp, "Hut crate", &reqs, &catalog());
        assert_eq!(item.name, "crate_hut");
        assert_eq!(item.cost, vec![Requirement::new(BUILD_CRATE_ITEM, 1)]);
        assert_eq!(item.description, "Fine wood x10");

        let recipe = build_recipe(&bp, &reqs, "forge", 2);
        assert_eq!(recipe.item, "crate_hut");
        assert_eq!(recipe.resources, reqs);
        assert_eq!(recipe.min_station_level, 2);
        assert_eq!(placeholder_cost(&bp), vec![Requirement::new("crate_hut", 1)]);
    }
}
