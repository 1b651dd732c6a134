//! Parse -> register -> preview -> commit, end to end.

use bevy::prelude::*;

use super::{previewing_hut, world_with_catalog, HUT};
use crate::build::PlacedPiece;
use crate::ghost::{GhostPiece, GhostVisual};
use crate::materialize::{BlueprintPlaceholder, PieceDescriptor};
use crate::settings::keys;
use crate::test_harness::Observed;
use crate::types::Requirement;

// -----------------------------------------------------------------------
// Registration
// -----------------------------------------------------------------------

#[test]
fn test_session_start_materializes_placeholder() {
    let mut world = world_with_catalog().with_blueprint_text("hut.blueprint", HUT);
    assert_eq!(world.placeholder_count(), 0, "nothing registered before a session");

    world.start_session();
    world.assert_registered("blueprint_hut");
    assert_eq!(world.placeholder_count(), 1);
    assert!(world.table().contains("blueprint_hut"));

    let catalog = world.catalog();
    let entry = catalog.resolve("blueprint_hut").unwrap();
    assert_eq!(entry.resources, vec![Requirement::new("crate_hut", 1)]);

    let item = catalog.item("crate_hut").expect("crate item registered");
    assert_eq!(item.icon.as_deref(), Some("crate.png"));
    assert_eq!(item.cost, vec![Requirement::new("BuildCrate", 1)]);

    let recipe = catalog.recipe("Recipe_crate_hut").expect("crate recipe registered");
    assert_eq!(
        recipe.resources,
        vec![Requirement::new("Wood", 10), Requirement::new("Stone", 1)],
        "costs merged by item in first-encounter order"
    );
}

#[test]
fn test_placeholder_descriptor_uses_metadata() {
    let mut world = world_with_catalog().with_blueprint_text("hut.blueprint", HUT);
    world.start_session();

    let entity = world
        .registry()
        .get("blueprint_hut")
        .and_then(|b| b.placeholder())
        .expect("placeholder entity");
    let descriptor = world.world().get::<PieceDescriptor>(entity).unwrap();
    assert_eq!(descriptor.display_name, "hut");
    assert_eq!(descriptor.description, "Blueprint created by Astrid\nThree pieces");
    assert_eq!(descriptor.icon.as_deref(), Some("hammer.png"));
    assert_eq!(descriptor.crafting_station, "piece_artisanstation");

    let marker = world.world().get::<BlueprintPlaceholder>(entity).unwrap();
    assert_eq!(marker.base_name, "hut");
    assert_eq!(world.world().get::<Visibility>(entity), Some(&Visibility::Hidden));
}

#[test]
fn test_unresolved_prefab_is_skipped_in_cost() {
    let text = "\
#Pieces
wood_wall;Misc;0;0;0;0;0;0;1;;1;1;1
ghost_prefab;Misc;0;1;0;0;0;0;1;;1;1;1
";
    let mut world = world_with_catalog().with_blueprint_text("odd.blueprint", text);
    world.start_session();
    world.assert_registered("blueprint_odd");

    let recipe = world.catalog().recipe("Recipe_crate_odd").unwrap();
    assert_eq!(recipe.resources, vec![Requirement::new("Wood", 4)]);
}

// -----------------------------------------------------------------------
// Preview
// -----------------------------------------------------------------------

#[test]
fn test_select_spawns_preview_children() {
    let mut world = previewing_hut();
    world.assert_previewing("blueprint_hut");
    assert_eq!(world.ghost_piece_count(), 3);
    assert_eq!(world.ghost_terrain_count(), 1);

    let root = world.ghost_state().root().unwrap();
    let children = world.world().get::<Children>(root).expect("preview children");
    assert_eq!(children.len(), 5, "three pieces, one terrain marker, one snap point");
}

#[test]
fn test_deselect_returns_to_idle() {
    let mut world = previewing_hut();
    let root = world.ghost_state().root().unwrap();

    world.deselect();
    world.assert_idle();
    assert!(world.world().get_entity(root).is_err(), "preview despawned");
    assert_eq!(world.ghost_piece_count(), 0);
}

#[test]
fn test_ghost_material_setting_marks_pieces_translucent() {
    let mut world = world_with_catalog()
        .with_setting(keys::use_ghost_material(), true)
        .with_blueprint_text("hut.blueprint", HUT);
    world.start_session();
    world.select("blueprint_hut");

    let world = world.world_mut();
    let visuals: Vec<GhostVisual> = world
        .query_filtered::<&GhostVisual, With<GhostPiece>>()
        .iter(world)
        .copied()
        .collect();
    assert_eq!(visuals.len(), 3);
    assert!(visuals.iter().all(|v| v.translucent));
}

#[test]
fn test_step_keys_move_preview() {
    let mut world = previewing_hut();
    assert_eq!(world.ghost_root_y(), Some(0.0));

    world.press_key(KeyCode::PageUp);
    world.press_key(KeyCode::PageUp);
    assert_eq!(world.ghost_offset(), 1.0);
    assert_eq!(world.ghost_root_y(), Some(1.0));

    world.press_key(KeyCode::PageDown);
    assert_eq!(world.ghost_root_y(), Some(0.5));

    world.press_key(KeyCode::Escape);
    assert_eq!(world.ghost_offset(), 0.0);
    assert_eq!(world.ghost_root_y(), Some(0.0));
}

// -----------------------------------------------------------------------
// Atomic commit
// -----------------------------------------------------------------------

#[test]
fn test_atomic_commit_places_every_piece_at_cursor() {
    let mut world = previewing_hut();
    world.set_setting(keys::slow_build(), false);
    world.move_cursor(Vec3::new(10.0, 0.0, 0.0));
    world.commit(7);

    let placed = world.placed_pieces();
    assert_eq!(placed.len(), 3);
    assert!(placed.iter().all(|(_, creator, _)| *creator == 7));
    assert_eq!(placed[0].0, "wood_floor");
    assert_eq!(placed[0].2, Vec3::new(10.0, 2.0, 0.0));
    assert!(!world.is_building(), "flag cleared after an atomic build");

    let observed = world.observed();
    assert_eq!(
        observed[0],
        Observed::Committed {
            blueprint: "blueprint_hut".into(),
            cost: vec![Requirement::new("crate_hut", 1)],
        }
    );
    assert_eq!(observed[1], Observed::Terrain(Vec3::new(10.0, 0.0, 0.0)));
    assert_eq!(world.committed_count(), 1);
}

#[test]
fn test_commit_passes_payload_through() {
    let mut world = previewing_hut();
    world.set_setting(keys::slow_build(), false);
    world.commit(1);

    let world = world.world_mut();
    let mut data: Vec<String> = world
        .query::<&PlacedPiece>()
        .iter(world)
        .map(|p| p.data.clone())
        .filter(|d| !d.is_empty())
        .collect();
    data.sort();
    assert_eq!(data, vec!["top".to_string()]);
}

#[test]
fn test_commit_skips_unresolved_prefab() {
    let text = "\
#Pieces
wood_wall;Misc;0;0;0;0;0;0;1;;1;1;1
ghost_prefab;Misc;0;1;0;0;0;0;1;;1;1;1
";
    let mut world = world_with_catalog()
        .with_slow_build(false)
        .with_blueprint_text("odd.blueprint", text);
    world.start_session();
    world.select("blueprint_odd");
    world.commit(1);

    let placed = world.placed_pieces();
    assert_eq!(placed.len(), 1);
    assert_eq!(placed[0].0, "wood_wall");
}

#[test]
fn test_commit_without_preview_does_nothing() {
    let mut world = world_with_catalog().with_blueprint_text("hut.blueprint", HUT);
    world.start_session();
    world.commit(1);
    assert!(world.placed_pieces().is_empty());
    assert_eq!(world.committed_count(), 0);
}

#[test]
fn test_place_effects_setting_gates_effect() {
    let text = "\
#Pieces
piece_workbench;Misc;0;0;0;0;0;0;1;;1;1;1
";
    let mut world = world_with_catalog()
        .with_station("piece_workbench", "vfx_place_workbench")
        .with_slow_build(false)
        .with_blueprint_text("bench.blueprint", text);
    world.start_session();
    world.select("blueprint_bench");
    world.commit(1);

    world.set_setting(keys::place_effects(), false);
    world.tick(1);
    world.commit(1);

    let effects: Vec<Option<String>> = world
        .observed()
        .iter()
        .filter_map(|o| match o {
            Observed::Piece { effect, .. } => Some(effect.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(effects, vec![Some("vfx_place_workbench".to_string()), None]);
}
