//! Cursor-attached, non-solid preview of the selected blueprint.
//!
//! Two states: `Idle` and `Previewing`. The preview root is a child of the
//! placement cursor; every piece, terrain op and snap point becomes a child of
//! the root at its recorded local transform. Terrain children carry their
//! parameters in their `Name` so the build executor can decode them later.

use bevy::prelude::*;

use crate::catalog::PieceCatalog;
use crate::registry::BlueprintRegistry;
use crate::selection::{resolve_selection, PlacementTable, Selected};
use crate::settings::{keys, SettingsStore};
use crate::types::Blueprint;

// =============================================================================
// Components
// =============================================================================

/// The entity previews attach to (the builder's placement cursor).
#[derive(Component, Debug, Default)]
pub struct PlacementCursor;

/// Root of a blueprint preview.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct BlueprintGhost {
    pub blueprint: String,
}

/// Preview copy of one plan piece.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct GhostPiece {
    pub prefab: String,
    pub data: String,
}

/// Preview marker of one terrain op; parameters live in the `Name`.
#[derive(Component, Debug, Default)]
pub struct GhostTerrainMarker;

#[derive(Component, Debug, Default)]
pub struct GhostSnapPoint;

/// No collider, no support checks.
#[derive(Component, Debug, Default)]
pub struct NonSolid;

/// Visual hint for the rendering layer.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GhostVisual {
    pub translucent: bool,
}

// =============================================================================
// Resources
// =============================================================================

#[derive(Resource, Debug, Clone, PartialEq, Eq, Default)]
pub enum GhostState {
    #[default]
    Idle,
    Previewing { blueprint: String, root: Entity },
}

impl GhostState {
    pub fn root(&self) -> Option<Entity> {
        match self {
            GhostState::Previewing { root, .. } => Some(*root),
            GhostState::Idle => None,
        }
    }
}

/// Vertical offset of the preview root, changed with the step keys.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Default)]
pub struct GhostOffset(pub f32);

// =============================================================================
// Preview construction
// =============================================================================

/// Spawn the preview hierarchy for `blueprint` under `cursor`.
pub fn spawn_preview(
    world: &mut World,
    blueprint: &Blueprint,
    cursor: Entity,
    translucent: bool,
    offset: f32,
) -> Entity {
    let root = world
        .spawn((
            Name::new(format!("{}_ghost", blueprint.name())),
            BlueprintGhost {
                blueprint: blueprint.name().to_string(),
            },
            Transform::from_translation(Vec3::Y * offset),
            Visibility::default(),
        ))
        .id();
    world.entity_mut(cursor).add_child(root);

    for piece in &blueprint.pieces {
        let child = world
            .spawn((
                Name::new(piece.prefab.clone()),
                GhostPiece {
                    prefab: piece.prefab.clone(),
                    data: piece.data.clone(),
                },
                NonSolid,
                GhostVisual { translucent },
                piece.local_transform(),
                Visibility::default(),
            ))
            .id();
        world.entity_mut(root).add_child(child);
    }

    for op in &blueprint.terrain {
        let child = world
            .spawn((
                Name::new(op.marker_name()),
                GhostTerrainMarker,
                NonSolid,
                Transform::from_translation(op.position),
                Visibility::default(),
            ))
            .id();
        world.entity_mut(root).add_child(child);
    }

    for snap in &blueprint.snap_points {
        let child = world
            .spawn((
                Name::new(snap.name.clone()),
                GhostSnapPoint,
                Transform::from_translation(snap.position),
            ))
            .id();
        world.entity_mut(root).add_child(child);
    }

    root
}

/// Despawn the current preview, if any, and return to `Idle`.
pub fn clear_preview(world: &mut World) {
    let previous = std::mem::take(&mut *world.resource_mut::<GhostState>());
    if let Some(root) = previous.root() {
        if world.get_entity(root).is_ok() {
            world.entity_mut(root).despawn_recursive();
        }
    }
    world.resource_mut::<GhostOffset>().0 = 0.0;
}

// =============================================================================
// Systems
// =============================================================================

/// Drives the Idle/Previewing state machine from the placement table.
pub fn sync_ghost_preview(world: &mut World) {
    let selected = resolve_selection(
        world.resource::<PlacementTable>(),
        world.resource::<PieceCatalog>(),
    );
    let state = world.resource::<GhostState>().clone();

    match (&state, &selected) {
        (GhostState::Previewing { blueprint, root }, Selected::Blueprint(name))
            if blueprint == name && world.get_entity(*root).is_ok() =>
        {
            return;
        }
        (GhostState::Previewing { .. }, _) => clear_preview(world),
        (GhostState::Idle, _) => {}
    }

    let Selected::Blueprint(name) = selected else {
        return;
    };
    let mut cursors = world.query_filtered::<Entity, With<PlacementCursor>>();
    let Ok(cursor) = cursors.get_single(world) else {
        return;
    };
    let Some(blueprint) = world.resource::<BlueprintRegistry>().get(&name).cloned() else {
        return;
    };

    let translucent = world
        .resource::<SettingsStore>()
        .bool(&keys::use_ghost_material());
    let offset = world.resource::<GhostOffset>().0;
    let root = spawn_preview(world, &blueprint, cursor, translucent, offset);
    debug!("Previewing {name}");
    *world.resource_mut::<GhostState>() = GhostState::Previewing {
        blueprint: name,
        root,
    };
}

/// Step keys move the preview root up and down.
pub fn step_ghost_preview(
    input: Option<Res<ButtonInput<KeyCode>>>,
    store: Res<SettingsStore>,
    state: Res<GhostState>,
    mut offset: ResMut<GhostOffset>,
    mut roots: Query<&mut Transform, With<BlueprintGhost>>,
) {
    let Some(root) = state.root() else {
        return;
    };
    let Some(input) = input else {
        return;
    };
    let increment = store.float(&keys::step_increment());
    let pressed = |key: crate::settings::SettingKey| {
        store
            .key_code(&key)
            .is_some_and(|code| input.just_pressed(code))
    };

    let before = offset.0;
    if pressed(keys::step_up()) {
        offset.0 += increment;
    }
    if pressed(keys::step_down()) {
        offset.0 -= increment;
    }
    if pressed(keys::reset_steps()) {
        offset.0 = 0.0;
    }
    if offset.0 != before {
        if let Ok(mut transform) = roots.get_mut(root) {
            transform.translation.y = offset.0;
        }
    }
}
