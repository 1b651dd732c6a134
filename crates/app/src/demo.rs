//! Demo scene: a small piece catalog, a ground plane, a mouse-driven
//! placement cursor and keyboard bindings for the blueprint pipeline.
//!
//! - `1`..`9` select the n-th entry of the placement table, `` ` `` deselects
//! - left click commits the current preview
//! - `C` captures the structure nearest to the cursor

use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use blueprints::build::{CommitBlueprint, PlacedPiece};
use blueprints::capture::CaptureBlueprint;
use blueprints::catalog::{ItemEntry, PieceCatalog, PieceCatalogEntry};
use blueprints::config::{BUILD_CRATE_ITEM, BUILD_TOOL_ITEM, FALLBACK_STATION};
use blueprints::distribution::RawBlueprintFiles;
use blueprints::format::parse_blueprint_text;
use blueprints::ghost::PlacementCursor;
use blueprints::registry::BlueprintRegistry;
use blueprints::selection::PlacementTable;
use blueprints::session::StartWorldSession;
use blueprints::Requirement;

const DEMO_FILE: &str = "demo_hut.blueprint";

const DEMO_HUT: &str = "\
#Creator:demo
#Description:Four walls on a floor
#Version:2
#Pieces
wood_floor;Misc;0;0;0;0;0;0;1;;1;1;1
wood_wall;Misc;0;1.1;1;0;0;0;1;;1;1;1
wood_wall;Misc;0;1.1;-1;0;0;0;1;;1;1;1
wood_wall;Misc;1;1.1;0;0;0.70710677;0;0.70710677;;1;1;1
wood_wall;Misc;-1;1.1;0;0;0.70710677;0;0.70710677;;1;1;1
wood_roof;Misc;0;2.2;0;0;0;0;1;;1;1;1
#Terrain
square;0;0;0;2;0;0.5;
";

/// Local player id used for commits.
const LOCAL_ACTOR: u64 = 1;

pub struct DemoPlugin;

impl Plugin for DemoPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, (seed_catalog, setup_scene))
            .add_systems(PostStartup, (add_demo_blueprint, start_session).chain())
            .add_systems(
                Update,
                (follow_mouse, select_with_number_keys, commit_on_click, capture_on_key),
            );
    }
}

fn seed_catalog(mut catalog: ResMut<PieceCatalog>) {
    let pieces: [(&str, &[(&str, u32)]); 4] = [
        ("wood_floor", &[("Wood", 2)]),
        ("wood_wall", &[("Wood", 2)]),
        ("wood_roof", &[("Wood", 2), ("Resin", 1)]),
        ("stone_pillar", &[("Stone", 3)]),
    ];
    for (name, costs) in pieces {
        let resources = costs
            .iter()
            .map(|(item, amount)| Requirement::new(*item, *amount))
            .collect();
        catalog.register_piece(PieceCatalogEntry::new(name, resources).with_place_effect("vfx_place_wood"));
    }
    catalog.register_piece(
        PieceCatalogEntry::new(FALLBACK_STATION, vec![Requirement::new("Wood", 10)])
            .with_place_effect("vfx_place_workbench"),
    );
    catalog.register_station(FALLBACK_STATION);

    for item in ["Wood", "Stone", "Resin"] {
        catalog.register_item(ItemEntry::new(item));
    }
    catalog.register_item(ItemEntry::new(BUILD_TOOL_ITEM).with_icon("icons/hammer.png"));
    catalog.register_item(ItemEntry::new(BUILD_CRATE_ITEM).with_icon("icons/crate.png"));
}

fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(14.0, 12.0, 14.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(60.0, 60.0))),
        MeshMaterial3d(materials.add(Color::srgb(0.3, 0.45, 0.25))),
    ));
    commands.spawn((
        Name::new("placement_cursor"),
        PlacementCursor,
        Transform::default(),
        Visibility::default(),
    ));
}

fn add_demo_blueprint(mut files: ResMut<RawBlueprintFiles>, mut registry: ResMut<BlueprintRegistry>) {
    if files.contains(DEMO_FILE) {
        return;
    }
    registry.insert(parse_blueprint_text(DEMO_HUT, DEMO_FILE));
    files.insert(DEMO_FILE, DEMO_HUT.lines().map(str::to_string).collect());
}

fn start_session(mut events: EventWriter<StartWorldSession>) {
    events.send(StartWorldSession);
}

/// Moves the placement cursor to where the mouse ray meets the ground.
fn follow_mouse(
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform)>,
    mut cursors: Query<&mut Transform, With<PlacementCursor>>,
) {
    let Ok(window) = windows.get_single() else {
        return;
    };
    let Some(screen) = window.cursor_position() else {
        return;
    };
    let Ok((camera, camera_transform)) = cameras.get_single() else {
        return;
    };
    let Ok(ray) = camera.viewport_to_world(camera_transform, screen) else {
        return;
    };
    let Some(distance) = ray.intersect_plane(Vec3::ZERO, InfinitePlane3d::new(Vec3::Y)) else {
        return;
    };
    let point = ray.get_point(distance);
    for mut transform in &mut cursors {
        transform.translation = point.round();
    }
}

fn select_with_number_keys(keys: Res<ButtonInput<KeyCode>>, mut table: ResMut<PlacementTable>) {
    const DIGITS: [KeyCode; 9] = [
        KeyCode::Digit1,
        KeyCode::Digit2,
        KeyCode::Digit3,
        KeyCode::Digit4,
        KeyCode::Digit5,
        KeyCode::Digit6,
        KeyCode::Digit7,
        KeyCode::Digit8,
        KeyCode::Digit9,
    ];
    if keys.just_pressed(KeyCode::Backquote) {
        table.deselect();
        return;
    }
    let Some(index) = DIGITS.iter().position(|k| keys.just_pressed(*k)) else {
        return;
    };
    let Some(piece) = table.pieces().get(index).cloned() else {
        return;
    };
    table.select(&piece);
}

fn commit_on_click(buttons: Res<ButtonInput<MouseButton>>, mut commits: EventWriter<CommitBlueprint>) {
    if buttons.just_pressed(MouseButton::Left) {
        commits.send(CommitBlueprint { actor: LOCAL_ACTOR });
    }
}

fn capture_on_key(
    keys: Res<ButtonInput<KeyCode>>,
    cursors: Query<&Transform, With<PlacementCursor>>,
    pieces: Query<(Entity, &Transform), With<PlacedPiece>>,
    mut captures: EventWriter<CaptureBlueprint>,
) {
    if !keys.just_pressed(KeyCode::KeyC) {
        return;
    }
    let Ok(cursor) = cursors.get_single() else {
        return;
    };
    let nearest = pieces.iter().min_by(|(_, a), (_, b)| {
        a.translation
            .distance_squared(cursor.translation)
            .total_cmp(&b.translation.distance_squared(cursor.translation))
    });
    if let Some((start, _)) = nearest {
        captures.send(CaptureBlueprint {
            start,
            creator: "demo".to_string(),
            name: None,
        });
    }
}
