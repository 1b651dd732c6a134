use bevy::prelude::*;

use blueprints::BlueprintSet;

pub mod ghost_material;
pub mod piece_visuals;
pub mod terrain_marker;

use ghost_material::GhostMaterialCache;
use piece_visuals::PieceVisualCache;

pub struct RenderingPlugin;

impl Plugin for RenderingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PieceVisualCache>()
            .init_resource::<GhostMaterialCache>()
            .add_systems(Startup, setup_lighting)
            .add_systems(
                Update,
                (
                    piece_visuals::attach_placed_piece_visuals,
                    piece_visuals::attach_ghost_piece_visuals,
                    terrain_marker::attach_terrain_marker_visuals,
                )
                    .after(BlueprintSet::Notify),
            );
    }
}

fn setup_lighting(mut commands: Commands) {
    commands.insert_resource(AmbientLight {
        color: Color::srgb(0.9, 0.9, 1.0),
        brightness: 300.0,
    });

    // Sun angled from above
    commands.spawn((
        DirectionalLight {
            illuminance: 10000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(
            EulerRot::XYZ,
            -std::f32::consts::FRAC_PI_4,
            std::f32::consts::FRAC_PI_6,
            0.0,
        )),
    ));
}
