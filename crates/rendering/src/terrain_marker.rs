//! Flat overlays showing where a blueprint will flatten or paint terrain.

use bevy::prelude::*;

use blueprints::ghost::GhostTerrainMarker;
use blueprints::{TerrainOp, TerrainShape};

const MARKER_THICKNESS: f32 = 0.05;

/// Overlay mesh for a terrain op: a disc or a rotated square of the op's
/// radius, centred on the marker.
pub fn marker_mesh(op: &TerrainOp) -> Mesh {
    let radius = op.radius.max(0.1);
    let mesh: Mesh = match op.shape {
        TerrainShape::Circle => Cylinder::new(radius, MARKER_THICKNESS).into(),
        TerrainShape::Square => {
            Cuboid::new(radius * 2.0, MARKER_THICKNESS, radius * 2.0).into()
        }
    };
    mesh.rotated_by(Quat::from_rotation_y(
        (op.rotation_degrees as f32).to_radians(),
    ))
}

pub fn marker_color(op: &TerrainOp) -> Color {
    if op.paint.is_some() {
        Color::srgba(0.55, 0.45, 0.3, 0.45)
    } else {
        Color::srgba(0.35, 0.6, 0.3, 0.45)
    }
}

pub fn attach_terrain_marker_visuals(
    mut commands: Commands,
    markers: Query<(Entity, &Name, &Transform), Added<GhostTerrainMarker>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for (entity, name, transform) in &markers {
        let Some(op) = TerrainOp::from_marker(name.as_str(), transform.translation) else {
            continue;
        };
        let material = materials.add(StandardMaterial {
            base_color: marker_color(&op),
            alpha_mode: AlphaMode::Blend,
            unlit: true,
            ..default()
        });
        commands.entity(entity).insert((
            Mesh3d(meshes.add(marker_mesh(&op))),
            MeshMaterial3d(material),
        ));
    }
}
