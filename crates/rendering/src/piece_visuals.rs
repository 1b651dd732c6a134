//! Meshes and materials for placed pieces and their ghost previews.
//!
//! Pieces are drawn as simple primitives picked from the prefab name; one
//! mesh/material pair per prefab is shared between every instance.

use std::collections::HashMap;

use bevy::pbr::NotShadowCaster;
use bevy::prelude::*;

use blueprints::build::PlacedPiece;
use blueprints::ghost::{GhostPiece, GhostVisual};

use crate::ghost_material::GhostMaterialCache;

/// Primitive used to draw a prefab.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PieceShape {
    pub size: Vec3,
    pub color: Color,
}

/// Shape of a prefab from keywords in its name.
pub fn piece_shape(prefab: &str) -> PieceShape {
    let name = prefab.to_ascii_lowercase();
    let (size, color) = if name.contains("floor") {
        (Vec3::new(2.0, 0.2, 2.0), Color::srgb(0.55, 0.4, 0.25))
    } else if name.contains("wall") {
        (Vec3::new(2.0, 2.0, 0.2), Color::srgb(0.6, 0.45, 0.3))
    } else if name.contains("roof") {
        (Vec3::new(2.2, 0.15, 2.2), Color::srgb(0.45, 0.2, 0.15))
    } else if name.contains("pillar") || name.contains("pole") || name.contains("beam") {
        (Vec3::new(0.3, 2.0, 0.3), Color::srgb(0.5, 0.5, 0.5))
    } else if name.contains("stone") {
        (Vec3::new(2.0, 1.0, 2.0), Color::srgb(0.6, 0.6, 0.62))
    } else {
        (Vec3::splat(1.0), Color::srgb(0.7, 0.7, 0.7))
    };
    PieceShape { size, color }
}

/// Shared mesh/material per prefab.
#[derive(Resource, Default)]
pub struct PieceVisualCache {
    entries: HashMap<String, (Handle<Mesh>, Handle<StandardMaterial>)>,
}

impl PieceVisualCache {
    pub fn get_or_create(
        &mut self,
        prefab: &str,
        meshes: &mut Assets<Mesh>,
        materials: &mut Assets<StandardMaterial>,
    ) -> (Handle<Mesh>, Handle<StandardMaterial>) {
        self.entries
            .entry(prefab.to_string())
            .or_insert_with(|| {
                let shape = piece_shape(prefab);
                let mesh = meshes.add(Cuboid::new(shape.size.x, shape.size.y, shape.size.z));
                let material = materials.add(StandardMaterial {
                    base_color: shape.color,
                    perceptual_roughness: 0.9,
                    ..default()
                });
                (mesh, material)
            })
            .clone()
    }
}

pub fn attach_placed_piece_visuals(
    mut commands: Commands,
    pieces: Query<(Entity, &PlacedPiece), Added<PlacedPiece>>,
    mut cache: ResMut<PieceVisualCache>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for (entity, piece) in &pieces {
        let (mesh, material) = cache.get_or_create(&piece.prefab, &mut meshes, &mut materials);
        commands
            .entity(entity)
            .insert((Mesh3d(mesh), MeshMaterial3d(material)));
    }
}

/// Ghost pieces share the placed-piece mesh; translucent ones get the ghost
/// material variant and cast no shadow.
pub fn attach_ghost_piece_visuals(
    mut commands: Commands,
    ghosts: Query<(Entity, &GhostPiece, &GhostVisual), Added<GhostPiece>>,
    mut cache: ResMut<PieceVisualCache>,
    mut ghost_materials: ResMut<GhostMaterialCache>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for (entity, ghost, visual) in &ghosts {
        let (mesh, material) = cache.get_or_create(&ghost.prefab, &mut meshes, &mut materials);
        let mut entity = commands.entity(entity);
        if visual.translucent {
            let material = ghost_materials.variant_of(&material, &mut materials);
            entity.insert((Mesh3d(mesh), MeshMaterial3d(material), NotShadowCaster));
        } else {
            entity.insert((Mesh3d(mesh), MeshMaterial3d(material)));
        }
    }
}
