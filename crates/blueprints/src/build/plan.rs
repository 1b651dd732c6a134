//! Decoding a preview hierarchy back into build instructions.
//!
//! The preview is the serialized intent: world transforms of its children
//! give the final placement, names identify prefabs and encode terrain ops.

use bevy::prelude::*;

use crate::config::CLONE_SUFFIX;
use crate::ghost::{GhostPiece, GhostSnapPoint};
use crate::types::TerrainOp;

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedPiece {
    pub prefab: String,
    /// World-space placement.
    pub transform: Transform,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BuildPlan {
    pub terrain: Vec<TerrainOp>,
    pub pieces: Vec<PlannedPiece>,
}

impl BuildPlan {
    pub fn is_empty(&self) -> bool {
        self.terrain.is_empty() && self.pieces.is_empty()
    }
}

/// Composes transforms up the parent chain.
pub fn world_transform(world: &World, entity: Entity) -> Transform {
    let mut transform = world.get::<Transform>(entity).copied().unwrap_or_default();
    let mut current = entity;
    while let Some(parent) = world.get::<Parent>(current) {
        current = parent.get();
        if let Some(parent_transform) = world.get::<Transform>(current) {
            transform = parent_transform.mul_transform(transform);
        }
    }
    transform
}

/// `wood_wall(Clone)` -> `wood_wall`.
pub fn strip_clone_suffix(name: &str) -> &str {
    name.trim().trim_end_matches(CLONE_SUFFIX).trim()
}

/// Walk the children of a preview root.
pub fn decode_preview(world: &World, root: Entity) -> BuildPlan {
    let mut plan = BuildPlan::default();
    let Some(children) = world.get::<Children>(root) else {
        return plan;
    };

    for &child in children.iter() {
        if world.get::<GhostSnapPoint>(child).is_some() {
            continue;
        }
        let transform = world_transform(world, child);
        let name = world
            .get::<Name>(child)
            .map(|n| n.as_str().to_string())
            .unwrap_or_default();

        if TerrainOp::is_marker_name(&name) {
            if let Some(op) = TerrainOp::from_marker(&name, transform.translation) {
                plan.terrain.push(op);
            }
            continue;
        }

        let (prefab, data) = match world.get::<GhostPiece>(child) {
            Some(ghost) => (ghost.prefab.clone(), ghost.data.clone()),
            None => (strip_clone_suffix(&name).to_string(), String::new()),
        };
        plan.pieces.push(PlannedPiece {
            prefab,
            transform,
            data,
        });
    }
    plan
}
