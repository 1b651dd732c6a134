//! Capturing placed pieces as a new blueprint.
//!
//! Starting from one piece, every placed piece reachable through a chain of
//! neighbours closer than `CAPTURE_RADIUS` is collected, up to
//! `CAPTURE_LIMIT`. Positions and rotations are stored relative to the start
//! piece.

use std::collections::{HashSet, VecDeque};

use bevy::prelude::*;

use crate::build::{strip_clone_suffix, PlacedPiece};
use crate::config::{CAPTURE_LIMIT, CAPTURE_RADIUS, FILE_EXTENSION, FORMAT_VERSION};
use crate::distribution::RawBlueprintFiles;
use crate::format::write_blueprint;
use crate::registry::BlueprintRegistry;
use crate::types::{name_from_file, Blueprint, PlanPiece};

/// A placed piece eligible for capture.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureCandidate {
    pub entity: Entity,
    pub prefab: String,
    pub transform: Transform,
    pub data: String,
}

/// Capture the structure connected to `start`.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct CaptureBlueprint {
    pub start: Entity,
    /// Name of the capturing player, stored as the creator.
    pub creator: String,
    /// Base file name; defaults to an unused `capture_<piece count>[_<k>]`.
    pub name: Option<String>,
}

/// A capture produced a new blueprint file.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct BlueprintCaptured {
    pub name: String,
    pub file_name: String,
    pub lines: Vec<String>,
}

/// Breadth-first flood fill over candidates. Returns indices into
/// `candidates`, start first. Never more than `limit` entries.
pub fn collect_connected(
    start: usize,
    candidates: &[CaptureCandidate],
    radius: f32,
    limit: usize,
) -> Vec<usize> {
    if start >= candidates.len() || limit == 0 {
        return Vec::new();
    }
    let radius_sq = radius * radius;
    let mut visited = HashSet::from([start]);
    let mut order = vec![start];
    let mut frontier = VecDeque::from([start]);

    while let Some(current) = frontier.pop_front() {
        let origin = candidates[current].transform.translation;
        for (index, candidate) in candidates.iter().enumerate() {
            if order.len() >= limit {
                return order;
            }
            if visited.contains(&index) {
                continue;
            }
            if candidate.transform.translation.distance_squared(origin) <= radius_sq {
                visited.insert(index);
                order.push(index);
                frontier.push_back(index);
            }
        }
    }
    order
}

/// Build a blueprint from a selection; the first index is the origin.
pub fn capture_blueprint(
    base_name: &str,
    creator: &str,
    candidates: &[CaptureCandidate],
    selection: &[usize],
) -> Blueprint {
    let mut blueprint = Blueprint::new(&format!("{base_name}.{FILE_EXTENSION}"));
    blueprint.creator = creator.to_string();
    blueprint.format_version = FORMAT_VERSION;

    let Some(&origin_index) = selection.first() else {
        return blueprint;
    };
    let origin = candidates[origin_index].transform;
    let inverse = origin.rotation.inverse();
    blueprint.coordinates = origin.translation;
    let (yaw, pitch, roll) = origin.rotation.to_euler(EulerRot::YXZ);
    blueprint.rotation = Vec3::new(pitch.to_degrees(), yaw.to_degrees(), roll.to_degrees());
    blueprint.description = format!("{} pieces", selection.len());

    for &index in selection {
        let candidate = &candidates[index];
        let t = candidate.transform;
        blueprint.pieces.push(PlanPiece {
            prefab: strip_clone_suffix(&candidate.prefab).to_string(),
            category: String::new(),
            position: inverse * (t.translation - origin.translation),
            rotation: (inverse * t.rotation).normalize(),
            scale: t.scale,
            data: candidate.data.clone(),
        });
    }
    blueprint
}

/// `capture_<count>`, or `capture_<count>_<k>` with the smallest `k` that
/// neither the registry nor the file set uses yet.
pub fn unused_capture_name(
    count: usize,
    registry: &BlueprintRegistry,
    files: &RawBlueprintFiles,
) -> String {
    let taken = |base: &str| {
        let file_name = format!("{base}.{FILE_EXTENSION}");
        files.contains(&file_name) || registry.contains(&name_from_file(&file_name))
    };
    let base = format!("capture_{count}");
    if !taken(&base) {
        return base;
    }
    (1..)
        .map(|k| format!("capture_{count}_{k}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or(base)
}

/// Exclusive system turning `CaptureBlueprint` events into new blueprints.
pub(crate) fn handle_capture_requests(world: &mut World) {
    let requests: Vec<CaptureBlueprint> = world
        .resource_mut::<Events<CaptureBlueprint>>()
        .drain()
        .collect();
    if requests.is_empty() {
        return;
    }

    let mut query = world.query::<(Entity, &PlacedPiece, &Transform)>();
    let candidates: Vec<CaptureCandidate> = query
        .iter(world)
        .map(|(entity, piece, transform)| CaptureCandidate {
            entity,
            prefab: piece.prefab.clone(),
            transform: *transform,
            data: piece.data.clone(),
        })
        .collect();

    for request in requests {
        let Some(start) = candidates.iter().position(|c| c.entity == request.start) else {
            warn!("Capture start {:?} is not a placed piece", request.start);
            continue;
        };
        let selection = collect_connected(start, &candidates, CAPTURE_RADIUS, CAPTURE_LIMIT);
        let base = match request.name.clone() {
            Some(name) => name,
            None => unused_capture_name(
                selection.len(),
                world.resource::<BlueprintRegistry>(),
                world.resource::<RawBlueprintFiles>(),
            ),
        };
        let blueprint = capture_blueprint(&base, &request.creator, &candidates, &selection);
        let lines = write_blueprint(&blueprint);
        let name = blueprint.name().to_string();
        let file_name = blueprint.file_name.clone();

        world
            .resource_mut::<RawBlueprintFiles>()
            .insert(file_name.clone(), lines.clone());
        world.resource_mut::<BlueprintRegistry>().insert(blueprint);
        info!(
            "Captured {name} from {} connected piece(s)",
            selection.len()
        );
        world.send_event(BlueprintCaptured {
            name,
            file_name,
            lines,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(index: u32, pos: Vec3) -> CaptureCandidate {
        CaptureCandidate {
            entity: Entity::from_raw(index),
            prefab: format!("piece{index}(Clone)"),
            transform: Transform::from_translation(pos),
            data: String::new(),
        }
    }

    #[test]
    fn test_flood_fill_follows_chains() {
        // 0 - 1 - 2 chained 4 units apart, 3 is isolated.
        let candidates = vec![
            candidate(0, Vec3::ZERO),
            candidate(1, Vec3::new(4.0, 0.0, 0.0)),
            candidate(2, Vec3::new(8.0, 0.0, 0.0)),
            candidate(3, Vec3::new(30.0, 0.0, 0.0)),
        ];
        let selection = collect_connected(0, &candidates, 5.0, 1000);
        assert_eq!(selection, vec![0, 1, 2]);
    }

    #[test]
    fn test_flood_fill_respects_limit() {
        let candidates: Vec<_> = (0..20)
            .map(|i| candidate(i, Vec3::new(i as f32, 0.0, 0.0)))
            .collect();
        assert_eq!(collect_connected(0, &candidates, 5.0, 7).len(), 7);
        assert!(collect_connected(99, &candidates, 5.0, 7).is_empty());
    }

    #[test]
    fn test_capture_is_relative_to_start() {
        let candidates = vec![
            candidate(0, Vec3::new(10.0, 5.0, 10.0)),
            candidate(1, Vec3::new(12.0, 6.0, 10.0)),
        ];
        let bp = capture_blueprint("shed", "Sigrid", &candidates, &[0, 1]);
        assert_eq!(bp.name(), "blueprint_shed");
        assert_eq!(bp.creator, "Sigrid");
        assert_eq!(bp.pieces.len(), 2);
        assert_eq!(bp.pieces[0].position, Vec3::ZERO);
        assert_eq!(bp.pieces[1].position, Vec3::new(2.0, 1.0, 0.0));
        assert_eq!(bp.pieces[1].prefab, "piece1");
        assert_eq!(bp.coordinates, Vec3::new(10.0, 5.0, 10.0));
    }

    #[test]
    fn test_unused_capture_name_skips_taken_names() {
        let mut registry = BlueprintRegistry::default();
        let mut files = RawBlueprintFiles::default();
        assert_eq!(unused_capture_name(3, &registry, &files), "capture_3");

        registry.insert(Blueprint::new("capture_3.blueprint"));
        assert_eq!(unused_capture_name(3, &registry, &files), "capture_3_1");

        files.insert("capture_3_1.blueprint", vec![]);
        assert_eq!(unused_capture_name(3, &registry, &files), "capture_3_2");
        assert_eq!(unused_capture_name(4, &registry, &files), "capture_4");
    }
}
