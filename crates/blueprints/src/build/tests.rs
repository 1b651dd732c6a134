//! Unit tests for build jobs and preview decoding.

use bevy::prelude::*;

use super::*;
use crate::ghost::{GhostPiece, GhostSnapPoint};
use crate::types::{TerrainOp, TerrainShape};

fn piece_at(prefab: &str, y: f32) -> PlannedPiece {
    PlannedPiece {
        prefab: prefab.to_string(),
        transform: Transform::from_xyz(0.0, y, 0.0),
        data: String::new(),
    }
}

/// Advance `job`, placing every due piece; returns them in placement order.
fn take_due(job: &mut BuildJob, dt: f32) -> Vec<PlannedPiece> {
    let mut due = Vec::new();
    job.advance(dt, |piece| {
        due.push(piece.clone());
        true
    });
    due
}

fn heights(pieces: &[PlannedPiece]) -> Vec<f32> {
    pieces.iter().map(|p| p.transform.translation.y).collect()
}

#[test]
fn test_job_orders_bottom_up() {
    let mut job = BuildJob::new(
        1,
        7,
        "blueprint_tower",
        vec![piece_at("a", 3.0), piece_at("b", 1.0), piece_at("c", 2.0)],
        0.0,
        0.0,
    );
    let placed = take_due(&mut job, 0.0);
    assert_eq!(heights(&placed), vec![1.0, 2.0, 3.0]);
    assert!(job.is_done());
}

#[test]
fn test_job_equal_heights_keep_encounter_order() {
    let mut job = BuildJob::new(
        1,
        0,
        "bp",
        vec![piece_at("first", 1.0), piece_at("low", 0.0), piece_at("second", 1.0)],
        0.0,
        0.0,
    );
    let names: Vec<String> = take_due(&mut job, 0.0).into_iter().map(|p| p.prefab).collect();
    assert_eq!(names, vec!["low", "first", "second"]);
}

#[test]
fn test_job_respects_delay_and_rate() {
    let mut job = BuildJob::new(
        1,
        0,
        "bp",
        vec![piece_at("a", 0.0), piece_at("b", 1.0), piece_at("c", 2.0)],
        1.0,
        0.5,
    );
    assert_eq!(job.state(), BuildJobState::Idle);
    job.start();
    assert!(matches!(job.state(), BuildJobState::Running { .. }));

    assert!(take_due(&mut job, 0.5).is_empty(), "still inside the initial delay");
    assert_eq!(take_due(&mut job, 0.5).len(), 1, "first piece after 1s");
    assert!(take_due(&mut job, 0.25).is_empty());
    assert_eq!(take_due(&mut job, 0.25).len(), 1, "second piece 0.5s later");
    assert_eq!(job.remaining(), 1);
    assert_eq!(take_due(&mut job, 10.0).len(), 1);
    assert!(job.is_done());
    assert_eq!(job.placed(), 3);
    assert!(take_due(&mut job, 1.0).is_empty());
}

#[test]
fn test_large_step_places_several_pieces() {
    let mut job = BuildJob::new(
        1,
        0,
        "bp",
        (0..5).map(|i| piece_at("p", i as f32)).collect(),
        0.0,
        1.0,
    );
    assert_eq!(take_due(&mut job, 2.0).len(), 3, "t=0, t=1 and t=2");
    assert_eq!(job.remaining(), 2);
}

#[test]
fn test_rejected_piece_does_not_use_a_rate_interval() {
    let mut job = BuildJob::new(
        1,
        0,
        "bp",
        vec![
            piece_at("a", 0.0),
            piece_at("missing", 1.0),
            piece_at("b", 2.0),
        ],
        0.0,
        1.0,
    );
    let mut placed = Vec::new();
    let mut place = |piece: &PlannedPiece| {
        if piece.prefab == "missing" {
            return false;
        }
        placed.push(piece.prefab.clone());
        true
    };

    assert_eq!(job.advance(0.0, &mut place), 1);
    assert_eq!(job.advance(1.0, &mut place), 1, "b follows one interval later");
    assert!(job.is_done());
    assert_eq!(job.placed(), 2, "rejected piece not counted");
    assert_eq!(placed, vec!["a", "b"]);
}

#[test]
fn test_empty_job_is_done_on_start() {
    let mut job = BuildJob::new(1, 0, "bp", vec![], 1.0, 1.0);
    job.start();
    assert!(job.is_done());
}

#[test]
fn test_cancel_stops_remaining_pieces() {
    let mut job = BuildJob::new(
        1,
        0,
        "bp",
        vec![piece_at("a", 0.0), piece_at("b", 1.0)],
        0.0,
        1.0,
    );
    assert_eq!(take_due(&mut job, 0.0).len(), 1);
    job.cancel();
    assert!(job.is_done());
    assert!(take_due(&mut job, 5.0).is_empty());
    assert_eq!(job.placed(), 1);
}

#[test]
fn test_strip_clone_suffix() {
    assert_eq!(strip_clone_suffix("wood_wall(Clone)"), "wood_wall");
    assert_eq!(strip_clone_suffix(" wood_wall "), "wood_wall");
    assert_eq!(strip_clone_suffix("wood_wall"), "wood_wall");
}

#[test]
fn test_decode_preview_uses_world_transforms() {
    let mut world = World::new();
    let cursor = world.spawn(Transform::from_xyz(10.0, 0.0, 0.0)).id();
    let root = world.spawn(Transform::from_xyz(0.0, 2.0, 0.0)).id();
    world.entity_mut(cursor).add_child(root);

    let op = TerrainOp {
        shape: TerrainShape::Circle,
        position: Vec3::new(1.0, 0.0, 0.0),
        radius: 3.0,
        rotation_degrees: 0,
        smooth_radius: 1.0,
        paint: None,
    };
    let terrain = world
        .spawn((Name::new(op.marker_name()), Transform::from_translation(op.position)))
        .id();
    let ghost = world
        .spawn((
            Name::new("wood_wall"),
            GhostPiece {
                prefab: "wood_wall".into(),
                data: "hp=5".into(),
            },
            Transform::from_xyz(0.0, 1.0, 0.0),
        ))
        .id();
    let cloned = world
        .spawn((Name::new("stone_floor(Clone)"), Transform::default()))
        .id();
    let snap = world
        .spawn((Name::new("corner"), GhostSnapPoint, Transform::default()))
        .id();
    world
        .entity_mut(root)
        .add_children(&[terrain, ghost, cloned, snap]);

    let plan = decode_preview(&world, root);
    assert_eq!(plan.terrain.len(), 1);
    assert_eq!(plan.terrain[0].position, Vec3::new(11.0, 2.0, 0.0));
    assert_eq!(plan.terrain[0].radius, 3.0);

    assert_eq!(plan.pieces.len(), 2, "snap points are not pieces");
    assert_eq!(plan.pieces[0].prefab, "wood_wall");
    assert_eq!(plan.pieces[0].data, "hp=5");
    assert_eq!(plan.pieces[0].transform.translation, Vec3::new(10.0, 3.0, 0.0));
    assert_eq!(plan.pieces[1].prefab, "stone_floor");
}

#[test]
fn test_queue_cancel_by_id() {
    let mut queue = BuildQueue::default();
    assert!(!queue.cancel(1));
    queue.cancel_all();
    assert!(queue.is_empty());
}
