//! `Blueprint` -> text encoding.
//!
//! Floats use Rust's shortest round-trip formatting so that a parsed file
//! written back out reproduces the same records.

use bevy::prelude::*;

use crate::config::FORMAT_VERSION;
use crate::types::{Blueprint, PlanPiece, SnapPoint, TerrainOp};

pub fn write_blueprint(blueprint: &Blueprint) -> Vec<String> {
    let mut lines = Vec::with_capacity(
        10 + blueprint.pieces.len() + blueprint.terrain.len() + blueprint.snap_points.len(),
    );

    lines.push(format!("#Name:{}", blueprint.base_name()));
    lines.push(format!("#Creator:{}", blueprint.creator));
    lines.push(format!("#Description:{}", blueprint.description));
    lines.push(format!("#Center:{}", blueprint.center));
    lines.push(format!("#Coordinates:{}", comma_vec3(blueprint.coordinates)));
    lines.push(format!("#Rotation:{}", comma_vec3(blueprint.rotation)));
    lines.push(format!("#Version:{FORMAT_VERSION}"));

    lines.push("#Pieces".to_string());
    lines.extend(blueprint.pieces.iter().map(write_piece));
    lines.push("#Terrain".to_string());
    lines.extend(blueprint.terrain.iter().map(write_terrain));
    lines.push("#SnapPoints".to_string());
    lines.extend(blueprint.snap_points.iter().map(write_snap_point));

    lines
}

pub fn write_piece(piece: &PlanPiece) -> String {
    let p = piece.position;
    let r = piece.rotation;
    let s = piece.scale;
    format!(
        "{};{};{};{};{};{};{};{};{};{};{};{};{}",
        piece.prefab, piece.category, p.x, p.y, p.z, r.x, r.y, r.z, r.w, piece.data, s.x, s.y, s.z
    )
}

pub fn write_terrain(op: &TerrainOp) -> String {
    let p = op.position;
    format!(
        "{};{};{};{};{};{};{};{}",
        op.shape.token(),
        p.x,
        p.y,
        p.z,
        op.radius,
        op.rotation_degrees,
        op.smooth_radius,
        op.paint.as_deref().unwrap_or("")
    )
}

pub fn write_snap_point(snap: &SnapPoint) -> String {
    let p = snap.position;
    format!("{};{};{};{}", p.x, p.y, p.z, snap.name)
}

fn comma_vec3(v: Vec3) -> String {
    format!("{},{},{}", v.x, v.y, v.z)
}
