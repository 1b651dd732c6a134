//! Text -> `Blueprint` decoding.

use bevy::prelude::*;

use crate::config::{DIRECTIVE_MARKER, FIELD_DELIMITER, LEGACY_FORMAT_VERSION};
use crate::types::{Blueprint, PlanPiece, SnapPoint, TerrainOp, TerrainShape};

use super::Section;

// =============================================================================
// Entry points
// =============================================================================

/// Parse the lines of one file. Never fails: unknown directives are skipped
/// and malformed numeric fields decode to zero.
pub fn parse_blueprint<S: AsRef<str>>(lines: &[S], file_name: &str) -> Blueprint {
    let mut blueprint = Blueprint::new(file_name);
    blueprint.format_version = detect_version(lines);

    let mut section = Section::default();
    for (index, raw) in lines.iter().enumerate() {
        let line = raw.as_ref().trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }

        if let Some(directive) = line.strip_prefix(DIRECTIVE_MARKER) {
            apply_directive(&mut blueprint, &mut section, directive);
            continue;
        }

        match section {
            Section::Pieces => {
                let piece = parse_piece(line, blueprint.format_version);
                blueprint.pieces.push(piece);
            }
            Section::Terrain => blueprint.terrain.push(parse_terrain(line)),
            Section::SnapPoints => blueprint.snap_points.push(parse_snap_point(line, index)),
        }
    }

    blueprint
}

/// Convenience wrapper splitting a whole file body into lines.
pub fn parse_blueprint_text(text: &str, file_name: &str) -> Blueprint {
    let lines: Vec<&str> = text.lines().collect();
    parse_blueprint(&lines, file_name)
}

/// `#Version:<n>` anywhere in the file, else the legacy revision.
fn detect_version<S: AsRef<str>>(lines: &[S]) -> u32 {
    lines
        .iter()
        .filter_map(|l| l.as_ref().trim_end_matches('\r').strip_prefix(DIRECTIVE_MARKER))
        .find(|d| keyword(d) == "Version")
        .and_then(|d| after_colon(d).trim().parse().ok())
        .unwrap_or(LEGACY_FORMAT_VERSION)
}

// =============================================================================
// Directives
// =============================================================================

fn apply_directive(blueprint: &mut Blueprint, section: &mut Section, directive: &str) {
    match keyword(directive) {
        // The registry name always comes from the file name.
        "Name" | "Version" => {}
        "Creator" => blueprint.creator = after_colon(directive).to_string(),
        "Description" => blueprint.description = after_colon(directive).to_string(),
        "Center" => blueprint.center = after_colon(directive).to_string(),
        "Coordinates" => blueprint.coordinates = parse_comma_vec3(after_colon(directive)),
        "Rotation" => blueprint.rotation = parse_comma_vec3(after_colon(directive)),
        "Pieces" => *section = Section::Pieces,
        "Terrain" => *section = Section::Terrain,
        "SnapPoints" => *section = Section::SnapPoints,
        other => trace!("ignoring unknown blueprint directive #{other}"),
    }
}

/// Directive keyword: text up to the first colon.
fn keyword(directive: &str) -> &str {
    directive.split(':').next().unwrap_or_default().trim()
}

/// Everything after the first colon, or empty when there is none.
fn after_colon(directive: &str) -> &str {
    directive.split_once(':').map(|(_, v)| v).unwrap_or_default()
}

fn parse_comma_vec3(text: &str) -> Vec3 {
    let mut parts = text.split(',');
    Vec3::new(
        lenient_f32(parts.next()),
        lenient_f32(parts.next()),
        lenient_f32(parts.next()),
    )
}

// =============================================================================
// Records
// =============================================================================

struct Fields<'a>(Vec<&'a str>);

impl<'a> Fields<'a> {
    fn split(line: &'a str) -> Self {
        Self(line.split(FIELD_DELIMITER).collect())
    }

    fn text(&self, index: usize) -> &'a str {
        self.0.get(index).copied().unwrap_or_default()
    }

    fn is_blank(&self, index: usize) -> bool {
        self.text(index).trim().is_empty()
    }

    fn f32(&self, index: usize) -> f32 {
        lenient_f32(self.0.get(index).copied())
    }

    fn i32(&self, index: usize) -> i32 {
        let text = self.text(index).trim();
        text.parse::<i32>()
            .ok()
            .or_else(|| text.parse::<f32>().ok().map(|f| f as i32))
            .unwrap_or(0)
    }

    fn vec3(&self, start: usize) -> Vec3 {
        Vec3::new(self.f32(start), self.f32(start + 1), self.f32(start + 2))
    }
}

fn lenient_f32(field: Option<&str>) -> f32 {
    field
        .and_then(|f| f.trim().parse::<f32>().ok())
        .filter(|f| f.is_finite())
        .unwrap_or(0.0)
}

/// `prefab;category;px;py;pz;rx;ry;rz;rw;payload;sx;sy;sz[;legacy payload]`
pub fn parse_piece(line: &str, format_version: u32) -> PlanPiece {
    let fields = Fields::split(line);

    let (x, y, z, w) = (fields.f32(5), fields.f32(6), fields.f32(7), fields.f32(8));
    let rotation = if x == 0.0 && y == 0.0 && z == 0.0 && w == 0.0 {
        Quat::IDENTITY
    } else {
        Quat::from_xyzw(x, y, z, w)
    };

    let scale = if (10..13).all(|i| fields.is_blank(i)) {
        Vec3::ONE
    } else {
        let component = |i: usize| if fields.is_blank(i) { 1.0 } else { fields.f32(i) };
        Vec3::new(component(10), component(11), component(12))
    };

    let mut data = fields.text(9).to_string();
    if data.is_empty() && format_version <= LEGACY_FORMAT_VERSION {
        data = fields.text(13).to_string();
    }

    PlanPiece {
        prefab: fields.text(0).trim().to_string(),
        category: fields.text(1).to_string(),
        position: fields.vec3(2),
        rotation,
        scale,
        data,
    }
}

/// `shape;px;py;pz;radius;rotation;smooth;paint`
pub fn parse_terrain(line: &str) -> TerrainOp {
    let fields = Fields::split(line);
    let paint = fields.text(7).trim();
    TerrainOp {
        shape: TerrainShape::from_token(fields.text(0)),
        position: fields.vec3(1),
        radius: fields.f32(4),
        rotation_degrees: fields.i32(5),
        smooth_radius: fields.f32(6),
        paint: (!paint.is_empty()).then(|| paint.to_string()),
    }
}

/// `px;py;pz[;name]`, default name `snappoint_<line index>`.
pub fn parse_snap_point(line: &str, line_index: usize) -> SnapPoint {
    let fields = Fields::split(line);
    let name = fields.text(3).trim();
    SnapPoint {
        name: if name.is_empty() {
            format!("snappoint_{line_index}")
        } else {
            name.to_string()
        },
        position: fields.vec3(0),
    }
}
