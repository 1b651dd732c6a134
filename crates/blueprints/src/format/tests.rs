//! Unit tests for the blueprint text format.

use bevy::prelude::*;

use super::*;
use crate::types::TerrainShape;

const HOUSE: &str = "\
#Name:house
#Creator:Ragnar
#Description:A small hut
#Center:piece_workbench
#Coordinates:10,20.5,-3
#Version:2
#Pieces
wood_floor;BuildingWorkbench;0;0;0;0;0;0;1;;1;1;1
wood_wall;BuildingWorkbench;0;1;2;0;0.70710677;0;0.70710677;door=open;1;1;1
wood_roof;BuildingWorkbench;0;3;0;0;0;0;1;;1;2;1
#Terrain
circle;0;0;0;3;0;1.5;paved
square;4;0;4;2;45;0;
#SnapPoints
1;0;1;corner
";

fn house() -> crate::types::Blueprint {
    parse_blueprint_text(HOUSE, "house.blueprint")
}

#[test]
fn test_parse_metadata() {
    let bp = house();
    assert_eq!(bp.name(), "blueprint_house");
    assert_eq!(bp.creator, "Ragnar");
    assert_eq!(bp.description, "A small hut");
    assert_eq!(bp.center, "piece_workbench");
    assert_eq!(bp.coordinates, Vec3::new(10.0, 20.5, -3.0));
    assert_eq!(bp.format_version, 2);
}

#[test]
fn test_parse_sections() {
    let bp = house();
    assert_eq!(bp.pieces.len(), 3, "three piece records");
    assert_eq!(bp.terrain.len(), 2, "two terrain records");
    assert_eq!(bp.snap_points.len(), 1, "one snap point");

    let wall = &bp.pieces[1];
    assert_eq!(wall.prefab, "wood_wall");
    assert_eq!(wall.category, "BuildingWorkbench");
    assert_eq!(wall.position, Vec3::new(0.0, 1.0, 2.0));
    assert_eq!(wall.data, "door=open");
    assert_eq!(bp.pieces[2].scale, Vec3::new(1.0, 2.0, 1.0));

    assert_eq!(bp.terrain[0].shape, TerrainShape::Circle);
    assert_eq!(bp.terrain[0].paint.as_deref(), Some("paved"));
    assert_eq!(bp.terrain[1].shape, TerrainShape::Square);
    assert_eq!(bp.terrain[1].rotation_degrees, 45);
    assert_eq!(bp.terrain[1].paint, None);

    assert_eq!(bp.snap_points[0].name, "corner");
    assert_eq!(bp.snap_points[0].position, Vec3::new(1.0, 0.0, 1.0));
}

#[test]
fn test_roundtrip_records_are_identical() {
    let bp = house();
    let written = write_blueprint(&bp);
    for record in HOUSE
        .lines()
        .filter(|l| !l.starts_with('#') && !l.is_empty())
    {
        assert!(
            written.iter().any(|w| w == record),
            "record `{record}` not reproduced, got {written:?}"
        );
    }

    let reparsed = parse_blueprint(&written, "house.blueprint");
    assert_eq!(reparsed.pieces, bp.pieces);
    assert_eq!(reparsed.terrain, bp.terrain);
    assert_eq!(reparsed.snap_points, bp.snap_points);
    assert_eq!(reparsed.creator, bp.creator);
}

#[test]
fn test_lenient_decode_non_numeric_position() {
    let bp = parse_blueprint(&["#Pieces", "stone_wall;Misc;abc;2;3;0;0;0;1;;1;1;1"], "x.blueprint");
    assert_eq!(bp.pieces.len(), 1, "line is still appended");
    assert_eq!(bp.pieces[0].position, Vec3::new(0.0, 2.0, 3.0));
}

#[test]
fn test_missing_trailing_fields_use_defaults() {
    let bp = parse_blueprint(&["wood_beam;Misc;1;2"], "x.blueprint");
    let piece = &bp.pieces[0];
    assert_eq!(piece.position, Vec3::new(1.0, 2.0, 0.0));
    assert_eq!(piece.rotation, Quat::IDENTITY);
    assert_eq!(piece.scale, Vec3::ONE);
    assert!(piece.data.is_empty());
}

#[test]
fn test_pieces_is_the_default_section() {
    let bp = parse_blueprint(&["wood_floor;Misc;0;0;0;0;0;0;1"], "x.blueprint");
    assert_eq!(bp.pieces.len(), 1);
}

#[test]
fn test_unknown_directive_is_ignored() {
    let lines = [
        "#Creator:me",
        "#Foo:bar",
        "#Pieces",
        "wood_floor;Misc;0;0;0;0;0;0;1;;1;1;1",
        "#Foo",
        "wood_wall;Misc;0;1;0;0;0;0;1;;1;1;1",
        "#SnapPoints",
        "0;0;0",
    ];
    let bp = parse_blueprint(&lines, "x.blueprint");
    assert_eq!(bp.creator, "me");
    assert_eq!(bp.pieces.len(), 2, "#Foo does not change the section");
    assert_eq!(bp.snap_points.len(), 1);
}

#[test]
fn test_snap_point_default_name_uses_line_index() {
    let bp = parse_blueprint(&["#SnapPoints", "1;2;3", "4;5;6;named"], "x.blueprint");
    assert_eq!(bp.snap_points[0].name, "snappoint_1");
    assert_eq!(bp.snap_points[1].name, "named");
}

#[test]
fn test_legacy_payload_fallback_field_13() {
    let line = "wood_door;Misc;0;0;0;0;0;0;1;;1;1;1;legacy-state";
    let legacy = parse_blueprint(&["#Pieces", line], "x.blueprint");
    assert_eq!(legacy.format_version, 1);
    assert_eq!(legacy.pieces[0].data, "legacy-state");

    let current = parse_blueprint(&["#Version:2", "#Pieces", line], "x.blueprint");
    assert!(
        current.pieces[0].data.is_empty(),
        "field 13 is only read for legacy files"
    );
}

#[test]
fn test_field_9_payload_wins_over_field_13() {
    let line = "wood_door;Misc;0;0;0;0;0;0;1;new;1;1;1;old";
    let bp = parse_blueprint(&[line], "x.blueprint");
    assert_eq!(bp.pieces[0].data, "new");
}

#[test]
fn test_blank_lines_and_carriage_returns() {
    let text = "#Creator:me\r\n\r\n#Pieces\r\nwood_floor;Misc;0;0;0;0;0;0;1;;1;1;1\r\n";
    let bp = parse_blueprint_text(text, "x.blueprint");
    assert_eq!(bp.creator, "me");
    assert_eq!(bp.pieces.len(), 1);
    assert_eq!(bp.pieces[0].scale, Vec3::ONE);
}

#[test]
fn test_metadata_keeps_text_after_first_colon_only() {
    let bp = parse_blueprint(&["#Description:ratio 1:2"], "x.blueprint");
    assert_eq!(bp.description, "ratio 1:2");
}

#[test]
fn test_write_emits_version_and_sections() {
    let written = write_blueprint(&house());
    assert_eq!(written[0], "#Name:house");
    assert!(written.contains(&"#Version:2".to_string()));
    let pieces = written.iter().position(|l| l == "#Pieces").unwrap();
    let terrain = written.iter().position(|l| l == "#Terrain").unwrap();
    let snaps = written.iter().position(|l| l == "#SnapPoints").unwrap();
    assert!(pieces < terrain && terrain < snaps);
}
