//! Integration tests for the blueprint pipeline using the `TestWorld` harness.
//!
//! Each test spins up a headless Bevy App with `BlueprintsPlugin`, drives it
//! through events and setting changes, and checks the resulting world.

mod build_tests;
mod pipeline_tests;

use crate::test_harness::TestWorld;

/// Three pieces stacked out of order (heights 3, 1, 2), one terrain op and one
/// snap point.
pub(crate) const HUT: &str = "\
#Name:ignored
#Creator:Astrid
#Description:Three pieces
#Version:2
#Pieces
wood_wall;Misc;0;3;0;0;0;0;1;;1;1;1
wood_wall;Misc;0;1;0;0;0;0;1;top;1;1;1
wood_floor;Misc;0;2;0;0;0;0;1;;1;1;1
#Terrain
circle;0;0;0;4;0;1;paved
#SnapPoints
0;0;0
";

pub(crate) const TOWER: &str = "\
#Creator:Bjorn
#Pieces
stone_pillar;Misc;0;0;0;0;0;0;1;;1;1;1
";

/// Host with the catalog pieces the fixtures use.
pub(crate) fn world_with_catalog() -> TestWorld {
    TestWorld::new()
        .with_catalog_piece("wood_wall", &[("Wood", 4)])
        .with_catalog_piece("wood_floor", &[("Wood", 2), ("Stone", 1)])
        .with_catalog_piece("stone_pillar", &[("Stone", 6)])
        .with_item("Hammer", "hammer.png")
        .with_item("BuildCrate", "crate.png")
}

/// Host with the hut loaded, a running session and the hut selected.
pub(crate) fn previewing_hut() -> TestWorld {
    let mut world = world_with_catalog().with_blueprint_text("hut.blueprint", HUT);
    world.start_session();
    world.select("blueprint_hut");
    world
}
