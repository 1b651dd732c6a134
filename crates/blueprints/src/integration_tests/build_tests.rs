//! Throttled, bottom-up builds.

use super::{previewing_hut, world_with_catalog};
use crate::build::BuildJobState;
use crate::settings::keys;
use crate::test_harness::Observed;

#[test]
fn test_slow_build_places_bottom_up() {
    let mut world = previewing_hut();
    world.commit(3);

    assert!(world.is_building(), "flag raised while a job runs");
    assert_eq!(world.build_queue().jobs().len(), 1);
    assert!(world.placed_pieces().is_empty(), "nothing before the initial delay");

    // Default delay 1s, rate 0.5s.
    world.advance_builds(1.0);
    assert_eq!(world.observed_piece_heights(), vec![1.0]);
    world.advance_builds(0.5);
    world.advance_builds(0.5);
    assert_eq!(world.observed_piece_heights(), vec![1.0, 2.0, 3.0]);

    assert!(!world.is_building(), "flag cleared after the last piece");
    assert!(world.build_queue().is_empty());
    assert_eq!(
        world.observed().last(),
        Some(&Observed::Finished {
            blueprint: "blueprint_hut".into(),
            placed: 3,
        })
    );
}

#[test]
fn test_terrain_is_applied_before_any_piece() {
    let mut world = previewing_hut();
    world.commit(3);
    world.advance_builds(5.0);

    let first_piece = world
        .observed()
        .iter()
        .position(|o| matches!(o, Observed::Piece { .. }))
        .unwrap();
    let terrain = world
        .observed()
        .iter()
        .position(|o| matches!(o, Observed::Terrain(_)))
        .unwrap();
    assert!(terrain < first_piece);
    assert_eq!(world.placed_pieces().len(), 3, "one large step places everything");
}

#[test]
fn test_build_timing_follows_settings() {
    let mut world = previewing_hut();
    world.set_setting(keys::build_delay(), 0.0);
    world.set_setting(keys::build_rate(), 2.0);
    world.commit(3);

    world.advance_builds(0.0);
    assert_eq!(world.placed_pieces().len(), 1, "zero delay places the first piece");
    world.advance_builds(1.5);
    assert_eq!(world.placed_pieces().len(), 1);
    world.advance_builds(0.5);
    assert_eq!(world.placed_pieces().len(), 2);
}

#[test]
fn test_cancelled_build_stops() {
    let mut world = previewing_hut();
    world.commit(3);
    world.advance_builds(1.0);

    let job = world.build_queue().jobs()[0].id;
    assert!(matches!(
        world.build_queue().jobs()[0].state(),
        BuildJobState::Running { .. }
    ));
    let cancelled = world
        .world_mut()
        .resource_mut::<crate::build::BuildQueue>()
        .cancel(job);
    assert!(cancelled);

    world.advance_builds(5.0);
    assert_eq!(world.placed_pieces().len(), 1);
    assert!(!world.is_building());
}

#[test]
fn test_two_commits_run_concurrently() {
    let mut world = previewing_hut();
    world.commit(1);
    world.tick(1);
    world.commit(2);
    assert_eq!(world.build_queue().jobs().len(), 2);

    world.advance_builds(5.0);
    let placed = world.placed_pieces();
    assert_eq!(placed.len(), 6);
    assert_eq!(placed.iter().filter(|(_, actor, _)| *actor == 2).count(), 3);
    assert_eq!(world.committed_count(), 2);
}

#[test]
fn test_slow_build_skips_unresolved_prefab_without_waiting() {
    let text = "\
#Pieces
wood_wall;Misc;0;0;0;0;0;0;1;;1;1;1
ghost_prefab;Misc;0;1;0;0;0;0;1;;1;1;1
wood_wall;Misc;0;2;0;0;0;0;1;;1;1;1
";
    let mut world = world_with_catalog().with_blueprint_text("odd.blueprint", text);
    world.start_session();
    world.select("blueprint_odd");
    world.commit(1);

    world.advance_builds(1.0);
    assert_eq!(world.observed_piece_heights(), vec![0.0]);
    world.advance_builds(0.5);
    assert_eq!(
        world.observed_piece_heights(),
        vec![0.0, 2.0],
        "the piece after the unresolved one takes its slot"
    );
    assert!(!world.is_building());
    assert_eq!(
        world.observed().last(),
        Some(&Observed::Finished {
            blueprint: "blueprint_odd".into(),
            placed: 2,
        })
    );
}
