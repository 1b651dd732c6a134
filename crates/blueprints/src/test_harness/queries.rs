//! Read-only query and assertion helpers for `TestWorld`.

use bevy::prelude::*;

use crate::build::{BuildInProgress, BuildQueue, PlacedPiece};
use crate::catalog::PieceCatalog;
use crate::distribution::RawBlueprintFiles;
use crate::ghost::{GhostOffset, GhostPiece, GhostState, GhostTerrainMarker};
use crate::materialize::BlueprintPlaceholder;
use crate::registry::BlueprintRegistry;
use crate::selection::PlacementTable;
use crate::settings::SettingsStore;

use super::{Observed, ObservedLog, TestWorld};

impl TestWorld {
    // -----------------------------------------------------------------------
    // Resources
    // -----------------------------------------------------------------------

    pub fn registry(&self) -> &BlueprintRegistry {
        self.world().resource::<BlueprintRegistry>()
    }

    pub fn catalog(&self) -> &PieceCatalog {
        self.world().resource::<PieceCatalog>()
    }

    pub fn table(&self) -> &PlacementTable {
        self.world().resource::<PlacementTable>()
    }

    pub fn store(&self) -> &SettingsStore {
        self.world().resource::<SettingsStore>()
    }

    pub fn raw_files(&self) -> &RawBlueprintFiles {
        self.world().resource::<RawBlueprintFiles>()
    }

    pub fn ghost_state(&self) -> &GhostState {
        self.world().resource::<GhostState>()
    }

    pub fn ghost_offset(&self) -> f32 {
        self.world().resource::<GhostOffset>().0
    }

    pub fn is_building(&self) -> bool {
        self.world().resource::<BuildInProgress>().is_building()
    }

    pub fn build_queue(&self) -> &BuildQueue {
        self.world().resource::<BuildQueue>()
    }

    /// Terrain edits and placed pieces in the order they were observed.
    pub fn observed(&self) -> &[Observed] {
        &self.world().resource::<ObservedLog>().0
    }

    // -----------------------------------------------------------------------
    // Entity counts
    // -----------------------------------------------------------------------

    pub fn placeholder_count(&mut self) -> usize {
        let world = self.world_mut();
        world
            .query_filtered::<Entity, With<BlueprintPlaceholder>>()
            .iter(world)
            .count()
    }

    pub fn ghost_piece_count(&mut self) -> usize {
        let world = self.world_mut();
        world
            .query_filtered::<Entity, With<GhostPiece>>()
            .iter(world)
            .count()
    }

    pub fn ghost_terrain_count(&mut self) -> usize {
        let world = self.world_mut();
        world
            .query_filtered::<Entity, With<GhostTerrainMarker>>()
            .iter(world)
            .count()
    }

    /// `(prefab, creator, position)` of every committed piece.
    pub fn placed_pieces(&mut self) -> Vec<(String, u64, Vec3)> {
        let world = self.world_mut();
        let mut pieces: Vec<_> = world
            .query::<(&PlacedPiece, &Transform)>()
            .iter(world)
            .map(|(p, t)| (p.prefab.clone(), p.creator, t.translation))
            .collect();
        pieces.sort_by(|a, b| a.0.cmp(&b.0));
        pieces
    }

    /// Heights of observed pieces, in placement order.
    pub fn observed_piece_heights(&self) -> Vec<f32> {
        self.observed()
            .iter()
            .filter_map(|o| match o {
                Observed::Piece { position, .. } => Some(position.y),
                _ => None,
            })
            .collect()
    }

    pub fn committed_count(&self) -> usize {
        self.observed()
            .iter()
            .filter(|o| matches!(o, Observed::Committed { .. }))
            .count()
    }

    /// Height of the preview root above the cursor.
    pub fn ghost_root_y(&self) -> Option<f32> {
        let root = self.ghost_state().root()?;
        self.world().get::<Transform>(root).map(|t| t.translation.y)
    }

    // -----------------------------------------------------------------------
    // Assertions
    // -----------------------------------------------------------------------

    pub fn assert_registered(&self, name: &str) {
        let blueprint = self
            .registry()
            .get(name)
            .unwrap_or_else(|| panic!("{name} is not in the registry"));
        assert!(blueprint.is_registered(), "{name} is not registered");
        assert!(
            self.catalog().resolve(name).is_some(),
            "{name} has no catalog entry"
        );
    }

    pub fn assert_previewing(&self, name: &str) {
        match self.ghost_state() {
            GhostState::Previewing { blueprint, .. } => {
                assert_eq!(blueprint, name, "previewing the wrong blueprint")
            }
            GhostState::Idle => panic!("expected a preview of {name}, ghost is idle"),
        }
    }

    pub fn assert_idle(&self) {
        assert_eq!(*self.ghost_state(), GhostState::Idle, "expected an idle ghost");
    }
}
