//! Builder and action methods for `TestWorld`.

use bevy::prelude::*;

use crate::build::{advance_build_jobs, CommitBlueprint, PlacedPiece};
use crate::capture::CaptureBlueprint;
use crate::catalog::{ItemEntry, PieceCatalog, PieceCatalogEntry};
use crate::distribution::{mirror_synced, RawBlueprintFiles};
use crate::format::parse_blueprint;
use crate::ghost::PlacementCursor;
use crate::registry::BlueprintRegistry;
use crate::selection::PlacementTable;
use crate::session::{EndWorldSession, StartWorldSession};
use crate::settings::{keys, SettingKey, SettingValue, SettingsStore};
use crate::types::Requirement;

use super::TestWorld;

impl TestWorld {
    // -----------------------------------------------------------------------
    // Catalog and settings
    // -----------------------------------------------------------------------

    /// Register a placeable piece costing `resources`.
    pub fn with_catalog_piece(mut self, name: &str, resources: &[(&str, u32)]) -> Self {
        let resources = resources
            .iter()
            .map(|(item, amount)| Requirement::new(*item, *amount))
            .collect();
        self.catalog_mut()
            .register_piece(PieceCatalogEntry::new(name, resources));
        self
    }

    /// Register a crafting station piece with a place effect.
    pub fn with_station(mut self, name: &str, place_effect: &str) -> Self {
        {
            let mut catalog = self.catalog_mut();
            catalog.register_piece(
                PieceCatalogEntry::new(name, vec![]).with_place_effect(place_effect),
            );
            catalog.register_station(name);
        }
        self
    }

    pub fn with_item(mut self, name: &str, icon: &str) -> Self {
        self.catalog_mut()
            .register_item(ItemEntry::new(name).with_icon(icon));
        self
    }

    pub fn with_setting(mut self, key: SettingKey, value: impl Into<SettingValue>) -> Self {
        self.set_setting(key, value);
        self
    }

    pub fn with_slow_build(self, slow: bool) -> Self {
        self.with_setting(keys::slow_build(), slow)
    }

    /// Parse `text` as `file_name` and add it to the registry and file set.
    pub fn with_blueprint_text(mut self, file_name: &str, text: &str) -> Self {
        self.add_blueprint_text(file_name, text);
        self
    }

    // -----------------------------------------------------------------------
    // Actions
    // -----------------------------------------------------------------------

    pub fn add_blueprint_text(&mut self, file_name: &str, text: &str) {
        let lines: Vec<String> = text.lines().map(str::to_string).collect();
        let blueprint = parse_blueprint(&lines, file_name);
        let world = self.world_mut();
        world
            .resource_mut::<RawBlueprintFiles>()
            .insert(file_name, lines);
        world.resource_mut::<BlueprintRegistry>().insert(blueprint);
    }

    pub fn set_setting(&mut self, key: SettingKey, value: impl Into<SettingValue>) {
        let result = self.store_mut().set(&key, value);
        assert!(result.is_ok(), "setting {key} failed: {result:?}");
    }

    pub fn start_session(&mut self) {
        self.world_mut().send_event(StartWorldSession);
        self.tick(1);
    }

    pub fn end_session(&mut self) {
        self.world_mut().send_event(EndWorldSession);
        self.tick(1);
    }

    /// Select `piece` in the placement table and let the preview react.
    pub fn select(&mut self, piece: &str) {
        let found = self.world_mut().resource_mut::<PlacementTable>().select(piece);
        assert!(found, "{piece} is not in the placement table");
        self.tick(1);
    }

    pub fn deselect(&mut self) {
        self.world_mut().resource_mut::<PlacementTable>().deselect();
        self.tick(1);
    }

    pub fn move_cursor(&mut self, position: Vec3) {
        let world = self.world_mut();
        let mut cursors = world.query_filtered::<&mut Transform, With<PlacementCursor>>();
        for mut transform in cursors.iter_mut(world) {
            transform.translation = position;
        }
    }

    pub fn commit(&mut self, actor: u64) {
        self.world_mut().send_event(CommitBlueprint { actor });
        self.tick(1);
    }

    /// Feed `dt` seconds to every throttled build, then run one frame.
    pub fn advance_builds(&mut self, dt: f32) {
        advance_build_jobs(self.world_mut(), dt);
        self.tick(1);
    }

    /// Press and release `key` within one frame.
    pub fn press_key(&mut self, key: KeyCode) {
        self.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(key);
        self.tick(1);
        let mut input = self.world_mut().resource_mut::<ButtonInput<KeyCode>>();
        input.release(key);
        input.clear();
    }

    pub fn spawn_placed_piece(&mut self, prefab: &str, position: Vec3) -> Entity {
        self.world_mut()
            .spawn((
                Name::new(format!("{prefab}(Clone)")),
                PlacedPiece {
                    prefab: format!("{prefab}(Clone)"),
                    creator: 0,
                    data: String::new(),
                },
                Transform::from_translation(position),
            ))
            .id()
    }

    pub fn capture(&mut self, start: Entity, creator: &str, name: Option<&str>) {
        self.world_mut().send_event(CaptureBlueprint {
            start,
            creator: creator.to_string(),
            name: name.map(str::to_string),
        });
        self.tick(1);
    }

    /// Copy every synced value of `host` into this world, then run two frames
    /// so the change is detected and applied.
    pub fn receive_from(&mut self, host: &TestWorld) {
        {
            let host_store = host.world().resource::<SettingsStore>();
            let mut store = self.app.world_mut().resource_mut::<SettingsStore>();
            mirror_synced(host_store, &mut store);
        }
        self.tick(2);
    }

    fn catalog_mut(&mut self) -> Mut<'_, PieceCatalog> {
        self.world_mut().resource_mut::<PieceCatalog>()
    }

    fn store_mut(&mut self) -> Mut<'_, SettingsStore> {
        self.world_mut().resource_mut::<SettingsStore>()
    }
}
