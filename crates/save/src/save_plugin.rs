use bevy::prelude::*;

use blueprints::capture::BlueprintCaptured;
use blueprints::distribution::RawBlueprintFiles;
use blueprints::registry::BlueprintRegistry;
use blueprints::settings::SettingsStore;
use blueprints::BlueprintSet;

use crate::atomic_write::atomic_write_lines;
use crate::blueprint_dir::{ensure_dir, load_all, BlueprintFolder};
use crate::file_watch::{apply_watched_files, BlueprintWatcher, FolderWatch};
use crate::settings_file::{load_settings, save_settings};

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

/// Disk edge of the blueprint pipeline. Add after `BlueprintsPlugin`.
pub struct BlueprintFilesPlugin;

impl Plugin for BlueprintFilesPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<BlueprintFolder>()
            .init_resource::<FolderWatch>();

        // Settings must be preloaded and the folder read before the first
        // session starts registering.
        app.add_systems(Startup, load_blueprint_folder);

        app.add_systems(Update, apply_watched_files.in_set(BlueprintSet::Input));

        app.add_systems(
            PostUpdate,
            (persist_captured_blueprints, save_settings_when_dirty),
        );
    }
}

// ---------------------------------------------------------------------------
// Startup
// ---------------------------------------------------------------------------

/// Preloads the settings file, starts the folder watch and reads every
/// blueprint in the folder. Unreadable files are skipped individually and
/// stay unknown to the watch.
fn load_blueprint_folder(world: &mut World) {
    let folder = world.resource::<BlueprintFolder>().clone();

    match load_settings(&folder.settings_path()) {
        Ok(snapshot) => {
            let mut store = world.resource_mut::<SettingsStore>();
            store.preload(snapshot);
            store.take_dirty();
        }
        Err(e) => warn!("Settings not loaded: {e}"),
    }

    let dir = folder.blueprint_dir();
    if let Err(e) = ensure_dir(&dir) {
        warn!("Cannot create blueprint folder {}: {e}", dir.display());
        return;
    }
    // Started before the scan so a file created in between is not missed.
    match BlueprintWatcher::start(&dir) {
        Ok(watcher) => {
            world.insert_resource(watcher);
        }
        Err(e) => warn!("New blueprint files will not be picked up: {e}"),
    }
    let load = match load_all(&dir) {
        Ok(load) => load,
        Err(e) => {
            warn!("Cannot read blueprint folder {}: {e}", dir.display());
            return;
        }
    };

    {
        let mut watch = world.resource_mut::<FolderWatch>();
        for file_name in load.files.keys() {
            watch.mark_known(file_name.clone());
        }
    }

    let count = load.blueprints.len();
    {
        let mut files = world.resource_mut::<RawBlueprintFiles>();
        for (file_name, lines) in load.files {
            files.insert(file_name, lines);
        }
    }
    let mut registry = world.resource_mut::<BlueprintRegistry>();
    for blueprint in load.blueprints {
        registry.insert(blueprint);
    }
    info!(
        "Loaded {count} blueprint file(s) from {} ({} skipped)",
        dir.display(),
        load.failed.len()
    );
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

/// Writes each captured blueprint to `<folder>/<file name>` atomically.
fn persist_captured_blueprints(
    mut events: EventReader<BlueprintCaptured>,
    folder: Res<BlueprintFolder>,
    mut watch: ResMut<FolderWatch>,
) {
    for captured in events.read() {
        let path = folder.file_path(&captured.file_name);
        watch.mark_known(captured.file_name.clone());
        match atomic_write_lines(&path, &captured.lines) {
            Ok(()) => info!("Saved {} to {}", captured.name, path.display()),
            Err(e) => error!("Failed to save {}: {e}", path.display()),
        }
    }
}

fn save_settings_when_dirty(mut store: ResMut<SettingsStore>, folder: Res<BlueprintFolder>) {
    if !store.take_dirty() {
        return;
    }
    if let Err(e) = save_settings(&folder.settings_path(), &store.snapshot()) {
        warn!("Settings not saved: {e}");
    }
}
