//! Filesystem watch on the blueprint folder.
//!
//! A debounced `notify` watcher feeds events into a channel; a system drains
//! it every frame on the authoritative host and loads `*.blueprint` files it
//! has not read yet. Only new files are picked up: a file becomes known once
//! it has been read successfully, and known files are never reloaded. A file
//! caught mid-write that fails to read stays unknown, so the modify event of
//! the finished write loads it.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::sync::Mutex;
use std::time::Duration;

use bevy::prelude::*;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use notify_debouncer_full::{new_debouncer, DebounceEventResult, Debouncer, FileIdMap};

use blueprints::distribution::{HostRole, RawBlueprintFiles};
use blueprints::format::parse_blueprint;
use blueprints::registry::BlueprintRegistry;

use crate::blueprint_dir::{is_blueprint_path, read_blueprint_file};
use crate::file_error::BlueprintFileError;

pub const WATCH_DEBOUNCE: Duration = Duration::from_millis(300);

// ---------------------------------------------------------------------------
// Known files
// ---------------------------------------------------------------------------

/// File names already read, or written by this process.
#[derive(Resource, Debug, Default)]
pub struct FolderWatch {
    known: HashSet<String>,
}

impl FolderWatch {
    pub fn mark_known(&mut self, file_name: impl Into<String>) {
        self.known.insert(file_name.into());
    }

    pub fn is_known(&self, file_name: &str) -> bool {
        self.known.contains(file_name)
    }
}

// ---------------------------------------------------------------------------
// Watcher
// ---------------------------------------------------------------------------

/// Debounced watcher on one folder. Dropping it stops the watch.
#[derive(Resource)]
pub struct BlueprintWatcher {
    _debouncer: Mutex<Debouncer<RecommendedWatcher, FileIdMap>>,
    receiver: Mutex<Receiver<DebounceEventResult>>,
}

impl BlueprintWatcher {
    /// Start watching `dir` (not recursive).
    pub fn start(dir: &Path) -> Result<Self, BlueprintFileError> {
        let (tx, rx) = channel();
        let mut debouncer = new_debouncer(WATCH_DEBOUNCE, None, move |result| {
            // The receiver is gone once the app shuts down.
            let _ = tx.send(result);
        })
        .map_err(|e| BlueprintFileError::Watch(e.to_string()))?;
        debouncer
            .watcher()
            .watch(dir, RecursiveMode::NonRecursive)
            .map_err(|e| BlueprintFileError::Watch(e.to_string()))?;

        info!("Watching {} for new blueprints", dir.display());
        Ok(Self {
            _debouncer: Mutex::new(debouncer),
            receiver: Mutex::new(rx),
        })
    }

    /// Blueprint paths created or written since the last call. Non-blocking.
    pub fn drain_paths(&self) -> Vec<PathBuf> {
        let Ok(receiver) = self.receiver.lock() else {
            return Vec::new();
        };
        let mut paths = Vec::new();
        while let Ok(result) = receiver.try_recv() {
            match result {
                Ok(events) => {
                    paths.extend(created_blueprint_paths(events.iter().map(|e| &e.event)));
                }
                Err(errors) => {
                    for error in errors {
                        warn!("Blueprint folder watch error: {error}");
                    }
                }
            }
        }
        paths.sort();
        paths.dedup();
        paths
    }
}

/// Blueprint paths touched by creation events. Writes count too: they finish
/// a creation whose first read failed. Deletions are ignored.
pub fn created_blueprint_paths<'a>(events: impl IntoIterator<Item = &'a Event>) -> Vec<PathBuf> {
    events
        .into_iter()
        .filter(|event| matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)))
        .flat_map(|event| event.paths.iter())
        .filter(|path| is_blueprint_path(path))
        .cloned()
        .collect()
}

/// Reads every path whose file name is not known yet, as `(file name,
/// lines)`. A name becomes known only once its file has been read.
pub fn read_new_files(paths: &[PathBuf], watch: &mut FolderWatch) -> Vec<(String, Vec<String>)> {
    let mut found = Vec::new();
    for path in paths {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if watch.is_known(name) {
            continue;
        }
        match read_blueprint_file(path) {
            Ok(file) => {
                watch.mark_known(name);
                found.push(file);
            }
            Err(e) => debug!("Blueprint {} not readable yet: {e}", path.display()),
        }
    }
    found
}

pub(crate) fn apply_watched_files(
    role: Res<HostRole>,
    watcher: Option<Res<BlueprintWatcher>>,
    mut watch: ResMut<FolderWatch>,
    mut files: ResMut<RawBlueprintFiles>,
    mut registry: ResMut<BlueprintRegistry>,
) {
    let Some(watcher) = watcher else {
        return;
    };
    // Followers drain too, so nothing piles up, but never load.
    let paths = watcher.drain_paths();
    if *role != HostRole::Authoritative || paths.is_empty() {
        return;
    }

    for (file_name, lines) in read_new_files(&paths, &mut watch) {
        if files.contains(&file_name) {
            continue;
        }
        registry.insert(parse_blueprint(&lines, &file_name));
        files.insert(file_name.clone(), lines);
        info!("New blueprint file {file_name}");
    }
}
