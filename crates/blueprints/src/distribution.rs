//! Host -> follower distribution of the raw blueprint file set.
//!
//! The authoritative host serializes `{file name -> lines}` to JSON and
//! publishes it through the synced `Server Blueprints` setting. Followers
//! re-parse the whole set on change and replace their registry with it.

use std::collections::BTreeMap;
use std::fmt;

use bevy::prelude::*;

use crate::format::parse_blueprint;
use crate::registry::replace_all;
use crate::settings::{keys, SettingChanged, SettingKey, SettingsStore};
use crate::types::Blueprint;

pub type FileSet = BTreeMap<String, Vec<String>>;

#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HostRole {
    #[default]
    Authoritative,
    Follower,
}

/// Raw lines of every known blueprint file, by file name.
#[derive(Resource, Debug, Clone, Default)]
pub struct RawBlueprintFiles {
    files: FileSet,
}

impl RawBlueprintFiles {
    pub fn insert(&mut self, file_name: impl Into<String>, lines: Vec<String>) {
        self.files.insert(file_name.into(), lines);
    }

    pub fn contains(&self, file_name: &str) -> bool {
        self.files.contains_key(file_name)
    }

    pub fn files(&self) -> &FileSet {
        &self.files
    }

    pub fn replace(&mut self, files: FileSet) {
        self.files = files;
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

// =============================================================================
// Payload
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum PayloadError {
    Encode(String),
    Decode(String),
}

impl fmt::Display for PayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadError::Encode(msg) => write!(f, "Payload encoding error: {msg}"),
            PayloadError::Decode(msg) => write!(f, "Payload decoding error: {msg}"),
        }
    }
}

impl std::error::Error for PayloadError {}

impl From<serde_json::Error> for PayloadError {
    fn from(e: serde_json::Error) -> Self {
        PayloadError::Decode(e.to_string())
    }
}

pub fn encode_payload(files: &FileSet) -> Result<String, PayloadError> {
    serde_json::to_string(files).map_err(|e| PayloadError::Encode(e.to_string()))
}

/// `Ok(None)` for a blank payload or an empty file set: no data yet.
pub fn decode_payload(text: &str) -> Result<Option<FileSet>, PayloadError> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    let files: FileSet = serde_json::from_str(text)?;
    Ok((!files.is_empty()).then_some(files))
}

/// Parse every file of a set, in file-name order.
pub fn parse_file_set(files: &FileSet) -> Vec<Blueprint> {
    files
        .iter()
        .map(|(file_name, lines)| parse_blueprint(lines, file_name))
        .collect()
}

/// In-process transport of synced values from a host store to a follower's.
/// Returns how many values changed on the follower.
pub fn mirror_synced(host: &SettingsStore, follower: &mut SettingsStore) -> usize {
    let mut changed = 0;
    for (group, values) in host.synced_snapshot() {
        for (name, value) in values {
            if follower.receive_remote(SettingKey::new(group.clone(), name), value) {
                changed += 1;
            }
        }
    }
    changed
}

// =============================================================================
// Systems
// =============================================================================

/// Set when the payload setting changed on a follower.
#[derive(Resource, Debug, Default)]
pub(crate) struct PendingRemotePayload(pub(crate) bool);

pub(crate) fn sync_host_role(role: Res<HostRole>, mut store: ResMut<SettingsStore>) {
    if role.is_changed() {
        store.set_authoritative(*role == HostRole::Authoritative);
    }
}

/// Host side: republish whenever the raw file set changes.
pub(crate) fn publish_blueprint_files(
    role: Res<HostRole>,
    files: Res<RawBlueprintFiles>,
    mut store: ResMut<SettingsStore>,
) {
    if *role != HostRole::Authoritative || !files.is_changed() || files.is_empty() {
        return;
    }
    match encode_payload(files.files()) {
        Ok(payload) => {
            if let Ok(true) = store.set(&keys::server_blueprints(), payload) {
                info!("Published {} blueprint file(s)", files.len());
            }
        }
        Err(e) => warn!("Could not publish blueprints: {e}"),
    }
}

pub(crate) fn detect_remote_payload(
    role: Res<HostRole>,
    mut changes: EventReader<SettingChanged>,
    mut pending: ResMut<PendingRemotePayload>,
) {
    let payload_key = keys::server_blueprints();
    for change in changes.read() {
        if change.key == payload_key && *role == HostRole::Follower {
            pending.0 = true;
        }
    }
}

/// Follower side: replace the registry with the received file set.
pub(crate) fn apply_remote_payload(world: &mut World) {
    if !std::mem::take(&mut world.resource_mut::<PendingRemotePayload>().0) {
        return;
    }
    let payload = world
        .resource::<SettingsStore>()
        .text(&keys::server_blueprints())
        .to_string();

    let files = match decode_payload(&payload) {
        Ok(Some(files)) => files,
        Ok(None) => {
            debug!("Ignoring empty blueprint payload");
            return;
        }
        Err(e) => {
            debug!("Ignoring unreadable blueprint payload: {e}");
            return;
        }
    };

    let blueprints = parse_file_set(&files);
    info!("Received {} blueprint file(s) from server", blueprints.len());
    world.resource_mut::<RawBlueprintFiles>().replace(files);
    replace_all(world, blueprints);
}
