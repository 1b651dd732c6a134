//! Typed, synchronisable key/value settings with change notification.
//!
//! The store owns every current value. Components never poll it for
//! changes: each change queues a `SettingChanged` event, flushed once per
//! frame, and interested systems filter those events by key.

use std::collections::BTreeMap;
use std::fmt;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{
    DEFAULT_BUILD_DELAY_SECS, DEFAULT_BUILD_RATE_SECS, DEFAULT_CATEGORY, DEFAULT_STATION_LEVEL,
    DEFAULT_STEP_INCREMENT, FALLBACK_STATION,
};

// =============================================================================
// Keys and values
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SettingKey {
    pub group: String,
    pub name: String,
}

impl SettingKey {
    pub fn new(group: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.group, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SettingValue {
    Bool(bool),
    Float(f32),
    Text(String),
    Key(KeyCode),
}

impl SettingValue {
    pub fn kind(&self) -> &'static str {
        match self {
            SettingValue::Bool(_) => "bool",
            SettingValue::Float(_) => "float",
            SettingValue::Text(_) => "text",
            SettingValue::Key(_) => "key",
        }
    }

    fn same_kind(&self, other: &SettingValue) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

impl From<bool> for SettingValue {
    fn from(v: bool) -> Self {
        SettingValue::Bool(v)
    }
}

impl From<f32> for SettingValue {
    fn from(v: f32) -> Self {
        SettingValue::Float(v)
    }
}

impl From<&str> for SettingValue {
    fn from(v: &str) -> Self {
        SettingValue::Text(v.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(v: String) -> Self {
        SettingValue::Text(v)
    }
}

impl From<KeyCode> for SettingValue {
    fn from(v: KeyCode) -> Self {
        SettingValue::Key(v)
    }
}

#[derive(Debug, Clone)]
pub struct SettingEntry {
    pub value: SettingValue,
    pub default: SettingValue,
    pub description: String,
    /// Host value wins on followers.
    pub synced: bool,
    /// Acceptable range of a float setting; values are clamped into it.
    pub range: Option<(f32, f32)>,
}

impl SettingEntry {
    fn clamp(&self, value: SettingValue) -> SettingValue {
        match (value, self.range) {
            (SettingValue::Float(f), Some((min, max))) => SettingValue::Float(f.clamp(min, max)),
            (value, _) => value,
        }
    }
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum SettingsError {
    /// No setting bound under this key.
    Unknown(SettingKey),
    /// The new value's type differs from the bound type.
    TypeMismatch { key: SettingKey, expected: &'static str },
    /// Synced setting on a follower while the configuration is locked.
    Locked(SettingKey),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Unknown(key) => write!(f, "Unknown setting: {key}"),
            SettingsError::TypeMismatch { key, expected } => {
                write!(f, "Type mismatch for {key}: expected {expected}")
            }
            SettingsError::Locked(key) => {
                write!(f, "Setting {key} is locked by the server")
            }
        }
    }
}

impl std::error::Error for SettingsError {}

// =============================================================================
// Store
// =============================================================================

/// Fired once per changed setting, after the frame the change happened in.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct SettingChanged {
    pub key: SettingKey,
}

/// On-disk shape: group -> name -> value.
pub type SettingsSnapshot = BTreeMap<String, BTreeMap<String, SettingValue>>;

#[derive(Resource, Debug)]
pub struct SettingsStore {
    entries: BTreeMap<SettingKey, SettingEntry>,
    preloaded: BTreeMap<SettingKey, SettingValue>,
    pending: Vec<SettingKey>,
    dirty: bool,
    authoritative: bool,
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            preloaded: BTreeMap::new(),
            pending: Vec::new(),
            dirty: false,
            authoritative: true,
        }
    }
}

impl SettingsStore {
    /// Bind a synced setting.
    pub fn bind(
        &mut self,
        group: &str,
        name: &str,
        default: impl Into<SettingValue>,
        description: &str,
    ) -> SettingKey {
        self.bind_entry(group, name, default.into(), description, true, None)
    }

    /// Bind a setting that is never overwritten by the host.
    pub fn bind_local(
        &mut self,
        group: &str,
        name: &str,
        default: impl Into<SettingValue>,
        description: &str,
    ) -> SettingKey {
        self.bind_entry(group, name, default.into(), description, false, None)
    }

    /// Bind a synced float clamped into `min..=max`.
    pub fn bind_ranged(
        &mut self,
        group: &str,
        name: &str,
        default: f32,
        (min, max): (f32, f32),
        description: &str,
    ) -> SettingKey {
        self.bind_entry(
            group,
            name,
            SettingValue::Float(default),
            description,
            true,
            Some((min, max)),
        )
    }

    /// Rebinding keeps the current or preloaded value when its type matches.
    fn bind_entry(
        &mut self,
        group: &str,
        name: &str,
        default: SettingValue,
        description: &str,
        synced: bool,
        range: Option<(f32, f32)>,
    ) -> SettingKey {
        let key = SettingKey::new(group, name);
        let current = self
            .entries
            .get(&key)
            .map(|e| e.value.clone())
            .or_else(|| self.preloaded.remove(&key))
            .filter(|v| {
                let same = v.same_kind(&default);
                if !same {
                    debug!(
                        "Ignoring saved value for {key}: expected {}, found {}",
                        default.kind(),
                        v.kind()
                    );
                }
                same
            });

        let mut entry = SettingEntry {
            value: default.clone(),
            default,
            description: description.to_string(),
            synced,
            range,
        };
        if let Some(value) = current {
            entry.value = entry.clamp(value);
        }
        self.entries.insert(key.clone(), entry);
        key
    }

    /// Local change. Returns whether the stored value changed.
    pub fn set(
        &mut self,
        key: &SettingKey,
        value: impl Into<SettingValue>,
    ) -> Result<bool, SettingsError> {
        let locked = self.is_locked() && !self.authoritative;
        let entry = self
            .entries
            .get(key)
            .ok_or_else(|| SettingsError::Unknown(key.clone()))?;
        if entry.synced && locked {
            return Err(SettingsError::Locked(key.clone()));
        }
        self.store(key, value.into())
    }

    /// Value received from the authoritative host. Bypasses the lock.
    pub fn apply_remote(
        &mut self,
        key: &SettingKey,
        value: impl Into<SettingValue>,
    ) -> Result<bool, SettingsError> {
        self.store(key, value.into())
    }

    fn store(&mut self, key: &SettingKey, value: SettingValue) -> Result<bool, SettingsError> {
        let entry = self
            .entries
            .get_mut(key)
            .ok_or_else(|| SettingsError::Unknown(key.clone()))?;
        if !entry.value.same_kind(&value) {
            return Err(SettingsError::TypeMismatch {
                key: key.clone(),
                expected: entry.value.kind(),
            });
        }
        let value = entry.clamp(value);
        if entry.value == value {
            return Ok(false);
        }
        entry.value = value;
        self.pending.push(key.clone());
        self.dirty = true;
        Ok(true)
    }

    pub fn get(&self, key: &SettingKey) -> Option<&SettingValue> {
        self.entries.get(key).map(|e| &e.value)
    }

    pub fn bool(&self, key: &SettingKey) -> bool {
        matches!(self.get(key), Some(SettingValue::Bool(true)))
    }

    pub fn float(&self, key: &SettingKey) -> f32 {
        match self.get(key) {
            Some(SettingValue::Float(f)) => *f,
            _ => 0.0,
        }
    }

    pub fn text(&self, key: &SettingKey) -> &str {
        match self.get(key) {
            Some(SettingValue::Text(t)) => t,
            _ => "",
        }
    }

    pub fn key_code(&self, key: &SettingKey) -> Option<KeyCode> {
        match self.get(key) {
            Some(SettingValue::Key(k)) => Some(*k),
            _ => None,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.bool(&keys::lock_configuration())
    }

    pub fn set_authoritative(&mut self, authoritative: bool) {
        self.authoritative = authoritative;
    }

    /// Changed keys since the last call, in change order.
    pub fn drain_changes(&mut self) -> Vec<SettingKey> {
        std::mem::take(&mut self.pending)
    }

    /// Returns and clears the needs-persisting flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Values read from disk, applied as each key gets bound.
    pub fn preload(&mut self, snapshot: SettingsSnapshot) {
        for (group, values) in snapshot {
            for (name, value) in values {
                let key = SettingKey::new(group.clone(), name);
                if self.entries.contains_key(&key) {
                    if let Err(e) = self.apply_remote(&key, value) {
                        debug!("Ignoring saved value: {e}");
                    }
                } else {
                    self.preloaded.insert(key, value);
                }
            }
        }
    }

    /// Host value for a possibly not-yet-bound key. Unbound keys are kept
    /// and applied when bound. Returns whether a bound value changed.
    pub fn receive_remote(&mut self, key: SettingKey, value: SettingValue) -> bool {
        if self.entries.contains_key(&key) {
            matches!(self.apply_remote(&key, value), Ok(true))
        } else {
            self.preloaded.insert(key, value);
            false
        }
    }

    /// Synced values only, internal payload included.
    pub fn synced_snapshot(&self) -> SettingsSnapshot {
        let mut out = SettingsSnapshot::new();
        for (key, entry) in self.entries.iter().filter(|(_, e)| e.synced) {
            out.entry(key.group.clone())
                .or_default()
                .insert(key.name.clone(), entry.value.clone());
        }
        out
    }

    /// Every local setting plus synced ones; the internal payload is skipped.
    pub fn snapshot(&self) -> SettingsSnapshot {
        let mut out = SettingsSnapshot::new();
        for (key, entry) in &self.entries {
            if key.group == keys::INTERNAL {
                continue;
            }
            out.entry(key.group.clone())
                .or_default()
                .insert(key.name.clone(), entry.value.clone());
        }
        out
    }
}

/// Flushes queued changes into `SettingChanged` events.
pub fn flush_setting_changes(
    mut store: ResMut<SettingsStore>,
    mut events: EventWriter<SettingChanged>,
) {
    for key in store.drain_changes() {
        events.send(SettingChanged { key });
    }
}

// =============================================================================
// Well-known settings
// =============================================================================

pub mod keys {
    use super::SettingKey;

    pub const GENERAL: &str = "1 - General";
    pub const SETTINGS: &str = "2 - Settings";
    pub const INTERNAL: &str = "Internal";

    pub fn lock_configuration() -> SettingKey {
        SettingKey::new(GENERAL, "Lock Configuration")
    }
    pub fn use_ghost_material() -> SettingKey {
        SettingKey::new(SETTINGS, "Use Ghost Material")
    }
    pub fn slow_build() -> SettingKey {
        SettingKey::new(SETTINGS, "Slow Build")
    }
    pub fn build_rate() -> SettingKey {
        SettingKey::new(SETTINGS, "Build Rate")
    }
    pub fn build_delay() -> SettingKey {
        SettingKey::new(SETTINGS, "Build Delay")
    }
    pub fn place_effects() -> SettingKey {
        SettingKey::new(SETTINGS, "Place Effects")
    }
    pub fn step_up() -> SettingKey {
        SettingKey::new(SETTINGS, "Step Up")
    }
    pub fn step_down() -> SettingKey {
        SettingKey::new(SETTINGS, "Step Down")
    }
    pub fn reset_steps() -> SettingKey {
        SettingKey::new(SETTINGS, "Reset Steps")
    }
    pub fn step_increment() -> SettingKey {
        SettingKey::new(SETTINGS, "Step Increment")
    }
    pub fn server_blueprints() -> SettingKey {
        SettingKey::new(INTERNAL, "Server Blueprints")
    }
}

/// Bind every global setting with its default.
pub fn register_default_settings(store: &mut SettingsStore) {
    use keys::*;

    store.bind(
        GENERAL,
        "Lock Configuration",
        true,
        "If on, the configuration is locked and can be changed by server admins only.",
    );
    store.bind(
        SETTINGS,
        "Use Ghost Material",
        false,
        "If on, blueprint previews use a translucent material.",
    );
    store.bind(
        SETTINGS,
        "Slow Build",
        true,
        "If on, blueprints are built piece by piece, bottom up.",
    );
    store.bind_ranged(
        SETTINGS,
        "Build Rate",
        DEFAULT_BUILD_RATE_SECS,
        (0.1, 2.0),
        "Seconds between pieces of a slow build.",
    );
    store.bind_ranged(
        SETTINGS,
        "Build Delay",
        DEFAULT_BUILD_DELAY_SECS,
        (0.0, 101.0),
        "Seconds before the first piece of a slow build.",
    );
    store.bind(
        SETTINGS,
        "Place Effects",
        true,
        "If on, every placed piece plays its place effect.",
    );
    store.bind_local(
        SETTINGS,
        "Step Up",
        KeyCode::PageUp,
        "Raise the blueprint preview.",
    );
    store.bind_local(
        SETTINGS,
        "Step Down",
        KeyCode::PageDown,
        "Lower the blueprint preview.",
    );
    store.bind_local(
        SETTINGS,
        "Reset Steps",
        KeyCode::Escape,
        "Reset the preview height.",
    );
    store.bind_ranged(
        SETTINGS,
        "Step Increment",
        DEFAULT_STEP_INCREMENT,
        (0.1, 2.0),
        "Height change per step.",
    );
    store.bind(
        INTERNAL,
        "Server Blueprints",
        "",
        "Blueprint files distributed by the server.",
    );
}

/// Per-blueprint overrides, grouped under the blueprint's base name.
#[derive(Debug, Clone, PartialEq)]
pub struct BlueprintSettingKeys {
    pub display_name: SettingKey,
    pub crafting_station: SettingKey,
    pub category: SettingKey,
    pub crate_name: SettingKey,
    pub station_level: SettingKey,
}

impl BlueprintSettingKeys {
    pub fn for_base_name(base: &str) -> Self {
        Self {
            display_name: SettingKey::new(base, "DisplayName"),
            crafting_station: SettingKey::new(base, "Crafting Station"),
            category: SettingKey::new(base, "Category"),
            crate_name: SettingKey::new(base, "Crate Name"),
            station_level: SettingKey::new(base, "Station Level"),
        }
    }

    /// Whether `key` is one of this blueprint's overrides.
    pub fn contains(&self, key: &SettingKey) -> bool {
        [
            &self.display_name,
            &self.crafting_station,
            &self.category,
            &self.crate_name,
            &self.station_level,
        ]
        .contains(&key)
    }
}

pub fn bind_blueprint_settings(store: &mut SettingsStore, base: &str) -> BlueprintSettingKeys {
    store.bind(base, "DisplayName", base, "Display name of the blueprint piece.");
    store.bind(
        base,
        "Crafting Station",
        FALLBACK_STATION,
        "Crafting station needed to craft the blueprint crate.",
    );
    store.bind(base, "Category", DEFAULT_CATEGORY, "Build menu category.");
    store.bind(
        base,
        "Crate Name",
        format!("crate_{base}"),
        "Display name of the blueprint crate.",
    );
    store.bind_ranged(
        base,
        "Station Level",
        DEFAULT_STATION_LEVEL,
        (1.0, 10.0),
        "Minimum crafting station level.",
    );
    BlueprintSettingKeys::for_base_name(base)
}
