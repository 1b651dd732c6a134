//! JSON persistence of the settings store.

use std::fs;
use std::path::Path;

use blueprints::settings::SettingsSnapshot;

use crate::atomic_write::atomic_write;
use crate::file_error::BlueprintFileError;

/// Reads a snapshot. A missing file is an empty snapshot.
pub fn load_settings(path: &Path) -> Result<SettingsSnapshot, BlueprintFileError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(SettingsSnapshot::new())
        }
        Err(e) => return Err(e.into()),
    };
    serde_json::from_str(&text).map_err(|e| BlueprintFileError::InvalidSettings {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

pub fn save_settings(path: &Path, snapshot: &SettingsSnapshot) -> Result<(), BlueprintFileError> {
    let json = serde_json::to_string_pretty(snapshot).map_err(|e| {
        BlueprintFileError::InvalidSettings {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;
    atomic_write(path, json.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use bevy::prelude::KeyCode;
    use blueprints::settings::{keys, register_default_settings, SettingsStore};

    use super::*;

    fn test_dir(name: &str) -> PathBuf {
        let dir = PathBuf::from(format!("/tmp/blueprint_pieces_settings_{name}"));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = test_dir("missing");
        let snapshot = load_settings(&dir.join("absent.json")).unwrap();
        assert!(snapshot.is_empty());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_saved_values_preload_into_a_new_store() {
        let dir = test_dir("roundtrip");
        let path = dir.join("BlueprintPieces.cfg.json");

        let mut store = SettingsStore::default();
        register_default_settings(&mut store);
        store.set(&keys::slow_build(), false).unwrap();
        store.set(&keys::step_up(), KeyCode::KeyU).unwrap();
        save_settings(&path, &store.snapshot()).unwrap();

        let mut fresh = SettingsStore::default();
        fresh.preload(load_settings(&path).unwrap());
        register_default_settings(&mut fresh);
        assert!(!fresh.bool(&keys::slow_build()));
        assert_eq!(fresh.key_code(&keys::step_up()), Some(KeyCode::KeyU));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_garbage_is_invalid_settings() {
        let dir = test_dir("garbage");
        let path = dir.join("BlueprintPieces.cfg.json");
        fs::write(&path, "{ not json").unwrap();

        let err = load_settings(&path).unwrap_err();
        assert!(matches!(err, BlueprintFileError::InvalidSettings { .. }));

        let _ = fs::remove_dir_all(&dir);
    }
}
