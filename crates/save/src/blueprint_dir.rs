//! The blueprint folder: listing, reading and isolated per-file loading.

use std::fs;
use std::path::{Path, PathBuf};

use bevy::prelude::*;

use blueprints::config::FILE_EXTENSION;
use blueprints::distribution::FileSet;
use blueprints::format::parse_blueprint;
use blueprints::Blueprint;

use crate::file_error::BlueprintFileError;

/// Where blueprint files and the settings file live.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct BlueprintFolder {
    /// Configuration directory; blueprints go in `<root>/blueprints`.
    pub root: PathBuf,
}

impl Default for BlueprintFolder {
    fn default() -> Self {
        Self::new("config")
    }
}

impl BlueprintFolder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn blueprint_dir(&self) -> PathBuf {
        self.root.join("blueprints")
    }

    pub fn settings_path(&self) -> PathBuf {
        self.root.join("BlueprintPieces.cfg.json")
    }

    pub fn file_path(&self, file_name: &str) -> PathBuf {
        self.blueprint_dir().join(file_name)
    }
}

/// Creates the folder if absent.
pub fn ensure_dir(dir: &Path) -> Result<(), BlueprintFileError> {
    fs::create_dir_all(dir)?;
    Ok(())
}

pub fn is_blueprint_path(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == FILE_EXTENSION)
}

/// Every `*.blueprint` file in `dir`, sorted by path.
pub fn list_blueprint_files(dir: &Path) -> Result<Vec<PathBuf>, BlueprintFileError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_blueprint_path(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Reads one file as `(file name, lines)`.
pub fn read_blueprint_file(path: &Path) -> Result<(String, Vec<String>), BlueprintFileError> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|_| is_blueprint_path(path))
        .ok_or_else(|| BlueprintFileError::NotABlueprint {
            path: path.to_path_buf(),
        })?
        .to_string();
    let bytes = fs::read(path)?;
    let text = String::from_utf8(bytes).map_err(|_| BlueprintFileError::InvalidUtf8 {
        path: path.to_path_buf(),
    })?;
    Ok((file_name, text.lines().map(str::to_string).collect()))
}

/// Result of loading a whole folder.
#[derive(Debug, Default)]
pub struct FolderLoad {
    pub files: FileSet,
    pub blueprints: Vec<Blueprint>,
    /// Files that could not be read, with the reason.
    pub failed: Vec<(PathBuf, String)>,
}

/// Loads every blueprint in `dir`. A failing file is logged and skipped; the
/// others still load.
pub fn load_all(dir: &Path) -> Result<FolderLoad, BlueprintFileError> {
    let mut load = FolderLoad::default();
    for path in list_blueprint_files(dir)? {
        match read_blueprint_file(&path) {
            Ok((file_name, lines)) => {
                load.blueprints.push(parse_blueprint(&lines, &file_name));
                load.files.insert(file_name, lines);
            }
            Err(e) => {
                warn!("Skipping blueprint {}: {e}", path.display());
                load.failed.push((path, e.to_string()));
            }
        }
    }
    Ok(load)
}
