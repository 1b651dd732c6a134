// ---------------------------------------------------------------------------
// BlueprintFileError: error types for the blueprint folder and settings file
// ---------------------------------------------------------------------------

use std::fmt;
use std::path::PathBuf;

/// Errors that can occur while reading or writing blueprint and settings files.
#[derive(Debug)]
pub enum BlueprintFileError {
    /// I/O error (file not found, permission denied, disk full, etc.)
    Io(std::io::Error),
    /// The file is not valid UTF-8 text.
    InvalidUtf8 { path: PathBuf },
    /// The path does not carry the `.blueprint` extension.
    NotABlueprint { path: PathBuf },
    /// The settings file could not be parsed or serialized.
    InvalidSettings { path: PathBuf, message: String },
    /// The folder watcher could not be started.
    Watch(String),
}

impl fmt::Display for BlueprintFileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlueprintFileError::Io(e) => write!(f, "I/O error: {e}"),
            BlueprintFileError::InvalidUtf8 { path } => {
                write!(f, "Not valid UTF-8 text: {}", path.display())
            }
            BlueprintFileError::NotABlueprint { path } => {
                write!(f, "Not a blueprint file: {}", path.display())
            }
            BlueprintFileError::InvalidSettings { path, message } => {
                write!(f, "Invalid settings file {}: {message}", path.display())
            }
            BlueprintFileError::Watch(message) => write!(f, "Cannot watch folder: {message}"),
        }
    }
}

impl std::error::Error for BlueprintFileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BlueprintFileError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for BlueprintFileError {
    fn from(e: std::io::Error) -> Self {
        BlueprintFileError::Io(e)
    }
}
